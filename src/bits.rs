//! Fixed-width packed bit vector
//!
//! One bit per sample; bit `i` lives in word `i / 64` at position `i % 64`.
//! Bits past `len` in the last word are kept clear so that whole-word XOR and
//! popcount never see padding.

use std::fmt;

const WORD_BITS: usize = 64;

/// Fixed-length sequence of booleans packed into `u64` words
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    len: usize,
    words: Vec<u64>,
}

impl BitVector {
    /// All-clear vector of `len` bits
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            words: vec![0; words_for(len)],
        }
    }

    /// Build from a slice of booleans, index 0 first
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut out = Self::zeros(bits.len());
        for (i, &bit) in bits.iter().enumerate() {
            out.set(i, bit);
        }
        out
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed words; padding bits of the last word are zero
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Read bit `index`
    ///
    /// # Panics
    /// If `index >= len`.
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Write bit `index`
    ///
    /// # Panics
    /// If `index >= len`.
    pub fn set(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        let mask = 1u64 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Bitwise complement within `len`
    pub fn complement(&self) -> Self {
        let mut words: Vec<u64> = self.words.iter().map(|w| !w).collect();
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(self.len);
        }
        Self {
            len: self.len,
            words,
        }
    }

    /// Hamming distance: popcount of the word-wise XOR
    ///
    /// # Panics
    /// If the two vectors differ in length.
    #[inline]
    pub fn hamming(&self, other: &Self) -> u32 {
        assert_eq!(self.len, other.len, "hamming distance needs equal widths");
        hamming_words(&self.words, &other.words)
    }

    /// Iterate bits from index 0
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let bits: Vec<bool> = iter.into_iter().collect();
        Self::from_bools(&bits)
    }
}

/// Prints bit 0 first, as `0`/`1` characters.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// XOR + popcount over two equal-length word slices
#[inline]
pub(crate) fn hamming_words(a: &[u64], b: &[u64]) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

fn tail_mask(len: usize) -> u64 {
    match len % WORD_BITS {
        0 => u64::MAX,
        rem => (1u64 << rem) - 1,
    }
}
