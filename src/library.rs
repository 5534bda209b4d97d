//! Exhaustive template library
//!
//! Every discretized wave on the `1/n` grid is encoded once, up front, and
//! kept in a fixed order. The order matters: template indices are reported by
//! the search, and ties go to the lowest index.

use tracing::{debug, info};

use crate::bits::BitVector;
use crate::wave::{encode, WaveParams};

/// One precomputed candidate wave and its encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    params: WaveParams,
    bits: BitVector,
}

impl Template {
    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn bits(&self) -> &BitVector {
        &self.bits
    }
}

/// Immutable, ordered set of templates for one bit width
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    nbits: usize,
    templates: Vec<Template>,
}

impl TemplateLibrary {
    /// Enumerate and encode every template for `nbits` samples.
    ///
    /// Wavelength steps run from 2 to `nbits / 2 - 1`, phase steps from 0 to
    /// the wavelength step inclusive, width steps from 1 to the wavelength step
    /// minus 2. Loops nest wavelength, phase, width from outer to inner.
    pub fn build(nbits: usize) -> Self {
        let capacity = Self::expected_len(nbits);
        let mut templates = Vec::with_capacity(capacity);

        for ilambda in 2..(nbits / 2) {
            for iphase in 0..=ilambda {
                for iwidth in 1..ilambda.saturating_sub(1) {
                    let params = WaveParams::from_steps(ilambda, iphase, iwidth, nbits);
                    let bits = encode(&params, nbits);
                    templates.push(Template { params, bits });
                }
            }
            debug!(ilambda, templates = templates.len(), "enumerated wavelength step");
        }

        info!(nbits, templates = templates.len(), "built template library");
        Self { nbits, templates }
    }

    /// Template count [`build`](Self::build) produces for `nbits`:
    /// the sum over wavelength steps `l` in `2..nbits/2` of `(l + 1) * (l - 2)`.
    pub fn expected_len(nbits: usize) -> usize {
        (2..(nbits / 2))
            .map(|ilambda| (ilambda + 1) * ilambda.saturating_sub(2))
            .sum()
    }

    /// Bit width shared by every template
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    /// Wave parameters of template `index`
    pub fn params(&self, index: usize) -> Option<&WaveParams> {
        self.templates.get(index).map(Template::params)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }
}

impl<'a> IntoIterator for &'a TemplateLibrary {
    type Item = &'a Template;
    type IntoIter = std::slice::Iter<'a, Template>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}
