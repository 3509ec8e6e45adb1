// Seam for the feature-extraction collaborators (audio MFCC / spectral
// contrast, image contours / Hu moments / colour). Extraction itself lives
// outside this crate; anything that turns raw bytes into a fixed-length
// vector can plug in here.

use crate::error::{Error, Result};
use crate::types::FeatureVector;

pub trait FeatureExtractor {
    fn dim(&self) -> usize;
    fn extract(&mut self, raw: &[u8]) -> Result<FeatureVector>;
}

/// Features that were already extracted upstream, given as text:
/// comma- or whitespace-separated numbers.
pub struct PrecomputedFeatures {
    dim_: usize,
}

impl PrecomputedFeatures {
    pub fn new(dim: usize) -> Self { Self { dim_: dim } }

    pub fn parse(&self, text: &str) -> Result<FeatureVector> {
        let mut v = Vec::with_capacity(self.dim_);
        for tok in text.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            let x: f32 = tok
                .parse()
                .map_err(|_| Error::InvalidParameter { name: "features", message: "expected numbers" })?;
            v.push(x);
        }
        check_vector(&v, self.dim_)?;
        Ok(v)
    }
}

impl FeatureExtractor for PrecomputedFeatures {
    fn dim(&self) -> usize { self.dim_ }

    fn extract(&mut self, raw: &[u8]) -> Result<FeatureVector> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| Error::InvalidParameter { name: "features", message: "not valid UTF-8" })?;
        self.parse(text)
    }
}

/// Length and finiteness check for a single query vector.
pub fn check_vector(v: &[f32], dim: usize) -> Result<()> {
    if v.is_empty() {
        return Err(Error::InvalidParameter { name: "features", message: "feature vector is empty" });
    }
    if v.len() != dim {
        return Err(Error::DimensionMismatch { expected: dim, found: v.len() });
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(Error::NonFinite { row: 0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commas_and_spaces() {
        let mut f = PrecomputedFeatures::new(3);
        assert_eq!(f.extract(b"1.5, -2,3e1").unwrap(), vec![1.5, -2.0, 30.0]);
        assert_eq!(f.parse("0 0\t1").unwrap(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn rejects_wrong_length_and_garbage() {
        let f = PrecomputedFeatures::new(2);
        assert!(matches!(f.parse("1,2,3"), Err(Error::DimensionMismatch { expected: 2, found: 3 })));
        assert!(f.parse("1,abc").is_err());
        assert!(f.parse("").is_err());
        assert!(matches!(f.parse("1,NaN"), Err(Error::NonFinite { .. })));
    }
}
