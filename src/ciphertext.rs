//! Ciphertexts
//!
//! A ciphertext is a sequence of ciphertext-ring elements tagged with its
//! parameters: two components when linear, three after a multiplication and
//! before relinearization. Addition and subtraction are component-wise and
//! treat missing trailing components as zero, so a linear ciphertext can be
//! added to a three-component one.

use std::sync::Arc;

use crate::error::{shape_err, Result};
use crate::math::{NativeModulus, RingElement};
use crate::params::{ensure_same, SchemeParameters};

#[derive(Clone, Debug)]
pub struct CipherText {
    params: Arc<SchemeParameters>,
    parts: Vec<RingElement<NativeModulus>>,
}

impl CipherText {
    /// Build a ciphertext from its components.
    ///
    /// Fails if `parts` is empty or a component lies outside the ciphertext
    /// ring of `params`.
    pub fn new(params: &Arc<SchemeParameters>, parts: Vec<RingElement<NativeModulus>>) -> Result<Self> {
        if parts.is_empty() {
            return Err(shape_err!("a ciphertext needs at least one component"));
        }
        if let Some(bad) = parts.iter().find(|p| p.ring() != params.ciphertext_ring()) {
            return Err(shape_err!(
                "component ring {:?} does not match {:?}",
                bad.ring(),
                params.ciphertext_ring()
            ));
        }
        Ok(Self::from_parts(params, parts))
    }

    /// Components already known to live in the ciphertext ring
    pub(crate) fn from_parts(params: &Arc<SchemeParameters>, parts: Vec<RingElement<NativeModulus>>) -> Self {
        debug_assert!(!parts.is_empty());
        Self {
            params: Arc::clone(params),
            parts,
        }
    }

    pub fn params(&self) -> &Arc<SchemeParameters> {
        &self.params
    }

    pub fn parts(&self) -> &[RingElement<NativeModulus>] {
        &self.parts
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Two components, ready for further multiplication
    pub fn is_linear(&self) -> bool {
        self.parts.len() == 2
    }

    /// Component-wise sum; the shorter operand is padded with zeros
    pub fn add(&self, other: &CipherText) -> Result<CipherText> {
        self.combine(other, |a, b| a + b, |b| b.clone())
    }

    /// Component-wise difference; the shorter operand is padded with zeros
    pub fn sub(&self, other: &CipherText) -> Result<CipherText> {
        self.combine(other, |a, b| a - b, |b| -b)
    }

    /// Negate every component
    pub fn negate(&self) -> CipherText {
        Self::from_parts(&self.params, self.parts.iter().map(|p| -p).collect())
    }

    fn combine<F, G>(&self, other: &CipherText, both: F, rhs_only: G) -> Result<CipherText>
    where
        F: Fn(&RingElement<NativeModulus>, &RingElement<NativeModulus>) -> RingElement<NativeModulus>,
        G: Fn(&RingElement<NativeModulus>) -> RingElement<NativeModulus>,
    {
        ensure_same(&self.params, &other.params)?;
        let len = self.len().max(other.len());
        let parts = (0..len)
            .map(|i| match (self.parts.get(i), other.parts.get(i)) {
                (Some(a), Some(b)) => both(a, b),
                (Some(a), None) => a.clone(),
                (None, Some(b)) => rhs_only(b),
                (None, None) => RingElement::zero(self.params.ciphertext_ring()),
            })
            .collect();
        Ok(Self::from_parts(&self.params, parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeError;

    fn parts(params: &Arc<SchemeParameters>, values: &[u64]) -> Vec<RingElement<NativeModulus>> {
        values
            .iter()
            .map(|&v| RingElement::constant(params.ciphertext_ring(), v))
            .collect()
    }

    #[test]
    fn test_add_pads_shorter_operand() {
        let params = Arc::new(SchemeParameters::toy().unwrap());
        let a = CipherText::new(&params, parts(&params, &[1, 2])).unwrap();
        let b = CipherText::new(&params, parts(&params, &[10, 20, 30])).unwrap();

        let sum = a.add(&b).unwrap();
        assert_eq!(sum.len(), 3);
        let constants: Vec<u64> = sum.parts().iter().map(|p| p.coeffs()[0]).collect();
        assert_eq!(constants, vec![11, 22, 30]);
    }

    #[test]
    fn test_sub_negates_missing_components() {
        let params = Arc::new(SchemeParameters::toy().unwrap());
        let a = CipherText::new(&params, parts(&params, &[1, 2])).unwrap();
        let b = CipherText::new(&params, parts(&params, &[1, 1, 5])).unwrap();

        let diff = a.sub(&b).unwrap();
        let constants: Vec<u64> = diff.parts().iter().map(|p| p.coeffs()[0]).collect();
        assert_eq!(constants, vec![0, 1, 16369 - 5]);

        let back = diff.add(&b).unwrap();
        assert_eq!(back.parts()[..2], a.parts()[..2]);
        assert!(back.parts()[2].is_zero());
    }

    #[test]
    fn test_negate() {
        let params = Arc::new(SchemeParameters::toy().unwrap());
        let a = CipherText::new(&params, parts(&params, &[3, 4])).unwrap();
        let zero = a.add(&a.negate()).unwrap();
        assert!(zero.parts().iter().all(|p| p.is_zero()));
    }

    #[test]
    fn test_mismatched_parameters() {
        let toy = Arc::new(SchemeParameters::toy().unwrap());
        let small = Arc::new(SchemeParameters::small().unwrap());
        let a = CipherText::new(&toy, parts(&toy, &[1, 2])).unwrap();
        let b = CipherText::new(&small, parts(&small, &[1, 2])).unwrap();

        assert!(matches!(a.add(&b), Err(HeError::ShapeMismatch(_))));
        assert!(matches!(
            CipherText::new(&toy, parts(&small, &[1, 2])),
            Err(HeError::ShapeMismatch(_))
        ));
        assert!(CipherText::new(&toy, vec![]).is_err());
    }
}
