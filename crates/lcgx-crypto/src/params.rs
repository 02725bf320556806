//! LCG parameter set.

use crate::CryptoError;

/// Parameters of the linear congruential generator.
///
/// `modulus` must be non-zero. A zero `multiplier` or `increment` is allowed
/// here and produces a degenerate but well-defined sequence; callers that
/// want to forbid it use [`CipherParameters::require_multiplier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherParameters {
    /// Initial state (`X0`)
    pub seed: u64,
    /// Multiplier (`A`)
    pub multiplier: u64,
    /// Increment (`C`)
    pub increment: u64,
    /// Modulus (`M`)
    pub modulus: u64,
}

impl CipherParameters {
    /// Build a parameter set, rejecting a zero modulus.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ZeroModulus`] if `modulus` is zero.
    pub fn new(seed: u64, multiplier: u64, increment: u64, modulus: u64) -> Result<Self, CryptoError> {
        let params = Self {
            seed,
            multiplier,
            increment,
            modulus,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the invariants of an already constructed parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ZeroModulus`] if `modulus` is zero.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.modulus == 0 {
            return Err(CryptoError::ZeroModulus);
        }
        Ok(())
    }

    /// Additionally reject a zero multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ZeroMultiplier`] if `multiplier` is zero.
    pub fn require_multiplier(self) -> Result<Self, CryptoError> {
        if self.multiplier == 0 {
            return Err(CryptoError::ZeroMultiplier);
        }
        Ok(self)
    }

    /// Apply one step of the recurrence to `state`.
    ///
    /// Multiply and add wrap at 64 bits, then the modulus is taken.
    #[inline]
    #[must_use]
    pub fn step(&self, state: u64) -> u64 {
        self.multiplier.wrapping_mul(state).wrapping_add(self.increment) % self.modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_modulus_rejected() {
        assert_eq!(CipherParameters::new(1, 5, 3, 0), Err(CryptoError::ZeroModulus));
    }

    #[test]
    fn test_degenerate_parameters_allowed() {
        let params = CipherParameters::new(7, 0, 0, 16).unwrap();
        assert_eq!(params.step(7), 0);
        assert_eq!(params.step(0), 0);
    }

    #[test]
    fn test_require_multiplier() {
        let params = CipherParameters::new(0, 0, 1, 256).unwrap();
        assert_eq!(params.require_multiplier(), Err(CryptoError::ZeroMultiplier));

        let params = CipherParameters::new(0, 1, 1, 256).unwrap();
        assert!(params.require_multiplier().is_ok());
    }

    #[test]
    fn test_step_wraps_before_modulus() {
        // 2^63 * 4 wraps to 0 in 64 bits, so the result is just the increment.
        let params = CipherParameters::new(0, 4, 9, 1000).unwrap();
        assert_eq!(params.step(1 << 63), 9);

        // u64::MAX + 2 wraps to 1.
        let params = CipherParameters::new(0, 1, 2, u64::MAX).unwrap();
        assert_eq!(params.step(u64::MAX), 1);
    }

    #[test]
    fn test_validate_struct_literal() {
        let params = CipherParameters {
            seed: 0,
            multiplier: 1,
            increment: 0,
            modulus: 0,
        };
        assert!(params.validate().is_err());
    }
}
