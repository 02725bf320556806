//! Keystream error types.

use thiserror::Error;

/// Keystream configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Modulus of zero leaves the recurrence undefined
    #[error("modulus must be non-zero")]
    ZeroModulus,

    /// Multiplier of zero was rejected by a caller that requires a non-degenerate sequence
    #[error("multiplier must be non-zero")]
    ZeroMultiplier,

    /// Keystream buffer could not be allocated
    #[error("cannot allocate keystream buffer of {len} bytes")]
    Allocation {
        /// Requested length
        len: usize,
    },
}
