//! # lcgx Crypto
//!
//! Keystream generation for the lcgx XOR transform.
//!
//! This crate provides:
//! - [`CipherParameters`] describing a linear congruential generator
//! - [`KeystreamGenerator`], a sequential byte-per-step LCG
//! - [`KeystreamBuffer`], an owned keystream that is wiped on drop
//!
//! ## Recurrence
//!
//! | Step | Formula |
//! |------|---------|
//! | State update | `state = (multiplier * state + increment) mod modulus` |
//! | Output byte | `state & 0xFF` |
//!
//! Multiplication and addition wrap at 64 bits before the modulus is applied.
//!
//! The generator is a short-period, fully predictable sequence. It is a
//! reversible obfuscation primitive, not a CSPRNG.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod keystream;
pub mod params;

pub use error::CryptoError;
pub use keystream::{KeystreamBuffer, KeystreamGenerator};
pub use params::CipherParameters;

/// XOR `input` with `keystream` into `output`.
///
/// All three slices must have the same length; only the common prefix is
/// processed otherwise.
#[inline]
pub fn xor_into(output: &mut [u8], input: &[u8], keystream: &[u8]) {
    debug_assert_eq!(output.len(), input.len());
    debug_assert_eq!(output.len(), keystream.len());

    for ((out, &a), &b) in output.iter_mut().zip(input).zip(keystream) {
        *out = a ^ b;
    }
}
