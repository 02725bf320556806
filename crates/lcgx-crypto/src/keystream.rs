//! Sequential LCG keystream generator.
//!
//! Each output byte depends on the previous state, so generation cannot be
//! split across threads. The pipeline runs a single producer that fills the
//! whole keystream before any XOR work starts.

use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;
use zeroize::Zeroize;

use crate::{CipherParameters, CryptoError};

/// Stateful LCG emitting one keystream byte per step.
///
/// The state is guarded by a mutex so the generator can be shared by
/// reference across threads; a fill holds the lock for its whole length.
#[derive(Debug)]
pub struct KeystreamGenerator {
    params: CipherParameters,
    state: Mutex<u64>,
}

impl KeystreamGenerator {
    /// Create a generator positioned at `params.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ZeroModulus`] if the modulus is zero.
    pub fn new(params: CipherParameters) -> Result<Self, CryptoError> {
        params.validate()?;
        Ok(Self {
            params,
            state: Mutex::new(params.seed),
        })
    }

    /// Parameters this generator was built from.
    #[must_use]
    pub fn params(&self) -> &CipherParameters {
        &self.params
    }

    /// Current internal state.
    #[must_use]
    pub fn state(&self) -> u64 {
        *self.lock()
    }

    /// Advance one step and return the low byte of the new state.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> u8 {
        let mut state = self.lock();
        self.advance(&mut state)
    }

    /// Fill `buf` with the next `buf.len()` keystream bytes, in order.
    pub fn generate(&self, buf: &mut [u8]) {
        let mut state = self.lock();
        for byte in buf.iter_mut() {
            *byte = self.advance(&mut state);
        }
        trace!(len = buf.len(), state = *state, "keystream filled");
    }

    /// Allocate and fill a keystream of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Allocation`] if the buffer cannot be reserved.
    pub fn keystream(&self, len: usize) -> Result<KeystreamBuffer, CryptoError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| CryptoError::Allocation { len })?;
        bytes.resize(len, 0);

        self.generate(&mut bytes);
        Ok(KeystreamBuffer(bytes))
    }

    #[inline]
    fn advance(&self, state: &mut u64) -> u8 {
        *state = self.params.step(*state);
        (*state & 0xFF) as u8
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        // A u64 cannot be left half-written, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owned keystream bytes, wiped when dropped.
pub struct KeystreamBuffer(Vec<u8>);

impl KeystreamBuffer {
    /// Keystream length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the keystream is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the keystream bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for KeystreamBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for KeystreamBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for KeystreamBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystreamBuffer")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl Drop for KeystreamBuffer {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
