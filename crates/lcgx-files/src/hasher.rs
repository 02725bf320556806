//! BLAKE3 digests of transform output.
//!
//! Two runs with identical parameters over identical input produce the same
//! digest, which makes comparing large outputs cheap.

/// Output size above which the multi-threaded hasher is used (1 MiB).
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 1024 * 1024;

/// Hash a complete output buffer
#[must_use]
pub fn digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();

    #[cfg(feature = "rayon")]
    if data.len() >= PARALLEL_THRESHOLD {
        hasher.update_rayon(data);
        return *hasher.finalize().as_bytes();
    }

    hasher.update(data);
    *hasher.finalize().as_bytes()
}

/// Check `data` against an expected digest
#[must_use]
pub fn verify(data: &[u8], expected: &[u8; 32]) -> bool {
    digest(data) == *expected
}
