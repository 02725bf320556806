//! # lcgx Files
//!
//! File I/O for the lcgx transform.
//!
//! This crate provides:
//! - [`FileView`]: a read-only, size-checked memory map of the input file
//! - [`ResultWriter`]: an all-or-nothing writer for the output file
//! - BLAKE3 digests of transform output for quick comparison

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod hasher;
pub mod view;
pub mod writer;

pub use error::FileError;
pub use view::FileView;
pub use writer::ResultWriter;

/// Default upper bound on the input size (1 GiB).
///
/// The output buffer and the keystream are each as large as the input, so
/// this caps the memory a single run commits.
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 1024 * 1024 * 1024;
