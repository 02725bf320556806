//! File error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Input and output file errors
#[derive(Debug, Error)]
pub enum FileError {
    /// Input file could not be opened
    #[error("cannot open input file {}: {source}", path.display())]
    Open {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Input file size could not be determined
    #[error("cannot get size of {}: {source}", path.display())]
    Metadata {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Input file is empty
    #[error("input file {} is empty", path.display())]
    Empty {
        /// Input path
        path: PathBuf,
    },

    /// Input file exceeds the configured maximum
    #[error("input file {} is too large: {size} bytes exceeds limit of {limit} bytes", path.display())]
    TooLarge {
        /// Input path
        path: PathBuf,
        /// Actual size
        size: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Memory mapping failed
    #[error("cannot map {}: {source}", path.display())]
    Map {
        /// Input path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Output file could not be created
    #[error("cannot open output file {}: {source}", path.display())]
    Create {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Output write failed or was short
    #[error("failed to write output file {}: {source}", path.display())]
    Write {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Output could not be flushed to stable storage
    #[error("failed to sync output file {}: {source}", path.display())]
    Sync {
        /// Path being synced
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Completed output could not be moved into place
    #[error("failed to move output into {}: {source}", path.display())]
    Persist {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl FileError {
    /// Whether this error is a size-limit violation rather than an I/O failure.
    #[must_use]
    pub fn is_size_error(&self) -> bool {
        matches!(self, Self::Empty { .. } | Self::TooLarge { .. })
    }
}
