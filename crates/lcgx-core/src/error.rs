//! Error types for the lcgx pipeline.

use std::io;

use lcgx_crypto::CryptoError;
use lcgx_files::FileError;
use thiserror::Error;

use crate::pool::PoolError;

/// Failure category of a run.
///
/// Every error is terminal; the category only decides how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing, zero, or otherwise invalid parameter
    Config,
    /// Open, stat, map, read, write, sync, or rename failure
    Io,
    /// Empty input or input above the size limit
    Size,
    /// Allocation, thread, or barrier failure
    Resource,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Config => "config",
            Self::Io => "io",
            Self::Size => "size",
            Self::Resource => "resource",
        })
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cipher parameters or keystream allocation failure
    #[error("{0}")]
    Crypto(#[from] CryptoError),

    /// Input or output file error
    #[error("{0}")]
    File(#[from] FileError),

    /// Worker pool error
    #[error("{0}")]
    Pool(#[from] PoolError),

    /// Keystream producer thread could not be spawned
    #[error("failed to start keystream producer: {0}")]
    ProducerStart(#[source] io::Error),

    /// Keystream producer thread panicked
    #[error("keystream producer panicked")]
    ProducerPanicked,

    /// Output buffer could not be allocated
    #[error("cannot allocate output buffer of {len} bytes")]
    OutputAllocation {
        /// Requested length
        len: usize,
    },

    /// Invalid run configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Crypto(CryptoError::Allocation { .. }) => ErrorKind::Resource,
            Self::Crypto(_) | Self::InvalidConfig(_) => ErrorKind::Config,
            Self::File(e) if e.is_size_error() => ErrorKind::Size,
            Self::File(_) => ErrorKind::Io,
            Self::Pool(PoolError::LengthMismatch { .. }) => ErrorKind::Config,
            Self::Pool(_)
            | Self::ProducerStart(_)
            | Self::ProducerPanicked
            | Self::OutputAllocation { .. } => ErrorKind::Resource,
        }
    }

    /// Pipeline stage the error belongs to, for one-line diagnostics.
    ///
    /// Display output does not repeat the stage.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) | Self::Crypto(CryptoError::ZeroModulus | CryptoError::ZeroMultiplier) => {
                "parameters"
            }
            Self::Crypto(CryptoError::Allocation { .. })
            | Self::ProducerStart(_)
            | Self::ProducerPanicked => "keystream",
            Self::File(
                FileError::Open { .. }
                | FileError::Metadata { .. }
                | FileError::Empty { .. }
                | FileError::TooLarge { .. }
                | FileError::Map { .. },
            ) => "input",
            Self::File(_) => "output",
            Self::Pool(_) | Self::OutputAllocation { .. } => "workers",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrier::BarrierError;
    use std::path::PathBuf;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::from(CryptoError::ZeroModulus).kind(), ErrorKind::Config);
        assert_eq!(
            Error::from(CryptoError::Allocation { len: 1 }).kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            Error::from(FileError::Empty {
                path: PathBuf::from("a")
            })
            .kind(),
            ErrorKind::Size
        );
        assert_eq!(
            Error::from(FileError::Open {
                path: PathBuf::from("a"),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
            .kind(),
            ErrorKind::Io
        );
        assert_eq!(
            Error::from(PoolError::Barrier(BarrierError::Aborted)).kind(),
            ErrorKind::Resource
        );
        assert_eq!(Error::ProducerPanicked.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Error::from(CryptoError::ZeroModulus).stage(), "parameters");
        assert_eq!(
            Error::from(FileError::TooLarge {
                path: PathBuf::from("a"),
                size: 2,
                limit: 1,
            })
            .stage(),
            "input"
        );
        assert_eq!(
            Error::from(FileError::Write {
                path: PathBuf::from("b"),
                source: io::Error::from(io::ErrorKind::WriteZero),
            })
            .stage(),
            "output"
        );
        assert_eq!(
            Error::from(PoolError::WorkerPanicked { worker: 3 }).stage(),
            "workers"
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Size.to_string(), "size");
        assert_eq!(ErrorKind::Resource.to_string(), "resource");
    }
}
