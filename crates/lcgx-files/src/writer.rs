//! All-or-nothing output writer.
//!
//! The buffer is written to a hidden sibling of the destination, synced, and
//! renamed into place. A failure at any step removes the sibling, so the
//! destination either holds the complete output or is left untouched.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::FileError;

/// Per-process sequence for temporary file names
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sequential writer that persists a completed output buffer.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    dest: PathBuf,
}

impl ResultWriter {
    /// Create a writer targeting `dest`.
    pub fn new<P: AsRef<Path>>(dest: P) -> Self {
        Self {
            dest: dest.as_ref().to_path_buf(),
        }
    }

    /// Destination path
    #[must_use]
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Write all of `data` to the destination and return the byte count.
    ///
    /// Success means every byte was written, flushed, and synced before the
    /// rename made it visible at the destination path.
    ///
    /// # Errors
    ///
    /// - [`FileError::Create`] if the temporary file cannot be created
    /// - [`FileError::Write`] if the write fails or is short
    /// - [`FileError::Sync`] if the data cannot be synced
    /// - [`FileError::Persist`] if the rename fails
    pub fn write_all(&self, data: &[u8]) -> Result<u64, FileError> {
        let tmp = self.temp_path();
        debug!("writing {} bytes via {}", data.len(), tmp.display());

        let result = self.write_temp(&tmp, data).and_then(|()| {
            fs::rename(&tmp, &self.dest).map_err(|source| FileError::Persist {
                path: self.dest.clone(),
                source,
            })
        });

        if result.is_err() {
            if let Err(e) = fs::remove_file(&tmp) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("failed to remove temporary file {}: {}", tmp.display(), e);
                }
            }
        }

        result.map(|()| data.len() as u64)
    }

    fn write_temp(&self, tmp: &Path, data: &[u8]) -> Result<(), FileError> {
        let mut file: File = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(tmp)
            .map_err(|source| FileError::Create {
                path: tmp.to_path_buf(),
                source,
            })?;

        let write_err = |source| FileError::Write {
            path: self.dest.clone(),
            source,
        };

        // write_all reports WriteZero on a short write.
        file.write_all(data).map_err(write_err)?;
        file.flush().map_err(write_err)?;

        file.sync_all().map_err(|source| FileError::Sync {
            path: self.dest.clone(),
            source,
        })
    }

    /// Hidden sibling of the destination, unique per call.
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = OsString::from(".");
        name.push(self.dest.file_name().unwrap_or_else(|| OsStr::new("output")));
        name.push(format!(".lcgx-{}-{}.tmp", std::process::id(), seq));
        self.dest.with_file_name(name)
    }
}
