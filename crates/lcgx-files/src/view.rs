//! Read-only memory-mapped view of the input file.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use crate::FileError;

/// Immutable, fixed-length byte view of an input file.
///
/// The view is backed by a private read-only mapping sized to the file's
/// length at open time. Nothing in lcgx writes through it.
pub struct FileView {
    path: PathBuf,
    map: Mmap,
}

impl FileView {
    /// Open and map `path`, enforcing `1 <= size <= max_size`.
    ///
    /// The size checks run before the mapping is created, so a rejected file
    /// never commits any memory.
    ///
    /// # Errors
    ///
    /// - [`FileError::Open`] / [`FileError::Metadata`] if the file cannot be
    ///   opened or statted
    /// - [`FileError::Empty`] if the file has no bytes
    /// - [`FileError::TooLarge`] if the file exceeds `max_size`
    /// - [`FileError::Map`] if the mapping fails
    ///
    /// # Examples
    /// ```no_run
    /// use lcgx_files::{DEFAULT_MAX_INPUT_SIZE, FileView};
    ///
    /// let view = FileView::open("input.bin", DEFAULT_MAX_INPUT_SIZE).unwrap();
    /// println!("{} bytes", view.len());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, max_size: u64) -> Result<Self, FileError> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|source| FileError::Open {
            path: path.clone(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| FileError::Metadata {
                path: path.clone(),
                source,
            })?
            .len();

        let len = check_size(&path, size, max_size)?;

        // SAFETY: the mapping is read-only and private. Concurrent truncation
        // of the file by another process is outside what lcgx guards against.
        let map = unsafe { MmapOptions::new().len(len).map_copy_read_only(&file) }.map_err(
            |source| FileError::Map {
                path: path.clone(),
                source,
            },
        )?;

        #[cfg(unix)]
        if let Err(e) = map.advise(memmap2::Advice::Sequential) {
            debug!("madvise(SEQUENTIAL) failed for {}: {}", path.display(), e);
        }

        debug!("mapped {} ({} bytes)", path.display(), len);

        Ok(Self { path, map })
    }

    /// Mapped bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.map
    }

    /// Length in bytes (always at least 1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Always false; empty files are rejected at open time.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Path the view was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<[u8]> for FileView {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for FileView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileView")
            .field("path", &self.path)
            .field("len", &self.map.len())
            .finish()
    }
}

/// Validate a file size against `[1, max_size]` and the address space.
fn check_size(path: &Path, size: u64, max_size: u64) -> Result<usize, FileError> {
    if size == 0 {
        return Err(FileError::Empty {
            path: path.to_path_buf(),
        });
    }

    let too_large = || FileError::TooLarge {
        path: path.to_path_buf(),
        size,
        limit: max_size,
    };

    if size > max_size {
        return Err(too_large());
    }

    usize::try_from(size).map_err(|_| too_large())
}
