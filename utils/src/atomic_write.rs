//! Atomic file write helpers.
//!
//! Uses a temp file + rename pattern. On Windows, rename-over-existing fails, so we
//! use a backup-and-restore fallback to avoid data loss when overwriting.
//!
//! [`PendingFile`] exposes the same pattern for streamed output: the caller
//! writes into a temp file next to the destination and either commits it or
//! drops it, in which case the temp file is removed.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSyncPolicy {
    SyncAll,
    SkipSync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentDirSyncPolicy {
    SyncBestEffort,
    SkipSync,
}

#[derive(Debug, Clone, Copy)]
pub struct AtomicWriteOptions {
    /// File sync policy for the temp file before persisting.
    pub file_sync: FileSyncPolicy,
    /// Parent directory sync policy after the file has been persisted.
    pub parent_dir_sync: ParentDirSyncPolicy,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            file_sync: FileSyncPolicy::SyncAll,
            parent_dir_sync: ParentDirSyncPolicy::SkipSync,
        }
    }
}

impl AtomicWriteOptions {
    /// No fsync at all. For bulk output such as exports and for tests.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            file_sync: FileSyncPolicy::SkipSync,
            parent_dir_sync: ParentDirSyncPolicy::SkipSync,
        }
    }
}

/// Recover from incomplete atomic writes by restoring `.bak` files.
///
/// If `path` does not exist but `path.bak` does, it means a crash occurred
/// during the backup-rename window in [`PendingFile::commit`]. Rename the
/// backup back to the canonical path so the caller can proceed.
pub fn recover_bak_file(path: &Path) {
    let backup = path.with_extension("bak");
    if !path.exists() && backup.exists() {
        match fs::rename(&backup, path) {
            Ok(()) => {
                tracing::warn!(
                    path = %path.display(),
                    "Recovered .bak file from interrupted atomic write"
                );
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "Failed to recover .bak file: {e}"
                );
            }
        }
    }
}

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with_options(path, bytes, AtomicWriteOptions::default())
}

pub fn atomic_write_with_options(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: AtomicWriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let mut pending = PendingFile::create_in(parent_of(path))?;
    pending.write_all(bytes)?;
    pending.commit(path, options)
}

/// A temp file in the destination directory that becomes `path` only on
/// [`commit`](Self::commit). Dropping it uncommitted deletes the temp file.
pub struct PendingFile {
    writer: BufWriter<NamedTempFile>,
    dir: PathBuf,
}

impl PendingFile {
    pub fn create_in(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let tmp = NamedTempFile::new_in(dir)?;
        debug!(path = %tmp.path().display(), "Opened pending file");
        Ok(Self {
            writer: BufWriter::new(tmp),
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the temp file while it is pending.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        self.writer.get_ref().path()
    }

    /// Flush and rename the temp file onto `path`.
    ///
    /// An existing file at `path` is replaced.
    pub fn commit(self, path: impl AsRef<Path>, options: AtomicWriteOptions) -> io::Result<()> {
        let path = path.as_ref();
        let tmp = self.writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        if matches!(options.file_sync, FileSyncPolicy::SyncAll) {
            tmp.as_file().sync_all()?;
        }

        // Persist (rename) - handle Windows where rename fails if target exists.
        if let Err(err) = tmp.persist(path) {
            if path.exists() {
                // Windows fallback: backup and restore.
                let backup_path = path.with_extension("bak");
                let _ = fs::remove_file(&backup_path);
                fs::rename(path, &backup_path)?;

                if let Err(rename_err) = err.file.persist(path) {
                    let _ = fs::rename(&backup_path, path);
                    return Err(rename_err.error);
                }
                if let Err(e) = fs::remove_file(&backup_path) {
                    tracing::warn!(
                        path = %backup_path.display(),
                        "Failed to remove .bak after atomic write: {e}"
                    );
                }
            } else {
                return Err(err.error);
            }
        }

        if matches!(options.parent_dir_sync, ParentDirSyncPolicy::SyncBestEffort) {
            best_effort_sync_parent_dir(&self.dir);
        }

        Ok(())
    }

    /// Remove the temp file now instead of on drop, reporting failures.
    pub fn discard(self) -> io::Result<()> {
        let tmp = self.writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        tmp.close()
    }
}

impl Write for PendingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn best_effort_sync_parent_dir(parent: &Path) {
    if let Err(e) = fs::File::open(parent).and_then(|d| d.sync_all()) {
        debug!(path = %parent.display(), "Parent directory sync_all failed (best-effort): {e}");
    }
}

#[cfg(not(unix))]
fn best_effort_sync_parent_dir(_parent: &Path) {}
