//! Per-OS directory resolution with local fallbacks.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory created under the user's documents folder.
pub const APP_DIR_NAME: &str = "Circuitry";
/// Local save root used when the documents folder is unavailable.
pub const FALLBACK_SAVE_DIR: &str = "save_files";
/// Subdirectory of the save root holding circuit files.
pub const CIRCUITS_SUBDIR: &str = "circuits";
/// Hidden per-user directory, under home or else the working directory.
pub const DOT_DIR: &str = ".circuitry";
pub const LOG_FILE_NAME: &str = "circuitry.log";

/// `~/.circuitry`, home of `config.toml` and the log directory.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DOT_DIR))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[must_use]
pub fn log_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Log files to try in order: `~/.circuitry/logs/circuitry.log`, then
/// `./.circuitry/logs/circuitry.log`.
#[must_use]
pub fn log_file_candidates() -> Vec<PathBuf> {
    log_file_candidates_from(log_dir())
}

fn log_file_candidates_from(home_logs: Option<PathBuf>) -> Vec<PathBuf> {
    let local = Path::new(DOT_DIR).join("logs");
    home_logs
        .into_iter()
        .chain([local])
        .map(|dir| dir.join(LOG_FILE_NAME))
        .collect()
}

/// Root directory for saved circuits.
///
/// Uses `preferred` when given, otherwise `<documents>/Circuitry`. When that
/// directory is unknown or cannot be created, falls back to `./save_files`.
#[must_use]
pub fn save_root(preferred: Option<&Path>) -> PathBuf {
    let preferred = preferred
        .map(Path::to_path_buf)
        .or_else(|| dirs::document_dir().map(|docs| docs.join(APP_DIR_NAME)));
    resolve_save_root(preferred, Path::new(FALLBACK_SAVE_DIR))
}

fn resolve_save_root(preferred: Option<PathBuf>, fallback: &Path) -> PathBuf {
    if let Some(dir) = preferred {
        match fs::create_dir_all(&dir) {
            Ok(()) => return dir,
            Err(e) => {
                tracing::warn!(
                    path = %dir.display(),
                    "Could not use save directory ({e}). Falling back to local '{}'.",
                    fallback.display()
                );
            }
        }
    } else {
        tracing::warn!(
            "No documents directory on this system. Falling back to local '{}'.",
            fallback.display()
        );
    }

    if let Err(e) = fs::create_dir_all(fallback) {
        tracing::warn!(path = %fallback.display(), "Failed to create fallback save directory: {e}");
    }
    fallback.to_path_buf()
}

/// Destination directory for exported truth tables.
///
/// Uses `preferred` when given, otherwise the downloads directory; falls back
/// to the system temp directory.
#[must_use]
pub fn export_dir(preferred: Option<&Path>) -> PathBuf {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(dirs::download_dir());
    resolve_export_dir(candidates)
}

fn resolve_export_dir(candidates: impl IntoIterator<Item = PathBuf>) -> PathBuf {
    for dir in candidates {
        if dir.is_dir() || fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
        tracing::warn!(path = %dir.display(), "Export directory unavailable, trying next");
    }
    env::temp_dir()
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use std::path::{Path, PathBuf};

    use super::{log_file_candidates_from, resolve_export_dir, resolve_save_root};

    #[test]
    fn save_root_uses_preferred_when_creatable() {
        let tmp = tempfile::tempdir().unwrap();
        let preferred = tmp.path().join("docs").join("Circuitry");
        let fallback = tmp.path().join("save_files");

        let root = resolve_save_root(Some(preferred.clone()), &fallback);

        assert_eq!(root, preferred);
        assert!(preferred.is_dir());
        assert!(!fallback.exists());
    }

    #[test]
    fn save_root_falls_back_when_preferred_is_blocked() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();
        let fallback = tmp.path().join("save_files");

        let root = resolve_save_root(Some(blocker.join("Circuitry")), &fallback);

        assert_eq!(root, fallback);
        assert!(fallback.is_dir());
    }

    #[test]
    fn save_root_falls_back_without_documents_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let fallback = tmp.path().join("save_files");
        assert_eq!(resolve_save_root(None, &fallback), fallback);
    }

    #[test]
    fn export_dir_skips_unusable_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let good = tmp.path().join("exports");

        let dir = resolve_export_dir([blocker.join("sub"), good.clone()]);
        assert_eq!(dir, good);

        assert_eq!(resolve_export_dir([blocker.join("sub")]), env::temp_dir());
    }

    #[test]
    fn log_candidates_prefer_home_then_working_dir() {
        let local = Path::new(".circuitry").join("logs").join("circuitry.log");
        assert_eq!(log_file_candidates_from(None), [local.clone()]);

        let home = PathBuf::from("/home/u/.circuitry/logs");
        assert_eq!(
            log_file_candidates_from(Some(home.clone())),
            [home.join("circuitry.log"), local]
        );
    }
}
