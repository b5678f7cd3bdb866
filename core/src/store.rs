//! Named circuits on disk.
//!
//! Circuits live as `<root>/circuits/<name>.yaml`. Writes go through
//! [`circuitry_utils::atomic_write`], so a crash mid-save leaves either the old
//! file or the new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use circuitry_config::{CIRCUITS_SUBDIR, Settings};
use circuitry_types::{Circuit, CircuitSettings};
use circuitry_utils::{atomic_write, recover_bak_file};
use thiserror::Error;

use crate::document::{self, ApplySettings, DocumentError, LoadReport};

pub const EXTENSION: &str = "yaml";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error("circuit '{0}' already exists")]
    AlreadyExists(String),
    #[error("no saved circuit at {0}")]
    NotFound(PathBuf),
    #[error("invalid circuit name {0:?}")]
    InvalidName(String),
    #[error("circuit has never been saved; choose a name")]
    Unnamed,
}

/// What to do when saving over an existing circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Deny,
    Allow,
}

#[derive(Debug)]
pub struct Loaded {
    pub circuit: Circuit,
    pub path: PathBuf,
    pub report: LoadReport,
}

#[derive(Debug, Clone)]
pub struct CircuitStore {
    root: PathBuf,
}

impl CircuitStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the configured save directory.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.save_root())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn circuits_dir(&self) -> PathBuf {
        self.root.join(CIRCUITS_SUBDIR)
    }

    /// Saved circuit names, sorted. An absent directory lists as empty.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.circuits_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Path for a circuit name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let name = name.trim();
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.chars().any(char::is_control);
        if !valid {
            return Err(StoreError::InvalidName(name.to_owned()));
        }
        let file = name
            .strip_suffix(".yaml")
            .map_or_else(|| format!("{name}.{EXTENSION}"), |_| name.to_owned());
        Ok(self.circuits_dir().join(file))
    }

    /// Accept either a saved circuit name or a path to a YAML file.
    pub fn resolve(&self, name_or_path: &str) -> Result<PathBuf, StoreError> {
        let as_path = Path::new(name_or_path);
        if as_path.components().count() > 1 || as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }
        self.path_for(name_or_path)
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.is_file())
    }

    /// Save under `name`. Returns the written path.
    pub fn save(
        &self,
        name: &str,
        circuit: &Circuit,
        overwrite: Overwrite,
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        if overwrite == Overwrite::Deny && path.exists() {
            return Err(StoreError::AlreadyExists(name.trim().to_owned()));
        }
        write_circuit(&path, circuit)?;
        Ok(path)
    }

    /// Load by name or path. The file's own canvas settings are applied.
    pub fn load(&self, name_or_path: &str) -> Result<Loaded, StoreError> {
        let path = self.resolve(name_or_path)?;
        read_circuit(&path, CircuitSettings::default(), ApplySettings::Yes)
    }
}

/// Write `circuit` to `path` atomically, creating parent directories.
pub fn write_circuit(path: &Path, circuit: &Circuit) -> Result<(), StoreError> {
    let yaml = document::to_yaml(circuit).map_err(|source| StoreError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    atomic_write(path, yaml.as_bytes()).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Saved circuit");
    Ok(())
}

pub fn read_circuit(
    path: &Path,
    base: CircuitSettings,
    apply: ApplySettings,
) -> Result<Loaded, StoreError> {
    recover_bak_file(path);
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let (circuit, report) =
        document::from_yaml(&text, base, apply).map_err(|source| StoreError::Document {
            path: path.to_path_buf(),
            source,
        })?;
    if !report.is_clean() {
        tracing::warn!(
            path = %path.display(),
            components = report.skipped_components,
            annotations = report.skipped_annotations,
            connections = report.skipped_connections,
            "Loaded circuit with skipped entries"
        );
    }
    Ok(Loaded {
        circuit,
        path: path.to_path_buf(),
        report,
    })
}
