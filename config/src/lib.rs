//! Configuration loading, parsing, and persistence for Circuitry.
//!
//! `~/.circuitry/config.toml` is optional. Raw structs mirror the file with
//! `Option` fields and are resolved into the validated settings types from
//! `circuitry-types`; out-of-range values are clamped and logged.

mod paths;

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use circuitry_types::{
    HistoryLimit, MAX_ROW_CACHE, MAX_SIM_FPS, MIN_ROW_CACHE, TableSettings, TickRate,
};
use serde::Deserialize;
use thiserror::Error;

pub use paths::{
    APP_DIR_NAME, CIRCUITS_SUBDIR, DOT_DIR, FALLBACK_SAVE_DIR, LOG_FILE_NAME, config_dir,
    config_path, export_dir, log_dir, log_file_candidates, save_root,
};

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    storage: Option<StorageConfig>,
    history: Option<HistoryConfig>,
    truth_table: Option<TruthTableConfig>,
    simulation: Option<SimulationConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageConfig {
    save_dir: Option<String>,
    export_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryConfig {
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct TruthTableConfig {
    cache_size: Option<usize>,
    confirm_threshold: Option<usize>,
    export_chunk_rows: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct SimulationConfig {
    fps: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to edit config at {}: {source}", path.display())]
    Edit {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("failed to write config at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("could not determine config path")]
    NoConfigPath,
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Edit { path, .. }
            | ConfigError::Write { path, .. } => Some(path),
            ConfigError::NoConfigPath => None,
        }
    }
}

/// Directory overrides from `[storage]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageSettings {
    pub save_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

/// Fully resolved application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub storage: StorageSettings,
    pub history: HistoryLimit,
    pub table: TableSettings,
    pub tick_rate: TickRate,
}

impl Settings {
    /// Load from the default config path.
    ///
    /// Never fails: a missing file yields defaults, and read or parse errors
    /// are logged and ignored.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Load from an explicit path. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(Self::resolve(raw))
    }

    fn resolve(raw: RawConfig) -> Self {
        let storage = raw.storage.unwrap_or_default();
        let history = raw.history.unwrap_or_default();
        let table = raw.truth_table.unwrap_or_default();
        let simulation = raw.simulation.unwrap_or_default();
        let defaults = TableSettings::default();

        if let Some(limit) = history.limit
            && limit == 0
        {
            tracing::warn!("history.limit must be at least 1; using 1");
        }
        if let Some(size) = table.cache_size
            && !(MIN_ROW_CACHE..=MAX_ROW_CACHE).contains(&size)
        {
            tracing::warn!(
                "truth_table.cache_size {size} clamped to {MIN_ROW_CACHE}..={MAX_ROW_CACHE}"
            );
        }
        if let Some(fps) = simulation.fps
            && !(1..=MAX_SIM_FPS).contains(&fps)
        {
            tracing::warn!("simulation.fps {fps} clamped to 1..={MAX_SIM_FPS}");
        }

        Self {
            storage: StorageSettings {
                save_dir: storage.save_dir.as_deref().map(expand_path),
                export_dir: storage.export_dir.as_deref().map(expand_path),
            },
            history: history
                .limit
                .map_or_else(HistoryLimit::default, HistoryLimit::new),
            table: TableSettings::new(
                table.cache_size.unwrap_or(defaults.cache_size()),
                table
                    .confirm_threshold
                    .unwrap_or(defaults.confirm_threshold()),
                table
                    .export_chunk_rows
                    .unwrap_or(defaults.export_chunk_rows()),
            ),
            tick_rate: simulation
                .fps
                .map_or_else(TickRate::default, TickRate::new),
        }
    }

    /// Save root with the configured override applied.
    #[must_use]
    pub fn save_root(&self) -> PathBuf {
        save_root(self.storage.save_dir.as_deref())
    }

    /// Export directory with the configured override applied.
    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        export_dir(self.storage.export_dir.as_deref())
    }
}

/// Expand `${VAR}` references and a leading `~/` in a configured path.
fn expand_path(value: &str) -> PathBuf {
    let expanded = expand_env_vars(value);
    if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

/// Replace `${VAR}` with the variable's value (empty when unset).
///
/// An unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

/// Persist the global history limit to the default config file.
///
/// Uses `toml_edit` to preserve comments and formatting.
/// Creates the config file and parent directory if they don't exist.
pub fn persist_history_limit(limit: HistoryLimit) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigPath)?;
    persist_history_limit_at(&path, limit)
}

pub fn persist_history_limit_at(path: &Path, limit: HistoryLimit) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|source| ConfigError::Edit {
            path: path.to_path_buf(),
            source,
        })?;

    if !doc.contains_key("history") {
        doc["history"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["history"]["limit"] = toml_edit::value(i64::try_from(limit.get()).unwrap_or(i64::MAX));

    circuitry_utils::atomic_write(path, doc.to_string().as_bytes()).map_err(write_err)?;
    tracing::info!(path = %path.display(), limit = limit.get(), "Saved history limit");
    Ok(())
}
