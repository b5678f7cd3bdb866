//! Resolved settings shared across crates.
//!
//! Raw config structs (with `Option` fields) stay private in
//! `circuitry-config`; the loader resolves them into these types at the parse
//! boundary, so a value of one of these types is always in range.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_SIZE: u32 = 10_000;
pub const DEFAULT_GRID_SIZE: u32 = 20;
pub const DEFAULT_SIM_FPS: u32 = 60;
pub const MAX_SIM_FPS: u32 = 240;

/// Per-circuit settings stored in the circuit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSettings {
    pub canvas_size: u32,
    pub grid_size: u32,
    pub sim_fps: u32,
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            grid_size: DEFAULT_GRID_SIZE,
            sim_fps: DEFAULT_SIM_FPS,
        }
    }
}

impl CircuitSettings {
    /// Simulation rate for this circuit, clamped to a usable range.
    #[must_use]
    pub fn tick_rate(&self) -> TickRate {
        TickRate::new(self.sim_fps)
    }
}

/// Simulation ticks per second, in `1..=MAX_SIM_FPS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate(u32);

impl TickRate {
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self(fps.clamp(1, MAX_SIM_FPS))
    }

    #[must_use]
    pub const fn fps(self) -> u32 {
        self.0
    }

    /// Frame interval in whole milliseconds (`1000 / fps`).
    #[must_use]
    pub const fn interval_ms(self) -> u64 {
        1000 / self.0 as u64
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self(DEFAULT_SIM_FPS)
    }
}

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Maximum number of undo snapshots kept. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimit(usize);

impl HistoryLimit {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self(limit.max(1))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for HistoryLimit {
    fn default() -> Self {
        Self(DEFAULT_HISTORY_LIMIT)
    }
}

pub const DEFAULT_ROW_CACHE: usize = 256;
pub const MIN_ROW_CACHE: usize = 16;
pub const MAX_ROW_CACHE: usize = 65_536;
pub const DEFAULT_CONFIRM_THRESHOLD: usize = 16;
pub const DEFAULT_EXPORT_CHUNK_ROWS: usize = 4096;

/// Truth-table behaviour: row cache size, the input count above which the
/// caller should ask before enumerating, and export chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSettings {
    cache_size: usize,
    confirm_threshold: usize,
    export_chunk_rows: usize,
}

impl TableSettings {
    #[must_use]
    pub fn new(cache_size: usize, confirm_threshold: usize, export_chunk_rows: usize) -> Self {
        Self {
            cache_size: cache_size.clamp(MIN_ROW_CACHE, MAX_ROW_CACHE),
            confirm_threshold,
            export_chunk_rows: export_chunk_rows.max(1),
        }
    }

    #[must_use]
    pub const fn cache_size(&self) -> usize {
        self.cache_size
    }

    #[must_use]
    pub const fn confirm_threshold(&self) -> usize {
        self.confirm_threshold
    }

    #[must_use]
    pub const fn export_chunk_rows(&self) -> usize {
        self.export_chunk_rows
    }
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_ROW_CACHE,
            confirm_threshold: DEFAULT_CONFIRM_THRESHOLD,
            export_chunk_rows: DEFAULT_EXPORT_CHUNK_ROWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryLimit, TableSettings, TickRate};

    #[test]
    fn tick_rate_interval() {
        assert_eq!(TickRate::new(60).interval_ms(), 16);
        assert_eq!(TickRate::new(0).fps(), 1);
        assert_eq!(TickRate::new(10_000).fps(), 240);
    }

    #[test]
    fn history_limit_never_zero() {
        assert_eq!(HistoryLimit::new(0).get(), 1);
    }

    #[test]
    fn table_settings_are_clamped() {
        let settings = TableSettings::new(1, 20, 0);
        assert_eq!(settings.cache_size(), 16);
        assert_eq!(settings.confirm_threshold(), 20);
        assert_eq!(settings.export_chunk_rows(), 1);
        assert_eq!(TableSettings::new(usize::MAX, 16, 1).cache_size(), 65_536);
    }
}
