//! Shared infrastructure utilities for Circuitry.
//!
//! This crate provides cross-cutting utilities that multiple Circuitry crates need
//! but that don't belong in the domain-pure `circuitry-types` crate:
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename), including
//!   a streaming [`PendingFile`] that is discarded unless committed

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, PendingFile, atomic_write,
    atomic_write_with_options, recover_bak_file,
};
