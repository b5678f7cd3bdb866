//! Core domain logic for Circuitry.
//!
//! This crate turns the plain circuit graph from `circuitry-types` into
//! something that runs and persists: gate evaluation, the tick simulator,
//! truth-table enumeration and export, YAML documents, the on-disk circuit
//! store, and undo/redo history.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod document;
pub mod export;
mod gates;
pub mod history;
pub mod netlist;
pub mod session;
pub mod simulator;
pub mod store;
pub mod table_view;
pub mod truth_table;

pub use document::{ApplySettings, DocumentError, LoadReport, from_yaml, to_yaml};
pub use export::{
    CancelToken, ExportError, ExportOutcome, Progress, default_file_name, export_csv,
    export_csv_file, to_csv_string,
};
pub use gates::evaluate;
pub use history::History;
pub use netlist::{Netlist, Topology};
pub use session::Session;
pub use simulator::{Settle, Simulator, TickClock};
pub use store::{CircuitStore, Loaded, Overwrite, StoreError};
pub use table_view::VirtualTable;
pub use truth_table::{
    Column, MAX_INPUTS, Row, Rows, TruthTable, TruthTableError, collect_influencing_inputs,
};
