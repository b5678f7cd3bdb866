//! Core domain types for Circuitry.
//!
//! This crate contains the circuit graph, gate kinds, annotations and resolved
//! settings. It does no IO and knows nothing about evaluation; everything here
//! can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod annotation;
mod circuit;
mod gate;
pub mod geometry;
mod ids;
mod settings;

pub use annotation::{
    Annotation, AnnotationShape, Border, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH,
    DEFAULT_DIAMETER, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR, TextStyle,
};
pub use circuit::{Circuit, CircuitError, Component, Connection, PinRef};
pub use gate::{DECODER_INPUTS, ENCODER_SIZES, GateKind, LOGIC_INPUTS, LogicOp, SELECT_BITS};
pub use ids::{AnnotationId, ComponentId};
pub use settings::{
    CircuitSettings, DEFAULT_CANVAS_SIZE, DEFAULT_CONFIRM_THRESHOLD, DEFAULT_EXPORT_CHUNK_ROWS,
    DEFAULT_GRID_SIZE, DEFAULT_HISTORY_LIMIT, DEFAULT_ROW_CACHE, DEFAULT_SIM_FPS, HistoryLimit,
    MAX_ROW_CACHE, MAX_SIM_FPS, MIN_ROW_CACHE, TableSettings, TickRate,
};
