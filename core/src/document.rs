//! YAML circuit documents.
//!
//! Saving writes every component, annotation and wire with a stable uid.
//! Loading is forgiving: entries that cannot be understood are logged and
//! skipped instead of failing the whole file, and missing fields fall back to
//! the defaults a freshly placed component would have.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

use circuitry_types::{
    Annotation, AnnotationId, AnnotationShape, Border, Circuit, CircuitSettings, Component,
    ComponentId, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH, DEFAULT_DIAMETER,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR, GateKind, PinRef, TextStyle,
};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid circuit YAML: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error("failed to encode circuit: {0}")]
    Emit(#[source] serde_yaml::Error),
}

/// Whether loading replaces the caller's canvas settings with the file's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplySettings {
    Yes,
    No,
}

/// Summary of what a load had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub skipped_components: usize,
    pub skipped_annotations: usize,
    pub skipped_connections: usize,
}

impl LoadReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped_components == 0
            && self.skipped_annotations == 0
            && self.skipped_connections == 0
    }
}

#[derive(Debug, Serialize)]
struct DocumentOut {
    gates: Vec<GateRecord>,
    annotations: Vec<AnnotationRecord>,
    connections: Vec<ConnectionRecord>,
    settings: SettingsRecord,
}

/// Top-level shape on load. Entries stay untyped so one bad entry does not
/// reject the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocumentIn {
    gates: Option<Vec<Value>>,
    annotations: Option<Vec<Value>>,
    connections: Option<Vec<Value>>,
    settings: Option<SettingsRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct GateRecord {
    class: String,
    uid: Option<String>,
    x: f64,
    y: f64,
    rotation: Option<f64>,
    num_inputs: Option<u32>,
    num_outputs: Option<u32>,
    select_bits: Option<u32>,
    state: Option<bool>,
    label: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct AnnotationRecord {
    class: String,
    uid: Option<String>,
    x: f64,
    y: f64,
    rotation: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_radius: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectionRecord {
    dest_gate: usize,
    dest_input: usize,
    src_gate: usize,
    src_output: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    waypoints: Vec<(f64, f64)>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct SettingsRecord {
    canvas_size: u32,
    grid_size: u32,
    sim_fps: u32,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        CircuitSettings::default().into()
    }
}

impl From<CircuitSettings> for SettingsRecord {
    fn from(settings: CircuitSettings) -> Self {
        Self {
            canvas_size: settings.canvas_size,
            grid_size: settings.grid_size,
            sim_fps: settings.sim_fps,
        }
    }
}

impl From<SettingsRecord> for CircuitSettings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            canvas_size: record.canvas_size,
            grid_size: record.grid_size,
            sim_fps: record.sim_fps,
        }
    }
}

/// Encode a circuit as a YAML document.
pub fn to_yaml(circuit: &Circuit) -> Result<String, DocumentError> {
    let doc = DocumentOut {
        gates: circuit.components().iter().map(gate_record).collect(),
        annotations: circuit.annotations().iter().map(annotation_record).collect(),
        connections: connection_records(circuit),
        settings: circuit.settings.into(),
    };
    serde_yaml::to_string(&doc).map_err(DocumentError::Emit)
}

/// Decode a YAML document.
///
/// Only a document that is not YAML at all (or whose top level has the wrong
/// shape) is an error. An empty document is an empty circuit.
pub fn from_yaml(
    text: &str,
    base: CircuitSettings,
    apply: ApplySettings,
) -> Result<(Circuit, LoadReport), DocumentError> {
    let doc: DocumentIn = if text.trim().is_empty() {
        DocumentIn::default()
    } else {
        serde_yaml::from_str::<Option<DocumentIn>>(text)
            .map_err(DocumentError::Parse)?
            .unwrap_or_default()
    };

    let mut circuit = Circuit::new();
    let mut report = LoadReport::default();
    circuit.settings = match (apply, doc.settings) {
        (ApplySettings::Yes, Some(record)) => record.into(),
        _ => base,
    };

    // Saved gate index -> id of the component it became.
    let gates = doc.gates.unwrap_or_default();
    let mut placed: Vec<Option<ComponentId>> = Vec::with_capacity(gates.len());
    for (index, value) in gates.into_iter().enumerate() {
        let inserted = serde_yaml::from_value::<GateRecord>(value)
            .map_err(|e| e.to_string())
            .and_then(component_from_record)
            .and_then(|c| circuit.insert_component(c).map_err(|e| e.to_string()));
        let id = match inserted {
            Ok(id) => Some(id),
            Err(reason) => {
                tracing::warn!(index, "Skipping component: {reason}");
                report.skipped_components += 1;
                None
            }
        };
        placed.push(id);
    }

    for (index, value) in doc.annotations.unwrap_or_default().into_iter().enumerate() {
        match serde_yaml::from_value::<AnnotationRecord>(value)
            .map_err(|e| e.to_string())
            .and_then(annotation_from_record)
        {
            Ok(annotation) => {
                circuit.insert_annotation(annotation);
            }
            Err(reason) => {
                tracing::warn!(index, "Skipping annotation: {reason}");
                report.skipped_annotations += 1;
            }
        }
    }

    for (index, value) in doc.connections.unwrap_or_default().into_iter().enumerate() {
        let result = serde_yaml::from_value::<ConnectionRecord>(value)
            .map_err(|e| e.to_string())
            .and_then(|record| {
                let src = endpoint(&placed, record.src_gate)?;
                let dst = endpoint(&placed, record.dest_gate)?;
                circuit
                    .connect_via(
                        PinRef::new(src, record.src_output),
                        PinRef::new(dst, record.dest_input),
                        record.waypoints,
                    )
                    .map_err(|e| e.to_string())
            });
        if let Err(reason) = result {
            tracing::warn!(index, "Skipping connection: {reason}");
            report.skipped_connections += 1;
        }
    }

    Ok((circuit, report))
}

fn endpoint(placed: &[Option<ComponentId>], gate: usize) -> Result<ComponentId, String> {
    match placed.get(gate) {
        Some(Some(id)) => Ok(*id),
        Some(None) => Err(format!("gate {gate} was skipped")),
        None => Err(format!("gate {gate} does not exist")),
    }
}

fn gate_record(component: &Component) -> GateRecord {
    let kind = component.kind;
    let count = |n: usize| (n > 0).then(|| u32::try_from(n).unwrap_or(u32::MAX));
    GateRecord {
        class: kind.class_name().to_owned(),
        uid: Some(component.id.to_string()),
        x: component.x,
        y: component.y,
        rotation: Some(component.rotation),
        num_inputs: count(kind.input_count()),
        num_outputs: count(kind.output_count()),
        select_bits: kind.select_bits().map(u32::from),
        state: kind.input_state(),
        label: component.label.clone(),
    }
}

fn component_from_record(record: GateRecord) -> Result<Component, String> {
    let default = GateKind::from_class_name(&record.class)
        .ok_or_else(|| format!("unknown class {:?}", record.class))?;

    let saved_size = match default {
        GateKind::Mux { .. } | GateKind::Demux { .. } => record.select_bits,
        GateKind::Logic { .. } | GateKind::Encoder { .. } | GateKind::Decoder { .. } => {
            record.num_inputs
        }
        GateKind::Not | GateKind::Input { .. } | GateKind::Led => None,
    };
    let mut kind = match saved_size {
        Some(size) => {
            let size = u8::try_from(size).unwrap_or(u8::MAX);
            let kind = default.with_size_clamped(size);
            if kind.size() != Some(size) {
                tracing::warn!(
                    class = %record.class,
                    saved = size,
                    "Gate size out of range; clamped to {kind}"
                );
            }
            kind
        }
        None => default,
    };
    if let (GateKind::Input { state }, Some(saved)) = (&mut kind, record.state) {
        *state = saved;
    }

    let mut component = Component::new(kind, record.x, record.y);
    component.rotation = record.rotation.unwrap_or(0.0);
    component.label = record.label;
    if let Some(uid) = record.uid.as_deref() {
        match uid.parse::<ComponentId>() {
            Ok(id) => component.id = id,
            Err(_) => tracing::warn!(uid, "Invalid component uid; assigning a new one"),
        }
    }
    Ok(component)
}

fn annotation_record(annotation: &Annotation) -> AnnotationRecord {
    let mut record = AnnotationRecord {
        class: annotation.shape.class_name().to_owned(),
        uid: Some(annotation.id.to_string()),
        x: annotation.x,
        y: annotation.y,
        rotation: Some(annotation.rotation),
        width: Some(annotation.width),
        height: Some(annotation.height),
        ..AnnotationRecord::default()
    };
    match &annotation.shape {
        AnnotationShape::Text(style) => {
            record.text = Some(style.text.clone());
            record.font_family = Some(style.font_family.clone());
            record.font_size = Some(style.font_size);
            record.font_bold = Some(style.bold);
            record.font_italic = Some(style.italic);
            record.text_color = Some(style.color.clone());
        }
        AnnotationShape::Rect { border, radius } => {
            record.border_width = Some(border.width);
            record.border_color = Some(border.color.clone());
            record.border_radius = Some(*radius);
        }
        AnnotationShape::Circle { border } => {
            record.diameter = annotation.diameter();
            record.border_width = Some(border.width);
            record.border_color = Some(border.color.clone());
        }
    }
    record
}

fn annotation_from_record(record: AnnotationRecord) -> Result<Annotation, String> {
    let border = || Border {
        width: record.border_width.unwrap_or(DEFAULT_BORDER_WIDTH),
        color: record
            .border_color
            .clone()
            .unwrap_or_else(|| DEFAULT_BORDER_COLOR.to_owned()),
    };
    let shape = match record.class.as_str() {
        "TextAnnotation" => AnnotationShape::Text(TextStyle {
            text: record.text.clone().unwrap_or_else(|| "Text".to_owned()),
            font_family: record
                .font_family
                .clone()
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_owned()),
            font_size: record.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            bold: record.font_bold.unwrap_or(false),
            italic: record.font_italic.unwrap_or(false),
            color: record
                .text_color
                .clone()
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_owned()),
        }),
        "RectangleAnnotation" => AnnotationShape::Rect {
            border: border(),
            radius: record.border_radius.unwrap_or(0),
        },
        "CircleAnnotation" => AnnotationShape::Circle { border: border() },
        other => return Err(format!("unknown class {other:?}")),
    };

    let mut annotation = Annotation::new(shape, record.x, record.y);
    annotation.rotation = record.rotation.unwrap_or(0.0);
    annotation.width = record.width.unwrap_or(annotation.width);
    annotation.height = record.height.unwrap_or(annotation.height);
    if annotation.diameter().is_some() {
        annotation.set_diameter(record.diameter.unwrap_or(DEFAULT_DIAMETER));
    }
    if let Some(uid) = record.uid.as_deref() {
        match uid.parse::<AnnotationId>() {
            Ok(id) => annotation.id = id,
            Err(_) => tracing::warn!(uid, "Invalid annotation uid; assigning a new one"),
        }
    }
    Ok(annotation)
}

/// Wires as saved-order gate indices.
fn connection_records(circuit: &Circuit) -> Vec<ConnectionRecord> {
    let mut records: Vec<ConnectionRecord> = circuit
        .connections()
        .iter()
        .filter_map(|conn| {
            Some(ConnectionRecord {
                dest_gate: circuit.index_of(conn.to.component)?,
                dest_input: conn.to.pin,
                src_gate: circuit.index_of(conn.from.component)?,
                src_output: conn.from.pin,
                waypoints: conn.waypoints.clone(),
            })
        })
        .collect();
    records.sort_by_key(|r| (r.dest_gate, r.dest_input));
    records
}
