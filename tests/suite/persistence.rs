//! Saving and loading circuit documents

use std::fs;

use circuitry_core::{CircuitStore, Overwrite, Settle, Simulator, StoreError};
use circuitry_types::{AnnotationShape, PinRef};

use crate::common::half_adder;

const HAND_WRITTEN: &str = "
gates:
- class: InputSwitch
  uid: 0b0e3c47-3f7e-4c1e-9a55-5c1f0a8f5d01
  x: 100
  y: 100
  rotation: 0
  num_inputs: null
  num_outputs: 1
  select_bits: null
  state: false
  label: IN1
- class: Teleporter
  x: 0
  y: 0
- class: NOTGate
  uid: 5d7c1d0e-2a44-4b8f-8f0e-7b7f6c1e2a10
  x: 200
  y: 100
  rotation: 90.0
  num_inputs: 1
  num_outputs: 1
  select_bits: null
  state: null
  label: null
- class: OutputLED
  x: 300
  y: 100
  rotation: 0
  label: OUT
annotations:
- class: RectangleAnnotation
  uid: 9a3f0d55-0c1b-4f0e-b8a2-1e6f5d4c3b2a
  x: 50
  y: 50
  rotation: 0
  width: 300
  height: 120
  border_width: 3
  border_color: '#FF0000'
  border_radius: 8
connections:
- dest_gate: 2
  dest_input: 0
  src_gate: 0
  src_output: 0
  waypoints:
  - [150, 100]
- dest_gate: 3
  dest_input: 0
  src_gate: 2
  src_output: 0
settings:
  canvas_size: 5000
  grid_size: 25
  sim_fps: 30
";

#[test]
fn saved_circuits_reload_identically() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CircuitStore::new(tmp.path());
    let fixture = half_adder();

    let path = store
        .save("half adder", &fixture.circuit, Overwrite::Deny)
        .unwrap();
    assert_eq!(path, tmp.path().join("circuits").join("half adder.yaml"));

    let loaded = store.load("half adder").unwrap();
    assert!(loaded.report.is_clean());
    assert_eq!(loaded.circuit, fixture.circuit);
}

#[test]
fn hand_written_documents_load_gracefully() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CircuitStore::new(tmp.path());
    fs::create_dir_all(store.circuits_dir()).unwrap();
    fs::write(store.circuits_dir().join("inverter.yaml"), HAND_WRITTEN).unwrap();

    let loaded = store.load("inverter").unwrap();
    assert_eq!(loaded.report.skipped_components, 1);
    assert_eq!(loaded.report.skipped_connections, 0);

    let circuit = &loaded.circuit;
    assert_eq!(circuit.components().len(), 3);
    assert_eq!(circuit.settings.grid_size, 25);
    assert_eq!(circuit.settings.sim_fps, 30);

    let sw = circuit.find_by_label("IN1").unwrap().id;
    let led = circuit.find_by_label("OUT").unwrap().id;
    let not = circuit.components()[1].id;
    assert_eq!(not.to_string(), "5d7c1d0e-2a44-4b8f-8f0e-7b7f6c1e2a10");
    assert_eq!(circuit.components()[1].rotation, 90.0);
    assert_eq!(circuit.driver_of(PinRef::new(not, 0)), Some(PinRef::new(sw, 0)));
    assert_eq!(circuit.connections()[0].waypoints, [(150.0, 100.0)]);

    match &circuit.annotations()[0].shape {
        AnnotationShape::Rect { border, radius } => {
            assert_eq!(border.width, 3);
            assert_eq!(border.color, "#FF0000");
            assert_eq!(*radius, 8);
        }
        other => panic!("expected a rectangle, got {other:?}"),
    }

    let mut sim = Simulator::new(circuit);
    assert!(matches!(sim.settle(10), Settle::Stable { .. }));
    assert_eq!(sim.led(led), Some(true));
}

#[test]
fn interrupted_save_is_recovered_from_backup() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CircuitStore::new(tmp.path());
    let fixture = half_adder();
    let path = store.save("adder", &fixture.circuit, Overwrite::Deny).unwrap();
    fs::rename(&path, path.with_extension("bak")).unwrap();

    let loaded = store.load("adder").unwrap();
    assert_eq!(loaded.circuit, fixture.circuit);
    assert!(path.exists());
}

#[test]
fn broken_files_are_errors_not_panics() {
    let tmp = tempfile::tempdir().unwrap();
    let store = CircuitStore::new(tmp.path());
    fs::create_dir_all(store.circuits_dir()).unwrap();
    fs::write(store.circuits_dir().join("bad.yaml"), "gates: [unterminated").unwrap();

    assert!(matches!(
        store.load("bad").unwrap_err(),
        StoreError::Document { .. }
    ));
}
