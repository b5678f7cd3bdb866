//! Shared test utilities and fixtures
//!
//! Circuits used across the integration suite, plus a helper for running the
//! `circuitry` binary against a throwaway home and save directory.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use circuitry_types::{Circuit, ComponentId, GateKind, LogicOp, PinRef};

pub struct HalfAdder {
    pub circuit: Circuit,
    pub a: ComponentId,
    pub b: ComponentId,
    pub sum: ComponentId,
    pub carry: ComponentId,
}

/// A, B -> XOR -> LED "S"; A, B -> AND -> LED "C".
pub fn half_adder() -> HalfAdder {
    let mut circuit = Circuit::new();
    let a = circuit.add_component(GateKind::input(), 0.0, 0.0).unwrap();
    let b = circuit.add_component(GateKind::input(), 0.0, 60.0).unwrap();
    let xor = circuit
        .add_component(GateKind::logic(LogicOp::Xor, 2).unwrap(), 100.0, 0.0)
        .unwrap();
    let and = circuit
        .add_component(GateKind::logic(LogicOp::And, 2).unwrap(), 100.0, 60.0)
        .unwrap();
    let sum = circuit.add_component(GateKind::Led, 200.0, 0.0).unwrap();
    let carry = circuit.add_component(GateKind::Led, 200.0, 60.0).unwrap();

    circuit.set_label(a, Some("A".into())).unwrap();
    circuit.set_label(b, Some("B".into())).unwrap();
    circuit.set_label(sum, Some("S".into())).unwrap();
    circuit.set_label(carry, Some("C".into())).unwrap();

    for gate in [xor, and] {
        circuit.connect(PinRef::new(a, 0), PinRef::new(gate, 0)).unwrap();
        circuit.connect(PinRef::new(b, 0), PinRef::new(gate, 1)).unwrap();
    }
    circuit.connect(PinRef::new(xor, 0), PinRef::new(sum, 0)).unwrap();
    circuit.connect(PinRef::new(and, 0), PinRef::new(carry, 0)).unwrap();

    HalfAdder {
        circuit,
        a,
        b,
        sum,
        carry,
    }
}

pub struct Latch {
    pub circuit: Circuit,
    pub set: ComponentId,
    pub reset: ComponentId,
    pub q: ComponentId,
}

/// Cross-coupled NOR latch: S, R switches; Q LED on the reset-side NOR.
pub fn sr_latch() -> Latch {
    let mut circuit = Circuit::new();
    let set = circuit.add_component(GateKind::input(), 0.0, 0.0).unwrap();
    let reset = circuit.add_component(GateKind::input(), 0.0, 60.0).unwrap();
    let nor_q = circuit
        .add_component(GateKind::logic(LogicOp::Nor, 2).unwrap(), 100.0, 0.0)
        .unwrap();
    let nor_qn = circuit
        .add_component(GateKind::logic(LogicOp::Nor, 2).unwrap(), 100.0, 60.0)
        .unwrap();
    let q = circuit.add_component(GateKind::Led, 200.0, 0.0).unwrap();

    circuit.set_label(set, Some("S".into())).unwrap();
    circuit.set_label(reset, Some("R".into())).unwrap();
    circuit.set_label(q, Some("Q".into())).unwrap();

    circuit.connect(PinRef::new(reset, 0), PinRef::new(nor_q, 0)).unwrap();
    circuit.connect(PinRef::new(nor_qn, 0), PinRef::new(nor_q, 1)).unwrap();
    circuit.connect(PinRef::new(set, 0), PinRef::new(nor_qn, 0)).unwrap();
    circuit.connect(PinRef::new(nor_q, 0), PinRef::new(nor_qn, 1)).unwrap();
    circuit.connect(PinRef::new(nor_q, 0), PinRef::new(q, 0)).unwrap();

    Latch {
        circuit,
        set,
        reset,
        q,
    }
}

/// Run the `circuitry` binary with `home` as its home directory and
/// `save_dir` as its store.
pub fn run_cli(home: &Path, save_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_circuitry"))
        .env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG")
        .current_dir(home)
        .arg("--save-dir")
        .arg(save_dir)
        .args(args)
        .output()
        .expect("failed to launch circuitry binary")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
