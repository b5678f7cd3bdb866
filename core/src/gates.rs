//! Combinational semantics of each gate kind.
//!
//! Pins are read and written as plain slices so the same function serves the
//! tick simulator and the truth-table evaluator.

use circuitry_types::{GateKind, LogicOp};

/// Compute `outputs` from `inputs` for one component.
///
/// `inputs.len()` must equal `kind.input_count()` and `outputs.len()` must
/// equal `kind.output_count()`. LEDs have no outputs and are a no-op.
pub fn evaluate(kind: &GateKind, inputs: &[bool], outputs: &mut [bool]) {
    match *kind {
        GateKind::Logic { op, .. } => outputs[0] = logic(op, inputs),
        GateKind::Not => outputs[0] = !inputs[0],
        GateKind::Mux { select_bits } => {
            let data = 1usize << select_bits;
            let selected = read_bits(&inputs[data..]);
            outputs[0] = inputs.get(selected).copied().unwrap_or(false);
        }
        GateKind::Demux { .. } => {
            let selected = read_bits(&inputs[1..]);
            for (i, out) in outputs.iter_mut().enumerate() {
                *out = i == selected && inputs[0];
            }
        }
        GateKind::Encoder { .. } => {
            // Priority: highest active input wins.
            match inputs.iter().rposition(|&v| v) {
                Some(active) => write_bits(active, outputs),
                None => outputs.fill(false),
            }
        }
        GateKind::Decoder { .. } => {
            let value = read_bits(inputs);
            for (i, out) in outputs.iter_mut().enumerate() {
                *out = i == value;
            }
        }
        GateKind::Input { state } => outputs[0] = state,
        GateKind::Led => {}
    }
}

fn logic(op: LogicOp, inputs: &[bool]) -> bool {
    let high = inputs.iter().filter(|&&v| v).count();
    match op {
        LogicOp::And => high == inputs.len(),
        LogicOp::Or => high > 0,
        LogicOp::Nand => high != inputs.len(),
        LogicOp::Nor => high == 0,
        LogicOp::Xor => inputs.len() >= 2 && high % 2 == 1,
        LogicOp::Xnor => inputs.len() >= 2 && high % 2 == 0,
    }
}

/// Pins as an unsigned integer, pin 0 being the least significant bit.
fn read_bits(pins: &[bool]) -> usize {
    pins.iter()
        .enumerate()
        .filter(|(_, v)| **v)
        .fold(0, |acc, (bit, _)| acc | (1 << bit))
}

fn write_bits(value: usize, pins: &mut [bool]) {
    for (bit, pin) in pins.iter_mut().enumerate() {
        *pin = (value >> bit) & 1 == 1;
    }
}
