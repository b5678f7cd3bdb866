//! Truth table enumeration tests

use circuitry_core::{TruthTable, TruthTableError, VirtualTable, collect_influencing_inputs};
use circuitry_types::{Circuit, GateKind, LogicOp, PinRef};

use crate::common::{half_adder, sr_latch};

#[test]
fn half_adder_table_covers_every_combination() {
    let fixture = half_adder();
    let mut table = TruthTable::new(&fixture.circuit, &[]).unwrap();

    assert_eq!(table.headers().collect::<Vec<_>>(), ["A", "B", "S", "C"]);
    assert!(table.is_combinational());
    let rows: Vec<(Vec<bool>, Vec<bool>)> = table
        .rows()
        .map(|row| (row.inputs, row.outputs))
        .collect();
    assert_eq!(
        rows,
        [
            (vec![false, false], vec![false, false]),
            (vec![true, false], vec![true, false]),
            (vec![false, true], vec![true, false]),
            (vec![true, true], vec![false, true]),
        ]
    );
}

#[test]
fn table_ignores_and_preserves_switch_states() {
    let mut fixture = half_adder();
    fixture.circuit.set_input(fixture.a, true).unwrap();
    let before = fixture.circuit.clone();

    let mut table = TruthTable::new(&fixture.circuit, &[fixture.carry]).unwrap();
    assert_eq!(table.row(0).unwrap().outputs, [false]);
    assert_eq!(fixture.circuit, before);
}

#[test]
fn only_upstream_inputs_become_columns() {
    let mut fixture = half_adder();
    let stray = fixture
        .circuit
        .add_component(GateKind::input(), 0.0, 300.0)
        .unwrap();

    let inputs = collect_influencing_inputs(&fixture.circuit, &[fixture.sum]);
    assert_eq!(inputs, [fixture.a, fixture.b]);
    assert!(!inputs.contains(&stray));
}

#[test]
fn latch_rows_settle_from_a_clean_state() {
    let latch = sr_latch();
    let mut table = TruthTable::new(&latch.circuit, &[latch.q]).unwrap();

    assert!(!table.is_combinational());
    assert_eq!(table.headers().collect::<Vec<_>>(), ["R", "S", "Q"]);
    let q: Vec<bool> = table.rows().map(|row| row.outputs[0]).collect();
    assert_eq!(q, [true, false, true, false]);
    assert!(table.rows().all(|row| row.stable));
}

#[test]
fn random_access_matches_sequential_rows() {
    let fixture = half_adder();
    let mut table = TruthTable::new(&fixture.circuit, &[]).unwrap();
    let sequential: Vec<_> = table.rows().collect();
    for index in [3, 0, 2, 1] {
        assert_eq!(table.row(index).unwrap(), sequential[index as usize]);
    }
}

#[test]
fn unreachable_outputs_are_reported() {
    let mut circuit = Circuit::new();
    let led = circuit.add_component(GateKind::Led, 0.0, 0.0).unwrap();
    let not = circuit.add_component(GateKind::Not, 0.0, 0.0).unwrap();
    circuit.connect(PinRef::new(not, 0), PinRef::new(led, 0)).unwrap();

    assert_eq!(
        TruthTable::new(&circuit, &[led]).unwrap_err(),
        TruthTableError::NoInputs
    );
    assert_eq!(
        TruthTable::new(&circuit, &[not]).unwrap_err(),
        TruthTableError::NotAnOutput(not)
    );
    assert_eq!(
        TruthTable::new(&Circuit::new(), &[]).unwrap_err(),
        TruthTableError::NoOutputs
    );
}

#[test]
fn wide_tables_need_confirmation() {
    let mut circuit = Circuit::new();
    let mut previous = circuit.add_component(GateKind::input(), 0.0, 0.0).unwrap();
    // Chain of 2-input ORs fed by 20 switches.
    for i in 1..20 {
        let sw = circuit
            .add_component(GateKind::input(), 0.0, f64::from(i) * 40.0)
            .unwrap();
        let or = circuit
            .add_component(GateKind::logic(LogicOp::Or, 2).unwrap(), 100.0, 0.0)
            .unwrap();
        circuit.connect(PinRef::new(previous, 0), PinRef::new(or, 0)).unwrap();
        circuit.connect(PinRef::new(sw, 0), PinRef::new(or, 1)).unwrap();
        previous = or;
    }
    let led = circuit.add_component(GateKind::Led, 300.0, 0.0).unwrap();
    circuit.connect(PinRef::new(previous, 0), PinRef::new(led, 0)).unwrap();

    let table = TruthTable::new(&circuit, &[led]).unwrap();
    assert_eq!(table.input_count(), 20);
    assert_eq!(table.row_count(), 1 << 20);
    assert!(table.needs_confirmation(16));
    assert!(!table.needs_confirmation(20));

    // Deep rows are computed on demand without enumerating the rest.
    let mut view = VirtualTable::new(table, 16);
    assert_eq!(view.cell(0, 20), Some('0'));
    assert_eq!(view.cell((1 << 20) - 1, 20), Some('1'));
    assert_eq!(view.cached_rows(), 2);
}
