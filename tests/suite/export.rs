//! CSV export tests

use std::fs;

use circuitry_core::{
    CancelToken, ExportOutcome, TruthTable, default_file_name, export_csv_file, to_csv_string,
};
use insta::assert_snapshot;

use crate::common::half_adder;

#[test]
fn half_adder_csv() {
    let fixture = half_adder();
    let mut table = TruthTable::new(&fixture.circuit, &[]).unwrap();
    assert_snapshot!(to_csv_string(&mut table), @r"
    A,B,S,C
    0,0,0,0
    1,0,1,0
    0,1,1,0
    1,1,0,1
    ");
}

#[test]
fn single_output_csv_is_named_after_the_led() {
    let fixture = half_adder();
    let mut table = TruthTable::new(&fixture.circuit, &[fixture.carry]).unwrap();
    assert_eq!(default_file_name(&table), "truth_table_C.csv");
    assert_snapshot!(to_csv_string(&mut table), @r"
    A,B,C
    0,0,0
    1,0,0
    0,1,0
    1,1,1
    ");
}

#[test]
fn file_export_streams_in_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("exports");
    let fixture = half_adder();
    let mut table = TruthTable::new(&fixture.circuit, &[]).unwrap();

    let mut reports = Vec::new();
    let outcome = export_csv_file(
        &mut table,
        &target,
        "adder.csv",
        1,
        &CancelToken::new(),
        |p| reports.push(p.rows_done),
    )
    .unwrap();

    assert_eq!(outcome, ExportOutcome::Completed { rows: 4 });
    assert_eq!(reports, [1, 2, 3, 4]);
    let written = fs::read_to_string(target.join("adder.csv")).unwrap();
    assert_eq!(written, to_csv_string(&mut table));
}

#[test]
fn cancelled_export_keeps_the_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adder.csv");
    fs::write(&path, "previous export\n").unwrap();

    let fixture = half_adder();
    let mut table = TruthTable::new(&fixture.circuit, &[]).unwrap();
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let outcome = export_csv_file(&mut table, dir.path(), "adder.csv", 2, &cancel, |_| {
        trigger.cancel();
    })
    .unwrap();

    assert_eq!(outcome, ExportOutcome::Cancelled { rows: 2 });
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous export\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
