//! End-to-end runs of the `circuitry` binary

use std::fs;

use crate::common::{run_cli, stderr, stdout};

#[test]
fn build_simulate_and_tabulate_a_circuit() {
    let home = tempfile::tempdir().unwrap();
    let store = home.path().join("store");
    let run = |args: &[&str]| {
        let output = run_cli(home.path(), &store, args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            stderr(&output)
        );
        stdout(&output)
    };

    run(&["new", "gate"]);
    run(&["add", "gate", "input", "--label", "A"]);
    run(&["add", "gate", "input", "--label", "B"]);
    run(&["add", "gate", "nand", "--label", "N", "--at", "100,0"]);
    run(&["add", "gate", "led", "--label", "Q"]);
    run(&["connect", "gate", "A", "N:0"]);
    run(&["connect", "gate", "B", "N:1"]);
    run(&["connect", "gate", "N", "Q"]);

    assert_eq!(run(&["list"]), "gate\n");
    assert_eq!(run(&["simulate", "gate"]), "Q = 1\n");
    assert_eq!(run(&["simulate", "gate", "--set", "A=1", "--set", "B=1"]), "Q = 0\n");

    let table = run(&["table", "gate"]);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines, ["A B | Q", "0 0 | 1", "1 0 | 1", "0 1 | 1", "1 1 | 0"]);

    let page = run(&["table", "gate", "--rows", "2..4"]);
    let lines: Vec<&str> = page.lines().collect();
    assert_eq!(lines, ["A B | Q", "0 1 | 1", "1 1 | 0"]);
    let past_end = run_cli(home.path(), &store, &["table", "gate", "--rows", "4..6"]);
    assert!(!past_end.status.success());

    assert_eq!(
        run(&["simulate", "gate", "--set", "A=1", "--duration-ms", "50"]),
        "Q = 1\n"
    );

    let info = run(&["info", "gate"]);
    assert!(info.contains("components:  4"), "{info}");
    assert!(info.contains("No feedback loops"), "{info}");

    assert_eq!(run(&["toggle", "gate", "A"]), "A = 1\n");
    assert!(run(&["info", "gate"]).contains("A = 1"));
}

#[test]
fn export_writes_csv_to_the_chosen_directory() {
    let home = tempfile::tempdir().unwrap();
    let store = home.path().join("store");
    let out = home.path().join("out");
    for args in [
        &["new", "buf"][..],
        &["add", "buf", "input", "--label", "X"],
        &["add", "buf", "led", "--label", "Y"],
        &["connect", "buf", "X", "Y"],
    ] {
        assert!(run_cli(home.path(), &store, args).status.success());
    }

    let output = run_cli(
        home.path(),
        &store,
        &["export", "buf", "--dir", out.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let csv = fs::read_to_string(out.join("truth_table_Y.csv")).unwrap();
    assert_eq!(csv, "X,Y\n0,0\n1,1\n");
}

#[test]
fn errors_exit_nonzero_with_a_message() {
    let home = tempfile::tempdir().unwrap();
    let store = home.path().join("store");

    let missing = run_cli(home.path(), &store, &["info", "ghost"]);
    assert!(!missing.status.success());
    assert!(stderr(&missing).contains("ghost"));

    assert!(run_cli(home.path(), &store, &["new", "dup"]).status.success());
    let dup = run_cli(home.path(), &store, &["new", "dup"]);
    assert!(!dup.status.success());
    assert!(stderr(&dup).contains("--force"));
    assert!(run_cli(home.path(), &store, &["new", "dup", "--force"]).status.success());
}
