//! Undo/redo through a session

use std::path::Path;

use circuitry_core::{CircuitStore, Overwrite, Session};
use circuitry_types::{GateKind, HistoryLimit};

fn session(root: &Path, limit: usize) -> Session {
    Session::new(CircuitStore::new(root), HistoryLimit::new(limit))
}

#[test]
fn undo_past_the_save_point_and_back() {
    let tmp = tempfile::tempdir().unwrap();
    let mut s = session(tmp.path(), 50);
    let not = s.edit(|c| c.add_component(GateKind::Not, 0.0, 0.0)).unwrap();
    s.save_as("chain", Overwrite::Deny).unwrap();

    let led = s.edit(|c| c.add_component(GateKind::Led, 50.0, 0.0)).unwrap();
    assert!(s.is_dirty());

    assert!(s.undo());
    assert!(!s.is_dirty());
    assert!(s.circuit().component(led).is_none());

    assert!(s.undo());
    assert!(s.is_dirty());
    assert!(s.circuit().component(not).is_none());

    assert!(s.redo());
    assert!(s.redo());
    assert!(s.is_dirty());
    assert!(s.circuit().component(led).is_some());
    assert_eq!(s.history().position(), (3, 3));
}

#[test]
fn history_is_bounded() {
    let tmp = tempfile::tempdir().unwrap();
    let mut s = session(tmp.path(), 3);
    for i in 0..10 {
        s.edit(|c| c.add_component(GateKind::Not, f64::from(i), 0.0))
            .unwrap();
    }
    assert_eq!(s.history().position(), (3, 3));

    let mut undone = 0;
    while s.undo() {
        undone += 1;
    }
    assert_eq!(undone, 2);
    assert_eq!(s.circuit().components().len(), 8);
}

#[test]
fn noop_edits_are_not_recorded() {
    let tmp = tempfile::tempdir().unwrap();
    let mut s = session(tmp.path(), 10);
    let sw = s.edit(|c| c.add_component(GateKind::input(), 0.0, 0.0)).unwrap();
    s.edit(|c| c.move_component(sw, 0.0, 0.0)).unwrap();
    assert_eq!(s.history().position(), (2, 2));
}
