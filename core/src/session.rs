//! An open circuit: the live document, its undo history and where it is saved.

use std::path::{Path, PathBuf};

use circuitry_types::{Circuit, CircuitError, ComponentId, HistoryLimit};

use crate::document::LoadReport;
use crate::history::History;
use crate::store::{CircuitStore, Overwrite, StoreError, write_circuit};
use crate::truth_table::{TruthTable, TruthTableError};

#[derive(Debug)]
pub struct Session {
    store: CircuitStore,
    circuit: Circuit,
    history: History<Circuit>,
    file: Option<PathBuf>,
}

impl Session {
    /// Session with an empty, unsaved circuit.
    #[must_use]
    pub fn new(store: CircuitStore, limit: HistoryLimit) -> Self {
        let circuit = Circuit::new();
        Self {
            store,
            history: History::new(circuit.clone(), limit),
            circuit,
            file: None,
        }
    }

    /// Replace the document with an empty circuit. Unsaved changes are lost;
    /// check [`is_dirty`](Self::is_dirty) first.
    pub fn new_circuit(&mut self) {
        self.circuit = Circuit::new();
        self.history.reset(self.circuit.clone());
        self.file = None;
    }

    /// Open a saved circuit by name or path.
    pub fn open(&mut self, name_or_path: &str) -> Result<LoadReport, StoreError> {
        let loaded = self.store.load(name_or_path)?;
        tracing::info!(path = %loaded.path.display(), "Opened circuit");
        self.history.reset(loaded.circuit.clone());
        self.circuit = loaded.circuit;
        self.file = Some(loaded.path);
        Ok(loaded.report)
    }

    #[must_use]
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    #[must_use]
    pub fn store(&self) -> &CircuitStore {
        &self.store
    }

    /// File the circuit was opened from or last saved to.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Display name: the file stem, or `Untitled`.
    #[must_use]
    pub fn title(&self) -> String {
        self.file
            .as_deref()
            .and_then(Path::file_stem)
            .map_or_else(|| "Untitled".to_owned(), |s| s.to_string_lossy().into_owned())
    }

    /// Apply an edit and record it for undo.
    ///
    /// A failing edit leaves the circuit exactly as it was. An edit that
    /// changes nothing records nothing.
    pub fn edit<R>(
        &mut self,
        f: impl FnOnce(&mut Circuit) -> Result<R, CircuitError>,
    ) -> Result<R, CircuitError> {
        let mut draft = self.circuit.clone();
        let value = f(&mut draft)?;
        if draft != self.circuit {
            self.history.record(draft.clone());
            self.circuit = draft;
        }
        Ok(value)
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.step(|history| history.undo().cloned(), "Undo")
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.step(|history| history.redo().cloned(), "Redo")
    }

    fn step(
        &mut self,
        f: impl FnOnce(&mut History<Circuit>) -> Option<Circuit>,
        action: &str,
    ) -> bool {
        let Some(snapshot) = f(&mut self.history) else {
            return false;
        };
        self.circuit = snapshot;
        let (position, len) = self.history.position();
        tracing::debug!("{action} ({position}/{len})");
        true
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    #[must_use]
    pub fn history(&self) -> &History<Circuit> {
        &self.history
    }

    pub fn set_history_limit(&mut self, limit: HistoryLimit) {
        self.history.set_limit(limit);
    }

    /// Save to the current file.
    pub fn save(&mut self) -> Result<PathBuf, StoreError> {
        let path = self.file.clone().ok_or(StoreError::Unnamed)?;
        write_circuit(&path, &self.circuit)?;
        self.history.mark_saved();
        Ok(path)
    }

    /// Save under a new name in the store; it becomes the current file.
    pub fn save_as(&mut self, name: &str, overwrite: Overwrite) -> Result<PathBuf, StoreError> {
        let path = self.store.save(name, &self.circuit, overwrite)?;
        self.file = Some(path.clone());
        self.history.mark_saved();
        Ok(path)
    }

    /// Truth table for `outputs` (every LED when empty). The live circuit is
    /// not touched, including its switch states.
    pub fn truth_table(&self, outputs: &[ComponentId]) -> Result<TruthTable, TruthTableError> {
        TruthTable::new(&self.circuit, outputs)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use circuitry_types::{CircuitError, ComponentId, GateKind, HistoryLimit};

    use super::Session;
    use crate::store::{CircuitStore, Overwrite, StoreError};

    fn session(root: &Path) -> Session {
        Session::new(CircuitStore::new(root), HistoryLimit::default())
    }

    #[test]
    fn edits_are_undoable() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let id = s
            .edit(|c| c.add_component(GateKind::Not, 0.0, 0.0))
            .unwrap();
        assert!(s.circuit().component(id).is_some());
        assert!(s.is_dirty());

        assert!(s.undo());
        assert!(s.circuit().is_empty());
        assert!(!s.is_dirty());
        assert!(!s.undo());

        assert!(s.redo());
        assert!(s.circuit().component(id).is_some());
    }

    #[test]
    fn failed_edits_change_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        let ghost = ComponentId::new();
        let err = s
            .edit(|c| {
                c.add_component(GateKind::Led, 0.0, 0.0)?;
                c.toggle_input(ghost)
            })
            .unwrap_err();

        assert_eq!(err, CircuitError::UnknownComponent(ghost));
        assert!(s.circuit().is_empty());
        assert_eq!(s.history().position(), (1, 1));
    }

    #[test]
    fn save_as_then_save_and_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        assert!(matches!(s.save(), Err(StoreError::Unnamed)));

        s.edit(|c| c.add_component(GateKind::input(), 0.0, 0.0))
            .unwrap();
        s.save_as("switch", Overwrite::Deny).unwrap();
        assert!(!s.is_dirty());
        assert_eq!(s.title(), "switch");

        let sw = s.circuit().components()[0].id;
        s.edit(|c| c.toggle_input(sw)).unwrap();
        assert!(s.is_dirty());
        s.save().unwrap();

        let mut other = session(tmp.path());
        other.open("switch").unwrap();
        assert_eq!(other.circuit(), s.circuit());
        assert!(!other.is_dirty());
    }

    #[test]
    fn new_circuit_forgets_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = session(tmp.path());
        s.save_as("blank", Overwrite::Deny).unwrap();
        s.new_circuit();
        assert!(s.file().is_none());
        assert_eq!(s.title(), "Untitled");
    }
}
