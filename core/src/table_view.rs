//! Random-access view over a truth table for scrolling UIs.
//!
//! Exposes `2^N` rows and `N + outputs` columns but only computes the rows
//! that are actually looked at, keeping the most recent ones in an LRU cache.

use std::num::NonZeroUsize;

use circuitry_types::{MAX_ROW_CACHE, MIN_ROW_CACHE};
use lru::LruCache;

use crate::truth_table::{Row, TruthTable, TruthTableError};

pub struct VirtualTable {
    table: TruthTable,
    cache: LruCache<u64, Row>,
}

impl VirtualTable {
    /// Wrap `table` with a cache of `max(MIN_ROW_CACHE, cache_size)` rows,
    /// never more than [`MAX_ROW_CACHE`] nor more than the table has.
    #[must_use]
    pub fn new(table: TruthTable, cache_size: usize) -> Self {
        let rows = usize::try_from(table.row_count()).unwrap_or(usize::MAX);
        let capacity = cache_size.clamp(MIN_ROW_CACHE, MAX_ROW_CACHE).min(rows);
        Self {
            table,
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.table.row_count()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.table.input_count() + self.table.output_count()
    }

    /// Column header; `None` past the last column.
    #[must_use]
    pub fn header(&self, col: usize) -> Option<&str> {
        self.table.headers().nth(col)
    }

    /// One-based row number shown beside each row.
    #[must_use]
    pub fn row_header(row: u64) -> String {
        (row + 1).to_string()
    }

    /// Fetch a row, computing it on a miss. The flag reports whether the row
    /// was already cached.
    pub fn row(&mut self, index: u64) -> Result<(&Row, bool), TruthTableError> {
        let was_cached = self.cache.contains(&index);
        if !was_cached {
            let row = self.table.row(index)?;
            self.cache.put(index, row);
        }
        let rows = self.table.row_count();
        self.cache
            .get(&index)
            .map(|row| (row, was_cached))
            .ok_or(TruthTableError::RowOutOfRange { row: index, rows })
    }

    /// `'0'` or `'1'` for a cell; `None` when out of range.
    pub fn cell(&mut self, row: u64, col: usize) -> Option<char> {
        let (row, _) = self.row(row).ok()?;
        let value = row.cells().nth(col)?;
        Some(if value { '1' } else { '0' })
    }

    #[must_use]
    pub fn cached_rows(&self) -> usize {
        self.cache.len()
    }

    /// Most rows the cache will hold.
    #[must_use]
    pub fn cache_capacity(&self) -> usize {
        self.cache.cap().get()
    }

    #[must_use]
    pub fn table(&self) -> &TruthTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use circuitry_types::{Circuit, GateKind, LogicOp, PinRef};

    use super::VirtualTable;
    use crate::truth_table::{TruthTable, TruthTableError};

    fn or8_table() -> TruthTable {
        let mut circuit = Circuit::new();
        let or = circuit
            .add_component(GateKind::logic(LogicOp::Or, 8).unwrap(), 100.0, 0.0)
            .unwrap();
        for pin in 0..8 {
            let sw = circuit.add_component(GateKind::input(), 0.0, 0.0).unwrap();
            circuit.connect(PinRef::new(sw, 0), PinRef::new(or, pin)).unwrap();
        }
        let led = circuit.add_component(GateKind::Led, 200.0, 0.0).unwrap();
        circuit.connect(PinRef::new(or, 0), PinRef::new(led, 0)).unwrap();
        TruthTable::new(&circuit, &[led]).unwrap()
    }

    fn buffer_table() -> TruthTable {
        let mut circuit = Circuit::new();
        let sw = circuit.add_component(GateKind::input(), 0.0, 0.0).unwrap();
        let led = circuit.add_component(GateKind::Led, 100.0, 0.0).unwrap();
        circuit.connect(PinRef::new(sw, 0), PinRef::new(led, 0)).unwrap();
        TruthTable::new(&circuit, &[led]).unwrap()
    }

    #[test]
    fn dimensions_and_headers() {
        let view = VirtualTable::new(or8_table(), 0);
        assert_eq!(view.row_count(), 256);
        assert_eq!(view.column_count(), 9);
        assert_eq!(view.header(0), Some("IN1"));
        assert_eq!(view.header(8), Some("LED"));
        assert_eq!(view.header(9), None);
        assert_eq!(VirtualTable::row_header(0), "1");
    }

    #[test]
    fn cells_render_bits() {
        let mut view = VirtualTable::new(or8_table(), 16);
        assert_eq!(view.cell(0, 8), Some('0'));
        assert_eq!(view.cell(5, 0), Some('1'));
        assert_eq!(view.cell(5, 1), Some('0'));
        assert_eq!(view.cell(5, 8), Some('1'));
        assert_eq!(view.cell(5, 9), None);
        assert_eq!(view.cell(256, 0), None);
    }

    #[test]
    fn repeated_rows_come_from_cache() {
        let mut view = VirtualTable::new(or8_table(), 16);
        assert!(!view.row(3).unwrap().1);
        assert!(view.row(3).unwrap().1);
    }

    #[test]
    fn cache_is_bounded_and_evicts_oldest() {
        // Requests below the minimum are raised to 16 rows.
        let mut view = VirtualTable::new(or8_table(), 4);
        for row in 0..20 {
            view.row(row).unwrap();
        }
        assert_eq!(view.cached_rows(), 16);
        assert!(!view.row(0).unwrap().1, "row 0 should have been evicted");
        assert!(view.row(19).unwrap().1);
    }

    #[test]
    fn out_of_range_rows_are_errors() {
        let mut view = VirtualTable::new(or8_table(), 16);
        assert_eq!(
            view.row(256).unwrap_err(),
            TruthTableError::RowOutOfRange {
                row: 256,
                rows: 256
            }
        );
    }

    #[test]
    fn cache_capacity_is_bounded_by_the_table_and_the_maximum() {
        let mut small = VirtualTable::new(buffer_table(), usize::MAX / 2);
        assert_eq!(small.cache_capacity(), 2);
        assert_eq!(small.cell(1, 1), Some('1'));

        assert_eq!(VirtualTable::new(or8_table(), usize::MAX).cache_capacity(), 256);
        assert_eq!(VirtualTable::new(or8_table(), 0).cache_capacity(), 16);
    }
}
