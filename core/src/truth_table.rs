//! Truth-table enumeration over the inputs that influence chosen LEDs.
//!
//! Rows are never materialised as a whole: each row index is decoded into
//! switch states and evaluated on demand against a private netlist, so
//! memory stays proportional to the circuit, not to `2^N`.
//!
//! Row `i` drives input `k` with bit `(i >> k) & 1`, so the first input
//! column is the least significant bit.

use std::ops::Range;

use circuitry_types::{Circuit, ComponentId};
use thiserror::Error;

use crate::netlist::{Netlist, Topology};

/// Rows are addressed by `u64`.
pub const MAX_INPUTS: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TruthTableError {
    #[error("component {0} is not an output LED")]
    NotAnOutput(ComponentId),
    #[error("circuit has no output LEDs")]
    NoOutputs,
    #[error("no input switches found upstream of the selected outputs")]
    NoInputs,
    #[error("{count} inputs exceed the maximum of {max}")]
    TooManyInputs { count: usize, max: usize },
    #[error("row {row} is out of range for a table of {rows} rows")]
    RowOutOfRange { row: u64, rows: u64 },
}

/// Input switches upstream of `targets`, each once, ordered by label (blank
/// labels first) and then by position in the circuit.
///
/// The walk follows wires backwards from the targets' input pins and stops at
/// switches.
#[must_use]
pub fn collect_influencing_inputs(circuit: &Circuit, targets: &[ComponentId]) -> Vec<ComponentId> {
    let netlist = Netlist::compile(circuit);
    let target_nodes: Vec<usize> = targets
        .iter()
        .filter_map(|&id| netlist.node_index(id))
        .collect();
    influencing_inputs(circuit, &netlist, &target_nodes)
}

fn influencing_inputs(circuit: &Circuit, netlist: &Netlist, targets: &[usize]) -> Vec<ComponentId> {
    let mut inputs: Vec<(usize, &str, ComponentId)> = netlist
        .upstream(targets)
        .into_iter()
        .filter(|&node| netlist.kind(node).is_input() && !targets.contains(&node))
        .map(|node| {
            let id = netlist.id(node);
            let label = circuit
                .component(id)
                .and_then(|c| c.label())
                .unwrap_or("");
            (node, label, id)
        })
        .collect();
    inputs.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(&b.0)));
    inputs.into_iter().map(|(_, _, id)| id).collect()
}

/// A named column of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ComponentId,
    pub header: String,
}

/// One evaluated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: u64,
    pub inputs: Vec<bool>,
    pub outputs: Vec<bool>,
    /// `false` when a feedback loop kept changing for the whole pass budget;
    /// the outputs are then the values after the last pass.
    pub stable: bool,
}

impl Row {
    /// Input cells followed by output cells.
    pub fn cells(&self) -> impl Iterator<Item = bool> + '_ {
        self.inputs.iter().chain(&self.outputs).copied()
    }
}

#[derive(Debug, Clone)]
enum Plan {
    /// Acyclic cone: one pass in dependency order is exact.
    Ordered(Vec<usize>),
    /// Cone with feedback: repeat passes in circuit order until quiet.
    Iterate { cone: Vec<usize>, max_passes: usize },
}

#[derive(Debug, Clone)]
pub struct TruthTable {
    netlist: Netlist,
    input_nodes: Vec<usize>,
    output_nodes: Vec<usize>,
    inputs: Vec<Column>,
    outputs: Vec<Column>,
    plan: Plan,
}

impl TruthTable {
    /// Build a table for the given LEDs, or for every LED when `outputs` is
    /// empty.
    ///
    /// The circuit is only read; switch states in it are ignored.
    pub fn new(circuit: &Circuit, outputs: &[ComponentId]) -> Result<Self, TruthTableError> {
        let netlist = Netlist::compile(circuit);

        let output_ids: Vec<ComponentId> = if outputs.is_empty() {
            circuit.leds().map(|c| c.id).collect()
        } else {
            outputs.to_vec()
        };
        if output_ids.is_empty() {
            return Err(TruthTableError::NoOutputs);
        }
        let output_nodes = output_ids
            .iter()
            .map(|&id| {
                netlist
                    .node_index(id)
                    .filter(|&node| netlist.kind(node).is_led())
                    .ok_or(TruthTableError::NotAnOutput(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let input_ids = influencing_inputs(circuit, &netlist, &output_nodes);
        if input_ids.is_empty() {
            return Err(TruthTableError::NoInputs);
        }
        if input_ids.len() > MAX_INPUTS {
            return Err(TruthTableError::TooManyInputs {
                count: input_ids.len(),
                max: MAX_INPUTS,
            });
        }
        let input_nodes: Vec<usize> = input_ids
            .iter()
            .filter_map(|&id| netlist.node_index(id))
            .collect();

        let label = |id: ComponentId| {
            circuit
                .component(id)
                .and_then(|c| c.label())
                .map(str::to_owned)
        };
        let inputs = input_ids
            .iter()
            .enumerate()
            .map(|(k, &id)| Column {
                id,
                header: label(id).unwrap_or_else(|| format!("IN{}", k + 1)),
            })
            .collect();
        let single_output = output_ids.len() == 1;
        let outputs = output_ids
            .iter()
            .enumerate()
            .map(|(k, &id)| Column {
                id,
                header: label(id).unwrap_or_else(|| {
                    if single_output {
                        "LED".to_owned()
                    } else {
                        format!("LED{}", k + 1)
                    }
                }),
            })
            .collect();

        let cone = netlist.upstream(&output_nodes);
        let plan = match netlist.topology(&cone) {
            Topology::Acyclic(order) => Plan::Ordered(order),
            Topology::Cyclic(looped) => {
                tracing::warn!(
                    components = looped.len(),
                    "Truth table inputs feed a loop; rows are iterated until stable"
                );
                let max_passes = cone.len() + 1;
                Plan::Iterate { cone, max_passes }
            }
        };

        Ok(Self {
            netlist,
            input_nodes,
            output_nodes,
            inputs,
            outputs,
            plan,
        })
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// `2^N`.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        1u64 << self.inputs.len()
    }

    #[must_use]
    pub fn input_columns(&self) -> &[Column] {
        &self.inputs
    }

    #[must_use]
    pub fn output_columns(&self) -> &[Column] {
        &self.outputs
    }

    /// Input headers followed by output headers.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .map(|c| c.header.as_str())
    }

    /// Whether every row is exact after a single ordered pass.
    #[must_use]
    pub fn is_combinational(&self) -> bool {
        matches!(self.plan, Plan::Ordered(_))
    }

    /// Whether the table is large enough that the caller should confirm
    /// before enumerating it.
    #[must_use]
    pub fn needs_confirmation(&self, threshold: usize) -> bool {
        self.inputs.len() > threshold
    }

    pub fn row(&mut self, index: u64) -> Result<Row, TruthTableError> {
        let rows = self.row_count();
        if index >= rows {
            return Err(TruthTableError::RowOutOfRange { row: index, rows });
        }
        Ok(self.evaluate(index))
    }

    /// Every row in order, computed lazily.
    pub fn rows(&mut self) -> Rows<'_> {
        let end = self.row_count();
        Rows {
            table: self,
            range: 0..end,
        }
    }

    /// Rows in `range`, clipped to the table.
    pub fn rows_in(&mut self, range: Range<u64>) -> Rows<'_> {
        let end = range.end.min(self.row_count());
        let start = range.start.min(end);
        Rows {
            table: self,
            range: start..end,
        }
    }

    fn evaluate(&mut self, index: u64) -> Row {
        self.netlist.reset();
        let inputs: Vec<bool> = (0..self.input_nodes.len())
            .map(|k| (index >> k) & 1 == 1)
            .collect();
        for (&node, &bit) in self.input_nodes.iter().zip(&inputs) {
            self.netlist.set_switch(node, bit);
        }

        let stable = match &self.plan {
            Plan::Ordered(order) => {
                self.netlist.pass(order);
                true
            }
            Plan::Iterate { cone, max_passes } => {
                (0..*max_passes).any(|_| !self.netlist.pass(cone))
            }
        };

        let outputs = self
            .output_nodes
            .iter()
            .map(|&node| self.netlist.input_value(node, 0))
            .collect();

        Row {
            index,
            inputs,
            outputs,
            stable,
        }
    }
}

/// Lazy row iterator returned by [`TruthTable::rows`].
pub struct Rows<'a> {
    table: &'a mut TruthTable,
    range: Range<u64>,
}

impl Iterator for Rows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let index = self.range.next()?;
        Some(self.table.evaluate(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}
