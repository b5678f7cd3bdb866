//! Compiled, index-based form of a circuit used for evaluation.
//!
//! Components become dense node indices in circuit order, every input pin is
//! resolved to the flat output slot that drives it, and output values live in
//! one `Vec<bool>`. A netlist owns its signal state, so evaluating it never
//! touches the `Circuit` it was compiled from.

use std::collections::{HashMap, VecDeque};
use std::mem;

use circuitry_types::{Circuit, ComponentId, GateKind};

use crate::gates::evaluate;

#[derive(Debug, Clone)]
struct Node {
    id: ComponentId,
    kind: GateKind,
    /// Flat output slot driving each input pin, if wired.
    drivers: Vec<Option<usize>>,
    /// First slot of this node's outputs.
    first_output: usize,
}

/// Evaluation order of the graph (or a sub-graph of it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    /// Every node appears after all of its drivers.
    Acyclic(Vec<usize>),
    /// Nodes left unordered: loop members and everything fed by a loop, in
    /// circuit order.
    Cyclic(Vec<usize>),
}

#[derive(Debug, Clone)]
pub struct Netlist {
    nodes: Vec<Node>,
    index: HashMap<ComponentId, usize>,
    values: Vec<bool>,
    scratch_in: Vec<bool>,
    scratch_out: Vec<bool>,
}

impl Netlist {
    #[must_use]
    pub fn compile(circuit: &Circuit) -> Self {
        let mut nodes = Vec::with_capacity(circuit.components().len());
        let mut index = HashMap::with_capacity(circuit.components().len());
        let mut next_slot = 0;
        for (idx, component) in circuit.components().iter().enumerate() {
            index.insert(component.id, idx);
            nodes.push(Node {
                id: component.id,
                kind: component.kind,
                drivers: vec![None; component.kind.input_count()],
                first_output: next_slot,
            });
            next_slot += component.kind.output_count();
        }

        for conn in circuit.connections() {
            let (Some(&src), Some(&dst)) =
                (index.get(&conn.from.component), index.get(&conn.to.component))
            else {
                continue;
            };
            let slot = nodes[src].first_output + conn.from.pin;
            if let Some(driver) = nodes[dst].drivers.get_mut(conn.to.pin) {
                *driver = Some(slot);
            }
        }

        Self {
            nodes,
            index,
            values: vec![false; next_slot],
            scratch_in: Vec::new(),
            scratch_out: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node_index(&self, id: ComponentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[must_use]
    pub fn id(&self, node: usize) -> ComponentId {
        self.nodes[node].id
    }

    #[must_use]
    pub fn kind(&self, node: usize) -> &GateKind {
        &self.nodes[node].kind
    }

    /// Replace an input switch's state. Returns `false` if `node` is not a switch.
    pub fn set_switch(&mut self, node: usize, value: bool) -> bool {
        match &mut self.nodes[node].kind {
            GateKind::Input { state } => {
                *state = value;
                true
            }
            _ => false,
        }
    }

    /// Value seen on an input pin; unconnected pins read `false`.
    #[must_use]
    pub fn input_value(&self, node: usize, pin: usize) -> bool {
        self.nodes[node]
            .drivers
            .get(pin)
            .copied()
            .flatten()
            .is_some_and(|slot| self.values[slot])
    }

    #[must_use]
    pub fn output_value(&self, node: usize, pin: usize) -> Option<bool> {
        let n = &self.nodes[node];
        (pin < n.kind.output_count()).then(|| self.values[n.first_output + pin])
    }

    /// Clear every output back to `false`.
    pub fn reset(&mut self) {
        self.values.fill(false);
    }

    /// Recompute one node from the current values. Returns whether any of its
    /// outputs changed.
    pub fn update(&mut self, node: usize) -> bool {
        let Node {
            kind,
            drivers,
            first_output,
            ..
        } = &self.nodes[node];
        let out_count = kind.output_count();
        if out_count == 0 {
            return false;
        }

        self.scratch_in.clear();
        self.scratch_in.extend(
            drivers
                .iter()
                .map(|driver| driver.is_some_and(|slot| self.values[slot])),
        );
        self.scratch_out.clear();
        self.scratch_out.resize(out_count, false);
        evaluate(kind, &self.scratch_in, &mut self.scratch_out);

        let outputs = &mut self.values[*first_output..*first_output + out_count];
        if outputs[..] == self.scratch_out[..] {
            return false;
        }
        outputs.copy_from_slice(&self.scratch_out);
        true
    }

    /// One pass over `order`, each node seeing the values already written
    /// earlier in the same pass. Returns whether anything changed.
    pub fn pass(&mut self, order: &[usize]) -> bool {
        let mut changed = false;
        for &node in order {
            changed |= self.update(node);
        }
        changed
    }

    /// One pass over every node in circuit order.
    pub fn pass_all(&mut self) -> bool {
        let mut changed = false;
        for node in 0..self.nodes.len() {
            changed |= self.update(node);
        }
        changed
    }

    /// Nodes whose outputs can reach `targets` (targets included), in circuit
    /// order.
    #[must_use]
    pub fn upstream(&self, targets: &[usize]) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut queue: VecDeque<usize> = targets.iter().copied().collect();
        while let Some(node) = queue.pop_front() {
            if mem::replace(&mut seen[node], true) {
                continue;
            }
            for &slot in self.nodes[node].drivers.iter().flatten() {
                let src = self.owner_of(slot);
                if !seen[src] {
                    queue.push_back(src);
                }
            }
        }
        (0..self.nodes.len()).filter(|&n| seen[n]).collect()
    }

    /// Evaluation order for the sub-graph spanned by `subset` (Kahn's
    /// algorithm, ties broken by circuit order).
    #[must_use]
    pub fn topology(&self, subset: &[usize]) -> Topology {
        let mut member = vec![false; self.nodes.len()];
        for &n in subset {
            member[n] = true;
        }

        let mut indegree = vec![0usize; self.nodes.len()];
        let mut consumers: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for &n in subset {
            for &slot in self.nodes[n].drivers.iter().flatten() {
                let src = self.owner_of(slot);
                if member[src] {
                    indegree[n] += 1;
                    consumers[src].push(n);
                }
            }
        }

        let mut ready: VecDeque<usize> = subset
            .iter()
            .copied()
            .filter(|&n| indegree[n] == 0)
            .collect();
        let mut order = Vec::with_capacity(subset.len());
        while let Some(n) = ready.pop_front() {
            order.push(n);
            for &next in &consumers[n] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.push_back(next);
                }
            }
        }

        if order.len() == subset.len() {
            Topology::Acyclic(order)
        } else {
            let mut blocked: Vec<usize> = subset
                .iter()
                .copied()
                .filter(|&n| indegree[n] > 0)
                .collect();
            blocked.sort_unstable();
            Topology::Cyclic(blocked)
        }
    }

    /// Components that sit on, or only downstream of, a feedback loop.
    /// Empty for an acyclic circuit.
    #[must_use]
    pub fn cyclic_components(&self) -> Vec<ComponentId> {
        let all: Vec<usize> = (0..self.nodes.len()).collect();
        match self.topology(&all) {
            Topology::Acyclic(_) => Vec::new(),
            Topology::Cyclic(nodes) => nodes.into_iter().map(|n| self.nodes[n].id).collect(),
        }
    }

    fn owner_of(&self, slot: usize) -> usize {
        // Slots are assigned in node order, so the owner is the last node
        // whose first output is at or before `slot`.
        self.nodes
            .partition_point(|n| n.first_output <= slot)
            .saturating_sub(1)
    }
}
