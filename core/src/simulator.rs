//! Fixed-rate tick simulation.
//!
//! Each tick is one Gauss-Seidel pass in circuit order: a component sees the
//! outputs already recomputed earlier in the same tick and last tick's values
//! for everything after it. Feedback loops therefore behave like clocked
//! elements (a NOT gate driving itself toggles once per tick).

use std::time::Duration;

use circuitry_types::{Circuit, CircuitError, ComponentId, TickRate};

use crate::netlist::Netlist;

/// Result of [`Simulator::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// A pass produced no change. `passes` counts that final quiet pass.
    Stable { passes: usize },
    /// Still changing after the pass budget ran out.
    Oscillating,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    netlist: Netlist,
    ticks: u64,
}

impl Simulator {
    #[must_use]
    pub fn new(circuit: &Circuit) -> Self {
        Self {
            netlist: Netlist::compile(circuit),
            ticks: 0,
        }
    }

    /// Advance one tick. Returns whether any output changed.
    pub fn tick(&mut self) -> bool {
        self.ticks += 1;
        self.netlist.pass_all()
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Ticks elapsed since construction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick until a pass changes nothing, or `max_passes` is reached.
    pub fn settle(&mut self, max_passes: usize) -> Settle {
        for pass in 1..=max_passes {
            if !self.tick() {
                return Settle::Stable { passes: pass };
            }
        }
        Settle::Oscillating
    }

    pub fn set_input(&mut self, id: ComponentId, value: bool) -> Result<(), CircuitError> {
        let node = self.node(id)?;
        if self.netlist.set_switch(node, value) {
            Ok(())
        } else {
            Err(CircuitError::NotAnInput(id))
        }
    }

    /// Flip a switch and return its new state.
    pub fn toggle_input(&mut self, id: ComponentId) -> Result<bool, CircuitError> {
        let current = self.input(id).ok_or(CircuitError::NotAnInput(id))?;
        self.set_input(id, !current)?;
        Ok(!current)
    }

    /// Current switch state; `None` for unknown ids and non-switches.
    #[must_use]
    pub fn input(&self, id: ComponentId) -> Option<bool> {
        let node = self.netlist.node_index(id)?;
        self.netlist.kind(node).input_state()
    }

    /// Value shown by an LED (its input pin).
    #[must_use]
    pub fn led(&self, id: ComponentId) -> Option<bool> {
        let node = self.netlist.node_index(id)?;
        self.netlist
            .kind(node)
            .is_led()
            .then(|| self.netlist.input_value(node, 0))
    }

    #[must_use]
    pub fn output(&self, id: ComponentId, pin: usize) -> Option<bool> {
        let node = self.netlist.node_index(id)?;
        self.netlist.output_value(node, pin)
    }

    /// Every LED with its value, in circuit order.
    #[must_use]
    pub fn led_states(&self) -> Vec<(ComponentId, bool)> {
        (0..self.netlist.len())
            .filter(|&node| self.netlist.kind(node).is_led())
            .map(|node| (self.netlist.id(node), self.netlist.input_value(node, 0)))
            .collect()
    }

    #[must_use]
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    fn node(&self, id: ComponentId) -> Result<usize, CircuitError> {
        self.netlist
            .node_index(id)
            .ok_or(CircuitError::UnknownComponent(id))
    }
}

/// Fixed-timestep driver: converts wall-clock time into whole ticks.
///
/// Leftover time carries over to the next call. A single call never runs
/// more than one second's worth of ticks; any further backlog is dropped.
#[derive(Debug, Clone)]
pub struct TickClock {
    rate: TickRate,
    interval: Duration,
    pending: Duration,
}

impl TickClock {
    #[must_use]
    pub fn new(rate: TickRate) -> Self {
        Self {
            rate,
            interval: Duration::from_millis(rate.interval_ms()),
            pending: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Account for `elapsed` time and run the ticks now due. Returns how many
    /// ran.
    pub fn advance(&mut self, elapsed: Duration, sim: &mut Simulator) -> u64 {
        self.pending += elapsed;
        let max = u64::from(self.rate.fps());
        let mut ran = 0;
        while self.pending >= self.interval && ran < max {
            self.pending -= self.interval;
            sim.tick();
            ran += 1;
        }
        if self.pending >= self.interval {
            tracing::debug!(
                backlog_ms = self.pending.as_millis(),
                "Simulation fell behind; dropping backlog"
            );
            self.pending = Duration::ZERO;
        }
        ran
    }
}
