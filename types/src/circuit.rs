//! The circuit graph: components, wires between their pins, annotations.
//!
//! A `Circuit` is plain data. Evaluation lives in `circuitry-core`, which
//! compiles a circuit into a netlist; nothing here runs signals.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Annotation, AnnotationId, CircuitSettings, ComponentId, GateKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),
    #[error("unknown annotation {0}")]
    UnknownAnnotation(AnnotationId),
    #[error("{kind} has no input pin {index}")]
    InputOutOfRange { kind: &'static str, index: usize },
    #[error("{kind} has no output pin {index}")]
    OutputOutOfRange { kind: &'static str, index: usize },
    #[error("component {0} is not an input switch")]
    NotAnInput(ComponentId),
    #[error("{kind} cannot have size {size}")]
    InvalidGateSize { kind: &'static str, size: u8 },
}

/// A placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: GateKind,
    pub x: f64,
    pub y: f64,
    /// Degrees, clockwise on screen.
    pub rotation: f64,
    pub label: Option<String>,
}

impl Component {
    #[must_use]
    pub fn new(kind: GateKind, x: f64, y: f64) -> Self {
        Self {
            id: ComponentId::new(),
            kind,
            x,
            y,
            rotation: 0.0,
            label: None,
        }
    }

    /// Label if set and non-blank.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.trim().is_empty())
    }

    /// Switch state; `None` for anything but an input switch.
    #[must_use]
    pub fn input_state(&self) -> Option<bool> {
        self.kind.input_state()
    }
}

/// One end of a wire: a component plus a pin index on the relevant side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinRef {
    pub component: ComponentId,
    pub pin: usize,
}

impl PinRef {
    #[must_use]
    pub const fn new(component: ComponentId, pin: usize) -> Self {
        Self { component, pin }
    }
}

/// A wire from an output pin to an input pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: PinRef,
    pub to: PinRef,
    pub waypoints: Vec<(f64, f64)>,
}

/// A complete circuit document.
///
/// Invariants kept by the mutating methods:
/// - component ids are unique;
/// - every connection references existing components and in-range pins;
/// - an input pin has at most one driver.
///
/// Cycles (including a gate feeding itself) are allowed.
///
/// Not `Deserialize`: files load through the document module in
/// `circuitry-core`, which rebuilds circuits through these methods.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circuit {
    components: Vec<Component>,
    annotations: Vec<Annotation>,
    connections: Vec<Connection>,
    pub settings: CircuitSettings,
}

impl Circuit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.annotations.is_empty()
    }

    #[must_use]
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component, CircuitError> {
        self.components
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CircuitError::UnknownComponent(id))
    }

    /// Position of a component in circuit order.
    #[must_use]
    pub fn index_of(&self, id: ComponentId) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    /// Input switches in circuit order.
    pub fn inputs(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.kind.is_input())
    }

    /// Output LEDs in circuit order.
    pub fn leds(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.kind.is_led())
    }

    /// First component carrying `label` (exact match).
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.label() == Some(label))
    }

    /// Place a new component and return its id.
    ///
    /// Input switches placed without a label get the next free `INx` label.
    pub fn add_component(
        &mut self,
        kind: GateKind,
        x: f64,
        y: f64,
    ) -> Result<ComponentId, CircuitError> {
        kind.validate()?;
        let mut component = Component::new(kind, x, y);
        if kind.is_input() {
            component.label = Some(self.next_input_label());
        }
        let id = component.id;
        self.components.push(component);
        Ok(id)
    }

    /// Insert a fully-formed component (loader and snapshot paths).
    ///
    /// A component whose id is already present gets a fresh id.
    pub fn insert_component(&mut self, mut component: Component) -> Result<ComponentId, CircuitError> {
        component.kind.validate()?;
        if self.component(component.id).is_some() {
            component.id = ComponentId::new();
        }
        let id = component.id;
        self.components.push(component);
        Ok(id)
    }

    /// Remove a component and every wire touching it.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component, CircuitError> {
        let index = self.index_of(id).ok_or(CircuitError::UnknownComponent(id))?;
        self.connections
            .retain(|conn| conn.from.component != id && conn.to.component != id);
        Ok(self.components.remove(index))
    }

    /// Wire `from` (an output pin) to `to` (an input pin).
    ///
    /// Any existing driver of `to` is replaced.
    pub fn connect(&mut self, from: PinRef, to: PinRef) -> Result<(), CircuitError> {
        self.connect_via(from, to, Vec::new())
    }

    pub fn connect_via(
        &mut self,
        from: PinRef,
        to: PinRef,
        waypoints: Vec<(f64, f64)>,
    ) -> Result<(), CircuitError> {
        let source = self
            .component(from.component)
            .ok_or(CircuitError::UnknownComponent(from.component))?;
        if from.pin >= source.kind.output_count() {
            return Err(CircuitError::OutputOutOfRange {
                kind: source.kind.display_name(),
                index: from.pin,
            });
        }
        let dest = self
            .component(to.component)
            .ok_or(CircuitError::UnknownComponent(to.component))?;
        if to.pin >= dest.kind.input_count() {
            return Err(CircuitError::InputOutOfRange {
                kind: dest.kind.display_name(),
                index: to.pin,
            });
        }

        self.connections.retain(|conn| conn.to != to);
        self.connections.push(Connection {
            from,
            to,
            waypoints,
        });
        Ok(())
    }

    /// Remove the wire driving `to`, returning it if there was one.
    pub fn disconnect(&mut self, to: PinRef) -> Option<Connection> {
        let index = self.connections.iter().position(|conn| conn.to == to)?;
        Some(self.connections.remove(index))
    }

    /// The output pin driving `to`, if any.
    #[must_use]
    pub fn driver_of(&self, to: PinRef) -> Option<PinRef> {
        self.connections
            .iter()
            .find(|conn| conn.to == to)
            .map(|conn| conn.from)
    }

    /// Grow or shrink a sized component by `delta` steps.
    ///
    /// Wires attached to pins that no longer exist are dropped. Returns the
    /// new kind (unchanged when already at the range limit).
    pub fn resize_component(&mut self, id: ComponentId, delta: i32) -> Result<GateKind, CircuitError> {
        let component = self.component_mut(id)?;
        let resized = component.kind.resized(delta);
        if resized == component.kind {
            return Ok(resized);
        }
        component.kind = resized;
        let (inputs, outputs) = (resized.input_count(), resized.output_count());
        self.connections.retain(|conn| {
            !(conn.to.component == id && conn.to.pin >= inputs
                || conn.from.component == id && conn.from.pin >= outputs)
        });
        Ok(resized)
    }

    pub fn set_input(&mut self, id: ComponentId, value: bool) -> Result<(), CircuitError> {
        let component = self.component_mut(id)?;
        match &mut component.kind {
            GateKind::Input { state } => {
                *state = value;
                Ok(())
            }
            _ => Err(CircuitError::NotAnInput(id)),
        }
    }

    /// Flip an input switch and return its new state.
    pub fn toggle_input(&mut self, id: ComponentId) -> Result<bool, CircuitError> {
        let component = self.component_mut(id)?;
        match &mut component.kind {
            GateKind::Input { state } => {
                *state = !*state;
                Ok(*state)
            }
            _ => Err(CircuitError::NotAnInput(id)),
        }
    }

    pub fn set_label(&mut self, id: ComponentId, label: Option<String>) -> Result<(), CircuitError> {
        self.component_mut(id)?.label = label;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: ComponentId, degrees: f64) -> Result<(), CircuitError> {
        self.component_mut(id)?.rotation = degrees.rem_euclid(360.0);
        Ok(())
    }

    pub fn move_component(&mut self, id: ComponentId, x: f64, y: f64) -> Result<(), CircuitError> {
        let component = self.component_mut(id)?;
        component.x = x;
        component.y = y;
        Ok(())
    }

    pub fn add_annotation(&mut self, annotation: Annotation) -> AnnotationId {
        self.insert_annotation(annotation)
    }

    /// Insert a fully-formed annotation (loader path).
    ///
    /// An annotation whose id is already present gets a fresh id.
    pub fn insert_annotation(&mut self, mut annotation: Annotation) -> AnnotationId {
        if self.annotations.iter().any(|a| a.id == annotation.id) {
            annotation.id = AnnotationId::new();
        }
        let id = annotation.id;
        self.annotations.push(annotation);
        id
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<Annotation, CircuitError> {
        let index = self
            .annotations
            .iter()
            .position(|a| a.id == id)
            .ok_or(CircuitError::UnknownAnnotation(id))?;
        Ok(self.annotations.remove(index))
    }

    /// Smallest `INx` label (x >= 1) not used by an existing input switch.
    #[must_use]
    pub fn next_input_label(&self) -> String {
        let used: HashSet<u32> = self
            .inputs()
            .filter_map(Component::label)
            .filter_map(|label| label.strip_prefix("IN"))
            .filter_map(|num| num.parse().ok())
            .collect();
        let next = (1..).find(|n| !used.contains(n)).unwrap_or(1);
        format!("IN{next}")
    }
}
