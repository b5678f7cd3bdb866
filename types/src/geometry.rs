//! Component footprints, pin placement, and rotated hit-testing.
//!
//! Pure arithmetic on the persisted `x`/`y`/`rotation` of a component; no
//! rendering. Pin offsets use integer division so positions land on the
//! same pixels the circuit files were drawn with.

use crate::{Component, GateKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub width: i64,
    pub height: i64,
}

/// Width and height of a component of this kind.
#[must_use]
pub fn footprint(kind: &GateKind) -> Footprint {
    let (width, height) = match *kind {
        GateKind::Logic { inputs, .. } => (80, (20 + i64::from(inputs) * 15).max(60)),
        GateKind::Not => (80, 60),
        GateKind::Mux { select_bits } => {
            let pins = (1i64 << select_bits) + i64::from(select_bits);
            (80, (20 + pins * 12).max(80))
        }
        GateKind::Demux { select_bits } => {
            let pins = (1i64 << select_bits) + i64::from(select_bits);
            (80, (20 + pins * 12).max(80))
        }
        GateKind::Encoder { inputs } => (90, (20 + i64::from(inputs) * 15).max(80)),
        GateKind::Decoder { inputs } => (90, (20 + (1i64 << inputs) * 15).max(80)),
        GateKind::Input { .. } => (70, 50),
        GateKind::Led => (50, 50),
    };
    Footprint { width, height }
}

/// Offset of pin `index` of `count` pins spread along an edge of length
/// `span`, inset by `margin` at both ends. A single pin sits at the middle.
fn spread(index: usize, count: usize, span: i64, margin: i64) -> i64 {
    if count > 1 {
        margin + (index as i64) * (span - 2 * margin) / (count as i64 - 1)
    } else {
        span / 2
    }
}

/// Pin positions relative to the component's top-left corner, unrotated.
#[derive(Debug, Clone, PartialEq)]
pub struct PinLayout {
    pub inputs: Vec<Point>,
    pub outputs: Vec<Point>,
}

#[must_use]
pub fn local_pin_layout(kind: &GateKind) -> PinLayout {
    let Footprint { width, height } = footprint(kind);
    let left = |y: i64| Point::new(0.0, y as f64);
    let right = |y: i64| Point::new(width as f64, y as f64);
    let bottom = |x: i64| Point::new(x as f64, height as f64);

    let n_in = kind.input_count();
    let n_out = kind.output_count();

    match *kind {
        GateKind::Logic { .. } => PinLayout {
            inputs: (0..n_in).map(|i| left(spread(i, n_in, height, 10))).collect(),
            outputs: vec![right(height / 2)],
        },
        GateKind::Not => PinLayout {
            inputs: vec![left(30)],
            outputs: vec![right(30)],
        },
        GateKind::Mux { select_bits } => {
            let data = 1usize << select_bits;
            let select = usize::from(select_bits);
            let mut inputs: Vec<Point> =
                (0..data).map(|i| left(spread(i, data, height, 10))).collect();
            inputs.extend((0..select).map(|i| bottom(spread(i, select, width, 20))));
            PinLayout {
                inputs,
                outputs: vec![right(height / 2)],
            }
        }
        GateKind::Demux { select_bits } => {
            let select = usize::from(select_bits);
            let mut inputs = vec![left(height / 2)];
            inputs.extend((0..select).map(|i| bottom(spread(i, select, width, 20))));
            PinLayout {
                inputs,
                outputs: (0..n_out)
                    .map(|i| right(spread(i, n_out, height, 10)))
                    .collect(),
            }
        }
        GateKind::Encoder { .. } => PinLayout {
            inputs: (0..n_in).map(|i| left(spread(i, n_in, height, 10))).collect(),
            outputs: (0..n_out)
                .map(|i| right(spread(i, n_out, height, 20)))
                .collect(),
        },
        GateKind::Decoder { .. } => PinLayout {
            inputs: (0..n_in).map(|i| left(spread(i, n_in, height, 20))).collect(),
            outputs: (0..n_out)
                .map(|i| right(spread(i, n_out, height, 10)))
                .collect(),
        },
        GateKind::Input { .. } => PinLayout {
            inputs: Vec::new(),
            outputs: vec![right(height / 2)],
        },
        GateKind::Led => PinLayout {
            inputs: vec![left(height / 2)],
            outputs: Vec::new(),
        },
    }
}

/// World-space pin positions, rotated about the component centre.
#[must_use]
pub fn pin_positions(component: &Component) -> PinLayout {
    let Footprint { width, height } = footprint(&component.kind);
    let local = local_pin_layout(&component.kind);
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (sin, cos) = component.rotation.to_radians().sin_cos();

    let place = |p: Point| {
        let (dx, dy) = (p.x - cx, p.y - cy);
        Point::new(
            component.x + cx + dx * cos - dy * sin,
            component.y + cy + dx * sin + dy * cos,
        )
    };

    PinLayout {
        inputs: local.inputs.into_iter().map(place).collect(),
        outputs: local.outputs.into_iter().map(place).collect(),
    }
}

/// Whether `(x, y)` falls inside the component's rotated bounds.
#[must_use]
pub fn contains_point(component: &Component, x: f64, y: f64) -> bool {
    let Footprint { width, height } = footprint(&component.kind);
    let (w, h) = (width as f64, height as f64);
    if component.rotation == 0.0 {
        return component.x <= x
            && x <= component.x + w
            && component.y <= y
            && y <= component.y + h;
    }

    let (cx, cy) = (component.x + w / 2.0, component.y + h / 2.0);
    let (dx, dy) = (x - cx, y - cy);
    let (sin, cos) = (-component.rotation).to_radians().sin_cos();
    let local_x = dx * cos - dy * sin;
    let local_y = dx * sin + dy * cos;
    (-w / 2.0..=w / 2.0).contains(&local_x) && (-h / 2.0..=h / 2.0).contains(&local_y)
}
