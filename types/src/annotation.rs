//! Canvas annotations: text labels and outline shapes.
//!
//! They carry no signal and never take part in evaluation, but they are part
//! of a circuit document and must survive save/load and undo/redo.

use serde::{Deserialize, Serialize};

use crate::AnnotationId;

pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI";
pub const DEFAULT_FONT_SIZE: u32 = 14;
pub const DEFAULT_TEXT_COLOR: &str = "#DCDCE1";
pub const DEFAULT_BORDER_COLOR: &str = "#5096FF";
pub const DEFAULT_BORDER_WIDTH: u32 = 2;
pub const DEFAULT_DIAMETER: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub text: String,
    pub font_family: String,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub color: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: "Text".to_owned(),
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            color: DEFAULT_TEXT_COLOR.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: u32,
    pub color: String,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: DEFAULT_BORDER_WIDTH,
            color: DEFAULT_BORDER_COLOR.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationShape {
    Text(TextStyle),
    Rect { border: Border, radius: u32 },
    /// Circles keep width and height equal to the diameter.
    Circle { border: Border },
}

impl AnnotationShape {
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "TextAnnotation",
            Self::Rect { .. } => "RectangleAnnotation",
            Self::Circle { .. } => "CircleAnnotation",
        }
    }

    /// Default width and height for a freshly placed annotation.
    #[must_use]
    pub const fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Text(_) => (80.0, 30.0),
            Self::Rect { .. } => (100.0, 80.0),
            Self::Circle { .. } => (DEFAULT_DIAMETER, DEFAULT_DIAMETER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub shape: AnnotationShape,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
}

impl Annotation {
    #[must_use]
    pub fn new(shape: AnnotationShape, x: f64, y: f64) -> Self {
        let (width, height) = shape.default_size();
        Self {
            id: AnnotationId::new(),
            shape,
            x,
            y,
            rotation: 0.0,
            width,
            height,
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(
            AnnotationShape::Text(TextStyle {
                text: text.into(),
                ..TextStyle::default()
            }),
            x,
            y,
        )
    }

    /// Circle diameter; `None` for other shapes.
    #[must_use]
    pub fn diameter(&self) -> Option<f64> {
        matches!(self.shape, AnnotationShape::Circle { .. }).then_some(self.width)
    }

    /// Resize a circle, keeping width and height in sync. No-op for other
    /// shapes.
    pub fn set_diameter(&mut self, diameter: f64) {
        if matches!(self.shape, AnnotationShape::Circle { .. }) {
            self.width = diameter;
            self.height = diameter;
        }
    }
}
