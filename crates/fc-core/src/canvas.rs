//! The drawing surface: its size and the margins shapes must stay inside.

use crate::geom::Bounds;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Space reserved around the drawable area. The left margin hosts the tool
/// palette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasMargins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for CanvasMargins {
    fn default() -> Self {
        Self {
            left: 100.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
        }
    }
}

/// The canvas (surface) dimensions plus margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margins: CanvasMargins,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margins: CanvasMargins::default(),
        }
    }
}

impl Canvas {
    pub fn new(width: f64, height: f64, margins: CanvasMargins) -> Self {
        Self {
            width,
            height,
            margins,
        }
    }

    /// The full surface. Used as the spatial index root.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_xywh(0.0, 0.0, self.width, self.height)
    }

    /// The area shapes may occupy.
    pub fn drawable(&self) -> Bounds {
        let m = self.margins;
        Bounds::from_xywh(
            m.left,
            m.top,
            self.width - m.left - m.right,
            self.height - m.top - m.bottom,
        )
    }

    /// Whether `b` lies entirely inside the drawable area (edges inclusive).
    pub fn admits(&self, b: &Bounds) -> bool {
        b.fits_within(&self.drawable())
    }

    /// Whether `p` falls in the palette strip left of the drawable area.
    pub fn in_palette(&self, p: Point) -> bool {
        p.x <= self.margins.left
    }

    /// Clamp a box's x origin so a box of `width` stays inside.
    /// `None` when the box is wider than the drawable area.
    pub fn clamp_x(&self, x: f64, width: f64) -> Option<f64> {
        let area = self.drawable();
        clamp_span(x, width, area.x(), area.max_x())
    }

    /// Vertical counterpart of [`Canvas::clamp_x`].
    pub fn clamp_y(&self, y: f64, height: f64) -> Option<f64> {
        let area = self.drawable();
        clamp_span(y, height, area.y(), area.max_y())
    }

    /// Move `b` by the smallest amount that brings it inside, if it fits at all.
    pub fn clamp(&self, b: Bounds) -> Option<Bounds> {
        let x = self.clamp_x(b.x(), b.width())?;
        let y = self.clamp_y(b.y(), b.height())?;
        Some(b.with_origin(Point::new(x, y)))
    }
}

fn clamp_span(start: f64, len: f64, min: f64, max: f64) -> Option<f64> {
    if len > max - min {
        return None;
    }
    Some(start.clamp(min, max - len))
}
