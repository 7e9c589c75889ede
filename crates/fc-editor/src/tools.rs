//! Tool modes and the palette strip.
//!
//! The active tool decides what a left press on the canvas does: select,
//! drop a new node, or start a connector. The palette occupies the left
//! canvas margin as a column of equal slots; a press there switches tools.
//!
//! | Slot | Tool |
//! |------|------|
//! | 0 | Selection |
//! | 1 | Process |
//! | 2 | Start |
//! | 3 | Input / output |
//! | 4 | Subprocess |
//! | 5 | Decision |
//! | 6 | Connector |

use fc_core::geom::Bounds;
use fc_core::model::ShapeKind;
use fc_core::Canvas;
use kurbo::{Point, Size, Vec2};

/// The active tool determines how pointer presses are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    Selection,
    PlacingNode(ShapeKind),
    DrawingConnector,
}

impl ToolMode {
    /// Palette order, top to bottom.
    pub const PALETTE: [ToolMode; 7] = [
        ToolMode::Selection,
        ToolMode::PlacingNode(ShapeKind::Process),
        ToolMode::PlacingNode(ShapeKind::Start),
        ToolMode::PlacingNode(ShapeKind::InputOutput),
        ToolMode::PlacingNode(ShapeKind::Subprocess),
        ToolMode::PlacingNode(ShapeKind::Decision),
        ToolMode::DrawingConnector,
    ];

    /// The palette slot under `p`, if `p` is inside the palette strip.
    pub fn from_palette(canvas: &Canvas, slot_height: f64, p: Point) -> Option<ToolMode> {
        if !canvas.in_palette(p) || slot_height <= 0.0 {
            return None;
        }
        let slot = ((p.y - canvas.margins.top) / slot_height).floor();
        if slot < 0.0 {
            return None;
        }
        Self::PALETTE.get(slot as usize).copied()
    }

    pub fn is_selection(self) -> bool {
        self == ToolMode::Selection
    }
}

/// Where a node of `size` dropped at `pointer` lands: centred on the pointer,
/// then pushed inside the canvas. `None` if it cannot fit at all.
pub fn placement(canvas: &Canvas, size: Size, pointer: Point) -> Option<Bounds> {
    let origin = pointer - Vec2::new(size.width / 2.0, size.height / 2.0);
    canvas.clamp(Bounds::new(origin, size))
}
