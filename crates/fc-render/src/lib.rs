pub mod hit;
pub mod paint;

pub use hit::{pick_topmost, probe, shape_at};
pub use paint::{ConnectorPaint, Frame, LabelRenderer, PaintItem, ShapePaint, paint_diagram};
