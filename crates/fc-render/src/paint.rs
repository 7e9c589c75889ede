//! Diagram → per-frame display list.
//!
//! Walks the diagram back-to-front and emits one [`PaintItem`] per entity:
//! shape outlines as `kurbo` paths, connectors as their visible segment.
//! Rasterizing the list is the host's job, as is laying out label text;
//! labels are handed to a [`LabelRenderer`] together with their anchor box.

use fc_core::geom::Bounds;
use fc_core::id::EntityId;
use fc_core::model::{ConnectorStatus, Entity, EntityKind, ShapeKind};
use fc_core::Diagram;
use kurbo::{BezPath, Line, Point, Rect, Shape};
use smallvec::SmallVec;

/// How a connector shows up this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectorPaint {
    /// Completed and at least partly unoccluded: draw this segment.
    Visible(Line),
    /// Completed but fully occluded, or failed.
    Hidden,
    /// Still following the pointer.
    Drawing(Line),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapePaint {
    pub kind: ShapeKind,
    pub bound: Bounds,
    pub outline: BezPath,
    pub selected: bool,
    /// Corner handle squares; empty unless selected.
    pub handles: SmallVec<[Rect; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintItem {
    Shape { id: EntityId, shape: ShapePaint },
    Connector { id: EntityId, paint: ConnectorPaint, selected: bool },
}

impl PaintItem {
    pub fn id(&self) -> EntityId {
        match self {
            PaintItem::Shape { id, .. } | PaintItem::Connector { id, .. } => *id,
        }
    }
}

/// One frame's worth of drawing, back-to-front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub items: Vec<PaintItem>,
    /// Ghost of the node a placing tool would drop at the pointer.
    pub preview: Option<ShapePaint>,
}

/// Receives label text and layout boxes each frame.
pub trait LabelRenderer {
    fn render_label(&mut self, id: EntityId, text: &str, anchor: Bounds, caret_visible: bool);
}

/// Discards every label. Handy for hosts without text support and for tests.
impl LabelRenderer for () {
    fn render_label(&mut self, _id: EntityId, _text: &str, _anchor: Bounds, _caret: bool) {}
}

// ─── Outlines ────────────────────────────────────────────────────────────────

/// The drawable outline of a shape.
///
/// Start nodes get fully rounded ends and subprocesses get their inner bars;
/// everything else is the closed polygon also used for intersection tests.
pub fn shape_outline(kind: ShapeKind, bound: &Bounds) -> BezPath {
    match kind {
        ShapeKind::Start => {
            let radius = bound.width().min(bound.height()) / 2.0;
            bound.to_rect().to_rounded_rect(radius).to_path(0.1)
        }
        ShapeKind::Subprocess => {
            let mut path = bound.to_rect().to_path(0.1);
            let bar = bound.width() * 0.1;
            for x in [bound.x() + bar, bound.max_x() - bar] {
                path.move_to((x, bound.y()));
                path.line_to((x, bound.max_y()));
            }
            path
        }
        ShapeKind::Process | ShapeKind::InputOutput | ShapeKind::Decision => {
            polygon(&kind.outline(bound))
        }
    }
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

/// Square handles of side `size` centred on each corner.
pub fn handle_rects(bound: &Bounds, size: f64) -> SmallVec<[Rect; 4]> {
    bound
        .corners()
        .iter()
        .map(|c| Rect::from_center_size(*c, (size, size)))
        .collect()
}

pub fn shape_paint(kind: ShapeKind, bound: Bounds, selected: bool, handle_size: f64) -> ShapePaint {
    ShapePaint {
        kind,
        bound,
        outline: shape_outline(kind, &bound),
        selected,
        handles: if selected {
            handle_rects(&bound, handle_size)
        } else {
            SmallVec::new()
        },
    }
}

// ─── Frame assembly ──────────────────────────────────────────────────────────

/// Build the display list for `diagram`.
///
/// `completed` decides what a completed connector shows (its trimmed
/// segment, or nothing); in-flight connectors always show their raw line.
pub fn paint_diagram(
    diagram: &Diagram,
    handle_size: f64,
    mut completed: impl FnMut(&Entity) -> ConnectorPaint,
) -> Frame {
    let mut frame = Frame::default();
    for entity in diagram.iter() {
        let item = match &entity.kind {
            EntityKind::Shape(kind) => PaintItem::Shape {
                id: entity.id,
                shape: shape_paint(*kind, entity.bound, entity.is_selected(), handle_size),
            },
            EntityKind::Connector(c) => {
                let paint = match c.status {
                    ConnectorStatus::PreDraw | ConnectorStatus::Drawing => {
                        ConnectorPaint::Drawing(Line::new(c.start_point, c.end_point))
                    }
                    ConnectorStatus::Completed => completed(entity),
                    ConnectorStatus::Failed => ConnectorPaint::Hidden,
                };
                PaintItem::Connector {
                    id: entity.id,
                    paint,
                    selected: entity.is_selected(),
                }
            }
        };
        log::trace!("PAINT {} depth {} {:?}", entity.id, entity.depth, entity.bound);
        frame.items.push(item);
    }
    frame
}

/// Hand every shape label to `renderer`, back-to-front.
pub fn paint_labels(
    diagram: &Diagram,
    inset: f64,
    renderer: &mut dyn LabelRenderer,
    mut caret_visible: impl FnMut(&Entity) -> bool,
) {
    for entity in diagram.iter().filter(|e| !e.is_connector()) {
        renderer.render_label(
            entity.id,
            &entity.label.text,
            entity.text_anchor(inset),
            caret_visible(entity),
        );
    }
}
