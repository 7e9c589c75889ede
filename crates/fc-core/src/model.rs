//! Diagram entity model.
//!
//! A diagram is a flat, depth-ordered list of entities. Shapes come from a
//! small fixed catalog; connectors are entities too, holding non-owning
//! references (IDs + port indices) to the two shapes they join. Everything
//! kind-specific (ports, outline, hit test) is a `match` on [`EntityKind`].

use crate::geom::{Bounds, distance_to_segment, segment_intersection};
use crate::id::EntityId;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;

// ─── Shapes ──────────────────────────────────────────────────────────────

/// The shape catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Plain rectangle.
    Process,
    /// Terminator (rounded ends, rectangular outline for geometry).
    Start,
    /// Parallelogram.
    InputOutput,
    /// Diamond.
    Decision,
    /// Rectangle with inner side bars.
    Subprocess,
}

const MID_EDGE_PORTS: [(f64, f64); 4] = [(0.0, 0.5), (0.5, 0.0), (1.0, 0.5), (0.5, 1.0)];
const IO_PORTS: [(f64, f64); 4] = [(0.4, 1.0), (0.6, 0.0), (0.1, 0.5), (0.9, 0.5)];
const DECISION_PORTS: [(f64, f64); 3] = [(0.0, 0.5), (0.5, 0.0), (1.0, 0.5)];

/// Horizontal slant of the input/output parallelogram, as a fraction of width.
pub const IO_SLANT: f64 = 0.2;

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Process,
        ShapeKind::Start,
        ShapeKind::InputOutput,
        ShapeKind::Decision,
        ShapeKind::Subprocess,
    ];

    /// Port anchors in box-relative `[0,1]×[0,1]` space.
    pub fn ports(self) -> &'static [(f64, f64)] {
        match self {
            ShapeKind::Process | ShapeKind::Start | ShapeKind::Subprocess => &MID_EDGE_PORTS,
            ShapeKind::InputOutput => &IO_PORTS,
            ShapeKind::Decision => &DECISION_PORTS,
        }
    }

    /// ID prefix for generated entity IDs.
    pub fn prefix(self) -> &'static str {
        match self {
            ShapeKind::Process => "process",
            ShapeKind::Start => "start",
            ShapeKind::InputOutput => "io",
            ShapeKind::Decision => "decision",
            ShapeKind::Subprocess => "subprocess",
        }
    }

    /// Outline vertices in fixed edge-enumeration order. Edge `i` runs from
    /// vertex `i` to vertex `(i + 1) % 4`.
    pub fn outline(self, b: &Bounds) -> [Point; 4] {
        match self {
            ShapeKind::Process | ShapeKind::Start | ShapeKind::Subprocess => [
                Point::new(b.x(), b.y()),
                Point::new(b.x(), b.max_y()),
                Point::new(b.max_x(), b.max_y()),
                Point::new(b.max_x(), b.y()),
            ],
            ShapeKind::Decision => {
                let c = b.center();
                [
                    Point::new(c.x, b.y()),
                    Point::new(b.x(), c.y),
                    Point::new(c.x, b.max_y()),
                    Point::new(b.max_x(), c.y),
                ]
            }
            ShapeKind::InputOutput => [
                b.at_fraction(IO_SLANT, 0.0),
                b.at_fraction(0.0, 1.0),
                b.at_fraction(1.0 - IO_SLANT, 1.0),
                b.at_fraction(1.0, 0.0),
            ],
        }
    }
}

// ─── Connectors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorStatus {
    PreDraw,
    Drawing,
    Completed,
    Failed,
}

/// A connector end bound to one port of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef {
    pub entity: EntityId,
    pub port: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub status: ConnectorStatus,
    pub start: Option<PortRef>,
    pub end: Option<PortRef>,
    /// World-space endpoints, recomputed from the bound ports every frame.
    pub start_point: Point,
    pub end_point: Point,
    /// Max distance from the line that still counts as a hit.
    pub tolerance: f64,
}

impl Connector {
    pub fn new(at: Point, tolerance: f64) -> Self {
        Self {
            status: ConnectorStatus::PreDraw,
            start: None,
            end: None,
            start_point: at,
            end_point: at,
            tolerance,
        }
    }

    /// Whether `entity` is one of this connector's endpoints.
    pub fn references(&self, entity: EntityId) -> bool {
        [self.start, self.end]
            .iter()
            .flatten()
            .any(|p| p.entity == entity)
    }
}

// ─── Entities ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Shape(ShapeKind),
    Connector(Connector),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected,
    Moving,
    Resizing,
    TextEditing,
}

impl SelectionState {
    pub fn is_selected(self) -> bool {
        self != SelectionState::Unselected
    }
}

/// The corner being dragged during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeHandle {
    #[default]
    None,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const CORNERS: [ResizeHandle; 4] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    /// Index into [`Interaction::grips`] and [`Bounds::corners`].
    pub fn corner_index(self) -> Option<usize> {
        match self {
            ResizeHandle::None => None,
            ResizeHandle::TopLeft => Some(0),
            ResizeHandle::TopRight => Some(1),
            ResizeHandle::BottomLeft => Some(2),
            ResizeHandle::BottomRight => Some(3),
        }
    }

    /// `(sx, sy)`: +1 when the handle sits on the max side of that axis.
    pub fn signs(self) -> Option<(f64, f64)> {
        match self {
            ResizeHandle::None => None,
            ResizeHandle::TopLeft => Some((-1.0, -1.0)),
            ResizeHandle::TopRight => Some((1.0, -1.0)),
            ResizeHandle::BottomLeft => Some((-1.0, 1.0)),
            ResizeHandle::BottomRight => Some((1.0, 1.0)),
        }
    }
}

/// Two-step trigger for label editing on an already-selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditArm {
    #[default]
    Idle,
    Armed,
}

/// Per-entity pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interaction {
    pub state: SelectionState,
    pub handle: ResizeHandle,
    /// Offsets from the pointer to each box corner, captured when a drag
    /// starts. The move grip is `grips[0]` (top-left corner).
    pub grips: [Vec2; 4],
    pub edit_arm: EditArm,
}

/// Text-content slot. Layout and shaping belong to the host's text system.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Label {
    pub text: String,
    /// Frame on which editing began; drives the caret blink phase.
    pub edit_started: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Authoritative position and size.
    pub bound: Bounds,
    /// Index in the diagram's draw order; larger is on top.
    pub depth: usize,
    pub interaction: Interaction,
    pub label: Label,
}

impl Entity {
    pub fn shape(kind: ShapeKind, bound: Bounds) -> Self {
        Self {
            id: EntityId::for_shape(kind),
            kind: EntityKind::Shape(kind),
            bound,
            depth: 0,
            interaction: Interaction::default(),
            label: Label::default(),
        }
    }

    pub fn connector(at: Point, tolerance: f64) -> Self {
        Self {
            id: EntityId::for_connector(),
            kind: EntityKind::Connector(Connector::new(at, tolerance)),
            bound: Bounds::point(at),
            depth: 0,
            interaction: Interaction::default(),
            label: Label::default(),
        }
    }

    pub fn is_connector(&self) -> bool {
        matches!(self.kind, EntityKind::Connector(_))
    }

    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self.kind {
            EntityKind::Shape(kind) => Some(kind),
            EntityKind::Connector(_) => None,
        }
    }

    pub fn as_connector(&self) -> Option<&Connector> {
        match &self.kind {
            EntityKind::Connector(c) => Some(c),
            EntityKind::Shape(_) => None,
        }
    }

    pub fn as_connector_mut(&mut self) -> Option<&mut Connector> {
        match &mut self.kind {
            EntityKind::Connector(c) => Some(c),
            EntityKind::Shape(_) => None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.interaction.state
    }

    pub fn is_selected(&self) -> bool {
        self.interaction.state.is_selected()
    }

    /// Drop back to `Unselected`, clearing drag and edit state.
    pub fn unselect(&mut self) {
        self.interaction = Interaction::default();
    }

    pub fn ports(&self) -> &'static [(f64, f64)] {
        match self.kind {
            EntityKind::Shape(kind) => kind.ports(),
            EntityKind::Connector(_) => &[],
        }
    }

    /// World-space position of port `index`.
    pub fn port_position(&self, index: usize) -> Option<Point> {
        self.ports()
            .get(index)
            .map(|&(fx, fy)| self.bound.at_fraction(fx, fy))
    }

    pub fn port_positions(&self) -> SmallVec<[Point; 4]> {
        self.ports()
            .iter()
            .map(|&(fx, fy)| self.bound.at_fraction(fx, fy))
            .collect()
    }

    /// Index of the port closest (squared distance) to `target`.
    pub fn nearest_port(&self, target: Point) -> Option<usize> {
        self.port_positions()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(target)
                    .total_cmp(&b.distance_squared(target))
            })
            .map(|(i, _)| i)
    }

    /// Whether this entity is hit by `query`.
    ///
    /// Shapes use strict AABB overlap with their bound. Connectors measure
    /// the distance from the query's center to the endpoint line and reject
    /// points whose projection falls outside the segment.
    pub fn hit_test(&self, query: &Bounds) -> bool {
        match &self.kind {
            EntityKind::Shape(_) => self.bound.overlaps(query),
            EntityKind::Connector(c) => {
                distance_to_segment(query.center(), c.start_point, c.end_point)
                    .is_some_and(|d| d <= c.tolerance)
            }
        }
    }

    /// The box to file this entity under in the spatial index. Connectors are
    /// grown by their hit tolerance so near-misses still reach them.
    pub fn index_bound(&self) -> Bounds {
        match &self.kind {
            EntityKind::Shape(_) => self.bound,
            EntityKind::Connector(c) => self.bound.inset(-c.tolerance),
        }
    }

    /// Crossings of segment `p1→p2` with this shape's outline, in edge
    /// enumeration order (not sorted by distance). Connectors have no outline.
    pub fn boundary_intersection(&self, p1: Point, p2: Point) -> SmallVec<[Point; 4]> {
        let Some(kind) = self.shape_kind() else {
            return SmallVec::new();
        };
        let v = kind.outline(&self.bound);
        (0..4)
            .filter_map(|i| segment_intersection(p1, p2, v[i], v[(i + 1) % 4]))
            .collect()
    }

    /// The box the label is laid out in.
    pub fn text_anchor(&self, inset: f64) -> Bounds {
        self.bound.inset(inset)
    }

    /// Refresh a connector's bound from its current endpoints.
    pub fn sync_connector_bound(&mut self) {
        if let EntityKind::Connector(c) = &self.kind {
            self.bound = Bounds::enclosing(c.start_point, c.end_point);
        }
    }
}
