//! Connector binding and per-frame occlusion trimming.
//!
//! A connector is drawn as a free line, then bound to the shapes under its
//! two ends. Binding stores a port index per end, never coordinates, so the
//! connector follows its shapes as they move and resize.
//!
//! Every frame a completed connector's line is re-trimmed against the shapes
//! stacked above its endpoint shapes. The walk is purely visual: it never
//! touches the binding.

use fc_core::geom::Bounds;
use fc_core::id::EntityId;
use fc_core::model::{ConnectorStatus, Entity, PortRef};
use fc_core::{Diagram, QuadTree};
use fc_render::ConnectorPaint;
use fc_render::hit::{shape_at, shapes_hit};
use kurbo::{Line, Point};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("no shape under the connector start")]
    NoShapeAtStart,
    #[error("no shape under the connector end")]
    NoShapeAtEnd,
    #[error("both connector ends are on the same shape")]
    SameShape,
    #[error("connector endpoint no longer resolves to a shape port")]
    MissingEndpoint,
}

// ─── Binding ─────────────────────────────────────────────────────────────────

/// The crossing of `shape`'s outline with the centre line nearest `toward`,
/// or `toward` itself when the line never leaves the shape.
fn exit_point(shape: &Entity, from: Point, toward: Point) -> Point {
    shape
        .boundary_intersection(from, toward)
        .into_iter()
        .min_by(|a, b| {
            a.distance_squared(toward)
                .total_cmp(&b.distance_squared(toward))
        })
        .unwrap_or(toward)
}

/// Bind connector `id` to the shapes under its two ends.
///
/// On success the connector is `Completed` with a port on each shape; the
/// caller deletes it on error. The index must hold current shape bounds.
pub fn bind(
    diagram: &mut Diagram,
    index: &QuadTree<EntityId>,
    id: EntityId,
) -> Result<(PortRef, PortRef), BindError> {
    let (p1, p2) = diagram
        .get(id)
        .and_then(Entity::as_connector)
        .map(|c| (c.start_point, c.end_point))
        .ok_or(BindError::MissingEndpoint)?;

    let a = shape_at(diagram, index, p1).ok_or(BindError::NoShapeAtStart)?;
    let b = shape_at(diagram, index, p2).ok_or(BindError::NoShapeAtEnd)?;
    if a == b {
        return Err(BindError::SameShape);
    }

    let (sa, sb) = match (diagram.get(a), diagram.get(b)) {
        (Some(sa), Some(sb)) => (sa, sb),
        _ => return Err(BindError::MissingEndpoint),
    };
    let (ca, cb) = (sa.bound.center(), sb.bound.center());
    let port_a = sa
        .nearest_port(exit_point(sa, ca, cb))
        .ok_or(BindError::MissingEndpoint)?;
    let port_b = sb
        .nearest_port(exit_point(sb, cb, ca))
        .ok_or(BindError::MissingEndpoint)?;

    let start = PortRef { entity: a, port: port_a };
    let end = PortRef { entity: b, port: port_b };
    if let Some(c) = diagram.get_mut(id).and_then(Entity::as_connector_mut) {
        c.start = Some(start);
        c.end = Some(end);
        c.status = ConnectorStatus::Completed;
    }
    refresh_endpoints(diagram, id)?;
    log::debug!("{id} bound {a}:{port_a} -> {b}:{port_b}");
    Ok((start, end))
}

fn port_world(diagram: &Diagram, port: Option<PortRef>) -> Option<Point> {
    let port = port?;
    diagram.get(port.entity)?.port_position(port.port)
}

/// Recompute a bound connector's endpoints from its ports and resync its
/// bounding box.
pub fn refresh_endpoints(diagram: &mut Diagram, id: EntityId) -> Result<(), BindError> {
    let (start, end) = diagram
        .get(id)
        .and_then(Entity::as_connector)
        .map(|c| (c.start, c.end))
        .ok_or(BindError::MissingEndpoint)?;
    let p1 = port_world(diagram, start).ok_or(BindError::MissingEndpoint)?;
    let p2 = port_world(diagram, end).ok_or(BindError::MissingEndpoint)?;

    let entity = diagram.get_mut(id).ok_or(BindError::MissingEndpoint)?;
    if let Some(c) = entity.as_connector_mut() {
        c.start_point = p1;
        c.end_point = p2;
    }
    entity.sync_connector_bound();
    Ok(())
}

// ─── Occlusion ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimOutcome {
    /// Draw `visible_start → visible_end`.
    Visible,
    /// The occluded spans from both ends meet or cross: draw nothing.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trim {
    pub visible_start: Point,
    pub visible_end: Point,
    pub outcome: TrimOutcome,
}

impl Trim {
    pub fn paint(&self) -> ConnectorPaint {
        match self.outcome {
            TrimOutcome::Visible => {
                ConnectorPaint::Visible(Line::new(self.visible_start, self.visible_end))
            }
            TrimOutcome::Hidden => ConnectorPaint::Hidden,
        }
    }
}

/// A point on the connector line where it enters or leaves an obstacle.
#[derive(Debug, Clone, Copy)]
struct Crossing {
    at: Point,
    obstacle: EntityId,
    depth: usize,
}

/// Walk crossings in order, toggling obstacles in and out of the occluding
/// set. Only obstacles deeper than `above` can open a span. Returns the index
/// where the set first drains after being non-empty.
fn walk<'a>(crossings: impl Iterator<Item = (usize, &'a Crossing)>, above: usize) -> Walk {
    let mut open: SmallVec<[EntityId; 4]> = SmallVec::new();
    let mut seen = false;
    for (i, c) in crossings {
        if let Some(pos) = open.iter().position(|id| *id == c.obstacle) {
            open.swap_remove(pos);
            if seen && open.is_empty() {
                return Walk::Closed(i);
            }
        } else if c.depth > above {
            open.push(c.obstacle);
            seen = true;
        }
    }
    if open.is_empty() {
        Walk::Clear
    } else {
        Walk::Unbalanced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Nothing occluded this end.
    Clear,
    /// The occluded span from this end ends at this crossing.
    Closed(usize),
    /// The set never drained: an odd crossing count somewhere.
    Unbalanced,
}

/// Trim completed connector `id` against the shapes drawn above its ends.
///
/// `None` if `id` is not a completed connector with both ends resolvable.
pub fn trim(diagram: &Diagram, index: &QuadTree<EntityId>, id: EntityId) -> Option<Trim> {
    let entity = diagram.get(id)?;
    let c = entity.as_connector()?;
    if c.status != ConnectorStatus::Completed {
        return None;
    }
    let start = diagram.get(c.start?.entity)?;
    let end = diagram.get(c.end?.entity)?;
    let (p1, p2) = (c.start_point, c.end_point);

    let mut crossings: Vec<Crossing> = Vec::new();
    for obstacle_id in shapes_hit(diagram, index, &entity.bound) {
        if obstacle_id == start.id || obstacle_id == end.id {
            continue;
        }
        let Some(obstacle) = diagram.get(obstacle_id) else {
            continue;
        };
        let tag = |at| Crossing {
            at,
            obstacle: obstacle_id,
            depth: obstacle.depth,
        };
        crossings.extend(obstacle.boundary_intersection(p1, p2).into_iter().map(tag));
        for p in [p1, p2] {
            if obstacle.hit_test(&Bounds::point(p)) {
                crossings.push(tag(p));
            }
        }
    }
    crossings.sort_by(|a, b| {
        a.at.distance_squared(p1)
            .total_cmp(&b.at.distance_squared(p1))
    });

    let forward = walk(crossings.iter().enumerate(), start.depth);
    let backward = walk(crossings.iter().enumerate().rev(), end.depth);
    if forward == Walk::Unbalanced || backward == Walk::Unbalanced {
        log::warn!("{id}: unbalanced occlusion walk, leaving that end untrimmed");
    }

    // Untrimmed ends sit just outside the crossing list.
    let (visible_start, first) = match forward {
        Walk::Closed(i) => (crossings[i].at, i as isize),
        Walk::Clear | Walk::Unbalanced => (p1, -1),
    };
    let (visible_end, last) = match backward {
        Walk::Closed(i) => (crossings[i].at, i as isize),
        Walk::Clear | Walk::Unbalanced => (p2, crossings.len() as isize),
    };
    let outcome = if first > last {
        TrimOutcome::Hidden
    } else {
        TrimOutcome::Visible
    };
    log::trace!("{id} trim {visible_start:?} -> {visible_end:?} {outcome:?}");
    Some(Trim {
        visible_start,
        visible_end,
        outcome,
    })
}
