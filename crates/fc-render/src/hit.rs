//! Hit testing: pointer → entity lookup.
//!
//! The quadtree narrows the search to a handful of candidates; the entity's
//! own hit test decides, and the front-most (largest depth) survivor wins.

use fc_core::geom::Bounds;
use fc_core::id::EntityId;
use fc_core::model::Entity;
use fc_core::{Diagram, QuadTree};
use kurbo::{Point, Vec2};

/// The probe box for a pointer that moved `velocity` px since the last event.
pub fn probe(pointer: Point, velocity: f64) -> Bounds {
    Bounds::around(pointer, Vec2::new(velocity, velocity))
}

/// Live entities found by searching the index with `search` whose own hit
/// test accepts `query`, back-to-front.
///
/// IDs the index still holds for deleted entities are skipped.
fn live_hits<'a>(
    diagram: &'a Diagram,
    index: &QuadTree<EntityId>,
    search: &Bounds,
    query: &Bounds,
) -> Vec<&'a Entity> {
    let mut hits: Vec<&Entity> = index
        .retrieve(search)
        .into_iter()
        .filter_map(|id| diagram.get(id))
        .filter(|e| e.hit_test(query))
        .collect();
    hits.sort_by_key(|e| e.depth);
    hits
}

/// Every live entity whose hit test accepts `query`, back-to-front.
pub fn hit_candidates<'a>(
    diagram: &'a Diagram,
    index: &QuadTree<EntityId>,
    query: &Bounds,
) -> Vec<&'a Entity> {
    live_hits(diagram, index, query, query)
}

/// The front-most entity under `pointer`.
///
/// The index is searched with a box padded by `pad` (the pointer's recent
/// travel) so fast motion across thin shapes is not missed; the final test
/// is against the pointer itself.
pub fn pick_topmost(
    diagram: &Diagram,
    index: &QuadTree<EntityId>,
    pointer: Point,
    pad: f64,
) -> Option<EntityId> {
    live_hits(diagram, index, &probe(pointer, pad), &Bounds::point(pointer))
        .last()
        .map(|e| e.id)
}

/// The front-most shape (never a connector) under `point`.
pub fn shape_at(diagram: &Diagram, index: &QuadTree<EntityId>, point: Point) -> Option<EntityId> {
    hit_candidates(diagram, index, &Bounds::point(point))
        .into_iter()
        .rev()
        .find(|e| !e.is_connector())
        .map(|e| e.id)
}

/// Live shapes (never connectors) whose hit test accepts `query`,
/// back-to-front. Used to gather connector obstacles.
pub fn shapes_hit(diagram: &Diagram, index: &QuadTree<EntityId>, query: &Bounds) -> Vec<EntityId> {
    hit_candidates(diagram, index, query)
        .into_iter()
        .filter(|e| !e.is_connector())
        .map(|e| e.id)
        .collect()
}
