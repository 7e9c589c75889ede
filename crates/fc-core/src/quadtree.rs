//! Region quadtree over axis-aligned boxes.
//!
//! Sized for a few hundred shapes and rebuilt from scratch every frame, so it
//! only supports insert, clear, and range retrieval. Nodes split on demand and
//! never merge. An item lives in the deepest node whose quadrant strictly
//! contains its box; items straddling a center line stay with the ancestor.

use crate::geom::Bounds;
use kurbo::{Size, Vec2};

/// Split policy for a [`QuadTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    /// A leaf splits once it holds more than this many items.
    pub threshold: usize,
    /// Nodes at this depth never split (the root is depth 0).
    pub max_depth: usize,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            threshold: 6,
            max_depth: 8,
        }
    }
}

/// Quadrant order: top-left, top-right, bottom-left, bottom-right.
const TOP_LEFT: usize = 0;
const TOP_RIGHT: usize = 1;
const BOTTOM_LEFT: usize = 2;
const BOTTOM_RIGHT: usize = 3;

/// Which halves of a node a box lies strictly inside.
#[derive(Debug, Clone, Copy)]
struct Halves {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

impl Halves {
    fn quadrant(self) -> Option<usize> {
        match (self.left, self.right, self.top, self.bottom) {
            (true, _, true, _) => Some(TOP_LEFT),
            (_, true, true, _) => Some(TOP_RIGHT),
            (true, _, _, true) => Some(BOTTOM_LEFT),
            (_, true, _, true) => Some(BOTTOM_RIGHT),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuadNode<T> {
    bound: Bounds,
    depth: usize,
    /// All four children exist, or none do.
    children: Option<Box<[QuadNode<T>; 4]>>,
    items: Vec<(T, Bounds)>,
}

impl<T: Copy> QuadNode<T> {
    fn new(bound: Bounds, depth: usize) -> Self {
        Self {
            bound,
            depth,
            children: None,
            items: Vec::new(),
        }
    }

    pub fn bound(&self) -> Bounds {
        self.bound
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<&[QuadNode<T>; 4]> {
        self.children.as_deref()
    }

    /// Items stored directly at this node (not in descendants).
    pub fn items(&self) -> impl Iterator<Item = &(T, Bounds)> {
        self.items.iter()
    }

    fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map_or(0, |c| c.iter().map(QuadNode::len).sum::<usize>())
    }

    fn halves(&self, b: &Bounds) -> Halves {
        let mid = self.bound.center();
        Halves {
            left: b.max_x() < mid.x,
            right: b.x() > mid.x,
            top: b.max_y() < mid.y,
            bottom: b.y() > mid.y,
        }
    }

    fn insert(&mut self, item: T, bounds: Bounds, policy: SplitPolicy) {
        if self.children.is_none() {
            self.items.push((item, bounds));
            if self.items.len() > policy.threshold && self.depth < policy.max_depth {
                self.split(policy);
            }
            return;
        }
        self.place(item, bounds, policy);
    }

    /// Push into the child quadrant holding `bounds`, or keep it here.
    fn place(&mut self, item: T, bounds: Bounds, policy: SplitPolicy) {
        let quadrant = self.halves(&bounds).quadrant();
        match (quadrant, self.children.as_mut()) {
            (Some(q), Some(children)) => children[q].insert(item, bounds, policy),
            _ => self.items.push((item, bounds)),
        }
    }

    fn split(&mut self, policy: SplitPolicy) {
        let half = Size::new(self.bound.width() / 2.0, self.bound.height() / 2.0);
        let origin = self.bound.origin();
        let depth = self.depth + 1;
        let child =
            |dx: f64, dy: f64| QuadNode::new(Bounds::new(origin + Vec2::new(dx, dy), half), depth);
        self.children = Some(Box::new([
            child(0.0, 0.0),
            child(half.width, 0.0),
            child(0.0, half.height),
            child(half.width, half.height),
        ]));
        log::trace!(
            "quadtree split at depth {} ({} items)",
            self.depth,
            self.items.len()
        );

        let items = std::mem::take(&mut self.items);
        for (item, bounds) in items {
            self.place(item, bounds, policy);
        }
    }

    fn retrieve(&self, query: &Bounds, out: &mut Vec<T>) {
        out.extend(self.items.iter().map(|(item, _)| *item));
        let Some(children) = &self.children else {
            return;
        };

        let halves = self.halves(query);
        if let Some(q) = halves.quadrant() {
            children[q].retrieve(query, out);
            return;
        }

        let targets: &[usize] = if halves.top {
            &[TOP_LEFT, TOP_RIGHT]
        } else if halves.bottom {
            &[BOTTOM_LEFT, BOTTOM_RIGHT]
        } else if halves.left {
            &[TOP_LEFT, BOTTOM_LEFT]
        } else if halves.right {
            &[TOP_RIGHT, BOTTOM_RIGHT]
        } else {
            &[TOP_LEFT, TOP_RIGHT, BOTTOM_LEFT, BOTTOM_RIGHT]
        };
        for &q in targets {
            children[q].retrieve(query, out);
        }
    }
}

/// A spatial index of `(item, box)` pairs.
///
/// Items are stored by value and should be cheap handles (the editor stores
/// entity IDs), never owners.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    root: QuadNode<T>,
    policy: SplitPolicy,
}

impl<T: Copy> QuadTree<T> {
    pub fn new(bound: Bounds, policy: SplitPolicy) -> Self {
        Self {
            root: QuadNode::new(bound, 0),
            policy,
        }
    }

    pub fn root(&self) -> &QuadNode<T> {
        &self.root
    }

    pub fn bound(&self) -> Bounds {
        self.root.bound
    }

    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Re-target the root region. Only meaningful on an empty tree.
    pub fn set_bound(&mut self, bound: Bounds) {
        self.root.bound = bound;
    }

    /// Total number of stored items.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard every node and item.
    pub fn clear(&mut self) {
        self.root.items.clear();
        self.root.children = None;
    }

    pub fn insert(&mut self, item: T, bounds: Bounds) {
        let policy = self.policy;
        self.root.insert(item, bounds, policy);
    }

    /// Clear, re-target, and bulk-insert in one pass.
    pub fn rebuild(&mut self, bound: Bounds, items: impl IntoIterator<Item = (T, Bounds)>) {
        self.clear();
        self.set_bound(bound);
        for (item, bounds) in items {
            self.insert(item, bounds);
        }
    }

    /// Candidates that may overlap `query`.
    ///
    /// A superset of the items whose boxes truly overlap: callers still run
    /// their own hit test. Each item is returned at most once.
    pub fn retrieve(&self, query: &Bounds) -> Vec<T> {
        let mut out = Vec::new();
        self.root.retrieve(query, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn tree(size: f64) -> QuadTree<usize> {
        QuadTree::new(Bounds::from_xywh(0.0, 0.0, size, size), SplitPolicy::default())
    }

    #[test]
    fn seventh_item_splits_root() {
        let mut qt = tree(100.0);
        let boxes: Vec<Bounds> = (0..7)
            .map(|i| Bounds::from_xywh(5.0 + 12.0 * i as f64, 10.0 + 11.0 * i as f64, 1.0, 1.0))
            .collect();
        for (i, b) in boxes.iter().enumerate() {
            qt.insert(i, *b);
            if i < 6 {
                assert!(qt.root().is_leaf(), "split too early at item {i}");
            }
        }

        let children = qt.root().children().expect("root should have split");
        assert_eq!(children.len(), 4);
        assert_eq!(children[TOP_LEFT].bound(), Bounds::from_xywh(0.0, 0.0, 50.0, 50.0));
        assert_eq!(children[BOTTOM_RIGHT].bound(), Bounds::from_xywh(50.0, 50.0, 50.0, 50.0));

        for (i, b) in boxes.iter().enumerate() {
            assert!(qt.retrieve(b).contains(&i), "box {i} not retrievable");
        }
        assert_eq!(qt.len(), 7);
    }

    #[test]
    fn straddling_items_stay_at_splitting_node() {
        let mut qt = tree(100.0);
        // Crosses both center lines.
        qt.insert(99, Bounds::from_xywh(45.0, 45.0, 10.0, 10.0));
        for i in 0..6 {
            qt.insert(i, Bounds::from_xywh(2.0 + i as f64 * 3.0, 2.0, 1.0, 1.0));
        }
        assert!(!qt.root().is_leaf());
        let at_root: Vec<usize> = qt.root().items().map(|(id, _)| *id).collect();
        assert_eq!(at_root, vec![99]);
        assert_eq!(qt.root().children().unwrap()[TOP_LEFT].items().count(), 6);
    }

    #[test]
    fn child_bounds_contain_their_items() {
        let mut qt = tree(200.0);
        for i in 0..40 {
            let x = (i * 37 % 190) as f64;
            let y = (i * 53 % 190) as f64;
            qt.insert(i, Bounds::from_xywh(x, y, 4.0, 4.0));
        }
        fn check(node: &QuadNode<usize>) {
            for (_, b) in node.items() {
                assert!(b.fits_within(&node.bound()), "{b:?} outside {:?}", node.bound());
            }
            if let Some(children) = node.children() {
                children.iter().for_each(check);
            }
        }
        check(qt.root());
    }

    #[test]
    fn depth_cap_stops_recursion_on_coincident_points() {
        let mut qt = tree(100.0);
        for i in 0..50 {
            qt.insert(i, Bounds::from_xywh(10.0, 10.0, 0.0, 0.0));
        }
        assert_eq!(qt.len(), 50);
        assert_eq!(qt.retrieve(&Bounds::from_xywh(10.0, 10.0, 0.0, 0.0)).len(), 50);

        fn max_depth(node: &QuadNode<usize>) -> usize {
            node.children()
                .map_or(node.depth(), |c| c.iter().map(max_depth).max().unwrap_or(0))
        }
        assert!(max_depth(qt.root()) <= SplitPolicy::default().max_depth);
    }

    #[test]
    fn clear_discards_everything() {
        let mut qt = tree(100.0);
        for i in 0..20 {
            qt.insert(i, Bounds::from_xywh(i as f64 * 4.0, 3.0, 1.0, 1.0));
        }
        qt.clear();
        assert!(qt.is_empty());
        assert!(qt.root().is_leaf());
        assert!(qt.retrieve(&qt.bound()).is_empty());
    }

    fn item_strategy() -> impl Strategy<Value = Bounds> {
        (0.0f64..380.0, 0.0f64..380.0, 0.0f64..60.0, 0.0f64..60.0)
            .prop_map(|(x, y, w, h)| Bounds::from_xywh(x, y, w, h))
    }

    proptest! {
        #[test]
        fn retrieve_is_superset_without_duplicates(
            items in prop::collection::vec(item_strategy(), 0..120),
            query in item_strategy(),
        ) {
            let mut qt = tree(400.0);
            for (i, b) in items.iter().enumerate() {
                qt.insert(i, *b);
            }
            let found = qt.retrieve(&query);

            let mut sorted = found.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), found.len());

            for (i, b) in items.iter().enumerate() {
                if b.overlaps(&query) {
                    prop_assert!(found.contains(&i), "missing overlapping item {}", i);
                }
            }
        }
    }
}
