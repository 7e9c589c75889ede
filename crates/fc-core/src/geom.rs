//! Geometry primitives: the axis-aligned `Bounds` box and segment helpers.
//!
//! Points and vectors are plain `kurbo` types. `Bounds` adds the two rules the
//! editor depends on: sizes never go negative, and overlap is strict (boxes
//! that only share an edge do not overlap).

use kurbo::{Point, Rect, Size, Vec2};

/// An axis-aligned box: origin (top-left) plus a non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Bounds {
    pub fn new(origin: Point, size: Size) -> Self {
        Self::from_xywh(origin.x, origin.y, size.width, size.height)
    }

    /// Build from raw components. Negative (or NaN) sizes clamp to zero.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// A zero-size box at `p`.
    pub fn point(p: Point) -> Self {
        Self::from_xywh(p.x, p.y, 0.0, 0.0)
    }

    /// A probe box centered on `center`, extending `pad` in each direction.
    pub fn around(center: Point, pad: Vec2) -> Self {
        let pad = Vec2::new(pad.x.abs(), pad.y.abs());
        Self::from_xywh(
            center.x - pad.x,
            center.y - pad.y,
            pad.x * 2.0,
            pad.y * 2.0,
        )
    }

    /// The smallest box holding both points.
    pub fn enclosing(a: Point, b: Point) -> Self {
        Self::from_xywh(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::from_xywh(rect.x0, rect.y0, rect.width(), rect.height())
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.max_x(), self.max_y())
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    pub fn set_size(&mut self, size: Size) {
        self.width = size.width.max(0.0);
        self.height = size.height.max(0.0);
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.set_origin(origin);
        self
    }

    /// Corners in top-left, top-right, bottom-left, bottom-right order.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.max_x(), self.y),
            Point::new(self.x, self.max_y()),
            Point::new(self.max_x(), self.max_y()),
        ]
    }

    /// Map a box-relative fraction (`[0,1]×[0,1]`) to world space.
    pub fn at_fraction(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.x + self.width * fx, self.y + self.height * fy)
    }

    /// Shrink by `d` on every side. Collapses to zero size rather than inverting.
    pub fn inset(&self, d: f64) -> Self {
        Self::from_xywh(
            self.x + d,
            self.y + d,
            self.width - 2.0 * d,
            self.height - 2.0 * d,
        )
    }

    /// Strict AABB test: the open-interval projections overlap on both axes.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Strict point containment, i.e. overlap with a zero-size box at `p`.
    pub fn contains(&self, p: Point) -> bool {
        self.overlaps(&Bounds::point(p))
    }

    /// Inclusive containment of `self` inside `outer`.
    pub fn fits_within(&self, outer: &Bounds) -> bool {
        self.x >= outer.x
            && self.y >= outer.y
            && self.max_x() <= outer.max_x()
            && self.max_y() <= outer.max_y()
    }
}

/// Intersection of segments `a1→a2` and `b1→b2`.
///
/// Dual-projection test: each segment's supporting line must strictly separate
/// the other segment's endpoints. Segments that only touch at an endpoint, and
/// parallel or collinear segments, report no intersection. This is a
/// simplification of the general case, not an assumption that inputs are in
/// general position.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let n2 = Vec2::new(b2.y - b1.y, b1.x - b2.x);
    let prj_b1 = b1.to_vec2().dot(n2);
    let prj_a1 = a1.to_vec2().dot(n2);
    let prj_a2 = a2.to_vec2().dot(n2);
    if (prj_a1 - prj_b1) * (prj_a2 - prj_b1) >= 0.0 {
        return None;
    }

    let n1 = Vec2::new(a2.y - a1.y, a1.x - a2.x);
    let prj_a1_n1 = a1.to_vec2().dot(n1);
    let prj_b1_n1 = b1.to_vec2().dot(n1);
    let prj_b2_n1 = b2.to_vec2().dot(n1);
    if (prj_b1_n1 - prj_a1_n1) * (prj_b2_n1 - prj_a1_n1) >= 0.0 {
        return None;
    }

    let denominator = n1.x * n2.y - n1.y * n2.x;
    if denominator == 0.0 {
        return None;
    }
    let fraction = (prj_a1 - prj_b1) / denominator;
    Some(Point::new(a1.x + fraction * n1.y, a1.y - fraction * n1.x))
}

/// Distance from `p` to segment `a→b`, or `None` when the perpendicular
/// projection of `p` falls outside the segment.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> Option<f64> {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return Some(p.distance(a));
    }
    let t = (p - a).dot(ab) / len2;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some(p.distance(a + ab * t))
}
