//! Geometric predicates for axis-aligned rooms and polygon boundaries.
//!
//! Rooms are rectangles stored as centre + half-extents. Everything here is
//! a pure function of its arguments; nothing is cached between calls.

use serde::{Deserialize, Serialize};

/// A 2-D point in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle (centre + half-extents).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub cx: f32,
    pub cy: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            cx: x,
            cy: y,
            half_w: width / 2.0,
            half_h: height / 2.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.cx - self.half_w
    }
    pub fn right(&self) -> f32 {
        self.cx + self.half_w
    }
    pub fn top(&self) -> f32 {
        self.cy - self.half_h
    }
    pub fn bottom(&self) -> f32 {
        self.cy + self.half_h
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    /// Same extents, centred elsewhere.
    pub fn moved_to(&self, x: f32, y: f32) -> Self {
        Self {
            cx: x,
            cy: y,
            ..*self
        }
    }

    /// Corners in order top-left, top-right, bottom-right, bottom-left
    /// (y grows downward).
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    /// Minkowski-sum overlap test: centres closer than the summed
    /// half-extents on both axes. Touching walls do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        (other.cx - self.cx).abs() < self.half_w + other.half_w
            && (other.cy - self.cy).abs() < self.half_h + other.half_h
    }
}

/// One wall of a rectangle. `Top` is the low-y side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    pub fn opposite(self) -> Edge {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }
}

/// Which walls of a room are not already abutted by another room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeEdges {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl FreeEdges {
    pub fn is_free(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    pub fn free(&self) -> impl Iterator<Item = Edge> + '_ {
        Edge::ALL.into_iter().filter(|e| self.is_free(*e))
    }
}

/// Ray-casting parity test.
///
/// Fails open: a missing or degenerate polygon (fewer than three vertices,
/// non-finite coordinates) places no constraint, so every point is inside.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if !is_valid_polygon(polygon) {
        return true;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        // The straddle check excludes horizontal and zero-length edges,
        // so the division below never sees a zero denominator.
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether a polygon is usable as a containment boundary.
pub fn is_valid_polygon(polygon: &[Point]) -> bool {
    polygon.len() >= 3 && polygon.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

/// The four corners of a rectangle.
pub fn rect_corners(rect: &Rect) -> [Point; 4] {
    rect.corners()
}

/// Corner-containment test against an optional boundary.
///
/// Only the four corners are checked, so a wall crossing a concave notch
/// between two corners goes unnoticed.
pub fn corners_inside(rect: &Rect, boundary: Option<&[Point]>) -> bool {
    match boundary {
        Some(poly) => rect.corners().iter().all(|c| point_in_polygon(*c, poly)),
        None => true,
    }
}

/// Two rooms touch if a wall of one lies within `tolerance` of the facing
/// wall of the other while their spans overlap on the perpendicular axis.
pub fn are_adjacent(a: &Rect, b: &Rect, tolerance: f32) -> bool {
    let side_by_side = ((a.left() - b.right()).abs() <= tolerance
        || (a.right() - b.left()).abs() <= tolerance)
        && a.top() < b.bottom()
        && a.bottom() > b.top();

    let stacked = ((a.top() - b.bottom()).abs() <= tolerance
        || (a.bottom() - b.top()).abs() <= tolerance)
        && a.left() < b.right()
        && a.right() > b.left();

    side_by_side || stacked
}

/// Walls of `rect` not abutted by any of `others`.
///
/// A wall counts as taken when another room sits flush (within
/// `tolerance`) along it and shares more than `tolerance` of its span.
pub fn free_edges<'a>(
    rect: &Rect,
    others: impl IntoIterator<Item = &'a Rect>,
    tolerance: f32,
) -> FreeEdges {
    let mut edges = FreeEdges {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };

    for o in others {
        let spans_x = rect.left() < o.right() - tolerance && rect.right() > o.left() + tolerance;
        let spans_y = rect.top() < o.bottom() - tolerance && rect.bottom() > o.top() + tolerance;

        if spans_x && (rect.top() - o.bottom()).abs() <= tolerance {
            edges.top = false;
        }
        if spans_x && (rect.bottom() - o.top()).abs() <= tolerance {
            edges.bottom = false;
        }
        if spans_y && (rect.left() - o.right()).abs() <= tolerance {
            edges.left = false;
        }
        if spans_y && (rect.right() - o.left()).abs() <= tolerance {
            edges.right = false;
        }
    }
    edges
}

/// Centre for `other` so that it sits flush against `edge` of `anchor`,
/// centred on the anchor along the perpendicular axis.
pub fn dock_position(anchor: &Rect, other: &Rect, edge: Edge) -> Point {
    match edge {
        Edge::Top => Point::new(anchor.cx, anchor.top() - other.half_h),
        Edge::Bottom => Point::new(anchor.cx, anchor.bottom() + other.half_h),
        Edge::Left => Point::new(anchor.left() - other.half_w, anchor.cy),
        Edge::Right => Point::new(anchor.right() + other.half_w, anchor.cy),
    }
}

/// Axis-aligned bounding box of a point set as (min, max).
pub fn bounding_box(points: &[Point]) -> Option<(Point, Point)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    fn square(size: f32) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    // ── Point in polygon ────────────────────────────────────────────────

    #[test]
    fn point_inside_square() {
        let poly = square(10.0);
        assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(5.0, -1.0), &poly));
    }

    #[test]
    fn point_in_concave_polygon() {
        // L-shape: the notch at top-right is outside
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(10.0, 4.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(2.0, 2.0), &poly));
        assert!(point_in_polygon(Point::new(8.0, 8.0), &poly));
        assert!(!point_in_polygon(Point::new(8.0, 2.0), &poly));
    }

    #[test]
    fn degenerate_polygon_fails_open() {
        assert!(point_in_polygon(Point::new(100.0, 100.0), &[]));
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(point_in_polygon(Point::new(100.0, 100.0), &line));
        let bad = vec![
            Point::new(0.0, 0.0),
            Point::new(f32::NAN, 0.0),
            Point::new(1.0, 1.0),
        ];
        assert!(point_in_polygon(Point::new(100.0, 100.0), &bad));
    }

    #[test]
    fn zero_length_edges_do_not_divide_by_zero() {
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(5.0, 15.0), &poly));
    }

    #[test]
    fn point_in_polygon_is_translation_invariant() {
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(8.0, 2.0),
            Point::new(6.0, 9.0),
            Point::new(1.0, 6.0),
        ];
        let points = [(3.0, 3.0), (7.0, 1.0), (0.5, 5.0), (9.0, 9.0), (4.0, 8.0)];
        for (dx, dy) in [(16.0, -32.0), (-128.0, 64.0), (1024.0, 512.0)] {
            let shifted: Vec<Point> = poly.iter().map(|p| p.translated(dx, dy)).collect();
            for (x, y) in points {
                let p = Point::new(x, y);
                assert_eq!(
                    point_in_polygon(p, &poly),
                    point_in_polygon(p.translated(dx, dy), &shifted),
                    "point ({x},{y}) shift ({dx},{dy})"
                );
            }
        }
    }

    // ── Rectangles ──────────────────────────────────────────────────────

    #[test]
    fn corners_from_center() {
        let c = rect_corners(&rect(10.0, 20.0, 4.0, 6.0));
        assert_eq!(c[0], Point::new(8.0, 17.0));
        assert_eq!(c[2], Point::new(12.0, 23.0));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = rect(9.0, 3.0, 10.0, 10.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn corners_inside_boundary() {
        let poly = square(100.0);
        assert!(corners_inside(&rect(50.0, 50.0, 20.0, 20.0), Some(&poly)));
        assert!(!corners_inside(&rect(95.0, 50.0, 20.0, 20.0), Some(&poly)));
        assert!(corners_inside(&rect(500.0, 50.0, 20.0, 20.0), None));
    }

    // ── Adjacency ───────────────────────────────────────────────────────

    #[test]
    fn adjacent_side_by_side() {
        let a = rect(0.0, 0.0, 50.0, 50.0);
        let b = rect(52.0, 10.0, 50.0, 50.0);
        assert!(are_adjacent(&a, &b, 3.0));
        let far = rect(60.0, 10.0, 50.0, 50.0);
        assert!(!are_adjacent(&a, &far, 3.0));
    }

    #[test]
    fn adjacent_stacked() {
        let a = rect(0.0, 0.0, 50.0, 50.0);
        let b = rect(20.0, 49.0, 50.0, 50.0);
        assert!(are_adjacent(&a, &b, 3.0));
    }

    #[test]
    fn corner_contact_is_not_adjacency() {
        let a = rect(0.0, 0.0, 50.0, 50.0);
        let b = rect(50.0, 50.0, 50.0, 50.0);
        assert!(!are_adjacent(&a, &b, 3.0));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let rects = [
            rect(0.0, 0.0, 50.0, 50.0),
            rect(51.0, 5.0, 50.0, 30.0),
            rect(0.0, 52.5, 20.0, 50.0),
            rect(30.0, 30.0, 10.0, 10.0),
            rect(-40.0, -48.0, 30.0, 46.0),
            rect(200.0, 0.0, 50.0, 50.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(are_adjacent(a, b, 3.0), are_adjacent(b, a, 3.0));
            }
        }
    }

    // ── Free edges & docking ────────────────────────────────────────────

    #[test]
    fn free_edges_detects_neighbor_walls() {
        let a = rect(0.0, 0.0, 50.0, 50.0);
        let right = rect(50.0, 0.0, 50.0, 50.0);
        let above = rect(0.0, -50.0, 50.0, 50.0);
        let edges = free_edges(&a, [&right, &above], 3.0);
        assert!(!edges.right);
        assert!(!edges.top);
        assert!(edges.left);
        assert!(edges.bottom);
        assert_eq!(edges.free().count(), 2);
    }

    #[test]
    fn sliver_contact_leaves_edge_free() {
        let a = rect(0.0, 0.0, 50.0, 50.0);
        // shares only 2 units of the right wall
        let b = rect(50.0, 48.0, 50.0, 50.0);
        assert!(free_edges(&a, [&b], 3.0).right);
    }

    #[test]
    fn dock_positions_are_flush() {
        let anchor = rect(0.0, 0.0, 40.0, 20.0);
        let other = rect(100.0, 100.0, 10.0, 30.0);
        assert_eq!(dock_position(&anchor, &other, Edge::Right), Point::new(25.0, 0.0));
        assert_eq!(dock_position(&anchor, &other, Edge::Top), Point::new(0.0, -25.0));
        let docked = other.moved_to(25.0, 0.0);
        assert!(are_adjacent(&anchor, &docked, 0.5));
        assert!(!anchor.overlaps(&docked));
    }

    #[test]
    fn opposite_edges() {
        for e in Edge::ALL {
            assert_eq!(e.opposite().opposite(), e);
            assert_ne!(e.opposite(), e);
        }
    }

    #[test]
    fn bounding_box_of_points() {
        assert!(bounding_box(&[]).is_none());
        let (min, max) = bounding_box(&square(7.0)).unwrap();
        assert_eq!(min, Point::new(0.0, 0.0));
        assert_eq!(max, Point::new(7.0, 7.0));
    }
}
