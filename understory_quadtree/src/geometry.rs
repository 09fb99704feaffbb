// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle predicates used by the tree. Rects are assumed normalized and NaN-free.

use kurbo::{Point, Rect};

/// Whether two rects overlap. Shared edges count as overlap, so zero-size rects
/// (points) on a node's boundary still match.
#[inline]
pub(crate) fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Whether `inner` lies entirely within `outer`, edges included.
#[inline]
pub(crate) fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Squared distance from `point` to the closest point of `rect`; zero inside.
#[inline]
pub(crate) fn distance_sq_to_point(rect: Rect, point: Point) -> f64 {
    let dx = (rect.x0 - point.x).max(0.0).max(point.x - rect.x1);
    let dy = (rect.y0 - point.y).max(0.0).max(point.y - rect.y1);
    dx * dx + dy * dy
}

/// Split `rect` into its top-left, top-right, bottom-left and bottom-right quarters.
pub(crate) fn quadrants(rect: Rect) -> [Rect; 4] {
    let mid_x = rect.x0 + rect.width() * 0.5;
    let mid_y = rect.y0 + rect.height() * 0.5;
    [
        Rect::new(rect.x0, rect.y0, mid_x, mid_y),
        Rect::new(mid_x, rect.y0, rect.x1, mid_y),
        Rect::new(rect.x0, mid_y, mid_x, rect.y1),
        Rect::new(mid_x, mid_y, rect.x1, rect.y1),
    ]
}

#[inline]
pub(crate) fn point_rect(point: Point) -> Rect {
    Rect::from_points(point, point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(overlaps(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(overlaps(a, point_rect(Point::new(10.0, 10.0))));
        assert!(!overlaps(a, Rect::new(10.5, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn containment_is_edge_inclusive() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains_rect(outer, outer));
        assert!(contains_rect(outer, point_rect(Point::new(0.0, 10.0))));
        assert!(!contains_rect(outer, Rect::new(4.0, 4.0, 11.0, 6.0)));
    }

    #[test]
    fn distance_is_zero_inside_and_squared_outside() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(distance_sq_to_point(r, Point::new(5.0, 5.0)), 0.0);
        assert_eq!(distance_sq_to_point(r, Point::new(13.0, 14.0)), 9.0 + 16.0);
        assert_eq!(distance_sq_to_point(r, Point::new(-2.0, 5.0)), 4.0);
    }

    #[test]
    fn quadrants_partition_parent() {
        let [tl, tr, bl, br] = quadrants(Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(tl, Rect::new(0.0, 0.0, 5.0, 10.0));
        assert_eq!(tr, Rect::new(5.0, 0.0, 10.0, 10.0));
        assert_eq!(bl, Rect::new(0.0, 10.0, 5.0, 20.0));
        assert_eq!(br, Rect::new(5.0, 10.0, 10.0, 20.0));
        assert_eq!(tl.union(br), Rect::new(0.0, 0.0, 10.0, 20.0));
    }
}
