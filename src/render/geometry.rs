//! Shared geometry calculations for elements
//!
//! This module contains constants and math shared between
//! hit-testing (selection) and drawing (render back-ends).

use crate::domain::{Point, Rect, Vector};

/// Arrow geometry
pub mod arrow {
    use super::*;

    /// Head length beyond the shaft thickness
    pub const HEAD_LENGTH_EXTRA: f32 = 10.0;
    /// Head base width beyond the shaft thickness
    pub const HEAD_WIDTH_EXTRA: f32 = 5.0;

    /// Derived arrow geometry: the shaft stops where the head begins
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ArrowGeometry {
        pub head_length: f32,
        pub head_width: f32,
        /// Where the stroked shaft ends (`end - direction * head_length`)
        pub shaft_end: Point,
        /// Head triangle as `[base_left, apex, base_right]`
        pub head: [Point; 3],
    }

    pub fn head_length(thickness: f32) -> f32 {
        thickness + HEAD_LENGTH_EXTRA
    }

    pub fn head_width(thickness: f32) -> f32 {
        thickness + HEAD_WIDTH_EXTRA
    }

    /// Calculate shaft and head geometry from the two endpoints and thickness
    ///
    /// Returns None for a zero-length arrow (no direction to point the head).
    pub fn geometry(start: Point, end: Point, thickness: f32) -> Option<ArrowGeometry> {
        let direction = (end - start).normalize()?;
        let head_length = head_length(thickness);
        let head_width = head_width(thickness);

        let base_center = end - direction * head_length;
        let half_base = direction.perp() * (head_width / 2.0);

        Some(ArrowGeometry {
            head_length,
            head_width,
            shaft_end: base_center,
            head: [base_center + half_base, end, base_center - half_base],
        })
    }
}

/// Rectangle/blur geometry constants
pub mod shape {
    /// Default corner radius for rounded rectangles
    pub const CORNER_RADIUS: f32 = 6.0;
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Speech bubble geometry
pub mod bubble {
    use super::*;
    use crate::domain::Size;

    /// Minimum bubble box
    pub const MIN_SIZE: Size = Size::new(100.0, 50.0);
    /// Total horizontal/vertical margin around the text (split evenly)
    pub const MARGIN: f32 = 20.0;
    /// Half width of the tail where it joins the bubble
    pub const TAIL_HALF_BASE: f32 = 10.0;

    /// Bubble box for a measured text extent, floored at `MIN_SIZE`
    pub fn box_size(text: Size) -> Size {
        Size::new(text.width + MARGIN, text.height + MARGIN).max(MIN_SIZE)
    }

    /// Tail polygon from the bubble's top-center out to `tail_end`
    pub fn tail_polygon(bubble: Rect, tail_end: Point) -> [Point; 4] {
        let top_center = Point::new(bubble.center().x, bubble.top());
        let offset = Vector::new(TAIL_HALF_BASE, 0.0);
        [top_center - offset, tail_end, top_center + offset, top_center]
    }
}

/// Drag handle chrome
pub mod handle {
    use super::*;

    /// Side of the square drawn for each handle
    pub const SIZE: f32 = 8.0;

    /// Square centered on a handle position
    pub fn square(center: Point) -> Rect {
        Rect::new(center.x - SIZE / 2.0, center.y - SIZE / 2.0, SIZE, SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_head_geometry() {
        let g = arrow::geometry(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 2.0).unwrap();
        assert_eq!(g.head_length, 12.0);
        assert_eq!(g.head_width, 7.0);
        assert!((g.shaft_end.x - 88.0).abs() < 1e-4);
        assert!(g.shaft_end.y.abs() < 1e-4);
        assert_eq!(g.head[1], Point::new(100.0, 0.0));
        assert!((g.head[0].y.abs() - 3.5).abs() < 1e-4);
        assert!((g.head[0].y + g.head[2].y).abs() < 1e-4);
        assert!((g.head[0].x - 88.0).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_arrow_head_geometry() {
        // 3-4-5 direction keeps the expected points exact
        let g = arrow::geometry(Point::new(10.0, 10.0), Point::new(40.0, 50.0), 4.0).unwrap();
        assert_eq!(g.head_length, 14.0);
        assert_eq!(g.head_width, 9.0);
        let close = |a: Point, x: f32, y: f32| (a.x - x).abs() < 1e-4 && (a.y - y).abs() < 1e-4;
        assert!(close(g.shaft_end, 31.6, 38.8), "{:?}", g.shaft_end);
        assert!(close(g.head[0], 28.0, 41.5), "{:?}", g.head[0]);
        assert_eq!(g.head[1], Point::new(40.0, 50.0));
        assert!(close(g.head[2], 35.2, 36.1), "{:?}", g.head[2]);
    }

    #[test]
    fn test_zero_length_arrow_has_no_head() {
        let p = Point::new(5.0, 5.0);
        assert!(arrow::geometry(p, p, 3.0).is_none());
    }

    #[test]
    fn test_bubble_box_floor() {
        use crate::domain::Size;
        assert_eq!(bubble::box_size(Size::ZERO), Size::new(100.0, 50.0));
        assert_eq!(
            bubble::box_size(Size::new(120.0, 40.0)),
            Size::new(140.0, 60.0)
        );
    }

    #[test]
    fn test_tail_polygon_starts_at_top_center() {
        let rect = Rect::new(0.0, 100.0, 100.0, 50.0);
        let tail = bubble::tail_polygon(rect, Point::new(20.0, 20.0));
        assert_eq!(tail[0], Point::new(40.0, 100.0));
        assert_eq!(tail[1], Point::new(20.0, 20.0));
        assert_eq!(tail[2], Point::new(60.0, 100.0));
        assert_eq!(tail[3], Point::new(50.0, 100.0));
    }
}
