//! Geometric value types for scene coordinates
//!
//! All element geometry is expressed in scene (unzoomed canvas) coordinates,
//! as `f32` logical pixels.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point in scene coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    /// Component-wise minimum
    pub fn min(self, other: Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum
    pub fn max(self, other: Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

/// A displacement between two points (drag delta, direction)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f32,
    pub dy: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn length(self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    pub fn dot(self, other: Vector) -> f32 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// Unit vector in the same direction, `None` for a (near) zero vector
    pub fn normalize(self) -> Option<Vector> {
        let len = self.length();
        if len < f32::EPSILON {
            return None;
        }
        Some(Vector::new(self.dx / len, self.dy / len))
    }

    /// Counter-clockwise perpendicular (in y-down screen space, points "left")
    pub fn perp(self) -> Vector {
        Vector::new(-self.dy, self.dx)
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, v: Vector) -> Point {
        Point::new(self.x + v.dx, self.y + v.dy)
    }
}

impl AddAssign<Vector> for Point {
    fn add_assign(&mut self, v: Vector) {
        self.x += v.dx;
        self.y += v.dy;
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, v: Vector) -> Point {
        Point::new(self.x - v.dx, self.y - v.dy)
    }
}

impl Sub<Point> for Point {
    type Output = Vector;
    fn sub(self, other: Point) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, other: Vector) -> Vector {
        Vector::new(self.dx + other.dx, self.dy + other.dy)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;
    fn mul(self, k: f32) -> Vector {
        Vector::new(self.dx * k, self.dy * k)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.dx, -self.dy)
    }
}

/// Width and height of an element's box
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum, used for minimum-size floors
    pub fn max(self, floor: Size) -> Size {
        Size::new(self.width.max(floor.width), self.height.max(floor.height))
    }

    /// True when either side is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle in scene coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Normalized rectangle spanning two arbitrary corner points
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Smallest rectangle containing all points, `None` for an empty slice
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Self::from_corners(min, max))
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Grow the rectangle by `amount` on every side
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let min = self.origin().min(other.origin());
        let max = Point::new(self.right(), self.bottom())
            .max(Point::new(other.right(), other.bottom()));
        Rect::from_corners(min, max)
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, delta: Vector) -> Rect {
        Rect::new(self.x + delta.dx, self.y + delta.dy, self.width, self.height)
    }

    /// Corners in NW, NE, SE, SW order
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    /// Integer pixel bounds `(x, y, width, height)` clamped to a `limit_w` x `limit_h` raster
    ///
    /// Returns `None` when nothing of the rectangle lies inside the raster.
    pub fn clamp_to_pixels(&self, limit_w: u32, limit_h: u32) -> Option<(u32, u32, u32, u32)> {
        let left = self.left().floor().max(0.0);
        let top = self.top().floor().max(0.0);
        let right = self.right().ceil().min(limit_w as f32);
        let bottom = self.bottom().ceil().min(limit_h as f32);
        if right <= left || bottom <= top {
            return None;
        }
        Some((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let seg = b - a;
    let len_sq = seg.dot(seg);
    if len_sq < 0.0001 {
        // Segment is essentially a point
        return p.distance(a);
    }
    // Project point onto line, clamped to segment
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    p.distance(a + seg * t)
}

/// Even-odd point-in-polygon test
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(50.0, 40.0), Point::new(10.0, 10.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 40.0, 30.0));
    }

    #[test]
    fn test_clamp_to_pixels_clips_outside_region() {
        let r = Rect::new(-10.0, 5.0, 30.0, 200.0);
        assert_eq!(r.clamp_to_pixels(100, 100), Some((0, 5, 20, 95)));
        let outside = Rect::new(150.0, 150.0, 10.0, 10.0);
        assert_eq!(outside.clamp_to_pixels(100, 100), None);
    }

    #[test]
    fn test_distance_to_segment() {
        let d = distance_to_segment(
            Point::new(5.0, 3.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-5);
        let beyond = distance_to_segment(
            Point::new(13.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((beyond - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_point_in_polygon() {
        let tri = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(2.0, 2.0), &tri));
        assert!(!point_in_polygon(Point::new(8.0, 8.0), &tri));
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert!(Vector::ZERO.normalize().is_none());
        let n = Vector::new(3.0, 4.0).normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
