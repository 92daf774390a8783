//! Freehand pen strokes
//!
//! Raw pointer samples are kept as drawn. The displayed curve is derived from
//! them in two passes: a moving-average smoothing over a small window, then
//! Catmull-Rom interpolation into a dense polyline. The derived curve is cached
//! and rebuilt lazily after new samples arrive.

use std::borrow::Cow;

use super::{ElementBase, handles};
use crate::domain::{Color, Point, Rect, Size, StrokeStyle, Vector, distance_to_segment};
use crate::render::{DrawingSurface, RenderContext};

/// Samples averaged on each side of a point
pub const SMOOTHING_RADIUS: usize = 2;
/// Interpolated points per source interval
pub const SPLINE_SEGMENTS: usize = 10;
/// Fewer samples than this are drawn as-is
const MIN_SPLINE_POINTS: usize = 4;

/// Spline tuning carried by each stroke
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineParams {
    pub smoothing_radius: usize,
    pub segments: usize,
}

impl Default for SplineParams {
    fn default() -> Self {
        Self {
            smoothing_radius: SMOOTHING_RADIUS,
            segments: SPLINE_SEGMENTS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FreehandStroke {
    pub base: ElementBase,
    points: Vec<Point>,
    pub thickness: f32,
    pub transparency: f32,
    pub spline: SplineParams,
    cache: Vec<Point>,
    needs_redraw: bool,
}

impl FreehandStroke {
    pub fn new(start: Point, color: Color, thickness: f32, transparency: f32) -> Self {
        Self {
            base: ElementBase::new(start, Size::ZERO, color),
            points: vec![start],
            thickness,
            transparency: transparency.clamp(0.0, 1.0),
            spline: SplineParams::default(),
            cache: Vec::new(),
            needs_redraw: true,
        }
    }

    pub fn with_spline(mut self, spline: SplineParams) -> Self {
        self.spline = spline;
        self.needs_redraw = true;
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Append a pointer sample; invalidates the cached curve
    pub fn add_point(&mut self, p: Point) {
        self.points.push(p);
        self.needs_redraw = true;
        self.sync_base();
    }

    /// The smoothed curve, from the cache when it is current
    pub fn curve(&self) -> Cow<'_, [Point]> {
        if self.needs_redraw {
            Cow::Owned(spline(&self.points, self.spline))
        } else {
            Cow::Borrowed(&self.cache)
        }
    }

    /// Rebuild the cached curve if samples changed since the last build
    pub fn refresh_cache(&mut self) {
        if !self.needs_redraw {
            return;
        }
        self.cache = spline(&self.points, self.spline);
        self.needs_redraw = false;
        log::debug!(
            "Freehand curve rebuilt: {} samples -> {} points",
            self.points.len(),
            self.cache.len()
        );
    }

    pub fn hit_tolerance(&self) -> f32 {
        (self.thickness / 2.0 + 4.0).max(6.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::bounding(&self.curve())
            .unwrap_or_else(|| Rect::from_origin_size(self.base.position, Size::ZERO))
            .inflate(self.thickness / 2.0)
    }

    pub fn hit_test(&self, p: Point) -> bool {
        let curve = self.curve();
        let tolerance = self.hit_tolerance();
        match curve.as_ref() {
            [] => false,
            [single] => single.distance(p) <= tolerance,
            points => points
                .windows(2)
                .any(|w| distance_to_segment(p, w[0], w[1]) <= tolerance),
        }
    }

    /// Translate samples and cache together; the cache stays valid
    pub fn move_by(&mut self, delta: Vector) {
        for p in self.points.iter_mut().chain(self.cache.iter_mut()) {
            *p += delta;
        }
        self.sync_base();
    }

    fn sync_base(&mut self) {
        if let Some(rect) = Rect::bounding(&self.points) {
            self.base.set_rect(rect);
        }
    }

    pub fn stroke(&self) -> StrokeStyle {
        StrokeStyle::new(self.base.color.with_opacity(self.transparency), self.thickness)
    }

    pub fn draw(&mut self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        self.refresh_cache();
        let stroke = self.stroke();
        match self.cache.as_slice() {
            [] => {}
            [dot] => {
                let r = self.thickness / 2.0;
                let rect = Rect::new(dot.x - r, dot.y - r, self.thickness, self.thickness);
                surface.fill_rounded_rect(rect, r, stroke.color);
            }
            curve => surface.stroke_polyline(curve, &stroke),
        }

        if self.base.selected {
            handles::draw_corner_handles(surface, ctx, &self.bounds());
        }
    }
}

/// Moving average over `radius` neighbours on each side, window clipped at the ends
pub fn smooth(points: &[Point], radius: usize) -> Vec<Point> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(n - 1);
            let window = &points[lo..=hi];
            let count = window.len() as f32;
            let (sx, sy) = window
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Point::new(sx / count, sy / count)
        })
        .collect()
}

/// Uniform Catmull-Rom through every point, `segments` steps per interval
///
/// End intervals reuse the end point as the missing neighbour. The output
/// holds `(n - 1) * segments + 1` points and passes through every input.
pub fn catmull_rom(points: &[Point], segments: usize) -> Vec<Point> {
    let n = points.len();
    if n < 2 || segments == 0 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity((n - 1) * segments + 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        for step in 0..segments {
            let t = step as f32 / segments as f32;
            out.push(catmull_rom_point(p0, p1, p2, p3, t));
        }
    }
    out.push(points[n - 1]);
    out
}

fn catmull_rom_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let blend = |a: f32, b: f32, c: f32, d: f32| {
        0.5 * (2.0 * b
            + (c - a) * t
            + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
            + (3.0 * b - a - 3.0 * c + d) * t3)
    };
    Point::new(
        blend(p0.x, p1.x, p2.x, p3.x),
        blend(p0.y, p1.y, p2.y, p3.y),
    )
}

/// Smoothed and interpolated curve; short strokes pass through unchanged
pub fn spline(points: &[Point], params: SplineParams) -> Vec<Point> {
    if points.len() < MIN_SPLINE_POINTS {
        return points.to_vec();
    }
    catmull_rom(&smooth(points, params.smoothing_radius), params.segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point::new(i as f32 * 10.0, if i % 2 == 0 { 0.0 } else { 10.0 }))
            .collect()
    }

    #[test]
    fn test_short_strokes_are_unchanged() {
        for n in 0..4 {
            let points = zigzag(n);
            assert_eq!(spline(&points, SplineParams::default()), points);
        }
    }

    #[test]
    fn test_spline_expands_point_count() {
        for n in 4..12 {
            let out = spline(&zigzag(n), SplineParams::default());
            assert!(out.len() > n);
            assert_eq!(out.len(), (n - 1) * SPLINE_SEGMENTS + 1);
        }
    }

    #[test]
    fn test_smoothing_flattens_zigzag() {
        let smoothed = smooth(&zigzag(9), 2);
        assert!((smoothed[4].y - 4.0).abs() < 1e-4);
        assert!((smoothed[3].y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_catmull_rom_passes_through_samples() {
        let points = zigzag(5);
        let curve = catmull_rom(&points, 4);
        for (i, p) in points.iter().enumerate() {
            assert!(curve[i * 4].distance(*p) < 1e-4);
        }
    }

    #[test]
    fn test_appending_invalidates_cache() {
        let mut stroke = FreehandStroke::new(Point::ORIGIN, Color::default(), 3.0, 1.0);
        for p in zigzag(6).into_iter().skip(1) {
            stroke.add_point(p);
        }
        stroke.refresh_cache();
        assert!(!stroke.needs_redraw());
        let before = stroke.curve().len();

        stroke.add_point(Point::new(60.0, 0.0));
        assert!(stroke.needs_redraw());
        stroke.refresh_cache();
        assert_eq!(stroke.curve().len(), before + SPLINE_SEGMENTS);
    }

    #[test]
    fn test_move_keeps_cache_valid() {
        let mut stroke = FreehandStroke::new(Point::ORIGIN, Color::default(), 3.0, 1.0);
        for p in zigzag(5).into_iter().skip(1) {
            stroke.add_point(p);
        }
        stroke.refresh_cache();
        let first = stroke.curve()[0];
        stroke.move_by(Vector::new(5.0, 5.0));
        assert!(!stroke.needs_redraw());
        assert_eq!(stroke.curve()[0], first + Vector::new(5.0, 5.0));
        assert_eq!(stroke.base.position, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_hit_test_follows_curve() {
        let mut stroke = FreehandStroke::new(Point::ORIGIN, Color::default(), 3.0, 1.0);
        for p in zigzag(6).into_iter().skip(1) {
            stroke.add_point(p);
        }
        assert!(stroke.hit_test(Point::new(25.0, 5.0)));
        assert!(!stroke.hit_test(Point::new(25.0, 40.0)));
    }
}
