//! Rendering contracts and back-ends
//!
//! This module contains:
//! - The `DrawingSurface`/`TextMeasurer` contracts every element draws through
//! - Geometry shared between hit-testing and drawing (`geometry`)
//! - A tiny-skia raster back-end (`raster`) with glyph text (`text`)
//! - Blur snapshot cropping (`blur`)
//! - A recording back-end for inspecting draw calls (`recording`)

pub mod blur;
pub mod geometry;
pub mod raster;
pub mod recording;
pub mod text;

use image::RgbaImage;

use crate::domain::{Color, FontSpec, Point, Rect, Size, StrokeStyle};

/// Measures laid-out text extents
pub trait TextMeasurer {
    /// Size of the (possibly multi-line) text run when set in `font`
    fn measure_text(&self, text: &str, font: &FontSpec) -> Size;
}

/// Scale + translate applied by a surface to every primitive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub sx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Primitive drawing calls used by every element's `draw`
///
/// Coordinates are scene coordinates; the surface maps them through its
/// current `Affine`.
pub trait DrawingSurface: TextMeasurer {
    fn set_transform(&mut self, transform: Affine);

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle);

    /// Open polyline through `points`
    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle);

    /// Closed polygon fill
    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Closed polygon outline
    fn stroke_polygon(&mut self, points: &[Point], stroke: &StrokeStyle);

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color);

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, stroke: &StrokeStyle);

    /// Text run with its top-left corner at `origin`
    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color);

    /// Blit `image` scaled into `dest`
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect);
}

/// Per-frame state elements need besides the surface
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    /// Pre-annotation snapshot blur regions sample from
    pub snapshot: Option<&'a RgbaImage>,
    /// Whether selected elements draw their drag handles
    pub show_selection: bool,
    /// Corner radius for rectangles and bubbles
    pub corner_radius: f32,
}

impl Default for RenderContext<'_> {
    fn default() -> Self {
        Self {
            snapshot: None,
            show_selection: true,
            corner_radius: geometry::shape::CORNER_RADIUS,
        }
    }
}
