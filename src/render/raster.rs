//! Raster back-end using tiny-skia
//!
//! Used for raster export (save/clipboard/OCR consumers) and for the
//! one-time blur snapshot.

use image::RgbaImage;
use tiny_skia::{
    FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, PathBuilder, Pattern, Pixmap,
    SpreadMode, Stroke, Transform,
};

use super::geometry::shape;
use super::text::FontBook;
use super::{Affine, DrawingSurface, TextMeasurer};
use crate::domain::{Color, FontSpec, Point, Rect, Size, StrokeStyle};
use crate::error::{EngineError, Result};

/// A drawing surface backed by a tiny-skia pixmap
pub struct RasterSurface {
    pixmap: Pixmap,
    transform: Affine,
    fonts: FontBook,
}

impl RasterSurface {
    /// Transparent surface of the given pixel size
    pub fn new(width: u32, height: u32, fonts: FontBook) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            EngineError::Surface(format!("cannot allocate {width}x{height} surface"))
        })?;
        Ok(Self {
            pixmap,
            transform: Affine::IDENTITY,
            fonts,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fill the whole surface with one color, ignoring the transform
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    /// Convert the surface to a straight-alpha RGBA image
    pub fn into_image(self) -> RgbaImage {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        // Buffer length always matches w*h*4
        RgbaImage::from_raw(w, h, data).unwrap_or_else(|| RgbaImage::new(w, h))
    }

    fn skia_transform(&self) -> Transform {
        let t = self.transform;
        Transform::from_row(t.sx, 0.0, 0.0, t.sy, t.tx, t.ty)
    }

    fn stroke_path(&mut self, path: &tiny_skia::Path, stroke: &StrokeStyle) {
        if stroke.thickness <= 0.0 {
            return;
        }
        let paint = solid_paint(stroke.color);
        let skia_stroke = Stroke {
            width: stroke.thickness,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        let transform = self.skia_transform();
        self.pixmap
            .stroke_path(path, &paint, &skia_stroke, transform, None);
    }

    fn fill_path(&mut self, path: &tiny_skia::Path, color: Color) {
        let paint = solid_paint(color);
        let transform = self.skia_transform();
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, transform, None);
    }
}

impl TextMeasurer for RasterSurface {
    fn measure_text(&self, text: &str, font: &FontSpec) -> Size {
        self.fonts.measure_text(text, font)
    }
}

impl DrawingSurface for RasterSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        self.stroke_polyline(&[from, to], stroke);
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle) {
        if let Some(path) = polyline_path(points, false) {
            self.stroke_path(&path, stroke);
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if let Some(path) = polyline_path(points, true) {
            self.fill_path(&path, color);
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], stroke: &StrokeStyle) {
        if let Some(path) = polyline_path(points, true) {
            self.stroke_path(&path, stroke);
        }
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        if let Some(path) = rounded_rect_path(rect, radius) {
            self.fill_path(&path, color);
        }
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, stroke: &StrokeStyle) {
        if let Some(path) = rounded_rect_path(rect, radius) {
            self.stroke_path(&path, stroke);
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let Some(mut mask) = Mask::new(w, h) else {
            return;
        };
        let device_origin = self.transform.apply(origin);
        let device_size = font.size * self.transform.sy;

        let mask_data = mask.data_mut();
        let drawn = self.fonts.rasterize(
            text,
            font.typeface,
            device_origin,
            device_size,
            |x, y, coverage| {
                if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                    return;
                }
                let index = y as usize * w as usize + x as usize;
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                mask_data[index] = mask_data[index].max(value);
            },
        );
        if !drawn {
            log::debug!("No font face loaded, skipping glyphs for {:?}", text);
            return;
        }

        let paint = solid_paint(color);
        if let Some(full) = tiny_skia::Rect::from_xywh(0.0, 0.0, w as f32, h as f32) {
            self.pixmap
                .fill_rect(full, &paint, Transform::identity(), Some(&mask));
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        if dest.is_empty() || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(source) = pixmap_from_image(image) else {
            return;
        };
        let Some(target) = tiny_skia::Rect::from_xywh(dest.x, dest.y, dest.width, dest.height)
        else {
            return;
        };

        // Map image pixels onto the destination rectangle
        let pattern_transform = Transform::from_row(
            dest.width / image.width() as f32,
            0.0,
            0.0,
            dest.height / image.height() as f32,
            dest.x,
            dest.y,
        );
        let unscaled = dest.width == image.width() as f32
            && dest.height == image.height() as f32
            && self.transform.sx == 1.0
            && self.transform.sy == 1.0;
        let quality = if unscaled {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bilinear
        };
        let paint = Paint {
            shader: Pattern::new(
                source.as_ref(),
                SpreadMode::Pad,
                quality,
                1.0,
                pattern_transform,
            ),
            anti_alias: true,
            ..Default::default()
        };
        let transform = self.skia_transform();
        self.pixmap.fill_rect(target, &paint, transform, None);
    }
}

/// Convert a straight-alpha RgbaImage to a premultiplied pixmap
pub fn pixmap_from_image(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba_u8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

fn polyline_path(points: &[Point], close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// Build a rounded rectangle path using cubic bezier corners
fn rounded_rect_path(rect: Rect, radius: f32) -> Option<tiny_skia::Path> {
    if rect.is_empty() {
        return None;
    }
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let k = r * (1.0 - shape::BEZIER_K);

    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - k, t, rt, t + k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - k, rt - k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + k, b, l, b - k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + k, l + k, t, l + r, t);
    pb.close();
    pb.finish()
}
