//! Canvas zoom and pan
//!
//! Maps between viewport (window) coordinates and scene coordinates:
//! `view = scene * scale + translate`.

use crate::domain::{Point, Size, Vector};
use crate::render::Affine;

/// Multiplicative step per wheel notch
pub const ZOOM_FACTOR: f32 = 1.1;
/// Smallest allowed scale
pub const MIN_SCALE: f32 = 0.2;

#[derive(Clone, Debug, PartialEq)]
pub struct CanvasTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    /// Cursor position of the last zoom gesture
    pub zoom_center: Point,
    pub zoom_factor: f32,
    pub min_scale: f32,
    /// Window size the scene is centered in when zoomed out
    viewport: Size,
    /// Scene extent (the background size)
    content: Size,
    /// Last pointer position of a middle-button pan
    pan_anchor: Option<Point>,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::new(ZOOM_FACTOR, MIN_SCALE)
    }
}

impl CanvasTransform {
    pub fn new(zoom_factor: f32, min_scale: f32) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            zoom_center: Point::ORIGIN,
            zoom_factor: zoom_factor.max(1.0 + f32::EPSILON),
            min_scale: min_scale.max(f32::EPSILON),
            viewport: Size::ZERO,
            content: Size::ZERO,
            pan_anchor: None,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale_x
    }

    pub fn translate(&self) -> Vector {
        Vector::new(self.translate_x, self.translate_y)
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_content(&mut self, content: Size) {
        self.content = content;
    }

    pub fn affine(&self) -> Affine {
        Affine {
            sx: self.scale_x,
            sy: self.scale_y,
            tx: self.translate_x,
            ty: self.translate_y,
        }
    }

    /// Viewport point to scene point
    pub fn to_scene(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate_x) / self.scale_x,
            (p.y - self.translate_y) / self.scale_y,
        )
    }

    /// Scene point to viewport point
    pub fn to_view(&self, p: Point) -> Point {
        self.affine().apply(p)
    }

    pub fn zoom_in(&mut self, cursor: Point) {
        self.zoom_to(self.scale_x * self.zoom_factor, cursor);
    }

    pub fn zoom_out(&mut self, cursor: Point) {
        self.zoom_to(self.scale_x / self.zoom_factor, cursor);
    }

    /// Set the scale, clamped to `min_scale`
    ///
    /// At 1.0 and above the scene point under `cursor` stays put. Below 1.0
    /// the shrunk scene is centered in the viewport instead.
    pub fn zoom_to(&mut self, scale: f32, cursor: Point) {
        let scale = scale.max(self.min_scale);
        self.zoom_center = cursor;
        if scale >= 1.0 {
            let anchor = self.to_scene(cursor);
            self.translate_x = cursor.x - anchor.x * scale;
            self.translate_y = cursor.y - anchor.y * scale;
        } else {
            self.translate_x = (self.viewport.width - self.content.width * scale) / 2.0;
            self.translate_y = (self.viewport.height - self.content.height * scale) / 2.0;
        }
        self.scale_x = scale;
        self.scale_y = scale;
        log::debug!(
            "Zoom {:.3} translate ({:.1}, {:.1})",
            scale,
            self.translate_x,
            self.translate_y
        );
    }

    /// Shift the view by a viewport delta
    pub fn pan_by(&mut self, delta: Vector) {
        self.translate_x += delta.dx;
        self.translate_y += delta.dy;
    }

    pub fn begin_pan(&mut self, p: Point) {
        self.pan_anchor = Some(p);
    }

    /// Follow the pointer during a pan; false when no pan is active
    pub fn pan_to(&mut self, p: Point) -> bool {
        let Some(last) = self.pan_anchor else {
            return false;
        };
        self.pan_by(p - last);
        self.pan_anchor = Some(p);
        true
    }

    pub fn end_pan(&mut self) -> bool {
        self.pan_anchor.take().is_some()
    }
}
