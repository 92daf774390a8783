//! Blur regions: boxes that show the blurred session snapshot beneath them

use super::handles::{self, Corner, HANDLE_TOLERANCE};
use super::{DragHandle, ElementBase};
use crate::domain::{Color, Point, Rect, StrokeStyle, Vector};
use crate::render::blur::{self, BlurCache};
use crate::render::{DrawingSurface, RenderContext};

#[derive(Clone, Debug, PartialEq)]
pub struct BlurRegion {
    pub base: ElementBase,
    /// Outline shown while the region is selected
    pub stroke_thickness: f32,
    pub blur_radius: f32,
    pub active_corner: Option<Corner>,
    cache: Option<BlurCache>,
}

impl BlurRegion {
    pub fn new(rect: Rect, stroke_color: Color, stroke_thickness: f32, blur_radius: f32) -> Self {
        Self {
            base: ElementBase::new(rect.origin(), rect.size(), stroke_color),
            stroke_thickness,
            blur_radius,
            active_corner: None,
            cache: None,
        }
    }

    /// Last blurred crop, if one has been derived
    pub fn cached(&self) -> Option<&BlurCache> {
        self.cache.as_ref()
    }

    pub fn hit_tolerance(&self) -> f32 {
        HANDLE_TOLERANCE
    }

    pub fn bounds(&self) -> Rect {
        self.base.rect()
    }

    pub fn hit_test(&self, p: Point) -> bool {
        let rect = self.base.rect();
        if rect.is_empty() {
            return false;
        }
        rect.contains(p) || handles::corner_at(&rect, p, HANDLE_TOLERANCE).is_some()
    }

    pub fn grab(&mut self, p: Point, tolerance: f32) -> DragHandle {
        self.active_corner = handles::corner_at(&self.base.rect(), p, tolerance);
        self.active_corner.map_or(DragHandle::Body, DragHandle::Corner)
    }

    pub fn move_by(&mut self, delta: Vector) {
        self.base.move_box(&mut self.active_corner, delta);
    }

    /// Draw the blurred snapshot crop; without a snapshot nothing is blurred
    pub fn draw(&mut self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        let rect = self.base.rect();
        if rect.is_empty() {
            return;
        }
        if let Some(snapshot) = ctx.snapshot
            && let Some(entry) = blur::refresh(&mut self.cache, snapshot, rect, self.blur_radius)
        {
            surface.draw_image(&entry.image, entry.dest);
        }

        if self.base.selected && ctx.show_selection {
            let outline = StrokeStyle::new(self.base.color, self.stroke_thickness);
            surface.stroke_rounded_rect(rect, 0.0, &outline);
            handles::draw_corner_handles(surface, ctx, &rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{DrawCommand, RecordingSurface};
    use image::RgbaImage;

    fn snapshot() -> RgbaImage {
        RgbaImage::from_fn(50, 50, |x, _| image::Rgba([(x * 5) as u8, 0, 0, 255]))
    }

    #[test]
    fn test_draw_clamps_region_to_snapshot() {
        let snapshot = snapshot();
        let mut region = BlurRegion::new(Rect::new(40.0, 40.0, 30.0, 30.0), Color::default(), 2.0, 4.0);
        let ctx = RenderContext {
            snapshot: Some(&snapshot),
            ..Default::default()
        };
        let mut surface = RecordingSurface::default();
        region.draw(&mut surface, &ctx);
        assert_eq!(
            surface.commands,
            vec![DrawCommand::Image {
                width: 10,
                height: 10,
                dest: Rect::new(40.0, 40.0, 10.0, 10.0),
            }]
        );
    }

    #[test]
    fn test_resize_rederives_from_snapshot() {
        let snapshot = snapshot();
        let ctx = RenderContext {
            snapshot: Some(&snapshot),
            ..Default::default()
        };
        let mut surface = RecordingSurface::default();
        let mut region = BlurRegion::new(Rect::new(5.0, 5.0, 20.0, 20.0), Color::default(), 2.0, 4.0);
        region.draw(&mut surface, &ctx);
        let original = region.cached().unwrap().image.clone();

        region.grab(Point::new(25.0, 25.0), HANDLE_TOLERANCE);
        region.move_by(Vector::new(10.0, 10.0));
        region.draw(&mut surface, &ctx);
        region.move_by(Vector::new(-10.0, -10.0));
        region.draw(&mut surface, &ctx);

        assert_eq!(region.cached().unwrap().image, original);
    }

    #[test]
    fn test_unsized_region_is_inert() {
        let mut region = BlurRegion::new(Rect::new(5.0, 5.0, 0.0, 0.0), Color::default(), 2.0, 4.0);
        assert!(!region.hit_test(Point::new(5.0, 5.0)));
        region.grab(Point::new(5.0, 5.0), HANDLE_TOLERANCE);
        region.move_by(Vector::new(3.0, 3.0));
        assert_eq!(region.base.position, Point::new(8.0, 8.0));
        assert_eq!(region.bounds().width, 0.0);
    }
}
