//! Bitmap elements: pasted images, the background screenshot and pinned shots

use std::sync::Arc;

use image::RgbaImage;

use super::handles::{self, Corner, HANDLE_TOLERANCE};
use super::{DragHandle, ElementBase};
use crate::domain::{Color, Point, Rect, Size, Vector};
use crate::render::{DrawingSurface, RenderContext};

/// A shared bitmap blitted into `base.rect()`
#[derive(Clone, Debug, PartialEq)]
pub struct ImageElement {
    pub base: ElementBase,
    pub image: Arc<RgbaImage>,
    pub active_corner: Option<Corner>,
}

impl ImageElement {
    /// Image at its natural pixel size
    pub fn new(image: Arc<RgbaImage>, position: Point) -> Self {
        let size = Size::new(image.width() as f32, image.height() as f32);
        Self {
            base: ElementBase::new(position, size, Color::WHITE),
            image,
            active_corner: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.base.rect()
    }

    pub fn hit_test(&self, p: Point) -> bool {
        let rect = self.base.rect();
        !rect.is_empty() && rect.contains(p)
    }

    pub fn grab(&mut self, p: Point, tolerance: f32) -> DragHandle {
        self.active_corner = handles::corner_at(&self.base.rect(), p, tolerance);
        self.active_corner.map_or(DragHandle::Body, DragHandle::Corner)
    }

    pub fn move_by(&mut self, delta: Vector) {
        self.base.move_box(&mut self.active_corner, delta);
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        let rect = self.base.rect();
        surface.draw_image(&self.image, rect);
        if self.base.selected {
            handles::draw_corner_handles(surface, ctx, &rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_size_and_corner_resize() {
        let mut element = ImageElement::new(Arc::new(RgbaImage::new(40, 20)), Point::new(5.0, 5.0));
        assert_eq!(element.bounds(), Rect::new(5.0, 5.0, 40.0, 20.0));

        assert_eq!(
            element.grab(Point::new(44.0, 24.0), HANDLE_TOLERANCE),
            DragHandle::Corner(Corner::SE)
        );
        element.move_by(Vector::new(10.0, 10.0));
        assert_eq!(element.bounds(), Rect::new(5.0, 5.0, 50.0, 30.0));
    }
}
