//! Rounded rectangle outline with four resize handles

use super::handles::{self, Corner, HANDLE_TOLERANCE};
use super::{DragHandle, ElementBase};
use crate::domain::{Color, Point, Rect, StrokeStyle, Vector};
use crate::render::{DrawingSurface, RenderContext};

#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub base: ElementBase,
    pub stroke_thickness: f32,
    /// Corner grabbed by the last press, consumed by the following moves
    pub active_corner: Option<Corner>,
}

impl Rectangle {
    pub fn new(rect: Rect, stroke_color: Color, stroke_thickness: f32) -> Self {
        Self {
            base: ElementBase::new(rect.origin(), rect.size(), stroke_color),
            stroke_thickness,
            active_corner: None,
        }
    }

    pub fn stroke(&self) -> StrokeStyle {
        StrokeStyle::new(self.base.color, self.stroke_thickness)
    }

    pub fn hit_tolerance(&self) -> f32 {
        HANDLE_TOLERANCE.max(self.stroke_thickness / 2.0)
    }

    pub fn bounds(&self) -> Rect {
        self.base.rect().inflate(self.stroke_thickness / 2.0)
    }

    /// Inside the outline or on a corner handle; an empty box never hits
    pub fn hit_test(&self, p: Point) -> bool {
        let rect = self.base.rect();
        if rect.is_empty() {
            return false;
        }
        self.bounds().contains(p) || handles::corner_at(&rect, p, HANDLE_TOLERANCE).is_some()
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
        if rect.is_empty() {
            return;
        }
        surface.stroke_rounded_rect(rect, ctx.corner_radius, &self.stroke());
        if self.base.selected {
            handles::draw_corner_handles(surface, ctx, &rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rectangle {
        Rectangle::new(Rect::new(10.0, 10.0, 50.0, 30.0), Color::default(), 3.0)
    }

    #[test]
    fn test_corner_grab_resizes() {
        let mut rect = sample();
        assert_eq!(
            rect.grab(Point::new(12.0, 11.0), HANDLE_TOLERANCE),
            DragHandle::Corner(Corner::NW)
        );
        rect.move_by(Vector::new(-5.0, -5.0));
        assert_eq!(rect.base.rect(), Rect::new(5.0, 5.0, 55.0, 35.0));
    }

    #[test]
    fn test_body_grab_moves() {
        let mut rect = sample();
        assert_eq!(rect.grab(Point::new(35.0, 25.0), HANDLE_TOLERANCE), DragHandle::Body);
        rect.move_by(Vector::new(5.0, 0.0));
        assert_eq!(rect.base.rect(), Rect::new(15.0, 10.0, 50.0, 30.0));
    }

    #[test]
    fn test_empty_rectangle_never_hits() {
        let rect = Rectangle::new(Rect::new(10.0, 10.0, 0.0, 0.0), Color::default(), 3.0);
        assert!(!rect.hit_test(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_corner_handles_hit_outside_outline() {
        let rect = sample();
        assert!(rect.hit_test(Point::new(66.0, 46.0)));
        assert!(!rect.hit_test(Point::new(75.0, 25.0)));
    }
}
