//! Arrow element: a stroked shaft ending in a filled isoceles head

use super::{DragHandle, ElementBase, handles};
use crate::domain::{
    Color, Point, Rect, Size, StrokeStyle, Vector, distance_to_segment, point_in_polygon,
};
use crate::render::geometry::arrow::{self, ArrowGeometry};
use crate::render::{DrawingSurface, RenderContext};

/// Arrow from `base.position` (tail) to `end_point` (head apex)
#[derive(Clone, Debug, PartialEq)]
pub struct Arrow {
    pub base: ElementBase,
    pub end_point: Point,
    pub thickness: f32,
    /// The tail endpoint is being dragged
    pub start_dragged: bool,
    /// The head endpoint is being dragged
    pub end_dragged: bool,
}

impl Arrow {
    pub fn new(start: Point, end: Point, color: Color, thickness: f32) -> Self {
        let mut arrow = Self {
            base: ElementBase::new(start, Size::ZERO, color),
            end_point: end,
            thickness,
            start_dragged: false,
            end_dragged: false,
        };
        arrow.sync_size();
        arrow
    }

    pub fn start_point(&self) -> Point {
        self.base.position
    }

    /// Shaft/head geometry, derived purely from the endpoints and thickness
    pub fn geometry(&self) -> Option<ArrowGeometry> {
        arrow::geometry(self.base.position, self.end_point, self.thickness)
    }

    pub fn hit_tolerance(&self) -> f32 {
        (self.thickness / 2.0 + 4.0).max(6.0)
    }

    pub fn bounds(&self) -> Rect {
        let mut points = vec![self.base.position, self.end_point];
        if let Some(g) = self.geometry() {
            points.extend_from_slice(&g.head);
        }
        Rect::bounding(&points)
            .unwrap_or_default()
            .inflate(self.thickness / 2.0)
    }

    pub fn hit_test(&self, p: Point) -> bool {
        if distance_to_segment(p, self.base.position, self.end_point) <= self.hit_tolerance() {
            return true;
        }
        self.geometry()
            .is_some_and(|g| point_in_polygon(p, &g.head))
    }

    /// Grab an endpoint within `tolerance` of `p`; the head wins when both qualify
    pub fn grab_endpoint(&mut self, p: Point, tolerance: f32) -> Option<DragHandle> {
        self.release();
        if p.distance(self.end_point) <= tolerance {
            self.end_dragged = true;
            Some(DragHandle::ArrowEnd)
        } else if p.distance(self.base.position) <= tolerance {
            self.start_dragged = true;
            Some(DragHandle::ArrowStart)
        } else {
            None
        }
    }

    pub fn release(&mut self) {
        self.start_dragged = false;
        self.end_dragged = false;
    }

    /// Move one endpoint when it is grabbed, otherwise the whole arrow
    pub fn move_by(&mut self, delta: Vector) {
        if self.end_dragged {
            self.end_point += delta;
        } else if self.start_dragged {
            self.base.position += delta;
        } else {
            self.base.position += delta;
            self.end_point += delta;
        }
        self.sync_size();
    }

    /// Set the head endpoint while the arrow is being drawn
    pub fn set_end_point(&mut self, end: Point) {
        self.end_point = end;
        self.sync_size();
    }

    fn sync_size(&mut self) {
        let extent = self.end_point - self.base.position;
        self.base.size = Size::new(extent.dx.abs(), extent.dy.abs());
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        let Some(g) = self.geometry() else {
            return;
        };
        let stroke = StrokeStyle::new(self.base.color, self.thickness);
        surface.stroke_line(self.base.position, g.shaft_end, &stroke);
        surface.fill_polygon(&g.head, self.base.color);

        if self.base.selected {
            handles::draw_handles(surface, ctx, &[self.base.position, self.end_point]);
        }
    }

    pub fn offset_copy(&self, offset: Vector) -> Self {
        let mut copy = self.clone();
        copy.base.position += offset;
        copy.end_point += offset;
        copy.base.selected = false;
        copy.release();
        copy
    }
}
