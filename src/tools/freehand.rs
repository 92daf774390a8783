//! Freehand pen drawer

use super::{DrawTarget, Drawer, Finished, ToolKind};
use crate::domain::{Point, StyleContext};
use crate::elements::freehand::SplineParams;
use crate::elements::{Element, FreehandStroke};
use crate::error::Result;
use crate::scene::ElementId;

/// Samples closer than this to the previous one are dropped
const MIN_SAMPLE_DISTANCE: f32 = 1.0;

#[derive(Debug, Default)]
pub struct FreehandDrawer {
    spline: SplineParams,
    stroke: Option<ElementId>,
    last: Option<Point>,
}

impl FreehandDrawer {
    pub fn new(spline: SplineParams) -> Self {
        Self {
            spline,
            stroke: None,
            last: None,
        }
    }
}

impl Drawer for FreehandDrawer {
    fn kind(&self) -> ToolKind {
        ToolKind::Freehand
    }

    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId> {
        let stroke = FreehandStroke::new(p, style.color, style.stroke_thickness, style.transparency)
            .with_spline(self.spline);
        let id = target.place(Element::Freehand(stroke))?;
        self.stroke = Some(id);
        self.last = Some(p);
        Ok(id)
    }

    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point) {
        let Some(id) = self.stroke else {
            return;
        };
        if self.last.is_some_and(|last| last.distance(p) < MIN_SAMPLE_DISTANCE) {
            return;
        }
        if let Some(Element::Freehand(stroke)) = target.element_mut(id) {
            stroke.add_point(p);
            self.last = Some(p);
        }
    }

    fn finish_drawing(&mut self, _target: &mut DrawTarget) -> Finished {
        self.last = None;
        self.stroke.take().map_or(Finished::Nothing, Finished::Done)
    }

    fn drawing(&self) -> Option<ElementId> {
        self.stroke
    }
}
