//! Drawers for arrows, rectangles and blur regions

use super::{DrawTarget, Drawer, Finished, ToolKind};
use crate::domain::{Point, Rect, StyleContext};
use crate::elements::{Arrow, BlurRegion, Element, Rectangle};
use crate::error::Result;
use crate::scene::ElementId;

/// Gesture in progress: the element and where the press happened
#[derive(Clone, Copy, Debug)]
struct Gesture {
    id: ElementId,
    anchor: Point,
}

fn finish(gesture: &mut Option<Gesture>) -> Finished {
    gesture
        .take()
        .map_or(Finished::Nothing, |gesture| Finished::Done(gesture.id))
}

// ============================================================================
// Arrow drawer
// ============================================================================

#[derive(Debug, Default)]
pub struct ArrowDrawer {
    gesture: Option<Gesture>,
}

impl Drawer for ArrowDrawer {
    fn kind(&self) -> ToolKind {
        ToolKind::Arrow
    }

    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId> {
        let arrow = Arrow::new(p, p, style.color, style.stroke_thickness);
        let id = target.place(Element::Arrow(arrow))?;
        self.gesture = Some(Gesture { id, anchor: p });
        Ok(id)
    }

    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point) {
        let Some(gesture) = self.gesture else {
            return;
        };
        if let Some(Element::Arrow(arrow)) = target.element_mut(gesture.id) {
            arrow.set_end_point(p);
        }
    }

    fn finish_drawing(&mut self, _target: &mut DrawTarget) -> Finished {
        finish(&mut self.gesture)
    }

    fn drawing(&self) -> Option<ElementId> {
        self.gesture.map(|g| g.id)
    }
}

// ============================================================================
// Rectangle drawer
// ============================================================================

#[derive(Debug, Default)]
pub struct RectangleDrawer {
    gesture: Option<Gesture>,
}

impl Drawer for RectangleDrawer {
    fn kind(&self) -> ToolKind {
        ToolKind::Rectangle
    }

    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId> {
        let rect = Rectangle::new(Rect::from_corners(p, p), style.color, style.stroke_thickness);
        let id = target.place(Element::Rectangle(rect))?;
        self.gesture = Some(Gesture { id, anchor: p });
        Ok(id)
    }

    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point) {
        let Some(gesture) = self.gesture else {
            return;
        };
        if let Some(Element::Rectangle(rect)) = target.element_mut(gesture.id) {
            rect.base.set_rect(Rect::from_corners(gesture.anchor, p));
        }
    }

    fn finish_drawing(&mut self, _target: &mut DrawTarget) -> Finished {
        finish(&mut self.gesture)
    }

    fn drawing(&self) -> Option<ElementId> {
        self.gesture.map(|g| g.id)
    }
}

// ============================================================================
// Blur drawer
// ============================================================================

/// Outline of a blur region while selected
const BLUR_OUTLINE: f32 = 1.0;

#[derive(Debug, Default)]
pub struct BlurDrawer {
    gesture: Option<Gesture>,
}

impl Drawer for BlurDrawer {
    fn kind(&self) -> ToolKind {
        ToolKind::Blur
    }

    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId> {
        let region = BlurRegion::new(
            Rect::from_corners(p, p),
            style.color,
            BLUR_OUTLINE,
            style.blur_radius,
        );
        let id = target.place(Element::Blur(region))?;
        self.gesture = Some(Gesture { id, anchor: p });
        Ok(id)
    }

    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point) {
        let Some(gesture) = self.gesture else {
            return;
        };
        if let Some(Element::Blur(region)) = target.element_mut(gesture.id) {
            region.base.set_rect(Rect::from_corners(gesture.anchor, p));
        }
    }

    fn finish_drawing(&mut self, _target: &mut DrawTarget) -> Finished {
        finish(&mut self.gesture)
    }

    fn drawing(&self) -> Option<ElementId> {
        self.gesture.map(|g| g.id)
    }
}
