//! Text and speech bubble drawers
//!
//! Both finish by requesting a text edit session on the element they placed.

use super::{DrawTarget, Drawer, Finished, ToolKind};
use crate::domain::{Point, StyleContext};
use crate::elements::{Element, SpeechBubble, TextElement};
use crate::error::Result;
use crate::scene::ElementId;

#[derive(Debug, Default)]
pub struct TextDrawer {
    placed: Option<ElementId>,
}

impl Drawer for TextDrawer {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId> {
        let text = TextElement::new(p, "", style.font.clone(), style.color);
        let id = target.place(Element::Text(text))?;
        self.placed = Some(id);
        Ok(id)
    }

    /// Dragging before release repositions the text origin
    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point) {
        let Some(id) = self.placed else {
            return;
        };
        if let Some(Element::Text(text)) = target.element_mut(id) {
            text.base.position = p;
        }
    }

    fn finish_drawing(&mut self, _target: &mut DrawTarget) -> Finished {
        self.placed.take().map_or(Finished::Nothing, Finished::EditText)
    }

    fn drawing(&self) -> Option<ElementId> {
        self.placed
    }
}

/// Press places the bubble box, dragging pulls the tail out
#[derive(Debug, Default)]
pub struct SpeechBubbleDrawer {
    placed: Option<ElementId>,
}

impl Drawer for SpeechBubbleDrawer {
    fn kind(&self) -> ToolKind {
        ToolKind::SpeechBubble
    }

    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId> {
        let bubble = SpeechBubble::new(p, p, style.font.clone(), style.color);
        let id = target.place(Element::SpeechBubble(bubble))?;
        self.placed = Some(id);
        Ok(id)
    }

    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point) {
        let Some(id) = self.placed else {
            return;
        };
        if let Some(Element::SpeechBubble(bubble)) = target.element_mut(id) {
            bubble.tail_end = p;
        }
    }

    fn finish_drawing(&mut self, _target: &mut DrawTarget) -> Finished {
        self.placed.take().map_or(Finished::Nothing, Finished::EditText)
    }

    fn drawing(&self) -> Option<ElementId> {
        self.placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ActionHistory;
    use crate::scene::ElementManager;

    #[test]
    fn test_bubble_drag_pulls_tail() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let mut target = DrawTarget {
            manager: &mut manager,
            history: &mut history,
            scale: 1.0,
        };
        let mut drawer = SpeechBubbleDrawer::default();
        let id = drawer
            .start_drawing(&mut target, Point::new(100.0, 100.0), &StyleContext::default())
            .unwrap();
        drawer.update_drawing(&mut target, Point::new(40.0, 20.0));
        assert_eq!(drawer.finish_drawing(&mut target), Finished::EditText(id));

        let Some(Element::SpeechBubble(bubble)) = manager.get(id) else {
            panic!("bubble missing");
        };
        assert_eq!(bubble.base.position, Point::new(100.0, 100.0));
        assert_eq!(bubble.tail_end, Point::new(40.0, 20.0));
    }

    #[test]
    fn test_text_requests_edit_session() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let mut target = DrawTarget {
            manager: &mut manager,
            history: &mut history,
            scale: 1.0,
        };
        let mut drawer = TextDrawer::default();
        let id = drawer
            .start_drawing(&mut target, Point::new(5.0, 5.0), &StyleContext::default())
            .unwrap();
        assert_eq!(drawer.finish_drawing(&mut target), Finished::EditText(id));
        assert_eq!(manager.get(id).and_then(Element::text), Some(""));
    }
}
