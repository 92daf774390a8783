//! Selection and drag tracking
//!
//! A press resolves what it grabbed in priority order:
//! 1. a speech bubble tail end within the tail tolerance
//! 2. an arrow endpoint within the endpoint tolerance
//! 3. the element under the pointer (`ElementManager::element_at`), which may
//!    further resolve to one of its corner handles
//!
//! Moves while the button is held apply `current - last` to the grabbed
//! element. All positions are scene coordinates.

use crate::domain::Point;
use crate::elements::{DragHandle, Element, HANDLE_TOLERANCE};
use crate::scene::{ElementId, ElementManager, HitOrder};

/// Pick radius around arrow endpoints
pub const ARROW_ENDPOINT_TOLERANCE: f32 = 30.0;
/// Pick radius around speech bubble tail ends
pub const BUBBLE_TAIL_TOLERANCE: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub handle: f32,
    pub arrow_endpoint: f32,
    pub bubble_tail: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            handle: HANDLE_TOLERANCE,
            arrow_endpoint: ARROW_ENDPOINT_TOLERANCE,
            bubble_tail: BUBBLE_TAIL_TOLERANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(ElementId),
    DraggingBody(ElementId),
    DraggingHandle(ElementId, DragHandle),
    EditingText(ElementId),
}

impl SelectionState {
    pub fn element(self) -> Option<ElementId> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(id)
            | SelectionState::DraggingBody(id)
            | SelectionState::DraggingHandle(id, _)
            | SelectionState::EditingText(id) => Some(id),
        }
    }

    pub fn is_dragging(self) -> bool {
        matches!(
            self,
            SelectionState::DraggingBody(_) | SelectionState::DraggingHandle(..)
        )
    }
}

#[derive(Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
    last: Option<Point>,
    pub tolerances: Tolerances,
    pub hit_order: HitOrder,
}

impl SelectionController {
    pub fn new(tolerances: Tolerances, hit_order: HitOrder) -> Self {
        Self {
            state: SelectionState::Idle,
            last: None,
            tolerances,
            hit_order,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.state.element()
    }

    /// Candidates in the order point queries visit them
    fn visit_order(&self, manager: &ElementManager) -> Vec<ElementId> {
        let mut ids = manager.ids();
        if self.hit_order == HitOrder::Topmost {
            ids.reverse();
        }
        ids
    }

    fn tail_at(&self, manager: &ElementManager, p: Point) -> Option<ElementId> {
        self.visit_order(manager).into_iter().find(|id| {
            matches!(manager.get(*id), Some(Element::SpeechBubble(b))
                if b.tail_end.distance(p) <= self.tolerances.bubble_tail)
        })
    }

    fn arrow_endpoint_at(&self, manager: &ElementManager, p: Point) -> Option<ElementId> {
        let tolerance = self.tolerances.arrow_endpoint;
        self.visit_order(manager).into_iter().find(|id| {
            matches!(manager.get(*id), Some(Element::Arrow(a))
                if a.end_point.distance(p) <= tolerance
                    || a.start_point().distance(p) <= tolerance)
        })
    }

    /// Resolve a press; returns the element now selected, if any
    pub fn pointer_down(&mut self, manager: &mut ElementManager, p: Point) -> Option<ElementId> {
        self.clear(manager);

        let grabbed = if let Some(id) = self.tail_at(manager, p) {
            let tolerance = self.tolerances.bubble_tail;
            match manager.get_mut(id) {
                Some(Element::SpeechBubble(b)) => b.grab_tail(p, tolerance).map(|h| (id, h)),
                _ => None,
            }
        } else if let Some(id) = self.arrow_endpoint_at(manager, p) {
            let tolerance = self.tolerances.arrow_endpoint;
            match manager.get_mut(id) {
                Some(Element::Arrow(a)) => a.grab_endpoint(p, tolerance).map(|h| (id, h)),
                _ => None,
            }
        } else {
            manager.element_at(p, self.hit_order).and_then(|id| {
                let handle = manager.get_mut(id)?.grab(p, self.tolerances.handle);
                Some((id, handle))
            })
        };

        let (id, handle) = grabbed?;
        if let Some(element) = manager.get_mut(id) {
            element.set_selected(true);
            log::debug!("Grabbed {} {} by {:?}", element.kind(), id, handle);
        }
        self.state = match handle {
            DragHandle::Body => SelectionState::DraggingBody(id),
            handle => SelectionState::DraggingHandle(id, handle),
        };
        self.last = Some(p);
        Some(id)
    }

    /// Apply the drag delta; false when nothing is being dragged
    pub fn pointer_move(&mut self, manager: &mut ElementManager, p: Point) -> bool {
        if !self.state.is_dragging() {
            return false;
        }
        let (Some(id), Some(last)) = (self.state.element(), self.last) else {
            return false;
        };
        let delta = p - last;
        self.last = Some(p);
        if delta.is_zero() {
            return false;
        }
        match manager.get_mut(id) {
            Some(element) => {
                element.move_by(delta);
                true
            }
            None => {
                self.state = SelectionState::Idle;
                false
            }
        }
    }

    /// End a drag, keeping the element selected
    pub fn pointer_up(&mut self, manager: &mut ElementManager) {
        self.last = None;
        if !self.state.is_dragging() {
            return;
        }
        if let Some(id) = self.state.element() {
            if let Some(element) = manager.get_mut(id) {
                element.release();
            }
            self.state = SelectionState::Selected(id);
        }
    }

    /// Text-bearing element under `p` for a double click
    pub fn double_click(&mut self, manager: &mut ElementManager, p: Point) -> Option<ElementId> {
        let id = manager.element_at(p, self.hit_order)?;
        if !manager.get(id).is_some_and(Element::is_text_editable) {
            return None;
        }
        self.select(manager, id);
        self.state = SelectionState::EditingText(id);
        Some(id)
    }

    /// Select `id` without any drag
    pub fn select(&mut self, manager: &mut ElementManager, id: ElementId) -> bool {
        self.clear(manager);
        let Some(element) = manager.get_mut(id) else {
            return false;
        };
        if !element.can_be_selected() {
            return false;
        }
        element.set_selected(true);
        self.state = SelectionState::Selected(id);
        true
    }

    pub fn begin_editing(&mut self, manager: &mut ElementManager, id: ElementId) {
        if self.select(manager, id) {
            self.state = SelectionState::EditingText(id);
        }
    }

    pub fn end_editing(&mut self) {
        if let SelectionState::EditingText(id) = self.state {
            self.state = SelectionState::Selected(id);
        }
    }

    /// Deselect everything
    pub fn clear(&mut self, manager: &mut ElementManager) {
        if let Some(id) = self.state.element()
            && let Some(element) = manager.get_mut(id)
        {
            element.release();
            element.set_selected(false);
        }
        self.state = SelectionState::Idle;
        self.last = None;
    }

    /// Drop the selection if its element left the scene (undo, delete)
    pub fn forget_missing(&mut self, manager: &ElementManager) {
        if self.state.element().is_some_and(|id| !manager.contains(id)) {
            self.state = SelectionState::Idle;
            self.last = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Color, FontSpec, Rect, Vector};
    use crate::elements::{Arrow, Corner, Rectangle, SpeechBubble};

    fn arrow() -> Element {
        Element::Arrow(Arrow::new(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Color::default(),
            2.0,
        ))
    }

    #[test]
    fn test_arrow_end_drag_moves_only_end() {
        let mut manager = ElementManager::new();
        let id = manager.add(arrow());
        let mut selection = SelectionController::default();

        assert_eq!(selection.pointer_down(&mut manager, Point::new(120.0, 10.0)), Some(id));
        assert_eq!(
            selection.state(),
            SelectionState::DraggingHandle(id, DragHandle::ArrowEnd)
        );
        let Some(Element::Arrow(a)) = manager.get(id) else {
            panic!()
        };
        assert!(a.end_dragged && !a.start_dragged);

        selection.pointer_move(&mut manager, Point::new(130.0, 20.0));
        selection.pointer_up(&mut manager);

        let Some(Element::Arrow(a)) = manager.get(id) else {
            panic!()
        };
        assert_eq!(a.end_point, Point::new(110.0, 10.0));
        assert_eq!(a.start_point(), Point::new(0.0, 0.0));
        assert!(!a.end_dragged);
        assert_eq!(selection.state(), SelectionState::Selected(id));
    }

    #[test]
    fn test_bubble_tail_beats_arrow_endpoint() {
        let mut manager = ElementManager::new();
        manager.add(arrow());
        let bubble = manager.add(Element::SpeechBubble(SpeechBubble::new(
            Point::new(200.0, 200.0),
            Point::new(110.0, 10.0),
            FontSpec::default(),
            Color::default(),
        )));
        let mut selection = SelectionController::default();
        assert_eq!(selection.pointer_down(&mut manager, Point::new(105.0, 5.0)), Some(bubble));
        assert_eq!(
            selection.state(),
            SelectionState::DraggingHandle(bubble, DragHandle::Tail)
        );
    }

    #[test]
    fn test_corner_press_resizes_rectangle() {
        let mut manager = ElementManager::new();
        let id = manager.add(Element::Rectangle(Rectangle::new(
            Rect::new(10.0, 10.0, 50.0, 30.0),
            Color::default(),
            2.0,
        )));
        let mut selection = SelectionController::default();
        selection.pointer_down(&mut manager, Point::new(60.0, 40.0));
        assert_eq!(
            selection.state(),
            SelectionState::DraggingHandle(id, DragHandle::Corner(Corner::SE))
        );
        selection.pointer_move(&mut manager, Point::new(70.0, 50.0));
        assert_eq!(
            manager.get(id).unwrap().base().rect(),
            Rect::new(10.0, 10.0, 60.0, 40.0)
        );
    }

    #[test]
    fn test_miss_deselects() {
        let mut manager = ElementManager::new();
        let id = manager.add(arrow());
        let mut selection = SelectionController::default();
        selection.pointer_down(&mut manager, Point::new(50.0, 0.0));
        selection.pointer_up(&mut manager);
        assert!(manager.get(id).unwrap().is_selected());

        assert_eq!(selection.pointer_down(&mut manager, Point::new(50.0, 300.0)), None);
        assert_eq!(selection.state(), SelectionState::Idle);
        assert!(!manager.get(id).unwrap().is_selected());
    }

    #[test]
    fn test_body_drag_moves_whole_element() {
        let mut manager = ElementManager::new();
        let id = manager.add(arrow());
        let mut selection = SelectionController::default();
        selection.pointer_down(&mut manager, Point::new(50.0, 2.0));
        assert_eq!(selection.state(), SelectionState::DraggingBody(id));
        selection.pointer_move(&mut manager, Point::new(55.0, 12.0));
        let element = manager.get(id).unwrap();
        assert_eq!(element.base().position, Point::ORIGIN + Vector::new(5.0, 10.0));
    }

    #[test]
    fn test_forget_missing_after_removal() {
        let mut manager = ElementManager::new();
        let id = manager.add(arrow());
        let mut selection = SelectionController::default();
        selection.select(&mut manager, id);
        manager.remove(id).unwrap();
        selection.forget_missing(&manager);
        assert_eq!(selection.selected(), None);
    }
}
