//! Drawing tools
//!
//! Each tool other than Select owns a `Drawer`: a small state machine that
//! turns one press-drag-release gesture into one new element.
//!
//! - `start_drawing` creates the element and adds it to the scene right away
//!   (as an undoable Add) so it is visible while being drawn
//! - `update_drawing` reshapes it on every pointer move
//! - `finish_drawing` lets go of it; the element stays in the scene
//!
//! Text and speech bubble drawers finish by asking for a text edit session.

mod freehand;
mod shapes;
mod text;
pub mod text_edit;

pub use freehand::FreehandDrawer;
pub use shapes::{ArrowDrawer, BlurDrawer, RectangleDrawer};
pub use text::{SpeechBubbleDrawer, TextDrawer};
pub use text_edit::{EditAction, TextEditSession};

use serde::{Deserialize, Serialize};

use crate::domain::{Point, StyleContext};
use crate::elements::Element;
use crate::elements::freehand::SplineParams;
use crate::error::Result;
use crate::history::ActionHistory;
use crate::scene::{ElementId, ElementManager};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Select,
    Arrow,
    Rectangle,
    Text,
    SpeechBubble,
    Blur,
    Freehand,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Arrow,
        ToolKind::Rectangle,
        ToolKind::Text,
        ToolKind::SpeechBubble,
        ToolKind::Blur,
        ToolKind::Freehand,
    ];

    /// Single-letter shortcut
    pub fn key(self) -> char {
        match self {
            ToolKind::Select => 'v',
            ToolKind::Arrow => 'a',
            ToolKind::Rectangle => 'r',
            ToolKind::Text => 't',
            ToolKind::SpeechBubble => 's',
            ToolKind::Blur => 'b',
            ToolKind::Freehand => 'f',
        }
    }

    pub fn from_key(c: char) -> Option<ToolKind> {
        let c = c.to_ascii_lowercase();
        Self::ALL.into_iter().find(|tool| tool.key() == c)
    }

    /// The drawer for this tool; Select has none
    pub fn drawer(self, spline: SplineParams) -> Option<Box<dyn Drawer>> {
        let drawer: Box<dyn Drawer> = match self {
            ToolKind::Select => return None,
            ToolKind::Arrow => Box::new(ArrowDrawer::default()),
            ToolKind::Rectangle => Box::new(RectangleDrawer::default()),
            ToolKind::Text => Box::new(TextDrawer::default()),
            ToolKind::SpeechBubble => Box::new(SpeechBubbleDrawer::default()),
            ToolKind::Blur => Box::new(BlurDrawer::default()),
            ToolKind::Freehand => Box::new(FreehandDrawer::new(spline)),
        };
        Some(drawer)
    }
}

/// Scene access handed to drawers
pub struct DrawTarget<'a> {
    pub manager: &'a mut ElementManager,
    pub history: &'a mut ActionHistory,
    /// Current display scale, stamped on new elements
    pub scale: f32,
}

impl DrawTarget<'_> {
    /// Add a freshly created element as an undoable step
    pub fn place(&mut self, mut element: Element) -> Result<ElementId> {
        element.base_mut().scale = self.scale;
        let kind = element.kind();
        let id = self.history.add(self.manager, element)?;
        log::debug!("Placed {} {}", kind, id);
        Ok(id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.manager.get_mut(id)
    }
}

/// How a gesture ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finished {
    /// Nothing was being drawn
    Nothing,
    /// The element is complete
    Done(ElementId),
    /// The element needs its text typed in
    EditText(ElementId),
}

/// Per-tool drawing state machine: Idle -> Drawing -> Idle
pub trait Drawer {
    fn kind(&self) -> ToolKind;

    /// Create the element for a gesture starting at `p` (scene coordinates)
    fn start_drawing(
        &mut self,
        target: &mut DrawTarget,
        p: Point,
        style: &StyleContext,
    ) -> Result<ElementId>;

    /// Reshape the element being drawn; ignored when idle
    fn update_drawing(&mut self, target: &mut DrawTarget, p: Point);

    /// Release the element being drawn
    fn finish_drawing(&mut self, target: &mut DrawTarget) -> Finished;

    /// Element currently being drawn
    fn drawing(&self) -> Option<ElementId>;

    fn is_drawing(&self) -> bool {
        self.drawing().is_some()
    }
}
