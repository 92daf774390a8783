//! Editable annotation elements
//!
//! `Element` is a closed sum over every shape the canvas can hold. Each
//! variant lives in its own module and carries an `ElementBase` with the
//! fields all shapes share; dispatch happens here by variant tag.
//!
//! Capabilities differ per variant:
//! - Background and pinned screenshots are neither selectable, movable nor
//!   clonable
//! - Rectangle, blur and image boxes resize through corner handles
//! - Arrows drag either endpoint, speech bubbles drag their tail
//! - Text and speech bubbles lay out against a `TextMeasurer`

pub mod arrow;
pub mod blur;
pub mod freehand;
pub mod handles;
pub mod image;
pub mod rectangle;
pub mod speech_bubble;
pub mod text;

pub use arrow::Arrow;
pub use blur::BlurRegion;
pub use freehand::FreehandStroke;
pub use handles::{Corner, HANDLE_TOLERANCE};
pub use image::ImageElement;
pub use rectangle::Rectangle;
pub use speech_bubble::SpeechBubble;
pub use text::TextElement;

use serde::{Deserialize, Serialize};

use crate::domain::{Color, Point, Rect, Size, Vector};
use crate::error::{EngineError, Result};
use crate::render::{DrawingSurface, RenderContext, TextMeasurer};

/// Fields every element carries
#[derive(Clone, Debug, PartialEq)]
pub struct ElementBase {
    /// Bounding box origin (arrow tail, bubble box corner, ...)
    pub position: Point,
    pub size: Size,
    pub color: Color,
    pub selected: bool,
    /// Display scale the element was created at; only scales the clone offset
    pub scale: f32,
}

impl ElementBase {
    pub fn new(position: Point, size: Size, color: Color) -> Self {
        Self {
            position,
            size,
            color,
            selected: false,
            scale: 1.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.position = rect.origin();
        self.size = rect.size();
    }

    /// Resize through `active` when a corner is held, otherwise translate
    ///
    /// Resizing an empty box is a no-op so a press-and-jitter at drag start
    /// never produces a degenerate flip.
    pub fn move_box(&mut self, active: &mut Option<Corner>, delta: Vector) {
        match *active {
            Some(corner) => {
                let rect = self.rect();
                if rect.is_empty() {
                    return;
                }
                let (resized, held) = handles::resize(&rect, corner, delta);
                self.set_rect(resized);
                *active = Some(held);
            }
            None => self.position += delta,
        }
    }
}

/// Which part of an element a press grabbed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragHandle {
    Body,
    ArrowStart,
    ArrowEnd,
    Corner(Corner),
    Tail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Arrow,
    Rectangle,
    Freehand,
    Text,
    SpeechBubble,
    Blur,
    Image,
    Background,
    PinnedScreenshot,
}

impl ElementKind {
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Arrow => "arrow",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Freehand => "freehand",
            ElementKind::Text => "text",
            ElementKind::SpeechBubble => "speech bubble",
            ElementKind::Blur => "blur",
            ElementKind::Image => "image",
            ElementKind::Background => "background",
            ElementKind::PinnedScreenshot => "pinned screenshot",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Arrow(Arrow),
    Rectangle(Rectangle),
    Freehand(FreehandStroke),
    Text(TextElement),
    SpeechBubble(SpeechBubble),
    Blur(BlurRegion),
    Image(ImageElement),
    /// The captured screenshot everything is drawn on
    Background(ImageElement),
    /// A screenshot pinned on top of the canvas
    PinnedScreenshot(ImageElement),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Arrow(_) => ElementKind::Arrow,
            Element::Rectangle(_) => ElementKind::Rectangle,
            Element::Freehand(_) => ElementKind::Freehand,
            Element::Text(_) => ElementKind::Text,
            Element::SpeechBubble(_) => ElementKind::SpeechBubble,
            Element::Blur(_) => ElementKind::Blur,
            Element::Image(_) => ElementKind::Image,
            Element::Background(_) => ElementKind::Background,
            Element::PinnedScreenshot(_) => ElementKind::PinnedScreenshot,
        }
    }

    pub fn base(&self) -> &ElementBase {
        match self {
            Element::Arrow(e) => &e.base,
            Element::Rectangle(e) => &e.base,
            Element::Freehand(e) => &e.base,
            Element::Text(e) => &e.base,
            Element::SpeechBubble(e) => &e.base,
            Element::Blur(e) => &e.base,
            Element::Image(e) | Element::Background(e) | Element::PinnedScreenshot(e) => &e.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ElementBase {
        match self {
            Element::Arrow(e) => &mut e.base,
            Element::Rectangle(e) => &mut e.base,
            Element::Freehand(e) => &mut e.base,
            Element::Text(e) => &mut e.base,
            Element::SpeechBubble(e) => &mut e.base,
            Element::Blur(e) => &mut e.base,
            Element::Image(e) | Element::Background(e) | Element::PinnedScreenshot(e) => {
                &mut e.base
            }
        }
    }

    fn is_fixed(&self) -> bool {
        matches!(self, Element::Background(_) | Element::PinnedScreenshot(_))
    }

    pub fn can_be_selected(&self) -> bool {
        !self.is_fixed()
    }

    pub fn is_movable(&self) -> bool {
        !self.is_fixed()
    }

    pub fn can_clone(&self) -> bool {
        !self.is_fixed()
    }

    pub fn is_selected(&self) -> bool {
        self.base().selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.base_mut().selected = selected && self.can_be_selected();
    }

    /// Copy shifted by `offset * scale` on both axes, unselected
    pub fn clone_element(&self, offset: f32) -> Result<Element> {
        let shift = offset * self.base().scale;
        let delta = Vector::new(shift, shift);
        let copy = match self {
            Element::Background(_) => return Err(EngineError::NotSupported("clone background")),
            Element::PinnedScreenshot(_) => {
                return Err(EngineError::NotSupported("clone pinned screenshot"));
            }
            Element::Arrow(e) => Element::Arrow(e.offset_copy(delta)),
            other => {
                let mut copy = other.clone();
                copy.release();
                copy.base_mut().selected = false;
                copy.translate(delta);
                copy
            }
        };
        Ok(copy)
    }

    /// Extra distance around the geometry within which a point still hits
    pub fn hit_tolerance(&self) -> f32 {
        match self {
            Element::Arrow(e) => e.hit_tolerance(),
            Element::Rectangle(e) => e.hit_tolerance(),
            Element::Freehand(e) => e.hit_tolerance(),
            Element::Text(e) => e.hit_tolerance(),
            Element::SpeechBubble(e) => e.hit_tolerance(),
            Element::Blur(e) => e.hit_tolerance(),
            Element::Image(_) | Element::Background(_) | Element::PinnedScreenshot(_) => {
                HANDLE_TOLERANCE
            }
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Element::Arrow(e) => e.bounds(),
            Element::Rectangle(e) => e.bounds(),
            Element::Freehand(e) => e.bounds(),
            Element::Text(e) => e.bounds(),
            Element::SpeechBubble(e) => e.bounds(),
            Element::Blur(e) => e.bounds(),
            Element::Image(e) | Element::Background(e) | Element::PinnedScreenshot(e) => {
                e.bounds()
            }
        }
    }

    pub fn hit_test(&self, p: Point) -> bool {
        match self {
            Element::Arrow(e) => e.hit_test(p),
            Element::Rectangle(e) => e.hit_test(p),
            Element::Freehand(e) => e.hit_test(p),
            Element::Text(e) => e.hit_test(p),
            Element::SpeechBubble(e) => e.hit_test(p),
            Element::Blur(e) => e.hit_test(p),
            Element::Image(e) | Element::Background(e) | Element::PinnedScreenshot(e) => {
                e.hit_test(p)
            }
        }
    }

    /// Resolve which handle `p` grabs and remember it for the next moves
    ///
    /// Arrow endpoints and bubble tails are resolved separately with their
    /// own tolerances (see `SelectionController`); here they grab the body.
    pub fn grab(&mut self, p: Point, tolerance: f32) -> DragHandle {
        match self {
            Element::Rectangle(e) => e.grab(p, tolerance),
            Element::Blur(e) => e.grab(p, tolerance),
            Element::Image(e) => e.grab(p, tolerance),
            other => {
                other.release();
                DragHandle::Body
            }
        }
    }

    /// Clear all transient drag state
    pub fn release(&mut self) {
        match self {
            Element::Arrow(e) => e.release(),
            Element::Rectangle(e) => e.active_corner = None,
            Element::SpeechBubble(e) => e.tail_dragged = false,
            Element::Blur(e) => e.active_corner = None,
            Element::Image(e) | Element::Background(e) | Element::PinnedScreenshot(e) => {
                e.active_corner = None
            }
            Element::Freehand(_) | Element::Text(_) => {}
        }
    }

    /// Apply a drag delta according to the grabbed handle
    ///
    /// Fixed elements ignore moves.
    pub fn move_by(&mut self, delta: Vector) {
        match self {
            Element::Arrow(e) => e.move_by(delta),
            Element::Rectangle(e) => e.move_by(delta),
            Element::Freehand(e) => e.move_by(delta),
            Element::Text(e) => e.move_by(delta),
            Element::SpeechBubble(e) => e.move_by(delta),
            Element::Blur(e) => e.move_by(delta),
            Element::Image(e) => e.move_by(delta),
            Element::Background(_) | Element::PinnedScreenshot(_) => {}
        }
    }

    /// Translate the whole shape, ignoring any grabbed handle
    fn translate(&mut self, delta: Vector) {
        self.release();
        self.move_by(delta);
    }

    /// Recompute text-dependent sizes
    pub fn layout<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) {
        match self {
            Element::Text(e) => e.layout(measurer),
            Element::SpeechBubble(e) => e.layout(measurer),
            _ => {}
        }
    }

    pub fn draw(&mut self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        self.layout(&*surface);
        match self {
            Element::Arrow(e) => e.draw(surface, ctx),
            Element::Rectangle(e) => e.draw(surface, ctx),
            Element::Freehand(e) => e.draw(surface, ctx),
            Element::Text(e) => e.draw(surface, ctx),
            Element::SpeechBubble(e) => e.draw(surface, ctx),
            Element::Blur(e) => e.draw(surface, ctx),
            Element::Image(e) | Element::Background(e) | Element::PinnedScreenshot(e) => {
                e.draw(surface, ctx)
            }
        }
    }

    pub fn is_text_editable(&self) -> bool {
        matches!(self, Element::Text(_) | Element::SpeechBubble(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Element::Text(e) => Some(&e.text),
            Element::SpeechBubble(e) => Some(&e.text),
            _ => None,
        }
    }

    /// Replace the text of a text-bearing element; returns false otherwise
    pub fn set_text(&mut self, text: &str) -> bool {
        match self {
            Element::Text(e) => e.set_text(text),
            Element::SpeechBubble(e) => e.set_text(text),
            _ => return false,
        }
        true
    }
}
