//! Free-standing text labels

use super::ElementBase;
use crate::domain::{Color, FontSpec, Point, Rect, StrokeStyle, Vector};
use crate::render::text::approximate_extent;
use crate::render::{DrawingSurface, RenderContext, TextMeasurer};

/// Slack around the glyph run that still counts as a hit
const TEXT_PADDING: f32 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    pub base: ElementBase,
    pub text: String,
    pub font: FontSpec,
}

impl TextElement {
    pub fn new(position: Point, text: &str, font: FontSpec, color: Color) -> Self {
        let size = approximate_extent(text, font.size);
        Self {
            base: ElementBase::new(position, size, color),
            text: text.to_string(),
            font,
        }
    }

    /// Replace the text; the size is estimated until the next layout
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.base.size = approximate_extent(text, self.font.size);
    }

    /// Size the element to the measured text run
    pub fn layout<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) {
        self.base.size = measurer.measure_text(&self.text, &self.font);
    }

    pub fn hit_tolerance(&self) -> f32 {
        TEXT_PADDING
    }

    pub fn bounds(&self) -> Rect {
        self.base.rect()
    }

    pub fn hit_test(&self, p: Point) -> bool {
        self.bounds().inflate(TEXT_PADDING).contains(p)
    }

    pub fn move_by(&mut self, delta: Vector) {
        self.base.position += delta;
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        if !self.text.is_empty() {
            surface.draw_text(&self.text, self.base.position, &self.font, self.base.color);
        }
        if self.base.selected && ctx.show_selection {
            let outline = StrokeStyle::new(Color::HANDLE, 1.0);
            surface.stroke_rounded_rect(self.bounds().inflate(TEXT_PADDING), 2.0, &outline);
        }
    }
}
