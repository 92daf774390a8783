//! Speech bubbles: a rounded text box with a draggable tail

use super::{DragHandle, ElementBase};
use crate::domain::{Color, FontSpec, Point, Rect, Size, StrokeStyle, Vector, point_in_polygon};
use crate::render::geometry::{bubble, handle};
use crate::render::text::approximate_extent;
use crate::render::{DrawingSurface, RenderContext, TextMeasurer};

/// Outline width of the box and tail
const OUTLINE: f32 = 2.0;

/// Bubble whose box sits at `base.position` and whose tail ends at `tail_end`
///
/// The box size is never set directly: `layout` derives it from the measured
/// text, floored at `bubble::MIN_SIZE`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechBubble {
    pub base: ElementBase,
    pub text: String,
    pub font: FontSpec,
    pub tail_end: Point,
    pub tail_dragged: bool,
    text_size: Size,
}

impl SpeechBubble {
    pub fn new(position: Point, tail_end: Point, font: FontSpec, color: Color) -> Self {
        let mut bubble = Self {
            base: ElementBase::new(position, Size::ZERO, color),
            text: String::new(),
            font,
            tail_end,
            tail_dragged: false,
            text_size: Size::ZERO,
        };
        bubble.resize_to(approximate_extent("", bubble.font.size));
        bubble
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.resize_to(approximate_extent(text, self.font.size));
    }

    pub fn layout<M: TextMeasurer + ?Sized>(&mut self, measurer: &M) {
        self.resize_to(measurer.measure_text(&self.text, &self.font));
    }

    fn resize_to(&mut self, text_size: Size) {
        self.text_size = text_size;
        self.base.size = bubble::box_size(text_size);
    }

    pub fn tail_polygon(&self) -> [Point; 4] {
        bubble::tail_polygon(self.base.rect(), self.tail_end)
    }

    pub fn hit_tolerance(&self) -> f32 {
        OUTLINE
    }

    pub fn bounds(&self) -> Rect {
        let mut points = self.base.rect().corners().to_vec();
        points.extend_from_slice(&self.tail_polygon());
        Rect::bounding(&points)
            .unwrap_or_default()
            .inflate(OUTLINE / 2.0)
    }

    pub fn hit_test(&self, p: Point) -> bool {
        self.base.rect().contains(p) || point_in_polygon(p, &self.tail_polygon())
    }

    /// Grab the tail end when `p` is within `tolerance` of it
    pub fn grab_tail(&mut self, p: Point, tolerance: f32) -> Option<DragHandle> {
        self.tail_dragged = p.distance(self.tail_end) <= tolerance;
        self.tail_dragged.then_some(DragHandle::Tail)
    }

    /// Move only the tail while it is held, otherwise box and tail together
    pub fn move_by(&mut self, delta: Vector) {
        self.tail_end += delta;
        if !self.tail_dragged {
            self.base.position += delta;
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface, ctx: &RenderContext) {
        let rect = self.base.rect();
        let outline = StrokeStyle::new(self.base.color, OUTLINE);
        let tail = self.tail_polygon();

        // Box fill covers the tail outline where the tail runs under the box
        surface.fill_polygon(&tail, Color::WHITE);
        surface.stroke_polygon(&tail, &outline);
        surface.fill_rounded_rect(rect, ctx.corner_radius, Color::WHITE);
        surface.stroke_rounded_rect(rect, ctx.corner_radius, &outline);

        if !self.text.is_empty() {
            let origin = Point::new(
                rect.x + (rect.width - self.text_size.width) / 2.0,
                rect.y + (rect.height - self.text_size.height) / 2.0,
            );
            surface.draw_text(&self.text, origin, &self.font, self.base.color);
        }

        if self.base.selected && ctx.show_selection {
            let square = handle::square(self.tail_end);
            surface.fill_rounded_rect(square, 1.0, Color::WHITE);
            surface.stroke_rounded_rect(square, 1.0, &StrokeStyle::new(Color::HANDLE, 1.5));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::FontBook;

    struct FixedMeasurer(Size);

    impl TextMeasurer for FixedMeasurer {
        fn measure_text(&self, _text: &str, _font: &FontSpec) -> Size {
            self.0
        }
    }

    fn bubble() -> SpeechBubble {
        SpeechBubble::new(
            Point::new(50.0, 50.0),
            Point::new(20.0, 10.0),
            FontSpec::default(),
            Color::default(),
        )
    }

    #[test]
    fn test_empty_bubble_is_minimum_size() {
        let mut b = bubble();
        b.layout(&FontBook::approximate());
        assert_eq!(b.base.size, Size::new(100.0, 50.0));
    }

    #[test]
    fn test_wide_text_adds_margin() {
        let mut b = bubble();
        b.set_text("a wide line of text");
        b.layout(&FixedMeasurer(Size::new(130.0, 40.0)));
        assert_eq!(b.base.size, Size::new(150.0, 60.0));
    }

    #[test]
    fn test_tail_drag_moves_only_tail() {
        let mut b = bubble();
        assert_eq!(b.grab_tail(Point::new(40.0, 30.0), 40.0), Some(DragHandle::Tail));
        b.move_by(Vector::new(-5.0, 0.0));
        assert_eq!(b.tail_end, Point::new(15.0, 10.0));
        assert_eq!(b.base.position, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_body_drag_moves_box_and_tail() {
        let mut b = bubble();
        assert_eq!(b.grab_tail(Point::new(100.0, 80.0), 40.0), None);
        b.move_by(Vector::new(10.0, 10.0));
        assert_eq!(b.base.position, Point::new(60.0, 60.0));
        assert_eq!(b.tail_end, Point::new(30.0, 20.0));
    }

    #[test]
    fn test_hit_includes_tail() {
        let b = bubble();
        // Inside the tail polygon, above the box
        assert!(b.hit_test(Point::new(85.0, 45.0)));
        assert!(b.bounds().contains(Point::new(20.0, 10.0)));
    }
}
