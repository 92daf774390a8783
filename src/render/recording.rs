//! Recording back-end that keeps a list of primitive draw calls
//!
//! Hosts that drive their own renderer (GPU mesh, retained scene) replay the
//! recorded calls; tests inspect them directly.

use image::RgbaImage;

use super::text::FontBook;
use super::{Affine, DrawingSurface, TextMeasurer};
use crate::domain::{Color, FontSpec, Point, Rect, Size, StrokeStyle};

/// One recorded primitive, in scene coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Transform(Affine),
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
    Polyline {
        points: Vec<Point>,
        stroke: StrokeStyle,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Color,
    },
    StrokePolygon {
        points: Vec<Point>,
        stroke: StrokeStyle,
    },
    FillRoundedRect {
        rect: Rect,
        radius: f32,
        color: Color,
    },
    StrokeRoundedRect {
        rect: Rect,
        radius: f32,
        stroke: StrokeStyle,
    },
    Text {
        text: String,
        origin: Point,
        font: FontSpec,
        color: Color,
    },
    Image {
        width: u32,
        height: u32,
        dest: Rect,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    fonts: FontBook,
}

impl RecordingSurface {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            commands: Vec::new(),
            fonts,
        }
    }

    /// Drain the recorded calls
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl TextMeasurer for RecordingSurface {
    fn measure_text(&self, text: &str, font: &FontSpec) -> Size {
        self.fonts.measure_text(text, font)
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::Transform(transform));
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            stroke: *stroke,
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polygon(&mut self, points: &[Point], stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            stroke: *stroke,
        });
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.commands
            .push(DrawCommand::FillRoundedRect { rect, radius, color });
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32, stroke: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeRoundedRect {
            rect,
            radius,
            stroke: *stroke,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            font: font.clone(),
            color,
        });
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        self.commands.push(DrawCommand::Image {
            width: image.width(),
            height: image.height(),
            dest,
        });
    }
}
