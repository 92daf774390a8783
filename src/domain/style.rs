//! Style values read by drawers when a new element is started

use serde::{Deserialize, Serialize};

/// Serializable RGBA color (components in 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Default for Color {
    fn default() -> Self {
        // Default annotation red
        Self::rgb(0.9, 0.1, 0.1)
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Accent used for selection handles
    pub const HANDLE: Color = Color::rgb(0.2, 0.5, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha multiplied by `opacity`
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

/// Stroke parameters for outlines and lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub thickness: f32,
}

impl StrokeStyle {
    pub fn new(color: Color, thickness: f32) -> Self {
        Self { color, thickness }
    }
}

/// Weight/slant of a font face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Typeface {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// Font family, face and pixel size for text runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    pub typeface: Typeface,
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            typeface: Typeface::Regular,
            size: 18.0,
        }
    }
}

/// Current toolbar/palette state, handed to a drawer at `start_drawing`
///
/// This replaces any process-wide "current style": each drawer reads the
/// value it was given and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleContext {
    pub color: Color,
    pub stroke_thickness: f32,
    /// Opacity applied to freehand strokes (0.0 = invisible, 1.0 = opaque)
    pub transparency: f32,
    pub font: FontSpec,
    pub blur_radius: f32,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self {
            color: Color::default(),
            stroke_thickness: 3.0,
            transparency: 1.0,
            font: FontSpec::default(),
            blur_radius: 8.0,
        }
    }
}

impl StyleContext {
    pub fn stroke(&self) -> StrokeStyle {
        StrokeStyle::new(self.color, self.stroke_thickness)
    }
}
