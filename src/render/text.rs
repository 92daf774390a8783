//! Text measurement and glyph rasterization
//!
//! Fonts are optional: without a loaded face the book falls back to an
//! approximate metric so layout (bubble sizing, text hit boxes) still works
//! headless.

use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};

use super::TextMeasurer;
use crate::domain::{FontSpec, Point, Size, Typeface};
use crate::error::{EngineError, Result};

/// Average advance of one character, in ems, for the approximate metric
const APPROX_ADVANCE_EM: f32 = 0.55;
/// Line height in ems for the approximate metric
const APPROX_LINE_HEIGHT_EM: f32 = 1.2;

/// Font faces keyed by typeface, with fallback to the regular face
#[derive(Clone, Default)]
pub struct FontBook {
    faces: HashMap<Typeface, FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontBook {
    /// A book with no faces; measurement uses the approximate metric
    pub fn approximate() -> Self {
        Self::default()
    }

    /// Register a face from raw font data (TTF/OTF)
    pub fn insert_face(&mut self, typeface: Typeface, data: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(data).map_err(|e| EngineError::Font(e.to_string()))?;
        self.faces.insert(typeface, font);
        Ok(())
    }

    /// Register a face from a font file, logging and skipping unreadable files
    pub fn load_face(&mut self, typeface: Typeface, path: &Path) -> bool {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Could not read font {}: {}", path.display(), err);
                return false;
            }
        };
        match self.insert_face(typeface, data) {
            Ok(()) => {
                log::debug!("Loaded {:?} face from {}", typeface, path.display());
                true
            }
            Err(err) => {
                log::warn!("Could not parse font {}: {}", path.display(), err);
                false
            }
        }
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    fn face(&self, typeface: Typeface) -> Option<&FontArc> {
        self.faces
            .get(&typeface)
            .or_else(|| self.faces.get(&Typeface::Regular))
            .or_else(|| self.faces.values().next())
    }

    /// Rasterize a text run into a coverage callback
    ///
    /// `origin` is the top-left of the run in device pixels and `size` the
    /// device pixel size. `plot(x, y, coverage)` receives device pixel
    /// coordinates. Returns false when no face is loaded.
    pub fn rasterize(
        &self,
        text: &str,
        typeface: Typeface,
        origin: Point,
        size: f32,
        mut plot: impl FnMut(i32, i32, f32),
    ) -> bool {
        let Some(font) = self.face(typeface) else {
            return false;
        };
        let scaled = font.as_scaled(PxScale::from(size));
        let line_height = scaled.height() + scaled.line_gap();

        for (line_index, line) in text_lines(text).enumerate() {
            let baseline = origin.y + scaled.ascent() + line_index as f32 * line_height;
            let mut caret = origin.x;
            let mut previous = None;

            for c in line.chars() {
                let id = scaled.glyph_id(c);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
                caret += scaled.h_advance(id);
                previous = Some(id);

                if let Some(outlined) = font.outline_glyph(glyph) {
                    let bounds = outlined.px_bounds();
                    outlined.draw(|gx, gy, coverage| {
                        plot(
                            bounds.min.x as i32 + gx as i32,
                            bounds.min.y as i32 + gy as i32,
                            coverage,
                        );
                    });
                }
            }
        }
        true
    }
}

/// Lines as measured and drawn: split on `\n`, a trailing `\r` dropped
///
/// A trailing newline yields a final empty line.
pub fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Approximate extent: fixed per-character advance, fixed line height
pub fn approximate_extent(text: &str, size: f32) -> Size {
    let lines = text_lines(text).collect::<Vec<_>>();
    let longest = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    Size::new(
        longest as f32 * size * APPROX_ADVANCE_EM,
        lines.len() as f32 * size * APPROX_LINE_HEIGHT_EM,
    )
}

impl TextMeasurer for FontBook {
    fn measure_text(&self, text: &str, font: &FontSpec) -> Size {
        let Some(face) = self.face(font.typeface) else {
            return approximate_extent(text, font.size);
        };
        let scaled = face.as_scaled(PxScale::from(font.size));
        let line_height = scaled.height() + scaled.line_gap();

        let lines = text_lines(text).collect::<Vec<_>>();
        let width = lines
            .iter()
            .map(|line| {
                let mut previous = None;
                line.chars().fold(0.0, |width, c| {
                    let id = scaled.glyph_id(c);
                    let kern = previous.map_or(0.0, |prev| scaled.kern(prev, id));
                    previous = Some(id);
                    width + kern + scaled.h_advance(id)
                })
            })
            .fold(0.0_f32, f32::max);

        Size::new(width, lines.len() as f32 * line_height)
    }
}
