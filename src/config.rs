//! Configuration persistence for markpea settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{StyleContext, Typeface};
use crate::elements::HANDLE_TOLERANCE;
use crate::elements::freehand::{SMOOTHING_RADIUS, SPLINE_SEGMENTS, SplineParams};
use crate::render::geometry::shape::CORNER_RADIUS;
use crate::render::text::FontBook;
use crate::scene::HitOrder;
use crate::selection::{ARROW_ENDPOINT_TOLERANCE, BUBBLE_TAIL_TOLERANCE, Tolerances};
use crate::transform::{MIN_SCALE, ZOOM_FACTOR};

/// Font file to load for one typeface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFile {
    pub typeface: Typeface,
    pub path: PathBuf,
}

/// Engine configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Style new elements start with
    pub style: StyleContext,
    /// Pick radius for corner handles
    pub handle_tolerance: f32,
    /// Pick radius for arrow endpoints
    pub arrow_endpoint_tolerance: f32,
    /// Pick radius for speech bubble tails
    pub bubble_tail_tolerance: f32,
    /// Scale step per wheel notch
    pub zoom_factor: f32,
    /// Lower scale bound
    pub min_scale: f32,
    /// Interpolated points per freehand sample interval
    pub spline_segments: usize,
    /// Moving-average half window for freehand samples
    pub smoothing_radius: usize,
    /// Corner radius of rectangles and speech bubbles
    pub corner_radius: f32,
    /// Offset applied to duplicated elements (times the element scale)
    pub clone_offset: f32,
    /// Which overlapping element a click selects
    pub hit_order: HitOrder,
    /// Fonts for text rendering; without any, text is measured approximately
    pub fonts: Vec<FontFile>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style: StyleContext::default(),
            handle_tolerance: HANDLE_TOLERANCE,
            arrow_endpoint_tolerance: ARROW_ENDPOINT_TOLERANCE,
            bubble_tail_tolerance: BUBBLE_TAIL_TOLERANCE,
            zoom_factor: ZOOM_FACTOR,
            min_scale: MIN_SCALE,
            spline_segments: SPLINE_SEGMENTS,
            smoothing_radius: SMOOTHING_RADIUS,
            corner_radius: CORNER_RADIUS,
            clone_offset: 10.0,
            hit_order: HitOrder::DrawOrder,
            fonts: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Directory name under the user config dir
    pub const ID: &'static str = "markpea";

    /// Default location: `<config dir>/markpea/config.json`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => log::error!("Failed to save config: no config directory"),
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            log::error!("Failed to create config dir {}: {}", parent.display(), err);
            return;
        }
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize config: {}", err);
                return;
            }
        };
        if let Err(err) = std::fs::write(path, json) {
            log::error!("Failed to save config: {}", err);
        }
    }

    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            handle: self.handle_tolerance,
            arrow_endpoint: self.arrow_endpoint_tolerance,
            bubble_tail: self.bubble_tail_tolerance,
        }
    }

    pub fn spline(&self) -> SplineParams {
        SplineParams {
            smoothing_radius: self.smoothing_radius,
            segments: self.spline_segments,
        }
    }

    /// Font book with every configured face that loads
    pub fn font_book(&self) -> FontBook {
        let mut book = FontBook::approximate();
        for font in &self.fonts {
            book.load_face(font.typeface, &font.path);
        }
        book
    }
}
