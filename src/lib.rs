//! Vector annotation engine for screenshots
//!
//! Annotations (arrows, rectangles, freehand strokes, text, speech bubbles,
//! blur regions and bitmaps) live as editable objects on top of a captured
//! background. The host delivers input events to an [`AnnotationEngine`],
//! repaints through a [`render::DrawingSurface`] when asked to, and exports
//! the flattened result with [`AnnotationEngine::export_raster`].

pub mod config;
pub mod domain;
pub mod elements;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod render;
pub mod scene;
pub mod script;
pub mod selection;
pub mod tools;
pub mod transform;

pub use config::EngineConfig;
pub use engine::AnnotationEngine;
pub use error::{EngineError, Result};
pub use scene::ElementId;
