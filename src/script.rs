//! JSON session scripts replayed against an engine
//!
//! A script is an array of steps:
//!
//! ```json
//! [
//!   {"tool": "rectangle"},
//!   {"drag": {"from": {"x": 10, "y": 10}, "to": {"x": 80, "y": 60}}},
//!   {"tool": "text"},
//!   {"pointer": {"kind": "down", "position": {"x": 20, "y": 90}}},
//!   {"pointer": {"kind": "up", "position": {"x": 20, "y": 90}}},
//!   {"type": "hello"},
//!   {"key": {"key": {"named": "enter"}}},
//!   "undo"
//! ]
//! ```
//!
//! Positions are viewport coordinates, exactly what a host would deliver.

use serde::{Deserialize, Serialize};

use crate::domain::{Point, StyleContext};
use crate::engine::AnnotationEngine;
use crate::error::Result;
use crate::input::{KeyEvent, PointerEvent, WheelEvent};
use crate::tools::ToolKind;

/// Intermediate pointer moves a `drag` step generates by default
const DRAG_STEPS: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Tool(ToolKind),
    Style(StyleContext),
    Pointer(PointerEvent),
    /// Press at `from`, move in `steps` increments, release at `to`
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        steps: Option<usize>,
    },
    Wheel(WheelEvent),
    Key(KeyEvent),
    /// One key press per character
    Type(String),
    Undo,
    Redo,
    DeleteSelected,
    Duplicate,
    ClearAll,
    FocusLost,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Run every step; a failing step is logged and skipped
    ///
    /// Returns the number of steps that failed.
    pub fn replay(&self, engine: &mut AnnotationEngine) -> usize {
        let mut failed = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if let Err(err) = step.apply(engine) {
                log::warn!("Script step {} ({:?}) failed: {}", index, step, err);
                failed += 1;
            }
        }
        log::info!(
            "Replayed {} step(s), {} failed",
            self.steps.len(),
            failed
        );
        failed
    }
}

impl Step {
    pub fn apply(&self, engine: &mut AnnotationEngine) -> Result<()> {
        match self {
            Step::Tool(tool) => engine.set_tool(*tool)?,
            Step::Style(style) => engine.set_style(style.clone()),
            Step::Pointer(event) => engine.handle_pointer(*event)?,
            Step::Drag { from, to, steps } => {
                let steps = steps.unwrap_or(DRAG_STEPS).max(1);
                engine.handle_pointer(PointerEvent::down(from.x, from.y))?;
                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    engine.handle_pointer(PointerEvent::moved(
                        from.x + (to.x - from.x) * t,
                        from.y + (to.y - from.y) * t,
                    ))?;
                }
                engine.handle_pointer(PointerEvent::up(to.x, to.y))?;
            }
            Step::Wheel(event) => engine.handle_wheel(*event),
            Step::Key(event) => {
                engine.handle_key(*event)?;
            }
            Step::Type(text) => {
                for c in text.chars() {
                    engine.handle_key(KeyEvent::char(c))?;
                }
            }
            Step::Undo => {
                engine.undo()?;
            }
            Step::Redo => {
                engine.redo()?;
            }
            Step::DeleteSelected => {
                engine.delete_selected()?;
            }
            Step::Duplicate => {
                engine.duplicate_selected()?;
            }
            Step::ClearAll => {
                engine.clear_annotations()?;
            }
            Step::FocusLost => engine.focus_lost()?,
        }
        Ok(())
    }
}
