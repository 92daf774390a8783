//! Pure domain types with minimal dependencies
//!
//! This module contains the value types used throughout the engine.
//! Types here have no rendering or input dependencies.

pub mod geometry;
pub mod style;

pub use geometry::*;
pub use style::*;
