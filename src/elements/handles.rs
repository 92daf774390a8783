//! Corner drag handles shared by box-shaped elements
//!
//! Rectangle, blur and image elements expose one handle per corner. A press
//! within the handle tolerance of a corner grabs it; the next moves resize the
//! box around the opposite (anchored) corner.

use crate::domain::{Color, Point, Rect, StrokeStyle, Vector};
use crate::render::geometry::handle;
use crate::render::{DrawingSurface, RenderContext};

/// Default pick radius for corner handles
pub const HANDLE_TOLERANCE: f32 = 10.0;

/// Corner of a box, named by compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    /// North-West corner
    NW,
    /// North-East corner
    NE,
    /// South-East corner
    SE,
    /// South-West corner
    SW,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::NW, Corner::NE, Corner::SE, Corner::SW];

    /// Position of this corner on `rect`
    pub fn point(self, rect: &Rect) -> Point {
        let [nw, ne, se, sw] = rect.corners();
        match self {
            Corner::NW => nw,
            Corner::NE => ne,
            Corner::SE => se,
            Corner::SW => sw,
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::NW => Corner::SE,
            Corner::NE => Corner::SW,
            Corner::SE => Corner::NW,
            Corner::SW => Corner::NE,
        }
    }

    /// Which corner `moved` is, relative to the fixed `anchor`
    fn relative_to(anchor: Point, moved: Point) -> Corner {
        match (moved.x < anchor.x, moved.y < anchor.y) {
            (true, true) => Corner::NW,
            (false, true) => Corner::NE,
            (false, false) => Corner::SE,
            (true, false) => Corner::SW,
        }
    }
}

/// The corner (if any) within `tolerance` of `p`, nearest first
pub fn corner_at(rect: &Rect, p: Point, tolerance: f32) -> Option<Corner> {
    if rect.is_empty() {
        return None;
    }
    Corner::ALL
        .into_iter()
        .map(|corner| (corner, corner.point(rect).distance(p)))
        .filter(|(_, distance)| *distance <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(corner, _)| corner)
}

/// Move `corner` by `delta`, keeping the opposite corner fixed
///
/// The result is normalized: dragging a corner past its anchor flips the box,
/// and the returned corner is the one the pointer now holds.
pub fn resize(rect: &Rect, corner: Corner, delta: Vector) -> (Rect, Corner) {
    let anchor = corner.opposite().point(rect);
    let moved = corner.point(rect) + delta;
    (
        Rect::from_corners(anchor, moved),
        Corner::relative_to(anchor, moved),
    )
}

/// Draw a square handle at each point
pub fn draw_handles(surface: &mut dyn DrawingSurface, ctx: &RenderContext, points: &[Point]) {
    if !ctx.show_selection {
        return;
    }
    let outline = StrokeStyle::new(Color::HANDLE, 1.5);
    for &p in points {
        let square = handle::square(p);
        surface.fill_rounded_rect(square, 1.0, Color::WHITE);
        surface.stroke_rounded_rect(square, 1.0, &outline);
    }
}

/// Draw the four corner handles of `rect`
pub fn draw_corner_handles(surface: &mut dyn DrawingSurface, ctx: &RenderContext, rect: &Rect) {
    draw_handles(surface, ctx, &rect.corners());
}
