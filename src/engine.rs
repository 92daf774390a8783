//! The annotation engine: public API over scene, history, tools and view
//!
//! The host feeds pointer, wheel and key events in viewport coordinates and
//! drains `take_redraw_request()` to know when to repaint. Everything runs
//! synchronously on the caller's thread.
//!
//! The blur snapshot is taken exactly once, on the first pointer press or the
//! first add/remove, before that interaction changes anything. It is a render
//! of every non-blur element with selection chrome hidden, and it never
//! changes afterwards.

use std::sync::Arc;

use image::RgbaImage;

use crate::config::EngineConfig;
use crate::domain::{Color, Point, Size, StyleContext, Vector};
use crate::elements::{Element, ImageElement};
use crate::error::{EngineError, Result};
use crate::history::{ActionHistory, Command};
use crate::input::{
    KeyEvent, PointerButton, PointerEvent, PointerKind, Shortcut, WheelEvent, shortcut_for,
};
use crate::render::raster::RasterSurface;
use crate::render::text::FontBook;
use crate::render::{Affine, DrawingSurface, RenderContext};
use crate::scene::{ElementId, ElementManager};
use crate::selection::{SelectionController, SelectionState};
use crate::tools::{DrawTarget, Drawer, EditAction, Finished, TextEditSession, ToolKind};
use crate::transform::CanvasTransform;

/// Viewport pixels scrolled per wheel notch without a zoom modifier
const SCROLL_STEP: f32 = 40.0;

pub struct AnnotationEngine {
    config: EngineConfig,
    manager: ElementManager,
    history: ActionHistory,
    selection: SelectionController,
    transform: CanvasTransform,
    tool: ToolKind,
    drawer: Option<Box<dyn Drawer>>,
    style: StyleContext,
    fonts: FontBook,
    /// Host display scale stamped on new elements (scales the clone offset)
    display_scale: f32,
    /// Scene extent, the background size when there is one
    canvas_size: Size,
    snapshot: Option<Arc<RgbaImage>>,
    text_edit: Option<TextEditSession>,
    redraw: bool,
}

impl AnnotationEngine {
    /// Empty canvas; fonts are loaded from the config
    pub fn new(config: EngineConfig) -> Self {
        let fonts = config.font_book();
        Self::with_fonts(config, fonts)
    }

    pub fn with_fonts(config: EngineConfig, fonts: FontBook) -> Self {
        let mut transform = CanvasTransform::new(config.zoom_factor, config.min_scale);
        transform.set_viewport(Size::ZERO);
        Self {
            selection: SelectionController::new(config.tolerances(), config.hit_order),
            transform,
            style: config.style.clone(),
            config,
            manager: ElementManager::new(),
            history: ActionHistory::new(),
            tool: ToolKind::Select,
            drawer: None,
            fonts,
            display_scale: 1.0,
            canvas_size: Size::ZERO,
            snapshot: None,
            text_edit: None,
            redraw: true,
        }
    }

    /// Canvas over a captured screenshot
    pub fn with_background(config: EngineConfig, background: RgbaImage) -> Self {
        let mut engine = Self::new(config);
        engine.set_background(background);
        engine
    }

    /// Put `image` at the bottom of the scene as the non-selectable background
    ///
    /// Not an undoable step. Has to happen before the first interaction for
    /// blur regions to see it.
    pub fn set_background(&mut self, image: RgbaImage) {
        let size = Size::new(image.width() as f32, image.height() as f32);
        let background = Element::Background(ImageElement::new(Arc::new(image), Point::ORIGIN));
        let existing = self
            .manager
            .iter()
            .find(|(_, e)| matches!(e, Element::Background(_)))
            .map(|(id, _)| id);
        if let Some(slot) = existing.and_then(|id| self.manager.get_mut(id)) {
            *slot = background;
        } else {
            let id = self.manager.add(background);
            if let Err(err) = self.manager.send_to_back(id) {
                log::warn!("Could not lower background: {}", err);
            }
        }
        self.canvas_size = size;
        self.transform.set_content(size);
        if self.transform.scale() == 1.0 && self.transform.translate().is_zero() {
            self.transform.set_viewport(size);
        }
        self.request_redraw();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn manager(&self) -> &ElementManager {
        &self.manager
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.manager.get(id)
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selection.selected()
    }

    pub fn transform(&self) -> &CanvasTransform {
        &self.transform
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn style(&self) -> &StyleContext {
        &self.style
    }

    /// Style read by drawers at the start of the next gesture
    pub fn set_style(&mut self, style: StyleContext) {
        self.style = style;
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn snapshot(&self) -> Option<&RgbaImage> {
        self.snapshot.as_deref()
    }

    pub fn text_edit(&self) -> Option<&TextEditSession> {
        self.text_edit.as_ref()
    }

    pub fn set_display_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.display_scale = scale;
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.transform.set_viewport(viewport);
        self.request_redraw();
    }

    /// True once after any state change; the host repaints when it sees it
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn request_redraw(&mut self) {
        self.redraw = true;
    }

    // ========================================================================
    // Tools
    // ========================================================================

    /// Switch tools; any gesture in progress is finished, any text committed
    pub fn set_tool(&mut self, tool: ToolKind) -> Result<()> {
        if tool == self.tool && (tool == ToolKind::Select || self.drawer.is_some()) {
            return Ok(());
        }
        self.finish_text_edit()?;
        self.finish_drawing()?;
        self.tool = tool;
        self.drawer = tool.drawer(self.config.spline());
        if tool != ToolKind::Select {
            self.selection.clear(&mut self.manager);
        }
        log::debug!("Tool switched to {:?}", tool);
        self.request_redraw();
        Ok(())
    }

    fn draw_target(&mut self) -> (Option<&mut Box<dyn Drawer>>, DrawTarget<'_>) {
        (
            self.drawer.as_mut(),
            DrawTarget {
                manager: &mut self.manager,
                history: &mut self.history,
                scale: self.display_scale,
            },
        )
    }

    fn finish_drawing(&mut self) -> Result<()> {
        let (Some(drawer), mut target) = self.draw_target() else {
            return Ok(());
        };
        match drawer.finish_drawing(&mut target) {
            Finished::EditText(id) => self.begin_text_edit(id, true),
            Finished::Done(_) | Finished::Nothing => {}
        }
        Ok(())
    }

    /// Drop the element of the gesture in progress without an undo step
    fn abandon_drawing(&mut self) -> bool {
        let (Some(drawer), mut target) = self.draw_target() else {
            return false;
        };
        let id = drawer.drawing();
        drawer.finish_drawing(&mut target);
        match id {
            Some(id) => {
                self.discard(id);
                true
            }
            None => false,
        }
    }

    /// Remove an element placed by the current gesture, retracting its Add
    ///
    /// When other commands were recorded after the Add, the element leaves
    /// through an undoable Remove instead so history stays replayable.
    fn discard(&mut self, id: ElementId) {
        let removed = if self.history.retract(id) {
            self.manager.remove(id).map(|_| ())
        } else {
            self.history.remove(&mut self.manager, id)
        };
        if let Err(err) = removed {
            log::warn!("Could not discard {}: {}", id, err);
        }
        self.selection.forget_missing(&self.manager);
        self.request_redraw();
    }

    // ========================================================================
    // Public engine API
    // ========================================================================

    /// Add an element on top as an undoable step
    pub fn add_element(&mut self, element: Element) -> Result<ElementId> {
        self.finish_text_edit()?;
        self.ensure_snapshot();
        let mut element = element;
        element.layout(&self.fonts);
        let kind = element.kind();
        let id = self.history.add(&mut self.manager, element)?;
        log::debug!("Added {} {}", kind, id);
        self.request_redraw();
        Ok(id)
    }

    /// Remove an element as an undoable step
    pub fn remove_element(&mut self, id: ElementId) -> Result<()> {
        self.ensure_snapshot();
        if self.text_edit.as_ref().is_some_and(|s| s.id == id) {
            self.text_edit = None;
            self.selection.end_editing();
        }
        let removable = self.manager.get(id).is_some_and(Element::can_be_selected);
        if self.manager.contains(id) && !removable {
            return Err(EngineError::NotSupported("remove fixed element"));
        }
        self.history.remove(&mut self.manager, id)?;
        self.selection.forget_missing(&self.manager);
        self.request_redraw();
        Ok(())
    }

    /// Select the element under a scene point, or clear the selection
    pub fn select_element_at(&mut self, p: Point) -> Option<ElementId> {
        if let Err(err) = self.finish_text_edit() {
            log::warn!("Could not commit text before selecting: {}", err);
        }
        self.request_redraw();
        match self.manager.element_at(p, self.selection.hit_order) {
            Some(id) if self.selection.select(&mut self.manager, id) => Some(id),
            _ => {
                self.selection.clear(&mut self.manager);
                None
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.manager);
        self.request_redraw();
    }

    /// Remove the selected element; false when nothing is selected
    pub fn delete_selected(&mut self) -> Result<bool> {
        let Some(id) = self.selection.selected() else {
            return Ok(false);
        };
        self.remove_element(id)?;
        Ok(true)
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.finish_text_edit()?;
        self.finish_drawing()?;
        let undone = self.history.undo(&mut self.manager)?;
        self.after_history_step(undone, "Undo");
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.finish_text_edit()?;
        self.finish_drawing()?;
        let redone = self.history.redo(&mut self.manager)?;
        self.after_history_step(redone, "Redo");
        Ok(redone)
    }

    fn after_history_step(&mut self, changed: bool, what: &str) {
        if !changed {
            log::debug!("{} with empty stack ignored", what);
            return;
        }
        // Elements coming back keep their old selected flag
        let selected = self.selection.selected();
        for (id, element) in self.manager.iter_mut() {
            if Some(id) != selected {
                element.set_selected(false);
            }
        }
        self.selection.forget_missing(&self.manager);
        self.request_redraw();
    }

    /// Translate the selected element as a whole
    pub fn move_selected(&mut self, delta: Vector) -> bool {
        let Some(id) = self.selection.selected() else {
            return false;
        };
        let Some(element) = self.manager.get_mut(id) else {
            return false;
        };
        element.release();
        element.move_by(delta);
        self.request_redraw();
        true
    }

    /// Clone the selected element with an offset and select the copy
    pub fn duplicate_selected(&mut self) -> Result<Option<ElementId>> {
        self.finish_text_edit()?;
        let Some(id) = self.selection.selected() else {
            return Ok(None);
        };
        let Some(element) = self.manager.get(id) else {
            return Ok(None);
        };
        if !element.can_clone() {
            log::debug!("{} cannot be duplicated", element.kind());
            return Ok(None);
        }
        let copy = element.clone_element(self.config.clone_offset)?;
        let copy_id = self.add_element(copy)?;
        self.selection.select(&mut self.manager, copy_id);
        Ok(Some(copy_id))
    }

    pub fn bring_selected_to_front(&mut self) -> Result<bool> {
        let Some(id) = self.selection.selected() else {
            return Ok(false);
        };
        self.manager.bring_to_front(id)?;
        self.request_redraw();
        Ok(true)
    }

    pub fn send_selected_to_back(&mut self) -> Result<bool> {
        let Some(id) = self.selection.selected() else {
            return Ok(false);
        };
        self.manager.send_to_back(id)?;
        self.request_redraw();
        Ok(true)
    }

    /// Remove every annotation in one undoable step; returns how many
    pub fn clear_annotations(&mut self) -> Result<usize> {
        self.finish_text_edit()?;
        self.finish_drawing()?;
        let ids = self
            .manager
            .iter()
            .filter(|(_, e)| e.can_be_selected())
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return Ok(0);
        }
        self.ensure_snapshot();
        self.selection.clear(&mut self.manager);
        let count = ids.len();
        let batch = Command::Batch(ids.into_iter().map(Command::remove).collect());
        self.history.execute(batch, &mut self.manager)?;
        log::info!("Cleared {} annotation(s)", count);
        self.request_redraw();
        Ok(count)
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        if event.button == PointerButton::Middle {
            self.handle_pan(event);
            return Ok(());
        }
        if event.button != PointerButton::Primary {
            return Ok(());
        }
        let p = self.transform.to_scene(event.position);
        match event.kind {
            PointerKind::Down => self.pointer_down(p),
            PointerKind::Move => {
                self.pointer_move(p);
                Ok(())
            }
            PointerKind::Up => self.pointer_up(),
            PointerKind::DoubleClick => self.double_click(p),
        }
    }

    fn handle_pan(&mut self, event: PointerEvent) {
        let changed = match event.kind {
            PointerKind::Down => {
                self.transform.begin_pan(event.position);
                false
            }
            PointerKind::Move => self.transform.pan_to(event.position),
            PointerKind::Up => self.transform.end_pan(),
            PointerKind::DoubleClick => false,
        };
        if changed {
            self.request_redraw();
        }
    }

    fn pointer_down(&mut self, p: Point) -> Result<()> {
        self.ensure_snapshot();
        self.request_redraw();

        // A click on the element being edited keeps editing; anywhere else
        // commits the text first
        if let Some(session) = &self.text_edit {
            let inside = self.manager.get(session.id).is_some_and(|e| e.hit_test(p));
            if inside {
                return Ok(());
            }
            self.finish_text_edit()?;
        }

        let style = self.style.clone();
        match self.draw_target() {
            (Some(drawer), mut target) => {
                drawer.start_drawing(&mut target, p, &style)?;
            }
            (None, _) => {
                self.selection.pointer_down(&mut self.manager, p);
            }
        }
        Ok(())
    }

    fn pointer_move(&mut self, p: Point) {
        let changed = match self.draw_target() {
            (Some(drawer), mut target) if drawer.is_drawing() => {
                drawer.update_drawing(&mut target, p);
                true
            }
            _ => self.selection.pointer_move(&mut self.manager, p),
        };
        if changed {
            self.request_redraw();
        }
    }

    fn pointer_up(&mut self) -> Result<()> {
        if self.drawer.as_ref().is_some_and(|d| d.is_drawing()) {
            self.finish_drawing()?;
        } else {
            self.selection.pointer_up(&mut self.manager);
        }
        self.request_redraw();
        Ok(())
    }

    fn double_click(&mut self, p: Point) -> Result<()> {
        if self.text_edit.is_some() {
            return Ok(());
        }
        self.finish_drawing()?;
        if let Some(id) = self.selection.double_click(&mut self.manager, p) {
            self.begin_text_edit(id, false);
        }
        Ok(())
    }

    /// Ctrl+wheel zooms around the cursor; plain wheel scrolls
    pub fn handle_wheel(&mut self, event: WheelEvent) {
        if event.delta == 0.0 {
            return;
        }
        if event.modifiers.control() {
            if event.delta > 0.0 {
                self.transform.zoom_in(event.position);
            } else {
                self.transform.zoom_out(event.position);
            }
        } else if event.modifiers.shift() {
            self.transform.pan_by(Vector::new(event.delta * SCROLL_STEP, 0.0));
        } else {
            self.transform.pan_by(Vector::new(0.0, event.delta * SCROLL_STEP));
        }
        self.request_redraw();
    }

    /// Route a key to the text session or the shortcut table
    ///
    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<bool> {
        if let Some(session) = self.text_edit.as_mut() {
            match session.handle_key(&event) {
                EditAction::Changed => self.sync_text_edit(),
                EditAction::Ignored => return Ok(false),
                EditAction::Commit => self.finish_text_edit()?,
                EditAction::Cancel => self.cancel_text_edit(),
            }
            return Ok(true);
        }

        let Some(shortcut) = shortcut_for(&event) else {
            return Ok(false);
        };
        log::debug!("Shortcut {:?}", shortcut);
        match shortcut {
            Shortcut::Undo => {
                self.undo()?;
            }
            Shortcut::Redo => {
                self.redo()?;
            }
            Shortcut::DeleteSelected => {
                self.delete_selected()?;
            }
            Shortcut::Duplicate => {
                self.duplicate_selected()?;
            }
            Shortcut::BringToFront => {
                self.bring_selected_to_front()?;
            }
            Shortcut::SendToBack => {
                self.send_selected_to_back()?;
            }
            Shortcut::Cancel => self.cancel(),
            Shortcut::SelectTool(tool) => self.set_tool(tool)?,
        }
        Ok(true)
    }

    /// Escape: drop the gesture in progress, otherwise clear the selection
    pub fn cancel(&mut self) {
        if !self.abandon_drawing() {
            self.selection.clear(&mut self.manager);
        }
        self.request_redraw();
    }

    /// The host window lost keyboard focus
    pub fn focus_lost(&mut self) -> Result<()> {
        self.finish_text_edit()
    }

    // ========================================================================
    // Text editing
    // ========================================================================

    fn begin_text_edit(&mut self, id: ElementId, fresh: bool) {
        let Some(seed) = self.manager.get(id).and_then(Element::text) else {
            return;
        };
        self.text_edit = Some(TextEditSession::new(id, seed, fresh));
        self.selection.begin_editing(&mut self.manager, id);
        log::debug!("Editing text of {}", id);
        self.request_redraw();
    }

    /// Write the session buffer into its element and re-measure it
    fn sync_text_edit(&mut self) {
        let Some(session) = &self.text_edit else {
            return;
        };
        if let Some(element) = self.manager.get_mut(session.id) {
            element.set_text(session.text());
            element.layout(&self.fonts);
        }
        self.request_redraw();
    }

    /// Commit the open session; a fresh element left empty is dropped
    pub fn finish_text_edit(&mut self) -> Result<()> {
        self.sync_text_edit();
        let Some(session) = self.text_edit.take() else {
            return Ok(());
        };
        self.selection.end_editing();
        if !session.text().is_empty() {
            return Ok(());
        }
        if session.is_fresh() {
            log::debug!("Dropping empty text placement {}", session.id);
            self.discard(session.id);
        } else if self.manager.contains(session.id) {
            self.history.remove(&mut self.manager, session.id)?;
            self.selection.forget_missing(&self.manager);
        }
        Ok(())
    }

    /// Restore the text the session started with
    fn cancel_text_edit(&mut self) {
        let Some(session) = self.text_edit.take() else {
            return;
        };
        self.selection.end_editing();
        if session.is_fresh() {
            self.discard(session.id);
            return;
        }
        if let Some(element) = self.manager.get_mut(session.id) {
            element.set_text(session.original());
            element.layout(&self.fonts);
        }
        self.request_redraw();
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Take the blur snapshot if it has not been taken yet
    pub fn ensure_snapshot(&mut self) {
        if self.snapshot.is_some() {
            return;
        }
        let size = self.canvas_size;
        if size.is_empty() {
            return;
        }
        match self.render_raster(false, |e| !matches!(e, Element::Blur(_))) {
            Ok(image) => {
                log::info!(
                    "Captured blur snapshot {}x{}",
                    image.width(),
                    image.height()
                );
                self.snapshot = Some(Arc::new(image));
            }
            Err(err) => log::warn!("Could not capture blur snapshot: {}", err),
        }
    }

    /// Draw the scene through the view transform, with selection chrome
    pub fn render(&mut self, surface: &mut dyn DrawingSurface) {
        surface.set_transform(self.transform.affine());
        let ctx = RenderContext {
            snapshot: self.snapshot.as_deref(),
            show_selection: true,
            corner_radius: self.config.corner_radius,
        };
        for (_, element) in self.manager.iter_mut() {
            element.draw(surface, &ctx);
        }
    }

    /// Render the whole canvas at 1:1 without chrome, for save/copy/OCR
    pub fn export_raster(&mut self) -> Result<RgbaImage> {
        self.finish_text_edit()?;
        let image = self.render_raster(true, |_| true)?;
        log::info!("Exported {}x{} raster", image.width(), image.height());
        Ok(image)
    }

    fn render_raster(
        &mut self,
        with_snapshot: bool,
        include: impl Fn(&Element) -> bool,
    ) -> Result<RgbaImage> {
        let size = self.canvas_size;
        let (width, height) = (size.width.ceil() as u32, size.height.ceil() as u32);
        let mut surface = RasterSurface::new(width, height, self.fonts.clone())?;
        surface.clear(Color::rgba(0.0, 0.0, 0.0, 0.0));
        surface.set_transform(Affine::IDENTITY);
        let ctx = RenderContext {
            snapshot: if with_snapshot {
                self.snapshot.as_deref()
            } else {
                None
            },
            show_selection: false,
            corner_radius: self.config.corner_radius,
        };
        for (_, element) in self.manager.iter_mut() {
            if include(&*element) {
                element.draw(&mut surface, &ctx);
            }
        }
        Ok(surface.into_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rect;
    use crate::elements::{BlurRegion, Rectangle};
    use crate::input::{Key, Modifiers, Named};
    use crate::render::TextMeasurer;
    use crate::render::recording::{DrawCommand, RecordingSurface};

    fn background(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                image::Rgba([250, 250, 250, 255])
            } else {
                image::Rgba([10, 10, 10, 255])
            }
        })
    }

    fn engine() -> AnnotationEngine {
        AnnotationEngine::with_background(EngineConfig::default(), background(200, 150))
    }

    fn drag(engine: &mut AnnotationEngine, from: (f32, f32), to: (f32, f32)) {
        engine.handle_pointer(PointerEvent::down(from.0, from.1)).unwrap();
        engine
            .handle_pointer(PointerEvent::moved((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0))
            .unwrap();
        engine.handle_pointer(PointerEvent::moved(to.0, to.1)).unwrap();
        engine.handle_pointer(PointerEvent::up(to.0, to.1)).unwrap();
    }

    fn type_text(engine: &mut AnnotationEngine, text: &str) {
        for c in text.chars() {
            engine.handle_key(KeyEvent::char(c)).unwrap();
        }
    }

    fn annotations(engine: &AnnotationEngine) -> Vec<ElementId> {
        engine
            .manager()
            .iter()
            .filter(|(_, e)| e.can_be_selected())
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn test_rectangle_scenario_through_engine() {
        let mut engine = engine();
        let original = Element::Rectangle(Rectangle::new(
            Rect::new(10.0, 10.0, 50.0, 30.0),
            Color::default(),
            3.0,
        ));
        engine.add_element(original.clone()).unwrap();
        assert!(engine.undo().unwrap());
        assert!(annotations(&engine).is_empty());
        assert!(engine.redo().unwrap());

        let ids = annotations(&engine);
        assert_eq!(ids.len(), 1);
        assert_eq!(engine.element(ids[0]), Some(&original));
    }

    #[test]
    fn test_drawn_rectangle_is_one_undo_step() {
        let mut engine = engine();
        engine.set_tool(ToolKind::Rectangle).unwrap();
        drag(&mut engine, (20.0, 20.0), (80.0, 60.0));

        let ids = annotations(&engine);
        assert_eq!(ids.len(), 1);
        assert_eq!(
            engine.element(ids[0]).unwrap().base().rect(),
            Rect::new(20.0, 20.0, 60.0, 40.0)
        );
        engine.undo().unwrap();
        assert!(annotations(&engine).is_empty());
        assert!(!engine.undo().unwrap());
    }

    #[test]
    fn test_snapshot_precedes_first_edit() {
        let mut engine = engine();
        assert!(engine.snapshot().is_none());
        engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Color::BLACK,
                20.0,
            )))
            .unwrap();
        let snapshot = engine.snapshot().unwrap().clone();
        assert_eq!(snapshot, background(200, 150));

        // Later edits never refresh it
        engine.undo().unwrap();
        engine.handle_pointer(PointerEvent::down(5.0, 5.0)).unwrap();
        assert_eq!(engine.snapshot(), Some(&snapshot));
    }

    #[test]
    fn test_blur_samples_snapshot_not_live_canvas() {
        let mut engine = engine();
        engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(0.0, 0.0, 60.0, 60.0),
                Color::BLACK,
                40.0,
            )))
            .unwrap();
        let blur = engine
            .add_element(Element::Blur(BlurRegion::new(
                Rect::new(10.0, 10.0, 30.0, 30.0),
                Color::default(),
                1.0,
                6.0,
            )))
            .unwrap();
        let mut surface = RecordingSurface::default();
        engine.render(&mut surface);

        let Some(Element::Blur(region)) = engine.element(blur) else {
            panic!("blur region missing");
        };
        let cached = region.cached().unwrap();
        let expected = crate::render::blur::blur_image(
            &image::imageops::crop_imm(&background(200, 150), 10, 10, 30, 30).to_image(),
            6.0,
        );
        assert_eq!(cached.image, expected);
    }

    #[test]
    fn test_select_drag_and_delete() {
        let mut engine = engine();
        let id = engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(10.0, 10.0, 50.0, 30.0),
                Color::default(),
                3.0,
            )))
            .unwrap();
        drag(&mut engine, (35.0, 25.0), (45.0, 35.0));
        assert_eq!(engine.selection(), SelectionState::Selected(id));
        assert_eq!(
            engine.element(id).unwrap().base().position,
            Point::new(20.0, 20.0)
        );

        assert!(engine.handle_key(KeyEvent::named(Named::Delete)).unwrap());
        assert!(engine.element(id).is_none());
        assert_eq!(engine.selected(), None);

        engine
            .handle_key(KeyEvent::new(Key::Character('z'), Modifiers::CTRL))
            .unwrap();
        assert!(engine.element(id).is_some());
    }

    #[test]
    fn test_undo_never_leaves_dangling_selection() {
        let mut engine = engine();
        let id = engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(10.0, 10.0, 50.0, 30.0),
                Color::default(),
                3.0,
            )))
            .unwrap();
        assert_eq!(engine.select_element_at(Point::new(30.0, 20.0)), Some(id));
        engine.undo().unwrap();
        assert_eq!(engine.selected(), None);
        assert!(!engine.move_selected(Vector::new(1.0, 1.0)));
    }

    #[test]
    fn test_text_tool_types_and_commits() {
        let mut engine = engine();
        engine.set_tool(ToolKind::Text).unwrap();
        engine.handle_pointer(PointerEvent::down(30.0, 30.0)).unwrap();
        engine.handle_pointer(PointerEvent::up(30.0, 30.0)).unwrap();
        assert!(engine.text_edit().is_some());

        type_text(&mut engine, "hi");
        engine.handle_key(KeyEvent::named(Named::Enter)).unwrap();
        assert!(engine.text_edit().is_none());

        let ids = annotations(&engine);
        assert_eq!(engine.element(ids[0]).and_then(Element::text), Some("hi"));
        assert_eq!(engine.history().undo_count(), 1);
    }

    #[test]
    fn test_abandoned_text_leaves_no_trace() {
        let mut engine = engine();
        engine.set_tool(ToolKind::Text).unwrap();
        engine.handle_pointer(PointerEvent::down(30.0, 30.0)).unwrap();
        engine.handle_pointer(PointerEvent::up(30.0, 30.0)).unwrap();
        engine.focus_lost().unwrap();

        assert!(annotations(&engine).is_empty());
        assert!(!engine.history().can_undo());
    }

    #[test]
    fn test_bubble_box_tracks_typing() {
        let mut engine = engine();
        engine.set_tool(ToolKind::SpeechBubble).unwrap();
        drag(&mut engine, (50.0, 80.0), (20.0, 20.0));
        let id = engine.text_edit().unwrap().id;
        assert_eq!(engine.element(id).unwrap().base().size, Size::new(100.0, 50.0));

        type_text(&mut engine, "a rather long caption");
        let measured = engine
            .fonts()
            .measure_text("a rather long caption", &engine.style().font);
        assert!(measured.width > 80.0);
        assert_eq!(
            engine.element(id).unwrap().base().size.width,
            measured.width + 20.0
        );

        // Clicking elsewhere commits
        engine.set_tool(ToolKind::Select).unwrap();
        assert!(engine.text_edit().is_none());
        assert_eq!(
            engine.element(id).and_then(Element::text),
            Some("a rather long caption")
        );
    }

    #[test]
    fn test_add_during_fresh_text_keeps_history_usable() {
        let mut engine = engine();
        engine.set_tool(ToolKind::Text).unwrap();
        engine.handle_pointer(PointerEvent::down(30.0, 30.0)).unwrap();
        engine.handle_pointer(PointerEvent::up(30.0, 30.0)).unwrap();
        assert!(engine.text_edit().is_some());

        let rect = engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(10.0, 10.0, 50.0, 30.0),
                Color::default(),
                3.0,
            )))
            .unwrap();
        assert!(engine.text_edit().is_none());
        engine.focus_lost().unwrap();

        assert_eq!(annotations(&engine), vec![rect]);
        assert!(engine.undo().unwrap());
        assert!(!engine.undo().unwrap());
        assert!(annotations(&engine).is_empty());
    }

    #[test]
    fn test_duplicate_during_fresh_text_leaves_no_empty_copy() {
        let mut engine = engine();
        engine.set_tool(ToolKind::Text).unwrap();
        engine.handle_pointer(PointerEvent::down(30.0, 30.0)).unwrap();
        engine.handle_pointer(PointerEvent::up(30.0, 30.0)).unwrap();

        assert_eq!(engine.duplicate_selected().unwrap(), None);
        assert!(annotations(&engine).is_empty());
        assert!(!engine.history().can_undo());
        assert!(!engine.undo().unwrap());
    }

    #[test]
    fn test_select_commits_open_text() {
        let mut engine = engine();
        let rect = engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(100.0, 80.0, 50.0, 30.0),
                Color::default(),
                3.0,
            )))
            .unwrap();
        engine.set_tool(ToolKind::Text).unwrap();
        engine.handle_pointer(PointerEvent::down(30.0, 30.0)).unwrap();
        engine.handle_pointer(PointerEvent::up(30.0, 30.0)).unwrap();
        type_text(&mut engine, "ok");

        assert_eq!(engine.select_element_at(Point::new(120.0, 90.0)), Some(rect));
        assert!(engine.text_edit().is_none());
        assert_eq!(engine.selection(), SelectionState::Selected(rect));
        assert_eq!(engine.history().undo_count(), 2);
    }

    #[test]
    fn test_double_click_reopens_text() {
        let mut engine = engine();
        let id = engine
            .add_element(Element::Text(crate::elements::TextElement::new(
                Point::new(20.0, 20.0),
                "old",
                engine.style().font.clone(),
                Color::default(),
            )))
            .unwrap();
        engine
            .handle_pointer(PointerEvent::double_click(22.0, 25.0))
            .unwrap();
        assert_eq!(engine.selection(), SelectionState::EditingText(id));

        type_text(&mut engine, "er");
        engine.handle_key(KeyEvent::named(Named::Escape)).unwrap();
        assert_eq!(engine.element(id).and_then(Element::text), Some("old"));
        assert_eq!(engine.selection(), SelectionState::Selected(id));
    }

    #[test]
    fn test_duplicate_and_clear_all() {
        let mut engine = engine();
        let id = engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(10.0, 10.0, 50.0, 30.0),
                Color::default(),
                3.0,
            )))
            .unwrap();
        engine.select_element_at(Point::new(30.0, 20.0));
        let copy = engine.duplicate_selected().unwrap().unwrap();
        assert_ne!(copy, id);
        assert_eq!(
            engine.element(copy).unwrap().base().position,
            Point::new(20.0, 20.0)
        );

        assert_eq!(engine.clear_annotations().unwrap(), 2);
        assert!(annotations(&engine).is_empty());
        assert_eq!(engine.manager().len(), 1);
        engine.undo().unwrap();
        assert_eq!(annotations(&engine), vec![id, copy]);
    }

    #[test]
    fn test_background_cannot_be_removed() {
        let mut engine = engine();
        let (background, _) = engine.manager().iter().next().unwrap();
        assert!(matches!(
            engine.remove_element(background),
            Err(EngineError::NotSupported(_))
        ));
        assert!(engine.remove_element(background).is_err());
        assert_eq!(engine.manager().len(), 1);
    }

    #[test]
    fn test_ctrl_wheel_zoom_is_clamped() {
        let mut engine = engine();
        let zoom_out = WheelEvent {
            position: Point::new(100.0, 75.0),
            delta: -1.0,
            modifiers: Modifiers::CTRL,
        };
        for _ in 0..50 {
            engine.handle_wheel(zoom_out);
        }
        assert_eq!(engine.transform().scale(), 0.2);
        // Centered: the 200x150 canvas shrinks to 40x30 inside a 200x150 view
        assert_eq!(engine.transform().translate(), Vector::new(80.0, 60.0));
    }

    #[test]
    fn test_pointer_positions_map_through_zoom() {
        let mut engine = engine();
        let zoom_in = WheelEvent {
            position: Point::ORIGIN,
            delta: 1.0,
            modifiers: Modifiers::CTRL,
        };
        for _ in 0..7 {
            engine.handle_wheel(zoom_in);
        }
        let scale = engine.transform().scale();
        engine.set_tool(ToolKind::Arrow).unwrap();
        drag(&mut engine, (0.0, 0.0), (100.0 * scale, 0.0));

        let ids = annotations(&engine);
        let Some(Element::Arrow(arrow)) = engine.element(ids[0]) else {
            panic!("arrow missing");
        };
        assert!((arrow.end_point.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_escape_abandons_gesture() {
        let mut engine = engine();
        engine.set_tool(ToolKind::Freehand).unwrap();
        engine.handle_pointer(PointerEvent::down(10.0, 10.0)).unwrap();
        engine.handle_pointer(PointerEvent::moved(40.0, 30.0)).unwrap();
        engine.handle_key(KeyEvent::named(Named::Escape)).unwrap();
        assert!(annotations(&engine).is_empty());
        assert!(!engine.history().can_undo());
    }

    #[test]
    fn test_render_draws_chrome_but_export_does_not() {
        let mut engine = engine();
        let id = engine
            .add_element(Element::Rectangle(Rectangle::new(
                Rect::new(10.0, 10.0, 50.0, 30.0),
                Color::default(),
                3.0,
            )))
            .unwrap();
        engine.select_element_at(Point::new(30.0, 20.0));
        assert_eq!(engine.selected(), Some(id));

        let mut surface = RecordingSurface::default();
        engine.render(&mut surface);
        let handles = surface
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRoundedRect { .. }))
            .count();
        assert_eq!(handles, 4);

        let exported = engine.export_raster().unwrap();
        assert_eq!((exported.width(), exported.height()), (200, 150));
        // Far from the rectangle the background shows through unchanged
        assert_eq!(exported.get_pixel(150, 120), background(200, 150).get_pixel(150, 120));
    }

    #[test]
    fn test_redraw_requests_coalesce() {
        let mut engine = engine();
        assert!(engine.take_redraw_request());
        assert!(!engine.take_redraw_request());
        engine.handle_pointer(PointerEvent::down(5.0, 5.0)).unwrap();
        engine.handle_pointer(PointerEvent::up(5.0, 5.0)).unwrap();
        assert!(engine.take_redraw_request());
        assert!(!engine.take_redraw_request());
    }
}
