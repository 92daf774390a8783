//! Undo/redo of element insertions and removals
//!
//! Only whole-element membership changes are recorded. Moves, resizes, tail
//! drags and text edits mutate elements in place and are not undoable.
//!
//! A command owns the element whenever it is *not* in the manager: an undone
//! `Add` holds the element it took out, an applied `Remove` holds the element
//! it removed. Applying or reverting moves the element across.

use crate::elements::Element;
use crate::error::{EngineError, Result};
use crate::scene::{ElementId, ElementManager};

/// Maximum number of commands kept on the undo stack
pub const MAX_HISTORY_SIZE: usize = 100;

#[derive(Debug)]
pub enum Command {
    Add {
        id: ElementId,
        index: usize,
        stash: Option<Element>,
    },
    Remove {
        id: ElementId,
        index: usize,
        stash: Option<Element>,
    },
    /// Several commands undone and redone as one
    Batch(Vec<Command>),
}

impl Command {
    pub fn remove(id: ElementId) -> Self {
        Command::Remove {
            id,
            index: 0,
            stash: None,
        }
    }

    pub fn apply(&mut self, manager: &mut ElementManager) -> Result<()> {
        match self {
            Command::Add { id, index, stash } => put_back(manager, *id, *index, stash),
            Command::Remove { id, index, stash } => take_out(manager, *id, index, stash),
            Command::Batch(commands) => commands.iter_mut().try_for_each(|c| c.apply(manager)),
        }
    }

    pub fn revert(&mut self, manager: &mut ElementManager) -> Result<()> {
        match self {
            Command::Add { id, index, stash } => take_out(manager, *id, index, stash),
            Command::Remove { id, index, stash } => put_back(manager, *id, *index, stash),
            Command::Batch(commands) => commands
                .iter_mut()
                .rev()
                .try_for_each(|c| c.revert(manager)),
        }
    }

    /// Whether this is the `Add` of `target`
    fn adds(&self, target: ElementId) -> bool {
        matches!(self, Command::Add { id, .. } if *id == target)
    }
}

fn put_back(
    manager: &mut ElementManager,
    id: ElementId,
    index: usize,
    stash: &mut Option<Element>,
) -> Result<()> {
    if manager.contains(id) {
        return Err(EngineError::InvalidArgument(format!(
            "element {id} is already present"
        )));
    }
    let element = stash
        .take()
        .ok_or_else(|| EngineError::InvalidArgument(format!("no stored element for {id}")))?;
    manager.insert(id, element, index)
}

fn take_out(
    manager: &mut ElementManager,
    id: ElementId,
    index: &mut usize,
    stash: &mut Option<Element>,
) -> Result<()> {
    let (element, at) = manager.remove(id)?;
    *index = at;
    *stash = Some(element);
    Ok(())
}

/// Linear undo/redo stacks
#[derive(Debug, Default)]
pub struct ActionHistory {
    /// Most recent last
    undo_stack: Vec<Command>,
    /// Most recent last
    redo_stack: Vec<Command>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command` and record it; the redo stack is discarded
    pub fn execute(&mut self, mut command: Command, manager: &mut ElementManager) -> Result<()> {
        command.apply(manager)?;
        self.record(command);
        Ok(())
    }

    /// Record a command whose effect is already in the manager
    pub fn record(&mut self, command: Command) {
        self.redo_stack.clear();
        self.undo_stack.push(command);
        if self.undo_stack.len() > MAX_HISTORY_SIZE {
            let excess = self.undo_stack.len() - MAX_HISTORY_SIZE;
            self.undo_stack.drain(..excess);
            log::debug!("History trimmed by {} command(s)", excess);
        }
    }

    /// Add `element` on top as an undoable step
    pub fn add(&mut self, manager: &mut ElementManager, element: Element) -> Result<ElementId> {
        let id = manager.allocate_id();
        let command = Command::Add {
            id,
            index: manager.len(),
            stash: Some(element),
        };
        self.execute(command, manager)?;
        Ok(id)
    }

    /// Remove `id` as an undoable step
    pub fn remove(&mut self, manager: &mut ElementManager, id: ElementId) -> Result<()> {
        self.execute(Command::remove(id), manager)
    }

    /// Revert the most recent command; false when there was nothing to undo
    pub fn undo(&mut self, manager: &mut ElementManager) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.revert(manager) {
            self.undo_stack.push(command);
            return Err(err);
        }
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Re-apply the most recently undone command
    pub fn redo(&mut self, manager: &mut ElementManager) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = command.apply(manager) {
            self.redo_stack.push(command);
            return Err(err);
        }
        self.undo_stack.push(command);
        Ok(true)
    }

    /// Forget the most recent command if it is the `Add` of `id`
    ///
    /// Used when a freshly placed element is abandoned (an empty text box):
    /// the caller removes the element, and no undo step is left behind.
    pub fn retract(&mut self, id: ElementId) -> bool {
        if self.undo_stack.last().is_some_and(|c| c.adds(id)) {
            self.undo_stack.pop();
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Color, Rect};
    use crate::elements::Rectangle;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Element {
        Element::Rectangle(Rectangle::new(Rect::new(x, y, w, h), Color::default(), 2.0))
    }

    fn snapshot(manager: &ElementManager) -> Vec<(ElementId, Element)> {
        manager.iter().map(|(id, e)| (id, e.clone())).collect()
    }

    #[test]
    fn test_add_undo_redo_round_trip() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        history.add(&mut manager, rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        history.add(&mut manager, rect(10.0, 10.0, 50.0, 30.0)).unwrap();
        let after_add = snapshot(&manager);

        assert!(history.undo(&mut manager).unwrap());
        assert_eq!(manager.len(), 1);
        assert!(history.redo(&mut manager).unwrap());
        assert_eq!(snapshot(&manager), after_add);
    }

    #[test]
    fn test_rectangle_scenario() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let original = rect(10.0, 10.0, 50.0, 30.0);
        history.add(&mut manager, original.clone()).unwrap();

        history.undo(&mut manager).unwrap();
        assert!(manager.is_empty());

        history.redo(&mut manager).unwrap();
        let elements = snapshot(&manager);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].1, original);
    }

    #[test]
    fn test_empty_stacks_are_no_ops() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        assert!(!history.undo(&mut manager).unwrap());
        assert!(!history.redo(&mut manager).unwrap());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        history.add(&mut manager, rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        history.undo(&mut manager).unwrap();
        assert!(history.can_redo());
        history.add(&mut manager, rect(1.0, 1.0, 5.0, 5.0)).unwrap();
        assert!(!history.can_redo());
    }

    #[test]
    fn test_remove_undo_restores_original_index() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let a = history.add(&mut manager, rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        let b = history.add(&mut manager, rect(1.0, 1.0, 5.0, 5.0)).unwrap();
        let c = history.add(&mut manager, rect(2.0, 2.0, 5.0, 5.0)).unwrap();

        history.remove(&mut manager, b).unwrap();
        assert_eq!(manager.ids(), vec![a, c]);
        history.undo(&mut manager).unwrap();
        assert_eq!(manager.ids(), vec![a, b, c]);
    }

    #[test]
    fn test_failed_remove_is_not_recorded() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let a = history.add(&mut manager, rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        history.remove(&mut manager, a).unwrap();
        assert!(history.remove(&mut manager, a).is_err());
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn test_batch_reverts_as_one() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let a = history.add(&mut manager, rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        let b = history.add(&mut manager, rect(1.0, 1.0, 5.0, 5.0)).unwrap();

        let batch = Command::Batch(vec![Command::remove(a), Command::remove(b)]);
        history.execute(batch, &mut manager).unwrap();
        assert!(manager.is_empty());

        history.undo(&mut manager).unwrap();
        assert_eq!(manager.ids(), vec![a, b]);
    }

    #[test]
    fn test_history_is_capped() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        for i in 0..(MAX_HISTORY_SIZE + 5) {
            history.add(&mut manager, rect(i as f32, 0.0, 5.0, 5.0)).unwrap();
        }
        assert_eq!(history.undo_count(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_retract_drops_only_matching_add() {
        let mut manager = ElementManager::new();
        let mut history = ActionHistory::new();
        let a = history.add(&mut manager, rect(0.0, 0.0, 5.0, 5.0)).unwrap();
        let b = history.add(&mut manager, rect(1.0, 1.0, 5.0, 5.0)).unwrap();
        assert!(!history.retract(a));
        assert!(history.retract(b));
        assert_eq!(history.undo_count(), 1);
    }
}
