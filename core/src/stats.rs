//! Counters derived from a todo collection.

use crate::types::Todo;

/// Remaining and completed counts for one snapshot of the collection.
///
/// Always computed from the collection currently held; the view never stores
/// a `TodoStats`, so there is nothing to keep in sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub remaining: usize,
    pub completed: usize,
}

impl TodoStats {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|t| t.completed).count();
        Self {
            remaining: todos.len() - completed,
            completed,
        }
    }

    pub fn total(&self) -> usize {
        self.remaining + self.completed
    }
}
