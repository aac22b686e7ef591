//! Bounded snapshot undo/redo stack.
//!
//! A capped `VecDeque` that clears redo on a new edit, snapshotting the
//! topology arrays directly by value — just the three arrays plus the edge
//! map and edge-selection set.

use std::collections::VecDeque;

use crate::topology::Topology;

pub struct UndoStack {
    undo: VecDeque<Topology>,
    redo: VecDeque<Topology>,
    cap: usize,
}

impl UndoStack {
    pub fn new(cap: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(cap.min(64)),
            redo: VecDeque::with_capacity(cap.min(64)),
            cap,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Push the pre-mutation state and clear redo. Call exactly once before
    /// any editing command.
    pub fn save_state(&mut self, snapshot: Topology) {
        self.redo.clear();
        while self.undo.len() >= self.cap {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }

    /// Pop the most recent undo snapshot, pushing `current` to redo first.
    pub fn undo(&mut self, current: Topology) -> Option<Topology> {
        let snapshot = self.undo.pop_back()?;
        while self.redo.len() >= self.cap {
            self.redo.pop_front();
        }
        self.redo.push_back(current);
        Some(snapshot)
    }

    /// Pop the most recent redo snapshot, pushing `current` to undo first.
    pub fn redo(&mut self, current: Topology) -> Option<Topology> {
        let snapshot = self.redo.pop_back()?;
        while self.undo.len() >= self.cap {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn undo_then_redo_is_identity() {
        let mut stack = UndoStack::new(50);
        let before = fixtures::triangle();
        let after = fixtures::two_triangles();

        stack.save_state(before.clone());
        let undone = stack.undo(after.clone()).unwrap();
        assert_eq!(undone.vertices.len(), before.vertices.len());

        let redone = stack.redo(undone).unwrap();
        assert_eq!(redone.vertices.len(), after.vertices.len());
    }

    #[test]
    fn save_state_clears_redo() {
        let mut stack = UndoStack::new(50);
        stack.save_state(fixtures::triangle());
        let _ = stack.undo(fixtures::two_triangles());
        assert!(stack.can_redo());
        stack.save_state(fixtures::triangle());
        assert!(!stack.can_redo());
    }

    #[test]
    fn undo_stack_respects_cap() {
        let mut stack = UndoStack::new(2);
        stack.save_state(fixtures::triangle());
        stack.save_state(fixtures::triangle());
        stack.save_state(fixtures::triangle());
        assert_eq!(stack.undo.len(), 2);
    }
}
