//! Drag-based reordering as an explicit state machine.
//!
//! The machine knows nothing about pointers or DOM events; anything that can
//! report "started dragging entry i", "hovering entry j", "dropped on entry
//! j" or "gave up" can drive it: pointer events, keyboard shortcuts, the CLI's
//! `--edit move=FROM:TO`, or a test.

use tracing::debug;

use crate::staging::{Payload, SharedStaging};

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No drag in progress.
    #[default]
    Idle,
    /// An entry is being dragged.
    Dragging {
        /// Index the drag started from.
        source: usize,
    },
}

/// A reorder decided by a completed drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Index the entry is taken from.
    pub source: usize,
    /// Index the entry lands on, against the shortened sequence.
    pub target: usize,
}

/// Single-pointer reorder gesture.
#[derive(Debug, Clone, Default)]
pub struct ReorderGesture {
    state: GestureState,
    hovered: Option<usize>,
}

impl ReorderGesture {
    /// Create an idle gesture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Entry currently highlighted as a drop target.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Start dragging entry `index`. Overwrites any pending drag.
    pub fn drag_start(&mut self, index: usize) {
        debug!(index, previous = ?self.state, "drag start");
        self.state = GestureState::Dragging { source: index };
        self.hovered = None;
    }

    /// Hover over entry `index`. Visual feedback only; the source is kept.
    pub fn drag_over(&mut self, index: usize) {
        if matches!(self.state, GestureState::Dragging { .. }) {
            self.hovered = Some(index);
        }
    }

    /// Leave the hovered entry without dropping.
    pub fn drag_leave(&mut self) {
        self.hovered = None;
    }

    /// Drop on entry `target` and return the move to apply, if any.
    ///
    /// Always returns to `Idle`. Dropping an entry onto itself, or dropping
    /// while idle, yields no move.
    pub fn finish_drop(&mut self, target: usize) -> Option<Move> {
        let state = std::mem::take(&mut self.state);
        self.hovered = None;

        match state {
            GestureState::Dragging { source } if source != target => Some(Move { source, target }),
            _ => None,
        }
    }

    /// Drop on entry `target` and apply the resulting move to `staging`.
    ///
    /// Returns whether the sequence changed.
    pub fn drop_on<P: Payload>(&mut self, target: usize, staging: &SharedStaging<P>) -> bool {
        match self.finish_drop(target) {
            Some(Move { source, target }) => {
                let moved = staging.move_to(source, target);
                debug!(source, target, moved, "drop applied");
                moved
            }
            None => false,
        }
    }

    /// Drag ended without a valid drop target. Discards the drag.
    pub fn drag_end(&mut self) {
        if self.state != GestureState::Idle {
            debug!(state = ?self.state, "drag discarded");
        }
        self.state = GestureState::Idle;
        self.hovered = None;
    }
}
