//! The ordered staged sequence.
//!
//! [`StagingList`] is the single-owner data structure: no I/O, no locking.
//! Concurrency and rendering are layered on top by
//! [`SharedStaging`](crate::staging::SharedStaging).

use crate::staging::Entry;
use crate::view::ViewMode;

/// Ordered collection of staged entries.
///
/// Insertion order is the visible order and the submission order.
#[derive(Debug, Clone)]
pub struct StagingList<P> {
    entries: Vec<Entry<P>>,
}

impl<P> Default for StagingList<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P: Clone> StagingList<P> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current entries in order.
    pub fn entries(&self) -> &[Entry<P>] {
        &self.entries
    }

    /// Derived view mode.
    pub fn view_mode(&self) -> ViewMode {
        ViewMode::for_len(self.entries.len())
    }

    /// Append a fully loaded batch in one step.
    ///
    /// Returns the number of entries appended.
    pub fn extend_batch(&mut self, batch: Vec<Entry<P>>) -> usize {
        let count = batch.len();
        self.entries.extend(batch);
        count
    }

    /// Remove the entry at `index`, shifting later entries down.
    ///
    /// Returns `None` without touching the list when `index` is out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<Entry<P>> {
        if index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index))
    }

    /// Move the entry at `source` so that it ends up at `target`.
    ///
    /// The entry is spliced out first and `target` is interpreted against the
    /// shortened list, clamped to its length. Returns `false` (no mutation)
    /// when `source == target` or `source` is out of range.
    ///
    /// ```
    /// use pdfstage::staging::{Entry, StagingList};
    ///
    /// let mut list = StagingList::new();
    /// list.extend_batch(["A", "B", "C", "D"].map(|n| Entry::new(n, ())).to_vec());
    /// assert!(list.move_to(0, 2));
    ///
    /// let order: Vec<&str> = list.entries().iter().map(|e| e.display_name()).collect();
    /// assert_eq!(order, ["B", "C", "A", "D"]);
    /// ```
    pub fn move_to(&mut self, source: usize, target: usize) -> bool {
        if source == target || source >= self.entries.len() {
            return false;
        }

        let moved = self.entries.remove(source);
        let target = target.min(self.entries.len());
        self.entries.insert(target, moved);
        true
    }

    /// Read-only copy of the current order.
    pub fn snapshot(&self) -> Vec<Entry<P>> {
        self.entries.clone()
    }
}
