/// Tracking of mounted diff fragments inside a document.
use std::collections::HashMap;

use crate::fragment::DiffId;
use crate::surface::TextRange;

/// Live spans of mounted fragments, keyed by diff id.
#[derive(Debug, Clone, Default)]
pub struct FragmentMarks {
    spans: HashMap<DiffId, TextRange>,
}

impl FragmentMarks {
    /// Creates an empty mark set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `range` under `id`, replacing any previous span.
    pub fn insert(&mut self, id: DiffId, range: TextRange) {
        self.spans.insert(id, range);
    }

    /// Stops tracking `id`, returning its last known span.
    pub fn remove(&mut self, id: &DiffId) -> Option<TextRange> {
        self.spans.remove(id)
    }

    /// Returns the span tracked under `id`.
    pub fn get(&self, id: &DiffId) -> Option<TextRange> {
        self.spans.get(id).copied()
    }

    /// Removes all marks.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// Returns the number of tracked fragments.
    pub fn count(&self) -> usize {
        self.spans.len()
    }

    /// Adjusts marks for an edit that replaced `edited` with `inserted_len`
    /// chars.
    ///
    /// Marks after the edit shift by the length delta. Marks before it stay.
    /// A pure insertion at a mark's start lands before the fragment and one
    /// at its end lands after it. Any edit that cuts into a fragment drops
    /// its mark; the dropped ids are returned.
    pub fn adjust_for_edit(&mut self, edited: TextRange, inserted_len: usize) -> Vec<DiffId> {
        let removed_len = edited.len();
        let mut dropped = Vec::new();

        self.spans.retain(|id, span| {
            if edited.end <= span.start {
                span.start = span.start - removed_len + inserted_len;
                span.end = span.end - removed_len + inserted_len;
                true
            } else if edited.start >= span.end {
                true
            } else {
                dropped.push(id.clone());
                false
            }
        });

        dropped
    }
}
