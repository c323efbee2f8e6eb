//! The editable-surface boundary.
//!
//! The diff engine never reaches for a global document. Every operation that
//! reads or mutates live content receives an `&mut impl EditableSurface`,
//! which keeps the controller testable against any host that can expose
//! plain text, a selection, and range replacement.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::fragment::DiffId;

/// A half-open `[start, end)` range of char offsets into a surface's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of chars covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range covers no chars.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A live, user-editable content area.
///
/// Besides plain text access, a surface tracks *mounted fragments*: spans
/// that were replaced by a rendered diff fragment and are addressable by
/// their `DiffId` until unmounted. Implementations keep mounted spans in
/// step with later edits, and forget a span once an edit cuts into it.
pub trait EditableSurface {
    /// Current textual content.
    fn content(&self) -> String;

    /// Current selection, if any, as an ordered char range.
    fn selection(&self) -> Option<TextRange>;

    /// Selects `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the content.
    fn select(&mut self, range: TextRange) -> Result<()>;

    /// Replaces `range` with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the content.
    fn replace(&mut self, range: TextRange, text: &str) -> Result<()>;

    /// Replaces `range` with a rendered fragment and starts tracking it
    /// under `id`. Returns the span the fragment now occupies.
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the content.
    fn mount_fragment(&mut self, range: TextRange, id: &DiffId, rendered: &str)
        -> Result<TextRange>;

    /// Span currently occupied by the fragment mounted under `id`.
    fn fragment_range(&self, id: &DiffId) -> Option<TextRange>;

    /// Replaces the fragment mounted under `id` with `text` and stops
    /// tracking it. Returns `Ok(false)` if no such fragment is mounted.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracked span no longer fits the content.
    fn unmount_fragment(&mut self, id: &DiffId, text: &str) -> Result<bool>;
}

/// Converts a char offset to a byte offset in `s`, clamped to its length.
pub(crate) fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Returns the chars `[start, end)` of `s`, clamped to its bounds.
pub(crate) fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let start_b = char_to_byte(s, start);
    let end_b = char_to_byte(s, end.max(start));
    &s[start_b..end_b]
}
