/// Position-independent capture of a user selection.
use serde::{Deserialize, Serialize};

use crate::locator::locate_with_hint;
use crate::surface::{char_slice, EditableSurface, TextRange};

/// Default number of chars captured on each side of a selection.
pub const DEFAULT_CONTEXT_CHARS: usize = 50;

/// A fingerprint of a selection: its text plus a bounded window of the
/// content around it at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelection {
    /// The selected text, verbatim. Never empty.
    pub text: String,
    /// Up to `context_chars` chars immediately before the selection.
    pub context_before: String,
    /// Up to `context_chars` chars immediately after the selection.
    pub context_after: String,
    /// Char offset of the selection at capture time. Only used to break
    /// ties between equally good matches.
    pub hint: Option<usize>,
}

impl SavedSelection {
    /// Captures the current selection of `surface`.
    ///
    /// Returns `None` if nothing is selected or the selection is empty.
    pub fn save<S: EditableSurface + ?Sized>(surface: &S, context_chars: usize) -> Option<Self> {
        let range = surface.selection().filter(|r| !r.is_empty())?;
        let content = surface.content();
        Self::capture(&content, range, context_chars)
    }

    /// Captures `range` of `content` directly.
    ///
    /// Returns `None` if the range is empty or falls outside the content.
    pub fn capture(content: &str, range: TextRange, context_chars: usize) -> Option<Self> {
        let text = char_slice(content, range.start, range.end);
        if text.chars().count() != range.len() || text.is_empty() {
            return None;
        }

        let before_start = range.start.saturating_sub(context_chars);
        Some(Self {
            text: text.to_string(),
            context_before: char_slice(content, before_start, range.start).to_string(),
            context_after: char_slice(content, range.end, range.end + context_chars).to_string(),
            hint: Some(range.start),
        })
    }

    /// Finds where this selection lives in `content` now.
    pub fn locate_in(&self, content: &str) -> Option<TextRange> {
        locate_with_hint(
            content,
            &self.text,
            &self.context_before,
            &self.context_after,
            self.hint,
        )
    }

    /// Re-selects the captured span in the current state of `surface`.
    ///
    /// Returns whether the span was found and selected.
    pub fn restore<S: EditableSurface + ?Sized>(&self, surface: &mut S) -> bool {
        let Some(range) = self.locate_in(&surface.content()) else {
            return false;
        };
        match surface.select(range) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to restore selection: {e}");
                false
            }
        }
    }
}
