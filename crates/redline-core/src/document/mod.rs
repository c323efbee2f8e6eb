//! Document model combining text buffer, cursor, fragment marks and history.
//!
//! A `Document` is the concrete editable surface: a `TextBuffer`, a
//! `Cursor`, the spans of mounted diff fragments, and a debounced snapshot
//! history fed by every mutation. File I/O lives in the `io` submodule.

mod io;

use std::path::PathBuf;

use anyhow::Result;

use crate::buffer::TextBuffer;
use crate::cursor::Cursor;
use crate::fragment::DiffId;
use crate::history::HistoryManager;
use crate::marks::FragmentMarks;
use crate::surface::{EditableSurface, TextRange};

/// A single document with its buffer, cursor, history, and metadata.
///
/// Mounting and unmounting a fragment are edits like any other, so the
/// rendered fragment markup enters history too. Inside one debounce window
/// it coalesces away; otherwise undo can land on a snapshot that still
/// shows the markup, with no mark left for a session to resolve (see
/// `DiffController::reattach`).
pub struct Document {
    /// The text buffer.
    pub buffer: TextBuffer,
    /// The cursor state.
    pub cursor: Cursor,
    /// Snapshot history, fed on every content change.
    pub history: HistoryManager,
    /// Spans of mounted diff fragments.
    marks: FragmentMarks,
    /// File path on disk, if any.
    pub file_path: Option<PathBuf>,
    /// Display name.
    pub title: String,
    /// Whether the document has been modified since last save.
    pub modified: bool,
    /// Monotonically increasing version counter, bumped on every buffer mutation.
    pub content_version: u64,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("file_path", &self.file_path)
            .field("modified", &self.modified)
            .field("title", &self.title)
            .field("content_version", &self.content_version)
            .field("mounted_fragments", &self.marks.count())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::with_history(text, HistoryManager::in_memory(text))
    }
}

impl Document {
    /// Creates a new empty document with in-memory-only history.
    pub fn new() -> Self {
        Self::from("")
    }

    /// Creates a document holding `text`, tracked by `history`.
    pub fn with_history(text: &str, history: HistoryManager) -> Self {
        Self {
            buffer: TextBuffer::from(text),
            cursor: Cursor::new(),
            history,
            marks: FragmentMarks::new(),
            file_path: None,
            title: "Untitled".to_string(),
            modified: false,
            content_version: 0,
        }
    }

    /// Returns the full text.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    #[inline]
    fn bump_version(&mut self) {
        self.content_version = self.content_version.wrapping_add(1);
    }

    /// Replaces `range` with `text`, keeping marks, cursor and history in
    /// step. The cursor ends up after the inserted text.
    fn edit(&mut self, range: TextRange, text: &str) -> Result<()> {
        self.buffer.replace(range, text)?;

        let inserted_len = text.chars().count();
        for id in self.marks.adjust_for_edit(range, inserted_len) {
            tracing::debug!(diff_id = %id, "edit cut into a mounted fragment; mark dropped");
        }

        self.cursor.move_to_char(range.start + inserted_len, &self.buffer);
        self.modified = true;
        self.bump_version();
        self.history.push(&self.buffer.to_string());
        Ok(())
    }

    /// Inserts text at the cursor, replacing the selection if any.
    pub fn insert_text(&mut self, text: &str) {
        let range = match self.cursor.selection_range(&self.buffer) {
            Ok(Some(range)) => range,
            _ => {
                let at = self.cursor.to_char_index(&self.buffer).unwrap_or(0);
                TextRange::new(at, at)
            }
        };
        if let Err(e) = self.edit(range, text) {
            tracing::warn!("Failed to insert text: {e}");
        }
    }

    /// Deletes the selected text.
    pub fn delete_selection(&mut self) {
        if let Ok(Some(range)) = self.cursor.selection_range(&self.buffer) {
            if range.is_empty() {
                self.cursor.clear_selection();
                return;
            }
            if let Err(e) = self.edit(range, "") {
                tracing::warn!("Failed to delete selection: {e}");
            }
        }
    }

    /// Replaces the whole content, as a single user edit.
    pub fn set_content(&mut self, text: &str) {
        let all = TextRange::new(0, self.buffer.len_chars());
        if let Err(e) = self.edit(all, text) {
            tracing::warn!("Failed to replace content: {e}");
        }
    }

    /// Selects `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range lies outside the buffer.
    pub fn select_range(&mut self, range: TextRange) -> Result<()> {
        self.buffer.check_range(range)?;
        self.cursor.select(range, &self.buffer);
        Ok(())
    }

    /// Moves the cursor to a char index, clearing the selection.
    pub fn move_to_char(&mut self, char_idx: usize) {
        self.cursor.move_to_char(char_idx, &self.buffer);
    }

    /// Returns the selected text, or None if no selection.
    pub fn selected_text(&self) -> Option<String> {
        match self.cursor.selection_range(&self.buffer) {
            Ok(Some(range)) if !range.is_empty() => self.buffer.slice(range).ok(),
            _ => None,
        }
    }

    /// Returns the text in `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn slice(&self, range: TextRange) -> Result<String> {
        self.buffer.slice(range)
    }

    /// Number of diff fragments currently mounted.
    pub fn mounted_fragments(&self) -> usize {
        self.marks.count()
    }

    /// Steps the content back one history entry.
    ///
    /// Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(content) => {
                self.apply_snapshot(&content);
                true
            }
            None => false,
        }
    }

    /// Steps the content forward one history entry.
    ///
    /// Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(content) => {
                self.apply_snapshot(&content);
                true
            }
            None => false,
        }
    }

    /// Commits a pending history entry whose debounce window has elapsed.
    pub fn poll_history(&mut self) -> bool {
        self.history.poll()
    }

    /// Swaps in a snapshot from history without recording it again.
    ///
    /// Mounted fragments cannot be mapped onto an arbitrary snapshot, so
    /// their marks are dropped.
    fn apply_snapshot(&mut self, content: &str) {
        if self.marks.count() > 0 {
            tracing::debug!(
                count = self.marks.count(),
                "history navigation dropped mounted fragment marks"
            );
            self.marks.clear();
        }
        self.buffer = TextBuffer::from(content);
        self.cursor.clear_selection();
        self.cursor.clamp(&self.buffer);
        self.modified = true;
        self.bump_version();
    }
}

impl EditableSurface for Document {
    fn content(&self) -> String {
        self.buffer.to_string()
    }

    fn selection(&self) -> Option<TextRange> {
        self.cursor.selection_range(&self.buffer).ok().flatten()
    }

    fn select(&mut self, range: TextRange) -> Result<()> {
        self.select_range(range)
    }

    fn replace(&mut self, range: TextRange, text: &str) -> Result<()> {
        self.edit(range, text)
    }

    fn mount_fragment(
        &mut self,
        range: TextRange,
        id: &DiffId,
        rendered: &str,
    ) -> Result<TextRange> {
        self.edit(range, rendered)?;
        let span = TextRange::new(range.start, range.start + rendered.chars().count());
        self.marks.insert(id.clone(), span);
        Ok(span)
    }

    fn fragment_range(&self, id: &DiffId) -> Option<TextRange> {
        self.marks.get(id)
    }

    fn unmount_fragment(&mut self, id: &DiffId, text: &str) -> Result<bool> {
        let Some(span) = self.marks.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = self.edit(span, text) {
            self.marks.insert(id.clone(), span);
            return Err(e);
        }
        Ok(true)
    }
}
