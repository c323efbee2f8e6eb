/// Debounced undo/redo manager over full-content snapshots.
///
/// Content changes are not committed immediately. Each `push` (re)arms a
/// pending commit with a deadline; the host event loop calls `poll` and
/// the pending content is committed once the deadline passes without a
/// further push. A burst of keystrokes therefore lands as a single entry.
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::{generate_unsaved_id, HistoryConfig};
use crate::entry::{HistoryEntry, HistorySnapshot};
use crate::persistence::SnapshotStore;

/// A scheduled commit waiting for its quiet period to elapse.
#[derive(Debug, Clone)]
struct PendingCommit {
    content: String,
    deadline: Instant,
}

/// Manages the snapshot timeline for a single document.
///
/// Each editor instance owns its own `HistoryManager`, including its own
/// pending commit, so independent documents never share timer state.
pub struct HistoryManager {
    /// Committed snapshots, oldest first. Never empty.
    entries: Vec<HistoryEntry>,
    /// Index of the currently displayed snapshot.
    cursor: usize,
    /// Content waiting for the debounce window to elapse.
    pending: Option<PendingCommit>,
    /// Document identifier used as the persistence key.
    doc_id: String,
    /// Configuration parameters.
    config: HistoryConfig,
    /// Optional disk persistence (None = in-memory only).
    store: Option<Arc<SnapshotStore>>,
    /// Whether the stack has changed since the last flush.
    dirty: bool,
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("doc_id", &self.doc_id)
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("pending", &self.pending.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl HistoryManager {
    /// Creates a manager seeded with one entry holding `initial`.
    pub fn new(
        doc_id: String,
        initial: &str,
        config: HistoryConfig,
        store: Option<Arc<SnapshotStore>>,
    ) -> Self {
        Self {
            entries: vec![HistoryEntry::now(initial)],
            cursor: 0,
            pending: None,
            doc_id,
            config,
            store,
            dirty: false,
        }
    }

    /// Creates an in-memory-only manager with default config.
    pub fn in_memory(initial: &str) -> Self {
        Self::new(generate_unsaved_id(), initial, HistoryConfig::default(), None)
    }

    /// Loads a stored stack from disk, or seeds a fresh one with `initial`.
    ///
    /// A stored stack whose cursor points past its end is clamped to the
    /// last entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot store fails to read.
    pub fn load_or_new(
        doc_id: String,
        initial: &str,
        config: HistoryConfig,
        store: Option<Arc<SnapshotStore>>,
    ) -> Result<Self> {
        let stored = match &store {
            Some(s) => s.load(&doc_id).context("Failed to load history from disk")?,
            None => None,
        };

        let mut mgr = Self::new(doc_id, initial, config, store);
        if let Some(snapshot) = stored.filter(|s| !s.entries.is_empty()) {
            mgr.cursor = snapshot.cursor.min(snapshot.entries.len() - 1);
            mgr.entries = snapshot.entries;
            mgr.enforce_capacity();
        }
        Ok(mgr)
    }

    /// Returns the document ID.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Returns the configured debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.debounce_ms)
    }

    /// Notifies the manager that the document content changed.
    pub fn push(&mut self, content: &str) {
        self.push_at(content, Instant::now());
    }

    /// Notifies the manager of a content change observed at `now`.
    ///
    /// Content equal to the current entry cancels any pending commit and
    /// records nothing. Otherwise the pending commit is replaced and its
    /// deadline pushed out to `now + debounce`. A zero debounce window
    /// commits immediately.
    pub fn push_at(&mut self, content: &str, now: Instant) {
        if content == self.current() {
            self.pending = None;
            return;
        }

        if self.config.debounce_ms == 0 {
            self.pending = None;
            self.commit(content.to_string());
            return;
        }

        self.pending = Some(PendingCommit {
            content: content.to_string(),
            deadline: now + self.debounce(),
        });
    }

    /// Commits the pending content if its deadline has passed.
    ///
    /// Returns `true` if an entry was appended.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Commits the pending content if its deadline is at or before `now`.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(p) if now >= p.deadline => {
                self.flush_pending();
                true
            }
            _ => false,
        }
    }

    /// When the pending commit is due, if any. Hosts use this to schedule
    /// their next `poll`.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether a content change is waiting for its debounce window.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Commits the pending content right away, ignoring its deadline.
    pub fn flush_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            self.commit(p.content);
        }
    }

    /// Drops the pending content without committing it.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Steps back one entry and returns its content.
    ///
    /// A pending change is committed first so the step lands on the state
    /// before the latest burst of edits. Returns `None` at the first entry.
    pub fn undo(&mut self) -> Option<String> {
        self.flush_pending();
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.dirty = true;
        Some(self.entries[self.cursor].content.clone())
    }

    /// Steps forward one entry and returns its content.
    ///
    /// A pending change is committed first, which truncates the redo tail,
    /// so redo after an uncommitted edit returns `None`.
    pub fn redo(&mut self) -> Option<String> {
        self.flush_pending();
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.dirty = true;
        Some(self.entries[self.cursor].content.clone())
    }

    /// Whether undo is available (counting a pending change).
    pub fn can_undo(&self) -> bool {
        self.cursor > 0 || self.pending.is_some()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && self.cursor + 1 < self.entries.len()
    }

    /// Replaces the stack with a single entry holding `content`.
    pub fn reset(&mut self, content: &str) {
        self.pending = None;
        self.entries = vec![HistoryEntry::now(content)];
        self.cursor = 0;
        self.dirty = true;
    }

    /// Content of the entry under the cursor.
    pub fn current(&self) -> &str {
        &self.entries[self.cursor].content
    }

    /// Index of the entry under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// All committed entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the stack holds at least the seed entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a serializable copy of the committed stack.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            entries: self.entries.clone(),
            cursor: self.cursor,
        }
    }

    /// Writes the committed stack to disk.
    ///
    /// No-op if the manager is in-memory-only or nothing has changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(store) = &self.store {
            store
                .save(&self.doc_id, &self.snapshot())
                .context("Failed to flush history to disk")?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Deletes all persisted history for this document and reseeds the
    /// stack with the current content.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn delete_history(&mut self) -> Result<()> {
        let current = self.current().to_string();
        self.reset(&current);
        self.dirty = false;

        if let Some(store) = &self.store {
            store
                .delete(&self.doc_id)
                .context("Failed to clear history from disk")?;
        }
        Ok(())
    }

    /// Appends `content` after the cursor, dropping any redo tail.
    fn commit(&mut self, content: String) {
        if content == self.current() {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::now(content));
        self.cursor = self.entries.len() - 1;
        self.enforce_capacity();
        self.dirty = true;
        tracing::debug!(
            doc_id = %self.doc_id,
            len = self.entries.len(),
            "committed history entry"
        );
    }

    /// Evicts the oldest entries beyond `max_entries`, keeping the cursor
    /// on the same entry.
    fn enforce_capacity(&mut self) {
        let max = self.config.max_entries.max(1);
        if self.entries.len() > max {
            let excess = self.entries.len() - max;
            self.entries.drain(..excess);
            self.cursor = self.cursor.saturating_sub(excess);
        }
    }
}
