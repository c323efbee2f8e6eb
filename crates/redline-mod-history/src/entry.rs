/// Core types for content snapshots.
use serde::{Deserialize, Serialize};

/// A committed full-content snapshot of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Document content at commit time.
    pub content: String,
    /// Commit time in Unix milliseconds.
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current wall-clock time.
    pub fn now(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Serializable image of a whole history stack.
///
/// This is what the snapshot store writes and reads back; the pending
/// debounce state is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Entries, oldest first.
    pub entries: Vec<HistoryEntry>,
    /// Index of the currently displayed entry.
    pub cursor: usize,
}
