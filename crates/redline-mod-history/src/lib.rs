/// Debounced undo/redo history over full-content snapshots.
///
/// Provides a `HistoryManager` that coalesces bursts of content changes
/// into single snapshots and navigates them with a cursor. Stacks can be
/// persisted per-document to an embedded key-value store (redb) on disk so
/// the timeline survives across application sessions.
pub mod config;
pub mod entry;
pub mod manager;
pub mod persistence;

pub use config::HistoryConfig;
pub use entry::{HistoryEntry, HistorySnapshot};
pub use manager::HistoryManager;
pub use persistence::SnapshotStore;
