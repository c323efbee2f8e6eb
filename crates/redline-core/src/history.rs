// Re-exports from redline-mod-history.
// Documents feed their full text into a HistoryManager on every change.
pub use redline_mod_history::config::{doc_id_for_path, generate_unsaved_id};
pub use redline_mod_history::{
    HistoryConfig, HistoryEntry, HistoryManager, HistorySnapshot, SnapshotStore,
};
