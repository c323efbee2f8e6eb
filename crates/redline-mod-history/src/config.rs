/// Configuration and utility functions for the history system.
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum number of snapshots kept per document.
/// Oldest snapshots are evicted when this limit is exceeded.
const DEFAULT_MAX_ENTRIES: usize = 100;

/// Quiet period in milliseconds that must pass after the last content
/// change before a snapshot is committed.
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Configuration for the history system.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max snapshots in the stack, including the seed entry.
    pub max_entries: usize,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Root directory for the snapshot database.
    pub data_dir: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            data_dir: resolve_data_dir(),
        }
    }
}

/// Resolves the data directory path.
///
/// Resolution order:
/// 1. `REDLINE_DATA_DIR` environment variable
/// 2. `.data/` directory next to the executable
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REDLINE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe.parent().unwrap_or(Path::new(".")).join(".data")
}

/// Generates a document ID for a file on disk.
///
/// Uses a hash of the canonical path for stability across sessions.
pub fn doc_id_for_path(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    format!("file-{:016x}", hasher.finish())
}

/// Counter for generating unique unsaved document IDs within a session.
static UNSAVED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a unique document ID for an unsaved (new) document.
pub fn generate_unsaved_id() -> String {
    let count = UNSAVED_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("unsaved-{count}")
}
