/// Disk persistence for history stacks, backed by redb.
///
/// Uses a single redb database file with one table, `snapshots`, mapping a
/// document id to the bincode-serialized `HistorySnapshot` of its stack.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::entry::HistorySnapshot;

/// Snapshot table: doc_id → bincode-serialized HistorySnapshot.
const SNAPSHOT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Persistence layer for history stacks.
///
/// Shared across documents via `Arc<SnapshotStore>`.
pub struct SnapshotStore {
    db: Database,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").finish()
    }
}

impl SnapshotStore {
    /// Opens or creates the snapshot database in the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("history.redb");
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open history database: {}", db_path.display()))?;

        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(SNAPSHOT_TABLE)
                .context("Failed to create snapshot table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Arc::new(Self { db }))
    }

    /// Writes the full stack for a document, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write transaction fails.
    pub fn save(&self, doc_id: &str, snapshot: &HistorySnapshot) -> Result<()> {
        let bytes = bincode::serialize(snapshot).context("Failed to serialize history")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(SNAPSHOT_TABLE)
                .context("Failed to open snapshot table")?;
            table
                .insert(doc_id, bytes.as_slice())
                .context("Failed to insert history")?;
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;
        Ok(())
    }

    /// Reads the stored stack for a document.
    ///
    /// Returns `None` if no history exists for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load(&self, doc_id: &str) -> Result<Option<HistorySnapshot>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(SNAPSHOT_TABLE)
            .context("Failed to open snapshot table")?;

        match table.get(doc_id).context("Failed to read history")? {
            Some(guard) => {
                let snapshot: HistorySnapshot = bincode::deserialize(guard.value())
                    .context("Failed to deserialize history")?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Removes the stored stack for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete(&self, doc_id: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(SNAPSHOT_TABLE)
                .context("Failed to open snapshot table")?;
            let _ = table.remove(doc_id).context("Failed to remove history")?;
        }
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(())
    }

    /// Lists all document IDs that have stored history.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(SNAPSHOT_TABLE)
            .context("Failed to open snapshot table")?;

        let mut doc_ids = Vec::new();
        for entry in table.iter().context("Failed to iterate snapshot table")? {
            let (key_guard, _) = entry.context("Failed to read snapshot entry")?;
            doc_ids.push(key_guard.value().to_string());
        }
        Ok(doc_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::HistoryEntry;
    use tempfile::TempDir;

    fn sample(contents: &[&str], cursor: usize) -> HistorySnapshot {
        HistorySnapshot {
            entries: contents.iter().map(|c| HistoryEntry::now(*c)).collect(),
            cursor,
        }
    }

    #[test]
    fn test_open_creates_database() {
        let dir = TempDir::new().expect("create temp dir");
        let _store = SnapshotStore::open(dir.path()).expect("open");
        assert!(dir.path().join("history.redb").exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().expect("create temp dir");
        let store = SnapshotStore::open(dir.path()).expect("open");
        let snapshot = sample(&["", "draft"], 1);

        store.save("doc", &snapshot).expect("save");
        let loaded = store.load("doc").expect("load").expect("present");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_load_missing_document() {
        let dir = TempDir::new().expect("create temp dir");
        let store = SnapshotStore::open(dir.path()).expect("open");
        assert!(store.load("nope").expect("load").is_none());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().expect("create temp dir");
        let store = SnapshotStore::open(dir.path()).expect("open");
        store.save("doc", &sample(&["a", "b", "c"], 2)).expect("save");
        store.save("doc", &sample(&["z"], 0)).expect("save");

        let loaded = store.load("doc").expect("load").expect("present");
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].content, "z");
    }

    #[test]
    fn test_delete_and_list() {
        let dir = TempDir::new().expect("create temp dir");
        let store = SnapshotStore::open(dir.path()).expect("open");
        store.save("doc-a", &sample(&["a"], 0)).expect("save");
        store.save("doc-b", &sample(&["b"], 0)).expect("save");

        let mut docs = store.list_documents().expect("list");
        docs.sort();
        assert_eq!(docs, vec!["doc-a".to_string(), "doc-b".to_string()]);

        store.delete("doc-a").expect("delete");
        assert!(store.load("doc-a").expect("load").is_none());
        assert!(store.load("doc-b").expect("load").is_some());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = TempDir::new().expect("create temp dir");
        let store = SnapshotStore::open(dir.path()).expect("open");
        store.delete("ghost").expect("delete");
    }
}
