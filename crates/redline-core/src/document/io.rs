//! File I/O operations for documents.
//!
//! Opens UTF-8 text files from disk, saves documents back, and wires up
//! persistent snapshot history keyed by the file path.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::history::{doc_id_for_path, HistoryConfig, HistoryManager, SnapshotStore};

use super::Document;

impl Document {
    /// Opens a document from a file path with in-memory-only history.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 text.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_internal(path, None)
    }

    /// Opens a document from a file path with persistent history.
    ///
    /// Loads the stored history stack if one exists for this path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or history loading fails.
    pub fn open_with_store(
        path: &Path,
        store: Arc<SnapshotStore>,
        config: &HistoryConfig,
    ) -> Result<Self> {
        Self::open_internal(path, Some((store, config)))
    }

    fn open_internal(
        path: &Path,
        store: Option<(Arc<SnapshotStore>, &HistoryConfig)>,
    ) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read file: {}", path.display()))?;

        let history = match store {
            Some((store, config)) => {
                let doc_id = doc_id_for_path(path);
                HistoryManager::load_or_new(doc_id, &text, config.clone(), Some(store))
                    .context("failed to load history")?
            }
            None => HistoryManager::in_memory(&text),
        };

        let mut doc = Self::with_history(&text, history);
        // A stored timeline may not end at what is on disk now.
        doc.history.push(&text);
        doc.history.flush_pending();
        doc.file_path = Some(path.to_path_buf());
        doc.title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        Ok(doc)
    }

    /// Saves the document to its file path.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set or the file cannot be written.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .file_path
            .as_ref()
            .context("no file path set for this document")?
            .clone();
        self.save_to(&path)
    }

    /// Saves the document to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        std::fs::write(path, self.buffer.to_string())
            .with_context(|| format!("failed to write file: {}", path.display()))?;

        self.file_path = Some(path.to_path_buf());
        self.title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        self.modified = false;
        Ok(())
    }

    /// Commits any pending history entry and writes the stack to disk.
    ///
    /// No-op on disk if using in-memory-only history.
    ///
    /// # Errors
    ///
    /// Returns an error if the disk write fails.
    pub fn flush_history(&mut self) -> Result<()> {
        self.history.flush_pending();
        self.history.flush()
    }

    /// Deletes all persisted history for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if disk cleanup fails.
    pub fn delete_history(&mut self) -> Result<()> {
        self.history.delete_history()
    }

    /// Returns the document's history identifier.
    pub fn doc_id(&self) -> &str {
        self.history.doc_id()
    }
}
