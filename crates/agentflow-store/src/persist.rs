// ABOUTME: Flow persistence adapter: restore on startup, persist after changes, export and import flow.json.
// ABOUTME: Imports are parsed and validated in full before anything is handed back to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use agentflow_core::{DocumentError, FlowDocument};
use thiserror::Error;

use crate::local::{LocalStore, LocalStoreError};

/// Storage key the flow document lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "reactFlowState";

/// File name used for exported flows.
pub const EXPORT_FILE_NAME: &str = "flow.json";

/// Errors that can occur while restoring, persisting, exporting, or importing.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("local store error: {0}")]
    Store(#[from] LocalStoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Reads and writes the flow document under one key of a local store.
pub struct FlowStorage {
    store: LocalStore,
    key: String,
}

impl FlowStorage {
    /// Open storage under `<home>/local`, creating directories as needed.
    pub fn open(home: &Path, key: impl Into<String>) -> Result<Self, PersistError> {
        let store = LocalStore::open(&home.join("local"))?;
        Ok(Self {
            store,
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored document, if any. A stored value that does not parse
    /// is returned as an error and left on disk untouched.
    pub fn restore_on_startup(&self) -> Result<Option<FlowDocument>, PersistError> {
        let Some(text) = self.store.get_item(&self.key)? else {
            tracing::info!(
                key = %self.key,
                dir = %self.store.dir().display(),
                "no stored flow, starting empty"
            );
            return Ok(None);
        };

        let document = FlowDocument::parse(&text)?;
        tracing::info!(
            key = %self.key,
            agents = document.agents.len(),
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "restored stored flow"
        );
        Ok(Some(document))
    }

    /// Write the document under the storage key.
    pub fn persist(&self, document: &FlowDocument) -> Result<(), PersistError> {
        let json = document.to_json()?;
        self.store.set_item(&self.key, &json)?;
        Ok(())
    }

    /// Remove the stored document.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.store.remove_item(&self.key)?;
        Ok(())
    }
}

/// Write the document as `flow.json` inside `dir` and return the file path.
pub fn export_to_file(dir: &Path, document: &FlowDocument) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, document.to_json()?)?;
    tracing::info!(path = %path.display(), "exported flow");
    Ok(path)
}

/// Read and validate a flow document from a file.
pub fn import_from_file(path: &Path) -> Result<FlowDocument, PersistError> {
    let text = fs::read_to_string(path)?;
    let document = FlowDocument::parse(&text)?;
    tracing::info!(path = %path.display(), "imported flow");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_core::{Agent, Edge, Node, Position};
    use tempfile::TempDir;

    fn sample_document() -> FlowDocument {
        let mut doc = FlowDocument::default();
        for (id, y) in [("A1", 0.0), ("A2", 120.0)] {
            doc.agents.push(Agent::new(id));
            doc.nodes.push(Node::agent(id, Position { x: 100.0, y }));
        }
        doc.edges.push(Edge::connect("A1", "A2", None, None));
        doc
    }

    #[test]
    fn restore_returns_none_when_nothing_stored() {
        let dir = TempDir::new().unwrap();
        let storage = FlowStorage::open(dir.path(), DEFAULT_STORAGE_KEY).unwrap();

        assert!(storage.restore_on_startup().unwrap().is_none());
    }

    #[test]
    fn persist_then_restore() {
        let dir = TempDir::new().unwrap();
        let storage = FlowStorage::open(dir.path(), DEFAULT_STORAGE_KEY).unwrap();
        let doc = sample_document();

        storage.persist(&doc).unwrap();
        let restored = storage.restore_on_startup().unwrap().expect("stored flow");

        assert_eq!(restored, doc);
        assert!(dir.path().join("local").join("reactFlowState.json").exists());
    }

    #[test]
    fn restore_propagates_malformed_store() {
        let dir = TempDir::new().unwrap();
        let storage = FlowStorage::open(dir.path(), DEFAULT_STORAGE_KEY).unwrap();
        let path = dir.path().join("local").join("reactFlowState.json");
        fs::write(&path, "{not json").unwrap();

        let err = storage.restore_on_startup().unwrap_err();

        assert!(matches!(err, PersistError::Document(DocumentError::Json(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn clear_removes_stored_flow() {
        let dir = TempDir::new().unwrap();
        let storage = FlowStorage::open(dir.path(), "custom").unwrap();
        storage.persist(&sample_document()).unwrap();

        storage.clear().unwrap();

        assert_eq!(storage.key(), "custom");
        assert!(storage.restore_on_startup().unwrap().is_none());
    }

    #[test]
    fn export_then_import_is_identity() {
        let dir = TempDir::new().unwrap();
        let doc = sample_document();

        let path = export_to_file(dir.path(), &doc).unwrap();
        assert_eq!(path.file_name().unwrap(), "flow.json");

        let imported = import_from_file(&path).unwrap();
        assert_eq!(imported, doc);
    }

    #[test]
    fn import_rejects_non_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, "just some notes").unwrap();

        let err = import_from_file(&path).unwrap_err();
        assert!(matches!(err, PersistError::Document(_)));
    }

    #[test]
    fn import_of_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();

        let err = import_from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }
}
