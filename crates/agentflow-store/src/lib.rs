// ABOUTME: Persistence layer for agentflow, the local-only counterpart of browser storage.
// ABOUTME: Provides the atomic key/value LocalStore and the FlowStorage restore/persist/export/import adapter.

pub mod local;
pub mod persist;

pub use local::{LocalStore, LocalStoreError};
pub use persist::{
    DEFAULT_STORAGE_KEY, EXPORT_FILE_NAME, FlowStorage, PersistError, export_to_file,
    import_from_file,
};
