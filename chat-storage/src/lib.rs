//! Storage crate: the chat widget's local persistence.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`backend`] – `KeyValueStorage` trait with file and in-memory backends
//! - [`chat_storage`] – `ChatStorage`, the guarded session/transcript/preferences store
//! - [`lifecycle`] – Expiry sweep scheduling (`initialize_storage_lifecycle`)

mod backend;
mod chat_storage;
mod error;
mod lifecycle;


pub use backend::{FileStorage, KeyValueStorage, MemoryStorage};
pub use chat_storage::{keys, ChatStorage, StorageInfo};
pub use error::StorageError;
pub use lifecycle::{initialize_storage_lifecycle, StorageLifecycle, INITIAL_SWEEP_DELAY};
