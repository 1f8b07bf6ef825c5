//! # Facilitydesk Store
//!
//! Key-value persistence for Facilitydesk.
//!
//! The application keeps its whole state as a handful of JSON blobs under fixed
//! keys, the way a browser app would use local storage. This crate provides:
//!
//! - [`KeyValueStore`]: the storage abstraction
//! - [`LocalFileStore`]: one `<key>.json` file per key in a data directory
//! - [`MemoryStore`]: an in-process map, used by tests and dry runs
//! - [`load_json`] / [`save_json`]: typed access to the blobs
//!
//! # Example
//!
//! ```ignore
//! use facilitydesk_store::{KeyValueStore, LocalFileStore, load_json, save_json};
//!
//! let store = LocalFileStore::new("./.facilitydesk");
//! save_json(&store, "facilitydesk_roles", &roles)?;
//! let roles: Option<Vec<Role>> = load_json(&store, "facilitydesk_roles")?;
//! ```

pub mod error;
pub mod json;
pub mod local;
pub mod memory;

use std::sync::Arc;

pub use error::StorageError;
pub use json::{load_json, save_json};
pub use local::LocalFileStore;
pub use memory::MemoryStore;

/// Abstract string key-value store.
///
/// Implementations can be swapped without changing the services that use them.
/// Writes replace the whole value; there are no partial updates.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// Rejects keys that could escape the data directory or collide with temp files.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.contains("..") || key.starts_with('.') {
        return Err(StorageError::InvalidKey(
            "Key must not be empty, contain '..', or start with '.'".to_string(),
        ));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(StorageError::InvalidKey(format!(
            "Key '{}' contains invalid characters",
            key
        )));
    }

    Ok(())
}
