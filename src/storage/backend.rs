//! Key/value persistence abstraction.
//!
//! This module defines the [`KeyValueStore`] trait that every durable backend
//! implements. The favourites and last-search stores are written against this trait
//! only, so production code can use the JSON file store while tests inject the
//! in-memory one.
//!
//! # Design
//!
//! Values are opaque JSON strings. The trait does no schema validation; callers
//! decode what they read and treat a mismatched value as absent.

use crate::domain::error::Result;

/// A durable string-keyed, string-valued store.
///
/// Implementations must make a successful [`set`](KeyValueStore::set) or
/// [`remove`](KeyValueStore::remove) durable before returning.
///
/// # Implementations
///
/// - [`JsonFileStore`](crate::storage::JsonFileStore): single JSON document with atomic writes
/// - [`MemoryStore`](crate::storage::MemoryStore): process-local map for tests
///
/// # Examples
///
/// ```
/// use gigscout::storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("lastSearch", r#"{"cityName":"Austin"}"#)?;
/// assert_eq!(store.get("lastSearch")?.as_deref(), Some(r#"{"cityName":"Austin"}"#));
/// # Ok::<(), gigscout::GigscoutError>(())
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key was never written or has been removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Stores several entries as one write: either all become durable or none.
    ///
    /// The default writes them one by one and is not atomic; backends that can
    /// batch override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries could not be made durable.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        entries.iter().try_for_each(|&(key, value)| self.set(key, value))
    }

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal could not be made durable.
    fn remove(&self, key: &str) -> Result<()>;
}
