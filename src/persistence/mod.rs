//! Persistence Module
//!
//! Namespaced key-value storage used for the cache map and for settings.

mod file;
mod memory;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

// == Persistence Trait ==
/// Durable storage for JSON documents addressed by namespace.
pub trait Persistence: Send + Sync {
    /// Returns the document stored under `namespace`, if any.
    fn load_raw(&self, namespace: &str) -> Result<Option<Value>>;

    /// Replaces the document stored under `namespace`.
    fn store_raw(&self, namespace: &str, value: Value) -> Result<()>;
}

impl dyn Persistence {
    /// Loads and decodes `namespace`, falling back to `default` when nothing is stored.
    pub fn load<T: DeserializeOwned>(&self, namespace: &str, default: T) -> Result<T> {
        match self.load_raw(namespace)? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                AppError::Persistence(format!("Corrupt value under '{}': {}", namespace, e))
            }),
            None => Ok(default),
        }
    }

    /// Encodes and stores `value` under `namespace`.
    pub fn store<T: Serialize>(&self, namespace: &str, value: &T) -> Result<()> {
        self.store_raw(namespace, serde_json::to_value(value)?)
    }
}
