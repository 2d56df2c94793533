//! In-process persistence, used by tests and ephemeral deployments.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::Persistence;
use crate::error::Result;

/// Persistence backed by a HashMap; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn load_raw(&self, namespace: &str) -> Result<Option<Value>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(documents.get(namespace).cloned())
    }

    fn store_raw(&self, namespace: &str, value: Value) -> Result<()> {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents.insert(namespace.to_string(), value);
        Ok(())
    }
}
