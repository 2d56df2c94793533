//! JSON file persistence
//!
//! One pretty-printed JSON file per namespace, written atomically via a temp file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::Persistence;
use crate::error::{AppError, Result};

/// Persistence rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Creates the store, creating `root` if it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: &str) -> Result<PathBuf> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::Persistence(format!(
                "Invalid namespace '{}'",
                namespace
            )));
        }
        Ok(self.root.join(format!("{}.json", namespace)))
    }
}

impl Persistence for JsonFileStore {
    fn load_raw(&self, namespace: &str) -> Result<Option<Value>> {
        let path = self.path_for(namespace)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn store_raw(&self, namespace: &str, value: Value) -> Result<()> {
        let path = self.path_for(namespace)?;
        let json = serde_json::to_string_pretty(&value)?;

        // Not fsynced: runs under the cache write lock
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        drop(file);
        fs::rename(&temp_path, &path)?;

        Ok(())
    }
}
