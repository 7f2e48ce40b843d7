//! Key-value snapshot storage
//!
//! Backends for non-authoritative snapshots (restore-on-load conveniences).
//! Values are opaque strings; [`load_json`] and [`store_json`] add typed
//! access on top of any backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// String key-value storage
pub trait KvBackend: Send + Sync {
    /// Read a value, `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Decode a JSON value stored under `key`
pub fn load_json<T: DeserializeOwned>(backend: &dyn KvBackend, key: &str) -> Result<Option<T>> {
    match backend.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON under `key`
pub fn store_json<T: Serialize>(backend: &dyn KvBackend, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    backend.set(key, &raw)
}

// =============================================================================
// MemoryKv
// =============================================================================

/// In-process storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// FileKv
// =============================================================================

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKv {
    root: PathBuf,
}

impl FileKv {
    /// Use `root` as the storage directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(CoreError::InvalidKey(key.to_string()));
        }
        // Keys like "@kestrel/toasts" must not create subdirectories
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Ok(self.root.join(format!("{file}.json")))
    }
}

impl KvBackend for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kestrel-kv-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_memory_roundtrip_json() {
        let kv = MemoryKv::new();
        let value = Sample {
            name: "toasts".into(),
            count: 3,
        };
        store_json(&kv, "@kestrel/sample", &value).unwrap();
        let loaded: Option<Sample> = load_json(&kv, "@kestrel/sample").unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_missing_key_is_none() {
        let kv = MemoryKv::new();
        let loaded: Option<Sample> = load_json(&kv, "nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupted_value_is_error() {
        let kv = MemoryKv::new();
        kv.set("broken", "{not json").unwrap();
        let loaded: Result<Option<Sample>> = load_json(&kv, "broken");
        assert!(matches!(loaded, Err(CoreError::Serialize(_))));
    }

    #[test]
    fn test_file_kv_set_get_remove() {
        let dir = scratch_dir("roundtrip");
        let kv = FileKv::new(&dir);

        kv.set("@kestrel/toasts-persistence", "[]").unwrap();
        assert_eq!(
            kv.get("@kestrel/toasts-persistence").unwrap().as_deref(),
            Some("[]")
        );

        kv.remove("@kestrel/toasts-persistence").unwrap();
        assert_eq!(kv.get("@kestrel/toasts-persistence").unwrap(), None);
        kv.remove("@kestrel/toasts-persistence").unwrap();

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_file_kv_rejects_empty_key() {
        let kv = FileKv::new(scratch_dir("empty"));
        assert!(matches!(kv.get(""), Err(CoreError::InvalidKey(_))));
    }
}
