//! Best-effort bucket snapshots
//!
//! The live buckets are always authoritative. A snapshot is written after
//! changes and read once when a [`Toaster`](crate::Toaster) is built; any
//! failure is logged and otherwise ignored.

use std::sync::Arc;

use kestrel_core::{load_json, store_json, KvBackend};

use crate::store::ToastStore;

/// Storage key for bucket snapshots
pub const PERSIST_KEY: &str = "@kestrel/toasts-persistence";

/// Snapshot writer bound to one backend
#[derive(Clone)]
pub struct Persistence {
    backend: Arc<dyn KvBackend>,
    key: String,
}

impl Persistence {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            key: PERSIST_KEY.to_string(),
        }
    }

    /// Use a different storage key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Read the last snapshot, `None` when absent or unreadable
    pub fn restore(&self) -> Option<ToastStore> {
        match load_json::<ToastStore>(self.backend.as_ref(), &self.key) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Persistence::restore - ignoring snapshot {:?}: {}", self.key, e);
                None
            }
        }
    }

    pub fn save(&self, store: &ToastStore) {
        if let Err(e) = store_json(self.backend.as_ref(), &self.key, store) {
            tracing::warn!("Persistence::save - failed to write {:?}: {}", self.key, e);
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToastDefaults;
    use crate::types::{ToastId, ToastOptions, ToastPosition, ToastRecord};
    use kestrel_core::MemoryKv;

    #[test]
    fn test_save_and_restore() {
        let kv = Arc::new(MemoryKv::new());
        let persistence = Persistence::new(kv.clone());

        let mut store = ToastStore::new();
        store.push(ToastRecord::from_options(
            ToastId::from("saved"),
            ToastOptions::titled("Saved").position(ToastPosition::BottomRight),
            &ToastDefaults::default(),
            10,
        ));
        persistence.save(&store);
        assert!(kv.contains(PERSIST_KEY));

        let restored = persistence.restore().unwrap();
        let bucket = restored.bucket(ToastPosition::BottomRight);
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].title.as_deref(), Some("Saved"));
    }

    #[test]
    fn test_corrupted_snapshot_ignored() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(PERSIST_KEY, "{\"top-right\": 12").unwrap();
        assert!(Persistence::new(kv).restore().is_none());
    }
}
