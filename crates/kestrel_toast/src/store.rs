//! Position buckets
//!
//! One ordered list per [`ToastPosition`]. Insertion order is display order and
//! every toast lives in exactly one bucket.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{ToastId, ToastPosition, ToastRecord};

/// All toasts, grouped by screen position
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastStore {
    buckets: IndexMap<ToastPosition, Vec<ToastRecord>>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    pub fn new() -> Self {
        let buckets = ToastPosition::ALL
            .into_iter()
            .map(|position| (position, Vec::new()))
            .collect();
        Self { buckets }
    }

    /// Append to the record's bucket
    pub fn push(&mut self, record: ToastRecord) {
        self.buckets.entry(record.position).or_default().push(record);
    }

    /// Drop records from the front of `position` until at most `max` remain
    pub fn evict_overflow(&mut self, position: ToastPosition, max: usize) -> Vec<ToastRecord> {
        let Some(bucket) = self.buckets.get_mut(&position) else {
            return Vec::new();
        };
        let excess = bucket.len().saturating_sub(max);
        bucket.drain(..excess).collect()
    }

    pub fn find(&self, id: &ToastId) -> Option<&ToastRecord> {
        self.buckets.values().flatten().find(|t| &t.id == id)
    }

    pub fn find_mut(&mut self, id: &ToastId) -> Option<&mut ToastRecord> {
        self.buckets.values_mut().flatten().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &ToastId) -> bool {
        self.find(id).is_some()
    }

    pub fn take(&mut self, id: &ToastId) -> Option<ToastRecord> {
        for bucket in self.buckets.values_mut() {
            if let Some(index) = bucket.iter().position(|t| &t.id == id) {
                return Some(bucket.remove(index));
            }
        }
        None
    }

    /// Empty every bucket, returning what was removed in bucket order
    pub fn drain_all(&mut self) -> Vec<ToastRecord> {
        self.buckets
            .values_mut()
            .flat_map(|bucket| bucket.drain(..))
            .collect()
    }

    pub fn bucket(&self, position: ToastPosition) -> &[ToastRecord] {
        self.buckets
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToastRecord> {
        self.buckets.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToastDefaults;
    use crate::types::ToastOptions;

    fn record(id: u64, position: ToastPosition) -> ToastRecord {
        ToastRecord::from_options(
            ToastId::Num(id),
            ToastOptions::titled(format!("Toast {id}")).position(position),
            &ToastDefaults::default(),
            0,
        )
    }

    #[test]
    fn test_buckets_keep_insertion_order() {
        let mut store = ToastStore::new();
        store.push(record(1, ToastPosition::TopRight));
        store.push(record(2, ToastPosition::BottomLeft));
        store.push(record(3, ToastPosition::TopRight));

        let ids: Vec<_> = store
            .bucket(ToastPosition::TopRight)
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(ids, vec![ToastId::Num(1), ToastId::Num(3)]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_evict_overflow_removes_oldest() {
        let mut store = ToastStore::new();
        for id in 1..=4 {
            store.push(record(id, ToastPosition::TopLeft));
        }
        let evicted = store.evict_overflow(ToastPosition::TopLeft, 2);
        assert_eq!(evicted.len(), 2);
        assert_eq!(evicted[0].id, ToastId::Num(1));
        assert_eq!(store.bucket(ToastPosition::TopLeft)[0].id, ToastId::Num(3));
    }

    #[test]
    fn test_take_and_drain() {
        let mut store = ToastStore::new();
        store.push(record(1, ToastPosition::TopRight));
        store.push(record(2, ToastPosition::BottomCenter));

        assert!(store.take(&ToastId::Num(1)).is_some());
        assert!(store.take(&ToastId::Num(1)).is_none());
        assert_eq!(store.drain_all().len(), 1);
        assert!(store.is_empty());
    }
}
