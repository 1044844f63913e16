//! Local state for one collection.
//!
//! The confirmed state is whatever the gateway last sent. Optimistic edits sit
//! in a pending list and are replayed over every confirmed snapshot until the
//! gateway acknowledges them (they fold into the confirmed state) or rejects
//! them (they are dropped, which reverts their effect). Observers receive the
//! folded view through a `watch` channel.

mod reducer;

pub use reducer::{Action, reduce};

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use crate::core::record::Record;

pub type View<T> = Arc<Vec<T>>;

struct Inner<T> {
    confirmed: Vec<T>,
    pending: Vec<(u64, Action<T>)>,
    next_seq: u64,
    synced: bool,
}

pub struct CollectionStore<T: Record> {
    inner: Mutex<Inner<T>>,
    tx: watch::Sender<View<T>>,
}

impl<T: Record> Default for CollectionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> CollectionStore<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Mutex::new(Inner {
                confirmed: Vec::new(),
                pending: Vec::new(),
                next_seq: 0,
                synced: false,
            }),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A panic while holding the lock cannot leave the vectors half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, inner: &Inner<T>) {
        let mut view = inner.confirmed.clone();
        for (_, action) in &inner.pending {
            reduce(&mut view, action);
        }
        self.tx.send_replace(Arc::new(view));
    }

    /// Replace the confirmed state with a gateway snapshot.
    pub fn apply_snapshot(&self, records: Vec<T>) {
        let mut inner = self.lock();
        reduce(&mut inner.confirmed, &Action::Snapshot(records));
        inner.synced = true;
        self.publish(&inner);
    }

    /// Apply a change the gateway already accepted.
    pub fn confirm(&self, action: Action<T>) {
        let mut inner = self.lock();
        reduce(&mut inner.confirmed, &action);
        self.publish(&inner);
    }

    /// Show `action` immediately and return its sequence number for `settle`/`rollback`.
    pub fn optimistic(&self, action: Action<T>) -> u64 {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.pending.push((seq, action));
        self.publish(&inner);
        seq
    }

    /// The gateway accepted pending mutation `seq`.
    pub fn settle(&self, seq: u64) {
        let mut inner = self.lock();
        if let Some(pos) = inner.pending.iter().position(|(s, _)| *s == seq) {
            let (_, action) = inner.pending.remove(pos);
            reduce(&mut inner.confirmed, &action);
        }
        self.publish(&inner);
    }

    /// The gateway rejected pending mutation `seq`; forget it.
    pub fn rollback(&self, seq: u64) {
        let mut inner = self.lock();
        inner.pending.retain(|(s, _)| *s != seq);
        self.publish(&inner);
    }

    pub fn current(&self) -> View<T> {
        self.tx.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.current().iter().find(|r| r.id() == id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Whether at least one gateway snapshot has arrived.
    pub fn is_synced(&self) -> bool {
        self.lock().synced
    }

    pub fn subscribe(&self) -> watch::Receiver<View<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::Project;
    use crate::core::record::Fields;
    use serde_json::json;

    fn project(id: &str, name: &str) -> Project {
        let mut p = Project::new(0);
        p.id = id.to_string();
        p.name = name.to_string();
        p
    }

    fn patch(field: &str, value: serde_json::Value) -> Action<Project> {
        let mut fields = Fields::new();
        fields.insert(field.to_string(), value);
        Action::Patch("a".into(), fields)
    }

    fn names(store: &CollectionStore<Project>) -> Vec<String> {
        store.current().iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn optimistic_edit_survives_snapshot_until_settled() {
        let store = CollectionStore::new();
        store.apply_snapshot(vec![project("a", "old")]);

        let seq = store.optimistic(Action::Upsert(project("a", "new")));
        assert_eq!(names(&store), vec!["new"]);

        // A snapshot from before the write landed does not undo the edit.
        store.apply_snapshot(vec![project("a", "old")]);
        assert_eq!(names(&store), vec!["new"]);

        store.settle(seq);
        assert_eq!(store.pending_count(), 0);
        assert_eq!(names(&store), vec!["new"]);
    }

    #[test]
    fn rejected_edit_does_not_leak_through_a_later_one() {
        let store = CollectionStore::new();
        store.apply_snapshot(vec![project("a", "old")]);

        let rename = store.optimistic(patch("name", json!("rejected")));
        let reorder = store.optimistic(patch("order", json!(7)));
        let p = store.get("a").unwrap();
        assert_eq!((p.name.as_str(), p.order), ("rejected", 7));

        store.rollback(rename);
        let p = store.get("a").unwrap();
        assert_eq!((p.name.as_str(), p.order), ("old", 7));

        store.settle(reorder);
        assert_eq!(store.pending_count(), 0);
        let p = store.get("a").unwrap();
        assert_eq!((p.name.as_str(), p.order), ("old", 7));
    }

    #[test]
    fn settle_after_newer_snapshot_keeps_both() {
        let store = CollectionStore::new();
        store.apply_snapshot(vec![project("a", "old")]);
        let rename = store.optimistic(patch("name", json!("mine")));

        // Someone else reordered; the snapshot does not carry our rename yet.
        let mut theirs = project("a", "old");
        theirs.order = 4;
        store.apply_snapshot(vec![theirs]);
        let p = store.get("a").unwrap();
        assert_eq!((p.name.as_str(), p.order), ("mine", 4));

        store.settle(rename);
        let p = store.get("a").unwrap();
        assert_eq!((p.name.as_str(), p.order), ("mine", 4));
    }

    #[test]
    fn rollback_reverts() {
        let store = CollectionStore::new();
        store.apply_snapshot(vec![project("a", "keep")]);
        let seq = store.optimistic(Action::Remove("a".into()));
        assert!(store.current().is_empty());
        store.rollback(seq);
        assert_eq!(names(&store), vec!["keep"]);
    }

    #[test]
    fn observers_see_every_publish() {
        let store = CollectionStore::new();
        let mut rx = store.subscribe();
        assert!(!store.is_synced());
        store.apply_snapshot(vec![project("a", "x")]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert!(store.is_synced());
    }
}
