//! Use-case services, one per view.
//!
//! A `Tracker<T>` owns the local store for one collection, the subscription
//! feeding it, and the write path to the gateway. Every write is caught at
//! this layer: failures are logged, rolled back locally and published as a
//! `SyncIssue`; callers only learn whether the change applied.

pub mod balance;
pub mod goals;
pub mod mood;
pub mod projects;
mod subrecords;
pub mod todos;

use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::core::record::{Cascade, Record, RecordId, changed_fields};
use crate::store::{Action, CollectionStore, View};
use crate::sync::{BlobStore, GatewayError, GatewayResult, Snapshot, SyncGateway};

pub use balance::BalanceTracker;
pub use goals::GoalTracker;
pub use mood::MoodTracker;
pub use projects::ProjectTracker;
pub use todos::TodoTracker;

const ISSUE_CAPACITY: usize = 64;

/// A write the gateway refused, for a retry banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncIssue {
    pub collection: &'static str,
    pub operation: &'static str,
    pub record_id: Option<RecordId>,
    pub message: String,
    pub retryable: bool,
}

pub struct Tracker<T: Record> {
    gateway: Arc<dyn SyncGateway>,
    blobs: Arc<dyn BlobStore>,
    store: Arc<CollectionStore<T>>,
    issues: broadcast::Sender<SyncIssue>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Record> Tracker<T> {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        blobs: Arc<dyn BlobStore>,
        issues: broadcast::Sender<SyncIssue>,
    ) -> Self {
        Self {
            gateway,
            blobs,
            store: Arc::new(CollectionStore::new()),
            issues,
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to the collection. Returns once the first snapshot is applied;
    /// later snapshots are applied by a background task.
    pub async fn attach(&self) -> GatewayResult<()> {
        let mut stream = self.gateway.subscribe(T::COLLECTION, T::ORDER_FIELD).await?;
        match stream.next().await {
            Some(first) => apply_snapshot(&self.store, first),
            None => {
                return Err(GatewayError::Unavailable(format!(
                    "subscription to {} closed before the first snapshot",
                    T::COLLECTION
                )));
            }
        }

        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = stream.next().await {
                apply_snapshot(&store, snapshot);
            }
            log::info!("Subscription to {} ended", T::COLLECTION);
        });

        if let Ok(mut listener) = self.listener.lock() {
            if let Some(old) = listener.replace(handle) {
                old.abort();
            }
        }
        Ok(())
    }

    /// Stop applying snapshots.
    pub fn detach(&self) {
        if let Ok(mut listener) = self.listener.lock() {
            if let Some(handle) = listener.take() {
                handle.abort();
            }
        }
    }

    pub fn records(&self) -> View<T> {
        self.store.current()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.store.get(id)
    }

    pub fn store(&self) -> &CollectionStore<T> {
        &self.store
    }

    pub fn watch(&self) -> tokio::sync::watch::Receiver<View<T>> {
        self.store.subscribe()
    }

    pub fn issues(&self) -> broadcast::Receiver<SyncIssue> {
        self.issues.subscribe()
    }

    pub(crate) fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Add a new record. Shown once the gateway has assigned its id.
    pub async fn create(&self, mut record: T) -> Option<T> {
        let fields = match record.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                self.report("add", None, &GatewayError::from(e));
                return None;
            }
        };
        match self.gateway.add_record(T::COLLECTION, fields).await {
            Ok(id) => {
                log::info!("Added {}/{}", T::COLLECTION, id);
                record.set_id(id);
                self.store.confirm(Action::Upsert(record.clone()));
                Some(record)
            }
            Err(e) => {
                self.report("add", None, &e);
                None
            }
        }
    }

    /// Edit one record in place and push only the fields that changed.
    ///
    /// The pending change is the field patch, not the edited record, so a
    /// rejected edit never leaks through a later one that started on top of it.
    /// `edit` returns `false` when it found nothing to change. A missing record
    /// is a no-op.
    pub async fn modify(&self, id: &str, edit: impl FnOnce(&mut T) -> bool) -> Option<T> {
        let Some(before) = self.store.get(id) else {
            log::debug!("Ignoring edit of missing {}/{}", T::COLLECTION, id);
            return None;
        };
        let mut after = before.clone();
        if !edit(&mut after) {
            return None;
        }

        let patch = match (before.to_fields(), after.to_fields()) {
            (Ok(old), Ok(new)) => changed_fields(&old, &new),
            (Err(e), _) | (_, Err(e)) => {
                self.report("update", Some(id), &GatewayError::from(e));
                return None;
            }
        };
        if patch.is_empty() {
            return Some(after);
        }

        let seq = self.store.optimistic(Action::Patch(id.to_string(), patch.clone()));
        match self.gateway.update_record(T::COLLECTION, id, patch).await {
            Ok(()) => {
                self.store.settle(seq);
                Some(after)
            }
            Err(e) => {
                self.store.rollback(seq);
                self.report("update", Some(id), &e);
                None
            }
        }
    }

    /// Delete one record with everything it owns. Returns what went with it.
    pub async fn remove(&self, id: &str) -> Option<Cascade> {
        let Some(record) = self.store.get(id) else {
            log::debug!("Ignoring delete of missing {}/{}", T::COLLECTION, id);
            return None;
        };
        let cascade = Cascade::of(&record);

        let seq = self.store.optimistic(Action::Remove(id.to_string()));
        if let Err(e) = self.gateway.delete_record(T::COLLECTION, id).await {
            self.store.rollback(seq);
            self.report("delete", Some(id), &e);
            return None;
        }
        self.store.settle(seq);

        for path in &cascade.blobs {
            self.discard_blob(path).await;
        }
        log::info!(
            "Deleted {}/{} with {} owned items",
            T::COLLECTION,
            id,
            cascade.len()
        );
        Some(cascade)
    }

    /// Best-effort blob removal; failures only leave an orphaned object behind.
    pub(crate) async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.blobs.delete_object(path).await {
            log::warn!("Failed to delete blob {}: {}", path, e);
        }
    }

    pub(crate) fn report(&self, operation: &'static str, id: Option<&str>, error: &GatewayError) {
        log::error!(
            "{} {} failed{}: {}",
            T::COLLECTION,
            operation,
            id.map(|id| format!(" for {}", id)).unwrap_or_default(),
            error
        );
        // No receivers just means nobody is showing a banner.
        let _ = self.issues.send(SyncIssue {
            collection: T::COLLECTION,
            operation,
            record_id: id.map(str::to_string),
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
    }
}

impl<T: Record> Drop for Tracker<T> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn apply_snapshot<T: Record>(store: &CollectionStore<T>, snapshot: Snapshot) {
    let total = snapshot.documents.len();
    let records: Vec<T> = snapshot
        .documents
        .into_iter()
        .filter_map(|doc| match T::from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping document: {}", e);
                None
            }
        })
        .collect();
    log::debug!(
        "Snapshot of {}: {} of {} documents usable",
        snapshot.collection,
        records.len(),
        total
    );
    store.apply_snapshot(records);
}

/// All five views sharing one gateway, one blob store and one issue channel.
pub struct Trackers {
    pub projects: ProjectTracker,
    pub goals: GoalTracker,
    pub mood: MoodTracker,
    pub balance: BalanceTracker,
    pub todos: TodoTracker,
    issues: broadcast::Sender<SyncIssue>,
}

impl Trackers {
    pub fn new(gateway: Arc<dyn SyncGateway>, blobs: Arc<dyn BlobStore>) -> Self {
        let (issues, _) = broadcast::channel(ISSUE_CAPACITY);
        Self {
            projects: Tracker::new(gateway.clone(), blobs.clone(), issues.clone()),
            goals: Tracker::new(gateway.clone(), blobs.clone(), issues.clone()),
            mood: Tracker::new(gateway.clone(), blobs.clone(), issues.clone()),
            balance: Tracker::new(gateway.clone(), blobs.clone(), issues.clone()),
            todos: Tracker::new(gateway, blobs, issues.clone()),
            issues,
        }
    }

    /// Attach every view, logging the ones that fail. Returns how many attached.
    pub async fn attach_all(&self) -> usize {
        let results = [
            ("projects", self.projects.attach().await),
            ("goals", self.goals.attach().await),
            ("mood", self.mood.attach().await),
            ("balance", self.balance.attach().await),
            ("todos", self.todos.attach().await),
        ];
        let mut attached = 0;
        for (view, result) in results {
            match result {
                Ok(()) => attached += 1,
                Err(e) => log::error!("Failed to attach {} view: {}", view, e),
            }
        }
        attached
    }

    pub fn issues(&self) -> broadcast::Receiver<SyncIssue> {
        self.issues.subscribe()
    }
}
