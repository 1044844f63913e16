use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedSender};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use uuid::Uuid;

use super::{BlobStore, GatewayError, GatewayResult, Snapshot, SnapshotStream, SyncGateway};
use crate::core::record::{Document, Fields, RecordId, apply_patch};

struct Subscriber {
    order_field: String,
    tx: UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, BTreeMap<RecordId, Fields>>,
    subscribers: HashMap<String, Vec<Subscriber>>,
}

/// In-process document store used offline and in tests.
///
/// Every write pushes a fresh snapshot to each live subscriber of the touched
/// collection. Writes can be made to fail with `set_fail_writes`.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// Documents currently stored in `collection`, ordered by `order_field`.
    pub fn documents(&self, collection: &str, order_field: &str) -> Vec<Document> {
        match self.state.lock() {
            Ok(state) => ordered(state.collections.get(collection), order_field),
            Err(_) => Vec::new(),
        }
    }

    fn check_writable(&self, op: &str) -> GatewayResult<()> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(GatewayError::Unavailable(format!("{} rejected", op)));
        }
        Ok(())
    }

    fn write<T>(
        &self,
        collection: &str,
        apply: impl FnOnce(&mut BTreeMap<RecordId, Fields>) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| GatewayError::Unavailable("memory store poisoned".into()))?;
        let docs = state.collections.entry(collection.to_string()).or_default();
        let out = apply(docs)?;
        notify(&mut state, collection);
        Ok(out)
    }
}

fn notify(state: &mut State, collection: &str) {
    let State {
        collections,
        subscribers,
    } = state;
    if let Some(subs) = subscribers.get_mut(collection) {
        let docs = collections.get(collection);
        subs.retain(|sub| {
            let snapshot = Snapshot {
                collection: collection.to_string(),
                documents: ordered(docs, &sub.order_field),
            };
            sub.tx.unbounded_send(snapshot).is_ok()
        });
    }
}

fn ordered(docs: Option<&BTreeMap<RecordId, Fields>>, order_field: &str) -> Vec<Document> {
    let mut out: Vec<Document> = docs
        .map(|docs| {
            docs.iter()
                .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                .collect()
        })
        .unwrap_or_default();
    out.sort_by(|a, b| compare_values(a.fields.get(order_field), b.fields.get(order_field)));
    out
}

/// Missing and null sort first, then numbers, then strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[async_trait]
impl SyncGateway for MemoryGateway {
    async fn subscribe(
        &self,
        collection: &str,
        order_field: &str,
    ) -> GatewayResult<SnapshotStream> {
        let (tx, rx) = mpsc::unbounded();
        let mut state = self
            .state
            .lock()
            .map_err(|_| GatewayError::Unavailable("memory store poisoned".into()))?;
        let initial = Snapshot {
            collection: collection.to_string(),
            documents: ordered(state.collections.get(collection), order_field),
        };
        // Receiver is alive, the send cannot fail.
        let _ = tx.unbounded_send(initial);
        state
            .subscribers
            .entry(collection.to_string())
            .or_default()
            .push(Subscriber {
                order_field: order_field.to_string(),
                tx,
            });
        log::debug!("memory gateway: subscribed to {} by {}", collection, order_field);
        Ok(rx.boxed())
    }

    async fn add_record(&self, collection: &str, fields: Fields) -> GatewayResult<RecordId> {
        self.check_writable("add")?;
        let id = Uuid::new_v4().simple().to_string();
        let doc_id = id.clone();
        self.write(collection, move |docs| {
            docs.insert(doc_id, fields);
            Ok(())
        })?;
        Ok(id)
    }

    async fn update_record(&self, collection: &str, id: &str, fields: Fields) -> GatewayResult<()> {
        self.check_writable("update")?;
        self.write(collection, |docs| {
            let doc = docs.get_mut(id).ok_or_else(|| GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            apply_patch(doc, &fields);
            Ok(())
        })
    }

    async fn delete_record(&self, collection: &str, id: &str) -> GatewayResult<()> {
        self.check_writable("delete")?;
        self.write(collection, |docs| {
            docs.remove(id).map(|_| ()).ok_or_else(|| GatewayError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
        })
    }
}

/// In-process blob store handing out `memory://` URLs.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_object(&self, path: &str, bytes: Vec<u8>) -> GatewayResult<()> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(GatewayError::Unavailable("put rejected".into()));
        }
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| GatewayError::Unavailable("blob store poisoned".into()))?;
        objects.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn object_url(&self, path: &str) -> GatewayResult<String> {
        if self.contains(path) {
            Ok(format!("memory://{}", path))
        } else {
            Err(GatewayError::NotFound {
                collection: "blobs".into(),
                id: path.to_string(),
            })
        }
    }

    async fn delete_object(&self, path: &str) -> GatewayResult<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| GatewayError::Unavailable("blob store poisoned".into()))?;
        objects.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn subscriber_sees_initial_and_following_snapshots() {
        let gw = MemoryGateway::new();
        gw.add_record("goals", fields(json!({"name": "b", "order": 1})))
            .await
            .unwrap();

        let mut stream = gw.subscribe("goals", "order").await.unwrap();
        let first = stream.next().await.unwrap();
        assert_eq!(first.documents.len(), 1);

        gw.add_record("goals", fields(json!({"name": "a", "order": 0})))
            .await
            .unwrap();
        let second = stream.next().await.unwrap();
        let names: Vec<_> = second.documents.iter().map(|d| d.fields["name"].clone()).collect();
        assert_eq!(names, vec![json!("a"), json!("b")]);
    }

    #[tokio::test]
    async fn update_merges_and_null_clears() {
        let gw = MemoryGateway::new();
        let id = gw
            .add_record("projects", fields(json!({"name": "p", "image": "x"})))
            .await
            .unwrap();
        gw.update_record("projects", &id, fields(json!({"name": "q", "image": null})))
            .await
            .unwrap();
        let docs = gw.documents("projects", "name");
        assert_eq!(docs[0].fields, fields(json!({"name": "q"})));
    }

    #[tokio::test]
    async fn missing_and_failing_writes() {
        let gw = MemoryGateway::new();
        let err = gw.delete_record("goals", "nope").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));

        gw.set_fail_writes(true);
        let err = gw.add_record("goals", Fields::new()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(gw.documents("goals", "order").is_empty());
    }
}
