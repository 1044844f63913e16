pub mod blob;
pub mod error;
pub mod keyring;
pub mod memory;
pub mod rest;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::record::{Document, Fields, RecordId};

pub use error::{GatewayError, GatewayResult};

/// The full contents of one collection at a point in time, in the order the
/// subscription asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

pub type SnapshotStream = BoxStream<'static, Snapshot>;

/// Live document store: full-collection snapshots in, whole-path writes out.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Stream of snapshots for `collection`, ordered by `order_field`. The first
    /// item is the current state.
    async fn subscribe(&self, collection: &str, order_field: &str) -> GatewayResult<SnapshotStream>;

    /// Store a new document and return its generated id.
    async fn add_record(&self, collection: &str, fields: Fields) -> GatewayResult<RecordId>;

    /// Replace the given top-level fields of one document. `null` clears a field.
    async fn update_record(&self, collection: &str, id: &str, fields: Fields) -> GatewayResult<()>;

    async fn delete_record(&self, collection: &str, id: &str) -> GatewayResult<()>;
}

/// Binary object storage for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_object(&self, path: &str, bytes: Vec<u8>) -> GatewayResult<()>;
    async fn object_url(&self, path: &str) -> GatewayResult<String>;
    async fn delete_object(&self, path: &str) -> GatewayResult<()>;
}
