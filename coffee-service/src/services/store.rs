//! Storage port for coffee records.

use crate::models::{DeleteOutcome, UpdateOutcome};
use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

/// The operations the HTTP layer needs from the document store.
///
/// Implementations own their connection state; handlers only ever see
/// `Arc<dyn CoffeeStore>`.
#[async_trait]
pub trait CoffeeStore: Send + Sync {
    /// Insert a new record and return the identifier the store assigned.
    /// `Bson::Null` means the write was acknowledged without an id.
    async fn insert_one(&self, fields: Document) -> Result<Bson>;

    /// Every record, in the order the store yields them.
    async fn find_all(&self) -> Result<Vec<Document>>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>>;

    /// `$set` the given fields on the record, creating it with this id when
    /// absent.
    async fn update_by_id(&self, id: ObjectId, fields: Document) -> Result<UpdateOutcome>;

    async fn delete_by_id(&self, id: ObjectId) -> Result<DeleteOutcome>;

    /// Round-trip to the store without touching records.
    async fn ping(&self) -> Result<()>;

    /// Release connections. Called once, after the server stops accepting requests.
    async fn shutdown(&self);
}
