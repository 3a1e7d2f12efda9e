use crate::models::{DeleteOutcome, UpdateOutcome};
use crate::services::store::CoffeeStore;
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local `CoffeeStore` keeping records in insertion order.
///
/// Used with `STORAGE_BACKEND=memory` and by the HTTP tests. Mirrors the
/// MongoDB semantics the service relies on: `_id` assignment, `$set` merges,
/// upserts and single-document deletes.
#[derive(Default)]
pub struct InMemoryCoffeeStore {
    records: Mutex<Vec<Document>>,
    offline: AtomicBool,
}

impl InMemoryCoffeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as an unreachable deployment would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> anyhow::Result<MutexGuard<'_, Vec<Document>>> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("server selection timeout: no available servers");
        }
        self.records
            .lock()
            .map_err(|e| anyhow!("In-memory store mutex poisoned: {}", e))
    }
}

fn has_id(record: &Document, id: &Bson) -> bool {
    record.get("_id") == Some(id)
}

fn with_id(id: Bson, fields: Document) -> Document {
    let mut record = Document::new();
    record.insert("_id", id);
    for (field, value) in fields {
        record.insert(field, value);
    }
    record
}

#[async_trait]
impl CoffeeStore for InMemoryCoffeeStore {
    async fn insert_one(&self, mut fields: Document) -> anyhow::Result<Bson> {
        let mut records = self.records()?;

        let id = fields
            .remove("_id")
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
        if records.iter().any(|record| has_id(record, &id)) {
            bail!("E11000 duplicate key error collection: coffees index: _id_ dup key: {{ _id: {} }}", id);
        }

        records.push(with_id(id.clone(), fields));

        Ok(id)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Document>> {
        Ok(self.records()?.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<Document>> {
        let id = Bson::ObjectId(id);
        Ok(self
            .records()?
            .iter()
            .find(|record| has_id(record, &id))
            .cloned())
    }

    async fn update_by_id(&self, id: ObjectId, fields: Document) -> anyhow::Result<UpdateOutcome> {
        let mut records = self.records()?;
        let key = Bson::ObjectId(id);

        if fields.get("_id").is_some_and(|value| value != &key) {
            bail!("Performing an update on the path '_id' would modify the immutable field '_id'");
        }

        match records.iter().position(|record| has_id(record, &key)) {
            Some(index) => {
                let record = &mut records[index];
                let mut modified = false;
                for (field, value) in fields {
                    if record.get(&field) != Some(&value) {
                        record.insert(field, value);
                        modified = true;
                    }
                }
                Ok(UpdateOutcome::new(1, u64::from(modified), None))
            }
            None => {
                records.push(with_id(key.clone(), fields));
                Ok(UpdateOutcome::new(0, 0, Some(key)))
            }
        }
    }

    async fn delete_by_id(&self, id: ObjectId) -> anyhow::Result<DeleteOutcome> {
        let mut records = self.records()?;
        let id = Bson::ObjectId(id);

        match records.iter().position(|record| has_id(record, &id)) {
            Some(index) => {
                records.remove(index);
                Ok(DeleteOutcome::new(1))
            }
            None => Ok(DeleteOutcome::new(0)),
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.records().map(|_| ())
    }

    async fn shutdown(&self) {}
}
