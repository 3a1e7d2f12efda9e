use crate::models::{DeleteOutcome, UpdateOutcome};
use crate::services::store::CoffeeStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{ClientOptions, UpdateOptions},
    Client as MongoClient, Collection,
};
use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;

/// `CoffeeStore` backed by one MongoDB collection.
///
/// The client is created once at startup and cloned into every request; the
/// driver pools connections behind it.
#[derive(Clone)]
pub struct MongoCoffeeStore {
    client: MongoClient,
    coffees: Collection<Document>,
}

impl MongoCoffeeStore {
    /// Parse the connection string and build the client.
    ///
    /// This does not wait for the deployment to answer; call [`CoffeeStore::ping`]
    /// for that.
    pub async fn connect(
        uri: &Secret<String>,
        database: &str,
        collection: &str,
    ) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::ConfigError(anyhow::Error::new(e))
            })?;
        options.app_name = Some("coffee-service".to_string());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let coffees = client.database(database).collection(collection);
        tracing::info!(
            database = %database,
            collection = %collection,
            "MongoDB client created"
        );

        Ok(Self { client, coffees })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl CoffeeStore for MongoCoffeeStore {
    async fn insert_one(&self, fields: Document) -> anyhow::Result<Bson> {
        let result = self.coffees.insert_one(fields, None).await?;
        Ok(result.inserted_id)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Document>> {
        let cursor = self.coffees.find(None, None).await?;
        let coffees: Vec<Document> = cursor.try_collect().await?;
        Ok(coffees)
    }

    async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<Document>> {
        Ok(self.coffees.find_one(doc! { "_id": id }, None).await?)
    }

    async fn update_by_id(&self, id: ObjectId, fields: Document) -> anyhow::Result<UpdateOutcome> {
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .coffees
            .update_one(doc! { "_id": id }, doc! { "$set": fields }, options)
            .await?;

        Ok(UpdateOutcome::new(
            result.matched_count,
            result.modified_count,
            result.upserted_id,
        ))
    }

    async fn delete_by_id(&self, id: ObjectId) -> anyhow::Result<DeleteOutcome> {
        let result = self.coffees.delete_one(doc! { "_id": id }, None).await?;
        Ok(DeleteOutcome::new(result.deleted_count))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}
