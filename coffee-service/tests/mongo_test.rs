//! Round-trip against a real deployment. Run with
//! `MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored`.

use coffee_service::services::{CoffeeStore, MongoCoffeeStore};
use mongodb::bson::{doc, oid::ObjectId};
use secrecy::Secret;
use uuid::Uuid;

async fn connect() -> (MongoCoffeeStore, String) {
    dotenvy::dotenv().ok();
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = format!("coffee_test_{}", Uuid::new_v4().simple());

    let store = MongoCoffeeStore::connect(&Secret::new(uri), &db_name, "coffees")
        .await
        .expect("Failed to create MongoDB client");
    (store, db_name)
}

#[tokio::test]
#[ignore = "Requires a running MongoDB (MONGODB_URI, default mongodb://localhost:27017)"]
async fn mongo_store_round_trip() {
    let (store, db_name) = connect().await;
    store.ping().await.expect("MongoDB is not reachable");

    let id = store
        .insert_one(doc! { "name": "Latte", "price": 4 })
        .await
        .unwrap()
        .as_object_id()
        .expect("MongoDB should assign an ObjectId");

    let record = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(record.get_str("name").unwrap(), "Latte");

    let outcome = store.update_by_id(id, doc! { "price": 5 }).await.unwrap();
    assert_eq!((outcome.matched_count, outcome.modified_count), (1, 1));

    let record = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(record.get_i32("price").unwrap(), 5);
    assert_eq!(record.get_str("name").unwrap(), "Latte");

    let missing = ObjectId::new();
    let outcome = store
        .update_by_id(missing, doc! { "name": "Flat White" })
        .await
        .unwrap();
    assert_eq!(outcome.upserted_count, 1);
    assert_eq!(store.find_all().await.unwrap().len(), 2);

    assert_eq!(store.delete_by_id(id).await.unwrap().deleted_count, 1);
    assert_eq!(store.delete_by_id(id).await.unwrap().deleted_count, 0);
    assert!(store.find_by_id(id).await.unwrap().is_none());

    let _ = store.client().database(&db_name).drop(None).await;
    store.shutdown().await;
}
