#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use coffee_service::services::{CoffeeStore, InMemoryCoffeeStore};
use coffee_service::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router over a fresh in-memory store; requests go through `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryCoffeeStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryCoffeeStore::new());
        let router = build_router(AppState::new(store.clone() as Arc<dyn CoffeeStore>));
        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed to respond")
    }

    /// Send a request and decode the response body as JSON.
    /// Non-JSON bodies come back as a JSON string, empty ones as null.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Create a coffee and return its id.
    pub async fn create(&self, body: Value) -> String {
        let (status, body) = self.post("/coffees", body).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
        body["id"]
            .as_str()
            .expect("id should be a string")
            .to_string()
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}
