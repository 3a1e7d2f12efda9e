//! CRUD handlers for `/coffees`.
//!
//! Each handler performs exactly one store call. Failures carry a fixed
//! message per route and expose the underlying error text.

use crate::dtos::{CreatedResponse, DeletedResponse};
use crate::models::{bson_to_json, document_to_json, fields_from_json, UpdateOutcome};
use crate::services::record_operation;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::{oid::ObjectId, Bson};
use serde_json::{Map, Value};
use service_core::error::AppError;

const NOT_FOUND: &str = "Item not found";

/// Map a failed step of `operation` to a 500 carrying `message`.
fn failure(operation: &str, message: &str, err: impl Into<anyhow::Error>) -> AppError {
    record_operation(operation, "error");
    AppError::database(message, err)
}

/// Malformed identifiers fail like any other storage error, before a query.
fn parse_id(operation: &str, message: &str, raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|e| failure(operation, message, e))
}

/// A body sent without a JSON content type counts as `{}`. Malformed JSON is
/// a 400 with the parser's message.
fn request_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Object(Map::new())),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

pub async fn create_coffee(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    const FAILED: &str = "Item has not been created";

    let body = request_body(body)?;
    let fields = fields_from_json(body).map_err(|e| failure("create", FAILED, e))?;

    let id = state
        .store
        .insert_one(fields)
        .await
        .map_err(|e| failure("create", FAILED, e))?;

    if id == Bson::Null {
        return Err(failure(
            "create",
            FAILED,
            anyhow::anyhow!("storage did not return an identifier"),
        ));
    }

    tracing::info!(coffee_id = %id, "Coffee created");
    record_operation("create", "created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Item created",
            id: bson_to_json(id),
        }),
    ))
}

pub async fn list_coffees(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let coffees = state
        .store
        .find_all()
        .await
        .map_err(|e| failure("list", "Not Found", e))?;

    tracing::debug!(count = coffees.len(), "Listed coffees");
    record_operation("list", "ok");

    Ok(Json(Value::Array(
        coffees.into_iter().map(document_to_json).collect(),
    )))
}

pub async fn get_coffee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    const FAILED: &str = "Failed to retrieve item";

    let id = parse_id("get", FAILED, &id)?;

    let coffee = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| failure("get", FAILED, e))?;

    match coffee {
        Some(coffee) => {
            record_operation("get", "ok");
            Ok(Json(document_to_json(coffee)))
        }
        None => {
            tracing::debug!(coffee_id = %id, "Coffee not found");
            record_operation("get", "not_found");
            Err(AppError::not_found(NOT_FOUND))
        }
    }
}

/// `$set` the body's fields, creating the record under this id if needed.
/// Responds with the store's update report rather than the record.
pub async fn update_coffee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateOutcome>, AppError> {
    const FAILED: &str = "Failed to update";

    let body = request_body(body)?;
    let id = parse_id("update", FAILED, &id)?;
    let fields = fields_from_json(body).map_err(|e| failure("update", FAILED, e))?;

    let outcome = state
        .store
        .update_by_id(id, fields)
        .await
        .map_err(|e| failure("update", FAILED, e))?;

    tracing::info!(
        coffee_id = %id,
        matched = outcome.matched_count,
        modified = outcome.modified_count,
        upserted = outcome.upserted_count,
        "Coffee updated"
    );
    record_operation(
        "update",
        if outcome.upserted_count > 0 { "upserted" } else { "ok" },
    );

    Ok(Json(outcome))
}

pub async fn delete_coffee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    const FAILED: &str = "Item has not been deleted";

    let id = parse_id("delete", FAILED, &id)?;

    let outcome = state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| failure("delete", FAILED, e))?;

    if outcome.deleted_count != 1 {
        record_operation("delete", "not_found");
        return Err(AppError::not_found(NOT_FOUND));
    }

    tracing::info!(coffee_id = %id, "Coffee deleted");
    record_operation("delete", "ok");

    Ok(Json(DeletedResponse {
        message: "Item deleted",
        result: outcome,
    }))
}
