//! Response bodies for the coffee routes.

use crate::models::DeleteOutcome;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    /// The identifier the store assigned, rendered like `_id` in records.
    pub id: Value,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub result: DeleteOutcome,
}
