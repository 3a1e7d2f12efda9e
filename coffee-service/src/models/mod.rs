pub mod coffee;

pub use coffee::{
    bson_to_json, document_to_json, fields_from_json, BodyError, DeleteOutcome, UpdateOutcome,
};
