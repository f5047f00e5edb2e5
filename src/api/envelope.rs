//! Response envelope decoding and payload shape normalization.
//!
//! Every endpoint answers `{ code, message, error, data }`. The `data` payload of a
//! range request comes in several shapes, all folded into `Vec<Record>` here:
//!
//! - a direct array of records (or of bare contents)
//! - an object with book metadata and a `hadiths` array of bare contents
//! - the legacy object whose `hadiths` array holds full records

use serde::Deserialize;
use serde_json::{Map, Value};

use super::models::{Collection, Record, RecordContent};
use crate::error::SearchError;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub data: Value,
}

impl ApiEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<Self, SearchError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Payload of a successful envelope, or the remote's own error message
    pub fn into_data(self) -> Result<Value, SearchError> {
        if self.error {
            let message = if self.message.is_empty() {
                format!("remote reported an error (code {:?})", self.code)
            } else {
                self.message
            };
            return Err(SearchError::RemoteReported(message));
        }
        Ok(self.data)
    }
}

pub fn decode_collections(data: Value) -> Result<Vec<Collection>, SearchError> {
    match data {
        Value::Array(_) => Ok(serde_json::from_value(data)?),
        other => Err(SearchError::MalformedResponse(format!(
            "expected a list of books, got {}",
            kind_of(&other)
        ))),
    }
}

/// Decode a single-record payload, falling back to `collection_id` for missing metadata
pub fn decode_record(data: Value, collection_id: &str) -> Result<Record, SearchError> {
    let fallback = Collection::new(collection_id, collection_id, 0);
    match data {
        Value::Object(obj) if obj.contains_key("contents") => record_from_object(obj, &fallback),
        other => Err(SearchError::MalformedResponse(format!(
            "expected a record object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Decode a range payload. `collection` supplies metadata the payload leaves out.
pub fn decode_range(data: Value, collection: &Collection) -> Result<Vec<Record>, SearchError> {
    match data {
        Value::Array(items) => decode_items(items, collection),
        Value::Object(mut obj) => match obj.remove("hadiths") {
            Some(Value::Array(items)) => {
                let meta = merge_collection(&obj, collection);
                decode_items(items, &meta)
            }
            Some(other) => Err(SearchError::MalformedResponse(format!(
                "expected `hadiths` to be a list, got {}",
                kind_of(&other)
            ))),
            None if obj.contains_key("contents") => {
                Ok(vec![record_from_object(obj, collection)?])
            }
            None => Err(SearchError::MalformedResponse(
                "range payload has neither `hadiths` nor `contents`".to_string(),
            )),
        },
        other => Err(SearchError::MalformedResponse(format!(
            "unrecognized range payload: {}",
            kind_of(&other)
        ))),
    }
}

fn decode_items(items: Vec<Value>, meta: &Collection) -> Result<Vec<Record>, SearchError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(obj) if obj.contains_key("contents") => record_from_object(obj, meta),
            Value::Object(obj) => {
                let contents: RecordContent = serde_json::from_value(Value::Object(obj))?;
                Ok(Record::new(meta.clone(), contents))
            }
            other => Err(SearchError::MalformedResponse(format!(
                "expected a record, got {}",
                kind_of(&other)
            ))),
        })
        .collect()
}

fn record_from_object(mut obj: Map<String, Value>, fallback: &Collection) -> Result<Record, SearchError> {
    let contents = obj.remove("contents").unwrap_or(Value::Null);
    let contents: RecordContent = serde_json::from_value(contents)?;
    Ok(Record::new(merge_collection(&obj, fallback), contents))
}

/// Book metadata from `obj`, field by field, defaulting to `fallback`
fn merge_collection(obj: &Map<String, Value>, fallback: &Collection) -> Collection {
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    Collection {
        id: text("id").unwrap_or_else(|| fallback.id.clone()),
        name: text("name").unwrap_or_else(|| fallback.name.clone()),
        available_count: obj
            .get("available")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(fallback.available_count),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
