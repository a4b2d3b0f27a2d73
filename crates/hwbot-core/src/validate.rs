//! Schema check for the homework-statuses response.
//!
//! The API answers with
//! `{"homeworks": [{"homework_name": …, "status": …, …}, …], "current_date": …}`,
//! newest homework first. Validation is strict: every field the loop reads is
//! checked for presence and type, and each failure maps to one
//! [`WatchError`] kind.

use serde_json::{Map, Value};

use crate::error::{Result, WatchError};
use crate::types::TrackedRecord;

pub const RECORDS_KEY: &str = "homeworks";
pub const CURSOR_KEY: &str = "current_date";

/// Return the newest record of a poll response.
pub fn check_response(response: &Value) -> Result<TrackedRecord> {
    tracing::debug!("checking API response");

    let body = match response {
        Value::Null => {
            return Err(WatchError::InvalidResponse("response body is null".into()));
        }
        Value::Object(map) if map.is_empty() => {
            return Err(WatchError::InvalidResponse(
                "response body is an empty object".into(),
            ));
        }
        Value::Object(map) => map,
        other => {
            return Err(WatchError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                kind(other)
            )));
        }
    };

    let records = match body.get(RECORDS_KEY) {
        None => return Err(WatchError::MissingField(RECORDS_KEY.into())),
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(WatchError::InvalidResponse(format!(
                "'{RECORDS_KEY}' should be an array, got {}",
                kind(other)
            )));
        }
    };

    let first = records
        .first()
        .ok_or_else(|| WatchError::MissingField(format!("{RECORDS_KEY}[0]")))?;
    let Value::Object(record) = first else {
        return Err(WatchError::InvalidResponse(format!(
            "'{RECORDS_KEY}[0]' should be an object, got {}",
            kind(first)
        )));
    };

    Ok(TrackedRecord {
        id: string_field(record, "homework_name")?,
        status: string_field(record, "status")?,
    })
}

/// The server-side timestamp to poll from next, when the response has one.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get(CURSOR_KEY).and_then(Value::as_i64)
}

fn string_field(record: &Map<String, Value>, key: &str) -> Result<String> {
    match record.get(key) {
        None => Err(WatchError::MissingField(format!("{RECORDS_KEY}[0].{key}"))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(WatchError::InvalidResponse(format!(
            "'{RECORDS_KEY}[0].{key}' should be a string, got {}",
            kind(other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
