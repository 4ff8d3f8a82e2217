//! Decoding of store `_source` objects into typed posts.
//!
//! The store hands back documents as untyped JSON maps. [`decode_post`] walks
//! the known fields and coerces them into a [`Post`]:
//!
//! - `id` must be a string holding a canonical UUID
//! - `title` must be a string
//! - `done` must be a boolean; absent means `false`
//! - `created` and `updated` accept either an RFC 3339 string or a number of
//!   milliseconds since the Unix epoch (integer or floating point; fractional
//!   milliseconds are truncated)
//! - `updated` may be absent or `null`
//! - unknown fields are ignored
//!
//! Missing required fields (`id`, `title`, `created`) are errors rather than
//! zero values, and a field of the wrong JSON type is reported separately from
//! a field whose value fails to parse.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::DecodeError;
use crate::types::Post;

/// Decodes one `_source` object into a post.
///
/// # Examples
///
/// ```
/// use esposts_persistence::decode::decode_post;
/// use serde_json::json;
///
/// let source = json!({
///     "id": "6f1c2b1e-7c34-4a51-9a8e-0c6d2c4b9f10",
///     "title": "hello",
///     "done": true,
///     "created": 1700000000000_i64,
///     "extra": "ignored"
/// });
/// let post = decode_post(source.as_object().unwrap()).unwrap();
/// assert_eq!(post.title, "hello");
/// assert!(post.done);
/// assert!(post.updated.is_none());
/// ```
pub fn decode_post(source: &Map<String, Value>) -> Result<Post, DecodeError> {
    let id = decode_uuid("id", required(source, "id")?)?;
    let title = decode_string("title", required(source, "title")?)?;
    let done = match optional(source, "done") {
        Some(value) => decode_bool("done", value)?,
        None => false,
    };
    let created = decode_timestamp("created", required(source, "created")?)?;
    let updated = optional(source, "updated")
        .map(|value| decode_timestamp("updated", value))
        .transpose()?;

    Ok(Post {
        id,
        title,
        done,
        created,
        updated,
    })
}

fn optional<'a>(source: &'a Map<String, Value>, field: &'static str) -> Option<&'a Value> {
    source.get(field).filter(|v| !v.is_null())
}

fn required<'a>(
    source: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, DecodeError> {
    optional(source, field).ok_or(DecodeError::MissingField { field })
}

fn decode_string(field: &'static str, value: &Value) -> Result<String, DecodeError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_type(field, "string", value))
}

fn decode_bool(field: &'static str, value: &Value) -> Result<bool, DecodeError> {
    value
        .as_bool()
        .ok_or_else(|| invalid_type(field, "boolean", value))
}

fn decode_uuid(field: &'static str, value: &Value) -> Result<Uuid, DecodeError> {
    let raw = value
        .as_str()
        .ok_or_else(|| invalid_type(field, "UUID string", value))?;
    Uuid::parse_str(raw).map_err(|e| DecodeError::InvalidValue {
        field,
        reason: format!("'{}' is not a valid UUID: {}", raw, e),
    })
}

/// Decodes a timestamp from an RFC 3339 string or epoch milliseconds.
pub(crate) fn decode_timestamp(
    field: &'static str,
    value: &Value,
) -> Result<DateTime<Utc>, DecodeError> {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DecodeError::InvalidValue {
                field,
                reason: format!("'{}' is not an RFC 3339 timestamp: {}", raw, e),
            }),
        Value::Number(number) => {
            let millis = if let Some(i) = number.as_i64() {
                i
            } else if let Some(f) = number.as_f64() {
                // u64 beyond i64::MAX lands here too and fails the range check below
                if !f.is_finite() || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                    return Err(out_of_range(field, number));
                }
                f.trunc() as i64
            } else {
                return Err(out_of_range(field, number));
            };
            DateTime::from_timestamp_millis(millis).ok_or_else(|| out_of_range(field, number))
        }
        other => Err(invalid_type(
            field,
            "RFC 3339 string or epoch milliseconds",
            other,
        )),
    }
}

fn out_of_range(field: &'static str, number: &serde_json::Number) -> DecodeError {
    DecodeError::InvalidValue {
        field,
        reason: format!("{} is out of range for epoch milliseconds", number),
    }
}

fn invalid_type(field: &'static str, expected: &'static str, value: &Value) -> DecodeError {
    DecodeError::InvalidType {
        field,
        expected,
        found: json_type_name(value),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
