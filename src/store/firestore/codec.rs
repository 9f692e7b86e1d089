/*!
 * Conversion between plain JSON and Firestore's typed value format.
 *
 * Firestore's REST API wraps every value in a one-key object naming its
 * type, e.g. `{"stringValue": "hello"}` or
 * `{"mapValue": {"fields": {...}}}`. Integers travel as decimal strings.
 */

use serde_json::{json, Map, Number, Value};

use crate::errors::StoreError;
use crate::store::Fields;

/// Encode one JSON value as a Firestore value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode document fields as a Firestore `fields` object
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

/// Decode a Firestore `fields` object into plain JSON fields
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, StoreError> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}

/// Decode one Firestore value into plain JSON
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let typed = value
        .as_object()
        .and_then(|map| map.iter().next())
        .map(|(kind, raw)| (kind.as_str(), raw))
        .ok_or_else(|| StoreError::Serialization(format!("not a Firestore value: {}", value)))?;

    match typed {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| StoreError::Serialization(format!("bad integerValue '{}': {}", s, e))),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        // NaN and infinities arrive as strings and have no JSON form
        ("doubleValue", Value::String(s)) => Ok(s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)),
        ("stringValue" | "timestampValue" | "referenceValue" | "bytesValue", Value::String(s)) => {
            Ok(Value::String(s.clone()))
        }
        ("geoPointValue", point) => Ok(point.clone()),
        ("arrayValue", array) => {
            let values = match array.get("values") {
                Some(Value::Array(values)) => values,
                _ => return Ok(Value::Array(Vec::new())),
            };
            values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        ("mapValue", map) => match map.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            _ => Ok(Value::Object(Map::new())),
        },
        (kind, raw) => Err(StoreError::Serialization(format!(
            "unsupported Firestore value {}: {}",
            kind, raw
        ))),
    }
}
