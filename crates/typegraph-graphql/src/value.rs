//! Conversions between resolver JSON values and engine values.

use async_graphql::dynamic::{FieldValue, ResolverContext};
use async_graphql::{Name, Number, Value};

/// Converts a `serde_json::Value` returned by a resolver to an engine value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}

/// Parses an input field default.
///
/// Defaults are written as JSON literals (`"1"`, `"true"`, `"\"x\""`); text
/// that is not valid JSON is kept as a string.
pub(crate) fn parse_default_value(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json_to_graphql_value(json),
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Wraps an engine value as a field result.
///
/// Lists become engine lists element by element so object elements are
/// resolved through their own field resolvers. `Null` resolves to no value.
pub(crate) fn to_field_value<'a>(value: Value) -> Option<FieldValue<'a>> {
    match value {
        Value::Null => None,
        Value::List(items) => Some(FieldValue::list(
            items
                .into_iter()
                .map(|item| to_field_value(item).unwrap_or_else(|| FieldValue::value(Value::Null))),
        )),
        other => Some(FieldValue::value(other)),
    }
}

/// Reads a key of the parent object value.
pub(crate) fn extract_field(ctx: &ResolverContext<'_>, field_name: &str) -> Option<Value> {
    if let Some(Value::Object(obj)) = ctx.parent_value.as_value()
        && let Some(value) = obj.get(field_name)
    {
        return Some(value.clone());
    }
    None
}
