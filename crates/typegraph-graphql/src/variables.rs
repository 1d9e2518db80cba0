//! Variable substitution.
//!
//! Documents reference variables as `$key` tokens. Before execution every
//! token whose key names a leaf of the variables object is replaced by the
//! leaf's literal form. Nested objects are descended into; their own keys are
//! never substituted, only the leaves below them.

use std::collections::HashMap;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::SessionError;

/// A `$` followed by a whole identifier.
const TOKEN_PATTERN: &str = r"\$([A-Za-z_][A-Za-z0-9_]*)";

/// Substitutes every `$key` token in `document`.
///
/// A token matches whole identifiers only: `$name` leaves `$names` alone.
/// The document is scanned once, so text inserted for one variable is never
/// substituted again: with `{"a": "$b", "b": 1}`, `$a` becomes `"$b"`. When
/// the same key appears at several depths, the first leaf in traversal
/// order wins. Tokens without a matching leaf are left as they are.
///
/// # Errors
///
/// Returns [`SessionError::Variables`] if `variables` is not an object.
pub fn substitute(document: &str, variables: &Value) -> Result<String, SessionError> {
    let Value::Object(map) = variables else {
        return Err(SessionError::Variables(format!(
            "expected an object of variables, got {}",
            kind(variables)
        )));
    };

    let mut literals = HashMap::new();
    collect_literals(map, &mut literals);
    if literals.is_empty() {
        return Ok(document.to_string());
    }

    let pattern = Regex::new(TOKEN_PATTERN).map_err(|e| SessionError::Variables(e.to_string()))?;
    let substituted = pattern.replace_all(document, |caps: &Captures<'_>| {
        match literals.get(&caps[1]) {
            Some(literal) => literal.clone(),
            None => caps[0].to_string(),
        }
    });
    Ok(substituted.into_owned())
}

/// Depth-first walk collecting the literal of every leaf by key.
fn collect_literals(map: &serde_json::Map<String, Value>, literals: &mut HashMap<String, String>) {
    for (key, value) in map {
        match value {
            Value::Object(nested) => collect_literals(nested, literals),
            leaf => {
                literals
                    .entry(key.clone())
                    .or_insert_with(|| to_literal(leaf));
            }
        }
    }
}

/// Renders a value as a document literal.
pub fn to_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // JSON string escapes are valid document string escapes
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(to_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", to_literal(v)))
                .collect();
            format!("{{ {} }}", fields.join(", "))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
