//! # Query Formatting
//!
//! Turns a `UserInput` into the text that is embedded for retrieval and shown
//! to the model as the requester's profile.

use crate::types::UserInput;
use serde_json::{Map, Value};

const QUERY_HEADER: &str = "User profile:";

/// Formats the requester's profile as a retrieval query.
///
/// The output is a header followed by one `- key: value` line per field in key
/// order. Nested objects are flattened into dotted keys so no field is lost.
pub fn format_user_input_as_query(user_input: &UserInput) -> String {
    let mut lines = vec![QUERY_HEADER.to_string()];
    push_fields(&mut lines, None, user_input.fields());
    lines.join("\n")
}

fn push_fields(lines: &mut Vec<String>, prefix: Option<&str>, fields: &Map<String, Value>) {
    // Sorted explicitly so the query does not depend on the map's iteration order.
    let mut entries: Vec<_> = fields.iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (key, value) in entries {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => {
                push_fields(lines, Some(key.as_str()), nested)
            }
            _ => lines.push(format!("- {key}: {}", render_value(value))),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "not specified".to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) if items.is_empty() => "none".to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) if map.is_empty() => "none".to_string(),
        other => other.to_string(),
    }
}
