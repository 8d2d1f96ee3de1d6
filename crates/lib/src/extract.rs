//! # Candidate and Identifier Extraction
//!
//! Best-effort filters over untrusted data. Each function keeps the items it
//! can use, in input order, and logs the ones it has to drop.

use crate::{
    errors::RagError,
    types::{CandidateRecord, RetrievedDocument},
};
use serde_json::Value;
use tracing::{debug, warn};

/// The field that carries a scholarship's identifier.
pub const SCHOLARSHIP_ID_FIELD: &str = "scholarship_id";

/// Parses every retrieved document whose text is a JSON object.
///
/// Documents holding arrays, scalars, broken JSON or plain prose are skipped.
/// A skipped document never fails the request.
pub fn extract_candidate_records(documents: &[RetrievedDocument]) -> Vec<CandidateRecord> {
    documents
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| {
            let content = doc.content.trim();
            if !(content.starts_with('{') && content.ends_with('}')) {
                debug!(index, "Skipping retrieved document that is not a JSON object.");
                return None;
            }
            match serde_json::from_str::<CandidateRecord>(content) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Failed to parse retrieved document, skipping.");
                    None
                }
            }
        })
        .collect()
}

/// Serializes candidates the way the chain expects them: pretty-printed with
/// non-ASCII text left as is.
pub fn serialize_candidates(candidates: &[CandidateRecord]) -> Result<String, RagError> {
    Ok(serde_json::to_string_pretty(candidates)?)
}

/// Coerces a `scholarship_id` value to an integer.
///
/// Accepts integers, floats without a fractional part and strings holding a
/// base-10 integer. Everything else yields `None`.
pub fn coerce_scholarship_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            if n.is_u64() {
                return None;
            }
            n.as_f64().and_then(float_to_i64)
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // `i64::MAX as f64` rounds up to 2^63, hence the strict upper bound.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Collects the scholarship identifiers from the model's selection.
pub fn extract_scholarship_ids(items: &[Value]) -> Vec<i64> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let id = item
                .as_object()
                .and_then(|obj| obj.get(SCHOLARSHIP_ID_FIELD))
                .and_then(coerce_scholarship_id);
            if id.is_none() {
                debug!(index, item = %item, "Dropping recommendation without a usable scholarship_id.");
            }
            id
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docs(contents: &[&str]) -> Vec<RetrievedDocument> {
        contents.iter().map(|c| RetrievedDocument::new(*c)).collect()
    }

    #[test]
    fn test_non_object_documents_yield_nothing() {
        let documents = docs(&[
            "plain text about a scholarship",
            "[1, 2, 3]",
            "42",
            "\"quoted\"",
            "{ broken",
            "",
        ]);
        assert!(extract_candidate_records(&documents).is_empty());
    }

    #[test]
    fn test_objects_are_kept_in_order() {
        let documents = docs(&[
            r#"{"scholarship_id": 1, "name": "A"}"#,
            "not json",
            r#"[{"scholarship_id": 9}]"#,
            "  \n{\"scholarship_id\": 2}\t ",
            r#"{"scholarship_id": 1, "name": "A"}"#,
            r#"{"unterminated": }"#,
        ]);

        let records = extract_candidate_records(&documents);
        let values: Vec<Value> = records.into_iter().map(Value::Object).collect();
        assert_eq!(
            values,
            vec![
                json!({"scholarship_id": 1, "name": "A"}),
                json!({"scholarship_id": 2}),
                json!({"scholarship_id": 1, "name": "A"}),
            ]
        );
    }

    #[test]
    fn test_braced_but_not_an_object_is_skipped() {
        // Starts and ends with braces but is two objects, not one.
        let documents = docs(&[r#"{"a": 1} {"b": 2}"#]);
        assert!(extract_candidate_records(&documents).is_empty());
    }

    #[test]
    fn test_serialized_candidates_parse_back_unchanged() {
        let documents = docs(&[
            r#"{"scholarship_id": 3, "name": "국가장학금", "tags": ["저소득", "이공계"]}"#,
            r#"{"scholarship_id": "4", "amount": 1.5, "nested": {"ok": true}}"#,
        ]);
        let records = extract_candidate_records(&documents);

        let text = serialize_candidates(&records).unwrap();
        assert!(text.contains("국가장학금"), "non-ASCII must not be escaped");
        assert!(text.contains("\n  {"), "output must be pretty-printed");

        let parsed: Vec<CandidateRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_field_order_survives_extraction_and_serialization() {
        let documents = docs(&[r#"{"scholarship_id":1,"name":"국가장학금","amount":3}"#]);
        let records = extract_candidate_records(&documents);

        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["scholarship_id", "name", "amount"]);

        let text = serialize_candidates(&records).unwrap();
        let id_at = text.find("\"scholarship_id\"").unwrap();
        let name_at = text.find("\"name\"").unwrap();
        let amount_at = text.find("\"amount\"").unwrap();
        assert!(id_at < name_at && name_at < amount_at, "{text}");
    }

    #[test]
    fn test_empty_candidates_serialize_to_empty_array() {
        assert_eq!(serialize_candidates(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_coerce_scholarship_id() {
        assert_eq!(coerce_scholarship_id(&json!(7)), Some(7));
        assert_eq!(coerce_scholarship_id(&json!(-3)), Some(-3));
        assert_eq!(coerce_scholarship_id(&json!("5")), Some(5));
        assert_eq!(coerce_scholarship_id(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_scholarship_id(&json!("+8")), Some(8));
        assert_eq!(coerce_scholarship_id(&json!(9.0)), Some(9));

        assert_eq!(coerce_scholarship_id(&json!("abc")), None);
        assert_eq!(coerce_scholarship_id(&json!("5.0")), None);
        assert_eq!(coerce_scholarship_id(&json!("")), None);
        assert_eq!(coerce_scholarship_id(&json!(9.5)), None);
        assert_eq!(coerce_scholarship_id(&json!(u64::MAX)), None);
        assert_eq!(coerce_scholarship_id(&json!(1e300)), None);
        assert_eq!(coerce_scholarship_id(&json!(true)), None);
        assert_eq!(coerce_scholarship_id(&Value::Null), None);
        assert_eq!(coerce_scholarship_id(&json!([1])), None);
        assert_eq!(coerce_scholarship_id(&json!({"id": 1})), None);
    }

    #[test]
    fn test_extract_scholarship_ids_drops_unusable_items() {
        let items = vec![
            json!({"scholarship_id": "5"}),
            json!({"scholarship_id": "abc"}),
            json!({"name": "x"}),
            json!({"scholarship_id": 7}),
        ];
        assert_eq!(extract_scholarship_ids(&items), vec![5, 7]);
    }

    #[test]
    fn test_extract_scholarship_ids_ignores_non_objects_and_keeps_duplicates() {
        let items = vec![
            json!(3),
            json!("scholarship_id"),
            json!([{"scholarship_id": 1}]),
            json!({"scholarship_id": 2}),
            json!({"scholarship_id": null}),
            json!({"scholarship_id": 2}),
        ];
        assert_eq!(extract_scholarship_ids(&items), vec![2, 2]);
    }
}
