//! Core data types for Folio.
//!
//! Records are plain `serde_json::Value`s so any content collection (blog
//! posts, publications, talks, ...) can be queried without a fixed schema.
//! This module holds the value-level rules shared by filtering, sorting and
//! facet counting:
//!
//! - **Scalar text**: strings, numbers and booleans all have a text form
//! - **Loose equality**: scalars compare by that text form, so the number
//!   `2023` equals the string `"2023"` typed into a filter box
//! - **Truthiness**: used for pinned/featured flags

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// A single content item. Any JSON value; normally an object.
pub type Record = Value;

/// The text form of a scalar value, or `None` for null, arrays and objects.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Equality used by filters and facets.
///
/// Structurally equal values are equal. Two scalars are also equal when
/// their text forms match.
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }

    match (scalar_text(left), scalar_text(right)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Whether a value counts as "set" for flag-style fields.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

/// Short name of a value's JSON kind, for error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One distinct facet value and the number of records carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    /// The value as first seen in the collection
    pub value: Value,

    /// Number of records whose field equals or contains the value
    pub count: usize,
}

impl FacetCount {
    /// Create a new facet count
    pub fn new(value: Value, count: usize) -> Self {
        FacetCount { value, count }
    }
}

impl fmt::Display for FacetCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match scalar_text(&self.value) {
            Some(text) => write!(f, "{} ({})", text, self.count),
            None => write!(f, "{} ({})", self.value, self.count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("abc")).as_deref(), Some("abc"));
        assert_eq!(scalar_text(&json!(2023)).as_deref(), Some("2023"));
        assert_eq!(scalar_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!(["a"])), None);
    }

    #[test]
    fn test_loosely_equal() {
        assert!(loosely_equal(&json!(2023), &json!("2023")));
        assert!(loosely_equal(&json!("ml"), &json!("ml")));
        assert!(loosely_equal(&json!(["a", "b"]), &json!(["a", "b"])));
        assert!(!loosely_equal(&json!("ML"), &json!("ml")));
        assert!(!loosely_equal(&json!(2023), &json!("2024")));
        assert!(!loosely_equal(&json!(null), &json!("null")));
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn test_facet_count_display() {
        assert_eq!(FacetCount::new(json!("ml"), 3).to_string(), "ml (3)");
        assert_eq!(FacetCount::new(json!(2023), 2).to_string(), "2023 (2)");
    }
}
