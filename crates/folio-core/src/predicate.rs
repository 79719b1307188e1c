//! Record predicates.
//!
//! A [`Predicate`] is compiled once from a [`QuerySpec`] and the section's
//! searchable fields, then evaluated against every record:
//!
//! - **Text clause**: case-insensitive substring match over the searchable
//!   fields (each element of an array field is checked)
//! - **Filter clauses**: one per active filter, all ANDed
//!
//! Absent or `null` values never satisfy a non-empty search term or an
//! active filter.

use crate::field::{resolve, FieldPath};
use crate::spec::QuerySpec;
use crate::types::{loosely_equal, scalar_text};
use serde_json::Value;
use std::sync::Arc;

/// A compiled predicate over records.
#[derive(Clone)]
pub struct Predicate {
    clauses: Vec<Arc<dyn Clause>>,
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("clauses", &self.clauses.len())
            .finish()
    }
}

impl Predicate {
    /// Compile the search and filter parts of `spec`.
    ///
    /// # Example
    /// ```
    /// use folio_core::{FieldPath, Predicate, QuerySpec, SortSpec};
    /// use serde_json::json;
    ///
    /// let title = FieldPath::parse("title").unwrap();
    /// let spec = QuerySpec::new(SortSpec::parse("title").unwrap()).with_search_text("MACHINE");
    /// let predicate = Predicate::build(&spec, &[title]);
    /// assert!(predicate.matches(&json!({ "title": "Machine Learning" })));
    /// ```
    pub fn build(spec: &QuerySpec, searchable_fields: &[FieldPath]) -> Self {
        let mut clauses: Vec<Arc<dyn Clause>> = Vec::new();

        let needle = spec.search_text().trim();
        if !needle.is_empty() {
            clauses.push(Arc::new(TextClause::new(needle, searchable_fields)));
        }

        for (field, value) in spec.active_filters() {
            clauses.push(Arc::new(FilterClause {
                field: field.clone(),
                value: value.clone(),
            }));
        }

        Predicate { clauses }
    }

    /// Check if a record passes every clause.
    pub fn matches(&self, record: &Value) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// True when the predicate accepts every record.
    pub fn matches_all(&self) -> bool {
        self.clauses.is_empty()
    }
}

// === Clause Implementations ===

/// One independent condition of a predicate.
trait Clause: Send + Sync {
    fn matches(&self, record: &Value) -> bool;
}

/// Case-insensitive substring match over several fields.
struct TextClause {
    needle_lower: String,
    fields: Vec<FieldPath>,
}

impl TextClause {
    fn new(needle: &str, fields: &[FieldPath]) -> Self {
        TextClause {
            needle_lower: needle.to_lowercase(),
            fields: fields.to_vec(),
        }
    }

    fn value_contains(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) => items.iter().any(|item| self.scalar_contains(item)),
            other => self.scalar_contains(other),
        }
    }

    fn scalar_contains(&self, value: &Value) -> bool {
        scalar_text(value).map_or(false, |text| {
            text.to_lowercase().contains(&self.needle_lower)
        })
    }
}

impl Clause for TextClause {
    fn matches(&self, record: &Value) -> bool {
        self.fields
            .iter()
            .filter_map(|field| resolve(record, field))
            .any(|value| self.value_contains(value))
    }
}

/// Equality (scalar) or membership (array) on one field.
struct FilterClause {
    field: FieldPath,
    value: Value,
}

impl Clause for FilterClause {
    fn matches(&self, record: &Value) -> bool {
        match resolve(record, &self.field) {
            None => false,
            Some(resolved) if loosely_equal(resolved, &self.value) => true,
            Some(Value::Array(items)) => items.iter().any(|item| loosely_equal(item, &self.value)),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Selection, SortSpec};
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    fn spec() -> QuerySpec {
        QuerySpec::new(SortSpec::parse("title").unwrap())
    }

    fn searchable() -> Vec<FieldPath> {
        vec![path("title"), path("tags"), path("author.name")]
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let predicate = Predicate::build(&spec(), &searchable());
        assert!(predicate.matches_all());
        assert!(predicate.matches(&json!({})));
        assert!(predicate.matches(&json!({ "title": null })));

        let predicate = Predicate::build(&spec().with_search_text("   "), &searchable());
        assert!(predicate.matches_all());
    }

    #[test]
    fn test_search_text_is_trimmed() {
        let record = json!({ "title": "Beta" });

        let predicate = Predicate::build(&spec().with_search_text("  beta "), &searchable());
        assert!(!predicate.matches_all());
        assert!(predicate.matches(&record));

        // Inner whitespace is kept
        let predicate = Predicate::build(&spec().with_search_text("be ta"), &searchable());
        assert!(!predicate.matches(&record));

        let predicate = Predicate::build(&spec().with_search_text("\t\n"), &searchable());
        assert!(predicate.matches_all());
        assert!(predicate.matches(&json!({})));
    }

    #[test]
    fn test_search_case_insensitive() {
        let record = json!({ "title": "Machine Learning" });

        for text in ["machine", "MACHINE", "Learn"] {
            let predicate = Predicate::build(&spec().with_search_text(text), &searchable());
            assert!(predicate.matches(&record), "{text} should match");
        }

        let predicate = Predicate::build(&spec().with_search_text("vision"), &searchable());
        assert!(!predicate.matches(&record));
    }

    #[test]
    fn test_search_array_and_nested_fields() {
        let record = json!({
            "title": "Talk",
            "tags": ["NLP", "transformers"],
            "author": { "name": "Ada Lovelace" }
        });

        let predicate = Predicate::build(&spec().with_search_text("nlp"), &searchable());
        assert!(predicate.matches(&record));

        let predicate = Predicate::build(&spec().with_search_text("lovelace"), &searchable());
        assert!(predicate.matches(&record));

        // Only configured fields are searched
        let predicate = Predicate::build(&spec().with_search_text("talk"), &[path("tags")]);
        assert!(!predicate.matches(&record));
    }

    #[test]
    fn test_search_never_matches_missing() {
        let predicate = Predicate::build(&spec().with_search_text("a"), &searchable());
        assert!(!predicate.matches(&json!({ "title": null })));
        assert!(!predicate.matches(&json!({ "other": "aaa" })));
    }

    #[test]
    fn test_filter_equality_and_membership() {
        let spec = spec()
            .with_filter(path("year"), Selection::parse("2023"))
            .with_filter(path("tags"), Selection::parse("ml"));
        let predicate = Predicate::build(&spec, &searchable());

        assert!(predicate.matches(&json!({ "year": 2023, "tags": ["ml", "nlp"] })));
        assert!(!predicate.matches(&json!({ "year": 2024, "tags": ["ml"] })));
        assert!(!predicate.matches(&json!({ "year": 2023, "tags": ["nlp"] })));
        assert!(!predicate.matches(&json!({ "tags": ["ml"] })));
    }

    #[test]
    fn test_filter_all_always_matches() {
        let spec = spec().with_filter(path("year"), Selection::All);
        let predicate = Predicate::build(&spec, &searchable());

        assert!(predicate.matches_all());
        assert!(predicate.matches(&json!({})));
    }

    #[test]
    fn test_filter_key_order_does_not_matter() {
        let records = [
            json!({ "year": 2023, "type": "journal" }),
            json!({ "year": 2023, "type": "conference" }),
            json!({ "year": 2024, "type": "journal" }),
        ];

        let a = spec()
            .with_filter(path("year"), Selection::parse("2023"))
            .with_filter(path("type"), Selection::parse("journal"));
        let b = spec()
            .with_filter(path("type"), Selection::parse("journal"))
            .with_filter(path("year"), Selection::parse("2023"));

        let pa = Predicate::build(&a, &searchable());
        let pb = Predicate::build(&b, &searchable());
        for record in &records {
            assert_eq!(pa.matches(record), pb.matches(record));
        }
        assert_eq!(records.iter().filter(|r| pa.matches(r)).count(), 1);
    }

    #[test]
    fn test_search_and_filter_combined() {
        let spec = spec()
            .with_search_text("deep")
            .with_filter(path("year"), Selection::Value(json!(2023)));
        let predicate = Predicate::build(&spec, &searchable());

        assert!(predicate.matches(&json!({ "title": "Deep nets", "year": 2023 })));
        assert!(!predicate.matches(&json!({ "title": "Deep nets", "year": 2022 })));
        assert!(!predicate.matches(&json!({ "title": "Shallow", "year": 2023 })));
    }
}
