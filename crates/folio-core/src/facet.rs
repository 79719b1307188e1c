//! Facet summaries for filter controls.
//!
//! [`summarize`] lists the distinct values of each facet field with the
//! number of records carrying them. Summaries are always computed over the
//! whole source collection so filter options stay put while other filters
//! are applied.

use crate::compare::SortKey;
use crate::field::{resolve, FieldPath};
use crate::types::{scalar_text, FacetCount};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Distinct values of one field, most used first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub field: FieldPath,
    pub values: Vec<FacetCount>,
}

/// Facets for several fields, in the order the fields were requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacetSummary {
    facets: Vec<Facet>,
}

impl FacetSummary {
    /// Values for one field, if it was summarized.
    pub fn get(&self, field: &FieldPath) -> Option<&[FacetCount]> {
        self.facets
            .iter()
            .find(|facet| &facet.field == field)
            .map(|facet| facet.values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facet> {
        self.facets.iter()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

/// Count distinct values per facet field.
///
/// Each element of an array field counts once per record, so a record
/// tagged `["ml", "nlp"]` adds one to both. Repeats inside one record are
/// not counted again (`["ml", "ml"]` adds one to `ml`), which keeps every
/// count equal to the number of records that selecting the value as a
/// filter returns.
///
/// Absent, `null` and object values are not counted. Values that are
/// loosely equal (`2023` and `"2023"`) share one entry, reported in the form
/// first seen.
///
/// Entries are ordered by descending count, ties by ascending value.
#[instrument(skip_all, fields(records = records.len(), fields = facet_fields.len()))]
pub fn summarize(records: &[Value], facet_fields: &[FieldPath]) -> FacetSummary {
    let facets = facet_fields
        .iter()
        .map(|field| Facet {
            field: field.clone(),
            values: count_values(records, field),
        })
        .collect::<Vec<_>>();

    debug!(
        distinct = facets.iter().map(|f| f.values.len()).sum::<usize>(),
        "Facets summarized"
    );

    FacetSummary { facets }
}

fn count_values(records: &[Value], field: &FieldPath) -> Vec<FacetCount> {
    // Keyed by text form so loosely equal scalars share an entry
    let mut counts: HashMap<String, FacetCount> = HashMap::new();
    let mut seen_in_record = HashSet::new();

    for record in records {
        seen_in_record.clear();

        let values: &[Value] = match resolve(record, field) {
            Some(Value::Array(items)) => items,
            Some(value) => std::slice::from_ref(value),
            None => continue,
        };

        for value in values {
            let Some(text) = scalar_text(value) else {
                continue;
            };
            if !seen_in_record.insert(text.to_string()) {
                continue;
            }
            counts
                .entry(text.into_owned())
                .or_insert_with(|| FacetCount::new(value.clone(), 0))
                .count += 1;
        }
    }

    let mut values: Vec<(Option<SortKey>, FacetCount)> = counts
        .into_values()
        .map(|fc| (SortKey::from_value(&fc.value), fc))
        .collect();

    values.sort_by(|(ka, a), (kb, b)| {
        b.count
            .cmp(&a.count)
            .then_with(|| ka.cmp(kb))
            .then_with(|| a.value.to_string().cmp(&b.value.to_string()))
    });

    values.into_iter().map(|(_, fc)| fc).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{query, QueryConfig};
    use crate::spec::{QuerySpec, Selection, SortSpec};
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_counts_and_order() {
        let records = vec![json!({"cat": "a"}), json!({"cat": "a"}), json!({"cat": "b"})];
        let summary = summarize(&records, &[path("cat")]);

        assert_eq!(
            summary.get(&path("cat")).unwrap(),
            &[
                FacetCount::new(json!("a"), 2),
                FacetCount::new(json!("b"), 1)
            ]
        );
    }

    #[test]
    fn test_array_elements_counted_separately() {
        let records = vec![
            json!({"tags": ["ml", "nlp"]}),
            json!({"tags": ["ml"]}),
            json!({"tags": ["ml", "ml"]}),
            json!({"tags": []}),
        ];
        let summary = summarize(&records, &[path("tags")]);

        assert_eq!(
            summary.get(&path("tags")).unwrap(),
            &[
                FacetCount::new(json!("ml"), 3),
                FacetCount::new(json!("nlp"), 1)
            ]
        );
    }

    #[test]
    fn test_ties_broken_by_ascending_value() {
        let records = vec![
            json!({"year": 2024}),
            json!({"year": 2022}),
            json!({"year": 2023}),
            json!({"year": 10}),
        ];
        let summary = summarize(&records, &[path("year")]);
        let values: Vec<_> = summary
            .get(&path("year"))
            .unwrap()
            .iter()
            .map(|fc| fc.value.clone())
            .collect();

        // Numeric, not lexicographic
        assert_eq!(values, vec![json!(10), json!(2022), json!(2023), json!(2024)]);
    }

    #[test]
    fn test_missing_and_null_skipped() {
        let records = vec![
            json!({"venue": "NeurIPS"}),
            json!({"venue": null}),
            json!({}),
            json!({"venue": {"name": "nested"}}),
        ];
        let summary = summarize(&records, &[path("venue")]);
        assert_eq!(
            summary.get(&path("venue")).unwrap(),
            &[FacetCount::new(json!("NeurIPS"), 1)]
        );
    }

    #[test]
    fn test_loosely_equal_values_merge() {
        let records = vec![json!({"year": 2023}), json!({"year": "2023"})];
        let summary = summarize(&records, &[path("year")]);
        assert_eq!(
            summary.get(&path("year")).unwrap(),
            &[FacetCount::new(json!(2023), 2)]
        );
    }

    #[test]
    fn test_multiple_fields_keep_request_order() {
        let records = vec![json!({"cat": "x", "year": 2023})];
        let summary = summarize(&records, &[path("year"), path("cat"), path("missing")]);

        let fields: Vec<_> = summary.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["year", "cat", "missing"]);
        assert_eq!(summary.get(&path("missing")), Some(&[][..]));
        assert_eq!(summary.get(&path("other")), None);
    }

    #[test]
    fn test_independent_of_active_filters() {
        let records = vec![json!({"cat": "a"}), json!({"cat": "a"}), json!({"cat": "b"})];
        let spec = QuerySpec::new(SortSpec::parse("cat").unwrap())
            .with_filter(path("cat"), Selection::parse("b"));
        let view = query(&records, &spec, &QueryConfig::new(vec![]));
        assert_eq!(view.len(), 1);

        let summary = summarize(&records, &[path("cat")]);
        assert_eq!(summary.get(&path("cat")).unwrap()[0], FacetCount::new(json!("a"), 2));
    }
}
