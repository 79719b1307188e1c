//! The query engine.
//!
//! [`query`] is the single entry point content sections use: it filters a
//! collection with a [`Predicate`] and orders the survivors with a
//! [`Comparator`]. It is a pure function of its inputs. The records are
//! borrowed, never modified, and the result is a new vector of references
//! into them.
//!
//! ## Performance
//!
//! Sort keys are resolved once per matching record rather than once per
//! comparison. Collections above [`QueryConfig::parallel_threshold`] are
//! filtered and sorted with Rayon; both sorts are stable so the output is
//! identical either way.

use crate::compare::{Comparator, RecordKey};
use crate::error::{FolioError, Result};
use crate::field::FieldPath;
use crate::predicate::Predicate;
use crate::spec::QuerySpec;
use crate::types::kind_name;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, instrument};

/// Default collection size above which queries run in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Per-section query configuration: which fields search text looks at and
/// which field, if any, pins records to the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub searchable_fields: Vec<FieldPath>,
    pub pinned: Option<FieldPath>,
    pub parallel_threshold: usize,
}

impl QueryConfig {
    pub fn new(searchable_fields: Vec<FieldPath>) -> Self {
        QueryConfig {
            searchable_fields,
            pinned: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_pinned(mut self, pinned: FieldPath) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// Filter then sort `records` according to `spec`.
///
/// # Example
/// ```
/// use folio_core::{query, FieldPath, QueryConfig, QuerySpec, SortSpec};
/// use serde_json::json;
///
/// let records = vec![json!({"title": "Beta"}), json!({"title": "Alpha"})];
/// let config = QueryConfig::new(vec![FieldPath::parse("title").unwrap()]);
/// let spec = QuerySpec::new(SortSpec::parse("title").unwrap());
///
/// let view = query(&records, &spec, &config);
/// assert_eq!(view[0]["title"], "Alpha");
/// ```
#[instrument(skip_all, fields(records = records.len(), sort = %spec.sort()))]
pub fn query<'a>(records: &'a [Value], spec: &QuerySpec, config: &QueryConfig) -> Vec<&'a Value> {
    query_indices(records, spec, config)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}

/// Like [`query`], but returns positions in `records` instead of references.
pub fn query_indices(records: &[Value], spec: &QuerySpec, config: &QueryConfig) -> Vec<usize> {
    let predicate = Predicate::build(spec, &config.searchable_fields);
    let comparator = Comparator::build(spec.sort()).with_pinned(config.pinned.clone());

    let keyed = if records.len() > config.parallel_threshold {
        query_parallel(records, &predicate, &comparator)
    } else {
        query_sequential(records, &predicate, &comparator)
    };

    debug!(
        matched = keyed.len(),
        unrestricted = predicate.matches_all(),
        "Query complete"
    );

    keyed.into_iter().map(|(_, i)| i).collect()
}

fn query_sequential(
    records: &[Value],
    predicate: &Predicate,
    comparator: &Comparator,
) -> Vec<(RecordKey, usize)> {
    let mut keyed: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| predicate.matches(r))
        .map(|(i, r)| (comparator.key(r), i))
        .collect();
    keyed.sort_by(|a, b| comparator.compare_keys(&a.0, &b.0));
    keyed
}

fn query_parallel(
    records: &[Value],
    predicate: &Predicate,
    comparator: &Comparator,
) -> Vec<(RecordKey, usize)> {
    let mut keyed: Vec<_> = records
        .par_iter()
        .enumerate()
        .filter(|(_, r)| predicate.matches(r))
        .map(|(i, r)| (comparator.key(r), i))
        .collect();
    keyed.par_sort_by(|a, b| comparator.compare_keys(&a.0, &b.0));
    keyed
}

/// Query and keep at most `limit` records of the ordered view.
pub fn query_limited<'a>(
    records: &'a [Value],
    spec: &QuerySpec,
    config: &QueryConfig,
    limit: usize,
) -> Vec<&'a Value> {
    let mut view = query(records, spec, config);
    view.truncate(limit);
    view
}

/// Query a raw JSON document that must be an array of records.
pub fn query_value<'a>(
    records: &'a Value,
    spec: &QuerySpec,
    config: &QueryConfig,
) -> Result<Vec<&'a Value>> {
    match records {
        Value::Array(items) => Ok(query(items, spec, config)),
        other => Err(FolioError::NotACollection {
            found: kind_name(other).to_string(),
        }),
    }
}
