//! A queryable list view over one content section.
//!
//! [`ListView`] is what a UI holds for a mounted section: the immutable
//! source collection, the current [`QuerySpec`] and the ordered result of
//! the last query. Every event replaces the spec and re-runs the query.
//! Facets are computed once per source, never per query.

use crate::collection::Collection;
use crate::config::{PerformanceConfig, SectionConfig};
use crate::engine::{query_indices, QueryConfig};
use crate::error::Result;
use crate::facet::{summarize, FacetSummary};
use crate::field::FieldPath;
use crate::spec::{parse_query, QuerySpec, SpecEvent};
use serde_json::Value;
use tracing::debug;

#[derive(Debug)]
pub struct ListView {
    collection: Collection,
    config: QueryConfig,
    facet_fields: Vec<FieldPath>,
    facets: FacetSummary,
    /// Spec the section opened with; typed queries are parsed on top of it
    initial: QuerySpec,
    spec: QuerySpec,
    results: Vec<usize>,
}

impl ListView {
    pub fn new(
        collection: Collection,
        config: QueryConfig,
        facet_fields: Vec<FieldPath>,
        spec: QuerySpec,
    ) -> Self {
        let facets = summarize(collection.records(), &facet_fields);
        let results = query_indices(collection.records(), &spec, &config);
        ListView {
            collection,
            config,
            facet_fields,
            facets,
            initial: spec.clone(),
            spec,
            results,
        }
    }

    /// Open a section with its default spec.
    pub fn for_section(
        collection: Collection,
        section: &SectionConfig,
        performance: &PerformanceConfig,
    ) -> Self {
        ListView::new(
            collection,
            section.query_config(performance),
            section.facets.clone(),
            section.default_spec(),
        )
    }

    /// Apply one event and refresh the results.
    pub fn dispatch(&mut self, event: SpecEvent) {
        debug!(?event, "List view event");
        let spec = self.spec.apply(event);
        self.set_spec(spec);
    }

    /// Replace the spec with a typed one-line query (see
    /// [`parse_query`](crate::spec::parse_query)) parsed on top of the
    /// initial spec. On error the current view is left unchanged.
    pub fn dispatch_query(&mut self, input: &str) -> Result<()> {
        let spec = parse_query(input, &self.initial)?;
        self.set_spec(spec);
        Ok(())
    }

    /// Replace the whole spec, re-querying only when it changed.
    pub fn set_spec(&mut self, spec: QuerySpec) {
        if spec != self.spec {
            self.results = query_indices(self.collection.records(), &spec, &self.config);
            self.spec = spec;
        }
    }

    /// Swap in a new source collection, recomputing facets and results.
    pub fn set_collection(&mut self, collection: Collection) {
        self.facets = summarize(collection.records(), &self.facet_fields);
        self.results = query_indices(collection.records(), &self.spec, &self.config);
        self.collection = collection;
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// The spec the view was opened with.
    pub fn initial_spec(&self) -> &QuerySpec {
        &self.initial
    }

    pub fn facets(&self) -> &FacetSummary {
        &self.facets
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The current ordered, filtered records.
    pub fn results(&self) -> impl Iterator<Item = &Value> + '_ {
        self.results.iter().map(|&i| &self.collection.records()[i])
    }

    /// Record at a position of the current results.
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.results
            .get(position)
            .map(|&i| &self.collection.records()[i])
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
