//! # Folio Core Library
//!
//! This crate provides the search, filter, sort and facet engine behind every
//! content listing in Folio (blog posts, publications, talks, discussions,
//! resources, posters, projects). Each content type is handled by
//! configuration rather than bespoke code.
//!
//! ## Architecture
//!
//! - **Fields** (`field`): Parse field paths and resolve them on records
//! - **Predicates** (`predicate`): Search text and filters compiled to one predicate
//! - **Comparators** (`compare`): Sort specs compiled to a total order
//! - **Engine** (`engine`): `query(records, spec, config)`, filter then sort
//! - **Facets** (`facet`): Distinct values and counts for filter controls
//! - **Specs** (`spec`): Immutable query specs, UI events, one-line query syntax
//! - **Views** (`view`): A section's current spec and results
//! - **Collections** (`collection`): Loading records from JSON
//! - **Config** (`config`): Per-section configuration
//!
//! ## Example
//!
//! ```rust
//! use folio_core::{query, summarize, FieldPath, QueryConfig, QuerySpec, Selection, SortSpec};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"title": "Alpha", "year": 2023, "citations": 5}),
//!     json!({"title": "Beta", "year": 2024, "citations": 2}),
//! ];
//! let year = FieldPath::parse("year").unwrap();
//! let config = QueryConfig::new(vec![FieldPath::parse("title").unwrap()]);
//! let spec = QuerySpec::new(SortSpec::parse("citations:desc").unwrap())
//!     .with_filter(year.clone(), Selection::parse("2023"));
//!
//! let view = query(&records, &spec, &config);
//! assert_eq!(view.len(), 1);
//!
//! let facets = summarize(&records, &[year.clone()]);
//! assert_eq!(facets.get(&year).unwrap().len(), 2);
//! ```

pub mod collection;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod facet;
pub mod field;
pub mod predicate;
pub mod spec;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use collection::Collection;
pub use compare::{Comparator, SortKey};
pub use config::{Config, SectionConfig};
pub use engine::{query, query_indices, query_limited, query_value, QueryConfig};
pub use error::{FolioError, Result};
pub use facet::{summarize, Facet, FacetSummary};
pub use field::{resolve, FieldPath};
pub use predicate::Predicate;
pub use spec::{parse_query, QuerySpec, Selection, SortDirection, SortSpec, SpecEvent};
pub use types::{FacetCount, Record};
pub use view::ListView;
