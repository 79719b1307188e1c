//! Query specifications.
//!
//! A [`QuerySpec`] is the complete description of one view over a content
//! collection: free-text search, per-field filter selections and a sort
//! choice. Specs are immutable; every user interaction produces a new spec
//! via [`QuerySpec::apply`] or the `with_*` builders.
//!
//! ## Query Syntax
//!
//! [`parse_query`] accepts a single line the way a search box would:
//!
//! - `machine learning` - search text
//! - `year=2023` - filter a field to one value (`year=all` clears it)
//! - `sort:citations:desc` - sort field and optional direction
//! - `then:title` - fallback sort field for ties
//!
//! Filter values cannot contain whitespace in this syntax; callers with such
//! values build the spec directly.

use crate::error::{FolioError, Result};
use crate::field::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sort direction for the primary sort field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(FolioError::UnknownSortDirection {
                direction: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SortDirection {
    type Error = FolioError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SortDirection> for String {
    fn from(direction: SortDirection) -> Self {
        direction.as_str().to_string()
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort choice: a primary field and direction, plus an optional fallback
/// field that breaks ties and is always applied ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: FieldPath,

    #[serde(default)]
    pub direction: SortDirection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FieldPath>,
}

impl SortSpec {
    /// Create a sort on `field` in the given direction, without fallback.
    pub fn new(field: FieldPath, direction: SortDirection) -> Self {
        SortSpec {
            field,
            direction,
            fallback: None,
        }
    }

    /// Set the tie-breaking fallback field
    pub fn with_fallback(mut self, fallback: FieldPath) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Parse `field` or `field:direction`.
    ///
    /// # Example
    /// ```
    /// use folio_core::{SortDirection, SortSpec};
    /// let sort = SortSpec::parse("citations:desc").unwrap();
    /// assert_eq!(sort.field.as_str(), "citations");
    /// assert_eq!(sort.direction, SortDirection::Desc);
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let (field, direction) = match input.split_once(':') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (input, SortDirection::Asc),
        };
        Ok(SortSpec::new(FieldPath::parse(field)?, direction))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)?;
        if let Some(ref fallback) = self.fallback {
            write!(f, " then {}", fallback)?;
        }
        Ok(())
    }
}

/// The selected value of one filter control.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// No restriction
    All,

    /// Field must equal (or, for arrays, contain) this value
    Value(Value),
}

impl Selection {
    /// Interpret user-typed text; `all` (any case) means no restriction.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Value(Value::String(text.to_string()))
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl From<Value> for Selection {
    fn from(value: Value) -> Self {
        Selection::Value(value)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Value(Value::String(s)) => f.write_str(s),
            Selection::Value(v) => write!(f, "{}", v),
        }
    }
}

/// A user interaction that changes the current spec.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecEvent {
    SearchTextChanged(String),
    FilterChanged {
        field: FieldPath,
        selection: Selection,
    },
    SortChanged(SortSpec),
    FiltersCleared,
}

/// Immutable description of a view: search text, filters and sort.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    search_text: String,
    filters: BTreeMap<FieldPath, Selection>,
    sort: SortSpec,
}

impl QuerySpec {
    /// The initial spec: empty search, no filters, the given sort.
    pub fn new(sort: SortSpec) -> Self {
        QuerySpec {
            search_text: String::new(),
            filters: BTreeMap::new(),
            sort,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn filters(&self) -> &BTreeMap<FieldPath, Selection> {
        &self.filters
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Filters whose selection is not `All`.
    pub fn active_filters(&self) -> impl Iterator<Item = (&FieldPath, &Value)> {
        self.filters.iter().filter_map(|(field, selection)| match selection {
            Selection::All => None,
            Selection::Value(value) => Some((field, value)),
        })
    }

    /// True when neither the search text nor any filter restricts the view.
    pub fn is_unrestricted(&self) -> bool {
        self.search_text.trim().is_empty() && self.active_filters().next().is_none()
    }

    pub fn with_search_text(&self, text: impl Into<String>) -> Self {
        QuerySpec {
            search_text: text.into(),
            ..self.clone()
        }
    }

    pub fn with_filter(&self, field: FieldPath, selection: Selection) -> Self {
        let mut filters = self.filters.clone();
        filters.insert(field, selection);
        QuerySpec {
            filters,
            ..self.clone()
        }
    }

    pub fn without_filter(&self, field: &FieldPath) -> Self {
        let mut filters = self.filters.clone();
        filters.remove(field);
        QuerySpec {
            filters,
            ..self.clone()
        }
    }

    /// Reset every known filter to `All`, keeping the keys.
    pub fn clear_filters(&self) -> Self {
        QuerySpec {
            filters: self
                .filters
                .keys()
                .map(|field| (field.clone(), Selection::All))
                .collect(),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortSpec) -> Self {
        QuerySpec {
            sort,
            ..self.clone()
        }
    }

    /// State transition for one UI event.
    pub fn apply(&self, event: SpecEvent) -> Self {
        match event {
            SpecEvent::SearchTextChanged(text) => self.with_search_text(text),
            SpecEvent::FilterChanged { field, selection } => self.with_filter(field, selection),
            SpecEvent::SortChanged(sort) => self.with_sort(sort),
            SpecEvent::FiltersCleared => self.clear_filters(),
        }
    }
}

/// Parse a one-line query on top of `base` (usually the section default).
///
/// Filters in the input are merged into the base filters; the search text
/// and, when given, the sort replace the base values.
pub fn parse_query(input: &str, base: &QuerySpec) -> Result<QuerySpec> {
    let mut spec = base.clone();
    let mut sort = base.sort.clone();
    let mut words = Vec::new();

    for part in input.split_whitespace() {
        if let Some(rest) = part.strip_prefix("sort:") {
            let parsed = SortSpec::parse(rest)?;
            sort.field = parsed.field;
            sort.direction = parsed.direction;
        } else if let Some(rest) = part.strip_prefix("then:") {
            sort.fallback = Some(FieldPath::parse(rest)?);
        } else if let Some((field, value)) = part.split_once('=').filter(|(f, _)| !f.is_empty()) {
            spec = spec.with_filter(FieldPath::parse(field)?, Selection::parse(value));
        } else {
            words.push(part);
        }
    }

    Ok(spec.with_search_text(words.join(" ")).with_sort(sort))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    fn base() -> QuerySpec {
        QuerySpec::new(
            SortSpec::new(path("date"), SortDirection::Desc).with_fallback(path("title")),
        )
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(
            "descending".parse::<SortDirection>().unwrap(),
            SortDirection::Desc
        );

        let err = "sideways".parse::<SortDirection>().unwrap_err();
        assert!(matches!(err, FolioError::UnknownSortDirection { .. }));
    }

    #[test]
    fn test_sort_spec_parse() {
        let sort = SortSpec::parse("title").unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
        assert_eq!(sort.fallback, None);

        assert!(SortSpec::parse(":desc").is_err());
        assert!(SortSpec::parse("title:up").is_err());
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::parse("all"), Selection::All);
        assert_eq!(Selection::parse("ALL"), Selection::All);
        assert_eq!(Selection::parse(""), Selection::All);
        assert_eq!(Selection::parse("2023"), Selection::Value(json!("2023")));
    }

    #[test]
    fn test_builders_do_not_mutate() {
        let spec = base();
        let next = spec.with_search_text("rust");

        assert_eq!(spec.search_text(), "");
        assert_eq!(next.search_text(), "rust");
        assert_eq!(next.sort(), spec.sort());
    }

    #[test]
    fn test_apply_events() {
        let spec = base()
            .apply(SpecEvent::SearchTextChanged("ml".to_string()))
            .apply(SpecEvent::FilterChanged {
                field: path("year"),
                selection: Selection::parse("2023"),
            });

        assert_eq!(spec.search_text(), "ml");
        assert_eq!(spec.active_filters().count(), 1);
        assert!(!spec.is_unrestricted());

        let cleared = spec.apply(SpecEvent::FiltersCleared);
        assert_eq!(cleared.filters().len(), 1);
        assert_eq!(cleared.active_filters().count(), 0);

        let sorted = spec.apply(SpecEvent::SortChanged(SortSpec::parse("title").unwrap()));
        assert_eq!(sorted.sort().field, path("title"));
    }

    #[test]
    fn test_without_filter() {
        let spec = base()
            .with_filter(path("year"), Selection::parse("2023"))
            .with_filter(path("type"), Selection::All);
        let next = spec.without_filter(&path("year"));

        assert_eq!(spec.filters().len(), 2);
        assert_eq!(next.filters().len(), 1);
        assert!(next.is_unrestricted());
    }

    #[test]
    fn test_same_filter_twice_is_idempotent() {
        let event = SpecEvent::FilterChanged {
            field: path("year"),
            selection: Selection::parse("2023"),
        };
        let once = base().apply(event.clone());
        let twice = once.apply(event);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_query() {
        let spec = parse_query("machine learning year=2023 sort:citations:desc", &base()).unwrap();

        assert_eq!(spec.search_text(), "machine learning");
        assert_eq!(
            spec.filters().get(&path("year")),
            Some(&Selection::Value(json!("2023")))
        );
        assert_eq!(spec.sort().field, path("citations"));
        assert_eq!(spec.sort().direction, SortDirection::Desc);
        // Fallback is kept from the base spec
        assert_eq!(spec.sort().fallback, Some(path("title")));
    }

    #[test]
    fn test_parse_query_then_and_all() {
        let start = base().with_filter(path("year"), Selection::parse("2023"));
        let spec = parse_query("year=all then:venue", &start).unwrap();

        assert_eq!(spec.search_text(), "");
        assert_eq!(spec.active_filters().count(), 0);
        assert_eq!(spec.sort().fallback, Some(path("venue")));
    }

    #[test]
    fn test_parse_query_errors() {
        assert!(parse_query("sort:title:up", &base()).is_err());
        assert!(parse_query("a..b=1", &base()).is_err());
        // A leading '=' is just search text
        let spec = parse_query("=x", &base()).unwrap();
        assert_eq!(spec.search_text(), "=x");
    }
}
