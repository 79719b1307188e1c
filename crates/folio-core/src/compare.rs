//! Record ordering.
//!
//! A [`Comparator`] turns a [`SortSpec`] into a total order over records.
//! Values are first reduced to a [`SortKey`]:
//!
//! - numbers compare numerically
//! - ISO-8601 date strings (`2024-03-01`, `2024-03`, RFC 3339) compare
//!   chronologically
//! - other strings compare ignoring case and accents first, so `"é"` sorts
//!   between `"e"` and `"f"`
//! - booleans compare `false < true`
//! - arrays sort by their first element
//!
//! Absent values sort last in both directions. The direction applies to the
//! primary field only; the fallback field is always ascending and remaining
//! ties keep input order.

use crate::field::{resolve, FieldPath};
use crate::spec::{SortDirection, SortSpec};
use crate::types::is_truthy;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A comparable reduction of one field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Date(NaiveDateTime),
    Text {
        /// Accent-stripped, lower-cased form
        folded: String,
        lower: String,
        raw: String,
    },
    Bool(bool),
}

impl SortKey {
    /// Reduce a value to a sort key; `None` means the value sorts as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Object(_) => None,
            Value::Bool(b) => Some(SortKey::Bool(*b)),
            Value::Number(n) => n.as_f64().map(SortKey::Number),
            Value::String(s) => Some(parse_date(s).map_or_else(|| text_key(s), SortKey::Date)),
            Value::Array(items) => items.first().and_then(SortKey::from_value),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Date(_) => 1,
            SortKey::Text { .. } => 2,
            SortKey::Bool(_) => 3,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (
                SortKey::Text {
                    folded: fa,
                    lower: la,
                    raw: ra,
                },
                SortKey::Text {
                    folded: fb,
                    lower: lb,
                    raw: rb,
                },
            ) => fa.cmp(fb).then_with(|| la.cmp(lb)).then_with(|| ra.cmp(rb)),
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

fn text_key(s: &str) -> SortKey {
    let lower = s.to_lowercase();
    let folded = lower.nfd().filter(|c| !is_combining_mark(*c)).collect();
    SortKey::Text {
        folded,
        lower,
        raw: s.to_string(),
    }
}

/// Offset-less timestamps, with `T` or a space between date and time.
/// `%.f` also accepts no fraction at all.
const LOCAL_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse the ISO-8601 shapes content files use for dates.
fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    // Cheap reject before trying the parsers
    if s.len() < 7 || !s.as_bytes()[..4].iter().all(u8::is_ascii_digit) || s.as_bytes()[4] != b'-'
    {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if s.len() == 7 {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Compare two optional keys with absent values last regardless of direction.
fn cmp_missing_last(
    a: Option<&SortKey>,
    b: Option<&SortKey>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Precomputed sort keys for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordKey {
    pinned: bool,
    primary: Option<SortKey>,
    fallback: Option<SortKey>,
}

/// A compiled ordering over records.
#[derive(Debug, Clone)]
pub struct Comparator {
    sort: SortSpec,
    pinned: Option<FieldPath>,
}

impl Comparator {
    /// Compile a sort spec.
    pub fn build(sort: &SortSpec) -> Self {
        Comparator {
            sort: sort.clone(),
            pinned: None,
        }
    }

    /// Records whose `field` is truthy come before all others, ahead of the
    /// sort spec.
    pub fn with_pinned(mut self, field: Option<FieldPath>) -> Self {
        self.pinned = field;
        self
    }

    /// Compute the keys of one record. Used to sort without re-resolving
    /// fields on every comparison.
    pub fn key(&self, record: &Value) -> RecordKey {
        RecordKey {
            pinned: self
                .pinned
                .as_ref()
                .and_then(|field| resolve(record, field))
                .map_or(false, is_truthy),
            primary: resolve(record, &self.sort.field).and_then(SortKey::from_value),
            fallback: self
                .sort
                .fallback
                .as_ref()
                .and_then(|field| resolve(record, field))
                .and_then(SortKey::from_value),
        }
    }

    /// Compare precomputed keys.
    pub fn compare_keys(&self, a: &RecordKey, b: &RecordKey) -> Ordering {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| {
                cmp_missing_last(a.primary.as_ref(), b.primary.as_ref(), self.sort.direction)
            })
            .then_with(|| {
                cmp_missing_last(
                    a.fallback.as_ref(),
                    b.fallback.as_ref(),
                    SortDirection::Asc,
                )
            })
    }

    /// Compare two records.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        self.compare_keys(&self.key(a), &self.key(b))
    }
}
