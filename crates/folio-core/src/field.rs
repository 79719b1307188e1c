//! Field paths and record field resolution.
//!
//! A [`FieldPath`] addresses a possibly nested field of a record using dotted
//! keys and brackets:
//!
//! - `title` - top-level key
//! - `author.name` - nested object key
//! - `authors[0].name` or `authors.0.name` - array element
//! - `meta[first.last]` - key containing a dot
//!
//! Parsing is the only fallible step. Resolution never fails: a missing key,
//! an out-of-range index, a type mismatch or a JSON `null` all resolve to
//! `None`.

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Object key (also used as an array index when it is all digits)
    Key(String),

    /// Bracketed array index
    Index(usize),
}

/// A parsed, validated reference to a field of a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a field path.
    ///
    /// # Example
    /// ```
    /// use folio_core::FieldPath;
    /// let path = FieldPath::parse("author.name").unwrap();
    /// assert_eq!(path.as_str(), "author.name");
    /// assert!(FieldPath::parse("").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(FolioError::invalid_path(input, "field path is empty"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        // True right after a closing bracket, where only '.', '[' or the end may follow
        let mut after_bracket = false;
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if after_bracket {
                        after_bracket = false;
                        continue;
                    }
                    if current.is_empty() {
                        return Err(FolioError::invalid_path(input, "empty segment"));
                    }
                    segments.push(Segment::Key(std::mem::take(&mut current)));
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    } else if !after_bracket && !segments.is_empty() {
                        // "a.[0]"
                        return Err(FolioError::invalid_path(input, "empty segment"));
                    }

                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(FolioError::invalid_path(input, "unclosed '['"));
                    }
                    segments.push(bracket_segment(input, inner.trim())?);
                    after_bracket = true;
                }
                ']' => {
                    return Err(FolioError::invalid_path(input, "unexpected ']'"));
                }
                _ => {
                    if after_bracket {
                        return Err(FolioError::invalid_path(
                            input,
                            "expected '.' or '[' after ']'",
                        ));
                    }
                    current.push(c);
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::Key(current));
        } else if !after_bracket {
            return Err(FolioError::invalid_path(input, "empty segment"));
        }

        Ok(FieldPath {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Single top-level key, for built-in names known to be plain.
    pub(crate) fn key(name: &str) -> Self {
        FieldPath {
            raw: name.to_string(),
            segments: vec![Segment::Key(name.to_string())],
        }
    }

    /// The path as written (whitespace-trimmed)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Interpret the contents of a `[...]` segment.
fn bracket_segment(input: &str, inner: &str) -> Result<Segment> {
    let unquoted = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')));

    if let Some(key) = unquoted {
        if key.is_empty() {
            return Err(FolioError::invalid_path(input, "empty bracket"));
        }
        return Ok(Segment::Key(key.to_string()));
    }

    if inner.is_empty() {
        return Err(FolioError::invalid_path(input, "empty bracket"));
    }

    Ok(match inner.parse::<usize>() {
        Ok(index) => Segment::Index(index),
        Err(_) => Segment::Key(inner.to_string()),
    })
}

impl FromStr for FieldPath {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = FolioError;

    fn try_from(s: String) -> Result<Self> {
        FieldPath::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Resolve a field path against a record.
///
/// Arrays are returned as-is so callers choose between equality and
/// membership. A `null` at the end of the path resolves to `None`.
pub fn resolve<'a>(record: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = record;

    for segment in &path.segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
            _ => return None,
        };
    }

    match current {
        Value::Null => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_dotted() {
        let p = path("author.name");
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("author".to_string()),
                Segment::Key("name".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_brackets() {
        let p = path("authors[0].name");
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("authors".to_string()),
                Segment::Index(0),
                Segment::Key("name".to_string())
            ]
        );

        let p = path("meta[\"first.last\"]");
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("meta".to_string()),
                Segment::Key("first.last".to_string())
            ]
        );

        let p = path("grid[1][2]");
        assert_eq!(p.segments().len(), 3);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "   ", "a..b", ".a", "a.", "a[", "a[]", "a]", "a[0]b", "a.[0]"] {
            let err = FieldPath::parse(bad).unwrap_err();
            assert!(err.is_configuration_error(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_resolve_nested() {
        let record = json!({
            "title": "Alpha",
            "author": { "name": "Ada" },
            "authors": [{ "name": "Ada" }, { "name": "Grace" }],
            "tags": ["ml", "nlp"]
        });

        assert_eq!(resolve(&record, &path("title")), Some(&json!("Alpha")));
        assert_eq!(resolve(&record, &path("author.name")), Some(&json!("Ada")));
        assert_eq!(
            resolve(&record, &path("authors[1].name")),
            Some(&json!("Grace"))
        );
        assert_eq!(
            resolve(&record, &path("authors.0.name")),
            Some(&json!("Ada"))
        );
        // Arrays are not flattened
        assert_eq!(resolve(&record, &path("tags")), Some(&json!(["ml", "nlp"])));
    }

    #[test]
    fn test_resolve_missing() {
        let record = json!({ "title": "Alpha", "venue": null, "year": 2023 });

        assert_eq!(resolve(&record, &path("missing")), None);
        assert_eq!(resolve(&record, &path("title.deeper")), None);
        assert_eq!(resolve(&record, &path("year[0]")), None);
        assert_eq!(resolve(&record, &path("venue")), None);
        assert_eq!(resolve(&json!("scalar"), &path("title")), None);
    }

    #[test]
    fn test_serde_as_string() {
        let p: FieldPath = serde_json::from_str("\"author.name\"").unwrap();
        assert_eq!(p, path("author.name"));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"author.name\"");
        assert!(serde_json::from_str::<FieldPath>("\"\"").is_err());
    }
}
