//! Content collections.
//!
//! A [`Collection`] is an immutable, fully materialized list of records
//! loaded once from a JSON array (a file or an in-memory document).

use crate::error::{FolioError, Result};
use crate::types::kind_name;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// An immutable list of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    records: Vec<Value>,
}

impl Collection {
    pub fn new(records: Vec<Value>) -> Self {
        Collection { records }
    }

    /// Build a collection from a JSON document that must be an array.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(records) => Ok(Collection { records }),
            other => Err(FolioError::NotACollection {
                found: kind_name(&other).to_string(),
            }),
        }
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Load a JSON array of records from a file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading collection");
        let contents = fs::read_to_string(path)?;
        let collection = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            records = collection.len(),
            "Collection loaded"
        );
        Ok(collection)
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Value>> for Collection {
    fn from(records: Vec<Value>) -> Self {
        Collection::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_from_json_str() {
        let collection = Collection::from_json_str(r#"[{"title": "a"}, {"title": "b"}]"#).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.records()[1], json!({"title": "b"}));
    }

    #[test]
    fn test_non_array_rejected() {
        let err = Collection::from_json_str(r#"{"title": "a"}"#).unwrap_err();
        assert!(matches!(err, FolioError::NotACollection { ref found } if found == "object"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_invalid_json() {
        let err = Collection::from_json_str("[{").unwrap_err();
        assert!(matches!(err, FolioError::Json(_)));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("posts.json");
        fs::write(&file, r#"[{"title": "Hello"}]"#).unwrap();

        let collection = Collection::load(&file).unwrap();
        assert_eq!(collection.len(), 1);

        let missing = Collection::load(&temp_dir.path().join("missing.json"));
        assert!(matches!(missing, Err(FolioError::Io(_))));
    }

    #[test]
    fn test_empty_array() {
        let collection = Collection::from_json_str("[]").unwrap();
        assert!(collection.is_empty());
    }
}
