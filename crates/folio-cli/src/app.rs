//! Application state management.

use anyhow::Context;
use folio_core::types::scalar_text;
use folio_core::{Collection, Config, ListView, SectionConfig};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// One opened content section.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Section name
    pub name: String,

    /// Section configuration
    pub section: SectionConfig,

    /// Where the records were read from
    pub source_path: PathBuf,

    /// The section's records
    pub collection: Collection,
}

impl App {
    /// Open a section, reading its records from `source` when given and
    /// from the configured source file otherwise.
    pub fn open(config: Config, name: &str, source: Option<PathBuf>) -> anyhow::Result<Self> {
        let section = config.section(name)?.clone();
        let source_path = match source {
            Some(path) => path,
            None => config.source_path(&section)?,
        };

        let collection = Collection::load(&source_path).with_context(|| {
            format!(
                "failed to load section '{}' from {}",
                name,
                source_path.display()
            )
        })?;

        info!(
            section = name,
            source = %source_path.display(),
            records = collection.len(),
            "Section opened"
        );

        Ok(App {
            config,
            name: name.to_string(),
            section,
            source_path,
            collection,
        })
    }

    /// Build a list view over the section with its default spec.
    pub fn into_view(self) -> (String, ListView) {
        let view = ListView::for_section(self.collection, &self.section, &self.config.performance);
        (self.name, view)
    }
}

/// Short human-readable label for a record.
pub fn record_label(record: &Value) -> String {
    for key in ["title", "name"] {
        if let Some(text) = record.get(key).and_then(scalar_text) {
            return text.into_owned();
        }
    }
    record.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_section() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("blog.json"),
            r#"[{"title": "Hello", "date": "2024-01-01"}]"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.general.content_dir = Some(temp_dir.path().to_path_buf());

        let app = App::open(config, "blog", None).unwrap();
        assert_eq!(app.collection.len(), 1);

        let (name, view) = app.into_view();
        assert_eq!(name, "blog");
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_open_unknown_section() {
        assert!(App::open(Config::default(), "recipes", None).is_err());
    }

    #[test]
    fn test_open_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let result = App::open(
            Config::default(),
            "blog",
            Some(temp_dir.path().join("nope.json")),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_record_label() {
        assert_eq!(record_label(&json!({"title": "Alpha"})), "Alpha");
        assert_eq!(record_label(&json!({"name": "Folio"})), "Folio");
        assert_eq!(record_label(&json!({"id": 1})), r#"{"id":1}"#);
    }
}
