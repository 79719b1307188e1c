//! Configuration management for Folio.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.
//! Each content type is described by a tagged section rather than bespoke
//! code: where its records come from, which fields search text looks at,
//! which fields drive filter controls and how it sorts by default.

use crate::engine::{QueryConfig, DEFAULT_PARALLEL_THRESHOLD};
use crate::error::{FolioError, Result};
use crate::field::FieldPath;
use crate::spec::{QuerySpec, Selection, SortDirection, SortSpec};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure for Folio.
///
/// ## Example Configuration File (folio.toml)
///
/// ```toml
/// [general]
/// content_dir = "/srv/site/content"
/// max_results = 100
///
/// [performance]
/// parallel_threshold = 10000
///
/// [sections.publications]
/// source = "publications.json"
/// searchable = ["title", "authors", "venue"]
/// facets = ["year", "type"]
///
/// [sections.publications.sort]
/// field = "citations"
/// direction = "desc"
/// fallback = "title"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Performance tuning
    pub performance: PerformanceConfig,

    /// Content sections by name
    pub sections: BTreeMap<String, SectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            general: GeneralConfig::default(),
            performance: PerformanceConfig::default(),
            sections: default_sections(),
        }
    }
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory that relative section sources resolve against
    /// (None = default data directory)
    pub content_dir: Option<PathBuf>,

    /// Maximum number of results to print
    pub max_results: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            content_dir: None,
            max_results: 100,
            log_level: "info".to_string(),
        }
    }
}

/// Performance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Collection size above which queries run in parallel
    pub parallel_threshold: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        PerformanceConfig {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Configuration for one content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// JSON file holding the records (relative to the content directory)
    pub source: PathBuf,

    /// Fields matched against search text
    #[serde(default)]
    pub searchable: Vec<FieldPath>,

    /// Fields offered as filter controls
    #[serde(default)]
    pub facets: Vec<FieldPath>,

    /// Truthy values of this field always sort first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<FieldPath>,

    /// Default sort
    pub sort: SortSpec,
}

impl SectionConfig {
    fn new(source: &str, searchable: &[&str], facets: &[&str], sort: SortSpec) -> Self {
        SectionConfig {
            source: PathBuf::from(source),
            searchable: searchable.iter().map(|f| FieldPath::key(f)).collect(),
            facets: facets.iter().map(|f| FieldPath::key(f)).collect(),
            pinned: None,
            sort,
        }
    }

    /// Engine configuration for this section.
    pub fn query_config(&self, performance: &PerformanceConfig) -> QueryConfig {
        let mut config = QueryConfig::new(self.searchable.clone())
            .with_parallel_threshold(performance.parallel_threshold);
        if let Some(ref pinned) = self.pinned {
            config = config.with_pinned(pinned.clone());
        }
        config
    }

    /// The spec a freshly opened section starts with: no search text, every
    /// facet set to `all`, the section's default sort.
    pub fn default_spec(&self) -> QuerySpec {
        self.facets
            .iter()
            .fold(QuerySpec::new(self.sort.clone()), |spec, field| {
                spec.with_filter(field.clone(), Selection::All)
            })
    }
}

fn sort(field: &str, direction: SortDirection, fallback: Option<&str>) -> SortSpec {
    SortSpec {
        field: FieldPath::key(field),
        direction,
        fallback: fallback.map(FieldPath::key),
    }
}

/// Built-in sections for the portfolio's content types.
fn default_sections() -> BTreeMap<String, SectionConfig> {
    use SortDirection::{Asc, Desc};

    let mut discussions = SectionConfig::new(
        "discussions.json",
        &["title", "content", "author", "tags"],
        &["category", "tags"],
        sort("date", Desc, Some("title")),
    );
    discussions.pinned = Some(FieldPath::key("pinned"));

    [
        (
            "blog",
            SectionConfig::new(
                "blog.json",
                &["title", "excerpt", "tags"],
                &["category", "tags"],
                sort("date", Desc, Some("title")),
            ),
        ),
        (
            "publications",
            SectionConfig::new(
                "publications.json",
                &["title", "authors", "venue", "abstract"],
                &["year", "type"],
                sort("year", Desc, Some("title")),
            ),
        ),
        (
            "talks",
            SectionConfig::new(
                "talks.json",
                &["title", "event", "location", "description"],
                &["year", "type"],
                sort("date", Desc, Some("title")),
            ),
        ),
        ("discussions", discussions),
        (
            "resources",
            SectionConfig::new(
                "resources.json",
                &["title", "description", "tags"],
                &["category", "type"],
                sort("title", Asc, None),
            ),
        ),
        (
            "posters",
            SectionConfig::new(
                "posters.json",
                &["title", "conference", "authors"],
                &["year", "conference"],
                sort("date", Desc, Some("title")),
            ),
        ),
        (
            "projects",
            SectionConfig::new(
                "projects.json",
                &["title", "description", "technologies"],
                &["category", "status", "technologies"],
                sort("year", Desc, Some("title")),
            ),
        ),
    ]
    .into_iter()
    .map(|(name, section)| (name.to_string(), section))
    .collect()
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    ///
    /// Sections in the file are layered over the built-in ones: a table with
    /// a built-in name replaces that section, any other name adds one.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| FolioError::config(format!("Failed to parse config: {}", e)))?;

        for (name, section) in default_sections() {
            config.sections.entry(name).or_insert(section);
        }
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Saving configuration");
        let contents = toml::to_string_pretty(self)
            .map_err(|e| FolioError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "folio")
            .ok_or_else(|| FolioError::config("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("folio.toml"))
    }

    /// Get the default data directory path.
    pub fn default_data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "folio")
            .ok_or_else(|| FolioError::config("Could not determine data directory"))?;

        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the content directory (from config or default).
    pub fn content_dir(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.general.content_dir {
            Ok(path.clone())
        } else {
            Ok(Self::default_data_dir()?.join("content"))
        }
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Result<&SectionConfig> {
        self.sections
            .get(name)
            .ok_or_else(|| FolioError::UnknownSection {
                name: name.to_string(),
            })
    }

    /// Resolve a section's source file against the content directory.
    pub fn source_path(&self, section: &SectionConfig) -> Result<PathBuf> {
        if section.source.is_absolute() {
            Ok(section.source.clone())
        } else {
            Ok(self.content_dir()?.join(&section.source))
        }
    }
}
