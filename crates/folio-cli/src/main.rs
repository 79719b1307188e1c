//! # Folio CLI
//!
//! Command-line interface for querying Folio content sections.
//!
//! ## Commands
//!
//! - `folio query <section> [words...]` - Search, filter and sort a section
//! - `folio facets <section>` - Show filter values and their counts
//! - `folio sections` - List configured sections and their sources
//! - `folio interactive <section>` - Start interactive TUI mode
//! - `folio init` - Write the default configuration file
//!
//! ## Example Usage
//!
//! ```bash
//! # Most cited 2023 publications mentioning "learning"
//! folio query publications learning --filter year=2023 --sort citations:desc
//!
//! # Same thing with the one-line query syntax
//! folio query publications learning year=2023 sort:citations:desc
//!
//! # Interactive search over blog posts
//! folio interactive blog
//! ```

mod app;
mod commands;
mod tui;

use clap::{Parser, Subcommand};
use folio_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Folio - search, filter and sort portfolio content
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search, filter and sort a content section
    Query {
        /// Section name (e.g. "blog", "publications")
        section: String,

        /// Search words, `field=value` filters, `sort:field[:dir]`, `then:field`
        words: Vec<String>,

        /// Filter a field to one value, e.g. `year=2023` (repeatable)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Sort field and optional direction, e.g. `citations:desc`
        #[arg(short, long)]
        sort: Option<String>,

        /// Fallback sort field for ties
        #[arg(short, long)]
        then: Option<String>,

        /// Maximum number of results to show (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Read records from this JSON file instead of the configured source
        #[arg(long)]
        source: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show the distinct filter values of a section
    Facets {
        /// Section name
        section: String,

        /// Read records from this JSON file instead of the configured source
        #[arg(long)]
        source: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// List configured sections and their record counts
    Sections,

    /// Start interactive TUI mode
    #[command(alias = "i")]
    Interactive {
        /// Section name
        section: String,

        /// Read records from this JSON file instead of the configured source
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so its default level applies. Init
    // writes the file, so a broken one must not stop it.
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    // Setup logging
    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config
                .as_ref()
                .map(|c| c.general.log_level.clone())
                .unwrap_or_else(|_| "info".to_string()),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Execute command
    match cli.command {
        Commands::Query {
            section,
            words,
            filter,
            sort,
            then,
            limit,
            source,
            output,
        } => commands::query::run(
            config?,
            commands::query::QueryOptions {
                section,
                words,
                filters: filter,
                sort,
                then,
                limit,
                source,
                output,
            },
        ),
        Commands::Facets {
            section,
            source,
            output,
        } => commands::facets::run(config?, &section, source, output),
        Commands::Sections => commands::sections::run(config?),
        Commands::Interactive { section, source } => tui::run(config?, &section, source),
        Commands::Init { force } => commands::init::run(cli.config.as_deref(), force),
    }
}
