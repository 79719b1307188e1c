//! Facets command - show filter values and their counts.

use crate::app::App;
use crate::OutputFormat;
use folio_core::{summarize, Config};
use std::path::PathBuf;

/// Run the facets command.
pub fn run(
    config: Config,
    section: &str,
    source: Option<PathBuf>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let app = App::open(config, section, source)?;
    let summary = summarize(app.collection.records(), &app.section.facets);

    match output {
        OutputFormat::Text => {
            if summary.is_empty() {
                println!("Section '{}' has no facet fields configured.", app.name);
                return Ok(());
            }

            println!(
                "{} ({} records from {})",
                app.name,
                app.collection.len(),
                app.source_path.display()
            );
            println!();

            for facet in summary.iter() {
                println!("{}:", facet.field);
                if facet.values.is_empty() {
                    println!("  (no values)");
                }
                for value in &facet.values {
                    println!("  {}", value);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
