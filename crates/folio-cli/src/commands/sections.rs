//! Sections command - list configured sections and their sources.

use folio_core::{Collection, Config};

/// Run the sections command.
pub fn run(config: Config) -> anyhow::Result<()> {
    println!("Folio Sections");
    println!("==============");
    println!();

    if config.sections.is_empty() {
        println!("No sections configured. Run 'folio init' to write the defaults.");
        return Ok(());
    }

    for (name, section) in &config.sections {
        let path = config.source_path(section)?;
        let status = if !path.exists() {
            "missing".to_string()
        } else {
            match Collection::load(&path) {
                Ok(collection) => format!("{} records", collection.len()),
                Err(e) => format!("unreadable: {}", e),
            }
        };

        println!("  {:<14} {} ({})", name, path.display(), status);
        println!("    sort:       {}", section.sort);
        if let Some(ref pinned) = section.pinned {
            println!("    pinned:     {}", pinned);
        }
        println!("    searchable: {}", join(&section.searchable));
        println!("    facets:     {}", join(&section.facets));
    }

    println!();
    println!("Content directory: {}", config.content_dir()?.display());

    Ok(())
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
