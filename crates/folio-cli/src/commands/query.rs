//! Query command - search, filter and sort a section.

use crate::app::{record_label, App};
use crate::OutputFormat;
use anyhow::{anyhow, Context};
use folio_core::{
    parse_query, query_limited, resolve, Config, FieldPath, QuerySpec, Selection, SortSpec,
};
use std::path::PathBuf;
use std::time::Instant;

/// Options collected from the command line.
pub struct QueryOptions {
    pub section: String,
    pub words: Vec<String>,
    pub filters: Vec<String>,
    pub sort: Option<String>,
    pub then: Option<String>,
    pub limit: Option<usize>,
    pub source: Option<PathBuf>,
    pub output: OutputFormat,
}

/// Build the spec for a query: the section default, then the one-line query
/// words, then the explicit flags.
pub fn build_spec(
    base: &QuerySpec,
    words: &[String],
    filters: &[String],
    sort: Option<&str>,
    then: Option<&str>,
) -> anyhow::Result<QuerySpec> {
    let mut spec = parse_query(&words.join(" "), base)?;

    for filter in filters {
        let (field, value) = filter
            .split_once('=')
            .ok_or_else(|| anyhow!("filter must look like field=value, got '{}'", filter))?;
        spec = spec.with_filter(FieldPath::parse(field)?, Selection::parse(value));
    }

    if let Some(sort) = sort {
        let parsed = SortSpec::parse(sort)?;
        let mut next = spec.sort().clone();
        next.field = parsed.field;
        next.direction = parsed.direction;
        spec = spec.with_sort(next);
    }

    if let Some(then) = then {
        let next = spec.sort().clone().with_fallback(FieldPath::parse(then)?);
        spec = spec.with_sort(next);
    }

    Ok(spec)
}

/// Run the query command.
pub fn run(config: Config, options: QueryOptions) -> anyhow::Result<()> {
    let limit = options.limit.unwrap_or(config.general.max_results);
    let app = App::open(config, &options.section, options.source)?;

    let spec = build_spec(
        &app.section.default_spec(),
        &options.words,
        &options.filters,
        options.sort.as_deref(),
        options.then.as_deref(),
    )
    .context("invalid query")?;
    let query_config = app.section.query_config(&app.config.performance);

    let start = Instant::now();
    let results = query_limited(app.collection.records(), &spec, &query_config, limit);
    let elapsed = start.elapsed();

    match options.output {
        OutputFormat::Text => {
            let sort_field = &spec.sort().field;
            for record in &results {
                match resolve(record, sort_field) {
                    Some(value) => {
                        println!("{}  [{}: {}]", record_label(record), sort_field, value)
                    }
                    None => println!("{}", record_label(record)),
                }
            }

            eprintln!();
            eprintln!(
                "Found {} results ({} records, sorted by {}) in {:.3}ms",
                results.len(),
                app.collection.len(),
                spec.sort(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
