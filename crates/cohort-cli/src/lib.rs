//! CLI wiring: parse args, compile the task config, ingest the predicates
//! table, run extraction, and write the result.

mod args;
mod ingest;
mod output;

pub use args::Cli;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_tracing(&cli.log_level);

    let yaml = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("reading task configuration {}", cli.config.display()))?;
    let config = cohort_config::compile(&yaml).context("compiling task configuration")?;

    let rows = ingest::read_predicates_csv(&cli.predicates)
        .with_context(|| format!("reading predicates table {}", cli.predicates.display()))?;

    let mut db = cohort_index::Database::open_in_memory().context("opening predicate store")?;
    cohort_index::ingest_wide(&mut db, rows)
        .map_err(unwrap_schema_error)
        .context("ingesting predicates table")?;

    let table = cohort_engine::run(&config, &db).context("extracting cohort")?;
    tracing::info!(rows = table.rows.len(), "extraction complete");

    output::write_results_csv(&config, &table, &cli.out)
        .with_context(|| format!("writing results to {}", cli.out.display()))?;

    Ok(())
}

/// Unwraps a schema-contract violation out of the storage layer's error
/// wrapper so `main`'s exit-code classification can downcast straight to
/// `cohort_types::SchemaError` instead of the wrapper type.
fn unwrap_schema_error(err: cohort_index::Error) -> anyhow::Error {
    match err {
        cohort_index::Error::Schema(schema_err) => anyhow::Error::new(schema_err),
        other => anyhow::Error::new(other),
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
