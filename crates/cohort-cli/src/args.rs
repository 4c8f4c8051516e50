//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "cohort-extract",
    about = "Extract a task-specific cohort from a predicates table",
    version
)]
pub struct Cli {
    /// Path to the YAML task configuration.
    #[arg(long)]
    pub config: PathBuf,

    /// Path to the wide-format predicates CSV (`subject_id`, `timestamp`,
    /// one column per predicate).
    #[arg(long)]
    pub predicates: PathBuf,

    /// Path to write the extracted cohort CSV to.
    #[arg(long)]
    pub out: PathBuf,

    /// Tracing filter directive, e.g. `info` or `cohort_engine=debug`.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
