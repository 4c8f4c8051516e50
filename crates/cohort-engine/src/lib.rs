//! The recursive extractor and Result Shaper: walks a compiled task
//! configuration over a predicates table and emits one row per realization.

mod extractor;
mod realization;
mod shaper;

pub use extractor::extract;
pub use realization::{ResultRow, WindowRealization};
pub use shaper::{shape, ResultTable};

use cohort_config::TaskConfig;
use cohort_index::Database;
use cohort_types::RuntimeError;

/// Runs the full pipeline: extract every realization, then shape it into
/// the final output table. An empty predicates table or a trigger that
/// matches nothing produces an empty, column-complete table, not an error.
pub fn run(config: &TaskConfig, db: &Database) -> Result<ResultTable, RuntimeError> {
    let rows = extract(config, db)?;
    Ok(shape(config, rows))
}
