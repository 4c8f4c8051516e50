//! Reads the wide-format predicates CSV into [`cohort_index::WideRow`]s.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use cohort_index::WideRow;
use cohort_types::SchemaError;

const SUBJECT_COLUMN: &str = "subject_id";
const TIMESTAMP_COLUMN: &str = "timestamp_us";

pub fn read_predicates_csv(path: &Path) -> Result<Vec<WideRow>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let subject_idx = headers
        .iter()
        .position(|h| h == SUBJECT_COLUMN)
        .ok_or_else(|| SchemaError::MissingColumn(SUBJECT_COLUMN.to_string()))?;
    let ts_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or_else(|| SchemaError::MissingColumn(TIMESTAMP_COLUMN.to_string()))?;

    let predicate_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| *idx != subject_idx && *idx != ts_idx && !name.is_empty())
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let subject_id: i64 = record
            .get(subject_idx)
            .context("missing subject_id field")?
            .parse()
            .context("subject_id must be an integer")?;
        let ts_us: i64 = record
            .get(ts_idx)
            .context("missing timestamp_us field")?
            .parse()
            .context("timestamp_us must be an integer microsecond value")?;

        let mut counts = BTreeMap::new();
        for (idx, name) in &predicate_columns {
            let raw = record.get(*idx).unwrap_or("");
            if raw.is_empty() {
                continue;
            }
            let value: i64 = raw.parse().map_err(|_| SchemaError::NonIntegerCount {
                column: name.clone(),
                value: raw.to_string(),
                row: row_idx,
            })?;
            counts.insert(name.clone(), value);
        }

        rows.push(WideRow {
            subject_id,
            ts_us,
            counts,
        });
    }

    Ok(rows)
}
