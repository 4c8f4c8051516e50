//! Converts the wide `(subject_id, timestamp, <predicate columns>)` source
//! contract into narrow storage, enforcing the schema invariants
//! before a single row reaches the database.

use std::collections::{BTreeMap, HashSet};

use cohort_types::SchemaError;

use crate::db::{Database, Observation};
use crate::error::Result;

/// One source row: a subject, a timestamp, and the nonzero predicate counts
/// observed at that instant. Parsing the source format (CSV, parquet, ...)
/// is an external concern; this module only enforces the data contract.
pub struct WideRow {
    pub subject_id: i64,
    pub ts_us: i64,
    pub counts: BTreeMap<String, i64>,
}

pub fn ingest_wide(db: &mut Database, rows: Vec<WideRow>) -> Result<()> {
    let mut seen_keys: HashSet<(i64, i64)> = HashSet::new();
    let mut per_predicate: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    let mut last_ts_by_subject: BTreeMap<i64, i64> = BTreeMap::new();

    for row in &rows {
        if !seen_keys.insert((row.subject_id, row.ts_us)) {
            return Err(SchemaError::DuplicateKey {
                subject_id: row.subject_id,
                timestamp_us: row.ts_us,
            }
            .into());
        }

        if let Some(&prev) = last_ts_by_subject.get(&row.subject_id) {
            if row.ts_us < prev {
                return Err(SchemaError::NonMonotoneTimestamps {
                    subject_id: row.subject_id,
                }
                .into());
            }
        }
        last_ts_by_subject.insert(row.subject_id, row.ts_us);

        for (predicate, count) in &row.counts {
            if *count == 0 {
                continue;
            }
            per_predicate
                .entry(predicate.clone())
                .or_default()
                .push(Observation {
                    subject_id: row.subject_id,
                    ts_us: row.ts_us,
                    count: *count,
                });
        }
    }

    for (predicate, observations) in per_predicate {
        db.insert_observations(&predicate, &observations)?;
    }

    Ok(())
}
