//! Storage schema for the predicate-count table.
//!
//! The source contract is wide — one row per `(subject_id, timestamp)` with
//! one column per predicate — but rows are stored narrow so the set of
//! predicates a task config declares never has to match a fixed column
//! list. Wide-format uniqueness is enforced at ingest time, before any row
//! reaches this table.

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current_version != SCHEMA_VERSION {
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS predicate_counts (
            subject_id INTEGER NOT NULL,
            ts_us INTEGER NOT NULL,
            predicate TEXT NOT NULL,
            count INTEGER NOT NULL,
            PRIMARY KEY (subject_id, ts_us, predicate)
        );

        CREATE INDEX IF NOT EXISTS idx_predicate_counts_lookup
            ON predicate_counts(subject_id, predicate, ts_us);
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {SCHEMA_VERSION}"), [])?;
    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch("DROP TABLE IF EXISTS predicate_counts;")?;
    Ok(())
}
