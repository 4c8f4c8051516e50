//! The `Database` wrapper: owns the rusqlite connection and exposes the
//! narrow read/write operations the aggregation kernel and ingest path need.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::schema;

/// One sparse predicate observation: nonzero count at a given subject and
/// timestamp. Zero-count predicate columns in the source wide row are
/// simply not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub subject_id: i64,
    pub ts_us: i64,
    pub count: i64,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        schema::init_schema(&db.conn)?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        schema::init_schema(&db.conn)?;
        Ok(db)
    }

    /// Bulk-inserts observations for a single predicate inside one
    /// transaction. Called once per predicate column while ingesting a wide
    /// source table.
    pub fn insert_observations(&mut self, predicate: &str, rows: &[Observation]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO predicate_counts (subject_id, ts_us, predicate, count)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(params![row.subject_id, row.ts_us, predicate, row.count])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// The full, timestamp-sorted observation list for one subject and
    /// predicate. The aggregation kernel operates entirely on this slice.
    pub fn timeline(&self, subject_id: i64, predicate: &str) -> Result<Vec<(i64, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT ts_us, count FROM predicate_counts
             WHERE subject_id = ?1 AND predicate = ?2
             ORDER BY ts_us ASC",
        )?;
        let rows = stmt
            .query_map(params![subject_id, predicate], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every subject with at least one row, used when no trigger-window
    /// reduces the working set yet.
    pub fn subject_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT subject_id FROM predicate_counts ORDER BY subject_id")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_observations() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_observations(
            "death",
            &[
                Observation {
                    subject_id: 1,
                    ts_us: 100,
                    count: 1,
                },
                Observation {
                    subject_id: 1,
                    ts_us: 200,
                    count: 1,
                },
            ],
        )
        .unwrap();

        let timeline = db.timeline(1, "death").unwrap();
        assert_eq!(timeline, vec![(100, 1), (200, 1)]);
        assert_eq!(db.subject_ids().unwrap(), vec![1]);
    }

    #[test]
    fn missing_predicate_is_empty_timeline() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.timeline(1, "death").unwrap().is_empty());
    }
}
