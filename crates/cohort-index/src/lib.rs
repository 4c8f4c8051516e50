//! In-memory predicate-count storage and the aggregation kernel.
//!
//! Events are ingested once from an external wide source table into narrow
//! SQLite storage ([`db`]), then read back per `(subject, predicate)` as a
//! timestamp-sorted timeline that [`kernel`] reduces to the counts and
//! boundary matches the recursive extractor needs.

pub mod db;
pub mod error;
pub mod ingest;
pub mod kernel;
mod schema;

pub use db::{Database, Observation};
pub use error::{Error, Result};
pub use ingest::{ingest_wide, WideRow};
