//! Per-realization result types.
//!
//! A realization is one trigger occurrence for one subject, together with
//! every window's resolved boundaries and `has` counts. The Result Shaper
//! turns a list of these into the final output table.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRealization {
    /// Normalized so `start_ts <= end_ts`, regardless of which side's
    /// boundary expression happened to resolve later.
    pub start_ts: i64,
    pub end_ts: i64,
    pub counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub subject_id: i64,
    pub trigger_ts: i64,
    pub index_timestamp: Option<i64>,
    pub label: Option<i64>,
    pub windows: BTreeMap<String, WindowRealization>,
}
