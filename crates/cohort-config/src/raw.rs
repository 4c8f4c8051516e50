//! The literal YAML shape, deserialized before any cross-field
//! validation runs. Field names here are load-bearing — they are exactly
//! the keys a task author writes.

use std::collections::BTreeMap;

use cohort_types::predicate::PredicateDef;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub predicates: BTreeMap<String, PredicateDef>,
    #[serde(default)]
    pub patient_demographics: BTreeMap<String, PredicateDef>,
    pub trigger: String,
    pub windows: BTreeMap<String, RawWindow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawWindow {
    pub start: String,
    pub end: String,
    pub start_inclusive: bool,
    pub end_inclusive: bool,
    #[serde(default)]
    pub has: BTreeMap<String, String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub index_timestamp: Option<String>,
}

pub fn parse_document(yaml: &str) -> Result<RawConfig, String> {
    serde_yaml::from_str(yaml).map_err(|e| e.to_string())
}
