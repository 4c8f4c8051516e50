//! The error taxonomy. Every variant is fatal at first occurrence;
//! none are retried internally — each recursion frame simply propagates the
//! failure upward and the caller's partial result is discarded.
//!
//! An empty-input warning is deliberately not a variant here: an
//! empty predicates table or a trigger that matches no rows is not an
//! error, it is an empty result table (see `cohort_engine::extract`).

use thiserror::Error;

/// Raised while parsing or validating a task configuration document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse configuration document: {0}")]
    Parse(String),

    #[error("unknown field {field:?} in {context}")]
    UnknownField { context: String, field: String },

    #[error("duplicate name {name:?} in {context}")]
    DuplicateName { context: String, name: String },

    #[error("predicates must be non-empty")]
    EmptyPredicates,

    #[error("trigger is required")]
    MissingTrigger,

    #[error("trigger predicate {0:?} is not defined")]
    UndefinedTriggerPredicate(String),

    #[error("derived predicate {name:?} references undefined predicate {operand:?}")]
    UndefinedDerivedOperand { name: String, operand: String },

    #[error("derived predicate DAG contains a cycle through {0:?}")]
    CyclicDerivedPredicate(String),

    #[error("windows must be non-empty")]
    EmptyWindows,

    #[error("window {window:?} references undefined window {target:?}")]
    UndefinedWindowReference { window: String, target: String },

    #[error("window {window:?} has constraint on undefined predicate {predicate:?}")]
    UndefinedHasPredicate { window: String, predicate: String },

    #[error("more than one window declares `label`: {first:?} and {second:?}")]
    MultipleLabels { first: String, second: String },

    #[error(
        "more than one window declares `index_timestamp`: {first:?} and {second:?}"
    )]
    MultipleIndexTimestamps { first: String, second: String },

    #[error("window {window:?} has both `start` and `end` set to NULL")]
    BothEndpointsNull { window: String },

    #[error(
        "window {window:?} has `start` using NEXT but it must target `end` (found {actual:?})"
    )]
    IllegalNextTarget { window: String, actual: String },

    #[error(
        "window {window:?} has `end` using PREV but it must target `start` (found {actual:?})"
    )]
    IllegalPrevTarget { window: String, actual: String },

    #[error("window {window:?} field {field:?}: {reason}")]
    InvalidBoundaryExpr {
        window: String,
        field: String,
        reason: String,
    },

    #[error("window {window:?} field {field:?}: malformed duration {text:?}")]
    MalformedDuration {
        window: String,
        field: String,
        text: String,
    },

    #[error("window {window:?} field {field:?}: OFFSET duration must be finite and nonzero")]
    NonFiniteOffset { window: String, field: String },

    #[error(
        "window {window:?} field {field:?}: offset sign is inconsistent with its reference direction"
    )]
    InconsistentOffsetSign { window: String, field: String },

    #[error("window {window:?} `has` entry {predicate:?}: malformed range {text:?}")]
    MalformedRange {
        window: String,
        predicate: String,
        text: String,
    },

    #[error(
        "the window graph rooted at the trigger is not a tree: node {0:?} is unreachable or shared by more than one parent edge"
    )]
    NotATree(String),
}

/// Raised when the predicates table does not satisfy the predicate-count
/// table data contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("predicates table is missing required column {0:?}")]
    MissingColumn(String),

    #[error("(subject_id, timestamp) is not unique: duplicate at subject {subject_id}, ts {timestamp_us}")]
    DuplicateKey {
        subject_id: i64,
        timestamp_us: i64,
    },

    #[error("predicate column {column:?} has a non-integer count {value:?} at row {row}")]
    NonIntegerCount {
        column: String,
        value: String,
        row: usize,
    },

    #[error("timestamps are not monotone for subject {subject_id} after sort")]
    NonMonotoneTimestamps { subject_id: i64 },
}

/// Raised for unexpected failures surfaced with enough context to locate the
/// offending subtree and subject set.
#[derive(Debug, Error)]
#[error("runtime error in window {node:?} (subjects: {subject_count}): {message}")]
pub struct RuntimeError {
    pub node: String,
    pub subject_count: usize,
    pub message: String,
}
