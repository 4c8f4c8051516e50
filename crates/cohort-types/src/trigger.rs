use serde::{Deserialize, Serialize};

/// The single predicate whose nonzero rows are candidate root anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub predicate: String,
}
