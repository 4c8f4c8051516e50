//! The reference and endpoint-expression model.
//!
//! A [`Reference`] names one of the timestamps a window boundary can be
//! anchored to. An [`EndpointExpr`] is the tagged variant the compiler
//! resolves every `start`/`end` field to; its variants are exactly the
//! boundary-expr grammar.

use serde::{Deserialize, Serialize};

use crate::duration::Duration;

/// Which side of a window an endpoint belongs to, also used to tag a `NULL`
/// endpoint (earliest vs. latest record timestamp) and an `index_timestamp`
/// selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Start,
    End,
}

/// A named timestamp that an endpoint expression can be anchored to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reference {
    Trigger,
    WindowStart(String),
    WindowEnd(String),
}

impl Reference {
    /// The window this reference points into, if any (`Trigger` has none).
    pub fn window_name(&self) -> Option<&str> {
        match self {
            Reference::Trigger => None,
            Reference::WindowStart(name) | Reference::WindowEnd(name) => Some(name.as_str()),
        }
    }
}

/// The resolved form of a window's `start` or `end` field.
///
/// Equality on this type is what lets the tree builder merge two boundary
/// nodes that were written differently but denote the same timestamp (e.g.
/// `target.start` declared as `IDENTITY(gap.end)` and `gap.end` declared as
/// `NULL` both resolving through the same chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointExpr {
    /// Earliest (`Side::Start`) or latest (`Side::End`) timestamp in the
    /// subject's record.
    Null(Side),
    /// Same timestamp as `reference`.
    Identity(Reference),
    /// `reference` timestamp plus a signed duration.
    Offset(Reference, Duration),
    /// First row at or after `reference` whose `predicate` count is
    /// positive (subject to the edge's inclusivity).
    Next(Reference, String),
    /// First row at or before `reference` whose `predicate` count is
    /// positive (subject to the edge's inclusivity).
    Prev(Reference, String),
}

impl EndpointExpr {
    /// The reference this expression is anchored to, if it has one
    /// (`Null` has none).
    pub fn reference(&self) -> Option<&Reference> {
        match self {
            EndpointExpr::Null(_) => None,
            EndpointExpr::Identity(r) | EndpointExpr::Offset(r, _) => Some(r),
            EndpointExpr::Next(r, _) | EndpointExpr::Prev(r, _) => Some(r),
        }
    }
}
