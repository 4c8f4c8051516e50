//! The predicate model. The core only cares
//! about predicate *names*; code/value matching semantics are consumed by
//! the external EHR-ingestion collaborator that produces the predicates
//! table, so [`PlainPredicate`] is carried through largely opaque.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How a plain predicate's `code` field selects source events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateCode {
    Literal(String),
    Any { any: Vec<String> },
    Regex { regex: String },
}

/// A predicate defined directly over raw events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainPredicate {
    pub code: PredicateCode,
    #[serde(default)]
    pub value_min: Option<f64>,
    #[serde(default)]
    pub value_max: Option<f64>,
    #[serde(default = "default_true")]
    pub value_min_inclusive: bool,
    #[serde(default = "default_true")]
    pub value_max_inclusive: bool,
    #[serde(default)]
    pub other_cols: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub r#static: bool,
}

fn default_true() -> bool {
    true
}

/// A predicate defined as a boolean combination of other predicates.
/// No nesting and no negation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedExpr {
    And(Vec<String>),
    Or(Vec<String>),
}

impl DerivedExpr {
    pub fn operands(&self) -> &[String] {
        match self {
            DerivedExpr::And(names) | DerivedExpr::Or(names) => names,
        }
    }

    /// Parses `and(p1, p2, ...)` or `or(p1, p2, ...)`.
    pub fn parse(expr: &str) -> Option<DerivedExpr> {
        let expr = expr.trim();
        let (kind, body) = if let Some(body) = expr.strip_prefix("and(") {
            ("and", body)
        } else if let Some(body) = expr.strip_prefix("or(") {
            ("or", body)
        } else {
            return None;
        };
        let body = body.strip_suffix(')')?;
        let operands: Vec<String> = body
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if operands.is_empty() {
            return None;
        }
        Some(match kind {
            "and" => DerivedExpr::And(operands),
            _ => DerivedExpr::Or(operands),
        })
    }
}

/// One entry under `predicates:` — either a plain or a derived predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateDef {
    Derived { expr: String },
    Plain(PlainPredicate),
}

/// The predicate column that is always present and always `1`.
pub const ANY_EVENT: &str = "_ANY_EVENT";
/// Present on the chronologically first row per subject, when supplied.
pub const RECORD_START: &str = "_RECORD_START";
/// Present on the chronologically last row per subject, when supplied.
pub const RECORD_END: &str = "_RECORD_END";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_derived_expr() {
        assert_eq!(
            DerivedExpr::parse("and(a, b, c)"),
            Some(DerivedExpr::And(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(
            DerivedExpr::parse("or(x)"),
            Some(DerivedExpr::Or(vec!["x".into()]))
        );
        assert_eq!(DerivedExpr::parse("not(a)"), None);
        assert_eq!(DerivedExpr::parse("and()"), None);
    }
}
