//! Cross-field validation that runs once the raw YAML has been parsed into
//! typed predicate/window values but before the window tree is built.

use std::collections::{BTreeMap, HashSet};

use cohort_types::predicate::{DerivedExpr, PredicateDef};
use cohort_types::{ConfigError, EndpointExpr, Reference};

pub fn validate_predicates(
    predicates: &BTreeMap<String, PredicateDef>,
) -> Result<(), ConfigError> {
    if predicates.is_empty() {
        return Err(ConfigError::EmptyPredicates);
    }

    for (name, def) in predicates {
        if let PredicateDef::Derived { expr } = def {
            let parsed = DerivedExpr::parse(expr).ok_or_else(|| ConfigError::InvalidBoundaryExpr {
                window: name.clone(),
                field: "expr".to_string(),
                reason: format!("malformed derived predicate expression {expr:?}"),
            })?;
            for operand in parsed.operands() {
                if !predicates.contains_key(operand) {
                    return Err(ConfigError::UndefinedDerivedOperand {
                        name: name.clone(),
                        operand: operand.clone(),
                    });
                }
            }
        }
    }

    for name in predicates.keys() {
        check_acyclic(name, predicates, &mut HashSet::new(), &mut HashSet::new())?;
    }

    Ok(())
}

fn check_acyclic(
    name: &str,
    predicates: &BTreeMap<String, PredicateDef>,
    visiting: &mut HashSet<String>,
    done: &mut HashSet<String>,
) -> Result<(), ConfigError> {
    if done.contains(name) {
        return Ok(());
    }
    if !visiting.insert(name.to_string()) {
        return Err(ConfigError::CyclicDerivedPredicate(name.to_string()));
    }

    if let Some(PredicateDef::Derived { expr }) = predicates.get(name) {
        if let Some(parsed) = DerivedExpr::parse(expr) {
            for operand in parsed.operands() {
                check_acyclic(operand, predicates, visiting, done)?;
            }
        }
    }

    visiting.remove(name);
    done.insert(name.to_string());
    Ok(())
}

pub fn validate_trigger(
    trigger_predicate: &str,
    predicates: &BTreeMap<String, PredicateDef>,
) -> Result<(), ConfigError> {
    if trigger_predicate.is_empty() {
        return Err(ConfigError::MissingTrigger);
    }
    if !predicates.contains_key(trigger_predicate) {
        return Err(ConfigError::UndefinedTriggerPredicate(
            trigger_predicate.to_string(),
        ));
    }
    Ok(())
}

/// Enforces the directional rules: NEXT may only search forward
/// into a later anchor (`end` fields target `trigger` or another window's
/// `end`, never a `start`), and PREV is the mirror image for `start` fields.
pub fn validate_next_prev_targets(
    window: &str,
    field: &str,
    expr: &EndpointExpr,
) -> Result<(), ConfigError> {
    match (field, expr) {
        ("start", EndpointExpr::Next(reference @ Reference::WindowStart(_), _)) => {
            Err(ConfigError::IllegalNextTarget {
                window: window.to_string(),
                actual: describe_reference(reference),
            })
        }
        ("end", EndpointExpr::Prev(reference @ Reference::WindowEnd(_), _)) => {
            Err(ConfigError::IllegalPrevTarget {
                window: window.to_string(),
                actual: describe_reference(reference),
            })
        }
        _ => Ok(()),
    }
}

fn describe_reference(reference: &Reference) -> String {
    match reference {
        Reference::Trigger => "trigger".to_string(),
        Reference::WindowStart(name) => format!("{name}.start"),
        Reference::WindowEnd(name) => format!("{name}.end"),
    }
}

/// An OFFSET of zero duration is indistinguishable from IDENTITY and is
/// rejected rather than silently accepted.
pub fn validate_offset_nonzero(window: &str, field: &str, micros: i64) -> Result<(), ConfigError> {
    if micros == 0 {
        return Err(ConfigError::NonFiniteOffset {
            window: window.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

/// An OFFSET anchored to a window's `end` may only move earlier (closing
/// back toward the trigger); one anchored to `trigger` or a `start` may only
/// move later. Mixing the two produces a boundary that contradicts the
/// ordering its own reference implies.
pub fn validate_offset_sign(
    window: &str,
    field: &str,
    reference: &Reference,
    micros: i64,
) -> Result<(), ConfigError> {
    let ok = match reference {
        Reference::WindowEnd(_) => micros <= 0,
        Reference::WindowStart(_) | Reference::Trigger => micros >= 0,
    };
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InconsistentOffsetSign {
            window: window.to_string(),
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn derived(expr: &str) -> PredicateDef {
        PredicateDef::Derived {
            expr: expr.to_string(),
        }
    }

    #[test]
    fn detects_cycle() {
        let mut predicates = BTreeMap::new();
        predicates.insert("a".to_string(), derived("and(b)"));
        predicates.insert("b".to_string(), derived("and(a)"));
        assert!(matches!(
            validate_predicates(&predicates),
            Err(ConfigError::CyclicDerivedPredicate(_))
        ));
    }

    #[test]
    fn detects_undefined_operand() {
        let mut predicates = BTreeMap::new();
        predicates.insert("a".to_string(), derived("and(missing)"));
        assert!(matches!(
            validate_predicates(&predicates),
            Err(ConfigError::UndefinedDerivedOperand { .. })
        ));
    }

    #[test]
    fn rejects_next_targeting_start() {
        let expr = EndpointExpr::Next(Reference::WindowStart("other".into()), "death".into());
        assert!(matches!(
            validate_next_prev_targets("w", "start", &expr),
            Err(ConfigError::IllegalNextTarget { .. })
        ));
    }
}
