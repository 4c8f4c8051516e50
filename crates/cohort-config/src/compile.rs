//! Top-level compilation entry point: turns a YAML document into a
//! [`TaskConfig`] whose window tree has already been built and validated.

use std::collections::BTreeMap;

use cohort_types::predicate::PredicateDef;
use cohort_types::{ConfigError, CountRange, EndpointExpr, Side, Trigger, WindowSpec};

use crate::boundary::{parse_count_range, parse_endpoint};
use crate::raw::{parse_document, RawConfig, RawWindow};
use crate::tree::{self, WindowTree};
use crate::validate::{
    validate_next_prev_targets, validate_offset_nonzero, validate_offset_sign, validate_predicates,
    validate_trigger,
};

/// A fully validated, immutable task configuration, ready to drive
/// extraction against a predicates table.
#[derive(Debug)]
pub struct TaskConfig {
    pub predicates: BTreeMap<String, PredicateDef>,
    pub patient_demographics: BTreeMap<String, PredicateDef>,
    pub trigger: Trigger,
    pub windows: BTreeMap<String, WindowSpec>,
    pub tree: WindowTree,
    pub label_window: Option<String>,
    pub index_timestamp: Option<(String, Side)>,
}

pub fn compile(yaml: &str) -> Result<TaskConfig, ConfigError> {
    let raw: RawConfig = parse_document(yaml).map_err(ConfigError::Parse)?;

    validate_predicates(&raw.predicates)?;
    let all_predicates = if raw.patient_demographics.is_empty() {
        raw.predicates.clone()
    } else {
        let merged = merged(&raw.predicates, &raw.patient_demographics);
        validate_predicates(&merged)?;
        merged
    };
    validate_trigger(&raw.trigger, &all_predicates)?;

    if raw.windows.is_empty() {
        return Err(ConfigError::EmptyWindows);
    }

    let mut windows = BTreeMap::new();
    let mut label_window: Option<String> = None;
    let mut index_timestamp: Option<(String, Side)> = None;

    for (name, raw_window) in &raw.windows {
        let spec = compile_window(name, raw_window, &all_predicates, &raw.windows)?;

        if spec.label.is_some() {
            if let Some(first) = &label_window {
                return Err(ConfigError::MultipleLabels {
                    first: first.clone(),
                    second: name.clone(),
                });
            }
            label_window = Some(name.clone());
        }

        if let Some(side) = spec.index_timestamp {
            if let Some((first, _)) = &index_timestamp {
                return Err(ConfigError::MultipleIndexTimestamps {
                    first: first.clone(),
                    second: name.clone(),
                });
            }
            index_timestamp = Some((name.clone(), side));
        }

        windows.insert(name.clone(), spec);
    }

    let built_tree = tree::build(&windows)?;

    Ok(TaskConfig {
        predicates: raw.predicates,
        patient_demographics: raw.patient_demographics,
        trigger: Trigger {
            predicate: raw.trigger,
        },
        windows,
        tree: built_tree,
        label_window,
        index_timestamp,
    })
}

fn merged(
    a: &BTreeMap<String, PredicateDef>,
    b: &BTreeMap<String, PredicateDef>,
) -> BTreeMap<String, PredicateDef> {
    let mut out = a.clone();
    out.extend(b.clone());
    out
}

fn compile_window(
    name: &str,
    raw: &RawWindow,
    predicates: &BTreeMap<String, PredicateDef>,
    all_windows: &BTreeMap<String, RawWindow>,
) -> Result<WindowSpec, ConfigError> {
    let start_expr = parse_endpoint(&raw.start, Side::Start).map_err(|reason| {
        ConfigError::InvalidBoundaryExpr {
            window: name.to_string(),
            field: "start".to_string(),
            reason,
        }
    })?;
    let end_expr = parse_endpoint(&raw.end, Side::End).map_err(|reason| {
        ConfigError::InvalidBoundaryExpr {
            window: name.to_string(),
            field: "end".to_string(),
            reason,
        }
    })?;

    if matches!(start_expr, EndpointExpr::Null(_)) && matches!(end_expr, EndpointExpr::Null(_)) {
        return Err(ConfigError::BothEndpointsNull {
            window: name.to_string(),
        });
    }

    validate_next_prev_targets(name, "start", &start_expr)?;
    validate_next_prev_targets(name, "end", &end_expr)?;

    for (field, expr) in [("start", &start_expr), ("end", &end_expr)] {
        check_reference_exists(name, field, expr, all_windows)?;
        if let EndpointExpr::Offset(reference, delta) = expr {
            validate_offset_nonzero(name, field, delta.as_micros())?;
            validate_offset_sign(name, field, reference, delta.as_micros())?;
        }
        if let EndpointExpr::Next(_, predicate) | EndpointExpr::Prev(_, predicate) = expr {
            if !predicates.contains_key(predicate) {
                return Err(ConfigError::UndefinedHasPredicate {
                    window: name.to_string(),
                    predicate: predicate.clone(),
                });
            }
        }
    }

    let mut has = BTreeMap::new();
    for (predicate, range_text) in &raw.has {
        if !predicates.contains_key(predicate) {
            return Err(ConfigError::UndefinedHasPredicate {
                window: name.to_string(),
                predicate: predicate.clone(),
            });
        }
        let range: CountRange = parse_count_range(range_text).map_err(|text| {
            ConfigError::MalformedRange {
                window: name.to_string(),
                predicate: predicate.clone(),
                text,
            }
        })?;
        has.insert(predicate.clone(), range);
    }

    if let Some(label_predicate) = &raw.label {
        if !predicates.contains_key(label_predicate) {
            return Err(ConfigError::UndefinedHasPredicate {
                window: name.to_string(),
                predicate: label_predicate.clone(),
            });
        }
    }

    let index_timestamp = match raw.index_timestamp.as_deref() {
        None => None,
        Some("start") => Some(Side::Start),
        Some("end") => Some(Side::End),
        Some(other) => {
            return Err(ConfigError::InvalidBoundaryExpr {
                window: name.to_string(),
                field: "index_timestamp".to_string(),
                reason: format!("expected start or end, found {other:?}"),
            })
        }
    };

    Ok(WindowSpec {
        name: name.to_string(),
        start_expr,
        end_expr,
        start_inclusive: raw.start_inclusive,
        end_inclusive: raw.end_inclusive,
        has,
        label: raw.label.clone(),
        index_timestamp,
    })
}

fn check_reference_exists(
    window: &str,
    field: &str,
    expr: &EndpointExpr,
    all_windows: &BTreeMap<String, RawWindow>,
) -> Result<(), ConfigError> {
    if let Some(target) = expr.reference().and_then(|r| r.window_name()) {
        if target != window && !all_windows.contains_key(target) {
            return Err(ConfigError::UndefinedWindowReference {
                window: window.to_string(),
                target: target.to_string(),
            });
        }
    }
    Ok(())
}
