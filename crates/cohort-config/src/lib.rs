//! The task configuration compiler.
//!
//! Turns the YAML task specification into a [`compile::TaskConfig`]: typed
//! predicates, typed windows, and a validated window tree ready for the
//! recursive extractor to walk.

mod boundary;
mod compile;
mod raw;
mod tree;
mod validate;

pub use compile::{compile, TaskConfig};
pub use tree::{EdgeKind, NodeId, TreeEdge, WindowTree};

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
predicates:
  admission:
    code: ADMIT
  death:
    code: DEATH
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
    has:
      death: "(0, None)"
trigger: admission
"#;

    #[test]
    fn compiles_minimal_config() {
        let config = compile(MINIMAL).expect("minimal config should compile");
        assert_eq!(config.trigger.predicate, "admission");
        assert_eq!(config.windows.len(), 1);
        assert!(config.windows.contains_key("target"));
        assert!(config.label_window.is_none());
    }

    #[test]
    fn rejects_empty_predicates() {
        let yaml = r#"
predicates: {}
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
trigger: admission
"#;
        let err = compile(yaml).unwrap_err();
        assert!(matches!(err, cohort_types::ConfigError::EmptyPredicates));
    }

    #[test]
    fn rejects_both_endpoints_null() {
        let yaml = r#"
predicates:
  admission:
    code: ADMIT
windows:
  target:
    start: NULL
    end: NULL
    start_inclusive: true
    end_inclusive: true
trigger: admission
"#;
        let err = compile(yaml).unwrap_err();
        assert!(matches!(
            err,
            cohort_types::ConfigError::BothEndpointsNull { .. }
        ));
    }

    #[test]
    fn patient_demographics_predicate_is_a_legal_has_target() {
        let yaml = r#"
predicates:
  admission:
    code: ADMIT
patient_demographics:
  male:
    code: SEX_MALE
    static: true
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
    has:
      male: "(1, None)"
trigger: admission
"#;
        let config = compile(yaml).expect("patient_demographics predicate should be in scope");
        assert!(config.windows["target"].has.contains_key("male"));
        assert!(config.patient_demographics.contains_key("male"));
    }

    #[test]
    fn alias_window_with_identity_both_sides_still_appears_in_window_order() {
        let yaml = r#"
predicates:
  admission:
    code: ADMIT
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
  alias:
    start: target.start
    end: target.end
    start_inclusive: true
    end_inclusive: true
trigger: admission
"#;
        let config = compile(yaml).expect("alias window should compile");
        let order = config.tree.preorder_windows();
        assert!(
            order.contains(&"alias".to_string()),
            "alias window (IDENTITY on both sides, no tree edge of its own) must still be \
             discoverable, order was {order:?}"
        );
    }

    #[test]
    fn rejects_undefined_trigger() {
        let yaml = r#"
predicates:
  admission:
    code: ADMIT
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
trigger: missing
"#;
        let err = compile(yaml).unwrap_err();
        assert!(matches!(
            err,
            cohort_types::ConfigError::UndefinedTriggerPredicate(_)
        ));
    }
}
