//! The seven canonical end-to-end scenarios: in-hospital mortality, imminent
//! mortality, abnormal SpO2, an empty trigger, an event-bound tie, a
//! two-window intersection exercising inner-join semantics, and a NULL
//! boundary resolving against the subject's own record span.

use chrono::NaiveDateTime;

const HOUR_US: i64 = 3_600_000_000;

fn ts(s: &str) -> i64 {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
        .timestamp_micros()
}

#[derive(Debug, Clone)]
pub struct EventRow {
    pub subject_id: i64,
    pub ts_us: i64,
    pub counts: Vec<(&'static str, i64)>,
}

pub struct Scenario {
    pub name: &'static str,
    pub config_yaml: &'static str,
    pub rows: Vec<EventRow>,
}

fn row(subject_id: i64, ts_us: i64, counts: &[(&'static str, i64)]) -> EventRow {
    EventRow {
        subject_id,
        ts_us,
        counts: counts.to_vec(),
    }
}

/// A: a subject admitted and dying within the 24h target window should be
/// labeled positive; a subject admitted and discharged should be negative.
pub fn in_hospital_mortality() -> Scenario {
    Scenario {
        name: "in_hospital_mortality",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  death:
    code: DEATH
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
    label: death
trigger: admission
"#,
        rows: vec![
            row(1, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(1, ts("2024-01-01 10:00:00"), &[("death", 1)]),
            row(2, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(2, ts("2024-01-03 00:00:00"), &[("death", 1)]),
        ],
    }
}

/// B: a gap window pushes the target window's start away from the trigger,
/// so a death inside the gap does not count toward the label.
pub fn imminent_mortality() -> Scenario {
    Scenario {
        name: "imminent_mortality",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  death:
    code: DEATH
windows:
  gap:
    start: trigger
    end: trigger + 12h
    start_inclusive: true
    end_inclusive: false
  target:
    start: gap.end
    end: trigger + 48h
    start_inclusive: true
    end_inclusive: true
    label: death
trigger: admission
"#,
        rows: vec![
            row(1, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(1, ts("2024-01-01 06:00:00"), &[("death", 1)]),
            row(2, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(2, ts("2024-01-02 00:00:00"), &[("death", 1)]),
        ],
    }
}

/// C: a `has` count constraint filters on the number of abnormal SpO2
/// readings inside the target window.
pub fn abnormal_spo2() -> Scenario {
    Scenario {
        name: "abnormal_spo2",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  low_spo2:
    code: SPO2_LOW
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
    has:
      low_spo2: "(1, None)"
trigger: admission
"#,
        rows: vec![
            row(1, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(1, ts("2024-01-01 02:00:00"), &[("low_spo2", 1)]),
            row(2, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
        ],
    }
}

/// D: no row in the source table matches the trigger predicate at all.
pub fn empty_trigger() -> Scenario {
    Scenario {
        name: "empty_trigger",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  death:
    code: DEATH
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
trigger: admission
"#,
        rows: vec![row(1, ts("2024-01-01 00:00:00"), &[("death", 1)])],
    }
}

/// E: two rows share the exact boundary timestamp a NEXT search lands on.
pub fn event_bound_tie() -> Scenario {
    Scenario {
        name: "event_bound_tie",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  culture_order:
    code: CULTURE_ORDER
  antibiotic:
    code: ANTIBIOTIC
windows:
  target:
    start: trigger
    end: trigger -> culture_order
    start_inclusive: true
    end_inclusive: true
    has:
      antibiotic: "(1, None)"
trigger: admission
"#,
        rows: vec![
            row(1, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(
                1,
                ts("2024-01-01 05:00:00"),
                &[("culture_order", 1), ("antibiotic", 1)],
            ),
        ],
    }
}

/// F: two sibling windows anchored off the same trigger must both resolve
/// for a subject to survive into the final table — the inner-join case.
pub fn two_window_intersection() -> Scenario {
    Scenario {
        name: "two_window_intersection",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  labs:
    code: LABS
  vitals:
    code: VITALS
windows:
  labs_window:
    start: trigger
    end: trigger + 6h
    start_inclusive: true
    end_inclusive: true
    has:
      labs: "(1, None)"
  vitals_window:
    start: trigger
    end: trigger + 6h
    start_inclusive: true
    end_inclusive: true
    has:
      vitals: "(1, None)"
trigger: admission
"#,
        rows: vec![
            row(1, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(1, ts("2024-01-01 01:00:00"), &[("labs", 1)]),
            row(1, ts("2024-01-01 02:00:00"), &[("vitals", 1)]),
            // subject 2 has labs but no vitals inside the window: dropped.
            row(2, ts("2024-01-01 00:00:00"), &[("admission", 1)]),
            row(2, ts("2024-01-01 01:00:00"), &[("labs", 1)]),
        ],
    }
}

/// G: a NULL `start` resolves backward from the trigger to the subject's own
/// first recorded row; a subject whose first row predates the trigger keeps
/// a labs order seen in that gap, one whose first row *is* the trigger does
/// not.
pub fn null_start_boundary() -> Scenario {
    Scenario {
        name: "null_start_boundary",
        config_yaml: r#"
predicates:
  admission:
    code: ADMISSION
  labs:
    code: LABS
windows:
  history:
    start: NULL
    end: trigger
    start_inclusive: true
    end_inclusive: true
    has:
      labs: "(1, None)"
trigger: admission
"#,
        rows: vec![
            row(
                1,
                ts("2024-01-01 00:00:00"),
                &[("labs", 1), ("_RECORD_START", 1)],
            ),
            row(1, ts("2024-01-01 02:00:00"), &[("admission", 1)]),
            row(
                2,
                ts("2024-01-01 00:00:00"),
                &[("admission", 1), ("_RECORD_START", 1)],
            ),
        ],
    }
}

pub fn all() -> Vec<Scenario> {
    vec![
        in_hospital_mortality(),
        imminent_mortality(),
        abnormal_spo2(),
        empty_trigger(),
        event_bound_tie(),
        two_window_intersection(),
        null_start_boundary(),
    ]
}
