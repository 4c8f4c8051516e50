//! End-to-end tests driving the built binary against the canonical
//! scenarios, through real files on disk.

use std::fs;

use assert_cmd::Command;
use cohort_testing::scenarios;
use predicates::str::contains;
use tempfile::TempDir;

fn write_predicates_csv(
    dir: &std::path::Path,
    rows: &[scenarios::EventRow],
    predicate_names: &[&str],
) -> std::path::PathBuf {
    let path = dir.join("predicates.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();

    let mut header = vec!["subject_id".to_string(), "timestamp_us".to_string()];
    header.extend(predicate_names.iter().map(|s| s.to_string()));
    writer.write_record(&header).unwrap();

    for row in rows {
        let mut record = vec![row.subject_id.to_string(), row.ts_us.to_string()];
        for name in predicate_names {
            let value = row
                .counts
                .iter()
                .find(|(p, _)| p == name)
                .map(|(_, v)| *v)
                .unwrap_or(0);
            record.push(value.to_string());
        }
        writer.write_record(&record).unwrap();
    }
    writer.flush().unwrap();
    path
}

#[test]
fn in_hospital_mortality_labels_death_inside_window() {
    let scenario = scenarios::in_hospital_mortality();
    let dir = TempDir::new().unwrap();

    let config_path = dir.path().join("task.yaml");
    fs::write(&config_path, scenario.config_yaml).unwrap();

    let predicates_path =
        write_predicates_csv(dir.path(), &scenario.rows, &["admission", "death"]);
    let out_path = dir.path().join("cohort.csv");

    Command::cargo_bin("cohort-extract")
        .unwrap()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--predicates",
            predicates_path.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
            "--log-level",
            "info",
        ])
        .assert()
        .success()
        .stderr(contains("extraction complete"));

    let mut reader = csv::Reader::from_path(&out_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let subject_idx = headers.iter().position(|h| h == "subject_id").unwrap();
    let label_idx = headers.iter().position(|h| h == "label").unwrap();
    assert!(headers.iter().any(|h| h == "target.death"));

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);

    // subject 1 died inside the 24h window (label = 1), subject 2 did not.
    let label_for = |subject_id: &str| {
        records
            .iter()
            .find(|r| &r[subject_idx] == subject_id)
            .map(|r| r[label_idx].to_string())
            .unwrap()
    };
    assert_eq!(label_for("1"), "1");
    assert_eq!(label_for("2"), "0");
}

#[test]
fn undefined_trigger_predicate_exits_with_config_error_code() {
    let dir = TempDir::new().unwrap();

    let config_path = dir.path().join("task.yaml");
    fs::write(
        &config_path,
        r#"
predicates:
  admission:
    code: ADMISSION
windows:
  target:
    start: trigger
    end: trigger + 24h
    start_inclusive: true
    end_inclusive: true
trigger: missing
"#,
    )
    .unwrap();

    let predicates_path = write_predicates_csv(dir.path(), &[], &["admission"]);
    let out_path = dir.path().join("cohort.csv");

    Command::cargo_bin("cohort-extract")
        .unwrap()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--predicates",
            predicates_path.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn duplicate_subject_timestamp_exits_with_schema_error_code() {
    let scenario = scenarios::in_hospital_mortality();
    let dir = TempDir::new().unwrap();

    let config_path = dir.path().join("task.yaml");
    fs::write(&config_path, scenario.config_yaml).unwrap();

    // Two rows sharing the exact same (subject_id, timestamp_us) key, which
    // the predicates table's data contract forbids.
    let predicates_path = dir.path().join("predicates.csv");
    fs::write(
        &predicates_path,
        "subject_id,timestamp_us,admission,death\n1,0,1,0\n1,0,0,1\n",
    )
    .unwrap();
    let out_path = dir.path().join("cohort.csv");

    Command::cargo_bin("cohort-extract")
        .unwrap()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--predicates",
            predicates_path.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("is not unique"));
}

#[test]
fn empty_trigger_produces_empty_table() {
    let scenario = scenarios::empty_trigger();
    let dir = TempDir::new().unwrap();

    let config_path = dir.path().join("task.yaml");
    fs::write(&config_path, scenario.config_yaml).unwrap();

    let predicates_path = write_predicates_csv(dir.path(), &scenario.rows, &["admission", "death"]);
    let out_path = dir.path().join("cohort.csv");

    Command::cargo_bin("cohort-extract")
        .unwrap()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--predicates",
            predicates_path.to_str().unwrap(),
            "--out",
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let output = fs::read_to_string(&out_path).unwrap();
    assert_eq!(output.lines().count(), 1); // header only, no realizations
}
