//! Writes a [`cohort_engine::ResultTable`] out as a flat CSV: one column per
//! scalar field, and `<window>.start` / `<window>.end` / `<window>.<predicate>`
//! columns for every window's struct, in the tree's pre-order.

use std::path::Path;

use anyhow::{Context, Result};
use cohort_config::TaskConfig;
use cohort_engine::ResultTable;

pub fn write_results_csv(config: &TaskConfig, table: &ResultTable, path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["subject_id".to_string()];
    if table.has_index_timestamp {
        header.push("index_timestamp".to_string());
    }
    if table.has_label {
        header.push("label".to_string());
    }
    header.push("trigger_ts".to_string());

    let mut predicate_columns: Vec<(String, Vec<String>)> = Vec::new();
    for window_name in &table.window_order {
        let spec = &config.windows[window_name];
        let mut predicates: Vec<String> = spec.has.keys().cloned().collect();
        if let Some(label_predicate) = &spec.label {
            if !predicates.contains(label_predicate) {
                predicates.push(label_predicate.clone());
            }
        }
        header.push(format!("{window_name}.start"));
        header.push(format!("{window_name}.end"));
        for predicate in &predicates {
            header.push(format!("{window_name}.{predicate}"));
        }
        predicate_columns.push((window_name.clone(), predicates));
    }
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.subject_id.to_string()];
        if table.has_index_timestamp {
            record.push(row.index_timestamp.map(|v| v.to_string()).unwrap_or_default());
        }
        if table.has_label {
            record.push(row.label.map(|v| v.to_string()).unwrap_or_default());
        }
        record.push(row.trigger_ts.to_string());

        for (window_name, predicates) in &predicate_columns {
            let realization = &row.windows[window_name];
            record.push(realization.start_ts.to_string());
            record.push(realization.end_ts.to_string());
            for predicate in predicates {
                let count = realization.counts.get(predicate).copied().unwrap_or(0);
                record.push(count.to_string());
            }
        }

        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
