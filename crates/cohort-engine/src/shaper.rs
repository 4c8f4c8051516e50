//! Assembles the final column set from a list of
//! resolved realizations and sorts them into the output order.

use cohort_config::TaskConfig;

use crate::realization::ResultRow;

/// The final, ordered output: one row per realization, columns named and
/// ordered exactly as the task config implies — `subject_id`, then
/// `index_timestamp`/`label` if declared, then the trigger timestamp, then
/// one struct column per window in the tree's pre-order.
pub struct ResultTable {
    pub has_index_timestamp: bool,
    pub has_label: bool,
    pub window_order: Vec<String>,
    pub rows: Vec<ResultRow>,
}

pub fn shape(config: &TaskConfig, mut rows: Vec<ResultRow>) -> ResultTable {
    rows.sort_by(|a, b| {
        a.subject_id
            .cmp(&b.subject_id)
            .then(a.index_timestamp.cmp(&b.index_timestamp))
            .then(a.trigger_ts.cmp(&b.trigger_ts))
    });

    ResultTable {
        has_index_timestamp: config.index_timestamp.is_some(),
        has_label: config.label_window.is_some(),
        window_order: config.tree.preorder_windows(),
        rows,
    }
}
