//! The recursive extractor: walks the compiled window tree once per
//! trigger occurrence, resolving every boundary node's timestamp and then
//! every window's `has` counts, dropping a realization the moment any node
//! along its path fails to resolve.

use std::collections::BTreeMap;

use cohort_config::{NodeId, TaskConfig};
use cohort_index::{kernel, Database};
use cohort_types::{RuntimeError, Side};
use tracing::debug;

use crate::realization::{ResultRow, WindowRealization};

pub fn extract(config: &TaskConfig, db: &Database) -> Result<Vec<ResultRow>, RuntimeError> {
    let subject_ids = db.subject_ids().map_err(|e| RuntimeError {
        node: "trigger".to_string(),
        subject_count: 0,
        message: e.to_string(),
    })?;

    if subject_ids.is_empty() {
        debug!("predicates table is empty; returning an empty result");
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    for subject_id in subject_ids {
        let timeline = db
            .timeline(subject_id, &config.trigger.predicate)
            .map_err(|e| RuntimeError {
                node: "trigger".to_string(),
                subject_count: 1,
                message: e.to_string(),
            })?;

        for (trigger_ts, count) in timeline {
            if count <= 0 {
                continue;
            }
            if let Some(row) = resolve_realization(config, db, subject_id, trigger_ts)? {
                rows.push(row);
            }
        }
    }

    debug!(realizations = rows.len(), "extraction complete");
    Ok(rows)
}

/// Fetches a subject's timeline for `predicate`, memoized for the
/// remainder of one realization. A predicate referenced from more than one
/// tree edge, or from `has`/`label` on more than one window, would
/// otherwise re-issue the identical SQL query once per reference.
fn cached_timeline<'a>(
    db: &Database,
    cache: &'a mut BTreeMap<String, Vec<(i64, i64)>>,
    subject_id: i64,
    predicate: &str,
    node: &str,
) -> Result<&'a [(i64, i64)], RuntimeError> {
    if !cache.contains_key(predicate) {
        let timeline = db.timeline(subject_id, predicate).map_err(|e| RuntimeError {
            node: node.to_string(),
            subject_count: 1,
            message: e.to_string(),
        })?;
        cache.insert(predicate.to_string(), timeline);
    }
    Ok(cache.get(predicate).expect("just inserted"))
}

fn resolve_realization(
    config: &TaskConfig,
    db: &Database,
    subject_id: i64,
    trigger_ts: i64,
) -> Result<Option<ResultRow>, RuntimeError> {
    let mut timestamps: BTreeMap<NodeId, i64> = BTreeMap::new();
    timestamps.insert(config.tree.root, trigger_ts);
    let mut timelines: BTreeMap<String, Vec<(i64, i64)>> = BTreeMap::new();

    let mut queue = vec![config.tree.root];
    while let Some(node) = queue.pop() {
        let parent_ts = timestamps[&node];
        for edge in config.tree.edges_from(node) {
            let child_ts = match &edge.kind {
                cohort_config::EdgeKind::Temporal { delta } => Some(parent_ts + delta.as_micros()),
                cohort_config::EdgeKind::EventBound { predicate, forward } => {
                    let timeline =
                        cached_timeline(db, &mut timelines, subject_id, predicate, &edge.window)?;
                    kernel::agg_event_bound(timeline, parent_ts, *forward, edge.incl_left)
                }
            };

            match child_ts {
                Some(ts) => {
                    timestamps.insert(edge.child, ts);
                    queue.push(edge.child);
                }
                None => return Ok(None),
            }
        }
    }

    let mut windows = BTreeMap::new();
    for (name, spec) in &config.windows {
        let start_ts = timestamps[&config.tree.node_for(name, Side::Start)];
        let end_ts = timestamps[&config.tree.node_for(name, Side::End)];
        let (lo, lo_incl, hi, hi_incl) = if start_ts <= end_ts {
            (start_ts, spec.start_inclusive, end_ts, spec.end_inclusive)
        } else {
            (end_ts, spec.end_inclusive, start_ts, spec.start_inclusive)
        };

        let mut counts = BTreeMap::new();
        for (predicate, range) in &spec.has {
            let timeline = cached_timeline(db, &mut timelines, subject_id, predicate, name)?;
            let count = kernel::count_in_range(timeline, lo, lo_incl, hi, hi_incl);
            if !range.contains(count) {
                return Ok(None);
            }
            counts.insert(predicate.clone(), count);
        }

        // The label predicate's count is always materialized on its window,
        // even when no `has` constraint was declared for it.
        if let Some(label_predicate) = &spec.label {
            if !counts.contains_key(label_predicate) {
                let timeline =
                    cached_timeline(db, &mut timelines, subject_id, label_predicate, name)?;
                let count = kernel::count_in_range(timeline, lo, lo_incl, hi, hi_incl);
                counts.insert(label_predicate.clone(), count);
            }
        }

        windows.insert(
            name.clone(),
            WindowRealization {
                start_ts: lo,
                end_ts: hi,
                counts,
            },
        );
    }

    let label = config.label_window.as_ref().and_then(|window_name| {
        let spec = &config.windows[window_name];
        let predicate = spec.label.as_ref()?;
        windows[window_name].counts.get(predicate).copied()
    });

    let index_timestamp = config.index_timestamp.as_ref().map(|(window_name, side)| {
        let realization = &windows[window_name];
        match side {
            Side::Start => realization.start_ts,
            Side::End => realization.end_ts,
        }
    });

    Ok(Some(ResultRow {
        subject_id,
        trigger_ts,
        index_timestamp,
        label,
        windows,
    }))
}
