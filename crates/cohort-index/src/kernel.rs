//! The two aggregation primitives every `has` constraint and event-bound
//! boundary ultimately reduces to, once its anchor timestamp is known —
//! range counting and nearest-match search.
//!
//! Both operate on a single subject's timeline, already sorted ascending by
//! timestamp (as returned by [`crate::db::Database::timeline`]). A dataframe
//! engine would vectorize these across subjects with a windowed or
//! cumulative-sum-and-diff SQL query; here each subject's timeline is small
//! enough to hold in memory, so both primitives are plain slice scans.

/// Sum of counts in `[lo, hi]`, inclusive/exclusive per `lo_incl`/`hi_incl`.
/// This is what a `has` constraint evaluates against a window's already
/// resolved, normalized boundary pair.
pub fn count_in_range(timeline: &[(i64, i64)], lo: i64, lo_incl: bool, hi: i64, hi_incl: bool) -> i64 {
    timeline
        .iter()
        .filter(|(ts, _)| {
            let above_lo = if lo_incl { *ts >= lo } else { *ts > lo };
            let below_hi = if hi_incl { *ts <= hi } else { *ts < hi };
            above_lo && below_hi
        })
        .map(|(_, count)| count)
        .sum()
}

/// Finds the event-bound match for a NEXT (`forward = true`) or PREV
/// (`forward = false`) boundary search from `anchor_ts`. Returns `None` if
/// the subject's timeline has no row satisfying the predicate in that
/// direction (the "no match within subject" edge case).
///
/// `incl_left` controls self-match exclusion: when `false`, a row exactly
/// at `anchor_ts` is not itself a valid match, mirroring the exclusion a
/// window's own start/end inclusivity flag applies everywhere else.
pub fn agg_event_bound(
    timeline: &[(i64, i64)],
    anchor_ts: i64,
    forward: bool,
    incl_left: bool,
) -> Option<i64> {
    if forward {
        timeline
            .iter()
            .find(|(ts, count)| {
                *count > 0 && (if incl_left { *ts >= anchor_ts } else { *ts > anchor_ts })
            })
            .map(|(ts, _)| *ts)
    } else {
        timeline
            .iter()
            .rev()
            .find(|(ts, count)| {
                *count > 0 && (if incl_left { *ts <= anchor_ts } else { *ts < anchor_ts })
            })
            .map(|(ts, _)| *ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Vec<(i64, i64)> {
        vec![(0, 1), (100, 1), (200, 1), (300, 1)]
    }

    #[test]
    fn counts_inclusive_range() {
        assert_eq!(count_in_range(&timeline(), 100, true, 200, true), 2);
        assert_eq!(count_in_range(&timeline(), 100, false, 200, true), 1);
        assert_eq!(count_in_range(&timeline(), 100, true, 200, false), 1);
    }

    #[test]
    fn event_bound_forward_and_backward() {
        assert_eq!(agg_event_bound(&timeline(), 150, true, true), Some(200));
        assert_eq!(agg_event_bound(&timeline(), 150, false, true), Some(100));
        assert_eq!(agg_event_bound(&timeline(), 100, true, true), Some(100));
        assert_eq!(agg_event_bound(&timeline(), 100, true, false), Some(200));
    }

    #[test]
    fn event_bound_no_match_returns_none() {
        assert_eq!(agg_event_bound(&timeline(), 301, true, true), None);
        assert_eq!(agg_event_bound(&[], 0, true, true), None);
    }
}
