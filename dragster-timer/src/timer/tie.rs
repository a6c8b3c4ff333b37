/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dead-heat resolution and winner determination.
//!
//! Both functions are pure: they look only at the two lane results and the
//! threshold, so the timer can apply them once when the second lane finishes
//! and any consumer can re-derive the verdict from a stored outcome.
//!
//! | Lane times | Verdict |
//! |---|---|
//! | both finished, `|a − b| ≤ threshold` | times replaced by their mean, `Tie` |
//! | both finished, otherwise | strictly smaller time wins |
//! | one finished (timeout) | that lane wins by default |
//! | none finished (timeout) | `NoResult` |

use crate::race::{LaneResult, Winner};

/// Average two finish times that lie within `tie_threshold_ms` of each other.
///
/// Returns `true` if the pair was treated as a dead heat.  Both results must
/// be finished; otherwise nothing changes.  The mean is rounded down, so
/// applying the adjustment a second time leaves the pair unchanged.
pub fn resolve_tie(lane1: &mut LaneResult, lane2: &mut LaneResult, tie_threshold_ms: u32) -> bool {
    if !(lane1.finished && lane2.finished) {
        return false;
    }
    if lane1.elapsed_ms.abs_diff(lane2.elapsed_ms) > tie_threshold_ms {
        return false;
    }

    let mean = ((u64::from(lane1.elapsed_ms) + u64::from(lane2.elapsed_ms)) / 2) as u32;
    lane1.elapsed_ms = mean;
    lane2.elapsed_ms = mean;
    true
}

/// Verdict for a pair of (already tie-adjusted) lane results.
pub fn determine_winner(lane1: &LaneResult, lane2: &LaneResult) -> Winner {
    match (lane1.elapsed(), lane2.elapsed()) {
        (Some(a), Some(b)) if a == b => Winner::Tie,
        (Some(a), Some(b)) if a < b => Winner::Lane1,
        (Some(_), Some(_)) => Winner::Lane2,
        (Some(_), None) => Winner::Lane1,
        (None, Some(_)) => Winner::Lane2,
        (None, None) => Winner::NoResult,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn done(ms: u32) -> LaneResult {
        LaneResult::finished_at(ms)
    }

    #[test]
    fn within_threshold_is_averaged() {
        let (mut a, mut b) = (done(1000), done(1001));
        assert!(resolve_tie(&mut a, &mut b, 2));
        assert_eq!(a.elapsed_ms, 1000);
        assert_eq!(b.elapsed_ms, 1000);
        assert_eq!(determine_winner(&a, &b), Winner::Tie);
    }

    #[test]
    fn difference_equal_to_threshold_is_a_tie() {
        let (mut a, mut b) = (done(1000), done(1002));
        assert!(resolve_tie(&mut a, &mut b, 2));
        assert_eq!((a.elapsed_ms, b.elapsed_ms), (1001, 1001));
    }

    #[test]
    fn one_past_threshold_is_not_a_tie() {
        let (mut a, mut b) = (done(1000), done(1003));
        assert!(!resolve_tie(&mut a, &mut b, 2));
        assert_eq!((a.elapsed_ms, b.elapsed_ms), (1000, 1003));
        assert_eq!(determine_winner(&a, &b), Winner::Lane1);
    }

    #[test]
    fn adjustment_is_idempotent() {
        let (mut a, mut b) = (done(2001), done(2000));
        resolve_tie(&mut a, &mut b, 2);
        let first = (a, b);
        assert!(resolve_tie(&mut a, &mut b, 2));
        assert_eq!((a, b), first);
        assert_eq!(determine_winner(&a, &b), Winner::Tie);
    }

    #[test]
    fn unfinished_lane_is_never_adjusted() {
        let mut a = done(1000);
        let mut b = LaneResult::default();
        assert!(!resolve_tie(&mut a, &mut b, 10_000));
        assert_eq!(a.elapsed_ms, 1000);
    }

    #[test]
    fn zero_threshold_only_ties_identical_times() {
        let (mut a, mut b) = (done(1500), done(1500));
        assert!(resolve_tie(&mut a, &mut b, 0));
        let (mut c, mut d) = (done(1500), done(1501));
        assert!(!resolve_tie(&mut c, &mut d, 0));
        assert_eq!(determine_winner(&c, &d), Winner::Lane1);
    }

    #[test]
    fn slower_lane_one_loses() {
        assert_eq!(determine_winner(&done(1050), &done(1000)), Winner::Lane2);
    }

    #[test]
    fn single_finisher_wins_by_default() {
        let none = LaneResult::default();
        assert_eq!(determine_winner(&done(3000), &none), Winner::Lane1);
        assert_eq!(determine_winner(&none, &done(3000)), Winner::Lane2);
        assert_eq!(determine_winner(&none, &none), Winner::NoResult);
    }

    #[test]
    fn large_times_do_not_overflow_the_mean() {
        let (mut a, mut b) = (done(u32::MAX), done(u32::MAX - 1));
        assert!(resolve_tie(&mut a, &mut b, 2));
        assert_eq!(a.elapsed_ms, u32::MAX - 1);
    }
}
