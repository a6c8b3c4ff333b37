/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core race data structures shared by the timer, history and transports.
//!
//! ```text
//! sensor ──(SensorTick)──►  RaceTimer  ──(FinishEvent)──►  notifier
//!                              │
//!                              └──(RaceOutcome)──►  history / scheduler
//! ```
//!
//! All times are integer milliseconds.  Timestamps are monotonic
//! (`Clock::now_ms`), elapsed times are relative to the latched start
//! timestamp.

use serde::{Deserialize, Serialize};

// ── Lane ──────────────────────────────────────────────────────────────────────

/// One of the two physical tracks, each with its own distance sensor.
///
/// Carrying a typed lane through the pipeline (instead of a raw `1`/`2`)
/// makes an out-of-range lane id unrepresentable inside the timer.  The
/// conversion to the integer form only happens at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    One,
    Two,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::One, Lane::Two];

    /// Wire id: `1` or `2`.
    pub fn id(self) -> u8 {
        match self {
            Lane::One => 1,
            Lane::Two => 2,
        }
    }

    /// Array index (`0` for lane 1, `1` for lane 2).
    pub fn index(self) -> usize {
        match self {
            Lane::One => 0,
            Lane::Two => 1,
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane {}", self.id())
    }
}

// ── LaneResult ────────────────────────────────────────────────────────────────

/// Finish record for one lane.
///
/// `elapsed_ms` is only meaningful when `finished` is `true`.  Written once
/// per race (first crossing wins) and cleared when the race starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaneResult {
    pub finished: bool,
    pub elapsed_ms: u32,
}

impl LaneResult {
    pub fn finished_at(elapsed_ms: u32) -> Self {
        Self {
            finished: true,
            elapsed_ms,
        }
    }

    /// `Some(elapsed)` once the lane has finished.
    pub fn elapsed(&self) -> Option<u32> {
        self.finished.then_some(self.elapsed_ms)
    }
}

// ── Winner ────────────────────────────────────────────────────────────────────

/// Race verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    /// Neither car reached the finish line before the timeout.
    NoResult,
    Lane1,
    Lane2,
    /// Dead heat (equal times after tie adjustment).
    Tie,
}

impl Winner {
    /// Winning lane, if there is exactly one.
    pub fn lane(self) -> Option<Lane> {
        match self {
            Winner::Lane1 => Some(Lane::One),
            Winner::Lane2 => Some(Lane::Two),
            Winner::NoResult | Winner::Tie => None,
        }
    }
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::NoResult => write!(f, "no result"),
            Winner::Lane1 => write!(f, "lane 1"),
            Winner::Lane2 => write!(f, "lane 2"),
            Winner::Tie => write!(f, "tie"),
        }
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Emitted by `RaceTimer::start` once the relay has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedEvent {
    pub start_timestamp_ms: u64,
}

/// Emitted the first time a lane crosses the finish threshold.
///
/// `elapsed_ms` is the lane's raw time (after calibration offset, before any
/// tie adjustment).  The adjusted value is only reported in [`RaceOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishEvent {
    pub lane: Lane,
    pub elapsed_ms: u32,
}

/// Final race result.
///
/// A lane that never finished carries `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceOutcome {
    pub lane1_elapsed_ms: Option<u32>,
    pub lane2_elapsed_ms: Option<u32>,
    pub winner: Winner,
    /// `true` when the outcome was forced by the race timeout.
    pub timed_out: bool,
}

impl RaceOutcome {
    pub fn elapsed(&self, lane: Lane) -> Option<u32> {
        match lane {
            Lane::One => self.lane1_elapsed_ms,
            Lane::Two => self.lane2_elapsed_ms,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_ids_and_indexes() {
        assert_eq!(Lane::One.id(), 1);
        assert_eq!(Lane::Two.id(), 2);
        assert_eq!(Lane::Two.index(), 1);
        assert_eq!(Lane::One.to_string(), "lane 1");
    }

    #[test]
    fn unfinished_lane_has_no_elapsed() {
        let r = LaneResult {
            finished: false,
            elapsed_ms: 1234,
        };
        assert_eq!(r.elapsed(), None);
        assert_eq!(LaneResult::finished_at(900).elapsed(), Some(900));
    }

    #[test]
    fn winner_lane_mapping() {
        assert_eq!(Winner::Lane1.lane(), Some(Lane::One));
        assert_eq!(Winner::Lane2.lane(), Some(Lane::Two));
        assert_eq!(Winner::Tie.lane(), None);
        assert_eq!(Winner::NoResult.lane(), None);
    }

    #[test]
    fn outcome_serialises_with_camel_case_fields() {
        let outcome = RaceOutcome {
            lane1_elapsed_ms: Some(1000),
            lane2_elapsed_ms: None,
            winner: Winner::Lane1,
            timed_out: true,
        };
        assert_eq!(outcome.elapsed(Lane::One), Some(1000));
        assert_eq!(outcome.elapsed(Lane::Two), None);
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"lane1ElapsedMs\":1000"));
        assert!(json.contains("\"lane2ElapsedMs\":null"));
        assert!(json.contains("\"winner\":\"lane1\""));
    }
}
