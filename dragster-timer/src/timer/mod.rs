/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Finish-detection state machine for a two-lane race.
//!
//! ```text
//!          load()            start()               both lanes finished
//!  Idle ───────────► Loaded ─────────► Running ─────────────────────────► Finished
//!   ▲                                     │        or check_timeout()        │
//!   │                                     │                                  │
//!   └─────────────────── reset() (from any phase) ◄─────────────────────────┘
//! ```
//!
//! [`RaceTimer`] owns the single live [`RaceTimerState`].  Every transition
//! goes through a command method; there is no other way to mutate it.  For
//! use from several tasks wrap it in a [`SharedRaceTimer`].
//!
//! # Timing rules
//! * The release relay fires *before* the start timestamp is latched, so the
//!   measured time starts when the cars are actually released.
//! * A lane finishes on the first valid reading strictly below the distance
//!   threshold; later readings never change its time.
//! * Lanes crossing in the same polling tick share that tick's timestamp.
//! * When the second lane finishes the pair is tie-adjusted exactly once
//!   (see [`tie`]).

pub mod error;
pub mod shared;
pub mod tie;

pub use error::RejectedReason;
pub use shared::SharedRaceTimer;

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TimerConfig;
use crate::hardware::{Clock, Relay};
use crate::race::{FinishEvent, Lane, LaneResult, RaceOutcome, StartedEvent};
use crate::sensor::{is_valid_reading, DistanceSample, DistanceSource, SensorTick};

use tie::{determine_winner, resolve_tie};

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Lifecycle phase of the current race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No cars loaded.
    #[default]
    Idle,
    /// Cars in the launcher, waiting for `start()`.
    Loaded,
    /// Relay fired, waiting for finish-line crossings.
    Running,
    /// Result available until `reset()`.
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Loaded => "loaded",
            Phase::Running => "running",
            Phase::Finished => "finished",
        };
        f.write_str(s)
    }
}

// ── Settings & state ──────────────────────────────────────────────────────────

/// Timing parameters, taken from [`TimerConfig`] at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub sensor_threshold_mm: u16,
    pub tie_threshold_ms: u32,
    pub relay_activation: Duration,
    pub timeout_ms: u64,
    pub lane_offsets_ms: [u32; 2],
}

impl From<&TimerConfig> for TimerSettings {
    fn from(cfg: &TimerConfig) -> Self {
        Self {
            sensor_threshold_mm: cfg.sensor.threshold_mm,
            tie_threshold_ms: cfg.race.tie_threshold_ms,
            relay_activation: cfg.relay_activation(),
            timeout_ms: cfg.race.timeout_ms,
            lane_offsets_ms: cfg.race.lane_offsets_ms,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::from(&TimerConfig::default())
    }
}

/// The live race record.
///
/// `phase == Running` implies `start_timestamp_ms.is_some()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceTimerState {
    pub phase: Phase,
    /// Monotonic time the relay pulse completed.
    pub start_timestamp_ms: Option<u64>,
    pub lane1: LaneResult,
    pub lane2: LaneResult,
    /// Set when the race was forced to finish by the timeout.
    pub timed_out: bool,
}

impl RaceTimerState {
    pub fn lane(&self, lane: Lane) -> &LaneResult {
        match lane {
            Lane::One => &self.lane1,
            Lane::Two => &self.lane2,
        }
    }

    fn lane_mut(&mut self, lane: Lane) -> &mut LaneResult {
        match lane {
            Lane::One => &mut self.lane1,
            Lane::Two => &mut self.lane2,
        }
    }
}

/// What a single sampling step produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Lanes that finished during this step.
    pub finishes: Vec<FinishEvent>,
    /// Set on the step that completed the race.
    pub outcome: Option<RaceOutcome>,
}

// ── RaceTimer ─────────────────────────────────────────────────────────────────

/// Two-lane race timer.
pub struct RaceTimer<R, C> {
    settings: TimerSettings,
    relay: R,
    clock: C,
    state: RaceTimerState,
}

impl<R: Relay, C: Clock> RaceTimer<R, C> {
    pub fn new(settings: TimerSettings, relay: R, clock: C) -> Self {
        Self {
            settings,
            relay,
            clock,
            state: RaceTimerState::default(),
        }
    }

    pub fn state(&self) -> &RaceTimerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Cars are in the launcher.  Accepted only while idle.
    pub fn load(&mut self) -> Result<(), RejectedReason> {
        if self.state.phase != Phase::Idle {
            warn!(phase = %self.state.phase, "load rejected");
            return Err(RejectedReason::NotIdle {
                phase: self.state.phase,
            });
        }
        self.state.phase = Phase::Loaded;
        info!("cars loaded, ready to start");
        Ok(())
    }

    /// Fire the release relay and start timing.  Accepted only when loaded.
    ///
    /// Blocks for the relay activation time.  The start timestamp is read
    /// after the pulse completes.
    pub fn start(&mut self) -> Result<StartedEvent, RejectedReason> {
        if self.state.phase != Phase::Loaded {
            warn!(phase = %self.state.phase, "start rejected");
            return Err(RejectedReason::NotLoaded {
                phase: self.state.phase,
            });
        }

        self.relay.pulse(self.settings.relay_activation);
        let now = self.clock.now_ms();

        self.state = RaceTimerState {
            phase: Phase::Running,
            start_timestamp_ms: Some(now),
            ..RaceTimerState::default()
        };

        info!(start_timestamp_ms = now, "race started");
        Ok(StartedEvent {
            start_timestamp_ms: now,
        })
    }

    /// Return to idle from any phase, discarding in-flight results.
    pub fn reset(&mut self) {
        let previous = self.state.phase;
        self.state = RaceTimerState::default();
        info!(previous = %previous, "race timer reset");
    }

    // ── Sample delivery ───────────────────────────────────────────────────────

    /// Feed one lane reading.  No-op outside `Running`.
    ///
    /// Returns the lane's finish event the first time it crosses the line.
    /// If this completes the race the outcome becomes available through
    /// [`outcome`](Self::outcome).
    pub fn on_sample(&mut self, sample: DistanceSample) -> Option<FinishEvent> {
        if self.state.phase != Phase::Running || !self.crossed(sample.lane, sample.distance_mm) {
            return None;
        }
        let event = self.record_finish(sample.lane, sample.timestamp_ms);
        self.complete_if_both_finished();
        Some(event)
    }

    /// Feed a paired reading taken in one polling tick.
    ///
    /// Both lanes are checked against the threshold before either is
    /// recorded, so a same-tick double crossing gives both lanes the same
    /// elapsed time regardless of evaluation order.
    pub fn on_tick(&mut self, tick: SensorTick) -> Vec<FinishEvent> {
        if self.state.phase != Phase::Running {
            return Vec::new();
        }

        let crossed: Vec<Lane> = Lane::ALL
            .into_iter()
            .filter(|&lane| self.crossed(lane, tick.distance(lane)))
            .collect();

        if crossed.len() == 2 {
            debug!(timestamp_ms = tick.timestamp_ms, "both lanes crossed in the same tick");
        }

        let events = crossed
            .into_iter()
            .map(|lane| self.record_finish(lane, tick.timestamp_ms))
            .collect();
        self.complete_if_both_finished();
        events
    }

    /// Force completion once the race has run longer than the timeout.
    ///
    /// Returns the outcome on the call that ends the race; `None` otherwise
    /// (not running, or still inside the window).
    pub fn check_timeout(&mut self, now_ms: u64) -> Option<RaceOutcome> {
        if self.state.phase != Phase::Running {
            return None;
        }
        let start = self.state.start_timestamp_ms?;
        let running_for = now_ms.saturating_sub(start);
        if running_for <= self.settings.timeout_ms {
            return None;
        }

        self.state.timed_out = true;
        self.state.phase = Phase::Finished;
        let outcome = self.build_outcome();
        warn!(
            running_for_ms = running_for,
            timeout_ms = self.settings.timeout_ms,
            lane1 = ?outcome.lane1_elapsed_ms,
            lane2 = ?outcome.lane2_elapsed_ms,
            winner = %outcome.winner,
            "race timed out"
        );
        Some(outcome)
    }

    /// One fixed-cadence sampling step: read the clock once, read both lanes,
    /// deliver the tick and poll the timeout.
    pub fn poll<S: DistanceSource + ?Sized>(&mut self, source: &mut S) -> PollReport {
        if self.state.phase != Phase::Running {
            return PollReport::default();
        }
        let now = self.clock.now_ms();
        let since_start = self
            .state
            .start_timestamp_ms
            .map_or(0, |start| now.saturating_sub(start));

        let tick = SensorTick {
            lane1_mm: source.read(Lane::One, since_start),
            lane2_mm: source.read(Lane::Two, since_start),
            timestamp_ms: now,
        };

        let finishes = self.on_tick(tick);
        let outcome = match self.outcome() {
            Some(done) => Some(done),
            None => self.check_timeout(now),
        };
        PollReport { finishes, outcome }
    }

    /// Final result.  `Some` only while `Finished`.
    pub fn outcome(&self) -> Option<RaceOutcome> {
        (self.state.phase == Phase::Finished).then(|| self.build_outcome())
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn crossed(&self, lane: Lane, distance_mm: u16) -> bool {
        !self.state.lane(lane).finished
            && is_valid_reading(distance_mm)
            && distance_mm < self.settings.sensor_threshold_mm
    }

    fn record_finish(&mut self, lane: Lane, timestamp_ms: u64) -> FinishEvent {
        let start = self.state.start_timestamp_ms.unwrap_or(timestamp_ms);
        let raw = u32::try_from(timestamp_ms.saturating_sub(start)).unwrap_or(u32::MAX);
        let offset = self.settings.lane_offsets_ms[lane.index()];
        let elapsed_ms = raw.saturating_sub(offset);

        *self.state.lane_mut(lane) = LaneResult::finished_at(elapsed_ms);
        info!(lane = lane.id(), elapsed_ms, raw_ms = raw, "lane finished");

        FinishEvent { lane, elapsed_ms }
    }

    fn complete_if_both_finished(&mut self) {
        if !(self.state.lane1.finished && self.state.lane2.finished) {
            return;
        }
        let (l1, l2) = (self.state.lane1.elapsed_ms, self.state.lane2.elapsed_ms);
        if resolve_tie(
            &mut self.state.lane1,
            &mut self.state.lane2,
            self.settings.tie_threshold_ms,
        ) {
            info!(
                lane1_raw_ms = l1,
                lane2_raw_ms = l2,
                adjusted_ms = self.state.lane1.elapsed_ms,
                threshold_ms = self.settings.tie_threshold_ms,
                "finish times within tie threshold, averaged"
            );
        }
        self.state.phase = Phase::Finished;

        let winner = determine_winner(&self.state.lane1, &self.state.lane2);
        info!(
            lane1_ms = self.state.lane1.elapsed_ms,
            lane2_ms = self.state.lane2.elapsed_ms,
            winner = %winner,
            "race finished"
        );
    }

    fn build_outcome(&self) -> RaceOutcome {
        RaceOutcome {
            lane1_elapsed_ms: self.state.lane1.elapsed(),
            lane2_elapsed_ms: self.state.lane2.elapsed(),
            winner: determine_winner(&self.state.lane1, &self.state.lane2),
            timed_out: self.state.timed_out,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ManualClock;
    use crate::race::Winner;
    use crate::sensor::{ScriptedTrack, RANGE_ERROR_MM};

    // ── Test helpers ──────────────────────────────────────────────────────────

    /// Relay that advances the shared clock by the pulse length, so the test
    /// can observe that the start timestamp is taken after the pulse.
    struct ClockRelay {
        clock: ManualClock,
        pulses: u32,
    }

    impl Relay for ClockRelay {
        fn pulse(&mut self, duration: Duration) {
            self.clock.advance(duration.as_millis() as u64);
            self.pulses += 1;
        }
    }

    /// threshold = 150 mm, tie = 2 ms, relay = 0 ms, timeout = 10 s.
    fn timer_at(start_ms: u64) -> (RaceTimer<ClockRelay, ManualClock>, ManualClock) {
        let clock = ManualClock::new(start_ms);
        let settings = TimerSettings {
            sensor_threshold_mm: 150,
            tie_threshold_ms: 2,
            relay_activation: Duration::ZERO,
            timeout_ms: 10_000,
            lane_offsets_ms: [0, 0],
        };
        let relay = ClockRelay {
            clock: clock.clone(),
            pulses: 0,
        };
        (RaceTimer::new(settings, relay, clock.clone()), clock)
    }

    fn running_timer() -> (RaceTimer<ClockRelay, ManualClock>, ManualClock) {
        let (mut t, c) = timer_at(0);
        t.load().unwrap();
        t.start().unwrap();
        (t, c)
    }

    fn sample(lane: Lane, mm: u16, ts: u64) -> DistanceSample {
        DistanceSample::new(lane, mm, ts)
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    #[test]
    fn start_while_idle_is_rejected_and_state_unchanged() {
        let (mut t, _) = timer_at(0);
        let before = *t.state();
        let err = t.start().unwrap_err();
        assert_eq!(err, RejectedReason::NotLoaded { phase: Phase::Idle });
        assert_eq!(*t.state(), before);
        assert_eq!(t.relay.pulses, 0, "relay must not fire");
    }

    #[test]
    fn load_twice_is_rejected() {
        let (mut t, _) = timer_at(0);
        t.load().unwrap();
        assert_eq!(
            t.load().unwrap_err(),
            RejectedReason::NotIdle {
                phase: Phase::Loaded
            }
        );
        assert_eq!(t.phase(), Phase::Loaded);
    }

    #[test]
    fn load_while_running_is_rejected() {
        let (mut t, _) = running_timer();
        assert!(matches!(t.load(), Err(RejectedReason::NotIdle { phase: Phase::Running })));
        assert!(matches!(t.start(), Err(RejectedReason::NotLoaded { phase: Phase::Running })));
    }

    #[test]
    fn start_latches_timestamp_after_relay_pulse() {
        let (mut t, clock) = timer_at(5_000);
        t.settings.relay_activation = Duration::from_millis(250);
        t.load().unwrap();
        let started = t.start().unwrap();

        assert_eq!(started.start_timestamp_ms, 5_250);
        assert_eq!(clock.now_ms(), 5_250);
        assert_eq!(t.relay.pulses, 1);
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.state().start_timestamp_ms, Some(5_250));
    }

    #[test]
    fn start_clears_previous_lane_results() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::One, 100, 900));
        t.reset();
        t.load().unwrap();
        t.start().unwrap();
        assert_eq!(t.state().lane1, LaneResult::default());
        assert_eq!(t.state().lane2, LaneResult::default());
    }

    #[test]
    fn reset_returns_to_idle_from_every_phase() {
        let (mut t, _) = timer_at(0);
        t.reset();
        assert_eq!(t.phase(), Phase::Idle);

        t.load().unwrap();
        t.reset();
        assert_eq!(t.phase(), Phase::Idle);

        t.load().unwrap();
        t.start().unwrap();
        t.on_sample(sample(Lane::One, 100, 500));
        t.reset();
        assert_eq!(*t.state(), RaceTimerState::default());

        t.load().unwrap();
        t.start().unwrap();
        t.on_sample(sample(Lane::One, 100, 500));
        t.on_sample(sample(Lane::Two, 100, 600));
        assert_eq!(t.phase(), Phase::Finished);
        t.reset();
        assert_eq!(t.phase(), Phase::Idle);
        assert!(t.outcome().is_none());
    }

    // ── Finish detection ──────────────────────────────────────────────────────

    #[test]
    fn samples_outside_running_are_ignored() {
        let (mut t, _) = timer_at(0);
        assert!(t.on_sample(sample(Lane::One, 10, 100)).is_none());
        t.load().unwrap();
        assert!(t.on_sample(sample(Lane::One, 10, 100)).is_none());
        assert!(t.on_tick(SensorTick { lane1_mm: 10, lane2_mm: 10, timestamp_ms: 100 }).is_empty());
        assert!(!t.state().lane1.finished);
    }

    #[test]
    fn reading_at_threshold_does_not_finish() {
        let (mut t, _) = running_timer();
        assert!(t.on_sample(sample(Lane::One, 150, 100)).is_none());
        assert!(t.on_sample(sample(Lane::One, 149, 120)).is_some());
    }

    #[test]
    fn invalid_readings_never_finish_a_lane() {
        let (mut t, _) = running_timer();
        assert!(t.on_sample(sample(Lane::One, 0, 100)).is_none());
        assert!(t.on_sample(sample(Lane::Two, RANGE_ERROR_MM, 100)).is_none());
        assert_eq!(t.phase(), Phase::Running);
    }

    #[test]
    fn first_crossing_wins() {
        let (mut t, _) = running_timer();
        let ev = t.on_sample(sample(Lane::One, 100, 1000)).unwrap();
        assert_eq!(ev, FinishEvent { lane: Lane::One, elapsed_ms: 1000 });
        assert!(t.on_sample(sample(Lane::One, 50, 1500)).is_none());
        assert_eq!(t.state().lane1.elapsed_ms, 1000);
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn scenario_a_close_finish_is_averaged_tie() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::One, 100, 1000));
        let second = t.on_sample(sample(Lane::Two, 100, 1001)).unwrap();
        assert_eq!(second.elapsed_ms, 1001, "finish event reports the raw time");

        let outcome = t.outcome().unwrap();
        assert_eq!(outcome.lane1_elapsed_ms, Some(1000));
        assert_eq!(outcome.lane2_elapsed_ms, Some(1000));
        assert_eq!(outcome.winner, Winner::Tie);
        assert!(!outcome.timed_out);
    }

    #[test]
    fn scenario_b_clear_winner_is_not_averaged() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::One, 100, 1000));
        t.on_sample(sample(Lane::Two, 100, 1050));

        let outcome = t.outcome().unwrap();
        assert_eq!(outcome.lane1_elapsed_ms, Some(1000));
        assert_eq!(outcome.lane2_elapsed_ms, Some(1050));
        assert_eq!(outcome.winner, Winner::Lane1);
    }

    #[test]
    fn lane_two_can_finish_first() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::Two, 90, 1200));
        t.on_sample(sample(Lane::One, 90, 1300));
        assert_eq!(t.outcome().unwrap().winner, Winner::Lane2);
    }

    #[test]
    fn tie_threshold_is_inclusive() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::One, 100, 1000));
        t.on_sample(sample(Lane::Two, 100, 1002));
        assert_eq!(t.outcome().unwrap().winner, Winner::Tie);

        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::One, 100, 1000));
        t.on_sample(sample(Lane::Two, 100, 1003));
        assert_eq!(t.outcome().unwrap().winner, Winner::Lane1);
    }

    #[test]
    fn same_tick_crossing_is_simultaneous() {
        let (mut t, _) = running_timer();
        let events = t.on_tick(SensorTick {
            lane1_mm: 80,
            lane2_mm: 90,
            timestamp_ms: 1234,
        });
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].elapsed_ms, events[1].elapsed_ms);

        let outcome = t.outcome().unwrap();
        assert_eq!(outcome.lane1_elapsed_ms, Some(1234));
        assert_eq!(outcome.lane2_elapsed_ms, Some(1234));
        assert_eq!(outcome.winner, Winner::Tie);
    }

    #[test]
    fn outcome_is_stable_once_finished() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::One, 100, 2001));
        t.on_sample(sample(Lane::Two, 100, 2000));
        let first = t.outcome().unwrap();
        // late samples and timeout polls cannot alter a finished race
        t.on_sample(sample(Lane::One, 10, 9000));
        assert!(t.check_timeout(60_000).is_none());
        assert_eq!(t.outcome().unwrap(), first);
        assert_eq!(first.lane1_elapsed_ms, Some(2000));
    }

    #[test]
    fn lane_offset_is_subtracted_before_tie_check() {
        let (mut t, _) = running_timer();
        t.settings.lane_offsets_ms = [0, 17];
        t.on_sample(sample(Lane::One, 100, 1000));
        let ev = t.on_sample(sample(Lane::Two, 100, 1018)).unwrap();
        assert_eq!(ev.elapsed_ms, 1001);
        assert_eq!(t.outcome().unwrap().winner, Winner::Tie);
    }

    // ── Timeout ───────────────────────────────────────────────────────────────

    #[test]
    fn timeout_with_one_finisher_awards_that_lane() {
        let (mut t, _) = running_timer();
        t.on_sample(sample(Lane::Two, 100, 3000));
        assert!(t.check_timeout(10_000).is_none(), "boundary is exclusive");

        let outcome = t.check_timeout(10_001).unwrap();
        assert_eq!(outcome.winner, Winner::Lane2);
        assert_eq!(outcome.lane1_elapsed_ms, None);
        assert_eq!(outcome.lane2_elapsed_ms, Some(3000));
        assert!(outcome.timed_out);
        assert_eq!(t.phase(), Phase::Finished);
        assert!(t.check_timeout(20_000).is_none(), "only reported once");
    }

    #[test]
    fn timeout_with_no_finishers_is_no_result() {
        let (mut t, _) = running_timer();
        let outcome = t.check_timeout(10_500).unwrap();
        assert_eq!(outcome.winner, Winner::NoResult);
        assert_eq!(outcome.lane1_elapsed_ms, None);
        assert_eq!(outcome.lane2_elapsed_ms, None);
    }

    #[test]
    fn timeout_is_ignored_when_not_running() {
        let (mut t, _) = timer_at(0);
        assert!(t.check_timeout(u64::MAX).is_none());
        assert_eq!(t.phase(), Phase::Idle);
    }

    // ── poll ──────────────────────────────────────────────────────────────────

    #[test]
    fn poll_drives_a_scripted_race_to_completion() {
        let (mut t, clock) = running_timer();
        let mut track = ScriptedTrack::new(Some(1000), Some(1040));

        let mut finishes = Vec::new();
        let mut outcome = None;
        while outcome.is_none() {
            clock.advance(20);
            let report = t.poll(&mut track);
            finishes.extend(report.finishes);
            outcome = report.outcome;
        }

        assert_eq!(finishes.len(), 2);
        let outcome = outcome.unwrap();
        assert_eq!(outcome.lane1_elapsed_ms, Some(1000));
        assert_eq!(outcome.lane2_elapsed_ms, Some(1040));
        assert_eq!(outcome.winner, Winner::Lane1);
    }

    #[test]
    fn poll_reports_timeout_when_a_car_never_arrives() {
        let (mut t, clock) = running_timer();
        let mut track = ScriptedTrack::new(None, Some(2000));

        let mut outcome = None;
        while outcome.is_none() {
            clock.advance(50);
            outcome = t.poll(&mut track).outcome;
        }
        let outcome = outcome.unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.winner, Winner::Lane2);
        assert!(clock.now_ms() > 10_000);
    }

    #[test]
    fn poll_is_a_no_op_when_idle() {
        let (mut t, _) = timer_at(0);
        let mut track = ScriptedTrack::new(Some(0), Some(0));
        assert_eq!(t.poll(&mut track), PollReport::default());
    }
}
