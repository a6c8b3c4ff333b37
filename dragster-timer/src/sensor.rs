/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Finish-line distance readings.
//!
//! Each lane has a time-of-flight sensor pointed across the track.  A car
//! passing underneath shortens the reported distance below the configured
//! threshold.  The timer consumes readings either one lane at a time
//! ([`DistanceSample`]) or as a paired read taken in one polling tick
//! ([`SensorTick`]).

use crate::race::Lane;

/// Range-error sentinel reported by the sensor driver when no echo was
/// measured.
pub const RANGE_ERROR_MM: u16 = u16::MAX;

/// Returns `true` if `distance_mm` is a real measurement.
///
/// Zero and the range-error sentinel are discarded; neither may count as a
/// car crossing the line.
pub fn is_valid_reading(distance_mm: u16) -> bool {
    distance_mm != 0 && distance_mm != RANGE_ERROR_MM
}

// ── Samples ───────────────────────────────────────────────────────────────────

/// A single lane reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceSample {
    pub lane: Lane,
    pub distance_mm: u16,
    pub timestamp_ms: u64,
}

impl DistanceSample {
    pub fn new(lane: Lane, distance_mm: u16, timestamp_ms: u64) -> Self {
        Self {
            lane,
            distance_mm,
            timestamp_ms,
        }
    }
}

/// Both lanes read in the same polling tick, stamped with one clock value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTick {
    pub lane1_mm: u16,
    pub lane2_mm: u16,
    pub timestamp_ms: u64,
}

impl SensorTick {
    pub fn distance(&self, lane: Lane) -> u16 {
        match lane {
            Lane::One => self.lane1_mm,
            Lane::Two => self.lane2_mm,
        }
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// Something that can be polled for a lane's current distance.
///
/// `elapsed_ms` is the time since the race started; hardware sources ignore
/// it, simulated sources use it to decide where the car is.
pub trait DistanceSource: Send {
    fn read(&mut self, lane: Lane, elapsed_ms: u64) -> u16;
}

/// Simulated track: each lane reports `far_mm` until its car's arrival time
/// and `near_mm` from then on.  A lane with no arrival never finishes.
#[derive(Debug, Clone)]
pub struct ScriptedTrack {
    arrivals_ms: [Option<u64>; 2],
    far_mm: u16,
    near_mm: u16,
}

impl ScriptedTrack {
    pub fn new(lane1_arrival_ms: Option<u64>, lane2_arrival_ms: Option<u64>) -> Self {
        Self {
            arrivals_ms: [lane1_arrival_ms, lane2_arrival_ms],
            far_mm: 800,
            near_mm: 60,
        }
    }

    /// Override the distances reported before and after arrival.
    pub fn with_distances(mut self, far_mm: u16, near_mm: u16) -> Self {
        self.far_mm = far_mm;
        self.near_mm = near_mm;
        self
    }
}

impl DistanceSource for ScriptedTrack {
    fn read(&mut self, lane: Lane, elapsed_ms: u64) -> u16 {
        match self.arrivals_ms[lane.index()] {
            Some(arrival) if elapsed_ms >= arrival => self.near_mm,
            _ => self.far_mm,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
