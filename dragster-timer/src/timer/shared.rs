/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Lock-protected handle for driving one [`RaceTimer`] from several tasks.
//!
//! The sampling loop and the command sources (buttons, network, serial)
//! each hold a clone.  Every call takes the lock for its whole duration, so
//! `start()` (relay pulse plus timestamp latch) is atomic with respect to
//! sample delivery.  The lock is a blocking `std::sync::Mutex`; call
//! `start()` from a blocking context when running on an async executor.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::hardware::{Clock, Relay};
use crate::race::{FinishEvent, RaceOutcome, StartedEvent};
use crate::sensor::{DistanceSample, DistanceSource, SensorTick};

use super::{Phase, PollReport, RaceTimer, RaceTimerState, RejectedReason};

/// Cloneable, thread-safe handle around a [`RaceTimer`].
pub struct SharedRaceTimer<R, C> {
    inner: Arc<Mutex<RaceTimer<R, C>>>,
}

impl<R, C> Clone for SharedRaceTimer<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Relay, C: Clock> SharedRaceTimer<R, C> {
    pub fn new(timer: RaceTimer<R, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(timer)),
        }
    }

    /// Every transition leaves the state consistent, so a panic in another
    /// holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, RaceTimer<R, C>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn load(&self) -> Result<(), RejectedReason> {
        self.lock().load()
    }

    pub fn start(&self) -> Result<StartedEvent, RejectedReason> {
        self.lock().start()
    }

    pub fn reset(&self) {
        self.lock().reset()
    }

    pub fn on_sample(&self, sample: DistanceSample) -> Option<FinishEvent> {
        self.lock().on_sample(sample)
    }

    pub fn on_tick(&self, tick: SensorTick) -> Vec<FinishEvent> {
        self.lock().on_tick(tick)
    }

    pub fn check_timeout(&self, now_ms: u64) -> Option<RaceOutcome> {
        self.lock().check_timeout(now_ms)
    }

    pub fn poll<S: DistanceSource + ?Sized>(&self, source: &mut S) -> PollReport {
        self.lock().poll(source)
    }

    pub fn outcome(&self) -> Option<RaceOutcome> {
        self.lock().outcome()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    /// Copy of the live state for display.
    pub fn snapshot(&self) -> RaceTimerState {
        *self.lock().state()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
