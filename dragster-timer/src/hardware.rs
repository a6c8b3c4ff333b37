/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Clock and release-relay seams.
//!
//! The timer never reads the system clock or drives a GPIO directly; it goes
//! through [`Clock`] and [`Relay`] so that tests and simulations can supply
//! deterministic stand-ins.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the clock was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock.  Clones share the same time value.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ── Relay ─────────────────────────────────────────────────────────────────────

/// Release mechanism that punctures the CO₂ cartridges.
///
/// `pulse` is synchronous and bounded: it returns only after the relay has
/// been energised for `duration` and switched off again.  The caller latches
/// the start timestamp after it returns.
pub trait Relay: Send {
    fn pulse(&mut self, duration: Duration);
}

/// Relay stand-in for hosts without the release hardware.
///
/// Sleeps for the activation time and counts firings.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRelay {
    fired: Arc<AtomicU32>,
}

impl SimulatedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed pulses.
    pub fn fire_count(&self) -> u32 {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Relay for SimulatedRelay {
    fn pulse(&mut self, duration: Duration) {
        debug!(duration_ms = duration.as_millis() as u64, "relay on");
        std::thread::sleep(duration);
        let n = self.fired.fetch_add(1, Ordering::SeqCst) + 1;
        info!(fire_count = n, "relay off, cars released");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
