/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the heat scheduler.
//!
//! Two error enums model the two failure layers:
//!
//! * [`ScheduleDefect`]: what exactly is wrong with a generated schedule
//!   (low-level, carries the offending racer ids).
//! * [`SchedulerError`]: top-level failure returned from the
//!   [`RaceScheduler`](super::RaceScheduler) mutation methods.
//!
//! Every variant carries enough data for the command handler to render a
//! message for the operator without further lookups.

use thiserror::Error;

use crate::storage::StorageError;

use super::RacerId;

// ── Schedule validation ───────────────────────────────────────────────────────

/// Reason a generated schedule was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDefect {
    /// A heat references a racer that is not checked in.
    UnknownRacer { id: RacerId },

    /// A heat puts the same racer in both lanes.
    SelfPairing { id: RacerId },

    /// Two heats race the same pair.
    DuplicatePairing { a: RacerId, b: RacerId },

    /// A pair of checked-in racers never meets.
    MissingPairing { a: RacerId, b: RacerId },
}

impl std::fmt::Display for ScheduleDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleDefect::UnknownRacer { id } => {
                write!(f, "racer {} is not among the checked-in racers", id)
            }
            ScheduleDefect::SelfPairing { id } => {
                write!(f, "racer {} is scheduled against themselves", id)
            }
            ScheduleDefect::DuplicatePairing { a, b } => {
                write!(f, "racers {} and {} meet more than once", a, b)
            }
            ScheduleDefect::MissingPairing { a, b } => {
                write!(f, "racers {} and {} never race each other", a, b)
            }
        }
    }
}

// ── Top-level scheduler errors ────────────────────────────────────────────────

/// Error returned by the [`RaceScheduler`](super::RaceScheduler) operations.
///
/// | Variant | Cause | State change |
/// |---|---|---|
/// | `EmptyName` / `NameTooLong` / `DuplicateName` / `RosterFull` | rejected command | none |
/// | `NotEnoughRacers` | rejected command | none |
/// | `ValidationFailed` | generated schedule discarded | none, prior schedule kept |
/// | `Storage` | persist step failed | in-memory change rolled back |
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("racer name must not be empty")]
    EmptyName,

    #[error("racer name is {len} characters long (maximum {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("a racer named '{0}' already exists")]
    DuplicateName(String),

    #[error("roster is full ({max} racers)")]
    RosterFull { max: usize },

    #[error("need at least 2 checked-in racers to generate a schedule (have {checked_in})")]
    NotEnoughRacers { checked_in: usize },

    #[error("generated schedule failed validation: {0}")]
    ValidationFailed(ScheduleDefect),

    /// The store could not persist the change; memory was rolled back.
    #[error("failed to persist roster: {0}")]
    Storage(#[from] StorageError),
}
