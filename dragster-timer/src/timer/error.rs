/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Command rejections for the race timer.
//!
//! A rejection is an ordinary return value: the state machine is left
//! untouched and the caller decides what to show the operator ("cannot
//! start, cars not loaded").

use thiserror::Error;

use super::Phase;

/// Why a `load()` or `start()` command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectedReason {
    /// `load()` is only accepted while idle.
    #[error("cannot load cars while the timer is {phase}")]
    NotIdle { phase: Phase },

    /// `start()` is only accepted once cars are loaded.
    #[error("cannot start: cars not loaded (timer is {phase})")]
    NotLoaded { phase: Phase },
}
