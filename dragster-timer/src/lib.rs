/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Dragster timer – two-lane CO2 race timing and heat scheduling
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── race         – lanes, lane results, winner and race events
//! ├── sensor       – distance samples, paired ticks, scripted track source
//! ├── hardware     – clock and release-relay seams
//! ├── timer/       – finish-detection state machine, tie handling, shared handle
//! ├── scheduler/   – racer roster, Perfect-N round robin, lane balancing
//! ├── history      – bounded log of finished races
//! ├── storage/     – JSON file and in-memory record stores
//! └── config/      – YAML timer configuration
//! ```

pub mod config;
pub mod hardware;
pub mod history;
pub mod race;
pub mod scheduler;
pub mod sensor;
pub mod storage;
pub mod timer;
