/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Persistence of the racer roster, heat schedule and race history.
//!
//! The scheduler and history hand plain records to a [`RaceStore`]; they
//! never touch files themselves.  Two implementations:
//!
//! * [`JsonFileStore`]: one JSON array per file under a data directory
//!   (`racers.json`, `schedule.json`, `history.json`), camelCase fields.
//! * [`MemoryStore`]: in-process store whose writes can be made to fail,
//!   for exercising rollback paths.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::history::HistoryEntry;
use crate::scheduler::{Race, Racer};

pub const RACERS_FILE: &str = "racers.json";
pub const SCHEDULE_FILE: &str = "schedule.json";
pub const HISTORY_FILE: &str = "history.json";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the write (in-memory store with writes disabled).
    #[error("store rejected the write")]
    WriteRejected,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Roster and schedule as persisted together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub racers: Vec<Racer>,
    pub schedule: Vec<Race>,
}

/// Storage collaborator for scheduler and history records.
///
/// A failed `save_*` must leave the previously stored records readable;
/// callers roll back their in-memory state and surface the error.  Retry
/// policy, if any, belongs to the implementation.
pub trait RaceStore: Send {
    fn load_roster(&self) -> Result<Roster, StorageError>;
    fn save_roster(&mut self, racers: &[Racer], schedule: &[Race]) -> Result<(), StorageError>;
    fn load_history(&self) -> Result<Vec<HistoryEntry>, StorageError>;
    fn save_history(&mut self, entries: &[HistoryEntry]) -> Result<(), StorageError>;
}

// ── JsonFileStore ─────────────────────────────────────────────────────────────

/// File-backed store under a single data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_array<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StorageError> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "record file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Json { path, source })
    }

    /// Serialise `records` into a sibling temp file and return its path.
    /// The target file is not touched.
    fn stage<T: Serialize>(&self, name: &str, records: &[T]) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = self.dir.join(format!("{name}.tmp"));
        let json = serde_json::to_vec_pretty(records).map_err(|source| StorageError::Json {
            path: self.dir.join(name),
            source,
        })?;
        fs::write(&tmp, json).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        Ok(tmp)
    }

    /// Rename a staged temp file over its target.
    fn commit(&self, tmp: &Path, name: &str) -> Result<(), StorageError> {
        let path = self.dir.join(name);
        fs::rename(tmp, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn write_array<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), StorageError> {
        let tmp = self.stage(name, records)?;
        self.commit(&tmp, name)?;
        debug!(file = name, records = records.len(), "records written");
        Ok(())
    }
}

/// Best-effort removal of staged files after a failed save.
fn discard(staged: &[&Path]) {
    for tmp in staged {
        if let Err(e) = fs::remove_file(tmp) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %e, "stale temp file left behind");
            }
        }
    }
}

impl RaceStore for JsonFileStore {
    fn load_roster(&self) -> Result<Roster, StorageError> {
        Ok(Roster {
            racers: self.read_array(RACERS_FILE)?,
            schedule: self.read_array(SCHEDULE_FILE)?,
        })
    }

    /// Both files are staged before either is replaced.  If the schedule
    /// cannot be renamed into place after the racers were, the previous
    /// racers file is restored so the stored pair stays consistent.
    fn save_roster(&mut self, racers: &[Racer], schedule: &[Race]) -> Result<(), StorageError> {
        let racers_tmp = self.stage(RACERS_FILE, racers)?;
        let schedule_tmp = match self.stage(SCHEDULE_FILE, schedule) {
            Ok(tmp) => tmp,
            Err(e) => {
                discard(&[racers_tmp.as_path()]);
                return Err(e);
            }
        };

        let previous_racers = match fs::read(self.dir.join(RACERS_FILE)) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                discard(&[racers_tmp.as_path(), schedule_tmp.as_path()]);
                return Err(StorageError::Io {
                    path: self.dir.join(RACERS_FILE),
                    source,
                });
            }
        };

        if let Err(e) = self.commit(&racers_tmp, RACERS_FILE) {
            discard(&[racers_tmp.as_path(), schedule_tmp.as_path()]);
            return Err(e);
        }
        if let Err(e) = self.commit(&schedule_tmp, SCHEDULE_FILE) {
            discard(&[schedule_tmp.as_path()]);
            let racers_path = self.dir.join(RACERS_FILE);
            let restored = match previous_racers {
                Some(bytes) => fs::write(&racers_path, bytes),
                None => fs::remove_file(&racers_path),
            };
            if let Err(restore) = restored {
                warn!(error = %restore, "could not restore previous racers file");
            }
            return Err(e);
        }

        debug!(
            racers = racers.len(),
            heats = schedule.len(),
            "roster written"
        );
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        self.read_array(HISTORY_FILE)
    }

    fn save_history(&mut self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        self.write_array(HISTORY_FILE, entries)
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryContents {
    roster: Roster,
    history: Vec<HistoryEntry>,
    writes: usize,
}

/// In-memory store.  Clones share contents and the failure switch.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<MemoryContents>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every `save_*` returns [`StorageError::WriteRejected`] and
    /// leaves the stored records untouched.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryContents> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected);
        }
        Ok(())
    }
}

impl RaceStore for MemoryStore {
    fn load_roster(&self) -> Result<Roster, StorageError> {
        Ok(self.lock().roster.clone())
    }

    fn save_roster(&mut self, racers: &[Racer], schedule: &[Race]) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut c = self.lock();
        c.roster = Roster {
            racers: racers.to_vec(),
            schedule: schedule.to_vec(),
        };
        c.writes += 1;
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        Ok(self.lock().history.clone())
    }

    fn save_history(&mut self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut c = self.lock();
        c.history = entries.to_vec();
        c.writes += 1;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
