/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Bounded log of finished races.
//!
//! [`RaceHistory`] keeps the most recent `limit` results in arrival order;
//! once full, recording a race evicts the oldest.  Each record is persisted
//! through the [`RaceStore`] as soon as it is added.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::race::{RaceOutcome, Winner};
use crate::storage::{RaceStore, StorageError};

/// Default number of races retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One finished race as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unix seconds when the result was recorded.
    pub timestamp: u64,
    pub lane1_elapsed_ms: Option<u32>,
    pub lane2_elapsed_ms: Option<u32>,
    pub winner: Winner,
    /// Scheduled heat this race belonged to, if any.
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default)]
    pub heat: Option<u32>,
}

impl HistoryEntry {
    pub fn from_outcome(outcome: &RaceOutcome, timestamp: u64, heat: Option<(u32, u32)>) -> Self {
        Self {
            timestamp,
            lane1_elapsed_ms: outcome.lane1_elapsed_ms,
            lane2_elapsed_ms: outcome.lane2_elapsed_ms,
            winner: outcome.winner,
            round: heat.map(|(round, _)| round),
            heat: heat.map(|(_, heat)| heat),
        }
    }
}

pub struct RaceHistory<S> {
    store: S,
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl<S: RaceStore> RaceHistory<S> {
    /// Load the stored history, keeping only the newest `limit` entries.
    pub fn load(store: S, limit: usize) -> Result<Self, StorageError> {
        let limit = limit.max(1);
        let mut entries: VecDeque<HistoryEntry> = store.load_history()?.into();
        while entries.len() > limit {
            entries.pop_front();
        }
        Ok(Self {
            store,
            entries,
            limit,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a result stamped with the current wall-clock time.
    pub fn record(
        &mut self,
        outcome: &RaceOutcome,
        heat: Option<(u32, u32)>,
    ) -> Result<(), StorageError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.push(HistoryEntry::from_outcome(outcome, now, heat))
    }

    /// Append `entry` and persist.  On a failed write the in-memory history
    /// is restored, including any entry that was evicted.
    pub fn push(&mut self, entry: HistoryEntry) -> Result<(), StorageError> {
        let evicted = if self.entries.len() >= self.limit {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);

        let snapshot: Vec<HistoryEntry> = self.entries.iter().cloned().collect();
        if let Err(e) = self.store.save_history(&snapshot) {
            warn!(error = %e, "history write failed, entry discarded");
            self.entries.pop_back();
            if let Some(old) = evicted {
                self.entries.push_front(old);
            }
            return Err(e);
        }

        info!(entries = self.entries.len(), "race recorded in history");
        Ok(())
    }

    /// Drop every entry.  On a failed write the entries are kept.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        if let Err(e) = self.store.save_history(&[]) {
            warn!(error = %e, "history write failed, entries kept");
            return Err(e);
        }
        let dropped = self.entries.len();
        self.entries.clear();
        info!(dropped, "race history cleared");
        Ok(())
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
