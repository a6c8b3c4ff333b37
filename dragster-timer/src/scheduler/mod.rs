//! Racer roster and round-robin heat scheduler.
//!
//! [`RaceScheduler`] owns the roster of [`Racer`]s and the generated list of
//! [`Race`] heats.  Schedules are Perfect-N round robins over the checked-in
//! racers (see [`perfect_n`]): every pair races exactly once, with lanes
//! balanced greedily.
//!
//! # Persistence
//! Every mutation is a read-modify-write-persist transaction against the
//! [`RaceStore`]: the change is applied in memory, the roster is saved, and
//! if the save fails the in-memory change is rolled back before the error
//! is returned.  Memory and storage never diverge.
//!
//! # Example
//! ```rust,ignore
//! let mut scheduler = RaceScheduler::open(JsonFileStore::new("race_data"))?;
//! let alice = scheduler.add_racer("Alice")?;
//! let bob = scheduler.add_racer("Bob")?;
//! scheduler.check_in_racer(alice)?;
//! scheduler.check_in_racer(bob)?;
//! scheduler.generate_schedule()?;
//! let next = scheduler.get_current_race();
//! ```

pub mod error;
pub mod perfect_n;

pub use error::{ScheduleDefect, SchedulerError};

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::race::Lane;
use crate::storage::RaceStore;

use perfect_n::{balance_lanes, circle_pairings, validate_schedule};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Largest roster the scheduler accepts.
pub const MAX_RACERS: usize = 50;

/// Longest accepted racer name, in characters.
pub const MAX_NAME_LEN: usize = 50;

// ── Records ───────────────────────────────────────────────────────────────────

/// Positive racer identifier, assigned as `max existing id + 1`.
pub type RacerId = u32;

/// A registered competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Racer {
    pub id: RacerId,
    pub name: String,
    /// Eligible for the next generated schedule.
    pub checked_in: bool,
    pub total_races: u32,
    pub lane1_races: u32,
    pub lane2_races: u32,
}

impl Racer {
    fn new(id: RacerId, name: String) -> Self {
        Self {
            id,
            name,
            checked_in: false,
            total_races: 0,
            lane1_races: 0,
            lane2_races: 0,
        }
    }
}

/// One scheduled heat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub round: u32,
    pub heat: u32,
    pub lane1_racer: RacerId,
    pub lane2_racer: RacerId,
    pub completed: bool,
    /// Unix seconds; `0` when heats are not time-slotted.
    pub scheduled_time: u64,
}

impl Race {
    pub fn new(round: u32, heat: u32, lane1_racer: RacerId, lane2_racer: RacerId) -> Self {
        Self {
            round,
            heat,
            lane1_racer,
            lane2_racer,
            completed: false,
            scheduled_time: 0,
        }
    }

    /// Racer assigned to `lane`.
    pub fn racer_in(&self, lane: Lane) -> RacerId {
        match lane {
            Lane::One => self.lane1_racer,
            Lane::Two => self.lane2_racer,
        }
    }

    pub fn involves(&self, id: RacerId) -> bool {
        self.lane1_racer == id || self.lane2_racer == id
    }
}

// ── RaceScheduler ─────────────────────────────────────────────────────────────

/// Roster and schedule owner.  One instance per event; concurrent callers
/// must serialise through it.
pub struct RaceScheduler<S> {
    store: S,
    racers: Vec<Racer>,
    schedule: Vec<Race>,
    heat_interval_secs: u64,
}

impl<S: RaceStore> RaceScheduler<S> {
    /// Empty scheduler; nothing is read from `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            racers: Vec::new(),
            schedule: Vec::new(),
            heat_interval_secs: 0,
        }
    }

    /// Scheduler initialised from the roster and schedule already in `store`.
    ///
    /// # Errors
    /// Returns [`SchedulerError::Storage`] if the records cannot be read.
    pub fn open(store: S) -> Result<Self, SchedulerError> {
        let roster = store.load_roster()?;

        info!(
            racers = roster.racers.len(),
            heats = roster.schedule.len(),
            "roster loaded"
        );

        Ok(Self {
            store,
            racers: roster.racers,
            schedule: roster.schedule,
            heat_interval_secs: 0,
        })
    }

    /// Space generated heats `secs` apart (`0` = unscheduled).
    pub fn with_heat_interval(mut self, secs: u64) -> Self {
        self.heat_interval_secs = secs;
        self
    }

    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    pub fn racer(&self, id: RacerId) -> Option<&Racer> {
        self.racers.iter().find(|r| r.id == id)
    }

    pub fn schedule(&self) -> &[Race] {
        &self.schedule
    }

    /// `(round, heat)` of the completed heat furthest along in schedule
    /// order.  Heats completed out of order do not move it backwards.
    pub fn furthest_completed(&self) -> Option<(u32, u32)> {
        self.schedule
            .iter()
            .rev()
            .find(|r| r.completed)
            .map(|r| (r.round, r.heat))
    }

    // ── Racer management ──────────────────────────────────────────────────────

    /// Register a racer and return the assigned id.
    ///
    /// Surrounding whitespace is trimmed before the checks.
    ///
    /// # Errors
    /// `EmptyName`, `NameTooLong`, `DuplicateName` or `RosterFull` without
    /// touching the roster; `Storage` (after rollback) if the save fails.
    pub fn add_racer(&mut self, name: &str) -> Result<RacerId, SchedulerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchedulerError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(SchedulerError::NameTooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        if self.racers.iter().any(|r| r.name == name) {
            warn!(name = %name, "duplicate racer name rejected");
            return Err(SchedulerError::DuplicateName(name.to_string()));
        }
        if self.racers.len() >= MAX_RACERS {
            return Err(SchedulerError::RosterFull { max: MAX_RACERS });
        }

        let id = self.racers.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        self.transact(|s| s.racers.push(Racer::new(id, name.to_string())))?;

        info!(id, name = %name, "racer added");
        Ok(id)
    }

    /// Remove a racer.  `Ok(false)` if no racer has `id`.
    ///
    /// Heats already scheduled for the racer are left in place.
    pub fn remove_racer(&mut self, id: RacerId) -> Result<bool, SchedulerError> {
        let Some(idx) = self.racers.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        self.transact(|s| {
            s.racers.remove(idx);
        })?;

        let pending = self
            .schedule
            .iter()
            .filter(|r| !r.completed && r.involves(id))
            .count();
        if pending > 0 {
            warn!(id, pending, "removed racer still has uncompleted heats");
        }
        info!(id, "racer removed");
        Ok(true)
    }

    /// Mark a racer eligible for scheduling.  `Ok(false)` if not found.
    pub fn check_in_racer(&mut self, id: RacerId) -> Result<bool, SchedulerError> {
        self.set_checked_in(id, true)
    }

    /// Withdraw a racer from the next schedule.  `Ok(false)` if not found.
    pub fn check_out_racer(&mut self, id: RacerId) -> Result<bool, SchedulerError> {
        self.set_checked_in(id, false)
    }

    /// Checked-in racers in roster order.
    pub fn get_checked_in_racers(&self) -> Vec<Racer> {
        self.racers.iter().filter(|r| r.checked_in).cloned().collect()
    }

    fn set_checked_in(&mut self, id: RacerId, checked_in: bool) -> Result<bool, SchedulerError> {
        let Some(idx) = self.racers.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        self.transact(|s| s.racers[idx].checked_in = checked_in)?;
        info!(id, checked_in, "racer check-in updated");
        Ok(true)
    }

    // ── Schedule ──────────────────────────────────────────────────────────────

    /// Replace the schedule with a fresh Perfect-N round robin over the
    /// checked-in racers, slotted from the current wall-clock time.
    pub fn generate_schedule(&mut self) -> Result<(), SchedulerError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.generate_schedule_at(now)
    }

    /// As [`generate_schedule`](Self::generate_schedule) with an explicit
    /// session start (Unix seconds) for the heat time slots.
    ///
    /// # Errors
    /// * `NotEnoughRacers`: fewer than 2 checked in.
    /// * `ValidationFailed`: the generated heats are not a complete round
    ///   robin; nothing is kept.
    /// * `Storage`: save failed; the previous schedule is restored.
    pub fn generate_schedule_at(&mut self, session_start: u64) -> Result<(), SchedulerError> {
        let ids: Vec<RacerId> = self
            .racers
            .iter()
            .filter(|r| r.checked_in)
            .map(|r| r.id)
            .collect();
        if ids.len() < 2 {
            warn!(checked_in = ids.len(), "not enough racers to generate a schedule");
            return Err(SchedulerError::NotEnoughRacers {
                checked_in: ids.len(),
            });
        }

        let mut races = circle_pairings(&ids);
        let swaps = balance_lanes(&mut races);
        debug!(swaps, "lane assignments balanced");

        if let Err(defect) = validate_schedule(&races, &ids) {
            warn!(%defect, "generated schedule discarded");
            return Err(SchedulerError::ValidationFailed(defect));
        }

        if self.heat_interval_secs > 0 {
            for (i, race) in races.iter_mut().enumerate() {
                race.scheduled_time = session_start + i as u64 * self.heat_interval_secs;
            }
        }

        let heats = races.len();
        let rounds = races.last().map_or(0, |r| r.round);
        self.transact(|s| {
            s.schedule = races;
        })?;

        info!(racers = ids.len(), rounds, heats, "schedule generated");
        Ok(())
    }

    /// Up to `count` uncompleted heats, in round/heat order.
    pub fn get_upcoming_races(&self, count: usize) -> Vec<Race> {
        self.schedule
            .iter()
            .filter(|r| !r.completed)
            .take(count)
            .cloned()
            .collect()
    }

    /// First uncompleted heat, or `None` when the schedule is exhausted.
    pub fn get_current_race(&self) -> Option<Race> {
        self.schedule.iter().find(|r| !r.completed).cloned()
    }

    /// Mark heat `(round, heat)` complete.  `Ok(false)` if no such heat.
    ///
    /// The first completion also credits both racers with a race and a lane
    /// assignment; repeating it is a no-op.
    pub fn mark_race_complete(&mut self, round: u32, heat: u32) -> Result<bool, SchedulerError> {
        let Some(idx) = self
            .schedule
            .iter()
            .position(|r| r.round == round && r.heat == heat)
        else {
            return Ok(false);
        };
        if self.schedule[idx].completed {
            debug!(round, heat, "heat already complete");
            return Ok(true);
        }

        self.transact(|s| {
            let race = &mut s.schedule[idx];
            race.completed = true;
            let (l1, l2) = (race.lane1_racer, race.lane2_racer);
            for racer in s.racers.iter_mut() {
                if racer.id == l1 {
                    racer.total_races += 1;
                    racer.lane1_races += 1;
                } else if racer.id == l2 {
                    racer.total_races += 1;
                    racer.lane2_races += 1;
                }
            }
        })?;

        info!(round, heat, "heat complete");
        Ok(true)
    }

    /// Drop every heat and reset progress.
    pub fn clear_schedule(&mut self) -> Result<(), SchedulerError> {
        self.transact(|s| {
            s.schedule.clear();
        })?;
        info!("schedule cleared");
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────────────────────

    /// Apply `change`, persist, and restore the previous roster and schedule
    /// if persisting fails.
    fn transact(&mut self, change: impl FnOnce(&mut Self)) -> Result<(), SchedulerError> {
        let racers = self.racers.clone();
        let schedule = self.schedule.clone();

        change(self);

        if let Err(e) = self.store.save_roster(&self.racers, &self.schedule) {
            warn!(error = %e, "persist failed, rolling back");
            self.racers = racers;
            self.schedule = schedule;
            return Err(SchedulerError::Storage(e));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
