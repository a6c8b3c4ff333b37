/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Perfect-N round-robin generation, lane balancing and validation.
//!
//! # Circle method
//! Place the `n` participants in slots `r[0..n]` (padding with a bye when
//! `n` is odd).  Each of the `n − 1` rounds pairs `r[i]` with `r[n−1−i]`;
//! between rounds `r[0]` stays put and `r[1..n]` rotates one step right
//! (the last slot moves into slot 1).
//!
//! ```text
//! n = 4          round 1        round 2        round 3
//! slots:         1 2 3 4        1 4 2 3        1 3 4 2
//! pairs:         1–4  2–3       1–3  4–2       1–2  3–4
//! ```
//!
//! This yields `n(n−1)/2` pairings with every unordered pair appearing
//! exactly once.  Pairings against the bye are dropped.
//!
//! Everything here is a pure function of its inputs.

use std::collections::{BTreeMap, BTreeSet};

use super::error::ScheduleDefect;
use super::{Race, RacerId};

// ── Generation ────────────────────────────────────────────────────────────────

/// Round-robin heats for `ids`, in round then heat order.
///
/// Heats are numbered from 1 within each round, skipping bye pairings, so a
/// round of an odd roster has `(n − 1) / 2` consecutive heats.
/// `scheduled_time` is left at 0 and `completed` at `false`.
///
/// ```
/// use dragster_timer::scheduler::perfect_n::circle_pairings;
///
/// let races = circle_pairings(&[1, 2, 3, 4, 5]);
/// assert_eq!(races.len(), 10);
/// assert_eq!((races[0].round, races[0].heat), (1, 1));
/// ```
pub fn circle_pairings(ids: &[RacerId]) -> Vec<Race> {
    let mut slots: Vec<Option<RacerId>> = ids.iter().copied().map(Some).collect();
    if slots.len() % 2 != 0 {
        slots.push(None); // bye
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut races = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
    for round in 1..n as u32 {
        let mut heat = 0;
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) {
                heat += 1;
                races.push(Race::new(round, heat, a, b));
            }
        }
        // r[0] fixed, the rest rotate one step
        slots[1..].rotate_right(1);
    }
    races
}

// ── Lane balancing ────────────────────────────────────────────────────────────

/// Per-racer `(lane1, lane2)` assignment counts.
pub fn lane_counts(races: &[Race]) -> BTreeMap<RacerId, (u32, u32)> {
    let mut counts: BTreeMap<RacerId, (u32, u32)> = BTreeMap::new();
    for race in races {
        counts.entry(race.lane1_racer).or_default().0 += 1;
        counts.entry(race.lane2_racer).or_default().1 += 1;
    }
    counts
}

/// Greedy single pass: swap a heat's lanes when the lane-1 racer has more
/// lane-1 than lane-2 assignments and the lane-2 racer has the opposite
/// surplus.  Returns the number of swaps.
///
/// Not globally optimal, but no racer's imbalance ever grows.
pub fn balance_lanes(races: &mut [Race]) -> usize {
    let mut counts = lane_counts(races);
    let mut swaps = 0;

    for race in races.iter_mut() {
        let (a, b) = (race.lane1_racer, race.lane2_racer);
        let (a1, a2) = counts.get(&a).copied().unwrap_or_default();
        let (b1, b2) = counts.get(&b).copied().unwrap_or_default();

        if a1 > a2 && b2 > b1 {
            std::mem::swap(&mut race.lane1_racer, &mut race.lane2_racer);
            counts.insert(a, (a1 - 1, a2 + 1));
            counts.insert(b, (b1 + 1, b2 - 1));
            swaps += 1;
        }
    }
    swaps
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Confirm `races` is a complete round robin over exactly `ids`: every heat
/// pairs two distinct known racers, and every unordered pair meets exactly
/// once.
pub fn validate_schedule(races: &[Race], ids: &[RacerId]) -> Result<(), ScheduleDefect> {
    let known: BTreeSet<RacerId> = ids.iter().copied().collect();
    let mut seen: BTreeSet<(RacerId, RacerId)> = BTreeSet::new();

    for race in races {
        let (a, b) = (race.lane1_racer, race.lane2_racer);
        for id in [a, b] {
            if !known.contains(&id) {
                return Err(ScheduleDefect::UnknownRacer { id });
            }
        }
        if a == b {
            return Err(ScheduleDefect::SelfPairing { id: a });
        }
        if !seen.insert((a.min(b), a.max(b))) {
            return Err(ScheduleDefect::DuplicatePairing {
                a: a.min(b),
                b: a.max(b),
            });
        }
    }

    for (i, &a) in known.iter().enumerate() {
        for &b in known.iter().skip(i + 1) {
            if !seen.contains(&(a, b)) {
                return Err(ScheduleDefect::MissingPairing { a, b });
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
