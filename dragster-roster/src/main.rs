/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use dragster_timer::config::TimerConfigManager;
use dragster_timer::history::{HistoryEntry, RaceHistory};
use dragster_timer::scheduler::{Race, RaceScheduler, RacerId};
use dragster_timer::storage::{JsonFileStore, RaceStore};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Racer roster and heat schedule management.
///
/// Example:
///   dragster-roster add "Alice"
///   dragster-roster check-in 1
///   dragster-roster generate
///   dragster-roster upcoming --count 3
#[derive(Debug, Parser)]
#[command(
    name = "dragster-roster",
    about = "Racer roster and Perfect-N heat schedule management",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML timer configuration file (data directory and heat
    /// interval).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Directory holding racers.json, schedule.json and history.json.
    #[arg(short = 'd', long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a racer.
    Add { name: String },
    /// Remove a racer from the roster.
    Remove { id: RacerId },
    /// Mark a racer eligible for the next schedule.
    CheckIn { id: RacerId },
    /// Withdraw a racer from the next schedule.
    CheckOut { id: RacerId },
    /// Show the roster.
    List,
    /// Replace the schedule with a round robin over the checked-in racers.
    Generate,
    /// Show the next uncompleted heats.
    Upcoming {
        #[arg(short = 'n', long = "count", default_value_t = 5)]
        count: usize,
    },
    /// Show the heat on deck.
    Current,
    /// Mark a heat complete.
    Complete { round: u32, heat: u32 },
    /// Drop the whole schedule.
    Clear,
    /// Show recorded race results, newest first.
    History {
        #[arg(short = 'n', long = "count", default_value_t = 10)]
        count: usize,
    },
    /// Delete every recorded race result.
    ClearHistory,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let mut config_manager = TimerConfigManager::new();
    if let Some(path) = &cli.config {
        config_manager.load_from_file(path)?;
    }
    let config = config_manager.config();

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.storage.data_dir.clone());
    let store = JsonFileStore::new(&data_dir);
    let mut scheduler = RaceScheduler::open(store.clone())
        .with_context(|| format!("Cannot read roster from {}", data_dir.display()))?
        .with_heat_interval(config.scheduler.heat_interval_secs);
    let mut history = RaceHistory::load(store, config.storage.history_limit)
        .with_context(|| format!("Cannot read race history from {}", data_dir.display()))?;

    execute(&mut scheduler, &mut history, cli.command)
}

// ── Command handlers ──────────────────────────────────────────────────────────

/// Apply `command` and return the text to show the operator.
fn execute<S: RaceStore>(
    scheduler: &mut RaceScheduler<S>,
    history: &mut RaceHistory<S>,
    command: Command,
) -> Result<String> {
    let mut out = String::new();

    match command {
        Command::Add { name } => {
            let id = scheduler.add_racer(&name)?;
            writeln!(out, "Added racer {id}: {}", name.trim())?;
        }
        Command::Remove { id } => {
            if !scheduler.remove_racer(id)? {
                bail!("no racer with id {id}");
            }
            writeln!(out, "Removed racer {id}")?;
        }
        Command::CheckIn { id } => {
            if !scheduler.check_in_racer(id)? {
                bail!("no racer with id {id}");
            }
            writeln!(out, "Racer {id} checked in")?;
        }
        Command::CheckOut { id } => {
            if !scheduler.check_out_racer(id)? {
                bail!("no racer with id {id}");
            }
            writeln!(out, "Racer {id} checked out")?;
        }
        Command::List => {
            if scheduler.racers().is_empty() {
                writeln!(out, "No racers registered")?;
            }
            for r in scheduler.racers() {
                writeln!(
                    out,
                    "{:>3}  {:<20} {:<11} races={} (lane 1: {}, lane 2: {})",
                    r.id,
                    r.name,
                    if r.checked_in { "checked-in" } else { "-" },
                    r.total_races,
                    r.lane1_races,
                    r.lane2_races,
                )?;
            }
        }
        Command::Generate => {
            scheduler.generate_schedule()?;
            let heats = scheduler.schedule().len();
            let rounds = scheduler.schedule().last().map_or(0, |r| r.round);
            writeln!(out, "Generated {heats} heats in {rounds} rounds")?;
        }
        Command::Upcoming { count } => {
            let upcoming = scheduler.get_upcoming_races(count);
            if upcoming.is_empty() {
                writeln!(out, "No upcoming heats")?;
            }
            for race in &upcoming {
                writeln!(out, "{}", describe(scheduler, race))?;
            }
        }
        Command::Current => match scheduler.get_current_race() {
            Some(race) => writeln!(out, "{}", describe(scheduler, &race))?,
            None => writeln!(out, "Schedule complete")?,
        },
        Command::Complete { round, heat } => {
            if !scheduler.mark_race_complete(round, heat)? {
                bail!("no heat {heat} in round {round}");
            }
            writeln!(out, "Round {round} heat {heat} complete")?;
        }
        Command::Clear => {
            scheduler.clear_schedule()?;
            writeln!(out, "Schedule cleared")?;
        }
        Command::History { count } => {
            let entries = history.recent(count);
            if entries.is_empty() {
                writeln!(out, "No races recorded")?;
            }
            for entry in &entries {
                writeln!(out, "{}", describe_result(entry))?;
            }
        }
        Command::ClearHistory => {
            let dropped = history.len();
            history.clear()?;
            writeln!(out, "Cleared {dropped} recorded races")?;
        }
    }

    Ok(out)
}

/// One-line heat summary with racer names.
fn describe<S: RaceStore>(scheduler: &RaceScheduler<S>, race: &Race) -> String {
    let name = |id: RacerId| match scheduler.racer(id) {
        Some(r) => r.name.clone(),
        None => {
            warn!(id, "heat references a racer no longer on the roster");
            format!("#{id}")
        }
    };
    format!(
        "R{}H{}  lane 1: {:<20} lane 2: {}",
        race.round,
        race.heat,
        name(race.lane1_racer),
        name(race.lane2_racer),
    )
}

/// One-line race result summary.
fn describe_result(entry: &HistoryEntry) -> String {
    let elapsed = |ms: Option<u32>| match ms {
        Some(ms) => format!("{}.{:03} s", ms / 1000, ms % 1000),
        None => "DNF".to_string(),
    };
    let heat = match (entry.round, entry.heat) {
        (Some(round), Some(heat)) => format!("R{round}H{heat}"),
        _ => "exhibition".to_string(),
    };
    format!(
        "{}  {:<10}  lane 1: {:<9} lane 2: {:<9} winner: {}",
        entry.timestamp,
        heat,
        elapsed(entry.lane1_elapsed_ms),
        elapsed(entry.lane2_elapsed_ms),
        entry.winner,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
