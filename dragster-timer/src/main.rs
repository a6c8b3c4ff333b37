/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use dragster_timer::config::{TimerConfig, TimerConfigManager};
use dragster_timer::hardware::{MonotonicClock, SimulatedRelay};
use dragster_timer::history::RaceHistory;
use dragster_timer::race::{Lane, RaceOutcome};
use dragster_timer::scheduler::RaceScheduler;
use dragster_timer::sensor::ScriptedTrack;
use dragster_timer::storage::JsonFileStore;
use dragster_timer::timer::{RaceTimer, SharedRaceTimer, TimerSettings};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Two-lane dragster race timer.
///
/// Runs one race on the simulated track: loads the cars, fires the release
/// relay, samples both finish-line sensors and reports the result.
///
/// Example:
///   dragster-timer --config timer.yaml --lane1-ms 1180 --lane2-ms 1215
#[derive(Debug, Parser)]
#[command(
    name = "dragster-timer",
    about = "Two-lane CO2 dragster race timer",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML timer configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Directory holding racers.json, schedule.json and history.json.
    /// Overrides `storage.data_dir` from the configuration.
    #[arg(short = 'd', long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Simulated lane 1 arrival time after the start (ms).  Omit for a car
    /// that never reaches the line.
    #[arg(long = "lane1-ms")]
    lane1_ms: Option<u64>,

    /// Simulated lane 2 arrival time after the start (ms).
    #[arg(long = "lane2-ms")]
    lane2_ms: Option<u64>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Dragster timer starting up...");

    let cli = Cli::parse();

    info!(
        config   = ?cli.config,
        data_dir = ?cli.data_dir,
        lane1_ms = ?cli.lane1_ms,
        lane2_ms = ?cli.lane2_ms,
        "Configuration"
    );

    // ── Load timer configuration ──────────────────────────────────────────────
    let mut config_manager = TimerConfigManager::new();

    match &cli.config {
        Some(path) => {
            if let Err(e) = config_manager.load_from_file(path) {
                error!("Failed to load timer configuration: {:#}", e);
                process::exit(1);
            }
        }
        None => {
            warn!("No configuration file provided, using default timer settings");
        }
    }

    if let Err(e) = run(&cli, config_manager.config()).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

// ── Race ──────────────────────────────────────────────────────────────────────

async fn run(cli: &Cli, config: &TimerConfig) -> Result<()> {
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.storage.data_dir.clone());
    let store = JsonFileStore::new(data_dir);

    let mut scheduler = RaceScheduler::open(store.clone())
        .with_context(|| format!("Cannot read roster from {}", store.dir().display()))?;
    let mut history = RaceHistory::load(store.clone(), config.storage.history_limit)
        .with_context(|| format!("Cannot read race history from {}", store.dir().display()))?;

    let heat = scheduler.get_current_race();
    let racer_names = heat.as_ref().map(|race| {
        Lane::ALL.map(|lane| {
            let id = race.racer_in(lane);
            scheduler
                .racer(id)
                .map_or_else(|| format!("#{id}"), |r| r.name.clone())
        })
    });
    match (&heat, &racer_names) {
        (Some(race), Some([lane1, lane2])) => info!(
            round = race.round,
            heat = race.heat,
            lane1 = %lane1,
            lane2 = %lane2,
            "Running scheduled heat"
        ),
        _ => info!("No scheduled heat pending, running an exhibition race"),
    }

    let timer = SharedRaceTimer::new(RaceTimer::new(
        TimerSettings::from(config),
        SimulatedRelay::new(),
        MonotonicClock::new(),
    ));

    timer.load()?;

    // The relay pulse blocks for the activation time.
    let starter = timer.clone();
    let started = tokio::task::spawn_blocking(move || starter.start())
        .await
        .context("start task panicked")??;
    info!(start_timestamp_ms = started.start_timestamp_ms, "Timing");

    // ── Sampling loop ─────────────────────────────────────────────────────────
    let mut track = ScriptedTrack::new(cli.lane1_ms, cli.lane2_ms);
    let mut ticker = tokio::time::interval(config.sample_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let outcome = loop {
        ticker.tick().await;
        let report = timer.poll(&mut track);
        for finish in &report.finishes {
            println!(
                "{} finished: {}",
                finish.lane,
                format_elapsed(Some(finish.elapsed_ms))
            );
        }
        if let Some(outcome) = report.outcome {
            break outcome;
        }
    };

    print_outcome(&outcome, racer_names.as_ref());

    // ── Record ────────────────────────────────────────────────────────────────
    let heat_id = heat.as_ref().map(|r| (r.round, r.heat));
    history
        .record(&outcome, heat_id)
        .context("Failed to record race history")?;

    if let Some((round, heat)) = heat_id {
        scheduler
            .mark_race_complete(round, heat)
            .context("Failed to mark heat complete")?;
    }

    timer.reset();
    Ok(())
}

fn format_elapsed(ms: Option<u32>) -> String {
    match ms {
        Some(ms) => format!("{}.{:03} s", ms / 1000, ms % 1000),
        None => "DNF".to_string(),
    }
}

fn print_outcome(outcome: &RaceOutcome, racer_names: Option<&[String; 2]>) {
    for lane in Lane::ALL {
        println!("{lane}: {}", format_elapsed(outcome.elapsed(lane)));
    }
    if outcome.timed_out {
        println!("Race timed out");
    }
    match (outcome.winner.lane(), racer_names) {
        (Some(lane), Some(names)) => println!("Winner: {lane} ({})", names[lane.index()]),
        _ => println!("Winner: {}", outcome.winner),
    }
}
