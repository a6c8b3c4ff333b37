//! Timer configuration loading and management.
//!
//! The expected YAML structure is:
//! ```yaml
//! sensor:
//!   threshold_mm: 150
//!   sampling_rate_hz: 50
//! race:
//!   relay_activation_ms: 250
//!   tie_threshold_ms: 2
//!   timeout_ms: 10000
//!   lane_offsets_ms: [0, 17]
//! scheduler:
//!   heat_interval_secs: 120
//! storage:
//!   data_dir: "/var/lib/dragster"
//!   history_limit: 50
//! ```
//!
//! Every section and every field is optional; anything absent falls back to
//! the firmware defaults in [`TimerConfig::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// This is kept private – callers work with [`TimerConfig`] /
/// [`TimerConfigManager`] instead.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimerConfigFile {
    #[serde(default)]
    sensor: SensorSection,
    #[serde(default)]
    race: RaceSection,
    #[serde(default)]
    scheduler: SchedulerSection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SensorSection {
    threshold_mm: Option<u16>,
    sampling_rate_hz: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RaceSection {
    relay_activation_ms: Option<u64>,
    tie_threshold_ms: Option<u32>,
    timeout_ms: Option<u64>,
    lane_offsets_ms: Option<[u32; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulerSection {
    heat_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageSection {
    data_dir: Option<PathBuf>,
    history_limit: Option<usize>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Finish-line sensor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSettings {
    /// Distance below which a car counts as present at the finish line.
    pub threshold_mm: u16,
    /// Polling cadence for both lanes.
    pub sampling_rate_hz: u32,
}

/// Race timing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceSettings {
    /// How long the release relay is held energised.
    pub relay_activation_ms: u64,
    /// Largest finish-time difference still treated as a dead heat
    /// (inclusive).
    pub tie_threshold_ms: u32,
    /// Race is forced to complete this long after the start.
    pub timeout_ms: u64,
    /// Per-lane calibration subtracted from the raw elapsed time.
    /// `[0, 0]` disables compensation.
    pub lane_offsets_ms: [u32; 2],
}

/// Heat scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Spacing between consecutive heats' `scheduled_time`.  `0` leaves every
    /// heat unscheduled (`scheduled_time == 0`).
    pub heat_interval_secs: u64,
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    /// Number of race results kept in the history file.
    pub history_limit: usize,
}

/// Complete timer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub sensor: SensorSettings,
    pub race: RaceSettings,
    pub scheduler: SchedulerSettings,
    pub storage: StorageSettings,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            sensor: SensorSettings {
                threshold_mm: 150,
                sampling_rate_hz: 50,
            },
            race: RaceSettings {
                relay_activation_ms: 250,
                tie_threshold_ms: 2,
                timeout_ms: 10_000,
                lane_offsets_ms: [0, 0],
            },
            scheduler: SchedulerSettings {
                heat_interval_secs: 0,
            },
            storage: StorageSettings {
                data_dir: PathBuf::from("race_data"),
                history_limit: 50,
            },
        }
    }
}

impl TimerConfig {
    /// Period between two sensor polls.
    pub fn sample_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.sensor.sampling_rate_hz.max(1)))
    }

    pub fn relay_activation(&self) -> Duration {
        Duration::from_millis(self.race.relay_activation_ms)
    }

    /// Overlay a parsed file onto the defaults.
    fn from_file(file: TimerConfigFile) -> Self {
        let d = Self::default();
        Self {
            sensor: SensorSettings {
                threshold_mm: file.sensor.threshold_mm.unwrap_or(d.sensor.threshold_mm),
                sampling_rate_hz: file
                    .sensor
                    .sampling_rate_hz
                    .unwrap_or(d.sensor.sampling_rate_hz),
            },
            race: RaceSettings {
                relay_activation_ms: file
                    .race
                    .relay_activation_ms
                    .unwrap_or(d.race.relay_activation_ms),
                tie_threshold_ms: file
                    .race
                    .tie_threshold_ms
                    .unwrap_or(d.race.tie_threshold_ms),
                timeout_ms: file.race.timeout_ms.unwrap_or(d.race.timeout_ms),
                lane_offsets_ms: file
                    .race
                    .lane_offsets_ms
                    .unwrap_or(d.race.lane_offsets_ms),
            },
            scheduler: SchedulerSettings {
                heat_interval_secs: file
                    .scheduler
                    .heat_interval_secs
                    .unwrap_or(d.scheduler.heat_interval_secs),
            },
            storage: StorageSettings {
                data_dir: file.storage.data_dir.unwrap_or(d.storage.data_dir),
                history_limit: file
                    .storage
                    .history_limit
                    .unwrap_or(d.storage.history_limit),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.sensor.threshold_mm > 0,
            "sensor.threshold_mm must be greater than 0"
        );
        ensure!(
            (1..=1000).contains(&self.sensor.sampling_rate_hz),
            "sensor.sampling_rate_hz must be between 1 and 1000 (got {})",
            self.sensor.sampling_rate_hz
        );
        ensure!(
            self.storage.history_limit > 0,
            "storage.history_limit must be greater than 0"
        );
        Ok(())
    }
}

// ── TimerConfigManager ────────────────────────────────────────────────────────

/// Loads and holds the timer configuration from a YAML file.
#[derive(Debug, Default)]
pub struct TimerConfigManager {
    config: TimerConfig,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl TimerConfigManager {
    /// Creates a manager holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates `path`, replacing the current configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or a value is out of range.  On error the
    /// manager falls back to the defaults and reports not loaded.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading timer configuration from: {}", path.display());

        // Reset state before (re-)loading
        self.config = TimerConfig::default();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: TimerConfigFile = if content.trim().is_empty() {
            TimerConfigFile::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?
        };

        let config = TimerConfig::from_file(file);
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(?config, "parsed timer configuration");
        info!(
            threshold_mm = config.sensor.threshold_mm,
            sampling_rate_hz = config.sensor.sampling_rate_hz,
            relay_ms = config.race.relay_activation_ms,
            tie_ms = config.race.tie_threshold_ms,
            timeout_ms = config.race.timeout_ms,
            lane_offsets_ms = ?config.race.lane_offsets_ms,
            data_dir = %config.storage.data_dir.display(),
            "Timer configuration loaded"
        );

        self.config = config;
        self.loaded = true;
        Ok(())
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Returns `true` after a successful call to [`load_from_file`](Self::load_from_file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── TimerConfig ───────────────────────────────────────────────────────────

    #[test]
    fn default_config_matches_firmware_values() {
        let cfg = TimerConfig::default();
        assert_eq!(cfg.sensor.threshold_mm, 150);
        assert_eq!(cfg.race.relay_activation_ms, 250);
        assert_eq!(cfg.race.tie_threshold_ms, 2);
        assert_eq!(cfg.race.timeout_ms, 10_000);
        assert_eq!(cfg.race.lane_offsets_ms, [0, 0]);
        assert_eq!(cfg.storage.history_limit, 50);
    }

    #[test]
    fn sample_interval_follows_rate() {
        let mut cfg = TimerConfig::default();
        assert_eq!(cfg.sample_interval(), Duration::from_millis(20));
        cfg.sensor.sampling_rate_hz = 200;
        assert_eq!(cfg.sample_interval(), Duration::from_millis(5));
    }

    // ── TimerConfigManager: load_from_file ────────────────────────────────────

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
sensor:
  threshold_mm: 120
  sampling_rate_hz: 100
race:
  relay_activation_ms: 300
  tie_threshold_ms: 5
  timeout_ms: 8000
  lane_offsets_ms: [0, 17]
scheduler:
  heat_interval_secs: 90
storage:
  data_dir: "/tmp/dragster"
  history_limit: 20
"#;
        let f = yaml_tempfile(yaml);
        let mut mgr = TimerConfigManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert!(mgr.is_loaded());
        let cfg = mgr.config();
        assert_eq!(cfg.sensor.threshold_mm, 120);
        assert_eq!(cfg.sensor.sampling_rate_hz, 100);
        assert_eq!(cfg.race.relay_activation_ms, 300);
        assert_eq!(cfg.race.tie_threshold_ms, 5);
        assert_eq!(cfg.race.timeout_ms, 8000);
        assert_eq!(cfg.race.lane_offsets_ms, [0, 17]);
        assert_eq!(cfg.scheduler.heat_interval_secs, 90);
        assert_eq!(cfg.storage.data_dir, PathBuf::from("/tmp/dragster"));
        assert_eq!(cfg.storage.history_limit, 20);
    }

    #[test]
    fn absent_fields_use_defaults() {
        let f = yaml_tempfile("race:\n  tie_threshold_ms: 4\n");
        let mut mgr = TimerConfigManager::new();
        mgr.load_from_file(f.path()).unwrap();

        let cfg = mgr.config();
        assert_eq!(cfg.race.tie_threshold_ms, 4);
        assert_eq!(cfg.sensor.threshold_mm, 150);
        assert_eq!(cfg.race.timeout_ms, 10_000);
    }

    #[test]
    fn empty_file_loads_defaults() {
        let f = yaml_tempfile("");
        let mut mgr = TimerConfigManager::new();
        mgr.load_from_file(f.path()).unwrap();
        assert!(mgr.is_loaded());
        assert_eq!(mgr.config(), &TimerConfig::default());
    }

    #[test]
    fn missing_file_returns_error() {
        let mut mgr = TimerConfigManager::new();
        let result = mgr.load_from_file(Path::new("/nonexistent/path/timer.yaml"));
        assert!(result.is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        let mut mgr = TimerConfigManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let f = yaml_tempfile("wifi:\n  ssid: track\n");
        let mut mgr = TimerConfigManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
    }

    #[test]
    fn misspelled_section_key_is_rejected() {
        let f = yaml_tempfile("sensor:\n  threshhold_mm: 90\n");
        let mut mgr = TimerConfigManager::new();
        let err = mgr.load_from_file(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("threshhold_mm"));
        assert!(!mgr.is_loaded());
        assert_eq!(mgr.config().sensor.threshold_mm, 150);
    }

    #[test]
    fn out_of_range_sampling_rate_is_rejected() {
        let f = yaml_tempfile("sensor:\n  sampling_rate_hz: 0\n");
        let mut mgr = TimerConfigManager::new();
        let err = mgr.load_from_file(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("sampling_rate_hz"));
        assert!(!mgr.is_loaded());
        assert_eq!(mgr.config(), &TimerConfig::default());
    }

    #[test]
    fn reload_replaces_previous_values() {
        let f1 = yaml_tempfile("sensor:\n  threshold_mm: 90\n");
        let f2 = yaml_tempfile("race:\n  timeout_ms: 5000\n");

        let mut mgr = TimerConfigManager::new();
        mgr.load_from_file(f1.path()).unwrap();
        assert_eq!(mgr.config().sensor.threshold_mm, 90);

        mgr.load_from_file(f2.path()).unwrap();
        assert_eq!(mgr.config().sensor.threshold_mm, 150, "old value must be gone");
        assert_eq!(mgr.config().race.timeout_ms, 5000);
    }
}
