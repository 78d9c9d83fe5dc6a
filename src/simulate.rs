//! Synthetic punctuality series.
//!
//! One [`RegularityRecord`] per (line, calendar day). Each line has a baseline rate that is
//! perturbed by Gaussian noise; Saturdays and Sundays take an extra penalty. The shape of the
//! output (lines × days, ordered by line then date) is fixed by the config; values are only
//! reproducible when a seed is configured.

use crate::error::ConfigError;
use crate::models::{DateWindow, RegularityRecord};
use chrono::{Datelike, NaiveDate, Weekday};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const DEFAULT_START: NaiveDate = match NaiveDate::from_ymd_opt(2023, 1, 1) {
    Some(d) => d,
    None => NaiveDate::MIN,
};
const DEFAULT_END: NaiveDate = match NaiveDate::from_ymd_opt(2023, 12, 31) {
    Some(d) => d,
    None => NaiveDate::MAX,
};

/// Lines with automated operation; simulated with the highest baseline.
pub const HIGH_RELIABILITY_LINES: [&str; 2] = ["1", "14"];
/// Line simulated with a degraded baseline.
pub const LOW_RELIABILITY_LINES: [&str; 1] = ["13"];

/// Parameters of the generator. Every field has a default, so partial JSON configs work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub lines: Vec<String>,
    /// Baseline rate per line; lines not listed use `default_baseline`.
    pub baselines: BTreeMap<String, f64>,
    pub default_baseline: f64,
    /// Standard deviation of the daily Gaussian noise (percentage points).
    pub noise_sd: f64,
    /// Subtracted from the rate on Saturdays and Sundays.
    pub weekend_penalty: f64,
    pub ridership_mean: f64,
    pub ridership_sd: f64,
    /// Fixed RNG seed; `None` draws from OS entropy on every generation.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let mut baselines = BTreeMap::new();
        for line in HIGH_RELIABILITY_LINES {
            baselines.insert(line.to_string(), 98.0);
        }
        for line in LOW_RELIABILITY_LINES {
            baselines.insert(line.to_string(), 92.0);
        }
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            lines: (1..=14).map(|i| i.to_string()).collect(),
            baselines,
            default_baseline: 95.0,
            noise_sd: 1.5,
            weekend_penalty: 0.5,
            ridership_mean: 500_000.0,
            ridership_sd: 50_000.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn baseline_for(&self, line: &str) -> f64 {
        self.baselines
            .get(line)
            .copied()
            .unwrap_or(self.default_baseline)
    }

    /// Configured lines, trimmed and de-duplicated, first occurrence wins.
    pub fn distinct_lines(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.lines
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && seen.insert(l.clone()))
            .collect()
    }

    /// The simulated calendar.
    pub fn window(&self) -> Result<DateWindow, ConfigError> {
        DateWindow::new(self.start, self.end)
    }

    /// Check every parameter; returns the calendar on success.
    pub fn validate(&self) -> Result<DateWindow, ConfigError> {
        let window = self.window()?;
        if self.distinct_lines().is_empty() {
            return Err(ConfigError::NoLines);
        }
        for (name, value) in [
            ("noise_sd", self.noise_sd),
            ("weekend_penalty", self.weekend_penalty),
            ("ridership_mean", self.ridership_mean),
            ("ridership_sd", self.ridership_sd),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(window)
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Generate the series, seeding from `config.seed` when present.
pub fn generate(config: &SimulationConfig) -> Result<Vec<RegularityRecord>, ConfigError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with(config, &mut rng)
}

/// Generate the series with a caller-provided RNG.
pub fn generate_with<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Vec<RegularityRecord>, ConfigError> {
    let window = config.validate()?;
    let lines = config.distinct_lines();

    let noise = Normal::new(0.0, config.noise_sd).map_err(|_| ConfigError::InvalidParameter {
        name: "noise_sd",
        value: config.noise_sd,
    })?;
    let traffic = Normal::new(config.ridership_mean, config.ridership_sd).map_err(|_| {
        ConfigError::InvalidParameter {
            name: "ridership_sd",
            value: config.ridership_sd,
        }
    })?;

    let mut out = Vec::with_capacity(lines.len() * window.days());
    for line in &lines {
        let base = config.baseline_for(line);
        for date in window.iter_days() {
            let penalty = if is_weekend(date) {
                config.weekend_penalty
            } else {
                0.0
            };
            let rate = base + noise.sample(rng) - penalty;
            let ridership = traffic.sample(rng).max(0.0).trunc() as u64;
            out.push(RegularityRecord::new(date, line.as_str(), rate, ridership));
        }
    }
    debug!(
        "simulated {} records ({} lines x {} days)",
        out.len(),
        lines.len(),
        window.days()
    );
    Ok(out)
}
