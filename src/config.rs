//! Application configuration.
//!
//! Every field has a default, so the app runs without any config file; a JSON file passed with
//! `--config` overrides only the fields it names. Relative data paths are looked up in the
//! working directory first, then next to the executable.

use crate::amenities::DEFAULT_FILE_NAME;
use crate::error::ConfigError;
use crate::profile::{DEFAULT_PORTRAIT, ProfileConfig};
use crate::simulate::SimulationConfig;
use crate::viz::LegendMode;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub portrait_path: PathBuf,
    /// Lines pre-selected when the dashboard opens.
    pub default_lines: Vec<String>,
    /// Punctuality objective drawn on the timeline (percent).
    pub target_rate: f64,
    pub simulation: SimulationConfig,
    pub chart: ChartConfig,
    pub profile: ProfileConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_FILE_NAME),
            portrait_path: PathBuf::from(DEFAULT_PORTRAIT),
            default_lines: vec!["1".into(), "4".into(), "13".into()],
            target_rate: 95.0,
            simulation: SimulationConfig::default(),
            chart: ChartConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub legend: LegendMode,
    pub locale: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            legend: LegendMode::Bottom,
            locale: "en".into(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    /// Defaults, or the given file when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn resolved_data_path(&self) -> PathBuf {
        resolve_beside_app(&self.data_path)
    }

    pub fn resolved_portrait_path(&self) -> PathBuf {
        resolve_beside_app(&self.portrait_path)
    }
}

/// Resolve a relative path against the working directory, then the executable's directory.
///
/// Returns the working-directory candidate when neither exists so that "missing file"
/// messages name the expected location.
pub fn resolve_beside_app(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let candidate = dir.join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    path.to_path_buf()
}
