//! App configuration read from an optional TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway_url: String,
    pub request_timeout_ms: u64,
    pub tick_interval_ms: u64,
    pub reward_pulse_ms: u64,
    pub presets_path: PathBuf,
    pub output_dir: PathBuf,
    pub log_filter: String,
    pub simulation: SimulationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:5000".into(),
            request_timeout_ms: 10_000,
            tick_interval_ms: 1000,
            reward_pulse_ms: 1000,
            presets_path: PathBuf::from("presets.json"),
            output_dir: PathBuf::from("."),
            log_filter: "info".into(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Behaviour of the simulated apparatus used with `--simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Chance of a lever press per count poll.
    pub lever_probability: f64,
    /// Chance of a nose poke per count poll.
    pub poke_probability: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lever_probability: 0.4,
            poke_probability: 0.2,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        anyhow::ensure!(config.tick_interval_ms > 0, "tick_interval_ms must be positive");
        for p in [config.simulation.lever_probability, config.simulation.poke_probability] {
            anyhow::ensure!((0.0..=1.0).contains(&p), "simulation probability {p} outside 0..=1");
        }
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn reward_pulse(&self) -> Duration {
        Duration::from_millis(self.reward_pulse_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
