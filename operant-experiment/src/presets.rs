//! Named, reusable trial configurations and where they are kept.

use operant_core::{
    Digits, InteractionType, LightColor, RewardType, StimulusType, TrialConfiguration,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MissingField, PresetError, StoreError};
use crate::validate::{FieldKind, require_filled};

/// Everything in a [`TrialConfiguration`] except the trial name, stored under
/// a preset name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub subject_id: String,
    #[serde(rename = "trialDuration")]
    pub duration_minutes: Digits,
    #[serde(rename = "goalForTrial")]
    pub goal_count: Digits,
    #[serde(rename = "cooldown")]
    pub cooldown_seconds: Digits,
    pub reward_type: RewardType,
    pub interaction_type: InteractionType,
    pub stimulus_type: StimulusType,
    pub light_color: LightColor,
}

impl Preset {
    /// Build a preset from `config`. The preset name and the numeric fields
    /// must be filled in.
    pub fn from_config(
        name: impl Into<String>,
        config: &TrialConfiguration,
    ) -> Result<Self, PresetError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MissingField("preset name").into());
        }
        require_filled(
            config,
            &[FieldKind::Duration, FieldKind::Goal, FieldKind::Cooldown],
        )?;

        Ok(Self {
            name,
            subject_id: config.subject_id.clone(),
            duration_minutes: config.duration_minutes.clone(),
            goal_count: config.goal_count.clone(),
            cooldown_seconds: config.cooldown_seconds.clone(),
            reward_type: config.reward_type,
            interaction_type: config.interaction_type,
            stimulus_type: config.stimulus_type,
            light_color: config.light_color,
        })
    }

    /// `config` with every preset field applied; the trial name is kept.
    pub fn apply_to(&self, config: &TrialConfiguration) -> TrialConfiguration {
        TrialConfiguration {
            name: config.name.clone(),
            subject_id: self.subject_id.clone(),
            duration_minutes: self.duration_minutes.clone(),
            goal_count: self.goal_count.clone(),
            cooldown_seconds: self.cooldown_seconds.clone(),
            reward_type: self.reward_type,
            interaction_type: self.interaction_type,
            stimulus_type: self.stimulus_type,
            light_color: self.light_color,
        }
    }
}

/// Durable, append-only collection of presets.
pub trait PresetRepository {
    fn list(&self) -> Result<Vec<Preset>, StoreError>;
    fn append(&mut self, preset: Preset) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPresetRepository {
    presets: Vec<Preset>,
}

impl InMemoryPresetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: Vec<Preset>) -> Self {
        Self { presets }
    }
}

impl PresetRepository for InMemoryPresetRepository {
    fn list(&self) -> Result<Vec<Preset>, StoreError> {
        Ok(self.presets.clone())
    }

    fn append(&mut self, preset: Preset) -> Result<(), StoreError> {
        self.presets.push(preset);
        Ok(())
    }
}

/// Presets kept as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFilePresetRepository {
    path: PathBuf,
}

impl JsonFilePresetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresetRepository for JsonFilePresetRepository {
    fn list(&self) -> Result<Vec<Preset>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn append(&mut self, preset: Preset) -> Result<(), StoreError> {
        let mut presets = self.list()?;
        presets.push(preset);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&presets)?)?;
        debug!(path = %self.path.display(), count = presets.len(), "presets written");
        Ok(())
    }
}
