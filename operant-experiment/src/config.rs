use operant_core::{Digits, TrialConfiguration};
use tracing::{debug, info, warn};

use crate::error::{ImportFormatError, MissingField, PresetError};
use crate::presets::{Preset, PresetRepository};
use crate::settings;
use crate::validate::{FieldKind, Validated, require_filled, validate_field};

/// The working trial configuration plus the preset collection behind it.
///
/// Every change replaces the configuration value as a whole.
pub struct ConfigStore<R: PresetRepository> {
    repo: R,
    presets: Vec<Preset>,
    current: TrialConfiguration,
    baseline: TrialConfiguration,
}

impl<R: PresetRepository> ConfigStore<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, TrialConfiguration::default())
    }

    pub fn with_config(repo: R, config: TrialConfiguration) -> Self {
        let presets = match repo.list() {
            Ok(presets) => presets,
            Err(e) => {
                warn!("could not load presets, starting with none: {e}");
                Vec::new()
            }
        };
        debug!(count = presets.len(), "presets loaded");
        Self {
            repo,
            presets,
            baseline: config.clone(),
            current: config,
        }
    }

    pub fn current(&self) -> &TrialConfiguration {
        &self.current
    }

    pub fn replace(&mut self, config: TrialConfiguration) {
        self.current = config;
    }

    pub fn update(&mut self, f: impl FnOnce(TrialConfiguration) -> TrialConfiguration) {
        let next = f(self.current.clone());
        self.replace(next);
    }

    /// Validate `raw` for `kind` and store the sanitized value, even when
    /// validation reports an error.
    pub fn set_field(&mut self, kind: FieldKind, raw: &str) -> Validated {
        let validated = validate_field(kind, raw);
        let value = validated.value.clone();
        match kind {
            FieldKind::Name => self.update(|c| c.with_name(value)),
            FieldKind::Duration => self.update(|c| c.with_duration_minutes(digits(value))),
            FieldKind::Goal => self.update(|c| c.with_goal_count(digits(value))),
            FieldKind::Cooldown => self.update(|c| c.with_cooldown_seconds(digits(value))),
        }
        validated
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Append a preset built from `config`. Duplicate names are allowed.
    pub fn save_preset(
        &mut self,
        name: impl Into<String>,
        config: &TrialConfiguration,
    ) -> Result<(), PresetError> {
        let preset = Preset::from_config(name, config)?;
        self.repo.append(preset.clone())?;
        info!(preset = %preset.name, "preset saved");
        self.presets.push(preset);
        Ok(())
    }

    pub fn save_current_as(&mut self, name: impl Into<String>) -> Result<(), PresetError> {
        let config = self.current.clone();
        self.save_preset(name, &config)
    }

    /// Apply the first preset called `name`, keeping the trial name.
    /// Returns false, changing nothing, if there is no such preset.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match self.repo.list() {
            Ok(presets) => self.presets = presets,
            Err(e) => warn!("could not reload presets, using cached list: {e}"),
        }
        let Some(preset) = self.presets.iter().find(|p| p.name == name) else {
            debug!(preset = name, "no such preset");
            return false;
        };
        let next = preset.apply_to(&self.current);
        self.replace(next);
        info!(preset = name, "preset applied");
        true
    }

    /// Load a settings file. The trial name is not taken from the file.
    /// On error the configuration is untouched.
    pub fn import_settings(&mut self, text: &str) -> Result<(), ImportFormatError> {
        let imported = settings::deserialize(text)?;
        let name = self.current.name.clone();
        let subject_id = self.current.subject_id.clone();
        self.replace(TrialConfiguration {
            name,
            subject_id,
            ..imported
        });
        Ok(())
    }

    /// Settings file text for the current configuration.
    pub fn export_settings(&self) -> Result<String, MissingField> {
        require_filled(
            &self.current,
            &[
                FieldKind::Name,
                FieldKind::Duration,
                FieldKind::Goal,
                FieldKind::Cooldown,
            ],
        )?;
        Ok(settings::serialize(&self.current))
    }

    pub fn clear(&mut self) {
        self.replace(TrialConfiguration::default());
    }

    /// Whether the configuration differs from the one the store started with.
    pub fn has_changed(&self) -> bool {
        self.current != self.baseline
    }
}

fn digits(sanitized: String) -> Digits {
    Digits::new(sanitized).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::presets::InMemoryPresetRepository;
    use operant_core::{InteractionType, LightColor, RewardType};

    fn filled() -> TrialConfiguration {
        TrialConfiguration::default()
            .with_name("Trial1")
            .with_duration_minutes(Digits::from_u64(10))
            .with_goal_count(Digits::from_u64(5))
            .with_cooldown_seconds(Digits::from_u64(3))
    }

    #[test]
    fn set_field_applies_sanitized_value() {
        let mut store = ConfigStore::new(InMemoryPresetRepository::new());
        let v = store.set_field(FieldKind::Duration, "1a5");
        assert!(v.is_ok());
        assert_eq!(store.current().duration_minutes.as_str(), "15");

        let v = store.set_field(FieldKind::Goal, "abc");
        assert!(!v.is_ok());
        assert!(store.current().goal_count.is_empty());

        store.set_field(FieldKind::Name, "my trial");
        assert_eq!(store.current().name, "mytrial");
    }

    #[test]
    fn apply_preset_twice_equals_once() {
        let mut store = ConfigStore::with_config(InMemoryPresetRepository::new(), filled());
        let preset_source = filled()
            .with_goal_count(Digits::from_u64(9))
            .with_reward_type(RewardType::Food)
            .with_interaction_type(InteractionType::Poke);
        store.save_preset("Nine", &preset_source).unwrap();

        assert!(store.apply_preset("Nine"));
        let once = store.current().clone();
        assert!(store.apply_preset("Nine"));
        assert_eq!(store.current(), &once);
        assert_eq!(once.name, "Trial1");
        assert_eq!(once.goal(), 9);
    }

    #[test]
    fn unknown_preset_is_a_no_op() {
        let mut store = ConfigStore::with_config(InMemoryPresetRepository::new(), filled());
        assert!(!store.apply_preset("missing"));
        assert_eq!(store.current(), &filled());
    }

    #[test]
    fn duplicate_preset_names_resolve_to_first() {
        let mut store = ConfigStore::new(InMemoryPresetRepository::new());
        store
            .save_preset("Dup", &filled().with_light_color(LightColor::Blue))
            .unwrap();
        store
            .save_preset("Dup", &filled().with_light_color(LightColor::Yellow))
            .unwrap();
        assert_eq!(store.presets().len(), 2);
        store.apply_preset("Dup");
        assert_eq!(store.current().light_color, LightColor::Blue);
    }

    #[test]
    fn apply_preset_sees_presets_saved_elsewhere() {
        let mut store = ConfigStore::new(InMemoryPresetRepository::new());
        assert!(!store.apply_preset("Late"));
        store.repo.append(Preset::from_config("Late", &filled()).unwrap()).unwrap();
        assert!(store.apply_preset("Late"));
    }

    #[test]
    fn import_keeps_trial_name() {
        let mut store = ConfigStore::with_config(
            InMemoryPresetRepository::new(),
            TrialConfiguration::default().with_name("Keep"),
        );
        let text = settings::serialize(&filled().with_light_color(LightColor::Green));
        store.import_settings(&text).unwrap();
        assert_eq!(store.current().name, "Keep");
        assert_eq!(store.current().light_color, LightColor::Green);
        assert_eq!(store.current().cooldown_seconds.as_str(), "3");
    }

    #[test]
    fn import_accepts_unsanitized_name_line() {
        let mut store = ConfigStore::with_config(InMemoryPresetRepository::new(), filled());
        let text = settings::serialize(&filled().with_goal_count(Digits::from_u64(7)))
            .replace("Test Name: Trial1", "Test Name: Rat 1");
        store.import_settings(&text).unwrap();
        assert_eq!(store.current().name, "Trial1");
        assert_eq!(store.current().goal(), 7);
    }

    #[test]
    fn malformed_import_leaves_configuration_untouched() {
        let mut store = ConfigStore::with_config(InMemoryPresetRepository::new(), filled());
        let before = store.current().clone();
        let text = settings::serialize(&filled());
        let seven = text.split('\n').take(7).collect::<Vec<_>>().join("\n");
        assert!(store.import_settings(&seven).is_err());
        assert_eq!(store.current(), &before);
    }

    #[test]
    fn export_requires_filled_fields() {
        let mut store = ConfigStore::new(InMemoryPresetRepository::new());
        assert_eq!(store.export_settings(), Err(MissingField("test name")));
        store.replace(filled());
        assert!(store.export_settings().unwrap().starts_with("Test Name: Trial1\n"));
    }

    #[test]
    fn clear_and_has_changed() {
        let mut store = ConfigStore::new(InMemoryPresetRepository::new());
        assert!(!store.has_changed());
        store.set_field(FieldKind::Goal, "4");
        assert!(store.has_changed());
        store.clear();
        assert!(!store.has_changed());
    }

    struct BrokenRepo;

    impl PresetRepository for BrokenRepo {
        fn list(&self) -> Result<Vec<Preset>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }

        fn append(&mut self, _preset: Preset) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn unreadable_repository_starts_empty() {
        let mut store = ConfigStore::with_config(BrokenRepo, filled());
        assert!(store.presets().is_empty());
        assert!(matches!(
            store.save_current_as("p"),
            Err(PresetError::Store(_))
        ));
        assert!(!store.apply_preset("p"));
    }
}
