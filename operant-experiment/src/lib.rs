pub mod config;
pub mod error;
pub mod export;
pub mod presets;
pub mod reward;
pub mod settings;
pub mod state;
pub mod trial;
pub mod validate;

pub use config::ConfigStore;
pub use error::{
    ControllerError, ImportFormatError, MissingField, PresetError, StoreError, ValidationError,
};
pub use export::{ResultExporter, render_report, results_file_name};
pub use presets::{InMemoryPresetRepository, JsonFilePresetRepository, Preset, PresetRepository};
pub use reward::{PulseHandle, REWARD_PULSE, RewardScheduler};
pub use settings::{SETTINGS_KEYS, deserialize, serialize, settings_file_name};
pub use state::TrialController;
pub use trial::{RewardEvent, TickOutcome};
pub use validate::{FieldKind, Validated, require_filled, validate_field};
