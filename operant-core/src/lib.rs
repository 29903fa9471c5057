pub mod config;
pub mod gateway;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use config::{Digits, TrialConfiguration};
pub use gateway::{GatewayError, GatewayResult, HardwareGateway};
pub use phase::{TrialAction, TrialState};
pub use stimulus::{
    ActuatorChannel, InteractionType, LightColor, RewardType, RgbState, StimulusType,
    UnknownLabel,
};
pub use trial::{InteractionCounts, TrialRun};
