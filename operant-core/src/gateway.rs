//! Interface to the apparatus hardware.
//!
//! Counters and actuators live behind a remote service; every call can fail
//! and callers are expected to log the failure and carry on.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TrialConfiguration;
use crate::stimulus::{ActuatorChannel, RgbState};
use crate::trial::InteractionCounts;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("gateway unreachable: {0}")]
    Transport(String),

    /// The gateway answered with a failure status.
    #[error("gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be understood.
    #[error("malformed gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            status,
            message: message.into(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait HardwareGateway: Send + Sync {
    async fn interaction_counts(&self) -> GatewayResult<InteractionCounts>;

    async fn set_channel(&self, channel: ActuatorChannel, on: bool) -> GatewayResult<()>;

    /// Returns the state the light was actually set to.
    async fn set_rgb(&self, rgb: RgbState) -> GatewayResult<RgbState>;

    async fn start_trial(&self, config: &TrialConfiguration) -> GatewayResult<()>;

    async fn stop_trial(&self) -> GatewayResult<()>;
}
