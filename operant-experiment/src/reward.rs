use operant_core::{ActuatorChannel, GatewayResult, HardwareGateway, RewardType, RgbState};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long a reward channel stays on.
pub const REWARD_PULSE: Duration = Duration::from_millis(1000);

/// A reward pulse whose switch-off is still scheduled.
#[derive(Debug)]
pub struct PulseHandle {
    channel: ActuatorChannel,
    task: JoinHandle<()>,
}

impl PulseHandle {
    pub fn channel(&self) -> ActuatorChannel {
        self.channel
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the channel has been switched off again.
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            warn!(channel = %self.channel, "reward pulse task failed: {e}");
        }
    }
}

/// Drives the reward actuators and the manual stimulus light.
pub struct RewardScheduler<G: HardwareGateway + ?Sized> {
    gateway: Arc<G>,
    pulse: Duration,
}

impl<G: HardwareGateway + ?Sized + 'static> RewardScheduler<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            pulse: REWARD_PULSE,
        }
    }

    pub fn with_pulse(self, pulse: Duration) -> Self {
        Self { pulse, ..self }
    }

    pub fn pulse(&self) -> Duration {
        self.pulse
    }

    /// Switch on the channel for `reward` and schedule it off after one pulse.
    ///
    /// Pulses are independent: firing again before the previous pulse ended
    /// schedules a second switch-off.
    pub async fn fire_reward(&self, reward: RewardType) -> GatewayResult<PulseHandle> {
        let channel = reward.channel();
        self.gateway.set_channel(channel, true).await?;
        info!(%reward, %channel, "reward channel on");

        let gateway = Arc::clone(&self.gateway);
        let pulse = self.pulse;
        let task = tokio::spawn(async move {
            tokio::time::sleep(pulse).await;
            if let Err(e) = gateway.set_channel(channel, false).await {
                warn!(%channel, "failed to switch reward channel off: {e}");
            }
        });
        Ok(PulseHandle { channel, task })
    }

    pub async fn set_rgb(&self, rgb: RgbState) -> GatewayResult<RgbState> {
        let acked = self.gateway.set_rgb(rgb).await?;
        info!(%acked, "stimulus light set");
        Ok(acked)
    }
}
