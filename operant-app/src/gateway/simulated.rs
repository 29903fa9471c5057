//! In-process stand-in for the apparatus.
//!
//! Each count poll during a trial may register a lever press and a nose poke
//! with the configured probabilities. Counters are never reset, like the
//! hardware counters behind the HTTP service.

use async_trait::async_trait;
use operant_core::{
    ActuatorChannel, GatewayResult, HardwareGateway, InteractionCounts, RgbState,
    TrialConfiguration,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::config::SimulationConfig;

pub struct SimulatedGateway {
    lever_probability: f64,
    poke_probability: f64,
    inner: Mutex<Apparatus>,
}

struct Apparatus {
    rng: StdRng,
    counts: InteractionCounts,
    blue: bool,
    orange: bool,
    rgb: RgbState,
    running: bool,
}

impl SimulatedGateway {
    pub fn new(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            lever_probability: config.lever_probability,
            poke_probability: config.poke_probability,
            inner: Mutex::new(Apparatus {
                rng,
                counts: InteractionCounts::default(),
                blue: false,
                orange: false,
                rgb: RgbState::OFF,
                running: false,
            }),
        }
    }

    fn apparatus(&self) -> MutexGuard<'_, Apparatus> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn channel_is_on(&self, channel: ActuatorChannel) -> bool {
        let apparatus = self.apparatus();
        match channel {
            ActuatorChannel::Blue => apparatus.blue,
            ActuatorChannel::Orange => apparatus.orange,
        }
    }

    pub fn is_running(&self) -> bool {
        self.apparatus().running
    }
}

#[async_trait]
impl HardwareGateway for SimulatedGateway {
    async fn interaction_counts(&self) -> GatewayResult<InteractionCounts> {
        let mut apparatus = self.apparatus();
        if apparatus.running {
            if apparatus.rng.random_bool(self.lever_probability) {
                apparatus.counts.lever_press_count += 1;
            }
            if apparatus.rng.random_bool(self.poke_probability) {
                apparatus.counts.nose_poke_count += 1;
            }
        }
        Ok(apparatus.counts)
    }

    async fn set_channel(&self, channel: ActuatorChannel, on: bool) -> GatewayResult<()> {
        let mut apparatus = self.apparatus();
        match channel {
            ActuatorChannel::Blue => apparatus.blue = on,
            ActuatorChannel::Orange => apparatus.orange = on,
        }
        debug!(%channel, on, "simulated channel");
        Ok(())
    }

    async fn set_rgb(&self, rgb: RgbState) -> GatewayResult<RgbState> {
        self.apparatus().rgb = rgb;
        Ok(rgb)
    }

    async fn start_trial(&self, config: &TrialConfiguration) -> GatewayResult<()> {
        debug!(trial = %config.name, "simulated trial start");
        self.apparatus().running = true;
        Ok(())
    }

    async fn stop_trial(&self) -> GatewayResult<()> {
        self.apparatus().running = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certain() -> SimulationConfig {
        SimulationConfig {
            lever_probability: 1.0,
            poke_probability: 0.0,
            seed: Some(1),
        }
    }

    #[tokio::test]
    async fn counts_only_move_during_a_trial() {
        let gateway = SimulatedGateway::new(&certain());
        assert_eq!(gateway.interaction_counts().await.unwrap().lever_press_count, 0);

        gateway.start_trial(&TrialConfiguration::default()).await.unwrap();
        assert!(gateway.is_running());
        gateway.interaction_counts().await.unwrap();
        let counts = gateway.interaction_counts().await.unwrap();
        assert_eq!(counts, InteractionCounts::new(2, 0));

        gateway.stop_trial().await.unwrap();
        assert_eq!(gateway.interaction_counts().await.unwrap(), counts);
    }

    #[tokio::test]
    async fn counts_are_monotonic() {
        let gateway = SimulatedGateway::new(&SimulationConfig {
            seed: Some(42),
            ..SimulationConfig::default()
        });
        gateway.start_trial(&TrialConfiguration::default()).await.unwrap();
        let mut last = InteractionCounts::default();
        for _ in 0..200 {
            let counts = gateway.interaction_counts().await.unwrap();
            assert!(counts.lever_press_count >= last.lever_press_count);
            assert!(counts.nose_poke_count >= last.nose_poke_count);
            last = counts;
        }
        assert!(last.lever_press_count > 0);
    }

    #[tokio::test]
    async fn channels_and_light_are_tracked() {
        let gateway = SimulatedGateway::new(&certain());
        gateway.set_channel(ActuatorChannel::Orange, true).await.unwrap();
        assert!(gateway.channel_is_on(ActuatorChannel::Orange));
        assert!(!gateway.channel_is_on(ActuatorChannel::Blue));

        let acked = gateway.set_rgb(RgbState::new(false, true, false)).await.unwrap();
        assert_eq!(acked, RgbState::new(false, true, false));
    }
}
