#![allow(dead_code)]

use async_trait::async_trait;
use operant_core::{
    ActuatorChannel, Digits, GatewayError, GatewayResult, HardwareGateway, InteractionCounts,
    RgbState, TrialConfiguration,
};
use operant_experiment::{ConfigStore, InMemoryPresetRepository, TrialController};
use operant_timing::{ManualTicks, VirtualClock};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Counts,
    Channel(ActuatorChannel, bool),
    Rgb(RgbState),
    Start(String),
    Stop,
}

/// Gateway whose counters are set by the test.
#[derive(Default)]
pub struct ScriptedGateway {
    counts: Mutex<InteractionCounts>,
    pub fail_counts: AtomicBool,
    pub fail_actuators: AtomicBool,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    pub fn set_lever(&self, n: u64) {
        self.counts.lock().unwrap().lever_press_count = n;
    }

    pub fn set_poke(&self, n: u64) {
        self.counts.lock().unwrap().nose_poke_count = n;
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, call: &GatewayCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn actuator_result(&self) -> GatewayResult<()> {
        if self.fail_actuators.load(Ordering::SeqCst) {
            Err(GatewayError::rejected(500, "actuator fault"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl HardwareGateway for ScriptedGateway {
    async fn interaction_counts(&self) -> GatewayResult<InteractionCounts> {
        self.record(GatewayCall::Counts);
        if self.fail_counts.load(Ordering::SeqCst) {
            return Err(GatewayError::transport("connection refused"));
        }
        Ok(*self.counts.lock().unwrap())
    }

    async fn set_channel(&self, channel: ActuatorChannel, on: bool) -> GatewayResult<()> {
        self.actuator_result()?;
        self.record(GatewayCall::Channel(channel, on));
        Ok(())
    }

    async fn set_rgb(&self, rgb: RgbState) -> GatewayResult<RgbState> {
        self.actuator_result()?;
        self.record(GatewayCall::Rgb(rgb));
        Ok(rgb)
    }

    async fn start_trial(&self, config: &TrialConfiguration) -> GatewayResult<()> {
        self.record(GatewayCall::Start(config.name.clone()));
        Ok(())
    }

    async fn stop_trial(&self) -> GatewayResult<()> {
        self.record(GatewayCall::Stop);
        Ok(())
    }
}

pub type TestController =
    TrialController<ScriptedGateway, VirtualClock, ManualTicks, InMemoryPresetRepository>;

pub fn config(duration_minutes: u64, goal: u64, cooldown_seconds: u64) -> TrialConfiguration {
    TrialConfiguration::default()
        .with_name("Trial")
        .with_duration_minutes(Digits::from_u64(duration_minutes))
        .with_goal_count(Digits::from_u64(goal))
        .with_cooldown_seconds(Digits::from_u64(cooldown_seconds))
}

pub fn controller(config: TrialConfiguration) -> (TestController, Arc<ScriptedGateway>, VirtualClock) {
    let gateway = Arc::new(ScriptedGateway::default());
    let clock = VirtualClock::new();
    let store = ConfigStore::with_config(InMemoryPresetRepository::new(), config);
    let controller = TrialController::new(
        Arc::clone(&gateway),
        clock.clone(),
        ManualTicks::new(),
        store,
    );
    (controller, gateway, clock)
}

/// Advance the clock one second and tick, `n` times.
pub async fn run_seconds(controller: &mut TestController, clock: &VirtualClock, n: u64) {
    for _ in 0..n {
        clock.advance(std::time::Duration::from_secs(1));
        controller.tick().await;
    }
}
