use operant_core::{
    GatewayResult, HardwareGateway, InteractionCounts, RgbState, TrialAction, TrialConfiguration,
    TrialRun, TrialState,
};
use operant_timing::{Clock, TickSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::ConfigStore;
use super::error::ControllerError;
use super::presets::PresetRepository;
use super::reward::{PulseHandle, RewardScheduler};
use super::trial::{RewardEvent, TickOutcome};
use super::validate::{FieldKind, require_filled};

/// Sequences a trial through setup, running, paused and finished.
///
/// Owns the working configuration and at most one [`TrialRun`]. Polling is
/// driven from outside by calling [`tick`](Self::tick) whenever the tick
/// source fires; the controller arms the source when a run enters
/// `Running` and disarms it when the run leaves.
pub struct TrialController<G, C, T, R>
where
    G: HardwareGateway + ?Sized + 'static,
    C: Clock,
    T: TickSource,
    R: PresetRepository,
{
    gateway: Arc<G>,
    rewards: RewardScheduler<G>,
    /// Reward pulses whose switch-off may still be pending.
    pulses: Vec<PulseHandle>,
    clock: C,
    ticks: T,
    store: ConfigStore<R>,
    run: Option<TrialRun>,
    light: RgbState,
}

impl<G, C, T, R> TrialController<G, C, T, R>
where
    G: HardwareGateway + ?Sized + 'static,
    C: Clock,
    T: TickSource,
    R: PresetRepository,
{
    pub fn new(gateway: Arc<G>, clock: C, ticks: T, store: ConfigStore<R>) -> Self {
        Self {
            rewards: RewardScheduler::new(Arc::clone(&gateway)),
            pulses: Vec::new(),
            gateway,
            clock,
            ticks,
            store,
            run: None,
            light: RgbState::OFF,
        }
    }

    pub fn with_reward_pulse(self, pulse: Duration) -> Self {
        Self {
            rewards: self.rewards.with_pulse(pulse),
            ..self
        }
    }

    pub fn state(&self) -> TrialState {
        self.run.as_ref().map_or(TrialState::Setup, |r| r.state)
    }

    pub fn run(&self) -> Option<&TrialRun> {
        self.run.as_ref()
    }

    /// The working configuration. A run keeps its own snapshot.
    pub fn config(&self) -> &TrialConfiguration {
        self.store.current()
    }

    pub fn store(&self) -> &ConfigStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore<R> {
        &mut self.store
    }

    pub fn ticks(&self) -> &T {
        &self.ticks
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn light(&self) -> RgbState {
        self.light
    }

    /// Reward pulses that have not switched off yet.
    pub fn pending_pulses(&self) -> usize {
        self.pulses.iter().filter(|p| !p.is_finished()).count()
    }

    /// Resolves when the next tick is due. Pending while not running.
    pub async fn next_tick(&mut self) {
        self.ticks.next_tick().await
    }

    fn check(&self, action: TrialAction) -> Result<TrialState, ControllerError> {
        let state = self.state();
        state
            .apply(action)
            .ok_or(ControllerError::invalid(action, state))
    }

    /// Setup -> Running with a fresh run over a snapshot of the configuration.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        self.check(TrialAction::Start)?;
        require_filled(self.store.current(), &[FieldKind::Name, FieldKind::Duration])
            .map_err(|missing| ControllerError::MissingRequiredField(missing.0))?;

        let config = self.store.current().clone();
        self.run = Some(TrialRun::start(config, self.light));
        self.ticks.arm();
        info!(
            trial = %self.store.current().name,
            duration_minutes = %self.store.current().duration_minutes,
            "trial started"
        );

        if let Err(e) = self.gateway.start_trial(self.store.current()).await {
            warn!("gateway did not acknowledge trial start: {e}");
        }
        Ok(())
    }

    /// Running -> Paused. Takes a snapshot of the counts.
    pub async fn stop(&mut self) -> Result<(), ControllerError> {
        let next = self.check(TrialAction::Stop)?;
        self.halt(next, false).await;
        Ok(())
    }

    /// Paused -> Running without resetting elapsed time or rewards.
    pub fn resume(&mut self) -> Result<(), ControllerError> {
        let next = self.check(TrialAction::Resume)?;
        if let Some(run) = self.run.as_mut() {
            run.state = next;
            info!(elapsed = run.elapsed_seconds, rewards = run.reward_count, "trial resumed");
        }
        self.ticks.arm();
        Ok(())
    }

    /// Paused -> Finished. The counts taken when pausing are kept.
    pub fn finish(&mut self) -> Result<(), ControllerError> {
        let next = self.check(TrialAction::Finish)?;
        if let Some(run) = self.run.as_mut() {
            run.state = next;
            info!(elapsed = run.elapsed_seconds, rewards = run.reward_count, "trial finished");
        }
        Ok(())
    }

    /// Paused/Finished -> Setup. Drops the run and keeps the configuration.
    pub fn return_to_setup(&mut self) -> Result<TrialRun, ControllerError> {
        self.check(TrialAction::ReturnToSetup)?;
        let run = self
            .run
            .take()
            .ok_or(ControllerError::invalid(TrialAction::ReturnToSetup, TrialState::Setup))?;
        debug!("returned to setup");
        Ok(run)
    }

    /// Set the stimulus light. Allowed in every state.
    pub async fn set_rgb(&mut self, rgb: RgbState) -> GatewayResult<RgbState> {
        let acked = self.rewards.set_rgb(rgb).await?;
        self.light = acked;
        if let Some(run) = self.run.as_mut() {
            run.light = acked;
        }
        Ok(acked)
    }

    /// One polling step. Ignored unless a run is `Running`.
    ///
    /// A failed count poll skips the reward check for this tick but still
    /// advances elapsed time.
    pub async fn tick(&mut self) -> TickOutcome {
        let state = self.state();
        if !state.is_running() {
            debug!(%state, "tick ignored");
            return TickOutcome::ignored(state);
        }

        let polled = self.gateway.interaction_counts().await;
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::ignored(state);
        };

        let mut outcome = TickOutcome::default();
        match polled {
            Ok(counts) => {
                run.latest_counts = Some(counts);
                outcome.counts = Some(counts);

                let active = counts.active(run.config.interaction_type);
                let goal = run.config.goal();
                let triggered = goal > 0 && active > 0 && active % goal == 0;
                if triggered {
                    let now = self.clock.now_ms();
                    if run.cooldown_elapsed(now) {
                        let reward_type = run.config.reward_type;
                        let delivered = match self.rewards.fire_reward(reward_type).await {
                            Ok(pulse) => {
                                self.pulses.retain(|p| !p.is_finished());
                                self.pulses.push(pulse);
                                true
                            }
                            Err(e) => {
                                warn!(%reward_type, "reward actuator failed: {e}");
                                false
                            }
                        };
                        run.last_reward_at_ms = Some(now);
                        run.reward_count += 1;
                        info!(count = active, rewards = run.reward_count, "reward given");
                        outcome.reward = Some(RewardEvent {
                            reward_type,
                            at_ms: now,
                            active_count: active,
                            delivered,
                        });
                    } else {
                        debug!(count = active, "goal met during cooldown");
                    }
                }
            }
            Err(e) => warn!("count poll failed, skipping reward check: {e}"),
        }

        run.elapsed_seconds += 1;
        outcome.elapsed_seconds = run.elapsed_seconds;
        let reached = run.duration_reached();
        debug!(elapsed = run.elapsed_seconds, "tick");

        if reached {
            info!(elapsed = outcome.elapsed_seconds, "trial duration reached");
            if let Ok(next) = self.check(TrialAction::AutoFinish) {
                self.halt(next, true).await;
            }
        }
        outcome.state = self.state();
        outcome
    }

    /// Leave `Running`: disarm ticks, let reward pulses end, tell the
    /// gateway, and snapshot counts.
    async fn halt(&mut self, next: TrialState, auto_stopped: bool) {
        self.ticks.disarm();
        self.settle_pulses().await;
        if let Some(run) = self.run.as_mut() {
            run.state = next;
            run.auto_stopped = auto_stopped;
        }

        if let Err(e) = self.gateway.stop_trial().await {
            warn!("gateway did not acknowledge trial stop: {e}");
        }
        match self.gateway.interaction_counts().await {
            Ok(counts) => self.record_final_counts(counts),
            Err(e) => warn!("could not read final counts: {e}"),
        }
        info!(state = %next, auto_stopped, "trial halted");
    }

    /// Wait for every outstanding reward pulse to switch its channel off.
    async fn settle_pulses(&mut self) {
        let pending = std::mem::take(&mut self.pulses);
        if !pending.is_empty() {
            debug!(count = pending.len(), "waiting for reward pulses");
        }
        for pulse in pending {
            pulse.finished().await;
        }
    }

    fn record_final_counts(&mut self, counts: InteractionCounts) {
        if let Some(run) = self.run.as_mut() {
            run.latest_counts = Some(counts);
            run.final_counts = Some(counts);
        }
    }
}
