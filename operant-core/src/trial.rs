use crate::config::TrialConfiguration;
use crate::phase::TrialState;
use crate::stimulus::{InteractionType, RgbState};
use serde::{Deserialize, Serialize};

/// Interaction counters as reported by the apparatus.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionCounts {
    pub lever_press_count: u64,
    pub nose_poke_count: u64,
}

impl InteractionCounts {
    pub fn new(lever_press_count: u64, nose_poke_count: u64) -> Self {
        Self {
            lever_press_count,
            nose_poke_count,
        }
    }

    /// The counter the trial is scored on.
    pub fn active(&self, interaction: InteractionType) -> u64 {
        match interaction {
            InteractionType::Lever => self.lever_press_count,
            InteractionType::Poke => self.nose_poke_count,
        }
    }
}

/// Runtime record of one trial, bound to the configuration it was started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRun {
    pub config: TrialConfiguration,
    pub state: TrialState,
    pub elapsed_seconds: u64,
    pub reward_count: u64,
    /// Clock reading of the last reward, `None` before the first one.
    pub last_reward_at_ms: Option<u64>,
    pub latest_counts: Option<InteractionCounts>,
    pub final_counts: Option<InteractionCounts>,
    pub auto_stopped: bool,
    /// Last acknowledged state of the stimulus light.
    pub light: RgbState,
}

impl TrialRun {
    pub fn start(config: TrialConfiguration, light: RgbState) -> Self {
        Self {
            config,
            state: TrialState::Running,
            elapsed_seconds: 0,
            reward_count: 0,
            last_reward_at_ms: None,
            latest_counts: None,
            final_counts: None,
            auto_stopped: false,
            light,
        }
    }

    /// True once the run has lasted its configured duration.
    pub fn duration_reached(&self) -> bool {
        self.elapsed_seconds >= self.config.duration_seconds()
    }

    /// Whether the cooldown has expired at `now_ms`.
    pub fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        match self.last_reward_at_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.cooldown_ms(),
        }
    }

    /// Final counts if a snapshot was taken, otherwise the last polled ones.
    pub fn reported_counts(&self) -> Option<InteractionCounts> {
        self.final_counts.or(self.latest_counts)
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.config
            .duration_seconds()
            .saturating_sub(self.elapsed_seconds)
    }
}
