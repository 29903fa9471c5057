use operant_core::{InteractionCounts, RewardType, TrialState};

/// A reward decided on during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEvent {
    pub reward_type: RewardType,
    pub at_ms: u64,
    /// The interaction count that met the goal.
    pub active_count: u64,
    /// False when the actuator could not be switched on.
    pub delivered: bool,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// `None` if the poll failed or the tick was ignored.
    pub counts: Option<InteractionCounts>,
    pub reward: Option<RewardEvent>,
    pub elapsed_seconds: u64,
    /// State after the tick.
    pub state: TrialState,
    pub ignored: bool,
}

impl TickOutcome {
    pub fn ignored(state: TrialState) -> Self {
        Self {
            state,
            ignored: true,
            ..Default::default()
        }
    }

    pub fn finished(&self) -> bool {
        self.state == TrialState::Finished
    }
}
