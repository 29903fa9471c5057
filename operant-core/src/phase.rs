use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a trial run.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrialState {
    #[default]
    Setup,
    Running,
    Paused,
    Finished,
}

/// Actions that move a trial between states.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum TrialAction {
    Start,
    Stop,
    Resume,
    Finish,
    /// Issued by the tick when the configured duration has elapsed.
    AutoFinish,
    ReturnToSetup,
}

impl TrialState {
    /// Transition table. `None` means the action is not allowed from this state.
    pub fn apply(&self, action: TrialAction) -> Option<Self> {
        use TrialAction::*;
        use TrialState::*;
        match (self, action) {
            (Setup, Start) => Some(Running),
            (Running, Stop) => Some(Paused),
            (Running, AutoFinish) => Some(Finished),
            (Paused, Resume) => Some(Running),
            (Paused, Finish) => Some(Finished),
            (Paused, ReturnToSetup) | (Finished, ReturnToSetup) => Some(Setup),
            _ => None,
        }
    }

    pub fn allows(&self, action: TrialAction) -> bool {
        self.apply(action).is_some()
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TrialState::Running)
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, TrialState::Setup)
    }

    /// A run record exists in every state but setup.
    pub fn has_run(&self) -> bool {
        !self.is_setup()
    }
}

impl fmt::Display for TrialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrialState::Setup => "setup",
            TrialState::Running => "running",
            TrialState::Paused => "paused",
            TrialState::Finished => "finished",
        };
        f.write_str(label)
    }
}

impl fmt::Display for TrialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrialAction::Start => "start",
            TrialAction::Stop => "stop",
            TrialAction::Resume => "resume",
            TrialAction::Finish => "finish",
            TrialAction::AutoFinish => "auto-finish",
            TrialAction::ReturnToSetup => "return to setup",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_only_starts() {
        let s = TrialState::Setup;
        assert_eq!(s.apply(TrialAction::Start), Some(TrialState::Running));
        for action in [
            TrialAction::Stop,
            TrialAction::Resume,
            TrialAction::Finish,
            TrialAction::AutoFinish,
            TrialAction::ReturnToSetup,
        ] {
            assert!(!s.allows(action), "{action} allowed from setup");
        }
    }

    #[test]
    fn running_cannot_return_to_setup_directly() {
        assert!(!TrialState::Running.allows(TrialAction::ReturnToSetup));
        assert!(!TrialState::Running.allows(TrialAction::Finish));
        assert_eq!(
            TrialState::Running.apply(TrialAction::AutoFinish),
            Some(TrialState::Finished)
        );
    }

    #[test]
    fn paused_and_finished_return_to_setup() {
        assert_eq!(
            TrialState::Paused.apply(TrialAction::ReturnToSetup),
            Some(TrialState::Setup)
        );
        assert_eq!(
            TrialState::Finished.apply(TrialAction::ReturnToSetup),
            Some(TrialState::Setup)
        );
        assert!(!TrialState::Finished.allows(TrialAction::Resume));
    }
}
