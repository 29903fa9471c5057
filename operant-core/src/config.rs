use crate::stimulus::{InteractionType, LightColor, RewardType, StimulusType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric form field: empty, or ASCII digits only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digits(String);

impl Digits {
    /// Accepts `s` only if every character is an ASCII digit.
    pub fn new(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        s.bytes().all(|b| b.is_ascii_digit()).then_some(Self(s))
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn from_u64(n: u64) -> Self {
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value; `None` when empty. Values past `u64::MAX` saturate.
    pub fn value(&self) -> Option<u64> {
        if self.0.is_empty() {
            return None;
        }
        // Every byte is a digit, so a parse failure can only be overflow.
        Some(self.0.parse().unwrap_or(u64::MAX))
    }

    /// Numeric value with empty treated as zero.
    pub fn value_or_zero(&self) -> u64 {
        self.value().unwrap_or(0)
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl TryFrom<String> for Digits {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Digits::new(s.clone()).ok_or_else(|| format!("'{s}' is not a digit string"))
    }
}

impl From<Digits> for String {
    fn from(d: Digits) -> Self {
        d.0
    }
}

/// The full set of parameters for one trial.
///
/// Treated as a value: edits build a new configuration via the `with_*`
/// methods rather than mutating one in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialConfiguration {
    pub name: String,
    pub subject_id: String,
    pub duration_minutes: Digits,
    pub goal_count: Digits,
    pub cooldown_seconds: Digits,
    pub reward_type: RewardType,
    pub interaction_type: InteractionType,
    pub stimulus_type: StimulusType,
    pub light_color: LightColor,
}

impl TrialConfiguration {
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn with_subject_id(self, subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..self
        }
    }

    pub fn with_duration_minutes(self, duration_minutes: Digits) -> Self {
        Self {
            duration_minutes,
            ..self
        }
    }

    pub fn with_goal_count(self, goal_count: Digits) -> Self {
        Self { goal_count, ..self }
    }

    pub fn with_cooldown_seconds(self, cooldown_seconds: Digits) -> Self {
        Self {
            cooldown_seconds,
            ..self
        }
    }

    pub fn with_reward_type(self, reward_type: RewardType) -> Self {
        Self {
            reward_type,
            ..self
        }
    }

    pub fn with_interaction_type(self, interaction_type: InteractionType) -> Self {
        Self {
            interaction_type,
            ..self
        }
    }

    pub fn with_stimulus_type(self, stimulus_type: StimulusType) -> Self {
        Self {
            stimulus_type,
            ..self
        }
    }

    pub fn with_light_color(self, light_color: LightColor) -> Self {
        Self {
            light_color,
            ..self
        }
    }

    /// Trial length in seconds; zero when the duration is empty.
    pub fn duration_seconds(&self) -> u64 {
        self.duration_minutes.value_or_zero().saturating_mul(60)
    }

    pub fn goal(&self) -> u64 {
        self.goal_count.value_or_zero()
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_seconds.value_or_zero().saturating_mul(1000)
    }
}
