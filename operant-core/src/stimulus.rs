use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raised when a label does not name any variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `Display`/`FromStr` over the user-facing labels.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownLabel {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RewardType {
    #[default]
    Water,
    Food,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionType {
    #[default]
    Lever,
    Poke,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StimulusType {
    #[default]
    Light,
    Tone,
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightColor {
    #[default]
    Red,
    Green,
    Blue,
    Yellow,
}

/// Reward actuator channels on the apparatus.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorChannel {
    Blue,
    Orange,
}

labelled_enum!(RewardType, "reward type", { Water => "Water", Food => "Food" });
labelled_enum!(InteractionType, "interaction type", { Lever => "Lever", Poke => "Poke" });
labelled_enum!(StimulusType, "stimulus type", { Light => "Light", Tone => "Tone" });
labelled_enum!(LightColor, "light color", {
    Red => "Red",
    Green => "Green",
    Blue => "Blue",
    Yellow => "Yellow",
});
labelled_enum!(ActuatorChannel, "actuator channel", { Blue => "blue", Orange => "orange" });

impl RewardType {
    /// Water is dispensed on the blue channel, food on the orange one.
    pub fn channel(&self) -> ActuatorChannel {
        match self {
            RewardType::Water => ActuatorChannel::Blue,
            RewardType::Food => ActuatorChannel::Orange,
        }
    }
}

/// On/off state of the tri-color stimulus light.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RgbState {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl RgbState {
    pub const OFF: RgbState = RgbState {
        red: false,
        green: false,
        blue: false,
    };

    pub fn new(red: bool, green: bool, blue: bool) -> Self {
        Self { red, green, blue }
    }

    pub fn is_lit(&self) -> bool {
        self.red || self.green || self.blue
    }
}

impl fmt::Display for RgbState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        write!(
            f,
            "R:{} G:{} B:{}",
            on_off(self.red),
            on_off(self.green),
            on_off(self.blue)
        )
    }
}
