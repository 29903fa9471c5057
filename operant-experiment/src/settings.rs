//! Plain-text settings files.
//!
//! A settings file is exactly eight `Key: value` lines in a fixed order.
//! Duration and cooldown carry a ` seconds` suffix on disk.

use operant_core::{Digits, TrialConfiguration};
use std::str::FromStr;

use crate::error::ImportFormatError;

pub const SETTINGS_KEYS: [&str; 8] = [
    "Test Name",
    "Trial Duration",
    "Goal",
    "Cooldown",
    "Reward Type",
    "Interaction Type",
    "Stimulus Type",
    "Light Color",
];

const SECONDS_SUFFIX: &str = " seconds";

pub fn serialize(config: &TrialConfiguration) -> String {
    let values = [
        config.name.clone(),
        format!("{}{SECONDS_SUFFIX}", config.duration_minutes),
        config.goal_count.to_string(),
        format!("{}{SECONDS_SUFFIX}", config.cooldown_seconds),
        config.reward_type.to_string(),
        config.interaction_type.to_string(),
        config.stimulus_type.to_string(),
        config.light_color.to_string(),
    ];
    SETTINGS_KEYS
        .iter()
        .zip(values)
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn deserialize(text: &str) -> Result<TrialConfiguration, ImportFormatError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    if lines.len() != SETTINGS_KEYS.len() {
        return Err(ImportFormatError::LineCount {
            expected: SETTINGS_KEYS.len(),
            found: lines.len(),
        });
    }

    let mut values = [""; 8];
    for (i, (line, key)) in lines.iter().zip(SETTINGS_KEYS).enumerate() {
        values[i] = line
            .strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(": "))
            .ok_or(ImportFormatError::KeyMismatch {
                line: i + 1,
                expected: key,
            })?;
    }

    Ok(TrialConfiguration {
        name: values[0].to_string(),
        subject_id: String::new(),
        duration_minutes: digits(SETTINGS_KEYS[1], strip_seconds(values[1]))?,
        goal_count: digits(SETTINGS_KEYS[2], values[2])?,
        cooldown_seconds: digits(SETTINGS_KEYS[3], strip_seconds(values[3]))?,
        reward_type: label_or_default(SETTINGS_KEYS[4], values[4])?,
        interaction_type: label_or_default(SETTINGS_KEYS[5], values[5])?,
        stimulus_type: label_or_default(SETTINGS_KEYS[6], values[6])?,
        light_color: label_or_default(SETTINGS_KEYS[7], values[7])?,
    })
}

/// `<name>_settings.txt` with whitespace runs replaced by `_`.
pub fn settings_file_name(test_name: &str) -> String {
    format!("{}_settings.txt", underscore_whitespace(test_name))
}

pub(crate) fn underscore_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("_")
}

fn strip_seconds(value: &str) -> &str {
    value.strip_suffix(SECONDS_SUFFIX).unwrap_or(value)
}

fn invalid(key: &'static str, value: &str) -> ImportFormatError {
    ImportFormatError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

fn digits(key: &'static str, value: &str) -> Result<Digits, ImportFormatError> {
    Digits::new(value).ok_or_else(|| invalid(key, value))
}

fn label_or_default<T: FromStr + Default>(
    key: &'static str,
    value: &str,
) -> Result<T, ImportFormatError> {
    if value.is_empty() {
        return Ok(T::default());
    }
    value.parse().map_err(|_| invalid(key, value))
}
