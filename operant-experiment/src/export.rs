//! Results report for a finished (or paused) run.

use chrono::{DateTime, Local, TimeZone};
use operant_core::{TrialConfiguration, TrialRun};
use std::fmt::Display;

use crate::settings::underscore_whitespace;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes reports stamped with the local time of export.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultExporter;

impl ResultExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn export_report(&self, run: &TrialRun, config: &TrialConfiguration) -> String {
        render_report(run, config, &Local::now())
    }
}

/// Render the report as `label,value` rows.
pub fn render_report<Tz>(run: &TrialRun, config: &TrialConfiguration, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let counts = run.reported_counts();
    let count_cell = |f: fn(&operant_core::InteractionCounts) -> u64| {
        counts.as_ref().map(|c| f(c).to_string()).unwrap_or_default()
    };

    let rows: Vec<(Option<&str>, String)> = vec![
        (None, "Test Results".into()),
        (Some("Timestamp:"), at.format(TIMESTAMP_FORMAT).to_string()),
        (Some("Test Name:"), config.name.clone()),
        (Some("Subject ID:"), config.subject_id.clone()),
        (Some("Trial Duration (minutes):"), config.duration_minutes.to_string()),
        (Some("Goal for Trial:"), config.goal_count.to_string()),
        (Some("Cooldown (seconds):"), config.cooldown_seconds.to_string()),
        (Some("Reward Type:"), config.reward_type.to_string()),
        (Some("Interaction Type:"), config.interaction_type.to_string()),
        (Some("Stimulus Type:"), config.stimulus_type.to_string()),
        (Some("Light Color:"), config.light_color.to_string()),
        (None, String::new()),
        (None, "Final Trial Data".into()),
        (Some("Elapsed Time (s):"), run.elapsed_seconds.to_string()),
        (Some("Lever Press Count:"), count_cell(|c| c.lever_press_count)),
        (Some("Nose Poke Count:"), count_cell(|c| c.nose_poke_count)),
        (
            Some("Light Status:"),
            if run.light.is_lit() { "ON" } else { "OFF" }.into(),
        ),
        (Some("Rewards Given:"), run.reward_count.to_string()),
        (
            Some("Auto Stopped:"),
            if run.auto_stopped { "Yes" } else { "No" }.into(),
        ),
    ];

    rows.into_iter()
        .map(|(label, value)| match label {
            Some(label) => format!("{label},{}", csv_field(&value)),
            None => value,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<name>_results.csv` with whitespace runs replaced by `_`.
pub fn results_file_name(test_name: &str) -> String {
    format!("{}_results.csv", underscore_whitespace(test_name))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
