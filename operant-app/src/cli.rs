use clap::{Args, Parser, Subcommand};
use operant_core::{InteractionType, LightColor, RewardType, StimulusType};
use std::path::PathBuf;

use crate::config::AppConfig;

/// Operant conditioning trial controller
#[derive(Parser, Debug)]
#[command(name = "operant", version, propagate_version = true)]
pub struct Cli {
    /// TOML app configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that take precedence over the config file.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL of the hardware gateway
    #[arg(long, global = true)]
    pub gateway_url: Option<String>,

    /// JSON preset collection
    #[arg(long, global = true)]
    pub presets: Option<PathBuf>,

    /// Directory results and exported settings are written to
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_filter: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.gateway_url {
            config.gateway_url = url.clone();
        }
        if let Some(path) = &self.presets {
            config.presets_path = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(filter) = &self.log_filter {
            config.log_filter = filter.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configure a trial, start it and control it from stdin
    Run(RunArgs),
    /// Manage saved presets
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },
    /// Check or write settings files
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

/// Where a trial configuration is assembled from, in order of precedence:
/// settings file, then preset, then individual flags.
#[derive(Args, Debug, Default, Clone)]
pub struct TrialArgs {
    /// Settings file to import
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Preset to apply
    #[arg(long)]
    pub preset: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub subject: Option<String>,

    /// Trial duration in minutes
    #[arg(long)]
    pub duration: Option<String>,

    /// Interactions per reward
    #[arg(long)]
    pub goal: Option<String>,

    /// Minimum seconds between rewards
    #[arg(long)]
    pub cooldown: Option<String>,

    #[arg(long)]
    pub reward: Option<RewardType>,

    #[arg(long)]
    pub interaction: Option<InteractionType>,

    #[arg(long)]
    pub stimulus: Option<StimulusType>,

    #[arg(long)]
    pub light: Option<LightColor>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub trial: TrialArgs,

    /// Use the built-in simulated apparatus instead of the HTTP gateway
    #[arg(long)]
    pub simulate: bool,
}

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// Save the assembled configuration under a preset name
    Save {
        preset_name: String,
        #[command(flatten)]
        trial: TrialArgs,
    },
    /// List saved presets
    List,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Parse a settings file and report problems
    Check { file: PathBuf },
    /// Write the assembled configuration as a settings file
    Export {
        #[command(flatten)]
        trial: TrialArgs,
    },
}
