use anyhow::{Context, Result, bail, ensure};
use operant_experiment::{
    ConfigStore, FieldKind, JsonFilePresetRepository, PresetRepository, TrialController,
    deserialize, serialize, settings_file_name,
};
use operant_timing::{IntervalTicks, SystemClock};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{Command, PresetCommand, RunArgs, SettingsCommand, TrialArgs};
use crate::config::AppConfig;
use crate::gateway;
use crate::session::{Session, spawn_stdin_reader, write_output};

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Run(args) => self.run(args).await,
            Command::Preset { action } => self.preset(action),
            Command::Settings { action } => self.settings(action),
        }
    }

    fn store(&self) -> ConfigStore<JsonFilePresetRepository> {
        ConfigStore::new(JsonFilePresetRepository::new(&self.config.presets_path))
    }

    async fn run(&self, args: RunArgs) -> Result<()> {
        let mut store = self.store();
        assemble(&mut store, &args.trial)?;

        let gateway = gateway::connect(&self.config, args.simulate)?;
        let controller = TrialController::new(
            gateway,
            SystemClock::new(),
            IntervalTicks::new(self.config.tick_interval()),
            store,
        )
        .with_reward_pulse(self.config.reward_pulse());

        let mut session = Session::new(controller, &self.config.output_dir);
        session.start().await.context("could not start trial")?;
        println!("Type 'help' for commands.");

        let (tx, rx) = mpsc::channel(16);
        spawn_stdin_reader(tx);
        session.run(rx).await?;

        let stats = session.controller().ticks().stats();
        info!(
            samples = stats.samples,
            average_ms = stats.average_spacing_ms,
            jitter_ms = stats.jitter_ms,
            max_ms = stats.max_spacing_ms,
            "tick timing"
        );
        Ok(())
    }

    fn preset(&self, action: PresetCommand) -> Result<()> {
        let mut store = self.store();
        match action {
            PresetCommand::Save { preset_name, trial } => {
                assemble(&mut store, &trial)?;
                store
                    .save_current_as(preset_name.as_str())
                    .with_context(|| format!("saving preset '{preset_name}'"))?;
                println!(
                    "Saved preset '{preset_name}' to {}",
                    self.config.presets_path.display()
                );
            }
            PresetCommand::List => {
                if store.presets().is_empty() {
                    println!("No presets in {}", self.config.presets_path.display());
                }
                for p in store.presets() {
                    println!(
                        "{:<20} {:>4} min  goal {:>3}  cooldown {:>3} s  {} / {} / {} / {}",
                        p.name,
                        p.duration_minutes,
                        p.goal_count,
                        p.cooldown_seconds,
                        p.reward_type,
                        p.interaction_type,
                        p.stimulus_type,
                        p.light_color,
                    );
                }
            }
        }
        Ok(())
    }

    fn settings(&self, action: SettingsCommand) -> Result<()> {
        match action {
            SettingsCommand::Check { file } => {
                let text = read(&file)?;
                let config =
                    deserialize(&text).with_context(|| format!("{} is invalid", file.display()))?;
                println!("{} is valid:\n{}", file.display(), serialize(&config));
            }
            SettingsCommand::Export { trial } => {
                let mut store = self.store();
                assemble(&mut store, &trial)?;
                let text = store.export_settings()?;
                let name = settings_file_name(&store.current().name);
                let path = write_output(&self.config.output_dir, &name, &text)?;
                println!("Settings written to {}", path.display());
            }
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Build the working configuration from a settings file, a preset and
/// individual flags, each layered over the previous.
pub fn assemble<R: PresetRepository>(store: &mut ConfigStore<R>, args: &TrialArgs) -> Result<()> {
    if let Some(path) = &args.settings {
        let text = read(path)?;
        store
            .import_settings(&text)
            .with_context(|| format!("importing {}", path.display()))?;
        if store.current().name.is_empty() {
            let name = deserialize(&text)?.name;
            store.set_field(FieldKind::Name, &name);
        }
    }

    if let Some(preset) = &args.preset {
        ensure!(store.apply_preset(preset), "no preset named '{preset}'");
    }

    let fields = [
        (FieldKind::Name, &args.name),
        (FieldKind::Duration, &args.duration),
        (FieldKind::Goal, &args.goal),
        (FieldKind::Cooldown, &args.cooldown),
    ];
    for (kind, raw) in fields {
        let Some(raw) = raw else { continue };
        if let Some(e) = store.set_field(kind, raw).error {
            bail!("{}: {e}", kind.label());
        }
    }

    if let Some(subject) = &args.subject {
        store.update(|c| c.with_subject_id(subject.as_str()));
    }
    if let Some(reward) = args.reward {
        store.update(|c| c.with_reward_type(reward));
    }
    if let Some(interaction) = args.interaction {
        store.update(|c| c.with_interaction_type(interaction));
    }
    if let Some(stimulus) = args.stimulus {
        store.update(|c| c.with_stimulus_type(stimulus));
    }
    if let Some(light) = args.light {
        store.update(|c| c.with_light_color(light));
    }
    Ok(())
}
