//! Interactive trial session.
//!
//! One task owns the controller and waits on either the next tick or the
//! next operator command, so a tick always runs to completion before
//! anything else touches the run.

use anyhow::{Context, Result};
use operant_core::{HardwareGateway, TrialState};
use operant_experiment::{
    ControllerError, PresetRepository, ResultExporter, TickOutcome, TrialController,
    results_file_name,
};
use operant_timing::{Clock, TickSource};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::commands::{HELP, SessionCommand};

pub struct Session<G, C, T, R>
where
    G: HardwareGateway + ?Sized + 'static,
    C: Clock,
    T: TickSource,
    R: PresetRepository,
{
    controller: TrialController<G, C, T, R>,
    output_dir: PathBuf,
    exporter: ResultExporter,
    exported: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl<G, C, T, R> Session<G, C, T, R>
where
    G: HardwareGateway + ?Sized + 'static,
    C: Clock,
    T: TickSource,
    R: PresetRepository,
{
    pub fn new(controller: TrialController<G, C, T, R>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            controller,
            output_dir: output_dir.into(),
            exporter: ResultExporter::new(),
            exported: false,
        }
    }

    pub fn controller(&self) -> &TrialController<G, C, T, R> {
        &self.controller
    }

    /// Drive the session until `quit`, or until input ends with no trial
    /// running. A paused run left behind when input ends is finished and
    /// exported first.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<SessionCommand>) -> Result<()> {
        let mut input_open = true;
        loop {
            tokio::select! {
                _ = self.controller.next_tick() => {
                    let outcome = self.controller.tick().await;
                    self.report_tick(&outcome);
                    if outcome.finished() {
                        self.try_export();
                    }
                }
                command = commands.recv(), if input_open => match command {
                    Some(command) => {
                        if self.handle(command).await? == Flow::Quit {
                            break;
                        }
                    }
                    None => input_open = false,
                },
            }
            if !input_open && !self.controller.state().is_running() {
                self.wind_down().await?;
                break;
            }
        }
        Ok(())
    }

    pub async fn start(&mut self) -> Result<(), ControllerError> {
        self.controller.start().await?;
        self.exported = false;
        let config = self.controller.config();
        println!(
            "Trial '{}' started: {} min, goal {}, cooldown {} s, {} on {}",
            config.name,
            config.duration_minutes,
            config.goal_count,
            config.cooldown_seconds,
            config.reward_type,
            config.interaction_type,
        );
        Ok(())
    }

    async fn handle(&mut self, command: SessionCommand) -> Result<Flow> {
        let result = match command {
            SessionCommand::Start => self.start().await,
            SessionCommand::Stop => self.controller.stop().await.map(|_| self.print_status()),
            SessionCommand::Resume => self.controller.resume().map(|_| println!("Resumed.")),
            SessionCommand::Finish => match self.controller.finish() {
                Ok(()) => {
                    self.try_export();
                    Ok(())
                }
                Err(e) => Err(e),
            },
            SessionCommand::Setup => self.controller.return_to_setup().map(|run| {
                self.exported = false;
                println!(
                    "Back to setup ({} rewards in {} s discarded from view).",
                    run.reward_count, run.elapsed_seconds
                );
            }),
            SessionCommand::Rgb(rgb) => {
                match self.controller.set_rgb(rgb).await {
                    Ok(acked) => println!("Light {acked}"),
                    Err(e) => warn!("could not set light: {e}"),
                }
                Ok(())
            }
            SessionCommand::Status => {
                self.print_status();
                Ok(())
            }
            SessionCommand::Export => {
                if self.controller.state() == TrialState::Finished {
                    self.try_export();
                } else {
                    println!("Nothing to export until the trial is finished.");
                }
                Ok(())
            }
            SessionCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            SessionCommand::Quit => {
                self.wind_down().await?;
                return Ok(Flow::Quit);
            }
        };
        if let Err(e) = result {
            println!("{e}");
        }
        Ok(Flow::Continue)
    }

    /// Pause and finish whatever is in progress so its results are kept.
    async fn wind_down(&mut self) -> Result<()> {
        if self.controller.state().is_running() {
            self.controller.stop().await?;
        }
        if self.controller.state() == TrialState::Paused {
            self.controller.finish()?;
        }
        if self.controller.state() == TrialState::Finished {
            self.try_export();
        }
        Ok(())
    }

    fn report_tick(&self, outcome: &TickOutcome) {
        if let Some(reward) = &outcome.reward {
            let note = if reward.delivered { "" } else { " (actuator failed)" };
            println!(
                "[{:>4} s] reward {} at count {}{note}",
                outcome.elapsed_seconds, reward.reward_type, reward.active_count
            );
        }
        if outcome.finished() {
            println!("Trial duration reached.");
            self.print_status();
        }
    }

    fn print_status(&self) {
        let Some(run) = self.controller.run() else {
            println!("setup: '{}'", self.controller.config().name);
            return;
        };
        let counts = run
            .reported_counts()
            .map(|c| format!("lever {} / poke {}", c.lever_press_count, c.nose_poke_count))
            .unwrap_or_else(|| "no counts".into());
        println!(
            "{}: {} s elapsed, {} s left, {} rewards, {counts}, light {}",
            run.state,
            run.elapsed_seconds,
            run.remaining_seconds(),
            run.reward_count,
            run.light,
        );
    }

    /// Export the finished run, reporting a failed write without ending the
    /// session. The run stays unexported so `export` can retry.
    fn try_export(&mut self) {
        if let Err(e) = self.export_results() {
            warn!("results not written: {e:#}");
            println!("Results not written: {e:#}. Type 'export' to retry.");
        }
    }

    /// Write the results report once per finished run.
    fn export_results(&mut self) -> Result<Option<PathBuf>> {
        if self.exported {
            return Ok(None);
        }
        let Some(run) = self.controller.run() else {
            return Ok(None);
        };
        let report = self.exporter.export_report(run, &run.config);
        let path = write_output(&self.output_dir, &results_file_name(&run.config.name), &report)?;
        self.exported = true;
        info!(path = %path.display(), "results written");
        println!("Results written to {}", path.display());
        Ok(Some(path))
    }
}

/// Write `contents` to `dir/file_name`, creating `dir` if needed.
pub fn write_output(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Forward parsed stdin lines to the session. Runs on its own thread since
/// reading stdin blocks.
pub fn spawn_stdin_reader(tx: mpsc::Sender<SessionCommand>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<SessionCommand>() {
                Ok(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("{e} (type 'help')"),
            }
        }
    });
}
