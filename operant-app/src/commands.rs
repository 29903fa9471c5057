//! Commands typed at the session prompt.

use operant_core::RgbState;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    Resume,
    Finish,
    Setup,
    Rgb(RgbState),
    Status,
    Export,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("usage: rgb <red> <green> <blue> with each on|off")]
    RgbUsage,
}

pub const HELP: &str = "\
commands:
  start              start a trial from setup
  stop               pause the running trial
  resume             continue a paused trial
  finish             end a paused trial and write results
  setup              discard the run and return to setup
  rgb <r> <g> <b>    set the stimulus light, each on|off
  status             show the current run
  export             retry writing results of a finished trial
  quit               stop, save and exit";

impl FromStr for SessionCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ParseCommandError::Unknown(String::new()));
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "start" | "run" => SessionCommand::Start,
            "stop" | "pause" => SessionCommand::Stop,
            "resume" => SessionCommand::Resume,
            "finish" => SessionCommand::Finish,
            "setup" => SessionCommand::Setup,
            "status" => SessionCommand::Status,
            "export" | "save" => SessionCommand::Export,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            "rgb" => {
                let lamps: Vec<bool> = words
                    .by_ref()
                    .map(parse_switch)
                    .collect::<Option<_>>()
                    .ok_or(ParseCommandError::RgbUsage)?;
                let &[red, green, blue] = lamps.as_slice() else {
                    return Err(ParseCommandError::RgbUsage);
                };
                return Ok(SessionCommand::Rgb(RgbState::new(red, green, blue)));
            }
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        match words.next() {
            None => Ok(command),
            Some(_) => Err(ParseCommandError::Unknown(s.trim().to_string())),
        }
    }
}

fn parse_switch(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Some(true),
        "off" | "0" | "false" => Some(false),
        _ => None,
    }
}
