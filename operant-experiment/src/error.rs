//! Error types for configuration, presets and the trial controller.
//!
//! None of these are fatal. Each is handled where the action that raised it
//! was requested: shown next to a field, reported as a notice, or ignored.

use operant_core::{TrialAction, TrialState};
use thiserror::Error;

/// Field-level input problem. The sanitized value is still applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Test name cannot be empty after removing restricted characters")]
    EmptyName,

    #[error("Only numbers are allowed")]
    NotNumeric,
}

/// A settings file that does not match the expected layout. The whole file
/// is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportFormatError {
    #[error("expected {expected} lines, found {found}")]
    LineCount { expected: usize, found: usize },

    #[error("line {line} should start with '{expected}: '")]
    KeyMismatch { line: usize, expected: &'static str },

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("preset store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preset store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A field that must be filled in before saving or exporting is empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Please fill in all required fields. ({0} is empty)")]
pub struct MissingField(pub &'static str);

#[derive(Error, Debug)]
pub enum PresetError {
    #[error(transparent)]
    Incomplete(#[from] MissingField),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Please fill in all required fields before starting the test. ({0} is empty)")]
    MissingRequiredField(&'static str),

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: TrialAction,
        state: TrialState,
    },
}

impl ControllerError {
    pub fn invalid(action: TrialAction, state: TrialState) -> Self {
        ControllerError::InvalidTransition { action, state }
    }
}
