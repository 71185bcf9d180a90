//! Prediction services built on top of a loaded control system.
//!
//! Each serving variant validates raw query parameters into typed inputs first, then runs a
//! fresh [`crate::fuzzy::Simulation`] for the call. Validation never touches the engine, so a
//! client error can be reported without any per-request state having been created.

pub mod lesson;
mod params;
pub mod wash;

pub use lesson::{DifficultyMemberships, LessonDifficultyModel, LessonInputs, LessonPrediction};
pub use params::{IssueKind, ParameterIssue, QueryParams};
pub use wash::{WashTimeInputs, WashTimeModel, format_wash_time};

use crate::fuzzy::SimulationError;
use thiserror::Error;

/// Errors surfaced by the prediction services.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    /// One or more query parameters were missing, malformed, or named an unknown term.
    #[error("invalid request parameters: {}", summarize(.0))]
    InvalidParameters(Vec<ParameterIssue>),
    /// Inputs were well-formed but the engine could not produce an output.
    #[error("inference failed: {0}")]
    Computation(#[from] SimulationError),
}

impl PredictionError {
    /// Whether the error was caused by the client's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameters(_))
    }
}

fn summarize(issues: &[ParameterIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.parameter, issue.message()))
        .collect::<Vec<_>>()
        .join("; ")
}
