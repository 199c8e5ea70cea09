//! Unified error hierarchy for coach
//!
//! Module-level errors (`ExportError`, `PlanError`) roll up into
//! [`CoachError`], which carries severity and user-facing messages.

use thiserror::Error;

use crate::export::ExportError;
use crate::training_plan::PlanError;

/// Top-level error type for all coach operations
#[derive(Debug, Error)]
pub enum CoachError {
    /// Workout export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Training plan loading errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for coach operations
pub type Result<T> = std::result::Result<T, CoachError>;

impl CoachError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoachError::Export(ExportError::UnsupportedSport { .. }) => ErrorSeverity::Warning,
            CoachError::Plan(PlanError::WorkoutNotFound { .. }) => ErrorSeverity::Warning,
            CoachError::Export(ExportError::SerializationError(_)) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Export(ExportError::UnsupportedSport { format, sport }) => {
                format!(
                    "{} workouts cannot be exported as {}. Only bike and run workouts are supported.",
                    sport, format
                )
            }
            CoachError::Plan(PlanError::Io { path, .. }) => {
                format!("Could not read training plan: {}", path.display())
            }
            CoachError::Plan(PlanError::WorkoutNotFound { id }) => {
                format!("No workout with id '{}' in this plan", id)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error pointing at a bug rather than bad input
    Critical,
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent other work
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
