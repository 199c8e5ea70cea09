// Library interface for coach modules
// This allows integration tests and benches to access the export pipeline

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod training_plan;
pub mod units;

// Re-export commonly used types for convenience
pub use error::{CoachError, Result};
pub use export::{ExportError, ExportFormat, WorkoutExporter, ZwoExporter};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use training_plan::{PlanError, TrainingPlan};
