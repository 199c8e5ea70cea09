use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Sport, Workout};
use crate::training_plan::TrainingPlan;

pub mod zwo;

pub use zwo::ZwoExporter;

/// Workout file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Zwift workout (XML)
    Zwo,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Zwo => "zwo",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Zwo => f.write_str("ZWO"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zwo" | "zwift" => Ok(ExportFormat::Zwo),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{format} export not supported for {sport} workouts")]
    UnsupportedSport { format: ExportFormat, sport: Sport },
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A target workout file format.
///
/// Rendering is pure: one workout in, one document out, no shared state, so
/// implementations can be driven from several threads at once.
pub trait WorkoutExporter: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn extension(&self) -> &'static str {
        self.format().extension()
    }

    fn is_supported(&self, sport: Sport) -> bool;

    fn render(&self, workout: &Workout) -> Result<String, ExportError>;
}

/// Build the exporter for a format
pub fn exporter_for(format: ExportFormat, author: &str) -> Box<dyn WorkoutExporter> {
    match format {
        ExportFormat::Zwo => Box::new(ZwoExporter::with_author(author)),
    }
}

/// Options for writing workout files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Replace files that already exist
    pub overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions { overwrite: true }
    }
}

/// Why a workout was not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedSport(Sport),
    AlreadyExists(PathBuf),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedSport(sport) => write!(f, "{} is not supported", sport),
            SkipReason::AlreadyExists(path) => write!(f, "{} already exists", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWorkout {
    pub workout_id: String,
    pub reason: SkipReason,
}

/// Outcome of a bulk export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedWorkout>,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len()
    }
}

/// File name for an exported workout: `<id>-<name>.<ext>`, lowercased, with
/// runs of anything but ASCII letters and digits collapsed to `-`.
pub fn workout_file_name(workout: &Workout, extension: &str) -> String {
    let raw = format!("{} {}", workout.id, workout.name);
    let mut stem = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { "workout" } else { stem };
    format!("{}.{}", stem, extension)
}

/// Render one workout and write it into `output_dir`
pub fn export_workout(
    exporter: &dyn WorkoutExporter,
    workout: &Workout,
    output_dir: &Path,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let document = exporter.render(workout)?;

    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(workout_file_name(workout, exporter.extension()));
    if !options.overwrite && path.exists() {
        return Err(ExportError::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        )));
    }

    fs::write(&path, document)?;
    info!(workout = %workout.id, path = %path.display(), "Workout exported");
    Ok(path)
}

/// Export every workout of a plan the format can represent.
///
/// Documents are rendered in parallel and written in plan order. Workouts of
/// unsupported sports are skipped and reported in the summary.
pub fn export_plan(
    exporter: &dyn WorkoutExporter,
    plan: &TrainingPlan,
    output_dir: &Path,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let workouts: Vec<&Workout> = plan.workouts().collect();
    info!(
        format = %exporter.format(),
        workouts = workouts.len(),
        "Exporting training plan"
    );

    let rendered: Vec<(&Workout, Result<String, ExportError>)> = workouts
        .par_iter()
        .map(|workout| (*workout, exporter.render(workout)))
        .collect();

    fs::create_dir_all(output_dir)?;
    let mut summary = ExportSummary::default();

    for (workout, result) in rendered {
        let document = match result {
            Ok(document) => document,
            Err(ExportError::UnsupportedSport { sport, .. }) => {
                warn!(workout = %workout.id, sport = %sport, "Skipping unsupported workout");
                summary.skipped.push(SkippedWorkout {
                    workout_id: workout.id.clone(),
                    reason: SkipReason::UnsupportedSport(sport),
                });
                continue;
            }
            Err(err) => return Err(err),
        };

        let path = output_dir.join(workout_file_name(workout, exporter.extension()));
        if !options.overwrite && path.exists() {
            summary.skipped.push(SkippedWorkout {
                workout_id: workout.id.clone(),
                reason: SkipReason::AlreadyExists(path),
            });
            continue;
        }

        fs::write(&path, document)?;
        summary.written.push(path);
    }

    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        "Plan export complete"
    );
    Ok(summary)
}
