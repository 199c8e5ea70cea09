//! Training plan documents
//!
//! Plans arrive as JSON that has already passed schema validation upstream.
//! Only the parts needed to locate and export workouts are modelled; unknown
//! fields are ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Workout;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid plan JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Workout not found: {id}")]
    WorkoutNotFound { id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub athlete: String,
    #[serde(default)]
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weeks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub day_of_week: String,
    /// A day may hold several sessions, e.g. AM swim + PM run
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingWeek {
    pub week_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub is_recovery_week: bool,
    #[serde(default)]
    pub days: Vec<TrainingDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlan {
    #[serde(default = "default_version")]
    pub version: String,
    pub meta: PlanMeta,
    #[serde(default)]
    pub weeks: Vec<TrainingWeek>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A workout together with where it sits in the plan
#[derive(Debug, Clone, Copy)]
pub struct ScheduledWorkout<'a> {
    pub week_number: u32,
    pub date: NaiveDate,
    pub workout: &'a Workout,
}

impl TrainingPlan {
    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        let json = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// All workouts in document order
    pub fn workouts(&self) -> impl Iterator<Item = &Workout> + '_ {
        self.schedule().map(|entry| entry.workout)
    }

    /// All workouts with their week and date, in document order
    pub fn schedule(&self) -> impl Iterator<Item = ScheduledWorkout<'_>> + '_ {
        self.weeks.iter().flat_map(|week| {
            week.days.iter().flat_map(move |day| {
                day.workouts.iter().map(move |workout| ScheduledWorkout {
                    week_number: week.week_number,
                    date: day.date,
                    workout,
                })
            })
        })
    }

    pub fn find_workout(&self, id: &str) -> Result<&Workout, PlanError> {
        self.workouts()
            .find(|workout| workout.id == id)
            .ok_or_else(|| PlanError::WorkoutNotFound { id: id.to_string() })
    }
}
