use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units;

/// Sports a training plan can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Swim,
    Bike,
    Run,
    Strength,
    Brick,
    Race,
    Rest,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Swim => "swim",
            Sport::Bike => "bike",
            Sport::Run => "run",
            Sport::Strength => "strength",
            Sport::Brick => "brick",
            Sport::Race => "race",
            Sport::Rest => "rest",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workout-type tags known to the plan vocabulary.
///
/// Workouts carry their tag as free text; use [`WorkoutType::from_tag`] to
/// classify it. Unknown tags are not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Rest,
    Recovery,
    Endurance,
    Tempo,
    Threshold,
    Intervals,
    Vo2max,
    Sprint,
    Race,
    Brick,
    Technique,
    Openwater,
    Hills,
    Long,
    // Trail running
    Trail,
    UphillRepeats,
    DownhillTechnique,
    Vertical,
}

impl WorkoutType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "rest" => Self::Rest,
            "recovery" => Self::Recovery,
            "endurance" => Self::Endurance,
            "tempo" => Self::Tempo,
            "threshold" => Self::Threshold,
            "intervals" => Self::Intervals,
            "vo2max" => Self::Vo2max,
            "sprint" => Self::Sprint,
            "race" => Self::Race,
            "brick" => Self::Brick,
            "technique" => Self::Technique,
            "openwater" => Self::Openwater,
            "hills" => Self::Hills,
            "long" => Self::Long,
            "trail" => Self::Trail,
            "uphill_repeats" => Self::UphillRepeats,
            "downhill_technique" => Self::DownhillTechnique,
            "vertical" => Self::Vertical,
            _ => return None,
        };
        Some(kind)
    }
}

/// Role of a single step inside a structured workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Warmup,
    Work,
    Recovery,
    Rest,
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Meters,
    Kilometers,
    Miles,
    Yards,
    Laps,
}

impl DurationUnit {
    /// Whether the unit measures time rather than distance
    pub fn is_time_based(&self) -> bool {
        matches!(
            self,
            DurationUnit::Seconds | DurationUnit::Minutes | DurationUnit::Hours
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityUnit {
    /// Percent of functional threshold power
    PercentFtp,
    /// Percent of lactate threshold heart rate
    PercentLthr,
    HrZone,
    PaceZone,
    /// Rate of perceived exertion (1-10)
    Rpe,
    /// Seconds per 100m relative to critical swim speed
    CssOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationTarget {
    pub unit: DurationUnit,
    pub value: f64,
}

impl DurationTarget {
    pub fn new(value: f64, unit: DurationUnit) -> Self {
        Self { unit, value }
    }

    pub fn seconds(value: f64) -> Self {
        Self::new(value, DurationUnit::Seconds)
    }

    pub fn minutes(value: f64) -> Self {
        Self::new(value, DurationUnit::Minutes)
    }

    pub fn as_seconds(&self) -> f64 {
        units::to_seconds(self.value, self.unit)
    }
}

/// Target intensity for a step, optionally as a low/high range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensityTarget {
    pub unit: IntensityUnit,

    /// Nominal value, e.g. 75 for 75% FTP or 3 for zone 3
    pub value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_low: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_high: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IntensityTarget {
    pub fn new(value: f64, unit: IntensityUnit) -> Self {
        Self {
            unit,
            value,
            value_low: None,
            value_high: None,
            description: None,
        }
    }

    pub fn percent_ftp(value: f64) -> Self {
        Self::new(value, IntensityUnit::PercentFtp)
    }

    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.value_low = Some(low);
        self.value_high = Some(high);
        self
    }

    /// Both range bounds, if the target is ranged
    pub fn range(&self) -> Option<(f64, f64)> {
        self.value_low.zip(self.value_high)
    }
}

/// Cadence bounds: RPM on the bike, SPM when running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub low: u32,
    pub high: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStep {
    #[serde(rename = "type")]
    pub kind: StepKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub duration: DurationTarget,

    pub intensity: IntensityTarget,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<Cadence>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WorkoutStep {
    pub fn new(kind: StepKind, duration: DurationTarget, intensity: IntensityTarget) -> Self {
        Self {
            kind,
            name: None,
            duration,
            intensity,
            cadence: None,
            notes: None,
        }
    }

    pub fn with_cadence(mut self, low: u32, high: u32) -> Self {
        self.cadence = Some(Cadence { low, high });
        self
    }
}

/// A work/recovery pattern repeated `repeats` times
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSet {
    pub name: Option<String>,
    pub repeats: u32,
    pub steps: Vec<WorkoutStep>,
}

/// One entry of the main phase, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMainElement", into = "RawMainElement")]
pub enum MainElement {
    Step(WorkoutStep),
    IntervalSet(IntervalSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ElementKind {
    Warmup,
    Work,
    Recovery,
    Rest,
    Cooldown,
    IntervalSet,
}

impl ElementKind {
    fn step_kind(self) -> Option<StepKind> {
        match self {
            ElementKind::Warmup => Some(StepKind::Warmup),
            ElementKind::Work => Some(StepKind::Work),
            ElementKind::Recovery => Some(StepKind::Recovery),
            ElementKind::Rest => Some(StepKind::Rest),
            ElementKind::Cooldown => Some(StepKind::Cooldown),
            ElementKind::IntervalSet => None,
        }
    }
}

impl From<StepKind> for ElementKind {
    fn from(kind: StepKind) -> Self {
        match kind {
            StepKind::Warmup => ElementKind::Warmup,
            StepKind::Work => ElementKind::Work,
            StepKind::Recovery => ElementKind::Recovery,
            StepKind::Rest => ElementKind::Rest,
            StepKind::Cooldown => ElementKind::Cooldown,
        }
    }
}

/// Wire layout shared by steps and interval sets in the `main` array
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawMainElement {
    #[serde(rename = "type")]
    kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<DurationTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intensity: Option<IntensityTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence: Option<Cadence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<WorkoutStep>>,
}

impl TryFrom<RawMainElement> for MainElement {
    type Error = String;

    fn try_from(raw: RawMainElement) -> Result<Self, Self::Error> {
        match raw.kind.step_kind() {
            None => Ok(MainElement::IntervalSet(IntervalSet {
                name: raw.name,
                repeats: raw.repeats.ok_or("interval_set is missing `repeats`")?,
                steps: raw.steps.ok_or("interval_set is missing `steps`")?,
            })),
            Some(kind) => Ok(MainElement::Step(WorkoutStep {
                kind,
                name: raw.name,
                duration: raw.duration.ok_or("workout step is missing `duration`")?,
                intensity: raw.intensity.ok_or("workout step is missing `intensity`")?,
                cadence: raw.cadence,
                notes: raw.notes,
            })),
        }
    }
}

impl From<MainElement> for RawMainElement {
    fn from(element: MainElement) -> Self {
        match element {
            MainElement::Step(step) => RawMainElement {
                kind: step.kind.into(),
                name: step.name,
                duration: Some(step.duration),
                intensity: Some(step.intensity),
                cadence: step.cadence,
                notes: step.notes,
                repeats: None,
                steps: None,
            },
            MainElement::IntervalSet(set) => RawMainElement {
                kind: ElementKind::IntervalSet,
                name: set.name,
                duration: None,
                intensity: None,
                cadence: None,
                notes: None,
                repeats: Some(set.repeats),
                steps: Some(set.steps),
            },
        }
    }
}

/// Three-phase structure used for device export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredWorkout {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warmup: Vec<WorkoutStep>,

    pub main: Vec<MainElement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cooldown: Vec<WorkoutStep>,

    /// Authored total, if the plan states one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<DurationTarget>,

    #[serde(default, rename = "estimatedTSS", skip_serializing_if = "Option::is_none")]
    pub estimated_tss: Option<f64>,

    #[serde(default, rename = "estimatedIF", skip_serializing_if = "Option::is_none")]
    pub estimated_if: Option<f64>,
}

impl StructuredWorkout {
    /// Sum of time-based step durations in seconds, interval sets counted
    /// `repeats` times. Distance-based steps are left out.
    pub fn total_duration_seconds(&self) -> f64 {
        fn timed(step: &WorkoutStep) -> f64 {
            if step.duration.unit.is_time_based() {
                step.duration.as_seconds()
            } else {
                0.0
            }
        }

        let steps: f64 = self.warmup.iter().chain(self.cooldown.iter()).map(timed).sum();

        let main: f64 = self
            .main
            .iter()
            .map(|element| match element {
                MainElement::Step(step) => timed(step),
                MainElement::IntervalSet(set) => {
                    let once: f64 = set.steps.iter().map(timed).sum();
                    once * f64::from(set.repeats)
                }
            })
            .sum();

        steps + main
    }
}

/// A single scheduled workout from a training plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,

    pub sport: Sport,

    /// Free-form workout-type tag ("endurance", "threshold", ...)
    #[serde(rename = "type")]
    pub workout_type: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,

    /// Summary zone label, e.g. "Zone 2"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructuredWorkout>,

    /// Display text for the workout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_readable: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Workout {
    /// Minimal workout with no structure; the remaining fields use defaults
    pub fn new(
        id: impl Into<String>,
        sport: Sport,
        workout_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sport,
            workout_type: workout_type.into(),
            name: name.into(),
            description: String::new(),
            duration_minutes: None,
            distance_meters: None,
            primary_zone: None,
            structure: None,
            human_readable: None,
            completed: false,
            notes: None,
        }
    }
}
