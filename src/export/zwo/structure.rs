//! Structure resolver
//!
//! Uses the authored structure when a workout has one, otherwise synthesizes
//! warmup / steady main set / cooldown from the coarse workout fields.

use std::borrow::Cow;

use tracing::debug;

use crate::models::{
    DurationTarget, IntensityTarget, MainElement, StepKind, StructuredWorkout, Workout,
    WorkoutStep, WorkoutType,
};

/// Assumed session length when a workout states no duration
pub const DEFAULT_DURATION_MINUTES: f64 = 60.0;

const WARMUP_SHARE: f64 = 0.10;
const WARMUP_MIN_MINUTES: f64 = 5.0;
const WARMUP_MAX_MINUTES: f64 = 15.0;
const WARMUP_RAMP: (f64, f64) = (40.0, 65.0);

const COOLDOWN_SHARE: f64 = 0.10;
const COOLDOWN_MIN_MINUTES: f64 = 5.0;
const COOLDOWN_MAX_MINUTES: f64 = 10.0;
const COOLDOWN_RAMP: (f64, f64) = (40.0, 60.0);

const DEFAULT_MAIN_INTENSITY: f64 = 65.0;

/// Minutes allotted to each phase of a synthesized workout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSplit {
    pub warmup_minutes: f64,
    pub main_minutes: f64,
    pub cooldown_minutes: f64,
}

impl PhaseSplit {
    /// Split a session: 10% warmup (5-15 min), 10% cooldown (5-10 min), the
    /// rest main. The main phase may come out zero or negative for very short
    /// sessions and is kept as is.
    pub fn from_total(total_minutes: f64) -> Self {
        let warmup_minutes = (total_minutes * WARMUP_SHARE)
            .round()
            .clamp(WARMUP_MIN_MINUTES, WARMUP_MAX_MINUTES);
        let cooldown_minutes = (total_minutes * COOLDOWN_SHARE)
            .round()
            .clamp(COOLDOWN_MIN_MINUTES, COOLDOWN_MAX_MINUTES);

        Self {
            warmup_minutes,
            main_minutes: total_minutes - warmup_minutes - cooldown_minutes,
            cooldown_minutes,
        }
    }
}

/// Main-set intensity (% FTP) for a workout-type tag
pub fn main_intensity(workout_type: &str) -> f64 {
    match WorkoutType::from_tag(workout_type) {
        Some(WorkoutType::Recovery) => 55.0,
        Some(WorkoutType::Endurance) => 65.0,
        Some(WorkoutType::Tempo) => 80.0,
        Some(WorkoutType::Threshold) => 95.0,
        Some(WorkoutType::Vo2max) => 110.0,
        Some(WorkoutType::Intervals) => 85.0,
        Some(WorkoutType::Long) => 65.0,
        _ => DEFAULT_MAIN_INTENSITY,
    }
}

/// Canonical structure for a workout, borrowed when authored
pub fn resolve(workout: &Workout) -> Cow<'_, StructuredWorkout> {
    match &workout.structure {
        Some(structure) => Cow::Borrowed(structure),
        None => {
            let total = workout
                .duration_minutes
                .unwrap_or(DEFAULT_DURATION_MINUTES);
            debug!(
                workout = %workout.id,
                total_minutes = total,
                workout_type = %workout.workout_type,
                "No authored structure, synthesizing one"
            );
            Cow::Owned(synthesize(total, &workout.workout_type))
        }
    }
}

/// Build a warmup ramp, one steady main step and a cooldown ramp.
///
/// Never produces interval sets.
pub fn synthesize(total_minutes: f64, workout_type: &str) -> StructuredWorkout {
    let split = PhaseSplit::from_total(total_minutes);

    let warmup = WorkoutStep::new(
        StepKind::Warmup,
        DurationTarget::minutes(split.warmup_minutes),
        IntensityTarget::percent_ftp(WARMUP_RAMP.1).with_range(WARMUP_RAMP.0, WARMUP_RAMP.1),
    );

    let main = WorkoutStep::new(
        StepKind::Work,
        DurationTarget::minutes(split.main_minutes),
        IntensityTarget::percent_ftp(main_intensity(workout_type)),
    );

    let cooldown = WorkoutStep::new(
        StepKind::Cooldown,
        DurationTarget::minutes(split.cooldown_minutes),
        IntensityTarget::percent_ftp(COOLDOWN_RAMP.1)
            .with_range(COOLDOWN_RAMP.0, COOLDOWN_RAMP.1),
    );

    StructuredWorkout {
        warmup: vec![warmup],
        main: vec![MainElement::Step(main)],
        cooldown: vec![cooldown],
        total_duration: Some(DurationTarget::minutes(total_minutes)),
        estimated_tss: None,
        estimated_if: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::zwo::segments::{emit_structure, Segment};
    use crate::models::Sport;

    #[test]
    fn hour_long_session_splits_six_forty_eight_six() {
        assert_eq!(
            PhaseSplit::from_total(60.0),
            PhaseSplit {
                warmup_minutes: 6.0,
                main_minutes: 48.0,
                cooldown_minutes: 6.0,
            }
        );
    }

    #[test]
    fn phase_lengths_are_clamped() {
        let short = PhaseSplit::from_total(20.0);
        assert_eq!(short.warmup_minutes, 5.0);
        assert_eq!(short.cooldown_minutes, 5.0);
        assert_eq!(short.main_minutes, 10.0);

        let long = PhaseSplit::from_total(240.0);
        assert_eq!(long.warmup_minutes, 15.0);
        assert_eq!(long.cooldown_minutes, 10.0);
        assert_eq!(long.main_minutes, 215.0);
    }

    #[test]
    fn half_minutes_round_up() {
        // 45 * 0.1 = 4.5 -> 5, 125 * 0.1 = 12.5 -> 13
        assert_eq!(PhaseSplit::from_total(45.0).warmup_minutes, 5.0);
        assert_eq!(PhaseSplit::from_total(125.0).warmup_minutes, 13.0);
        assert_eq!(PhaseSplit::from_total(125.0).cooldown_minutes, 10.0);
    }

    #[test]
    fn very_short_session_keeps_negative_main() {
        let split = PhaseSplit::from_total(8.0);
        assert_eq!(split.main_minutes, -2.0);

        let segments = emit_structure(&synthesize(8.0, "recovery"));
        assert_eq!(segments[1].duration_seconds(), -120.0);
    }

    #[test]
    fn intensity_lookup_by_tag() {
        assert_eq!(main_intensity("recovery"), 55.0);
        assert_eq!(main_intensity("endurance"), 65.0);
        assert_eq!(main_intensity("tempo"), 80.0);
        assert_eq!(main_intensity("threshold"), 95.0);
        assert_eq!(main_intensity("vo2max"), 110.0);
        assert_eq!(main_intensity("intervals"), 85.0);
        assert_eq!(main_intensity("long"), 65.0);
        assert_eq!(main_intensity("hills"), 65.0);
        assert_eq!(main_intensity("something-new"), 65.0);
    }

    #[test]
    fn synthesized_structure_emits_fixed_ramps() {
        let segments = emit_structure(&synthesize(60.0, "tempo"));

        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0],
            Segment::Warmup {
                duration: 360.0,
                power_low: 0.4,
                power_high: 0.65,
            }
        );
        assert_eq!(
            segments[1],
            Segment::SteadyState {
                duration: 2880.0,
                power: 0.8,
                cadence: None,
            }
        );
        assert_eq!(
            segments[2],
            Segment::Cooldown {
                duration: 360.0,
                power_low: 0.4,
                power_high: 0.6,
            }
        );
    }

    #[test]
    fn resolve_borrows_authored_structure() {
        let mut workout = Workout::new("w1", Sport::Bike, "endurance", "Ride");
        workout.structure = Some(synthesize(90.0, "endurance"));

        assert!(matches!(resolve(&workout), Cow::Borrowed(_)));
    }

    #[test]
    fn resolve_defaults_to_an_hour() {
        let workout = Workout::new("w1", Sport::Run, "threshold", "Run");
        let structure = resolve(&workout);

        assert!(matches!(structure, Cow::Owned(_)));
        assert_eq!(structure.total_duration_seconds(), 3600.0);
    }
}
