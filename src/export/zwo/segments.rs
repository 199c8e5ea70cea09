//! Segment emitter: canonical structure -> ZWO workout segments
//!
//! Every step becomes exactly one [`Segment`] holding already-converted numbers
//! (seconds and 0.0-1.0 fractions). Interval sets collapse into a single
//! `IntervalsT` block when a work step can be found.

use tracing::debug;

use crate::models::{Cadence, IntervalSet, MainElement, StepKind, StructuredWorkout, WorkoutStep};
use crate::units::{format_fraction, format_seconds, to_fraction};

/// Warmup ramps start at this share of the nominal intensity when no low bound is set
const WARMUP_START_RATIO: f64 = 0.6;

/// Cooldown ramps end at this share of the nominal intensity when no low bound is set
const COOLDOWN_END_RATIO: f64 = 0.5;

/// Off interval used when an interval set has no recovery or rest step
const DEFAULT_RECOVERY_SECONDS: f64 = 60.0;
const DEFAULT_RECOVERY_INTENSITY: f64 = 50.0;

/// Cadence attribute for a steady or ramp segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceTarget {
    Fixed(u32),
    Range { low: u32, high: u32 },
}

impl From<Cadence> for CadenceTarget {
    fn from(cadence: Cadence) -> Self {
        if cadence.low == cadence.high {
            CadenceTarget::Fixed(cadence.low)
        } else {
            CadenceTarget::Range {
                low: cadence.low,
                high: cadence.high,
            }
        }
    }
}

/// One ZWO workout element. Durations are seconds, powers are fractions.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Warmup {
        duration: f64,
        power_low: f64,
        power_high: f64,
    },
    Cooldown {
        duration: f64,
        power_low: f64,
        power_high: f64,
    },
    SteadyState {
        duration: f64,
        power: f64,
        cadence: Option<CadenceTarget>,
    },
    Ramp {
        duration: f64,
        power_low: f64,
        power_high: f64,
        cadence: Option<CadenceTarget>,
    },
    IntervalBlock {
        repeats: u32,
        on_duration: f64,
        off_duration: f64,
        on_power: f64,
        off_power: f64,
        cadence: Option<u32>,
    },
}

impl Segment {
    /// ZWO element name
    pub fn element_name(&self) -> &'static str {
        match self {
            Segment::Warmup { .. } => "Warmup",
            Segment::Cooldown { .. } => "Cooldown",
            Segment::SteadyState { .. } => "SteadyState",
            Segment::Ramp { .. } => "Ramp",
            Segment::IntervalBlock { .. } => "IntervalsT",
        }
    }

    /// Wall-clock length of the segment in seconds
    pub fn duration_seconds(&self) -> f64 {
        match self {
            Segment::Warmup { duration, .. }
            | Segment::Cooldown { duration, .. }
            | Segment::SteadyState { duration, .. }
            | Segment::Ramp { duration, .. } => *duration,
            Segment::IntervalBlock {
                repeats,
                on_duration,
                off_duration,
                ..
            } => f64::from(*repeats) * (on_duration + off_duration),
        }
    }

    /// Attributes in document order, formatted for output
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = Vec::with_capacity(6);
        match self {
            Segment::Warmup {
                duration,
                power_low,
                power_high,
            }
            | Segment::Cooldown {
                duration,
                power_low,
                power_high,
            } => {
                attrs.push(("Duration", format_seconds(*duration)));
                attrs.push(("PowerLow", format_fraction(*power_low)));
                attrs.push(("PowerHigh", format_fraction(*power_high)));
            }
            Segment::SteadyState {
                duration,
                power,
                cadence,
            } => {
                attrs.push(("Duration", format_seconds(*duration)));
                attrs.push(("Power", format_fraction(*power)));
                push_cadence(&mut attrs, *cadence);
            }
            Segment::Ramp {
                duration,
                power_low,
                power_high,
                cadence,
            } => {
                attrs.push(("Duration", format_seconds(*duration)));
                attrs.push(("PowerLow", format_fraction(*power_low)));
                attrs.push(("PowerHigh", format_fraction(*power_high)));
                push_cadence(&mut attrs, *cadence);
            }
            Segment::IntervalBlock {
                repeats,
                on_duration,
                off_duration,
                on_power,
                off_power,
                cadence,
            } => {
                attrs.push(("Repeat", repeats.to_string()));
                attrs.push(("OnDuration", format_seconds(*on_duration)));
                attrs.push(("OffDuration", format_seconds(*off_duration)));
                attrs.push(("OnPower", format_fraction(*on_power)));
                attrs.push(("OffPower", format_fraction(*off_power)));
                if let Some(cadence) = cadence {
                    attrs.push(("Cadence", cadence.to_string()));
                }
            }
        }
        attrs
    }
}

fn push_cadence(attrs: &mut Vec<(&'static str, String)>, cadence: Option<CadenceTarget>) {
    match cadence {
        Some(CadenceTarget::Fixed(rpm)) => attrs.push(("Cadence", rpm.to_string())),
        Some(CadenceTarget::Range { low, high }) => {
            attrs.push(("CadenceLow", low.to_string()));
            attrs.push(("CadenceHigh", high.to_string()));
        }
        None => {}
    }
}

/// Emit segments for a whole structure: warmup, then main, then cooldown,
/// each in authored order.
pub fn emit_structure(structure: &StructuredWorkout) -> Vec<Segment> {
    let mut segments =
        Vec::with_capacity(structure.warmup.len() + structure.main.len() + structure.cooldown.len());

    segments.extend(structure.warmup.iter().map(emit_step));

    for element in &structure.main {
        match element {
            MainElement::Step(step) => segments.push(emit_step(step)),
            MainElement::IntervalSet(set) => segments.extend(emit_interval_set(set)),
        }
    }

    segments.extend(structure.cooldown.iter().map(emit_step));
    segments
}

/// Emit a single step outside an interval set, classified by its tag
pub fn emit_step(step: &WorkoutStep) -> Segment {
    match step.kind {
        StepKind::Warmup => emit_warmup(step),
        StepKind::Cooldown => emit_cooldown(step),
        StepKind::Work | StepKind::Recovery | StepKind::Rest => emit_plain(step),
    }
}

/// Warmup ramps up from `low` (or 60% of value) to `high` (or value)
pub fn emit_warmup(step: &WorkoutStep) -> Segment {
    let intensity = &step.intensity;
    let low = intensity
        .value_low
        .unwrap_or(intensity.value * WARMUP_START_RATIO);
    let high = intensity.value_high.unwrap_or(intensity.value);

    Segment::Warmup {
        duration: step.duration.as_seconds(),
        power_low: to_fraction(low),
        power_high: to_fraction(high),
    }
}

/// Cooldown ramps down from `high` (or value) to `low` (or 50% of value)
pub fn emit_cooldown(step: &WorkoutStep) -> Segment {
    let intensity = &step.intensity;
    let high = intensity.value_high.unwrap_or(intensity.value);
    let low = intensity
        .value_low
        .unwrap_or(intensity.value * COOLDOWN_END_RATIO);

    Segment::Cooldown {
        duration: step.duration.as_seconds(),
        power_low: to_fraction(low),
        power_high: to_fraction(high),
    }
}

/// A step with both bounds becomes a ramp, anything else a steady state
pub fn emit_plain(step: &WorkoutStep) -> Segment {
    let duration = step.duration.as_seconds();
    let cadence = step.cadence.map(CadenceTarget::from);

    match step.intensity.range() {
        Some((low, high)) => Segment::Ramp {
            duration,
            power_low: to_fraction(low),
            power_high: to_fraction(high),
            cadence,
        },
        None => Segment::SteadyState {
            duration,
            power: to_fraction(step.intensity.value),
            cadence,
        },
    }
}

/// Collapse an interval set into one `IntervalsT` block.
///
/// Work and recovery steps are found by tag, not position. Without a work
/// step every sub-step is emitted on its own as a plain step.
pub fn emit_interval_set(set: &IntervalSet) -> Vec<Segment> {
    let work = set.steps.iter().find(|s| s.kind == StepKind::Work);
    let recovery = set
        .steps
        .iter()
        .find(|s| matches!(s.kind, StepKind::Recovery | StepKind::Rest));

    let Some(work) = work else {
        debug!(
            name = ?set.name,
            steps = set.steps.len(),
            "Interval set has no work step, emitting sub-steps individually"
        );
        return set.steps.iter().map(emit_plain).collect();
    };

    let (off_duration, off_intensity) = match recovery {
        Some(step) => (step.duration.as_seconds(), step.intensity.value),
        None => (DEFAULT_RECOVERY_SECONDS, DEFAULT_RECOVERY_INTENSITY),
    };

    vec![Segment::IntervalBlock {
        repeats: set.repeats,
        on_duration: work.duration.as_seconds(),
        off_duration,
        on_power: to_fraction(work.intensity.value),
        off_power: to_fraction(off_intensity),
        cadence: work.cadence.map(|c| c.low),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DurationTarget, DurationUnit, IntensityTarget};

    fn step(kind: StepKind, seconds: f64, intensity: f64) -> WorkoutStep {
        WorkoutStep::new(
            kind,
            DurationTarget::seconds(seconds),
            IntensityTarget::percent_ftp(intensity),
        )
    }

    fn attr<'a>(attrs: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn warmup_defaults_to_sixty_percent_start() {
        let segment = emit_step(&step(StepKind::Warmup, 600.0, 70.0));
        let attrs = segment.attributes();

        assert_eq!(segment.element_name(), "Warmup");
        assert_eq!(attr(&attrs, "Duration"), Some("600"));
        assert_eq!(attr(&attrs, "PowerLow"), Some("0.42"));
        assert_eq!(attr(&attrs, "PowerHigh"), Some("0.70"));
    }

    #[test]
    fn warmup_uses_explicit_bounds() {
        let mut warmup = step(StepKind::Warmup, 300.0, 65.0);
        warmup.intensity = warmup.intensity.with_range(45.0, 75.0);

        assert_eq!(
            emit_step(&warmup),
            Segment::Warmup {
                duration: 300.0,
                power_low: 0.45,
                power_high: 0.75,
            }
        );
    }

    #[test]
    fn cooldown_defaults_to_half_of_value() {
        let segment = emit_step(&step(StepKind::Cooldown, 300.0, 60.0));
        let attrs = segment.attributes();

        assert_eq!(segment.element_name(), "Cooldown");
        assert_eq!(attr(&attrs, "PowerLow"), Some("0.30"));
        assert_eq!(attr(&attrs, "PowerHigh"), Some("0.60"));
    }

    #[test]
    fn cooldown_takes_only_the_bound_that_is_present() {
        let mut cooldown = step(StepKind::Cooldown, 300.0, 60.0);
        cooldown.intensity.value_low = Some(40.0);

        let attrs = emit_step(&cooldown).attributes();
        assert_eq!(attr(&attrs, "PowerLow"), Some("0.40"));
        assert_eq!(attr(&attrs, "PowerHigh"), Some("0.60"));
    }

    #[test]
    fn plain_step_without_bounds_is_steady_state() {
        let segment = emit_step(&step(StepKind::Work, 1200.0, 88.0));
        let attrs = segment.attributes();

        assert_eq!(segment.element_name(), "SteadyState");
        assert_eq!(attr(&attrs, "Power"), Some("0.88"));
        assert_eq!(attr(&attrs, "Cadence"), None);
    }

    #[test]
    fn plain_step_with_bounds_is_ramp() {
        let mut work = step(StepKind::Work, 600.0, 80.0);
        work.intensity = work.intensity.with_range(70.0, 90.0);

        let segment = emit_step(&work);
        let attrs = segment.attributes();
        assert_eq!(segment.element_name(), "Ramp");
        assert_eq!(attr(&attrs, "PowerLow"), Some("0.70"));
        assert_eq!(attr(&attrs, "PowerHigh"), Some("0.90"));
        assert_eq!(attr(&attrs, "Power"), None);
    }

    #[test]
    fn single_bound_is_not_a_ramp() {
        let mut work = step(StepKind::Work, 600.0, 80.0);
        work.intensity.value_high = Some(90.0);

        assert_eq!(emit_step(&work).element_name(), "SteadyState");
    }

    #[test]
    fn cadence_equal_bounds_emit_single_value() {
        let work = step(StepKind::Work, 600.0, 80.0).with_cadence(90, 90);
        let attrs = emit_step(&work).attributes();

        assert_eq!(attr(&attrs, "Cadence"), Some("90"));
        assert_eq!(attr(&attrs, "CadenceLow"), None);
    }

    #[test]
    fn cadence_range_emits_low_and_high() {
        let work = step(StepKind::Work, 600.0, 80.0).with_cadence(85, 95);
        let attrs = emit_step(&work).attributes();

        assert_eq!(attr(&attrs, "Cadence"), None);
        assert_eq!(attr(&attrs, "CadenceLow"), Some("85"));
        assert_eq!(attr(&attrs, "CadenceHigh"), Some("95"));
    }

    #[test]
    fn interval_set_finds_steps_by_tag() {
        let set = IntervalSet {
            name: Some("Over-unders".to_string()),
            repeats: 4,
            steps: vec![
                step(StepKind::Recovery, 120.0, 55.0),
                step(StepKind::Work, 240.0, 105.0).with_cadence(95, 100),
            ],
        };

        let segments = emit_interval_set(&set);
        assert_eq!(
            segments,
            vec![Segment::IntervalBlock {
                repeats: 4,
                on_duration: 240.0,
                off_duration: 120.0,
                on_power: 1.05,
                off_power: 0.55,
                cadence: Some(95),
            }]
        );
        assert_eq!(segments[0].duration_seconds(), 4.0 * 360.0);
    }

    #[test]
    fn rest_step_counts_as_recovery() {
        let set = IntervalSet {
            name: None,
            repeats: 6,
            steps: vec![
                step(StepKind::Work, 30.0, 150.0),
                step(StepKind::Rest, 30.0, 40.0),
            ],
        };

        let attrs = emit_interval_set(&set)[0].attributes();
        assert_eq!(attr(&attrs, "OffDuration"), Some("30"));
        assert_eq!(attr(&attrs, "OffPower"), Some("0.40"));
    }

    #[test]
    fn missing_recovery_defaults_to_sixty_seconds_at_half() {
        let set = IntervalSet {
            name: None,
            repeats: 5,
            steps: vec![step(StepKind::Work, 180.0, 95.0)],
        };

        let segments = emit_interval_set(&set);
        assert_eq!(segments.len(), 1);

        let attrs = segments[0].attributes();
        assert_eq!(attr(&attrs, "Repeat"), Some("5"));
        assert_eq!(attr(&attrs, "OnPower"), Some("0.95"));
        assert_eq!(attr(&attrs, "OffDuration"), Some("60"));
        assert_eq!(attr(&attrs, "OffPower"), Some("0.50"));
        assert_eq!(attr(&attrs, "Cadence"), None);
    }

    #[test]
    fn interval_set_without_work_degrades_to_plain_steps() {
        let mut ranged = step(StepKind::Recovery, 60.0, 50.0);
        ranged.intensity = ranged.intensity.with_range(45.0, 55.0);

        let set = IntervalSet {
            name: None,
            repeats: 3,
            steps: vec![step(StepKind::Rest, 90.0, 40.0), ranged],
        };

        let segments = emit_interval_set(&set);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].element_name(), "SteadyState");
        assert_eq!(segments[1].element_name(), "Ramp");
    }

    #[test]
    fn structure_keeps_authored_order() {
        let structure = StructuredWorkout {
            warmup: vec![
                step(StepKind::Warmup, 600.0, 65.0),
                step(StepKind::Work, 60.0, 100.0),
            ],
            main: vec![
                MainElement::Step(step(StepKind::Work, 1200.0, 90.0)),
                MainElement::IntervalSet(IntervalSet {
                    name: None,
                    repeats: 3,
                    steps: vec![
                        step(StepKind::Work, 300.0, 110.0),
                        step(StepKind::Recovery, 180.0, 50.0),
                    ],
                }),
            ],
            cooldown: vec![step(StepKind::Cooldown, 300.0, 55.0)],
            total_duration: None,
            estimated_tss: None,
            estimated_if: None,
        };

        let names: Vec<_> = emit_structure(&structure)
            .iter()
            .map(Segment::element_name)
            .collect();
        assert_eq!(
            names,
            vec!["Warmup", "SteadyState", "SteadyState", "IntervalsT", "Cooldown"]
        );
    }

    #[test]
    fn distance_durations_pass_through_as_seconds() {
        let swim = WorkoutStep::new(
            StepKind::Work,
            DurationTarget::new(400.0, DurationUnit::Meters),
            IntensityTarget::percent_ftp(80.0),
        );

        let attrs = emit_step(&swim).attributes();
        assert_eq!(attr(&attrs, "Duration"), Some("400"));
    }

    #[test]
    fn phase_steps_are_classified_by_tag_not_position() {
        let structure = StructuredWorkout {
            warmup: vec![step(StepKind::Work, 300.0, 60.0)],
            main: vec![
                MainElement::Step(step(StepKind::Warmup, 600.0, 70.0)),
                MainElement::Step(step(StepKind::Work, 1200.0, 85.0)),
                MainElement::Step(step(StepKind::Cooldown, 300.0, 60.0)),
            ],
            cooldown: vec![step(StepKind::Work, 300.0, 50.0)],
            total_duration: None,
            estimated_tss: None,
            estimated_if: None,
        };

        let segments = emit_structure(&structure);
        let names: Vec<_> = segments.iter().map(Segment::element_name).collect();
        assert_eq!(
            names,
            vec!["SteadyState", "Warmup", "SteadyState", "Cooldown", "SteadyState"]
        );

        let warmup = segments[1].attributes();
        assert_eq!(attr(&warmup, "PowerLow"), Some("0.42"));
        assert_eq!(attr(&warmup, "PowerHigh"), Some("0.70"));
        let cooldown = segments[3].attributes();
        assert_eq!(attr(&cooldown, "PowerLow"), Some("0.30"));
        assert_eq!(attr(&cooldown, "PowerHigh"), Some("0.60"));
    }

    #[test]
    fn half_percent_powers_round_up() {
        let attrs = emit_step(&step(StepKind::Cooldown, 300.0, 25.0)).attributes();
        assert_eq!(attr(&attrs, "PowerLow"), Some("0.13"));
        assert_eq!(attr(&attrs, "PowerHigh"), Some("0.25"));

        let attrs = emit_step(&step(StepKind::Work, 600.0, 62.5)).attributes();
        assert_eq!(attr(&attrs, "Power"), Some("0.63"));
    }
}
