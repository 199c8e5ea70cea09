//! Unit conversions shared by the workout exporters
//!
//! Plan intensities are stored as whole percentages (75 for 75% FTP) and
//! durations in their authored unit. Export formats want fractions and seconds.

use rust_decimal::prelude::*;

use crate::models::DurationUnit;

/// Convert a whole-percentage intensity to a 0.0-1.0 fraction.
///
/// No rounding happens here; formatting to two decimals is left to the writer.
pub fn to_fraction(intensity: f64) -> f64 {
    intensity / 100.0
}

/// Convert a duration to seconds.
///
/// Distance-based units have no pace context at this layer, so the raw value
/// is passed through unchanged. This is a known approximation, not a conversion.
pub fn to_seconds(value: f64, unit: DurationUnit) -> f64 {
    match unit {
        DurationUnit::Seconds => value,
        DurationUnit::Minutes => value * 60.0,
        DurationUnit::Hours => value * 3600.0,
        DurationUnit::Meters
        | DurationUnit::Kilometers
        | DurationUnit::Miles
        | DurationUnit::Yards
        | DurationUnit::Laps => value,
    }
}

/// Format a fraction with exactly two decimals ("0.65").
///
/// Rounds the exact binary value half away from zero, so 0.625 becomes
/// "0.63" while 0.615 (stored just below the tie) stays "0.61".
pub fn format_fraction(fraction: f64) -> String {
    match Decimal::from_f64_retain(fraction) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            if rounded.is_zero() {
                let sign = if fraction < 0.0 { "-" } else { "" };
                return format!("{}0.00", sign);
            }
            format!("{:.2}", rounded)
        }
        None => format!("{:.2}", fraction),
    }
}

/// Format seconds as a plain number: "360", "90", "0.5", "-120"
pub fn format_seconds(seconds: f64) -> String {
    seconds.to_string()
}
