//! # Numeric Field Parsing
//!
//! Fixed-grammar numeric field extraction shared by the sensor and GPS
//! decoders. These helpers enforce lexical shape only; range checking is
//! the caller's business.

use crate::telemetry::protocol::{MINUTES_TO_DEGREES, MINUTES_WIDTH};

/// Check that a field matches the fixed digit grammar.
///
/// Every character must be an ASCII digit, except that when `point` is
/// given, the character at exactly that offset must be a decimal point.
/// The caller is expected to have sliced the field to its protocol width;
/// a `point` offset beyond the field's end is simply never reached.
///
/// # Examples
///
/// ```
/// use balloon_gs::telemetry::field::check_shape;
///
/// assert!(check_shape("4209.9180", Some(4)));
/// assert!(!check_shape("42O9.9180", Some(4))); // letter O in a digit position
/// assert!(!check_shape("4209,9180", Some(4))); // wrong byte at the point offset
/// assert!(check_shape("3661", None));
/// ```
pub fn check_shape(field: &str, point: Option<usize>) -> bool {
    field.char_indices().all(|(i, c)| match point {
        Some(p) if i == p => c == '.',
        _ => c.is_ascii_digit(),
    })
}

/// Parse one delimited ADC channel count.
///
/// Returns `None` when the field fails to parse as a decimal number *or*
/// when it parses to exactly zero. The instrument never legitimately reads
/// a zero count, and downstream tooling filters zero rows, so "no signal"
/// and "bad data" are deliberately indistinguishable here (inherited
/// behavior; do not "fix" it without auditing the consumers).
pub fn parse_channel(field: &str) -> Option<f64> {
    let value: f64 = field.trim().parse().ok()?;
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

/// Convert a fixed-width GGA coordinate field to decimal degrees.
///
/// The trailing [`MINUTES_WIDTH`] characters are arc-minutes (`mm.mmmm`);
/// the leading remainder is whole degrees. Returns `None` if either part
/// fails to parse or the field is too short to contain both.
///
/// # Examples
///
/// ```
/// use balloon_gs::telemetry::field::to_decimal_degrees;
///
/// let lat = to_decimal_degrees("4209.9180").unwrap();
/// assert!((lat - 42.1653).abs() < 1e-5);
/// ```
pub fn to_decimal_degrees(field: &str) -> Option<f64> {
    if field.len() <= MINUTES_WIDTH {
        return None;
    }
    let (degrees, minutes) = field.split_at(field.len() - MINUTES_WIDTH);
    let minutes: f64 = minutes.parse().ok()?;
    let degrees: f64 = degrees.parse().ok()?;
    Some(degrees + minutes * MINUTES_TO_DEGREES)
}
