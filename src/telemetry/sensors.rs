//! # Sensor Segment Decoder
//!
//! Decodes the seven-channel sensor segment of a downlink frame
//! (`pressure,humidity,ax,ay,az,t1,t2`) and applies the fixed calibration
//! transforms that turn raw ADC counts into physical units.
//!
//! The segment is consumed left to right by an explicit cursor; any channel
//! that fails extraction aborts the whole section with an error naming that
//! channel, and partially decoded channels are discarded.

use std::fmt;

use crate::error::DecodeError;
use crate::telemetry::field;
use crate::telemetry::protocol::{
    SensorReading, ACCEL_BIAS, ACCEL_SCALE, ADC_COUNTS, HUMIDITY_SLOPE, HUMIDITY_ZERO_V,
    PRESSURE_COEFF, SENSOR_DELIMITER, TEMP_OFFSET, TEMP_SLOPE, VREF,
};

/// Physical channel groups carried in the sensor segment.
///
/// Used by [`DecodeError::InvalidField`] to name the channel whose
/// extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Pressure,
    Humidity,
    Acceleration,
    Temperature,
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorChannel::Pressure => write!(f, "pressure"),
            SensorChannel::Humidity => write!(f, "humidity"),
            SensorChannel::Acceleration => write!(f, "acceleration"),
            SensorChannel::Temperature => write!(f, "temperature"),
        }
    }
}

/// Cursor over the comma-delimited channel run of a sensor segment.
///
/// Yields one raw ADC count per call, tagged with the channel it was read
/// for so shape mismatches surface with the field name instead of a raw
/// string offset.
struct FieldCursor<'a> {
    rest: &'a str,
}

impl<'a> FieldCursor<'a> {
    fn new(segment: &'a str) -> Self {
        Self { rest: segment }
    }

    /// Consume the next channel field and parse its raw count
    fn next_channel(&mut self, channel: SensorChannel) -> Result<f64, DecodeError> {
        let (head, tail) = match self.rest.split_once(SENSOR_DELIMITER) {
            Some((head, tail)) => (head, tail),
            None => (self.rest, ""),
        };
        self.rest = tail;
        field::parse_channel(head).ok_or(DecodeError::InvalidField { channel })
    }
}

/// Decode the sensor segment of a frame into calibrated readings.
///
/// # Arguments
///
/// * `segment` - The comma-delimited seven-channel run, in wire order
///   `pressure,humidity,ax,ay,az,t1,t2`
///
/// # Returns
///
/// * `Result<SensorReading>` - All seven channels calibrated, or the first
///   failure
///
/// # Errors
///
/// Returns [`DecodeError::InvalidField`] naming the channel that failed
/// lexical or numeric extraction (a zero raw count counts as a failure).
pub fn decode_sensors(segment: &str) -> Result<SensorReading, DecodeError> {
    let mut cursor = FieldCursor::new(segment);

    let raw = cursor.next_channel(SensorChannel::Pressure)?;
    let pressure = raw / (ADC_COUNTS * PRESSURE_COEFF);

    let raw = cursor.next_channel(SensorChannel::Humidity)?;
    let humidity = ((VREF * raw / ADC_COUNTS) - HUMIDITY_ZERO_V) / HUMIDITY_SLOPE;

    let mut accel = [0.0; 3];
    for (axis, bias) in ACCEL_BIAS.iter().enumerate() {
        let raw = cursor.next_channel(SensorChannel::Acceleration)?;
        accel[axis] = ((VREF * raw / ADC_COUNTS) - bias) * ACCEL_SCALE;
    }

    let mut temperature = [0.0; 2];
    for channel in temperature.iter_mut() {
        let raw = cursor.next_channel(SensorChannel::Temperature)?;
        *channel = (VREF * raw / ADC_COUNTS) / TEMP_SLOPE - TEMP_OFFSET;
    }

    Ok(SensorReading {
        pressure,
        humidity,
        accel,
        temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAWS: [f64; 7] = [612.0, 498.0, 333.0, 339.0, 346.0, 521.0, 523.0];

    fn segment_from(raws: &[f64]) -> String {
        raws.iter()
            .map(|r| format!("{}", r))
            .collect::<Vec<_>>()
            .join(",")
    }

    // Inverse calibrations, used to verify the decode is the fixed affine
    // transform it claims to be.
    fn inverse_pressure(p: f64) -> f64 {
        p * ADC_COUNTS * PRESSURE_COEFF
    }

    fn inverse_humidity(h: f64) -> f64 {
        (h * HUMIDITY_SLOPE + HUMIDITY_ZERO_V) * ADC_COUNTS / VREF
    }

    fn inverse_accel(a: f64, axis: usize) -> f64 {
        (a / ACCEL_SCALE + ACCEL_BIAS[axis]) * ADC_COUNTS / VREF
    }

    fn inverse_temperature(t: f64) -> f64 {
        (t + TEMP_OFFSET) * TEMP_SLOPE * ADC_COUNTS / VREF
    }

    #[test]
    fn test_decode_valid_segment() {
        let reading = decode_sensors(&segment_from(&RAWS)).unwrap();

        // Spot-check pressure against the calibration formula
        let expected_pressure = 612.0 / (1024.0 * 0.00776);
        assert!((reading.pressure - expected_pressure).abs() < 1e-9);

        // Humidity lands in a plausible %RH range for these counts
        assert!(reading.humidity > 0.0 && reading.humidity < 100.0);
    }

    #[test]
    fn test_calibration_round_trip() {
        // Decoding then inverting every channel recovers the raw counts
        let reading = decode_sensors(&segment_from(&RAWS)).unwrap();

        assert!((inverse_pressure(reading.pressure) - RAWS[0]).abs() < 1e-9);
        assert!((inverse_humidity(reading.humidity) - RAWS[1]).abs() < 1e-9);
        for axis in 0..3 {
            assert!((inverse_accel(reading.accel[axis], axis) - RAWS[2 + axis]).abs() < 1e-9);
        }
        assert!((inverse_temperature(reading.temperature[0]) - RAWS[5]).abs() < 1e-9);
        assert!((inverse_temperature(reading.temperature[1]) - RAWS[6]).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_delimiter_is_accepted() {
        // The payload firmware terminates every channel with a comma
        let segment = format!("{},", segment_from(&RAWS));
        assert!(decode_sensors(&segment).is_ok());
    }

    #[test]
    fn test_zero_pressure_fails_pressure_channel() {
        let result = decode_sensors("0,498,333,339,346,521,523");
        assert_eq!(
            result.unwrap_err(),
            DecodeError::InvalidField {
                channel: SensorChannel::Pressure
            }
        );
    }

    #[test]
    fn test_garbage_humidity_fails_humidity_channel() {
        let result = decode_sensors("612,4x8,333,339,346,521,523");
        assert_eq!(
            result.unwrap_err(),
            DecodeError::InvalidField {
                channel: SensorChannel::Humidity
            }
        );
    }

    #[test]
    fn test_short_segment_names_missing_channel() {
        // Only five channels present: the first temperature read fails
        let result = decode_sensors("612,498,333,339,346");
        assert_eq!(
            result.unwrap_err(),
            DecodeError::InvalidField {
                channel: SensorChannel::Temperature
            }
        );
    }

    #[test]
    fn test_empty_segment_fails_first_channel() {
        let result = decode_sensors("");
        assert_eq!(
            result.unwrap_err(),
            DecodeError::InvalidField {
                channel: SensorChannel::Pressure
            }
        );
    }

    #[test]
    fn test_failure_discards_partial_decode() {
        // A failure mid-segment returns an error, never a partial reading
        let result = decode_sensors("612,498,333,bad,346,521,523");
        assert!(result.is_err());
    }
}
