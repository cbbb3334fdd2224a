//! # Wire Protocol Constants and Types
//!
//! Core definitions for the balloon downlink/uplink protocol.
//!
//! A downlink frame is ASCII text of the form
//! `[echo]#[flight_time_seconds]#[sensor_fields]#[gps_sentence]`. The field
//! widths and offsets below *are* the protocol: the payload firmware emits
//! fixed-width coordinate fields, so the decoder validates shape by position
//! rather than by general-purpose parsing.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Reserved byte separating the segments of a downlink frame
pub const FRAME_DELIMITER: char = '#';

/// Separator between channels inside the sensor segment
pub const SENSOR_DELIMITER: char = ',';

/// Trailing byte that marks an uplink command as complete
pub const COMMAND_DELIMITER: char = '@';

/// Command-file keyword that terminates the session (case-sensitive)
pub const STOP_COMMAND: &str = "Stop";

/// Command-file keyword that suppresses the uplink for one cycle
pub const SILENT_COMMAND: &str = "Silent";

/// Uplink command sent when the command file holds nothing actionable
pub const DEFAULT_COMMAND: &str = "OKAY@";

/// Fix sentence tag expected inside the GPS segment (always 6 characters)
pub const GGA_TAG: &str = "$GPGGA";

/// Serial poll buffer size; one frame never exceeds this
pub const MAX_FRAME_BYTES: usize = 1000;

/// ADC reference voltage of the sensor board
pub const VREF: f64 = 3.3;

/// ADC full-scale count
pub const ADC_COUNTS: f64 = 1024.0;

/// Pressure transducer coefficient (counts per hPa per ADC count)
pub const PRESSURE_COEFF: f64 = 0.00776;

/// Humidity sensor zero offset in volts
pub const HUMIDITY_ZERO_V: f64 = 0.958;

/// Humidity sensor slope in volts per %RH
pub const HUMIDITY_SLOPE: f64 = 0.03068;

/// Per-axis accelerometer zero-g bias in volts
pub const ACCEL_BIAS: [f64; 3] = [1.0725, 1.0825, 1.1050];

/// Accelerometer scale in mg per volt (axes are inverted on the board)
pub const ACCEL_SCALE: f64 = -1000.0 / 0.22;

/// Temperature sensor slope in volts per degree
pub const TEMP_SLOPE: f64 = 0.01;

/// Temperature offset in °F
pub const TEMP_OFFSET: f64 = 32.0;

/// Arc-minutes to decimal degrees
pub const MINUTES_TO_DEGREES: f64 = 1.0 / 60.0;

/// Latitude field width (`ddmm.mmmm`)
pub const LAT_FIELD_WIDTH: usize = 9;

/// Offset of the decimal point within the latitude field
pub const LAT_POINT_OFFSET: usize = 4;

/// Longitude field width (`dddmm.mmmm`)
pub const LON_FIELD_WIDTH: usize = 10;

/// Offset of the decimal point within the longitude field
pub const LON_POINT_OFFSET: usize = 5;

/// Width of the arc-minutes tail shared by both coordinate fields
pub const MINUTES_WIDTH: usize = 7;

/// Minimum bytes from the sentence tag for a short-form fix (no altitude)
pub const SHORT_FORM_MIN_BYTES: usize = 42;

/// Minimum bytes from the sentence tag for a long-form fix (with altitude)
pub const LONG_FORM_MIN_BYTES: usize = 58;

/// Accepted widths for the altitude field
pub const ALTITUDE_WIDTH: RangeInclusive<usize> = 5..=8;

/// One polling cycle's raw byte payload from the transport.
///
/// May be empty, truncated, or garbage; consumed entirely by the frame
/// decoder within one cycle.
pub type RawFrame = bytes::Bytes;

/// GPS segment length profile.
///
/// Two incompatible segment lengths exist across payload firmware revisions
/// and the wire format does not self-describe which one is in use, so the
/// profile is fixed per deployment through configuration, never detected
/// from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpsProfile {
    /// Latitude/longitude only
    #[default]
    Short,
    /// Latitude/longitude plus altitude
    Long,
}

impl GpsProfile {
    /// Minimum sentence length (bytes from the tag) this profile requires
    pub fn min_sentence_bytes(self) -> usize {
        match self {
            GpsProfile::Short => SHORT_FORM_MIN_BYTES,
            GpsProfile::Long => LONG_FORM_MIN_BYTES,
        }
    }

    /// Whether fixes decoded under this profile carry an altitude
    pub fn includes_altitude(self) -> bool {
        matches!(self, GpsProfile::Long)
    }
}

impl FromStr for GpsProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(GpsProfile::Short),
            "long" => Ok(GpsProfile::Long),
            other => Err(format!(
                "unknown gps profile {:?} (expected \"short\" or \"long\")",
                other
            )),
        }
    }
}

impl fmt::Display for GpsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsProfile::Short => write!(f, "short"),
            GpsProfile::Long => write!(f, "long"),
        }
    }
}

/// Calibrated sensor readings from one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Barometric pressure in hPa
    pub pressure: f64,

    /// Relative humidity in %RH
    pub humidity: f64,

    /// Acceleration per axis in mg
    pub accel: [f64; 3],

    /// Temperature channels in °F
    pub temperature: [f64; 2],
}

/// Decoded GPS position fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    /// Latitude in signed decimal degrees (+ = N)
    pub latitude: f64,

    /// Longitude in signed decimal degrees (+ = E)
    pub longitude: f64,

    /// Altitude in meters (long-form profile only)
    pub altitude: Option<f64>,
}

/// Elapsed payload-side time since boot, decoded from a seconds count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightTime {
    secs: u64,
}

impl FlightTime {
    /// Create a flight time from a raw seconds count
    pub fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    /// Total elapsed seconds
    pub fn as_secs(&self) -> u64 {
        self.secs
    }

    /// Whole hours component
    pub fn hours(&self) -> u64 {
        self.secs / 3600
    }

    /// Minutes component (0-59)
    pub fn minutes(&self) -> u64 {
        (self.secs / 60) % 60
    }

    /// Seconds component (0-59)
    pub fn seconds(&self) -> u64 {
        self.secs % 60
    }
}

impl fmt::Display for FlightTime {
    /// Renders as `H:MM:SS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// The decoded result of one downlink frame.
///
/// Always produced, even when every section failed to decode; a record with
/// neither sensors nor a position is simply not persisted downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    /// Command text the payload reports having received (may be empty)
    pub echo: String,

    /// Payload uptime; `None` when the time field failed to parse
    pub flight_time: Option<FlightTime>,

    /// Calibrated sensor section; `None` when the section was rejected
    pub sensors: Option<SensorReading>,

    /// Position section; `None` when the section was rejected
    pub position: Option<GpsFix>,
}

impl TelemetryRecord {
    /// A record with every section invalid (empty or unusable frame)
    pub fn empty() -> Self {
        Self {
            echo: String::new(),
            flight_time: None,
            sensors: None,
            position: None,
        }
    }

    /// Whether the sensor section decoded
    pub fn sensors_valid(&self) -> bool {
        self.sensors.is_some()
    }

    /// Whether the position section decoded
    pub fn position_valid(&self) -> bool {
        self.position.is_some()
    }

    /// At least one section must decode for the record to be persistable
    pub fn has_data(&self) -> bool {
        self.sensors_valid() || self.position_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiters_are_distinct() {
        // The frame delimiter must never collide with in-segment separators
        assert_ne!(FRAME_DELIMITER, SENSOR_DELIMITER);
        assert_ne!(FRAME_DELIMITER, COMMAND_DELIMITER);
    }

    #[test]
    fn test_field_geometry() {
        assert_eq!(GGA_TAG.len(), 6);
        assert_eq!(LAT_FIELD_WIDTH, 9);
        assert_eq!(LON_FIELD_WIDTH, 10);
        // The minutes tail must fit inside both coordinate fields
        assert!(MINUTES_WIDTH < LAT_FIELD_WIDTH);
        assert!(MINUTES_WIDTH < LON_FIELD_WIDTH);
    }

    #[test]
    fn test_gps_profile_from_str() {
        assert_eq!("short".parse::<GpsProfile>().unwrap(), GpsProfile::Short);
        assert_eq!("long".parse::<GpsProfile>().unwrap(), GpsProfile::Long);
        assert!("auto".parse::<GpsProfile>().is_err());
        assert!("Short".parse::<GpsProfile>().is_err());
    }

    #[test]
    fn test_gps_profile_lengths() {
        assert_eq!(GpsProfile::Short.min_sentence_bytes(), 42);
        assert_eq!(GpsProfile::Long.min_sentence_bytes(), 58);
        assert!(!GpsProfile::Short.includes_altitude());
        assert!(GpsProfile::Long.includes_altitude());
    }

    #[test]
    fn test_flight_time_display() {
        assert_eq!(FlightTime::from_secs(0).to_string(), "0:00:00");
        assert_eq!(FlightTime::from_secs(59).to_string(), "0:00:59");
        assert_eq!(FlightTime::from_secs(3661).to_string(), "1:01:01");
        assert_eq!(FlightTime::from_secs(7325).to_string(), "2:02:05");
    }

    #[test]
    fn test_flight_time_components() {
        let ft = FlightTime::from_secs(3723);
        assert_eq!(ft.hours(), 1);
        assert_eq!(ft.minutes(), 2);
        assert_eq!(ft.seconds(), 3);
        assert_eq!(ft.as_secs(), 3723);
    }

    #[test]
    fn test_record_validity_is_independent() {
        let mut record = TelemetryRecord::empty();
        assert!(!record.has_data());

        record.position = Some(GpsFix {
            latitude: 42.1653,
            longitude: -83.4454,
            altitude: None,
        });
        assert!(record.has_data());
        assert!(record.position_valid());
        assert!(!record.sensors_valid());
    }
}
