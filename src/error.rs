//! # Error Types
//!
//! Custom error types for the ground station using `thiserror`.
//!
//! Frame decoding failures form a closed taxonomy (`DecodeError`) that names
//! the failing channel or field, so operator diagnostics always say *what*
//! was rejected. Everything outside the decoding engine (files, serial,
//! configuration) lives in `GroundStationError`.

use thiserror::Error;

use crate::telemetry::sensors::SensorChannel;

/// Failures produced while decoding a telemetry frame.
///
/// Sensor-section and GPS-section variants are caught at the frame decoder
/// boundary and downgrade the corresponding section to invalid; they never
/// abort frame processing. `NoDataReceived` is frame-fatal (nothing to
/// decode) but session-non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The polling cycle returned an empty buffer
    #[error("no data received")]
    NoDataReceived,

    /// A sensor channel failed lexical or numeric extraction
    #[error("invalid {channel} data")]
    InvalidField { channel: SensorChannel },

    /// The GPS segment contains no fix sentence tag
    #[error("unable to find $GPGGA")]
    SentenceNotFound,

    /// The fix sentence ends before the fields the profile requires
    #[error("truncated GPS data ({have} of {need} bytes)")]
    TruncatedFrame { have: usize, need: usize },

    /// A non-digit byte in a latitude digit position, or a missing field
    #[error("bad latitude format")]
    BadLatitudeFormat,

    /// A non-digit byte in a longitude digit position, or a missing field
    #[error("bad longitude format")]
    BadLongitudeFormat,

    /// The altitude field is missing, outside its width window, or non-numeric
    #[error("bad altitude format")]
    BadAltitudeFormat,
}

/// Main error type for the ground station
#[derive(Debug, Error)]
pub enum GroundStationError {
    /// Telemetry frame decoding errors
    #[error("frame decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Datafile or command file could not be opened
    #[error("could not open {path}: {source}")]
    FileUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serial transport errors
    #[error("serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Track map rendering errors
    #[error("map rendering error: {0}")]
    Map(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the ground station
pub type Result<T> = std::result::Result<T, GroundStationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages_name_the_failure() {
        let err = DecodeError::InvalidField {
            channel: SensorChannel::Pressure,
        };
        assert_eq!(err.to_string(), "invalid pressure data");

        assert_eq!(
            DecodeError::SentenceNotFound.to_string(),
            "unable to find $GPGGA"
        );
        assert_eq!(
            DecodeError::TruncatedFrame { have: 12, need: 42 }.to_string(),
            "truncated GPS data (12 of 42 bytes)"
        );
        assert_eq!(
            DecodeError::BadLatitudeFormat.to_string(),
            "bad latitude format"
        );
    }

    #[test]
    fn test_decode_error_wraps_into_ground_station_error() {
        let err: GroundStationError = DecodeError::NoDataReceived.into();
        assert!(matches!(
            err,
            GroundStationError::Decode(DecodeError::NoDataReceived)
        ));
        assert_eq!(err.to_string(), "frame decode error: no data received");
    }

    #[test]
    fn test_file_unavailable_reports_path() {
        let err = GroundStationError::FileUnavailable {
            path: "flight.dat".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("flight.dat"));
    }
}
