//! # Frame Decoder
//!
//! Splits one polling cycle's raw buffer into its `#`-delimited segments
//! (echo, flight time, sensor data, GPS data) and drives the section
//! decoders under a failure-isolation policy: a rejected section downgrades
//! its own validity flag and nothing else. Decoding always produces a
//! [`TelemetryRecord`]; a record with no valid section is simply not
//! persisted downstream.

use tracing::{debug, info, warn};

use crate::telemetry::gps;
use crate::telemetry::protocol::{
    FlightTime, GpsProfile, RawFrame, TelemetryRecord, FRAME_DELIMITER,
};
use crate::telemetry::sensors;

/// Decode one raw downlink frame.
///
/// # Arguments
///
/// * `raw` - The polling cycle's buffer; anything past the first NUL byte
///   is ignored (the transport null-terminates each frame)
/// * `profile` - GPS segment length profile for this deployment
///
/// # Returns
///
/// * `TelemetryRecord` - Always produced; section failures are logged and
///   recorded as invalid sections, never propagated
pub fn decode_frame(raw: &RawFrame, profile: GpsProfile) -> TelemetryRecord {
    let payload = match raw.iter().position(|&b| b == 0) {
        Some(nul) => &raw[..nul],
        None => &raw[..],
    };

    if payload.is_empty() {
        warn!("no data received");
        return TelemetryRecord::empty();
    }

    let text = String::from_utf8_lossy(payload);

    // Echo: everything before the first delimiter. A frame with no
    // delimiter at all is pure garbage; both sections will reject below.
    let (echo, rest) = split_segment(&text);
    info!("balloon received {:?}", echo);

    // Flight time: a plain seconds count. Failure only omits timing.
    let (time_field, rest) = split_segment(rest);
    let flight_time = decode_flight_time(time_field);

    let (sensor_segment, gps_segment) = split_segment(rest);

    let sensors = match sensors::decode_sensors(sensor_segment) {
        Ok(reading) => Some(reading),
        Err(e) => {
            warn!("sensor data rejected: {}", e);
            None
        }
    };

    let position = match gps::decode_gps(gps_segment, profile) {
        Ok(fix) => Some(fix),
        Err(e) => {
            warn!("GPS data rejected: {}", e);
            None
        }
    };

    TelemetryRecord {
        echo: echo.to_string(),
        flight_time,
        sensors,
        position,
    }
}

/// Split off the segment before the next frame delimiter.
///
/// Without a delimiter the whole input is the segment and the remainder is
/// empty.
fn split_segment(text: &str) -> (&str, &str) {
    match text.split_once(FRAME_DELIMITER) {
        Some((head, tail)) => (head, tail),
        None => (text, ""),
    }
}

/// Parse the flight-time segment (integer seconds since payload boot)
fn decode_flight_time(field: &str) -> Option<FlightTime> {
    match field.trim().parse::<u64>() {
        Ok(secs) => Some(FlightTime::from_secs(secs)),
        Err(_) => {
            debug!("unreadable flight time {:?}, omitting", field);
            None
        }
    }
}
