//! # Telemetry Protocol Module
//!
//! Decoding of downlink telemetry frames from the balloon payload.
//!
//! This module handles:
//! - Frame segmentation (echo, flight time, sensor data, GPS data)
//! - Sensor channel extraction and calibration to physical units
//! - Embedded NMEA GGA sentence validation and coordinate conversion
//! - Per-section failure isolation (a corrupt GPS segment never invalidates
//!   a good sensor segment, and vice versa)

pub mod field;
pub mod frame;
pub mod gps;
pub mod protocol;
pub mod sensors;
