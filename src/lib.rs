//! # Balloon GS Library
//!
//! Ground station engine for high-altitude balloon telemetry.
//!
//! This library decodes downlink telemetry frames arriving over a serial
//! radio link into independently-validated sensor and position records,
//! persists them to a partial-failure-tolerant tab-separated log, selects
//! the next uplink control command from the operator's command mailbox, and
//! renders the flight track as a static HTML map.

pub mod config;
pub mod datalog;
pub mod error;
pub mod map;
pub mod serial;
pub mod telemetry;
pub mod uplink;
