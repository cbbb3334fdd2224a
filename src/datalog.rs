//! # Telemetry Datalog
//!
//! Append-only tab-separated persistence for decoded telemetry records.
//!
//! Every row carries the same fixed column count for its deployment
//! profile; a section that failed to decode is written as the matching run
//! of empty columns, never omitted. Downstream consumers (the track map in
//! particular) locate latitude and longitude purely by counting tab
//! characters from the start of the line, so column positions must never
//! shift.
//!
//! The datafile is opened in append mode for each write and released on
//! every exit path; no file handle survives across polling cycles.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{GroundStationError, Result};
use crate::telemetry::protocol::{GpsProfile, TelemetryRecord};

/// Zero-based column of the latitude field
pub const LAT_COLUMN: usize = 10;

/// Zero-based column of the longitude field
pub const LNG_COLUMN: usize = 11;

/// Number of sensor columns (pressure, humidity, ax, ay, az, t1, t2)
const SENSOR_COLUMNS: usize = 7;

/// Wall-clock timestamp format for the first column
const WALL_CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Append-only tab-separated log of telemetry records
#[derive(Debug, Clone)]
pub struct DataLog {
    path: PathBuf,
    profile: GpsProfile,
}

impl DataLog {
    /// Create a log writing to `path` under the given deployment profile
    pub fn new<P: AsRef<Path>>(path: P, profile: GpsProfile) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            profile,
        }
    }

    /// The datafile path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fixed column count for this deployment profile
    pub fn column_count(&self) -> usize {
        if self.profile.includes_altitude() {
            13
        } else {
            12
        }
    }

    /// Append one record as a log row.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - a row was written
    /// * `Ok(false)` - the record had no valid section and was skipped
    ///
    /// # Errors
    ///
    /// [`GroundStationError::FileUnavailable`] when the datafile cannot be
    /// opened; I/O errors from the write itself. Both are frame-fatal but
    /// session-non-fatal.
    pub fn append(&self, record: &TelemetryRecord) -> Result<bool> {
        if !record.has_data() {
            info!("no data to write");
            return Ok(false);
        }

        let row = self.format_row(record, Local::now());
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| GroundStationError::FileUnavailable {
                path: self.path.display().to_string(),
                source: e,
            })?;
        file.write_all(row.as_bytes())?;

        debug!("appended row to {}", self.path.display());
        Ok(true)
    }

    /// Render one record as a tab-separated row with a trailing newline.
    ///
    /// Floats use Rust's shortest round-trip formatting, so a reader that
    /// parses a written column recovers the exact value.
    fn format_row(&self, record: &TelemetryRecord, wall_clock: DateTime<Local>) -> String {
        let mut columns: Vec<String> = Vec::with_capacity(self.column_count());

        columns.push(wall_clock.format(WALL_CLOCK_FORMAT).to_string());
        columns.push(
            record
                .flight_time
                .map(|ft| ft.to_string())
                .unwrap_or_default(),
        );
        columns.push(sanitize_echo(&record.echo));

        match &record.sensors {
            Some(s) => {
                for value in [
                    s.pressure,
                    s.humidity,
                    s.accel[0],
                    s.accel[1],
                    s.accel[2],
                    s.temperature[0],
                    s.temperature[1],
                ] {
                    columns.push(value.to_string());
                }
            }
            None => columns.extend(std::iter::repeat(String::new()).take(SENSOR_COLUMNS)),
        }

        match &record.position {
            Some(p) => {
                columns.push(p.latitude.to_string());
                columns.push(p.longitude.to_string());
                if self.profile.includes_altitude() {
                    columns.push(p.altitude.map(|a| a.to_string()).unwrap_or_default());
                }
            }
            None => {
                columns.push(String::new());
                columns.push(String::new());
                if self.profile.includes_altitude() {
                    columns.push(String::new());
                }
            }
        }

        let mut row = columns.join("\t");
        row.push('\n');
        row
    }

    /// Re-extract the `(latitude, longitude)` track from the datafile.
    ///
    /// Columns are located purely by counting tabs; rows written without a
    /// position (empty coordinate columns) contribute nothing.
    ///
    /// # Errors
    ///
    /// [`GroundStationError::FileUnavailable`] when the datafile cannot be
    /// read.
    pub fn extract_track(&self) -> Result<Vec<(f64, f64)>> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| GroundStationError::FileUnavailable {
                path: self.path.display().to_string(),
                source: e,
            })?;

        let mut track = Vec::new();
        for line in contents.lines() {
            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() <= LNG_COLUMN {
                continue;
            }
            let (Ok(lat), Ok(lng)) = (
                columns[LAT_COLUMN].parse::<f64>(),
                columns[LNG_COLUMN].parse::<f64>(),
            ) else {
                continue;
            };
            track.push((lat, lng));
        }
        Ok(track)
    }
}

/// Keep the column grid intact: the echo is wire data and may carry
/// anything, including the delimiters this format relies on.
fn sanitize_echo(echo: &str) -> String {
    echo.replace(['\t', '\n', '\r'], " ")
}
