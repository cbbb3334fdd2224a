//! # Track Map Generation
//!
//! Renders the persisted flight track as a static HTML page. The page is
//! fully self-contained apart from the Leaflet/OpenStreetMap assets: the
//! coordinate arrays are embedded as JS literals, and an optional
//! `<meta http-equiv="refresh">` makes an open browser tab follow the
//! flight as new rows are appended.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::datalog::DataLog;
use crate::error::Result;

/// Output file name for the track map
pub const MAP_FILE: &str = "GPSmap.html";

/// Map center used before the first fix arrives (the launch site)
const DEFAULT_CENTER: (f64, f64) = (42.1653, -83.4454);

/// Regenerate the track map from the datalog.
///
/// The output file is truncated and rewritten in full each time.
///
/// # Arguments
///
/// * `log` - Datalog to extract the `(lat, lng)` track from
/// * `output` - Path of the HTML file to (re)write
/// * `refresh_delay_s` - Browser auto-refresh interval; `0` disables it
pub fn write_map(log: &DataLog, output: &Path, refresh_delay_s: u64) -> Result<()> {
    let track = log.extract_track()?;
    let html = render(&track, refresh_delay_s)?;
    fs::write(output, html)?;

    info!("track map written to {}", output.display());
    Ok(())
}

/// Render the map HTML for a track.
///
/// # Errors
///
/// Only if JS array serialization fails, which would indicate a broken
/// float value in the track.
pub fn render(track: &[(f64, f64)], refresh_delay_s: u64) -> Result<String> {
    let lats: Vec<f64> = track.iter().map(|p| p.0).collect();
    let lngs: Vec<f64> = track.iter().map(|p| p.1).collect();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta name=\"viewport\" content=\"initial-scale=1.0, user-scalable=no\" />\n");
    if refresh_delay_s != 0 {
        html.push_str(&format!(
            "<meta http-equiv=\"refresh\" content=\"{}\" />\n",
            refresh_delay_s
        ));
    }
    html.push_str(
        "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\" />\n\
         <script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n\
         <style>html, body, #map { height: 100%; margin: 0; padding: 0 }</style>\n\
         </head>\n<body>\n<div id=\"map\"></div>\n<script>\n",
    );

    html.push_str(&format!("var lats = {};\n", serde_json::to_string(&lats)?));
    html.push_str(&format!("var lngs = {};\n", serde_json::to_string(&lngs)?));

    html.push_str(
        "var map = L.map('map');\n\
         L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', { maxZoom: 19 }).addTo(map);\n\
         var track = [];\n\
         for (var i = 0; i < lats.length; i++) { track.push([lats[i], lngs[i]]); }\n\
         if (track.length > 0) {\n\
             L.polyline(track).addTo(map);\n\
             L.marker(track[track.length - 1]).addTo(map);\n\
             map.setView(track[track.length - 1], 10);\n\
         } else {\n",
    );
    html.push_str(&format!(
        "    map.setView([{}, {}], 8);\n",
        DEFAULT_CENTER.0, DEFAULT_CENTER.1
    ));
    html.push_str("}\n</script>\n</body>\n</html>\n");

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::protocol::{GpsFix, GpsProfile, TelemetryRecord};
    use tempfile::tempdir;

    #[test]
    fn test_render_embeds_track_arrays() {
        let html = render(&[(42.1653, -83.4454), (42.2, -83.5)], 0).unwrap();

        assert!(html.contains("var lats = [42.1653,42.2];"));
        assert!(html.contains("var lngs = [-83.4454,-83.5];"));
    }

    #[test]
    fn test_render_empty_track_uses_default_center() {
        let html = render(&[], 0).unwrap();

        assert!(html.contains("var lats = [];"));
        assert!(html.contains("map.setView([42.1653, -83.4454], 8)"));
    }

    #[test]
    fn test_zero_delay_means_no_refresh() {
        let html = render(&[], 0).unwrap();
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_nonzero_delay_sets_refresh() {
        let html = render(&[], 30).unwrap();
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"30\" />"));
    }

    #[test]
    fn test_write_map_from_datalog() {
        let dir = tempdir().unwrap();
        let log = DataLog::new(dir.path().join("flight.dat"), GpsProfile::Short);
        log.append(&TelemetryRecord {
            echo: String::new(),
            flight_time: None,
            sensors: None,
            position: Some(GpsFix {
                latitude: 42.1653,
                longitude: -83.4454,
                altitude: None,
            }),
        })
        .unwrap();

        let output = dir.path().join(MAP_FILE);
        write_map(&log, &output, 15).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("42.1653"));
        assert!(html.contains("content=\"15\""));
    }

    #[test]
    fn test_write_map_truncates_previous_output() {
        let dir = tempdir().unwrap();
        let log = DataLog::new(dir.path().join("flight.dat"), GpsProfile::Short);
        log.append(&TelemetryRecord {
            echo: String::new(),
            flight_time: None,
            sensors: None,
            position: Some(GpsFix {
                latitude: 10.0,
                longitude: 20.0,
                altitude: None,
            }),
        })
        .unwrap();

        let output = dir.path().join(MAP_FILE);
        fs::write(&output, "stale content that must disappear").unwrap();
        write_map(&log, &output, 0).unwrap();

        let html = fs::read_to_string(&output).unwrap();
        assert!(!html.contains("stale content"));
        assert!(html.contains("var lats = [10.0];"));
    }
}
