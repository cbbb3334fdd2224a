//! # Balloon GS
//!
//! Ground station for high-altitude balloon telemetry over a serial radio
//! link.
//!
//! Each polling cycle sleeps for the configured delay, reads one raw frame
//! from the radio modem, decodes it into sensor and position records,
//! appends a row to the datafile, refreshes the track map when a new
//! position landed, and transmits the next uplink command from the
//! operator's command mailbox. Writing the terminate keyword to the
//! mailbox is the normal way to end the session.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use balloon_gs::config::Config;
use balloon_gs::datalog::DataLog;
use balloon_gs::map;
use balloon_gs::serial::port_trait::SerialPortIO;
use balloon_gs::serial::RadioLink;
use balloon_gs::telemetry::frame::decode_frame;
use balloon_gs::telemetry::protocol::{RawFrame, MAX_FRAME_BYTES};
use balloon_gs::uplink::{CommandDirective, CommandSelector};

/// Configuration files tried when none is given on the command line
const DEFAULT_CONFIG_PATHS: &[&str] = &["balloon-gs.toml", "default.config"];

/// Main entry point for the ground station.
///
/// # Control Flow
///
/// 1. **Initialization** - set up logging, load and validate the session
///    configuration, open the radio modem.
/// 2. **Polling loop** - sleep, poll, decode, persist, refresh the map,
///    select and send the uplink command. Frame-level failures are logged
///    and the loop continues; nothing in the decoding engine ends the
///    session.
/// 3. **Shutdown** - a `Stop` directive from the command mailbox (or
///    Ctrl+C) breaks the loop; the port is closed explicitly.
///
/// # Errors
///
/// Returns an error only for startup failures: unreadable configuration or
/// a radio modem that cannot be opened.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("balloon-gs v{} starting...", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = resolve_config_path(&args)?;
    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;
    info!("Loaded parameters from {}", config_path);

    let mut link = RadioLink::open(&config.port, config.baud_rate)?;
    let datalog = DataLog::new(&config.data_file, config.profile());
    let selector = CommandSelector::new(&config.command_file, &config.default_command);

    info!(
        "Polling every {} seconds ({} GPS profile); write \"Stop\" to {} to end the session",
        config.poll_delay_s,
        config.profile(),
        config.command_file
    );

    loop {
        info!("Waiting for {} seconds", config.poll_delay_s);
        tokio::select! {
            _ = sleep(Duration::from_secs(config.poll_delay_s)) => {
                if run_cycle(&mut link, &datalog, &selector, &config).await {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!("Program terminating");
    link.close();
    Ok(())
}

/// Execute one polling cycle.
///
/// Returns `true` when the operator's command mailbox requested session
/// termination. Every failure inside the cycle is logged and absorbed; the
/// session only ends on an explicit directive.
async fn run_cycle<P: SerialPortIO>(
    link: &mut RadioLink<P>,
    datalog: &DataLog,
    selector: &CommandSelector,
    config: &Config,
) -> bool {
    // Poll the downlink; a transport hiccup decodes like a silent cycle
    let frame = match link.poll(MAX_FRAME_BYTES - 1).await {
        Ok(frame) => frame,
        Err(e) => {
            warn!("poll failed: {}", e);
            RawFrame::new()
        }
    };

    // Section failures are isolated inside the decoder
    let record = decode_frame(&frame, config.profile());

    // Persist, then refresh the map when a new position landed
    match datalog.append(&record) {
        Ok(true) if record.position_valid() => {
            if let Err(e) = map::write_map(
                datalog,
                Path::new(map::MAP_FILE),
                config.map_refresh_delay_s,
            ) {
                warn!("map refresh failed: {}", e);
            }
        }
        Ok(_) => {}
        Err(e) => warn!("datafile write failed: {}", e),
    }

    // Select and transmit this cycle's uplink command
    match selector.next_directive() {
        Ok(CommandDirective::Terminate) => {
            info!("Stop command received, ending session");
            return true;
        }
        Ok(CommandDirective::EnterSilent) => {
            info!("Silent mode: holding the uplink this cycle");
        }
        Ok(directive) => {
            if let Some(payload) = selector.payload(&directive) {
                info!("Sending command {:?}", String::from_utf8_lossy(&payload));
                if let Err(e) = link.send(&payload).await {
                    warn!("command transmission failed: {}", e);
                }
            }
        }
        Err(e) => warn!("command file unavailable: {}", e),
    }

    false
}

/// Resolve the configuration path from command-line arguments.
///
/// `-s <file>` selects an explicit file (and a bare path works too);
/// otherwise the default candidates are tried in order and the first one
/// that exists wins.
fn resolve_config_path(args: &[String]) -> Result<String> {
    match args.first().map(String::as_str) {
        Some("-s") => args
            .get(1)
            .cloned()
            .context("-s requires a configuration file path"),
        Some(path) => Ok(path.to_string()),
        None => {
            for candidate in DEFAULT_CONFIG_PATHS {
                if Path::new(candidate).exists() {
                    return Ok(candidate.to_string());
                }
            }
            anyhow::bail!(
                "no configuration found (tried {}); pass -s <file>",
                DEFAULT_CONFIG_PATHS.join(", ")
            )
        }
    }
}
