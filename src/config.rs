//! # Configuration Module
//!
//! Handles loading and validating the session configuration.
//!
//! The primary format is TOML. Configurations written for earlier
//! deployments (a single line of whitespace-separated tokens) are still
//! accepted for any path without a `.toml` extension, so existing
//! `default.config` files keep working.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::telemetry::protocol::{GpsProfile, DEFAULT_COMMAND};

/// Session configuration, read once at startup and never mutated
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Datafile receiving decoded telemetry rows
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Command mailbox file, re-read every cycle
    #[serde(default = "default_command_file")]
    pub command_file: String,

    /// Delay between polling cycles in seconds
    #[serde(default = "default_poll_delay_s")]
    pub poll_delay_s: u64,

    /// Browser refresh interval for the track map in seconds (0 = never)
    #[serde(default)]
    pub map_refresh_delay_s: u64,

    /// Serial device of the radio modem
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate for the radio link
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Command sent when the mailbox holds nothing actionable
    #[serde(default = "default_command")]
    pub default_command: String,

    /// GPS segment profile: "short" or "long" (with altitude)
    #[serde(default = "default_gps_profile")]
    pub gps_profile: String,
}

// Default value functions
fn default_data_file() -> String { "flight.dat".to_string() }
fn default_command_file() -> String { "command.txt".to_string() }
fn default_poll_delay_s() -> u64 { 10 }
fn default_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_command() -> String { DEFAULT_COMMAND.to_string() }
fn default_gps_profile() -> String { "short".to_string() }

impl Config {
    /// Load configuration from a file.
    ///
    /// A `.toml` extension selects the TOML format; anything else is
    /// parsed as the legacy whitespace-token line.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsing fails, or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let config = if path.extension().map_or(false, |ext| ext == "toml") {
            toml::from_str(&contents)?
        } else {
            Self::parse_legacy(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse the legacy single-line token format:
    /// `datafile commandfile poll_delay map_delay port baud [default_command]`.
    ///
    /// A bare numeric port token is an old-style comport index and maps to
    /// `/dev/ttyS{n}`.
    fn parse_legacy(contents: &str) -> Result<Self> {
        let mut tokens = contents.split_whitespace();
        let mut next = |what: &str| {
            tokens
                .next()
                .map(str::to_string)
                .ok_or_else(|| config_err(&format!("legacy config is missing the {} token", what)))
        };

        let data_file = next("datafile")?;
        let command_file = next("commandfile")?;
        let poll_delay_s = parse_token(&next("poll delay")?, "poll delay")?;
        let map_refresh_delay_s = parse_token(&next("map delay")?, "map delay")?;
        let port_token = next("port")?;
        let baud_rate = parse_token(&next("baud rate")?, "baud rate")?;
        let default_command = tokens
            .next()
            .map(str::to_string)
            .unwrap_or_else(default_command);

        let port = if port_token.chars().all(|c| c.is_ascii_digit()) {
            format!("/dev/ttyS{}", port_token)
        } else {
            port_token
        };

        Ok(Self {
            data_file,
            command_file,
            poll_delay_s,
            map_refresh_delay_s,
            port,
            baud_rate,
            default_command,
            gps_profile: default_gps_profile(),
        })
    }

    /// The validated GPS segment profile
    pub fn profile(&self) -> GpsProfile {
        self.gps_profile.parse().unwrap_or_default()
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.data_file.is_empty() {
            return Err(config_err("data_file cannot be empty"));
        }

        if self.command_file.is_empty() {
            return Err(config_err("command_file cannot be empty"));
        }

        if self.port.is_empty() {
            return Err(config_err("serial port cannot be empty"));
        }

        if self.baud_rate == 0 {
            return Err(config_err("baud_rate must be greater than 0"));
        }

        if self.poll_delay_s == 0 || self.poll_delay_s > 3600 {
            return Err(config_err("poll_delay_s must be between 1 and 3600"));
        }

        if self.default_command.is_empty() {
            return Err(config_err("default_command cannot be empty"));
        }

        if let Err(e) = self.gps_profile.parse::<GpsProfile>() {
            return Err(config_err(&e));
        }

        Ok(())
    }
}

fn config_err(msg: &str) -> crate::error::GroundStationError {
    crate::error::GroundStationError::Config(toml::de::Error::custom(msg))
}

fn parse_token<T: std::str::FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| config_err(&format!("legacy config has an unreadable {} token", what)))
}
