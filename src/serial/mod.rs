//! # Serial Communication Module
//!
//! Handles serial communication with the ground-station radio modem.
//!
//! This module handles:
//! - Opening the serial port at the configured baud rate (8N1, no flow
//!   control)
//! - Polling one cycle's downlink frame with a bounded wait
//! - Transmitting uplink command bytes
//! - Explicit port shutdown on session termination

pub mod port_trait;

use bytes::Bytes;
use tokio::time::{timeout, Duration};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

use self::port_trait::{SerialPortIO, TokioSerialPort};
use crate::error::{GroundStationError, Result};
use crate::telemetry::protocol::RawFrame;

/// Default radio modem baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// How long one polling cycle waits for downlink traffic.
///
/// The underlying read would otherwise block forever on a silent link; an
/// idle window simply yields an empty frame, which the decoder treats as
/// "no data received".
pub const POLL_WINDOW_MS: u64 = 1000;

/// Radio Link Handler
///
/// Manages the serial connection to the radio modem. Generic over
/// [`SerialPortIO`] so the poll/send paths can be exercised without
/// hardware.
pub struct RadioLink<P: SerialPortIO = TokioSerialPort> {
    /// Serial port handle
    port: P,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl<P: SerialPortIO> std::fmt::Debug for RadioLink<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioLink")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl RadioLink<TokioSerialPort> {
    /// Open the radio modem at `path` with the given baud rate.
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB0")
    /// * `baud` - Baud rate for the link
    ///
    /// # Returns
    ///
    /// * `Result<RadioLink>` - Connected serial port or error
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::Serial`] if the device cannot be
    /// opened or configured.
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let port = tokio_serial::new(path, baud)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GroundStationError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("Opened radio modem at {} ({} baud)", path, baud);
        Ok(Self {
            port: TokioSerialPort::new(port),
            device_path: path.to_string(),
        })
    }
}

impl<P: SerialPortIO> RadioLink<P> {
    /// Build a link over an already-open port (test seam)
    pub fn with_port(port: P, device_path: &str) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
        }
    }

    /// Poll the link for one cycle's frame.
    ///
    /// Waits up to [`POLL_WINDOW_MS`] for the first bytes; a silent link
    /// yields an empty frame, which is a normal outcome, not an error.
    ///
    /// # Arguments
    ///
    /// * `max_bytes` - Upper bound on the frame size read this cycle
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::Serial`] on a transport read failure.
    pub async fn poll(&mut self, max_bytes: usize) -> Result<RawFrame> {
        let mut buf = vec![0u8; max_bytes];

        match timeout(Duration::from_millis(POLL_WINDOW_MS), self.port.read(&mut buf)).await {
            Err(_) => {
                debug!("no downlink traffic within the poll window");
                Ok(Bytes::new())
            }
            Ok(Ok(n)) => {
                debug!("read {} bytes from {}", n, self.device_path);
                buf.truncate(n);
                Ok(Bytes::from(buf))
            }
            Ok(Err(e)) => Err(GroundStationError::Serial(format!(
                "read failed on {}: {}",
                self.device_path, e
            ))),
        }
    }

    /// Transmit uplink command bytes.
    ///
    /// # Arguments
    ///
    /// * `payload` - Complete command bytes, delimiter included
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of bytes written
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::Serial`] if the write or flush fails.
    pub async fn send(&mut self, payload: &[u8]) -> Result<usize> {
        self.port
            .write_all(payload)
            .await
            .map_err(|e| GroundStationError::Serial(format!("Failed to write command: {}", e)))?;

        self.port
            .flush()
            .await
            .map_err(|e| GroundStationError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent command ({} bytes)", payload.len());
        Ok(payload.len())
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Close the link.
    ///
    /// Dropping would release the descriptor anyway; the explicit form
    /// exists so session termination is visible in the operator log.
    pub fn close(self) {
        info!("Closed radio modem at {}", self.device_path);
    }
}
