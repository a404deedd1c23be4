//! # Device Transport Layer
//!
//! This module provides the byte pipes sessions talk through.
//!
//! ## Available Transports
//!
//! - [`serial`]: Unix TTY devices (USB-serial adapters, on-board UARTs, RFCOMM)
//! - [`memory`]: In-process port pairs for tests and simulation
//!
//! A [`PortProvider`] enumerates and opens endpoints; the resulting
//! [`Transport`] is owned by exactly one session until it is closed.

pub mod memory;
pub mod serial;

use std::fmt;
use std::io;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TarazuError};

pub use memory::{MemoryPeer, MemoryProvider, MemoryTransport};
pub use serial::{SerialProvider, SerialTransport};

// ============================================================================
// BAUD RATE
// ============================================================================

/// Baud rates a session may be configured with.
pub const SUPPORTED_BAUD_RATES: [u32; 7] = [1200, 2400, 4800, 9600, 19200, 38400, 115200];

/// A baud rate from [`SUPPORTED_BAUD_RATES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BaudRate(u32);

impl BaudRate {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        Self(9600)
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = TarazuError;

    fn try_from(value: u32) -> Result<Self> {
        if SUPPORTED_BAUD_RATES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(TarazuError::InvalidBaudRate(value))
        }
    }
}

impl From<BaudRate> for u32 {
    fn from(value: BaudRate) -> Self {
        value.0
    }
}

impl FromStr for BaudRate {
    type Err = TarazuError;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| TarazuError::Config(format!("Invalid baud rate: {}", s)))?;
        Self::try_from(value)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// An endpoint a provider can open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    /// Path or identifier passed to [`PortProvider::open`]
    pub path: String,
    /// Short description (driver family)
    pub kind: String,
}

/// An open, exclusively owned device connection.
#[async_trait]
pub trait Transport: Send {
    /// Endpoint this transport was opened on.
    fn endpoint(&self) -> &str;

    /// Read whatever bytes are available, waiting for at least one.
    ///
    /// `Ok(0)` means the far end closed the stream. Must be cancel safe: a
    /// dropped read future must not lose bytes that later reads would see.
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write the whole payload and flush it.
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Release the device. Further reads/writes fail.
    async fn close(&mut self) -> io::Result<()>;
}

/// Discovers and opens endpoints.
#[async_trait]
pub trait PortProvider: Send + Sync {
    /// Whether this platform/process can use the transport at all.
    fn available(&self) -> bool;

    /// Endpoints that can currently be opened.
    async fn list_ports(&self) -> Result<Vec<PortInfo>>;

    /// Open `endpoint` at `baud`.
    async fn open(&self, endpoint: &str, baud: BaudRate) -> Result<Box<dyn Transport>>;
}

// ============================================================================
// TESTS
// ============================================================================
