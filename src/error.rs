//! # Error Types
//!
//! This module defines error types used throughout the tarazu library.
//!
//! Faults are caught at the boundary of the session that owns the device and
//! turned into status transitions plus diagnostic events. These variants are
//! what those boundaries (and the CLI) see.

use thiserror::Error;

/// Main error type for tarazu operations
#[derive(Debug, Error)]
pub enum TarazuError {
    /// No serial capability on this platform, or no permission to use it
    #[error("Serial transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The device refused to open (permission denied, busy, bad settings)
    #[error("Failed to open {endpoint}: {reason}")]
    OpenFailed { endpoint: String, reason: String },

    /// An in-progress read failed
    #[error("Read fault: {0}")]
    ReadFault(String),

    /// A printer write failed
    #[error("Write fault: {0}")]
    WriteFault(String),

    /// Baud rate outside the supported set
    #[error("Unsupported baud rate: {0}")]
    InvalidBaudRate(u32),

    /// Label size string not recognised
    #[error("Unknown label size '{0}'")]
    InvalidLabelSize(String),

    /// Label field name not recognised
    #[error("Unknown label field '{0}'")]
    UnknownField(String),

    /// Operation requires an open device
    #[error("{0} is not connected")]
    NotConnected(&'static str),

    /// Operation requires a closed device
    #[error("{0} is already connected")]
    AlreadyConnected(&'static str),

    /// Label record failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Text could not be represented in the requested charset
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration file or flag problem
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, TarazuError>;
