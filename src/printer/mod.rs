//! # Printer Module
//!
//! This module provides printer-specific configuration and the printer
//! session that owns the write side of a label printer.
//!
//! ## Modules
//!
//! - [`config`]: Printer resolution and label stock sizes
//! - [`session`]: Exclusive, single-writer print job delivery

pub mod config;
pub mod session;

pub use config::{LABEL_GAP_MM, LabelSize, PrinterConfig, WidthClass};
pub use session::{PrinterInfo, PrinterSession, encode_payload};
