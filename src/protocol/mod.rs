//! # TSPL Protocol Implementation
//!
//! This module provides command builders for TSPL/TSPL2, the line-oriented
//! text protocol spoken by most desktop thermal label printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: Media setup and job control (SIZE, GAP, DIRECTION, CLS, BOX, PRINT)
//! - [`text`]: Bitmap font text placement (TEXT) and content quoting
//! - [`barcode`]: Linear barcodes (BARCODE) and QR codes (QRCODE)
//!
//! ## Usage Example
//!
//! ```
//! use tarazu::protocol::{barcode, commands, text};
//!
//! let mut lines = vec![
//!     commands::size(100, 80),
//!     commands::gap(3),
//!     commands::cls(),
//! ];
//! lines.push(text::text(30, 30, text::Font::Medium, text::Rotation::None, 1, "HELLO"));
//! lines.push(barcode::barcode(
//!     30, 80, barcode::Symbology::Code128, 80, true, text::Rotation::None, 2, 2, "0451",
//! ));
//! lines.push(commands::print(1));
//!
//! assert_eq!(lines[0], "SIZE 100 mm,80 mm");
//! ```
//!
//! Every builder returns exactly one instruction without its line terminator;
//! the program layer in [`crate::ir`] joins them.
//!
//! ## Coordinates
//!
//! All x/y values are printer dots (8 dots per mm at 203 DPI), origin at the
//! top-left corner of the label in the current DIRECTION.

pub mod barcode;
pub mod commands;
pub mod text;
