//! # Tarazu - Scale-to-Label Station Library
//!
//! Tarazu connects a serial weighing scale and a TSPL thermal label printer
//! to one shipping label. It provides:
//!
//! - **Weight ingestion**: streaming decode, line framing with a bounded
//!   buffer, a quiet-period flush for unterminated output, weight extraction
//! - **Label encoding**: a shipping label record rendered into a TSPL program
//!   through per-size layout tables
//! - **Sessions**: exclusive scale and printer connections with observable
//!   status and a diagnostic event stream
//! - **Transport**: Unix serial ports and an in-memory port pair
//!
//! ## Quick Start
//!
//! ```
//! use tarazu::label::{encode, LabelField, LabelRecord};
//! use tarazu::printer::LabelSize;
//! use tarazu::scale::{LineFramer, extract_weight};
//!
//! let mut framer = LineFramer::new();
//! let framed = framer.push("ST,GS,+  205 g\r\n");
//! let sample = extract_weight(&framed.lines[0]).unwrap();
//!
//! let mut record = LabelRecord::default();
//! record.set(LabelField::TrackingNumber, "04515000010732");
//! record.set(LabelField::Weight, sample.text);
//!
//! let tspl = encode(&record, LabelSize::Size100x80).to_tspl();
//! assert!(tspl.contains("WEIGHT: 205 g"));
//! # Ok::<(), tarazu::TarazuError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`scale`] | Scale session and the byte → weight pipeline |
//! | [`label`] | Label record, shared store, layouts, TSPL encoder |
//! | [`printer`] | Printer geometry, label sizes, printer session |
//! | [`protocol`] | TSPL command builders |
//! | [`ir`] | Inspectable command program and codegen |
//! | [`transport`] | Device backends |
//! | [`events`] | Session events and device status |
//! | [`logbook`] | Bounded diagnostic log |
//! | [`config`] | Station configuration file |
//! | [`server`] | HTTP control surface |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod events;
pub mod ir;
pub mod label;
pub mod logbook;
pub mod printer;
pub mod protocol;
pub mod scale;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use error::TarazuError;
pub use printer::{LabelSize, PrinterConfig};
pub use transport::SerialProvider;
