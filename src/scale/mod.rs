//! # Scale Weight Ingestion
//!
//! Bytes from a serial scale flow through:
//!
//! ```text
//! transport ──▶ ChunkDecoder ──▶ LineFramer ──▶ extract_weight ──▶ LabelStore
//!                                    ▲
//!                              FlushTimer (150 ms quiet)
//! ```
//!
//! - [`decoder`]: streaming charset decoding
//! - [`framer`]: newline splitting with a bounded rolling buffer
//! - [`flush`]: forces out unterminated frames
//! - [`extract`]: picks the weight token out of a line
//! - [`session`]: connection state machine and the read task

pub mod decoder;
pub mod extract;
pub mod flush;
pub mod framer;
pub mod session;

pub use decoder::{ChunkDecoder, encoding_for};
pub use extract::{WeightSample, extract_weight};
pub use flush::{FLUSH_QUIET, FlushTimer};
pub use framer::{Framed, LineFramer, MAX_BUFFER_CHARS};
pub use session::{ScaleInfo, ScaleSession};
