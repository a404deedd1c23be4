//! # Shipping Labels
//!
//! - [`record`]: the label record and its barcode/QR derivation rule
//! - [`store`]: the shared record both the operator and the scale write to
//! - [`layout`]: per-size placement tables
//! - [`encoder`]: record + size → TSPL program

pub mod encoder;
pub mod layout;
pub mod record;
pub mod store;

pub use encoder::{EncodeOptions, encode, encode_with};
pub use record::{DEFAULT_QR_BASE_URL, DerivedOverrides, LabelField, LabelRecord, parse_updates};
pub use store::LabelStore;
