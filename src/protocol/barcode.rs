//! # TSPL Barcode Commands
//!
//! Linear barcodes and QR codes are rendered by the printer firmware; this
//! module only builds the instructions.
//!
//! ## 1D Barcode
//!
//! ```text
//! BARCODE x,y,"code type",height,human readable,rotation,narrow,wide,"content"
//! ```
//!
//! ## QR Code
//!
//! ```text
//! QRCODE x,y,ECC level,cell width,mode,rotation,model,mask,"content"
//! ```
//!
//! | ECC | Recovery |
//! |-----|----------|
//! | L | 7% |
//! | M | 15% |
//! | Q | 25% |
//! | H | 30% |

use super::text::{Rotation, quote};

// ============================================================================
// 1D BARCODE
// ============================================================================

/// Linear barcode symbology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    /// Code 128, automatic subset switching
    Code128,
    /// Code 39 full ASCII
    Code39,
    /// Code 93
    Code93,
    /// EAN-13 (12 digits + check digit)
    Ean13,
}

impl Symbology {
    pub fn as_str(self) -> &'static str {
        match self {
            Symbology::Code128 => "128",
            Symbology::Code39 => "39",
            Symbology::Code93 => "93",
            Symbology::Ean13 => "EAN13",
        }
    }
}

/// # Barcode (BARCODE)
///
/// - `height`: bar height in dots
/// - `human_readable`: print the content below the bars
/// - `narrow`/`wide`: module widths in dots
///
/// ## Example
///
/// ```
/// use tarazu::protocol::barcode::{barcode, Symbology};
/// use tarazu::protocol::text::Rotation;
///
/// assert_eq!(
///     barcode(30, 80, Symbology::Code128, 80, true, Rotation::None, 2, 2, "04515000010732"),
///     r#"BARCODE 30,80,"128",80,1,0,2,2,"04515000010732""#
/// );
/// ```
#[allow(clippy::too_many_arguments)]
pub fn barcode(
    x: u32,
    y: u32,
    symbology: Symbology,
    height: u32,
    human_readable: bool,
    rotation: Rotation,
    narrow: u8,
    wide: u8,
    content: &str,
) -> String {
    format!(
        "BARCODE {},{},\"{}\",{},{},{},{},{},\"{}\"",
        x,
        y,
        symbology.as_str(),
        height,
        u8::from(human_readable),
        rotation.degrees(),
        narrow,
        wide,
        quote(content)
    )
}

// ============================================================================
// QR CODE
// ============================================================================

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrErrorLevel {
    #[default]
    L,
    M,
    Q,
    H,
}

impl QrErrorLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            QrErrorLevel::L => "L",
            QrErrorLevel::M => "M",
            QrErrorLevel::Q => "Q",
            QrErrorLevel::H => "H",
        }
    }
}

/// QR data encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrMode {
    /// Printer picks the encodation
    #[default]
    Auto,
    /// Caller-specified encodation
    Manual,
}

impl QrMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QrMode::Auto => "A",
            QrMode::Manual => "M",
        }
    }
}

/// Fixed QR symbol model and mask (model 2, mask pattern 7).
const QR_MODEL: &str = "M2";
const QR_MASK: &str = "S7";

/// # QR Code (QRCODE)
///
/// `cell_width` is the module size in dots (1-10).
///
/// ## Example
///
/// ```
/// use tarazu::protocol::barcode::{qrcode, QrErrorLevel, QrMode};
/// use tarazu::protocol::text::Rotation;
///
/// assert_eq!(
///     qrcode(550, 650, QrErrorLevel::L, 5, QrMode::Auto, Rotation::None, "https://x"),
///     r#"QRCODE 550,650,L,5,A,0,M2,S7,"https://x""#
/// );
/// ```
pub fn qrcode(
    x: u32,
    y: u32,
    ecc: QrErrorLevel,
    cell_width: u8,
    mode: QrMode,
    rotation: Rotation,
    content: &str,
) -> String {
    format!(
        "QRCODE {},{},{},{},{},{},{},{},\"{}\"",
        x,
        y,
        ecc.as_str(),
        cell_width.clamp(1, 10),
        mode.as_str(),
        rotation.degrees(),
        QR_MODEL,
        QR_MASK,
        quote(content)
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barcode_without_hri() {
        assert_eq!(
            barcode(0, 0, Symbology::Code39, 50, false, Rotation::None, 1, 3, "ABC"),
            r#"BARCODE 0,0,"39",50,0,0,1,3,"ABC""#
        );
    }

    #[test]
    fn test_barcode_rotation() {
        let line = barcode(5, 5, Symbology::Ean13, 60, true, Rotation::Deg180, 2, 2, "123");
        assert_eq!(line, r#"BARCODE 5,5,"EAN13",60,1,180,2,2,"123""#);
    }

    #[test]
    fn test_qrcode_levels() {
        let line = qrcode(1, 2, QrErrorLevel::H, 4, QrMode::Manual, Rotation::None, "x");
        assert_eq!(line, r#"QRCODE 1,2,H,4,M,0,M2,S7,"x""#);
    }

    #[test]
    fn test_qrcode_cell_width_clamped() {
        let line = qrcode(0, 0, QrErrorLevel::L, 0, QrMode::Auto, Rotation::None, "x");
        assert!(line.starts_with("QRCODE 0,0,L,1,"));
    }

    #[test]
    fn test_qrcode_content_is_quoted() {
        let line = qrcode(0, 0, QrErrorLevel::M, 5, QrMode::Auto, Rotation::None, "a\"b");
        assert!(line.ends_with(r#""a\["]b""#));
    }
}
