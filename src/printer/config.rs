//! # Printer Configuration
//!
//! This module defines the hardware geometry of the TSPL label printer and
//! the closed set of label stock it is loaded with.
//!
//! ## Supported Labels
//!
//! | Size | Width | Height | Width class |
//! |------|-------|--------|-------------|
//! | `80x100` | 80 mm | 100 mm | Narrow |
//! | `100x100` | 100 mm | 100 mm | Wide |
//! | `100x80` | 100 mm | 80 mm | Wide |
//!
//! ## Usage
//!
//! ```
//! use tarazu::printer::{LabelSize, PrinterConfig};
//!
//! let config = PrinterConfig::TSPL_203;
//! let size: LabelSize = "100x80".parse()?;
//! println!("Label is {} dots wide", config.mm_to_dots(size.width_mm() as f32));
//! # Ok::<(), tarazu::TarazuError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TarazuError;

/// # Printer Configuration
///
/// Defines the resolution of a TSPL thermal label printer.
///
/// ## Calculations
///
/// ```text
/// 203 DPI / 25.4 ≈ 8 dots per mm
///
/// Layout tables are written in millimeters and converted with the
/// fixed integer factor, so 3.75 mm → 30 dots.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer class name
    pub name: &'static str,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Fixed conversion factor used for every coordinate
    pub dots_per_mm: u16,
}

impl PrinterConfig {
    /// # Generic 203 DPI TSPL printer
    ///
    /// Covers the common desktop label printers (TSC, Xprinter, Gprinter)
    /// that accept TSPL/TSPL2 text programs over a serial line.
    pub const TSPL_203: Self = Self {
        name: "TSPL 203 DPI",
        dpi: 203,
        dots_per_mm: 8,
    };

    /// Convert millimeters to dots
    ///
    /// ## Example
    ///
    /// ```
    /// use tarazu::printer::PrinterConfig;
    ///
    /// assert_eq!(PrinterConfig::TSPL_203.mm_to_dots(97.5), 780);
    /// ```
    #[inline]
    pub fn mm_to_dots(&self, mm: f32) -> u32 {
        (mm * self.dots_per_mm as f32).round().max(0.0) as u32
    }

    /// Convert dots to millimeters
    #[inline]
    pub fn dots_to_mm(&self, dots: u32) -> f32 {
        dots as f32 / self.dots_per_mm as f32
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::TSPL_203
    }
}

// ============================================================================
// LABEL SIZES
// ============================================================================

/// Horizontal class of a label; selects placement presets such as the QR offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClass {
    /// 80 mm stock
    Narrow,
    /// 100 mm stock
    Wide,
}

/// Physical label stock loaded in the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelSize {
    /// 80 × 100 mm, standard thermal
    #[serde(rename = "80x100")]
    Size80x100,
    /// 100 × 100 mm, wide thermal
    #[serde(rename = "100x100")]
    Size100x100,
    /// 100 × 80 mm, wide short thermal
    #[default]
    #[serde(rename = "100x80")]
    Size100x80,
}

/// Gap between consecutive labels on the roll
pub const LABEL_GAP_MM: u32 = 3;

impl LabelSize {
    /// Every supported size, in menu order.
    pub const ALL: [LabelSize; 3] = [
        LabelSize::Size80x100,
        LabelSize::Size100x100,
        LabelSize::Size100x80,
    ];

    /// Label width in millimeters
    pub fn width_mm(self) -> u32 {
        match self {
            LabelSize::Size80x100 => 80,
            LabelSize::Size100x100 | LabelSize::Size100x80 => 100,
        }
    }

    /// Label height in millimeters
    pub fn height_mm(self) -> u32 {
        match self {
            LabelSize::Size100x80 => 80,
            LabelSize::Size80x100 | LabelSize::Size100x100 => 100,
        }
    }

    pub fn width_class(self) -> WidthClass {
        if self.width_mm() >= 100 {
            WidthClass::Wide
        } else {
            WidthClass::Narrow
        }
    }

    /// Short name as used in config files and the API (`"100x80"`).
    pub fn as_str(self) -> &'static str {
        match self {
            LabelSize::Size80x100 => "80x100",
            LabelSize::Size100x100 => "100x100",
            LabelSize::Size100x80 => "100x80",
        }
    }
}

impl fmt::Display for LabelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelSize {
    type Err = TarazuError;

    /// Accepts `"100x80"`, `"100X80"` and `"100*80"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('*', "x");
        LabelSize::ALL
            .into_iter()
            .find(|size| size.as_str() == normalized)
            .ok_or_else(|| TarazuError::InvalidLabelSize(s.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
