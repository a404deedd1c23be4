//! # IR Opcodes
//!
//! This module defines the intermediate representation for a label print job.
//! A [`Program`] is an ordered list of opcodes that can be inspected and
//! compared in tests, then compiled to TSPL text.
//!
//! ```text
//! LabelRecord + LabelSize → Program (inspectable) → Codegen → TSPL text
//! ```
//!
//! Coordinates inside ops are already in printer dots.

use crate::protocol::barcode::{QrErrorLevel, QrMode, Symbology};
use crate::protocol::commands::Direction;
use crate::protocol::text::{Font, Rotation};

/// IR opcodes, one per TSPL instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    // ========== Media Setup ==========
    /// Label width/height in millimeters.
    Size { width_mm: u32, height_mm: u32 },

    /// Inter-label gap in millimeters.
    Gap { gap_mm: u32 },

    /// Feed orientation.
    Direction(Direction),

    /// Clear the image buffer.
    Cls,

    // ========== Drawing ==========
    /// Bitmap font text.
    Text {
        x: u32,
        y: u32,
        font: Font,
        rotation: Rotation,
        scale: u8,
        content: String,
    },

    /// Linear barcode.
    Barcode {
        x: u32,
        y: u32,
        symbology: Symbology,
        height: u32,
        human_readable: bool,
        rotation: Rotation,
        narrow: u8,
        wide: u8,
        content: String,
    },

    /// QR code.
    QrCode {
        x: u32,
        y: u32,
        ecc: QrErrorLevel,
        cell_width: u8,
        mode: QrMode,
        rotation: Rotation,
        content: String,
    },

    /// Rectangle outline.
    Box {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        thickness: u32,
    },

    // ========== Job Control ==========
    /// Commit the buffer and print `copies` labels.
    Print { copies: u32 },
}

/// A sequence of IR ops forming a complete print job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Add an op to the program.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Add multiple ops to the program.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = Op>) {
        self.ops.extend(ops);
    }

    /// Get the number of ops in the program.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the program is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterate over ops.
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }

    /// Whether the program ends in a PRINT, i.e. will actually produce a label.
    pub fn is_committed(&self) -> bool {
        matches!(self.ops.last(), Some(Op::Print { .. }))
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
