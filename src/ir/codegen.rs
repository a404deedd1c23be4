//! # Code Generation
//!
//! Converts IR programs to TSPL text.

use super::ops::{Op, Program};
use crate::protocol::{barcode, commands, text};

impl Op {
    /// Render this op as a single TSPL instruction (no terminator).
    pub fn to_tspl(&self) -> String {
        match self {
            // ===== Media Setup =====
            Op::Size {
                width_mm,
                height_mm,
            } => commands::size(*width_mm, *height_mm),
            Op::Gap { gap_mm } => commands::gap(*gap_mm),
            Op::Direction(direction) => commands::direction(*direction),
            Op::Cls => commands::cls(),

            // ===== Drawing =====
            Op::Text {
                x,
                y,
                font,
                rotation,
                scale,
                content,
            } => text::text(*x, *y, *font, *rotation, *scale, content),
            Op::Barcode {
                x,
                y,
                symbology,
                height,
                human_readable,
                rotation,
                narrow,
                wide,
                content,
            } => barcode::barcode(
                *x,
                *y,
                *symbology,
                *height,
                *human_readable,
                *rotation,
                *narrow,
                *wide,
                content,
            ),
            Op::QrCode {
                x,
                y,
                ecc,
                cell_width,
                mode,
                rotation,
                content,
            } => barcode::qrcode(*x, *y, *ecc, *cell_width, *mode, *rotation, content),
            Op::Box {
                x1,
                y1,
                x2,
                y2,
                thickness,
            } => commands::bordered_box(*x1, *y1, *x2, *y2, *thickness),

            // ===== Job Control =====
            Op::Print { copies } => commands::print(*copies),
        }
    }
}

impl Program {
    /// Compile to TSPL instruction lines, in program order.
    pub fn to_lines(&self) -> Vec<String> {
        self.ops.iter().map(Op::to_tspl).collect()
    }

    /// Compile to the TSPL text sent to the printer. Every instruction,
    /// including the last, is newline-terminated.
    pub fn to_tspl(&self) -> String {
        let mut out = String::new();
        for op in &self.ops {
            out.push_str(&op.to_tspl());
            out.push_str(commands::LINE_END);
        }
        out
    }
}
