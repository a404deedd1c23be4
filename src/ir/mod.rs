//! # Intermediate Representation (IR)
//!
//! This module provides the IR layer for label printing. The IR is the
//! "bytecode" that sits between a label layout and raw TSPL text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────┐
//! │   Encoder   │ ──► │     IR      │ ──► │ Codegen  │
//! │  (layout)   │     │  (Vec<Op>)  │     │  (TSPL)  │
//! └─────────────┘     └─────────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tarazu::ir::{Op, Program};
//!
//! let mut program = Program::new();
//! program.push(Op::Size { width_mm: 100, height_mm: 80 });
//! program.push(Op::Cls);
//! program.push(Op::Print { copies: 1 });
//!
//! assert_eq!(program.to_tspl(), "SIZE 100 mm,80 mm\nCLS\nPRINT 1\n");
//! ```

mod codegen;
mod ops;

// Re-export the ops types (codegen adds methods to Program via impl)
pub use ops::*;
