//! # TSPL Setup and Job Commands
//!
//! Media geometry, print direction, image buffer control and job commit.
//!
//! ## Job Structure
//!
//! ```text
//! SIZE 100 mm,80 mm     ← media geometry
//! GAP 3 mm,0 mm         ← inter-label gap
//! DIRECTION 1           ← feed orientation
//! CLS                   ← clear image buffer
//! ... drawing ...
//! PRINT 1               ← commit buffer, one copy
//! ```
//!
//! Drawing instructions only fill the printer's image buffer; nothing leaves
//! the print head until `PRINT`.

/// Line terminator appended to every instruction on the wire.
pub const LINE_END: &str = "\n";

/// # Label Size (SIZE m mm,n mm)
///
/// Sets the label width and length in millimeters.
///
/// ## Example
///
/// ```
/// use tarazu::protocol::commands;
///
/// assert_eq!(commands::size(80, 100), "SIZE 80 mm,100 mm");
/// ```
#[inline]
pub fn size(width_mm: u32, height_mm: u32) -> String {
    format!("SIZE {} mm,{} mm", width_mm, height_mm)
}

/// # Gap (GAP m mm,n mm)
///
/// Distance between labels and the gap offset. The offset is always 0 for
/// die-cut stock.
#[inline]
pub fn gap(gap_mm: u32) -> String {
    format!("GAP {} mm,0 mm", gap_mm)
}

/// Feed orientation of the printout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Printout leaves the printer top edge first
    Forward = 0,
    /// Printout leaves the printer bottom edge first
    #[default]
    Reverse = 1,
}

/// # Print Direction (DIRECTION n)
#[inline]
pub fn direction(direction: Direction) -> String {
    format!("DIRECTION {}", direction as u8)
}

/// # Clear Image Buffer (CLS)
///
/// Must follow SIZE/GAP/DIRECTION and precede any drawing.
#[inline]
pub fn cls() -> String {
    "CLS".to_string()
}

/// # Rectangle Outline (BOX x1,y1,x2,y2,thickness)
///
/// Coordinates in dots; `thickness` is the line width in dots.
#[inline]
pub fn bordered_box(x1: u32, y1: u32, x2: u32, y2: u32, thickness: u32) -> String {
    format!("BOX {},{},{},{},{}", x1, y1, x2, y2, thickness)
}

/// # Print (PRINT m)
///
/// Prints the image buffer `copies` times. A zero count is raised to one.
#[inline]
pub fn print(copies: u32) -> String {
    format!("PRINT {}", copies.max(1))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(size(100, 80), "SIZE 100 mm,80 mm");
    }

    #[test]
    fn test_gap() {
        assert_eq!(gap(3), "GAP 3 mm,0 mm");
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(Direction::Forward), "DIRECTION 0");
        assert_eq!(direction(Direction::Reverse), "DIRECTION 1");
        assert_eq!(direction(Direction::default()), "DIRECTION 1");
    }

    #[test]
    fn test_cls() {
        assert_eq!(cls(), "CLS");
    }

    #[test]
    fn test_box() {
        assert_eq!(bordered_box(20, 200, 780, 350, 2), "BOX 20,200,780,350,2");
    }

    #[test]
    fn test_print_copies() {
        assert_eq!(print(1), "PRINT 1");
        assert_eq!(print(3), "PRINT 3");
        assert_eq!(print(0), "PRINT 1");
    }
}
