//! # TSPL Text Commands
//!
//! Places bitmap-font text into the image buffer.
//!
//! ## Internal Fonts
//!
//! | Font | Cell (dots) | Typical use |
//! |------|-------------|-------------|
//! | "1" | 8×12 | fine print |
//! | "2" | 12×20 | body |
//! | "3" | 16×24 | headings |
//! | "4" | 24×32 | emphasis |
//! | "5" | 32×48 | large numerals |
//!
//! ## Character Set
//!
//! The internal fonts only cover the printer's active code page. Content is
//! passed through as-is; scripts the printer has no glyphs for (Persian,
//! Arabic, CJK without a downloaded font) will print as substitution
//! characters. Such jobs belong on a rasterized print path, not here.

use std::borrow::Cow;

/// Built-in bitmap font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// "1": 8×12 dots
    Tiny,
    /// "2": 12×20 dots
    Small,
    /// "3": 16×24 dots
    Medium,
    /// "4": 24×32 dots
    Large,
    /// "5": 32×48 dots
    Huge,
}

impl Font {
    /// Font name as written inside the TEXT instruction
    pub fn as_str(self) -> &'static str {
        match self {
            Font::Tiny => "1",
            Font::Small => "2",
            Font::Medium => "3",
            Font::Large => "4",
            Font::Huge => "5",
        }
    }
}

/// Clockwise rotation of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Make `content` safe to place inside a quoted TSPL parameter.
///
/// TSPL has a single escape for the double quote, `\["]`. Line breaks would
/// terminate the instruction early, so they become spaces. Everything else
/// is passed through untouched.
pub fn quote(content: &str) -> Cow<'_, str> {
    if !content.contains(['"', '\r', '\n']) {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len() + 8);
    for ch in content.chars() {
        match ch {
            '"' => out.push_str("\\[\"]"),
            '\r' | '\n' => out.push(' '),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// # Text (TEXT x,y,"font",rotation,x-mul,y-mul,"content")
///
/// ## Example
///
/// ```
/// use tarazu::protocol::text::{text, Font, Rotation};
///
/// assert_eq!(
///     text(30, 30, Font::Medium, Rotation::None, 1, "ARSH EXPRESS"),
///     r#"TEXT 30,30,"3",0,1,1,"ARSH EXPRESS""#
/// );
/// ```
pub fn text(x: u32, y: u32, font: Font, rotation: Rotation, scale: u8, content: &str) -> String {
    let scale = scale.clamp(1, 10);
    format!(
        "TEXT {},{},\"{}\",{},{},{},\"{}\"",
        x,
        y,
        font.as_str(),
        rotation.degrees(),
        scale,
        scale,
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
    fn test_text_basic() {
        assert_eq!(
            text(400, 30, Font::Small, Rotation::None, 1, "1404-04-22"),
            r#"TEXT 400,30,"2",0,1,1,"1404-04-22""#
        );
    }

    #[test]
    fn test_text_rotation_and_scale() {
        assert_eq!(
            text(10, 20, Font::Large, Rotation::Deg90, 2, "X"),
            r#"TEXT 10,20,"4",90,2,2,"X""#
        );
    }

    #[test]
    fn test_text_scale_is_clamped() {
        assert!(text(0, 0, Font::Tiny, Rotation::None, 0, "a").contains(",1,1,"));
        assert!(text(0, 0, Font::Tiny, Rotation::None, 40, "a").contains(",10,10,"));
    }

    #[test]
    fn test_quote_passthrough_borrows() {
        assert!(matches!(quote("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_quote_escapes_double_quote() {
        assert_eq!(quote(r#"say "hi""#), r#"say \["]hi\["]"#);
    }

    #[test]
    fn test_quote_flattens_line_breaks() {
        assert_eq!(quote("a\r\nb\nc"), "a  b c");
    }

    #[test]
    fn test_non_latin_passes_through_verbatim() {
        let line = text(30, 220, Font::Small, Rotation::None, 1, "پیمان معینی");
        assert!(line.ends_with("\"پیمان معینی\""));
    }
}
