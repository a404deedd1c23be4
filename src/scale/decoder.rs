//! Streaming byte → text decoding for the scale stream.
//!
//! A multi-byte character may be split across two reads; the `encoding_rs`
//! decoder keeps the partial sequence between calls. Malformed input is
//! replaced with U+FFFD rather than failing the session.

use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};

use crate::error::{Result, TarazuError};

/// Look up a WHATWG encoding label (`utf-8`, `windows-1256`, `iso-8859-1`, ...).
pub fn encoding_for(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| TarazuError::Config(format!("Unknown encoding '{}'", label)))
}

pub struct ChunkDecoder {
    decoder: Option<Decoder>,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self::new(UTF_8)
    }
}

impl ChunkDecoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            decoder: Some(encoding.new_decoder()),
        }
    }

    /// Decode one chunk. Returns an empty string once finished.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.run(bytes, false)
    }

    /// Release the decoder, returning text for any dangling partial sequence.
    pub fn finish(&mut self) -> String {
        let tail = self.run(&[], true);
        self.decoder = None;
        tail
    }

    pub fn is_finished(&self) -> bool {
        self.decoder.is_none()
    }

    fn run(&mut self, mut bytes: &[u8], last: bool) -> String {
        let Some(decoder) = self.decoder.as_mut() else {
            return String::new();
        };
        let mut out = String::new();
        loop {
            let needed = decoder
                .max_utf8_buffer_length(bytes.len())
                .unwrap_or(bytes.len() * 3 + 16);
            out.reserve(needed);
            let (result, read, _) = decoder.decode_to_string(bytes, &mut out, last);
            bytes = &bytes[read..];
            if let CoderResult::InputEmpty = result {
                return out;
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multibyte_character() {
        let mut decoder = ChunkDecoder::default();
        let bytes = "وزن 12".as_bytes();
        let first = decoder.decode(&bytes[..1]);
        let second = decoder.decode(&bytes[1..]);
        assert_eq!(first, "");
        assert_eq!(second, "وزن 12");
    }

    #[test]
    fn test_legacy_codepage() {
        let mut decoder = ChunkDecoder::new(encoding_for("windows-1256").unwrap());
        assert_eq!(decoder.decode(&[0xC7, b'1']), "ا1");
    }

    #[test]
    fn test_finish_flushes_partial_and_releases() {
        let mut decoder = ChunkDecoder::default();
        assert_eq!(decoder.decode(&[0xD9]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert!(decoder.is_finished());
        assert_eq!(decoder.decode(b"12"), "");
    }

    #[test]
    fn test_unknown_label() {
        assert!(matches!(encoding_for("klingon"), Err(TarazuError::Config(_))));
        assert_eq!(encoding_for(" UTF-8 ").unwrap(), UTF_8);
    }
}
