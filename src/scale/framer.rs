//! # Line Framer
//!
//! Turns an arbitrarily chunked text stream into lines. `\r\n`, `\n` and
//! `\r` all end a line; whatever follows the last terminator stays buffered
//! until more text arrives or the flush timer forces it out.
//!
//! ## Rolling Buffer
//!
//! The buffer never holds more than [`MAX_BUFFER_CHARS`] characters. When an
//! append pushes it past the cap, the oldest characters are dropped before
//! the buffer is split, so only the most recent window is ever framed.

/// Cap on buffered characters.
pub const MAX_BUFFER_CHARS: usize = 1000;

/// Result of one [`LineFramer::push`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Framed {
    /// Complete lines, in arrival order, without terminators.
    pub lines: Vec<String>,
    /// Characters discarded by the cap during this push.
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct LineFramer {
    buffer: String,
    cap: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_cap(MAX_BUFFER_CHARS)
    }

    /// Framer with a custom character cap (at least 1).
    pub fn with_cap(cap: usize) -> Self {
        Self {
            buffer: String::new(),
            cap: cap.max(1),
        }
    }

    /// Append a chunk and split off every complete line.
    pub fn push(&mut self, chunk: &str) -> Framed {
        self.buffer.push_str(chunk);
        let dropped = self.truncate_to_cap();

        let mut lines = Vec::new();
        let mut rest = self.buffer.as_str();
        while let Some(pos) = rest.find(['\r', '\n']) {
            lines.push(rest[..pos].to_string());
            let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
            rest = &rest[pos + skip..];
        }
        self.buffer = rest.to_string();

        Framed { lines, dropped }
    }

    /// The unterminated tail.
    pub fn remainder(&self) -> &str {
        &self.buffer
    }

    /// Take the unterminated tail, leaving the buffer empty.
    pub fn take_remainder(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn truncate_to_cap(&mut self) -> usize {
        let len = self.buffer.chars().count();
        if len <= self.cap {
            return 0;
        }
        let dropped = len - self.cap;
        let start = self
            .buffer
            .char_indices()
            .nth(dropped)
            .map_or(self.buffer.len(), |(i, _)| i);
        self.buffer.drain(..start);
        dropped
    }
}

// ============================================================================
// TESTS
// ============================================================================
