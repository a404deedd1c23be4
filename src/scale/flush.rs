//! Debounce timer for unterminated scale output.
//!
//! Every chunk re-arms the deadline; if nothing arrives for [`FLUSH_QUIET`]
//! the reader forces the framer's remainder through the extractor. The timer
//! is plain data owned by the read task, so arming happens in the same step
//! as the buffer append and a disarmed timer can never fire.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Quiet period before a forced flush.
pub const FLUSH_QUIET: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct FlushTimer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for FlushTimer {
    fn default() -> Self {
        Self::new(FLUSH_QUIET)
    }
}

impl FlushTimer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one from now.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolve at the deadline; never resolves while disarmed.
    ///
    /// The timer stays armed; the caller disarms it once it has flushed.
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
