//! # Diagnostic Log
//!
//! A bounded ring of the most recent session events, for the operator.
//! [`spawn_sink`] feeds it from the event channel and mirrors every entry
//! to `tracing`.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::events::{Event, Severity};

/// Entries kept by default.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now(),
            message: message.into(),
            severity,
        }
    }
}

impl From<&Event> for LogEntry {
    fn from(event: &Event) -> Self {
        LogEntry::new(event.message(), event.severity())
    }
}

#[derive(Debug, Clone)]
pub struct LogRing {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl LogRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full.
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub type SharedLog = Arc<RwLock<LogRing>>;

/// Record every event published on `events` until the channel closes.
pub fn spawn_sink(events: &broadcast::Sender<Event>, log: SharedLog) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            let entry = match rx.recv().await {
                Ok(event) => LogEntry::from(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => LogEntry::new(
                    format!("Log fell behind; {} events not recorded", missed),
                    Severity::Warning,
                ),
                Err(broadcast::error::RecvError::Closed) => break,
            };
            mirror(&entry);
            log.write().await.push(entry);
        }
    })
}

fn mirror(entry: &LogEntry) {
    match entry.severity {
        Severity::Error => tracing::error!(target: "tarazu::log", "{}", entry.message),
        Severity::Warning => tracing::warn!(target: "tarazu::log", "{}", entry.message),
        Severity::Info | Severity::Success => {
            tracing::info!(target: "tarazu::log", "{}", entry.message)
        }
        Severity::Data => tracing::debug!(target: "tarazu::log", "{}", entry.message),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    #[test]
    fn test_ring_keeps_last_entries() {
        let mut ring = LogRing::new(3);
        for i in 0..5 {
            ring.push(LogEntry::new(format!("m{}", i), Severity::Info));
        }
        let messages: Vec<String> = ring.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_default_capacity_is_fifty() {
        let mut ring = LogRing::default();
        for i in 0..60 {
            ring.push(LogEntry::new(i.to_string(), Severity::Data));
        }
        assert_eq!(ring.len(), 50);
        assert_eq!(ring.entries()[0].message, "10");
    }

    #[test]
    fn test_clear_and_unique_ids() {
        let mut ring = LogRing::new(4);
        ring.push(LogEntry::new("a", Severity::Info));
        ring.push(LogEntry::new("b", Severity::Info));
        let entries = ring.entries();
        assert_ne!(entries[0].id, entries[1].id);
        ring.clear();
        assert!(ring.is_empty());
    }

    #[tokio::test]
    async fn test_sink_records_events() {
        let events = events::channel();
        let log: SharedLog = Arc::new(RwLock::new(LogRing::default()));
        let sink = spawn_sink(&events, log.clone());

        events
            .send(Event::PrintFailed {
                reason: "paper out".into(),
            })
            .unwrap();
        drop(events);
        sink.await.unwrap();

        let entries = log.read().await.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Print failed: paper out");
        assert_eq!(entries[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_sink_notes_lag() {
        let (events, _) = broadcast::channel(2);
        let log: SharedLog = Arc::new(RwLock::new(LogRing::default()));

        // The sink task does not run until the test yields, so it misses
        // three of the five events.
        let sink = spawn_sink(&events, log.clone());
        for i in 0..5 {
            events.send(Event::BufferOverflow { dropped: i }).unwrap();
        }
        drop(events);
        sink.await.unwrap();

        let entries = log.read().await.entries();
        assert!(entries[0].message.contains("not recorded"));
        assert_eq!(entries[0].severity, Severity::Warning);
        assert_eq!(entries.len(), 3);
    }
}
