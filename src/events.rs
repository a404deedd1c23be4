//! # Session Events
//!
//! Sessions publish what they observe on a `tokio::sync::broadcast` channel.
//! Nothing here affects device behaviour: the diagnostic log, the CLI's
//! `watch` output and tests are all just subscribers.

use std::fmt;

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::scale::WeightSample;

/// Default capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Which device an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Scale,
    Printer,
}

impl Device {
    pub fn as_str(self) -> &'static str {
        match self {
            Device::Scale => "Scale",
            Device::Printer => "Printer",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection state of a device session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl DeviceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceStatus::Disconnected => "disconnected",
            DeviceStatus::Connecting => "connecting",
            DeviceStatus::Connected => "connected",
            DeviceStatus::Error => "error",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    /// Raw device traffic
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    StatusChanged { device: Device, status: DeviceStatus },
    /// Decoded text exactly as it arrived
    RawChunk { text: String },
    /// A complete, non-blank line (trimmed)
    Line { text: String },
    /// Unterminated text forced out by the flush timer
    BufferFlush { text: String },
    /// The rolling buffer cap discarded old characters
    BufferOverflow { dropped: usize },
    /// A line with no positive number in it
    ExtractionMiss { line: String },
    WeightUpdated { sample: WeightSample },
    PrintSucceeded { bytes: usize },
    PrintFailed { reason: String },
    Error { device: Device, message: String },
}

impl Event {
    pub fn severity(&self) -> Severity {
        match self {
            Event::StatusChanged { status, .. } => match status {
                DeviceStatus::Connected => Severity::Success,
                DeviceStatus::Error => Severity::Error,
                DeviceStatus::Disconnected | DeviceStatus::Connecting => Severity::Info,
            },
            Event::RawChunk { .. } | Event::ExtractionMiss { .. } => Severity::Data,
            Event::Line { .. } => Severity::Info,
            Event::BufferFlush { .. } | Event::BufferOverflow { .. } => Severity::Warning,
            Event::WeightUpdated { .. } | Event::PrintSucceeded { .. } => Severity::Success,
            Event::PrintFailed { .. } | Event::Error { .. } => Severity::Error,
        }
    }

    /// One-line human description, as shown in the diagnostic log.
    pub fn message(&self) -> String {
        match self {
            Event::StatusChanged { device, status } => match status {
                DeviceStatus::Connecting => format!("{} connecting...", device),
                DeviceStatus::Connected => format!("{} connected", device),
                DeviceStatus::Disconnected => format!("{} disconnected", device),
                DeviceStatus::Error => format!("{} in error state", device),
            },
            Event::RawChunk { text } => format!("Raw: \"{}\"", escape_line_breaks(text)),
            Event::Line { text } => format!("Line: \"{}\"", text),
            Event::BufferFlush { text } => format!("Buffer flush: \"{}\"", text),
            Event::BufferOverflow { dropped } => {
                format!("Buffer overflow: dropped {} oldest characters", dropped)
            }
            Event::ExtractionMiss { line } => format!("No weight in \"{}\"", line),
            Event::WeightUpdated { sample } => format!("Auto-fill weight: {}", sample.text),
            Event::PrintSucceeded { bytes } => format!("TSPL command sent ({} bytes)", bytes),
            Event::PrintFailed { reason } => format!("Print failed: {}", reason),
            Event::Error { device, message } => format!("{} error: {}", device, message),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

fn escape_line_breaks(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// Create the event channel shared by a station's sessions.
pub fn channel() -> broadcast::Sender<Event> {
    broadcast::channel(EVENT_CHANNEL_CAPACITY).0
}

/// Publish without caring whether anyone listens.
pub(crate) fn emit(events: &broadcast::Sender<Event>, event: Event) {
    let _ = events.send(event);
}

/// Status of one device, published on a `watch` channel and mirrored as
/// [`Event::StatusChanged`] whenever it actually changes.
#[derive(Debug)]
pub(crate) struct StatusPublisher {
    device: Device,
    tx: watch::Sender<DeviceStatus>,
    events: broadcast::Sender<Event>,
}

impl StatusPublisher {
    pub(crate) fn new(device: Device, events: broadcast::Sender<Event>) -> Self {
        Self {
            device,
            tx: watch::channel(DeviceStatus::Disconnected).0,
            events,
        }
    }

    pub(crate) fn get(&self) -> DeviceStatus {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<DeviceStatus> {
        self.tx.subscribe()
    }

    pub(crate) fn set(&self, status: DeviceStatus) {
        let previous = self.tx.send_replace(status);
        if previous != status {
            tracing::info!(device = %self.device, from = %previous, to = %status, "status changed");
            emit(
                &self.events,
                Event::StatusChanged {
                    device: self.device,
                    status,
                },
            );
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
    fn test_raw_chunk_escapes_line_breaks() {
        let event = Event::RawChunk {
            text: "12.5\r\n".to_string(),
        };
        assert_eq!(event.message(), r#"Raw: "12.5\r\n""#);
        assert_eq!(event.severity(), Severity::Data);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Event::BufferOverflow { dropped: 3 }.severity(), Severity::Warning);
        assert_eq!(
            Event::ExtractionMiss { line: "OL".into() }.severity(),
            Severity::Data
        );
        assert_eq!(
            Event::StatusChanged {
                device: Device::Scale,
                status: DeviceStatus::Connected
            }
            .severity(),
            Severity::Success
        );
        assert_eq!(
            Event::PrintFailed { reason: "x".into() }.severity(),
            Severity::Error
        );
    }

    #[test]
    fn test_status_message() {
        let event = Event::StatusChanged {
            device: Device::Printer,
            status: DeviceStatus::Disconnected,
        };
        assert_eq!(event.to_string(), "Printer disconnected");
    }

    #[test]
    fn test_json_is_tagged() {
        let json = serde_json::to_value(Event::PrintSucceeded { bytes: 42 }).unwrap();
        assert_eq!(json["type"], "printSucceeded");
        assert_eq!(json["bytes"], 42);
    }

    #[test]
    fn test_status_publisher_emits_on_change_only() {
        let events = channel();
        let mut rx = events.subscribe();
        let status = StatusPublisher::new(Device::Scale, events);
        let mut watcher = status.subscribe();

        status.set(DeviceStatus::Connecting);
        status.set(DeviceStatus::Connecting);
        status.set(DeviceStatus::Connected);

        assert_eq!(status.get(), DeviceStatus::Connected);
        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), DeviceStatus::Connected);

        let statuses: Vec<DeviceStatus> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| match event {
                Event::StatusChanged { status, .. } => status,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(statuses, vec![DeviceStatus::Connecting, DeviceStatus::Connected]);
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let events = channel();
        emit(&events, Event::Line { text: "1".into() });
    }
}
