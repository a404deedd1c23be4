//! # Scale Session
//!
//! Owns one scale transport and the task that reads it.
//!
//! ## State Machine
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──open ok──▶ Connected
//!      ▲                        │                      │
//!      │                     open fails            read fault
//!      │                        ▼                      ▼
//!      └──────disconnect───── Error ◀──────────────────┘
//! ```
//!
//! `Error` ends one attempt, not the session: `connect` may be called again.
//!
//! ## Read Task
//!
//! A single task waits on three things at once: a stop signal, the flush
//! deadline and the next read. Chunk handling (decode, frame, re-arm the
//! flush timer, extract) runs to completion inside the task before the next
//! wait, so a forced flush can never see bytes a line split already consumed.
//!
//! ## Disconnect Order
//!
//! 1. Signal the read task to stop
//! 2. Await the task (it disarms the flush timer on the way out)
//! 3. Release the stream decoder
//! 4. Close the transport
//!
//! Failures in any step are logged and reported as events; the session
//! always ends up `Disconnected`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::decoder::ChunkDecoder;
use super::extract::extract_weight;
use super::flush::{FLUSH_QUIET, FlushTimer};
use super::framer::LineFramer;
use crate::error::{Result, TarazuError};
use crate::events::{Device, DeviceStatus, Event, StatusPublisher, emit};
use crate::label::{LabelField, LabelStore};
use crate::transport::{BaudRate, PortProvider, Transport};

/// Bytes requested per read.
pub const READ_CHUNK_SIZE: usize = 256;

/// Snapshot of a session for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleInfo {
    pub status: DeviceStatus,
    pub endpoint: Option<String>,
    pub baud_rate: BaudRate,
    pub encoding: &'static str,
}

struct Running {
    endpoint: String,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Option<ReaderParts>>,
}

/// Resources a stopped read task hands back for orderly release.
struct ReaderParts {
    transport: Box<dyn Transport>,
    decoder: ChunkDecoder,
}

struct Settings {
    baud: BaudRate,
    encoding: &'static Encoding,
    running: Option<Running>,
}

pub struct ScaleSession {
    provider: Arc<dyn PortProvider>,
    store: Arc<LabelStore>,
    events: broadcast::Sender<Event>,
    status: Arc<StatusPublisher>,
    quiet: Duration,
    settings: Mutex<Settings>,
}

impl ScaleSession {
    pub fn new(
        provider: Arc<dyn PortProvider>,
        store: Arc<LabelStore>,
        events: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            provider,
            store,
            status: Arc::new(StatusPublisher::new(Device::Scale, events.clone())),
            events,
            quiet: FLUSH_QUIET,
            settings: Mutex::new(Settings {
                baud: BaudRate::default(),
                encoding: UTF_8,
                running: None,
            }),
        }
    }

    pub fn with_baud_rate(mut self, baud: BaudRate) -> Self {
        self.settings.get_mut().baud = baud;
        self
    }

    /// Charset of the incoming byte stream.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.settings.get_mut().encoding = encoding;
        self
    }

    /// Override the flush quiet period.
    pub fn with_flush_quiet(mut self, quiet: Duration) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn status(&self) -> DeviceStatus {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<DeviceStatus> {
        self.status.subscribe()
    }

    /// Current status and settings. A read task that has already ended is
    /// reaped first, so the endpoint is only reported while it is open.
    pub async fn info(&self) -> ScaleInfo {
        let mut settings = self.settings.lock().await;
        self.reap(&mut settings).await;
        ScaleInfo {
            status: self.status.get(),
            endpoint: settings.running.as_ref().map(|r| r.endpoint.clone()),
            baud_rate: settings.baud,
            encoding: settings.encoding.name(),
        }
    }

    /// Change the baud rate used by the next `connect`.
    ///
    /// Fails with [`TarazuError::AlreadyConnected`] while a port is open.
    pub async fn set_baud_rate(&self, baud: BaudRate) -> Result<()> {
        let mut settings = self.settings.lock().await;
        self.reap(&mut settings).await;
        if settings.running.is_some() {
            return Err(TarazuError::AlreadyConnected("Scale"));
        }
        settings.baud = baud;
        Ok(())
    }

    /// Open `endpoint` and start reading.
    pub async fn connect(&self, endpoint: &str) -> Result<()> {
        let mut settings = self.settings.lock().await;
        self.reap(&mut settings).await;
        if settings.running.is_some() {
            return Err(TarazuError::AlreadyConnected("Scale"));
        }

        let baud = settings.baud;
        self.status.set(DeviceStatus::Connecting);
        info!(endpoint, baud = baud.get(), "opening scale");

        let transport = match self.provider.open(endpoint, baud).await {
            Ok(transport) => transport,
            Err(e) => {
                warn!(endpoint, error = %e, "scale connection failed");
                emit(
                    &self.events,
                    Event::Error {
                        device: Device::Scale,
                        message: format!("Connection failed: {}", e),
                    },
                );
                self.status.set(DeviceStatus::Error);
                return Err(e);
            }
        };

        let reader = ReadLoop {
            transport,
            decoder: ChunkDecoder::new(settings.encoding),
            framer: LineFramer::new(),
            flush: FlushTimer::new(self.quiet),
            store: self.store.clone(),
            events: self.events.clone(),
        };
        let (stop_tx, stop_rx) = oneshot::channel();

        // Connected is published before the task starts so a fault
        // transition from the task always lands last.
        self.status.set(DeviceStatus::Connected);
        let task = tokio::spawn(reader.run(stop_rx, self.status.clone()));

        settings.running = Some(Running {
            endpoint: endpoint.to_string(),
            stop: stop_tx,
            task,
        });
        Ok(())
    }

    /// Stop reading and close the port. Always ends `Disconnected`.
    pub async fn disconnect(&self) -> Result<()> {
        let mut settings = self.settings.lock().await;
        let Some(running) = settings.running.take() else {
            self.status.set(DeviceStatus::Disconnected);
            return Ok(());
        };

        // (a) signal, (b) await
        let _ = running.stop.send(());
        let parts = match running.task.await {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "scale read task ended abnormally");
                self.report(format!("Read task failed: {}", e));
                None
            }
        };

        // (c) decoder, (d) transport
        if let Some(parts) = parts {
            release(parts, &self.events).await;
        }

        self.status.set(DeviceStatus::Disconnected);
        info!(endpoint = %running.endpoint, "scale disconnected");
        Ok(())
    }

    /// Collect a read task that has already wound itself down.
    async fn reap(&self, settings: &mut Settings) {
        let ended = settings
            .running
            .as_ref()
            .is_some_and(|r| r.task.is_finished() || self.status.get() != DeviceStatus::Connected);
        if !ended {
            return;
        }
        if let Some(running) = settings.running.take() {
            match running.task.await {
                Ok(Some(parts)) => release(parts, &self.events).await,
                Ok(None) => {}
                Err(e) => warn!(error = %e, "scale read task ended abnormally"),
            }
        }
    }

    fn report(&self, message: String) {
        emit(
            &self.events,
            Event::Error {
                device: Device::Scale,
                message,
            },
        );
    }
}

async fn release(parts: ReaderParts, events: &broadcast::Sender<Event>) {
    let ReaderParts {
        mut transport,
        mut decoder,
    } = parts;

    let tail = decoder.finish();
    if !tail.is_empty() {
        debug!(discarded = %tail.escape_debug(), "dropping undecoded tail");
    }

    if let Err(e) = transport.close().await {
        warn!(endpoint = transport.endpoint(), error = %e, "error closing scale port");
        emit(
            events,
            Event::Error {
                device: Device::Scale,
                message: format!("Error closing port: {}", e),
            },
        );
    }
}

// ============================================================================
// READ TASK
// ============================================================================

enum Exit {
    Stopped,
    EndOfStream,
    Fault(io::Error),
}

struct ReadLoop {
    transport: Box<dyn Transport>,
    decoder: ChunkDecoder,
    framer: LineFramer,
    flush: FlushTimer,
    store: Arc<LabelStore>,
    events: broadcast::Sender<Event>,
}

impl ReadLoop {
    async fn run(
        mut self,
        mut stop: oneshot::Receiver<()>,
        status: Arc<StatusPublisher>,
    ) -> Option<ReaderParts> {
        let mut buf = [0u8; READ_CHUNK_SIZE];

        let exit = loop {
            tokio::select! {
                biased;
                _ = &mut stop => break Exit::Stopped,
                _ = self.flush.expired() => self.flush_remainder().await,
                read = self.transport.read(&mut buf) => match read {
                    Ok(0) => break Exit::EndOfStream,
                    Ok(n) => self.on_bytes(&buf[..n]).await,
                    Err(e) => break Exit::Fault(e),
                },
            }
        };
        self.flush.disarm();

        let parts = ReaderParts {
            transport: self.transport,
            decoder: self.decoder,
        };

        match exit {
            Exit::Stopped => Some(parts),
            Exit::EndOfStream => {
                info!(endpoint = parts.transport.endpoint(), "scale closed the stream");
                release(parts, &self.events).await;
                status.set(DeviceStatus::Disconnected);
                None
            }
            Exit::Fault(e) => {
                warn!(endpoint = parts.transport.endpoint(), error = %e, "scale read fault");
                emit(
                    &self.events,
                    Event::Error {
                        device: Device::Scale,
                        message: TarazuError::ReadFault(e.to_string()).to_string(),
                    },
                );
                release(parts, &self.events).await;
                status.set(DeviceStatus::Error);
                None
            }
        }
    }

    async fn on_bytes(&mut self, bytes: &[u8]) {
        self.flush.arm();

        let text = self.decoder.decode(bytes);
        if text.is_empty() {
            return;
        }
        trace!(chunk = %text.escape_debug(), "scale chunk");
        emit(&self.events, Event::RawChunk { text: text.clone() });

        let framed = self.framer.push(&text);
        if framed.dropped > 0 {
            warn!(dropped = framed.dropped, "scale buffer overflow");
            emit(
                &self.events,
                Event::BufferOverflow {
                    dropped: framed.dropped,
                },
            );
        }
        for line in framed.lines {
            self.process_line(&line).await;
        }
    }

    async fn flush_remainder(&mut self) {
        self.flush.disarm();
        let remainder = self.framer.take_remainder();
        if remainder.trim().is_empty() {
            return;
        }
        warn!(remainder = %remainder, "flushing unterminated scale output");
        emit(
            &self.events,
            Event::BufferFlush {
                text: remainder.clone(),
            },
        );
        self.process_line(&remainder).await;
    }

    async fn process_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        emit(
            &self.events,
            Event::Line {
                text: line.to_string(),
            },
        );

        match extract_weight(line) {
            Some(sample) => {
                if self.store.set(LabelField::Weight, sample.text.clone()).await {
                    info!(weight = %sample.text, "weight updated");
                    emit(&self.events, Event::WeightUpdated { sample });
                } else {
                    trace!(weight = %sample.text, "weight unchanged");
                }
            }
            None => {
                debug!(line, "no weight in line");
                emit(
                    &self.events,
                    Event::ExtractionMiss {
                        line: line.to_string(),
                    },
                );
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
