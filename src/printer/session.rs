//! # Printer Session
//!
//! Owns the write side of one label printer. A single writer task holds the
//! transport and takes jobs from a queue one at a time, so two print
//! requests can never interleave their bytes on the wire.
//!
//! A failed write is reported and the transport stays open; the caller may
//! send the same job again.

use std::io;
use std::sync::Arc;

use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::config::LabelSize;
use crate::error::{Result, TarazuError};
use crate::events::{Device, DeviceStatus, Event, StatusPublisher, emit};
use crate::ir::Program;
use crate::label::{EncodeOptions, LabelRecord, encode_with};
use crate::transport::{BaudRate, PortProvider, Transport};

/// Jobs waiting behind the one being written.
const JOB_QUEUE_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterInfo {
    pub status: DeviceStatus,
    pub endpoint: Option<String>,
    pub baud_rate: BaudRate,
    pub encoding: &'static str,
}

struct Job {
    payload: Vec<u8>,
    reply: oneshot::Sender<io::Result<()>>,
}

struct Writer {
    endpoint: String,
    jobs: mpsc::Sender<Job>,
    task: JoinHandle<Box<dyn Transport>>,
}

struct Settings {
    baud: BaudRate,
    encoding: &'static Encoding,
    writer: Option<Writer>,
}

pub struct PrinterSession {
    provider: Arc<dyn PortProvider>,
    events: broadcast::Sender<Event>,
    status: StatusPublisher,
    settings: Mutex<Settings>,
}

impl PrinterSession {
    pub fn new(provider: Arc<dyn PortProvider>, events: broadcast::Sender<Event>) -> Self {
        Self {
            provider,
            status: StatusPublisher::new(Device::Printer, events.clone()),
            events,
            settings: Mutex::new(Settings {
                baud: BaudRate::default(),
                encoding: UTF_8,
                writer: None,
            }),
        }
    }

    pub fn with_baud_rate(mut self, baud: BaudRate) -> Self {
        self.settings.get_mut().baud = baud;
        self
    }

    /// Charset the TSPL text is encoded in before writing.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.settings.get_mut().encoding = encoding;
        self
    }

    pub fn status(&self) -> DeviceStatus {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<DeviceStatus> {
        self.status.subscribe()
    }

    pub async fn info(&self) -> PrinterInfo {
        let settings = self.settings.lock().await;
        PrinterInfo {
            status: self.status.get(),
            endpoint: settings.writer.as_ref().map(|w| w.endpoint.clone()),
            baud_rate: settings.baud,
            encoding: settings.encoding.name(),
        }
    }

    pub async fn set_baud_rate(&self, baud: BaudRate) -> Result<()> {
        let mut settings = self.settings.lock().await;
        if settings.writer.is_some() {
            return Err(TarazuError::AlreadyConnected("Printer"));
        }
        settings.baud = baud;
        Ok(())
    }

    pub async fn connect(&self, endpoint: &str) -> Result<()> {
        let mut settings = self.settings.lock().await;
        if settings.writer.is_some() {
            return Err(TarazuError::AlreadyConnected("Printer"));
        }

        self.status.set(DeviceStatus::Connecting);
        let transport = match self.provider.open(endpoint, settings.baud).await {
            Ok(transport) => transport,
            Err(e) => {
                warn!(endpoint, error = %e, "printer connection failed");
                emit(
                    &self.events,
                    Event::Error {
                        device: Device::Printer,
                        message: format!("Connection failed: {}", e),
                    },
                );
                self.status.set(DeviceStatus::Error);
                return Err(e);
            }
        };

        let (jobs, queue) = mpsc::channel(JOB_QUEUE_DEPTH);
        let task = tokio::spawn(write_jobs(transport, queue));
        settings.writer = Some(Writer {
            endpoint: endpoint.to_string(),
            jobs,
            task,
        });
        self.status.set(DeviceStatus::Connected);
        info!(endpoint, baud = settings.baud.get(), "printer connected");
        Ok(())
    }

    /// Let queued jobs finish, then close the port.
    pub async fn disconnect(&self) -> Result<()> {
        let mut settings = self.settings.lock().await;
        let Some(Writer {
            endpoint,
            jobs,
            task,
        }) = settings.writer.take()
        else {
            self.status.set(DeviceStatus::Disconnected);
            return Ok(());
        };

        drop(jobs);
        match task.await {
            Ok(mut transport) => {
                if let Err(e) = transport.close().await {
                    warn!(endpoint = %endpoint, error = %e, "error closing printer port");
                    emit(
                        &self.events,
                        Event::Error {
                            device: Device::Printer,
                            message: format!("Error closing port: {}", e),
                        },
                    );
                }
            }
            Err(e) => warn!(endpoint = %endpoint, error = %e, "printer writer task ended abnormally"),
        }

        self.status.set(DeviceStatus::Disconnected);
        info!(endpoint = %endpoint, "printer disconnected");
        Ok(())
    }

    /// Write a program as one payload. Returns the number of bytes sent.
    pub async fn print(&self, program: &Program) -> Result<usize> {
        let result = self.send(program).await;
        match &result {
            Ok(bytes) => {
                info!(bytes, "label sent");
                emit(&self.events, Event::PrintSucceeded { bytes: *bytes });
            }
            Err(e) => {
                warn!(error = %e, "print failed");
                emit(
                    &self.events,
                    Event::PrintFailed {
                        reason: e.to_string(),
                    },
                );
            }
        }
        result
    }

    /// Validate, encode and print a label record.
    pub async fn print_label(
        &self,
        record: &LabelRecord,
        size: LabelSize,
        options: &EncodeOptions,
    ) -> Result<usize> {
        if let Err(e) = record.validate() {
            emit(
                &self.events,
                Event::PrintFailed {
                    reason: e.to_string(),
                },
            );
            return Err(e);
        }
        self.print(&encode_with(record, size, options)).await
    }

    async fn send(&self, program: &Program) -> Result<usize> {
        let (jobs, encoding) = {
            let settings = self.settings.lock().await;
            let writer = settings
                .writer
                .as_ref()
                .ok_or(TarazuError::NotConnected("Printer"))?;
            (writer.jobs.clone(), settings.encoding)
        };

        let payload = encode_payload(&program.to_tspl(), encoding)?;
        let bytes = payload.len();
        let (reply, done) = oneshot::channel();
        jobs.send(Job { payload, reply })
            .await
            .map_err(|_| TarazuError::NotConnected("Printer"))?;

        match done.await {
            Ok(Ok(())) => Ok(bytes),
            Ok(Err(e)) => Err(TarazuError::WriteFault(e.to_string())),
            Err(_) => Err(TarazuError::WriteFault("printer writer stopped".to_string())),
        }
    }
}

async fn write_jobs(
    mut transport: Box<dyn Transport>,
    mut queue: mpsc::Receiver<Job>,
) -> Box<dyn Transport> {
    while let Some(job) = queue.recv().await {
        let result = transport.write_all(&job.payload).await;
        let _ = job.reply.send(result);
    }
    transport
}

/// Encode TSPL text for the wire. Characters the charset cannot represent
/// are an error rather than silently substituted.
pub fn encode_payload(tspl: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let (bytes, used, unmappable) = encoding.encode(tspl);
    if unmappable {
        return Err(TarazuError::Encoding(format!(
            "label text cannot be represented in {}",
            used.name()
        )));
    }
    Ok(bytes.into_owned())
}

// ============================================================================
// TESTS
// ============================================================================
