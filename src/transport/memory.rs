//! # In-Memory Transport
//!
//! A port pair living inside the process. The [`MemoryTransport`] half is
//! handed to a session like any device; the [`MemoryPeer`] half plays the
//! device: it pushes bytes, injects faults, and inspects what was written.
//!
//! ```
//! use tarazu::transport::{MemoryTransport, Transport};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (mut port, peer) = MemoryTransport::pair("mem://scale");
//! peer.send("ST,GS,+  1.200kg\r\n");
//!
//! let mut buf = [0u8; 64];
//! let n = port.read(&mut buf).await.unwrap();
//! assert_eq!(&buf[..n], b"ST,GS,+  1.200kg\r\n");
//! # }
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{BaudRate, PortInfo, PortProvider, Transport};
use crate::error::{Result, TarazuError};

enum Inbound {
    Data(Vec<u8>),
    Fault(String),
}

#[derive(Debug, Default)]
struct PeerState {
    written: Vec<u8>,
    writes: usize,
    closed: bool,
    close_error: Option<String>,
    write_error: Option<String>,
    opened_at: Option<BaudRate>,
}

type Shared = Arc<Mutex<PeerState>>;

fn lock(state: &Shared) -> MutexGuard<'_, PeerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Session-side half of an in-memory port.
pub struct MemoryTransport {
    endpoint: String,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    pending: Vec<u8>,
    state: Shared,
}

/// Device-side half of an in-memory port.
#[derive(Clone)]
pub struct MemoryPeer {
    outbound: mpsc::UnboundedSender<Inbound>,
    state: Shared,
}

impl MemoryTransport {
    pub fn pair(endpoint: &str) -> (MemoryTransport, MemoryPeer) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Shared::default();
        (
            MemoryTransport {
                endpoint: endpoint.to_string(),
                inbound: rx,
                pending: Vec::new(),
                state: state.clone(),
            },
            MemoryPeer {
                outbound: tx,
                state,
            },
        )
    }

    fn ensure_open(&self) -> io::Result<()> {
        if lock(&self.state).closed {
            Err(io::Error::new(io::ErrorKind::NotConnected, "port is closed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        if self.pending.is_empty() {
            match self.inbound.recv().await {
                Some(Inbound::Data(bytes)) => self.pending = bytes,
                Some(Inbound::Fault(message)) => return Err(io::Error::other(message)),
                None => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        if let Some(message) = &state.write_error {
            return Err(io::Error::other(message.clone()));
        }
        state.written.extend_from_slice(data);
        state.writes += 1;
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        let mut state = lock(&self.state);
        state.closed = true;
        match state.close_error.take() {
            Some(message) => Err(io::Error::other(message)),
            None => Ok(()),
        }
    }
}

impl MemoryPeer {
    /// Deliver bytes to the next read. Empty sends are ignored.
    pub fn send(&self, data: impl AsRef<[u8]>) {
        let data = data.as_ref();
        if !data.is_empty() {
            let _ = self.outbound.send(Inbound::Data(data.to_vec()));
        }
    }

    /// Make the next read fail.
    pub fn fail_read(&self, message: &str) {
        let _ = self.outbound.send(Inbound::Fault(message.to_string()));
    }

    /// Make the next `close()` report an error (the port still closes).
    pub fn fail_close(&self, message: &str) {
        lock(&self.state).close_error = Some(message.to_string());
    }

    /// Make writes fail until cleared with `None`.
    pub fn fail_writes(&self, message: Option<&str>) {
        lock(&self.state).write_error = message.map(str::to_string);
    }

    /// Everything written so far.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.state).written.clone()
    }

    /// Number of successful `write_all` calls.
    pub fn write_count(&self) -> usize {
        lock(&self.state).writes
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Baud rate the provider opened this port with.
    pub fn opened_at(&self) -> Option<BaudRate> {
        lock(&self.state).opened_at
    }
}

// ============================================================================
// PROVIDER
// ============================================================================

enum Slot {
    Ready(MemoryTransport),
    Refuse(String),
}

/// Provider over a fixed set of in-memory ports. Each registered port can be
/// opened once.
pub struct MemoryProvider {
    available: bool,
    ports: Mutex<HashMap<String, Slot>>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self {
            available: true,
            ports: Mutex::new(HashMap::new()),
        }
    }

    /// A provider whose platform has no serial support.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Register a port and return its device-side handle.
    pub fn add_port(&self, endpoint: &str) -> MemoryPeer {
        let (transport, peer) = MemoryTransport::pair(endpoint);
        self.slots().insert(endpoint.to_string(), Slot::Ready(transport));
        peer
    }

    /// Register a port whose `open()` is rejected with `reason`.
    pub fn add_refusing_port(&self, endpoint: &str, reason: &str) {
        self.slots()
            .insert(endpoint.to_string(), Slot::Refuse(reason.to_string()));
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.ports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PortProvider for MemoryProvider {
    fn available(&self) -> bool {
        self.available
    }

    async fn list_ports(&self) -> Result<Vec<PortInfo>> {
        if !self.available {
            return Err(TarazuError::TransportUnavailable(
                "memory transport disabled".to_string(),
            ));
        }
        let mut ports: Vec<PortInfo> = self
            .slots()
            .keys()
            .map(|path| PortInfo {
                path: path.clone(),
                kind: "Memory".to_string(),
            })
            .collect();
        ports.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(ports)
    }

    async fn open(&self, endpoint: &str, baud: BaudRate) -> Result<Box<dyn Transport>> {
        if !self.available {
            return Err(TarazuError::TransportUnavailable(
                "memory transport disabled".to_string(),
            ));
        }
        let open_failed = |reason: &str| TarazuError::OpenFailed {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let mut slots = self.slots();
        match slots.remove(endpoint) {
            Some(Slot::Ready(transport)) => {
                lock(&transport.state).opened_at = Some(baud);
                Ok(Box::new(transport))
            }
            Some(Slot::Refuse(reason)) => {
                let err = open_failed(&reason);
                slots.insert(endpoint.to_string(), Slot::Refuse(reason));
                Err(err)
            }
            None => Err(open_failed("no such port or already open")),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
