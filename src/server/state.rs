//! Server state.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{RwLock, broadcast};

use crate::config::StationConfig;
use crate::error::Result;
use crate::events::{self, Event};
use crate::label::LabelStore;
use crate::logbook::{LogRing, SharedLog, spawn_sink};
use crate::printer::PrinterSession;
use crate::scale::ScaleSession;
use crate::transport::PortProvider;

/// Application state shared across handlers.
pub struct AppState {
    pub config: StationConfig,
    pub provider: Arc<dyn PortProvider>,
    /// The label being prepared; the scale writes its weight here.
    pub store: Arc<LabelStore>,
    pub scale: ScaleSession,
    pub printer: PrinterSession,
    pub log: SharedLog,
    pub events: broadcast::Sender<Event>,
}

impl AppState {
    /// Build both sessions from `config` and start the log sink.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn new(config: StationConfig, provider: Arc<dyn PortProvider>) -> Result<Self> {
        let events = events::channel();
        let store = Arc::new(LabelStore::new(config.label.record_at(Local::now())));

        let scale = ScaleSession::new(provider.clone(), store.clone(), events.clone())
            .with_baud_rate(config.scale.baud_rate)
            .with_encoding(config.scale_encoding()?);
        let printer = PrinterSession::new(provider.clone(), events.clone())
            .with_baud_rate(config.printer.baud_rate)
            .with_encoding(config.printer_encoding()?);

        let log: SharedLog = Arc::new(RwLock::new(LogRing::new(config.log.capacity)));
        spawn_sink(&events, log.clone());

        Ok(Self {
            config,
            provider,
            store,
            scale,
            printer,
            log,
            events,
        })
    }

    /// Open the devices named in the config. Failures are logged and left
    /// in the sessions' `Error` state; the server still starts.
    pub async fn connect_configured(&self) {
        if let Some(device) = &self.config.scale.device
            && let Err(e) = self.scale.connect(device).await
        {
            tracing::warn!(device = %device, error = %e, "scale not connected at startup");
        }
        if let Some(device) = &self.config.printer.device
            && let Err(e) = self.printer.connect(device).await
        {
            tracing::warn!(device = %device, error = %e, "printer not connected at startup");
        }
    }

    /// Close both devices.
    pub async fn shutdown(&self) {
        let _ = self.scale.disconnect().await;
        let _ = self.printer.disconnect().await;
    }
}
