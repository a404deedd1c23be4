//! Scale and printer handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::super::state::AppState;
use super::{ApiError, api_error};
use crate::printer::{LabelSize, PrinterInfo};
use crate::scale::ScaleInfo;
use crate::transport::{BaudRate, PortInfo};

/// Body for the connect endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub device: String,
    pub baud_rate: Option<u32>,
}

impl ConnectRequest {
    fn baud(&self) -> Result<Option<BaudRate>, ApiError> {
        self.baud_rate
            .map(BaudRate::try_from)
            .transpose()
            .map_err(api_error)
    }
}

/// GET /api/ports - Endpoints that can be opened.
pub async fn ports(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PortInfo>>, ApiError> {
    state.provider.list_ports().await.map(Json).map_err(api_error)
}

/// GET /api/scale
pub async fn scale_info(State(state): State<Arc<AppState>>) -> Json<ScaleInfo> {
    Json(state.scale.info().await)
}

/// POST /api/scale/connect
pub async fn scale_connect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ScaleInfo>, ApiError> {
    if let Some(baud) = req.baud()? {
        state.scale.set_baud_rate(baud).await.map_err(api_error)?;
    }
    state.scale.connect(&req.device).await.map_err(api_error)?;
    Ok(Json(state.scale.info().await))
}

/// POST /api/scale/disconnect
pub async fn scale_disconnect(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScaleInfo>, ApiError> {
    state.scale.disconnect().await.map_err(api_error)?;
    Ok(Json(state.scale.info().await))
}

/// GET /api/printer
pub async fn printer_info(State(state): State<Arc<AppState>>) -> Json<PrinterInfo> {
    Json(state.printer.info().await)
}

/// POST /api/printer/connect
pub async fn printer_connect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<PrinterInfo>, ApiError> {
    if let Some(baud) = req.baud()? {
        state.printer.set_baud_rate(baud).await.map_err(api_error)?;
    }
    state.printer.connect(&req.device).await.map_err(api_error)?;
    Ok(Json(state.printer.info().await))
}

/// POST /api/printer/disconnect
pub async fn printer_disconnect(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PrinterInfo>, ApiError> {
    state.printer.disconnect().await.map_err(api_error)?;
    Ok(Json(state.printer.info().await))
}

/// Body for POST /api/print. Both fields fall back to the config.
#[derive(Debug, Default, Deserialize)]
pub struct PrintRequest {
    pub size: Option<String>,
    pub copies: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub bytes: usize,
}

/// POST /api/print - Encode the current record and send it to the printer.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrintRequest>,
) -> Result<Json<PrintResponse>, ApiError> {
    let size = match &req.size {
        Some(size) => size.parse::<LabelSize>().map_err(api_error)?,
        None => state.config.printer.label_size,
    };
    let mut options = state.config.printer.encode_options();
    if let Some(copies) = req.copies {
        options.copies = copies.max(1);
    }

    let record = state.store.snapshot().await;
    let bytes = state
        .printer
        .print_label(&record, size, &options)
        .await
        .map_err(api_error)?;
    Ok(Json(PrintResponse {
        success: true,
        bytes,
    }))
}
