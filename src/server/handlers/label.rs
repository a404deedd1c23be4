//! Label editing and preview handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::super::state::AppState;
use super::{ApiError, api_error};
use crate::label::{DerivedOverrides, LabelRecord, encode_with, parse_updates};
use crate::printer::LabelSize;

/// Current record plus which derived fields hold a manual edit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub record: LabelRecord,
    pub overrides: DerivedOverrides,
}

impl From<LabelRecord> for LabelResponse {
    fn from(record: LabelRecord) -> Self {
        Self {
            overrides: record.overrides(),
            record,
        }
    }
}

/// GET /api/label - Current label record.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<LabelResponse> {
    Json(state.store.snapshot().await.into())
}

/// PATCH /api/label - Replace the named fields.
///
/// Body is a flat object of field name to value, e.g.
/// `{"trackingNumber": "0451...", "receiverName": "Sara"}`. Unknown names
/// reject the whole batch.
pub async fn patch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HashMap<String, String>>,
) -> Result<Json<LabelResponse>, ApiError> {
    let updates = parse_updates(body).map_err(api_error)?;
    let record = state.store.apply(updates).await;
    Ok(Json(record.into()))
}

#[derive(Debug, Deserialize)]
pub struct TsplQuery {
    pub size: Option<String>,
}

/// GET /api/label/tspl?size=100x80 - The program that would be printed.
pub async fn tspl(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TsplQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let size = match query.size {
        Some(size) => size.parse::<LabelSize>().map_err(api_error)?,
        None => state.config.printer.label_size,
    };
    let record = state.store.snapshot().await;
    let program = encode_with(&record, size, &state.config.printer.encode_options());
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        program.to_tspl(),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInfo {
    pub name: LabelSize,
    pub width_mm: u32,
    pub height_mm: u32,
    pub default: bool,
}

/// GET /api/sizes - Supported label stock.
pub async fn sizes(State(state): State<Arc<AppState>>) -> Json<Vec<SizeInfo>> {
    let configured = state.config.printer.label_size;
    Json(
        LabelSize::ALL
            .into_iter()
            .map(|size| SizeInfo {
                name: size,
                width_mm: size.width_mm(),
                height_mm: size.height_mm(),
                default: size == configured,
            })
            .collect(),
    )
}
