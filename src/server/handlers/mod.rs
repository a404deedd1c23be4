//! HTTP handlers for the server.

pub mod devices;
pub mod label;
pub mod logs;

use axum::http::StatusCode;

use crate::error::TarazuError;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// Map a library error onto a status code and a plain-text message.
pub fn api_error(e: TarazuError) -> ApiError {
    let status = match &e {
        TarazuError::InvalidBaudRate(_)
        | TarazuError::InvalidLabelSize(_)
        | TarazuError::UnknownField(_)
        | TarazuError::Validation(_)
        | TarazuError::Config(_) => StatusCode::BAD_REQUEST,
        TarazuError::NotConnected(_) | TarazuError::AlreadyConnected(_) => StatusCode::CONFLICT,
        TarazuError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TarazuError::TransportUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        TarazuError::OpenFailed { .. } | TarazuError::ReadFault(_) | TarazuError::WriteFault(_) => {
            StatusCode::BAD_GATEWAY
        }
        TarazuError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
