//! # HTTP Control Surface
//!
//! A headless station: edit the label, watch the scale, print, read the
//! diagnostic log. Everything is JSON except the TSPL preview, which is
//! plain text.
//!
//! ## Usage
//!
//! ```bash
//! tarazu serve --config station.toml --listen 0.0.0.0:8080
//! ```
//!
//! ## Routes
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET, PATCH | `/api/label` | record and field edits |
//! | GET | `/api/label/tspl?size=` | program preview |
//! | GET | `/api/sizes` | label stock |
//! | GET | `/api/ports` | openable endpoints |
//! | GET | `/api/scale`, `/api/printer` | session info |
//! | POST | `/api/{scale,printer}/{connect,disconnect}` | |
//! | POST | `/api/print` | print the current record |
//! | GET, DELETE | `/api/logs` | diagnostic log |

mod handlers;
mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::StationConfig;
use crate::error::{Result, TarazuError};
use crate::transport::PortProvider;

/// Build the API router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Label API
        .route(
            "/api/label",
            get(handlers::label::get).patch(handlers::label::patch),
        )
        .route("/api/label/tspl", get(handlers::label::tspl))
        .route("/api/sizes", get(handlers::label::sizes))
        // Device API
        .route("/api/ports", get(handlers::devices::ports))
        .route("/api/scale", get(handlers::devices::scale_info))
        .route("/api/scale/connect", post(handlers::devices::scale_connect))
        .route(
            "/api/scale/disconnect",
            post(handlers::devices::scale_disconnect),
        )
        .route("/api/printer", get(handlers::devices::printer_info))
        .route(
            "/api/printer/connect",
            post(handlers::devices::printer_connect),
        )
        .route(
            "/api/printer/disconnect",
            post(handlers::devices::printer_disconnect),
        )
        .route("/api/print", post(handlers::devices::print))
        // Log API
        .route(
            "/api/logs",
            get(handlers::logs::list).delete(handlers::logs::clear),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tarazu::config::StationConfig;
/// use tarazu::server::serve;
/// use tarazu::transport::SerialProvider;
///
/// # async fn example() -> tarazu::error::Result<()> {
/// serve(StationConfig::default(), Arc::new(SerialProvider)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: StationConfig, provider: Arc<dyn PortProvider>) -> Result<()> {
    let listen = config.server.listen.clone();
    let state = Arc::new(AppState::new(config, provider)?);
    state.connect_configured().await;

    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| TarazuError::Config(format!("Failed to bind to {}: {}", listen, e)))?;
    info!(listen = %listen, "tarazu HTTP server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    info!("shutting down");
    state.shutdown().await;
    served.map_err(TarazuError::Io)
}
