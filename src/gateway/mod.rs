//! HTTP gateway (Axum) for document analysis.
//!
//! Used by the `smartdoc` server binary and the integration tests.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use error::GatewayError;
pub use handler::analyze_handler;
pub use state::HandlerState;

use crate::constants::{SMARTDOC_STATUS_HEADER, SMARTDOC_STATUS_HEALTHY, SMARTDOC_STATUS_READY};
use crate::oracle::OracleModes;

pub fn create_router_with_state(state: HandlerState) -> Router {
    let cors = cors_layer(&state.cors_origin);
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/analyze", post(analyze_handler))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static(SMARTDOC_STATUS_HEADER)])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            warn!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            base
        }
    }
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
    pub workers: usize,
    pub max_documents: usize,
    pub started_at: String,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    #[serde(flatten)]
    pub oracles: OracleModes,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        SMARTDOC_STATUS_HEADER,
        HeaderValue::from_static(SMARTDOC_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// Oracles are loaded before the router exists, so readiness only reports modes.
#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let components = ComponentStatus {
        http: SMARTDOC_STATUS_READY,
        oracles: state.analyzer.oracles().modes(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        SMARTDOC_STATUS_HEADER,
        HeaderValue::from_static(SMARTDOC_STATUS_READY),
    );

    (
        StatusCode::OK,
        headers,
        Json(ReadyResponse {
            status: "ok",
            components,
            workers: state.analyzer.workers(),
            max_documents: state.max_documents,
            started_at: state.started_at.to_rfc3339(),
        }),
    )
        .into_response()
}
