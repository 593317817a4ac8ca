use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::constants::SMARTDOC_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no documents uploaded")]
    NoDocuments,

    #[error("too many documents: at most {max} per request")]
    TooManyDocuments { max: usize },

    #[error("upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("analysis failed: {0}")]
    AnalysisFailed(#[from] AnalysisError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<(usize, usize)>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, smartdoc_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NoDocuments => (StatusCode::BAD_REQUEST, "no_documents"),
            GatewayError::TooManyDocuments { .. } => {
                (StatusCode::BAD_REQUEST, "too_many_documents")
            }
            GatewayError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
            }
            GatewayError::AnalysisFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "analysis_error")
            }
        };

        let pair = match &self {
            GatewayError::AnalysisFailed(err) => Some(err.pair()),
            _ => None,
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            SMARTDOC_STATUS_HEADER,
            HeaderValue::from_static(smartdoc_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
            pair,
        });

        (status, headers, body).into_response()
    }
}
