use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::analysis::{
    AnalysisSummary, DecodedDocument, DocumentPairResult, UploadedDocument, decode_all,
};
use crate::constants::{SMARTDOC_STATUS_ANALYZED, SMARTDOC_STATUS_HEADER};
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub documents: Vec<DecodedDocument>,
    pub results: Vec<DocumentPairResult>,
    pub pair_count: usize,
    #[serde(flatten)]
    pub summary: AnalysisSummary,
    /// Wall-clock time of the request, e.g. `"0.02s"`.
    pub analysis_time: String,
}

#[instrument(skip(state, multipart), fields(request_id = %Uuid::new_v4()))]
pub async fn analyze_handler(
    State(state): State<HandlerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, GatewayError> {
    let started = Instant::now();

    let mut multipart = multipart.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let uploads = read_uploads(&mut multipart, state.max_documents).await?;
    if uploads.is_empty() {
        return Err(GatewayError::NoDocuments);
    }

    let documents = decode_all(&uploads);
    let results = state.analyzer.analyze(&documents).await?;

    let response = AnalyzeResponse {
        pair_count: results.len(),
        summary: state.analyzer.summarize(&results),
        analysis_time: format_analysis_time(started.elapsed()),
        documents,
        results,
    };

    info!(
        documents = response.documents.len(),
        pairs = response.pair_count,
        contradictions = response.summary.total_contradictions,
        analysis_time = %response.analysis_time,
        "Analysis request complete"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        SMARTDOC_STATUS_HEADER,
        HeaderValue::from_static(SMARTDOC_STATUS_ANALYZED),
    );

    Ok((StatusCode::OK, headers, Json(response)).into_response())
}

/// Collects every file part of the form, in order.
///
/// Parts without a file name are skipped.
pub(crate) async fn read_uploads(
    multipart: &mut Multipart,
    max_documents: usize,
) -> Result<Vec<UploadedDocument>, GatewayError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "Skipping form field without file name");
            continue;
        };

        if uploads.len() == max_documents {
            return Err(GatewayError::TooManyDocuments { max: max_documents });
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!(name = %name, bytes = bytes.len(), "Received upload");
        uploads.push(UploadedDocument::new(name, bytes.to_vec()));
    }

    Ok(uploads)
}

fn multipart_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(err.body_text())
    } else {
        GatewayError::InvalidRequest(err.body_text())
    }
}

/// Seconds with two decimals, e.g. `"0.02s"`.
pub fn format_analysis_time(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
