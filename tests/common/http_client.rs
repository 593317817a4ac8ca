//! HTTP client helpers for tests.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use smartdoc::analysis::{AnalysisSummary, DocumentPairResult};
use smartdoc::constants::SMARTDOC_STATUS_HEADER;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Uploads `files` as `(file name, contents)` parts of one `files` form.
    pub async fn analyze(
        &self,
        files: &[(&str, &[u8])],
    ) -> Result<(AnalyzeResponse, String), TestClientError> {
        let form = files.iter().fold(Form::new(), |form, (name, bytes)| {
            form.part(
                "files",
                Part::bytes(bytes.to_vec()).file_name(name.to_string()),
            )
        });

        let resp = self
            .client
            .post(self.url("/api/analyze"))
            .multipart(form)
            .send()
            .await?;

        let status_header = resp
            .headers()
            .get(SMARTDOC_STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        match resp.status().as_u16() {
            200 => Ok((resp.json().await?, status_header)),
            400 => Err(TestClientError::BadRequest(resp.json().await?)),
            413 => Err(TestClientError::PayloadTooLarge(resp.json().await?)),
            500 => Err(TestClientError::ServerError(resp.json().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/healthz")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }

    pub async fn ready(&self) -> Result<ReadyResponse, TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentStatus {
    pub http: String,
    pub contradiction: String,
    pub similarity: String,
    pub entities: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
    pub workers: usize,
    pub max_documents: usize,
    pub started_at: String,
}

impl ReadyResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSummary {
    pub index: usize,
    pub name: String,
    pub bytes: usize,
    pub encoding: String,
    pub lossy: bool,
    pub digest: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub documents: Vec<DocumentSummary>,
    pub results: Vec<DocumentPairResult>,
    pub pair_count: usize,
    #[serde(flatten)]
    pub summary: AnalysisSummary,
    pub analysis_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
    pub pair: Option<(usize, usize)>,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Bad request: {0:?}")]
    BadRequest(ErrorBody),

    #[error("Payload too large: {0:?}")]
    PayloadTooLarge(ErrorBody),

    #[error("Server error: {0:?}")]
    ServerError(ErrorBody),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),
}
