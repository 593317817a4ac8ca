use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analysis::{PairAnalyzer, SentenceOptions};
use crate::config::Config;
use crate::constants::{DEFAULT_CORS_ORIGIN, DEFAULT_MAX_DOCUMENTS, DEFAULT_MAX_UPLOAD_BYTES};
use crate::oracle::Oracles;

#[derive(Clone)]
pub struct HandlerState {
    pub analyzer: Arc<PairAnalyzer>,

    pub max_documents: usize,

    pub max_upload_bytes: usize,

    pub cors_origin: String,

    pub started_at: DateTime<Utc>,
}

impl HandlerState {
    /// State with default request limits.
    pub fn new(analyzer: PairAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            max_documents: DEFAULT_MAX_DOCUMENTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn from_config(oracles: Oracles, config: &Config) -> Self {
        Self {
            max_documents: config.max_documents,
            max_upload_bytes: config.max_upload_bytes,
            cors_origin: config.cors_origin.clone(),
            ..Self::new(
                PairAnalyzer::new(oracles)
                    .with_workers(config.workers)
                    .with_sentence_options(SentenceOptions {
                        top_pairs: config.top_sentence_pairs,
                        max_sentences: config.max_sentences,
                        threshold: config.contradiction_threshold,
                    }),
            )
        }
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
