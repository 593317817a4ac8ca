use std::path::PathBuf;

use crate::embedding::error::ModelError;
use crate::embedding::utils::check_model_dir;

pub(super) const COMPONENT: &str = "sentence-embedder";

/// Default stub embedding dimension.
pub const SENTENCE_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default max sequence length.
pub const SENTENCE_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
pub struct SentenceConfig {
    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    pub model_path: PathBuf,
    /// Max tokens to consider.
    pub max_seq_len: usize,
    /// Output dimension in stub mode (model mode uses the model's hidden size).
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            max_seq_len: SENTENCE_MAX_SEQ_LEN,
            embedding_dim: SENTENCE_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl SentenceConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; hashed bag-of-words embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Sets the stub embedding dimension.
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Validates required fields for the selected mode.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_seq_len == 0 {
            return Err(ModelError::invalid_config(
                COMPONENT,
                "max_seq_len must be greater than zero",
            ));
        }

        if self.testing_stub {
            if self.embedding_dim == 0 {
                return Err(ModelError::invalid_config(
                    COMPONENT,
                    "embedding_dim must be greater than zero",
                ));
            }
            return Ok(());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err(ModelError::invalid_config(
                COMPONENT,
                "model_path is required (stubbing is disabled)",
            ));
        }

        check_model_dir(COMPONENT, &self.model_path)
    }
}
