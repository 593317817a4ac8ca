use std::path::PathBuf;

use crate::embedding::ModelError;

pub const MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

/// Longest text slice tagged in one forward pass.
pub const DEFAULT_CHUNK_BYTES: usize = 1500;

#[derive(Debug, Clone)]
pub struct NerConfig {
    /// Model directory. `None` runs the rule-based recogniser.
    pub model_path: Option<PathBuf>,

    pub max_seq_len: usize,

    /// Long documents are split on whitespace into slices of at most this
    /// many bytes. Slices that still exceed `max_seq_len` tokens are split
    /// further.
    pub chunk_bytes: usize,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: MAX_SEQ_LEN,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }
}

impl NerConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_seq_len == 0 {
            return Err(ModelError::invalid_config("ner", "max_seq_len must be greater than 0"));
        }

        if self.chunk_bytes == 0 {
            return Err(ModelError::invalid_config("ner", "chunk_bytes must be greater than 0"));
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err(ModelError::invalid_config(
                "ner",
                "model_path cannot be empty when provided",
            ));
        }

        Ok(())
    }
}
