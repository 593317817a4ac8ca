use std::path::PathBuf;

use crate::embedding::ModelError;

pub const MAX_SEQ_LEN: usize = crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
pub struct NliConfig {
    /// Model directory. `None` runs the lexical stub.
    pub model_path: Option<PathBuf>,

    /// Max tokens for the concatenated premise/hypothesis pair.
    pub max_seq_len: usize,
}

impl Default for NliConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: MAX_SEQ_LEN,
        }
    }
}

impl NliConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_seq_len < 2 {
            return Err(ModelError::invalid_config(
                "nli",
                format!(
                    "max_seq_len must be at least 2 for a text pair, got {}",
                    self.max_seq_len
                ),
            ));
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err(ModelError::invalid_config(
                "nli",
                "model_path cannot be empty when provided",
            ));
        }

        Ok(())
    }
}
