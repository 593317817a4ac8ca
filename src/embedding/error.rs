use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or run one of the model-backed oracles.
///
/// `component` is the oracle that failed: `"nli"`, `"ner"` or
/// `"sentence-embedder"`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {component} configuration: {reason}")]
    InvalidConfig {
        component: &'static str,
        reason: String,
    },

    #[error("{component} model directory not found: {}", path.display())]
    DirectoryNotFound {
        component: &'static str,
        path: PathBuf,
    },

    #[error("{component} model directory is missing {}", path.display())]
    MissingFile {
        component: &'static str,
        path: PathBuf,
    },

    #[error("failed to load {component} model: {reason}")]
    LoadFailed {
        component: &'static str,
        reason: String,
    },

    #[error("tokenization failed: {reason}")]
    Tokenization { reason: String },

    #[error("inference failed: {reason}")]
    Inference { reason: String },
}

impl ModelError {
    pub(crate) fn invalid_config(component: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            component,
            reason: reason.into(),
        }
    }

    pub(crate) fn load_failed(component: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::LoadFailed {
            component,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn tokenization(err: impl std::fmt::Display) -> Self {
        Self::Tokenization {
            reason: err.to_string(),
        }
    }
}

impl From<candle_core::Error> for ModelError {
    fn from(err: candle_core::Error) -> Self {
        ModelError::Inference {
            reason: err.to_string(),
        }
    }
}
