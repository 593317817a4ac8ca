//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SMARTDOC_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_CONTRADICTION_THRESHOLD, DEFAULT_CORS_ORIGIN, DEFAULT_MAX_DOCUMENTS,
    DEFAULT_MAX_SENTENCES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TOP_SENTENCE_PAIRS, DEFAULT_WORKERS,
};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SMARTDOC_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// NLI (contradiction) model directory. Unset runs the stub oracle.
    pub nli_model_path: Option<PathBuf>,

    /// Sentence-embedding model directory. Unset runs the stub oracle.
    pub embedding_model_path: Option<PathBuf>,

    /// Token-classification (NER) model directory. Unset runs the stub oracle.
    pub ner_model_path: Option<PathBuf>,

    /// Pairs scored concurrently per request. Default: `1` (serial).
    pub workers: usize,

    /// Max documents accepted by one analysis request. Default: `32`.
    pub max_documents: usize,

    /// Request body limit in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,

    /// Allowed CORS origin. Default: `http://localhost:5173`.
    pub cors_origin: String,

    /// Sentence pairs reported per document pair. Default: `5`; `0` disables.
    pub top_sentence_pairs: usize,

    /// Leading sentences per document compared pairwise. Default: `32`.
    pub max_sentences: usize,

    /// Contradiction logit a pair must exceed to be counted. Default: `0.0`.
    pub contradiction_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            nli_model_path: None,
            embedding_model_path: None,
            ner_model_path: None,
            workers: DEFAULT_WORKERS,
            max_documents: DEFAULT_MAX_DOCUMENTS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            top_sentence_pairs: DEFAULT_TOP_SENTENCE_PAIRS,
            max_sentences: DEFAULT_MAX_SENTENCES,
            contradiction_threshold: DEFAULT_CONTRADICTION_THRESHOLD,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SMARTDOC_PORT";
    const ENV_BIND_ADDR: &'static str = "SMARTDOC_BIND_ADDR";
    const ENV_NLI_MODEL_PATH: &'static str = "SMARTDOC_NLI_MODEL_PATH";
    const ENV_EMBEDDING_MODEL_PATH: &'static str = "SMARTDOC_EMBEDDING_MODEL_PATH";
    const ENV_NER_MODEL_PATH: &'static str = "SMARTDOC_NER_MODEL_PATH";
    const ENV_WORKERS: &'static str = "SMARTDOC_WORKERS";
    const ENV_MAX_DOCUMENTS: &'static str = "SMARTDOC_MAX_DOCUMENTS";
    const ENV_MAX_UPLOAD_BYTES: &'static str = "SMARTDOC_MAX_UPLOAD_BYTES";
    const ENV_CORS_ORIGIN: &'static str = "SMARTDOC_CORS_ORIGIN";
    const ENV_TOP_SENTENCE_PAIRS: &'static str = "SMARTDOC_TOP_SENTENCE_PAIRS";
    const ENV_MAX_SENTENCES: &'static str = "SMARTDOC_MAX_SENTENCES";
    const ENV_CONTRADICTION_THRESHOLD: &'static str = "SMARTDOC_CONTRADICTION_THRESHOLD";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let nli_model_path = Self::parse_optional_path_from_env(Self::ENV_NLI_MODEL_PATH);
        let embedding_model_path =
            Self::parse_optional_path_from_env(Self::ENV_EMBEDDING_MODEL_PATH);
        let ner_model_path = Self::parse_optional_path_from_env(Self::ENV_NER_MODEL_PATH);
        let workers = Self::parse_limit_from_env(Self::ENV_WORKERS, defaults.workers)?;
        let max_documents =
            Self::parse_limit_from_env(Self::ENV_MAX_DOCUMENTS, defaults.max_documents)?;
        let max_upload_bytes =
            Self::parse_limit_from_env(Self::ENV_MAX_UPLOAD_BYTES, defaults.max_upload_bytes)?;
        let cors_origin = Self::parse_string_from_env(Self::ENV_CORS_ORIGIN, defaults.cors_origin);
        let top_sentence_pairs =
            Self::parse_count_from_env(Self::ENV_TOP_SENTENCE_PAIRS, defaults.top_sentence_pairs);
        let max_sentences =
            Self::parse_limit_from_env(Self::ENV_MAX_SENTENCES, defaults.max_sentences)?;
        let contradiction_threshold =
            Self::parse_threshold_from_env(defaults.contradiction_threshold)?;

        Ok(Self {
            port,
            bind_addr,
            nli_model_path,
            embedding_model_path,
            ner_model_path,
            workers,
            max_documents,
            max_upload_bytes,
            cors_origin,
            top_sentence_pairs,
            max_sentences,
            contradiction_threshold,
        })
    }

    /// Validates model paths (each must be an existing directory when set).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [
            &self.nli_model_path,
            &self.embedding_model_path,
            &self.ner_model_path,
        ]
        .into_iter()
        .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    /// Like [`Self::parse_limit_from_env`] but zero is allowed.
    fn parse_count_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_threshold_from_env(default: f32) -> Result<f32, ConfigError> {
        let Ok(value) = env::var(Self::ENV_CONTRADICTION_THRESHOLD) else {
            return Ok(default);
        };

        let threshold: f32 = value.trim().parse().map_err(|e| ConfigError::ThresholdParseError {
            value: value.clone(),
            source: e,
        })?;

        if !threshold.is_finite() {
            return Err(ConfigError::InvalidLimit {
                name: Self::ENV_CONTRADICTION_THRESHOLD,
                value,
                reason: "must be a finite number",
            });
        }

        Ok(threshold)
    }

    /// Unparseable values fall back to the default; an explicit zero is rejected.
    fn parse_limit_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        let Ok(value) = env::var(var_name) else {
            return Ok(default);
        };

        match value.trim().parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidLimit {
                name: var_name,
                value,
                reason: "must be at least 1",
            }),
            Ok(parsed) => Ok(parsed),
            Err(_) => Ok(default),
        }
    }
}
