//! SmartDoc library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`decoding`] - best-effort byte-to-text decoding of uploads
//! - [`analysis`] - pair enumeration and the [`PairAnalyzer`]
//! - [`gateway`] - Axum router for `/api/analyze`, `/healthz`, `/ready`
//!
//! ## Oracles
//! - [`NliClassifier`] - contradiction score (NLI contradiction logit)
//! - [`SentenceEmbedder`] - cosine similarity of sentence embeddings
//! - [`EntityExtractor`] - named entities
//! - [`Oracles`] - the three behind `Arc<dyn Trait>`, injected into the analyzer
//!
//! Every oracle runs a deterministic stub when no model directory is configured.
//!
//! ## Test/Mock Support
//! Test oracles are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod decoding;
pub mod embedding;
pub mod gateway;
pub mod ner;
pub mod nli;
pub mod oracle;

pub use analysis::{
    AnalysisError, AnalysisSummary, DecodedDocument, DocumentPairResult, PairAnalyzer, PairIter,
    SentenceContradiction, SentenceOptions, UploadedDocument, decode_all, pair_count, pairs,
    split_sentences,
};
pub use config::{Config, ConfigError};
pub use constants::{
    SMARTDOC_STATUS_ANALYZED, SMARTDOC_STATUS_HEADER, SMARTDOC_STATUS_HEALTHY,
    SMARTDOC_STATUS_READY,
};
pub use decoding::{DecodePath, DecodedText, decode_bytes, detect_encoding};
pub use embedding::{
    ModelError, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig, SentenceEmbedder,
    cosine_similarity,
};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use ner::{Entity, EntityExtractor, NerConfig};
pub use nli::{NliClassifier, NliConfig, NliScores};
#[cfg(any(test, feature = "mock"))]
pub use oracle::{FailingOracle, FixedOracle};
pub use oracle::{
    ContradictionOracle, EntityOracle, OracleError, OracleMode, OracleModes, Oracles,
    SimilarityOracle,
};
