//! Oracle seams between the pair analyzer and the models.
//!
//! Each oracle is a stateless, thread-safe trait object. [`Oracles`] bundles
//! one of each so the analyzer and the HTTP state own them explicitly.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::OracleError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{FailingOracle, FixedOracle};

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::embedding::{SentenceConfig, SentenceEmbedder};
use crate::ner::{Entity, EntityExtractor, NerConfig};
use crate::nli::{NliClassifier, NliConfig};

/// Whether an oracle runs a loaded model or its deterministic stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleMode {
    Model,
    Stub,
}

impl OracleMode {
    fn from_loaded(loaded: bool) -> Self {
        if loaded { Self::Model } else { Self::Stub }
    }
}

/// Scores how strongly `hypothesis` contradicts `premise`. Higher is more contradictory.
pub trait ContradictionOracle: Send + Sync {
    fn contradiction(&self, premise: &str, hypothesis: &str) -> Result<f32, OracleError>;

    fn mode(&self) -> OracleMode;
}

/// Semantic similarity of two texts, in `[-1, 1]`.
pub trait SimilarityOracle: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, OracleError>;

    fn mode(&self) -> OracleMode;
}

/// Named entities of one text, in order of appearance.
pub trait EntityOracle: Send + Sync {
    fn entities(&self, text: &str) -> Result<Vec<Entity>, OracleError>;

    fn mode(&self) -> OracleMode;
}

impl ContradictionOracle for NliClassifier {
    fn contradiction(&self, premise: &str, hypothesis: &str) -> Result<f32, OracleError> {
        NliClassifier::contradiction(self, premise, hypothesis).map_err(OracleError::Contradiction)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::from_loaded(self.is_model_loaded())
    }
}

impl SimilarityOracle for SentenceEmbedder {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, OracleError> {
        SentenceEmbedder::similarity(self, a, b).map_err(OracleError::Similarity)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::from_loaded(!self.is_stub())
    }
}

impl EntityOracle for EntityExtractor {
    fn entities(&self, text: &str) -> Result<Vec<Entity>, OracleError> {
        self.extract(text).map_err(OracleError::Entities)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::from_loaded(self.is_model_loaded())
    }
}

/// Per-oracle modes, as reported by `/ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OracleModes {
    pub contradiction: OracleMode,
    pub similarity: OracleMode,
    pub entities: OracleMode,
}

/// The three oracles, shared read-only across requests.
#[derive(Clone)]
pub struct Oracles {
    pub contradiction: Arc<dyn ContradictionOracle>,
    pub similarity: Arc<dyn SimilarityOracle>,
    pub entities: Arc<dyn EntityOracle>,
}

impl std::fmt::Debug for Oracles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracles")
            .field("modes", &self.modes())
            .finish()
    }
}

impl Oracles {
    pub fn new(
        contradiction: Arc<dyn ContradictionOracle>,
        similarity: Arc<dyn SimilarityOracle>,
        entities: Arc<dyn EntityOracle>,
    ) -> Self {
        Self {
            contradiction,
            similarity,
            entities,
        }
    }

    /// Loads every oracle from the configured model directories.
    ///
    /// Oracles without a configured directory run in stub mode.
    pub fn load(config: &Config) -> Result<Self, OracleError> {
        let nli_config = match &config.nli_model_path {
            Some(path) => NliConfig::new(path),
            None => NliConfig::stub(),
        };
        let sentence_config = match &config.embedding_model_path {
            Some(path) => SentenceConfig::new(path),
            None => SentenceConfig::stub(),
        };
        let ner_config = match &config.ner_model_path {
            Some(path) => NerConfig::new(path),
            None => NerConfig::stub(),
        };

        let oracles = Self::new(
            Arc::new(NliClassifier::load(nli_config).map_err(OracleError::Contradiction)?),
            Arc::new(SentenceEmbedder::load(sentence_config).map_err(OracleError::Similarity)?),
            Arc::new(EntityExtractor::load(ner_config).map_err(OracleError::Entities)?),
        );

        info!(modes = ?oracles.modes(), "Oracles loaded");
        Ok(oracles)
    }

    /// All three oracles in stub mode.
    pub fn stub() -> Result<Self, OracleError> {
        Ok(Self::new(
            Arc::new(NliClassifier::stub().map_err(OracleError::Contradiction)?),
            Arc::new(SentenceEmbedder::stub().map_err(OracleError::Similarity)?),
            Arc::new(EntityExtractor::stub().map_err(OracleError::Entities)?),
        ))
    }

    pub fn modes(&self) -> OracleModes {
        OracleModes {
            contradiction: self.contradiction.mode(),
            similarity: self.similarity.mode(),
            entities: self.entities.mode(),
        }
    }
}
