//! Sentence embedder used for document similarity.
//!
//! Model mode follows the sentence-transformers recipe for all-MiniLM-L6-v2:
//! BERT hidden states, attention-masked mean pooling, L2 normalisation.
//! Use [`SentenceConfig::stub`] for tests without model files.

/// Sentence embedder configuration.
pub mod config;


pub use config::{SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig};

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use self::config::COMPONENT;
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::ModelError;
use crate::embedding::utils::load_tokenizer;

enum EmbedderBackend {
    Model {
        encoder: BertEncoder,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Embedding generator for semantic similarity (supports stub mode).
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: SentenceConfig,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.embedding_dim())
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: SentenceConfig) -> Result<Self, ModelError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let device = select_device(COMPONENT);
        let tokenizer = load_tokenizer(COMPONENT, &config.model_path, config.max_seq_len)?;
        let encoder = BertEncoder::load(&config.model_path, &device)
            .map_err(|e| ModelError::load_failed(COMPONENT, format!("encoder: {e}")))?;

        info!(
            model_path = %config.model_path.display(),
            hidden_size = encoder.hidden_size(),
            max_seq_len = config.max_seq_len,
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
        })
    }

    /// Convenience constructor for a stub embedder.
    pub fn stub() -> Result<Self, ModelError> {
        Self::load(SentenceConfig::stub())
    }

    /// Generates an L2-normalised embedding (all zeros for text with no tokens).
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => self.embed_with_model(text, encoder, tokenizer, device),
            EmbedderBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    /// Cosine similarity of the embeddings of `a` and `b`, in `[-1, 1]`.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32, ModelError> {
        let emb_a = self.embed(a)?;
        let emb_b = self.embed(b)?;
        Ok(cosine_similarity(&emb_a, &emb_b))
    }

    fn embed_with_model(
        &self,
        text: &str,
        encoder: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, ModelError> {
        let encoding = tokenizer
            .encode(text, true)
            .map_err(ModelError::tokenization)?;

        let ids = encoding.get_ids();
        if ids.is_empty() || text.trim().is_empty() {
            return Ok(vec![0.0; encoder.hidden_size()]);
        }

        debug!(
            text_len = text.len(),
            token_count = ids.len(),
            "Generating sentence embedding"
        );

        let input_ids = Tensor::new(ids, device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let hidden_states = encoder
            .forward(&input_ids, &type_ids, &attention_mask)?;

        // Mean over real tokens: [1, seq, hidden] * [1, seq, 1] summed over seq.
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden_states.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?.squeeze(0)?.to_vec1::<f32>()?;

        Ok(normalize(pooled))
    }

    /// Signed feature hashing over lowercase alphanumeric words.
    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim;
        let mut embedding = vec![0.0f32; dim];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let hash = hasher.finish();

            let bucket = (hash % dim as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        normalize(embedding)
    }

    /// Output dimension (model hidden size, or the configured stub dimension).
    pub fn embedding_dim(&self) -> usize {
        match &self.backend {
            EmbedderBackend::Model { encoder, .. } => encoder.hidden_size(),
            EmbedderBackend::Stub => self.config.embedding_dim,
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &SentenceConfig {
        &self.config
    }
}

fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }

    embedding
}

/// Cosine similarity clamped to `[-1, 1]`.
///
/// Zero vectors, length mismatches and non-finite results score `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    let score = dot / denom;
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
