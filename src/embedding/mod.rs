//! Model plumbing shared by the oracles.
//!
//! - [`sentence`] provides sentence embeddings for document similarity.
//! - [`bert`] holds the BERT-family heads used by [`crate::nli`] and [`crate::ner`].

/// BERT encoder and classification heads.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// `id2label` parsing.
pub mod labels;
/// Sentence embedder (similarity oracle).
pub mod sentence;
/// Tokenizer/model loading helpers.
pub mod utils;

pub use error::ModelError;
pub use labels::LabelMap;
pub use sentence::{
    SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig, SentenceEmbedder,
    cosine_similarity,
};
