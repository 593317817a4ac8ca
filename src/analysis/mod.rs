//! Pairwise document analysis.
//!
//! Documents are decoded once, every unordered pair `(i, j)` with `i < j` is
//! enumerated row-major, and each pair is scored by the contradiction and
//! similarity oracles plus the entity extractor on both sides. Sentence pairs
//! across the two documents are then ranked by contradiction score.

pub mod analyzer;
pub mod error;
pub mod pairs;
pub mod sentences;
pub mod types;


pub use analyzer::{PairAnalyzer, SentenceOptions};
pub use error::AnalysisError;
pub use pairs::{PairIter, pair_count, pairs};
pub use sentences::split_sentences;
pub use types::{
    AnalysisSummary, DecodedDocument, DocumentPairResult, SentenceContradiction, UploadedDocument,
    contradiction_confidence,
};

/// Decodes uploads in order, assigning indices from zero.
pub fn decode_all(uploads: &[UploadedDocument]) -> Vec<DecodedDocument> {
    uploads
        .iter()
        .enumerate()
        .map(|(index, upload)| DecodedDocument::decode(index, upload))
        .collect()
}
