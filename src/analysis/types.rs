use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decoding::{DecodePath, DecodedText, decode_bytes};
use crate::ner::Entity;

/// Raw upload as received: declared file name and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// An upload decoded to text. Serialises without the text itself.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedDocument {
    pub index: usize,
    pub name: String,
    /// Size of the upload in bytes.
    pub bytes: usize,
    pub encoding: &'static str,
    pub lossy: bool,
    /// BLAKE3 hex digest of the raw upload.
    pub digest: String,
    #[serde(skip)]
    pub path: DecodePath,
    #[serde(skip)]
    pub text: String,
}

impl DecodedDocument {
    pub fn decode(index: usize, upload: &UploadedDocument) -> Self {
        let DecodedText {
            text,
            encoding,
            path,
            lossy,
        } = decode_bytes(&upload.bytes);

        debug!(
            index,
            name = %upload.name,
            encoding,
            ?path,
            lossy,
            "Decoded upload"
        );

        Self {
            index,
            name: upload.name.clone(),
            bytes: upload.bytes.len(),
            encoding,
            lossy,
            digest: blake3::hash(&upload.bytes).to_hex().to_string(),
            path,
            text,
        }
    }
}

/// Analysis of one unordered document pair `(i, j)` with `i < j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPairResult {
    pub pair: (usize, usize),
    /// Contradiction logit; higher is more contradictory.
    pub contradiction_score: f32,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity_score: f32,
    pub entities_doc1: Vec<Entity>,
    pub entities_doc2: Vec<Entity>,
    /// Most contradictory sentence pairs, highest score first.
    pub contradiction_pairs: Vec<SentenceContradiction>,
}

/// A sentence of the first document contradicted by a sentence of the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceContradiction {
    pub sentence1: String,
    pub sentence2: String,
    /// Contradiction logit of `(sentence1, sentence2)`.
    pub score: f32,
}

/// Request-level roll-up of the pair results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Pairs whose contradiction score exceeds the threshold.
    pub total_contradictions: usize,
    /// Mean confidence of those pairs as a rounded percentage; `0` when none.
    pub average_confidence: u32,
}

impl AnalysisSummary {
    pub fn from_results(results: &[DocumentPairResult], threshold: f32) -> Self {
        let confidences: Vec<f64> = results
            .iter()
            .filter(|r| r.contradiction_score > threshold)
            .map(|r| contradiction_confidence(r.contradiction_score))
            .collect();

        if confidences.is_empty() {
            return Self::default();
        }

        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        Self {
            total_contradictions: confidences.len(),
            average_confidence: mean.round() as u32,
        }
    }
}

/// Maps a contradiction logit to a percentage with the logistic function.
pub fn contradiction_confidence(score: f32) -> f64 {
    100.0 / (1.0 + (-f64::from(score)).exp())
}
