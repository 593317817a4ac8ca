use std::sync::Arc;
use std::time::Instant;

use futures_util::{StreamExt, stream};
use tracing::{debug, info};

use super::error::AnalysisError;
use super::pairs::{pair_count, pairs};
use super::sentences::split_sentences;
use super::types::{AnalysisSummary, DecodedDocument, DocumentPairResult, SentenceContradiction};
use crate::constants::{
    DEFAULT_CONTRADICTION_THRESHOLD, DEFAULT_MAX_SENTENCES, DEFAULT_TOP_SENTENCE_PAIRS,
    DEFAULT_WORKERS,
};
use crate::oracle::{OracleError, Oracles};

/// Controls the sentence-level contradiction search within each pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentenceOptions {
    /// Sentence pairs kept per document pair; `0` disables the search.
    pub top_pairs: usize,
    /// Leading sentences of each document that are compared.
    pub max_sentences: usize,
    /// Scores at or below this logit are not contradictions.
    pub threshold: f32,
}

impl Default for SentenceOptions {
    fn default() -> Self {
        Self {
            top_pairs: DEFAULT_TOP_SENTENCE_PAIRS,
            max_sentences: DEFAULT_MAX_SENTENCES,
            threshold: DEFAULT_CONTRADICTION_THRESHOLD,
        }
    }
}

/// Scores every unordered document pair with the injected oracles.
#[derive(Debug, Clone)]
pub struct PairAnalyzer {
    oracles: Oracles,
    workers: usize,
    sentences: SentenceOptions,
}

impl PairAnalyzer {
    pub fn new(oracles: Oracles) -> Self {
        Self {
            oracles,
            workers: DEFAULT_WORKERS,
            sentences: SentenceOptions::default(),
        }
    }

    /// Pairs scored concurrently; `0` is treated as `1`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_sentence_options(mut self, sentences: SentenceOptions) -> Self {
        self.sentences = sentences;
        self
    }

    pub fn oracles(&self) -> &Oracles {
        &self.oracles
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn sentence_options(&self) -> SentenceOptions {
        self.sentences
    }

    /// Counts pairs above the contradiction threshold and their mean confidence.
    pub fn summarize(&self, results: &[DocumentPairResult]) -> AnalysisSummary {
        AnalysisSummary::from_results(results, self.sentences.threshold)
    }

    /// Scores all pairs of `documents`, results in enumeration order.
    ///
    /// Inference runs on the blocking pool. The first failing pair (in
    /// enumeration order) aborts the whole analysis.
    pub async fn analyze(
        &self,
        documents: &[DecodedDocument],
    ) -> Result<Vec<DocumentPairResult>, AnalysisError> {
        let started = Instant::now();
        let expected = pair_count(documents.len());
        let texts: Arc<[String]> = documents.iter().map(|d| d.text.clone()).collect();

        let mut scored = stream::iter(pairs(documents.len()))
            .map(|pair| {
                let oracles = self.oracles.clone();
                let options = self.sentences;
                let texts = Arc::clone(&texts);
                async move {
                    tokio::task::spawn_blocking(move || {
                        score_pair(&oracles, &options, pair, &texts[pair.0], &texts[pair.1])
                    })
                    .await
                    .map_err(|e| AnalysisError::TaskFailed {
                        pair,
                        reason: e.to_string(),
                    })?
                }
            })
            .buffered(self.workers);

        let mut results = Vec::with_capacity(expected);
        while let Some(result) = scored.next().await {
            results.push(result?);
        }

        info!(
            documents = documents.len(),
            pairs = results.len(),
            workers = self.workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pairwise analysis complete"
        );

        Ok(results)
    }

    /// Scores a single pair on the calling thread.
    pub fn analyze_pair(
        &self,
        pair: (usize, usize),
        text1: &str,
        text2: &str,
    ) -> Result<DocumentPairResult, AnalysisError> {
        score_pair(&self.oracles, &self.sentences, pair, text1, text2)
    }
}

fn score_pair(
    oracles: &Oracles,
    options: &SentenceOptions,
    pair: (usize, usize),
    text1: &str,
    text2: &str,
) -> Result<DocumentPairResult, AnalysisError> {
    let oracle_err = |source| AnalysisError::Oracle { pair, source };

    let contradiction_score = oracles
        .contradiction
        .contradiction(text1, text2)
        .map_err(oracle_err)?;
    let similarity_score = oracles
        .similarity
        .similarity(text1, text2)
        .map_err(oracle_err)?
        .clamp(-1.0, 1.0);
    let entities_doc1 = oracles.entities.entities(text1).map_err(oracle_err)?;
    let entities_doc2 = oracles.entities.entities(text2).map_err(oracle_err)?;
    let contradiction_pairs =
        sentence_contradictions(oracles, options, text1, text2, contradiction_score)
            .map_err(oracle_err)?;

    debug!(
        document1 = pair.0,
        document2 = pair.1,
        contradiction_score,
        similarity_score,
        entities_doc1 = entities_doc1.len(),
        entities_doc2 = entities_doc2.len(),
        sentence_pairs = contradiction_pairs.len(),
        "Scored document pair"
    );

    Ok(DocumentPairResult {
        pair,
        contradiction_score,
        similarity_score,
        entities_doc1,
        entities_doc2,
        contradiction_pairs,
    })
}

/// Ranks sentence pairs across the two texts by contradiction score.
///
/// When each text is a single sentence the document score is reused for it.
/// Ties keep enumeration order (row-major over the first text's sentences).
fn sentence_contradictions(
    oracles: &Oracles,
    options: &SentenceOptions,
    text1: &str,
    text2: &str,
    document_score: f32,
) -> Result<Vec<SentenceContradiction>, OracleError> {
    if options.top_pairs == 0 {
        return Ok(Vec::new());
    }

    let sentences1 = split_sentences(text1);
    let sentences2 = split_sentences(text2);

    let mut scored = Vec::new();
    match (sentences1.as_slice(), sentences2.as_slice()) {
        ([], _) | (_, []) => {}
        ([sentence1], [sentence2]) => scored.push(SentenceContradiction {
            sentence1: sentence1.to_string(),
            sentence2: sentence2.to_string(),
            score: document_score,
        }),
        _ => {
            for sentence1 in sentences1.iter().take(options.max_sentences) {
                for sentence2 in sentences2.iter().take(options.max_sentences) {
                    let score = oracles.contradiction.contradiction(sentence1, sentence2)?;
                    scored.push(SentenceContradiction {
                        sentence1: sentence1.to_string(),
                        sentence2: sentence2.to_string(),
                        score,
                    });
                }
            }
        }
    }

    scored.retain(|candidate| candidate.score > options.threshold);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(options.top_pairs);
    Ok(scored)
}
