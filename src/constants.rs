//! Cross-cutting, shared constants.
//!
//! Model-related defaults live here so the oracle configs and the HTTP layer
//! agree on them.

/// Default dimension for the stub sentence embedder (matches all-MiniLM-L6-v2).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Max tokens fed to any of the BERT-family models.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Index of the contradiction class in an entailment / neutral / contradiction head
/// when the model config carries no usable `id2label`.
pub const DEFAULT_CONTRADICTION_INDEX: usize = 2;

/// Number of classes an NLI head must expose.
pub const NLI_NUM_LABELS: usize = 3;

/// Default number of pairs scored concurrently.
pub const DEFAULT_WORKERS: usize = 1;

/// Default number of sentence pairs reported per document pair.
pub const DEFAULT_TOP_SENTENCE_PAIRS: usize = 5;

/// Default cap on sentences per document considered for sentence pairs.
pub const DEFAULT_MAX_SENTENCES: usize = 32;

/// Contradiction logit above which a pair counts as a contradiction.
pub const DEFAULT_CONTRADICTION_THRESHOLD: f32 = 0.0;

/// Default cap on documents accepted by one analysis request.
pub const DEFAULT_MAX_DOCUMENTS: usize = 32;

/// Default request body limit for uploads (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Browser origin of the bundled frontend dev server.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Response header carrying a short machine-readable status.
pub const SMARTDOC_STATUS_HEADER: &str = "x-smartdoc-status";

/// Status value: liveness check succeeded.
pub const SMARTDOC_STATUS_HEALTHY: &str = "healthy";
/// Status value: component ready.
pub const SMARTDOC_STATUS_READY: &str = "ready";
/// Status value: analysis completed.
pub const SMARTDOC_STATUS_ANALYZED: &str = "analyzed";
