use thiserror::Error;

use crate::embedding::ModelError;

/// Failure of one oracle, tagged with the oracle's role.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("contradiction oracle error: {0}")]
    Contradiction(#[source] ModelError),

    #[error("similarity oracle error: {0}")]
    Similarity(#[source] ModelError),

    #[error("entity oracle error: {0}")]
    Entities(#[source] ModelError),

    #[error("oracle unavailable: {reason}")]
    Unavailable { reason: String },
}
