use thiserror::Error;

use crate::oracle::OracleError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("oracle failed on pair ({}, {}): {source}", .pair.0, .pair.1)]
    Oracle {
        pair: (usize, usize),
        source: OracleError,
    },

    #[error("scoring task for pair ({}, {}) did not complete: {reason}", .pair.0, .pair.1)]
    TaskFailed { pair: (usize, usize), reason: String },
}

impl AnalysisError {
    /// The pair whose scoring failed.
    pub fn pair(&self) -> (usize, usize) {
        match self {
            AnalysisError::Oracle { pair, .. } | AnalysisError::TaskFailed { pair, .. } => *pair,
        }
    }
}
