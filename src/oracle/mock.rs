//! Test oracles: fixed answers and scripted failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    ContradictionOracle, EntityOracle, OracleError, OracleMode, Oracles, SimilarityOracle,
};
use crate::ner::Entity;

/// Returns the same scores and entities for every input and counts calls.
#[derive(Debug, Default)]
pub struct FixedOracle {
    pub contradiction: f32,
    pub similarity: f32,
    pub entities: Vec<Entity>,
    calls: AtomicUsize,
}

impl FixedOracle {
    pub fn new(contradiction: f32, similarity: f32, entities: Vec<Entity>) -> Self {
        Self {
            contradiction,
            similarity,
            entities,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total oracle calls across all three traits.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Bundles this oracle into all three slots.
    pub fn into_oracles(self) -> (Arc<Self>, Oracles) {
        let shared = Arc::new(self);
        let oracles = Oracles::new(shared.clone(), shared.clone(), shared.clone());
        (shared, oracles)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl ContradictionOracle for FixedOracle {
    fn contradiction(&self, _premise: &str, _hypothesis: &str) -> Result<f32, OracleError> {
        self.record();
        Ok(self.contradiction)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::Stub
    }
}

impl SimilarityOracle for FixedOracle {
    fn similarity(&self, _a: &str, _b: &str) -> Result<f32, OracleError> {
        self.record();
        Ok(self.similarity)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::Stub
    }
}

impl EntityOracle for FixedOracle {
    fn entities(&self, _text: &str) -> Result<Vec<Entity>, OracleError> {
        self.record();
        Ok(self.entities.clone())
    }

    fn mode(&self) -> OracleMode {
        OracleMode::Stub
    }
}

/// Fails whenever an input contains `trigger`, or always when `trigger` is `None`.
#[derive(Debug, Default)]
pub struct FailingOracle {
    trigger: Option<String>,
}

impl FailingOracle {
    pub fn always() -> Self {
        Self { trigger: None }
    }

    pub fn on_text(trigger: impl Into<String>) -> Self {
        Self {
            trigger: Some(trigger.into()),
        }
    }

    fn check(&self, inputs: &[&str]) -> Result<(), OracleError> {
        let fails = match &self.trigger {
            None => true,
            Some(trigger) => inputs.iter().any(|text| text.contains(trigger.as_str())),
        };

        if fails {
            Err(OracleError::Unavailable {
                reason: "scripted failure".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl ContradictionOracle for FailingOracle {
    fn contradiction(&self, premise: &str, hypothesis: &str) -> Result<f32, OracleError> {
        self.check(&[premise, hypothesis])?;
        Ok(0.0)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::Stub
    }
}

impl SimilarityOracle for FailingOracle {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, OracleError> {
        self.check(&[a, b])?;
        Ok(0.0)
    }

    fn mode(&self) -> OracleMode {
        OracleMode::Stub
    }
}

impl EntityOracle for FailingOracle {
    fn entities(&self, text: &str) -> Result<Vec<Entity>, OracleError> {
        self.check(&[text])?;
        Ok(Vec::new())
    }

    fn mode(&self) -> OracleMode {
        OracleMode::Stub
    }
}
