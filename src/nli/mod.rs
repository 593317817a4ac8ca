//! Natural-language-inference classifier (contradiction oracle).
//!
//! The model is a three-way sequence classifier over a (premise, hypothesis)
//! pair with entailment / neutral / contradiction classes. The contradiction
//! score is the raw contradiction logit, not a probability.

pub mod config;


pub use config::{MAX_SEQ_LEN, NliConfig};

use std::collections::HashSet;

use candle_core::Tensor;
use serde::Serialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::constants::{DEFAULT_CONTRADICTION_INDEX, NLI_NUM_LABELS};
use crate::embedding::ModelError;
use crate::embedding::bert::BertSequenceClassifier;
use crate::embedding::device::select_device;
use crate::embedding::labels::LabelMap;
use crate::embedding::utils::{check_model_dir, load_tokenizer};

const COMPONENT: &str = "nli";

/// Per-class logits for one premise/hypothesis pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NliScores {
    pub entailment: f32,
    pub neutral: f32,
    pub contradiction: f32,
}

/// Class positions within the model's logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClassIndices {
    entailment: usize,
    neutral: usize,
    contradiction: usize,
}

impl ClassIndices {
    fn from_labels(labels: &LabelMap) -> Result<Self, ModelError> {
        if labels.is_empty() {
            return Ok(Self::default());
        }

        if labels.len() != NLI_NUM_LABELS {
            return Err(ModelError::invalid_config(
                COMPONENT,
                format!(
                    "expected {} NLI classes, model declares {}",
                    NLI_NUM_LABELS,
                    labels.len()
                ),
            ));
        }

        let defaults = Self::default();
        Ok(Self {
            entailment: labels.index_of("entailment").unwrap_or(defaults.entailment),
            neutral: labels.index_of("neutral").unwrap_or(defaults.neutral),
            contradiction: labels
                .index_of("contradiction")
                .unwrap_or(defaults.contradiction),
        })
    }
}

impl Default for ClassIndices {
    fn default() -> Self {
        Self {
            entailment: 0,
            neutral: 1,
            contradiction: DEFAULT_CONTRADICTION_INDEX,
        }
    }
}

struct NliModel {
    classifier: BertSequenceClassifier,
    tokenizer: Tokenizer,
    classes: ClassIndices,
}

pub struct NliClassifier {
    device: candle_core::Device,
    config: NliConfig,
    model: Option<NliModel>,
}

impl std::fmt::Debug for NliClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NliClassifier")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl NliClassifier {
    pub fn load(config: NliConfig) -> Result<Self, ModelError> {
        config.validate()?;

        let device = select_device(COMPONENT);
        debug!(?device, "Selected compute device for NLI classifier");

        let Some(model_path) = config.model_path.clone() else {
            info!("No NLI model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
            });
        };

        check_model_dir(COMPONENT, &model_path)?;
        info!(model_path = %model_path.display(), "Loading NLI model");

        let config_content = std::fs::read_to_string(model_path.join("config.json"))
            .map_err(|e| ModelError::load_failed(COMPONENT, format!("config.json: {e}")))?;
        let labels = LabelMap::from_config_json(&config_content)
            .map_err(|reason| ModelError::invalid_config(COMPONENT, reason))?;
        let classes = ClassIndices::from_labels(&labels)?;

        let classifier = BertSequenceClassifier::load(&model_path, NLI_NUM_LABELS, &device)
            .map_err(|e| ModelError::load_failed(COMPONENT, format!("sequence classifier: {e}")))?;
        let tokenizer = load_tokenizer(COMPONENT, &model_path, config.max_seq_len)?;

        info!(
            contradiction_index = classes.contradiction,
            "NLI model loaded successfully"
        );

        Ok(Self {
            device,
            config,
            model: Some(NliModel {
                classifier,
                tokenizer,
                classes,
            }),
        })
    }

    pub fn stub() -> Result<Self, ModelError> {
        Self::load(NliConfig::stub())
    }

    /// Contradiction logit for `premise` followed by `hypothesis`.
    pub fn contradiction(&self, premise: &str, hypothesis: &str) -> Result<f32, ModelError> {
        Ok(self.scores(premise, hypothesis)?.contradiction)
    }

    /// Logits for all three classes.
    pub fn scores(&self, premise: &str, hypothesis: &str) -> Result<NliScores, ModelError> {
        debug!(
            premise_len = premise.len(),
            hypothesis_len = hypothesis.len(),
            model_loaded = self.is_model_loaded(),
            "Classifying premise-hypothesis pair"
        );

        match &self.model {
            Some(model) => self.scores_with_model(model, premise, hypothesis),
            None => Ok(lexical_scores(premise, hypothesis)),
        }
    }

    fn scores_with_model(
        &self,
        model: &NliModel,
        premise: &str,
        hypothesis: &str,
    ) -> Result<NliScores, ModelError> {
        let tokens = model
            .tokenizer
            .encode((premise, hypothesis), true)
            .map_err(ModelError::tokenization)?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = model
            .classifier
            .forward(&token_ids, &type_ids, &attention_mask)?
            .flatten_all()?
            .to_vec1::<f32>()?;

        if logits.len() != NLI_NUM_LABELS {
            return Err(ModelError::Inference {
                reason: format!("expected {} logits, got {}", NLI_NUM_LABELS, logits.len()),
            });
        }

        let classes = model.classes;
        Ok(NliScores {
            entailment: logits[classes.entailment],
            neutral: logits[classes.neutral],
            contradiction: logits[classes.contradiction],
        })
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &NliConfig {
        &self.config
    }

    pub fn device(&self) -> &candle_core::Device {
        &self.device
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "shall", "can", "to", "of", "in",
    "for", "on", "with", "at", "by", "from", "as", "into", "and", "or", "but", "if", "this",
    "that", "these", "those", "it", "its", "all", "any", "each", "per", "up",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
];

/// Pairs of words that assert opposite things about the same subject.
const OPPOSITES: &[(&str, &str)] = &[
    ("mandatory", "optional"),
    ("required", "optional"),
    ("must", "may"),
    ("allowed", "prohibited"),
    ("permitted", "prohibited"),
    ("allowed", "forbidden"),
    ("before", "after"),
    ("increase", "decrease"),
    ("open", "closed"),
    ("always", "sometimes"),
    ("accept", "reject"),
    ("include", "exclude"),
];

struct LexicalView {
    content: HashSet<String>,
    numbers: HashSet<String>,
    negated: bool,
}

impl LexicalView {
    fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let mut content = HashSet::new();
        let mut numbers = HashSet::new();
        let mut negations = 0usize;

        for word in lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '.' || c == ':'))
            .map(|w| w.trim_matches(|c: char| c == '.' || c == '\'' || c == ':'))
            .filter(|w| !w.is_empty())
        {
            if word.ends_with("n't") || NEGATIONS.contains(&word) {
                negations += 1;
            } else if word.chars().any(|c| c.is_ascii_digit()) {
                numbers.insert(word.to_string());
            } else if !STOP_WORDS.contains(&word) {
                content.insert(word.to_string());
            }
        }

        Self {
            content,
            numbers,
            negated: negations % 2 == 1,
        }
    }
}

/// Deterministic stand-in for the NLI model.
///
/// Topical overlap gates everything; conflict comes from negation parity,
/// disagreeing numbers, or opposing words. Logits stay within `[-4, 4]`.
fn lexical_scores(premise: &str, hypothesis: &str) -> NliScores {
    let p = LexicalView::new(premise);
    let h = LexicalView::new(hypothesis);

    let union = p.content.union(&h.content).count();
    let overlap = if union > 0 {
        p.content.intersection(&h.content).count() as f32 / union as f32
    } else {
        0.0
    };

    let mut conflict = 0.0f32;
    if p.negated != h.negated {
        conflict += 0.6;
    }
    if !p.numbers.is_empty() && !h.numbers.is_empty() && p.numbers != h.numbers {
        conflict += 0.6;
    }
    let opposed = OPPOSITES.iter().any(|(a, b)| {
        (p.content.contains(*a) && h.content.contains(*b))
            || (p.content.contains(*b) && h.content.contains(*a))
    });
    if opposed {
        conflict += 0.6;
    }
    let conflict = conflict.min(1.0);

    NliScores {
        entailment: -4.0 + 8.0 * overlap * (1.0 - conflict),
        neutral: -4.0 + 8.0 * (1.0 - overlap),
        contradiction: -4.0 + 8.0 * overlap * conflict,
    }
}
