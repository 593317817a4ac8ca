//! Named-entity extractor.
//!
//! With a model directory configured, a BERT token classifier tags every
//! sub-word and BIO tags are folded back into spans of the source text.
//! Without one, a rule-based recogniser in [`rules`] stands in.

pub mod config;
mod rules;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_CHUNK_BYTES, MAX_SEQ_LEN, NerConfig};

use candle_core::{D, Tensor};
use serde::{Deserialize, Serialize};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use crate::embedding::ModelError;
use crate::embedding::bert::BertTokenClassifier;
use crate::embedding::device::select_device;
use crate::embedding::labels::LabelMap;
use crate::embedding::utils::{check_model_dir, load_tokenizer};

const COMPONENT: &str = "ner";

/// A named entity. Serialises as a `[text, label]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Entity {
    pub text: String,
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

impl From<(String, String)> for Entity {
    fn from((text, label): (String, String)) -> Self {
        Self { text, label }
    }
}

impl From<Entity> for (String, String) {
    fn from(entity: Entity) -> Self {
        (entity.text, entity.label)
    }
}

struct NerModel {
    classifier: BertTokenClassifier,
    tokenizer: Tokenizer,
    labels: LabelMap,
}

pub struct EntityExtractor {
    device: candle_core::Device,
    config: NerConfig,
    model: Option<NerModel>,
}

impl std::fmt::Debug for EntityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityExtractor")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl EntityExtractor {
    pub fn load(config: NerConfig) -> Result<Self, ModelError> {
        config.validate()?;

        let device = select_device(COMPONENT);
        debug!(?device, "Selected compute device for entity extractor");

        let Some(model_path) = config.model_path.clone() else {
            info!("No NER model path configured, using rule-based recogniser");
            return Ok(Self {
                device,
                config,
                model: None,
            });
        };

        check_model_dir(COMPONENT, &model_path)?;
        info!(model_path = %model_path.display(), "Loading NER model");

        let config_content = std::fs::read_to_string(model_path.join("config.json"))
            .map_err(|e| ModelError::load_failed(COMPONENT, format!("config.json: {e}")))?;
        let labels = LabelMap::from_config_json(&config_content)
            .map_err(|reason| ModelError::invalid_config(COMPONENT, reason))?;
        if labels.is_empty() {
            return Err(ModelError::invalid_config(
                COMPONENT,
                "config.json declares no id2label tags",
            ));
        }

        let classifier = BertTokenClassifier::load(&model_path, labels.len(), &device)
            .map_err(|e| ModelError::load_failed(COMPONENT, format!("token classifier: {e}")))?;
        let tokenizer = load_tokenizer(COMPONENT, &model_path, config.max_seq_len)?;

        info!(num_tags = labels.len(), "NER model loaded successfully");

        Ok(Self {
            device,
            config,
            model: Some(NerModel {
                classifier,
                tokenizer,
                labels,
            }),
        })
    }

    pub fn stub() -> Result<Self, ModelError> {
        Self::load(NerConfig::stub())
    }

    /// Entities in `text`, in order of appearance.
    pub fn extract(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entities = match &self.model {
            Some(model) => self.extract_with_model(model, text)?,
            None => rules::extract(text),
        };

        debug!(
            text_len = text.len(),
            entity_count = entities.len(),
            model_loaded = self.is_model_loaded(),
            "Extracted entities"
        );

        Ok(entities)
    }

    fn extract_with_model(&self, model: &NerModel, text: &str) -> Result<Vec<Entity>, ModelError> {
        let mut entities = Vec::new();

        for ((start, end), encoding) in
            encode_within_limit(&model.tokenizer, text, self.config.chunk_bytes)?
        {
            let chunk = &text[start..end];
            let token_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
            let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
            let attention_mask =
                Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

            let tag_ids = model
                .classifier
                .forward(&token_ids, &type_ids, &attention_mask)?
                .squeeze(0)?
                .argmax(D::Minus1)?
                .to_vec1::<u32>()?;

            let tagged: Vec<TaggedToken<'_>> = tag_ids
                .iter()
                .zip(encoding.get_offsets())
                .zip(encoding.get_special_tokens_mask())
                .zip(encoding.get_word_ids())
                .filter(|(((_, (s, e)), special), _)| **special == 0 && s < e)
                .map(|(((id, &(s, e)), _), word)| TaggedToken {
                    tag: model.labels.get(*id as usize).unwrap_or("O"),
                    start: s,
                    end: e,
                    word: *word,
                })
                .collect();

            entities.extend(decode_bio(chunk, &tagged));
        }

        Ok(entities)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &NerConfig {
        &self.config
    }
}

/// A classified sub-word: its tag, byte span in the chunk, and source word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaggedToken<'a> {
    tag: &'a str,
    start: usize,
    end: usize,
    word: Option<u32>,
}

/// Splits a tag into (starts a new entity, entity kind). `None` for outside tags.
fn split_tag(tag: &str) -> Option<(bool, &str)> {
    if tag.is_empty() || tag.eq_ignore_ascii_case("O") {
        return None;
    }

    ["B-", "S-"]
        .iter()
        .find_map(|p| tag.strip_prefix(p))
        .map(|kind| (true, kind))
        .or_else(|| {
            ["I-", "E-"]
                .iter()
                .find_map(|p| tag.strip_prefix(p))
                .map(|kind| (false, kind))
        })
        .or(Some((false, tag)))
}

#[derive(Debug)]
struct OpenSpan<'a> {
    label: &'a str,
    start: usize,
    end: usize,
    word: Option<u32>,
}

/// Folds BIO-tagged sub-words into entities.
///
/// An `I-` tag continues an open span of the same kind; a `B-` tag on a
/// later piece of the same word does too.
fn decode_bio(text: &str, tokens: &[TaggedToken<'_>]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut open: Option<OpenSpan<'_>> = None;

    for token in tokens {
        let Some((begins, kind)) = split_tag(token.tag) else {
            close_span(text, open.take(), &mut entities);
            continue;
        };

        match open.as_mut() {
            Some(span)
                if span.label == kind
                    && (!begins || (token.word.is_some() && span.word == token.word)) =>
            {
                span.end = token.end;
                span.word = token.word;
            }
            _ => {
                close_span(text, open.take(), &mut entities);
                open = Some(OpenSpan {
                    label: kind,
                    start: token.start,
                    end: token.end,
                    word: token.word,
                });
            }
        }
    }

    close_span(text, open, &mut entities);
    entities
}

fn close_span(text: &str, span: Option<OpenSpan<'_>>, entities: &mut Vec<Entity>) {
    let Some(span) = span else {
        return;
    };

    if let Some(slice) = text.get(span.start..span.end) {
        let slice = slice.trim();
        if !slice.is_empty() {
            entities.push(Entity::new(slice, span.label));
        }
    }
}

/// Splits `text` at whitespace into byte spans of at most `max_bytes`.
///
/// A single word longer than `max_bytes` is cut at a char boundary.
fn chunk_spans(text: &str, max_bytes: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let rest = &text[start..];
        start += rest.len() - rest.trim_start().len();
        if start >= text.len() {
            break;
        }

        let mut end = start.saturating_add(max_bytes).min(text.len());
        if end < text.len() {
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            if let Some(ws) = text[start..end]
                .rfind(char::is_whitespace)
                .filter(|&ws| ws > 0)
            {
                end = start + ws;
            }
            if end == start {
                end += text[start..].chars().next().map_or(1, char::len_utf8);
            }
        }

        spans.push((start, end));
        start = end;
    }

    spans
}

/// Encodes `text` in byte spans whose encodings fit the tokenizer's limit.
///
/// Spans start as [`chunk_spans`] of `chunk_bytes`. A span the tokenizer
/// truncates (dense scripts, sub-word heavy text) is halved and re-encoded,
/// so no tokens are cut off. Spans come back in textual order.
fn encode_within_limit(
    tokenizer: &Tokenizer,
    text: &str,
    chunk_bytes: usize,
) -> Result<Vec<((usize, usize), Encoding)>, ModelError> {
    let mut pending = chunk_spans(text, chunk_bytes);
    pending.reverse();
    let mut encoded = Vec::with_capacity(pending.len());

    while let Some((start, end)) = pending.pop() {
        let encoding = tokenizer
            .encode(&text[start..end], true)
            .map_err(ModelError::tokenization)?;

        if !encoding.get_overflowing().is_empty() {
            if let Some((left, right)) = split_span(text, start, end) {
                pending.push(right);
                pending.push(left);
                continue;
            }
            warn!(
                start,
                end,
                "Span exceeds the token limit and cannot be split, tagging its prefix"
            );
        }

        encoded.push(((start, end), encoding));
    }

    Ok(encoded)
}

/// Halves a byte span, preferring the whitespace nearest its middle.
///
/// Text without whitespace (CJK) is cut at a char boundary. Returns `None`
/// when the span holds a single char.
fn split_span(text: &str, start: usize, end: usize) -> Option<((usize, usize), (usize, usize))> {
    let span = text[start..end].trim_end();

    let mut mid = span.len() / 2;
    while !span.is_char_boundary(mid) {
        mid -= 1;
    }

    let cut = span[..mid]
        .rfind(char::is_whitespace)
        .filter(|&ws| ws > 0)
        .or_else(|| span[mid..].find(char::is_whitespace).map(|ws| mid + ws))
        .unwrap_or(mid);

    let left_end = span[..cut].trim_end().len();
    let right_start = span.len() - span[cut..].trim_start().len();
    if left_end == 0 || right_start >= span.len() {
        return None;
    }

    Some(((start, start + left_end), (start + right_start, start + span.len())))
}
