//! Transformer encoders and heads loaded from safetensors.
//!
//! `model_type` in `config.json` picks the encoder family. BERT checkpoints
//! run on [`candle_transformers::models::bert`]; RoBERTa and XLM-R checkpoints
//! run on [`candle_transformers::models::xlm_roberta`], whose position ids are
//! offset past the padding index. Encoder weights may be prefixed with
//! `bert.` / `roberta.` or stored unprefixed (sentence-transformers exports).

use std::path::Path;
use std::sync::Arc;

use candle::{DType, Device, Module, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{self, BertModel};
use candle_transformers::models::xlm_roberta::{
    self, XLMRobertaForSequenceClassification, XLMRobertaModel,
};
use serde::Deserialize;

/// Encoder family of a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Bert,
    /// RoBERTa-style encoders: `roberta`, `xlm-roberta`, `camembert`.
    XlmRoberta,
}

impl Architecture {
    pub fn from_model_type(model_type: Option<&str>) -> Self {
        match model_type {
            Some("roberta" | "xlm-roberta" | "camembert") => Self::XlmRoberta,
            _ => Self::Bert,
        }
    }

    /// Reads `model_type` from a `config.json`; a missing field means BERT.
    pub fn from_config_json(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct ModelType {
            model_type: Option<String>,
        }

        let parsed: ModelType = serde_json::from_str(content)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
        Ok(Self::from_model_type(parsed.model_type.as_deref()))
    }

    /// Tensor prefix of the encoder weights in a task checkpoint.
    fn prefix(self) -> &'static str {
        match self {
            Self::Bert => "bert",
            Self::XlmRoberta => "roberta",
        }
    }
}

struct Checkpoint {
    architecture: Architecture,
    config_json: String,
    vb: VarBuilder<'static>,
}

impl Checkpoint {
    fn open(model_dir: &Path, device: &Device) -> Result<Self> {
        let config_json = std::fs::read_to_string(model_dir.join("config.json"))?;
        let architecture = Architecture::from_config_json(&config_json)?;

        let weights_path = model_dir.join("model.safetensors");
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        Ok(Self {
            architecture,
            config_json,
            vb,
        })
    }

    fn config<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.config_json)
            .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
    }

    /// Encoder weights, under the family prefix when the checkpoint has one.
    fn encoder_vb(&self) -> VarBuilder<'static> {
        let prefix = self.architecture.prefix();
        if self
            .vb
            .contains_tensor(&format!("{prefix}.embeddings.word_embeddings.weight"))
        {
            self.vb.pp(prefix)
        } else {
            self.vb.clone()
        }
    }

    fn load_backbone(&self) -> Result<(Backbone, usize)> {
        match self.architecture {
            Architecture::Bert => {
                let config: bert::Config = self.config()?;
                let model = BertModel::load(self.encoder_vb(), &config)?;
                Ok((Backbone::Bert(model), config.hidden_size))
            }
            Architecture::XlmRoberta => {
                let config: xlm_roberta::Config = self.config()?;
                let model = XLMRobertaModel::new(&config, self.encoder_vb())?;
                Ok((Backbone::XlmRoberta(model), config.hidden_size))
            }
        }
    }
}

enum Backbone {
    Bert(BertModel),
    XlmRoberta(XLMRobertaModel),
}

impl Backbone {
    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        match self {
            Self::Bert(model) => model.forward(input_ids, token_type_ids, Some(attention_mask)),
            Self::XlmRoberta(model) => {
                model.forward(input_ids, attention_mask, token_type_ids, None, None, None)
            }
        }
    }
}

/// Bare encoder returning per-token hidden states.
#[derive(Clone)]
pub struct BertEncoder {
    backbone: Arc<Backbone>,
    hidden_size: usize,
}

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let checkpoint = Checkpoint::open(model_dir.as_ref(), device)?;
        let (backbone, hidden_size) = checkpoint.load_backbone()?;

        Ok(Self {
            backbone: Arc::new(backbone),
            hidden_size,
        })
    }

    /// Returns hidden states shaped `[batch, seq_len, hidden_size]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        self.backbone
            .forward(input_ids, token_type_ids, attention_mask)
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }
}

enum SequenceClassifierImpl {
    /// Optional `bert.pooler.dense` + tanh over `[CLS]`, then `classifier`.
    Bert {
        bert: BertModel,
        pooler: Option<Linear>,
        classifier: Linear,
    },
    /// `roberta.*` encoder with the `classifier.dense` / `classifier.out_proj` head.
    XlmRoberta(XLMRobertaForSequenceClassification),
}

/// Sequence classifier producing one logit per class from the first token.
#[derive(Clone)]
pub struct BertSequenceClassifier(Arc<SequenceClassifierImpl>);

impl BertSequenceClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, num_labels: usize, device: &Device) -> Result<Self> {
        let checkpoint = Checkpoint::open(model_dir.as_ref(), device)?;
        let vb = &checkpoint.vb;

        let inner = match checkpoint.architecture {
            Architecture::XlmRoberta => {
                let config: xlm_roberta::Config = checkpoint.config()?;
                SequenceClassifierImpl::XlmRoberta(XLMRobertaForSequenceClassification::new(
                    num_labels,
                    &config,
                    vb.clone(),
                )?)
            }
            Architecture::Bert => {
                let config: bert::Config = checkpoint.config()?;
                let hidden_size = config.hidden_size;
                let encoder_vb = checkpoint.encoder_vb();
                let pooler = if encoder_vb.contains_tensor("pooler.dense.weight") {
                    Some(candle_nn::linear(
                        hidden_size,
                        hidden_size,
                        encoder_vb.pp("pooler.dense"),
                    )?)
                } else {
                    None
                };

                SequenceClassifierImpl::Bert {
                    bert: BertModel::load(encoder_vb, &config)?,
                    pooler,
                    classifier: candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?,
                }
            }
        };

        Ok(Self(Arc::new(inner)))
    }

    /// Returns logits shaped `[batch, num_labels]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        match self.0.as_ref() {
            SequenceClassifierImpl::Bert {
                bert,
                pooler,
                classifier,
            } => {
                let output = bert.forward(input_ids, token_type_ids, Some(attention_mask))?;
                let cls_token = output.i((.., 0, ..))?;
                let pooled = match pooler {
                    Some(pooler) => pooler.forward(&cls_token)?.tanh()?,
                    None => cls_token,
                };
                classifier.forward(&pooled)
            }
            SequenceClassifierImpl::XlmRoberta(model) => {
                model.forward(input_ids, attention_mask, token_type_ids)
            }
        }
    }
}

struct TokenClassifierImpl {
    backbone: Backbone,
    classifier: Linear,
}

/// Token classifier producing per-token logits (NER heads).
#[derive(Clone)]
pub struct BertTokenClassifier(Arc<TokenClassifierImpl>);

impl BertTokenClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, num_labels: usize, device: &Device) -> Result<Self> {
        let checkpoint = Checkpoint::open(model_dir.as_ref(), device)?;
        let (backbone, hidden_size) = checkpoint.load_backbone()?;
        let classifier =
            candle_nn::linear(hidden_size, num_labels, checkpoint.vb.pp("classifier"))?;

        Ok(Self(Arc::new(TokenClassifierImpl {
            backbone,
            classifier,
        })))
    }

    /// Returns logits shaped `[batch, seq_len, num_labels]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let output = self
            .0
            .backbone
            .forward(input_ids, token_type_ids, attention_mask)?;
        self.0.classifier.forward(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architecture_from_model_type() {
        assert_eq!(
            Architecture::from_model_type(Some("xlm-roberta")),
            Architecture::XlmRoberta
        );
        assert_eq!(
            Architecture::from_model_type(Some("roberta")),
            Architecture::XlmRoberta
        );
        assert_eq!(Architecture::from_model_type(Some("bert")), Architecture::Bert);
        assert_eq!(Architecture::from_model_type(None), Architecture::Bert);
    }

    #[test]
    fn test_xnli_config_selects_xlm_roberta() {
        let config = r#"{
            "architectures": ["XLMRobertaForSequenceClassification"],
            "model_type": "xlm-roberta",
            "pad_token_id": 1,
            "type_vocab_size": 1,
            "id2label": {"0": "contradiction", "1": "neutral", "2": "entailment"}
        }"#;

        let architecture = Architecture::from_config_json(config).unwrap();

        assert_eq!(architecture, Architecture::XlmRoberta);
        assert_eq!(architecture.prefix(), "roberta");
    }

    #[test]
    fn test_minilm_config_selects_bert() {
        let config = r#"{"model_type": "bert", "hidden_size": 384}"#;

        let architecture = Architecture::from_config_json(config).unwrap();

        assert_eq!(architecture, Architecture::Bert);
        assert_eq!(architecture.prefix(), "bert");
    }

    #[test]
    fn test_config_without_model_type_is_bert() {
        assert_eq!(
            Architecture::from_config_json("{}").unwrap(),
            Architecture::Bert
        );
        assert!(Architecture::from_config_json("not json").is_err());
    }
}
