//! `id2label` parsing for classification heads.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct LabelSection {
    #[serde(default)]
    id2label: BTreeMap<String, String>,
}

/// Class labels of a classification head, indexed by class id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    /// Builds a map from labels in class-id order.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the `id2label` section of a Hugging Face `config.json`.
    ///
    /// Gaps in the id range are filled with `LABEL_{id}`. Returns an empty map when
    /// the section is missing.
    pub fn from_config_json(content: &str) -> Result<Self, String> {
        let section: LabelSection = serde_json::from_str(content)
            .map_err(|e| format!("Failed to parse id2label: {}", e))?;

        let mut by_id = BTreeMap::new();
        for (key, label) in section.id2label {
            let id: usize = key
                .trim()
                .parse()
                .map_err(|_| format!("id2label key '{}' is not a class index", key))?;
            by_id.insert(id, label);
        }

        let len = by_id.keys().next_back().map_or(0, |max| max + 1);
        let labels = (0..len)
            .map(|id| {
                by_id
                    .remove(&id)
                    .unwrap_or_else(|| format!("LABEL_{}", id))
            })
            .collect();

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Index of the first label equal to `name`, ignoring ASCII case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|label| label.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nli_labels() {
        let config = r#"{
            "hidden_size": 1024,
            "id2label": {"0": "contradiction", "1": "neutral", "2": "entailment"}
        }"#;

        let labels = LabelMap::from_config_json(config).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.index_of("CONTRADICTION"), Some(0));
        assert_eq!(labels.get(2), Some("entailment"));
    }

    #[test]
    fn test_numeric_ordering_not_lexical() {
        let config = r#"{"id2label": {"10": "k", "2": "c", "0": "a", "1": "b"}}"#;

        let labels = LabelMap::from_config_json(config).unwrap();

        assert_eq!(labels.len(), 11);
        assert_eq!(labels.get(2), Some("c"));
        assert_eq!(labels.get(3), Some("LABEL_3"));
        assert_eq!(labels.get(10), Some("k"));
    }

    #[test]
    fn test_missing_section_is_empty() {
        let labels = LabelMap::from_config_json(r#"{"hidden_size": 384}"#).unwrap();
        assert!(labels.is_empty());
    }

    #[test]
    fn test_non_numeric_key_rejected() {
        let err = LabelMap::from_config_json(r#"{"id2label": {"first": "O"}}"#).unwrap_err();
        assert!(err.contains("first"));
    }
}
