//! URL tokenizer
//!
//! Reads the JSON written by Keras `Tokenizer.to_json()` and reproduces its
//! `texts_to_sequences` behaviour, then pads/truncates (post) to `MAX_LEN`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ClassifierError;

/// Sequence length the model was trained with
pub const MAX_LEN: usize = 150;

const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

#[derive(Debug, Deserialize)]
struct KerasExport {
    config: KerasConfig,
}

#[derive(Debug, Deserialize)]
struct KerasConfig {
    #[serde(default)]
    num_words: Option<usize>,
    #[serde(default = "default_filters")]
    filters: String,
    #[serde(default = "default_true")]
    lower: bool,
    #[serde(default = "default_split")]
    split: String,
    #[serde(default)]
    char_level: bool,
    #[serde(default)]
    oov_token: Option<String>,
    /// Keras stores this as a JSON-encoded string
    word_index: serde_json::Value,
}

fn default_filters() -> String {
    DEFAULT_FILTERS.to_string()
}

fn default_true() -> bool {
    true
}

fn default_split() -> String {
    " ".to_string()
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    filters: String,
    lower: bool,
    split: String,
    char_level: bool,
    oov_index: Option<u32>,
    has_oov_token: bool,
}

impl Tokenizer {
    /// Character-level tokenizer over an explicit vocabulary
    #[cfg(test)]
    pub fn char_level(word_index: HashMap<String, u32>) -> Self {
        Self {
            word_index,
            num_words: None,
            filters: DEFAULT_FILTERS.to_string(),
            lower: true,
            split: default_split(),
            char_level: true,
            oov_index: None,
            has_oov_token: false,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::ModelUnavailable(format!("tokenizer {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ClassifierError> {
        let export: KerasExport = serde_json::from_str(content)
            .map_err(|e| ClassifierError::Tokenizer(format!("invalid tokenizer JSON: {}", e)))?;
        let config = export.config;

        let word_index: HashMap<String, u32> = match config.word_index {
            serde_json::Value::String(encoded) => serde_json::from_str(&encoded),
            other => serde_json::from_value(other),
        }
        .map_err(|e| ClassifierError::Tokenizer(format!("invalid word_index: {}", e)))?;

        let oov_index = config
            .oov_token
            .as_ref()
            .and_then(|token| word_index.get(token).copied());

        Ok(Self {
            word_index,
            num_words: config.num_words,
            filters: config.filters,
            lower: config.lower,
            split: config.split,
            char_level: config.char_level,
            oov_index,
            has_oov_token: config.oov_token.is_some(),
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.word_index.len()
    }

    /// Token ids for `text`, unpadded
    pub fn to_sequence(&self, text: &str) -> Vec<u32> {
        let text = if self.lower { text.to_lowercase() } else { text.to_string() };

        let tokens: Vec<String> = if self.char_level {
            text.chars().map(String::from).collect()
        } else {
            self.words(&text)
        };

        let mut sequence = Vec::with_capacity(tokens.len());
        for token in &tokens {
            match self.word_index.get(token) {
                Some(&index) => {
                    let over_cap = self.num_words.is_some_and(|n| index as usize >= n);
                    if !over_cap {
                        sequence.push(index);
                    } else if let Some(oov) = self.oov_index {
                        sequence.push(oov);
                    }
                }
                None => {
                    if self.has_oov_token {
                        if let Some(oov) = self.oov_index {
                            sequence.push(oov);
                        }
                    }
                }
            }
        }
        sequence
    }

    /// Fixed-length model input: post-truncated, zero post-padded
    pub fn encode(&self, text: &str) -> Vec<f32> {
        let mut encoded: Vec<f32> = self
            .to_sequence(text)
            .into_iter()
            .take(MAX_LEN)
            .map(|i| i as f32)
            .collect();
        encoded.resize(MAX_LEN, 0.0);
        encoded
    }

    fn words(&self, text: &str) -> Vec<String> {
        let replaced: String = text
            .chars()
            .map(|c| if self.filters.contains(c) { None } else { Some(c) })
            .fold(String::with_capacity(text.len()), |mut acc, c| {
                match c {
                    Some(c) => acc.push(c),
                    None => acc.push_str(&self.split),
                }
                acc
            });

        replaced
            .split(self.split.as_str())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}
