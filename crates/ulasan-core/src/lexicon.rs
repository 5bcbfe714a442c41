//! Lexicon file format: positive/negative word lists, stopwords and the
//! display names written into the `sentiment` column.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const BUILTIN_LEXICON: &str = include_str!("../data/lexicon.yaml");

/// Text written for each sentiment label in output tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNames {
    pub positive: String,
    pub negative: String,
    pub neutral: String,
}

impl Default for LabelNames {
    fn default() -> Self {
        Self {
            positive: "Positif".to_string(),
            negative: "Negatif".to_string(),
            neutral: "Netral".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconFile {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    #[serde(default)]
    pub stopwords: Vec<String>,
    #[serde(default)]
    pub labels: LabelNames,
}

/// Load and validate a lexicon from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_lexicon(path: &Path) -> Result<LexiconFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LexiconFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_lexicon(&content)
}

/// Parse and validate lexicon YAML.
///
/// Words are trimmed and lowercased before validation so that they compare
/// equal to normalized review tokens.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_lexicon(content: &str) -> Result<LexiconFile, ConfigError> {
    let mut lexicon: LexiconFile = serde_yaml::from_str(content)?;
    lexicon.positive = normalize_words(lexicon.positive);
    lexicon.negative = normalize_words(lexicon.negative);
    lexicon.stopwords = normalize_words(lexicon.stopwords);
    validate_lexicon(&lexicon)?;
    Ok(lexicon)
}

/// The Indonesian lexicon compiled into the binary.
///
/// # Errors
///
/// Returns `ConfigError` only if the embedded file were edited into an
/// invalid state.
pub fn builtin_lexicon() -> Result<LexiconFile, ConfigError> {
    parse_lexicon(BUILTIN_LEXICON)
}

fn normalize_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .collect()
}

fn validate_lexicon(lexicon: &LexiconFile) -> Result<(), ConfigError> {
    let lists = [
        ("positive", &lexicon.positive),
        ("negative", &lexicon.negative),
        ("stopwords", &lexicon.stopwords),
    ];
    for (name, words) in lists {
        // Normalized review text only ever holds `[a-z]+` tokens.
        if let Some(bad) = words
            .iter()
            .find(|w| w.is_empty() || !w.bytes().all(|b| b.is_ascii_lowercase()))
        {
            return Err(ConfigError::Validation(format!(
                "{name} entry '{bad}' must be a single non-empty word of letters a-z"
            )));
        }
    }

    let positive: HashSet<&str> = lexicon.positive.iter().map(String::as_str).collect();
    if let Some(word) = lexicon
        .negative
        .iter()
        .find(|w| positive.contains(w.as_str()))
    {
        return Err(ConfigError::Validation(format!(
            "word '{word}' is listed as both positive and negative"
        )));
    }

    let labels = [
        &lexicon.labels.positive,
        &lexicon.labels.negative,
        &lexicon.labels.neutral,
    ];
    if labels.iter().any(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "label names must be non-empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "lexicon_test.rs"]
mod tests;
