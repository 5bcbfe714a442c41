//! Word-list sentiment scorer.

use std::collections::HashSet;

use ulasan_core::{LabelNames, LexiconFile};

use crate::stopwords::remove_stopwords;
use crate::types::SentimentLabel;

/// Positive and negative word sets, the stopword list and label spellings,
/// loaded once at startup and shared read-only by every batch.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    stopwords: HashSet<String>,
    labels: LabelNames,
}

impl From<LexiconFile> for Lexicon {
    fn from(file: LexiconFile) -> Self {
        Self {
            positive: file.positive.into_iter().collect(),
            negative: file.negative.into_iter().collect(),
            stopwords: file.stopwords.into_iter().collect(),
            labels: file.labels,
        }
    }
}

impl Lexicon {
    /// Build a lexicon from in-memory word lists. Words are expected to be
    /// lowercase already.
    pub fn new<P, N, S>(positive: P, negative: N, stopwords: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            positive: positive.into_iter().map(Into::into).collect(),
            negative: negative.into_iter().map(Into::into).collect(),
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            labels: LabelNames::default(),
        }
    }

    #[must_use]
    pub fn with_labels(mut self, labels: LabelNames) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn labels(&self) -> &LabelNames {
        &self.labels
    }

    #[must_use]
    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Signed lexicon score of cleaned text.
    ///
    /// Each token in the positive set adds one, each token in the negative
    /// set subtracts one. The sum is not clamped.
    #[must_use]
    pub fn score(&self, cleaned: &str) -> i64 {
        let mut score = 0_i64;
        for token in cleaned.split_whitespace() {
            if self.positive.contains(token) {
                score += 1;
            }
            if self.negative.contains(token) {
                score -= 1;
            }
        }
        score
    }

    /// Tokens of `cleaned` found in the positive and negative sets, in text
    /// order, repeats included.
    #[must_use]
    pub fn matches(&self, cleaned: &str) -> (Vec<String>, Vec<String>) {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for token in cleaned.split_whitespace() {
            if self.positive.contains(token) {
                positive.push(token.to_string());
            }
            if self.negative.contains(token) {
                negative.push(token.to_string());
            }
        }
        (positive, negative)
    }

    #[must_use]
    pub fn remove_stopwords(&self, normalized: &str) -> String {
        remove_stopwords(normalized, &self.stopwords)
    }
}

/// Map a lexicon score to its label. Zero is always neutral.
#[must_use]
pub fn label_from_score(score: i64) -> SentimentLabel {
    SentimentLabel::from_score(score)
}
