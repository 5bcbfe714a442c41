//! Ad-hoc scoring of free text outside a batch.

use serde::Serialize;

use crate::pipeline::clean_text;
use crate::scorer::Lexicon;
use crate::types::{DistributionCounters, SentimentLabel};

/// Score at which confidence saturates at 1.0.
const CONFIDENCE_SATURATION: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub sentiment: SentimentLabel,
    pub score: i64,
    /// `min(|score| / 5, 1)`.
    pub confidence: f64,
    /// Score per token; `0.0` for text with no tokens.
    pub comparative: f64,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    pub original: String,
    /// The text that was actually scored.
    pub processed: String,
    pub prediction: Prediction,
}

/// Score a single piece of text.
///
/// Text is always normalized so tokens can match the lexicon; `preprocess`
/// controls whether stopwords are removed as well.
#[must_use]
pub fn predict(text: &str, lexicon: &Lexicon, preprocess: bool) -> PredictionOutput {
    let processed = clean_text(text, lexicon, preprocess);
    let prediction = score_cleaned(&processed, lexicon);
    PredictionOutput {
        original: text.to_string(),
        processed,
        prediction,
    }
}

#[allow(clippy::cast_precision_loss)]
fn score_cleaned(cleaned: &str, lexicon: &Lexicon) -> Prediction {
    let score = lexicon.score(cleaned);
    let (positive, negative) = lexicon.matches(cleaned);
    let token_count = cleaned.split_whitespace().count();

    let comparative = if token_count == 0 {
        0.0
    } else {
        score as f64 / token_count as f64
    };
    let confidence = (score.unsigned_abs() as f64 / CONFIDENCE_SATURATION).min(1.0);

    Prediction {
        sentiment: SentimentLabel::from_score(score),
        score,
        confidence,
        comparative,
        positive,
        negative,
    }
}

/// Label counts plus their share of the total, formatted with one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisStats {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub distribution: PercentDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PercentDistribution {
    pub positive: String,
    pub negative: String,
    pub neutral: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub results: Vec<Prediction>,
    pub stats: AnalysisStats,
}

/// Score every text independently. No rows are dropped or deduplicated.
#[must_use]
pub fn analyze_texts<S: AsRef<str>>(texts: &[S], lexicon: &Lexicon) -> Analysis {
    let mut counts = DistributionCounters::default();
    let results: Vec<Prediction> = texts
        .iter()
        .map(|text| {
            let prediction = score_cleaned(&clean_text(text.as_ref(), lexicon, true), lexicon);
            counts.increment(prediction.sentiment);
            prediction
        })
        .collect();

    let total = results.len();
    Analysis {
        results,
        stats: AnalysisStats {
            total,
            positive: counts.positive,
            negative: counts.negative,
            neutral: counts.neutral,
            distribution: PercentDistribution {
                positive: percent(counts.positive, total),
                negative: percent(counts.negative, total),
                neutral: percent(counts.neutral, total),
            },
        },
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", count as f64 * 100.0 / total as f64)
}
