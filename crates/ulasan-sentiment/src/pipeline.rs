//! Per-row cleaning, filtering and scoring.

use std::collections::HashSet;

use crate::normalize::normalize;
use crate::scorer::Lexicon;
use crate::types::{
    CellValue, DistributionCounters, PipelineOptions, PipelineStats, Row, SentimentLabel,
};

pub const CLEAN_TEXT_FIELD: &str = "clean_text";
pub const SCORE_FIELD: &str = "score";
pub const SENTIMENT_FIELD: &str = "sentiment";

/// Terminal state of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row survived; carries the input fields plus `clean_text`,
    /// `score` and `sentiment`.
    Kept(Row),
    DroppedEmpty,
    DroppedDuplicate,
}

/// Normalize raw text and, when requested, strip stopwords.
#[must_use]
pub fn clean_text(raw: &str, lexicon: &Lexicon, use_stopwords: bool) -> String {
    let normalized = normalize(raw);
    if use_stopwords {
        lexicon.remove_stopwords(&normalized)
    } else {
        normalized
    }
}

/// Stateful per-batch row processor.
///
/// Owns the seen-key set and running counters for exactly one batch; build a
/// new one for every batch so concurrent runs never share state.
pub struct RowPipeline<'a> {
    lexicon: &'a Lexicon,
    options: &'a PipelineOptions,
    seen: HashSet<String>,
    distribution: DistributionCounters,
    dropped_empty: usize,
    dropped_duplicate: usize,
}

impl<'a> RowPipeline<'a> {
    #[must_use]
    pub fn new(lexicon: &'a Lexicon, options: &'a PipelineOptions) -> Self {
        Self {
            lexicon,
            options,
            seen: HashSet::new(),
            distribution: DistributionCounters::default(),
            dropped_empty: 0,
            dropped_duplicate: 0,
        }
    }

    /// Run one row through the pipeline.
    ///
    /// Order is fixed: raw empty check, clean, cleaned empty check, dedup,
    /// score. An empty row is never counted as a duplicate and a duplicate is
    /// never scored.
    pub fn process(&mut self, row: Row) -> RowOutcome {
        let raw = row.text(&self.options.text_field);

        if self.options.drop_empty && raw.trim().is_empty() {
            self.dropped_empty += 1;
            return RowOutcome::DroppedEmpty;
        }

        let cleaned = clean_text(&raw, self.lexicon, self.options.use_stopwords);

        // Catches rows whose content was entirely stripped by cleaning.
        if self.options.drop_empty && cleaned.trim().is_empty() {
            self.dropped_empty += 1;
            return RowOutcome::DroppedEmpty;
        }

        if self.options.dedup {
            let key = if cleaned.is_empty() {
                raw.clone()
            } else {
                cleaned.clone()
            };
            if !self.seen.insert(key) {
                self.dropped_duplicate += 1;
                return RowOutcome::DroppedDuplicate;
            }
        }

        let score = self.lexicon.score(&cleaned);
        let label = SentimentLabel::from_score(score);
        self.distribution.increment(label);

        let sentiment = label.display_name(self.lexicon.labels()).to_string();
        RowOutcome::Kept(
            row.with_field(CLEAN_TEXT_FIELD, CellValue::Text(cleaned))
                .with_field(SCORE_FIELD, score)
                .with_field(SENTIMENT_FIELD, sentiment),
        )
    }

    #[must_use]
    pub fn distribution(&self) -> DistributionCounters {
        self.distribution
    }

    /// Close the batch and produce its stats.
    #[must_use]
    pub fn finish(self, input_count: usize, output_count: usize) -> PipelineStats {
        PipelineStats {
            input_count,
            output_count,
            dropped_empty: self.dropped_empty,
            dropped_duplicate: self.dropped_duplicate,
            distribution: self.distribution,
        }
    }
}
