//! Review text cleaning and lexicon sentiment scoring.
//!
//! Rows read from a scraped CSV are normalized, stripped of stopwords,
//! deduplicated and scored against a positive/negative word list. The
//! [`run_batch`] driver folds a whole table through the per-row
//! [`RowPipeline`] and reports [`PipelineStats`].

pub mod batch;
pub mod normalize;
pub mod pipeline;
pub mod predict;
pub mod scorer;
pub mod stopwords;
pub mod types;

pub use batch::{run_batch, BatchOutput};
pub use normalize::normalize;
pub use pipeline::{
    clean_text, RowOutcome, RowPipeline, CLEAN_TEXT_FIELD, SCORE_FIELD, SENTIMENT_FIELD,
};
pub use predict::{
    analyze_texts, predict, Analysis, AnalysisStats, PercentDistribution, Prediction,
    PredictionOutput,
};
pub use scorer::{label_from_score, Lexicon};
pub use stopwords::remove_stopwords;
pub use types::{
    CellValue, DistributionCounters, PipelineOptions, PipelineStats, Row, SentimentLabel,
    DEFAULT_PREVIEW_LIMIT, DEFAULT_TEXT_FIELD,
};
