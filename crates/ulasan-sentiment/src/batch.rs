//! Batch driver: folds a whole table through [`RowPipeline`].

use serde::Serialize;

use crate::pipeline::{RowOutcome, RowPipeline};
use crate::scorer::Lexicon;
use crate::types::{PipelineOptions, PipelineStats, Row};

/// Result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    /// Kept rows, in input order.
    pub rows: Vec<Row>,
    pub stats: PipelineStats,
    /// First `preview_limit` kept rows.
    pub preview: Vec<Row>,
}

/// Run every row through the pipeline once, in order.
///
/// Never fails on row content: missing or non-text fields are coerced.
/// Accumulators are created fresh for each call.
#[must_use]
pub fn run_batch(rows: Vec<Row>, lexicon: &Lexicon, options: &PipelineOptions) -> BatchOutput {
    let input_count = rows.len();
    let mut pipeline = RowPipeline::new(lexicon, options);
    let mut kept = Vec::new();

    for row in rows {
        if let RowOutcome::Kept(row) = pipeline.process(row) {
            kept.push(row);
        }
    }

    let stats = pipeline.finish(input_count, kept.len());
    let preview = kept.iter().take(options.preview_limit).cloned().collect();

    tracing::info!(
        input = stats.input_count,
        output = stats.output_count,
        dropped_empty = stats.dropped_empty,
        dropped_duplicate = stats.dropped_duplicate,
        positive = stats.distribution.positive,
        negative = stats.distribution.negative,
        neutral = stats.distribution.neutral,
        "batch complete"
    );

    BatchOutput {
        rows: kept,
        stats,
        preview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CLEAN_TEXT_FIELD, SCORE_FIELD, SENTIMENT_FIELD};
    use crate::types::{CellValue, SentimentLabel};

    fn lexicon() -> Lexicon {
        Lexicon::from(ulasan_core::builtin_lexicon().expect("built-in lexicon"))
    }

    fn rows(texts: &[&str]) -> Vec<Row> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Row::new()
                    .with_field("id", i64::try_from(i).expect("small index"))
                    .with_field("full_text", *text)
            })
            .collect()
    }

    fn assert_count_invariant(stats: &PipelineStats) {
        assert_eq!(
            stats.input_count,
            stats.output_count + stats.dropped_empty + stats.dropped_duplicate,
            "count invariant broken: {stats:?}"
        );
        assert_eq!(stats.output_count, stats.distribution.total());
    }

    #[test]
    fn scenario_positive_review_with_stopword() {
        let out = run_batch(
            rows(&["Aplikasi ini sangat bagus!!!"]),
            &lexicon(),
            &PipelineOptions::default(),
        );
        assert_eq!(out.stats.output_count, 1);
        assert_eq!(out.stats.dropped_empty, 0);
        assert_eq!(out.stats.dropped_duplicate, 0);
        assert_eq!(out.stats.distribution.positive, 1);
        let row = &out.rows[0];
        assert_eq!(row.text(CLEAN_TEXT_FIELD), "aplikasi sangat bagus");
        assert_eq!(row.get(SCORE_FIELD), Some(&CellValue::from(1_i64)));
        assert_count_invariant(&out.stats);
    }

    #[test]
    fn scenario_blank_rows_are_dropped() {
        let out = run_batch(rows(&["", "   "]), &lexicon(), &PipelineOptions::default());
        assert_eq!(out.stats.input_count, 2);
        assert_eq!(out.stats.output_count, 0);
        assert_eq!(out.stats.dropped_empty, 2);
        assert!(out.rows.is_empty());
        assert!(out.preview.is_empty());
        assert_count_invariant(&out.stats);
    }

    #[test]
    fn scenario_duplicate_dropped_first_kept() {
        let opts = PipelineOptions {
            use_stopwords: false,
            ..PipelineOptions::default()
        };
        let out = run_batch(rows(&["bagus", "bagus"]), &lexicon(), &opts);
        assert_eq!(out.stats.output_count, 1);
        assert_eq!(out.stats.dropped_duplicate, 1);
        assert_eq!(out.rows[0].text("id"), "0");
        assert_eq!(out.rows[0].text(SENTIMENT_FIELD), "Positif");
        assert_count_invariant(&out.stats);
    }

    #[test]
    fn scenario_two_negative_words() {
        let out = run_batch(rows(&["jelek parah"]), &lexicon(), &PipelineOptions::default());
        assert_eq!(out.rows[0].get(SCORE_FIELD), Some(&CellValue::from(-2_i64)));
        assert_eq!(out.stats.distribution.negative, 1);
    }

    #[test]
    fn scenario_no_lexicon_hits_is_neutral() {
        let out = run_batch(
            rows(&["terserah saja"]),
            &lexicon(),
            &PipelineOptions::default(),
        );
        assert_eq!(out.rows[0].get(SCORE_FIELD), Some(&CellValue::from(0_i64)));
        assert_eq!(out.rows[0].text(SENTIMENT_FIELD), "Netral");
        assert_eq!(out.stats.distribution.neutral, 1);
    }

    #[test]
    fn empty_input_yields_zero_stats() {
        let out = run_batch(Vec::new(), &lexicon(), &PipelineOptions::default());
        assert_eq!(out.stats.input_count, 0);
        assert_eq!(out.stats.output_count, 0);
        assert_count_invariant(&out.stats);
    }

    #[test]
    fn kept_rows_preserve_input_order() {
        let texts = ["bagus", "", "jelek", "bagus", "biasa", "  ", "keren"];
        let out = run_batch(rows(&texts), &lexicon(), &PipelineOptions::default());
        let ids: Vec<String> = out.rows.iter().map(|r| r.text("id")).collect();
        assert_eq!(ids, vec!["0", "2", "4", "6"]);
        assert_count_invariant(&out.stats);
    }

    #[test]
    fn count_invariant_holds_for_every_flag_combination() {
        let texts = [
            "bagus", "bagus", "", "   ", "ini itu", "jelek parah", "!!!", "!!!", "Jelek Parah",
        ];
        for use_stopwords in [false, true] {
            for dedup in [false, true] {
                for drop_empty in [false, true] {
                    let opts = PipelineOptions {
                        use_stopwords,
                        dedup,
                        drop_empty,
                        ..PipelineOptions::default()
                    };
                    let out = run_batch(rows(&texts), &lexicon(), &opts);
                    assert_eq!(out.stats.input_count, texts.len());
                    assert_count_invariant(&out.stats);
                }
            }
        }
    }

    #[test]
    fn label_agrees_with_score_for_every_kept_row() {
        let texts = ["bagus jelek", "bagus bagus", "jelek", "netral saja", "gagal sukses gagal"];
        let lex = lexicon();
        let out = run_batch(rows(&texts), &lex, &PipelineOptions::default());
        for row in &out.rows {
            let score = lex.score(&row.text(CLEAN_TEXT_FIELD));
            let expected = SentimentLabel::from_score(score).display_name(lex.labels());
            assert_eq!(row.text(SENTIMENT_FIELD), expected);
            assert_eq!(row.get(SCORE_FIELD), Some(&CellValue::from(score)));
        }
    }

    #[test]
    fn preview_is_bounded() {
        let texts: Vec<String> = (0..120)
            .map(|i| format!("ulasan nomor {}", "a".repeat(i + 1)))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let out = run_batch(rows(&refs), &lexicon(), &PipelineOptions::default());
        assert_eq!(out.stats.output_count, 120);
        assert_eq!(out.preview.len(), 50);
        assert_eq!(out.preview[..], out.rows[..50]);
    }

    #[test]
    fn preview_limit_is_configurable() {
        let opts = PipelineOptions {
            preview_limit: 2,
            ..PipelineOptions::default()
        };
        let out = run_batch(rows(&["bagus", "jelek", "keren"]), &lexicon(), &opts);
        assert_eq!(out.preview.len(), 2);
        assert_eq!(out.rows.len(), 3);
    }
}
