//! `preprocess` command: CSV in, scored CSV out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use ulasan_sentiment::{run_batch, Lexicon, PipelineOptions, PipelineStats};

#[derive(Debug, Serialize)]
pub(crate) struct PreprocessReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stats: PipelineStats,
}

/// `data.csv` becomes `data-processed.csv` in the same directory.
pub(crate) fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}-processed.csv"))
}

/// Read `input`, run the batch, write the kept rows.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the output
/// cannot be written.
pub(crate) async fn run_preprocess(
    input: &Path,
    output: Option<&Path>,
    lexicon: &Lexicon,
    options: PipelineOptions,
) -> anyhow::Result<PreprocessReport> {
    let rows = ulasan_scraper::read_rows_from_path(input).await?;
    tracing::info!(input = %input.display(), rows = rows.len(), "read input csv");

    let out = run_batch(rows, lexicon, &options);
    let bytes = ulasan_scraper::write_rows(&out.rows)?;

    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    tokio::fs::write(&output, bytes).await?;
    tracing::info!(output = %output.display(), kept = out.stats.output_count, "wrote output csv");

    Ok(PreprocessReport {
        input: input.to_path_buf(),
        output,
        stats: out.stats,
    })
}
