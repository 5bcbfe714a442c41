//! `scrape` command: run one harvest job, log to stderr, summary to stdout.

use std::io::Write;

use tokio::sync::mpsc::Receiver;
use ulasan_core::AppConfig;
use ulasan_scraper::{
    EventSink, Harvester, JobEvent, JobStore, ObjectStore, ScrapeRequest, ScrapeSummary, Scraper,
};

/// # Errors
///
/// Returns an error if storage cannot be set up or the job fails.
pub(crate) async fn run_scrape(config: &AppConfig, request: ScrapeRequest) -> anyhow::Result<()> {
    let store = ObjectStore::from_backend(&config.storage, config.storage_timeout_secs)?;
    let scraper = Scraper::new(
        Harvester::new(config.harvest_bin.clone(), &config.data_dir),
        store,
        JobStore::new(&config.data_dir),
        config.preview_limit,
    );

    let (sink, rx) = EventSink::channel();
    let job = tokio::spawn(async move { scraper.run(request, sink).await });

    let outcome = relay_events(rx, &mut std::io::stderr()).await?;
    job.await?;

    match outcome {
        Some(Ok(summary)) => write_summary(&mut std::io::stdout().lock(), &summary),
        Some(Err(message)) => anyhow::bail!("scrape failed: {message}"),
        None => anyhow::bail!("scrape ended without a result"),
    }
}

/// Write each log line to `log` until `done`, returning the job's result.
pub(crate) async fn relay_events<W: Write>(
    mut rx: Receiver<JobEvent>,
    log: &mut W,
) -> std::io::Result<Option<Result<ScrapeSummary, String>>> {
    let mut outcome = None;
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::Log(line) => writeln!(log, "{line}")?,
            JobEvent::Result(result) => outcome = Some(result),
            JobEvent::Done => break,
        }
    }
    Ok(outcome)
}

pub(crate) fn write_summary<W: Write>(out: &mut W, summary: &ScrapeSummary) -> anyhow::Result<()> {
    let json = serde_json::json!({
        "job_id": summary.job_id,
        "count": summary.count,
        "file_id": summary.file_id,
        "file_url": summary.file_url,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
    Ok(())
}
