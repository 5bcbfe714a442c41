//! One scrape job end to end: harvest, read, upload, record metadata.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::csv_io::read_rows_from_path;
use crate::error::ScraperError;
use crate::events::{EventSink, JobEvent, ScrapeSummary};
use crate::harvest::{HarvestArgs, Harvester, Tab};
use crate::jobs::{JobMeta, JobStore};
use crate::names::job_file_name;
use crate::storage::ObjectStore;

const MIN_TOKEN_LEN: usize = 20;
const MIN_KEYWORD_LEN: usize = 3;
const MAX_LIMIT: u32 = 5000;

fn default_filename() -> String {
    "data.csv".to_string()
}

fn default_limit() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    pub token: String,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(alias = "searchKeyword")]
    pub search_keyword: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub tab: Tab,
}

impl ScrapeRequest {
    /// # Errors
    ///
    /// Returns [`ScraperError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.token.chars().count() < MIN_TOKEN_LEN {
            return Err(ScraperError::Validation(format!(
                "token must be at least {MIN_TOKEN_LEN} characters"
            )));
        }
        if self.search_keyword.chars().count() < MIN_KEYWORD_LEN {
            return Err(ScraperError::Validation(format!(
                "search_keyword must be at least {MIN_KEYWORD_LEN} characters"
            )));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(ScraperError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Everything a scrape job needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Scraper {
    harvester: Harvester,
    store: ObjectStore,
    jobs: JobStore,
    preview_limit: usize,
}

impl Scraper {
    #[must_use]
    pub fn new(
        harvester: Harvester,
        store: ObjectStore,
        jobs: JobStore,
        preview_limit: usize,
    ) -> Self {
        Self {
            harvester,
            store,
            jobs,
            preview_limit,
        }
    }

    /// Run a job and report through `sink`.
    ///
    /// Always finishes with exactly one `result` event followed by `done`,
    /// whether the request was invalid, the harvester failed, or the job
    /// succeeded.
    pub async fn run(&self, request: ScrapeRequest, sink: EventSink) {
        let result = match self.execute(&request, &sink).await {
            Ok(summary) => {
                tracing::info!(
                    job_id = %summary.job_id,
                    count = summary.count,
                    "scrape job finished"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(error = %e, "scrape job failed");
                sink.log(format!("[ERROR] {e}"));
                Err(e.to_string())
            }
        };
        sink.send(JobEvent::Result(result)).await;
        sink.send(JobEvent::Done).await;
    }

    async fn execute(
        &self,
        request: &ScrapeRequest,
        sink: &EventSink,
    ) -> Result<ScrapeSummary, ScraperError> {
        request.validate()?;

        let job_id = Uuid::new_v4().to_string();
        let filename = job_file_name(&job_id, &request.filename);
        sink.log(format!("[INIT] Job ID: {job_id}"));
        sink.log(format!("[INIT] Filename: {filename}"));

        let args = HarvestArgs {
            filename: filename.clone(),
            search_keyword: request.search_keyword.clone(),
            limit: request.limit,
            token: request.token.clone(),
            tab: request.tab,
        };
        let csv_path = self.harvester.run(&args, sink).await?;

        sink.log("[READ] Reading CSV file...");
        let rows = read_rows_from_path(&csv_path).await?;
        sink.log(format!("[READ] Found {} rows", rows.len()));

        sink.log(format!(
            "[UPLOAD] Uploading to {} storage...",
            self.store.backend_name()
        ));
        let bytes = tokio::fs::read(&csv_path)
            .await
            .map_err(|e| ScraperError::io(&csv_path, e))?;
        let stored = self.store.upload(bytes, &filename).await?;
        sink.log(format!("[UPLOAD] Upload complete - File ID: {}", stored.file_id));

        let meta = JobMeta {
            job_id: job_id.clone(),
            csv_path,
            file_id: stored.file_id.clone(),
            file_url: stored.url.clone(),
            created_at: Utc::now(),
            search_keyword: request.search_keyword.clone(),
            limit: request.limit,
            tab: request.tab,
        };
        self.jobs.save(&meta).await?;
        sink.log("[SAVE] Metadata saved");

        let count = rows.len();
        let preview = rows.into_iter().take(self.preview_limit).collect();
        Ok(ScrapeSummary {
            job_id,
            count,
            preview,
            file_id: stored.file_id,
            file_url: stored.url,
        })
    }
}
