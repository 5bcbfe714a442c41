//! Per-job metadata persisted between the scrape and preprocess steps.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;
use crate::harvest::Tab;

/// Written as `{data_dir}/{job_id}.json` once a scrape succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMeta {
    pub job_id: String,
    pub csv_path: PathBuf,
    pub file_id: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub search_keyword: String,
    pub limit: u32,
    pub tab: Tab,
}

/// Job metadata files under the data directory.
#[derive(Debug, Clone)]
pub struct JobStore {
    dir: PathBuf,
}

impl JobStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the preprocessed CSV for `job_id` is written.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidJobId`] for ids that are not safe file
    /// name components.
    pub fn processed_path(&self, job_id: &str) -> Result<PathBuf, ScraperError> {
        validate_job_id(job_id)?;
        Ok(self.dir.join(format!("{job_id}-processed.csv")))
    }

    fn meta_path(&self, job_id: &str) -> Result<PathBuf, ScraperError> {
        validate_job_id(job_id)?;
        Ok(self.dir.join(format!("{job_id}.json")))
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the directory or file cannot be
    /// written.
    pub async fn save(&self, meta: &JobMeta) -> Result<PathBuf, ScraperError> {
        let path = self.meta_path(&meta.job_id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ScraperError::io(&self.dir, e))?;
        let body = serde_json::to_vec_pretty(meta).map_err(|source| ScraperError::Json {
            context: format!("job meta {}", meta.job_id),
            source,
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| ScraperError::io(&path, e))?;
        Ok(path)
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::JobNotFound`] when no metadata exists for the
    /// id, or [`ScraperError::Json`] if the file is corrupt.
    pub async fn load(&self, job_id: &str) -> Result<JobMeta, ScraperError> {
        let path = self.meta_path(job_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScraperError::JobNotFound(job_id.to_string()));
            }
            Err(e) => return Err(ScraperError::io(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| ScraperError::Json {
            context: format!("job meta {job_id}"),
            source,
        })
    }

    /// Delete the metadata file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] for any other removal failure.
    pub async fn remove(&self, job_id: &str) -> Result<(), ScraperError> {
        let path = self.meta_path(job_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScraperError::io(&path, e)),
        }
    }
}

/// Job ids are UUIDs in practice; accept any non-empty run of ASCII
/// alphanumerics and `-` so the id can never escape the data directory.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidJobId`] otherwise.
pub fn validate_job_id(job_id: &str) -> Result<(), ScraperError> {
    if !job_id.is_empty()
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        Ok(())
    } else {
        Err(ScraperError::InvalidJobId(job_id.to_string()))
    }
}
