use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage returned HTTP {status} for {url}: {body}")]
    StorageStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("failed to start {bin}: {source}")]
    HarvestSpawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    HarvestExit { code: Option<i32>, message: String },

    #[error("harvester finished but wrote no file at {0}")]
    HarvestOutputMissing(PathBuf),

    #[error("Twitter auth token tidak valid")]
    InvalidToken,

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid job id \"{0}\"")]
    InvalidJobId(String),

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("invalid file id \"{0}\"")]
    InvalidFileId(String),

    #[error("file {0} not found in storage")]
    FileNotFound(String),
}

impl ScraperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
