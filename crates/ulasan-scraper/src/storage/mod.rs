//! Object storage for scraped and processed CSV files.
//!
//! The backend is chosen once from configuration and carried in
//! [`ObjectStore`]; callers never branch on the backend themselves.

mod appwrite;
mod local;

use serde::Serialize;
use ulasan_core::StorageBackend;

use crate::error::ScraperError;

pub use appwrite::AppwriteStore;
pub use local::LocalStore;

/// Handle to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub file_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub file_id: String,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub enum ObjectStore {
    Local(LocalStore),
    Appwrite(AppwriteStore),
}

impl ObjectStore {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the Appwrite HTTP client cannot be
    /// built.
    pub fn from_backend(backend: &StorageBackend, timeout_secs: u64) -> Result<Self, ScraperError> {
        Ok(match backend {
            StorageBackend::Local { root } => Self::Local(LocalStore::new(root.clone())),
            StorageBackend::Appwrite(config) => {
                Self::Appwrite(AppwriteStore::new(config, timeout_secs)?)
            }
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Appwrite(_) => "appwrite",
        }
    }

    /// # Errors
    ///
    /// Propagates the backend's I/O or HTTP failure.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<StoredFile, ScraperError> {
        let stored = match self {
            Self::Local(store) => store.upload(bytes, filename).await?,
            Self::Appwrite(store) => store.upload(bytes, filename).await?,
        };
        tracing::info!(
            backend = self.backend_name(),
            file_id = %stored.file_id,
            filename,
            "file uploaded"
        );
        Ok(stored)
    }

    #[must_use]
    pub fn download_url(&self, file_id: &str) -> String {
        match self {
            Self::Local(store) => store.download_url(file_id),
            Self::Appwrite(store) => store.download_url(file_id),
        }
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::FileNotFound`] for an unknown id, or the
    /// backend's I/O or HTTP failure.
    pub async fn delete(&self, file_id: &str) -> Result<(), ScraperError> {
        match self {
            Self::Local(store) => store.delete(file_id).await,
            Self::Appwrite(store) => store.delete(file_id).await,
        }
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::FileNotFound`] for an unknown id, or the
    /// backend's I/O or HTTP failure.
    pub async fn file_info(&self, file_id: &str) -> Result<FileInfo, ScraperError> {
        match self {
            Self::Local(store) => store.file_info(file_id).await,
            Self::Appwrite(store) => store.file_info(file_id).await,
        }
    }
}

/// Storage file ids are restricted to `[A-Za-z0-9_.-]` and may not start
/// with a `.`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidFileId`] otherwise.
pub fn validate_file_id(file_id: &str) -> Result<(), ScraperError> {
    let valid = !file_id.is_empty()
        && !file_id.starts_with('.')
        && file_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ScraperError::InvalidFileId(file_id.to_string()))
    }
}
