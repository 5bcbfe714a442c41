use std::path::PathBuf;

use uuid::Uuid;

use super::{validate_file_id, FileInfo, StoredFile};
use crate::error::ScraperError;
use crate::names::sanitize_file_name;

/// Keeps uploads in a directory on local disk.
///
/// File ids are `"{uuid}-{sanitized name}"` so the original name can be
/// recovered without a side index.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, file_id: &str) -> Result<PathBuf, ScraperError> {
        validate_file_id(file_id)?;
        Ok(self.root.join(file_id))
    }

    pub(super) async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<StoredFile, ScraperError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ScraperError::io(&self.root, e))?;

        let file_id = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(filename));
        let path = self.path_for(&file_id)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ScraperError::io(&path, e))?;

        Ok(StoredFile {
            url: self.download_url(&file_id),
            file_id,
        })
    }

    pub(super) fn download_url(&self, file_id: &str) -> String {
        self.root.join(file_id).display().to_string()
    }

    pub(super) async fn delete(&self, file_id: &str) -> Result<(), ScraperError> {
        let path = self.path_for(file_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScraperError::FileNotFound(file_id.to_string()))
            }
            Err(e) => Err(ScraperError::io(&path, e)),
        }
    }

    pub(super) async fn file_info(&self, file_id: &str) -> Result<FileInfo, ScraperError> {
        let path = self.path_for(file_id)?;
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScraperError::FileNotFound(file_id.to_string()));
            }
            Err(e) => return Err(ScraperError::io(&path, e)),
        };
        let name = file_id
            .split_once('-')
            .map_or(file_id, |(_, name)| name)
            .to_string();

        Ok(FileInfo {
            file_id: file_id.to_string(),
            name,
            size_bytes: meta.len(),
            mime_type: "text/csv".to_string(),
        })
    }
}
