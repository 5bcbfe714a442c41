use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use ulasan_core::AppwriteConfig;
use uuid::Uuid;

use super::{validate_file_id, FileInfo, StoredFile};
use crate::error::ScraperError;

/// Appwrite Storage bucket accessed over its REST API.
#[derive(Debug, Clone)]
pub struct AppwriteStore {
    client: Client,
    config: AppwriteConfig,
}

#[derive(Debug, Deserialize)]
struct AppwriteFile {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "sizeOriginal", default)]
    size_original: u64,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}

impl AppwriteStore {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AppwriteConfig, timeout_secs: u64) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn files_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.config.endpoint, self.config.bucket_id
        )
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/{file_id}", self.files_url())
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Key", &self.config.api_key)
    }

    pub(super) fn download_url(&self, file_id: &str) -> String {
        format!(
            "{}/download?project={}",
            self.file_url(file_id),
            self.config.project_id
        )
    }

    pub(super) async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<StoredFile, ScraperError> {
        let file_id = Uuid::new_v4().simple().to_string();
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().text("fileId", file_id).part("file", part);

        let url = self.files_url();
        let response = self
            .authed(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;
        let file: AppwriteFile = parse_json(check_status(response, &url, None).await?, &url).await?;

        Ok(StoredFile {
            url: self.download_url(&file.id),
            file_id: file.id,
        })
    }

    pub(super) async fn delete(&self, file_id: &str) -> Result<(), ScraperError> {
        validate_file_id(file_id)?;
        let url = self.file_url(file_id);
        let response = self.authed(self.client.delete(&url)).send().await?;
        check_status(response, &url, Some(file_id)).await?;
        Ok(())
    }

    pub(super) async fn file_info(&self, file_id: &str) -> Result<FileInfo, ScraperError> {
        validate_file_id(file_id)?;
        let url = self.file_url(file_id);
        let response = self.authed(self.client.get(&url)).send().await?;
        let file: AppwriteFile =
            parse_json(check_status(response, &url, Some(file_id)).await?, &url).await?;
        Ok(FileInfo {
            file_id: file.id,
            name: file.name,
            size_bytes: file.size_original,
            mime_type: file.mime_type,
        })
    }
}

/// Map non-2xx responses to typed errors; a 404 on a known id is
/// [`ScraperError::FileNotFound`].
async fn check_status(
    response: Response,
    url: &str,
    file_id: Option<&str>,
) -> Result<Response, ScraperError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(file_id) = file_id {
            return Err(ScraperError::FileNotFound(file_id.to_string()));
        }
    }
    let body = response.text().await.unwrap_or_default();
    Err(ScraperError::StorageStatus {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
    url: &str,
) -> Result<T, ScraperError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| ScraperError::Json {
        context: format!("storage response from {url}"),
        source,
    })
}
