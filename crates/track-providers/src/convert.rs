use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::TrackHit;

#[derive(Debug, thiserror::Error)]
pub enum ConvertApiError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Conversion service responded with status {0}")]
    BadStatus(StatusCode),
    #[error("Conversion service rejected the request: {0}")]
    Rejected(String),
}

/// Client for the URL-to-MP3 conversion service. The service accepts a
/// media page URL, converts its audio stream server-side and hands back
/// a short-lived download link.
pub struct ConvertApiClient {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    url: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct ConvertResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Deserialize)]
struct MediaInfoResponse {
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl ConvertApiClient {
    pub fn create(endpoint: String) -> Self {
        let client = Client::new();

        Self { client, endpoint }
    }

    /// Fetches title/author/duration for a media URL without converting it.
    pub async fn resolve_metadata(&self, url: &str) -> Result<TrackHit, ConvertApiError> {
        let response = self
            .client
            .post(format!("{}/info", self.endpoint))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConvertApiError::BadStatus(response.status()));
        }

        let info = response.json::<MediaInfoResponse>().await?;

        Ok(TrackHit {
            title: info.title,
            author: info.author,
            duration: info.duration,
            thumbnail: info.thumbnail,
            url: url.to_string(),
        })
    }

    /// Converts the media behind `url` to MP3 and streams the result into
    /// `dest`. The destination file is created (or truncated) here; the
    /// caller owns its lifecycle afterwards.
    pub async fn download_mp3(&self, url: &str, dest: &Path) -> Result<(), ConvertApiError> {
        let request = ConvertRequest { url, format: "mp3" };

        let response = self
            .client
            .post(format!("{}/convert", self.endpoint))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConvertApiError::BadStatus(response.status()));
        }

        let conversion = response.json::<ConvertResponse>().await?;

        let download_url = match (conversion.success, conversion.download_url) {
            (true, Some(download_url)) => download_url,
            _ => {
                let reason = conversion
                    .error
                    .unwrap_or_else(|| "no download link in response".to_string());
                return Err(ConvertApiError::Rejected(reason));
            }
        };

        debug!(url, download_url = %download_url, "Conversion finished, downloading the file");

        let mut response = self.client.get(&download_url).send().await?;

        if !response.status().is_success() {
            return Err(ConvertApiError::BadStatus(response.status()));
        }

        let mut file = tokio::fs::File::create(dest).await?;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }

        file.flush().await?;

        Ok(())
    }
}
