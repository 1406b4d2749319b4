use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{format_duration, TrackHit};

#[derive(Debug, thiserror::Error)]
pub enum VidApiError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error("Search API responded with status {0}")]
    BadStatus(StatusCode),
}

/// Client for the JSON video search API used as the last-resort search
/// backend.
pub struct VidApiClient {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct VidApiItem {
    title: String,
    url: String,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl VidApiClient {
    pub fn create(endpoint: String) -> Self {
        let client = Client::new();

        Self { client, endpoint }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<TrackHit>, VidApiError> {
        let response = self
            .client
            .get(format!("{}/api/v1/search", self.endpoint))
            .query(&[("q", query), ("type", "video")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VidApiError::BadStatus(response.status()));
        }

        let items = response.json::<Vec<VidApiItem>>().await?;

        Ok(items
            .into_iter()
            .take(limit)
            .map(|item| TrackHit {
                title: item.title,
                author: item.uploader,
                duration: item.duration.map(|secs| format_duration(secs as u64)),
                thumbnail: item.thumbnail,
                url: item.url,
            })
            .collect())
    }
}
