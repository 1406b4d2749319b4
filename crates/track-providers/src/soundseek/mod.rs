mod parser;


use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::TrackHit;
use parser::{parse_search_results, ParseError};

#[derive(Debug, thiserror::Error)]
pub enum SoundSeekError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error("SoundSeek responded with status {0}")]
    BadStatus(StatusCode),
}

/// HTML-scraping client for the SoundSeek track search. There is no
/// public API, so results are lifted straight out of the search page
/// markup.
pub struct SoundSeekClient {
    client: Client,
    host: String,
}

impl SoundSeekClient {
    pub fn create(host: String) -> Self {
        let client = Client::new();

        Self { client, host }
    }

    pub async fn search(&self, query_str: &str, limit: usize) -> Result<Vec<TrackHit>, SoundSeekError> {
        #[derive(Serialize)]
        struct Query {
            q: String,
        }

        let query = Query {
            q: query_str.to_string(),
        };

        let response = self
            .client
            .get(format!("{}/search/sounds", self.host))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SoundSeekError::BadStatus(response.status()));
        }

        let raw_html = response.text().await?;

        let mut hits = parse_search_results(&raw_html, &self.host)?;
        hits.truncate(limit);

        Ok(hits)
    }
}
