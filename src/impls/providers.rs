use crate::services::resolution::{CandidateTrack, Provider, ProviderError, ProviderKind, SourceKind};
use crate::types::Query;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use track_providers::{
    ConvertApiClient, ConvertApiError, SoundSeekClient, SoundSeekError, TrackHit, VidApiClient,
    VidApiError, YtDlpClient, YtDlpError,
};

/// Domains the conversion service knows how to handle.
const CONVERTIBLE_DOMAINS: [&str; 3] = ["youtube.com", "youtu.be", "soundcloud.com"];

/// Matches the URL's host (including subdomains) against the convertible
/// domains. A domain appearing elsewhere in the URL does not count.
fn has_convertible_host(query: &Query) -> bool {
    let rest = match query.as_str().split_once("://") {
        Some((_, rest)) => rest,
        None => return false,
    };

    let authority = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or(rest);
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);

    CONVERTIBLE_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

fn hit_into_candidate(hit: TrackHit, provider: &'static str) -> CandidateTrack {
    CandidateTrack {
        title: hit.title,
        author: hit.author.unwrap_or_default(),
        duration: hit.duration.unwrap_or_default(),
        thumbnail: hit.thumbnail,
        source_kind: SourceKind::RemoteStream,
        origin_url: hit.url,
        local_path: None,
        provider,
    }
}

impl From<ConvertApiError> for ProviderError {
    fn from(error: ConvertApiError) -> Self {
        match error {
            ConvertApiError::ReqwestError(error) if error.is_timeout() => ProviderError::Timeout,
            ConvertApiError::BadStatus(status) => ProviderError::BadStatus(status.as_u16()),
            ConvertApiError::Rejected(reason) => ProviderError::Parse(reason),
            ConvertApiError::IoError(error) => ProviderError::IoError(error),
            other => ProviderError::Unexpected(Box::new(other)),
        }
    }
}

impl From<SoundSeekError> for ProviderError {
    fn from(error: SoundSeekError) -> Self {
        match error {
            SoundSeekError::ReqwestError(error) if error.is_timeout() => ProviderError::Timeout,
            SoundSeekError::BadStatus(status) => ProviderError::BadStatus(status.as_u16()),
            SoundSeekError::ParseError(error) => ProviderError::Parse(error.to_string()),
            SoundSeekError::ReqwestError(error) => ProviderError::Unexpected(Box::new(error)),
        }
    }
}

impl From<VidApiError> for ProviderError {
    fn from(error: VidApiError) -> Self {
        match error {
            VidApiError::ReqwestError(error) if error.is_timeout() => ProviderError::Timeout,
            VidApiError::BadStatus(status) => ProviderError::BadStatus(status.as_u16()),
            other => ProviderError::Unexpected(Box::new(other)),
        }
    }
}

impl From<YtDlpError> for ProviderError {
    fn from(error: YtDlpError) -> Self {
        match error {
            YtDlpError::IoError(error) => ProviderError::IoError(error),
            YtDlpError::NonZeroExit(code) => ProviderError::ProcessFailed(code),
            other => ProviderError::Unexpected(Box::new(other)),
        }
    }
}

/// Strategy (a): direct URL lookup plus server-side conversion to a
/// local MP3.
pub(crate) struct ConvertProvider {
    client: Arc<ConvertApiClient>,
}

impl ConvertProvider {
    pub(crate) fn new(client: Arc<ConvertApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for ConvertProvider {
    fn name(&self) -> &'static str {
        "convert-api"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Convert
    }

    fn supports(&self, query: &Query) -> bool {
        query.is_url() && has_convertible_host(query)
    }

    async fn search(
        &self,
        query: &Query,
        _limit: usize,
    ) -> Result<Vec<CandidateTrack>, ProviderError> {
        let hit = self.client.resolve_metadata(query.as_str()).await?;

        Ok(vec![hit_into_candidate(hit, self.name())])
    }

    async fn fetch_to_file(&self, origin_url: &str, dest: &Path) -> Result<(), ProviderError> {
        self.client.download_mp3(origin_url, dest).await?;

        Ok(())
    }
}

/// Strategy (b): the extractor binary; handles both direct URLs and
/// free-text search, returns remote streamable candidates.
pub(crate) struct YtDlpProvider {
    client: Arc<YtDlpClient>,
}

impl YtDlpProvider {
    pub(crate) fn new(client: Arc<YtDlpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for YtDlpProvider {
    fn name(&self) -> &'static str {
        "ytdlp"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DirectExtract
    }

    fn supports(&self, _query: &Query) -> bool {
        true
    }

    async fn search(
        &self,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<CandidateTrack>, ProviderError> {
        let hits = self.client.search(query.as_str(), limit).await?;

        Ok(hits
            .into_iter()
            .map(|hit| hit_into_candidate(hit, self.name()))
            .collect())
    }
}

/// Strategy (c): alternate-platform search scraped from HTML. Broad:
/// several loose matches go back to the caller for disambiguation.
pub(crate) struct SoundSeekProvider {
    client: Arc<SoundSeekClient>,
}

impl SoundSeekProvider {
    pub(crate) fn new(client: Arc<SoundSeekClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for SoundSeekProvider {
    fn name(&self) -> &'static str {
        "soundseek"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    fn supports(&self, query: &Query) -> bool {
        !query.is_url()
    }

    fn is_broad_search(&self) -> bool {
        true
    }

    async fn search(
        &self,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<CandidateTrack>, ProviderError> {
        let hits = self.client.search(query.as_str(), limit).await?;

        Ok(hits
            .into_iter()
            .map(|hit| hit_into_candidate(hit, self.name()))
            .collect())
    }
}

/// Strategy (d): last-resort JSON search API; auto-selects its best
/// hit.
pub(crate) struct VidApiProvider {
    client: Arc<VidApiClient>,
}

impl VidApiProvider {
    pub(crate) fn new(client: Arc<VidApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provider for VidApiProvider {
    fn name(&self) -> &'static str {
        "vidapi"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    fn supports(&self, query: &Query) -> bool {
        !query.is_url()
    }

    async fn search(
        &self,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<CandidateTrack>, ProviderError> {
        let hits = self.client.search(query.as_str(), limit).await?;

        Ok(hits
            .into_iter()
            .map(|hit| hit_into_candidate(hit, self.name()))
            .collect())
    }
}
