use crate::services::resolution::types::CandidateTrack;
use crate::types::Query;
use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProviderError {
    #[error("Request to the backend timed out")]
    Timeout,
    #[error("Backend responded with status {0}")]
    BadStatus(u16),
    #[error("Unable to parse backend output: {0}")]
    Parse(String),
    #[error("External process exited with code {0:?}")]
    ProcessFailed(Option<i32>),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Operation is not supported by this provider")]
    Unsupported,
    #[error("Unexpected error: {0}")]
    Unexpected(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProviderKind {
    /// Produces a local file through a conversion/download backend.
    Convert,
    /// Resolves URLs or queries to remote streamable candidates.
    DirectExtract,
    /// Plain search engine over some catalog.
    Search,
}

/// One external resolution strategy. Implementations normalize whatever
/// their backend speaks (JSON API, HTML scrape, external process) into
/// the common candidate shape and the common error type; raw transport
/// errors must not escape.
#[async_trait]
pub(crate) trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> ProviderKind;

    /// Cheap, synchronous capability check so the pipeline can skip the
    /// provider without a network round trip.
    fn supports(&self, query: &Query) -> bool;

    /// Broad searches return many loosely matching items; the pipeline
    /// hands those back to the caller for disambiguation instead of
    /// auto-picking.
    fn is_broad_search(&self) -> bool {
        false
    }

    async fn search(
        &self,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<CandidateTrack>, ProviderError>;

    /// Downloads the media behind `origin_url` into `dest`. Only
    /// convert-capable providers override this.
    async fn fetch_to_file(&self, origin_url: &str, dest: &Path) -> Result<(), ProviderError> {
        let _ = (origin_url, dest);
        Err(ProviderError::Unsupported)
    }
}
