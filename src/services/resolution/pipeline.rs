use crate::services::media_store::{MaterializeError, MediaStore};
use crate::services::resolution::locks::DownloadLocks;
use crate::services::resolution::traits::{Provider, ProviderError, ProviderKind};
use crate::services::resolution::types::{
    CandidateTrack, RequestId, ResolveError, Resolution, SourceKind, StrategyFailure,
};
use crate::types::{GuildId, Query};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, thiserror::Error)]
enum StrategyError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

/// Orchestrates the ordered provider list: first strategy to yield a
/// usable candidate wins, every failure is recorded and the next
/// strategy is tried. No scoring or ranking across strategies.
pub(crate) struct ResolutionPipeline {
    providers: Vec<Arc<dyn Provider>>,
    media_store: Arc<MediaStore>,
    download_locks: DownloadLocks,
    search_timeout: Duration,
    download_timeout: Duration,
    search_limit: usize,
}

impl ResolutionPipeline {
    pub(crate) fn new(
        providers: Vec<Arc<dyn Provider>>,
        media_store: Arc<MediaStore>,
        download_locks: DownloadLocks,
        search_timeout: Duration,
        download_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            media_store,
            download_locks,
            search_timeout,
            download_timeout,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub(crate) async fn resolve(
        &self,
        guild_id: &GuildId,
        query: &Query,
    ) -> Result<Resolution, ResolveError> {
        self.resolve_skipping(guild_id, query, &HashSet::new()).await
    }

    /// Resolves while excluding the named providers. The playback layer
    /// uses this to re-enter the pipeline after a candidate turned out
    /// to be unplayable.
    pub(crate) async fn resolve_skipping(
        &self,
        guild_id: &GuildId,
        query: &Query,
        skip: &HashSet<&'static str>,
    ) -> Result<Resolution, ResolveError> {
        let request_id: RequestId = Uuid::new_v4().into();
        let mut failures = vec![];

        info!(%guild_id, %request_id, %query, "Resolving query");

        for provider in &self.providers {
            let name = provider.name();

            if skip.contains(name) {
                debug!(%request_id, provider = name, "Provider excluded for this attempt");
                continue;
            }

            if !provider.supports(query) {
                debug!(%request_id, provider = name, "Provider does not support this query");
                continue;
            }

            let outcome = if matches!(provider.kind(), ProviderKind::Convert) {
                match self.download_locks.try_acquire(guild_id) {
                    Some(_guard) => self.try_convert(provider.as_ref(), guild_id, query).await,
                    None => {
                        info!(%guild_id, %request_id, provider = name,
                            "Download already in flight for this guild, skipping download strategy");
                        failures.push(StrategyFailure {
                            provider: name,
                            reason: "skipped: download already in flight".to_string(),
                        });
                        continue;
                    }
                }
            } else {
                self.try_search(provider.as_ref(), query).await
            };

            match outcome {
                Ok(Some(resolution)) => {
                    info!(%guild_id, %request_id, provider = name, "Query resolved");
                    return Ok(resolution);
                }
                Ok(None) => {
                    debug!(%request_id, provider = name, "Provider returned no usable candidates");
                    failures.push(StrategyFailure {
                        provider: name,
                        reason: "no usable candidates".to_string(),
                    });
                }
                Err(error) => {
                    warn!(%request_id, provider = name, ?error, "Provider failed, trying the next strategy");
                    failures.push(StrategyFailure {
                        provider: name,
                        reason: error.to_string(),
                    });
                }
            }
        }

        warn!(%guild_id, %request_id, %query, ?failures, "Every strategy exhausted");

        Err(ResolveError::Exhausted {
            query: query.to_string(),
            failures,
        })
    }

    async fn try_search(
        &self,
        provider: &dyn Provider,
        query: &Query,
    ) -> Result<Option<Resolution>, StrategyError> {
        let results = tokio::time::timeout(
            self.search_timeout,
            provider.search(query, self.search_limit),
        )
        .await
        .map_err(|_| ProviderError::Timeout)??;

        let mut usable: Vec<_> = results
            .into_iter()
            .filter(CandidateTrack::is_usable)
            .map(CandidateTrack::with_defaults)
            .collect();

        if usable.is_empty() {
            return Ok(None);
        }

        if provider.is_broad_search() && usable.len() > 1 {
            return Ok(Some(Resolution::Disambiguate(usable)));
        }

        Ok(Some(Resolution::Track(usable.swap_remove(0))))
    }

    async fn try_convert(
        &self,
        provider: &dyn Provider,
        guild_id: &GuildId,
        query: &Query,
    ) -> Result<Option<Resolution>, StrategyError> {
        let results = tokio::time::timeout(self.search_timeout, provider.search(query, 1))
            .await
            .map_err(|_| ProviderError::Timeout)??;

        let candidate = match results.into_iter().find(CandidateTrack::is_usable) {
            Some(candidate) => candidate.with_defaults(),
            None => return Ok(None),
        };

        // The store owns the download deadline so a timed-out fetch
        // still gets its partial file deleted.
        let artifact = self
            .media_store
            .materialize(
                guild_id,
                provider,
                &candidate.origin_url,
                &candidate.title,
                self.download_timeout,
            )
            .await?;

        Ok(Some(Resolution::Track(CandidateTrack {
            source_kind: SourceKind::LocalFile,
            local_path: Some(artifact.path),
            ..candidate
        })))
    }
}
