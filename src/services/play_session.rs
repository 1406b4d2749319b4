use crate::services::media_store::MediaStore;
use crate::services::playback::{HandoffState, PlaybackHandoff};
use crate::services::resolution::{
    CandidateTrack, ResolutionPipeline, ResolveError, Resolution,
};
use crate::types::{GuildId, Query};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug)]
pub(crate) enum PlayOutcome {
    Playing(CandidateTrack),
    /// The track started and finished inside the handoff watch window.
    Ended(CandidateTrack),
    /// A broad search matched several items; the caller must pick one.
    Disambiguate(Vec<CandidateTrack>),
}

/// Ties the pipeline and the handoff together: resolve, start playback,
/// and on a silent playback failure re-enter the pipeline with that
/// provider excluded until something plays or everything is exhausted.
pub(crate) struct PlaySession {
    pipeline: Arc<ResolutionPipeline>,
    handoff: Arc<PlaybackHandoff>,
    media_store: Arc<MediaStore>,
}

impl PlaySession {
    pub(crate) fn new(
        pipeline: Arc<ResolutionPipeline>,
        handoff: Arc<PlaybackHandoff>,
        media_store: Arc<MediaStore>,
    ) -> Self {
        Self {
            pipeline,
            handoff,
            media_store,
        }
    }

    pub(crate) async fn resolve_and_play(
        &self,
        guild_id: &GuildId,
        query: &Query,
    ) -> Result<PlayOutcome, ResolveError> {
        let mut skip: HashSet<&'static str> = HashSet::new();

        loop {
            let track = match self
                .pipeline
                .resolve_skipping(guild_id, query, &skip)
                .await?
            {
                Resolution::Disambiguate(tracks) => {
                    return Ok(PlayOutcome::Disambiguate(tracks))
                }
                Resolution::Track(track) => track,
            };

            match self.handoff.start(guild_id, &track).await {
                Ok(HandoffState::Ended) => {
                    self.release(&track).await;
                    return Ok(PlayOutcome::Ended(track));
                }
                Ok(_) => {
                    if track.local_path.is_some() {
                        self.watch_for_release(guild_id.clone(), track.clone());
                    }
                    return Ok(PlayOutcome::Playing(track));
                }
                Err(error) => {
                    warn!(%guild_id, %query, provider = track.provider, ?error,
                        "Candidate failed to play, re-entering the pipeline");
                    self.release(&track).await;
                    skip.insert(track.provider);
                }
            }
        }
    }

    async fn release(&self, track: &CandidateTrack) {
        if let Some(path) = &track.local_path {
            self.media_store.release_after_playback(path).await;
        }
    }

    /// A confirmed local-file track keeps its backing file until the
    /// transport reports the track is done, so the deletion has to
    /// outlive this request.
    fn watch_for_release(&self, guild_id: GuildId, track: CandidateTrack) {
        let handoff = Arc::clone(&self.handoff);
        let media_store = Arc::clone(&self.media_store);

        actix_rt::spawn(async move {
            handoff.await_end(&guild_id).await;

            if let Some(path) = &track.local_path {
                media_store.release_after_playback(path).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayOutcome, PlaySession};
    use crate::services::media_store::MediaStore;
    use crate::services::playback::{
        PlaybackHandoff, TransportStatus, VoiceTransport, VoiceTransportError,
    };
    use crate::services::resolution::{
        CandidateTrack, DownloadLocks, Provider, ProviderError, ProviderKind, ResolutionPipeline,
        SourceKind,
    };
    use crate::types::{GuildId, Query};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use uuid::Uuid;

    struct StaticProvider {
        name: &'static str,
    }

    #[async_trait]
    impl Provider for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Search
        }

        fn supports(&self, _query: &Query) -> bool {
            true
        }

        async fn search(
            &self,
            _query: &Query,
            _limit: usize,
        ) -> Result<Vec<CandidateTrack>, ProviderError> {
            Ok(vec![CandidateTrack {
                title: format!("Children via {}", self.name),
                author: "Robert Miles".into(),
                duration: "7:24".into(),
                thumbnail: None,
                source_kind: SourceKind::RemoteStream,
                origin_url: format!("https://{}.example/track", self.name),
                local_path: None,
                provider: self.name,
            }])
        }
    }

    /// Transport that refuses to produce audio for the given number of
    /// tracks, then plays everything.
    struct FlakyTransport {
        silent_tracks: usize,
        play_calls: AtomicUsize,
    }

    impl FlakyTransport {
        fn silent_for(silent_tracks: usize) -> Self {
            Self {
                silent_tracks,
                play_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VoiceTransport for FlakyTransport {
        async fn play(
            &self,
            _guild_id: &GuildId,
            track: &CandidateTrack,
        ) -> Result<(), VoiceTransportError> {
            self.play_calls.fetch_add(1, Ordering::SeqCst);
            let _ = track;
            Ok(())
        }

        async fn status(&self, _guild_id: &GuildId) -> Result<TransportStatus, VoiceTransportError> {
            // Track identity is not visible here; the mock keys off how
            // many play calls happened so far. Each silent track eats
            // 1 + max_recovery_attempts play calls.
            let calls = self.play_calls.load(Ordering::SeqCst);

            if calls <= self.silent_tracks * 2 {
                Ok(TransportStatus::Inactive)
            } else {
                Ok(TransportStatus::Playing)
            }
        }

        async fn stop(&self, _guild_id: &GuildId) -> Result<(), VoiceTransportError> {
            Ok(())
        }
    }

    struct LocalFileProvider;

    #[async_trait]
    impl Provider for LocalFileProvider {
        fn name(&self) -> &'static str {
            "local-file-mock"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Convert
        }

        fn supports(&self, query: &Query) -> bool {
            query.is_url()
        }

        async fn search(
            &self,
            query: &Query,
            _limit: usize,
        ) -> Result<Vec<CandidateTrack>, ProviderError> {
            Ok(vec![CandidateTrack {
                title: "Children".into(),
                author: "Robert Miles".into(),
                duration: "7:24".into(),
                thumbnail: None,
                source_kind: SourceKind::RemoteStream,
                origin_url: query.to_string(),
                local_path: None,
                provider: "local-file-mock",
            }])
        }

        async fn fetch_to_file(
            &self,
            _origin_url: &str,
            dest: &Path,
        ) -> Result<(), ProviderError> {
            let mut payload = b"ID3".to_vec();
            payload.resize(4096, 0u8);
            tokio::fs::write(dest, &payload).await?;
            Ok(())
        }
    }

    /// Transport returning a scripted sequence of statuses; the last one
    /// repeats once the script runs out.
    struct ScriptedTransport {
        statuses: Mutex<Vec<TransportStatus>>,
    }

    #[async_trait]
    impl VoiceTransport for ScriptedTransport {
        async fn play(
            &self,
            _guild_id: &GuildId,
            _track: &CandidateTrack,
        ) -> Result<(), VoiceTransportError> {
            Ok(())
        }

        async fn status(&self, _guild_id: &GuildId) -> Result<TransportStatus, VoiceTransportError> {
            let mut statuses = self.statuses.lock().unwrap();

            if statuses.len() > 1 {
                Ok(statuses.remove(0))
            } else {
                Ok(statuses.first().copied().unwrap_or(TransportStatus::Inactive))
            }
        }

        async fn stop(&self, _guild_id: &GuildId) -> Result<(), VoiceTransportError> {
            Ok(())
        }
    }

    fn session(transport: Arc<dyn VoiceTransport>) -> PlaySession {
        let media_store = Arc::new(MediaStore::create(
            std::env::temp_dir().join(format!("play-session-test-{}", Uuid::new_v4())),
        ));
        let providers: Vec<Arc<dyn Provider>> = vec![
            Arc::new(StaticProvider { name: "primary" }),
            Arc::new(StaticProvider { name: "secondary" }),
        ];
        let pipeline = Arc::new(ResolutionPipeline::new(
            providers,
            Arc::clone(&media_store),
            DownloadLocks::new(),
            Duration::from_secs(5),
            Duration::from_secs(5),
        ));
        let handoff = Arc::new(PlaybackHandoff::new(transport).with_watch_policy(
            vec![Duration::ZERO, Duration::from_millis(1)],
            1,
        ));

        PlaySession::new(pipeline, handoff, media_store)
    }

    #[actix_rt::test]
    async fn plays_the_first_candidate_when_the_transport_cooperates() {
        let session = session(Arc::new(FlakyTransport::silent_for(0)));

        let outcome = session
            .resolve_and_play(&GuildId(1), &Query::new("robert miles children"))
            .await
            .expect("Expected a playing track");

        match outcome {
            PlayOutcome::Playing(track) => assert_eq!(track.provider, "primary"),
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn playback_failure_re_enters_the_pipeline_with_the_next_strategy() {
        // First candidate is silent through its whole recovery budget;
        // the session must fall back to the secondary provider.
        let session = session(Arc::new(FlakyTransport::silent_for(1)));

        let outcome = session
            .resolve_and_play(&GuildId(1), &Query::new("robert miles children"))
            .await
            .expect("Expected a playing track after fallback");

        match outcome {
            PlayOutcome::Playing(track) => assert_eq!(track.provider, "secondary"),
            other => panic!("Expected Playing, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn local_artifact_is_released_once_playback_ends() {
        let media_store = Arc::new(MediaStore::create(
            std::env::temp_dir().join(format!("play-session-test-{}", Uuid::new_v4())),
        ));
        let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(LocalFileProvider)];
        let pipeline = Arc::new(ResolutionPipeline::new(
            providers,
            Arc::clone(&media_store),
            DownloadLocks::new(),
            Duration::from_secs(5),
            Duration::from_secs(5),
        ));
        let transport = Arc::new(ScriptedTransport {
            statuses: Mutex::new(vec![TransportStatus::Playing, TransportStatus::Ended]),
        });
        let handoff = Arc::new(
            PlaybackHandoff::new(transport)
                .with_watch_policy(vec![Duration::ZERO], 0)
                .with_end_poll_interval(Duration::from_millis(1)),
        );
        let session = PlaySession::new(pipeline, handoff, Arc::clone(&media_store));

        let outcome = session
            .resolve_and_play(&GuildId(1), &Query::new("https://vid.example/watch?v=abc"))
            .await
            .expect("Expected a playing track");

        let track = match outcome {
            PlayOutcome::Playing(track) => track,
            other => panic!("Expected Playing, got {:?}", other),
        };

        let path = track.local_path.expect("Expected a backing file");

        // The release watcher deletes the file once the transport
        // reports the track ended.
        for _ in 0..100 {
            if tokio::fs::metadata(&path).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(tokio::fs::metadata(&path).await.is_err());
        assert_eq!(media_store.tracked().await, 0);
    }

    #[actix_rt::test]
    async fn exhausts_when_no_candidate_ever_plays() {
        let session = session(Arc::new(FlakyTransport::silent_for(16)));

        let result = session
            .resolve_and_play(&GuildId(1), &Query::new("robert miles children"))
            .await;

        assert!(result.is_err());
    }
}
