use crate::services::playback::traits::{TransportStatus, VoiceTransport, VoiceTransportError};
use crate::services::resolution::CandidateTrack;
use crate::types::GuildId;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed-delay checks after the start call. Catches the known failure
/// mode where playback is accepted but never produces audio.
const DEFAULT_WATCH_DELAYS: [Duration; 3] = [
    Duration::ZERO,
    Duration::from_secs(2),
    Duration::from_secs(3),
];

const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 2;

const DEFAULT_END_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandoffState {
    Idle,
    Starting,
    Playing,
    Stalled,
    Ended,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PlaybackError {
    #[error("Playback produced no audio after {attempts} start attempt(s)")]
    Failed { attempts: u32 },
    #[error(transparent)]
    TransportError(#[from] VoiceTransportError),
}

/// Starts playback on the voice transport and supervises the immediate
/// post-start window. A stalled start gets a bounded number of in-place
/// restarts before the failure is escalated to the caller.
pub(crate) struct PlaybackHandoff {
    transport: Arc<dyn VoiceTransport>,
    watch_delays: Vec<Duration>,
    max_recovery_attempts: u32,
    end_poll_interval: Duration,
}

impl PlaybackHandoff {
    pub(crate) fn new(transport: Arc<dyn VoiceTransport>) -> Self {
        Self {
            transport,
            watch_delays: DEFAULT_WATCH_DELAYS.to_vec(),
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
            end_poll_interval: DEFAULT_END_POLL_INTERVAL,
        }
    }

    /// Overrides the watch schedule and recovery bound. Tests use this
    /// to shrink the window; the defaults keep detection latency within
    /// ~5s of the start call.
    pub(crate) fn with_watch_policy(
        mut self,
        watch_delays: Vec<Duration>,
        max_recovery_attempts: u32,
    ) -> Self {
        self.watch_delays = watch_delays;
        self.max_recovery_attempts = max_recovery_attempts;
        self
    }

    pub(crate) fn with_end_poll_interval(mut self, end_poll_interval: Duration) -> Self {
        self.end_poll_interval = end_poll_interval;
        self
    }

    /// Idle -> Starting -> Playing | Ended, with at most
    /// `max_recovery_attempts` restarts out of Stalled.
    pub(crate) async fn start(
        &self,
        guild_id: &GuildId,
        track: &CandidateTrack,
    ) -> Result<HandoffState, PlaybackError> {
        let mut state = HandoffState::Idle;
        let mut recoveries = 0u32;

        debug!(%guild_id, ?state, title = %track.title, "Beginning playback handoff");

        loop {
            state = HandoffState::Starting;
            debug!(%guild_id, ?state, title = %track.title, "Issuing play call");

            self.transport.play(guild_id, track).await?;

            state = self.watch(guild_id).await?;

            match state {
                HandoffState::Playing => {
                    info!(%guild_id, title = %track.title, "Playback confirmed");
                    return Ok(state);
                }
                HandoffState::Ended => {
                    // The track finished inside the watch window.
                    info!(%guild_id, title = %track.title, "Playback ended within the watch window");
                    return Ok(state);
                }
                HandoffState::Stalled => {
                    if recoveries >= self.max_recovery_attempts {
                        state = HandoffState::Failed;
                        warn!(%guild_id, ?state, title = %track.title, recoveries,
                            "Playback never produced audio, giving up on this candidate");
                        let _ = self.transport.stop(guild_id).await;
                        return Err(PlaybackError::Failed {
                            attempts: recoveries + 1,
                        });
                    }

                    recoveries += 1;
                    warn!(%guild_id, title = %track.title, recoveries, "Playback stalled, restarting");
                }
                HandoffState::Idle | HandoffState::Starting | HandoffState::Failed => {
                    unreachable!("watch only reports Playing, Ended or Stalled")
                }
            }
        }
    }

    /// Polls the transport until the current track is done. The session
    /// layer waits on this to release local artifacts once playback
    /// finishes.
    pub(crate) async fn await_end(&self, guild_id: &GuildId) {
        loop {
            tokio::time::sleep(self.end_poll_interval).await;

            match self.transport.status(guild_id).await {
                Ok(TransportStatus::Ended | TransportStatus::Inactive) => {
                    debug!(%guild_id, "Playback finished");
                    return;
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(%guild_id, ?error, "Lost the player while waiting for the track to end");
                    return;
                }
            }
        }
    }

    async fn watch(&self, guild_id: &GuildId) -> Result<HandoffState, PlaybackError> {
        for delay in &self.watch_delays {
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }

            match self.transport.status(guild_id).await? {
                TransportStatus::Playing => return Ok(HandoffState::Playing),
                TransportStatus::Ended => return Ok(HandoffState::Ended),
                TransportStatus::Inactive | TransportStatus::AutoPaused => continue,
            }
        }

        Ok(HandoffState::Stalled)
    }
}
