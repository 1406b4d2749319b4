use crate::services::resolution::CandidateTrack;
use crate::types::GuildId;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("Voice transport error: {0}")]
pub(crate) struct VoiceTransportError(pub(crate) Box<dyn std::error::Error + Send + Sync>);

/// What the transport reports for a guild's player at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportStatus {
    /// Nothing started, or the start call was accepted but produced no
    /// player state yet.
    Inactive,
    Playing,
    /// The transport paused itself despite active listeners; a known
    /// silent-failure mode.
    AutoPaused,
    Ended,
}

/// Contract of the external voice playback subsystem. The handoff only
/// consumes this; connection management lives on the other side.
#[async_trait]
pub(crate) trait VoiceTransport: Send + Sync {
    async fn play(
        &self,
        guild_id: &GuildId,
        track: &CandidateTrack,
    ) -> Result<(), VoiceTransportError>;

    async fn status(&self, guild_id: &GuildId) -> Result<TransportStatus, VoiceTransportError>;

    async fn stop(&self, guild_id: &GuildId) -> Result<(), VoiceTransportError>;
}
