use crate::services::playback::{TransportStatus, VoiceTransport, VoiceTransportError};
use crate::services::resolution::{CandidateTrack, SourceKind};
use crate::services::{GatewayPlayerStatus, PlaySource, VoiceGatewayClient};
use crate::types::GuildId;
use async_trait::async_trait;

impl From<GatewayPlayerStatus> for TransportStatus {
    fn from(status: GatewayPlayerStatus) -> Self {
        match status {
            GatewayPlayerStatus::Inactive => TransportStatus::Inactive,
            GatewayPlayerStatus::Playing => TransportStatus::Playing,
            GatewayPlayerStatus::AutoPaused => TransportStatus::AutoPaused,
            GatewayPlayerStatus::Ended => TransportStatus::Ended,
        }
    }
}

fn play_source(track: &CandidateTrack) -> PlaySource {
    match (&track.source_kind, &track.local_path) {
        (SourceKind::LocalFile, Some(path)) => {
            PlaySource::LocalFile(path.to_string_lossy().to_string())
        }
        _ => PlaySource::RemoteUrl(track.origin_url.clone()),
    }
}

#[async_trait]
impl VoiceTransport for VoiceGatewayClient {
    async fn play(
        &self,
        guild_id: &GuildId,
        track: &CandidateTrack,
    ) -> Result<(), VoiceTransportError> {
        VoiceGatewayClient::play(self, guild_id, &play_source(track))
            .await
            .map_err(|error| VoiceTransportError(Box::new(error)))
    }

    async fn status(&self, guild_id: &GuildId) -> Result<TransportStatus, VoiceTransportError> {
        let status = VoiceGatewayClient::status(self, guild_id)
            .await
            .map_err(|error| VoiceTransportError(Box::new(error)))?;

        Ok(status.into())
    }

    async fn stop(&self, guild_id: &GuildId) -> Result<(), VoiceTransportError> {
        VoiceGatewayClient::stop(self, guild_id)
            .await
            .map_err(|error| VoiceTransportError(Box::new(error)))
    }
}
