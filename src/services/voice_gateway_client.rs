use crate::types::GuildId;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub(crate) enum VoiceGatewayClientError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error("Voice gateway responded with status {0}")]
    BadStatus(StatusCode),
}

/// What the gateway is asked to play: either a remote URL it can stream
/// itself or a local file this service downloaded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "location")]
pub(crate) enum PlaySource {
    RemoteUrl(String),
    LocalFile(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GatewayPlayerStatus {
    Inactive,
    Playing,
    AutoPaused,
    Ended,
}

#[derive(Deserialize)]
struct PlayerStateResponse {
    status: GatewayPlayerStatus,
}

/// Thin HTTP client for the voice gateway sidecar, which owns the chat
/// platform's voice connections and the actual audio encoding.
pub(crate) struct VoiceGatewayClient {
    client: Client,
    endpoint: String,
}

impl VoiceGatewayClient {
    pub(crate) fn create(endpoint: &str) -> Self {
        let client = Client::new();

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub(crate) async fn play(
        &self,
        guild_id: &GuildId,
        source: &PlaySource,
    ) -> Result<(), VoiceGatewayClientError> {
        let response = self
            .client
            .post(format!("{}/guilds/{}/player/play", self.endpoint, guild_id))
            .json(source)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceGatewayClientError::BadStatus(response.status()));
        }

        Ok(())
    }

    pub(crate) async fn status(
        &self,
        guild_id: &GuildId,
    ) -> Result<GatewayPlayerStatus, VoiceGatewayClientError> {
        let response = self
            .client
            .get(format!("{}/guilds/{}/player", self.endpoint, guild_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceGatewayClientError::BadStatus(response.status()));
        }

        let state = response.json::<PlayerStateResponse>().await?;

        Ok(state.status)
    }

    pub(crate) async fn stop(&self, guild_id: &GuildId) -> Result<(), VoiceGatewayClientError> {
        let response = self
            .client
            .post(format!("{}/guilds/{}/player/stop", self.endpoint, guild_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceGatewayClientError::BadStatus(response.status()));
        }

        Ok(())
    }

    pub(crate) async fn check_connection(&self) -> Result<(), VoiceGatewayClientError> {
        let response = self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceGatewayClientError::BadStatus(response.status()));
        }

        Ok(())
    }
}
