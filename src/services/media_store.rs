use crate::services::resolution::{Provider, ProviderError};
use crate::types::GuildId;
use async_lock::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

pub(crate) const MIN_ARTIFACT_SIZE: u64 = 1024;

const SANITIZED_TITLE_MAX_LEN: usize = 64;

/// A downloaded media file and its metadata.
#[derive(Debug, Clone)]
pub(crate) struct Artifact {
    pub(crate) path: PathBuf,
    pub(crate) size: u64,
    pub(crate) created_at: SystemTime,
    pub(crate) guild_id: GuildId,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum MaterializeError {
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
    #[error("Downloaded artifact failed validation: {0}")]
    ArtifactInvalid(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Owns the lifecycle of on-disk artifacts produced by convert/download
/// providers: collision-free naming, validation, and deletion.
pub(crate) struct MediaStore {
    root: PathBuf,
    min_size: u64,
    artifacts: Mutex<HashMap<PathBuf, Artifact>>,
}

impl MediaStore {
    pub(crate) fn create(root: PathBuf) -> Self {
        Self {
            root,
            min_size: MIN_ARTIFACT_SIZE,
            artifacts: Mutex::new(HashMap::new()),
        }
    }

    /// Downloads the media behind `origin_url` through the given
    /// provider into a fresh file and validates the result. The download
    /// is bounded by `timeout`. Invalid or timed-out files are deleted
    /// before the error is returned, so a failed materialization leaves
    /// nothing behind.
    pub(crate) async fn materialize(
        &self,
        guild_id: &GuildId,
        provider: &dyn Provider,
        origin_url: &str,
        suggested_title: &str,
        timeout: Duration,
    ) -> Result<Artifact, MaterializeError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(artifact_filename(guild_id, suggested_title));

        debug!(%guild_id, origin_url, path = %path.display(), "Materializing artifact");

        match tokio::time::timeout(timeout, provider.fetch_to_file(origin_url, &path)).await {
            Ok(Ok(())) => (),
            Ok(Err(error)) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(error.into());
            }
            Err(_) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(ProviderError::Timeout.into());
            }
        }

        let size = match validate_artifact(&path, self.min_size).await {
            Ok(size) => size,
            Err(reason) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(MaterializeError::ArtifactInvalid(reason));
            }
        };

        let artifact = Artifact {
            path: path.clone(),
            size,
            created_at: SystemTime::now(),
            guild_id: guild_id.clone(),
        };

        self.artifacts.lock().await.insert(path, artifact.clone());

        debug!(%guild_id, size, "Artifact materialized");

        Ok(artifact)
    }

    /// Deletes media files older than `max_age`. Idempotent and safe to
    /// run concurrently with itself: a file already gone is not an
    /// error.
    pub(crate) async fn sweep_expired(&self, max_age: Duration) -> Result<usize, std::io::Error> {
        let mut dir_reader = match tokio::fs::read_dir(&self.root).await {
            Ok(reader) => reader,
            Err(error) if matches!(error.kind(), std::io::ErrorKind::NotFound) => return Ok(0),
            Err(error) => return Err(error),
        };

        let mut removed = 0;

        while let Some(entry) = dir_reader.next_entry().await? {
            let path = entry.path();

            let is_audio = mime_guess::from_path(&path)
                .first()
                .map(|mime| mime.type_() == mime_guess::mime::AUDIO)
                .unwrap_or(false);
            if !is_audio {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|meta| meta.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };

            if modified.elapsed().unwrap_or_default() < max_age {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    self.artifacts.lock().await.remove(&path);
                    debug!(path = %path.display(), "Swept expired artifact");
                    removed += 1;
                }
                Err(error) if matches!(error.kind(), std::io::ErrorKind::NotFound) => {}
                Err(error) => {
                    warn!(?error, path = %path.display(), "Unable to sweep artifact")
                }
            }
        }

        Ok(removed)
    }

    /// Deletes the backing file once playback has finished (normally or
    /// by skip/stop). Tolerates the file already being absent.
    pub(crate) async fn release_after_playback(&self, path: &Path) {
        self.artifacts.lock().await.remove(path);

        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Released artifact after playback"),
            Err(error) if matches!(error.kind(), std::io::ErrorKind::NotFound) => {
                debug!(path = %path.display(), "Artifact already gone")
            }
            Err(error) => warn!(?error, path = %path.display(), "Unable to release artifact"),
        }
    }

    pub(crate) async fn tracked(&self) -> usize {
        self.artifacts.lock().await.len()
    }
}

/// `<guild>_<sanitized-title>_<unix-millis>.mp3` — guild-scoped prefix
/// plus a millisecond timestamp keeps names collision-free across
/// concurrent sessions.
fn artifact_filename(guild_id: &GuildId, suggested_title: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    format!("{}_{}_{}.mp3", guild_id, sanitize_title(suggested_title), millis)
}

fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(SANITIZED_TITLE_MAX_LEN)
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        "track".to_string()
    } else {
        sanitized
    }
}

/// Size below the threshold is a hard failure. An unrecognized header
/// is logged and let through: some converters emit valid audio behind
/// uncommon framing, and the playback watch window catches the truly
/// broken files.
async fn validate_artifact(path: &Path, min_size: u64) -> Result<u64, String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|error| format!("unable to stat downloaded file: {}", error))?;

    let size = metadata.len();

    if size <= min_size {
        return Err(format!(
            "file size {} bytes is at or below the {} byte minimum",
            size, min_size
        ));
    }

    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|error| format!("unable to open downloaded file: {}", error))?;
    let mut header = [0u8; 12];
    let read = file
        .read(&mut header)
        .await
        .map_err(|error| format!("unable to read file header: {}", error))?;

    if !looks_like_audio(&header[..read]) {
        warn!(path = %path.display(), "Artifact header does not match a known audio container");
    }

    Ok(size)
}

fn looks_like_audio(header: &[u8]) -> bool {
    if header.len() < 12 {
        return false;
    }

    header.starts_with(b"ID3")
        || header.starts_with(b"fLaC")
        || header.starts_with(b"OggS")
        || header.starts_with(b"RIFF")
        || &header[4..8] == b"ftyp"
        || (header[0] == 0xFF && header[1] & 0xE0 == 0xE0)
}
