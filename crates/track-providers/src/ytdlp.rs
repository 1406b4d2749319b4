use futures_lite::StreamExt;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, warn};

use crate::{format_duration, TrackHit};

#[derive(Debug, thiserror::Error)]
pub enum YtDlpError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    LinesError(#[from] LinesCodecError),
    #[error("Extractor exited with code {0:?}")]
    NonZeroExit(Option<i32>),
}

/// Client around the `yt-dlp` extractor binary. Search and direct URL
/// lookups both go through `--dump-json`, which emits one JSON object
/// per resolved entry on stdout.
pub struct YtDlpClient {
    binary: String,
}

#[derive(Deserialize)]
struct YtDlpEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl YtDlpClient {
    pub fn create(binary: String) -> Self {
        Self { binary }
    }

    /// Resolves a direct URL or a free-text query. Free text is routed
    /// through the extractor's own search (`ytsearchN:`).
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<TrackHit>, YtDlpError> {
        let target = if query.starts_with("http://") || query.starts_with("https://") {
            query.to_string()
        } else {
            format!("ytsearch{}:{}", limit, query)
        };

        debug!(extractor_target = %target, "Invoking extractor");

        let mut child = Command::new(&self.binary)
            .arg("--dump-json")
            .arg("--flat-playlist")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg(&target)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "no stdout handle"))?;

        let mut lines = FramedRead::new(stdout, LinesCodec::new());
        let mut hits = vec![];

        while let Some(line) = lines.next().await {
            let line = line?;

            let entry = match serde_json::from_str::<YtDlpEntry>(&line) {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(?error, "Skipping unparseable extractor output line");
                    continue;
                }
            };

            let title = match entry.title {
                Some(title) => title,
                None => continue,
            };
            let url = match entry.webpage_url.or(entry.url) {
                Some(url) => url,
                None => continue,
            };

            hits.push(TrackHit {
                title,
                author: entry.uploader.or(entry.channel),
                duration: entry.duration.map(|secs| format_duration(secs as u64)),
                thumbnail: entry.thumbnail,
                url,
            });

            if hits.len() >= limit {
                break;
            }
        }

        let status = child.wait().await?;

        if !status.success() && hits.is_empty() {
            return Err(YtDlpError::NonZeroExit(status.code()));
        }

        Ok(hits)
    }
}
