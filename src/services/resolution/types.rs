use serde::Serialize;
use std::ops::Deref;
use std::path::PathBuf;
use uuid::Uuid;

pub(crate) const UNKNOWN_AUTHOR: &str = "Unknown";
pub(crate) const UNKNOWN_DURATION: &str = "0:00";

/// Correlation id for one resolution request, used in logs only.
#[derive(Debug, Clone)]
pub(crate) struct RequestId(Uuid);

impl Deref for RequestId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Uuid> for RequestId {
    fn from(value: Uuid) -> Self {
        RequestId(value)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SourceKind {
    RemoteStream,
    LocalFile,
}

/// Normalized result of a successful provider lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CandidateTrack {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) duration: String,
    pub(crate) thumbnail: Option<String>,
    pub(crate) source_kind: SourceKind,
    pub(crate) origin_url: String,
    pub(crate) local_path: Option<PathBuf>,
    /// Name of the provider that produced this candidate.
    pub(crate) provider: &'static str,
}

impl CandidateTrack {
    pub(crate) fn is_usable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub(crate) fn with_defaults(mut self) -> Self {
        if self.author.trim().is_empty() {
            self.author = UNKNOWN_AUTHOR.to_string();
        }
        if self.duration.trim().is_empty() {
            self.duration = UNKNOWN_DURATION.to_string();
        }

        self
    }
}

/// Outcome of a resolution request. A broad search that matched several
/// items is handed back for caller-side disambiguation, never
/// auto-picked.
#[derive(Debug)]
pub(crate) enum Resolution {
    Track(CandidateTrack),
    Disambiguate(Vec<CandidateTrack>),
}

/// One failed strategy inside a resolution attempt, kept for logging
/// and the exhaustion report.
#[derive(Debug)]
pub(crate) struct StrategyFailure {
    pub(crate) provider: &'static str,
    pub(crate) reason: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ResolveError {
    #[error("No playable result found for \"{query}\"")]
    Exhausted {
        query: String,
        failures: Vec<StrategyFailure>,
    },
}
