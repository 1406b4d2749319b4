mod convert;
mod soundseek;
mod vidapi;
mod ytdlp;

pub use convert::*;
pub use soundseek::*;
pub use vidapi::*;
pub use ytdlp::*;

/// A single search hit as reported by a backend, before the caller
/// normalizes it into its own track shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackHit {
    pub title: String,
    pub author: Option<String>,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub url: String,
}

pub(crate) fn format_duration(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    format!("{}:{:02}", minutes, seconds)
}
