mod health;
mod resolve;

pub(crate) use health::readiness_check;
pub(crate) use resolve::{play_track, resolve_track};
