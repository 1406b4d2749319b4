pub(crate) mod media_store;
pub(crate) mod playback;
pub(crate) mod resolution;

mod play_session;
pub(crate) use play_session::*;

mod voice_gateway_client;
pub(crate) use voice_gateway_client::*;
