use serde::Deserialize;

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_artifact_directory() -> String {
    "tmp/artifacts".to_string()
}

fn default_convert_endpoint() -> String {
    "http://127.0.0.1:9050".to_string()
}

fn default_vidapi_endpoint() -> String {
    "http://127.0.0.1:9060".to_string()
}

fn default_soundseek_host() -> String {
    "https://soundseek.example".to_string()
}

fn default_voice_gateway_endpoint() -> String {
    "http://127.0.0.1:9070".to_string()
}

fn default_ytdlp_binary() -> String {
    "yt-dlp".to_string()
}

fn default_search_timeout() -> u64 {
    10u64
}

fn default_download_timeout() -> u64 {
    60u64
}

fn default_artifact_max_age() -> u64 {
    3600u64
}

fn default_sweep_interval() -> u64 {
    600u64
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ProviderEndpoints {
    #[serde(rename = "convert_endpoint", default = "default_convert_endpoint")]
    pub(crate) convert: String,
    #[serde(rename = "vidapi_endpoint", default = "default_vidapi_endpoint")]
    pub(crate) vidapi: String,
    #[serde(rename = "soundseek_host", default = "default_soundseek_host")]
    pub(crate) soundseek: String,
    #[serde(rename = "ytdlp_binary", default = "default_ytdlp_binary")]
    pub(crate) ytdlp_binary: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    #[serde(default = "default_artifact_directory")]
    pub(crate) artifact_directory: String,
    #[serde(
        rename = "voice_gateway_endpoint",
        default = "default_voice_gateway_endpoint"
    )]
    pub(crate) voice_gateway_endpoint: String,
    #[serde(default = "default_search_timeout")]
    pub(crate) search_timeout_secs: u64,
    #[serde(default = "default_download_timeout")]
    pub(crate) download_timeout_secs: u64,
    #[serde(default = "default_artifact_max_age")]
    pub(crate) artifact_max_age_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub(crate) sweep_interval_secs: u64,
    #[serde(flatten)]
    pub(crate) providers: ProviderEndpoints,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        match envy::from_env::<Self>() {
            Ok(config) => config,
            Err(error) => panic!("Missing environment variable: {:#?}", error),
        }
    }
}
