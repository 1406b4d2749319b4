use crate::config::Config;
use crate::impls::{ConvertProvider, SoundSeekProvider, VidApiProvider, YtDlpProvider};
use crate::services::media_store::MediaStore;
use crate::services::playback::{PlaybackHandoff, VoiceTransport};
use crate::services::resolution::{DownloadLocks, Provider, ResolutionPipeline};
use crate::services::{PlaySession, VoiceGatewayClient};
use actix_rt::signal::unix;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use futures_lite::FutureExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use track_providers::{ConvertApiClient, SoundSeekClient, VidApiClient, YtDlpClient};
use tracing::{error, info};

mod config;
mod http;
mod impls;
mod services;
mod types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::from(Config::from_env());

    info!(version = VERSION, "Starting application...");

    let convert_client = Arc::new(ConvertApiClient::create(config.providers.convert.clone()));
    let ytdlp_client = Arc::new(YtDlpClient::create(config.providers.ytdlp_binary.clone()));
    let soundseek_client = Arc::new(SoundSeekClient::create(config.providers.soundseek.clone()));
    let vidapi_client = Arc::new(VidApiClient::create(config.providers.vidapi.clone()));

    // Strategy priority order; first usable result wins.
    let providers: Vec<Arc<dyn Provider>> = vec![
        Arc::new(ConvertProvider::new(convert_client)),
        Arc::new(YtDlpProvider::new(ytdlp_client)),
        Arc::new(SoundSeekProvider::new(soundseek_client)),
        Arc::new(VidApiProvider::new(vidapi_client)),
    ];

    let media_store = Arc::new(MediaStore::create(PathBuf::from(
        config.artifact_directory.clone(),
    )));
    let pipeline = Arc::new(ResolutionPipeline::new(
        providers,
        Arc::clone(&media_store),
        DownloadLocks::new(),
        Duration::from_secs(config.search_timeout_secs),
        Duration::from_secs(config.download_timeout_secs),
    ));

    let voice_gateway = Arc::new(VoiceGatewayClient::create(&config.voice_gateway_endpoint));
    let handoff = Arc::new(PlaybackHandoff::new(
        Arc::clone(&voice_gateway) as Arc<dyn VoiceTransport>,
    ));
    let play_session = Arc::new(PlaySession::new(
        Arc::clone(&pipeline),
        handoff,
        Arc::clone(&media_store),
    ));

    actix_rt::spawn({
        let media_store = Arc::clone(&media_store);
        let max_age = Duration::from_secs(config.artifact_max_age_secs);
        let mut interval =
            actix_rt::time::interval(Duration::from_secs(config.sweep_interval_secs));

        async move {
            loop {
                interval.tick().await;

                match media_store.sweep_expired(max_age).await {
                    Ok(0) => (),
                    Ok(removed) => info!(removed, "Swept expired artifacts"),
                    Err(error) => error!(?error, "Artifact sweep failed"),
                }
            }
        }
    });

    let shutdown_timeout = config.shutdown_timeout;
    let bind_address = config.bind_address.clone();

    let server = HttpServer::new({
        move || {
            App::new()
                .app_data(Data::new(Arc::clone(&pipeline)))
                .app_data(Data::new(Arc::clone(&play_session)))
                .app_data(Data::new(Arc::clone(&voice_gateway)))
                .app_data(Data::new(Arc::clone(&media_store)))
                .service(web::resource("/health").route(web::get().to(http::readiness_check)))
                .service(web::resource("/resolve").route(web::post().to(http::resolve_track)))
                .service(web::resource("/play").route(web::post().to(http::play_track)))
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    info!("Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    server_handle.stop(true).await;

    Ok(())
}
