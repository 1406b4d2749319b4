use crate::services::media_store::MediaStore;
use crate::services::VoiceGatewayClient;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use std::sync::Arc;
use tracing::error;

pub(crate) async fn readiness_check(
    voice_gateway: Data<Arc<VoiceGatewayClient>>,
    media_store: Data<Arc<MediaStore>>,
) -> impl Responder {
    if let Err(error) = voice_gateway.check_connection().await {
        error!(?error, "Readiness check failed");
    }

    HttpResponse::Ok().json(serde_json::json!({
        "tracked_artifacts": media_store.tracked().await,
    }))
}
