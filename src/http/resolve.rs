use crate::services::resolution::{ResolutionPipeline, ResolveError, Resolution};
use crate::services::{PlayOutcome, PlaySession};
use crate::types::{GuildId, Query};
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

const NO_RESULTS_MESSAGE: &str = "No results found for your request";

#[derive(Debug, Deserialize)]
pub(crate) struct TrackRequestForm {
    guild_id: u64,
    query: String,
}

pub(crate) async fn resolve_track(
    pipeline: Data<Arc<ResolutionPipeline>>,
    form: Json<TrackRequestForm>,
) -> impl Responder {
    let guild_id = GuildId::from(form.guild_id);
    let query = Query::new(form.query.clone());

    match pipeline.resolve(&guild_id, &query).await {
        Ok(Resolution::Track(track)) => HttpResponse::Ok().json(track),
        Ok(Resolution::Disambiguate(tracks)) => {
            HttpResponse::Ok().json(serde_json::json!({ "choices": tracks }))
        }
        Err(error @ ResolveError::Exhausted { .. }) => {
            // Full per-strategy detail goes to the log, not the caller.
            error!(%guild_id, %query, ?error, "Resolution exhausted");
            HttpResponse::NotFound().body(NO_RESULTS_MESSAGE)
        }
    }
}

pub(crate) async fn play_track(
    play_session: Data<Arc<PlaySession>>,
    form: Json<TrackRequestForm>,
) -> impl Responder {
    let guild_id = GuildId::from(form.guild_id);
    let query = Query::new(form.query.clone());

    match play_session.resolve_and_play(&guild_id, &query).await {
        Ok(PlayOutcome::Playing(track)) => {
            HttpResponse::Ok().json(serde_json::json!({ "status": "playing", "track": track }))
        }
        Ok(PlayOutcome::Ended(track)) => {
            HttpResponse::Ok().json(serde_json::json!({ "status": "ended", "track": track }))
        }
        Ok(PlayOutcome::Disambiguate(tracks)) => {
            HttpResponse::Ok().json(serde_json::json!({ "choices": tracks }))
        }
        Err(error) => {
            error!(%guild_id, %query, ?error, "Play request failed");
            HttpResponse::NotFound().body(NO_RESULTS_MESSAGE)
        }
    }
}
