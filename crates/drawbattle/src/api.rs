//! REST endpoints: health, create-game, join-game.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use drawbattle_protocol::{Codec, RoomCode};
use drawbattle_words::WordSource;
use serde::{Deserialize, Serialize};

use crate::ApiError;
use crate::server::ServerState;

pub(crate) const HEALTH_MESSAGE: &str = "DrawBattle backend running";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateGameRequest {
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateGameResponse {
    code: RoomCode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JoinGameRequest {
    code: RoomCode,
    name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct JoinGameResponse {
    success: bool,
}

/// `GET /`
pub(crate) async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// `POST /api/create-game {topic?}` → `{code}`.
///
/// The body is optional: a missing or unparsable body creates a room with
/// the default topic.
pub(crate) async fn create_game<W, C>(
    State(state): State<Arc<ServerState<W, C>>>,
    body: Bytes,
) -> Result<Json<CreateGameResponse>, ApiError>
where
    W: WordSource,
    C: Codec,
{
    let request: CreateGameRequest = if body.is_empty() {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "create-game body ignored");
            CreateGameRequest::default()
        })
    };

    let code = state
        .registry
        .create(request.topic.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "create-game failed");
            ApiError::from(e)
        })?;

    Ok(Json(CreateGameResponse { code }))
}

/// `POST /api/join-game {code, name}` → `{success: true}`.
///
/// A body that is not a `{code, name}` object is a 400 with the usual
/// `{error}` shape.
pub(crate) async fn join_game<W, C>(
    State(state): State<Arc<ServerState<W, C>>>,
    payload: Result<Json<JoinGameRequest>, JsonRejection>,
) -> Result<Json<JoinGameResponse>, ApiError>
where
    W: WordSource,
    C: Codec,
{
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "join-game body rejected");
        ApiError::InvalidRequest
    })?;

    state
        .registry
        .join(&request.code, &request.name)
        .await
        .map_err(|e| {
            tracing::debug!(room = %request.code, player = %request.name, error = %e, "join-game rejected");
            ApiError::from(e)
        })?;

    Ok(Json(JoinGameResponse { success: true }))
}
