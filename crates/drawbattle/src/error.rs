//! Unified error types for the DrawBattle server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use drawbattle_protocol::ProtocolError;
use drawbattle_room::RoomError;
use drawbattle_transport::TransportError;
use drawbattle_words::WordError;
use serde::Serialize;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DrawBattleError {
    /// A transport-level error (send, recv, close).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, name taken, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The word source could not be built or failed.
    #[error(transparent)]
    Words(#[from] WordError),

    /// Binding or serving the listener failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by the REST endpoints.
///
/// The display strings are the `error` field clients show to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Game not found")]
    NotFound,

    #[error("Name already taken")]
    NameTaken,

    #[error("Failed to generate words")]
    WordSource,

    #[error("Invalid request body")]
    InvalidRequest,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::NameTaken => StatusCode::BAD_REQUEST,
            Self::WordSource => StatusCode::BAD_GATEWAY,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        match err {
            // A room that shut down mid-request is gone as far as the
            // client is concerned.
            RoomError::NotFound(_) | RoomError::Unavailable(_) => {
                Self::NotFound
            }
            RoomError::NameTaken { .. } => Self::NameTaken,
            RoomError::Words(_) => Self::WordSource,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
