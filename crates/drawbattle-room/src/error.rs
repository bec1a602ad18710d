//! Error types for the room layer.

use drawbattle_protocol::RoomCode;
use drawbattle_words::WordError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Another player in the room already uses this name.
    #[error("name {name:?} already taken in room {code}")]
    NameTaken { code: RoomCode, name: String },

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// The word source failed while creating the room.
    #[error(transparent)]
    Words(#[from] WordError),
}
