//! # DrawBattle
//!
//! Backend for a team drawing-and-guessing game. Players create a room over
//! REST, join it by code, and then play over a WebSocket: one player draws,
//! the others guess the word, and a countdown ends the game.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drawbattle::prelude::*;
//!
//! # async fn run() -> Result<(), DrawBattleError> {
//! let words = OpenRouterWordSource::new(OpenRouterConfig::default())?;
//! let server = DrawBattleServer::<OpenRouterWordSource, JsonCodec>::builder()
//!     .bind("0.0.0.0:3001")
//!     .build(words)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod api;
mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::{ApiError, DrawBattleError};
pub use server::{DrawBattleServer, DrawBattleServerBuilder};

/// Convenience re-exports for common types.
///
/// ```rust
/// use drawbattle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ApiError, DrawBattleError, DrawBattleServer, DrawBattleServerBuilder,
        ServerConfig,
    };

    pub use drawbattle_protocol::{
        ClientEvent, Codec, GamePhase, JsonCodec, Player, Point, RoomCode,
        RoomSnapshot, ServerEvent, Stroke, Team, Teams,
    };
    pub use drawbattle_room::{RoomConfig, RoomError, RoomRegistry};
    pub use drawbattle_transport::{ConnectionId, TransportError};
    pub use drawbattle_words::{
        FixedWordSource, OpenRouterConfig, OpenRouterWordSource, WordError,
        WordSource,
    };
}
