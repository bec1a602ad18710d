//! Wire protocol for DrawBattle.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomSnapshot`], etc.) —
//!   the named events that travel over the real-time channel.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer does not know about sockets or rooms. It only knows
//! the shape of the messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent / ServerEvent) → Room actor
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, GamePhase, Player, Point, RoomCode, RoomSnapshot,
    ServerEvent, Stroke, Team, Teams, GUESS_CORRECT, GUESS_INCORRECT,
    ROOM_CODE_LEN,
};
