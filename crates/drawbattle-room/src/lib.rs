//! Room lifecycle management for DrawBattle.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's game state, its countdown, and the list of attached connections.
//! All mutations of one room are serialised through the actor's command
//! channel.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, resolves codes, closes rooms
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Room`] — the pure game state and round rules
//! - [`Countdown`] — the one-second round timer
//! - [`RoomConfig`] — round length, batch size, scoring, idle timeout

mod config;
mod countdown;
mod error;
mod game;
mod registry;
mod room;

pub use config::RoomConfig;
pub use countdown::{Countdown, CountdownTick};
pub use error::RoomError;
pub use game::{GuessOutcome, Room};
pub use registry::{RoomRegistry, generate_room_code};
pub use room::{EventSender, RoomHandle};
