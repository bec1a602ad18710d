//! Room registry: creates rooms, resolves codes, and closes rooms.

use std::collections::HashMap;
use std::sync::Arc;

use drawbattle_protocol::{ROOM_CODE_LEN, RoomCode};
use drawbattle_words::WordSource;
use rand::Rng;
use tokio::sync::RwLock;

use crate::room::spawn_room;
use crate::{Room, RoomConfig, RoomError, RoomHandle};

/// Topic used when the creator does not supply one.
pub const DEFAULT_TOPIC: &str = "anything";

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random [`ROOM_CODE_LEN`]-character code from `A-Z0-9`.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect();
    RoomCode::new(code)
}

/// All live rooms, keyed by code.
///
/// This is the entry point for room operations from the REST API and the
/// real-time gateway. The map is behind an async `RwLock`; room state
/// itself lives in the actors, so the lock is only held for lookups and
/// inserts, never across a word fetch or a room command.
///
/// Rooms leave the registry through [`close`](Self::close) or by shutting
/// themselves down when idle; closed handles are pruned lazily.
pub struct RoomRegistry<W: WordSource> {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    words: Arc<W>,
    config: RoomConfig,
}

impl<W: WordSource> RoomRegistry<W> {
    pub fn new(words: Arc<W>, config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            words,
            config,
        }
    }

    /// Creates a room for `topic` and returns its code.
    ///
    /// A blank or missing topic becomes [`DEFAULT_TOPIC`]. The initial word
    /// pool is fetched before the room exists.
    ///
    /// # Errors
    /// [`RoomError::Words`] if the word source fails; nothing is stored.
    pub async fn create(
        &self,
        topic: Option<&str>,
    ) -> Result<RoomCode, RoomError> {
        let topic = match topic.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_owned(),
            _ => DEFAULT_TOPIC.to_owned(),
        };

        let words = self
            .words
            .fetch_words(&topic, self.config.words_per_batch)
            .await?;

        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, handle| !handle.is_closed());
        let code = loop {
            let candidate = generate_room_code(&mut rand::rng());
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let room = Room::new(
            code.clone(),
            topic.clone(),
            words,
            self.config.default_round_minutes,
        );
        let handle =
            spawn_room(room, self.config.clone(), Arc::clone(&self.words));
        rooms.insert(code.clone(), handle);

        tracing::info!(room = %code, %topic, rooms = rooms.len(), "room created");
        Ok(code)
    }

    /// Resolves a code to a live room.
    pub async fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        let handle = self.rooms.read().await.get(code).cloned()?;
        if handle.is_closed() {
            self.rooms.write().await.remove(code);
            tracing::debug!(room = %code, "pruned closed room");
            return None;
        }
        Some(handle)
    }

    /// Registers `name` in room `code`.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] for an unknown code, [`RoomError::NameTaken`]
    /// for a duplicate name.
    pub async fn join(
        &self,
        code: &RoomCode,
        name: &str,
    ) -> Result<(), RoomError> {
        let handle = self
            .get(code)
            .await
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        match handle.join(name).await {
            // The actor stopped between lookup and join.
            Err(RoomError::Unavailable(code)) => Err(RoomError::NotFound(code)),
            other => other,
        }
    }

    /// Shuts a room down and removes it.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] for an unknown code.
    pub async fn close(&self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        tracing::info!(room = %code, "room closed");
        Ok(())
    }

    /// Drops handles of rooms whose actors have stopped. Returns how many
    /// were removed.
    pub async fn prune(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, handle| !handle.is_closed());
        before - rooms.len()
    }

    /// Number of registered rooms, including closed ones not yet pruned.
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
