//! Per-connection handler: event decoding and routing to room actors.
//!
//! Each upgraded WebSocket gets its own Tokio task running this handler.
//! The flow is:
//!   1. Spawn a writer task that drains this connection's event channel
//!   2. Loop: receive frames → decode `ClientEvent` → forward to a room
//!   3. On exit, close the socket and detach from the bound room (the
//!      player leaves)
//!
//! Nothing is ever sent back as an error: unknown rooms, unknown players
//! and undecodable frames are logged and dropped.

use std::sync::Arc;

use drawbattle_protocol::{ClientEvent, Codec, ServerEvent};
use drawbattle_room::{RoomError, RoomHandle};
use drawbattle_transport::{Connection, ConnectionId, WebSocketConnection};
use drawbattle_words::WordSource;
use tokio::sync::mpsc;

use crate::DrawBattleError;
use crate::server::ServerState;

/// Drop guard that detaches the connection from its room when the handler
/// exits.
///
/// This ensures the player is removed even if the handler returns early
/// with an error. Since `Drop` is synchronous, the detach is sent from a
/// fire-and-forget task.
struct RoomGuard {
    conn_id: ConnectionId,
    room: Option<RoomHandle>,
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        let Some(room) = self.room.take() else {
            return;
        };
        let conn_id = self.conn_id;
        tokio::spawn(async move {
            log_dropped(conn_id, "detach", room.detach(conn_id).await);
        });
    }
}

/// Handles a single connection from upgrade to close.
pub(crate) async fn handle_connection<W, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<W, C>>,
) -> Result<(), DrawBattleError>
where
    W: WordSource,
    C: Codec + Clone,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    tokio::spawn(write_events(conn.clone(), state.codec.clone(), events_rx));

    let mut guard = RoomGuard {
        conn_id,
        room: None,
    };

    let outcome = loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break Ok(());
            }
            Err(e) => break Err(e),
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                continue;
            }
        };

        dispatch(&state, &mut guard, &events_tx, event).await;
    };

    // A peer that already completed the close handshake makes this fail.
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close after read loop failed");
    }

    // guard drops here → detach fires.
    Ok(outcome?)
}

/// Routes one decoded event to the room it concerns.
async fn dispatch<W, C>(
    state: &ServerState<W, C>,
    guard: &mut RoomGuard,
    events_tx: &mpsc::UnboundedSender<ServerEvent>,
    event: ClientEvent,
) where
    W: WordSource,
    C: Codec,
{
    let conn_id = guard.conn_id;

    match event {
        ClientEvent::JoinRoom { code, name } => {
            let Some(room) = state.registry.get(&code).await else {
                tracing::debug!(%conn_id, room = %code, "join-room for unknown room");
                return;
            };
            if let Some(previous) = guard.room.take() {
                if previous.code() != room.code() {
                    log_dropped(conn_id, "detach", previous.detach(conn_id).await);
                }
            }
            match room.attach(conn_id, &name, events_tx.clone()).await {
                Ok(()) => guard.room = Some(room),
                Err(e) => {
                    tracing::debug!(%conn_id, room = %code, error = %e, "attach failed");
                }
            }
        }

        ClientEvent::SwitchTeam => {
            if let Some(room) = bound_room(guard, "switch-team") {
                log_dropped(conn_id, "switch-team", room.switch_team(conn_id).await);
            }
        }

        ClientEvent::SetTime { minutes } => {
            if let Some(room) = bound_room(guard, "set-time") {
                log_dropped(conn_id, "set-time", room.set_time(minutes).await);
            }
        }

        ClientEvent::StartGame => {
            if let Some(room) = bound_room(guard, "start-game") {
                log_dropped(conn_id, "start-game", room.start_game().await);
            }
        }

        ClientEvent::Draw { code, stroke } => {
            match state.registry.get(&code).await {
                Some(room) => log_dropped(conn_id, "draw", room.draw(stroke).await),
                None => {
                    tracing::debug!(%conn_id, room = %code, "draw for unknown room");
                }
            }
        }

        ClientEvent::Guess { code, name, text } => {
            match state.registry.get(&code).await {
                Some(room) => {
                    log_dropped(conn_id, "guess", room.guess(conn_id, &name, &text).await);
                }
                None => {
                    tracing::debug!(%conn_id, room = %code, "guess for unknown room");
                }
            }
        }
    }
}

/// The room this connection joined, if it is still running.
fn bound_room<'a>(guard: &'a RoomGuard, event: &str) -> Option<&'a RoomHandle> {
    match &guard.room {
        Some(room) if !room.is_closed() => Some(room),
        _ => {
            tracing::debug!(conn_id = %guard.conn_id, event, "no room joined, event ignored");
            None
        }
    }
}

/// A room that stopped between lookup and send rejects the command with
/// [`RoomError::Unavailable`]; the event is dropped like any other.
fn log_dropped(conn_id: ConnectionId, event: &str, result: Result<(), RoomError>) {
    if let Err(e) = result {
        tracing::debug!(%conn_id, event, error = %e, "room command dropped");
    }
}

/// Encodes queued events and writes them to the socket until the channel
/// closes or the socket fails.
async fn write_events<C: Codec>(
    conn: WebSocketConnection,
    codec: C,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
) {
    let conn_id = conn.id();
    while let Some(event) = events.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, writer stopping");
            break;
        }
    }
}
