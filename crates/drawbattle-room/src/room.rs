//! Room actor: an isolated Tokio task that owns one game room.
//!
//! Each room runs in its own task and talks to the outside world through
//! an mpsc channel. Nothing else holds a reference to the [`Room`] state,
//! so a command sees the effects of every command before it and the
//! guessed-flag check needs no locking.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use drawbattle_protocol::{
    GUESS_CORRECT, GUESS_INCORRECT, RoomCode, RoomSnapshot, ServerEvent,
    Stroke,
};
use drawbattle_transport::ConnectionId;
use drawbattle_words::{WordError, WordSource};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::{Countdown, GuessOutcome, Room, RoomConfig, RoomError};

/// Channel sender for delivering events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` are request/response; the rest
/// are fire-and-forget, matching the real-time path where handlers never
/// answer the caller.
pub(crate) enum RoomCommand {
    /// Register a player (REST join).
    Join {
        name: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Subscribe a connection to this room's broadcasts under `name`.
    Attach {
        conn: ConnectionId,
        name: String,
        sender: EventSender,
    },

    /// The connection went away; its player leaves the room.
    Detach { conn: ConnectionId },

    SwitchTeam { conn: ConnectionId },

    SetTime { minutes: u32 },

    StartGame,

    Draw { stroke: Stroke },

    Guess {
        conn: ConnectionId,
        name: String,
        text: String,
    },

    /// Request the current room state.
    Snapshot { reply: oneshot::Sender<RoomSnapshot> },

    /// Shut down the room.
    Shutdown,
}

impl std::fmt::Debug for RoomCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Join { .. } => "Join",
            Self::Attach { .. } => "Attach",
            Self::Detach { .. } => "Detach",
            Self::SwitchTeam { .. } => "SwitchTeam",
            Self::SetTime { .. } => "SetTime",
            Self::StartGame => "StartGame",
            Self::Draw { .. } => "Draw",
            Self::Guess { .. } => "Guess",
            Self::Snapshot { .. } => "Snapshot",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone; it is just an `mpsc::Sender` wrapper. The registry holds
/// one per room and connection handlers clone it on `join-room`.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Registers a player on team A.
    ///
    /// # Errors
    /// [`RoomError::NameTaken`] on a duplicate name,
    /// [`RoomError::Unavailable`] if the room has shut down.
    pub async fn join(&self, name: &str) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            name: name.to_owned(),
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Subscribes `conn` to the room's broadcasts as `name`.
    pub async fn attach(
        &self,
        conn: ConnectionId,
        name: &str,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Attach {
            conn,
            name: name.to_owned(),
            sender,
        })
        .await
    }

    /// Unsubscribes `conn` and removes its player from the room.
    pub async fn detach(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Detach { conn }).await
    }

    pub async fn switch_team(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::SwitchTeam { conn }).await
    }

    pub async fn set_time(&self, minutes: u32) -> Result<(), RoomError> {
        self.send(RoomCommand::SetTime { minutes }).await
    }

    pub async fn start_game(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::StartGame).await
    }

    pub async fn draw(&self, stroke: Stroke) -> Result<(), RoomError> {
        self.send(RoomCommand::Draw { stroke }).await
    }

    /// Submits a guess. Feedback for a wrong guess goes to `conn` only.
    pub async fn guess(
        &self,
        conn: ConnectionId,
        name: &str,
        text: &str,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Guess {
            conn,
            name: name.to_owned(),
            text: text.to_owned(),
        })
        .await
    }

    /// Requests the current room state.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }
}

/// Result of a word refill running outside the actor.
type RefillResult = Result<Vec<String>, WordError>;

/// What to do once a pending refill lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundTrigger {
    /// `start-game`: announce the round and start the countdown.
    StartGame,
    /// A correct guess: announce the next word and clear the canvas.
    CorrectGuess,
}

/// A connection attached to the room.
struct Subscriber {
    name: String,
    sender: EventSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<W: WordSource> {
    room: Room,
    config: RoomConfig,
    words: Arc<W>,
    countdown: Countdown,
    subscribers: BTreeMap<ConnectionId, Subscriber>,
    /// Set while no connection is attached.
    idle_since: Option<Instant>,
    /// Set while a word refill is in flight.
    pending_round: Option<RoundTrigger>,
    refill_tx: mpsc::Sender<RefillResult>,
    refill_rx: mpsc::Receiver<RefillResult>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<W: WordSource> RoomActor<W> {
    /// Runs the actor loop until shutdown, idle expiry, or every handle
    /// being dropped.
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        loop {
            let idle_deadline = self.idle_deadline();
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                Some(result) = self.refill_rx.recv() => {
                    self.handle_refill(result);
                }
                tick = self.countdown.wait_for_tick() => {
                    self.broadcast(ServerEvent::Tick {
                        seconds_remaining: tick.remaining,
                    });
                    if tick.finished {
                        self.finish_game();
                    }
                }
                () = wait_until(idle_deadline) => {
                    tracing::info!(room = %self.room.code(), "room idle, closing");
                    break;
                }
            }
        }

        self.countdown.stop();
        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    /// Handles one command. Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        tracing::trace!(room = %self.room.code(), ?cmd, "room command");
        match cmd {
            RoomCommand::Join { name, reply } => {
                let result = self.room.join(&name);
                if result.is_ok() {
                    tracing::info!(
                        room = %self.room.code(),
                        player = %name,
                        players = self.room.players().len(),
                        "player joined"
                    );
                    self.broadcast_state();
                }
                let _ = reply.send(result);
            }
            RoomCommand::Attach { conn, name, sender } => {
                self.handle_attach(conn, name, sender);
            }
            RoomCommand::Detach { conn } => self.handle_detach(conn),
            RoomCommand::SwitchTeam { conn } => self.handle_switch_team(conn),
            RoomCommand::SetTime { minutes } => {
                self.room.set_time(minutes);
                tracing::debug!(room = %self.room.code(), minutes, "round time set");
                self.broadcast_state();
            }
            RoomCommand::StartGame => self.handle_start_game(),
            RoomCommand::Draw { stroke } => {
                self.room.record_stroke(stroke.clone());
                self.broadcast(ServerEvent::Stroke(stroke));
            }
            RoomCommand::Guess { conn, name, text } => {
                self.handle_guess(conn, &name, &text);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room = %self.room.code(), "room shutting down");
                return false;
            }
        }
        true
    }

    fn handle_attach(
        &mut self,
        conn: ConnectionId,
        name: String,
        sender: EventSender,
    ) {
        tracing::info!(
            room = %self.room.code(),
            %conn,
            player = %name,
            "connection attached"
        );
        // Late joiners get the strokes drawn so far this round.
        for stroke in self.room.strokes() {
            let _ = sender.send(ServerEvent::Stroke(stroke.clone()));
        }
        self.subscribers.insert(conn, Subscriber { name, sender });
        self.idle_since = None;
        self.broadcast_state();
    }

    fn handle_detach(&mut self, conn: ConnectionId) {
        let Some(subscriber) = self.subscribers.remove(&conn) else {
            tracing::debug!(room = %self.room.code(), %conn, "detach from unknown connection");
            return;
        };
        if self.room.remove_player(&subscriber.name) {
            tracing::info!(
                room = %self.room.code(),
                player = %subscriber.name,
                players = self.room.players().len(),
                "player left"
            );
        }
        if self.subscribers.is_empty() {
            self.idle_since = Some(Instant::now());
        }
        self.broadcast_state();
    }

    fn handle_switch_team(&mut self, conn: ConnectionId) {
        let Some(name) = self.subscribers.get(&conn).map(|s| s.name.clone())
        else {
            return;
        };
        match self.room.switch_team(&name) {
            Some(team) => {
                tracing::debug!(room = %self.room.code(), player = %name, %team, "switched team");
                self.broadcast_state();
            }
            None => {
                tracing::debug!(room = %self.room.code(), player = %name, "switch-team from unknown player");
            }
        }
    }

    fn handle_start_game(&mut self) {
        if self.pending_round.is_some() || !self.room.phase().can_start() {
            tracing::debug!(
                room = %self.room.code(),
                phase = %self.room.phase(),
                "start-game ignored while running"
            );
            return;
        }
        self.room.mark_started();
        self.start_round(RoundTrigger::StartGame);
    }

    fn handle_guess(&mut self, conn: ConnectionId, name: &str, text: &str) {
        match self
            .room
            .evaluate_guess(name, text, self.config.points_per_guess)
        {
            GuessOutcome::Correct => {
                tracing::info!(room = %self.room.code(), player = %name, "correct guess");
                self.broadcast(ServerEvent::GuessResult {
                    message: GUESS_CORRECT.to_string(),
                });
                self.start_round(RoundTrigger::CorrectGuess);
            }
            GuessOutcome::Incorrect => {
                self.send_to(
                    conn,
                    ServerEvent::GuessResult {
                        message: GUESS_INCORRECT.to_string(),
                    },
                );
            }
            GuessOutcome::Ignored => {
                tracing::debug!(room = %self.room.code(), player = %name, "guess ignored");
            }
        }
    }

    /// Begins a round now, or requests a refill first if the pool is low.
    /// In the latter case the round begins in [`handle_refill`].
    ///
    /// [`handle_refill`]: Self::handle_refill
    fn start_round(&mut self, trigger: RoundTrigger) {
        if self.room.needs_refill(self.config.refill_below) {
            self.request_refill(trigger);
        } else {
            self.begin_round(trigger);
        }
    }

    /// Fetches a fresh batch on a separate task. The actor keeps serving
    /// commands and ticks; the result comes back through `refill_rx`.
    fn request_refill(&mut self, trigger: RoundTrigger) {
        self.pending_round = Some(trigger);

        let words = Arc::clone(&self.words);
        let topic = self.room.topic().to_owned();
        let count = self.config.words_per_batch;
        let tx = self.refill_tx.clone();
        tracing::debug!(room = %self.room.code(), %topic, count, "word refill requested");

        tokio::spawn(async move {
            let result = words.fetch_words(&topic, count).await;
            // The room may have shut down meanwhile.
            let _ = tx.send(result).await;
        });
    }

    fn handle_refill(&mut self, result: RefillResult) {
        let Some(trigger) = self.pending_round.take() else {
            return;
        };
        match result {
            Ok(words) => {
                tracing::debug!(room = %self.room.code(), words = words.len(), "word pool refilled");
                self.room.refill(words);
            }
            Err(e) => {
                tracing::error!(room = %self.room.code(), error = %e, "word refill failed");
                return;
            }
        }
        if trigger == RoundTrigger::CorrectGuess
            && !self.room.phase().is_running()
        {
            tracing::debug!(room = %self.room.code(), "game ended during refill");
            return;
        }
        self.begin_round(trigger);
    }

    fn begin_round(&mut self, trigger: RoundTrigger) {
        if self.room.begin_round().is_none() {
            tracing::error!(room = %self.room.code(), "word pool empty, round not started");
            return;
        }
        self.broadcast_state();
        match trigger {
            RoundTrigger::StartGame => {
                self.broadcast(ServerEvent::RoundStarted);
                self.countdown
                    .start(self.room.round_minutes().saturating_mul(60));
                tracing::info!(
                    room = %self.room.code(),
                    minutes = self.room.round_minutes(),
                    "game started"
                );
            }
            RoundTrigger::CorrectGuess => {
                self.broadcast(ServerEvent::Stroke(Stroke::clear()));
            }
        }
    }

    fn finish_game(&mut self) {
        self.countdown.stop();
        self.room.end_game();
        self.broadcast_state();
        self.broadcast(ServerEvent::GameEnded);
        tracing::info!(room = %self.room.code(), "game ended");
    }

    fn broadcast_state(&self) {
        self.broadcast(ServerEvent::StateUpdate(self.room.snapshot()));
    }

    /// Sends an event to every attached connection. Connections whose
    /// receiver is gone are skipped; their Detach is on its way.
    fn broadcast(&self, event: ServerEvent) {
        for subscriber in self.subscribers.values() {
            let _ = subscriber.sender.send(event.clone());
        }
    }

    fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(subscriber) = self.subscribers.get(&conn) {
            let _ = subscriber.sender.send(event);
        }
    }

    fn idle_deadline(&self) -> Option<Instant> {
        match (self.idle_since, self.config.idle_timeout) {
            (Some(since), Some(timeout)) => Some(since + timeout),
            _ => None,
        }
    }
}

/// Resolves at `deadline`, or never if there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room<W: WordSource>(
    room: Room,
    config: RoomConfig,
    words: Arc<W>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let (refill_tx, refill_rx) = mpsc::channel(1);
    let code = room.code().clone();

    let actor = RoomActor {
        room,
        countdown: Countdown::new(tick_period(&config)),
        // A fresh room counts as idle until someone attaches.
        idle_since: Some(Instant::now()),
        config,
        words,
        subscribers: BTreeMap::new(),
        pending_round: None,
        refill_tx,
        refill_rx,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}

fn tick_period(config: &RoomConfig) -> Duration {
    if config.tick_interval.is_zero() {
        Duration::from_secs(1)
    } else {
        config.tick_interval
    }
}
