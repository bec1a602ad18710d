//! Room state and round rules, without any I/O.
//!
//! [`Room`] is owned by exactly one room actor. Every method here is
//! synchronous and deterministic; the actor decides when to fetch words,
//! what to broadcast, and when the countdown runs.

use std::collections::BTreeMap;

use drawbattle_protocol::{
    GamePhase, Player, RoomCode, RoomSnapshot, Stroke, Team, Teams,
};

use crate::RoomError;

/// Result of evaluating a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// First correct guess of the round. Points were awarded.
    Correct,
    /// Wrong word. Nothing changed.
    Incorrect,
    /// No live round, the round is already guessed, or the guesser is not
    /// a player. Nothing changed and no feedback is due.
    Ignored,
}

/// The authoritative state of one game room.
///
/// Invariants kept by every method:
/// - each player is in exactly one of `teams.a` / `teams.b`, on the side
///   named by `player.team`;
/// - `scores` has exactly one entry per player;
/// - `drawer`, when set, names a current player.
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    topic: String,
    players: Vec<Player>,
    teams: Teams,
    started: bool,
    round_minutes: u32,
    current_word: String,
    word_pool: Vec<String>,
    scores: BTreeMap<String, u32>,
    strokes: Vec<Stroke>,
    guessed: bool,
    drawer: Option<String>,
    phase: GamePhase,
}

impl Room {
    pub fn new(
        code: RoomCode,
        topic: impl Into<String>,
        word_pool: Vec<String>,
        round_minutes: u32,
    ) -> Self {
        Self {
            code,
            topic: topic.into(),
            players: Vec::new(),
            teams: Teams::default(),
            started: false,
            round_minutes,
            current_word: String::new(),
            word_pool,
            scores: BTreeMap::new(),
            strokes: Vec::new(),
            guessed: false,
            drawer: None,
            phase: GamePhase::Lobby,
        }
    }

    // -- Accessors --

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn round_minutes(&self) -> u32 {
        self.round_minutes
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn word_pool(&self) -> &[String] {
        &self.word_pool
    }

    pub fn scores(&self) -> &BTreeMap<String, u32> {
        &self.scores
    }

    pub fn score(&self, name: &str) -> Option<u32> {
        self.scores.get(name).copied()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn guessed(&self) -> bool {
        self.guessed
    }

    pub fn drawer(&self) -> Option<&str> {
        self.drawer.as_deref()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    // -- Membership --

    /// Adds a player to team A with a score of zero.
    ///
    /// # Errors
    /// [`RoomError::NameTaken`] if the name is already present (exact,
    /// case-sensitive match). The room is left untouched.
    pub fn join(&mut self, name: &str) -> Result<(), RoomError> {
        if self.has_player(name) {
            return Err(RoomError::NameTaken {
                code: self.code.clone(),
                name: name.to_owned(),
            });
        }
        self.players.push(Player {
            name: name.to_owned(),
            team: Team::A,
        });
        self.teams.a.push(name.to_owned());
        self.scores.insert(name.to_owned(), 0);
        Ok(())
    }

    /// Removes a player from the player list, both teams, and the scores.
    /// Returns `false` if no such player exists.
    pub fn remove_player(&mut self, name: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.name != name);
        if self.players.len() == before {
            return false;
        }
        self.teams.remove(name);
        self.scores.remove(name);
        if self.drawer.as_deref() == Some(name) {
            self.drawer = self.derive_drawer();
        }
        true
    }

    /// Moves a player to the other team, appended at the end of its list.
    /// Returns the new team, or `None` if no such player exists.
    pub fn switch_team(&mut self, name: &str) -> Option<Team> {
        let player = self.players.iter_mut().find(|p| p.name == name)?;
        let from = player.team;
        let to = from.other();
        player.team = to;

        self.teams.members_mut(from).retain(|n| n != name);
        self.teams.members_mut(to).push(name.to_owned());

        if self.drawer.as_deref() == Some(name) {
            self.drawer = self.derive_drawer();
        }
        Some(to)
    }

    /// Sets the round length used by the next countdown.
    pub fn set_time(&mut self, minutes: u32) {
        self.round_minutes = minutes;
    }

    // -- Round lifecycle --

    /// `true` if the pool must be refilled before the next round.
    pub fn needs_refill(&self, refill_below: usize) -> bool {
        self.word_pool.len() < refill_below
    }

    /// Replaces the word pool with a fresh batch. Leftover words are
    /// dropped; repeats across batches are not filtered.
    pub fn refill(&mut self, words: Vec<String>) {
        self.word_pool = words;
    }

    /// Marks the game as started (`start-game` was received).
    pub fn mark_started(&mut self) {
        self.started = true;
    }

    /// Starts a round: pops the next word from the back of the pool,
    /// clears the canvas, resets the guessed flag, and picks the drawer.
    ///
    /// Returns the new word, or `None` (state untouched) if the pool is
    /// empty.
    pub fn begin_round(&mut self) -> Option<&str> {
        let word = self.word_pool.pop()?;
        self.current_word = word;
        self.strokes.clear();
        self.guessed = false;
        self.drawer = self.derive_drawer();
        self.set_phase(GamePhase::InRound);
        Some(&self.current_word)
    }

    /// Evaluates `text` from `name` against the current word.
    ///
    /// Match rule: `text` trimmed, compared case-insensitively, whole word
    /// only. The first correct guess of a round awards `points` and moves
    /// the room to [`GamePhase::RoundEnded`].
    pub fn evaluate_guess(
        &mut self,
        name: &str,
        text: &str,
        points: u32,
    ) -> GuessOutcome {
        if self.phase != GamePhase::InRound
            || self.guessed
            || self.current_word.is_empty()
        {
            return GuessOutcome::Ignored;
        }
        let Some(score) = self.scores.get_mut(name) else {
            return GuessOutcome::Ignored;
        };

        if text.trim().to_lowercase() != self.current_word.to_lowercase() {
            return GuessOutcome::Incorrect;
        }

        *score += points;
        self.guessed = true;
        self.set_phase(GamePhase::RoundEnded);
        GuessOutcome::Correct
    }

    /// Records a stroke. An empty stroke is the clear sentinel and wipes
    /// the accumulated strokes instead of being stored.
    pub fn record_stroke(&mut self, stroke: Stroke) {
        if stroke.is_clear() {
            self.strokes.clear();
        } else {
            self.strokes.push(stroke);
        }
    }

    /// The countdown reached zero.
    pub fn end_game(&mut self) {
        self.set_phase(GamePhase::GameOver);
    }

    /// Full serialisable view of the room.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            topic: self.topic.clone(),
            players: self.players.clone(),
            teams: self.teams.clone(),
            started: self.started,
            time: self.round_minutes,
            scores: self.scores.clone(),
            current_word: self.current_word.clone(),
            drawer: self.drawer.clone(),
            phase: self.phase,
        }
    }

    fn set_phase(&mut self, next: GamePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition {} -> {next}",
            self.phase
        );
        self.phase = next;
    }

    /// First member of the drawing team (A), falling back to team B.
    fn derive_drawer(&self) -> Option<String> {
        self.teams
            .a
            .first()
            .or_else(|| self.teams.b.first())
            .cloned()
    }
}
