//! Core protocol types for DrawBattle's wire format.
//!
//! Every type here travels "on the wire": it is serialized to JSON, sent
//! over the real-time channel, and parsed by the browser client. Field and
//! event names are part of the client contract, so the serde attributes
//! matter as much as the Rust shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a generated room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Feedback text broadcast to the room on a correct guess.
pub const GUESS_CORRECT: &str = "Correct!";

/// Feedback text sent privately to the guesser on a wrong guess.
pub const GUESS_INCORRECT: &str = "Incorrect!";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short code that identifies a room, e.g. `"K3ZQ9A"`.
///
/// Serialized as a plain string. Lookups are exact: `"k3zq9a"` does not
/// resolve to `"K3ZQ9A"`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps a raw code. No validation happens here; codes arriving from
    /// clients are looked up as-is.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` if this looks like a server-generated code: exactly
    /// [`ROOM_CODE_LEN`] characters of `A-Z` / `0-9`.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ROOM_CODE_LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Teams and players
// ---------------------------------------------------------------------------

/// One of the two teams. Serialized as `"A"` / `"B"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Team {
    #[default]
    A,
    B,
}

impl Team {
    /// The opposing team.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// A player in a room. Names are unique within a room (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub team: Team,
}

/// Team membership lists, in join/switch order.
///
/// Serialized as `{"A": [...], "B": [...]}` so the client can index by the
/// same letter it sees on [`Player::team`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    #[serde(rename = "A")]
    pub a: Vec<String>,
    #[serde(rename = "B")]
    pub b: Vec<String>,
}

impl Teams {
    /// The member list for `team`.
    pub fn members(&self, team: Team) -> &[String] {
        match team {
            Team::A => &self.a,
            Team::B => &self.b,
        }
    }

    /// Mutable member list for `team`.
    pub fn members_mut(&mut self, team: Team) -> &mut Vec<String> {
        match team {
            Team::A => &mut self.a,
            Team::B => &mut self.b,
        }
    }

    /// Removes `name` from both lists. Returns `true` if it was present in
    /// either.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.a.len() + self.b.len();
        self.a.retain(|n| n != name);
        self.b.retain(|n| n != name);
        before != self.a.len() + self.b.len()
    }
}

// ---------------------------------------------------------------------------
// Strokes
// ---------------------------------------------------------------------------

/// A single pointer position on the shared canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One continuous pointer drag, as an ordered list of points.
///
/// Serialized as a bare JSON array. An EMPTY stroke is not a stroke: it is
/// the "clear canvas" sentinel. Consumers must drop their accumulated
/// strokes when they receive one instead of appending it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stroke(pub Vec<Point>);

impl Stroke {
    /// The "clear canvas" sentinel.
    pub fn clear() -> Self {
        Self(Vec::new())
    }

    /// `true` if this is the clear sentinel.
    pub fn is_clear(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Where a room is in its round lifecycle.
///
/// ```text
/// Lobby → InRound ⇄ RoundEnded
///            │          │
///            ▼          ▼
///         GameOver ─────┘ (start-game again → InRound)
/// ```
///
/// - **Lobby**: players are joining and picking teams.
/// - **InRound**: a word is live, guesses are evaluated, the countdown runs.
/// - **RoundEnded**: a correct guess closed the round and the next word is
///   being picked (possibly waiting on a word refill).
/// - **GameOver**: the countdown hit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    Lobby,
    InRound,
    RoundEnded,
    GameOver,
}

impl GamePhase {
    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Lobby, Self::InRound)
                | (Self::InRound, Self::RoundEnded)
                | (Self::InRound, Self::GameOver)
                | (Self::RoundEnded, Self::InRound)
                | (Self::RoundEnded, Self::GameOver)
                | (Self::GameOver, Self::InRound)
        )
    }

    /// `true` while a game is being played (countdown running).
    pub fn is_running(self) -> bool {
        matches!(self, Self::InRound | Self::RoundEnded)
    }

    /// `true` if `start-game` is allowed from this phase.
    pub fn can_start(self) -> bool {
        matches!(self, Self::Lobby | Self::GameOver)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InRound => write!(f, "InRound"),
            Self::RoundEnded => write!(f, "RoundEnded"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomSnapshot
// ---------------------------------------------------------------------------

/// Full room state as broadcast in `state-update`.
///
/// `time` is the configured round length in minutes, not the countdown;
/// the countdown travels separately in `tick` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub topic: String,
    pub players: Vec<Player>,
    pub teams: Teams,
    pub started: bool,
    pub time: u32,
    pub scores: BTreeMap<String, u32>,
    pub current_word: String,
    pub drawer: Option<String>,
    pub phase: GamePhase,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events a client sends to the server.
///
/// Adjacently tagged: `{"event": "guess", "data": {"code": "...", ...}}`.
/// Events without a payload omit `data`: `{"event": "start-game"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Attach this connection to a room under `name`.
    JoinRoom { code: RoomCode, name: String },

    /// Move this connection's player to the other team.
    SwitchTeam,

    /// Change the round length for the next countdown.
    SetTime { minutes: u32 },

    /// Start (or restart) the game in this connection's room.
    StartGame,

    /// A finished stroke drawn on the canvas of room `code`.
    Draw { code: RoomCode, stroke: Stroke },

    /// `name` guesses `text` in room `code`.
    Guess {
        code: RoomCode,
        name: String,
        text: String,
    },
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full room snapshot, sent after every mutation.
    StateUpdate(RoomSnapshot),

    /// A game was started.
    RoundStarted,

    /// Countdown progress, once per second.
    Tick {
        #[serde(rename = "secondsRemaining")]
        seconds_remaining: u32,
    },

    /// A stroke to draw, or the empty "clear canvas" sentinel.
    Stroke(Stroke),

    /// Guess feedback: broadcast when correct, private when not.
    GuessResult { message: String },

    /// The countdown reached zero.
    GameEnded,
}

#[cfg(test)]
mod tests {
    //! The browser client parses these shapes directly, so the tests pin
    //! the exact JSON.

    use super::*;

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::new("AB12CD")).unwrap();
        assert_eq!(json, "\"AB12CD\"");
    }

    #[test]
    fn test_room_code_well_formed() {
        assert!(RoomCode::new("AB12CD").is_well_formed());
        assert!(!RoomCode::new("ab12cd").is_well_formed());
        assert!(!RoomCode::new("AB12C").is_well_formed());
        assert!(!RoomCode::new("AB-2CD").is_well_formed());
    }

    #[test]
    fn test_team_other_flips() {
        assert_eq!(Team::A.other(), Team::B);
        assert_eq!(Team::B.other(), Team::A);
    }

    #[test]
    fn test_teams_serialize_with_letter_keys() {
        let teams = Teams {
            a: vec!["Alice".into()],
            b: vec!["Bob".into()],
        };
        let json = serde_json::to_value(&teams).unwrap();
        assert_eq!(json["A"][0], "Alice");
        assert_eq!(json["B"][0], "Bob");
    }

    #[test]
    fn test_teams_remove_from_either_list() {
        let mut teams = Teams {
            a: vec!["Alice".into(), "Carol".into()],
            b: vec!["Bob".into()],
        };
        assert!(teams.remove("Bob"));
        assert!(teams.b.is_empty());
        assert!(!teams.remove("Nobody"));
        assert_eq!(teams.a, vec!["Alice".to_string(), "Carol".to_string()]);
    }

    #[test]
    fn test_stroke_is_bare_array_of_points() {
        let stroke = Stroke(vec![Point { x: 1.0, y: 2.5 }]);
        let json = serde_json::to_string(&stroke).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.5}]"#);
    }

    #[test]
    fn test_clear_stroke_is_empty() {
        assert!(Stroke::clear().is_clear());
        assert!(!Stroke(vec![Point { x: 0.0, y: 0.0 }]).is_clear());
    }

    #[test]
    fn test_game_phase_transitions() {
        assert!(GamePhase::Lobby.can_transition_to(GamePhase::InRound));
        assert!(GamePhase::InRound.can_transition_to(GamePhase::RoundEnded));
        assert!(GamePhase::RoundEnded.can_transition_to(GamePhase::InRound));
        assert!(GamePhase::InRound.can_transition_to(GamePhase::GameOver));
        assert!(GamePhase::GameOver.can_transition_to(GamePhase::InRound));
        assert!(!GamePhase::Lobby.can_transition_to(GamePhase::GameOver));
        assert!(!GamePhase::GameOver.can_transition_to(GamePhase::Lobby));
    }

    #[test]
    fn test_game_phase_can_start() {
        assert!(GamePhase::Lobby.can_start());
        assert!(GamePhase::GameOver.can_start());
        assert!(!GamePhase::InRound.can_start());
        assert!(!GamePhase::RoundEnded.can_start());
    }

    #[test]
    fn test_client_unit_event_without_data() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"switch-team"}"#).unwrap();
        assert_eq!(event, ClientEvent::SwitchTeam);

        let json = serde_json::to_string(&ClientEvent::StartGame).unwrap();
        assert_eq!(json, r#"{"event":"start-game"}"#);
    }

    #[test]
    fn test_client_set_time_json_format() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"set-time","data":{"minutes":3}}"#)
                .unwrap();
        assert_eq!(event, ClientEvent::SetTime { minutes: 3 });
    }

    #[test]
    fn test_client_draw_json_format() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"draw","data":{"code":"AAAAAA","stroke":[{"x":1,"y":2}]}}"#,
        )
        .unwrap();
        match event {
            ClientEvent::Draw { code, stroke } => {
                assert_eq!(code.as_str(), "AAAAAA");
                assert_eq!(stroke.points(), &[Point { x: 1.0, y: 2.0 }]);
            }
            other => panic!("expected Draw, got {other:?}"),
        }
    }

    #[test]
    fn test_server_tick_uses_camel_case_field() {
        let json = serde_json::to_value(&ServerEvent::Tick {
            seconds_remaining: 59,
        })
        .unwrap();
        assert_eq!(json["event"], "tick");
        assert_eq!(json["data"]["secondsRemaining"], 59);
    }

    #[test]
    fn test_server_clear_stroke_is_empty_array() {
        let json =
            serde_json::to_string(&ServerEvent::Stroke(Stroke::clear())).unwrap();
        assert_eq!(json, r#"{"event":"stroke","data":[]}"#);
    }

    #[test]
    fn test_server_game_ended_has_no_data() {
        let json = serde_json::to_string(&ServerEvent::GameEnded).unwrap();
        assert_eq!(json, r#"{"event":"game-ended"}"#);
    }

    #[test]
    fn test_snapshot_uses_camel_case_keys() {
        let snapshot = RoomSnapshot {
            code: RoomCode::new("AB12CD"),
            topic: "animals".into(),
            players: vec![Player {
                name: "Alice".into(),
                team: Team::A,
            }],
            teams: Teams {
                a: vec!["Alice".into()],
                b: vec![],
            },
            started: false,
            time: 5,
            scores: BTreeMap::from([("Alice".to_string(), 0)]),
            current_word: String::new(),
            drawer: None,
            phase: GamePhase::Lobby,
        };
        let json = serde_json::to_value(&ServerEvent::StateUpdate(snapshot))
            .unwrap();
        assert_eq!(json["event"], "state-update");
        assert_eq!(json["data"]["currentWord"], "");
        assert_eq!(json["data"]["players"][0]["team"], "A");
        assert_eq!(json["data"]["scores"]["Alice"], 0);
        assert_eq!(json["data"]["phase"], "lobby");
    }
}
