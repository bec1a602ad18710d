//! Integration tests for the DrawBattle server: REST setup and the full
//! WebSocket game flow.

use std::time::Duration;

use drawbattle::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server(words: FixedWordSource) -> String {
    start_server_with(
        words,
        RoomConfig {
            idle_timeout: None,
            ..RoomConfig::default()
        },
    )
    .await
}

async fn start_server_with(words: FixedWordSource, config: RoomConfig) -> String {
    let server = DrawBattleServer::<FixedWordSource, JsonCodec>::builder()
        .bind("127.0.0.1:0")
        .room_config(config)
        .build(words)
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn create_game(addr: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/api/create-game"))
        .json(&body)
        .send()
        .await
        .expect("create-game request")
}

async fn create_code(addr: &str, topic: &str) -> String {
    let body: Value = create_game(addr, json!({ "topic": topic }))
        .await
        .json()
        .await
        .expect("create-game body");
    body["code"].as_str().expect("code").to_string()
}

async fn join_game(addr: &str, code: &str, name: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/api/join-game"))
        .json(&json!({ "code": code, "name": name }))
        .send()
        .await
        .expect("join-game request")
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, event: &ClientEvent) {
    let text = serde_json::to_string(event).expect("encode");
    ws.send(Message::Text(text.into())).await.expect("send");
}

/// Next server event, skipping countdown ticks.
async fn next_event(ws: &mut ClientWs) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("ws error");
        let Message::Text(text) = msg else {
            continue;
        };
        let event: ServerEvent =
            serde_json::from_str(text.as_str()).expect("decode");
        if !matches!(event, ServerEvent::Tick { .. }) {
            return event;
        }
    }
}

async fn next_state(ws: &mut ClientWs) -> RoomSnapshot {
    loop {
        if let ServerEvent::StateUpdate(snapshot) = next_event(ws).await {
            return snapshot;
        }
    }
}

/// Joins over REST, then attaches a socket to the room.
async fn join_player(addr: &str, code: &str, name: &str) -> ClientWs {
    assert!(join_game(addr, code, name).await.status().is_success());
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        &ClientEvent::JoinRoom {
            code: RoomCode::new(code),
            name: name.to_string(),
        },
    )
    .await;
    ws
}

// =========================================================================
// REST
// =========================================================================

#[tokio::test]
async fn test_health() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let body = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "DrawBattle backend running");
}

#[tokio::test]
async fn test_create_game_returns_code() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let response = create_game(&addr, json!({ "topic": "animals" })).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let code = RoomCode::new(body["code"].as_str().unwrap());
    assert!(code.is_well_formed());
}

#[tokio::test]
async fn test_create_game_without_body() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/create-game"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_create_game_word_failure_is_502() {
    let words = FixedWordSource::new(["cat"]);
    words.set_failing(true);
    let addr = start_server(words).await;

    let response = create_game(&addr, json!({ "topic": "animals" })).await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_join_game_errors() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let code = create_code(&addr, "animals").await;

    let response = join_game(&addr, "NOPE00", "Alice").await;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Game not found" }));

    let response = join_game(&addr, &code, "Alice").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));

    let response = join_game(&addr, &code, "Alice").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Name already taken" }));
}

#[tokio::test]
async fn test_join_game_malformed_body_is_400() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let client = reqwest::Client::new();

    for body in [json!({}), json!({ "code": "ABC123" }), json!({ "name": 5 })] {
        let response = client
            .post(format!("http://{addr}/api/join-game"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "body {body}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Invalid request body" }));
    }

    let response = client
        .post(format!("http://{addr}/api/join-game"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

// =========================================================================
// Real-time channel
// =========================================================================

#[tokio::test]
async fn test_join_room_broadcasts_state() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let code = create_code(&addr, "animals").await;

    let mut alice = join_player(&addr, &code, "Alice").await;
    let snapshot = next_state(&mut alice).await;
    assert_eq!(snapshot.code.as_str(), code);
    assert_eq!(snapshot.topic, "animals");
    assert_eq!(snapshot.teams.a, vec!["Alice"]);
    assert_eq!(snapshot.phase, GamePhase::Lobby);
}

#[tokio::test]
async fn test_full_round_over_websocket() {
    let addr =
        start_server(FixedWordSource::new(["sun", "dog", "Cat"])).await;
    let code = create_code(&addr, "animals").await;

    let mut alice = join_player(&addr, &code, "Alice").await;
    next_state(&mut alice).await;
    let mut bob = join_player(&addr, &code, "Bob").await;
    next_state(&mut bob).await;
    next_state(&mut alice).await;

    send(&mut alice, &ClientEvent::StartGame).await;
    let snapshot = next_state(&mut bob).await;
    assert!(snapshot.started);
    assert_eq!(snapshot.current_word, "Cat");
    assert_eq!(snapshot.drawer.as_deref(), Some("Alice"));
    assert_eq!(next_event(&mut bob).await, ServerEvent::RoundStarted);

    let line = Stroke(vec![Point { x: 1.0, y: 1.0 }, Point { x: 2.0, y: 2.0 }]);
    send(
        &mut alice,
        &ClientEvent::Draw {
            code: RoomCode::new(&code),
            stroke: line.clone(),
        },
    )
    .await;
    assert_eq!(next_event(&mut bob).await, ServerEvent::Stroke(line));

    send(
        &mut bob,
        &ClientEvent::Guess {
            code: RoomCode::new(&code),
            name: "Bob".into(),
            text: "horse".into(),
        },
    )
    .await;
    assert_eq!(
        next_event(&mut bob).await,
        ServerEvent::GuessResult {
            message: "Incorrect!".into()
        }
    );

    send(
        &mut bob,
        &ClientEvent::Guess {
            code: RoomCode::new(&code),
            name: "Bob".into(),
            text: " cat".into(),
        },
    )
    .await;
    assert_eq!(
        next_event(&mut bob).await,
        ServerEvent::GuessResult {
            message: "Correct!".into()
        }
    );
    let snapshot = next_state(&mut bob).await;
    assert_eq!(snapshot.scores["Bob"], 10);
    assert_eq!(snapshot.current_word, "dog");
    assert_eq!(next_event(&mut bob).await, ServerEvent::Stroke(Stroke::clear()));
}

#[tokio::test]
async fn test_switch_team_and_set_time() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let code = create_code(&addr, "animals").await;

    let mut alice = join_player(&addr, &code, "Alice").await;
    next_state(&mut alice).await;

    send(&mut alice, &ClientEvent::SwitchTeam).await;
    let snapshot = next_state(&mut alice).await;
    assert!(snapshot.teams.a.is_empty());
    assert_eq!(snapshot.teams.b, vec!["Alice"]);

    send(&mut alice, &ClientEvent::SetTime { minutes: 2 }).await;
    let snapshot = next_state(&mut alice).await;
    assert_eq!(snapshot.time, 2);
}

#[tokio::test]
async fn test_disconnect_removes_player() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let code = create_code(&addr, "animals").await;

    let mut alice = join_player(&addr, &code, "Alice").await;
    next_state(&mut alice).await;
    let mut bob = join_player(&addr, &code, "Bob").await;
    next_state(&mut bob).await;

    alice.close(None).await.expect("close");
    // The server finishes the close handshake and ends the stream.
    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match alice.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "socket was not closed");

    let snapshot = next_state(&mut bob).await;
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].name, "Bob");
    assert!(!snapshot.scores.contains_key("Alice"));
    assert!(!snapshot.teams.a.contains(&"Alice".to_string()));

    // The name is free again.
    assert_eq!(join_game(&addr, &code, "Alice").await.status(), 200);
}

#[tokio::test]
async fn test_invalid_frames_and_unknown_rooms_ignored() {
    let addr = start_server(FixedWordSource::new(["cat"])).await;
    let code = create_code(&addr, "animals").await;

    let mut ws = connect(&addr).await;
    ws.send(Message::Text("not json".into())).await.expect("send");
    send(&mut ws, &ClientEvent::StartGame).await;
    send(
        &mut ws,
        &ClientEvent::JoinRoom {
            code: RoomCode::new("ZZZZZZ"),
            name: "Ghost".into(),
        },
    )
    .await;

    // The connection is still usable afterwards.
    assert_eq!(join_game(&addr, &code, "Alice").await.status(), 200);
    send(
        &mut ws,
        &ClientEvent::JoinRoom {
            code: RoomCode::new(&code),
            name: "Alice".into(),
        },
    )
    .await;
    let snapshot = next_state(&mut ws).await;
    assert_eq!(snapshot.players.len(), 1);
}

#[tokio::test]
async fn test_events_for_stopped_room_are_dropped() {
    let addr = start_server_with(
        FixedWordSource::new(["cat"]),
        RoomConfig {
            idle_timeout: Some(Duration::from_millis(400)),
            ..RoomConfig::default()
        },
    )
    .await;
    let stale = create_code(&addr, "animals").await;
    tokio::time::sleep(Duration::from_millis(800)).await;

    let mut ws = connect(&addr).await;
    send(
        &mut ws,
        &ClientEvent::Draw {
            code: RoomCode::new(&stale),
            stroke: Stroke::clear(),
        },
    )
    .await;
    send(
        &mut ws,
        &ClientEvent::Guess {
            code: RoomCode::new(&stale),
            name: "Ghost".into(),
            text: "cat".into(),
        },
    )
    .await;
    assert_eq!(join_game(&addr, &stale, "Alice").await.status(), 404);

    // The same socket still works for a live room.
    let code = create_code(&addr, "animals").await;
    assert_eq!(join_game(&addr, &code, "Alice").await.status(), 200);
    send(
        &mut ws,
        &ClientEvent::JoinRoom {
            code: RoomCode::new(&code),
            name: "Alice".into(),
        },
    )
    .await;
    let snapshot = next_state(&mut ws).await;
    assert_eq!(snapshot.code.as_str(), code);
}
