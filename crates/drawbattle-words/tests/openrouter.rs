//! Tests the chat-completion client against a local mock provider.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use drawbattle_words::{
    OpenRouterConfig, OpenRouterWordSource, WordError, WordSource,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Captured {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

async fn start_provider(reply: Value, status: StatusCode) -> (String, Captured) {
    let captured = Captured::default();

    let handler = move |State(cap): State<Captured>,
                        headers: HeaderMap,
                        Json(body): Json<Value>| {
        let reply = reply.clone();
        async move {
            *cap.auth.lock().unwrap() = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            *cap.body.lock().unwrap() = Some(body);
            (status, Json(reply)).into_response()
        }
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(handler))
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/v1"), captured)
}

fn source(base_url: String) -> OpenRouterWordSource {
    OpenRouterWordSource::new(OpenRouterConfig {
        api_key: "test-key".into(),
        base_url,
        ..OpenRouterConfig::default()
    })
    .unwrap()
}

fn completion(content: &str) -> Value {
    json!({
        "id": "gen-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}}
        ]
    })
}

#[tokio::test]
async fn test_fetch_words_parses_lines() {
    let (base, captured) =
        start_provider(completion("Cat\n\nDog\r\n  Elephant \n"), StatusCode::OK)
            .await;

    let words = source(base).fetch_words("animals", 10).await.unwrap();
    assert_eq!(words, vec!["Cat", "Dog", "Elephant"]);

    let auth = captured.auth.lock().unwrap().clone();
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "mistralai/mistral-7b-instruct");
    assert_eq!(body["messages"][0]["role"], "user");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("\"animals\""));
}

#[tokio::test]
async fn test_fetch_words_http_error_status() {
    let (base, _) = start_provider(
        json!({"error": {"message": "no credits"}}),
        StatusCode::PAYMENT_REQUIRED,
    )
    .await;

    let result = source(base).fetch_words("animals", 10).await;
    assert!(
        matches!(result, Err(WordError::Status { status: 402, .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_fetch_words_without_choices_is_malformed() {
    let (base, _) = start_provider(json!({"choices": []}), StatusCode::OK).await;

    let result = source(base).fetch_words("animals", 10).await;
    assert!(matches!(result, Err(WordError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_fetch_words_blank_reply_is_no_words() {
    let (base, _) = start_provider(completion("\n  \n"), StatusCode::OK).await;

    let result = source(base).fetch_words("animals", 10).await;
    assert!(matches!(result, Err(WordError::NoWords(_))));
}
