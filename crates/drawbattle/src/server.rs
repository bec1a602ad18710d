//! `DrawBattleServer` builder and server loop.
//!
//! This is the entry point for running a DrawBattle backend. It ties
//! together all the layers: HTTP/WebSocket → protocol → room registry →
//! room actors.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use drawbattle_protocol::{Codec, JsonCodec};
use drawbattle_room::{RoomConfig, RoomRegistry};
use drawbattle_transport::{Connection, WebSocketConnection};
use drawbattle_words::WordSource;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::handle_connection;
use crate::{DrawBattleError, ServerConfig, api};

/// Shared server state passed to every request and connection task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// does its own locking.
pub(crate) struct ServerState<W: WordSource, C: Codec> {
    pub(crate) registry: RoomRegistry<W>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a DrawBattle server.
///
/// # Example
///
/// ```rust,ignore
/// use drawbattle::prelude::*;
///
/// let server = DrawBattleServer::builder()
///     .bind("0.0.0.0:3001")
///     .build(FixedWordSource::new(["cat", "dog"]))
///     .await?;
/// server.run().await
/// ```
pub struct DrawBattleServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl DrawBattleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(&ServerConfig::default())
    }

    /// Creates a builder from a full [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr.clone(),
            room_config: config.room.clone(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and wires up the registry with `words`.
    ///
    /// Uses `JsonCodec` for the real-time channel.
    ///
    /// # Errors
    /// [`DrawBattleError::Io`] if the address cannot be bound.
    pub async fn build<W: WordSource>(
        self,
        words: W,
    ) -> Result<DrawBattleServer<W, JsonCodec>, DrawBattleError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(Arc::new(words), self.room_config),
            codec: JsonCodec,
        });

        Ok(DrawBattleServer { listener, state })
    }
}

impl Default for DrawBattleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound DrawBattle server.
///
/// Call [`run()`](Self::run) to start serving requests.
pub struct DrawBattleServer<W: WordSource, C: Codec> {
    listener: TcpListener,
    state: Arc<ServerState<W, C>>,
}

impl<W, C> DrawBattleServer<W, C>
where
    W: WordSource,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> DrawBattleServerBuilder {
        DrawBattleServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The registry behind this server.
    pub fn registry(&self) -> &RoomRegistry<W> {
        &self.state.registry
    }

    /// Serves HTTP and WebSocket traffic until the process is terminated.
    pub async fn run(self) -> Result<(), DrawBattleError> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "DrawBattle server running");

        let app = router(self.state);
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}

/// Builds the HTTP router.
fn router<W, C>(state: Arc<ServerState<W, C>>) -> Router
where
    W: WordSource,
    C: Codec + Clone,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::health))
        .route("/api/create-game", post(api::create_game::<W, C>))
        .route("/api/join-game", post(api::join_game::<W, C>))
        .route("/ws", get(ws_upgrade::<W, C>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Upgrades `GET /ws` and hands the socket to a connection handler task.
async fn ws_upgrade<W, C>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState<W, C>>>,
) -> impl IntoResponse
where
    W: WordSource,
    C: Codec + Clone,
{
    ws.on_upgrade(move |socket| async move {
        let conn = WebSocketConnection::new(socket);
        let conn_id = conn.id();
        if let Err(e) = handle_connection(conn, state).await {
            tracing::debug!(%conn_id, error = %e, "connection ended with error");
        }
    })
}
