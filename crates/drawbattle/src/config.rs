//! Server configuration.

use drawbattle_room::RoomConfig;
use drawbattle_words::OpenRouterConfig;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";

/// Everything needed to start a server.
///
/// Library users fill this in directly; the binary builds it from CLI
/// flags and environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind_addr: String,

    /// Settings applied to every room.
    pub room: RoomConfig,

    /// Settings for the production
    /// [`OpenRouterWordSource`](drawbattle_words::OpenRouterWordSource).
    pub words: OpenRouterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            room: RoomConfig::default(),
            words: OpenRouterConfig::default(),
        }
    }
}
