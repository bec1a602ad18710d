use std::time::Duration;

use clap::Parser;
use drawbattle::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// DrawBattle game backend.
#[derive(Debug, Parser)]
#[command(name = "drawbattle", version, about)]
struct Args {
    /// Address to listen on for HTTP and WebSocket traffic
    #[arg(short, long, env = "DRAWBATTLE_BIND", default_value = "0.0.0.0:3001")]
    bind: String,

    /// API key for the word provider
    #[arg(long, env = "OPENROUTER_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Word provider API root
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = "https://openrouter.ai/api/v1")]
    base_url: String,

    /// Model used to generate words
    #[arg(long, env = "OPENROUTER_MODEL", default_value = "mistralai/mistral-7b-instruct")]
    model: String,

    /// Words requested per batch
    #[arg(long, env = "DRAWBATTLE_WORDS_PER_BATCH", default_value_t = 10)]
    words_per_batch: usize,

    /// Seconds a room may sit without connections before it closes (0 = never)
    #[arg(long, env = "DRAWBATTLE_IDLE_TIMEOUT_SECS", default_value_t = 1800)]
    idle_timeout_secs: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let idle_timeout = (self.idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.idle_timeout_secs));
        ServerConfig {
            bind_addr: self.bind,
            room: RoomConfig {
                words_per_batch: self.words_per_batch,
                idle_timeout,
                ..RoomConfig::default()
            },
            words: OpenRouterConfig {
                api_key: self.api_key,
                base_url: self.base_url,
                model: self.model,
                timeout: Some(Duration::from_secs(30)),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), DrawBattleError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drawbattle=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Args::parse().into_config();
    if config.words.api_key.is_empty() {
        tracing::warn!("OPENROUTER_API_KEY is not set; creating games will fail");
    }
    tracing::info!(
        bind = %config.bind_addr,
        model = %config.words.model,
        words_per_batch = config.room.words_per_batch,
        "starting DrawBattle"
    );

    let words = OpenRouterWordSource::new(config.words.clone())?;
    let server = DrawBattleServerBuilder::from_config(&config)
        .build(words)
        .await?;
    server.run().await
}
