//! Room configuration.

use std::time::Duration;

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Round length a new room starts with, in minutes.
    pub default_round_minutes: u32,

    /// Words requested from the word source per batch.
    pub words_per_batch: usize,

    /// The pool is replaced with a fresh batch when fewer than this many
    /// words remain at round start.
    pub refill_below: usize,

    /// Points awarded for a correct guess.
    pub points_per_guess: u32,

    /// Countdown period. One second in production; shortened in tests.
    pub tick_interval: Duration,

    /// A room with no attached connections for this long shuts itself
    /// down. `None` keeps idle rooms forever.
    pub idle_timeout: Option<Duration>,

    /// Command channel capacity per room actor.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_round_minutes: 5,
            words_per_batch: drawbattle_words::DEFAULT_BATCH_SIZE,
            refill_below: 2,
            points_per_guess: 10,
            tick_interval: Duration::from_secs(1),
            idle_timeout: Some(Duration::from_secs(30 * 60)),
            channel_size: 64,
        }
    }
}
