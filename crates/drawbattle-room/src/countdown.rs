//! Round countdown.
//!
//! A fixed-period timer that counts whole seconds down to zero. It is
//! designed to sit inside a room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick = countdown.wait_for_tick() => {
//!             broadcast(tick.remaining);
//!             if tick.finished { /* game over */ }
//!         }
//!     }
//! }
//! ```
//!
//! While stopped, [`Countdown::wait_for_tick`] pends forever, so the
//! select loop only reacts to commands.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// One countdown step, returned by [`Countdown::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    /// Seconds left after this tick.
    pub remaining: u32,
    /// `true` on the tick that reached zero. The countdown is stopped
    /// when this is returned.
    pub finished: bool,
}

/// Counts down once per `period` until it reaches zero.
#[derive(Debug)]
pub struct Countdown {
    period: Duration,
    remaining: u32,
    /// When the next tick should fire. `None` while stopped.
    next_tick: Option<Instant>,
}

impl Countdown {
    /// Creates a stopped countdown.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            remaining: 0,
            next_tick: None,
        }
    }

    /// Starts (or restarts) counting down from `seconds`. The first tick
    /// fires one period from now.
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.next_tick = Some(Instant::now() + self.period);
        debug!(seconds, "countdown started");
    }

    /// Stops the countdown. Idempotent.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(remaining = self.remaining, "countdown stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Seconds left as of the last tick.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Waits for the next tick and decrements the counter.
    ///
    /// Cancel-safe: all state changes happen after the only await point,
    /// so dropping the future inside `select!` loses nothing.
    pub async fn wait_for_tick(&mut self) -> CountdownTick {
        let Some(next) = self.next_tick else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        self.remaining = self.remaining.saturating_sub(1);
        let finished = self.remaining == 0;

        self.next_tick = if finished {
            None
        } else if now.saturating_duration_since(next) >= self.period {
            // Woke up a whole period late (the runtime was starved).
            // Resume from now instead of bursting.
            warn!(
                late_ms = now.saturating_duration_since(next).as_millis() as u64,
                "countdown tick overrun"
            );
            Some(now + self.period)
        } else {
            Some(next + self.period)
        };

        trace!(remaining = self.remaining, finished, "countdown tick");
        CountdownTick {
            remaining: self.remaining,
            finished,
        }
    }
}
