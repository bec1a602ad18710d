//! Word sources for DrawBattle.
//!
//! A [`WordSource`] turns a topic into a batch of drawable words. The
//! production implementation is [`OpenRouterWordSource`], which asks a
//! chat-completion model for a newline-separated list. [`FixedWordSource`]
//! hands out a canned list and is what tests and local tooling plug in.
//!
//! # Key types
//!
//! - [`WordSource`] — the trait room actors and the registry call
//! - [`OpenRouterWordSource`] / [`OpenRouterConfig`] — HTTP client
//! - [`build_prompt`] / [`parse_word_list`] — prompt in, words out

mod error;
mod fixed;
mod openrouter;
mod prompt;

pub use error::WordError;
pub use fixed::FixedWordSource;
pub use openrouter::{OpenRouterConfig, OpenRouterWordSource};
pub use prompt::{build_prompt, parse_word_list};

use std::future::Future;

/// Default number of words requested per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Produces guessable words for a topic.
///
/// Implementations are shared between every room actor, so they must be
/// `Send + Sync`, and the returned future must be `Send` because it is
/// awaited inside spawned tasks.
pub trait WordSource: Send + Sync + 'static {
    /// Fetches up to `count` words for `topic`.
    ///
    /// # Errors
    /// Any failure is returned as-is; callers do not retry.
    fn fetch_words(
        &self,
        topic: &str,
        count: usize,
    ) -> impl Future<Output = Result<Vec<String>, WordError>> + Send;
}
