use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{WordError, WordSource};

/// A [`WordSource`] that returns a fixed list on every call.
///
/// Every batch is the same list (truncated to `count`), which mirrors the
/// provider's behavior of repeating words across refills. Can be switched
/// into a failing mode to exercise error paths.
#[derive(Debug, Default)]
pub struct FixedWordSource {
    words: Mutex<Vec<String>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FixedWordSource {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: Mutex::new(words.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Replaces the list returned by subsequent calls.
    pub fn set_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.words.lock().unwrap_or_else(|e| e.into_inner());
        *guard = words.into_iter().map(Into::into).collect();
    }

    /// Makes every subsequent call fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `fetch_words` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WordSource for FixedWordSource {
    async fn fetch_words(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<String>, WordError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(WordError::NoWords(topic.to_owned()));
        }
        let words = self.words.lock().unwrap_or_else(|e| e.into_inner());
        if words.is_empty() {
            return Err(WordError::NoWords(topic.to_owned()));
        }
        Ok(words.iter().take(count).cloned().collect())
    }
}
