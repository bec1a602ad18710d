//! Error types for word sources.

/// Errors that can occur while fetching words.
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    /// No API key was configured for the provider.
    #[error("word source API key is not set")]
    MissingApiKey,

    /// The HTTP request failed (connect, timeout, body read).
    #[error("word source request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("word source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response did not have the expected chat-completion shape.
    #[error("malformed word source response: {0}")]
    MalformedResponse(String),

    /// The response parsed, but contained no usable words.
    #[error("word source returned no words for topic {0:?}")]
    NoWords(String),
}
