//! Error taxonomy shared by the Spotify, Last.fm and control-loop layers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkipError {
    /// The refresh-token exchange was rejected or returned no usable token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Timeout, refused connection or any other transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// A response body that could not be interpreted.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A playback command answered with a non-success status.
    #[error("{command} rejected (HTTP {status}): {body}")]
    CommandRejected {
        command: &'static str,
        status: u16,
        body: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SkipError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SkipError::Network(_))
    }
}

impl From<reqwest::Error> for SkipError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SkipError::UnexpectedResponse(err.to_string())
        } else {
            SkipError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SkipError>;
