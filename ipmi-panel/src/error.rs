use thiserror::Error;

use crate::passwd::PasswdError;

/// Errors raised by the panel library.
///
/// The loader never surfaces `Transport` or `MalformedResponse` to its caller:
/// both are treated as transient and retried.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed /api/info response: {0}")]
    MalformedResponse(String),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Passwd(#[from] PasswdError),
}

pub type Result<T> = std::result::Result<T, PanelError>;
