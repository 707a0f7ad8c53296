use quill_shared::FieldErrorBody;
use thiserror::Error;

/// Client-side failures.
///
/// `Api` carries the server's own `error` string so views can show it as-is.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<FieldErrorBody>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    InvalidState(&'static str),
}

impl ClientError {
    /// HTTP status of a server-reported failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
