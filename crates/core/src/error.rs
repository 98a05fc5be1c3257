use serde::{Deserialize, Serialize};

/// Why a remote fetch failed.
///
/// An empty result is never an error; zero items is a valid page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    /// Network failure or timeout, no response status available.
    #[error("Network error: {0}")]
    Transport(String),

    /// 4xx response.
    #[error("Request failed with HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// 5xx response.
    #[error("Server failed with HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The response body was not JSON.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            FetchError::Client { status, message }
        } else {
            FetchError::Server { status, message }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Client { status, .. } | FetchError::Server { status, .. } => Some(*status),
            FetchError::Transport(_) | FetchError::Decode(_) => None,
        }
    }

    /// 400 and 404 end pagination for the current context.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status(), Some(400) | Some(404))
    }
}
