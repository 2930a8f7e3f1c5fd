use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Normalized failure of a backend call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connection, CORS, aborted fetch)
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx response whose envelope says `success: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Malformed(e.to_string())
    }
}
