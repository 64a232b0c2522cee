use metecho_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server returned no body for {0}")]
    EmptyResponse(String),

    #[error("invalid url '{url}': {reason}")]
    Url { url: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("home directory not found: set HOME or pass --config")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClientError {
    /// The HTTP status for server-reported failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
