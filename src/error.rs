use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("session establishment failed: {0}")]
    Authentication(String),

    #[error("GET {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {path} returned {status}: {body}")]
    Api {
        path: String,
        status: u16,
        body: String,
    },

    #[error("decoding response of GET {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    /// Failures worth another attempt on an idempotent GET.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReportError::Transport { .. } => true,
            ReportError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
