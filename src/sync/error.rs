use reqwest::StatusCode;

use crate::core::record::RecordError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no document {id} in {collection}")]
    NotFound { collection: String, id: String },
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Transport-level failures a user could sensibly retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Unavailable(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::Decode { .. } | Self::NotFound { .. } | Self::Record(_) => false,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
