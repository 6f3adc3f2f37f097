use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Rate limit exceeded (403) for {url}")]
    RateLimited { url: String },
    #[error("Not found (404): {url}")]
    NotFound { url: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Aborted: {0}")]
    Aborted(String),
}

impl PulseError {
    /// Map a non-success HTTP status onto the error the report flow branches on.
    pub fn from_status(status: u16, url: impl Into<String>) -> Self {
        let url = url.into();
        match status {
            403 => PulseError::RateLimited { url },
            404 => PulseError::NotFound { url },
            _ => PulseError::Status { status, url },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PulseError::NotFound { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PulseError::RateLimited { .. })
    }
}
