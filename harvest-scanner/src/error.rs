use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Record sink failed: {0}")]
    Sink(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-node fetch failures. None of these abort a traversal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpError(u16),

    #[error("page does not exist")]
    NotFound,

    #[error("network error: {0}")]
    NetworkError(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            if status == reqwest::StatusCode::NOT_FOUND {
                FetchError::NotFound
            } else {
                FetchError::HttpError(status.as_u16())
            }
        } else {
            FetchError::NetworkError(err.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("empty document")]
    EmptyDocument,
}

pub type Result<T> = std::result::Result<T, CrawlError>;
