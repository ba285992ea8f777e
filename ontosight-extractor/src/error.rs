use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint {endpoint} answered with HTTP {status}")]
    Status { status: u16, endpoint: String },

    #[error("failed to parse query results: {0}")]
    Results(#[from] sparesults::QueryResultsParseError),

    #[error("expected solution rows but the endpoint answered a boolean result")]
    BooleanResult,

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ExtractError {
    /// Cancellation is an abandoned request, not a failed one.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
