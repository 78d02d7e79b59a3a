use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RandomSourceError {
    #[error("Request to random.org failed: {0}")]
    SourceUnavailable(String),

    #[error("Invalid response from random.org: {0}")]
    MalformedResponse(String),
}
