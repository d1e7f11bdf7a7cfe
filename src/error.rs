use thiserror::Error;

/// Rejected player input. Never changes session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}'은(는) 정수가 아닙니다")]
    NotANumber(String),
    #[error("{0}은(는) {min}-{max} 범위를 벗어났습니다", min = crate::rules::MIN_VALUE, max = crate::rules::MAX_VALUE)]
    OutOfRange(i64),
}

/// Failure talking to the language model. Absorbed by `Commentator`.
#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Top-level error for the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not set up logging: {0}")]
    Logging(String),
    #[error("could not create the language-model client: {0}")]
    Commentary(#[from] CommentaryError),
}
