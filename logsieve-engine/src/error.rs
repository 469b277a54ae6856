use std::io;

/// a regex operation that failed to compile; the operation matches nothing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pattern `{text}`: {message}")]
pub struct PatternError {
    /// text of the offending operation
    pub text: String,
    pub message: String,
}

impl PatternError {
    pub fn new(text: impl Into<String>, err: &regex::Error) -> Self {
        Self {
            text: text.into(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to read {source_ref}: {source}")]
    Ingestion {
        source_ref: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("operation `{0}` already exists")]
    DuplicateOperation(String),
    #[error("operation text is empty")]
    EmptyOperation,
    #[error("unsupported search query: {0}")]
    UnsupportedQuery(String),
    #[error("search query is empty")]
    EmptyQuery,
    #[error("document worker is no longer running")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, EngineError>;
