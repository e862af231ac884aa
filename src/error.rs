//! Error taxonomy shared by the codec, the resolver, and the hierarchy.
//!
//! Hard failures are `RankingError`; recoverable document findings travel as
//! [`crate::codec::CodecWarning`] values next to the successful result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    /// A level-difference color declared a `range` that is not `N` or `N;M`.
    #[error("malformed range '{raw}' in level color '{entry}': {reason}")]
    MalformedRange {
        entry: String,
        raw: String,
        reason: String,
    },

    /// A hierarchy operation referenced something outside its live scope.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A live root item already uses this symbol.
    #[error("an interest item with symbol '{0}' already exists")]
    DuplicateSymbol(String),

    #[error("unable to parse ranking document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unable to encode ranking document: {0}")]
    Encode(String),

    /// The embedded structural schema failed to compile.
    #[error("document schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RankingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RankingError::InvalidReference(message.into())
    }
}

impl From<serde_json::Error> for RankingError {
    fn from(err: serde_json::Error) -> Self {
        RankingError::Encode(err.to_string())
    }
}

pub type Result<T, E = RankingError> = std::result::Result<T, E>;
