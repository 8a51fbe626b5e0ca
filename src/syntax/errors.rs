use thiserror::Error;

/// Failures reported by a [`ParseService`](super::ParseService).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("parser returned no tree")]
    ParseFailed,

    #[error("incremental reparse was given a tree from another parser")]
    ForeignTree,

    #[error("parse service failed: {message}")]
    Service { message: String },
}
