use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstGrepError {
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("metavariable '{name}' not found in match")]
    MetavarNotFound { name: String },
}
