use crate::compose::WrapperKind;
use crate::config::ConfigError;
use crate::edit::EditError;
use crate::manipulation::PipelinePhase;
use crate::printer::PrintError;
use crate::sg::AstGrepError;
use crate::syntax::{ErrorLocation, ParseError};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = MorphError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum MorphError {
    /// The wrapper's node is no longer part of its file's current tree.
    #[error("attempted to use a forgotten {kind} node; it was removed or replaced by an edit")]
    ForgottenNode { kind: WrapperKind },

    #[error("invalid edit: {0}")]
    Edit(#[from] EditError),

    #[error("structure field `{field}` does not apply to {kind}")]
    IncompatibleStructure { field: &'static str, kind: WrapperKind },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed structure: {0}")]
    Structure(#[from] serde_json::Error),

    #[error("{what} not found{}", did_you_mean(.suggestion))]
    NotFound {
        what: String,
        suggestion: Option<String>,
    },

    #[error("expected {expected}, found {found} ({syntax_kind})")]
    UnexpectedKind {
        expected: WrapperKind,
        found: WrapperKind,
        syntax_kind: String,
    },

    #[error("parser service failed: {0}")]
    Parse(#[from] ParseError),

    #[error("edit introduced {count} syntax error(s), first at {first}")]
    SyntaxErrorIntroduced {
        count: usize,
        first: ErrorLocation,
        errors: Vec<ErrorLocation>,
    },

    #[error("a manipulation of {} is already in progress ({phase:?})", .path.display())]
    ManipulationInProgress { path: PathBuf, phase: PipelinePhase },

    #[error("source file {} already exists", .0.display())]
    FileExists(PathBuf),

    #[error("source file {} is not part of this project", .0.display())]
    UnknownFile(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("printer failed: {0}")]
    Print(#[from] PrintError),

    #[error("pattern search failed: {0}")]
    Pattern(#[from] AstGrepError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("; did you mean `{s}`?"),
        None => String::new(),
    }
}

impl MorphError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        MorphError::NotFound {
            what: what.into(),
            suggestion: None,
        }
    }

    /// Not-found error suggesting the closest of `candidates` to `wanted`.
    pub(crate) fn not_found_among<'a>(
        what: impl Into<String>,
        wanted: &str,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        MorphError::NotFound {
            what: what.into(),
            suggestion: closest(wanted, candidates),
        }
    }

    pub fn is_forgotten(&self) -> bool {
        matches!(self, MorphError::ForgottenNode { .. })
    }
}

fn closest<'a>(wanted: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .map(|c| (strsim::jaro_winkler(wanted, c), c))
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_suggests_close_names() {
        let err = MorphError::not_found_among(
            "function `procesData`",
            "procesData",
            ["processData", "render", "main"],
        );
        assert_eq!(
            err.to_string(),
            "function `procesData` not found; did you mean `processData`?"
        );
    }

    #[test]
    fn not_found_without_close_match() {
        let err = MorphError::not_found_among("class `Zebra`", "Zebra", ["Apple"]);
        assert_eq!(err.to_string(), "class `Zebra` not found");
    }
}
