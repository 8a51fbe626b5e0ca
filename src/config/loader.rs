//! Reading a [`ProjectConfig`] from TOML.

use crate::config::schema::{ProjectConfig, ValidationError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read project config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("project config{} is not valid TOML: {source}", located(path))]
    Syntax {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("project config{} is invalid: {source}", located(path))]
    Invalid {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    /// The file the configuration came from, if it came from one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } => Some(path.as_path()),
            ConfigError::Syntax { path, .. } | ConfigError::Invalid { path, .. } => {
                path.as_deref()
            }
        }
    }
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

fn parse(input: &str, path: Option<&Path>) -> Result<ProjectConfig, ConfigError> {
    let owned = || path.map(Path::to_path_buf);
    let config: ProjectConfig = toml_edit::de::from_str(input).map_err(|source| {
        ConfigError::Syntax {
            path: owned(),
            source,
        }
    })?;
    config.validate().map_err(|source| ConfigError::Invalid {
        path: owned(),
        source,
    })?;
    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<ProjectConfig, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<ProjectConfig, ConfigError> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&input, Some(path))
}
