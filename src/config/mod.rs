//! Project configuration: manipulation settings plus which files a project covers.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    IndentationText, ManipulationSettings, NewLineKind, ProjectConfig, QuoteKind,
    ValidationError, ValidationIssue,
};
