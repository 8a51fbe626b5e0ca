//! End-to-end behaviour of projects, wrappers and the manipulation pipeline.

mod identity;
mod pipeline;
mod structures;

use syntax_morph::{IndentationText, InMemoryFileSystem, ManipulationSettings, Project};

/// An in-memory project indenting with two spaces.
pub(crate) fn project() -> Project {
    Project::builder()
        .settings(ManipulationSettings {
            indentation: IndentationText::TwoSpaces,
            ..ManipulationSettings::default()
        })
        .file_system(InMemoryFileSystem::new())
        .build()
        .unwrap()
}
