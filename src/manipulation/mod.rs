//! The text manipulation pipeline.
//!
//! One call to [`apply`] is one state transition of a source file:
//! `Stable -> Editing -> Reparsed -> Remapped -> Stable`. Edits are validated and
//! applied to a copy of the text, the copy is reparsed, wrappers are rebound to
//! the new tree or forgotten, and only then are the file's text and tree replaced.
//! Any failure before the commit returns the file to `Stable` untouched.

pub(crate) mod placement;
pub(crate) mod remap;

use crate::edit::{self, TextEdit};
use crate::error::{MorphError, Result};
use crate::project::Project;
use crate::registry::FileId;
use crate::syntax::{introduced_errors, Reparse, SyntaxTree};
use std::ops::Range;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePhase {
    #[default]
    Stable,
    Editing,
    Reparsed,
    Remapped,
    Failed,
}

/// Outcome of one committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Where each edit's new text sits in the new text, ascending
    pub new_spans: Vec<Range<usize>>,
    pub remapped: usize,
    pub forgotten: usize,
}

/// Apply `edits` to `file` as one atomic transition.
pub(crate) fn apply(project: &Project, file: FileId, edits: Vec<TextEdit>) -> Result<Transition> {
    let check_syntax = project.settings().reject_syntax_errors;
    run(project, file, edits, check_syntax)
}

/// Like [`apply`] but accepts text with syntax errors; used when the new text
/// comes from outside, such as a refresh from disk.
pub(crate) fn apply_external(
    project: &Project,
    file: FileId,
    edits: Vec<TextEdit>,
) -> Result<Transition> {
    run(project, file, edits, false)
}

fn run(
    project: &Project,
    file: FileId,
    edits: Vec<TextEdit>,
    check_syntax: bool,
) -> Result<Transition> {
    let (path, old_text, old_tree) = {
        let mut state = project.state.borrow_mut();
        let source = state.file_mut(file)?;
        if source.phase != PipelinePhase::Stable {
            return Err(MorphError::ManipulationInProgress {
                path: source.path.clone(),
                phase: source.phase,
            });
        }
        source.phase = PipelinePhase::Editing;
        tracing::trace!(path = %source.path.display(), "phase -> Editing");
        (source.path.clone(), source.text.clone(), source.tree.clone())
    };

    match transition(project, file, &old_text, &old_tree, edits, check_syntax) {
        Ok(done) => {
            tracing::debug!(
                path = %path.display(),
                edits = done.new_spans.len(),
                remapped = done.remapped,
                forgotten = done.forgotten,
                "transition committed"
            );
            Ok(done)
        }
        Err(error) => {
            if let Ok(source) = project.state.borrow_mut().file_mut(file) {
                source.phase = PipelinePhase::Failed;
                tracing::trace!(path = %path.display(), "phase -> Failed");
                source.phase = PipelinePhase::Stable;
            }
            tracing::warn!(path = %path.display(), %error, "manipulation rolled back");
            Err(error)
        }
    }
}

fn transition(
    project: &Project,
    file: FileId,
    old_text: &str,
    old_tree: &SyntaxTree,
    edits: Vec<TextEdit>,
    check_syntax: bool,
) -> Result<Transition> {
    let prepared = edit::prepare(edits, old_text)?;
    let new_text = edit::apply_prepared(old_text, &prepared);

    let new_tree = project.parse(
        &new_text,
        Some(Reparse {
            tree: old_tree,
            old_text,
            edits: &prepared,
        }),
    )?;
    set_phase(project, file, PipelinePhase::Reparsed)?;

    if check_syntax {
        let errors = introduced_errors(old_tree, &prepared, &new_tree, &new_text);
        if let Some(first) = errors.first().cloned() {
            return Err(MorphError::SyntaxErrorIntroduced {
                count: errors.len(),
                first,
                errors,
            });
        }
    }

    let mapping = remap::map_nodes(old_tree, &new_tree, &prepared);
    set_phase(project, file, PipelinePhase::Remapped)?;

    // Commit: nothing below can fail.
    let mut guard = project.state.borrow_mut();
    let state = &mut *guard;
    let source = state
        .files
        .get_mut(&file)
        .ok_or_else(|| MorphError::UnknownFile(Default::default()))?;
    let (remapped, forgotten) = state.registry.remap_file(file, &mapping);
    source.text = Rc::from(new_text);
    source.tree = Rc::new(new_tree);
    source.saved = false;
    source.phase = PipelinePhase::Stable;
    tracing::trace!(path = %source.path.display(), "phase -> Stable");

    Ok(Transition {
        new_spans: edit::new_spans(&prepared),
        remapped,
        forgotten,
    })
}

fn set_phase(project: &Project, file: FileId, phase: PipelinePhase) -> Result<()> {
    let mut state = project.state.borrow_mut();
    let source = state.file_mut(file)?;
    source.phase = phase;
    tracing::trace!(path = %source.path.display(), ?phase, "phase change");
    Ok(())
}
