use super::{cast_all, cast_opt, children_of, named, names, no_such};
use crate::compose::{compose, Wrapped};
use crate::edit::{self, TextEdit};
use crate::error::{MorphError, Result};
use crate::kinds::{
    ClassDeclaration, FunctionDeclaration, InterfaceDeclaration, TypeAliasDeclaration,
    VariableDeclaration, VariableStatement,
};
use crate::manipulation::{self, placement, PipelinePhase, Transition};
use crate::node::{Node, View};
use crate::sg::{self, PatternMatch};
use std::path::PathBuf;

compose! {
    /// The root of one file; owns its text and tree.
    pub struct SourceFile as SourceFile {
        syntax: ["program"],
        own: [
            "path", "full_text", "phase", "is_saved", "save", "refresh_from_file_system",
            "insert_text", "remove_text", "replace_text", "apply_edits",
            "statements", "add_statements", "insert_statements",
            "variable_statements", "variable_declaration", "variable_declaration_or_err",
            "functions", "function", "function_or_err",
            "classes", "class", "class_or_err",
            "interfaces", "interface", "interface_or_err",
            "type_aliases", "type_alias", "type_alias_or_err",
            "find_by_pattern", "replace_pattern",
        ],
        capabilities: [],
    }
}

/// Outcome of [`SourceFile::refresh_from_file_system`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshResult {
    Unchanged,
    Updated,
    /// The file is gone from disk and was removed from the project
    Deleted,
}

/// Top-level declarations `T` wraps, looking through `export`.
fn top_level<'a, T: Wrapped>(root: &View<'a>) -> Vec<View<'a>> {
    root.elements()
        .filter_map(|statement| match statement.kind() {
            "export_statement" => statement.field("declaration"),
            _ => Some(statement),
        })
        .filter(|d| d.is_kind(T::SYNTAX_KINDS))
        .collect()
}

impl SourceFile {
    pub fn path(&self) -> Result<PathBuf> {
        let file = self.file_id()?;
        Ok(self.project().state.borrow().file(file)?.path.clone())
    }

    pub fn full_text(&self) -> Result<String> {
        self.view(|v| v.text.to_string())
    }

    pub fn phase(&self) -> Result<PipelinePhase> {
        let file = self.file_id()?;
        Ok(self.project().state.borrow().file(file)?.phase)
    }

    /// True when the text matches what was last read or written.
    pub fn is_saved(&self) -> Result<bool> {
        let file = self.file_id()?;
        Ok(self.project().state.borrow().file(file)?.saved)
    }

    /// Write the text through the project's file-system host.
    pub fn save(&self) -> Result<()> {
        let file = self.file_id()?;
        let mut guard = self.project().state.borrow_mut();
        let state = &mut *guard;
        let source = state
            .files
            .get_mut(&file)
            .ok_or_else(|| MorphError::UnknownFile(PathBuf::new()))?;
        state
            .fs
            .write_file(&source.path, &source.text)
            .map_err(|e| MorphError::Io {
                path: source.path.clone(),
                source: e,
            })?;
        source.saved = true;
        tracing::debug!(path = %source.path.display(), "source file saved");
        Ok(())
    }

    /// Re-read the file. Only the changed middle of the text is edited, so
    /// wrappers outside it survive.
    pub fn refresh_from_file_system(&self) -> Result<RefreshResult> {
        let file = self.file_id()?;
        let path = self.path()?;
        let disk = {
            let state = self.project().state.borrow();
            if !state.fs.file_exists(&path) {
                None
            } else {
                Some(state.fs.read_file(&path).map_err(|source| MorphError::Io {
                    path: path.clone(),
                    source,
                })?)
            }
        };
        let Some(disk) = disk else {
            self.project().remove_source_file(self)?;
            return Ok(RefreshResult::Deleted);
        };

        let current = self.full_text()?;
        let result = if disk == current {
            RefreshResult::Unchanged
        } else {
            manipulation::apply_external(self.project(), file, vec![edit::between(&current, &disk)])?;
            RefreshResult::Updated
        };
        self.project().state.borrow_mut().file_mut(file)?.saved = true;
        Ok(result)
    }

    pub fn insert_text(&self, pos: usize, text: &str) -> Result<()> {
        self.edit(vec![TextEdit::insert(pos, text)])?;
        Ok(())
    }

    pub fn remove_text(&self, start: usize, end: usize) -> Result<()> {
        self.edit(vec![TextEdit::delete(start, end)])?;
        Ok(())
    }

    pub fn replace_text(&self, start: usize, end: usize, text: &str) -> Result<()> {
        self.edit(vec![TextEdit::replace(start, end, text)])?;
        Ok(())
    }

    /// Apply a batch of non-overlapping edits as one transition.
    pub fn apply_edits(&self, edits: Vec<TextEdit>) -> Result<Transition> {
        self.edit(edits)
    }

    pub fn statements(&self) -> Result<Vec<Node>> {
        let located = self.view(|v| v.elements().map(|s| s.locate()).collect())?;
        Ok(self.wrap_all(located))
    }

    pub fn add_statements(&self, text: &str) -> Result<Vec<Node>> {
        self.insert_statements(usize::MAX, text)
    }

    /// Insert statements before statement `index` and return the new ones.
    pub fn insert_statements(&self, index: usize, text: &str) -> Result<Vec<Node>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let settings = self.settings();
        let (file, edit) =
            self.view(|v| (v.file, placement::insert_into_block(&v, index, text, &settings)))?;
        let transition = self.edit(vec![edit])?;
        self.project()
            .find_all_in_span(file, &transition.new_spans[0], |d| d.named && !d.is_comment())
    }

    fn declarations<T: Wrapped>(&self) -> Result<Vec<T>> {
        let located = self.view(|v| top_level::<T>(&v).iter().map(|d| d.locate()).collect())?;
        cast_all(self, located)
    }

    fn declaration<T: Wrapped>(&self, name: &str) -> Result<Option<T>> {
        let located = self.view(|v| named(top_level::<T>(&v), name).map(|d| d.locate()))?;
        cast_opt(self, located)
    }

    fn declaration_or_err<T: Wrapped>(&self, name: &str) -> Result<T> {
        if let Some(found) = self.declaration::<T>(name)? {
            return Ok(found);
        }
        let known = self.view(|v| names(&top_level::<T>(&v)))?;
        Err(no_such::<T>(name, &self.path()?.display().to_string(), &known))
    }

    pub fn variable_statements(&self) -> Result<Vec<VariableStatement>> {
        self.declarations()
    }

    /// A declarator of any top-level variable statement.
    pub fn variable_declaration(&self, name: &str) -> Result<Option<VariableDeclaration>> {
        let located = self.view(|v| {
            top_level::<VariableStatement>(&v)
                .iter()
                .find_map(|statement| named(children_of::<VariableDeclaration>(statement), name))
                .map(|d| d.locate())
        })?;
        cast_opt(self, located)
    }

    pub fn variable_declaration_or_err(&self, name: &str) -> Result<VariableDeclaration> {
        if let Some(found) = self.variable_declaration(name)? {
            return Ok(found);
        }
        let known = self.view(|v| {
            top_level::<VariableStatement>(&v)
                .iter()
                .flat_map(|statement| names(&children_of::<VariableDeclaration>(statement)))
                .collect::<Vec<_>>()
        })?;
        Err(no_such::<VariableDeclaration>(
            name,
            &self.path()?.display().to_string(),
            &known,
        ))
    }

    pub fn functions(&self) -> Result<Vec<FunctionDeclaration>> {
        self.declarations()
    }

    pub fn function(&self, name: &str) -> Result<Option<FunctionDeclaration>> {
        self.declaration(name)
    }

    pub fn function_or_err(&self, name: &str) -> Result<FunctionDeclaration> {
        self.declaration_or_err(name)
    }

    pub fn classes(&self) -> Result<Vec<ClassDeclaration>> {
        self.declarations()
    }

    pub fn class(&self, name: &str) -> Result<Option<ClassDeclaration>> {
        self.declaration(name)
    }

    pub fn class_or_err(&self, name: &str) -> Result<ClassDeclaration> {
        self.declaration_or_err(name)
    }

    pub fn interfaces(&self) -> Result<Vec<InterfaceDeclaration>> {
        self.declarations()
    }

    pub fn interface(&self, name: &str) -> Result<Option<InterfaceDeclaration>> {
        self.declaration(name)
    }

    pub fn interface_or_err(&self, name: &str) -> Result<InterfaceDeclaration> {
        self.declaration_or_err(name)
    }

    pub fn type_aliases(&self) -> Result<Vec<TypeAliasDeclaration>> {
        self.declarations()
    }

    pub fn type_alias(&self, name: &str) -> Result<Option<TypeAliasDeclaration>> {
        self.declaration(name)
    }

    pub fn type_alias_or_err(&self, name: &str) -> Result<TypeAliasDeclaration> {
        self.declaration_or_err(name)
    }

    /// Every match of an ast-grep pattern, outermost first in document order.
    pub fn find_by_pattern(&self, pattern: &str) -> Result<Vec<PatternMatch>> {
        sg::find_in(self, pattern)
    }

    /// Rewrite every match of `pattern` with `template` in one transition.
    /// Returns the number of replacements.
    pub fn replace_pattern(&self, pattern: &str, template: &str) -> Result<usize> {
        sg::replace_in(self, pattern, template)
    }
}
