//! The generic wrapper handle and its query and mutation surface.

use crate::compose::{Wrapped, WrapperKind};
use crate::config::ManipulationSettings;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::kinds::SourceFile;
use crate::layout;
use crate::manipulation::{self, Transition};
use crate::project::Project;
use crate::registry::{FileId, WrapperId};
use crate::syntax::{NodeData, NodeHandle, SyntaxTree};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// Containers whose elements are separated by commas.
const COMMA_LISTS: &[&str] = &[
    "formal_parameters",
    "type_parameters",
    "type_arguments",
    "arguments",
    "object",
    "array",
    "lexical_declaration",
    "variable_declaration",
    "object_pattern",
    "array_pattern",
    "named_imports",
    "export_clause",
    "enum_body",
];

/// Containers whose elements sit on their own lines.
const BLOCKS: &[&str] = &[
    "program",
    "statement_block",
    "class_body",
    "interface_body",
    "object_type",
    "switch_body",
];

/// A stable handle to one syntax node.
///
/// Equality is identity: two `Node`s are equal when they are the same wrapper in the
/// same project. Every accessor fails with [`MorphError::ForgottenNode`] once the
/// node has been removed from its file's tree.
#[derive(Clone)]
pub struct Node {
    project: Project,
    id: WrapperId,
    kind: WrapperKind,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.project.ptr_eq(&other.project)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// A node position resolved while the project is borrowed, wrapped afterwards.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Located {
    pub file: FileId,
    pub handle: NodeHandle,
    pub syntax_kind: &'static str,
}

/// Borrowed view of one node inside its file.
#[derive(Clone, Copy)]
pub(crate) struct View<'a> {
    pub file: FileId,
    pub tree: &'a SyntaxTree,
    pub text: &'a str,
    pub index: usize,
}

impl<'a> View<'a> {
    pub fn at(&self, index: usize) -> View<'a> {
        View { index, ..*self }
    }

    pub fn data(&self) -> &'a NodeData {
        self.tree.node(self.index)
    }

    pub fn kind(&self) -> &'static str {
        self.data().kind
    }

    pub fn range(&self) -> Range<usize> {
        self.data().range.clone()
    }

    pub fn start(&self) -> usize {
        self.data().range.start
    }

    pub fn end(&self) -> usize {
        self.data().range.end
    }

    pub fn source(&self) -> &'a str {
        &self.text[self.range()]
    }

    pub fn locate(&self) -> Located {
        Located {
            file: self.file,
            handle: self.tree.handle(self.index),
            syntax_kind: self.kind(),
        }
    }

    pub fn parent(&self) -> Option<View<'a>> {
        self.tree.parent(self.index).map(|p| self.at(p))
    }

    pub fn children(&self) -> impl Iterator<Item = View<'a>> + 'a {
        let tree: &'a SyntaxTree = self.tree;
        let this = *self;
        tree.children(self.index).map(move |c| this.at(c))
    }

    /// Named, non-comment children.
    pub fn elements(&self) -> impl Iterator<Item = View<'a>> + 'a {
        self.children()
            .filter(|c| c.data().named && !c.data().is_comment())
    }

    pub fn field(&self, name: &str) -> Option<View<'a>> {
        self.tree
            .child_by_field(self.index, name)
            .map(|c| self.at(c))
    }

    /// First anonymous child token spelled `token`.
    pub fn token(&self, token: &str) -> Option<View<'a>> {
        self.children().find(|c| c.data().is_token(token))
    }

    pub fn child_of_kind(&self, kind: &str) -> Option<View<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn is_kind(&self, kinds: &[&str]) -> bool {
        kinds.contains(&self.kind())
    }

    /// Statement-level node: itself, or its `export_statement` wrapper.
    pub fn outer(&self) -> View<'a> {
        match self.parent() {
            Some(p) if p.kind() == "export_statement" && self.data().field == Some("declaration") => p,
            _ => *self,
        }
    }

    pub fn line_indent(&self) -> &'a str {
        layout::indentation_at(self.text, self.start())
    }
}

impl Node {
    pub(crate) fn new(project: Project, id: WrapperId, kind: WrapperKind) -> Self {
        Node { project, id, kind }
    }

    /// Wrapper kind; fixed for the lifetime of the wrapper.
    pub fn kind(&self) -> WrapperKind {
        self.kind
    }

    pub fn id(&self) -> WrapperId {
        self.id
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn was_forgotten(&self) -> bool {
        let state = self.project.state.borrow();
        match state.registry.entry(self.id) {
            Some(entry) => state
                .files
                .get(&entry.file)
                .map_or(true, |f| !f.tree.contains(entry.node)),
            None => true,
        }
    }

    /// Forget this wrapper and every wrapper below it. Idempotent.
    pub fn forget(&self) {
        let mut guard = self.project.state.borrow_mut();
        let state = &mut *guard;
        let Some(entry) = state.registry.entry(self.id).copied() else {
            return;
        };
        if let Some(file) = state.files.get(&entry.file) {
            let tree = file.tree.clone();
            let dropped = state.registry.forget_subtree(&tree, entry.node.index());
            tracing::trace!(node = ?self, dropped, "forgotten");
        }
    }

    pub fn cast<T: Wrapped>(&self) -> Option<T> {
        (self.kind == T::KIND).then(|| T::from_node_unchecked(self.clone()))
    }

    pub fn cast_or_err<T: Wrapped>(&self) -> Result<T> {
        match self.cast::<T>() {
            Some(t) => Ok(t),
            None => Err(MorphError::UnexpectedKind {
                expected: T::KIND,
                found: self.kind,
                syntax_kind: self.syntax_kind()?.to_string(),
            }),
        }
    }

    pub fn is<T: Wrapped>(&self) -> bool {
        self.kind == T::KIND
    }

    pub(crate) fn file_id(&self) -> Result<FileId> {
        self.view(|v| v.file)
    }

    /// Run `f` over the node while the project is borrowed.
    ///
    /// `f` must not call back into the project.
    pub(crate) fn view<R>(&self, f: impl FnOnce(View<'_>) -> R) -> Result<R> {
        let state = self.project.state.borrow();
        let forgotten = || MorphError::ForgottenNode { kind: self.kind };
        let entry = state.registry.entry(self.id).ok_or_else(forgotten)?;
        let file = state.files.get(&entry.file).ok_or_else(forgotten)?;
        if !file.tree.contains(entry.node) {
            return Err(forgotten());
        }
        Ok(f(View {
            file: entry.file,
            tree: &file.tree,
            text: &file.text,
            index: entry.node.index(),
        }))
    }

    pub(crate) fn try_view<R>(&self, f: impl FnOnce(View<'_>) -> Result<R>) -> Result<R> {
        self.view(f)?
    }

    pub(crate) fn wrap(&self, located: Located) -> Node {
        self.project.wrap(located)
    }

    pub(crate) fn wrap_opt(&self, located: Option<Located>) -> Option<Node> {
        located.map(|l| self.project.wrap(l))
    }

    pub(crate) fn wrap_all(&self, located: Vec<Located>) -> Vec<Node> {
        located.into_iter().map(|l| self.project.wrap(l)).collect()
    }

    pub(crate) fn settings(&self) -> ManipulationSettings {
        self.project.settings()
    }

    /// Apply `edits` to this node's file as one transition.
    pub(crate) fn edit(&self, edits: Vec<TextEdit>) -> Result<Transition> {
        let file = self.file_id()?;
        manipulation::apply(&self.project, file, edits)
    }

    /// Outermost node produced inside `span` of this node's file.
    pub(crate) fn find_in_span(
        &self,
        file: FileId,
        span: &Range<usize>,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Result<Option<Node>> {
        self.project.find_in_span(file, span, predicate)
    }

    pub fn syntax_kind(&self) -> Result<&'static str> {
        self.view(|v| v.kind())
    }

    pub fn text(&self) -> Result<String> {
        self.view(|v| v.source().to_string())
    }

    pub fn range(&self) -> Result<Range<usize>> {
        self.view(|v| v.range())
    }

    pub fn start(&self) -> Result<usize> {
        self.view(|v| v.start())
    }

    pub fn end(&self) -> Result<usize> {
        self.view(|v| v.end())
    }

    pub fn start_line_number(&self) -> Result<usize> {
        self.view(|v| layout::line_number(v.text, v.start()))
    }

    /// Leading whitespace of the line the node starts on.
    pub fn indentation_text(&self) -> Result<String> {
        self.view(|v| v.line_indent().to_string())
    }

    pub fn source_file(&self) -> Result<SourceFile> {
        let file = self.file_id()?;
        self.project.root_of(file)
    }

    /// Named children, including comments.
    pub fn children(&self) -> Result<Vec<Node>> {
        let located = self.view(|v| {
            v.children()
                .filter(|c| c.data().named)
                .map(|c| c.locate())
                .collect()
        })?;
        Ok(self.wrap_all(located))
    }

    /// Every child including punctuation and keyword tokens.
    pub fn children_with_tokens(&self) -> Result<Vec<Node>> {
        let located = self.view(|v| v.children().map(|c| c.locate()).collect())?;
        Ok(self.wrap_all(located))
    }

    pub fn child_by_field(&self, field: &str) -> Result<Option<Node>> {
        let located = self.view(|v| v.field(field).map(|c| c.locate()))?;
        Ok(self.wrap_opt(located))
    }

    pub fn parent(&self) -> Result<Option<Node>> {
        let located = self.view(|v| v.parent().map(|p| p.locate()))?;
        Ok(self.wrap_opt(located))
    }

    pub fn parent_or_err(&self) -> Result<Node> {
        self.parent()?
            .ok_or_else(|| MorphError::not_found(format!("parent of {}", self.kind)))
    }

    /// Ancestors from the parent up to the source file.
    pub fn ancestors(&self) -> Result<Vec<Node>> {
        let located = self.view(|v| {
            let mut out = Vec::new();
            let mut current = v.parent();
            while let Some(p) = current {
                out.push(p.locate());
                current = p.parent();
            }
            out
        })?;
        Ok(self.wrap_all(located))
    }

    pub fn first_ancestor_by_kind(&self, syntax_kind: &str) -> Result<Option<Node>> {
        let located = self.view(|v| {
            let mut current = v.parent();
            while let Some(p) = current {
                if p.kind() == syntax_kind {
                    return Some(p.locate());
                }
                current = p.parent();
            }
            None
        })?;
        Ok(self.wrap_opt(located))
    }

    pub fn first_ancestor(&self, predicate: impl Fn(&Node) -> bool) -> Result<Option<Node>> {
        Ok(self.ancestors()?.into_iter().find(|n| predicate(n)))
    }

    /// Named descendants in document order.
    pub fn descendants(&self) -> Result<Vec<Node>> {
        self.descendants_where(|d| d.named)
    }

    pub fn descendants_of_kind(&self, syntax_kind: &str) -> Result<Vec<Node>> {
        self.descendants_where(|d| d.kind == syntax_kind)
    }

    fn descendants_where(&self, predicate: impl Fn(&NodeData) -> bool) -> Result<Vec<Node>> {
        let located = self.view(|v| {
            v.tree
                .descendants(v.index)
                .filter(|&i| predicate(v.tree.node(i)))
                .map(|i| v.at(i).locate())
                .collect()
        })?;
        Ok(self.wrap_all(located))
    }

    pub fn first_descendant(&self, predicate: impl Fn(&Node) -> bool) -> Result<Option<Node>> {
        let candidates = self.view(|v| {
            v.tree
                .descendants(v.index)
                .filter(|&i| v.tree.node(i).named)
                .map(|i| v.at(i).locate())
                .collect::<Vec<_>>()
        })?;
        for located in candidates {
            let node = self.wrap(located);
            if predicate(&node) {
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    pub fn first_descendant_by_kind(&self, syntax_kind: &str) -> Result<Option<Node>> {
        let located = self.view(|v| {
            v.tree
                .descendants(v.index)
                .find(|&i| v.tree.node(i).kind == syntax_kind)
                .map(|i| v.at(i).locate())
        })?;
        Ok(self.wrap_opt(located))
    }

    pub fn first_descendant_by_kind_or_err(&self, syntax_kind: &str) -> Result<Node> {
        self.first_descendant_by_kind(syntax_kind)?
            .ok_or_else(|| MorphError::not_found(format!("descendant of kind `{syntax_kind}`")))
    }

    /// Standalone text for this node from the project's printer.
    pub fn print(&self) -> Result<String> {
        let state = self.project.state.borrow();
        let entry = state
            .registry
            .entry(self.id)
            .ok_or(MorphError::ForgottenNode { kind: self.kind })?;
        let file = state.file(entry.file)?;
        Ok(state.printer.print(&file.tree, entry.node, &file.text)?)
    }

    /// Replace the node's text and return the node parsed in its place.
    ///
    /// The receiver is forgotten.
    pub fn replace_with_text(&self, text: &str) -> Result<Node> {
        if text.trim().is_empty() {
            return Err(MorphError::InvalidArgument(
                "replacement text is empty; use remove() instead".to_string(),
            ));
        }
        let (file, range) = self.view(|v| (v.file, v.range()))?;
        let transition = self.edit(vec![TextEdit::replace(range.start, range.end, text)])?;
        let span = &transition.new_spans[0];
        self.find_in_span(file, span, |d| d.named && !d.is_comment())?
            .ok_or_else(|| MorphError::not_found("node produced by the replacement text"))
    }

    /// Remove the node from its file.
    ///
    /// List separators are cleaned up, a node alone on its lines takes the lines
    /// with it, an exported declaration takes its `export`, and the only
    /// declarator of a variable statement takes the statement.
    pub fn remove(&self) -> Result<()> {
        let span = self.try_view(|v| removal_span(&v))?;
        self.edit(vec![TextEdit::delete(span.start, span.end)])?;
        Ok(())
    }
}

fn removal_span(v: &View<'_>) -> Result<Range<usize>> {
    let mut target = *v;
    if target.kind() == "variable_declarator" {
        if let Some(statement) = target.parent() {
            let declarators = statement
                .children()
                .filter(|c| c.kind() == "variable_declarator")
                .count();
            if declarators == 1 {
                target = statement;
            }
        }
    }
    let target = target.outer();

    let Some(container) = target.parent() else {
        return Err(MorphError::InvalidArgument(
            "the source file root cannot be removed".to_string(),
        ));
    };
    let siblings: Vec<View<'_>> = container.children().collect();
    let position = siblings
        .iter()
        .position(|s| s.index == target.index)
        .unwrap_or_default();

    let mut start = target.start();
    let mut end = target.end();

    // Method decorators are siblings in the class body
    if container.kind() == "class_body" {
        let mut k = position;
        while k > 0 && siblings[k - 1].kind() == "decorator" {
            k -= 1;
        }
        start = siblings[k].start();
    }

    if container.is_kind(COMMA_LISTS) {
        let elements: Vec<View<'_>> = container.elements().collect();
        let Some(at) = elements.iter().position(|e| e.index == target.index) else {
            return Ok(start..end);
        };
        if let Some(next) = elements.get(at + 1) {
            return Ok(start..next.start());
        }
        if at > 0 {
            return Ok(elements[at - 1].end()..end);
        }
        if let Some(comma) = siblings.get(position + 1).filter(|s| s.data().is_token(",")) {
            end = comma.end();
        }
        return Ok(start..end);
    }

    if target.kind() == "decorator" || container.is_kind(BLOCKS) {
        for sibling in &siblings[position + 1..] {
            if sibling.data().is_token(";") || sibling.data().is_token(",") {
                end = sibling.end();
            } else {
                break;
            }
        }
        let text = v.text;
        if layout::starts_line(text, start) && layout::ends_line(text, end) {
            return Ok(layout::line_start(text, start)..layout::next_line_start(text, end));
        }
        return Ok(start..layout::skip_inline_space(text, end));
    }

    Ok(start..end)
}
