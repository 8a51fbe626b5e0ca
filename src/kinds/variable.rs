use super::{cast_all, cast_opt, children_of, named, names, no_such};
use crate::capabilities::produced;
use crate::compose::compose;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::manipulation::placement;
use serde::{Deserialize, Serialize};
use std::fmt;

compose! {
    /// `const a = 1, b = 2;`
    pub struct VariableStatement as VariableStatement {
        syntax: ["lexical_declaration", "variable_declaration"],
        own: [
            "declaration_kind", "set_declaration_kind", "declarations", "declaration",
            "declaration_or_err", "add_declaration",
        ],
        capabilities: [
            ExportableNode { const ALLOWS_DEFAULT_EXPORT: bool = false; },
        ],
    }
}

compose! {
    /// One declarator of a variable statement.
    pub struct VariableDeclaration as VariableDeclaration {
        syntax: ["variable_declarator"],
        own: [],
        capabilities: [NamedNode, TypedNode, InitializerExpressionableNode],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableDeclarationKind {
    Const,
    Let,
    Var,
}

impl VariableDeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableDeclarationKind::Const => "const",
            VariableDeclarationKind::Let => "let",
            VariableDeclarationKind::Var => "var",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "const" => Some(VariableDeclarationKind::Const),
            "let" => Some(VariableDeclarationKind::Let),
            "var" => Some(VariableDeclarationKind::Var),
            _ => None,
        }
    }
}

impl fmt::Display for VariableDeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DECLARATOR_KINDS: &[&str] = &["variable_declarator"];

impl VariableStatement {
    pub fn declaration_kind(&self) -> Result<VariableDeclarationKind> {
        self.view(|v| {
            v.children()
                .find_map(|c| VariableDeclarationKind::from_keyword(c.kind()))
        })?
        .ok_or_else(|| MorphError::not_found("declaration keyword of variable statement"))
    }

    pub fn set_declaration_kind(&self, kind: VariableDeclarationKind) -> Result<()> {
        let keyword = self.view(|v| {
            v.children()
                .find(|c| VariableDeclarationKind::from_keyword(c.kind()).is_some())
                .map(|c| (c.range(), c.kind()))
        })?;
        let Some((range, current)) = keyword else {
            return Err(MorphError::not_found("declaration keyword of variable statement"));
        };
        if current != kind.as_str() {
            self.edit(vec![TextEdit::replace(range.start, range.end, kind.as_str())])?;
        }
        Ok(())
    }

    pub fn declarations(&self) -> Result<Vec<VariableDeclaration>> {
        let located = self.view(|v| {
            children_of::<VariableDeclaration>(&v)
                .iter()
                .map(|d| d.locate())
                .collect()
        })?;
        cast_all(self, located)
    }

    pub fn declaration(&self, name: &str) -> Result<Option<VariableDeclaration>> {
        let located = self.view(|v| {
            named(children_of::<VariableDeclaration>(&v), name).map(|d| d.locate())
        })?;
        cast_opt(self, located)
    }

    pub fn declaration_or_err(&self, name: &str) -> Result<VariableDeclaration> {
        if let Some(found) = self.declaration(name)? {
            return Ok(found);
        }
        let known = self.view(|v| names(&children_of::<VariableDeclaration>(&v)))?;
        Err(no_such::<VariableDeclaration>(name, "variable statement", &known))
    }

    /// Append a declarator such as `c = 3`.
    pub fn add_declaration(&self, text: &str) -> Result<VariableDeclaration> {
        let settings = self.settings();
        let (file, edit) = self.view(|v| {
            (
                v.file,
                placement::insert_into_list(&v, usize::MAX, text.trim(), &settings),
            )
        })?;
        let transition = self.edit(vec![edit])?;
        produced(self, file, &transition.new_spans[0], DECLARATOR_KINDS)?
            .cast_or_err::<VariableDeclaration>()
    }
}
