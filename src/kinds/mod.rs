//! Concrete wrapper kinds, each assembled with [`compose!`](crate::compose::compose).

mod class;
mod decorator;
mod function;
mod interface;
mod object;
mod source_file;
mod type_alias;
mod variable;

pub use class::{ClassDeclaration, MethodDeclaration, PropertyDeclaration};
pub use decorator::Decorator;
pub use function::{FunctionDeclaration, Parameter};
pub use interface::{InterfaceDeclaration, PropertySignature};
pub use object::{PropertyAssignment, ShorthandPropertyAssignment};
pub use source_file::{RefreshResult, SourceFile};
pub use type_alias::{TypeAliasDeclaration, TypeParameter};
pub use variable::{VariableDeclaration, VariableDeclarationKind, VariableStatement};

use crate::compose::Wrapped;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::manipulation::placement;
use crate::node::{Located, Node, View};

const SCOPES: &[&str] = &["public", "protected", "private"];

/// Children of `container` that `T` wraps.
pub(crate) fn children_of<'a, T: Wrapped>(container: &View<'a>) -> Vec<View<'a>> {
    container
        .elements()
        .filter(|c| c.is_kind(T::SYNTAX_KINDS))
        .collect()
}

pub(crate) fn named<'a>(items: Vec<View<'a>>, name: &str) -> Option<View<'a>> {
    items
        .into_iter()
        .find(|item| item.field("name").is_some_and(|n| n.source() == name))
}

pub(crate) fn names(items: &[View<'_>]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.field("name").map(|n| n.source().to_string()))
        .collect()
}

pub(crate) fn cast_all<T: Wrapped>(node: &Node, located: Vec<Located>) -> Result<Vec<T>> {
    node.wrap_all(located)
        .iter()
        .map(Node::cast_or_err::<T>)
        .collect()
}

pub(crate) fn cast_opt<T: Wrapped>(node: &Node, located: Option<Located>) -> Result<Option<T>> {
    node.wrap_opt(located)
        .map(|n| n.cast_or_err::<T>())
        .transpose()
}

/// Not-found error for a named child, suggesting the closest existing name.
pub(crate) fn no_such<T: Wrapped>(name: &str, owner: &str, known: &[String]) -> MorphError {
    MorphError::not_found_among(
        format!("{} `{name}` in {owner}", T::KIND),
        name,
        known.iter().map(String::as_str),
    )
}

/// `public`/`protected`/`private` on a member or parameter property.
pub(crate) fn scope_of(node: &Node) -> Result<Option<String>> {
    node.view(|v| {
        v.child_of_kind("accessibility_modifier")
            .map(|m| m.source().to_string())
    })
}

/// Set or (with `None`) remove the accessibility modifier.
pub(crate) fn set_scope_of(node: &Node, scope: Option<&str>) -> Result<()> {
    if let Some(scope) = scope {
        if !SCOPES.contains(&scope) {
            return Err(MorphError::InvalidArgument(format!(
                "`{scope}` is not one of {}",
                SCOPES.join(", ")
            )));
        }
    }
    let edit = node.view(|v| match (v.child_of_kind("accessibility_modifier"), scope) {
        (Some(current), Some(scope)) if current.source() != scope => {
            Some(TextEdit::replace(current.start(), current.end(), scope))
        }
        (Some(current), None) => Some(placement::remove_token(&current)),
        (None, Some(scope)) => Some(TextEdit::insert(
            placement::modifier_offset(&v, "accessibility_modifier"),
            format!("{scope} "),
        )),
        _ => None,
    })?;
    if let Some(edit) = edit {
        node.edit(vec![edit])?;
    }
    Ok(())
}
