//! Capability traits.
//!
//! Each trait needs only a small part of a node's shape (a `name` field, a
//! `parameters` list, a leading `async` keyword) and works on any kind that has it.
//! Shape differences between kinds are expressed with associated constants that a
//! kind overrides in its [`compose!`](crate::compose::compose) invocation.

mod bodied;
mod decoratable;
mod exportable;
mod initializer;
mod modifiers;
mod named;
mod parametered;
mod typed;

pub use bodied::BodiedNode;
pub use decoratable::DecoratableNode;
pub use exportable::ExportableNode;
pub use initializer::InitializerExpressionableNode;
pub use modifiers::{
    AbstractableNode, AsyncableNode, GeneratorableNode, QuestionTokenableNode, ReadonlyableNode,
    StaticableNode,
};
pub use named::NamedNode;
pub use parametered::{ParameteredNode, TypeParameteredNode};
pub use typed::{ReturnTypedNode, TypeShape, TypedNode};

pub(crate) use decoratable::{decorator_name, decorator_views};

use crate::compose::Wrapped;
use crate::error::{MorphError, Result};
use crate::node::{Node, View};
use crate::registry::FileId;
use std::ops::Range;

/// Fields that hold a declaration's name.
const NAME_FIELDS: &[&str] = &["name", "pattern", "key"];

/// End of the name and any `?`/`!` right after it; where a type annotation goes.
pub(crate) fn after_name(v: &View<'_>) -> usize {
    let mut anchor = None;
    for child in v.children() {
        let is_name = child
            .data()
            .field
            .is_some_and(|f| NAME_FIELDS.contains(&f));
        if is_name || (anchor.is_some() && (child.data().is_token("?") || child.data().is_token("!")))
        {
            anchor = Some(child.end());
        }
    }
    anchor.unwrap_or(v.end())
}

/// The type inside a `: T` annotation.
pub(crate) fn annotated_type<'a>(annotation: View<'a>) -> Option<View<'a>> {
    if annotation.kind() == "type_annotation" {
        annotation.elements().next()
    } else {
        Some(annotation)
    }
}

pub(crate) fn require_text<'t>(text: &'t str, what: &str) -> Result<&'t str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MorphError::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

pub(crate) fn missing<T: Wrapped>(what: &str) -> MorphError {
    MorphError::not_found(format!("{what} of {}", T::KIND))
}

/// Outermost node of one of `kinds` produced inside the first new span of a transition.
pub(crate) fn produced(
    node: &Node,
    file: FileId,
    span: &Range<usize>,
    kinds: &'static [&'static str],
) -> Result<Node> {
    node.find_in_span(file, span, |d| kinds.contains(&d.kind))?
        .ok_or_else(|| MorphError::not_found(format!("new {} in the edited text", kinds.join("/"))))
}

/// Strip `indent` from every line of `text` that has it.
pub(crate) fn dedent(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| line.strip_prefix(indent).unwrap_or(line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_strips_common_indent() {
        assert_eq!(dedent("    a();\n      b();", "    "), "a();\n  b();");
        assert_eq!(dedent("  x\n\ty", "  "), "x\ny");
    }
}
