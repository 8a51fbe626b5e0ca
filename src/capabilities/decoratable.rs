use super::{missing, produced, require_text};
use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::kinds::Decorator;
use crate::node::{Located, View};

/// Decorators attached to `v`, wherever the grammar puts them.
///
/// Class decorators may sit on the `export` statement, method decorators are
/// preceding siblings in the class body.
pub(crate) fn decorator_views<'a>(v: &View<'a>) -> Vec<View<'a>> {
    let mut out = Vec::new();
    let outer = v.outer();
    if outer.index != v.index {
        out.extend(outer.children().filter(|c| c.kind() == "decorator"));
    }
    if let Some(parent) = v.parent().filter(|p| p.kind() == "class_body") {
        let siblings: Vec<View<'a>> = parent.children().collect();
        if let Some(at) = siblings.iter().position(|s| s.index == v.index) {
            let mut k = at;
            while k > 0 && siblings[k - 1].kind() == "decorator" {
                k -= 1;
            }
            out.extend_from_slice(&siblings[k..at]);
        }
    }
    out.extend(v.children().filter(|c| c.kind() == "decorator"));
    out
}

/// The name a decorator is called by: `@a.b(..)` is `a.b`.
pub(crate) fn decorator_name<'a>(decorator: &View<'a>) -> Option<&'a str> {
    let expression = decorator.elements().next()?;
    let callee = match expression.kind() {
        "call_expression" => expression.field("function")?,
        _ => expression,
    };
    Some(callee.source())
}

pub trait DecoratableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Decoratable;
    /// Parameter decorators share the line: `@Inject() x: T`.
    const DECORATOR_INLINE: bool = false;

    fn decorators(&self) -> Result<Vec<Decorator>> {
        let located: Vec<Located> = self
            .node()
            .view(|v| decorator_views(&v).iter().map(|d| d.locate()).collect())?;
        self.node()
            .wrap_all(located)
            .iter()
            .map(|n| n.cast_or_err::<Decorator>())
            .collect()
    }

    fn decorator(&self, name: &str) -> Result<Option<Decorator>> {
        let located = self.node().view(|v| {
            decorator_views(&v)
                .into_iter()
                .find(|d| decorator_name(d) == Some(name))
                .map(|d| d.locate())
        })?;
        self.node()
            .wrap_opt(located)
            .map(|n| n.cast_or_err::<Decorator>())
            .transpose()
    }

    fn decorator_or_err(&self, name: &str) -> Result<Decorator> {
        if let Some(found) = self.decorator(name)? {
            return Ok(found);
        }
        let names: Vec<String> = self.node().view(|v| {
            decorator_views(&v)
                .iter()
                .filter_map(decorator_name)
                .map(str::to_string)
                .collect()
        })?;
        Err(MorphError::not_found_among(
            format!("decorator `{name}` of {}", Self::KIND),
            name,
            names.iter().map(String::as_str),
        ))
    }

    /// Add `@text` after the existing decorators. `text` may include the `@`.
    fn add_decorator(&self, text: &str) -> Result<Decorator> {
        let text = require_text(text, "decorator")?;
        let text = text.strip_prefix('@').unwrap_or(text);
        let newline = self.node().settings().new_line;
        let (file, edit) = self.node().try_view(|v| {
            let separator = if Self::DECORATOR_INLINE {
                " ".to_string()
            } else {
                format!("{}{}", newline.as_str(), v.outer().line_indent())
            };
            let edit = match decorator_views(&v).last() {
                Some(last) => TextEdit::insert(last.end(), format!("{separator}@{text}")),
                None => {
                    let anchor = v.outer();
                    if anchor.parent().is_none() {
                        return Err(missing::<Self>("declaration to decorate"));
                    }
                    TextEdit::insert(anchor.start(), format!("@{text}{separator}"))
                }
            };
            Ok((v.file, edit))
        })?;
        let transition = self.node().edit(vec![edit])?;
        produced(self.node(), file, &transition.new_spans[0], &["decorator"])?
            .cast_or_err::<Decorator>()
    }
}
