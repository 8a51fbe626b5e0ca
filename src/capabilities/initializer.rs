use super::{missing, require_text};
use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::Result;
use crate::node::{Node, View};
use std::ops::Range;

/// `= value` span including the space before `=`.
pub(crate) fn initializer_span(v: &View<'_>) -> Option<Range<usize>> {
    let value = v.field("value")?;
    let eq = v.token("=")?;
    let start = v
        .children()
        .take_while(|c| c.index != eq.index)
        .last()
        .map_or(eq.start(), |previous| previous.end());
    Some(start..value.end())
}

pub trait InitializerExpressionableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Initializer;

    fn initializer(&self) -> Result<Option<Node>> {
        let located = self
            .node()
            .view(|v| v.field("value").map(|value| value.locate()))?;
        Ok(self.node().wrap_opt(located))
    }

    fn initializer_or_err(&self) -> Result<Node> {
        self.initializer()?
            .ok_or_else(|| missing::<Self>("initializer"))
    }

    fn has_initializer(&self) -> Result<bool> {
        self.node().view(|v| v.field("value").is_some())
    }

    fn set_initializer(&self, text: &str) -> Result<()> {
        let text = require_text(text, "initializer")?;
        let edit = self.node().view(|v| match v.field("value") {
            Some(existing) if existing.source() == text => None,
            Some(existing) => Some(TextEdit::replace(existing.start(), existing.end(), text)),
            None => Some(TextEdit::insert(v.end(), format!(" = {text}"))),
        })?;
        if let Some(edit) = edit {
            self.node().edit(vec![edit])?;
        }
        Ok(())
    }

    fn remove_initializer(&self) -> Result<()> {
        let span = self.node().view(|v| initializer_span(&v))?;
        if let Some(span) = span {
            self.node().edit(vec![TextEdit::delete(span.start, span.end)])?;
        }
        Ok(())
    }
}
