use super::{dedent, missing};
use crate::compose::{Capability, Wrapped};
use crate::error::Result;
use crate::layout;
use crate::manipulation::placement;
use crate::node::{Node, View};

/// Text between a block's braces with the statements' common indentation removed.
fn block_inner_text(block: &View<'_>) -> Option<String> {
    let open = block.token("{")?.end();
    let close = block.token("}")?.start();
    let inner = block.text[open..close].trim();
    if inner.is_empty() {
        return Some(String::new());
    }
    let between = &block.text[open..close];
    let first = open + (between.len() - between.trim_start().len());
    let indent = if layout::starts_line(block.text, first) {
        layout::indentation_at(block.text, first)
    } else {
        ""
    };
    Some(dedent(inner, indent))
}

pub trait BodiedNode: Wrapped {
    const CAPABILITY: Capability = Capability::Bodied;

    fn body(&self) -> Result<Option<Node>> {
        let located = self.node().view(|v| v.field("body").map(|b| b.locate()))?;
        Ok(self.node().wrap_opt(located))
    }

    /// Statements of the body as text, dedented. `None` for a declaration without a body.
    fn body_text(&self) -> Result<Option<String>> {
        self.node()
            .view(|v| v.field("body").and_then(|b| block_inner_text(&b)))
    }

    fn set_body_text(&self, text: &str) -> Result<()> {
        let settings = self.node().settings();
        let edit = self.node().try_view(|v| {
            let body = v.field("body").ok_or_else(|| missing::<Self>("body"))?;
            placement::replace_block_body(&body, text, &settings)
                .ok_or_else(|| missing::<Self>("braces of the body"))
        })?;
        self.node().edit(vec![edit])?;
        Ok(())
    }

    fn statements(&self) -> Result<Vec<Node>> {
        let located = self.node().view(|v| {
            v.field("body")
                .map(|b| b.elements().map(|s| s.locate()).collect())
                .unwrap_or_default()
        })?;
        Ok(self.node().wrap_all(located))
    }

    /// Append statements to the body and return the new ones.
    fn add_statements(&self, text: &str) -> Result<Vec<Node>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let settings = self.node().settings();
        let (file, edit) = self.node().try_view(|v| {
            let body = v.field("body").ok_or_else(|| missing::<Self>("body"))?;
            Ok((v.file, placement::insert_into_block(&body, usize::MAX, text, &settings)))
        })?;
        let transition = self.node().edit(vec![edit])?;
        self.node()
            .project()
            .find_all_in_span(file, &transition.new_spans[0], |d| d.named && !d.is_comment())
    }
}
