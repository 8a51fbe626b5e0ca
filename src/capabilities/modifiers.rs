//! Single-keyword capabilities: `async`, `*`, `static`, `readonly`, `abstract`, `?`.

use super::after_name;
use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::Result;
use crate::manipulation::placement;
use crate::node::Node;

/// Toggle a leading keyword modifier on `node`.
fn set_keyword(node: &Node, keyword: &str, value: bool) -> Result<()> {
    let edit = node.view(|v| match (v.token(keyword), value) {
        (None, true) => Some(placement::insert_modifier(&v, keyword)),
        (Some(token), false) => Some(placement::remove_token(&token)),
        _ => None,
    })?;
    if let Some(edit) = edit {
        node.edit(vec![edit])?;
    }
    Ok(())
}

fn has_keyword(node: &Node, keyword: &str) -> Result<bool> {
    node.view(|v| v.token(keyword).is_some())
}

pub trait AsyncableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Async;

    fn is_async(&self) -> Result<bool> {
        has_keyword(self.node(), "async")
    }

    fn set_is_async(&self, value: bool) -> Result<()> {
        set_keyword(self.node(), "async", value)
    }
}

pub trait GeneratorableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Generator;

    fn is_generator(&self) -> Result<bool> {
        has_keyword(self.node(), "*")
    }

    /// `function* f` for functions, `*m()` for methods.
    fn set_is_generator(&self, value: bool) -> Result<()> {
        let edit = self.node().view(|v| match (v.token("*"), value) {
            (None, true) => match v.token("function") {
                Some(function) => Some(TextEdit::insert(function.end(), "*")),
                None => v.field("name").map(|name| TextEdit::insert(name.start(), "*")),
            },
            (Some(star), false) => {
                let text = v.text;
                let spaced = |i: usize| text.as_bytes().get(i).is_some_and(u8::is_ascii_whitespace);
                let glued = star.start() > 0 && !spaced(star.start() - 1) && !spaced(star.end());
                let keeps_apart = glued && v.token("function").is_some();
                Some(TextEdit::replace(
                    star.start(),
                    star.end(),
                    if keeps_apart { " " } else { "" },
                ))
            }
            _ => None,
        })?;
        if let Some(edit) = edit {
            self.node().edit(vec![edit])?;
        }
        Ok(())
    }
}

pub trait StaticableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Static;

    fn is_static(&self) -> Result<bool> {
        has_keyword(self.node(), "static")
    }

    fn set_is_static(&self, value: bool) -> Result<()> {
        set_keyword(self.node(), "static", value)
    }
}

pub trait ReadonlyableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Readonly;

    fn is_readonly(&self) -> Result<bool> {
        has_keyword(self.node(), "readonly")
    }

    fn set_is_readonly(&self, value: bool) -> Result<()> {
        set_keyword(self.node(), "readonly", value)
    }
}

pub trait AbstractableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Abstract;

    fn is_abstract(&self) -> Result<bool> {
        has_keyword(self.node(), "abstract")
    }

    fn set_is_abstract(&self, value: bool) -> Result<()> {
        set_keyword(self.node(), "abstract", value)
    }
}

pub trait QuestionTokenableNode: Wrapped {
    const CAPABILITY: Capability = Capability::QuestionToken;

    fn has_question_token(&self) -> Result<bool> {
        has_keyword(self.node(), "?")
    }

    fn set_has_question_token(&self, value: bool) -> Result<()> {
        let edit = self.node().view(|v| match (v.token("?"), value) {
            (None, true) => {
                let name_end = v
                    .children()
                    .find(|c| c.data().field.is_some_and(|f| f == "name" || f == "pattern"))
                    .map_or_else(|| after_name(&v), |name| name.end());
                Some(TextEdit::insert(name_end, "?"))
            }
            (Some(question), false) => Some(TextEdit::delete(question.start(), question.end())),
            _ => None,
        })?;
        if let Some(edit) = edit {
            self.node().edit(vec![edit])?;
        }
        Ok(())
    }
}
