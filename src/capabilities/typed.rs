use super::{after_name, annotated_type, missing, require_text};
use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::node::{Node, View};

/// How a kind spells its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// `name: T`, a `type_annotation` in the `type` field
    Annotation,
    /// `type Name = T`, the type sits directly in the `value` field
    Assigned,
}

impl TypeShape {
    fn field(self) -> &'static str {
        match self {
            TypeShape::Annotation => "type",
            TypeShape::Assigned => "value",
        }
    }
}

fn type_view<'a>(v: &View<'a>, shape: TypeShape) -> Option<View<'a>> {
    v.field(shape.field()).and_then(annotated_type)
}

pub trait TypedNode: Wrapped {
    const CAPABILITY: Capability = Capability::Typed;
    const TYPE_SHAPE: TypeShape = TypeShape::Annotation;

    fn type_node(&self) -> Result<Option<Node>> {
        let located = self
            .node()
            .view(|v| type_view(&v, Self::TYPE_SHAPE).map(|t| t.locate()))?;
        Ok(self.node().wrap_opt(located))
    }

    fn type_text(&self) -> Result<Option<String>> {
        self.node()
            .view(|v| type_view(&v, Self::TYPE_SHAPE).map(|t| t.source().to_string()))
    }

    /// Set the type; an empty string removes it.
    fn set_type(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return self.remove_type();
        }
        let text = text.trim();
        let edit = self.node().view(|v| match type_view(&v, Self::TYPE_SHAPE) {
            Some(existing) if existing.source() == text => None,
            Some(existing) => Some(TextEdit::replace(existing.start(), existing.end(), text)),
            None => Some(TextEdit::insert(after_name(&v), format!(": {text}"))),
        })?;
        match edit {
            Some(edit) => {
                self.node().edit(vec![edit])?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn remove_type(&self) -> Result<()> {
        if Self::TYPE_SHAPE == TypeShape::Assigned {
            return Err(MorphError::InvalidArgument(format!(
                "the type of a {} cannot be removed",
                Self::KIND
            )));
        }
        let range = self.node().view(|v| v.field("type").map(|t| t.range()))?;
        if let Some(range) = range {
            self.node().edit(vec![TextEdit::delete(range.start, range.end)])?;
        }
        Ok(())
    }
}

pub trait ReturnTypedNode: Wrapped {
    const CAPABILITY: Capability = Capability::ReturnTyped;

    fn return_type_node(&self) -> Result<Option<Node>> {
        let located = self.node().view(|v| {
            v.field("return_type")
                .and_then(annotated_type)
                .map(|t| t.locate())
        })?;
        Ok(self.node().wrap_opt(located))
    }

    fn return_type_text(&self) -> Result<Option<String>> {
        self.node().view(|v| {
            v.field("return_type")
                .and_then(annotated_type)
                .map(|t| t.source().to_string())
        })
    }

    fn set_return_type(&self, text: &str) -> Result<()> {
        let text = require_text(text, "return type")?;
        let edit = self.node().try_view(|v| {
            match v.field("return_type").and_then(annotated_type) {
                Some(existing) if existing.source() == text => Ok(None),
                Some(existing) => Ok(Some(TextEdit::replace(existing.start(), existing.end(), text))),
                None => {
                    let params = v
                        .field("parameters")
                        .ok_or_else(|| missing::<Self>("parameter list"))?;
                    Ok(Some(TextEdit::insert(params.end(), format!(": {text}"))))
                }
            }
        })?;
        if let Some(edit) = edit {
            self.node().edit(vec![edit])?;
        }
        Ok(())
    }

    fn remove_return_type(&self) -> Result<()> {
        let range = self.node().view(|v| v.field("return_type").map(|t| t.range()))?;
        if let Some(range) = range {
            self.node().edit(vec![TextEdit::delete(range.start, range.end)])?;
        }
        Ok(())
    }
}
