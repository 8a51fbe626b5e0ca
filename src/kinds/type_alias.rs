use crate::capabilities::TypeShape;
use crate::compose::compose;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::node::View;

compose! {
    /// `type Name<T> = ...;`
    pub struct TypeAliasDeclaration as TypeAliasDeclaration {
        syntax: ["type_alias_declaration"],
        own: [],
        capabilities: [
            ExportableNode { const ALLOWS_DEFAULT_EXPORT: bool = false; },
            NamedNode,
            TypeParameteredNode,
            TypedNode { const TYPE_SHAPE: TypeShape = TypeShape::Assigned; },
        ],
    }
}

compose! {
    /// `T extends C = D` in a type parameter list.
    pub struct TypeParameter as TypeParameter {
        syntax: ["type_parameter"],
        own: ["constraint_text", "set_constraint", "default_text", "set_default"],
        capabilities: [NamedNode],
    }
}

/// The type inside a `constraint` (`extends T`) or `default_type` (`= T`) child.
fn clause_type<'a>(v: &View<'a>, field: &str) -> Option<View<'a>> {
    v.field(field)?.elements().next()
}

impl TypeParameter {
    pub fn constraint_text(&self) -> Result<Option<String>> {
        self.view(|v| clause_type(&v, "constraint").map(|t| t.source().to_string()))
    }

    pub fn default_text(&self) -> Result<Option<String>> {
        self.view(|v| clause_type(&v, "value").map(|t| t.source().to_string()))
    }

    /// Set or (with `None`) remove `extends C`.
    pub fn set_constraint(&self, constraint: Option<&str>) -> Result<()> {
        self.set_clause("constraint", "extends", constraint, |v| {
            v.field("name").map(|n| n.end())
        })
    }

    /// Set or (with `None`) remove `= D`.
    pub fn set_default(&self, default: Option<&str>) -> Result<()> {
        self.set_clause("value", "=", default, |v| {
            v.field("constraint")
                .or_else(|| v.field("name"))
                .map(|n| n.end())
        })
    }

    fn set_clause(
        &self,
        field: &str,
        keyword: &str,
        text: Option<&str>,
        anchor: impl FnOnce(&View<'_>) -> Option<usize>,
    ) -> Result<()> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        let edit = self.try_view(|v| {
            let existing = v.field(field);
            Ok(match (text, existing) {
                (Some(text), Some(clause)) => {
                    let ty = clause
                        .elements()
                        .next()
                        .ok_or_else(|| MorphError::not_found(format!("type of `{keyword}` clause")))?;
                    (ty.source() != text).then(|| TextEdit::replace(ty.start(), ty.end(), text))
                }
                (Some(text), None) => {
                    let at = anchor(&v).ok_or_else(|| MorphError::not_found("name of type parameter"))?;
                    Some(TextEdit::insert(at, format!(" {keyword} {text}")))
                }
                (None, Some(clause)) => {
                    let start = v
                        .children()
                        .take_while(|c| c.index != clause.index)
                        .last()
                        .map_or(clause.start(), |previous| previous.end());
                    Some(TextEdit::delete(start, clause.end()))
                }
                (None, None) => None,
            })
        })?;
        if let Some(edit) = edit {
            self.edit(vec![edit])?;
        }
        Ok(())
    }
}
