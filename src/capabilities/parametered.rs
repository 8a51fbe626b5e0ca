use super::{missing, produced, require_text};
use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::kinds::{Parameter, TypeParameter};
use crate::manipulation::placement;
use crate::node::{Located, View};

const PARAMETER_KINDS: &[&str] = &["required_parameter", "optional_parameter"];
const TYPE_PARAMETER_KINDS: &[&str] = &["type_parameter"];

/// Name of a parameter-like node: its `pattern` or `name` field.
fn binding_name<'a>(v: &View<'a>) -> Option<&'a str> {
    v.field("pattern")
        .or_else(|| v.field("name"))
        .map(|n| n.source())
}

fn list_items<'a>(v: &View<'a>, field: &str, kinds: &[&str]) -> Vec<View<'a>> {
    v.field(field)
        .map(|list| list.elements().filter(|e| e.is_kind(kinds)).collect())
        .unwrap_or_default()
}

fn locate_all(items: &[View<'_>]) -> Vec<Located> {
    items.iter().map(|i| i.locate()).collect()
}

pub trait ParameteredNode: Wrapped {
    const CAPABILITY: Capability = Capability::Parametered;

    fn parameters(&self) -> Result<Vec<Parameter>> {
        let located = self
            .node()
            .view(|v| locate_all(&list_items(&v, "parameters", PARAMETER_KINDS)))?;
        self.node()
            .wrap_all(located)
            .iter()
            .map(|n| n.cast_or_err::<Parameter>())
            .collect()
    }

    fn parameter(&self, name: &str) -> Result<Option<Parameter>> {
        let located = self.node().view(|v| {
            list_items(&v, "parameters", PARAMETER_KINDS)
                .into_iter()
                .find(|p| binding_name(p) == Some(name))
                .map(|p| p.locate())
        })?;
        self.node()
            .wrap_opt(located)
            .map(|n| n.cast_or_err::<Parameter>())
            .transpose()
    }

    fn parameter_or_err(&self, name: &str) -> Result<Parameter> {
        if let Some(found) = self.parameter(name)? {
            return Ok(found);
        }
        let names: Vec<String> = self.node().view(|v| {
            list_items(&v, "parameters", PARAMETER_KINDS)
                .iter()
                .filter_map(binding_name)
                .map(str::to_string)
                .collect()
        })?;
        Err(MorphError::not_found_among(
            format!("parameter `{name}` of {}", Self::KIND),
            name,
            names.iter().map(String::as_str),
        ))
    }

    fn add_parameter(&self, text: &str) -> Result<Parameter> {
        self.insert_parameter(usize::MAX, text)
    }

    /// Insert `text` as parameter `index`; an index past the end appends.
    fn insert_parameter(&self, index: usize, text: &str) -> Result<Parameter> {
        let text = require_text(text, "parameter")?;
        let settings = self.node().settings();
        let (file, edit) = self.node().try_view(|v| {
            let list = v
                .field("parameters")
                .ok_or_else(|| missing::<Self>("parameter list"))?;
            Ok((v.file, placement::insert_into_list(&list, index, text, &settings)))
        })?;
        let transition = self.node().edit(vec![edit])?;
        produced(self.node(), file, &transition.new_spans[0], PARAMETER_KINDS)?
            .cast_or_err::<Parameter>()
    }
}

pub trait TypeParameteredNode: Wrapped {
    const CAPABILITY: Capability = Capability::TypeParametered;

    fn type_parameters(&self) -> Result<Vec<TypeParameter>> {
        let located = self
            .node()
            .view(|v| locate_all(&list_items(&v, "type_parameters", TYPE_PARAMETER_KINDS)))?;
        self.node()
            .wrap_all(located)
            .iter()
            .map(|n| n.cast_or_err::<TypeParameter>())
            .collect()
    }

    fn type_parameter(&self, name: &str) -> Result<Option<TypeParameter>> {
        let located = self.node().view(|v| {
            list_items(&v, "type_parameters", TYPE_PARAMETER_KINDS)
                .into_iter()
                .find(|p| binding_name(p) == Some(name))
                .map(|p| p.locate())
        })?;
        self.node()
            .wrap_opt(located)
            .map(|n| n.cast_or_err::<TypeParameter>())
            .transpose()
    }

    /// Append `text` to the type parameter list, creating `<...>` after the name if needed.
    fn add_type_parameter(&self, text: &str) -> Result<TypeParameter> {
        let text = require_text(text, "type parameter")?;
        let settings = self.node().settings();
        let (file, edit) = self.node().try_view(|v| {
            let edit = match v.field("type_parameters") {
                Some(list) => placement::insert_into_list(&list, usize::MAX, text, &settings),
                None => {
                    let name = v.field("name").ok_or_else(|| missing::<Self>("name"))?;
                    TextEdit::insert(name.end(), format!("<{text}>"))
                }
            };
            Ok((v.file, edit))
        })?;
        let transition = self.node().edit(vec![edit])?;
        produced(self.node(), file, &transition.new_spans[0], TYPE_PARAMETER_KINDS)?
            .cast_or_err::<TypeParameter>()
    }
}
