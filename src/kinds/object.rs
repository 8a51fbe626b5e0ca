use crate::capabilities::{produced, require_text};
use crate::compose::compose;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::node::Node;

compose! {
    /// `key: value` in an object literal.
    pub struct PropertyAssignment as PropertyAssignment {
        syntax: ["pair"],
        own: ["initializer", "set_initializer", "remove_initializer"],
        capabilities: [NamedNode { const NAME_FIELD: &'static str = "key"; }],
    }
}

compose! {
    /// `{ key }` in an object literal.
    pub struct ShorthandPropertyAssignment as ShorthandPropertyAssignment {
        syntax: ["shorthand_property_identifier"],
        own: ["name", "set_initializer"],
        capabilities: [],
    }
}

impl PropertyAssignment {
    pub fn initializer(&self) -> Result<Node> {
        let located = self.view(|v| v.field("value").map(|value| value.locate()))?;
        self.wrap_opt(located)
            .ok_or_else(|| MorphError::not_found("value of property assignment"))
    }

    pub fn set_initializer(&self, text: &str) -> Result<()> {
        let text = require_text(text, "initializer")?;
        let edit = self.try_view(|v| {
            let value = v
                .field("value")
                .ok_or_else(|| MorphError::not_found("value of property assignment"))?;
            Ok((value.source() != text).then(|| TextEdit::replace(value.start(), value.end(), text)))
        })?;
        if let Some(edit) = edit {
            self.edit(vec![edit])?;
        }
        Ok(())
    }

    /// Rewrite `key: value` as `key`.
    ///
    /// The receiver is forgotten; use the returned shorthand instead.
    pub fn remove_initializer(&self) -> Result<ShorthandPropertyAssignment> {
        let (file, range, key) = self.try_view(|v| {
            let key = v
                .field("key")
                .ok_or_else(|| MorphError::not_found("key of property assignment"))?;
            if key.kind() != "property_identifier" {
                return Err(MorphError::InvalidArgument(format!(
                    "`{}` cannot be written as a shorthand property",
                    key.source()
                )));
            }
            Ok((v.file, v.range(), key.source().to_string()))
        })?;
        let transition = self.edit(vec![TextEdit::replace(range.start, range.end, key)])?;
        produced(
            self,
            file,
            &transition.new_spans[0],
            &["shorthand_property_identifier"],
        )?
        .cast_or_err()
    }
}

impl ShorthandPropertyAssignment {
    pub fn name(&self) -> Result<String> {
        self.text()
    }

    /// Rewrite `key` as `key: text`.
    ///
    /// The receiver is forgotten; use the returned assignment instead.
    pub fn set_initializer(&self, text: &str) -> Result<PropertyAssignment> {
        let text = require_text(text, "initializer")?;
        let (file, range, name) = self.view(|v| (v.file, v.range(), v.source().to_string()))?;
        let transition = self.edit(vec![TextEdit::replace(
            range.start,
            range.end,
            format!("{name}: {text}"),
        )])?;
        produced(self, file, &transition.new_spans[0], &["pair"])?.cast_or_err()
    }
}
