use super::{missing, require_text};
use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::Result;
use crate::node::Node;

/// A declaration with a name.
pub trait NamedNode: Wrapped {
    const CAPABILITY: Capability = Capability::Named;
    /// Field holding the name; parameters use `pattern`, object members `key`.
    const NAME_FIELD: &'static str = "name";

    fn name_node(&self) -> Result<Node> {
        self.node()
            .child_by_field(Self::NAME_FIELD)?
            .ok_or_else(|| missing::<Self>("name"))
    }

    fn name(&self) -> Result<String> {
        self.node()
            .view(|v| v.field(Self::NAME_FIELD).map(|n| n.source().to_string()))?
            .ok_or_else(|| missing::<Self>("name"))
    }

    fn set_name(&self, name: &str) -> Result<()> {
        let name = require_text(name, "name")?;
        let range = self
            .node()
            .view(|v| v.field(Self::NAME_FIELD).map(|n| n.range()))?
            .ok_or_else(|| missing::<Self>("name"))?;
        if self.node().view(|v| &v.text[range.clone()] == name)? {
            return Ok(());
        }
        self.node()
            .edit(vec![TextEdit::replace(range.start, range.end, name)])?;
        Ok(())
    }
}
