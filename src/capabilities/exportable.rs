use crate::compose::{Capability, Wrapped};
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::layout;

/// A top-level declaration that may carry `export` / `export default`.
pub trait ExportableNode: Wrapped {
    const CAPABILITY: Capability = Capability::Exportable;
    /// Variable statements and type aliases cannot be default exports.
    const ALLOWS_DEFAULT_EXPORT: bool = true;

    fn is_exported(&self) -> Result<bool> {
        self.node()
            .view(|v| v.outer().kind() == "export_statement")
    }

    fn is_default_export(&self) -> Result<bool> {
        self.node().view(|v| {
            let outer = v.outer();
            outer.kind() == "export_statement" && outer.token("default").is_some()
        })
    }

    /// Add or drop the `export` keyword. Dropping it also drops `default`.
    fn set_is_exported(&self, value: bool) -> Result<()> {
        let edit = self.node().view(|v| {
            let outer = v.outer();
            let exported = outer.kind() == "export_statement";
            match (exported, value) {
                (false, true) => Some(TextEdit::insert(v.start(), "export ")),
                (true, false) => outer
                    .token("export")
                    .map(|export| TextEdit::delete(export.start(), v.start())),
                _ => None,
            }
        })?;
        if let Some(edit) = edit {
            self.node().edit(vec![edit])?;
        }
        Ok(())
    }

    /// `true` makes the declaration `export default`; `false` removes the export entirely.
    fn set_is_default_export(&self, value: bool) -> Result<()> {
        if value && !Self::ALLOWS_DEFAULT_EXPORT {
            return Err(MorphError::InvalidArgument(format!(
                "{} cannot be a default export",
                Self::KIND
            )));
        }
        let edit = self.node().view(|v| {
            let outer = v.outer();
            let exported = outer.kind() == "export_statement";
            let default = exported && outer.token("default").is_some();
            match (exported, default, value) {
                (false, _, true) => Some(TextEdit::insert(v.start(), "export default ")),
                (true, false, true) => outer.token("export").map(|export| {
                    let after = layout::skip_inline_space(v.text, export.end());
                    TextEdit::insert(after, "default ")
                }),
                (true, true, false) => outer
                    .token("export")
                    .map(|export| TextEdit::delete(export.start(), v.start())),
                _ => None,
            }
        })?;
        if let Some(edit) = edit {
            self.node().edit(vec![edit])?;
        }
        Ok(())
    }
}
