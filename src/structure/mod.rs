//! Plain-data structures for wrapped nodes.
//!
//! A structure is the serializable description of a declaration: every field is
//! optional, so a partial structure sets only what it names. Reading a node's
//! structure and setting it back leaves the text untouched.
//!
//! Fields that can be removed from the source (a return type, a base class) are
//! `Option<Option<T>>`: absent leaves the node alone, `null` removes the part.

mod declarations;
mod members;

pub use declarations::{
    ClassStructure, FunctionStructure, InterfaceStructure, SourceFileStructure,
    TypeAliasStructure, VariableDeclarationStructure, VariableStatementStructure,
};
pub use members::{
    DecoratorStructure, MethodStructure, ParameterStructure, PropertyAssignmentStructure,
    PropertySignatureStructure, PropertyStructure, ShorthandPropertyAssignmentStructure,
    TypeParameterStructure,
};

use crate::capabilities::{
    decorator_views, BodiedNode, DecoratableNode, ExportableNode, ParameteredNode,
    TypeParameteredNode,
};
use crate::compose::{Wrapped, WrapperKind};
use crate::config::ManipulationSettings;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::kinds::{
    ClassDeclaration, Decorator, FunctionDeclaration, InterfaceDeclaration, MethodDeclaration,
    Parameter, PropertyAssignment, PropertyDeclaration, PropertySignature,
    ShorthandPropertyAssignment, SourceFile, TypeAliasDeclaration, TypeParameter,
    VariableDeclaration, VariableStatement,
};
use crate::layout;
use crate::node::Node;
use crate::writer::CodeWriter;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A structure of any kind, tagged with the kind it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Structure {
    SourceFile(SourceFileStructure),
    VariableStatement(VariableStatementStructure),
    VariableDeclaration(VariableDeclarationStructure),
    FunctionDeclaration(FunctionStructure),
    Parameter(ParameterStructure),
    ClassDeclaration(ClassStructure),
    PropertyDeclaration(PropertyStructure),
    MethodDeclaration(MethodStructure),
    InterfaceDeclaration(InterfaceStructure),
    PropertySignature(PropertySignatureStructure),
    TypeAliasDeclaration(TypeAliasStructure),
    TypeParameter(TypeParameterStructure),
    Decorator(DecoratorStructure),
    PropertyAssignment(PropertyAssignmentStructure),
    ShorthandPropertyAssignment(ShorthandPropertyAssignmentStructure),
    /// Source text for a node with no structured form, such as a comment or an
    /// expression statement.
    Raw { text: String },
}

/// What a set left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Morph {
    /// The receiver was edited in place and is still valid.
    Kept(Node),
    /// The receiver was replaced (and forgotten); this is its successor.
    Replaced(Node),
}

impl Morph {
    pub fn node(&self) -> &Node {
        match self {
            Morph::Kept(node) | Morph::Replaced(node) => node,
        }
    }

    pub fn into_node(self) -> Node {
        match self {
            Morph::Kept(node) | Morph::Replaced(node) => node,
        }
    }

    pub fn was_replaced(&self) -> bool {
        matches!(self, Morph::Replaced(_))
    }
}

/// A wrapper kind with a structure.
pub trait Structured: Wrapped {
    type Structure: Clone + PartialEq;

    /// Reify the node into plain data.
    fn structure(&self) -> Result<Self::Structure>;

    /// Apply every present field of `structure`.
    ///
    /// Fields that do not apply to the node are rejected before any edit.
    fn set(&self, structure: &Self::Structure) -> Result<Morph>;
}

/// Writes a structure as source text.
pub(crate) trait Emit {
    fn emit(&self, w: &mut CodeWriter);
}

pub(crate) fn render(item: &impl Emit, settings: &ManipulationSettings) -> String {
    let mut w = CodeWriter::new(settings);
    item.emit(&mut w);
    w.to_string().trim_end().to_string()
}

macro_rules! structured_kinds {
    ($($kind:ident => $wrapper:ty),* $(,)?) => {
        impl Node {
            /// The node's structure; nodes without one give [`Structure::Raw`].
            pub fn structure(&self) -> Result<Structure> {
                match self.kind() {
                    $(WrapperKind::$kind => Ok(Structure::$kind(
                        self.cast_or_err::<$wrapper>()?.structure()?,
                    )),)*
                    WrapperKind::Generic => Ok(Structure::Raw { text: self.print()? }),
                }
            }

            /// Apply a structure of the node's own kind, or replace the node
            /// with [`Structure::Raw`] text.
            pub fn set_structure(&self, structure: &Structure) -> Result<Morph> {
                match structure {
                    $(Structure::$kind(s) if self.kind() == WrapperKind::$kind => {
                        self.cast_or_err::<$wrapper>()?.set(s)
                    })*
                    Structure::Raw { text } => set_raw(self, text),
                    _ => Err(MorphError::IncompatibleStructure {
                        field: "kind",
                        kind: self.kind(),
                    }),
                }
            }
        }

        impl Structure {
            /// The wrapper kind described, `None` for raw text.
            pub fn kind(&self) -> Option<WrapperKind> {
                match self {
                    $(Structure::$kind(_) => Some(WrapperKind::$kind),)*
                    Structure::Raw { .. } => None,
                }
            }
        }

        impl Emit for Structure {
            fn emit(&self, w: &mut CodeWriter) {
                match self {
                    $(Structure::$kind(s) => s.emit(w),)*
                    Structure::Raw { text } => {
                        w.write(text);
                    }
                }
            }
        }
    };
}

structured_kinds! {
    SourceFile => SourceFile,
    VariableStatement => VariableStatement,
    VariableDeclaration => VariableDeclaration,
    FunctionDeclaration => FunctionDeclaration,
    Parameter => Parameter,
    ClassDeclaration => ClassDeclaration,
    PropertyDeclaration => PropertyDeclaration,
    MethodDeclaration => MethodDeclaration,
    InterfaceDeclaration => InterfaceDeclaration,
    PropertySignature => PropertySignature,
    TypeAliasDeclaration => TypeAliasDeclaration,
    TypeParameter => TypeParameter,
    Decorator => Decorator,
    PropertyAssignment => PropertyAssignment,
    ShorthandPropertyAssignment => ShorthandPropertyAssignment,
}

impl Structure {
    pub fn from_json(json: &str) -> Result<Structure> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Source text for the structure, formatted with `settings`.
    pub fn to_text(&self, settings: &ManipulationSettings) -> String {
        render(self, settings)
    }
}

fn set_raw(node: &Node, text: &str) -> Result<Morph> {
    if node.text()?.trim() == text.trim() {
        return Ok(Morph::Kept(node.clone()));
    }
    node.replace_with_text(text).map(Morph::Replaced)
}

/// `null` in JSON is `Some(None)`; an absent field stays `None`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

pub(crate) fn kept(node: &impl Wrapped) -> Morph {
    Morph::Kept(node.node().clone())
}

/// Turns a missing optional part into `None`.
pub(crate) fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MorphError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

pub(crate) fn incompatible<T: Wrapped>(field: &'static str) -> MorphError {
    MorphError::IncompatibleStructure {
        field,
        kind: T::KIND,
    }
}

/// Reject export flags the kind cannot take.
pub(crate) fn check_exports<T: ExportableNode>(
    is_exported: Option<bool>,
    is_default_export: Option<bool>,
) -> Result<()> {
    if is_default_export == Some(true) {
        if !T::ALLOWS_DEFAULT_EXPORT {
            return Err(incompatible::<T>("is_default_export"));
        }
        if is_exported == Some(false) {
            return Err(MorphError::InvalidArgument(
                "a default export is always exported".to_string(),
            ));
        }
    }
    Ok(())
}

pub(crate) fn set_exports<T: ExportableNode>(
    node: &T,
    is_exported: Option<bool>,
    is_default_export: Option<bool>,
) -> Result<()> {
    if is_default_export == Some(false) && node.is_default_export()? {
        node.set_is_default_export(false)?;
        if is_exported != Some(false) {
            node.set_is_exported(true)?;
        }
    }
    if let Some(exported) = is_exported {
        node.set_is_exported(exported)?;
    }
    if is_default_export == Some(true) {
        node.set_is_default_export(true)?;
    }
    Ok(())
}

pub(crate) fn set_flag(
    wanted: Option<bool>,
    current: impl FnOnce() -> Result<bool>,
    set: impl FnOnce(bool) -> Result<()>,
) -> Result<()> {
    match wanted {
        Some(value) if value != current()? => set(value),
        _ => Ok(()),
    }
}

/// Set or remove an optional text part such as a type or initializer.
pub(crate) fn set_part(
    wanted: &Option<Option<String>>,
    current: impl FnOnce() -> Result<Option<String>>,
    set: impl FnOnce(&str) -> Result<()>,
    remove: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let Some(wanted) = wanted else {
        return Ok(());
    };
    let current = current()?;
    match wanted.as_deref().map(str::trim) {
        Some(text) if current.as_deref() != Some(text) => set(text),
        None if current.is_some() => remove(),
        _ => Ok(()),
    }
}

pub(crate) fn structures<T: Structured>(items: &[T]) -> Result<Vec<T::Structure>> {
    items.iter().map(Structured::structure).collect()
}

pub(crate) fn joined<T: Emit>(items: &[T], separator: &str, settings: &ManipulationSettings) -> String {
    items
        .iter()
        .map(|item| render(item, settings))
        .collect::<Vec<_>>()
        .join(separator)
}

pub(crate) fn set_type_parameters<T: TypeParameteredNode>(
    node: &T,
    wanted: &[TypeParameterStructure],
) -> Result<()> {
    let current = structures(&node.type_parameters()?)?;
    if current.as_slice() == wanted {
        return Ok(());
    }
    let settings = node.node().settings();
    let list = joined(wanted, ", ", &settings);
    let edit = node.node().try_view(|v| {
        Ok(match (v.field("type_parameters"), list.is_empty()) {
            (Some(existing), true) => Some(TextEdit::delete(existing.start(), existing.end())),
            (Some(existing), false) => Some(TextEdit::replace(
                existing.start(),
                existing.end(),
                format!("<{list}>"),
            )),
            (None, false) => {
                let name = v
                    .field("name")
                    .ok_or_else(|| MorphError::not_found(format!("name of {}", T::KIND)))?;
                Some(TextEdit::insert(name.end(), format!("<{list}>")))
            }
            (None, true) => None,
        })
    })?;
    if let Some(edit) = edit {
        node.node().edit(vec![edit])?;
    }
    Ok(())
}

pub(crate) fn set_parameters<T: ParameteredNode>(
    node: &T,
    wanted: &[ParameterStructure],
) -> Result<()> {
    let current = structures(&node.parameters()?)?;
    if current.as_slice() == wanted {
        return Ok(());
    }
    let settings = node.node().settings();
    let list = joined(wanted, ", ", &settings);
    let edit = node.node().try_view(|v| {
        let parameters = v
            .field("parameters")
            .ok_or_else(|| MorphError::not_found(format!("parameter list of {}", T::KIND)))?;
        let open = parameters.token("(").map_or(parameters.start(), |t| t.end());
        let close = parameters.token(")").map_or(parameters.end(), |t| t.start());
        Ok(TextEdit::replace(open, close, list))
    })?;
    node.node().edit(vec![edit])?;
    Ok(())
}

pub(crate) fn set_decorators<T: DecoratableNode>(
    node: &T,
    wanted: &[DecoratorStructure],
) -> Result<()> {
    let current = structures(&node.decorators()?)?;
    if current.as_slice() == wanted {
        return Ok(());
    }
    let settings = node.node().settings();
    let rendered: Vec<String> = wanted.iter().map(|d| render(d, &settings)).collect();
    let edit = node.node().view(|v| {
        let views = decorator_views(&v);
        match (views.first(), views.last()) {
            (Some(first), Some(last)) => {
                let separator = if T::DECORATOR_INLINE {
                    " ".to_string()
                } else {
                    format!(
                        "{}{}",
                        settings.new_line.as_str(),
                        layout::indentation_at(v.text, first.start())
                    )
                };
                let rest = &v.text[last.end()..];
                let end = last.end() + (rest.len() - rest.trim_start().len());
                let text: String = rendered.iter().map(|d| format!("{d}{separator}")).collect();
                Some(TextEdit::replace(first.start(), end, text))
            }
            _ if rendered.is_empty() => None,
            _ => {
                let outer = v.outer();
                let separator = if T::DECORATOR_INLINE {
                    " ".to_string()
                } else {
                    format!("{}{}", settings.new_line.as_str(), outer.line_indent())
                };
                let text: String = rendered.iter().map(|d| format!("{d}{separator}")).collect();
                Some(TextEdit::insert(outer.start(), text))
            }
        }
    })?;
    if let Some(edit) = edit {
        node.node().edit(vec![edit])?;
    }
    Ok(())
}

/// Structure of one statement; an exported declaration reifies as the declaration.
pub(crate) fn statement_structure(statement: &Node) -> Result<Structure> {
    if statement.syntax_kind()? == "export_statement" {
        let declaration = statement.child_by_field("declaration")?;
        if let Some(declaration) = declaration.filter(|d| d.kind() != WrapperKind::Generic) {
            return declaration.structure();
        }
        return Ok(Structure::Raw {
            text: statement.print()?,
        });
    }
    statement.structure()
}

pub(crate) fn statement_structures(statements: &[Node]) -> Result<Vec<Structure>> {
    statements.iter().map(statement_structure).collect()
}

/// Text for the `wanted` statements.
///
/// An existing statement whose structure equals a wanted item keeps its printed
/// text, so unchanged code keeps its formatting.
pub(crate) fn statements_text(
    existing: &[Node],
    current: &[Structure],
    wanted: &[Structure],
    settings: &ManipulationSettings,
) -> Result<String> {
    let mut used = vec![false; existing.len()];
    let mut cursor = 0;
    let mut w = CodeWriter::new(settings);
    for item in wanted {
        let reuse = (cursor..existing.len()).find(|&i| !used[i] && current[i] == *item);
        match reuse {
            Some(i) => {
                used[i] = true;
                cursor = i + 1;
                w.write(&existing[i].print()?);
            }
            None => item.emit(&mut w),
        }
        w.newline_if_last_not();
    }
    let reused = used.iter().filter(|u| **u).count();
    debug!(reused, emitted = wanted.len() - reused, "rewrote statement list");
    Ok(w.to_string().trim_end().to_string())
}

pub(crate) fn body_statements<T: BodiedNode>(node: &T) -> Result<Option<Vec<Structure>>> {
    match node.body()? {
        Some(body) => Ok(Some(statement_structures(&body.children()?)?)),
        None => Ok(None),
    }
}

pub(crate) fn set_body_statements<T: BodiedNode>(node: &T, wanted: &[Structure]) -> Result<()> {
    let body = node.body()?.ok_or_else(|| incompatible::<T>("statements"))?;
    let existing = body.children()?;
    let current = statement_structures(&existing)?;
    if current.as_slice() == wanted {
        return Ok(());
    }
    let text = statements_text(&existing, &current, wanted, &node.node().settings())?;
    node.set_body_text(&text)
}

/// `export ` and `default ` as the flags ask.
pub(crate) fn emit_exports(w: &mut CodeWriter, exported: Option<bool>, default: Option<bool>) {
    let default = default == Some(true);
    w.conditional_write(exported == Some(true) || default, "export ");
    w.conditional_write(default, "default ");
}

pub(crate) fn emit_type_parameters(w: &mut CodeWriter, items: &Option<Vec<TypeParameterStructure>>) {
    let Some(items) = items.as_ref().filter(|items| !items.is_empty()) else {
        return;
    };
    w.write("<");
    for (i, item) in items.iter().enumerate() {
        w.conditional_write(i > 0, ", ");
        item.emit(w);
    }
    w.write(">");
}

pub(crate) fn emit_parameters(w: &mut CodeWriter, items: &Option<Vec<ParameterStructure>>) {
    w.write("(");
    for (i, item) in items.iter().flatten().enumerate() {
        w.conditional_write(i > 0, ", ");
        item.emit(w);
    }
    w.write(")");
}

pub(crate) fn emit_annotation(w: &mut CodeWriter, ty: &Option<Option<String>>) {
    if let Some(Some(ty)) = ty {
        w.write(": ");
        w.write(ty.trim());
    }
}

pub(crate) fn emit_body(w: &mut CodeWriter, statements: &Option<Vec<Structure>>) {
    match statements.as_ref().filter(|s| !s.is_empty()) {
        Some(statements) => {
            w.block(|w| {
                for statement in statements {
                    statement.emit(w);
                    w.newline_if_last_not();
                }
            });
        }
        None => {
            w.write(" {}");
        }
    }
}

/// Check that the text names something; names are never removable.
pub(crate) fn check_name(name: &Option<String>) -> Result<()> {
    match name {
        Some(name) if name.trim().is_empty() => {
            Err(MorphError::InvalidArgument("name must not be empty".to_string()))
        }
        _ => Ok(()),
    }
}
