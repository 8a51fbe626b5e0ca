//! Capability composition.
//!
//! Every concrete wrapper is a newtype over [`Node`] that implements some subset of
//! the capability traits in [`crate::capabilities`]. The [`compose!`] macro assembles
//! a kind from its syntax kinds, its own inherent methods and its capability list,
//! and [`KIND_TABLE`] gathers every assembled kind. The table is checked at compile
//! time: two capabilities on one kind may not expose the same method name, and a
//! syntax kind may belong to only one wrapper kind.

use crate::kinds::{
    ClassDeclaration, Decorator, FunctionDeclaration, InterfaceDeclaration, MethodDeclaration,
    Parameter, PropertyAssignment, PropertyDeclaration, PropertySignature, ShorthandPropertyAssignment,
    SourceFile, TypeAliasDeclaration, TypeParameter, VariableDeclaration, VariableStatement,
};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// One independently composable unit of node behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Named,
    Exportable,
    Typed,
    Initializer,
    Async,
    Generator,
    Decoratable,
    Parametered,
    TypeParametered,
    ReturnTyped,
    Bodied,
    Static,
    Readonly,
    Abstract,
    QuestionToken,
}

impl Capability {
    /// Method names the capability's trait contributes to a kind.
    pub const fn methods(self) -> &'static [&'static str] {
        match self {
            Capability::Named => &["name", "name_node", "set_name"],
            Capability::Exportable => &[
                "is_exported",
                "is_default_export",
                "set_is_exported",
                "set_is_default_export",
            ],
            Capability::Typed => &["type_node", "type_text", "set_type", "remove_type"],
            Capability::Initializer => &[
                "initializer",
                "initializer_or_err",
                "has_initializer",
                "set_initializer",
                "remove_initializer",
            ],
            Capability::Async => &["is_async", "set_is_async"],
            Capability::Generator => &["is_generator", "set_is_generator"],
            Capability::Decoratable => &["decorators", "decorator", "decorator_or_err", "add_decorator"],
            Capability::Parametered => &[
                "parameters",
                "parameter",
                "parameter_or_err",
                "add_parameter",
                "insert_parameter",
            ],
            Capability::TypeParametered => &["type_parameters", "type_parameter", "add_type_parameter"],
            Capability::ReturnTyped => &[
                "return_type_node",
                "return_type_text",
                "set_return_type",
                "remove_return_type",
            ],
            Capability::Bodied => &["body", "body_text", "set_body_text", "statements", "add_statements"],
            Capability::Static => &["is_static", "set_is_static"],
            Capability::Readonly => &["is_readonly", "set_is_readonly"],
            Capability::Abstract => &["is_abstract", "set_is_abstract"],
            Capability::QuestionToken => &["has_question_token", "set_has_question_token"],
        }
    }

    const fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Discriminant of every wrapper type, `Generic` for syntax kinds without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapperKind {
    SourceFile,
    VariableStatement,
    VariableDeclaration,
    FunctionDeclaration,
    Parameter,
    ClassDeclaration,
    PropertyDeclaration,
    MethodDeclaration,
    InterfaceDeclaration,
    PropertySignature,
    TypeAliasDeclaration,
    TypeParameter,
    Decorator,
    PropertyAssignment,
    ShorthandPropertyAssignment,
    Generic,
}

impl WrapperKind {
    /// Concrete kind for a syntax kind; unknown kinds fall back to `Generic`.
    pub fn from_syntax_kind(syntax_kind: &str) -> WrapperKind {
        static DISPATCH: OnceLock<HashMap<&'static str, WrapperKind>> = OnceLock::new();
        let dispatch = DISPATCH.get_or_init(|| {
            KIND_TABLE
                .iter()
                .flat_map(|entry| entry.syntax_kinds.iter().map(|s| (*s, entry.kind)))
                .collect()
        });
        dispatch.get(syntax_kind).copied().unwrap_or(WrapperKind::Generic)
    }

    pub fn entry(self) -> Option<&'static KindEntry> {
        KIND_TABLE.iter().find(|entry| entry.kind == self)
    }

    pub fn capabilities(self) -> &'static [Capability] {
        self.entry().map(|e| e.capabilities).unwrap_or(&[])
    }

    pub fn has_capability(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The base every concrete wrapper composes over.
pub trait Wrapped: Sized {
    const KIND: WrapperKind;
    const SYNTAX_KINDS: &'static [&'static str];
    const CAPABILITIES: &'static [Capability];
    /// Inherent methods beyond the capability traits
    const OWN_METHODS: &'static [&'static str];

    fn node(&self) -> &Node;

    /// Wrap without checking the kind. Use [`Node::cast`] instead.
    fn from_node_unchecked(node: Node) -> Self;
}

/// One row of the kind table.
#[derive(Debug, Clone, Copy)]
pub struct KindEntry {
    pub kind: WrapperKind,
    pub syntax_kinds: &'static [&'static str],
    pub capabilities: &'static [Capability],
    pub own_methods: &'static [&'static str],
}

impl KindEntry {
    pub const fn of<T: Wrapped>() -> Self {
        KindEntry {
            kind: T::KIND,
            syntax_kinds: T::SYNTAX_KINDS,
            capabilities: T::CAPABILITIES,
            own_methods: T::OWN_METHODS,
        }
    }
}

pub const KIND_TABLE: &[KindEntry] = &[
    KindEntry::of::<SourceFile>(),
    KindEntry::of::<VariableStatement>(),
    KindEntry::of::<VariableDeclaration>(),
    KindEntry::of::<FunctionDeclaration>(),
    KindEntry::of::<Parameter>(),
    KindEntry::of::<ClassDeclaration>(),
    KindEntry::of::<PropertyDeclaration>(),
    KindEntry::of::<MethodDeclaration>(),
    KindEntry::of::<InterfaceDeclaration>(),
    KindEntry::of::<PropertySignature>(),
    KindEntry::of::<TypeAliasDeclaration>(),
    KindEntry::of::<TypeParameter>(),
    KindEntry::of::<Decorator>(),
    KindEntry::of::<PropertyAssignment>(),
    KindEntry::of::<ShorthandPropertyAssignment>(),
];

const _: () = assert!(
    table_is_valid(KIND_TABLE),
    "kind table has a method-name collision or a syntax kind claimed twice"
);

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn lists_disjoint(a: &[&str], b: &[&str]) -> bool {
    let mut i = 0;
    while i < a.len() {
        let mut j = 0;
        while j < b.len() {
            if str_eq(a[i], b[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn list_unique(a: &[&str]) -> bool {
    let mut i = 0;
    while i < a.len() {
        let mut j = i + 1;
        while j < a.len() {
            if str_eq(a[i], a[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// No method name reachable on one kind comes from two places.
pub const fn entry_is_disjoint(entry: &KindEntry) -> bool {
    if !list_unique(entry.own_methods) {
        return false;
    }
    let caps = entry.capabilities;
    let mut i = 0;
    while i < caps.len() {
        if !lists_disjoint(caps[i].methods(), entry.own_methods) {
            return false;
        }
        let mut j = i + 1;
        while j < caps.len() {
            if caps[i].ordinal() == caps[j].ordinal()
                || !lists_disjoint(caps[i].methods(), caps[j].methods())
            {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

pub const fn table_is_valid(table: &[KindEntry]) -> bool {
    let mut i = 0;
    while i < table.len() {
        if !entry_is_disjoint(&table[i]) {
            return false;
        }
        let mut j = i + 1;
        while j < table.len() {
            if !lists_disjoint(table[i].syntax_kinds, table[j].syntax_kinds) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// Assemble a concrete wrapper kind.
///
/// ```ignore
/// compose! {
///     /// A `type X<T> = ...` declaration.
///     pub struct TypeAliasDeclaration as TypeAliasDeclaration {
///         syntax: ["type_alias_declaration"],
///         own: [],
///         capabilities: [
///             ExportableNode { const ALLOWS_DEFAULT_EXPORT: bool = false; },
///             NamedNode,
///             TypeParameteredNode,
///             TypedNode { const TYPE_SHAPE: TypeShape = TypeShape::Assigned; },
///         ],
///     }
/// }
/// ```
macro_rules! compose {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $kind:ident {
            syntax: [$($syntax:literal),* $(,)?],
            own: [$($own:literal),* $(,)?],
            capabilities: [$($cap:ident $({ $($body:tt)* })?),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        $vis struct $name($crate::node::Node);

        impl $crate::compose::Wrapped for $name {
            const KIND: $crate::compose::WrapperKind = $crate::compose::WrapperKind::$kind;
            const SYNTAX_KINDS: &'static [&'static str] = &[$($syntax),*];
            const CAPABILITIES: &'static [$crate::compose::Capability] =
                &[$(<$name as $crate::capabilities::$cap>::CAPABILITY),*];
            const OWN_METHODS: &'static [&'static str] = &[$($own),*];

            fn node(&self) -> &$crate::node::Node {
                &self.0
            }

            fn from_node_unchecked(node: $crate::node::Node) -> Self {
                $name(node)
            }
        }

        $(
            impl $crate::capabilities::$cap for $name {
                $($($body)*)?
            }
        )*

        impl std::ops::Deref for $name {
            type Target = $crate::node::Node;

            fn deref(&self) -> &$crate::node::Node {
                &self.0
            }
        }

        impl From<$name> for $crate::node::Node {
            fn from(wrapper: $name) -> $crate::node::Node {
                wrapper.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }
    };
}

pub(crate) use compose;
