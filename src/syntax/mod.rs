//! The external parser service and the owned syntax trees it produces.
//!
//! Tree-sitter trees borrow nothing from this crate, but their `Node`s borrow the
//! tree. Wrappers need to outlive many reparses, so every parse is lowered into a
//! [`SyntaxTree`] arena and wrappers refer to nodes by [`NodeHandle`].

pub mod errors;
pub mod parser;
pub mod tree;
pub mod validator;

pub use errors::ParseError;
pub use parser::{ParseService, Reparse, SourceLanguage, TreeSitterParser};
pub use tree::{NodeData, NodeHandle, SyntaxTree, TreeId};
pub use validator::{collect_errors, introduced_errors, ErrorLocation};
