//! ast-grep patterns over source files.
//!
//! Patterns use ast-grep's metavariables: `$NAME` captures one node, `$$$NAME`
//! captures zero or more, `$_` matches one node without capturing. Matches are
//! resolved back to [`Node`](crate::node::Node)s of the project, and replacements
//! go through the manipulation pipeline like any other edit.

pub mod errors;
pub mod lang;
mod matcher;
mod replacer;

pub use errors::AstGrepError;
pub use lang::SupportLang;
pub use matcher::PatternMatch;
pub use replacer::expand_template;

pub(crate) use matcher::find_in;
pub(crate) use replacer::replace_in;
