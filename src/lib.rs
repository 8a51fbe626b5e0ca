//! Syntax Morph: stable, typed node wrappers over TypeScript syntax trees
//!
//! A [`Project`] owns source files, their parsed trees and a registry of wrapper
//! handles. Wrappers keep their identity across edits: every mutation compiles down
//! to byte-span [`TextEdit`]s that run through one pipeline (apply, reparse, remap).
//! Wrappers whose node survives the edit are rebound to the new tree; the rest are
//! forgotten and report [`MorphError::ForgottenNode`] from then on.
//!
//! # Layers
//!
//! - [`syntax`]: the parser service (tree-sitter) and the owned tree it produces
//! - [`edit`]: validated, verifiable byte-span replacements
//! - [`registry`] and [`node`]: wrapper identity and the query surface
//! - [`capabilities`], [`compose`] and [`kinds`]: typed, composable node behaviour
//! - [`structure`]: plain-data snapshots of nodes that can be read and set back
//! - [`writer`]: [`CodeWriter`], the indentation-aware text emitter
//! - [`sg`]: ast-grep pattern search mapped back onto wrappers
//!
//! # Example
//!
//! ```no_run
//! use syntax_morph::{NamedNode, Project};
//!
//! let project = Project::in_memory()?;
//! let file = project.create_source_file("/a.ts", "function greet() {}\n")?;
//! let greet = file.function_or_err("greet")?;
//! greet.set_name("welcome")?;
//! assert_eq!(greet.name()?, "welcome");
//! assert_eq!(file.full_text()?, "function welcome() {}\n");
//! # Ok::<(), syntax_morph::MorphError>(())
//! ```

pub mod cache;
pub mod capabilities;
pub mod compose;
pub mod config;
pub mod edit;
pub mod error;
pub mod fs;
pub mod kinds;
pub mod layout;
pub mod manipulation;
pub mod node;
pub mod printer;
pub mod project;
pub mod registry;
pub mod sg;
pub mod structure;
pub mod syntax;
pub mod writer;

// Re-exports
pub use capabilities::{
    AbstractableNode, AsyncableNode, BodiedNode, DecoratableNode, ExportableNode,
    GeneratorableNode, InitializerExpressionableNode, NamedNode, ParameteredNode,
    QuestionTokenableNode, ReadonlyableNode, ReturnTypedNode, StaticableNode, TypedNode,
    TypeParameteredNode,
};
pub use compose::{Capability, WrapperKind, Wrapped};
pub use config::{
    load_from_path, load_from_str, ConfigError, IndentationText, ManipulationSettings,
    NewLineKind, ProjectConfig, QuoteKind,
};
pub use edit::{EditError, EditVerification, TextEdit};
pub use error::{MorphError, Result};
pub use fs::{FileSystemHost, InMemoryFileSystem, RealFileSystem};
pub use kinds::{
    ClassDeclaration, Decorator, FunctionDeclaration, InterfaceDeclaration, MethodDeclaration,
    Parameter, PropertyAssignment, PropertyDeclaration, PropertySignature, RefreshResult,
    ShorthandPropertyAssignment, SourceFile, TypeAliasDeclaration, TypeParameter,
    VariableDeclaration, VariableDeclarationKind, VariableStatement,
};
pub use manipulation::{PipelinePhase, Transition};
pub use node::Node;
pub use printer::{DefaultPrinter, PrintError, Printer};
pub use project::{Project, ProjectBuilder};
pub use registry::{FileId, WrapperId};
pub use sg::{AstGrepError, PatternMatch};
pub use structure::{Morph, Structure, Structured};
pub use syntax::{ParseError, ParseService, Reparse, SourceLanguage, SyntaxTree, TreeSitterParser};
pub use writer::CodeWriter;
