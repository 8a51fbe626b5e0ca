//! Turning a syntax node back into text.

use crate::layout;
use crate::syntax::{NodeHandle, SyntaxTree};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrintError {
    #[error("node does not belong to the tree being printed")]
    ForeignNode,

    #[error("printer failed: {message}")]
    Failed { message: String },
}

/// Produces standalone text for one node of a tree.
pub trait Printer {
    fn print(&self, tree: &SyntaxTree, node: NodeHandle, text: &str) -> Result<String, PrintError>;
}

/// Re-emits the node's own text with continuation lines dedented by the
/// indentation of the node's first line. Lines that begin inside a template
/// literal are left alone since their whitespace is content.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrinter;

impl Printer for DefaultPrinter {
    fn print(&self, tree: &SyntaxTree, node: NodeHandle, text: &str) -> Result<String, PrintError> {
        let data = tree.get(node).ok_or(PrintError::ForeignNode)?;
        let range = data.range.clone();
        let base = layout::indentation_at(text, range.start);

        let templates: Vec<_> = tree
            .descendants(node.index())
            .map(|i| tree.node(i))
            .filter(|d| d.kind == "template_string")
            .map(|d| d.range.clone())
            .collect();

        let mut out = String::with_capacity(range.len());
        let mut offset = range.start;
        for (i, line) in text[range.clone()].split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
                let in_template = templates.iter().any(|t| t.start < offset && offset < t.end);
                let stripped = if in_template {
                    line
                } else {
                    line.strip_prefix(base).unwrap_or(line)
                };
                out.push_str(stripped);
            } else {
                out.push_str(line);
            }
            offset += line.len() + 1;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{ParseService, TreeSitterParser};

    #[test]
    fn dedents_relative_to_first_line() {
        let text = "class A {\n    run() {\n        go();\n    }\n}\n";
        let tree = TreeSitterParser::typescript().unwrap().parse(text, None).unwrap();
        let method = tree
            .find_exact(&(14..41), |d| d.kind == "method_definition")
            .unwrap();
        let printed = DefaultPrinter.print(&tree, tree.handle(method), text).unwrap();
        assert_eq!(printed, "run() {\n    go();\n}");
    }

    #[test]
    fn template_lines_are_untouched() {
        let text = "  const s = `a\n  b`;\n";
        let tree = TreeSitterParser::typescript().unwrap().parse(text, None).unwrap();
        let statement = tree.children(0).next().unwrap();
        let printed = DefaultPrinter.print(&tree, tree.handle(statement), text).unwrap();
        assert_eq!(printed, "const s = `a\n  b`;");
    }
}
