use crate::edit::TextEdit;
use crate::syntax::errors::ParseError;
use crate::syntax::tree::SyntaxTree;
use ast_grep_language::{LanguageExt, SupportLang};
use serde::{Deserialize, Serialize};
use tree_sitter::{InputEdit, Parser, Point};

/// Source dialect handled by the default parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    #[default]
    TypeScript,
    Tsx,
}

impl SourceLanguage {
    pub fn support_lang(self) -> SupportLang {
        match self {
            SourceLanguage::TypeScript => SupportLang::TypeScript,
            SourceLanguage::Tsx => SupportLang::Tsx,
        }
    }

    /// Default file extensions, without the leading dot.
    pub fn default_extensions(self) -> &'static [&'static str] {
        match self {
            SourceLanguage::TypeScript => &["ts", "mts", "cts"],
            SourceLanguage::Tsx => &["tsx"],
        }
    }
}

/// Prior state handed to the parser so it can reuse unchanged subtrees.
#[derive(Debug, Clone, Copy)]
pub struct Reparse<'a> {
    pub tree: &'a SyntaxTree,
    pub old_text: &'a str,
    /// Edits as returned by [`crate::edit::prepare`] (descending by start)
    pub edits: &'a [TextEdit],
}

/// The external compiler service: turns full text into a fresh tree.
///
/// Implementations must return a tree with a new [`TreeId`](super::TreeId) on every call,
/// even when reusing `previous`.
pub trait ParseService {
    fn parse(&mut self, text: &str, previous: Option<Reparse<'_>>) -> Result<SyntaxTree, ParseError>;
}

/// Tree-sitter backed parser for TypeScript and TSX.
pub struct TreeSitterParser {
    parser: Parser,
    language: SourceLanguage,
}

impl TreeSitterParser {
    pub fn new(language: SourceLanguage) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let ts_lang = language.support_lang().get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| ParseError::LanguageSet)?;
        Ok(Self { parser, language })
    }

    pub fn typescript() -> Result<Self, ParseError> {
        Self::new(SourceLanguage::TypeScript)
    }

    pub fn tsx() -> Result<Self, ParseError> {
        Self::new(SourceLanguage::Tsx)
    }

    pub fn language(&self) -> SourceLanguage {
        self.language
    }
}

impl ParseService for TreeSitterParser {
    fn parse(&mut self, text: &str, previous: Option<Reparse<'_>>) -> Result<SyntaxTree, ParseError> {
        let old_tree = previous.and_then(|prev| {
            let mut backing = prev.tree.backing()?.clone();
            // Descending order keeps each edit's old-text coordinates valid.
            for edit in prev.edits {
                backing.edit(&input_edit(prev.old_text, edit));
            }
            Some(backing)
        });

        let tree = self
            .parser
            .parse(text, old_tree.as_ref())
            .ok_or(ParseError::ParseFailed)?;
        tracing::trace!(
            language = ?self.language,
            incremental = old_tree.is_some(),
            bytes = text.len(),
            "parsed"
        );
        Ok(SyntaxTree::from_tree_sitter(tree))
    }
}

fn input_edit(old_text: &str, edit: &TextEdit) -> InputEdit {
    let start_position = point_at(old_text, edit.start);
    InputEdit {
        start_byte: edit.start,
        old_end_byte: edit.end,
        new_end_byte: edit.start + edit.new_text.len(),
        start_position,
        old_end_position: point_at(old_text, edit.end),
        new_end_position: advance(start_position, &edit.new_text),
    }
}

/// Row and byte column of `offset`.
pub(crate) fn point_at(text: &str, offset: usize) -> Point {
    let before = &text.as_bytes()[..offset];
    let row = before.iter().filter(|&&b| b == b'\n').count();
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl - 1,
        None => offset,
    };
    Point { row, column }
}

fn advance(start: Point, inserted: &str) -> Point {
    match inserted.rfind('\n') {
        Some(nl) => Point {
            row: start.row + inserted.matches('\n').count(),
            column: inserted.len() - nl - 1,
        },
        None => Point {
            row: start.row,
            column: start.column + inserted.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{apply_prepared, prepare};

    #[test]
    fn parse_valid_typescript() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let tree = parser
            .parse("function greet(name: string): string { return name; }", None)
            .unwrap();
        assert!(!tree.has_errors());
        assert_eq!(tree.node(0).kind, "program");
    }

    #[test]
    fn parse_invalid_typescript() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let tree = parser.parse("function greet( { }", None).unwrap();
        assert!(tree.has_errors());
        assert!(!tree.error_ranges().is_empty());
    }

    #[test]
    fn tsx_parses_jsx() {
        let mut parser = TreeSitterParser::tsx().unwrap();
        let tree = parser.parse("const el = <div>hi</div>;", None).unwrap();
        assert!(!tree.has_errors());
    }

    #[test]
    fn incremental_reparse_matches_full_parse() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let old_text = "const x = 1;\nconst y = 2;\n";
        let old = parser.parse(old_text, None).unwrap();

        let edits = prepare(
            vec![
                TextEdit::insert(0, "let z = 0;\n"),
                TextEdit::replace(23, 24, "42"),
            ],
            old_text,
        )
        .unwrap();
        let new_text = apply_prepared(old_text, &edits);
        assert_eq!(new_text, "let z = 0;\nconst x = 1;\nconst y = 42;\n");

        let incremental = parser
            .parse(
                &new_text,
                Some(Reparse {
                    tree: &old,
                    old_text,
                    edits: &edits,
                }),
            )
            .unwrap();
        let full = parser.parse(&new_text, None).unwrap();

        assert_ne!(incremental.id(), old.id());
        assert_eq!(incremental.nodes(), full.nodes());
    }

    #[test]
    fn points_count_rows_and_byte_columns() {
        let text = "ab\ncdé\nf";
        assert_eq!(point_at(text, 0), Point { row: 0, column: 0 });
        assert_eq!(point_at(text, 4), Point { row: 1, column: 1 });
        assert_eq!(point_at(text, 8), Point { row: 2, column: 0 });
        assert_eq!(
            advance(Point { row: 1, column: 4 }, "x\nyz"),
            Point { row: 2, column: 2 }
        );
    }
}
