//! Syntax validation over lowered trees.
//!
//! After an edit the file is reparsed; if the new tree has ERROR or MISSING nodes that
//! were not already present (at their shifted position) in the old tree, the edit is
//! considered to have broken the file and is rolled back.

use crate::edit::{shift_range, TextEdit};
use crate::syntax::parser::point_at;
use crate::syntax::tree::SyntaxTree;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

/// Location of an error node in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    pub byte_start: usize,
    pub byte_end: usize,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} near `{}`", self.line, self.column, self.context)
    }
}

/// Every ERROR and MISSING node in `tree`, with line/column and a little context.
pub fn collect_errors(tree: &SyntaxTree, text: &str) -> Vec<ErrorLocation> {
    tree.error_ranges()
        .into_iter()
        .map(|range| locate(text, range))
        .collect()
}

/// Errors in `new_tree` that are not the image of an error already in `old_tree`.
///
/// `edits` is the prepared batch that turned the old text into `new_text`.
pub fn introduced_errors(
    old_tree: &SyntaxTree,
    edits: &[TextEdit],
    new_tree: &SyntaxTree,
    new_text: &str,
) -> Vec<ErrorLocation> {
    if !new_tree.has_errors() {
        return Vec::new();
    }

    let existing: HashSet<(usize, usize)> = old_tree
        .error_ranges()
        .iter()
        .filter_map(|range| shift_range(range, edits))
        .map(|r| (r.start, r.end))
        .collect();

    new_tree
        .error_ranges()
        .into_iter()
        .filter(|r| !existing.contains(&(r.start, r.end)))
        .map(|range| locate(new_text, range))
        .collect()
}

fn locate(text: &str, range: Range<usize>) -> ErrorLocation {
    let point = point_at(text, range.start);

    // Up to 20 bytes either side, widened to char boundaries
    let mut context_start = range.start.saturating_sub(20);
    while !text.is_char_boundary(context_start) {
        context_start -= 1;
    }
    let mut context_end = (range.end + 20).min(text.len());
    while !text.is_char_boundary(context_end) {
        context_end += 1;
    }

    ErrorLocation {
        byte_start: range.start,
        byte_end: range.end,
        line: point.row + 1,
        column: point.column + 1,
        context: text[context_start..context_end].replace('\n', "\\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{apply_prepared, prepare};
    use crate::syntax::{ParseService, TreeSitterParser};

    fn reparse(old_text: &str, edits: Vec<TextEdit>) -> Vec<ErrorLocation> {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let old = parser.parse(old_text, None).unwrap();
        let prepared = prepare(edits, old_text).unwrap();
        let new_text = apply_prepared(old_text, &prepared);
        let new = parser.parse(&new_text, None).unwrap();
        introduced_errors(&old, &prepared, &new, &new_text)
    }

    #[test]
    fn valid_source_has_no_errors() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let text = "const a: number = 1;\n";
        let tree = parser.parse(text, None).unwrap();
        assert!(collect_errors(&tree, text).is_empty());
    }

    #[test]
    fn broken_source_reports_line_and_column() {
        let mut parser = TreeSitterParser::typescript().unwrap();
        let text = "const a = 1;\nfunction f( {\n";
        let tree = parser.parse(text, None).unwrap();
        let errors = collect_errors(&tree, text);
        assert!(!errors.is_empty());
        assert!(errors.iter().all(|e| e.line >= 1));
    }

    #[test]
    fn edit_introducing_error_is_reported() {
        let errors = reparse("let x = 1;\n", vec![TextEdit::replace(8, 9, "")]);
        assert!(!errors.is_empty());
    }

    #[test]
    fn edit_keeping_valid_syntax_is_clean() {
        let errors = reparse("let x = 1;\n", vec![TextEdit::replace(8, 9, "2 + 3")]);
        assert!(errors.is_empty());
    }

    #[test]
    fn pre_existing_error_is_not_blamed_on_unrelated_edit() {
        let text = "let a = 1;\nlet b = ;\n";
        let errors = reparse(text, vec![TextEdit::replace(8, 9, "100")]);
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }
}
