//! Where generated text goes: block members, comma-list elements and leading
//! modifier keywords. Everything here only computes [`TextEdit`]s.

use crate::config::ManipulationSettings;
use crate::edit::TextEdit;
use crate::layout;
use crate::node::View;
use std::ops::Range;

/// Canonical order of leading keywords on declarations and class members.
const MODIFIER_ORDER: &[&str] = &[
    "export",
    "default",
    "declare",
    "accessibility_modifier",
    "abstract",
    "static",
    "override_modifier",
    "readonly",
    "accessor",
    "async",
];

/// Member spans of a block; class members start at their first decorator.
pub(crate) fn member_spans(block: &View<'_>) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pending: Option<usize> = None;
    for child in block.elements() {
        if child.kind() == "decorator" {
            pending.get_or_insert(child.start());
            continue;
        }
        spans.push(pending.take().unwrap_or(child.start())..child.end());
    }
    spans
}

/// Insert `snippet` (lines indented relative to column zero) as member `index` of
/// `block`. An index past the end appends.
pub(crate) fn insert_into_block(
    block: &View<'_>,
    index: usize,
    snippet: &str,
    settings: &ManipulationSettings,
) -> TextEdit {
    let text = block.text;
    let newline = settings.new_line.as_str();
    let members = member_spans(block);
    let is_program = block.kind() == "program";
    let base_indent = if is_program { "" } else { block.line_indent() };

    let indent = match members.first() {
        Some(first) if layout::starts_line(text, first.start) => {
            layout::indentation_at(text, first.start).to_string()
        }
        _ if is_program => String::new(),
        _ => format!("{base_indent}{}", settings.indentation.as_str()),
    };
    let body = format!(
        "{indent}{}",
        layout::indent_continuation_lines(snippet.trim(), &indent, newline)
    );

    if let Some(member) = members.get(index) {
        if layout::starts_line(text, member.start) {
            return TextEdit::insert(
                layout::line_start(text, member.start),
                format!("{body}{newline}"),
            );
        }
        return TextEdit::insert(member.start, format!("{} ", body.trim_start()));
    }

    let open_end = block.token("{").map(|t| t.end());
    match block.token("}").map(|t| t.start()) {
        Some(close)
            if layout::starts_line(text, close)
                && open_end.map_or(true, |open| layout::line_start(text, close) > open) =>
        {
            TextEdit::insert(layout::line_start(text, close), format!("{body}{newline}"))
        }
        Some(close) => {
            // `{}` or a one-line block: break it open
            let floor = open_end.unwrap_or(block.start());
            let trimmed = text[floor..close].trim_end_matches([' ', '\t']).len();
            TextEdit::replace(
                floor + trimmed,
                close,
                format!("{newline}{body}{newline}{base_indent}"),
            )
        }
        None if text.trim().is_empty() => {
            TextEdit::replace(0, text.len(), format!("{body}{newline}"))
        }
        None if text.ends_with('\n') => TextEdit::insert(text.len(), format!("{body}{newline}")),
        None => TextEdit::insert(text.len(), format!("{newline}{body}")),
    }
}

/// Replace everything between a block's braces with `snippet`.
pub(crate) fn replace_block_body(
    block: &View<'_>,
    snippet: &str,
    settings: &ManipulationSettings,
) -> Option<TextEdit> {
    let open = block.token("{")?.end();
    let close = block.token("}")?.start();
    let snippet = snippet.trim();
    if snippet.is_empty() {
        return Some(TextEdit::replace(open, close, ""));
    }
    let newline = settings.new_line.as_str();
    let base_indent = block.line_indent();
    let indent = format!("{base_indent}{}", settings.indentation.as_str());
    let body = layout::indent_continuation_lines(snippet, &indent, newline);
    Some(TextEdit::replace(
        open,
        close,
        format!("{newline}{indent}{body}{newline}{base_indent}"),
    ))
}

/// Insert `item` as element `index` of a comma-separated list.
pub(crate) fn insert_into_list(
    list: &View<'_>,
    index: usize,
    item: &str,
    settings: &ManipulationSettings,
) -> TextEdit {
    let text = list.text;
    let elements: Vec<View<'_>> = list.elements().collect();

    let Some(first) = elements.first() else {
        let after_open = list
            .children()
            .next()
            .filter(|c| !c.data().named)
            .map_or(list.start(), |open| open.end());
        return TextEdit::insert(after_open, item);
    };

    let multiline = elements
        .get(1)
        .map_or(layout::starts_line(text, first.start()), |second| {
            layout::starts_line(text, second.start())
        });
    let separator = if multiline {
        format!(
            ",{}{}",
            settings.new_line.as_str(),
            layout::indentation_at(text, first.start())
        )
    } else {
        ", ".to_string()
    };

    if index == 0 {
        TextEdit::insert(first.start(), format!("{item}{separator}"))
    } else {
        let previous = &elements[index.min(elements.len()) - 1];
        TextEdit::insert(previous.end(), format!("{separator}{item}"))
    }
}

/// Offset at which `modifier` belongs among `node`'s leading keywords.
pub(crate) fn modifier_offset(node: &View<'_>, modifier: &str) -> usize {
    let rank = MODIFIER_ORDER
        .iter()
        .position(|m| *m == modifier)
        .unwrap_or(MODIFIER_ORDER.len());
    for child in node.children() {
        if child.kind() == "decorator" || child.data().is_comment() {
            continue;
        }
        match MODIFIER_ORDER.iter().position(|m| *m == child.kind()) {
            Some(r) if r < rank => continue,
            _ => return child.start(),
        }
    }
    node.start()
}

pub(crate) fn insert_modifier(node: &View<'_>, modifier: &str) -> TextEdit {
    TextEdit::insert(modifier_offset(node, modifier), format!("{modifier} "))
}

/// Delete a token plus the spaces after it.
pub(crate) fn remove_token(token: &View<'_>) -> TextEdit {
    TextEdit::delete(token.start(), layout::skip_inline_space(token.text, token.end()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{apply_prepared, prepare};
    use crate::registry::FileId;
    use crate::syntax::{ParseService, SyntaxTree, TreeSitterParser};

    fn parse(text: &str) -> SyntaxTree {
        TreeSitterParser::typescript().unwrap().parse(text, None).unwrap()
    }

    fn first_of<'a>(tree: &'a SyntaxTree, text: &'a str, kind: &str) -> View<'a> {
        let index = (0..tree.len()).find(|&i| tree.node(i).kind == kind).unwrap();
        View {
            file: FileId(0),
            tree,
            text,
            index,
        }
    }

    fn apply(text: &str, edit: TextEdit) -> String {
        apply_prepared(text, &prepare(vec![edit], text).unwrap())
    }

    fn two_spaces() -> ManipulationSettings {
        ManipulationSettings {
            indentation: crate::config::IndentationText::TwoSpaces,
            ..Default::default()
        }
    }

    #[test]
    fn appends_into_empty_block() {
        let text = "function f() {}\n";
        let tree = parse(text);
        let block = first_of(&tree, text, "statement_block");
        let edit = insert_into_block(&block, 0, "a();\nb();", &two_spaces());
        assert_eq!(apply(text, edit), "function f() {\n  a();\n  b();\n}\n");
    }

    #[test]
    fn inserts_between_members_at_their_indentation() {
        let text = "class A {\n    x = 1;\n    y = 2;\n}\n";
        let tree = parse(text);
        let body = first_of(&tree, text, "class_body");
        let edit = insert_into_block(&body, 1, "z = 3;", &two_spaces());
        assert_eq!(apply(text, edit), "class A {\n    x = 1;\n    z = 3;\n    y = 2;\n}\n");

        let edit = insert_into_block(&body, 9, "w = 4;", &two_spaces());
        assert_eq!(apply(text, edit), "class A {\n    x = 1;\n    y = 2;\n    w = 4;\n}\n");
    }

    #[test]
    fn appends_to_program() {
        let text = "const x = 1;";
        let tree = parse(text);
        let root = first_of(&tree, text, "program");
        let edit = insert_into_block(&root, 5, "const y = 2;", &ManipulationSettings::default());
        assert_eq!(apply(text, edit), "const x = 1;\nconst y = 2;");

        let edit = insert_into_block(&root, 0, "const z = 0;", &ManipulationSettings::default());
        assert_eq!(apply(text, edit), "const z = 0;\nconst x = 1;");
    }

    #[test]
    fn replaces_body() {
        let text = "class A {\n  run() { old(); }\n}\n";
        let tree = parse(text);
        let block = first_of(&tree, text, "statement_block");
        let edit = replace_block_body(&block, "one();\ntwo();", &two_spaces()).unwrap();
        assert_eq!(
            apply(text, edit),
            "class A {\n  run() {\n    one();\n    two();\n  }\n}\n"
        );
    }

    #[test]
    fn list_insertion_positions() {
        let text = "function f(a, c) {}";
        let tree = parse(text);
        let params = first_of(&tree, text, "formal_parameters");
        let settings = ManipulationSettings::default();
        assert_eq!(
            apply(text, insert_into_list(&params, 1, "b", &settings)),
            "function f(a, b, c) {}"
        );
        assert_eq!(
            apply(text, insert_into_list(&params, 0, "z", &settings)),
            "function f(z, a, c) {}"
        );

        let text = "function g() {}";
        let tree = parse(text);
        let params = first_of(&tree, text, "formal_parameters");
        assert_eq!(
            apply(text, insert_into_list(&params, 0, "x: number", &settings)),
            "function g(x: number) {}"
        );
    }

    #[test]
    fn modifiers_follow_canonical_order() {
        let text = "class A {\n  static async run() {}\n  value = 1;\n}\n";
        let tree = parse(text);
        let method = first_of(&tree, text, "method_definition");
        assert_eq!(
            apply(text, insert_modifier(&method, "readonly")),
            "class A {\n  static readonly async run() {}\n  value = 1;\n}\n"
        );
        let field = first_of(&tree, text, "public_field_definition");
        assert_eq!(
            apply(text, insert_modifier(&field, "static")),
            "class A {\n  static async run() {}\n  static value = 1;\n}\n"
        );
        let static_token = method.token("static").unwrap();
        assert_eq!(
            apply(text, remove_token(&static_token)),
            "class A {\n  async run() {}\n  value = 1;\n}\n"
        );
    }
}
