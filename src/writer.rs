//! A stateful text builder for generated source.
//!
//! [`CodeWriter`] keeps written text as a list of segments and tracks the current
//! indentation level plus whether the last character written sits inside a string
//! literal or a comment. Indentation is added at the start of every non-empty line
//! except lines that continue a template literal. The punctuation helpers
//! ([`quote`](CodeWriter::quote), [`block`](CodeWriter::block),
//! [`inline_block`](CodeWriter::inline_block)) write their text verbatim while the
//! writer is inside a string or comment.

use crate::config::ManipulationSettings;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    LineComment,
    BlockComment,
    Str { quote: char, escaped: bool },
}

#[derive(Debug, Clone)]
pub struct CodeWriter {
    segments: Vec<String>,
    len: usize,
    unit: &'static str,
    newline: &'static str,
    quote_char: char,
    base_indent: String,
    level: usize,
    at_line_start: bool,
    newline_on_next_write: bool,
    lexical: Lexical,
    previous: Option<char>,
}

impl CodeWriter {
    pub fn new(settings: &ManipulationSettings) -> Self {
        CodeWriter {
            segments: Vec::new(),
            len: 0,
            unit: settings.indentation.as_str(),
            newline: settings.new_line.as_str(),
            quote_char: settings.quote_kind.as_char(),
            base_indent: String::new(),
            level: 0,
            at_line_start: true,
            newline_on_next_write: false,
            lexical: Lexical::Code,
            previous: None,
        }
    }

    /// Prefix every line with `indent` in addition to the writer's own levels.
    pub fn with_base_indent(mut self, indent: &str) -> Self {
        self.base_indent = indent.to_string();
        self
    }

    pub fn indentation_level(&self) -> usize {
        self.level
    }

    pub fn set_indentation_level(&mut self, level: usize) -> &mut Self {
        self.level = level;
        self
    }

    /// Write `text`, indenting each line it starts.
    pub fn write(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        if !text.starts_with('\n') && !text.starts_with("\r\n") {
            self.flush_pending_newline();
        }
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.push_newline();
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            if self.at_line_start && !self.in_template() {
                self.push_indent();
            }
            self.push(line);
        }
        self
    }

    /// Write `text` on a line of its own.
    pub fn write_line(&mut self, text: &str) -> &mut Self {
        self.flush_pending_newline();
        self.newline_if_last_not();
        self.write(text);
        self.newline()
    }

    pub fn newline(&mut self) -> &mut Self {
        self.newline_on_next_write = false;
        self.push_newline();
        self
    }

    /// Start a new line unless already at one. A no-op on an empty writer.
    pub fn newline_if_last_not(&mut self) -> &mut Self {
        self.flush_pending_newline();
        if self.len > 0 && !self.is_last_newline() {
            self.newline();
        }
        self
    }

    pub fn blank_line(&mut self) -> &mut Self {
        self.newline_if_last_not();
        self.newline()
    }

    pub fn blank_line_if_last_not(&mut self) -> &mut Self {
        if !self.is_last_blank_line() {
            self.blank_line();
        }
        self
    }

    pub fn space(&mut self) -> &mut Self {
        self.write(" ")
    }

    pub fn space_if_last_not(&mut self) -> &mut Self {
        if !self.is_last_space() {
            self.space();
        }
        self
    }

    pub fn conditional_write(&mut self, condition: bool, text: &str) -> &mut Self {
        if condition {
            self.write(text);
        }
        self
    }

    pub fn conditional_write_line(&mut self, condition: bool, text: &str) -> &mut Self {
        if condition {
            self.write_line(text);
        }
        self
    }

    /// Write `text` as a string literal in the configured quote style.
    pub fn quote(&mut self, text: &str) -> &mut Self {
        if self.is_in_string() || self.is_in_comment() {
            return self.write(text);
        }
        let q = self.quote_char;
        let mut literal = String::with_capacity(text.len() + 2);
        literal.push(q);
        for c in text.chars() {
            match c {
                '\\' => literal.push_str("\\\\"),
                '\n' => literal.push_str("\\n"),
                '\r' => literal.push_str("\\r"),
                '\t' => literal.push_str("\\t"),
                c if c == q => {
                    literal.push('\\');
                    literal.push(c);
                }
                c => literal.push(c),
            }
        }
        literal.push(q);
        self.write(&literal)
    }

    /// Run `f` one indentation level deeper, on its own lines.
    pub fn indent(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.newline_if_last_not();
        self.level += 1;
        f(self);
        self.newline_if_last_not();
        self.level -= 1;
        self
    }

    /// ` {`, the indented contents of `f`, then `}`; the next write starts a new line.
    pub fn block(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        if self.is_in_string() || self.is_in_comment() {
            f(self);
            return self;
        }
        self.flush_pending_newline();
        if self.len > 0 && !self.is_last_newline() {
            self.space_if_last_not();
        }
        self.braced(f);
        self.newline_on_next_write = true;
        self
    }

    /// `{`, the indented contents of `f`, then `}` with the line left open, for `f({ ... })`.
    pub fn inline_block(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        if self.is_in_string() || self.is_in_comment() {
            f(self);
            return self;
        }
        self.flush_pending_newline();
        self.braced(f)
    }

    fn braced(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.write("{");
        self.newline();
        self.level += 1;
        f(self);
        self.newline_if_last_not();
        self.level -= 1;
        self.write("}")
    }

    pub fn is_in_string(&self) -> bool {
        matches!(self.lexical, Lexical::Str { .. })
    }

    pub fn is_in_comment(&self) -> bool {
        matches!(self.lexical, Lexical::LineComment | Lexical::BlockComment)
    }

    pub fn is_at_start_of_first_line(&self) -> bool {
        self.len == 0
    }

    pub fn last_char(&self) -> Option<char> {
        self.tail().next()
    }

    pub fn is_last_newline(&self) -> bool {
        self.last_char() == Some('\n')
    }

    pub fn is_last_space(&self) -> bool {
        self.last_char() == Some(' ')
    }

    fn is_last_blank_line(&self) -> bool {
        let mut newlines = 0;
        for c in self.tail() {
            match c {
                '\n' => newlines += 1,
                '\r' => {}
                _ => break,
            }
            if newlines == 2 {
                return true;
            }
        }
        false
    }

    fn tail(&self) -> impl Iterator<Item = char> + '_ {
        self.segments.iter().rev().flat_map(|s| s.chars().rev())
    }

    fn in_template(&self) -> bool {
        matches!(self.lexical, Lexical::Str { quote: '`', .. })
    }

    fn flush_pending_newline(&mut self) {
        if self.newline_on_next_write {
            self.newline_on_next_write = false;
            if !self.is_last_newline() {
                self.push_newline();
            }
        }
    }

    fn push_indent(&mut self) {
        let mut indent = self.base_indent.clone();
        for _ in 0..self.level {
            indent.push_str(self.unit);
        }
        if !indent.is_empty() {
            self.len += indent.len();
            self.segments.push(indent);
        }
        self.at_line_start = false;
    }

    fn push_newline(&mut self) {
        self.track('\n');
        self.len += self.newline.len();
        self.segments.push(self.newline.to_string());
        self.at_line_start = true;
    }

    fn push(&mut self, text: &str) {
        for c in text.chars() {
            self.track(c);
        }
        self.len += text.len();
        self.segments.push(text.to_string());
        self.at_line_start = false;
    }

    fn track(&mut self, c: char) {
        let previous = self.previous;
        self.previous = Some(c);
        self.lexical = match self.lexical {
            Lexical::Code => match c {
                '/' if previous == Some('/') => Lexical::LineComment,
                '*' if previous == Some('/') => {
                    // `/*/` does not close the comment it opens
                    self.previous = None;
                    Lexical::BlockComment
                }
                '"' | '\'' | '`' => Lexical::Str {
                    quote: c,
                    escaped: false,
                },
                _ => Lexical::Code,
            },
            Lexical::LineComment if c == '\n' => Lexical::Code,
            Lexical::BlockComment if c == '/' && previous == Some('*') => {
                self.previous = None;
                Lexical::Code
            }
            Lexical::Str { quote, escaped } => {
                if escaped {
                    Lexical::Str {
                        quote,
                        escaped: false,
                    }
                } else if c == '\\' {
                    Lexical::Str {
                        quote,
                        escaped: true,
                    }
                } else if c == quote || (c == '\n' && quote != '`') {
                    self.previous = None;
                    Lexical::Code
                } else {
                    self.lexical
                }
            }
            other => other,
        };
    }
}

impl fmt::Display for CodeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndentationText, NewLineKind, QuoteKind};
    use proptest::prelude::*;

    fn writer() -> CodeWriter {
        CodeWriter::new(&ManipulationSettings {
            indentation: IndentationText::TwoSpaces,
            ..Default::default()
        })
    }

    #[test]
    fn blocks_indent_their_contents() {
        let mut w = writer();
        w.write("class A").block(|w| {
            w.write("run()").block(|w| {
                w.write_line("go();");
            });
        });
        w.write("export { A };");
        assert_eq!(w.to_string(), "class A {\n  run() {\n    go();\n  }\n}\nexport { A };");
    }

    #[test]
    fn inline_block_keeps_the_line_open() {
        let mut w = writer();
        w.write("f(").inline_block(|w| {
            w.write("a: 1,");
        });
        w.write(");");
        assert_eq!(w.to_string(), "f({\n  a: 1,\n});");
    }

    #[test]
    fn template_continuation_lines_are_not_indented() {
        let mut w = writer();
        w.indent(|w| {
            w.write("const s = `a\nb`;\nnext();");
        });
        assert_eq!(w.to_string(), "  const s = `a\nb`;\n  next();\n");
        assert!(!w.is_in_string());
    }

    #[test]
    fn helpers_are_inert_in_strings_and_comments() {
        let mut w = writer();
        w.write("// see ");
        assert!(w.is_in_comment());
        w.quote("x").block(|w| {
            w.write("y");
        });
        assert_eq!(w.to_string(), "// see xy");
        w.newline();
        assert!(!w.is_in_comment());

        w.write("const s = 'it");
        assert!(w.is_in_string());
        w.quote("s").write("';");
        assert!(!w.is_in_string());
        assert!(w.to_string().ends_with("const s = 'its';"));
    }

    #[test]
    fn quotes_follow_settings_and_escape() {
        let mut w = CodeWriter::new(&ManipulationSettings {
            quote_kind: QuoteKind::Single,
            new_line: NewLineKind::CrLf,
            ..Default::default()
        });
        w.quote("it's").write_line(";");
        assert_eq!(w.to_string(), "'it\\'s'\r\n;\r\n");
        assert!(!w.is_in_string());
    }

    #[test]
    fn line_state_queries() {
        let mut w = writer().with_base_indent("    ");
        assert!(w.is_at_start_of_first_line());
        w.newline_if_last_not();
        assert!(w.is_at_start_of_first_line());
        w.write("a").space_if_last_not().space_if_last_not();
        assert!(w.is_last_space());
        w.blank_line_if_last_not().blank_line_if_last_not();
        w.conditional_write(false, "no").conditional_write_line(true, "b");
        assert_eq!(w.last_char(), Some('\n'));
        assert_eq!(w.to_string(), "    a \n\n    b\n");

        w.set_indentation_level(2);
        w.write("c");
        assert_eq!(w.indentation_level(), 2);
        assert!(w.to_string().ends_with("\n        c"));
    }

    #[test]
    fn block_comments_close() {
        let mut w = writer();
        w.write("/*/ still */");
        assert!(!w.is_in_comment());
        w.write(" /* open");
        assert!(w.is_in_comment());
    }

    proptest! {
        #[test]
        fn indented_lines_carry_the_unit(lines in proptest::collection::vec("[a-z;() ]{1,12}", 1..8)) {
            let mut w = writer();
            w.indent(|w| {
                for line in &lines {
                    w.write_line(line.trim_end());
                }
            });
            let text = w.to_string();
            for line in text.lines().filter(|l| !l.is_empty()) {
                prop_assert!(line.starts_with("  "), "{line:?}");
            }
        }

        #[test]
        fn quoted_text_leaves_code_state(text in "\\PC{0,24}") {
            let mut w = writer();
            w.write("f(").quote(&text).write(")");
            prop_assert!(!w.is_in_string());
            prop_assert!(!w.is_in_comment());
        }
    }
}
