use super::lang::support_lang;
use crate::cache;
use crate::error::{MorphError, Result};
use crate::kinds::SourceFile;
use crate::node::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, NodeMatch};
use ast_grep_language::SupportLang;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

/// One match of a pattern with its captured metavariables.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    /// The project node the pattern matched
    pub node: Node,
    pub range: Range<usize>,
    pub text: String,
    /// Metavariable name (without `$`) to captured text; a `$$$` capture spans its nodes
    pub captures: HashMap<String, String>,
}

impl PatternMatch {
    pub fn capture(&self, name: &str) -> Result<&str> {
        self.captures
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                super::AstGrepError::MetavarNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }
}

/// Every match of `pattern` in `file`, in document order. Matches nested inside
/// an earlier match are included.
pub(crate) fn find_in(file: &SourceFile, pattern: &str) -> Result<Vec<PatternMatch>> {
    let lang = support_lang(file.project().language());
    let compiled = cache::get_or_compile_pattern(pattern, lang)?;
    let text = file.full_text()?;
    let grep = AstGrep::new(text.as_str(), lang);
    let id = file.file_id()?;

    let names = metavariables(pattern);
    let mut matches = Vec::new();
    for m in grep.root().find_all(&compiled) {
        let (range, kind, captures) = parts(&m, &text, &names);
        let node = file
            .find_in_span(id, &range, |d| d.range == range && d.kind == kind)?
            .ok_or_else(|| MorphError::not_found(format!("`{kind}` node at {range:?}")))?;
        matches.push(PatternMatch {
            node,
            text: text[range.clone()].to_string(),
            range,
            captures,
        });
    }
    debug!(pattern, count = matches.len(), "pattern search");
    Ok(matches)
}

/// Metavariable names in `pattern`, `$$$` ones flagged.
fn metavariables(pattern: &str) -> Vec<(String, bool)> {
    let mut names = Vec::new();
    let mut rest = pattern;
    while let Some(at) = rest.find('$') {
        rest = &rest[at..];
        let variadic = rest.starts_with("$$$");
        rest = rest.trim_start_matches('$');
        let end = rest
            .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
            .unwrap_or(rest.len());
        if end > 0 && !names.iter().any(|(n, _)| n == &rest[..end]) {
            names.push((rest[..end].to_string(), variadic));
        }
        rest = &rest[end..];
    }
    names
}

fn parts(
    m: &NodeMatch<StrDoc<SupportLang>>,
    text: &str,
    names: &[(String, bool)],
) -> (Range<usize>, String, HashMap<String, String>) {
    let node = m.get_node();
    let env = m.get_env();
    let mut captures = HashMap::new();
    for (name, variadic) in names {
        let captured = if *variadic {
            let nodes = env.get_multiple_matches(name);
            match (nodes.first(), nodes.last()) {
                (Some(first), Some(last)) => text[first.range().start..last.range().end].to_string(),
                _ => String::new(),
            }
        } else {
            match env.get_match(name) {
                Some(single) => single.text().to_string(),
                None => continue,
            }
        };
        captures.insert(name.clone(), captured);
    }
    (node.range(), node.kind().to_string(), captures)
}
