use super::matcher::{find_in, PatternMatch};
use crate::edit::TextEdit;
use crate::error::Result;
use crate::kinds::SourceFile;
use std::collections::HashMap;
use tracing::info;

/// Substitute `$NAME` and `$$$NAME` in `template` with captured text.
///
/// Longer names are substituted first so `$AB` is not read as `$A` then `B`.
pub fn expand_template(template: &str, captures: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = captures.keys().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut result = template.to_string();
    for name in &names {
        result = result.replace(&format!("$$${name}"), &captures[*name]);
    }
    for name in &names {
        result = result.replace(&format!("${name}"), &captures[*name]);
    }
    result
}

/// Matches that do not sit inside an earlier match.
fn outermost(matches: Vec<PatternMatch>) -> Vec<PatternMatch> {
    let mut kept: Vec<PatternMatch> = Vec::with_capacity(matches.len());
    for m in matches {
        if kept.last().is_some_and(|last| m.range.start < last.range.end) {
            continue;
        }
        kept.push(m);
    }
    kept
}

/// Rewrite each outermost match of `pattern` with `template` in one transition.
pub(crate) fn replace_in(file: &SourceFile, pattern: &str, template: &str) -> Result<usize> {
    let mut matches = find_in(file, pattern)?;
    matches.sort_by_key(|m| (m.range.start, std::cmp::Reverse(m.range.end)));
    let edits: Vec<TextEdit> = outermost(matches)
        .iter()
        .map(|m| {
            TextEdit::replace(
                m.range.start,
                m.range.end,
                expand_template(template, &m.captures),
            )
        })
        .collect();
    let count = edits.len();
    if count > 0 {
        file.apply_edits(edits)?;
        info!(pattern, count, "replaced pattern matches");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MorphError;
    use crate::project::Project;

    #[test]
    fn variadic_placeholders_expand_before_single_ones() {
        let captures = HashMap::from([
            ("A".to_string(), "x".to_string()),
            ("AB".to_string(), "y, z".to_string()),
        ]);
        assert_eq!(expand_template("f($$$AB, $A)", &captures), "f(y, z, x)");
        assert_eq!(expand_template("$AB + $A", &captures), "y, z + x");
    }

    #[test]
    fn replacement_is_one_transition() {
        let project = Project::in_memory().unwrap();
        let file = project
            .create_source_file("/r.ts", "old(1);\nold(old(2));\nkeep(3);\n")
            .unwrap();
        let keep = file.statements().unwrap()[2].clone();

        let count = file.replace_pattern("old($X)", "renamed($X)").unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            file.full_text().unwrap(),
            "renamed(1);\nrenamed(old(2));\nkeep(3);\n"
        );
        assert!(!keep.was_forgotten());
        assert_eq!(keep.text().unwrap(), "keep(3);");
        assert_eq!(file.replace_pattern("missing($X)", "x").unwrap(), 0);
    }

    #[test]
    fn broken_templates_roll_back() {
        let project = Project::in_memory().unwrap();
        let file = project.create_source_file("/r.ts", "a(1);\na(2);\n").unwrap();
        let err = file.replace_pattern("a($X)", "a($X").unwrap_err();
        assert!(matches!(err, MorphError::SyntaxErrorIntroduced { .. }));
        assert_eq!(file.full_text().unwrap(), "a(1);\na(2);\n");
    }
}
