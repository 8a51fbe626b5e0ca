use super::project;
use std::cell::RefCell;
use std::rc::Rc;
use syntax_morph::{
    EditError, InMemoryFileSystem, InitializerExpressionableNode, ManipulationSettings,
    MorphError, NamedNode, ParseError, ParseService, PipelinePhase, Project, Reparse,
    SourceFile, SyntaxTree, TextEdit, TreeSitterParser,
};

/// Fails whenever the text contains `FAIL`.
struct FailingParser(TreeSitterParser);

impl ParseService for FailingParser {
    fn parse(&mut self, text: &str, previous: Option<Reparse<'_>>) -> Result<SyntaxTree, ParseError> {
        if text.contains("FAIL") {
            return Err(ParseError::Service {
                message: "refusing to parse".to_string(),
            });
        }
        self.0.parse(text, previous)
    }
}

/// Tries to edit its file from inside a reparse.
struct ReentrantParser {
    inner: TreeSitterParser,
    target: Rc<RefCell<Option<SourceFile>>>,
    seen: Rc<RefCell<Option<MorphError>>>,
}

impl ParseService for ReentrantParser {
    fn parse(&mut self, text: &str, previous: Option<Reparse<'_>>) -> Result<SyntaxTree, ParseError> {
        let target = self.target.borrow().clone();
        if let Some(file) = target {
            if let Err(err) = file.insert_text(0, "// nested\n") {
                *self.seen.borrow_mut() = Some(err);
            }
        }
        self.inner.parse(text, previous)
    }
}

fn failing_project() -> Project {
    Project::builder()
        .parser(FailingParser(TreeSitterParser::typescript().unwrap()))
        .file_system(InMemoryFileSystem::new())
        .build()
        .unwrap()
}

#[test]
fn batch_edits_apply_back_to_front() {
    let project = project();
    let text = "const a = 11;\nconst b = 2;\n";
    let file = project.create_source_file("/batch.ts", text).unwrap();
    let second = file.statements().unwrap()[1].clone();

    let edits = vec![TextEdit::replace(0, 5, "let"), TextEdit::replace(10, 12, "42")];
    let transition = file.apply_edits(edits).unwrap();

    let mut expected = text.to_string();
    expected.replace_range(10..12, "42");
    expected.replace_range(0..5, "let");
    assert_eq!(file.full_text().unwrap(), expected);
    assert_eq!(expected, "let a = 42;\nconst b = 2;\n");
    assert_eq!(transition.new_spans, vec![0..3, 8..10]);
    assert!(transition.remapped > 0);
    assert!(!second.was_forgotten());
    assert_eq!(second.text().unwrap(), "const b = 2;");
}

#[test]
fn parser_failure_rolls_back_the_whole_batch() {
    let project = failing_project();
    let text = "const a = 11;\nconst b = 2;\n";
    let file = project.create_source_file("/batch.ts", text).unwrap();
    let statements = file.statements().unwrap();
    let literal = file.first_descendant_by_kind_or_err("number").unwrap();
    let wrappers = project.wrapper_count();

    let edits = vec![TextEdit::replace(0, 5, "let"), TextEdit::replace(10, 12, "FAIL")];
    let err = file.apply_edits(edits).unwrap_err();
    assert!(matches!(err, MorphError::Parse(ParseError::Service { .. })));

    assert_eq!(file.full_text().unwrap(), text);
    assert_eq!(file.phase().unwrap(), PipelinePhase::Stable);
    assert_eq!(project.wrapper_count(), wrappers);
    assert_eq!(file.statements().unwrap(), statements);
    assert!(!literal.was_forgotten());
    assert_eq!(literal.text().unwrap(), "11");

    file.insert_text(0, "// ok\n").unwrap();
    assert_eq!(statements[1].text().unwrap(), "const b = 2;");
}

#[test]
fn range_errors_come_before_any_mutation() {
    let project = project();
    let file = project.create_source_file("/r.ts", "const a = 1;\n").unwrap();

    let overlap = file.apply_edits(vec![TextEdit::replace(0, 5, "let"), TextEdit::delete(3, 8)]);
    assert!(matches!(
        overlap,
        Err(MorphError::Edit(EditError::Overlapping { .. }))
    ));
    let out_of_bounds = file.remove_text(5, 100);
    assert!(matches!(
        out_of_bounds,
        Err(MorphError::Edit(EditError::InvalidRange { .. }))
    ));
    let unverified = file.apply_edits(vec![TextEdit::verified(0, 5, "let", "var  ")]);
    assert!(matches!(
        unverified,
        Err(MorphError::Edit(EditError::BeforeTextMismatch { .. }))
    ));
    assert_eq!(file.full_text().unwrap(), "const a = 1;\n");
    assert_eq!(file.phase().unwrap(), PipelinePhase::Stable);
}

#[test]
fn introduced_syntax_errors_are_rejected() {
    let project = project();
    let file = project.create_source_file("/s.ts", "const a = 1;\n").unwrap();
    let err = file.insert_text(13, "const (").unwrap_err();
    assert!(matches!(err, MorphError::SyntaxErrorIntroduced { .. }));
    assert_eq!(file.full_text().unwrap(), "const a = 1;\n");

    project.set_settings(ManipulationSettings {
        reject_syntax_errors: false,
        ..project.settings()
    });
    file.insert_text(13, "const (").unwrap();
    assert_eq!(file.full_text().unwrap(), "const a = 1;\nconst (");
}

#[test]
fn nested_manipulation_is_refused() {
    let target = Rc::new(RefCell::new(None));
    let seen = Rc::new(RefCell::new(None));
    let project = Project::builder()
        .parser(ReentrantParser {
            inner: TreeSitterParser::typescript().unwrap(),
            target: target.clone(),
            seen: seen.clone(),
        })
        .file_system(InMemoryFileSystem::new())
        .build()
        .unwrap();
    let file = project.create_source_file("/n.ts", "const a = 1;\n").unwrap();
    *target.borrow_mut() = Some(file.clone());

    file.insert_text(13, "const b = 2;\n").unwrap();
    target.borrow_mut().take();

    assert!(matches!(
        seen.borrow_mut().take(),
        Some(MorphError::ManipulationInProgress {
            phase: PipelinePhase::Editing,
            ..
        })
    ));
    assert_eq!(file.full_text().unwrap(), "const a = 1;\nconst b = 2;\n");
}

#[test]
fn edits_after_a_subtree_keep_its_wrapper() {
    let project = project();
    let file = project
        .create_source_file("/m.ts", "function f() {\n  return 1;\n}\nconst x = 1;\n")
        .unwrap();
    let f = file.function_or_err("f").unwrap();
    let ret = f.first_descendant_by_kind_or_err("return_statement").unwrap();
    let x = file.variable_declaration_or_err("x").unwrap();
    let old_value = x.initializer_or_err().unwrap();

    x.set_initializer("2").unwrap();

    assert!(!f.was_forgotten());
    assert_eq!(f.text().unwrap(), "function f() {\n  return 1;\n}");
    assert_eq!(ret.syntax_kind().unwrap(), "return_statement");
    assert_eq!(ret.text().unwrap(), "return 1;");
    assert!(!x.was_forgotten());
    assert_eq!(x.name().unwrap(), "x");
    assert!(old_value.was_forgotten());
    assert_eq!(x.initializer_or_err().unwrap().text().unwrap(), "2");
}

#[test]
fn overlapping_edits_forget_their_wrappers() {
    let project = project();
    let file = project
        .create_source_file("/o.ts", "const x = 1;\nconst y = 2;\nconst z = 3;\n")
        .unwrap();
    let statements = file.statements().unwrap();
    let y_name = file.variable_declaration_or_err("y").unwrap();

    // From inside `x` to inside `y`
    file.replace_text(6, 20, "w = 0;\nconst v").unwrap();
    assert_eq!(file.full_text().unwrap(), "const w = 0;\nconst v = 2;\nconst z = 3;\n");
    assert!(statements[0].was_forgotten());
    assert!(statements[1].was_forgotten());
    assert!(y_name.was_forgotten());
    assert!(!statements[2].was_forgotten());
    assert_eq!(statements[2].text().unwrap(), "const z = 3;");
}

#[test]
fn tokens_touching_an_insertion_never_change_text() {
    let project = project();
    let file = project.create_source_file("/call.ts", "foo(a);\n").unwrap();
    let args = file.first_descendant_by_kind_or_err("arguments").unwrap();
    let arg = args.first_descendant_by_kind_or_err("identifier").unwrap();
    let callee = file.first_descendant_by_kind_or_err("identifier").unwrap();
    assert_eq!(arg.text().unwrap(), "a");
    assert_eq!(callee.text().unwrap(), "foo");

    file.insert_text(5, "b").unwrap();

    assert_eq!(file.full_text().unwrap(), "foo(ab);\n");
    assert!(arg.was_forgotten());
    assert!(matches!(arg.text(), Err(MorphError::ForgottenNode { .. })));
    assert!(!args.was_forgotten());
    assert_eq!(args.text().unwrap(), "(ab)");
    assert!(!callee.was_forgotten());
    assert_eq!(callee.text().unwrap(), "foo");

    let fresh = args.first_descendant_by_kind_or_err("identifier").unwrap();
    assert_eq!(fresh.text().unwrap(), "ab");
    assert_ne!(fresh, arg);
}

#[test]
fn inserting_a_statement_keeps_existing_wrappers() {
    let project = project();
    let file = project
        .create_source_file("/scenario.ts", "const x = 1;\nconst y = 2;")
        .unwrap();
    let x = file.statements().unwrap()[0].clone();
    let y = file.statements().unwrap()[1].clone();
    let root = project.source_file("/scenario.ts").unwrap();

    file.insert_text(0, "const z = 0;\n").unwrap();

    assert_eq!(file.full_text().unwrap(), "const z = 0;\nconst x = 1;\nconst y = 2;");
    let statements = file.statements().unwrap();
    let texts: Vec<String> = statements.iter().map(|s| s.text().unwrap()).collect();
    assert_eq!(texts, ["const z = 0;", "const x = 1;", "const y = 2;"]);
    assert!(!y.was_forgotten());
    assert_eq!(y.text().unwrap(), "const y = 2;");
    assert_eq!(statements[2], y);
    assert_eq!(statements[1], x);
    assert!(!root.was_forgotten());
    assert_eq!(project.source_file("/scenario.ts").unwrap(), root);
    assert_eq!(root, file);
}

#[test]
fn removed_statements_never_report_old_text() {
    let project = project();
    let file = project
        .create_source_file("/gone.ts", "const x = 1;\nconst y = 2;\n")
        .unwrap();
    let x = file.statements().unwrap()[0].clone();
    let x_decl = file.variable_declaration_or_err("x").unwrap();

    x.remove().unwrap();

    assert_eq!(file.full_text().unwrap(), "const y = 2;\n");
    assert!(x.was_forgotten());
    assert!(matches!(x.text(), Err(MorphError::ForgottenNode { .. })));
    assert!(matches!(x_decl.name(), Err(MorphError::ForgottenNode { .. })));
    assert!(matches!(x.remove(), Err(MorphError::ForgottenNode { .. })));
}
