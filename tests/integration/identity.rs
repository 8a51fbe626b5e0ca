use super::project;
use syntax_morph::{
    Capability, ExportableNode, FunctionDeclaration, MorphError, NamedNode, Node,
    ParameteredNode, Project, SourceFile, WrapperKind,
};

const SOURCE: &str = "export function area(w: number, h: number) {\n  return w * h;\n}\nconst unit = 1;\n";

fn file(project: &Project) -> SourceFile {
    project.create_source_file("/shapes.ts", SOURCE).unwrap()
}

#[test]
fn repeated_queries_return_the_same_wrapper() {
    let project = project();
    let file = file(&project);

    let by_lookup = file.function_or_err("area").unwrap();
    let by_list = file.functions().unwrap().remove(0);
    let by_kind = file
        .first_descendant_by_kind_or_err("function_declaration")
        .unwrap();
    assert_eq!(by_lookup, by_list);
    assert_eq!(*by_lookup, by_kind);
    assert_eq!(by_lookup.id(), by_kind.id());

    let param = by_lookup.parameter_or_err("h").unwrap();
    let parent = param.parent_or_err().unwrap().parent_or_err().unwrap();
    assert_eq!(parent, by_kind);
    assert_eq!(param.source_file().unwrap(), file);
}

#[test]
fn unknown_syntax_kinds_get_generic_wrappers() {
    let project = project();
    let file = project
        .create_source_file("/g.ts", "label: for (;;) { break label; }\n")
        .unwrap();
    let statement = &file.statements().unwrap()[0];
    assert_eq!(statement.kind(), WrapperKind::Generic);
    assert_eq!(statement.syntax_kind().unwrap(), "labeled_statement");
    assert!(statement.cast::<FunctionDeclaration>().is_none());
    assert!(matches!(
        statement.cast_or_err::<FunctionDeclaration>(),
        Err(MorphError::UnexpectedKind { .. })
    ));
}

#[test]
fn kinds_expose_their_capabilities() {
    assert!(WrapperKind::FunctionDeclaration.has_capability(Capability::Async));
    assert!(WrapperKind::ClassDeclaration.has_capability(Capability::Decoratable));
    assert!(!WrapperKind::TypeAliasDeclaration.has_capability(Capability::Async));
    assert!(WrapperKind::Generic.capabilities().is_empty());
    assert_eq!(
        WrapperKind::from_syntax_kind("generator_function_declaration"),
        WrapperKind::FunctionDeclaration
    );
}

#[test]
fn projects_do_not_share_wrappers() {
    let first = project();
    let second = project();
    let a = file(&first).function_or_err("area").unwrap();
    let b = file(&second).function_or_err("area").unwrap();
    assert_ne!(a, b);

    b.set_name("volume").unwrap();
    assert_eq!(a.name().unwrap(), "area");
    assert_eq!(b.name().unwrap(), "volume");
    assert!(a.is_exported().unwrap());
}

#[test]
fn forgetting_is_transitive_and_idempotent() {
    let project = project();
    let file = file(&project);
    let area = file.function_or_err("area").unwrap();
    let param = area.parameter_or_err("w").unwrap();
    let body_return = area.first_descendant_by_kind_or_err("return_statement").unwrap();
    let unit: Node = file.statements().unwrap()[1].clone();

    area.forget();
    area.forget();
    assert!(area.was_forgotten());
    assert!(param.was_forgotten());
    assert!(body_return.was_forgotten());
    assert!(!unit.was_forgotten());
    assert!(matches!(area.text(), Err(MorphError::ForgottenNode { .. })));

    let again = file.function_or_err("area").unwrap();
    assert_ne!(again, area);
    assert_eq!(again.parameters().unwrap().len(), 2);
}

#[test]
fn not_found_suggests_a_close_name() {
    let project = project();
    let file = file(&project);
    assert!(file.function("aera").unwrap().is_none());
    let message = file.function_or_err("aera").unwrap_err().to_string();
    assert!(message.contains("did you mean `area`"), "{message}");
}
