use super::{scope_of, set_scope_of};
use crate::capabilities::TypeShape;
use crate::compose::compose;
use crate::error::Result;

compose! {
    /// `function name<T>(params): R { ... }`, including generators.
    pub struct FunctionDeclaration as FunctionDeclaration {
        syntax: ["function_declaration", "generator_function_declaration"],
        own: [],
        capabilities: [
            ExportableNode,
            NamedNode,
            AsyncableNode,
            GeneratorableNode,
            TypeParameteredNode,
            ParameteredNode,
            ReturnTypedNode,
            BodiedNode,
        ],
    }
}

compose! {
    /// A function, method or constructor parameter.
    pub struct Parameter as Parameter {
        syntax: ["required_parameter", "optional_parameter"],
        own: ["is_rest_parameter", "scope", "set_scope"],
        capabilities: [
            NamedNode { const NAME_FIELD: &'static str = "pattern"; },
            TypedNode { const TYPE_SHAPE: TypeShape = TypeShape::Annotation; },
            InitializerExpressionableNode,
            QuestionTokenableNode,
            DecoratableNode { const DECORATOR_INLINE: bool = true; },
            ReadonlyableNode,
        ],
    }
}

impl Parameter {
    /// `...rest`
    pub fn is_rest_parameter(&self) -> Result<bool> {
        self.view(|v| v.field("pattern").is_some_and(|p| p.kind() == "rest_pattern"))
    }

    /// Accessibility of a constructor parameter property (`private x: T`).
    pub fn scope(&self) -> Result<Option<String>> {
        scope_of(self)
    }

    pub fn set_scope(&self, scope: Option<&str>) -> Result<()> {
        set_scope_of(self, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{
        AsyncableNode, BodiedNode, DecoratableNode, ExportableNode, GeneratorableNode,
        InitializerExpressionableNode, NamedNode, ParameteredNode, QuestionTokenableNode,
        ReturnTypedNode, TypeParameteredNode, TypedNode,
    };
    use crate::error::MorphError;
    use crate::kinds::SourceFile;
    use crate::project::Project;

    fn source(text: &str) -> SourceFile {
        let project = Project::builder()
            .file_system(crate::fs::InMemoryFileSystem::new())
            .settings(crate::config::ManipulationSettings {
                indentation: crate::config::IndentationText::TwoSpaces,
                ..Default::default()
            })
            .build()
            .unwrap();
        project.create_source_file("/f.ts", text).unwrap()
    }

    #[test]
    fn signature_mutators_keep_the_wrapper() {
        let file = source("function run(a: number) {\n  go(a);\n}\n");
        let run = file.function_or_err("run").unwrap();

        run.set_is_async(true).unwrap();
        run.set_return_type("Promise<void>").unwrap();
        run.add_type_parameter("T").unwrap();
        let b = run.add_parameter("b?: string").unwrap();
        run.set_is_exported(true).unwrap();

        assert_eq!(
            file.full_text().unwrap(),
            "export async function run<T>(a: number, b?: string): Promise<void> {\n  go(a);\n}\n"
        );
        assert!(!run.was_forgotten());
        assert!(run.is_async().unwrap());
        assert!(run.is_exported().unwrap());
        assert_eq!(run.return_type_text().unwrap().as_deref(), Some("Promise<void>"));
        assert!(b.has_question_token().unwrap());
        assert_eq!(run.parameters().unwrap().len(), 2);
    }

    #[test]
    fn generator_and_body() {
        let file = source("function gen() {}\n");
        let generator = file.function_or_err("gen").unwrap();
        generator.set_is_generator(true).unwrap();
        assert_eq!(generator.syntax_kind().unwrap(), "generator_function_declaration");
        generator.set_body_text("yield 1;\nyield 2;").unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "function* gen() {\n  yield 1;\n  yield 2;\n}\n"
        );
        assert_eq!(generator.body_text().unwrap().as_deref(), Some("yield 1;\nyield 2;"));

        let added = generator.add_statements("return;").unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(generator.statements().unwrap().len(), 3);
    }

    #[test]
    fn generator_star_removal() {
        let file = source("function* a() {}\nfunction*b() {}\n");
        for name in ["a", "b"] {
            file.function_or_err(name)
                .unwrap()
                .set_is_generator(false)
                .unwrap();
        }
        assert_eq!(file.full_text().unwrap(), "function a() {}\nfunction b() {}\n");
    }

    #[test]
    fn parameter_capabilities() {
        let file = source("class C {\n  constructor(@Inject() private readonly svc: Service = make()) {}\n}\n");
        let ctor = file
            .first_descendant_by_kind_or_err("required_parameter")
            .unwrap()
            .cast_or_err::<Parameter>()
            .unwrap();
        assert_eq!(ctor.name().unwrap(), "svc");
        assert_eq!(ctor.scope().unwrap().as_deref(), Some("private"));
        assert_eq!(ctor.type_text().unwrap().as_deref(), Some("Service"));
        assert_eq!(ctor.decorators().unwrap().len(), 1);
        assert!(ctor.decorator("Inject").unwrap().is_some());

        ctor.remove_initializer().unwrap();
        ctor.set_type("OtherService").unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "class C {\n  constructor(@Inject() private readonly svc: OtherService) {}\n}\n"
        );
        let err = ctor.decorator_or_err("Injct").unwrap_err().to_string();
        assert!(err.contains("did you mean `Inject`"), "{err}");

        ctor.set_scope(Some("protected")).unwrap();
        ctor.set_scope(None).unwrap();
        let other = file.class_or_err("C").unwrap().add_method("m(x: number) {}").unwrap();
        other.parameter_or_err("x").unwrap().set_scope(Some("public")).unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "class C {\n  constructor(@Inject() readonly svc: OtherService) {}\n  m(public x: number) {}\n}\n"
        );
        assert!(matches!(
            ctor.set_scope(Some("internal")),
            Err(MorphError::InvalidArgument(_))
        ));
    }

    #[test]
    fn syntax_errors_are_rejected_and_rolled_back() {
        let file = source("function f(a) {}\n");
        let f = file.function_or_err("f").unwrap();
        let err = f.set_return_type("(((").unwrap_err();
        assert!(matches!(err, MorphError::SyntaxErrorIntroduced { .. }));
        assert_eq!(file.full_text().unwrap(), "function f(a) {}\n");
        assert!(!f.was_forgotten());
        assert_eq!(f.parameter_or_err("a").unwrap().name().unwrap(), "a");
    }
}
