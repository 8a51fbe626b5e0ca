use super::{cast_all, cast_opt, children_of, named, names, no_such, scope_of, set_scope_of};
use crate::capabilities::{produced, NamedNode};
use crate::compose::{compose, Wrapped};
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::layout;
use crate::manipulation::{placement, Transition};
use crate::node::{Node, View};

compose! {
    /// `class Name<T> extends Base { ... }`, abstract or not.
    pub struct ClassDeclaration as ClassDeclaration {
        syntax: ["class_declaration", "abstract_class_declaration"],
        own: [
            "extends_text", "set_extends", "members",
            "properties", "property", "property_or_err", "add_property",
            "methods", "method", "method_or_err", "add_method",
        ],
        capabilities: [
            ExportableNode,
            NamedNode,
            DecoratableNode,
            TypeParameteredNode,
            AbstractableNode,
        ],
    }
}

compose! {
    /// A class field.
    pub struct PropertyDeclaration as PropertyDeclaration {
        syntax: ["public_field_definition"],
        own: ["scope", "set_scope"],
        capabilities: [
            NamedNode,
            TypedNode,
            InitializerExpressionableNode,
            StaticableNode,
            ReadonlyableNode,
            QuestionTokenableNode,
            DecoratableNode,
        ],
    }
}

compose! {
    /// A class method, accessor or constructor.
    pub struct MethodDeclaration as MethodDeclaration {
        syntax: ["method_definition"],
        own: ["is_constructor", "scope", "set_scope"],
        capabilities: [
            NamedNode,
            AsyncableNode,
            GeneratorableNode,
            StaticableNode,
            TypeParameteredNode,
            ParameteredNode,
            ReturnTypedNode,
            BodiedNode,
        ],
    }
}

impl PropertyDeclaration {
    pub fn scope(&self) -> Result<Option<String>> {
        scope_of(self)
    }

    pub fn set_scope(&self, scope: Option<&str>) -> Result<()> {
        set_scope_of(self, scope)
    }
}

impl MethodDeclaration {
    pub fn is_constructor(&self) -> Result<bool> {
        Ok(self.name()? == "constructor")
    }

    pub fn scope(&self) -> Result<Option<String>> {
        scope_of(self)
    }

    pub fn set_scope(&self, scope: Option<&str>) -> Result<()> {
        set_scope_of(self, scope)
    }
}

fn is_constructor(v: &View<'_>) -> bool {
    v.field("name").is_some_and(|n| n.source() == "constructor")
}

fn methods_of<'a>(body: &View<'a>) -> Vec<View<'a>> {
    children_of::<MethodDeclaration>(body)
        .into_iter()
        .filter(|m| !is_constructor(m))
        .collect()
}

fn extends_clause<'a>(v: &View<'a>) -> Option<View<'a>> {
    v.child_of_kind("class_heritage")?
        .child_of_kind("extends_clause")
}

impl ClassDeclaration {
    fn with_body<R>(&self, f: impl FnOnce(View<'_>) -> R) -> Result<R> {
        self.try_view(|v| {
            let body = v
                .field("body")
                .ok_or_else(|| MorphError::not_found("body of class"))?;
            Ok(f(body))
        })
    }

    fn owner(&self) -> String {
        self.name()
            .map(|n| format!("class `{n}`"))
            .unwrap_or_else(|_| "class".to_string())
    }

    /// Text after `extends`, such as `Base<T>`.
    pub fn extends_text(&self) -> Result<Option<String>> {
        self.view(|v| {
            let clause = extends_clause(&v)?;
            let keyword = clause.token("extends")?;
            Some(v.text[keyword.end()..clause.end()].trim().to_string())
        })
    }

    /// Set or (with `None`) remove the base class.
    pub fn set_extends(&self, base: Option<&str>) -> Result<()> {
        let base = base.map(str::trim).filter(|b| !b.is_empty());
        let edit = self.try_view(|v| {
            let heritage = v.child_of_kind("class_heritage");
            let clause = extends_clause(&v);
            Ok(match (base, clause) {
                (Some(base), Some(clause)) => {
                    let keyword = clause
                        .token("extends")
                        .ok_or_else(|| MorphError::not_found("`extends` keyword"))?;
                    let start = layout::skip_inline_space(v.text, keyword.end());
                    Some(TextEdit::replace(start, clause.end(), base))
                }
                (Some(base), None) => Some(match heritage {
                    Some(heritage) => {
                        TextEdit::insert(heritage.start(), format!("extends {base} "))
                    }
                    None => {
                        let anchor = v
                            .field("type_parameters")
                            .or_else(|| v.field("name"))
                            .ok_or_else(|| MorphError::not_found("name of class"))?;
                        TextEdit::insert(anchor.end(), format!(" extends {base}"))
                    }
                }),
                (None, Some(clause)) => {
                    let heritage = heritage.ok_or_else(|| MorphError::not_found("class heritage"))?;
                    match heritage.child_of_kind("implements_clause") {
                        Some(implements) => Some(TextEdit::delete(clause.start(), implements.start())),
                        None => {
                            let start = v
                                .children()
                                .take_while(|c| c.index != heritage.index)
                                .last()
                                .map_or(heritage.start(), |previous| previous.end());
                            Some(TextEdit::delete(start, heritage.end()))
                        }
                    }
                }
                (None, None) => None,
            })
        })?;
        if let Some(edit) = edit {
            self.edit(vec![edit])?;
        }
        Ok(())
    }

    /// Members in order; decorators belong to the member they precede.
    pub fn members(&self) -> Result<Vec<Node>> {
        let located = self.with_body(|body| {
            body.elements()
                .filter(|m| m.kind() != "decorator")
                .map(|m| m.locate())
                .collect()
        })?;
        Ok(self.wrap_all(located))
    }

    pub fn properties(&self) -> Result<Vec<PropertyDeclaration>> {
        let located = self.with_body(|body| {
            children_of::<PropertyDeclaration>(&body)
                .iter()
                .map(|p| p.locate())
                .collect()
        })?;
        cast_all(self, located)
    }

    pub fn property(&self, name: &str) -> Result<Option<PropertyDeclaration>> {
        let located = self.with_body(|body| {
            named(children_of::<PropertyDeclaration>(&body), name).map(|p| p.locate())
        })?;
        cast_opt(self, located)
    }

    pub fn property_or_err(&self, name: &str) -> Result<PropertyDeclaration> {
        if let Some(found) = self.property(name)? {
            return Ok(found);
        }
        let known = self.with_body(|body| names(&children_of::<PropertyDeclaration>(&body)))?;
        Err(no_such::<PropertyDeclaration>(name, &self.owner(), &known))
    }

    /// Insert a property after the existing ones, or first if there are none.
    pub fn add_property(&self, text: &str) -> Result<PropertyDeclaration> {
        let index = self.with_body(|body| {
            body.elements()
                .filter(|m| m.kind() != "decorator")
                .enumerate()
                .filter(|(_, m)| m.is_kind(PropertyDeclaration::SYNTAX_KINDS))
                .last()
                .map_or(0, |(i, _)| i + 1)
        })?;
        self.insert_member(index, text)?
            .cast_or_err::<PropertyDeclaration>()
    }

    pub fn methods(&self) -> Result<Vec<MethodDeclaration>> {
        let located = self.with_body(|body| methods_of(&body).iter().map(|m| m.locate()).collect())?;
        cast_all(self, located)
    }

    pub fn method(&self, name: &str) -> Result<Option<MethodDeclaration>> {
        let located = self.with_body(|body| named(methods_of(&body), name).map(|m| m.locate()))?;
        cast_opt(self, located)
    }

    pub fn method_or_err(&self, name: &str) -> Result<MethodDeclaration> {
        if let Some(found) = self.method(name)? {
            return Ok(found);
        }
        let known = self.with_body(|body| names(&methods_of(&body)))?;
        Err(no_such::<MethodDeclaration>(name, &self.owner(), &known))
    }

    /// Append a method to the class body.
    pub fn add_method(&self, text: &str) -> Result<MethodDeclaration> {
        self.insert_member(usize::MAX, text)?
            .cast_or_err::<MethodDeclaration>()
    }

    /// Insert one or more members at `index` among [`members`](Self::members).
    pub(crate) fn insert_members(&self, index: usize, text: &str) -> Result<Transition> {
        if text.trim().is_empty() {
            return Err(MorphError::InvalidArgument("member text must not be empty".to_string()));
        }
        let settings = self.settings();
        let edit = self.with_body(|body| placement::insert_into_block(&body, index, text, &settings))?;
        self.edit(vec![edit])
    }

    fn insert_member(&self, index: usize, text: &str) -> Result<Node> {
        let file = self.file_id()?;
        let transition = self.insert_members(index, text)?;
        produced(
            self,
            file,
            &transition.new_spans[0],
            &["public_field_definition", "method_definition"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{
        AbstractableNode, BodiedNode, DecoratableNode, ExportableNode, InitializerExpressionableNode,
        ParameteredNode, ReadonlyableNode, StaticableNode, TypedNode,
    };
    use crate::config::{IndentationText, ManipulationSettings};
    use crate::fs::InMemoryFileSystem;
    use crate::kinds::SourceFile;
    use crate::project::Project;

    fn source(text: &str) -> SourceFile {
        Project::builder()
            .file_system(InMemoryFileSystem::new())
            .settings(ManipulationSettings {
                indentation: IndentationText::TwoSpaces,
                ..Default::default()
            })
            .build()
            .unwrap()
            .create_source_file("/c.ts", text)
            .unwrap()
    }

    #[test]
    fn heritage_round_trip() {
        let file = source("class A implements I {}\nclass B {}\n");
        let a = file.class_or_err("A").unwrap();
        let b = file.class_or_err("B").unwrap();
        assert_eq!(a.extends_text().unwrap(), None);

        a.set_extends(Some("Base")).unwrap();
        b.set_extends(Some("Other<T>")).unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "class A extends Base implements I {}\nclass B extends Other<T> {}\n"
        );
        assert_eq!(b.extends_text().unwrap().as_deref(), Some("Other<T>"));

        a.set_extends(None).unwrap();
        b.set_extends(None).unwrap();
        assert_eq!(file.full_text().unwrap(), "class A implements I {}\nclass B {}\n");
    }

    #[test]
    fn members_are_added_in_place() {
        let file = source("class Store {\n  items = [];\n\n  load() {}\n}\n");
        let store = file.class_or_err("Store").unwrap();
        let load = store.method_or_err("load").unwrap();

        let count = store.add_property("count: number = 0;").unwrap();
        assert_eq!(count.name().unwrap(), "count");
        assert_eq!(count.type_text().unwrap().as_deref(), Some("number"));
        let save = store.add_method("save() {\n  return 1;\n}").unwrap();

        assert_eq!(
            file.full_text().unwrap(),
            "class Store {\n  items = [];\n\n  count: number = 0;\n  load() {}\n  save() {\n    return 1;\n  }\n}\n"
        );
        assert!(!load.was_forgotten());
        assert_eq!(save.statements().unwrap().len(), 1);
        assert_eq!(store.members().unwrap().len(), 4);
        assert_eq!(store.properties().unwrap().len(), 2);
        assert!(store.method("constructor").unwrap().is_none());
    }

    #[test]
    fn property_modifiers_and_decorators() {
        let file = source("export class A {\n  value = 1;\n}\n");
        let class = file.class_or_err("A").unwrap();
        let value = class.property_or_err("value").unwrap();

        value.set_is_readonly(true).unwrap();
        value.set_is_static(true).unwrap();
        value.add_decorator("Input()").unwrap();
        value.remove_initializer().unwrap();
        value.set_type("number").unwrap();
        class.set_is_abstract(true).unwrap();
        class.add_decorator("@Component({})").unwrap();

        assert_eq!(
            file.full_text().unwrap(),
            "@Component({})\nexport abstract class A {\n  @Input()\n  static readonly value: number;\n}\n"
        );
        assert!(class.is_abstract().unwrap());
        assert!(class.is_exported().unwrap());
        assert_eq!(class.decorators().unwrap().len(), 1);
        assert_eq!(value.decorators().unwrap().len(), 1);
        assert!(value.is_static().unwrap());
        assert!(!value.was_forgotten());

        let err = class.property_or_err("valeu").unwrap_err().to_string();
        assert!(err.contains("did you mean `value`"), "{err}");
    }

    #[test]
    fn method_parameters() {
        let file = source("class A {\n  run(\n    a: string,\n  ) {}\n}\n");
        let run = file.class_or_err("A").unwrap().method_or_err("run").unwrap();
        run.add_parameter("b: number").unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "class A {\n  run(\n    a: string,\n    b: number,\n  ) {}\n}\n"
        );
        assert_eq!(run.parameters().unwrap().len(), 2);
    }
}
