use super::{
    body_statements, check_exports, check_name, double_option, emit_annotation, emit_body,
    emit_exports, emit_parameters, emit_type_parameters, incompatible, joined, kept, optional,
    set_body_statements, set_decorators, set_exports, set_flag, set_parameters, set_part,
    set_type_parameters, statement_structures, statements_text, structures, DecoratorStructure,
    Emit, Morph, MethodStructure, ParameterStructure, PropertySignatureStructure,
    PropertyStructure, Structure, Structured, TypeParameterStructure,
};
use crate::capabilities::{
    AbstractableNode, AsyncableNode, DecoratableNode, ExportableNode, GeneratorableNode,
    InitializerExpressionableNode, NamedNode, ParameteredNode, ReturnTypedNode,
    TypeParameteredNode, TypedNode,
};
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::kinds::{
    ClassDeclaration, FunctionDeclaration, InterfaceDeclaration, SourceFile,
    TypeAliasDeclaration, VariableDeclaration, VariableDeclarationKind, VariableStatement,
};
use crate::node::Node;
use crate::writer::CodeWriter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceFileStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Structure>>,
}

impl Structured for SourceFile {
    type Structure = SourceFileStructure;

    fn structure(&self) -> Result<SourceFileStructure> {
        Ok(SourceFileStructure {
            statements: Some(statement_structures(&self.children()?)?),
        })
    }

    fn set(&self, structure: &SourceFileStructure) -> Result<Morph> {
        let Some(wanted) = &structure.statements else {
            return Ok(kept(self));
        };
        let existing = self.children()?;
        let current = statement_structures(&existing)?;
        if current != *wanted {
            let settings = self.settings();
            let text = statements_text(&existing, &current, wanted, &settings)?;
            let text = if text.is_empty() {
                text
            } else {
                format!("{text}{}", settings.new_line.as_str())
            };
            let end = self.full_text()?.len();
            self.apply_edits(vec![TextEdit::replace(0, end, text)])?;
        }
        Ok(kept(self))
    }
}

impl Emit for SourceFileStructure {
    fn emit(&self, w: &mut CodeWriter) {
        for statement in self.statements.iter().flatten() {
            statement.emit(w);
            w.newline_if_last_not();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariableStatementStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    /// Never true; kept so a structure read from another kind is rejected loudly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_kind: Option<VariableDeclarationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declarations: Option<Vec<VariableDeclarationStructure>>,
}

impl Structured for VariableStatement {
    type Structure = VariableStatementStructure;

    fn structure(&self) -> Result<VariableStatementStructure> {
        Ok(VariableStatementStructure {
            is_exported: Some(self.is_exported()?),
            is_default_export: None,
            declaration_kind: Some(self.declaration_kind()?),
            declarations: Some(structures(&self.declarations()?)?),
        })
    }

    fn set(&self, structure: &VariableStatementStructure) -> Result<Morph> {
        check_exports::<Self>(structure.is_exported, structure.is_default_export)?;
        if structure.declarations.as_ref().is_some_and(Vec::is_empty) {
            return Err(MorphError::InvalidArgument(
                "a variable statement needs at least one declaration".to_string(),
            ));
        }

        set_exports(self, structure.is_exported, structure.is_default_export)?;
        if let Some(kind) = structure.declaration_kind {
            self.set_declaration_kind(kind)?;
        }
        if let Some(wanted) = &structure.declarations {
            let existing = self.declarations()?;
            if structures(&existing)?.as_slice() != wanted.as_slice() {
                let (Some(first), Some(last)) = (existing.first(), existing.last()) else {
                    return Err(MorphError::not_found("declarations of variable statement"));
                };
                let (start, end) = (first.start()?, last.end()?);
                let list = joined(wanted, ", ", &self.settings());
                self.edit(vec![TextEdit::replace(start, end, list)])?;
            }
        }
        Ok(kept(self))
    }
}

impl Emit for VariableStatementStructure {
    fn emit(&self, w: &mut CodeWriter) {
        emit_exports(w, self.is_exported, None);
        w.write(self.declaration_kind.unwrap_or(VariableDeclarationKind::Const).as_str());
        w.space();
        for (i, declaration) in self.declarations.iter().flatten().enumerate() {
            w.conditional_write(i > 0, ", ");
            declaration.emit(w);
        }
        w.write(";");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariableDeclarationStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", with = "double_option")]
    pub ty: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub initializer: Option<Option<String>>,
}

pub(crate) fn initializer_text<T: InitializerExpressionableNode>(node: &T) -> Result<Option<String>> {
    node.initializer()?.map(|n| n.text()).transpose()
}

impl Structured for VariableDeclaration {
    type Structure = VariableDeclarationStructure;

    fn structure(&self) -> Result<VariableDeclarationStructure> {
        Ok(VariableDeclarationStructure {
            name: Some(self.name()?),
            ty: Some(self.type_text()?),
            initializer: Some(initializer_text(self)?),
        })
    }

    fn set(&self, structure: &VariableDeclarationStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_part(
            &structure.ty,
            || self.type_text(),
            |t| self.set_type(t),
            || self.remove_type(),
        )?;
        set_part(
            &structure.initializer,
            || initializer_text(self),
            |t| self.set_initializer(t),
            || self.remove_initializer(),
        )?;
        Ok(kept(self))
    }
}

impl Emit for VariableDeclarationStructure {
    fn emit(&self, w: &mut CodeWriter) {
        w.write(self.name.as_deref().unwrap_or_default());
        emit_annotation(w, &self.ty);
        if let Some(Some(initializer)) = &self.initializer {
            w.write(" = ");
            w.write(initializer.trim());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunctionStructure {
    /// `None` when reified from an anonymous `export default function`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_generator: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<Vec<TypeParameterStructure>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterStructure>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub return_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Vec<Structure>>,
}

impl Structured for FunctionDeclaration {
    type Structure = FunctionStructure;

    fn structure(&self) -> Result<FunctionStructure> {
        Ok(FunctionStructure {
            name: optional(self.name())?,
            is_exported: Some(self.is_exported()?),
            is_default_export: Some(self.is_default_export()?),
            is_async: Some(self.is_async()?),
            is_generator: Some(self.is_generator()?),
            type_parameters: Some(structures(&self.type_parameters()?)?),
            parameters: Some(structures(&self.parameters()?)?),
            return_type: Some(self.return_type_text()?),
            statements: body_statements(self)?,
        })
    }

    fn set(&self, structure: &FunctionStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        check_exports::<Self>(structure.is_exported, structure.is_default_export)?;

        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_exports(self, structure.is_exported, structure.is_default_export)?;
        set_flag(structure.is_async, || self.is_async(), |v| self.set_is_async(v))?;
        set_flag(structure.is_generator, || self.is_generator(), |v| self.set_is_generator(v))?;
        if let Some(wanted) = &structure.type_parameters {
            set_type_parameters(self, wanted)?;
        }
        if let Some(wanted) = &structure.parameters {
            set_parameters(self, wanted)?;
        }
        set_part(
            &structure.return_type,
            || self.return_type_text(),
            |t| self.set_return_type(t),
            || self.remove_return_type(),
        )?;
        if let Some(wanted) = &structure.statements {
            set_body_statements(self, wanted)?;
        }
        Ok(kept(self))
    }
}

impl Emit for FunctionStructure {
    fn emit(&self, w: &mut CodeWriter) {
        emit_exports(w, self.is_exported, self.is_default_export);
        w.conditional_write(self.is_async == Some(true), "async ");
        w.write("function");
        w.conditional_write(self.is_generator == Some(true), "*");
        if let Some(name) = &self.name {
            w.space();
            w.write(name.trim());
        }
        emit_type_parameters(w, &self.type_parameters);
        emit_parameters(w, &self.parameters);
        emit_annotation(w, &self.return_type);
        emit_body(w, &self.statements);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<DecoratorStructure>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<Vec<TypeParameterStructure>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub extends: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertyStructure>>,
    /// Methods other than the constructor, which keeps its text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<MethodStructure>>,
}

impl Structured for ClassDeclaration {
    type Structure = ClassStructure;

    fn structure(&self) -> Result<ClassStructure> {
        Ok(ClassStructure {
            name: optional(self.name())?,
            is_exported: Some(self.is_exported()?),
            is_default_export: Some(self.is_default_export()?),
            is_abstract: Some(self.is_abstract()?),
            decorators: Some(structures(&self.decorators()?)?),
            type_parameters: Some(structures(&self.type_parameters()?)?),
            extends: Some(self.extends_text()?),
            properties: Some(structures(&self.properties()?)?),
            methods: Some(structures(&self.methods()?)?),
        })
    }

    fn set(&self, structure: &ClassStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        check_exports::<Self>(structure.is_exported, structure.is_default_export)?;

        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_exports(self, structure.is_exported, structure.is_default_export)?;
        set_flag(structure.is_abstract, || self.is_abstract(), |v| self.set_is_abstract(v))?;
        if let Some(wanted) = &structure.decorators {
            set_decorators(self, wanted)?;
        }
        if let Some(wanted) = &structure.type_parameters {
            set_type_parameters(self, wanted)?;
        }
        if let Some(extends) = &structure.extends {
            let wanted = extends.as_deref().map(str::trim);
            if self.extends_text()?.as_deref() != wanted {
                self.set_extends(wanted)?;
            }
        }
        if let Some(wanted) = &structure.properties {
            let existing = self.properties()?;
            if structures(&existing)?.as_slice() != wanted.as_slice() {
                let index = match existing.first() {
                    Some(first) => member_index(self, first)?,
                    None => 0,
                };
                replace_members(self, &existing, index, wanted)?;
            }
        }
        if let Some(wanted) = &structure.methods {
            let existing = self.methods()?;
            if structures(&existing)?.as_slice() != wanted.as_slice() {
                let index = match existing.first() {
                    Some(first) => member_index(self, first)?,
                    None => usize::MAX,
                };
                replace_members(self, &existing, index, wanted)?;
            }
        }
        Ok(kept(self))
    }
}

fn member_index(class: &ClassDeclaration, member: &Node) -> Result<usize> {
    Ok(class
        .members()?
        .iter()
        .position(|m| m == member)
        .unwrap_or_default())
}

fn replace_members<M: std::ops::Deref<Target = Node>, S: Emit>(
    class: &ClassDeclaration,
    existing: &[M],
    index: usize,
    wanted: &[S],
) -> Result<()> {
    for member in existing {
        member.remove()?;
    }
    if !wanted.is_empty() {
        let settings = class.settings();
        class.insert_members(index, &joined(wanted, settings.new_line.as_str(), &settings))?;
    }
    Ok(())
}

impl Emit for ClassStructure {
    fn emit(&self, w: &mut CodeWriter) {
        for decorator in self.decorators.iter().flatten() {
            decorator.emit(w);
            w.newline();
        }
        emit_exports(w, self.is_exported, self.is_default_export);
        w.conditional_write(self.is_abstract == Some(true), "abstract ");
        w.write("class");
        if let Some(name) = &self.name {
            w.space();
            w.write(name.trim());
        }
        emit_type_parameters(w, &self.type_parameters);
        if let Some(Some(base)) = &self.extends {
            w.write(" extends ");
            w.write(base.trim());
        }
        let properties = self.properties.as_deref().unwrap_or_default();
        let methods = self.methods.as_deref().unwrap_or_default();
        if properties.is_empty() && methods.is_empty() {
            w.write(" {}");
            return;
        }
        w.block(|w| {
            for property in properties {
                property.emit(w);
                w.newline_if_last_not();
            }
            for method in methods {
                method.emit(w);
                w.newline_if_last_not();
            }
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<Vec<TypeParameterStructure>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropertySignatureStructure>>,
}

impl Structured for InterfaceDeclaration {
    type Structure = InterfaceStructure;

    fn structure(&self) -> Result<InterfaceStructure> {
        Ok(InterfaceStructure {
            name: Some(self.name()?),
            is_exported: Some(self.is_exported()?),
            is_default_export: Some(self.is_default_export()?),
            type_parameters: Some(structures(&self.type_parameters()?)?),
            properties: Some(structures(&self.properties()?)?),
        })
    }

    fn set(&self, structure: &InterfaceStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        check_exports::<Self>(structure.is_exported, structure.is_default_export)?;

        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_exports(self, structure.is_exported, structure.is_default_export)?;
        if let Some(wanted) = &structure.type_parameters {
            set_type_parameters(self, wanted)?;
        }
        if let Some(wanted) = &structure.properties {
            let existing = self.properties()?;
            if structures(&existing)?.as_slice() != wanted.as_slice() {
                let index = self.first_property_index()?.unwrap_or(usize::MAX);
                for property in &existing {
                    property.remove()?;
                }
                if !wanted.is_empty() {
                    let settings = self.settings();
                    let text = joined(wanted, settings.new_line.as_str(), &settings);
                    self.insert_properties(index, &text)?;
                }
            }
        }
        Ok(kept(self))
    }
}

impl Emit for InterfaceStructure {
    fn emit(&self, w: &mut CodeWriter) {
        emit_exports(w, self.is_exported, self.is_default_export);
        w.write("interface ");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        emit_type_parameters(w, &self.type_parameters);
        match self.properties.as_deref() {
            Some(properties) if !properties.is_empty() => {
                w.block(|w| {
                    for property in properties {
                        property.emit(w);
                        w.newline_if_last_not();
                    }
                });
            }
            _ => {
                w.write(" {}");
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeAliasStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_parameters: Option<Vec<TypeParameterStructure>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

impl Structured for TypeAliasDeclaration {
    type Structure = TypeAliasStructure;

    fn structure(&self) -> Result<TypeAliasStructure> {
        Ok(TypeAliasStructure {
            name: Some(self.name()?),
            is_exported: Some(self.is_exported()?),
            is_default_export: None,
            type_parameters: Some(structures(&self.type_parameters()?)?),
            ty: self.type_text()?,
        })
    }

    fn set(&self, structure: &TypeAliasStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        check_exports::<Self>(structure.is_exported, structure.is_default_export)?;
        if structure.ty.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(incompatible::<Self>("type"));
        }

        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_exports(self, structure.is_exported, structure.is_default_export)?;
        if let Some(wanted) = &structure.type_parameters {
            set_type_parameters(self, wanted)?;
        }
        if let Some(ty) = &structure.ty {
            if self.type_text()?.as_deref() != Some(ty.trim()) {
                self.set_type(ty)?;
            }
        }
        Ok(kept(self))
    }
}

impl Emit for TypeAliasStructure {
    fn emit(&self, w: &mut CodeWriter) {
        emit_exports(w, self.is_exported, None);
        w.write("type ");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        emit_type_parameters(w, &self.type_parameters);
        w.write(" = ");
        w.write(self.ty.as_deref().map_or("unknown", str::trim));
        w.write(";");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IndentationText, ManipulationSettings};
    use crate::fs::InMemoryFileSystem;
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
            .create_source_file("/d.ts", text)
            .unwrap()
    }

    #[test]
    fn variable_statements_rewrite_declarators() {
        let file = source("export let a = 1, b: string;\n");
        let statement = &file.variable_statements().unwrap()[0];
        let mut structure = statement.structure().unwrap();
        assert_eq!(structure.declaration_kind, Some(VariableDeclarationKind::Let));
        let declarations = structure.declarations.as_mut().unwrap();
        assert_eq!(declarations[1].ty, Some(Some("string".to_string())));
        assert_eq!(declarations[1].initializer, Some(None));
        declarations.remove(0);
        declarations.push(VariableDeclarationStructure {
            name: Some("c".to_string()),
            initializer: Some(Some("[]".to_string())),
            ..Default::default()
        });
        structure.declaration_kind = Some(VariableDeclarationKind::Const);
        structure.is_exported = Some(false);
        structure.declarations.as_mut().unwrap()[0].initializer = Some(Some("\"\"".to_string()));

        statement.set(&structure).unwrap();
        assert_eq!(file.full_text().unwrap(), "const b: string = \"\", c = [];\n");
        assert!(!statement.was_forgotten());

        let err = statement
            .set(&VariableStatementStructure {
                declarations: Some(Vec::new()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, MorphError::InvalidArgument(_)));
    }

    #[test]
    fn class_members_are_replaced_in_place() {
        let file = source(
            "class A extends B {\n  x = 1;\n  constructor() {\n    super();\n  }\n  f() {}\n}\n",
        );
        let class = file.class_or_err("A").unwrap();
        let structure = ClassStructure {
            is_abstract: Some(true),
            extends: Some(None),
            properties: Some(vec![
                PropertyStructure {
                    name: Some("x".to_string()),
                    initializer: Some(Some("2".to_string())),
                    ..Default::default()
                },
                PropertyStructure {
                    name: Some("y".to_string()),
                    ty: Some(Some("string".to_string())),
                    is_readonly: Some(true),
                    ..Default::default()
                },
            ]),
            methods: Some(vec![MethodStructure {
                name: Some("g".to_string()),
                parameters: Some(vec![ParameterStructure {
                    name: Some("n".to_string()),
                    ty: Some(Some("number".to_string())),
                    ..Default::default()
                }]),
                statements: Some(vec![Structure::Raw {
                    text: "return n;".to_string(),
                }]),
                ..Default::default()
            }]),
            ..Default::default()
        };
        class.set(&structure).unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "abstract class A {\n  x = 2;\n  readonly y: string;\n  constructor() {\n    super();\n  }\n  g(n: number) {\n    return n;\n  }\n}\n"
        );
        assert_eq!(class.methods().unwrap().len(), 1);
        assert!(class.method("constructor").unwrap().is_none());
    }

    #[test]
    fn interface_properties_follow_the_structure() {
        let file = source("interface I {\n  a: string;\n  m(): void;\n}\n");
        let interface = file.interface_or_err("I").unwrap();
        interface
            .set(&InterfaceStructure {
                is_exported: Some(true),
                properties: Some(vec![PropertySignatureStructure {
                    name: Some("b".to_string()),
                    ty: Some(Some("number".to_string())),
                    has_question_token: Some(true),
                    ..Default::default()
                }]),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            file.full_text().unwrap(),
            "export interface I {\n  b?: number;\n  m(): void;\n}\n"
        );
    }

    #[test]
    fn type_alias_rejects_default_export_before_editing() {
        let file = source("type T = string;\n");
        let alias = file.type_alias_or_err("T").unwrap();
        let err = alias
            .set(&TypeAliasStructure {
                name: Some("U".to_string()),
                is_default_export: Some(true),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            MorphError::IncompatibleStructure {
                field: "is_default_export",
                ..
            }
        ));
        assert_eq!(file.full_text().unwrap(), "type T = string;\n");

        alias
            .set(&TypeAliasStructure {
                name: Some("U".to_string()),
                type_parameters: Some(vec![TypeParameterStructure {
                    name: Some("K".to_string()),
                    ..Default::default()
                }]),
                ty: Some("K[]".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(file.full_text().unwrap(), "type U<K> = K[];\n");
    }

    #[test]
    fn default_export_toggles_keep_the_export() {
        let file = source("export default function f() {}\n");
        let f = file.function_or_err("f").unwrap();
        f.set(&FunctionStructure {
            is_default_export: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(file.full_text().unwrap(), "export function f() {}\n");
        f.set(&FunctionStructure {
            is_default_export: Some(true),
            is_generator: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(file.full_text().unwrap(), "export default function* f() {}\n");
    }
}
