use super::declarations::initializer_text;
use super::{
    body_statements, check_name, double_option, emit_annotation, emit_body, emit_parameters,
    emit_type_parameters, kept, render, set_body_statements, set_decorators, set_flag,
    set_parameters, set_part, set_type_parameters, structures, Emit, Morph, Structure, Structured,
};
use crate::capabilities::{
    AsyncableNode, DecoratableNode, GeneratorableNode, InitializerExpressionableNode, NamedNode,
    ParameteredNode, QuestionTokenableNode, ReadonlyableNode, ReturnTypedNode, StaticableNode,
    TypeParameteredNode, TypedNode,
};
use crate::compose::Wrapped;
use crate::error::Result;
use crate::kinds::{
    Decorator, MethodDeclaration, Parameter, PropertyAssignment, PropertyDeclaration,
    PropertySignature, ShorthandPropertyAssignment, TypeParameter,
};
use crate::writer::CodeWriter;
use serde::{Deserialize, Serialize};

fn emit_scope(w: &mut CodeWriter, scope: &Option<Option<String>>) {
    if let Some(Some(scope)) = scope {
        w.write(scope.trim());
        w.space();
    }
}

fn emit_initializer(w: &mut CodeWriter, initializer: &Option<Option<String>>) {
    if let Some(Some(initializer)) = initializer {
        w.write(" = ");
        w.write(initializer.trim());
    }
}

fn is(flag: Option<bool>) -> bool {
    flag == Some(true)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", with = "double_option")]
    pub ty: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub initializer: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_question_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_readonly: Option<bool>,
    /// Accessibility of a constructor parameter property.
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub scope: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<DecoratorStructure>>,
}

impl Structured for Parameter {
    type Structure = ParameterStructure;

    fn structure(&self) -> Result<ParameterStructure> {
        Ok(ParameterStructure {
            name: Some(self.name()?),
            ty: Some(self.type_text()?),
            initializer: Some(initializer_text(self)?),
            has_question_token: Some(self.has_question_token()?),
            is_readonly: Some(self.is_readonly()?),
            scope: Some(self.scope()?),
            decorators: Some(structures(&self.decorators()?)?),
        })
    }

    fn set(&self, structure: &ParameterStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_part(
            &structure.scope,
            || self.scope(),
            |s| self.set_scope(Some(s)),
            || self.set_scope(None),
        )?;
        set_flag(structure.is_readonly, || self.is_readonly(), |v| self.set_is_readonly(v))?;
        set_flag(
            structure.has_question_token,
            || self.has_question_token(),
            |v| self.set_has_question_token(v),
        )?;
        if let Some(wanted) = &structure.decorators {
            set_decorators(self, wanted)?;
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

impl Emit for ParameterStructure {
    fn emit(&self, w: &mut CodeWriter) {
        for decorator in self.decorators.iter().flatten() {
            decorator.emit(w);
            w.space();
        }
        emit_scope(w, &self.scope);
        w.conditional_write(is(self.is_readonly), "readonly ");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        w.conditional_write(is(self.has_question_token), "?");
        emit_annotation(w, &self.ty);
        emit_initializer(w, &self.initializer);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeParameterStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub constraint: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub default: Option<Option<String>>,
}

impl Structured for TypeParameter {
    type Structure = TypeParameterStructure;

    fn structure(&self) -> Result<TypeParameterStructure> {
        Ok(TypeParameterStructure {
            name: Some(self.name()?),
            constraint: Some(self.constraint_text()?),
            default: Some(self.default_text()?),
        })
    }

    fn set(&self, structure: &TypeParameterStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_part(
            &structure.constraint,
            || self.constraint_text(),
            |t| self.set_constraint(Some(t)),
            || self.set_constraint(None),
        )?;
        set_part(
            &structure.default,
            || self.default_text(),
            |t| self.set_default(Some(t)),
            || self.set_default(None),
        )?;
        Ok(kept(self))
    }
}

impl Emit for TypeParameterStructure {
    fn emit(&self, w: &mut CodeWriter) {
        w.write(self.name.as_deref().unwrap_or_default().trim());
        if let Some(Some(constraint)) = &self.constraint {
            w.write(" extends ");
            w.write(constraint.trim());
        }
        emit_initializer(w, &self.default);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoratorStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `null` for `@name`, a list (possibly empty) for `@name(...)`.
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub arguments: Option<Option<Vec<String>>>,
}

impl Structured for Decorator {
    type Structure = DecoratorStructure;

    fn structure(&self) -> Result<DecoratorStructure> {
        let arguments = if self.is_decorator_factory()? {
            Some(
                self.arguments()?
                    .iter()
                    .map(|a| a.text())
                    .collect::<Result<Vec<_>>>()?,
            )
        } else {
            None
        };
        Ok(DecoratorStructure {
            name: Some(self.name()?),
            arguments: Some(arguments),
        })
    }

    /// A changed decorator is rewritten whole, so the result is always a new node.
    fn set(&self, structure: &DecoratorStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        let current = self.structure()?;
        let merged = DecoratorStructure {
            name: structure.name.clone().or_else(|| current.name.clone()),
            arguments: structure.arguments.clone().or_else(|| current.arguments.clone()),
        };
        if merged == current {
            return Ok(kept(self));
        }
        let text = render(&merged, &self.settings());
        self.replace_with_text(&text).map(Morph::Replaced)
    }
}

impl Emit for DecoratorStructure {
    fn emit(&self, w: &mut CodeWriter) {
        w.write("@");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        if let Some(Some(arguments)) = &self.arguments {
            w.write("(");
            w.write(&arguments.join(", "));
            w.write(")");
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub scope: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_readonly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_question_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<DecoratorStructure>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", with = "double_option")]
    pub ty: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub initializer: Option<Option<String>>,
}

impl Structured for PropertyDeclaration {
    type Structure = PropertyStructure;

    fn structure(&self) -> Result<PropertyStructure> {
        Ok(PropertyStructure {
            name: Some(self.name()?),
            scope: Some(self.scope()?),
            is_static: Some(self.is_static()?),
            is_readonly: Some(self.is_readonly()?),
            has_question_token: Some(self.has_question_token()?),
            decorators: Some(structures(&self.decorators()?)?),
            ty: Some(self.type_text()?),
            initializer: Some(initializer_text(self)?),
        })
    }

    fn set(&self, structure: &PropertyStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_part(
            &structure.scope,
            || self.scope(),
            |s| self.set_scope(Some(s)),
            || self.set_scope(None),
        )?;
        set_flag(structure.is_static, || self.is_static(), |v| self.set_is_static(v))?;
        set_flag(structure.is_readonly, || self.is_readonly(), |v| self.set_is_readonly(v))?;
        set_flag(
            structure.has_question_token,
            || self.has_question_token(),
            |v| self.set_has_question_token(v),
        )?;
        if let Some(wanted) = &structure.decorators {
            set_decorators(self, wanted)?;
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

impl Emit for PropertyStructure {
    fn emit(&self, w: &mut CodeWriter) {
        for decorator in self.decorators.iter().flatten() {
            decorator.emit(w);
            w.newline();
        }
        emit_scope(w, &self.scope);
        w.conditional_write(is(self.is_static), "static ");
        w.conditional_write(is(self.is_readonly), "readonly ");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        w.conditional_write(is(self.has_question_token), "?");
        emit_annotation(w, &self.ty);
        emit_initializer(w, &self.initializer);
        w.write(";");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MethodStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub scope: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
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

impl Structured for MethodDeclaration {
    type Structure = MethodStructure;

    fn structure(&self) -> Result<MethodStructure> {
        Ok(MethodStructure {
            name: Some(self.name()?),
            scope: Some(self.scope()?),
            is_static: Some(self.is_static()?),
            is_async: Some(self.is_async()?),
            is_generator: Some(self.is_generator()?),
            type_parameters: Some(structures(&self.type_parameters()?)?),
            parameters: Some(structures(&self.parameters()?)?),
            return_type: Some(self.return_type_text()?),
            statements: body_statements(self)?,
        })
    }

    fn set(&self, structure: &MethodStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_part(
            &structure.scope,
            || self.scope(),
            |s| self.set_scope(Some(s)),
            || self.set_scope(None),
        )?;
        set_flag(structure.is_static, || self.is_static(), |v| self.set_is_static(v))?;
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

impl Emit for MethodStructure {
    fn emit(&self, w: &mut CodeWriter) {
        emit_scope(w, &self.scope);
        w.conditional_write(is(self.is_static), "static ");
        w.conditional_write(is(self.is_async), "async ");
        w.conditional_write(is(self.is_generator), "*");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        emit_type_parameters(w, &self.type_parameters);
        emit_parameters(w, &self.parameters);
        emit_annotation(w, &self.return_type);
        emit_body(w, &self.statements);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertySignatureStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", with = "double_option")]
    pub ty: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_question_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_readonly: Option<bool>,
}

impl Structured for PropertySignature {
    type Structure = PropertySignatureStructure;

    fn structure(&self) -> Result<PropertySignatureStructure> {
        Ok(PropertySignatureStructure {
            name: Some(self.name()?),
            ty: Some(self.type_text()?),
            has_question_token: Some(self.has_question_token()?),
            is_readonly: Some(self.is_readonly()?),
        })
    }

    fn set(&self, structure: &PropertySignatureStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        set_flag(structure.is_readonly, || self.is_readonly(), |v| self.set_is_readonly(v))?;
        set_flag(
            structure.has_question_token,
            || self.has_question_token(),
            |v| self.set_has_question_token(v),
        )?;
        set_part(
            &structure.ty,
            || self.type_text(),
            |t| self.set_type(t),
            || self.remove_type(),
        )?;
        Ok(kept(self))
    }
}

impl Emit for PropertySignatureStructure {
    fn emit(&self, w: &mut CodeWriter) {
        w.conditional_write(is(self.is_readonly), "readonly ");
        w.write(self.name.as_deref().unwrap_or_default().trim());
        w.conditional_write(is(self.has_question_token), "?");
        emit_annotation(w, &self.ty);
        w.write(";");
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyAssignmentStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `null` turns `key: value` into the shorthand `key`.
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub initializer: Option<Option<String>>,
}

impl Structured for PropertyAssignment {
    type Structure = PropertyAssignmentStructure;

    fn structure(&self) -> Result<PropertyAssignmentStructure> {
        Ok(PropertyAssignmentStructure {
            name: Some(self.name()?),
            initializer: Some(Some(self.initializer()?.text()?)),
        })
    }

    fn set(&self, structure: &PropertyAssignmentStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        if let Some(name) = &structure.name {
            self.set_name(name)?;
        }
        match &structure.initializer {
            Some(Some(text)) => {
                self.set_initializer(text)?;
                Ok(kept(self))
            }
            Some(None) => {
                let shorthand = self.remove_initializer()?;
                Ok(Morph::Replaced(shorthand.node().clone()))
            }
            None => Ok(kept(self)),
        }
    }
}

impl Emit for PropertyAssignmentStructure {
    fn emit(&self, w: &mut CodeWriter) {
        w.write(self.name.as_deref().unwrap_or_default().trim());
        if let Some(Some(initializer)) = &self.initializer {
            w.write(": ");
            w.write(initializer.trim());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShorthandPropertyAssignmentStructure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Present only to turn the shorthand into `key: value`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
}

impl Structured for ShorthandPropertyAssignment {
    type Structure = ShorthandPropertyAssignmentStructure;

    fn structure(&self) -> Result<ShorthandPropertyAssignmentStructure> {
        Ok(ShorthandPropertyAssignmentStructure {
            name: Some(self.name()?),
            initializer: None,
        })
    }

    fn set(&self, structure: &ShorthandPropertyAssignmentStructure) -> Result<Morph> {
        check_name(&structure.name)?;
        let mut node = self.node().clone();
        let mut replaced = false;
        if let Some(name) = structure.name.as_deref().map(str::trim) {
            if name != self.name()? {
                node = self.replace_with_text(name)?;
                replaced = true;
            }
        }
        if let Some(initializer) = &structure.initializer {
            let shorthand = node.cast_or_err::<ShorthandPropertyAssignment>()?;
            node = shorthand.set_initializer(initializer)?.node().clone();
            replaced = true;
        }
        Ok(if replaced {
            Morph::Replaced(node)
        } else {
            Morph::Kept(node)
        })
    }
}

impl Emit for ShorthandPropertyAssignmentStructure {
    fn emit(&self, w: &mut CodeWriter) {
        w.write(self.name.as_deref().unwrap_or_default().trim());
        if let Some(initializer) = &self.initializer {
            w.write(": ");
            w.write(initializer.trim());
        }
    }
}
