use super::{cast_all, cast_opt, children_of, named, names, no_such};
use crate::capabilities::{produced, NamedNode};
use crate::compose::{compose, Wrapped};
use crate::error::{MorphError, Result};
use crate::manipulation::{placement, Transition};
use crate::node::View;

compose! {
    pub struct InterfaceDeclaration as InterfaceDeclaration {
        syntax: ["interface_declaration"],
        own: ["properties", "property", "property_or_err", "add_property"],
        capabilities: [ExportableNode, NamedNode, TypeParameteredNode],
    }
}

compose! {
    /// `readonly name?: T` inside an interface or object type.
    pub struct PropertySignature as PropertySignature {
        syntax: ["property_signature"],
        own: [],
        capabilities: [NamedNode, TypedNode, QuestionTokenableNode, ReadonlyableNode],
    }
}

impl InterfaceDeclaration {
    fn with_body<R>(&self, f: impl FnOnce(View<'_>) -> R) -> Result<R> {
        self.try_view(|v| {
            let body = v
                .field("body")
                .ok_or_else(|| MorphError::not_found("body of interface"))?;
            Ok(f(body))
        })
    }

    pub fn properties(&self) -> Result<Vec<PropertySignature>> {
        let located = self.with_body(|body| {
            children_of::<PropertySignature>(&body)
                .iter()
                .map(|p| p.locate())
                .collect()
        })?;
        cast_all(self, located)
    }

    pub fn property(&self, name: &str) -> Result<Option<PropertySignature>> {
        let located = self.with_body(|body| {
            named(children_of::<PropertySignature>(&body), name).map(|p| p.locate())
        })?;
        cast_opt(self, located)
    }

    pub fn property_or_err(&self, name: &str) -> Result<PropertySignature> {
        if let Some(found) = self.property(name)? {
            return Ok(found);
        }
        let known = self.with_body(|body| names(&children_of::<PropertySignature>(&body)))?;
        let owner = format!("interface `{}`", self.name()?);
        Err(no_such::<PropertySignature>(name, &owner, &known))
    }

    /// Append a member such as `id: string;`.
    pub fn add_property(&self, text: &str) -> Result<PropertySignature> {
        let file = self.file_id()?;
        let transition = self.insert_properties(usize::MAX, text)?;
        produced(self, file, &transition.new_spans[0], &["property_signature"])?
            .cast_or_err::<PropertySignature>()
    }

    /// Position of the first property among the body's members.
    pub(crate) fn first_property_index(&self) -> Result<Option<usize>> {
        self.with_body(|body| {
            body.elements()
                .position(|m| m.is_kind(PropertySignature::SYNTAX_KINDS))
        })
    }

    pub(crate) fn insert_properties(&self, index: usize, text: &str) -> Result<Transition> {
        if text.trim().is_empty() {
            return Err(MorphError::InvalidArgument("property text must not be empty".to_string()));
        }
        let settings = self.settings();
        let edit = self.with_body(|body| placement::insert_into_block(&body, index, text, &settings))?;
        self.edit(vec![edit])
    }
}

#[cfg(test)]
mod tests {
    use crate::capabilities::{
        ExportableNode, NamedNode, QuestionTokenableNode, ReadonlyableNode, TypeParameteredNode,
        TypedNode,
    };
    use crate::project::Project;

    #[test]
    fn interface_members() {
        let project = Project::in_memory().unwrap();
        let file = project
            .create_source_file("/i.ts", "interface User {\n    id: string;\n}\n")
            .unwrap();
        let user = file.interface_or_err("User").unwrap();
        let id = user.property_or_err("id").unwrap();

        let email = user.add_property("email?: string;").unwrap();
        assert!(email.has_question_token().unwrap());
        id.set_is_readonly(true).unwrap();
        email.set_has_question_token(false).unwrap();
        email.set_type("Email").unwrap();
        user.add_type_parameter("T = unknown").unwrap();
        user.set_is_exported(true).unwrap();

        assert_eq!(
            file.full_text().unwrap(),
            "export interface User<T = unknown> {\n    readonly id: string;\n    email: Email;\n}\n"
        );
        assert_eq!(user.properties().unwrap().len(), 2);
        assert!(id.is_readonly().unwrap());
        assert_eq!(email.name().unwrap(), "email");
        assert!(user.property("name").unwrap().is_none());
    }
}
