use crate::capabilities::{decorator_name, require_text};
use crate::compose::compose;
use crate::edit::TextEdit;
use crate::error::{MorphError, Result};
use crate::manipulation::placement;
use crate::node::{Node, View};

compose! {
    /// `@name` or `@name(args)`.
    pub struct Decorator as Decorator {
        syntax: ["decorator"],
        own: ["name", "is_decorator_factory", "arguments", "add_argument"],
        capabilities: [],
    }
}

fn call<'a>(v: &View<'a>) -> Option<View<'a>> {
    v.elements().next().filter(|e| e.kind() == "call_expression")
}

impl Decorator {
    pub fn name(&self) -> Result<String> {
        self.view(|v| decorator_name(&v).map(str::to_string))?
            .ok_or_else(|| MorphError::not_found("name of decorator"))
    }

    /// True for `@name(...)`, false for `@name`.
    pub fn is_decorator_factory(&self) -> Result<bool> {
        self.view(|v| call(&v).is_some())
    }

    pub fn arguments(&self) -> Result<Vec<Node>> {
        let located = self.view(|v| {
            call(&v)
                .and_then(|c| c.field("arguments"))
                .map(|args| args.elements().map(|a| a.locate()).collect())
                .unwrap_or_default()
        })?;
        Ok(self.wrap_all(located))
    }

    /// Append an argument; `@name` becomes `@name(argument)`.
    pub fn add_argument(&self, text: &str) -> Result<Node> {
        let text = require_text(text, "argument")?;
        let settings = self.settings();
        let (file, edit) = self.try_view(|v| {
            let expression = v
                .elements()
                .next()
                .ok_or_else(|| MorphError::not_found("expression of decorator"))?;
            let edit = match call(&v).and_then(|c| c.field("arguments")) {
                Some(args) => placement::insert_into_list(&args, usize::MAX, text, &settings),
                None => TextEdit::insert(expression.end(), format!("({text})")),
            };
            Ok((v.file, edit))
        })?;
        let transition = self.edit(vec![edit])?;
        self.find_in_span(file, &transition.new_spans[0], |d| {
            d.named && d.kind != "arguments" && !d.is_comment()
        })?
        .ok_or_else(|| MorphError::not_found("new decorator argument"))
    }
}

#[cfg(test)]
mod tests {
    use crate::capabilities::DecoratableNode;
    use crate::project::Project;

    #[test]
    fn arguments_grow_and_factories_appear() {
        let project = Project::in_memory().unwrap();
        let file = project
            .create_source_file("/d.ts", "@sealed\n@Component(a)\nclass A {}\n")
            .unwrap();
        let class = file.class_or_err("A").unwrap();
        let decorators = class.decorators().unwrap();
        assert_eq!(decorators.len(), 2);

        let sealed = &decorators[0];
        assert_eq!(sealed.name().unwrap(), "sealed");
        assert!(!sealed.is_decorator_factory().unwrap());
        let arg = sealed.add_argument("true").unwrap();
        assert_eq!(arg.text().unwrap(), "true");
        assert!(sealed.is_decorator_factory().unwrap());

        let component = class.decorator_or_err("Component").unwrap();
        component.add_argument("b").unwrap();
        assert_eq!(component.arguments().unwrap().len(), 2);
        assert_eq!(
            file.full_text().unwrap(),
            "@sealed(true)\n@Component(a, b)\nclass A {}\n"
        );
    }
}
