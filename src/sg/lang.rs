//! TypeScript and TSX via ast-grep-language's built-in grammars.

pub use ast_grep_language::SupportLang;

use crate::syntax::SourceLanguage;

/// The ast-grep language for files of `language`.
pub fn support_lang(language: SourceLanguage) -> SupportLang {
    language.support_lang()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast_grep_core::AstGrep;

    #[test]
    fn typescript_parses_to_program() {
        let sg = AstGrep::new("const a = 1;", support_lang(SourceLanguage::TypeScript));
        assert_eq!(sg.root().kind(), "program");
    }

    #[test]
    fn single_and_variadic_metavars() {
        let sg = AstGrep::new(
            "function f(a: number) { log(a); return a; }",
            support_lang(SourceLanguage::TypeScript),
        );
        let root = sg.root();
        assert!(root.find("function $NAME($$$PARAMS) { $$$BODY }").is_some());
        assert!(root.find("log($_)").is_some());
        assert_eq!(root.find_all("return $X").count(), 1);
    }

    #[test]
    fn tsx_accepts_jsx() {
        let sg = AstGrep::new(
            "const e = <div>{x}</div>;",
            support_lang(SourceLanguage::Tsx),
        );
        assert!(sg.root().find("<div>$$$C</div>").is_some());
    }
}
