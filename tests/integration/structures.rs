use super::project;
use syntax_morph::structure::{FunctionStructure, ParameterStructure};
use syntax_morph::{
    MorphError, Node, ShorthandPropertyAssignment, Structure, Structured, WrapperKind,
};

const SAMPLE: &str = r#"import { Base } from "./base";

@sealed
export abstract class Shape<T extends object = {}> extends Base {
  @observable protected readonly id?: string = "s";
  static count = 0;

  constructor(private label: string) {
    super();
  }

  async *points<P>(limit: number = 10): AsyncGenerator<P> {
    yield* [];
  }
}

export interface Sized {
  readonly width: number;
  height?: number;
}

export type Pair<A, B = A> = [A, B];

export default function measure(shape: Shape<object>, scale = 2): number {
  const options = { scale, shape: shape };
  return shape.area() * options.scale;
}

let a = 1, b: string;
"#;

/// Every wrapper with a structured kind, in document order.
fn structured(root: &Node) -> Vec<Node> {
    root.descendants()
        .unwrap()
        .into_iter()
        .filter(|n| n.kind() != WrapperKind::Generic)
        .collect()
}

#[test]
fn every_structured_kind_round_trips() {
    let project = project();
    let file = project.create_source_file("/sample.ts", SAMPLE).unwrap();
    let count = structured(&file).len();
    assert!(count > 20);

    for i in 0..count {
        // Re-query each time so a rebound wrapper is never stale.
        let node = structured(&file)[i].clone();
        let before = node.structure().unwrap();
        let morph = node.set_structure(&before).unwrap();
        assert!(!morph.was_replaced(), "{:?} was replaced", node.kind());
        assert_eq!(file.full_text().unwrap(), SAMPLE, "setting {:?} changed the text", node.kind());
        assert_eq!(morph.node().structure().unwrap(), before);
    }

    let whole = file.structure().unwrap();
    file.set(&whole).unwrap();
    assert_eq!(file.full_text().unwrap(), SAMPLE);
}

#[test]
fn json_structures_morph_object_members() {
    let project = project();
    let file = project
        .create_source_file("/o.ts", "const o = { scale, shape: s };\n")
        .unwrap();
    let short = file.descendants_of_kind("shorthand_property_identifier").unwrap()[0]
        .cast_or_err::<ShorthandPropertyAssignment>()
        .unwrap();

    let structure =
        Structure::from_json(r#"{"kind": "ShorthandPropertyAssignment", "initializer": "2"}"#)
            .unwrap();
    let morph = short.set_structure(&structure).unwrap();
    assert!(morph.was_replaced());
    assert!(short.was_forgotten());
    assert_eq!(morph.node().kind(), WrapperKind::PropertyAssignment);
    assert_eq!(file.full_text().unwrap(), "const o = { scale: 2, shape: s };\n");

    let pair = file.descendants_of_kind("pair").unwrap()[1].clone();
    let removal =
        Structure::from_json(r#"{"kind": "PropertyAssignment", "initializer": null}"#).unwrap();
    let morph = pair.set_structure(&removal).unwrap();
    assert_eq!(morph.node().kind(), WrapperKind::ShorthandPropertyAssignment);
    assert_eq!(file.full_text().unwrap(), "const o = { scale: 2, shape };\n");
}

#[test]
fn mismatched_structures_are_rejected_up_front() {
    let project = project();
    let text = "const a = 1;\nfunction f() {}\n";
    let file = project.create_source_file("/m.ts", text).unwrap();
    let statement = file.statements().unwrap()[0].clone();

    let wrong_kind = Structure::from_json(r#"{"kind": "FunctionDeclaration", "name": "g"}"#).unwrap();
    assert!(matches!(
        statement.set_structure(&wrong_kind),
        Err(MorphError::IncompatibleStructure { field: "kind", .. })
    ));

    let no_default =
        Structure::from_json(r#"{"kind": "VariableStatement", "is_default_export": true}"#)
            .unwrap();
    assert!(matches!(
        statement.set_structure(&no_default),
        Err(MorphError::IncompatibleStructure { .. })
    ));

    let unknown_field = Structure::from_json(r#"{"kind": "FunctionDeclaration", "is_static": true}"#);
    assert!(matches!(unknown_field, Err(MorphError::Structure(_))));

    assert_eq!(file.full_text().unwrap(), text);
    assert!(!statement.was_forgotten());
}

#[test]
fn generated_declarations_read_back_identically() {
    let project = project();
    let file = project.create_source_file("/gen.ts", "const seed = 1;\n").unwrap();
    let number = |name: &str| ParameterStructure {
        name: Some(name.to_string()),
        ty: Some(Some("number".to_string())),
        ..ParameterStructure::default()
    };
    let add = FunctionStructure {
        name: Some("add".to_string()),
        is_exported: Some(true),
        parameters: Some(vec![number("a"), number("b")]),
        return_type: Some(Some("number".to_string())),
        statements: Some(vec![Structure::Raw {
            text: "return a + b;".to_string(),
        }]),
        ..FunctionStructure::default()
    };

    let text = Structure::FunctionDeclaration(add.clone()).to_text(&project.settings());
    assert_eq!(
        text,
        "export function add(a: number, b: number): number {\n  return a + b;\n}"
    );
    file.add_statements(&text).unwrap();

    let read = file.function_or_err("add").unwrap().structure().unwrap();
    assert_eq!(read.name, add.name);
    assert_eq!(read.is_exported, Some(true));
    assert_eq!(read.parameters, Some(vec![
        ParameterStructure {
            has_question_token: Some(false),
            is_readonly: Some(false),
            scope: Some(None),
            initializer: Some(None),
            decorators: Some(Vec::new()),
            ..number("a")
        },
        ParameterStructure {
            has_question_token: Some(false),
            is_readonly: Some(false),
            scope: Some(None),
            initializer: Some(None),
            decorators: Some(Vec::new()),
            ..number("b")
        },
    ]));
    assert_eq!(read.return_type, add.return_type);
    assert_eq!(read.statements, add.statements);
}
