use loomql_core::{
    ArgValue, Argument, Construction, InputId, LitValue, ResultBinding, SelectionNode, Span,
    WireType,
};

use crate::lift::lift;
use crate::test_utils::module_id;
use crate::DiagnosticKind;

fn node(name: &str, args: Vec<(&str, ArgValue)>, children: Vec<SelectionNode>) -> SelectionNode {
    SelectionNode {
        name: name.into(),
        args: args
            .into_iter()
            .map(|(name, value)| Argument::new(name, value))
            .collect(),
        children,
        binding: ResultBinding::Property(name.into()),
        construction: Construction::Properties,
        span: Span::empty(),
    }
}

fn input(id: u32, name: &str) -> ArgValue {
    ArgValue::Input {
        id: InputId(id),
        name: name.into(),
        wire_type: WireType::named("Int").non_null(),
    }
}

#[test]
fn input_becomes_a_variable() {
    let mut nodes = vec![node("user", vec![("id", input(0, "id"))], Vec::new())];

    let (variables, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert!(diags.is_empty());
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].name, "id");
    assert_eq!(variables[0].input, InputId(0));
    assert_eq!(variables[0].wire_type.to_string(), "Int!");
    assert_eq!(nodes[0].args[0].value, ArgValue::Var("id".into()));
}

#[test]
fn one_input_in_two_positions_shares_a_variable() {
    let mut nodes = vec![
        node("user", vec![("id", input(0, "id"))], Vec::new()),
        node("audit", vec![("actorId", input(0, "id"))], Vec::new()),
    ];

    let (variables, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert!(diags.is_empty());
    assert_eq!(variables.len(), 1);
    assert_eq!(nodes[0].args[0].value, ArgValue::Var("id".into()));
    assert_eq!(nodes[1].args[0].value, ArgValue::Var("id".into()));
}

#[test]
fn distinct_inputs_with_one_name_get_distinct_variables() {
    let mut nodes = vec![
        node("a", vec![("id", input(0, "id"))], Vec::new()),
        node("b", vec![("id", input(1, "id"))], Vec::new()),
        node("c", vec![("id", input(2, "id"))], Vec::new()),
    ];

    let (variables, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert!(diags.is_empty());
    let names: Vec<_> = variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["id", "id2", "id3"]);
    assert_eq!(nodes[1].args[0].value, ArgValue::Var("id2".into()));
    assert_eq!(nodes[2].args[0].value, ArgValue::Var("id3".into()));
}

#[test]
fn variables_are_ordered_by_first_occurrence() {
    let mut nodes = vec![node(
        "search",
        vec![("limit", input(3, "limit")), ("after", input(1, "after"))],
        vec![node("user", vec![("id", input(2, "id"))], Vec::new())],
    )];

    let (variables, _) = lift(&mut nodes, &module_id("app")).unwrap();

    let names: Vec<_> = variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["limit", "after", "id"]);
}

#[test]
fn inputs_inside_objects_and_lists_are_lifted() {
    let mut nodes = vec![node(
        "search",
        vec![(
            "filter",
            ArgValue::Object(vec![
                ("id".into(), input(0, "id")),
                (
                    "tags".into(),
                    ArgValue::List(vec![input(1, "tag"), ArgValue::Lit(LitValue::Str("x".into()))]),
                ),
            ]),
        )],
        Vec::new(),
    )];

    let (variables, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert!(diags.is_empty());
    let names: Vec<_> = variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["id", "tag"]);

    let ArgValue::Object(entries) = &nodes[0].args[0].value else {
        panic!("expected object");
    };
    assert_eq!(entries[0].1, ArgValue::Var("id".into()));
}

#[test]
fn literals_stay_in_place() {
    let mut nodes = vec![node(
        "user",
        vec![("id", ArgValue::Lit(LitValue::Int(1)))],
        Vec::new(),
    )];

    let (variables, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert!(diags.is_empty());
    assert!(variables.is_empty());
    assert_eq!(nodes[0].args[0].value, ArgValue::Lit(LitValue::Int(1)));
}

#[test]
fn opaque_argument_is_rejected() {
    let mut nodes = vec![node(
        "user",
        vec![("id", ArgValue::Opaque("argument calls a local function".into()))],
        Vec::new(),
    )];

    let (_, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert_eq!(diags.len(), 1);
    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.kind(), DiagnosticKind::UnsupportedArgumentShape);
    assert!(diag.message().contains("argument calls a local function"));
}

#[test]
fn unbound_fragment_parameter_is_rejected() {
    let mut nodes = vec![node(
        "user",
        vec![("id", ArgValue::Param("id".into()))],
        Vec::new(),
    )];

    let (_, diags) = lift(&mut nodes, &module_id("app")).unwrap();

    assert_eq!(diags.len(), 1);
    assert!(diags
        .iter()
        .next()
        .unwrap()
        .message()
        .contains("fragment parameter `id` has no binding"));
}
