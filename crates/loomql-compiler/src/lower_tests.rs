use loomql_core::{
    ArgExpr, ArgValue, Construction, LitValue, ResultBinding, SelectExpr, Selection, Span,
};

use crate::lower::lower_call_site;
use crate::test_utils::*;
use crate::{DiagnosticKind, Error};

fn field_names(selections: &[Selection]) -> Vec<&str> {
    selections
        .iter()
        .map(|s| match s {
            Selection::Field(f) => f.name.as_str(),
            Selection::FragmentRef(r) => r.name.as_str(),
        })
        .collect()
}

#[test]
fn single_field_body() {
    let site = query("app", "String", SelectExpr::Field(field("version")));
    let ((selections, construction), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    assert_eq!(construction, Construction::Properties);
    let Selection::Field(f) = &selections[0] else {
        panic!("expected field");
    };
    assert_eq!(f.name, "version");
    assert_eq!(f.binding, ResultBinding::Property("version".into()));
}

#[test]
fn property_rename_overrides_implicit_binding() {
    let site = query(
        "app",
        "User",
        props(vec![field_as("firstName", "GivenName"), field("lastName")]),
    );
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    let Selection::Field(first) = &selections[0] else {
        panic!("expected field");
    };
    assert_eq!(first.binding, ResultBinding::Property("GivenName".into()));
    let Selection::Field(second) = &selections[1] else {
        panic!("expected field");
    };
    assert_eq!(second.binding, ResultBinding::Property("lastName".into()));
}

#[test]
fn constructor_body_binds_positionally() {
    let site = query(
        "app",
        "UserModel",
        construct(
            "UserModel",
            vec![
                SelectExpr::Field(field("firstName")),
                SelectExpr::Field(field("lastName")),
            ],
        ),
    );
    let ((selections, construction), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    assert_eq!(construction, Construction::Constructor("UserModel".into()));
    let bindings: Vec<_> = selections
        .iter()
        .map(|s| match s {
            Selection::Field(f) => f.binding.clone(),
            _ => panic!("expected field"),
        })
        .collect();
    assert_eq!(
        bindings,
        vec![ResultBinding::ConstructorArg(0), ResultBinding::ConstructorArg(1)]
    );
}

#[test]
fn initializer_body_binds_by_entry_name() {
    let site = query(
        "app",
        "UserDto",
        init(
            "UserDto",
            vec![
                ("Name", SelectExpr::Field(field("firstName"))),
                ("Role", SelectExpr::Field(field("role"))),
            ],
        ),
    );
    let ((selections, construction), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    assert_eq!(construction, Construction::Initializer("UserDto".into()));
    let Selection::Field(first) = &selections[0] else {
        panic!("expected field");
    };
    assert_eq!(first.binding, ResultBinding::InitializerEntry("Name".into()));
}

#[test]
fn nested_selection_carries_its_own_construction() {
    let site = query(
        "app",
        "UserModel",
        SelectExpr::Field(nested(
            field("me"),
            construct("UserModel", vec![SelectExpr::Field(field("firstName"))]),
        )),
    );
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    let Selection::Field(me) = &selections[0] else {
        panic!("expected field");
    };
    assert_eq!(me.construction, Construction::Constructor("UserModel".into()));
    assert_eq!(me.children.len(), 1);
}

#[test]
fn argument_lowering() {
    let site = query(
        "app",
        "User",
        SelectExpr::Field(field_with_args(
            "user",
            vec![
                ("id", input(0, "id", int_non_null())),
                ("limit", lit_int(10)),
                ("cursor", param("cursor")),
            ],
        )),
    );
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    let Selection::Field(user) = &selections[0] else {
        panic!("expected field");
    };
    assert!(matches!(user.args[0].value, ArgValue::Input { .. }));
    assert_eq!(user.args[1].value, ArgValue::Lit(LitValue::Int(10)));
    assert_eq!(user.args[2].value, ArgValue::Param("cursor".into()));
}

#[test]
fn non_finite_float_argument_is_not_representable() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let site = query(
            "app",
            "User",
            SelectExpr::Field(field_with_args(
                "scale",
                vec![("by", ArgExpr::Lit(LitValue::Float(value)))],
            )),
        );
        let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

        assert!(diags.is_empty());
        let Selection::Field(scale) = &selections[0] else {
            panic!("expected field");
        };
        assert!(matches!(
            &scale.args[0].value,
            ArgValue::Opaque(reason) if reason.contains("non-finite")
        ));
    }
}

#[test]
fn fragment_application_lowers_to_placeholder() {
    let site = query(
        "app",
        "User",
        props_of(vec![
            SelectExpr::Field(field("id")),
            frag_args("UserFields", vec![lit_int(3)]),
        ]),
    );
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    assert!(diags.is_empty());
    assert_eq!(field_names(&selections), vec!["id", "UserFields"]);
    let Selection::FragmentRef(reference) = &selections[1] else {
        panic!("expected fragment placeholder");
    };
    assert_eq!(reference.args, vec![ArgValue::Lit(LitValue::Int(3))]);
}

#[test]
fn opaque_selection_is_rejected() {
    let site = query(
        "app",
        "User",
        SelectExpr::Opaque {
            reason: "conditional selection depends on a runtime value".into(),
            span: Span::new(4, 30),
        },
    );
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    assert!(selections.is_empty());
    assert_eq!(diags.len(), 1);
    insta::assert_snapshot!(
        diags.iter().next().unwrap().to_string(),
        @"error at app:4..30: selection expression cannot be represented: conditional selection depends on a runtime value (hint: selections must be deterministic field accesses, without runtime control flow)"
    );
}

#[test]
fn fragment_cannot_fill_a_constructor_slot() {
    let site = query(
        "app",
        "UserModel",
        construct("UserModel", vec![frag("UserFields")]),
    );
    let ((_, _), diags) = lower_call_site(&site, 64).unwrap();

    assert_eq!(diags.len(), 1);
    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.kind(), DiagnosticKind::UnsupportedSelectionShape);
    assert!(diag
        .message()
        .contains("a fragment cannot supply a single constructor or initializer slot"));
}

#[test]
fn distinct_fields_bound_to_one_property() {
    let site = query(
        "app",
        "User",
        props(vec![
            field_as("firstName", "Name"),
            field_as("lastName", "Name"),
        ]),
    );
    let ((_, _), diags) = lower_call_site(&site, 64).unwrap();

    assert_eq!(diags.len(), 1);
    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.kind(), DiagnosticKind::AmbiguousFieldBinding);
    assert_eq!(diag.message(), "result slot `Name` is bound more than once");
}

#[test]
fn identical_siblings_are_not_ambiguous() {
    let site = query(
        "app",
        "User",
        props(vec![field("firstName"), field("firstName")]),
    );
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    // The resolver merges them; lowering keeps both.
    assert!(diags.is_empty());
    assert_eq!(selections.len(), 2);
}

#[test]
fn empty_selection_set_is_rejected() {
    let site = query("app", "User", props(Vec::new()));
    let ((selections, _), diags) = lower_call_site(&site, 64).unwrap();

    assert!(selections.is_empty());
    assert_eq!(diags.len(), 1);
    assert!(diags.iter().next().unwrap().message().contains("selection set is empty"));
}

#[test]
fn deep_nesting_exhausts_fuel() {
    let mut body = SelectExpr::Field(field("leaf"));
    for depth in 0..32 {
        body = SelectExpr::Field(nested(field(&format!("level{depth}")), body));
    }
    let site = query("app", "Deep", body);

    assert!(matches!(
        lower_call_site(&site, 8),
        Err(Error::RecursionLimitExceeded)
    ));
}
