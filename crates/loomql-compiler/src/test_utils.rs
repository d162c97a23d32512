//! Shared fixture builders for compiler tests.
//!
//! Expression trees are verbose to spell out by hand; these helpers
//! build the common shapes. All spans default to empty; tests that
//! assert on locations set them explicitly.

use loomql_core::{
    ArgExpr, CallSite, CompilationUnit, FieldExpr, FragmentDecl, FragmentParam, InputId, LitValue,
    ModuleId, ModuleInput, OperationKind, SelectExpr, Span, WireType,
};

use crate::driver::{CompilePass, Compiler};

pub fn module_id(name: &str) -> ModuleId {
    ModuleId::new(name)
}

pub fn field(name: &str) -> FieldExpr {
    FieldExpr {
        name: name.into(),
        property: None,
        args: Vec::new(),
        selection: None,
        span: Span::empty(),
    }
}

pub fn field_as(name: &str, property: &str) -> FieldExpr {
    FieldExpr {
        property: Some(property.into()),
        ..field(name)
    }
}

pub fn field_with_args(name: &str, args: Vec<(&str, ArgExpr)>) -> FieldExpr {
    FieldExpr {
        args: args
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        ..field(name)
    }
}

pub fn nested(mut outer: FieldExpr, selection: SelectExpr) -> FieldExpr {
    outer.selection = Some(Box::new(selection));
    outer
}

pub fn props(fields: Vec<FieldExpr>) -> SelectExpr {
    SelectExpr::Props {
        fields: fields.into_iter().map(SelectExpr::Field).collect(),
        span: Span::empty(),
    }
}

pub fn props_of(fields: Vec<SelectExpr>) -> SelectExpr {
    SelectExpr::Props {
        fields,
        span: Span::empty(),
    }
}

pub fn construct(type_name: &str, args: Vec<SelectExpr>) -> SelectExpr {
    SelectExpr::New {
        type_name: type_name.into(),
        args,
        span: Span::empty(),
    }
}

pub fn init(type_name: &str, entries: Vec<(&str, SelectExpr)>) -> SelectExpr {
    SelectExpr::Init {
        type_name: type_name.into(),
        entries: entries
            .into_iter()
            .map(|(name, entry)| (name.to_string(), entry))
            .collect(),
        span: Span::empty(),
    }
}

pub fn frag(name: &str) -> SelectExpr {
    frag_args(name, Vec::new())
}

pub fn frag_args(name: &str, args: Vec<ArgExpr>) -> SelectExpr {
    SelectExpr::Fragment {
        module: None,
        name: name.into(),
        args,
        span: Span::empty(),
    }
}

pub fn frag_in(module: &str, name: &str) -> SelectExpr {
    SelectExpr::Fragment {
        module: Some(module_id(module)),
        name: name.into(),
        args: Vec::new(),
        span: Span::empty(),
    }
}

pub fn lit_int(value: i64) -> ArgExpr {
    ArgExpr::Lit(LitValue::Int(value))
}

pub fn lit_str(value: &str) -> ArgExpr {
    ArgExpr::Lit(LitValue::Str(value.into()))
}

pub fn input(id: u32, name: &str, wire_type: WireType) -> ArgExpr {
    ArgExpr::Input {
        id: InputId(id),
        name: name.into(),
        wire_type,
        span: Span::empty(),
    }
}

pub fn param(name: &str) -> ArgExpr {
    ArgExpr::Param {
        name: name.into(),
        span: Span::empty(),
    }
}

pub fn int_non_null() -> WireType {
    WireType::named("Int").non_null()
}

pub fn query(module: &str, result_type: &str, body: SelectExpr) -> CallSite {
    CallSite {
        module: module_id(module),
        span: Span::empty(),
        kind: OperationKind::Query,
        name: None,
        result_type: result_type.into(),
        body,
    }
}

pub fn fragment(module: &str, name: &str, on_type: &str, body: SelectExpr) -> FragmentDecl {
    FragmentDecl {
        module: module_id(module),
        name: name.into(),
        on_type: on_type.into(),
        partial: false,
        params: Vec::new(),
        body,
        span: Span::empty(),
    }
}

pub fn fragment_params(
    module: &str,
    name: &str,
    on_type: &str,
    params: Vec<(&str, WireType)>,
    body: SelectExpr,
) -> FragmentDecl {
    FragmentDecl {
        params: params
            .into_iter()
            .map(|(name, wire_type)| FragmentParam {
                name: name.into(),
                wire_type,
            })
            .collect(),
        ..fragment(module, name, on_type, body)
    }
}

pub fn module(id: &str, fragments: Vec<FragmentDecl>, call_sites: Vec<CallSite>) -> ModuleInput {
    ModuleInput {
        id: module_id(id),
        imports: Vec::new(),
        fragments,
        call_sites,
        source: None,
    }
}

pub fn module_importing(
    id: &str,
    imports: Vec<&str>,
    fragments: Vec<FragmentDecl>,
    call_sites: Vec<CallSite>,
) -> ModuleInput {
    ModuleInput {
        imports: imports.into_iter().map(module_id).collect(),
        ..module(id, fragments, call_sites)
    }
}

pub fn unit(modules: Vec<ModuleInput>) -> CompilationUnit {
    CompilationUnit { modules }
}

/// Compile one site with no fragments in scope.
pub fn compile_single(site: CallSite) -> CompilePass {
    let unit = unit(vec![module("app", Vec::new(), vec![site])]);
    Compiler::new(&unit).exec().unwrap()
}

/// Compile a full unit, returning the pass.
pub fn compile(unit: &CompilationUnit) -> CompilePass {
    Compiler::new(unit).exec().unwrap()
}

/// The single operation of a pass that must have succeeded.
pub fn sole_operation(pass: CompilePass) -> loomql_plan::CompiledOperation {
    assert!(
        pass.is_success(),
        "compilation failed:\n{}",
        render_diagnostics(&pass)
    );
    assert_eq!(pass.operations.len(), 1, "expected exactly one operation");
    pass.operations.into_iter().next().unwrap()
}

/// Plain-text render of everything a pass reported.
pub fn render_diagnostics(pass: &CompilePass) -> String {
    pass.diagnostics()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
