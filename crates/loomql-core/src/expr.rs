//! Input boundary: the typed query-expression representation supplied by
//! the host build pipeline.
//!
//! The compiler never parses host-language syntax. The pipeline hands it
//! an already-walkable tree per call site: the declared result type and
//! the selection expression, plus every fragment declaration visible to
//! the compilation. These structs are a 1:1 mapping of that boundary,
//! kept separate from the analysis-layer Selection AST in [`crate::ast`].

use serde::{Deserialize, Serialize};

use crate::span::{ModuleId, Span};
use crate::wire::WireType;

/// Stable identity of a runtime-supplied input value.
///
/// Two argument usages backed by the same host expression carry the same
/// id; the variable lifter turns them into one shared binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputId(pub u32);

impl std::fmt::Display for InputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a compiled operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Mutation => f.write_str("mutation"),
        }
    }
}

/// Compile-time-constant literal. Inlined into the document, never lifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LitValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Enum member, emitted bare (unquoted).
    Enum(String),
}

/// Argument value expression at the input boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgExpr {
    Lit(LitValue),
    /// Reference to a runtime value that can be evaluated once before the
    /// request is issued.
    Input {
        id: InputId,
        name: String,
        wire_type: WireType,
        span: Span,
    },
    /// Fragment-local parameter. Only meaningful inside fragment bodies;
    /// rewritten to the caller's value during expansion.
    Param { name: String, span: Span },
    /// Object-typed argument built from named entries.
    Object(Vec<(String, ArgExpr)>),
    List(Vec<ArgExpr>),
    /// Host expression the compiler cannot evaluate ahead of the request
    /// (re-entrant evaluation, runtime control flow).
    Opaque { reason: String, span: Span },
}

/// One requested field at the input boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpr {
    /// Wire name, distinct from any host-language alias.
    pub name: String,
    /// Host-side property this field maps to under implicit binding.
    /// Defaults to the wire name when absent.
    pub property: Option<String>,
    pub args: Vec<(String, ArgExpr)>,
    /// Nested selection for object-valued fields; `None` for scalars.
    pub selection: Option<Box<SelectExpr>>,
    pub span: Span,
}

/// Typed selection expression, as enumerated by the host build pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectExpr {
    /// Bare field access.
    Field(FieldExpr),
    /// Sibling selections mapped implicitly onto like-named properties.
    Props { fields: Vec<SelectExpr>, span: Span },
    /// Explicit object construction: field values become positional
    /// constructor arguments.
    New {
        type_name: String,
        args: Vec<SelectExpr>,
        span: Span,
    },
    /// Object initializer: field values become named initializer entries.
    Init {
        type_name: String,
        entries: Vec<(String, SelectExpr)>,
        span: Span,
    },
    /// Inline the named fragment here, optionally passing arguments.
    Fragment {
        /// Declaring module, when the reference is qualified. Unqualified
        /// references resolve in the current module, then its imports.
        module: Option<ModuleId>,
        name: String,
        args: Vec<ArgExpr>,
        span: Span,
    },
    /// Construct the Selection AST cannot represent.
    Opaque { reason: String, span: Span },
}

impl SelectExpr {
    pub fn span(&self) -> Span {
        match self {
            Self::Field(field) => field.span,
            Self::Props { span, .. }
            | Self::New { span, .. }
            | Self::Init { span, .. }
            | Self::Fragment { span, .. }
            | Self::Opaque { span, .. } => *span,
        }
    }
}

/// Parameter declared on a reusable fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentParam {
    pub name: String,
    pub wire_type: WireType,
}

/// One declaration site contributing to a fragment.
///
/// `partial` declarations with the same (module, name) are assembled into
/// a single definition before resolution starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentDecl {
    pub module: ModuleId,
    pub name: String,
    /// Wire type the fragment is declared to apply to.
    pub on_type: String,
    pub partial: bool,
    pub params: Vec<FragmentParam>,
    pub body: SelectExpr,
    pub span: Span,
}

/// One query/mutation call site found in the caller's source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSite {
    pub module: ModuleId,
    pub span: Span,
    pub kind: OperationKind,
    /// Optional operation name, printed in the document signature.
    pub name: Option<String>,
    /// The caller's declared result type.
    pub result_type: String,
    /// The selection expression on the operation root.
    pub body: SelectExpr,
}

/// One module's worth of input to a compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleInput {
    pub id: ModuleId,
    /// Modules whose fragments are visible to unqualified references here.
    pub imports: Vec<ModuleId>,
    pub fragments: Vec<FragmentDecl>,
    pub call_sites: Vec<CallSite>,
    /// Host source text, used only for diagnostic rendering.
    pub source: Option<String>,
}

/// Everything the driver compiles in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub modules: Vec<ModuleInput>,
}

impl CompilationUnit {
    pub fn module(&self, id: &ModuleId) -> Option<&ModuleInput> {
        self.modules.iter().find(|m| &m.id == id)
    }

    pub fn call_sites(&self) -> impl Iterator<Item = &CallSite> {
        self.modules.iter().flat_map(|m| m.call_sites.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Frontends for other build systems hand modules across a
    // serialization boundary; the representation has to stay stable.
    #[test]
    fn module_input_crosses_a_json_boundary() {
        let json = r#"{"id":"App.Queries","imports":["Shared"],"fragments":[],"call_sites":[],"source":null}"#;
        let module: ModuleInput = serde_json::from_str(json).unwrap();
        assert_eq!(module.id.as_str(), "App.Queries");
        assert_eq!(module.imports, vec![ModuleId::new("Shared")]);

        let back = serde_json::to_string(&module).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn input_id_and_kind_display() {
        assert_eq!(InputId(3).to_string(), "#3");
        assert_eq!(OperationKind::Query.to_string(), "query");
        assert_eq!(OperationKind::Mutation.to_string(), "mutation");
    }
}
