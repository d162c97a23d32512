//! Selection AST: the value-type tree the compiler pipeline operates on.
//!
//! Two stages share these types:
//! - Lowering produces [`Selection`] trees, which may still contain
//!   [`FragmentRef`] placeholders.
//! - Fragment resolution replaces every placeholder by value and yields
//!   [`SelectionNode`] trees, which are structurally fragment-free. The
//!   document emitter and response binder only ever see the second stage.
//!
//! Trees are plain owned values with no interior sharing, so expanding a
//! fragment into many call sites never aliases mutable state between them.

use serde::{Deserialize, Serialize};

use crate::expr::{InputId, LitValue};
use crate::span::{ModuleId, Span};
use crate::wire::WireType;

/// How a field's decoded value lands in the caller's result type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultBinding {
    /// Assign to a like-named property.
    Property(String),
    /// Supply as a positional constructor argument.
    ConstructorArg(u32),
    /// Supply as a named initializer entry.
    InitializerEntry(String),
}

impl ResultBinding {
    /// The slot this binding targets, for ambiguity checks.
    pub fn target(&self) -> String {
        match self {
            Self::Property(name) | Self::InitializerEntry(name) => name.clone(),
            Self::ConstructorArg(pos) => format!("arg {}", pos),
        }
    }
}

impl std::fmt::Display for ResultBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Property(name) => write!(f, ".{}", name),
            Self::ConstructorArg(pos) => write!(f, "arg {}", pos),
            Self::InitializerEntry(name) => write!(f, "init {}", name),
        }
    }
}

/// How an object-valued node's children assemble into a host value.
///
/// All three styles resolve to the same decode-step shape: ordered
/// children, each tagged with its own [`ResultBinding`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Construction {
    /// Like-named property mapping onto the declared type.
    Properties,
    /// Explicit constructor call with positional arguments.
    Constructor(String),
    /// Object/collection initializer with named entries.
    Initializer(String),
}

impl std::fmt::Display for Construction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Properties => f.write_str("props"),
            Self::Constructor(ty) => write!(f, "new {}", ty),
            Self::Initializer(ty) => write!(f, "init {}", ty),
        }
    }
}

/// Argument value after lowering.
///
/// Spans are dropped here on purpose: merge identity is structural on
/// (name, arguments) and must not depend on where the argument was
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Lit(LitValue),
    /// Runtime input, not yet lifted into a variable.
    Input {
        id: InputId,
        name: String,
        wire_type: WireType,
    },
    /// Named variable, after lifting.
    Var(String),
    /// Fragment-local parameter placeholder.
    Param(String),
    Object(Vec<(String, ArgValue)>),
    List(Vec<ArgValue>),
    /// Value the compiler cannot evaluate before the request is issued.
    /// Rejected by the variable lifter.
    Opaque(String),
}

/// One named argument on a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value: ArgValue,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: ArgValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A lowered selection: either a concrete field or a fragment placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    Field(FieldSelect),
    FragmentRef(FragmentRef),
}

impl Selection {
    pub fn span(&self) -> Span {
        match self {
            Self::Field(field) => field.span,
            Self::FragmentRef(fragment) => fragment.span,
        }
    }
}

/// A requested field in the lowered (pre-expansion) stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSelect {
    pub name: String,
    pub args: Vec<Argument>,
    pub children: Vec<Selection>,
    pub binding: ResultBinding,
    /// How `children` assemble; meaningful only when non-empty.
    pub construction: Construction,
    pub span: Span,
}

/// Placeholder standing for "inline the fragment identified by X here."
///
/// Arguments are positional, matched against the fragment's declared
/// parameter list during expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRef {
    pub module: Option<ModuleId>,
    pub name: String,
    pub args: Vec<ArgValue>,
    pub span: Span,
}

/// One requested field in the expanded, fragment-free tree.
///
/// Immutable after construction by convention: the pipeline builds a
/// fresh tree per call site and only the variable lifter rewrites
/// argument values in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionNode {
    /// Wire name, distinct from any host-language alias.
    pub name: String,
    pub args: Vec<Argument>,
    /// Ordered child selections; empty for scalar fields.
    pub children: Vec<SelectionNode>,
    pub binding: ResultBinding,
    pub construction: Construction,
    pub span: Span,
}

impl SelectionNode {
    /// Structural identity for sibling merging: (wire name, arguments).
    ///
    /// Bindings, children, and spans are excluded; two nodes with the same
    /// identity must be merged, not duplicated.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args
    }

    pub fn is_scalar(&self) -> bool {
        self.children.is_empty()
    }
}
