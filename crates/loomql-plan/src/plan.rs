//! Artifact types: compiled operations, variable bindings, decode plans.

use serde::{Deserialize, Serialize};

use loomql_core::{Construction, InputId, OperationKind, ResultBinding, SelectionNode, WireType};

/// One compiled variable: its name in the document, its wire type, and
/// the runtime input that supplies its value at call time.
///
/// Names are unique per operation. The same originating input used twice
/// in a selection yields one binding, referenced twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub name: String,
    pub wire_type: WireType,
    pub input: InputId,
}

/// One step of the decode plan.
///
/// Steps mirror the emitted selection tree node for node: scalar fields
/// become extract-and-convert leaves, object fields become nested steps
/// whose children assemble per the construction descriptor. The binding
/// tag is consumed uniformly regardless of construction style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodeStep {
    /// Extract the response field and convert it into the bound slot.
    Scalar {
        field: String,
        binding: ResultBinding,
    },
    /// Decode a nested response object and assemble it.
    Object {
        field: String,
        binding: ResultBinding,
        construction: Construction,
        children: Vec<DecodeStep>,
    },
}

impl DecodeStep {
    pub fn field(&self) -> &str {
        match self {
            Self::Scalar { field, .. } | Self::Object { field, .. } => field,
        }
    }

    pub fn binding(&self) -> &ResultBinding {
        match self {
            Self::Scalar { binding, .. } | Self::Object { binding, .. } => binding,
        }
    }
}

/// Decode plan for one operation.
///
/// Decoding convention: when `roots` holds a single step, the operation
/// result *is* that step's decoded value; with several roots the result
/// type is assembled from them like any object node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodePlan {
    /// The caller's declared result type.
    pub result_type: String,
    /// How the roots assemble into the result type when there are
    /// several of them.
    pub construction: Construction,
    pub roots: Vec<DecodeStep>,
}

impl DecodePlan {
    /// Field names in decode order (pre-order walk).
    ///
    /// By construction this equals the order the document emitter visited
    /// fields in; tests assert the correspondence.
    pub fn field_order(&self) -> Vec<String> {
        fn walk(steps: &[DecodeStep], out: &mut Vec<String>) {
            for step in steps {
                out.push(step.field().to_string());
                if let DecodeStep::Object { children, .. } = step {
                    walk(children, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }

    pub fn step_count(&self) -> usize {
        fn count(steps: &[DecodeStep]) -> usize {
            steps
                .iter()
                .map(|step| match step {
                    DecodeStep::Scalar { .. } => 1,
                    DecodeStep::Object { children, .. } => 1 + count(children),
                })
                .sum()
        }
        count(&self.roots)
    }
}

/// The final artifact for one call site.
///
/// Created once per successful call site; immutable; exclusively owns its
/// selection tree (fragments were expanded by value, so two call sites
/// sharing a fragment share nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledOperation {
    pub kind: OperationKind,
    pub name: Option<String>,
    /// Ordered as the variables appear in the document signature.
    pub variables: Vec<VariableBinding>,
    /// Expanded, fragment-free, variable-lifted selection tree.
    pub selection: Vec<SelectionNode>,
    /// Canonical document text. Byte-stable across rebuilds.
    pub document: String,
    pub decode_plan: DecodePlan,
}
