//! Decode-plan construction.
//!
//! Projects the expanded selection tree into the steps a response
//! decoder follows. The traversal is the same pre-order walk the
//! emitter uses, so plan steps line up with document fields position
//! for position.

use loomql_core::{Construction, ModuleId, ResultBinding, SelectionNode};
use loomql_plan::{DecodePlan, DecodeStep};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::PassResult;

/// Build the decode plan for one call site.
///
/// `construction` is how the operation result itself is assembled;
/// nested assembly styles come from the tree. Ambiguities that only
/// become visible after fragment expansion (two fields bound to one
/// slot, mixed binding styles inside one node) are rejected here.
pub fn bind(
    result_type: &str,
    construction: Construction,
    selection: &[SelectionNode],
    module: &ModuleId,
) -> PassResult<DecodePlan> {
    let mut binder = Binder {
        module,
        diagnostics: Diagnostics::new(),
    };

    binder.check_level(selection, &construction);
    let roots = selection.iter().map(|node| binder.bind_node(node)).collect();

    let plan = DecodePlan {
        result_type: result_type.to_string(),
        construction,
        roots,
    };
    Ok((plan, binder.diagnostics))
}

struct Binder<'a> {
    module: &'a ModuleId,
    diagnostics: Diagnostics,
}

impl Binder<'_> {
    fn bind_node(&mut self, node: &SelectionNode) -> DecodeStep {
        if node.is_scalar() {
            return DecodeStep::Scalar {
                field: node.name.clone(),
                binding: node.binding.clone(),
            };
        }

        self.check_level(&node.children, &node.construction);
        DecodeStep::Object {
            field: node.name.clone(),
            binding: node.binding.clone(),
            construction: node.construction.clone(),
            children: node
                .children
                .iter()
                .map(|child| self.bind_node(child))
                .collect(),
        }
    }

    /// Reject sibling sets a decoder could not map deterministically.
    fn check_level(&mut self, siblings: &[SelectionNode], construction: &Construction) {
        for (i, a) in siblings.iter().enumerate() {
            for b in &siblings[i + 1..] {
                // Same-identity siblings were merged during expansion, so
                // equal targets here mean two different fields fight over
                // one slot.
                if a.binding.target() == b.binding.target() {
                    self.diagnostics
                        .report(
                            DiagnosticKind::AmbiguousFieldBinding,
                            self.module.clone(),
                            b.span,
                        )
                        .message(b.binding.target())
                        .related_to(self.module.clone(), a.span, "also bound here")
                        .emit();
                }
            }
        }

        for node in siblings {
            if !binding_fits(&node.binding, construction) {
                self.diagnostics
                    .report(
                        DiagnosticKind::AmbiguousFieldBinding,
                        self.module.clone(),
                        node.span,
                    )
                    .message(node.binding.target())
                    .hint(format!(
                        "`{}` does not participate in {construction} assembly",
                        node.name
                    ))
                    .emit();
            }
        }
    }
}

/// Whether a child binding is usable under the parent's assembly style.
fn binding_fits(binding: &ResultBinding, construction: &Construction) -> bool {
    match construction {
        Construction::Properties => matches!(binding, ResultBinding::Property(_)),
        Construction::Constructor(_) => matches!(binding, ResultBinding::ConstructorArg(_)),
        Construction::Initializer(_) => matches!(
            binding,
            ResultBinding::InitializerEntry(_) | ResultBinding::Property(_)
        ),
    }
}
