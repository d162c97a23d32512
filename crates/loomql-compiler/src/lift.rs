//! Variable lifting: hoist runtime inputs into operation variables.
//!
//! Walks the expanded tree in pre-order and rewrites every
//! [`ArgValue::Input`] occurrence into a `$variable` reference. One
//! input produces exactly one variable no matter how many argument
//! positions mention it; two distinct inputs never share a variable.
//! Pure literals are left in place for the emitter to inline.

use indexmap::IndexMap;
use indexmap::IndexSet;

use loomql_core::{ArgValue, InputId, ModuleId, SelectionNode, Span};
use loomql_plan::VariableBinding;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::PassResult;

/// Lift runtime inputs out of the tree into a variable list.
///
/// The returned bindings are ordered by first occurrence in the
/// document, which keeps the declaration list byte-stable across runs.
pub fn lift(nodes: &mut [SelectionNode], module: &ModuleId) -> PassResult<Vec<VariableBinding>> {
    let mut lifter = Lifter {
        module,
        diagnostics: Diagnostics::new(),
        variables: Vec::new(),
        by_input: IndexMap::new(),
        taken: IndexSet::new(),
    };

    for node in nodes.iter_mut() {
        lifter.lift_node(node);
    }

    Ok((lifter.variables, lifter.diagnostics))
}

struct Lifter<'a> {
    module: &'a ModuleId,
    diagnostics: Diagnostics,
    variables: Vec<VariableBinding>,
    /// Input -> index into `variables`.
    by_input: IndexMap<InputId, usize>,
    taken: IndexSet<String>,
}

impl Lifter<'_> {
    fn lift_node(&mut self, node: &mut SelectionNode) {
        let span = node.span;
        for arg in &mut node.args {
            Self::lift_value(
                &mut arg.value,
                span,
                &mut self.variables,
                &mut self.by_input,
                &mut self.taken,
                &mut self.diagnostics,
                self.module,
            );
        }
        for child in &mut node.children {
            self.lift_node(child);
        }
    }

    fn lift_value(
        value: &mut ArgValue,
        span: Span,
        variables: &mut Vec<VariableBinding>,
        by_input: &mut IndexMap<InputId, usize>,
        taken: &mut IndexSet<String>,
        diagnostics: &mut Diagnostics,
        module: &ModuleId,
    ) {
        match value {
            ArgValue::Input {
                id,
                name,
                wire_type,
            } => {
                let index = match by_input.get(id) {
                    Some(index) => *index,
                    None => {
                        let unique = Self::unique_name(name, taken);
                        variables.push(VariableBinding {
                            name: unique,
                            wire_type: wire_type.clone(),
                            input: *id,
                        });
                        let index = variables.len() - 1;
                        by_input.insert(*id, index);
                        index
                    }
                };
                *value = ArgValue::Var(variables[index].name.clone());
            }
            ArgValue::Param(name) => {
                diagnostics
                    .report(
                        DiagnosticKind::UnsupportedArgumentShape,
                        module.clone(),
                        span,
                    )
                    .message(format!("fragment parameter `{}` has no binding", name))
                    .emit();
            }
            ArgValue::Opaque(reason) => {
                diagnostics
                    .report(
                        DiagnosticKind::UnsupportedArgumentShape,
                        module.clone(),
                        span,
                    )
                    .message(reason.clone())
                    .emit();
            }
            ArgValue::Object(entries) => {
                for (_, entry) in entries {
                    Self::lift_value(entry, span, variables, by_input, taken, diagnostics, module);
                }
            }
            ArgValue::List(items) => {
                for item in items {
                    Self::lift_value(item, span, variables, by_input, taken, diagnostics, module);
                }
            }
            ArgValue::Lit(_) | ArgValue::Var(_) => {}
        }
    }

    /// First input keeps its declared name; later inputs that would
    /// collide get a numeric suffix starting at 2.
    fn unique_name(declared: &str, taken: &mut IndexSet<String>) -> String {
        if taken.insert(declared.to_string()) {
            return declared.to_string();
        }
        let mut counter = 2u32;
        loop {
            let candidate = format!("{declared}{counter}");
            if taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
