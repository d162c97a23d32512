//! Fragment expansion: depth-first, by value, with cycle detection and
//! sibling merging.
//!
//! Every [`FragmentRef`] is replaced by a fresh copy of its definition's
//! subtree, with fragment-local parameters rewritten to the caller's
//! values. Nested references expand recursively, resolved relative to
//! the *defining* module. After substitution, sibling selections with
//! identical (name, arguments) identity merge into one node whose
//! children are the recursive union of both. Expansion is deterministic
//! and never depends on registry iteration order.

use indexmap::IndexMap;

use loomql_core::{
    ArgValue, Argument, Construction, FieldSelect, FragmentRef, ModuleId, Selection, SelectionNode,
    Span,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::registry::{FragmentId, FragmentRegistry};
use crate::{Error, PassResult};

/// Expand a lowered selection set into a fragment-free tree.
///
/// `construction` is the set's own style from lowering; when the set is
/// a single fragment application, the definition's style is adopted
/// instead. Cycles are fatal to the call site and reported as
/// `CircularFragment` naming the full cycle.
pub fn expand(
    selections: &[Selection],
    construction: Construction,
    module: &ModuleId,
    registry: &FragmentRegistry,
    fuel: u32,
) -> PassResult<(Vec<SelectionNode>, Construction)> {
    let mut expander = Expander {
        registry,
        diagnostics: Diagnostics::new(),
        stack: Vec::new(),
    };

    let bindings = Bindings::new();
    let (nodes, adopted) = expander.expand_set(selections, module, &bindings, fuel)?;
    let construction = match (construction, adopted) {
        (Construction::Properties, Some(from_fragment)) => from_fragment,
        (own, _) => own,
    };

    Ok(((nodes, construction), expander.diagnostics))
}

/// Fragment-parameter values in the current expansion scope.
type Bindings = IndexMap<String, ArgValue>;

struct Expander<'a> {
    registry: &'a FragmentRegistry,
    diagnostics: Diagnostics,
    /// Fragments currently being expanded, with the site that applied
    /// each one. Re-entering any of them is a cycle.
    stack: Vec<(FragmentId, ModuleId, Span)>,
}

impl Expander<'_> {
    /// Expand one selection set.
    ///
    /// Returns the merged nodes plus the construction adopted from a
    /// definition when the set was exactly one fragment application.
    fn expand_set(
        &mut self,
        selections: &[Selection],
        module: &ModuleId,
        bindings: &Bindings,
        fuel: u32,
    ) -> crate::Result<(Vec<SelectionNode>, Option<Construction>)> {
        if fuel == 0 {
            return Err(Error::RecursionLimitExceeded);
        }

        let mut nodes = Vec::new();
        let mut adopted = None;

        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    let node = self.expand_field(field, module, bindings, fuel - 1)?;
                    nodes.push(node);
                }
                Selection::FragmentRef(reference) => {
                    let construction =
                        self.expand_fragment(reference, module, bindings, &mut nodes, fuel - 1)?;
                    if selections.len() == 1 {
                        adopted = construction;
                    }
                }
            }
        }

        Ok((self.merge_set(nodes, module), adopted))
    }

    fn expand_field(
        &mut self,
        field: &FieldSelect,
        module: &ModuleId,
        bindings: &Bindings,
        fuel: u32,
    ) -> crate::Result<SelectionNode> {
        let args = field
            .args
            .iter()
            .map(|arg| Argument::new(arg.name.clone(), substitute(&arg.value, bindings)))
            .collect();

        let (children, adopted) = self.expand_set(&field.children, module, bindings, fuel)?;
        let construction = match (&field.construction, adopted) {
            (Construction::Properties, Some(from_fragment)) => from_fragment,
            (own, _) => own.clone(),
        };

        Ok(SelectionNode {
            name: field.name.clone(),
            args,
            children,
            binding: field.binding.clone(),
            construction,
            span: field.span,
        })
    }

    /// Substitute one fragment application in place, appending its
    /// expanded selections to `out`.
    fn expand_fragment(
        &mut self,
        reference: &FragmentRef,
        module: &ModuleId,
        bindings: &Bindings,
        out: &mut Vec<SelectionNode>,
        fuel: u32,
    ) -> crate::Result<Option<Construction>> {
        // Arguments are evaluated in the caller's scope before entering
        // the definition's scope.
        let args: Vec<ArgValue> = reference
            .args
            .iter()
            .map(|value| substitute(value, bindings))
            .collect();

        let Some(def) = self.registry.lookup(module, reference) else {
            self.diagnostics
                .report(
                    DiagnosticKind::UnresolvedFragment,
                    module.clone(),
                    reference.span,
                )
                .message(reference.name.clone())
                .emit();
            return Ok(None);
        };

        if let Some(position) = self.stack.iter().position(|(id, _, _)| *id == def.id) {
            self.report_cycle(position, &def.id, module, reference.span);
            return Ok(None);
        }

        if args.len() != def.params.len() {
            self.diagnostics
                .report(
                    DiagnosticKind::UnsupportedArgumentShape,
                    module.clone(),
                    reference.span,
                )
                .message(format!(
                    "fragment `{}` expects {} arguments, got {}",
                    reference.name,
                    def.params.len(),
                    args.len()
                ))
                .emit();
            return Ok(None);
        }

        let fragment_bindings: Bindings = def
            .params
            .iter()
            .map(|param| param.name.clone())
            .zip(args)
            .collect();

        self.stack
            .push((def.id.clone(), module.clone(), reference.span));
        // Nested references resolve relative to the defining module.
        let (nodes, _) = self.expand_set(&def.body, &def.id.module, &fragment_bindings, fuel)?;
        self.stack.pop();

        out.extend(nodes);
        Ok(Some(def.construction.clone()))
    }

    fn report_cycle(&mut self, position: usize, repeated: &FragmentId, module: &ModuleId, span: Span) {
        let mut names: Vec<&str> = self.stack[position..]
            .iter()
            .map(|(id, _, _)| id.name.as_str())
            .collect();
        names.push(repeated.name.as_str());

        let cycle = names
            .iter()
            .map(|name| format!("`{}`", name))
            .collect::<Vec<_>>()
            .join(" → ");

        let mut builder = self
            .diagnostics
            .report(DiagnosticKind::CircularFragment, module.clone(), span)
            .message(cycle);

        for (id, site_module, site_span) in &self.stack[position..] {
            builder = builder.related_to(
                site_module.clone(),
                *site_span,
                format!("`{}` applied here", id.name),
            );
        }
        builder.emit();
    }

    /// Merge sibling selections with identical (name, arguments) into one
    /// node, unioning their children recursively.
    fn merge_set(&mut self, nodes: Vec<SelectionNode>, module: &ModuleId) -> Vec<SelectionNode> {
        let mut merged: Vec<SelectionNode> = Vec::new();

        for node in nodes {
            if let Some(existing) = merged.iter_mut().find(|m| m.same_identity(&node)) {
                if existing.binding != node.binding {
                    self.diagnostics
                        .report(
                            DiagnosticKind::AmbiguousFieldBinding,
                            module.clone(),
                            node.span,
                        )
                        .message(node.binding.target())
                        .related_to(module.clone(), existing.span, "first bound here")
                        .emit();
                }
                if existing.construction == Construction::Properties
                    && node.construction != Construction::Properties
                {
                    existing.construction = node.construction;
                }
                existing.children.extend(node.children);
            } else {
                merged.push(node);
            }
        }

        for node in &mut merged {
            let children = std::mem::take(&mut node.children);
            node.children = self.merge_set(children, module);
        }

        merged
    }
}

/// Rewrite fragment-parameter placeholders using the current scope.
///
/// Unknown parameters are left in place; the variable lifter rejects any
/// that survive to the end of the pipeline.
fn substitute(value: &ArgValue, bindings: &Bindings) -> ArgValue {
    match value {
        ArgValue::Param(name) => bindings
            .get(name)
            .cloned()
            .unwrap_or_else(|| ArgValue::Param(name.clone())),
        ArgValue::Object(entries) => ArgValue::Object(
            entries
                .iter()
                .map(|(name, value)| (name.clone(), substitute(value, bindings)))
                .collect(),
        ),
        ArgValue::List(items) => {
            ArgValue::List(items.iter().map(|item| substitute(item, bindings)).collect())
        }
        other => other.clone(),
    }
}
