//! Selection AST construction from the host's typed expression tree.
//!
//! Lowering is the only pass that looks at [`SelectExpr`]; everything
//! downstream operates on [`Selection`] trees. Constructs the AST cannot
//! represent are rejected here with `UnsupportedSelectionShape` — there
//! is no partial lowering of a call site.

use loomql_core::{
    ArgExpr, ArgValue, Argument, CallSite, Construction, FieldExpr, FieldSelect, FragmentDecl,
    FragmentRef, LitValue, ModuleId, ResultBinding, SelectExpr, Selection, Span,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::{Error, PassResult};

/// Lower a call site's body into a selection set plus the construction
/// style of the operation result.
pub fn lower_call_site(site: &CallSite, fuel: u32) -> PassResult<(Vec<Selection>, Construction)> {
    let mut ctx = LowerCtx::new(&site.module);
    let out = ctx.lower_body(&site.body, fuel)?;
    if out.0.is_empty() && !ctx.diagnostics.has_errors() {
        ctx.report_empty(site.body.span());
    }
    Ok((out, ctx.diagnostics))
}

/// Lower one fragment declaration site's body.
pub fn lower_fragment_body(
    decl: &FragmentDecl,
    fuel: u32,
) -> PassResult<(Vec<Selection>, Construction)> {
    let mut ctx = LowerCtx::new(&decl.module);
    let out = ctx.lower_body(&decl.body, fuel)?;
    if out.0.is_empty() && !ctx.diagnostics.has_errors() {
        ctx.report_empty(decl.body.span());
    }
    Ok((out, ctx.diagnostics))
}

struct LowerCtx<'a> {
    module: &'a ModuleId,
    diagnostics: Diagnostics,
}

impl<'a> LowerCtx<'a> {
    fn new(module: &'a ModuleId) -> Self {
        Self {
            module,
            diagnostics: Diagnostics::new(),
        }
    }

    fn report_empty(&mut self, span: Span) {
        self.diagnostics
            .report(
                DiagnosticKind::UnsupportedSelectionShape,
                self.module.clone(),
                span,
            )
            .message("selection set is empty")
            .emit();
    }

    /// Lower a selection-position expression into (children, construction).
    ///
    /// The construction describes how the produced siblings assemble into
    /// the enclosing value; the enclosing field node carries it.
    fn lower_body(
        &mut self,
        expr: &SelectExpr,
        fuel: u32,
    ) -> crate::Result<(Vec<Selection>, Construction)> {
        if fuel == 0 {
            return Err(Error::RecursionLimitExceeded);
        }

        match expr {
            SelectExpr::Field(field) => {
                let binding = Self::implicit_binding(field);
                let lowered = self.lower_field(field, binding, fuel - 1)?;
                Ok((vec![lowered], Construction::Properties))
            }
            SelectExpr::Fragment { .. } => {
                let mut out = Vec::new();
                self.lower_sibling(expr, &mut out, None, fuel - 1)?;
                Ok((out, Construction::Properties))
            }
            SelectExpr::Props { fields, .. } => {
                let mut out = Vec::new();
                for field in fields {
                    self.lower_sibling(field, &mut out, None, fuel - 1)?;
                }
                self.check_sibling_bindings(&out);
                Ok((out, Construction::Properties))
            }
            SelectExpr::New {
                type_name, args, ..
            } => {
                let mut out = Vec::new();
                for (position, arg) in args.iter().enumerate() {
                    let binding = ResultBinding::ConstructorArg(position as u32);
                    self.lower_sibling(arg, &mut out, Some(binding), fuel - 1)?;
                }
                Ok((out, Construction::Constructor(type_name.clone())))
            }
            SelectExpr::Init {
                type_name, entries, ..
            } => {
                let mut out = Vec::new();
                for (entry_name, entry) in entries {
                    let binding = ResultBinding::InitializerEntry(entry_name.clone());
                    self.lower_sibling(entry, &mut out, Some(binding), fuel - 1)?;
                }
                self.check_sibling_bindings(&out);
                Ok((out, Construction::Initializer(type_name.clone())))
            }
            SelectExpr::Opaque { reason, span } => {
                self.diagnostics
                    .report(
                        DiagnosticKind::UnsupportedSelectionShape,
                        self.module.clone(),
                        *span,
                    )
                    .message(reason.clone())
                    .emit();
                Ok((Vec::new(), Construction::Properties))
            }
        }
    }

    /// Lower one sibling inside a selection set.
    ///
    /// `binding` overrides the field's implicit binding when the enclosing
    /// expression is a constructor or initializer.
    fn lower_sibling(
        &mut self,
        expr: &SelectExpr,
        out: &mut Vec<Selection>,
        binding: Option<ResultBinding>,
        fuel: u32,
    ) -> crate::Result<()> {
        if fuel == 0 {
            return Err(Error::RecursionLimitExceeded);
        }

        match expr {
            SelectExpr::Field(field) => {
                let binding = binding.unwrap_or_else(|| Self::implicit_binding(field));
                let lowered = self.lower_field(field, binding, fuel - 1)?;
                out.push(lowered);
            }
            SelectExpr::Fragment {
                module,
                name,
                args,
                span,
            } => {
                if binding.is_some() {
                    // A fragment contributes a whole field set; it cannot
                    // fill a single positional or named slot.
                    self.diagnostics
                        .report(
                            DiagnosticKind::UnsupportedSelectionShape,
                            self.module.clone(),
                            *span,
                        )
                        .message("a fragment cannot supply a single constructor or initializer slot")
                        .emit();
                    return Ok(());
                }
                let mut lowered_args = Vec::with_capacity(args.len());
                for arg in args {
                    lowered_args.push(self.lower_arg(arg, fuel - 1)?);
                }
                out.push(Selection::FragmentRef(FragmentRef {
                    module: module.clone(),
                    name: name.clone(),
                    args: lowered_args,
                    span: *span,
                }));
            }
            other => {
                self.diagnostics
                    .report(
                        DiagnosticKind::UnsupportedSelectionShape,
                        self.module.clone(),
                        other.span(),
                    )
                    .message("expected a field access or fragment application")
                    .emit();
            }
        }
        Ok(())
    }

    fn lower_field(
        &mut self,
        field: &FieldExpr,
        binding: ResultBinding,
        fuel: u32,
    ) -> crate::Result<Selection> {
        if fuel == 0 {
            return Err(Error::RecursionLimitExceeded);
        }

        let mut args = Vec::with_capacity(field.args.len());
        for (name, value) in &field.args {
            let value = self.lower_arg(value, fuel - 1)?;
            args.push(Argument::new(name.clone(), value));
        }

        let (children, construction) = match &field.selection {
            Some(selection) => {
                let before = self.diagnostics.len();
                let (children, construction) = self.lower_body(selection, fuel - 1)?;
                if children.is_empty() && self.diagnostics.len() == before {
                    self.report_empty(selection.span());
                }
                (children, construction)
            }
            None => (Vec::new(), Construction::Properties),
        };

        Ok(Selection::Field(FieldSelect {
            name: field.name.clone(),
            args,
            children,
            binding,
            construction,
            span: field.span,
        }))
    }

    fn lower_arg(&mut self, arg: &ArgExpr, fuel: u32) -> crate::Result<ArgValue> {
        if fuel == 0 {
            return Err(Error::RecursionLimitExceeded);
        }

        Ok(match arg {
            // The document grammar has no spelling for non-finite floats.
            ArgExpr::Lit(LitValue::Float(x)) if !x.is_finite() => {
                ArgValue::Opaque(format!("non-finite float literal `{x}`"))
            }
            ArgExpr::Lit(lit) => ArgValue::Lit(lit.clone()),
            ArgExpr::Input {
                id,
                name,
                wire_type,
                ..
            } => ArgValue::Input {
                id: *id,
                name: name.clone(),
                wire_type: wire_type.clone(),
            },
            // Leftover parameters (used outside a fragment, or never
            // substituted) are rejected by the variable lifter.
            ArgExpr::Param { name, .. } => ArgValue::Param(name.clone()),
            ArgExpr::Object(entries) => {
                let mut lowered = Vec::with_capacity(entries.len());
                for (name, value) in entries {
                    lowered.push((name.clone(), self.lower_arg(value, fuel - 1)?));
                }
                ArgValue::Object(lowered)
            }
            ArgExpr::List(items) => {
                let mut lowered = Vec::with_capacity(items.len());
                for item in items {
                    lowered.push(self.lower_arg(item, fuel - 1)?);
                }
                ArgValue::List(lowered)
            }
            ArgExpr::Opaque { reason, .. } => ArgValue::Opaque(reason.clone()),
        })
    }

    /// Two distinct sibling fields bound to the same result slot can not
    /// be mapped unambiguously. Identical (name, args) siblings are fine;
    /// the resolver merges them into one node.
    fn check_sibling_bindings(&mut self, siblings: &[Selection]) {
        for (i, a) in siblings.iter().enumerate() {
            let Selection::Field(a) = a else { continue };
            for b in &siblings[i + 1..] {
                let Selection::Field(b) = b else { continue };
                let same_identity = a.name == b.name && a.args == b.args;
                if !same_identity && a.binding.target() == b.binding.target() {
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
    }

    fn implicit_binding(field: &FieldExpr) -> ResultBinding {
        let property = field.property.clone().unwrap_or_else(|| field.name.clone());
        ResultBinding::Property(property)
    }
}
