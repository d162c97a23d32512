//! Pipeline orchestration.
//!
//! One [`Compiler`] run covers a whole compilation unit: discovery
//! freezes the fragment registry once, then every call site runs
//! lower → expand → lift → emit → bind against it. Sites are
//! independent; a failing site never blocks its siblings, and a site
//! with errors publishes no operation at all.

use loomql_core::{CompilationUnit, Location};
use loomql_plan::CompiledOperation;

use crate::diagnostics::{DiagnosticKind, DiagnosticMessage, Diagnostics};
use crate::emit::DocumentEmitter;
use crate::registry::{FragmentRegistry, FragmentSource, RegistryBuilder};
use crate::{bind, lift, lower, resolve, Error};

/// Expansion and lowering depth limit. Generous for any hand-written
/// query; a cycle that slips past detection still terminates.
pub const DEFAULT_RECURSION_FUEL: u32 = 1024;

/// Compiles every call site in a unit.
#[must_use]
pub struct Compiler<'a> {
    unit: &'a CompilationUnit,
    sources: Vec<&'a dyn FragmentSource>,
    fuel: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(unit: &'a CompilationUnit) -> Self {
        Self {
            unit,
            sources: Vec::new(),
            fuel: DEFAULT_RECURSION_FUEL,
        }
    }

    /// Add fragments from a separately compiled unit.
    pub fn with_source(mut self, source: &'a dyn FragmentSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_recursion_fuel(mut self, fuel: u32) -> Self {
        self.fuel = fuel;
        self
    }

    pub fn exec(self) -> crate::Result<CompilePass> {
        let mut builder = RegistryBuilder::new();
        for module in &self.unit.modules {
            builder.add_module(module);
        }
        for source in &self.sources {
            builder.add_source(*source);
        }
        let (registry, discovery) = builder.freeze(self.fuel)?;

        let mut operations = Vec::new();
        let mut failures = Vec::new();

        for site in self.unit.call_sites() {
            let location = Location::new(site.module.clone(), site.span);
            // Fuel exhaustion is scoped to the offending site, like any
            // other per-site problem.
            let diagnostics = match self.compile_site(site, &registry) {
                Ok(Ok(operation)) => {
                    operations.push(operation);
                    continue;
                }
                Ok(Err(diagnostics)) => diagnostics,
                Err(Error::RecursionLimitExceeded) => {
                    let mut diagnostics = Diagnostics::new();
                    diagnostics
                        .report(
                            DiagnosticKind::UnsupportedSelectionShape,
                            site.module.clone(),
                            site.span,
                        )
                        .message("selection nesting exceeds the recursion limit")
                        .emit();
                    diagnostics
                }
            };
            failures.push(SiteFailure {
                site: location,
                diagnostics,
            });
        }

        Ok(CompilePass {
            operations,
            failures,
            discovery,
        })
    }

    /// Run one call site through the pipeline.
    ///
    /// The outer error is fuel exhaustion, converted into a site failure
    /// by the caller; the inner one carries the site's diagnostics.
    fn compile_site(
        &self,
        site: &loomql_core::CallSite,
        registry: &FragmentRegistry,
    ) -> crate::Result<Result<CompiledOperation, Diagnostics>> {
        let mut diagnostics = Diagnostics::new();

        let ((selections, construction), lower_diags) = lower::lower_call_site(site, self.fuel)?;
        diagnostics.extend(lower_diags);

        let ((mut nodes, construction), expand_diags) =
            resolve::expand(&selections, construction, &site.module, registry, self.fuel)?;
        diagnostics.extend(expand_diags);

        let (variables, lift_diags) = lift::lift(&mut nodes, &site.module)?;
        diagnostics.extend(lift_diags);

        if diagnostics.has_errors() {
            return Ok(Err(diagnostics));
        }

        let document = DocumentEmitter::new(site.kind, &nodes)
            .named(site.name.as_deref())
            .with_variables(&variables)
            .dump();

        let (decode_plan, bind_diags) =
            bind::bind(&site.result_type, construction, &nodes, &site.module)?;
        diagnostics.extend(bind_diags);

        if diagnostics.has_errors() {
            return Ok(Err(diagnostics));
        }

        Ok(Ok(CompiledOperation {
            kind: site.kind,
            name: site.name.clone(),
            variables,
            selection: nodes,
            document,
            decode_plan,
        }))
    }
}

/// A call site that produced errors instead of an operation.
#[derive(Debug)]
pub struct SiteFailure {
    pub site: Location,
    pub diagnostics: Diagnostics,
}

/// Outcome of one compiler run.
#[derive(Debug)]
pub struct CompilePass {
    /// Successfully compiled operations, in call-site order.
    pub operations: Vec<CompiledOperation>,
    /// Sites that failed, with their diagnostics.
    pub failures: Vec<SiteFailure>,
    /// Diagnostics from fragment discovery, shared by all sites.
    pub discovery: Diagnostics,
}

impl CompilePass {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.discovery.has_errors()
    }

    /// All diagnostics of the run: discovery first, then per-site in
    /// call-site order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.discovery
            .iter()
            .chain(self.failures.iter().flat_map(|f| f.diagnostics.iter()))
    }
}
