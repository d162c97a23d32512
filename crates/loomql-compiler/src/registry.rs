//! Fragment discovery and identity resolution.
//!
//! Two-phase model: the discovery phase collects every declaration site
//! across all modules (including separately compiled units surfaced
//! through [`FragmentSource`]) keyed by identity, then [`RegistryBuilder::freeze`]
//! assembles each identity's contributions into one immutable
//! [`FragmentDefinition`]. Resolution only ever sees frozen definitions,
//! so declaration order never matters.

use indexmap::IndexMap;

use loomql_core::{
    Construction, FragmentDecl, FragmentParam, FragmentRef, ModuleId, ModuleInput, Selection, Span,
};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::lower;
use crate::PassResult;

/// Identity of a fragment: declaring module + name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId {
    pub module: ModuleId,
    pub name: String,
}

impl FragmentId {
    pub fn new(module: ModuleId, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// A frozen, fully assembled fragment.
///
/// Created once per distinct identity during discovery; immutable after
/// freeze; referenced, never copied, by the resolver (expansion clones
/// the body by value into each call site).
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDefinition {
    pub id: FragmentId,
    /// Wire type the fragment applies to.
    pub on_type: String,
    pub params: Vec<FragmentParam>,
    pub body: Vec<Selection>,
    /// How the fragment's selections assemble when it is the sole
    /// selection of a field.
    pub construction: Construction,
    pub span: Span,
}

/// Fragment declarations visible from a separately compiled unit.
///
/// The registry does not know how external units are packaged; it only
/// needs to enumerate the declarations they expose.
pub trait FragmentSource {
    fn fragments(&self) -> Vec<FragmentDecl>;
}

/// Discovery-phase accumulator.
#[derive(Default)]
pub struct RegistryBuilder {
    contributions: IndexMap<FragmentId, Vec<FragmentDecl>>,
    imports: IndexMap<ModuleId, Vec<ModuleId>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one module's declarations and import list.
    pub fn add_module(&mut self, module: &ModuleInput) {
        self.imports
            .entry(module.id.clone())
            .or_default()
            .extend(module.imports.iter().cloned());
        for decl in &module.fragments {
            self.add_decl(decl.clone());
        }
    }

    /// Record declarations from a separately compiled unit.
    pub fn add_source(&mut self, source: &dyn FragmentSource) {
        for decl in source.fragments() {
            self.add_decl(decl);
        }
    }

    fn add_decl(&mut self, decl: FragmentDecl) {
        let id = FragmentId::new(decl.module.clone(), decl.name.clone());
        self.contributions.entry(id).or_default().push(decl);
    }

    /// Assemble all contributions into immutable definitions.
    ///
    /// Partial declarations with one identity merge into a single body;
    /// colliding non-partial declarations raise `DuplicateFragment`. A
    /// definition is never observable half-assembled: resolution starts
    /// only after this returns.
    pub fn freeze(self, fuel: u32) -> PassResult<FragmentRegistry> {
        let mut diagnostics = Diagnostics::new();
        let mut defs = IndexMap::new();

        for (id, decls) in self.contributions {
            let first = &decls[0];

            for later in &decls[1..] {
                let collides = !first.partial || !later.partial;
                let agrees = later.on_type == first.on_type && later.params == first.params;
                if collides || !agrees {
                    let mut builder = diagnostics
                        .report(
                            DiagnosticKind::DuplicateFragment,
                            later.module.clone(),
                            later.span,
                        )
                        .message(id.name.clone())
                        .related_to(first.module.clone(), first.span, "first declared here");
                    if !agrees {
                        builder =
                            builder.hint("contributions disagree on parameters or target type");
                    }
                    builder.emit();
                }
            }

            let mut body = Vec::new();
            let mut construction = Construction::Properties;
            for decl in &decls {
                let ((lowered, decl_construction), decl_diags) =
                    lower::lower_fragment_body(decl, fuel)?;
                diagnostics.extend(decl_diags);
                body.extend(lowered);
                // The sole non-property construction wins; partials that
                // merge are property-style by nature.
                if decl_construction != Construction::Properties {
                    construction = decl_construction;
                }
            }

            defs.insert(
                id.clone(),
                FragmentDefinition {
                    id,
                    on_type: first.on_type.clone(),
                    params: first.params.clone(),
                    body,
                    construction,
                    span: first.span,
                },
            );
        }

        Ok((
            FragmentRegistry {
                defs,
                imports: self.imports,
            },
            diagnostics,
        ))
    }
}

/// Read-only fragment table shared by every call site's resolution.
#[derive(Debug, Clone, Default)]
pub struct FragmentRegistry {
    defs: IndexMap<FragmentId, FragmentDefinition>,
    imports: IndexMap<ModuleId, Vec<ModuleId>>,
}

impl FragmentRegistry {
    pub fn get(&self, id: &FragmentId) -> Option<&FragmentDefinition> {
        self.defs.get(id)
    }

    /// Resolve a reference from the given module.
    ///
    /// Qualified references go straight to their declaring module.
    /// Unqualified references search the referencing module first, then
    /// its imports in declaration order.
    pub fn lookup(&self, from: &ModuleId, reference: &FragmentRef) -> Option<&FragmentDefinition> {
        if let Some(module) = &reference.module {
            return self.get(&FragmentId::new(module.clone(), reference.name.clone()));
        }

        let local = FragmentId::new(from.clone(), reference.name.clone());
        if let Some(def) = self.get(&local) {
            return Some(def);
        }

        for import in self.imports.get(from).into_iter().flatten() {
            let id = FragmentId::new(import.clone(), reference.name.clone());
            if let Some(def) = self.get(&id) {
                return Some(def);
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.defs.values()
    }
}
