//! LoomQL compiler: compiles typed selection expressions into wire
//! documents and decode plans.
//!
//! Pipeline per call site:
//! - `lower` - Selection AST construction from the host expression tree
//! - `registry` - fragment discovery and identity resolution (two-phase)
//! - `resolve` - fragment expansion, cycle detection, sibling merging
//! - `lift` - variable lifting of runtime-supplied argument values
//! - `emit` - canonical document emission
//! - `bind` - decode-plan construction in lockstep with emission
//! - `driver` - per-site orchestration and diagnostics collection
//! - `diagnostics` - error reporting

pub mod bind;
pub mod diagnostics;
pub mod driver;
pub mod emit;
pub mod lift;
pub mod lower;
pub mod registry;
pub mod resolve;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod lift_tests;
#[cfg(test)]
mod lower_tests;

/// Result type for pipeline passes that produce both output and
/// diagnostics.
///
/// Each pass returns its typed output alongside any diagnostics it
/// collected. Fatal errors (like recursion fuel exhaustion) use the outer
/// `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use driver::{CompilePass, Compiler, SiteFailure};
pub use registry::{FragmentDefinition, FragmentId, FragmentRegistry, FragmentSource};

/// Errors that abort a compilation pass outright.
///
/// Per-call-site problems are never fatal; they surface as diagnostics
/// attached to the failing site while sibling sites keep compiling.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Recursion fuel exhausted (input expression nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
