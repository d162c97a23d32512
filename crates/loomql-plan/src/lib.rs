//! Compiled operation artifact for LoomQL.
//!
//! A [`CompiledOperation`] is what transport and decoding glue consume:
//! the document text to send, the ordered variable table to bind by name,
//! and the decode plan to walk against the parsed response. The compiler
//! guarantees the document and the decode plan were produced from the
//! same expanded selection tree in the same order.

mod binary;
mod dump;
mod plan;


pub use binary::PlanError;
pub use dump::PlanPrinter;
pub use plan::{CompiledOperation, DecodePlan, DecodeStep, VariableBinding};
