//! Core data structures for the LoomQL typed query compiler.
//!
//! Three layers:
//! - **Input boundary** (`expr`): the already-parsed, walkable typed
//!   query-expression tree the host build pipeline hands to the compiler.
//! - **Selection AST** (`ast`): the lowered tree the compiler pipeline
//!   operates on, in two stages (with fragment placeholders, and expanded).
//! - **Common types** (`span`, `wire`): spans, module identities, and
//!   wire-protocol types shared by every stage.

pub mod ast;
pub mod expr;
pub mod span;
pub mod wire;

pub use ast::{
    ArgValue, Argument, Construction, FieldSelect, FragmentRef, ResultBinding, Selection,
    SelectionNode,
};
pub use expr::{
    ArgExpr, CallSite, CompilationUnit, FieldExpr, FragmentDecl, FragmentParam, InputId, LitValue,
    ModuleInput, OperationKind, SelectExpr,
};
pub use span::{Location, ModuleId, Span};
pub use wire::WireType;
