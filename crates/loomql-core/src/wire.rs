//! Wire-protocol type names.

use serde::{Deserialize, Serialize};

/// The type of a variable or argument as the request protocol understands
/// it, not as the host language does.
///
/// Renders in the protocol's own notation: `Int`, `Int!`, `[Int!]`,
/// `[Int!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    Named(String),
    NonNull(Box<WireType>),
    List(Box<WireType>),
}

impl WireType {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::NonNull(inner) => write!(f, "{}!", inner),
            Self::List(inner) => write!(f, "[{}]", inner),
        }
    }
}
