//! Binary serialization of compiled operations using postcard.
//!
//! Lets the host build pipeline cache artifacts between rebuilds; the
//! document text inside is byte-stable, so cached and fresh artifacts
//! compare equal.

use super::plan::CompiledOperation;

/// Errors when reading a serialized artifact.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("binary artifact decode failed: {0}")]
    Binary(#[from] postcard::Error),
}

impl CompiledOperation {
    /// Deserialize an artifact from binary format.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, PlanError> {
        postcard::from_bytes(bytes).map_err(PlanError::from)
    }

    /// Serialize the artifact to binary format.
    pub fn to_binary(&self) -> Vec<u8> {
        postcard::to_allocvec(self).expect("serialization should not fail")
    }
}
