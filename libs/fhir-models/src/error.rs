//! Error types for resource models

use crate::resource::{ResourceId, ResourceKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dangling reference: {0} was never created in this registry")]
    DanglingReference(ResourceId),

    #[error("Resource {0} is already registered")]
    DuplicateResource(ResourceId),

    #[error("Kind mismatch for {id}: expected {expected}, found {found}")]
    KindMismatch {
        id: ResourceId,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("{kind} resources do not carry a `{edge}` edge")]
    UnsupportedEdge {
        kind: ResourceKind,
        edge: &'static str,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
