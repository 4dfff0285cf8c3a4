//! Registry errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block state is missing its name or its properties compound.
    #[error("malformed block state: {0}")]
    MalformedState(String),

    /// An item or block definition does not have a usable shape.
    #[error("invalid type for {identifier}: {reason}")]
    InvalidType { identifier: String, reason: String },

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("identifier already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("numeric id {id} is already mapped to {existing}")]
    IdCollision { id: i16, existing: String },

    #[error("{namespace} id space exhausted (limit {limit})")]
    IdSpaceExhausted { namespace: &'static str, limit: i32 },

    #[error("invalid id range: blocks start at {first_block}, items start at {first_item}")]
    InvalidIdRange { first_block: i32, first_item: i32 },

    #[error("protocol {0} is not active")]
    UnsupportedProtocol(i32),

    #[error("the block palette has already been finalized")]
    AlreadyFinalized,

    /// The host's base catalog is corrupt. Not recoverable.
    #[error("assumption violated: {0}")]
    AssumptionViolation(String),
}

impl RegistryError {
    pub(crate) fn invalid_type(identifier: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidType {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the process can keep serving clients after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegistryError::AssumptionViolation(_))
    }
}
