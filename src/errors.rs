// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for fabric topology and reachability operations
//!
//! Every fallible operation in this crate returns [`FabricError`]. The kinds
//! are closed on purpose so call sites can decide, explicitly, whether a
//! failure blocks the caller or is a plain negative answer:
//!
//! - [`FabricError::Structural`]: malformed input (bad port name, wrong
//!   variant count, unparsable CIDR or IP)
//! - [`FabricError::NotFound`]: a referenced object is missing from the store
//! - [`FabricError::RelationshipViolation`]: objects exist but break a
//!   cross-object invariant (duplicate port, redundancy mismatch, VLAN overlap)
//! - [`FabricError::Unavailable`]: the read interface itself failed

use std::error::Error as StdError;

use thiserror::Error;

use crate::objects::Kind;

/// Boxed underlying cause carried by structural errors
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur in fabric operations
#[derive(Debug, Error)]
pub enum FabricError {
    /// Malformed input
    #[error("structural error: {message}")]
    Structural {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    /// Referenced object does not exist
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: Kind,
        namespace: String,
        name: String,
    },

    /// Cross-object invariant violated
    #[error("relationship violation: {message}")]
    RelationshipViolation { message: String },

    /// Object store could not be read
    #[error("object store unavailable: {message}")]
    Unavailable { message: String },
}

/// Result type for fabric operations
pub type FabricResult<T> = Result<T, FabricError>;

impl FabricError {
    pub fn structural(message: impl Into<String>) -> Self {
        FabricError::Structural {
            message: message.into(),
            cause: None,
        }
    }

    /// Structural error wrapping the parse failure that triggered it
    pub fn structural_with_cause(
        message: impl Into<String>,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        FabricError::Structural {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn not_found(kind: Kind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        FabricError::NotFound {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn relationship(message: impl Into<String>) -> Self {
        FabricError::RelationshipViolation {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        FabricError::Unavailable {
            message: message.into(),
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, FabricError::Structural { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FabricError::NotFound { .. })
    }

    pub fn is_relationship_violation(&self) -> bool {
        matches!(self, FabricError::RelationshipViolation { .. })
    }
}

impl From<serde_json::Error> for FabricError {
    fn from(err: serde_json::Error) -> Self {
        FabricError::structural_with_cause("invalid object encoding", err)
    }
}

impl From<ipnet::AddrParseError> for FabricError {
    fn from(err: ipnet::AddrParseError) -> Self {
        FabricError::structural_with_cause("invalid CIDR prefix", err)
    }
}

impl From<std::net::AddrParseError> for FabricError {
    fn from(err: std::net::AddrParseError) -> Self {
        FabricError::structural_with_cause("invalid IP address", err)
    }
}

impl From<async_nats::RequestError> for FabricError {
    fn from(err: async_nats::RequestError) -> Self {
        FabricError::unavailable(err.to_string())
    }
}
