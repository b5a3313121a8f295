//! Error taxonomy.
//!
//! Every variant is raised at a construction or encoding boundary. The search
//! strategies themselves never fail: the root cut is always available as a
//! fallback answer.

use thiserror::Error;

/// Errors produced while building or validating engine inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KmError {
    /// Inconsistent, cyclic or ragged ancestor chains.
    #[error("malformed hierarchy: {0}")]
    MalformedHierarchy(String),

    /// A transaction references an item absent from the hierarchy.
    #[error("unknown item `{0}`")]
    UnknownItem(String),

    /// A parameter outside its domain (`k < 1`, `m < 1`, subset size 0).
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A subset iterator was advanced past its last combination.
    #[error("subset iterator advanced past its last combination")]
    ExhaustedIterator,
}

impl KmError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedHierarchy(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = KmError> = std::result::Result<T, E>;
