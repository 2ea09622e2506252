//! Error handling for the Ember IR library
//!
//! Every failure in this crate family is a recoverable contract violation
//! reported as an explicit `Result` at the failing call. Nothing here is
//! raised as a panic in library code.

use thiserror::Error;

/// Errors reported by the IR construction API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// Malformed type construction parameters, e.g. an integer width
    /// out of range or a zero-length vector
    #[error("invalid type shape: {reason}")]
    InvalidShape { reason: String },

    /// A build operation was called while the builder is unpositioned
    #[error("builder has no insertion point")]
    NoInsertionPoint,

    /// Operand access out of range
    #[error("operand index {index} out of range ({count} operands)")]
    OperandIndex { index: usize, count: usize },

    /// Successor access out of range
    #[error("successor index {index} out of range ({count} successors)")]
    SuccessorIndex { index: usize, count: usize },

    /// Aggregate index path access out of range
    #[error("index path entry {index} out of range ({count} entries)")]
    IndexPath { index: usize, count: usize },

    /// Name collision when attaching a function to a module
    #[error("duplicate definition of `{name}`")]
    DuplicateDefinition { name: String },

    /// A handle was reinterpreted as a variant it does not match
    #[error("expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl IrError {
    /// Create an `InvalidShape` error with the given reason
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        IrError::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Create a `DuplicateDefinition` error for the given name
    pub fn duplicate(name: impl Into<String>) -> Self {
        IrError::DuplicateDefinition { name: name.into() }
    }

    /// Create a `KindMismatch` error
    pub fn kind_mismatch(expected: &'static str, found: &'static str) -> Self {
        IrError::KindMismatch { expected, found }
    }
}
