//! Function and call-site attributes
//!
//! Attributes come in two flavors: enumerated kinds with an optional
//! integer argument, and free-form string key/value pairs. This library
//! only stores them and hands them back; interpretation belongs to
//! whatever backend consumes the IR.

use ember_common::IrError;
use serde::{Deserialize, Serialize};

/// Enumerated attribute kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    AlwaysInline,
    Cold,
    Hot,
    InlineHint,
    MinSize,
    NoInline,
    NoReturn,
    NoUnwind,
    OptimizeNone,
    ReadNone,
    ReadOnly,
    Speculatable,
    WillReturn,
}

/// An attribute attached to a function, a parameter, the return slot
/// or a call site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Enumerated attribute with an optional integer payload
    Enum { kind: AttributeKind, value: u64 },

    /// Free-form string attribute
    String { kind: String, value: String },
}

impl Attribute {
    pub fn enumerated(kind: AttributeKind, value: u64) -> Self {
        Attribute::Enum { kind, value }
    }

    pub fn string(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute::String {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Attribute::Enum { .. })
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Attribute::String { .. })
    }

    /// Enumerated kind, failing on string attributes
    pub fn enum_kind(&self) -> Result<AttributeKind, IrError> {
        match self {
            Attribute::Enum { kind, .. } => Ok(*kind),
            Attribute::String { .. } => Err(IrError::kind_mismatch(
                "enum attribute",
                "string attribute",
            )),
        }
    }

    /// Integer payload of an enumerated attribute
    pub fn enum_value(&self) -> Result<u64, IrError> {
        match self {
            Attribute::Enum { value, .. } => Ok(*value),
            Attribute::String { .. } => Err(IrError::kind_mismatch(
                "enum attribute",
                "string attribute",
            )),
        }
    }

    /// Key of a string attribute, failing on enumerated attributes
    pub fn string_kind(&self) -> Result<&str, IrError> {
        match self {
            Attribute::String { kind, .. } => Ok(kind),
            Attribute::Enum { .. } => Err(IrError::kind_mismatch(
                "string attribute",
                "enum attribute",
            )),
        }
    }

    /// Value of a string attribute
    pub fn string_value(&self) -> Result<&str, IrError> {
        match self {
            Attribute::String { value, .. } => Ok(value),
            Attribute::Enum { .. } => Err(IrError::kind_mismatch(
                "string attribute",
                "enum attribute",
            )),
        }
    }
}
