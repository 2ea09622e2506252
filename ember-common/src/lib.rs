//! Ember IR - Common Types and Utilities
//!
//! This crate holds the pieces shared by the IR crates: the error
//! taxonomy and the small supporting enums (comparison predicates,
//! calling conventions, atomic orderings, wrap semantics) together
//! with the plain index handles used to reference arena-owned IR
//! objects.

pub mod error;
pub mod types;

pub use error::IrError;
pub use types::{
    AddressSpace, AtomicOrdering, BlockId, CallConvention, FloatPredicate, FuncId, InstrId,
    IntPredicate, WrapSemantics,
};
