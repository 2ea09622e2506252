//! Support types shared across the IR crates
//!
//! Handle identifiers are plain indices into module-owned arenas; they
//! denote relationships, never ownership. The enums in this module are
//! the closed sets of flags an instruction can carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Function identifier within a module
pub type FuncId = u32;

/// Basic block identifier within a module
pub type BlockId = u32;

/// Instruction identifier within a module
pub type InstrId = u32;

/// Address space of a pointer type
///
/// Address space 0 is the generic one and the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressSpace(u32);

impl AddressSpace {
    pub fn new(value: u32) -> Self {
        AddressSpace(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Check whether this is the generic address space
    pub fn is_generic(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addrspace({})", self.0)
    }
}

/// Overflow behavior for integer add, sub and mul
///
/// Fixed at instruction creation; `None` is plain wrapping arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapSemantics {
    #[default]
    None,
    NoSignedWrap,
    NoUnsignedWrap,
}

impl WrapSemantics {
    pub const ALL: [WrapSemantics; 3] = [
        WrapSemantics::None,
        WrapSemantics::NoSignedWrap,
        WrapSemantics::NoUnsignedWrap,
    ];

    /// Flag mnemonic, empty for plain wrapping arithmetic
    pub fn flag(&self) -> &'static str {
        match self {
            WrapSemantics::None => "",
            WrapSemantics::NoSignedWrap => "nsw",
            WrapSemantics::NoUnsignedWrap => "nuw",
        }
    }
}

/// Atomic memory ordering for loads and stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtomicOrdering {
    #[default]
    NotAtomic,
    Unordered,
    Monotonic,
    Acquire,
    Release,
    AcquireRelease,
    SequentiallyConsistent,
}

impl AtomicOrdering {
    pub const ALL: [AtomicOrdering; 7] = [
        AtomicOrdering::NotAtomic,
        AtomicOrdering::Unordered,
        AtomicOrdering::Monotonic,
        AtomicOrdering::Acquire,
        AtomicOrdering::Release,
        AtomicOrdering::AcquireRelease,
        AtomicOrdering::SequentiallyConsistent,
    ];

    /// Ordering mnemonic, empty for non-atomic accesses
    pub fn flag(&self) -> &'static str {
        match self {
            AtomicOrdering::NotAtomic => "",
            AtomicOrdering::Unordered => "unordered",
            AtomicOrdering::Monotonic => "monotonic",
            AtomicOrdering::Acquire => "acquire",
            AtomicOrdering::Release => "release",
            AtomicOrdering::AcquireRelease => "acq_rel",
            AtomicOrdering::SequentiallyConsistent => "seq_cst",
        }
    }
}

/// Integer comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    Equal,
    NotEqual,
    UnsignedGreaterThan,
    UnsignedGreaterOrEqual,
    UnsignedLessThan,
    UnsignedLessOrEqual,
    SignedGreaterThan,
    SignedGreaterOrEqual,
    SignedLessThan,
    SignedLessOrEqual,
}

impl IntPredicate {
    pub const ALL: [IntPredicate; 10] = [
        IntPredicate::Equal,
        IntPredicate::NotEqual,
        IntPredicate::UnsignedGreaterThan,
        IntPredicate::UnsignedGreaterOrEqual,
        IntPredicate::UnsignedLessThan,
        IntPredicate::UnsignedLessOrEqual,
        IntPredicate::SignedGreaterThan,
        IntPredicate::SignedGreaterOrEqual,
        IntPredicate::SignedLessThan,
        IntPredicate::SignedLessOrEqual,
    ];
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntPredicate::Equal => "eq",
            IntPredicate::NotEqual => "ne",
            IntPredicate::UnsignedGreaterThan => "ugt",
            IntPredicate::UnsignedGreaterOrEqual => "uge",
            IntPredicate::UnsignedLessThan => "ult",
            IntPredicate::UnsignedLessOrEqual => "ule",
            IntPredicate::SignedGreaterThan => "sgt",
            IntPredicate::SignedGreaterOrEqual => "sge",
            IntPredicate::SignedLessThan => "slt",
            IntPredicate::SignedLessOrEqual => "sle",
        };
        write!(f, "{}", s)
    }
}

/// Floating-point comparison predicates
///
/// Ordered predicates are false when either operand is NaN, unordered
/// predicates are true. `AlwaysFalse` and `AlwaysTrue` ignore the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatPredicate {
    AlwaysFalse,
    OrderedEqual,
    OrderedGreaterThan,
    OrderedGreaterOrEqual,
    OrderedLessThan,
    OrderedLessOrEqual,
    OrderedNotEqual,
    Ordered,
    Unordered,
    UnorderedEqual,
    UnorderedGreaterThan,
    UnorderedGreaterOrEqual,
    UnorderedLessThan,
    UnorderedLessOrEqual,
    UnorderedNotEqual,
    AlwaysTrue,
}

impl FloatPredicate {
    pub const ALL: [FloatPredicate; 16] = [
        FloatPredicate::AlwaysFalse,
        FloatPredicate::OrderedEqual,
        FloatPredicate::OrderedGreaterThan,
        FloatPredicate::OrderedGreaterOrEqual,
        FloatPredicate::OrderedLessThan,
        FloatPredicate::OrderedLessOrEqual,
        FloatPredicate::OrderedNotEqual,
        FloatPredicate::Ordered,
        FloatPredicate::Unordered,
        FloatPredicate::UnorderedEqual,
        FloatPredicate::UnorderedGreaterThan,
        FloatPredicate::UnorderedGreaterOrEqual,
        FloatPredicate::UnorderedLessThan,
        FloatPredicate::UnorderedLessOrEqual,
        FloatPredicate::UnorderedNotEqual,
        FloatPredicate::AlwaysTrue,
    ];
}

impl fmt::Display for FloatPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FloatPredicate::AlwaysFalse => "false",
            FloatPredicate::OrderedEqual => "oeq",
            FloatPredicate::OrderedGreaterThan => "ogt",
            FloatPredicate::OrderedGreaterOrEqual => "oge",
            FloatPredicate::OrderedLessThan => "olt",
            FloatPredicate::OrderedLessOrEqual => "ole",
            FloatPredicate::OrderedNotEqual => "one",
            FloatPredicate::Ordered => "ord",
            FloatPredicate::Unordered => "uno",
            FloatPredicate::UnorderedEqual => "ueq",
            FloatPredicate::UnorderedGreaterThan => "ugt",
            FloatPredicate::UnorderedGreaterOrEqual => "uge",
            FloatPredicate::UnorderedLessThan => "ult",
            FloatPredicate::UnorderedLessOrEqual => "ule",
            FloatPredicate::UnorderedNotEqual => "une",
            FloatPredicate::AlwaysTrue => "true",
        };
        write!(f, "{}", s)
    }
}

/// Calling conventions a call site or function can carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallConvention {
    #[default]
    C,
    Fast,
    Cold,
    Ghc,
    HiPE,
    WebKitJs,
    AnyReg,
    PreserveMost,
    PreserveAll,
    Swift,
    CxxFastTls,
    X86Stdcall,
    X86Fastcall,
    ArmApcs,
    ArmAapcs,
    ArmAapcsVfp,
}

impl CallConvention {
    pub const ALL: [CallConvention; 16] = [
        CallConvention::C,
        CallConvention::Fast,
        CallConvention::Cold,
        CallConvention::Ghc,
        CallConvention::HiPE,
        CallConvention::WebKitJs,
        CallConvention::AnyReg,
        CallConvention::PreserveMost,
        CallConvention::PreserveAll,
        CallConvention::Swift,
        CallConvention::CxxFastTls,
        CallConvention::X86Stdcall,
        CallConvention::X86Fastcall,
        CallConvention::ArmApcs,
        CallConvention::ArmAapcs,
        CallConvention::ArmAapcsVfp,
    ];
}

impl fmt::Display for CallConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallConvention::C => "ccc",
            CallConvention::Fast => "fastcc",
            CallConvention::Cold => "coldcc",
            CallConvention::Ghc => "ghccc",
            CallConvention::HiPE => "hipecc",
            CallConvention::WebKitJs => "webkit_jscc",
            CallConvention::AnyReg => "anyregcc",
            CallConvention::PreserveMost => "preserve_mostcc",
            CallConvention::PreserveAll => "preserve_allcc",
            CallConvention::Swift => "swiftcc",
            CallConvention::CxxFastTls => "cxx_fast_tlscc",
            CallConvention::X86Stdcall => "x86_stdcallcc",
            CallConvention::X86Fastcall => "x86_fastcallcc",
            CallConvention::ArmApcs => "arm_apcscc",
            CallConvention::ArmAapcs => "arm_aapcscc",
            CallConvention::ArmAapcsVfp => "arm_aapcs_vfpcc",
        };
        write!(f, "{}", s)
    }
}
