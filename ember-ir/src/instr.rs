//! Instruction model
//!
//! Every emittable operation is one `Opcode` paired with an `InstrKind`
//! payload holding the state meaningful to that opcode only. All
//! instructions share the operand list and, for terminators, the successor
//! list. Kind-specific accessors fail with `KindMismatch` when called on
//! the wrong opcode instead of panicking.
//!
//! Instructions are created and appended by the builder in one step; they
//! never exist detached from a block.

use ember_common::{
    AtomicOrdering, BlockId, CallConvention, FloatPredicate, IntPredicate, IrError, WrapSemantics,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attr::Attribute;
use crate::types::Type;
use crate::value::{Constant, Value};

/// Sentinel returned for "don't care" shuffle mask positions
pub const UNDEF_MASK_ELEMENT: i64 = -1;

/// Closed set of operation tags, one per build operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // Terminators
    Return,
    Branch,
    CondBranch,
    Switch,
    IndirectBranch,
    Unreachable,

    // Unary arithmetic
    FloatNeg,

    // Binary arithmetic
    IntAdd,
    IntSub,
    IntMul,
    SignedDiv,
    UnsignedDiv,
    SignedRem,
    UnsignedRem,
    LeftShift,
    LogicalShiftRight,
    ArithmeticShiftRight,
    And,
    Or,
    Xor,
    FloatAdd,
    FloatSub,
    FloatMul,
    FloatDiv,
    FloatRem,

    // Memory
    Alloca,
    Load,
    Store,
    GetElementPtr,

    // Vector and aggregate
    ExtractElement,
    InsertElement,
    ShuffleVector,
    ExtractValue,
    InsertValue,

    // Comparison
    IntCompare,
    FloatCompare,

    // Control data
    Phi,
    Select,

    // Call
    Call,

    // Casts
    IntTrunc,
    ZeroExt,
    SignExt,
    FloatTrunc,
    FloatExt,
    FloatToUnsigned,
    FloatToSigned,
    UnsignedToFloat,
    SignedToFloat,
    PtrToInt,
    IntToPtr,
    BitCast,
    AddrSpaceCast,
}

impl Opcode {
    /// Whether this opcode ends a basic block's control flow
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::Return
                | Opcode::Branch
                | Opcode::CondBranch
                | Opcode::Switch
                | Opcode::IndirectBranch
                | Opcode::Unreachable
        )
    }

    /// Whether this opcode converts a value to another type
    pub fn is_cast(self) -> bool {
        matches!(
            self,
            Opcode::IntTrunc
                | Opcode::ZeroExt
                | Opcode::SignExt
                | Opcode::FloatTrunc
                | Opcode::FloatExt
                | Opcode::FloatToUnsigned
                | Opcode::FloatToSigned
                | Opcode::UnsignedToFloat
                | Opcode::SignedToFloat
                | Opcode::PtrToInt
                | Opcode::IntToPtr
                | Opcode::BitCast
                | Opcode::AddrSpaceCast
        )
    }

    /// Textual mnemonic used by the renderer
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Return => "ret",
            Opcode::Branch | Opcode::CondBranch => "br",
            Opcode::Switch => "switch",
            Opcode::IndirectBranch => "indirectbr",
            Opcode::Unreachable => "unreachable",
            Opcode::FloatNeg => "fneg",
            Opcode::IntAdd => "add",
            Opcode::IntSub => "sub",
            Opcode::IntMul => "mul",
            Opcode::SignedDiv => "sdiv",
            Opcode::UnsignedDiv => "udiv",
            Opcode::SignedRem => "srem",
            Opcode::UnsignedRem => "urem",
            Opcode::LeftShift => "shl",
            Opcode::LogicalShiftRight => "lshr",
            Opcode::ArithmeticShiftRight => "ashr",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::FloatAdd => "fadd",
            Opcode::FloatSub => "fsub",
            Opcode::FloatMul => "fmul",
            Opcode::FloatDiv => "fdiv",
            Opcode::FloatRem => "frem",
            Opcode::Alloca => "alloca",
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::GetElementPtr => "getelementptr",
            Opcode::ExtractElement => "extractelement",
            Opcode::InsertElement => "insertelement",
            Opcode::ShuffleVector => "shufflevector",
            Opcode::ExtractValue => "extractvalue",
            Opcode::InsertValue => "insertvalue",
            Opcode::IntCompare => "icmp",
            Opcode::FloatCompare => "fcmp",
            Opcode::Phi => "phi",
            Opcode::Select => "select",
            Opcode::Call => "call",
            Opcode::IntTrunc => "trunc",
            Opcode::ZeroExt => "zext",
            Opcode::SignExt => "sext",
            Opcode::FloatTrunc => "fptrunc",
            Opcode::FloatExt => "fpext",
            Opcode::FloatToUnsigned => "fptoui",
            Opcode::FloatToSigned => "fptosi",
            Opcode::UnsignedToFloat => "uitofp",
            Opcode::SignedToFloat => "sitofp",
            Opcode::PtrToInt => "ptrtoint",
            Opcode::IntToPtr => "inttoptr",
            Opcode::BitCast => "bitcast",
            Opcode::AddrSpaceCast => "addrspacecast",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Per-opcode extra state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstrKind {
    /// Opcodes with no extra state beyond operands and successors
    Plain,

    /// Switch: (case value, destination) pairs; the default destination
    /// is successor 0
    Switch { cases: Vec<(Constant, BlockId)> },

    /// Integer/float binary arithmetic flags, fixed at creation
    Binary { wrap: WrapSemantics, exact: bool },

    /// Stack allocation of a type
    Alloca { allocated: Type },

    /// Memory load; ordering and volatility are mutable after creation
    Load {
        ordering: AtomicOrdering,
        volatile: bool,
    },

    /// Memory store; ordering and volatility are mutable after creation
    Store {
        ordering: AtomicOrdering,
        volatile: bool,
    },

    /// Shuffle with an immutable constant mask
    ShuffleVector { mask: Constant },

    /// Ordered index path into a nested aggregate
    AggregateIndex { indices: Vec<u32> },

    IntCompare { predicate: IntPredicate },

    FloatCompare { predicate: FloatPredicate },

    /// Incoming blocks, paired positionally with the operand list
    Phi { incoming_blocks: Vec<BlockId> },

    Call {
        convention: CallConvention,
        tail_call: bool,
        attributes: Vec<Attribute>,
    },

    /// Cast target type
    Cast { to: Type },

    GetElementPtr { in_bounds: bool },
}

/// One IR operation: an opcode, its operands, and for terminators the
/// successor blocks control may transfer to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instr {
    pub(crate) opcode: Opcode,
    pub(crate) operands: Vec<Value>,
    pub(crate) successors: Vec<BlockId>,
    pub(crate) kind: InstrKind,
    pub(crate) ty: Type,
    pub(crate) name: Option<String>,
    pub(crate) block: BlockId,
}

impl Instr {
    pub(crate) fn new(
        opcode: Opcode,
        operands: Vec<Value>,
        successors: Vec<BlockId>,
        kind: InstrKind,
        ty: Type,
        name: Option<String>,
    ) -> Self {
        Instr {
            opcode,
            operands,
            successors,
            kind,
            ty,
            name,
            // overwritten on insertion
            block: 0,
        }
    }

    fn mismatch(&self, expected: &'static str) -> IrError {
        IrError::kind_mismatch(expected, self.opcode.mnemonic())
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Result type; `void` for instructions that define no value
    pub fn result_type(&self) -> &Type {
        &self.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// The block this instruction was inserted into
    pub fn parent_block(&self) -> BlockId {
        self.block
    }

    pub fn is_terminator(&self) -> bool {
        self.opcode.is_terminator()
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    pub fn operands(&self) -> &[Value] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> Result<&Value, IrError> {
        self.operands.get(index).ok_or(IrError::OperandIndex {
            index,
            count: self.operands.len(),
        })
    }

    pub fn successor_count(&self) -> usize {
        self.successors.len()
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn successor(&self, index: usize) -> Result<BlockId, IrError> {
        self.successors
            .get(index)
            .copied()
            .ok_or(IrError::SuccessorIndex {
                index,
                count: self.successors.len(),
            })
    }

    /// Replace a control edge without rebuilding the instruction
    pub fn set_successor(&mut self, index: usize, block: BlockId) -> Result<(), IrError> {
        let count = self.successors.len();
        match self.successors.get_mut(index) {
            Some(slot) => {
                *slot = block;
                Ok(())
            }
            None => Err(IrError::SuccessorIndex { index, count }),
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.opcode == Opcode::CondBranch
    }

    /// Condition operand of a conditional branch
    pub fn condition(&self) -> Result<&Value, IrError> {
        if self.opcode != Opcode::CondBranch {
            return Err(self.mismatch("conditional branch"));
        }
        self.operand(0)
    }

    pub fn set_condition(&mut self, condition: Value) -> Result<(), IrError> {
        if self.opcode != Opcode::CondBranch {
            return Err(self.mismatch("conditional branch"));
        }
        self.operands[0] = condition;
        Ok(())
    }

    /// Default destination of a switch (successor 0)
    pub fn default_destination(&self) -> Result<BlockId, IrError> {
        match self.kind {
            InstrKind::Switch { .. } => self.successor(0),
            _ => Err(self.mismatch("switch")),
        }
    }

    /// Append a (case value, destination) pair to a switch
    pub fn add_case(&mut self, value: Constant, destination: BlockId) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Switch { cases } => {
                cases.push((value, destination));
                self.successors.push(destination);
                Ok(())
            }
            _ => Err(self.mismatch("switch")),
        }
    }

    pub fn cases(&self) -> Result<&[(Constant, BlockId)], IrError> {
        match &self.kind {
            InstrKind::Switch { cases } => Ok(cases),
            _ => Err(self.mismatch("switch")),
        }
    }

    /// Append a possible destination to an indirect branch
    pub fn add_destination(&mut self, block: BlockId) -> Result<(), IrError> {
        if self.opcode != Opcode::IndirectBranch {
            return Err(self.mismatch("indirect branch"));
        }
        self.successors.push(block);
        Ok(())
    }

    /// Wrap semantics of integer add, sub and mul
    pub fn wrap_semantics(&self) -> Result<WrapSemantics, IrError> {
        match self.kind {
            InstrKind::Binary { wrap, .. } => Ok(wrap),
            _ => Err(self.mismatch("binary operator")),
        }
    }

    /// Exact flag of signed/unsigned division
    pub fn is_exact(&self) -> Result<bool, IrError> {
        match self.kind {
            InstrKind::Binary { exact, .. } => Ok(exact),
            _ => Err(self.mismatch("binary operator")),
        }
    }

    pub fn allocated_type(&self) -> Result<&Type, IrError> {
        match &self.kind {
            InstrKind::Alloca { allocated } => Ok(allocated),
            _ => Err(self.mismatch("alloca")),
        }
    }

    pub fn is_volatile(&self) -> Result<bool, IrError> {
        match self.kind {
            InstrKind::Load { volatile, .. } | InstrKind::Store { volatile, .. } => Ok(volatile),
            _ => Err(self.mismatch("memory access")),
        }
    }

    pub fn set_volatile(&mut self, value: bool) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Load { volatile, .. } | InstrKind::Store { volatile, .. } => {
                *volatile = value;
                Ok(())
            }
            _ => Err(self.mismatch("memory access")),
        }
    }

    pub fn ordering(&self) -> Result<AtomicOrdering, IrError> {
        match self.kind {
            InstrKind::Load { ordering, .. } | InstrKind::Store { ordering, .. } => Ok(ordering),
            _ => Err(self.mismatch("memory access")),
        }
    }

    pub fn set_ordering(&mut self, value: AtomicOrdering) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Load { ordering, .. } | InstrKind::Store { ordering, .. } => {
                *ordering = value;
                Ok(())
            }
            _ => Err(self.mismatch("memory access")),
        }
    }

    /// Number of lanes in a shuffle mask
    pub fn mask_element_count(&self) -> Result<usize, IrError> {
        match &self.kind {
            InstrKind::ShuffleVector { mask } => match mask {
                Constant::Vector { elements, .. } => Ok(elements.len()),
                _ => Ok(1),
            },
            _ => Err(self.mismatch("shufflevector")),
        }
    }

    /// Mask lane value; undefined lanes yield `UNDEF_MASK_ELEMENT`
    pub fn mask_element(&self, index: usize) -> Result<i64, IrError> {
        let mask = match &self.kind {
            InstrKind::ShuffleVector { mask } => mask,
            _ => return Err(self.mismatch("shufflevector")),
        };
        let element = match mask {
            Constant::Vector { elements, .. } => {
                elements.get(index).ok_or(IrError::IndexPath {
                    index,
                    count: elements.len(),
                })?
            }
            single if index == 0 => single,
            _ => return Err(IrError::IndexPath { index, count: 1 }),
        };
        match element {
            Constant::Int { value, .. } => Ok(*value),
            _ => Ok(UNDEF_MASK_ELEMENT),
        }
    }

    /// Index path of extractvalue/insertvalue
    pub fn indices(&self) -> Result<&[u32], IrError> {
        match &self.kind {
            InstrKind::AggregateIndex { indices } => Ok(indices),
            _ => Err(self.mismatch("aggregate access")),
        }
    }

    pub fn index_count(&self) -> Result<usize, IrError> {
        Ok(self.indices()?.len())
    }

    pub fn index(&self, position: usize) -> Result<u32, IrError> {
        let indices = self.indices()?;
        indices.get(position).copied().ok_or(IrError::IndexPath {
            index: position,
            count: indices.len(),
        })
    }

    pub fn int_predicate(&self) -> Result<IntPredicate, IrError> {
        match self.kind {
            InstrKind::IntCompare { predicate } => Ok(predicate),
            _ => Err(self.mismatch("icmp")),
        }
    }

    pub fn float_predicate(&self) -> Result<FloatPredicate, IrError> {
        match self.kind {
            InstrKind::FloatCompare { predicate } => Ok(predicate),
            _ => Err(self.mismatch("fcmp")),
        }
    }

    pub fn incoming_count(&self) -> Result<usize, IrError> {
        match &self.kind {
            InstrKind::Phi { incoming_blocks } => Ok(incoming_blocks.len()),
            _ => Err(self.mismatch("phi")),
        }
    }

    /// Append an incoming (block, value) pair to a phi
    pub fn add_incoming(&mut self, block: BlockId, value: Value) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Phi { incoming_blocks } => {
                incoming_blocks.push(block);
                self.operands.push(value);
                Ok(())
            }
            _ => Err(self.mismatch("phi")),
        }
    }

    /// Incoming pair in insertion order
    pub fn incoming(&self, index: usize) -> Result<(BlockId, &Value), IrError> {
        match &self.kind {
            InstrKind::Phi { incoming_blocks } => {
                let block = incoming_blocks.get(index).ok_or(IrError::OperandIndex {
                    index,
                    count: incoming_blocks.len(),
                })?;
                Ok((*block, &self.operands[index]))
            }
            _ => Err(self.mismatch("phi")),
        }
    }

    pub fn is_tail_call(&self) -> Result<bool, IrError> {
        match self.kind {
            InstrKind::Call { tail_call, .. } => Ok(tail_call),
            _ => Err(self.mismatch("call")),
        }
    }

    pub fn set_tail_call(&mut self, value: bool) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Call { tail_call, .. } => {
                *tail_call = value;
                Ok(())
            }
            _ => Err(self.mismatch("call")),
        }
    }

    pub fn call_convention(&self) -> Result<CallConvention, IrError> {
        match self.kind {
            InstrKind::Call { convention, .. } => Ok(convention),
            _ => Err(self.mismatch("call")),
        }
    }

    pub fn set_call_convention(&mut self, value: CallConvention) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Call { convention, .. } => {
                *convention = value;
                Ok(())
            }
            _ => Err(self.mismatch("call")),
        }
    }

    /// The callee, which is operand 0 of a call
    pub fn called_value(&self) -> Result<&Value, IrError> {
        match self.kind {
            InstrKind::Call { .. } => self.operand(0),
            _ => Err(self.mismatch("call")),
        }
    }

    /// Number of call arguments, excluding the callee
    pub fn argument_count(&self) -> Result<usize, IrError> {
        match self.kind {
            InstrKind::Call { .. } => Ok(self.operands.len().saturating_sub(1)),
            _ => Err(self.mismatch("call")),
        }
    }

    /// Call argument by position
    pub fn argument(&self, index: usize) -> Result<&Value, IrError> {
        let count = self.argument_count()?;
        if index >= count {
            return Err(IrError::OperandIndex { index, count });
        }
        self.operand(index + 1)
    }

    /// Attach an attribute to this call site
    pub fn add_call_attribute(&mut self, attribute: Attribute) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::Call { attributes, .. } => {
                attributes.push(attribute);
                Ok(())
            }
            _ => Err(self.mismatch("call")),
        }
    }

    pub fn call_attributes(&self) -> Result<&[Attribute], IrError> {
        match &self.kind {
            InstrKind::Call { attributes, .. } => Ok(attributes),
            _ => Err(self.mismatch("call")),
        }
    }

    /// Target type of a cast
    pub fn cast_target_type(&self) -> Result<&Type, IrError> {
        match &self.kind {
            InstrKind::Cast { to } => Ok(to),
            _ => Err(self.mismatch("cast")),
        }
    }

    pub fn is_in_bounds(&self) -> Result<bool, IrError> {
        match self.kind {
            InstrKind::GetElementPtr { in_bounds } => Ok(in_bounds),
            _ => Err(self.mismatch("getelementptr")),
        }
    }

    pub fn set_in_bounds(&mut self, value: bool) -> Result<(), IrError> {
        match &mut self.kind {
            InstrKind::GetElementPtr { in_bounds } => {
                *in_bounds = value;
                Ok(())
            }
            _ => Err(self.mismatch("getelementptr")),
        }
    }
}
