//! Cursor-based instruction builder
//!
//! The builder owns no IR; it is a cursor into module-owned storage plus
//! a little ambient state (fast-math tag, debug location). Every build
//! operation takes the module it mutates, creates one instruction, inserts
//! it at the cursor and advances the cursor past it.
//!
//! A builder starts unpositioned. Building without a position fails with
//! `NoInsertionPoint` rather than panicking. Positioning is never
//! invalidated by insertions through the same builder, but two builders
//! over one module can invalidate each other's cursors; the second
//! builder's inserts then land at a stale offset, clamped to the block.

use ember_common::{
    BlockId, CallConvention, FloatPredicate, InstrId, IntPredicate, IrError, WrapSemantics,
};
use log::trace;

use crate::instr::{Instr, InstrKind, Opcode};
use crate::module::Module;
use crate::types::Type;
use crate::value::{Constant, Value};

/// Source position attached to subsequently built instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugLocation {
    pub line: u32,
    pub column: u32,
}

/// Fast-math tag applied to subsequently built float operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpMathTag(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    block: BlockId,
    index: usize,
}

/// Instruction builder with an explicit insertion cursor
#[derive(Debug, Clone, Default)]
pub struct IrBuilder {
    cursor: Option<Cursor>,
    fp_math_tag: Option<FpMathTag>,
    debug_location: Option<DebugLocation>,
}

impl IrBuilder {
    /// Create an unpositioned builder
    pub fn new() -> Self {
        IrBuilder::default()
    }

    /// Position the cursor after the last instruction of a block
    pub fn position_at_end(&mut self, module: &Module, block: BlockId) {
        self.cursor = Some(Cursor {
            block,
            index: module.block(block).instructions().len(),
        });
    }

    /// Position the cursor immediately before an existing instruction
    pub fn position_before(&mut self, module: &Module, instr: InstrId) {
        let block = module.instr(instr).parent_block();
        let index = module
            .block(block)
            .instructions()
            .iter()
            .position(|id| *id == instr)
            .unwrap_or(0);
        self.cursor = Some(Cursor { block, index });
    }

    /// Drop the insertion point, returning to the unpositioned state
    pub fn clear(&mut self) {
        self.cursor = None;
    }

    /// The block the cursor currently points into
    pub fn insertion_block(&self) -> Option<BlockId> {
        self.cursor.map(|c| c.block)
    }

    pub fn fp_math_tag(&self) -> Option<&FpMathTag> {
        self.fp_math_tag.as_ref()
    }

    pub fn set_fp_math_tag(&mut self, tag: Option<FpMathTag>) {
        self.fp_math_tag = tag;
    }

    pub fn debug_location(&self) -> Option<DebugLocation> {
        self.debug_location
    }

    pub fn set_debug_location(&mut self, location: Option<DebugLocation>) {
        self.debug_location = location;
    }

    /// Insert one instruction at the cursor and advance past it
    fn insert(&mut self, module: &mut Module, mut instr: Instr) -> Result<InstrId, IrError> {
        let cursor = self.cursor.as_mut().ok_or(IrError::NoInsertionPoint)?;
        instr.block = cursor.block;

        let id = module.instrs.len() as InstrId;
        trace!(
            "inserting {} as %{} into block `{}`",
            instr.opcode,
            id,
            module.block(cursor.block).name()
        );
        module.instrs.push(instr);

        let list = &mut module.blocks[cursor.block as usize].instrs;
        // a stale cursor from a second builder may point past the end
        let at = cursor.index.min(list.len());
        list.insert(at, id);
        cursor.index = at + 1;
        Ok(id)
    }

    // ---- Terminators ----

    pub fn build_ret_void(&mut self, module: &mut Module) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(Opcode::Return, vec![], vec![], InstrKind::Plain, Type::Void, None),
        )
    }

    pub fn build_ret(&mut self, module: &mut Module, value: Value) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Return,
                vec![value],
                vec![],
                InstrKind::Plain,
                Type::Void,
                None,
            ),
        )
    }

    pub fn build_br(&mut self, module: &mut Module, dest: BlockId) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Branch,
                vec![],
                vec![dest],
                InstrKind::Plain,
                Type::Void,
                None,
            ),
        )
    }

    pub fn build_cond_br(
        &mut self,
        module: &mut Module,
        condition: Value,
        then_dest: BlockId,
        else_dest: BlockId,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::CondBranch,
                vec![condition],
                vec![then_dest, else_dest],
                InstrKind::Plain,
                Type::Void,
                None,
            ),
        )
    }

    /// Build a switch with its default destination; cases are attached
    /// afterwards with `Instr::add_case`
    pub fn build_switch(
        &mut self,
        module: &mut Module,
        condition: Value,
        default: BlockId,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Switch,
                vec![condition],
                vec![default],
                InstrKind::Switch { cases: Vec::new() },
                Type::Void,
                None,
            ),
        )
    }

    /// Build an indirect branch on a block address; possible destinations
    /// are attached afterwards with `Instr::add_destination`
    pub fn build_indirect_br(
        &mut self,
        module: &mut Module,
        address: Value,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::IndirectBranch,
                vec![address],
                vec![],
                InstrKind::Plain,
                Type::Void,
                None,
            ),
        )
    }

    pub fn build_unreachable(&mut self, module: &mut Module) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Unreachable,
                vec![],
                vec![],
                InstrKind::Plain,
                Type::Void,
                None,
            ),
        )
    }

    // ---- Arithmetic ----

    pub fn build_fneg(
        &mut self,
        module: &mut Module,
        value: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let ty = module.type_of(&value);
        self.insert(
            module,
            Instr::new(
                Opcode::FloatNeg,
                vec![value],
                vec![],
                InstrKind::Plain,
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    fn binary(
        &mut self,
        module: &mut Module,
        opcode: Opcode,
        lhs: Value,
        rhs: Value,
        wrap: WrapSemantics,
        exact: bool,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let ty = module.type_of(&lhs);
        self.insert(
            module,
            Instr::new(
                opcode,
                vec![lhs, rhs],
                vec![],
                InstrKind::Binary { wrap, exact },
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_add(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        wrap: WrapSemantics,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(module, Opcode::IntAdd, lhs, rhs, wrap, false, name)
    }

    pub fn build_sub(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        wrap: WrapSemantics,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(module, Opcode::IntSub, lhs, rhs, wrap, false, name)
    }

    pub fn build_mul(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        wrap: WrapSemantics,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(module, Opcode::IntMul, lhs, rhs, wrap, false, name)
    }

    pub fn build_sdiv(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        exact: bool,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::SignedDiv,
            lhs,
            rhs,
            WrapSemantics::None,
            exact,
            name,
        )
    }

    pub fn build_udiv(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        exact: bool,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::UnsignedDiv,
            lhs,
            rhs,
            WrapSemantics::None,
            exact,
            name,
        )
    }

    pub fn build_srem(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::SignedRem,
            lhs,
            rhs,
            WrapSemantics::None,
            false,
            name,
        )
    }

    pub fn build_urem(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::UnsignedRem,
            lhs,
            rhs,
            WrapSemantics::None,
            false,
            name,
        )
    }

    pub fn build_shl(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::LeftShift,
            lhs,
            rhs,
            WrapSemantics::None,
            false,
            name,
        )
    }

    pub fn build_lshr(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::LogicalShiftRight,
            lhs,
            rhs,
            WrapSemantics::None,
            false,
            name,
        )
    }

    pub fn build_ashr(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(
            module,
            Opcode::ArithmeticShiftRight,
            lhs,
            rhs,
            WrapSemantics::None,
            false,
            name,
        )
    }

    pub fn build_and(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(module, Opcode::And, lhs, rhs, WrapSemantics::None, false, name)
    }

    pub fn build_or(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(module, Opcode::Or, lhs, rhs, WrapSemantics::None, false, name)
    }

    pub fn build_xor(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.binary(module, Opcode::Xor, lhs, rhs, WrapSemantics::None, false, name)
    }

    fn float_binary(
        &mut self,
        module: &mut Module,
        opcode: Opcode,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let ty = module.type_of(&lhs);
        self.insert(
            module,
            Instr::new(
                opcode,
                vec![lhs, rhs],
                vec![],
                InstrKind::Plain,
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_fadd(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.float_binary(module, Opcode::FloatAdd, lhs, rhs, name)
    }

    pub fn build_fsub(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.float_binary(module, Opcode::FloatSub, lhs, rhs, name)
    }

    pub fn build_fmul(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.float_binary(module, Opcode::FloatMul, lhs, rhs, name)
    }

    pub fn build_fdiv(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.float_binary(module, Opcode::FloatDiv, lhs, rhs, name)
    }

    pub fn build_frem(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.float_binary(module, Opcode::FloatRem, lhs, rhs, name)
    }

    // ---- Memory ----

    /// Stack-allocate one value of `ty`; the result is a pointer to it
    pub fn build_alloca(
        &mut self,
        module: &mut Module,
        ty: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let result = Type::pointer(ty.clone())?;
        self.insert(
            module,
            Instr::new(
                Opcode::Alloca,
                vec![],
                vec![],
                InstrKind::Alloca { allocated: ty },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    /// Load a value of `ty` from a pointer; not atomic and not volatile
    /// until changed on the instruction
    pub fn build_load(
        &mut self,
        module: &mut Module,
        ty: Type,
        ptr: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Load,
                vec![ptr],
                vec![],
                InstrKind::Load {
                    ordering: Default::default(),
                    volatile: false,
                },
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_store(
        &mut self,
        module: &mut Module,
        value: Value,
        ptr: Value,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Store,
                vec![value, ptr],
                vec![],
                InstrKind::Store {
                    ordering: Default::default(),
                    volatile: false,
                },
                Type::Void,
                None,
            ),
        )
    }

    /// Compute an element address from a base pointer and an index path
    pub fn build_gep(
        &mut self,
        module: &mut Module,
        ptr: Value,
        indices: Vec<Value>,
        in_bounds: bool,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let base = module.type_of(&ptr);
        let result = gep_result_type(&base, &indices)?;
        let mut operands = vec![ptr];
        operands.extend(indices);
        self.insert(
            module,
            Instr::new(
                Opcode::GetElementPtr,
                operands,
                vec![],
                InstrKind::GetElementPtr { in_bounds },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    // ---- Vector and aggregate ----

    pub fn build_extract_element(
        &mut self,
        module: &mut Module,
        vector: Value,
        index: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let vec_ty = module.type_of(&vector);
        let element = vec_ty.element_type().cloned().ok_or_else(|| {
            IrError::kind_mismatch("vector", vec_ty.kind_name())
        })?;
        self.insert(
            module,
            Instr::new(
                Opcode::ExtractElement,
                vec![vector, index],
                vec![],
                InstrKind::Plain,
                element,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_insert_element(
        &mut self,
        module: &mut Module,
        vector: Value,
        value: Value,
        index: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let ty = module.type_of(&vector);
        if !ty.is_vector() {
            return Err(IrError::kind_mismatch("vector", ty.kind_name()));
        }
        self.insert(
            module,
            Instr::new(
                Opcode::InsertElement,
                vec![vector, value, index],
                vec![],
                InstrKind::Plain,
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    /// Shuffle two vectors through a constant mask; the mask fixes the
    /// result lane count
    pub fn build_shuffle_vector(
        &mut self,
        module: &mut Module,
        lhs: Value,
        rhs: Value,
        mask: Constant,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let lhs_ty = module.type_of(&lhs);
        let element = lhs_ty.element_type().cloned().ok_or_else(|| {
            IrError::kind_mismatch("vector", lhs_ty.kind_name())
        })?;
        let lanes = match &mask {
            Constant::Vector { elements, .. } => elements.len() as u32,
            _ => 1,
        };
        let result = Type::vector(element, lanes)?;
        self.insert(
            module,
            Instr::new(
                Opcode::ShuffleVector,
                vec![lhs, rhs],
                vec![],
                InstrKind::ShuffleVector { mask },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    /// Extract a nested member of an aggregate by a constant index path
    pub fn build_extract_value(
        &mut self,
        module: &mut Module,
        aggregate: Value,
        indices: Vec<u32>,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let base = module.type_of(&aggregate);
        let result = aggregate_member_type(&base, &indices)?;
        self.insert(
            module,
            Instr::new(
                Opcode::ExtractValue,
                vec![aggregate],
                vec![],
                InstrKind::AggregateIndex { indices },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    /// Insert a value into a nested member of an aggregate; the result is
    /// the whole updated aggregate
    pub fn build_insert_value(
        &mut self,
        module: &mut Module,
        aggregate: Value,
        value: Value,
        indices: Vec<u32>,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let ty = module.type_of(&aggregate);
        // the path must resolve even though the result keeps the outer type
        aggregate_member_type(&ty, &indices)?;
        self.insert(
            module,
            Instr::new(
                Opcode::InsertValue,
                vec![aggregate, value],
                vec![],
                InstrKind::AggregateIndex { indices },
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    // ---- Comparison ----

    pub fn build_icmp(
        &mut self,
        module: &mut Module,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let result = compare_result_type(&module.type_of(&lhs))?;
        self.insert(
            module,
            Instr::new(
                Opcode::IntCompare,
                vec![lhs, rhs],
                vec![],
                InstrKind::IntCompare { predicate },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_fcmp(
        &mut self,
        module: &mut Module,
        predicate: FloatPredicate,
        lhs: Value,
        rhs: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let result = compare_result_type(&module.type_of(&lhs))?;
        self.insert(
            module,
            Instr::new(
                Opcode::FloatCompare,
                vec![lhs, rhs],
                vec![],
                InstrKind::FloatCompare { predicate },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    // ---- Control data ----

    /// Build an empty phi of the given type; incoming pairs are attached
    /// afterwards with `Instr::add_incoming`
    pub fn build_phi(
        &mut self,
        module: &mut Module,
        ty: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                Opcode::Phi,
                vec![],
                vec![],
                InstrKind::Phi {
                    incoming_blocks: Vec::new(),
                },
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_select(
        &mut self,
        module: &mut Module,
        condition: Value,
        then_value: Value,
        else_value: Value,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let ty = module.type_of(&then_value);
        self.insert(
            module,
            Instr::new(
                Opcode::Select,
                vec![condition, then_value, else_value],
                vec![],
                InstrKind::Plain,
                ty,
                name.map(str::to_owned),
            ),
        )
    }

    // ---- Call ----

    /// Call a value; the result type follows the callee's signature when it
    /// has one and defaults to void otherwise
    pub fn build_call(
        &mut self,
        module: &mut Module,
        callee: Value,
        args: Vec<Value>,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        let callee_ty = module.type_of(&callee);
        let result = callee_return_type(&callee_ty);
        let mut operands = vec![callee];
        operands.extend(args);
        self.insert(
            module,
            Instr::new(
                Opcode::Call,
                operands,
                vec![],
                InstrKind::Call {
                    convention: CallConvention::default(),
                    tail_call: false,
                    attributes: Vec::new(),
                },
                result,
                name.map(str::to_owned),
            ),
        )
    }

    // ---- Casts ----

    fn cast(
        &mut self,
        module: &mut Module,
        opcode: Opcode,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.insert(
            module,
            Instr::new(
                opcode,
                vec![value],
                vec![],
                InstrKind::Cast { to: to.clone() },
                to,
                name.map(str::to_owned),
            ),
        )
    }

    pub fn build_trunc(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::IntTrunc, value, to, name)
    }

    pub fn build_zext(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::ZeroExt, value, to, name)
    }

    pub fn build_sext(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::SignExt, value, to, name)
    }

    pub fn build_fptrunc(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::FloatTrunc, value, to, name)
    }

    pub fn build_fpext(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::FloatExt, value, to, name)
    }

    pub fn build_fptoui(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::FloatToUnsigned, value, to, name)
    }

    pub fn build_fptosi(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::FloatToSigned, value, to, name)
    }

    pub fn build_uitofp(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::UnsignedToFloat, value, to, name)
    }

    pub fn build_sitofp(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::SignedToFloat, value, to, name)
    }

    pub fn build_ptrtoint(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::PtrToInt, value, to, name)
    }

    pub fn build_inttoptr(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::IntToPtr, value, to, name)
    }

    pub fn build_bitcast(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::BitCast, value, to, name)
    }

    pub fn build_addrspacecast(
        &mut self,
        module: &mut Module,
        value: Value,
        to: Type,
        name: Option<&str>,
    ) -> Result<InstrId, IrError> {
        self.cast(module, Opcode::AddrSpaceCast, value, to, name)
    }
}

/// Type reached by stepping a pointer through a GEP index path
fn gep_result_type(base: &Type, indices: &[Value]) -> Result<Type, IrError> {
    let (mut current, address_space) = match base {
        Type::Pointer {
            pointee,
            address_space,
        } => (pointee.as_ref().clone(), *address_space),
        other => return Err(IrError::kind_mismatch("pointer", other.kind_name())),
    };

    // the first index steps over the pointer itself
    for index in indices.iter().skip(1) {
        current = match current {
            Type::Array { element, .. } => *element,
            Type::Vector { element, .. } => *element,
            Type::Struct(body) => {
                let field = match index.as_constant() {
                    Some(Constant::Int { value, .. }) => *value as usize,
                    _ => {
                        return Err(IrError::invalid_shape(
                            "struct member index must be a constant integer",
                        ))
                    }
                };
                body.fields.get(field).cloned().ok_or(IrError::IndexPath {
                    index: field,
                    count: body.fields.len(),
                })?
            }
            other => {
                return Err(IrError::invalid_shape(format!(
                    "cannot index into {}",
                    other.kind_name()
                )))
            }
        };
    }
    Type::pointer_in(current, address_space)
}

/// Member type reached by an extractvalue/insertvalue index path
fn aggregate_member_type(base: &Type, indices: &[u32]) -> Result<Type, IrError> {
    if indices.is_empty() {
        return Err(IrError::invalid_shape("aggregate index path is empty"));
    }
    let mut current = base.clone();
    for index in indices {
        current = match current {
            Type::Array { element, count } => {
                if u64::from(*index) >= count {
                    return Err(IrError::IndexPath {
                        index: *index as usize,
                        count: count as usize,
                    });
                }
                *element
            }
            Type::Struct(body) => body
                .fields
                .get(*index as usize)
                .cloned()
                .ok_or(IrError::IndexPath {
                    index: *index as usize,
                    count: body.fields.len(),
                })?,
            other => {
                return Err(IrError::kind_mismatch("aggregate", other.kind_name()));
            }
        };
    }
    Ok(current)
}

/// Comparisons of scalars yield `i1`; comparisons of vectors yield a
/// vector of `i1` with the same lane count
fn compare_result_type(operand: &Type) -> Result<Type, IrError> {
    match operand {
        Type::Vector { count, .. } => Type::vector(Type::int1(), *count),
        _ => Ok(Type::int1()),
    }
}

/// Return type implied by a callee's type
fn callee_return_type(callee: &Type) -> Type {
    match callee {
        Type::Function { return_type, .. } => return_type.as_ref().clone(),
        Type::Pointer { pointee, .. } => match pointee.as_ref() {
            Type::Function { return_type, .. } => return_type.as_ref().clone(),
            _ => Type::Void,
        },
        _ => Type::Void,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::UNDEF_MASK_ELEMENT;
    use ember_common::AtomicOrdering;
    use pretty_assertions::assert_eq;

    fn fixture(ret: Type, params: Vec<Type>) -> (Module, u32, BlockId, IrBuilder) {
        let mut module = Module::new("test");
        let func = module
            .add_function("f", Type::function(ret, params, false))
            .unwrap();
        let entry = module.create_block("entry");
        module.append_block(func, entry);
        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);
        (module, func, entry, builder)
    }

    #[test]
    fn test_unpositioned_builder_fails() {
        let mut module = Module::new("test");
        let mut builder = IrBuilder::new();
        assert_eq!(
            builder.build_ret_void(&mut module),
            Err(IrError::NoInsertionPoint)
        );
        assert_eq!(builder.insertion_block(), None);
    }

    #[test]
    fn test_clear_returns_to_unpositioned() {
        let (mut module, _, entry, mut builder) = fixture(Type::Void, vec![]);
        assert_eq!(builder.insertion_block(), Some(entry));
        builder.clear();
        assert_eq!(builder.insertion_block(), None);
        assert_eq!(
            builder.build_ret_void(&mut module),
            Err(IrError::NoInsertionPoint)
        );
    }

    #[test]
    fn test_ret_void() {
        let (mut module, _, entry, mut builder) = fixture(Type::Void, vec![]);
        let ret = builder.build_ret_void(&mut module).unwrap();

        let instr = module.instr(ret);
        assert_eq!(instr.opcode(), Opcode::Return);
        assert!(instr.is_terminator());
        assert_eq!(instr.operand_count(), 0);
        assert_eq!(instr.parent_block(), entry);
        assert_eq!(module.instr_to_string(ret), "ret void");
        assert!(module.block_has_terminator(entry));
    }

    #[test]
    fn test_ret_value() {
        let (mut module, _, _, mut builder) = fixture(Type::int32(), vec![]);
        let one = Type::int32().const_int(1).unwrap();
        let ret = builder.build_ret(&mut module, one.into()).unwrap();

        let instr = module.instr(ret);
        assert_eq!(instr.operand_count(), 1);
        assert_eq!(module.instr_to_string(ret), "ret i32 1");
    }

    #[test]
    fn test_branch_successor_rewrite() {
        let (mut module, func, _, mut builder) = fixture(Type::Void, vec![]);
        let a = module.create_block("a");
        let b = module.create_block("b");
        module.append_block(func, a);
        module.append_block(func, b);

        let br = builder.build_br(&mut module, a).unwrap();
        let instr = module.instr(br);
        assert_eq!(instr.successor_count(), 1);
        assert_eq!(instr.successor(0).unwrap(), a);

        module.instr_mut(br).set_successor(0, b).unwrap();
        assert_eq!(module.instr(br).successor(0).unwrap(), b);
    }

    #[test]
    fn test_conditional_branch() {
        let (mut module, func, _, mut builder) = fixture(Type::Void, vec![Type::int1()]);
        let then_b = module.create_block("then");
        let else_b = module.create_block("else");
        module.append_block(func, then_b);
        module.append_block(func, else_b);

        let cond = module.function(func).parameter(0).unwrap();
        let br = builder
            .build_cond_br(&mut module, cond.clone(), then_b, else_b)
            .unwrap();

        let instr = module.instr(br);
        assert!(instr.is_conditional());
        assert_eq!(instr.successor_count(), 2);
        assert_eq!(instr.successor(0).unwrap(), then_b);
        assert_eq!(instr.successor(1).unwrap(), else_b);
        assert_eq!(instr.condition().unwrap(), &cond);

        let flipped: Value = Type::int1().const_int(0).unwrap().into();
        module.instr_mut(br).set_condition(flipped.clone()).unwrap();
        assert_eq!(module.instr(br).condition().unwrap(), &flipped);

        // plain branches are not conditional
        let plain = builder.build_br(&mut module, then_b).unwrap();
        assert!(!module.instr(plain).is_conditional());
        assert!(module.instr(plain).condition().is_err());
    }

    #[test]
    fn test_switch_cases() {
        let (mut module, func, _, mut builder) = fixture(Type::Void, vec![Type::int32()]);
        let default = module.create_block("default");
        let on_one = module.create_block("one");
        let on_two = module.create_block("two");
        for bb in [default, on_one, on_two] {
            module.append_block(func, bb);
        }

        let value = module.function(func).parameter(0).unwrap();
        let sw = builder.build_switch(&mut module, value, default).unwrap();
        assert_eq!(module.instr(sw).successor_count(), 1);
        assert_eq!(module.instr(sw).default_destination().unwrap(), default);

        let i32t = Type::int32();
        module
            .instr_mut(sw)
            .add_case(i32t.const_int(1).unwrap(), on_one)
            .unwrap();
        module
            .instr_mut(sw)
            .add_case(i32t.const_int(2).unwrap(), on_two)
            .unwrap();

        let instr = module.instr(sw);
        assert_eq!(instr.successor_count(), 3);
        assert_eq!(instr.cases().unwrap().len(), 2);
        assert_eq!(instr.cases().unwrap()[1].1, on_two);
        assert_eq!(instr.default_destination().unwrap(), default);
    }

    #[test]
    fn test_indirect_branch() {
        let (mut module, func, entry, mut builder) = fixture(Type::Void, vec![]);
        let other = module.create_block("other");
        module.append_block(func, other);

        let addr = module.block_address(func, other);
        let ibr = builder.build_indirect_br(&mut module, addr).unwrap();
        assert_eq!(module.instr(ibr).successor_count(), 0);

        module.instr_mut(ibr).add_destination(entry).unwrap();
        module.instr_mut(ibr).add_destination(other).unwrap();
        assert_eq!(module.instr(ibr).successor_count(), 2);
    }

    #[test]
    fn test_unreachable_terminates() {
        let (mut module, _, entry, mut builder) = fixture(Type::Void, vec![]);
        let instr = builder.build_unreachable(&mut module).unwrap();
        assert!(module.instr(instr).is_terminator());
        assert!(module.block_has_terminator(entry));
    }

    #[test]
    fn test_wrap_semantics() {
        let (mut module, func, _, mut builder) =
            fixture(Type::int32(), vec![Type::int32(), Type::int32()]);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        for wrap in WrapSemantics::ALL {
            let add = builder
                .build_add(&mut module, lhs.clone(), rhs.clone(), wrap, None)
                .unwrap();
            assert_eq!(module.instr(add).wrap_semantics().unwrap(), wrap);
            assert_eq!(module.instr(add).opcode(), Opcode::IntAdd);
            assert_eq!(module.instr(add).result_type(), &Type::int32());
        }

        let sub = builder
            .build_sub(
                &mut module,
                lhs.clone(),
                rhs.clone(),
                WrapSemantics::NoSignedWrap,
                Some("diff"),
            )
            .unwrap();
        assert_eq!(
            module.instr(sub).wrap_semantics().unwrap(),
            WrapSemantics::NoSignedWrap
        );
        assert_eq!(module.instr(sub).name(), Some("diff"));
    }

    #[test]
    fn test_exact_division() {
        let (mut module, func, _, mut builder) =
            fixture(Type::int32(), vec![Type::int32(), Type::int32()]);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        let sdiv = builder
            .build_sdiv(&mut module, lhs.clone(), rhs.clone(), true, None)
            .unwrap();
        assert!(module.instr(sdiv).is_exact().unwrap());

        let udiv = builder
            .build_udiv(&mut module, lhs, rhs, false, None)
            .unwrap();
        assert!(!module.instr(udiv).is_exact().unwrap());
        assert_eq!(module.instr(udiv).opcode(), Opcode::UnsignedDiv);
    }

    #[test]
    fn test_bitwise_and_shifts() {
        let (mut module, func, _, mut builder) =
            fixture(Type::int32(), vec![Type::int32(), Type::int32()]);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        let cases: Vec<(InstrId, Opcode)> = vec![
            (
                builder
                    .build_shl(&mut module, lhs.clone(), rhs.clone(), None)
                    .unwrap(),
                Opcode::LeftShift,
            ),
            (
                builder
                    .build_lshr(&mut module, lhs.clone(), rhs.clone(), None)
                    .unwrap(),
                Opcode::LogicalShiftRight,
            ),
            (
                builder
                    .build_ashr(&mut module, lhs.clone(), rhs.clone(), None)
                    .unwrap(),
                Opcode::ArithmeticShiftRight,
            ),
            (
                builder
                    .build_and(&mut module, lhs.clone(), rhs.clone(), None)
                    .unwrap(),
                Opcode::And,
            ),
            (
                builder
                    .build_or(&mut module, lhs.clone(), rhs.clone(), None)
                    .unwrap(),
                Opcode::Or,
            ),
            (
                builder.build_xor(&mut module, lhs, rhs, None).unwrap(),
                Opcode::Xor,
            ),
        ];
        for (id, opcode) in cases {
            assert_eq!(module.instr(id).opcode(), opcode);
            assert_eq!(module.instr(id).operand_count(), 2);
        }
    }

    #[test]
    fn test_float_arithmetic() {
        let (mut module, func, _, mut builder) =
            fixture(Type::double(), vec![Type::double(), Type::double()]);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        let neg = builder.build_fneg(&mut module, lhs.clone(), None).unwrap();
        assert_eq!(module.instr(neg).opcode(), Opcode::FloatNeg);
        assert_eq!(module.instr(neg).result_type(), &Type::double());

        let add = builder
            .build_fadd(&mut module, lhs.clone(), rhs.clone(), None)
            .unwrap();
        assert_eq!(module.instr(add).opcode(), Opcode::FloatAdd);

        let rem = builder.build_frem(&mut module, lhs, rhs, None).unwrap();
        assert_eq!(module.instr(rem).opcode(), Opcode::FloatRem);
        // float arithmetic carries no wrap flags
        assert!(module.instr(rem).wrap_semantics().is_err());
    }

    #[test]
    fn test_alloca_load_store_defaults() {
        let (mut module, _, _, mut builder) = fixture(Type::Void, vec![]);
        let i32t = Type::int32();

        let slot = builder
            .build_alloca(&mut module, i32t.clone(), Some("slot"))
            .unwrap();
        assert_eq!(module.instr(slot).allocated_type().unwrap(), &i32t);
        assert_eq!(
            module.instr(slot).result_type(),
            &Type::pointer(i32t.clone()).unwrap()
        );

        let store = builder
            .build_store(
                &mut module,
                i32t.const_int(7).unwrap().into(),
                Value::Instr(slot),
            )
            .unwrap();
        assert!(!module.instr(store).is_volatile().unwrap());
        assert_eq!(
            module.instr(store).ordering().unwrap(),
            AtomicOrdering::NotAtomic
        );

        let load = builder
            .build_load(&mut module, i32t.clone(), Value::Instr(slot), Some("v"))
            .unwrap();
        assert_eq!(module.instr(load).result_type(), &i32t);
        assert!(!module.instr(load).is_volatile().unwrap());
        assert_eq!(
            module.instr(load).ordering().unwrap(),
            AtomicOrdering::NotAtomic
        );

        module.instr_mut(load).set_volatile(true).unwrap();
        module
            .instr_mut(load)
            .set_ordering(AtomicOrdering::SequentiallyConsistent)
            .unwrap();
        assert!(module.instr(load).is_volatile().unwrap());
        assert_eq!(
            module.instr(load).ordering().unwrap(),
            AtomicOrdering::SequentiallyConsistent
        );
    }

    #[test]
    fn test_gep_result_types() {
        let (mut module, _, _, mut builder) = fixture(Type::Void, vec![]);
        let i32t = Type::int32();
        let pair = Type::structure(vec![i32t.clone(), Type::float()], false);
        let array = Type::array(pair.clone(), 4).unwrap();

        let base = builder.build_alloca(&mut module, array, None).unwrap();
        let zero: Value = i32t.const_int(0).unwrap().into();
        let one: Value = i32t.const_int(1).unwrap().into();

        let gep = builder
            .build_gep(
                &mut module,
                Value::Instr(base),
                vec![zero.clone(), zero.clone(), one],
                true,
                Some("field"),
            )
            .unwrap();
        assert!(module.instr(gep).is_in_bounds().unwrap());
        assert_eq!(
            module.instr(gep).result_type(),
            &Type::pointer(Type::float()).unwrap()
        );
        assert_eq!(module.instr(gep).operand_count(), 4);

        module.instr_mut(gep).set_in_bounds(false).unwrap();
        assert!(!module.instr(gep).is_in_bounds().unwrap());

        // a non-pointer base is rejected
        assert!(builder
            .build_gep(&mut module, zero.clone(), vec![zero], false, None)
            .is_err());
    }

    #[test]
    fn test_vector_element_ops() {
        let (mut module, func, _, mut builder) =
            fixture(Type::Void, vec![Type::vector(Type::int32(), 4).unwrap()]);
        let vec = module.function(func).parameter(0).unwrap();
        let i32t = Type::int32();
        let idx: Value = i32t.const_int(2).unwrap().into();

        let extracted = builder
            .build_extract_element(&mut module, vec.clone(), idx.clone(), None)
            .unwrap();
        assert_eq!(module.instr(extracted).result_type(), &i32t);

        let inserted = builder
            .build_insert_element(
                &mut module,
                vec,
                i32t.const_int(9).unwrap().into(),
                idx,
                None,
            )
            .unwrap();
        assert_eq!(
            module.instr(inserted).result_type(),
            &Type::vector(Type::int32(), 4).unwrap()
        );
    }

    #[test]
    fn test_shuffle_mask_and_undef_sentinel() {
        let (mut module, func, _, mut builder) = fixture(
            Type::Void,
            vec![
                Type::vector(Type::int32(), 4).unwrap(),
                Type::vector(Type::int32(), 4).unwrap(),
            ],
        );
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        let i32t = Type::int32();
        let mask = i32t.const_vector(vec![
            i32t.const_int(0).unwrap(),
            i32t.const_int(5).unwrap(),
            i32t.const_undef(),
        ]);
        let shuffle = builder
            .build_shuffle_vector(&mut module, lhs, rhs, mask, None)
            .unwrap();

        let instr = module.instr(shuffle);
        assert_eq!(
            instr.result_type(),
            &Type::vector(Type::int32(), 3).unwrap()
        );
        assert_eq!(instr.mask_element_count().unwrap(), 3);
        assert_eq!(instr.mask_element(0).unwrap(), 0);
        assert_eq!(instr.mask_element(1).unwrap(), 5);
        assert_eq!(instr.mask_element(2).unwrap(), UNDEF_MASK_ELEMENT);
        assert!(matches!(
            instr.mask_element(3),
            Err(IrError::IndexPath { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_aggregate_index_paths() {
        let (mut module, func, _, mut builder) = fixture(
            Type::Void,
            vec![Type::array(
                Type::structure(vec![Type::int32(), Type::float()], false),
                2,
            )
            .unwrap()],
        );
        let agg = module.function(func).parameter(0).unwrap();

        let extracted = builder
            .build_extract_value(&mut module, agg.clone(), vec![0, 1], None)
            .unwrap();
        let instr = module.instr(extracted);
        assert_eq!(instr.result_type(), &Type::float());
        assert_eq!(instr.index_count().unwrap(), 2);
        assert_eq!(instr.index(0).unwrap(), 0);
        assert_eq!(instr.index(1).unwrap(), 1);
        assert!(matches!(
            instr.index(2),
            Err(IrError::IndexPath { index: 2, count: 2 })
        ));

        let inserted = builder
            .build_insert_value(
                &mut module,
                agg.clone(),
                Type::int32().const_int(3).unwrap().into(),
                vec![1, 0],
                None,
            )
            .unwrap();
        assert_eq!(module.instr(inserted).result_type(), &module.type_of(&agg));

        // an out-of-range struct field is rejected up front
        assert!(builder
            .build_extract_value(&mut module, agg, vec![0, 2], None)
            .is_err());
    }

    #[test]
    fn test_int_predicates_round_trip() {
        let (mut module, func, _, mut builder) =
            fixture(Type::Void, vec![Type::int32(), Type::int32()]);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        for predicate in IntPredicate::ALL {
            let cmp = builder
                .build_icmp(&mut module, predicate, lhs.clone(), rhs.clone(), None)
                .unwrap();
            assert_eq!(module.instr(cmp).int_predicate().unwrap(), predicate);
            assert_eq!(module.instr(cmp).result_type(), &Type::int1());
            assert!(module.instr(cmp).float_predicate().is_err());
        }
    }

    #[test]
    fn test_float_predicates_round_trip() {
        let (mut module, func, _, mut builder) =
            fixture(Type::Void, vec![Type::double(), Type::double()]);
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();

        for predicate in FloatPredicate::ALL {
            let cmp = builder
                .build_fcmp(&mut module, predicate, lhs.clone(), rhs.clone(), None)
                .unwrap();
            assert_eq!(module.instr(cmp).float_predicate().unwrap(), predicate);
            assert_eq!(module.instr(cmp).result_type(), &Type::int1());
        }
    }

    #[test]
    fn test_vector_compare_result() {
        let (mut module, func, _, mut builder) = fixture(
            Type::Void,
            vec![
                Type::vector(Type::int32(), 4).unwrap(),
                Type::vector(Type::int32(), 4).unwrap(),
            ],
        );
        let lhs = module.function(func).parameter(0).unwrap();
        let rhs = module.function(func).parameter(1).unwrap();
        let cmp = builder
            .build_icmp(&mut module, IntPredicate::Equal, lhs, rhs, None)
            .unwrap();
        assert_eq!(
            module.instr(cmp).result_type(),
            &Type::vector(Type::int1(), 4).unwrap()
        );
    }

    #[test]
    fn test_phi_incoming() {
        let (mut module, func, entry, mut builder) = fixture(Type::int32(), vec![]);
        let left = module.create_block("left");
        let right = module.create_block("right");
        let merge = module.create_block("merge");
        for bb in [left, right, merge] {
            module.append_block(func, bb);
        }
        builder.build_cond_br(
            &mut module,
            Type::int1().const_int(1).unwrap().into(),
            left,
            right,
        )
        .unwrap();
        assert_eq!(builder.insertion_block(), Some(entry));

        builder.position_at_end(&module, merge);
        let phi = builder
            .build_phi(&mut module, Type::int32(), Some("merged"))
            .unwrap();
        assert_eq!(module.instr(phi).incoming_count().unwrap(), 0);

        let i32t = Type::int32();
        let a: Value = i32t.const_int(1).unwrap().into();
        let b: Value = i32t.const_int(2).unwrap().into();
        module.instr_mut(phi).add_incoming(left, a.clone()).unwrap();
        module.instr_mut(phi).add_incoming(right, b).unwrap();

        let instr = module.instr(phi);
        assert_eq!(instr.incoming_count().unwrap(), 2);
        assert_eq!(instr.incoming(0).unwrap(), (left, &a));
        assert_eq!(instr.incoming(1).unwrap().0, right);
        assert!(matches!(
            instr.incoming(2),
            Err(IrError::OperandIndex { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_select() {
        let (mut module, func, _, mut builder) = fixture(
            Type::int32(),
            vec![Type::int1(), Type::int32(), Type::int32()],
        );
        let cond = module.function(func).parameter(0).unwrap();
        let a = module.function(func).parameter(1).unwrap();
        let b = module.function(func).parameter(2).unwrap();

        let select = builder
            .build_select(&mut module, cond, a, b, Some("choice"))
            .unwrap();
        assert_eq!(module.instr(select).result_type(), &Type::int32());
        assert_eq!(module.instr(select).operand_count(), 3);
    }

    #[test]
    fn test_call_arguments_and_flags() {
        let mut module = Module::new("test");
        let callee_ty = Type::function(Type::int32(), vec![Type::int32(), Type::int32()], false);
        let callee = module.add_function("add", callee_ty).unwrap();
        let caller = module
            .add_function("caller", Type::function(Type::int32(), vec![], false))
            .unwrap();
        let entry = module.create_block("entry");
        module.append_block(caller, entry);

        let mut builder = IrBuilder::new();
        builder.position_at_end(&module, entry);

        let i32t = Type::int32();
        let a: Value = i32t.const_int(1).unwrap().into();
        let b: Value = i32t.const_int(2).unwrap().into();
        let call = builder
            .build_call(&mut module, Value::Function(callee), vec![a.clone(), b], None)
            .unwrap();

        let instr = module.instr(call);
        assert_eq!(instr.result_type(), &i32t);
        assert_eq!(instr.argument_count().unwrap(), 2);
        assert_eq!(instr.argument(0).unwrap(), &a);
        // the callee survives by identity
        assert_eq!(instr.called_value().unwrap(), &Value::Function(callee));
        assert!(matches!(
            instr.argument(2),
            Err(IrError::OperandIndex { index: 2, count: 2 })
        ));

        assert!(!instr.is_tail_call().unwrap());
        assert_eq!(instr.call_convention().unwrap(), CallConvention::C);

        module.instr_mut(call).set_tail_call(true).unwrap();
        assert!(module.instr(call).is_tail_call().unwrap());

        for convention in CallConvention::ALL {
            module
                .instr_mut(call)
                .set_call_convention(convention)
                .unwrap();
            assert_eq!(module.instr(call).call_convention().unwrap(), convention);
        }
    }

    #[test]
    fn test_call_site_attributes() {
        use crate::attr::{Attribute, AttributeKind};

        let (mut module, _, _, mut builder) = fixture(Type::Void, vec![]);
        let fn_ptr = Type::pointer(Type::function(Type::Void, vec![], false)).unwrap();
        let callee: Value = fn_ptr.const_null().unwrap().into();
        let call = builder
            .build_call(&mut module, callee, vec![], None)
            .unwrap();

        module
            .instr_mut(call)
            .add_call_attribute(Attribute::enumerated(AttributeKind::NoUnwind, 0))
            .unwrap();
        module
            .instr_mut(call)
            .add_call_attribute(Attribute::string("probe", "on"))
            .unwrap();

        let attrs = module.instr(call).call_attributes().unwrap();
        assert_eq!(attrs.len(), 2);
        assert!(attrs[0].is_enum());
        assert_eq!(attrs[1].string_kind().unwrap(), "probe");
    }

    #[test]
    fn test_casts_round_trip() {
        let (mut module, func, _, mut builder) =
            fixture(Type::Void, vec![Type::int32(), Type::double()]);
        let int_val = module.function(func).parameter(0).unwrap();
        let float_val = module.function(func).parameter(1).unwrap();
        let ptr_val: Value = Value::Instr(
            builder
                .build_alloca(&mut module, Type::int32(), None)
                .unwrap(),
        );

        let cases: Vec<(InstrId, Opcode, Type)> = vec![
            (
                builder
                    .build_trunc(&mut module, int_val.clone(), Type::int8(), None)
                    .unwrap(),
                Opcode::IntTrunc,
                Type::int8(),
            ),
            (
                builder
                    .build_zext(&mut module, int_val.clone(), Type::int64(), None)
                    .unwrap(),
                Opcode::ZeroExt,
                Type::int64(),
            ),
            (
                builder
                    .build_sext(&mut module, int_val.clone(), Type::int64(), None)
                    .unwrap(),
                Opcode::SignExt,
                Type::int64(),
            ),
            (
                builder
                    .build_fptrunc(&mut module, float_val.clone(), Type::float(), None)
                    .unwrap(),
                Opcode::FloatTrunc,
                Type::float(),
            ),
            (
                builder
                    .build_fpext(&mut module, float_val.clone(), Type::fp128(), None)
                    .unwrap(),
                Opcode::FloatExt,
                Type::fp128(),
            ),
            (
                builder
                    .build_fptoui(&mut module, float_val.clone(), Type::int32(), None)
                    .unwrap(),
                Opcode::FloatToUnsigned,
                Type::int32(),
            ),
            (
                builder
                    .build_fptosi(&mut module, float_val.clone(), Type::int32(), None)
                    .unwrap(),
                Opcode::FloatToSigned,
                Type::int32(),
            ),
            (
                builder
                    .build_uitofp(&mut module, int_val.clone(), Type::double(), None)
                    .unwrap(),
                Opcode::UnsignedToFloat,
                Type::double(),
            ),
            (
                builder
                    .build_sitofp(&mut module, int_val.clone(), Type::double(), None)
                    .unwrap(),
                Opcode::SignedToFloat,
                Type::double(),
            ),
            (
                builder
                    .build_ptrtoint(&mut module, ptr_val.clone(), Type::int64(), None)
                    .unwrap(),
                Opcode::PtrToInt,
                Type::int64(),
            ),
            (
                builder
                    .build_inttoptr(
                        &mut module,
                        int_val.clone(),
                        Type::pointer(Type::int8()).unwrap(),
                        None,
                    )
                    .unwrap(),
                Opcode::IntToPtr,
                Type::pointer(Type::int8()).unwrap(),
            ),
            (
                builder
                    .build_bitcast(
                        &mut module,
                        ptr_val.clone(),
                        Type::pointer(Type::int8()).unwrap(),
                        None,
                    )
                    .unwrap(),
                Opcode::BitCast,
                Type::pointer(Type::int8()).unwrap(),
            ),
            (
                builder
                    .build_addrspacecast(
                        &mut module,
                        ptr_val,
                        Type::pointer_in(Type::int32(), ember_common::AddressSpace::new(1))
                            .unwrap(),
                        None,
                    )
                    .unwrap(),
                Opcode::AddrSpaceCast,
                Type::pointer_in(Type::int32(), ember_common::AddressSpace::new(1)).unwrap(),
            ),
        ];

        for (id, opcode, target) in cases {
            let instr = module.instr(id);
            assert_eq!(instr.opcode(), opcode);
            assert!(instr.opcode().is_cast());
            assert_eq!(instr.cast_target_type().unwrap(), &target);
            assert_eq!(instr.result_type(), &target);
        }
    }

    #[test]
    fn test_position_before_inserts_ahead() {
        let (mut module, _, entry, mut builder) = fixture(Type::Void, vec![]);
        let ret = builder.build_ret_void(&mut module).unwrap();

        builder.position_before(&module, ret);
        let slot = builder
            .build_alloca(&mut module, Type::int32(), None)
            .unwrap();

        assert_eq!(module.block(entry).instructions(), &[slot, ret]);
        // the cursor advanced past the new instruction, still before ret
        let second = builder
            .build_alloca(&mut module, Type::int8(), None)
            .unwrap();
        assert_eq!(module.block(entry).instructions(), &[slot, second, ret]);
    }

    #[test]
    fn test_fp_math_tag_and_debug_location() {
        let mut builder = IrBuilder::new();
        assert_eq!(builder.fp_math_tag(), None);
        assert_eq!(builder.debug_location(), None);

        builder.set_fp_math_tag(Some(FpMathTag("fast".to_owned())));
        assert_eq!(builder.fp_math_tag(), Some(&FpMathTag("fast".to_owned())));
        builder.set_fp_math_tag(None);
        assert_eq!(builder.fp_math_tag(), None);

        let loc = DebugLocation { line: 12, column: 4 };
        builder.set_debug_location(Some(loc));
        assert_eq!(builder.debug_location(), Some(loc));
        builder.set_debug_location(None);
        assert_eq!(builder.debug_location(), None);
    }
}
