//! Module, function and basic block containers
//!
//! The module is the top-level owner: it holds the storage for every
//! function, basic block and instruction and hands out plain index
//! handles. Handles are only meaningful for the module that minted them.
//!
//! Blocks may be created detached and attached to a function later;
//! instructions may be appended to a block before that block joins a
//! function. Both attachment orders are supported and neither is checked.

use ember_common::{BlockId, FuncId, InstrId, IrError};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::attr::Attribute;
use crate::instr::Instr;
use crate::types::{StructType, Type};
use crate::value::Value;

/// Ordered sequence of instructions with a name and an optional parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub(crate) name: String,
    pub(crate) instrs: Vec<InstrId>,
    pub(crate) parent: Option<FuncId>,
}

impl BasicBlock {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &[InstrId] {
        &self.instrs
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// The function this block has been attached to, if any
    pub fn parent(&self) -> Option<FuncId> {
        self.parent
    }
}

/// Named callable unit: a signature plus an ordered block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub(crate) id: FuncId,
    pub(crate) name: String,
    pub(crate) ty: Type,
    pub(crate) blocks: Vec<BlockId>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) param_attributes: Vec<Vec<Attribute>>,
    pub(crate) return_attributes: Vec<Attribute>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function signature type
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn return_type(&self) -> &Type {
        // the constructor guarantees a function type
        self.ty.return_type().unwrap_or(&Type::Void)
    }

    pub fn is_vararg(&self) -> bool {
        matches!(self.ty, Type::Function { is_vararg: true, .. })
    }

    pub fn param_count(&self) -> usize {
        self.ty.param_types().map_or(0, <[Type]>::len)
    }

    /// Parameter as an argument value, bound to this function by position
    pub fn parameter(&self, index: usize) -> Result<Value, IrError> {
        let params = self.ty.param_types().unwrap_or(&[]);
        let ty = params.get(index).ok_or(IrError::OperandIndex {
            index,
            count: params.len(),
        })?;
        Ok(Value::Argument {
            function: self.id,
            index: index as u32,
            ty: ty.clone(),
        })
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.blocks.first().copied()
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attach an attribute to a parameter slot
    pub fn add_param_attribute(
        &mut self,
        index: usize,
        attribute: Attribute,
    ) -> Result<(), IrError> {
        let count = self.param_attributes.len();
        match self.param_attributes.get_mut(index) {
            Some(slot) => {
                slot.push(attribute);
                Ok(())
            }
            None => Err(IrError::OperandIndex { index, count }),
        }
    }

    pub fn param_attributes(&self, index: usize) -> Result<&[Attribute], IrError> {
        self.param_attributes
            .get(index)
            .map(Vec::as_slice)
            .ok_or(IrError::OperandIndex {
                index,
                count: self.param_attributes.len(),
            })
    }

    pub fn add_return_attribute(&mut self, attribute: Attribute) {
        self.return_attributes.push(attribute);
    }

    pub fn return_attributes(&self) -> &[Attribute] {
        &self.return_attributes
    }
}

/// Top-level container and arena for a compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub(crate) name: String,
    pub(crate) functions: Vec<Function>,
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) instrs: Vec<Instr>,
    pub(crate) next_struct_id: u32,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            functions: Vec::new(),
            blocks: Vec::new(),
            instrs: Vec::new(),
            next_struct_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a function with the given signature type
    ///
    /// Fails with `DuplicateDefinition` on a name collision and with
    /// `KindMismatch` if the type is not a function signature.
    pub fn add_function(&mut self, name: impl Into<String>, ty: Type) -> Result<FuncId, IrError> {
        let name = name.into();
        if !ty.is_function() {
            return Err(IrError::kind_mismatch("function", ty.kind_name()));
        }
        if self.functions.iter().any(|f| f.name == name) {
            return Err(IrError::duplicate(name));
        }

        let id = self.functions.len() as FuncId;
        let param_count = ty.param_types().map_or(0, <[Type]>::len);
        debug!("adding function `{}` to module `{}`", name, self.name);
        self.functions.push(Function {
            id,
            name,
            ty,
            blocks: Vec::new(),
            attributes: Vec::new(),
            param_attributes: vec![Vec::new(); param_count],
            return_attributes: Vec::new(),
        });
        Ok(id)
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id as usize]
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id as usize]
    }

    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.functions.iter().position(|f| f.name == name).map(|i| i as FuncId)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Create a basic block, initially detached from any function
    ///
    /// Block names are not required to be unique; collisions are the
    /// caller's responsibility.
    pub fn create_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = self.blocks.len() as BlockId;
        let name = name.into();
        trace!("creating block `{}` ({})", name, id);
        self.blocks.push(BasicBlock {
            name,
            instrs: Vec::new(),
            parent: None,
        });
        id
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id as usize]
    }

    /// Attach a block to the end of a function's block list
    pub fn append_block(&mut self, function: FuncId, block: BlockId) {
        trace!(
            "appending block `{}` to function `{}`",
            self.blocks[block as usize].name,
            self.functions[function as usize].name
        );
        self.blocks[block as usize].parent = Some(function);
        self.functions[function as usize].blocks.push(block);
    }

    /// Address of a block within a function, usable as an operand
    pub fn block_address(&self, function: FuncId, block: BlockId) -> Value {
        Value::BlockAddress { function, block }
    }

    pub fn instr(&self, id: InstrId) -> &Instr {
        &self.instrs[id as usize]
    }

    pub fn instr_mut(&mut self, id: InstrId) -> &mut Instr {
        &mut self.instrs[id as usize]
    }

    /// Whether a block currently ends in a terminator
    ///
    /// The builder never enforces this; callers may leave a block without
    /// a terminator mid-construction.
    pub fn block_has_terminator(&self, block: BlockId) -> bool {
        self.blocks[block as usize]
            .instrs
            .last()
            .is_some_and(|id| self.instrs[*id as usize].is_terminator())
    }

    /// Mint a named struct type with identity-based equality
    pub fn named_struct_type(
        &mut self,
        name: impl Into<String>,
        fields: Vec<Type>,
        packed: bool,
    ) -> Type {
        let id = self.next_struct_id;
        self.next_struct_id += 1;
        Type::Struct(StructType {
            id: Some(id),
            name: Some(name.into()),
            fields,
            packed,
        })
    }

    /// The type of any value, resolving instruction results through the arena
    pub fn type_of(&self, value: &Value) -> Type {
        match value {
            Value::Constant(constant) => constant.ty(),
            Value::Argument { ty, .. } => ty.clone(),
            Value::Instr(id) => self.instrs[*id as usize].ty.clone(),
            // functions are referenced through their address
            Value::Function(id) => Type::Pointer {
                pointee: Box::new(self.functions[*id as usize].ty.clone()),
                address_space: Default::default(),
            },
            // block addresses are plain byte pointers
            Value::BlockAddress { .. } => Type::Pointer {
                pointee: Box::new(Type::Int(8)),
                address_space: Default::default(),
            },
        }
    }
}
