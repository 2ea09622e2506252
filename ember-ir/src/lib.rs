//! In-memory SSA intermediate representation
//!
//! A standalone instruction model and cursor-based builder in the style of
//! classic compiler IRs. A [`Module`] owns every function, basic block and
//! instruction and hands out plain index handles; an [`IrBuilder`] is a
//! cursor into that storage, mutated one `build_*` call at a time.
//!
//! ```
//! use ember_ir::{IrBuilder, Module, Type, Value, WrapSemantics};
//!
//! let mut module = Module::new("demo");
//! let func = module
//!     .add_function("double_it", Type::function(Type::int32(), vec![Type::int32()], false))
//!     .unwrap();
//! let entry = module.create_block("entry");
//! module.append_block(func, entry);
//!
//! let mut builder = IrBuilder::new();
//! builder.position_at_end(&module, entry);
//! let arg = module.function(func).parameter(0).unwrap();
//! let sum = builder
//!     .build_add(&mut module, arg.clone(), arg, WrapSemantics::None, Some("sum"))
//!     .unwrap();
//! builder.build_ret(&mut module, Value::Instr(sum)).unwrap();
//!
//! assert_eq!(module.instr_to_string(sum), "%sum = add i32 %0, %0");
//! ```

pub mod attr;
pub mod builder;
pub mod instr;
pub mod module;
pub mod print;
pub mod types;
pub mod value;

pub use attr::{Attribute, AttributeKind};
pub use builder::{DebugLocation, FpMathTag, IrBuilder};
pub use instr::{Instr, InstrKind, Opcode, UNDEF_MASK_ELEMENT};
pub use module::{BasicBlock, Function, Module};
pub use types::{FloatKind, StructType, Type, MAX_INT_WIDTH};
pub use value::{Constant, Value};

pub use ember_common::{
    AddressSpace, AtomicOrdering, BlockId, CallConvention, FloatPredicate, FuncId, InstrId,
    IntPredicate, IrError, WrapSemantics,
};
