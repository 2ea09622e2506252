//! Values and constants
//!
//! A `Value` is anything an instruction can take as an operand: an
//! immediate constant, a function argument, the result of another
//! instruction, or the address of a basic block. Constants are immutable
//! once created; everything else is a non-owning reference into
//! module-owned storage.

use ember_common::{BlockId, FuncId, InstrId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Type;

/// Immediate constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    /// Integer constant; the stored value is interpreted at the width of `ty`
    Int { ty: Type, value: i64 },

    /// Floating-point constant
    Float { ty: Type, value: f64 },

    /// Null pointer constant
    Null { ty: Type },

    /// Undefined value of any type
    Undef { ty: Type },

    /// Constant vector of element constants
    Vector {
        element_ty: Type,
        elements: Vec<Constant>,
    },
}

impl Constant {
    /// The type of this constant
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int { ty, .. } => ty.clone(),
            Constant::Float { ty, .. } => ty.clone(),
            Constant::Null { ty } => ty.clone(),
            Constant::Undef { ty } => ty.clone(),
            Constant::Vector {
                element_ty,
                elements,
            } => Type::Vector {
                element: Box::new(element_ty.clone()),
                count: elements.len() as u32,
            },
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Constant::Undef { .. })
    }

    /// Value with its type prefix, as operands are rendered
    pub fn to_typed_string(&self) -> String {
        format!("{} {}", self.ty(), self)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int { value, .. } => write!(f, "{}", value),
            Constant::Float { value, .. } => write!(f, "{}", value),
            Constant::Null { .. } => write!(f, "null"),
            Constant::Undef { .. } => write!(f, "undef"),
            Constant::Vector {
                element_ty,
                elements,
            } => {
                write!(f, "<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", element_ty, element)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Any SSA value an instruction may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Immediate constant with no defining instruction
    Constant(Constant),

    /// Parameter of a function, bound by position
    Argument {
        function: FuncId,
        index: u32,
        ty: Type,
    },

    /// Result of an instruction
    Instr(InstrId),

    /// A function, usable as a callee or a function pointer operand
    Function(FuncId),

    /// Address of a basic block inside a function
    BlockAddress { function: FuncId, block: BlockId },
}

impl Value {
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Value::Argument { .. })
    }

    pub fn is_instr(&self) -> bool {
        matches!(self, Value::Instr(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        Value::Constant(constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_types() {
        let i32t = Type::int32();
        let one = i32t.const_int(1).unwrap();
        assert_eq!(one.ty(), i32t);

        let undef = i32t.const_undef();
        assert!(undef.is_undef());
        assert_eq!(undef.ty(), i32t);

        let vec = i32t.const_vector(vec![i32t.const_int(0).unwrap(), i32t.const_undef()]);
        assert_eq!(vec.ty(), Type::vector(Type::int32(), 2).unwrap());
    }

    #[test]
    fn test_constant_display() {
        let i32t = Type::int32();
        assert_eq!(i32t.const_int(42).unwrap().to_string(), "42");
        assert_eq!(i32t.const_int(1).unwrap().to_typed_string(), "i32 1");
        assert_eq!(i32t.const_undef().to_string(), "undef");
        assert_eq!(
            Type::pointer(Type::int8())
                .unwrap()
                .const_null()
                .unwrap()
                .to_string(),
            "null"
        );
        let vec = i32t.const_vector(vec![
            i32t.const_int(0).unwrap(),
            i32t.const_undef(),
        ]);
        assert_eq!(vec.to_string(), "<i32 0, i32 undef>");
    }

    #[test]
    fn test_value_equality() {
        let i32t = Type::int32();
        let a: Value = i32t.const_int(1).unwrap().into();
        let b: Value = i32t.const_int(1).unwrap().into();
        assert_eq!(a, b);
        assert!(a.is_constant());

        let arg = Value::Argument {
            function: 0,
            index: 1,
            ty: i32t.clone(),
        };
        assert!(arg.is_argument());
        assert_ne!(a, arg);
    }
}
