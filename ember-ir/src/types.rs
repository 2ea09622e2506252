//! IR type system
//!
//! Types are structural values: two types built from the same shape compare
//! equal and are fully interchangeable. The one exception is named struct
//! types, which carry a module-minted identity and compare by it even when
//! their field lists match.
//!
//! Factories for composite types are fallible and report `InvalidShape`
//! when a constraint is violated (integer width out of range, zero-length
//! vector, unsizeable pointee). Typed-constant factories live here as well
//! so a `Type` can mint constants of itself.

use ember_common::{AddressSpace, IrError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Constant;

/// Maximum bit width of an integer type
pub const MAX_INT_WIDTH: u32 = (1 << 23) - 1;

/// Floating-point kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatKind {
    Half,
    Float,
    Double,
    Fp128,
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatKind::Half => write!(f, "half"),
            FloatKind::Float => write!(f, "float"),
            FloatKind::Double => write!(f, "double"),
            FloatKind::Fp128 => write!(f, "fp128"),
        }
    }
}

/// Struct type body
///
/// Anonymous structs (no id) compare structurally; named structs are minted
/// by `Module::named_struct_type` and compare by their id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructType {
    pub(crate) id: Option<u32>,
    pub(crate) name: Option<String>,
    pub(crate) fields: Vec<Type>,
    pub(crate) packed: bool,
}

impl StructType {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[Type] {
        &self.fields
    }

    pub fn is_packed(&self) -> bool {
        self.packed
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.fields == other.fields && self.packed == other.packed,
            _ => false,
        }
    }
}

/// IR type descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Void,
    /// Integer type with bit width in [1, 2^23-1]
    Int(u32),
    Float(FloatKind),
    Pointer {
        pointee: Box<Type>,
        address_space: AddressSpace,
    },
    Vector {
        element: Box<Type>,
        count: u32,
    },
    Array {
        element: Box<Type>,
        count: u64,
    },
    Struct(StructType),
    Function {
        return_type: Box<Type>,
        params: Vec<Type>,
        is_vararg: bool,
    },
    Token,
}

impl Type {
    /// Create an integer type of arbitrary width
    pub fn int(width: u32) -> Result<Type, IrError> {
        if width == 0 || width > MAX_INT_WIDTH {
            return Err(IrError::invalid_shape(format!(
                "integer width {} outside [1, {}]",
                width, MAX_INT_WIDTH
            )));
        }
        Ok(Type::Int(width))
    }

    pub fn int1() -> Type {
        Type::Int(1)
    }

    pub fn int8() -> Type {
        Type::Int(8)
    }

    pub fn int16() -> Type {
        Type::Int(16)
    }

    pub fn int32() -> Type {
        Type::Int(32)
    }

    pub fn int64() -> Type {
        Type::Int(64)
    }

    pub fn int128() -> Type {
        Type::Int(128)
    }

    pub fn half() -> Type {
        Type::Float(FloatKind::Half)
    }

    pub fn float() -> Type {
        Type::Float(FloatKind::Float)
    }

    pub fn double() -> Type {
        Type::Float(FloatKind::Double)
    }

    pub fn fp128() -> Type {
        Type::Float(FloatKind::Fp128)
    }

    /// Create a pointer type in the generic address space
    pub fn pointer(pointee: Type) -> Result<Type, IrError> {
        Type::pointer_in(pointee, AddressSpace::default())
    }

    /// Create a pointer type in a specific address space
    pub fn pointer_in(pointee: Type, address_space: AddressSpace) -> Result<Type, IrError> {
        match pointee {
            Type::Void | Type::Token => Err(IrError::invalid_shape(format!(
                "cannot point to {}",
                pointee.kind_name()
            ))),
            _ => Ok(Type::Pointer {
                pointee: Box::new(pointee),
                address_space,
            }),
        }
    }

    /// Create a vector type; the element count must be non-zero and the
    /// element must be an integer, float or pointer type
    pub fn vector(element: Type, count: u32) -> Result<Type, IrError> {
        if count == 0 {
            return Err(IrError::invalid_shape("vector element count must be non-zero"));
        }
        match element {
            Type::Int(_) | Type::Float(_) | Type::Pointer { .. } => Ok(Type::Vector {
                element: Box::new(element),
                count,
            }),
            other => Err(IrError::invalid_shape(format!(
                "vector of {} is not allowed",
                other.kind_name()
            ))),
        }
    }

    /// Create an array type; zero-length arrays are allowed
    pub fn array(element: Type, count: u64) -> Result<Type, IrError> {
        match element {
            Type::Void | Type::Token | Type::Function { .. } => Err(IrError::invalid_shape(
                format!("array of {} is not allowed", element.kind_name()),
            )),
            _ => Ok(Type::Array {
                element: Box::new(element),
                count,
            }),
        }
    }

    /// Create an anonymous struct type with structural equality
    pub fn structure(fields: Vec<Type>, packed: bool) -> Type {
        Type::Struct(StructType {
            id: None,
            name: None,
            fields,
            packed,
        })
    }

    /// Create a function signature type
    pub fn function(return_type: Type, params: Vec<Type>, is_vararg: bool) -> Type {
        Type::Function {
            return_type: Box::new(return_type),
            params,
            is_vararg,
        }
    }

    pub fn token() -> Type {
        Type::Token
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer { .. })
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Type::Vector { .. })
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::Struct(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    /// Bit width of an integer type
    pub fn width(&self) -> Option<u32> {
        match self {
            Type::Int(width) => Some(*width),
            _ => None,
        }
    }

    /// Element type of a pointer, vector or array
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Pointer { pointee, .. } => Some(pointee),
            Type::Vector { element, .. } => Some(element),
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Return type of a function signature
    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Function { return_type, .. } => Some(return_type),
            _ => None,
        }
    }

    /// Parameter types of a function signature
    pub fn param_types(&self) -> Option<&[Type]> {
        match self {
            Type::Function { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Short tag used in diagnostics and kind-mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Void => "void",
            Type::Int(_) => "integer",
            Type::Float(_) => "float",
            Type::Pointer { .. } => "pointer",
            Type::Vector { .. } => "vector",
            Type::Array { .. } => "array",
            Type::Struct(_) => "struct",
            Type::Function { .. } => "function",
            Type::Token => "token",
        }
    }

    /// Create an integer constant of this type
    pub fn const_int(&self, value: i64) -> Result<Constant, IrError> {
        match self {
            Type::Int(_) => Ok(Constant::Int {
                ty: self.clone(),
                value,
            }),
            other => Err(IrError::kind_mismatch("integer", other.kind_name())),
        }
    }

    /// Create the all-ones constant of this integer type
    pub fn const_all_ones(&self) -> Result<Constant, IrError> {
        match self {
            Type::Int(_) => Ok(Constant::Int {
                ty: self.clone(),
                value: -1,
            }),
            other => Err(IrError::kind_mismatch("integer", other.kind_name())),
        }
    }

    /// Create a floating-point constant of this type
    pub fn const_float(&self, value: f64) -> Result<Constant, IrError> {
        match self {
            Type::Float(_) => Ok(Constant::Float {
                ty: self.clone(),
                value,
            }),
            other => Err(IrError::kind_mismatch("float", other.kind_name())),
        }
    }

    /// Create the null constant of this pointer type
    pub fn const_null(&self) -> Result<Constant, IrError> {
        match self {
            Type::Pointer { .. } => Ok(Constant::Null { ty: self.clone() }),
            other => Err(IrError::kind_mismatch("pointer", other.kind_name())),
        }
    }

    /// Create an undefined constant of this type
    pub fn const_undef(&self) -> Constant {
        Constant::Undef { ty: self.clone() }
    }

    /// Create a vector constant with this type as the element type
    pub fn const_vector(&self, elements: Vec<Constant>) -> Constant {
        Constant::Vector {
            element_ty: self.clone(),
            elements,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int(width) => write!(f, "i{}", width),
            Type::Float(kind) => write!(f, "{}", kind),
            Type::Pointer {
                pointee,
                address_space,
            } => {
                if address_space.is_generic() {
                    write!(f, "{}*", pointee)
                } else {
                    write!(f, "{} {}*", pointee, address_space)
                }
            }
            Type::Vector { element, count } => write!(f, "<{} x {}>", count, element),
            Type::Array { element, count } => write!(f, "[{} x {}]", count, element),
            Type::Struct(body) => {
                if let Some(name) = &body.name {
                    return write!(f, "%{}", name);
                }
                if body.packed {
                    write!(f, "<{{ ")?;
                } else {
                    write!(f, "{{ ")?;
                }
                for (i, field) in body.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                if body.packed {
                    write!(f, " }}>")
                } else {
                    write!(f, " }}")
                }
            }
            Type::Function {
                return_type,
                params,
                is_vararg,
            } => {
                write!(f, "{} (", return_type)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                if *is_vararg {
                    if !params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
            Type::Token => write!(f, "token"),
        }
    }
}
