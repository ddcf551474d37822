//! The semantic type model.
//!
//! [`Type`] is the checker's view of a type: a tagged union over named
//! (basic) types, function signatures, tuples, module handles and
//! meta-types. Values are immutable; every transformation builds a new
//! value.

pub mod primitives;

use std::fmt;

use crate::ids::{FunctionId, ScopeId, TypeDecl};

/// One array dimension: a fixed size or unbounded (`[]`).
pub type ArrayDim = Option<u64>;

/// A named type with pointer, array, and generic decorations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BasicType {
    pub name: String,
    pub pointer_depth: u32,
    /// Outermost dimension first.
    pub array_dims: Vec<ArrayDim>,
    pub generic_args: Vec<Type>,
    /// Set once the name resolved to a struct, enum, or spec.
    pub decl: Option<TypeDecl>,
}

impl BasicType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Neither a pointer nor an array.
    pub fn is_scalar(&self) -> bool {
        self.pointer_depth == 0 && self.array_dims.is_empty()
    }
}

/// A function signature used as a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
    pub is_variadic: bool,
    /// The declaration this signature came from, when there is one.
    pub decl: Option<FunctionId>,
}

/// A checked type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Basic(BasicType),
    Function(FunctionType),
    Tuple(Vec<Type>),
    /// Handle to an imported namespace.
    Module(ScopeId),
    /// A type used as a value, e.g. a struct name in constructor position.
    Meta(Box<Type>),
}

impl Type {
    /// A plain named type with no decorations.
    pub fn named(name: impl Into<String>) -> Self {
        Type::Basic(BasicType::named(name))
    }

    /// `depth` levels of pointer to the named type.
    pub fn pointer(name: impl Into<String>, depth: u32) -> Self {
        Type::Basic(BasicType {
            pointer_depth: depth,
            ..BasicType::named(name)
        })
    }

    pub fn void() -> Self {
        Type::named(primitives::VOID)
    }

    pub fn bool() -> Self {
        Type::named("i1")
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function(FunctionType {
            params,
            ret: Box::new(ret),
            is_variadic: false,
            decl: None,
        })
    }

    pub fn as_basic(&self) -> Option<&BasicType> {
        match self {
            Type::Basic(basic) => Some(basic),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Name of a basic type, if this is one.
    pub fn name(&self) -> Option<&str> {
        self.as_basic().map(|b| b.name.as_str())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Basic(b) if b.name == primitives::VOID && b.is_scalar())
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Basic(b) if b.pointer_depth > 0)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Basic(b) if !b.array_dims.is_empty())
    }

    /// Integer scalar (bool excluded).
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Basic(b) if b.pointer_depth == 0 && primitives::is_integer_name(&b.name))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Basic(b) if b.is_scalar() && primitives::is_bool_name(&b.name))
    }

    /// Integer, bool, or floating scalar.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Basic(b) if b.is_scalar() && primitives::is_numeric_name(&b.name))
    }

    /// The type with one more level of pointer.
    pub fn address_of(&self) -> Option<Type> {
        let mut basic = self.as_basic()?.clone();
        basic.pointer_depth += 1;
        Some(Type::Basic(basic))
    }

    /// The type with one level of pointer removed.
    pub fn pointee(&self) -> Option<Type> {
        let basic = self.as_basic()?;
        if basic.pointer_depth == 0 {
            return None;
        }
        let mut inner = basic.clone();
        inner.pointer_depth -= 1;
        Some(Type::Basic(inner))
    }

    /// The type with the outermost array dimension removed.
    pub fn element(&self) -> Option<Type> {
        let basic = self.as_basic()?;
        if basic.array_dims.is_empty() {
            return None;
        }
        let mut inner = basic.clone();
        inner.array_dims.remove(0);
        Some(Type::Basic(inner))
    }
}

impl From<BasicType> for Type {
    fn from(basic: BasicType) -> Self {
        Type::Basic(basic)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.pointer_depth {
            f.write_str("*")?;
        }
        f.write_str(&self.name)?;
        if !self.generic_args.is_empty() {
            f.write_str("<")?;
            write_list(f, &self.generic_args)?;
            f.write_str(">")?;
        }
        for dim in &self.array_dims {
            match dim {
                Some(size) => write!(f, "[{}]", size)?,
                None => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(basic) => write!(f, "{}", basic),
            Type::Function(func) => {
                f.write_str("(")?;
                write_list(f, &func.params)?;
                if func.is_variadic {
                    f.write_str(if func.params.is_empty() { "..." } else { ", ..." })?;
                }
                write!(f, ") => {}", func.ret)
            }
            Type::Tuple(types) => {
                f.write_str("(")?;
                write_list(f, types)?;
                f.write_str(")")
            }
            Type::Module(_) => f.write_str("module"),
            Type::Meta(inner) => write!(f, "type {}", inner),
        }
    }
}
