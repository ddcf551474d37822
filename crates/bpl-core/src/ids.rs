//! Index types for the tables built during hoisting.
//!
//! Declarations are interned into flat tables once and referred to by a
//! small copyable index afterwards, so type comparisons and inheritance
//! walks never re-resolve names.

use std::fmt;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Create an index from its raw position.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the underlying position.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self::new(index)
            }
        }
    };
}

index_type!(
    /// Identifies a syntax node. Assigned by the tree builder, unique per arena.
    NodeId,
    "node"
);
index_type!(
    /// Identifies a lexical scope in the scope arena.
    ScopeId,
    "scope"
);
index_type!(
    /// Identifies a hoisted struct declaration.
    StructId,
    "struct"
);
index_type!(
    /// Identifies a hoisted enum declaration.
    EnumId,
    "enum"
);
index_type!(
    /// Identifies a hoisted spec (interface) declaration.
    SpecId,
    "spec"
);
index_type!(
    /// Identifies a hoisted function, method, or extern signature.
    FunctionId,
    "fn"
);
index_type!(
    /// Identifies a hoisted type alias.
    AliasId,
    "alias"
);
index_type!(
    /// Identifies a checked module.
    ModuleId,
    "module"
);

/// The declaration a named type resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDecl {
    Struct(StructId),
    Enum(EnumId),
    Spec(SpecId),
}

/// What an annotated node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclRef {
    /// A struct, enum, or spec.
    Type(TypeDecl),
    /// A function, method, or extern.
    Function(FunctionId),
    /// A local, parameter, or global variable introduced by the given node.
    Variable(NodeId),
}

impl From<TypeDecl> for DeclRef {
    fn from(decl: TypeDecl) -> Self {
        DeclRef::Type(decl)
    }
}
