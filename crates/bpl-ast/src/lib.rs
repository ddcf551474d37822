//! Syntax tree consumed by the BPL semantic analyzer.
//!
//! This crate provides:
//! - Node definitions for every BPL construct
//! - [`AstBuilder`] for constructing trees in a [`bumpalo::Bump`] arena
//!
//! The tree is read-only once built. Nodes borrow from the arena and carry
//! a [`bpl_core::NodeId`] so the checker can attach resolved types in a side
//! table without mutating them.
//!
//! # Example
//!
//! ```
//! use bpl_ast::{AstBuilder, Stmt};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = b.function(
//!     "main",
//!     [],
//!     Some(b.ty("int")),
//!     [b.ret_value(b.int(0))],
//! );
//! let program = b.program("main.x", [main]);
//! assert!(matches!(program.stmts[0], Stmt::Function(_)));
//! ```

pub mod builder;
pub mod decl;
pub mod expr;
pub mod node;
pub mod ops;
pub mod stmt;
pub mod types;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use stmt::*;
pub use types::*;
