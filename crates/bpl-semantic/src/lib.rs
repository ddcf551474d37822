//! BPL semantic analysis.
//!
//! A two-pass checker over the untyped BPL syntax tree.
//!
//! ## Architecture
//!
//! - **Pass 1 (Hoisting)**: declare every type, process imports, then
//!   resolve function signatures, struct fields and enum variants
//! - **Pass 2 (Checking)**: check declarations and function bodies,
//!   recording each node's type in the side table
//!
//! ## Modules
//!
//! - [`annotations`]: Node side table (types and referenced declarations)
//! - [`builtins`]: Primitive types and aliases seeded into every module
//! - [`checker`]: The driver owning context, diagnostics and results
//! - [`conformance`]: Spec implementation checks
//! - [`context`]: Declaration tables (structs, enums, specs, functions)
//! - [`conversion`]: Type relations for assignment, overloads and casts
//! - [`imports`]: Import path resolution and module loading
//! - [`linker`]: Linker-facing symbol table
//! - [`lookup`]: Field and method lookup through the inheritance chain
//! - [`overload`]: Overload and operator resolution
//! - [`return_checker`]: All-paths-return analysis
//! - [`scope`]: Lexical scope tree
//! - [`template`]: Generic substitution and constraint validation
//! - [`type_resolver`]: Type resolution from syntax to canonical types

pub mod annotations;
pub mod builtins;
pub mod checker;
pub mod conformance;
pub mod context;
pub mod conversion;
mod expr;
pub mod imports;
pub mod linker;
pub mod lookup;
pub mod options;
pub mod overload;
mod passes;
pub mod return_checker;
pub mod scope;
mod stmt;
pub mod template;
pub mod type_resolver;

pub use annotations::TypeTable;
pub use checker::Checker;
pub use context::SemanticContext;
pub use conversion::{is_assignable, is_cast_allowed, is_compatible, is_exact_match, is_subtype};
pub use imports::{ModuleLoader, PreloadedModules};
pub use linker::{LinkerSymbol, LinkerSymbolKind, LinkerSymbolTable};
pub use options::{CheckerOptions, ErrorMode};
pub use overload::{OverloadMatch, resolve_overload};
pub use scope::{ScopeTable, Symbol, SymbolKind, SymbolTarget};
pub use type_resolver::TypeResolver;

pub use bpl_core::{Diagnostic, Diagnostics, SemanticError, SemanticResult};
