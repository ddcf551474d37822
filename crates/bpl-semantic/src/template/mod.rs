//! Generic instantiation support.
//!
//! ## Components
//!
//! - [`TypeMap`]: maps generic parameter names to concrete types
//! - [`substitute`]: total substitution over the type model
//! - [`check_constraints`]: validates generic arguments against declared
//!   constraints

mod substitution;
mod validation;

pub use substitution::{TypeMap, build_type_map, substitute, substitute_signature};
pub use validation::check_constraints;
