//! Checker passes.
//!
//! - [`hoist`]: Pass 1 - register types, imports and function signatures
//! - [`check`]: Pass 2 - check declarations and function bodies

mod check;
mod hoist;
