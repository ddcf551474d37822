//! Side table of checker results keyed by syntax node.
//!
//! The tree stays immutable; the checker records each node's resolved type
//! and referenced declaration here. Both maps are write-once: the first
//! recorded value for a node wins.

use bpl_core::{DeclRef, NodeId, Type};
use rustc_hash::FxHashMap;

#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    types: FxHashMap<NodeId, Type>,
    decls: FxHashMap<NodeId, DeclRef>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `ty` for `node` unless it already has a type.
    ///
    /// Returns whether the value was stored.
    pub fn record_type(&mut self, node: NodeId, ty: Type) -> bool {
        if self.types.contains_key(&node) {
            return false;
        }
        self.types.insert(node, ty);
        true
    }

    /// Record the declaration `node` refers to unless one is already set.
    pub fn record_decl(&mut self, node: NodeId, decl: DeclRef) -> bool {
        if self.decls.contains_key(&node) {
            return false;
        }
        self.decls.insert(node, decl);
        true
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }

    pub fn decl_of(&self, node: NodeId) -> Option<DeclRef> {
        self.decls.get(&node).copied()
    }

    /// Number of nodes with a recorded type.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.decls.is_empty()
    }
}
