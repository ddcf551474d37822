//! Lexical scope management.
//!
//! This module provides [`ScopeTable`], an arena of scopes linked by parent
//! index. It handles:
//! - Symbol definition with function overload accumulation
//! - Lookup along the parent chain
//! - Isolated scopes (no parent) for namespaced imports
//! - "Did you mean" suggestions for unresolved names

use bpl_core::{
    AliasId, EnumId, FunctionId, FunctionType, NodeId, ScopeId, SemanticError, SemanticResult,
    SpecId, Span, StructId, Type, TypeDecl,
};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

// ============================================================================
// Symbols
// ============================================================================

/// What kind of entity a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Struct,
    Enum,
    Spec,
    TypeAlias,
    Module,
}

/// The declaration that introduced a generic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericOwner {
    Struct(StructId),
    Enum(EnumId),
    Spec(SpecId),
    Function(FunctionId),
    Alias(AliasId),
}

/// Where a symbol's details live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTarget {
    /// A builtin self-alias such as `i32`, or `Self` inside a spec.
    Builtin,
    Type(TypeDecl),
    Alias(AliasId),
    /// The `index`th generic parameter of `owner`.
    GenericParam(GenericOwner, u32),
    /// Signatures are carried by the symbol itself.
    Function,
    /// Variable introduced by the given node.
    Variable(NodeId),
    /// Isolated scope holding a namespace's exports.
    Module(ScopeId),
}

/// A named entry in a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// For functions, the primary signature.
    pub ty: Option<Type>,
    pub target: SymbolTarget,
    /// Further signatures defined under the same name.
    pub overloads: Vec<FunctionType>,
    pub is_const: bool,
    pub span: Span,
}

impl Symbol {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        ty: Option<Type>,
        target: SymbolTarget,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            target,
            overloads: Vec::new(),
            is_const: false,
            span,
        }
    }

    /// A function symbol for one signature.
    pub fn function(name: impl Into<String>, signature: FunctionType, span: Span) -> Self {
        Self::new(
            name,
            SymbolKind::Function,
            Some(Type::Function(signature)),
            SymbolTarget::Function,
            span,
        )
    }

    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    /// Every signature under this name, primary first.
    pub fn signatures(&self) -> impl Iterator<Item = &FunctionType> {
        self.ty
            .as_ref()
            .and_then(Type::as_function)
            .into_iter()
            .chain(self.overloads.iter())
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Struct | SymbolKind::Enum | SymbolKind::Spec | SymbolKind::TypeAlias
        )
    }
}

/// Parameter lists that would make two overloads indistinguishable.
pub fn same_signature(a: &FunctionType, b: &FunctionType) -> bool {
    a.params == b.params && a.is_variadic == b.is_variadic
}

// ============================================================================
// ScopeTable
// ============================================================================

#[derive(Debug, Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
}

/// Arena of lexical scopes.
///
/// Module and namespace scopes persist for the whole run. Block scopes are
/// released when exited, so the arena grows and shrinks like a stack above
/// the persistent scopes.
#[derive(Debug, Default)]
pub struct ScopeTable {
    scopes: Vec<ScopeData>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Create a scope. `None` gives an isolated root.
    pub fn create(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            parent,
            symbols: FxHashMap::default(),
        });
        id
    }

    /// Push a child of `parent`.
    pub fn enter(&mut self, parent: ScopeId) -> ScopeId {
        self.create(Some(parent))
    }

    /// Leave `scope`, returning its parent.
    pub fn exit(&mut self, scope: ScopeId) -> Option<ScopeId> {
        let parent = self.parent(scope);
        if scope.index() + 1 == self.scopes.len() {
            self.scopes.pop();
        }
        parent
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.index()).and_then(|s| s.parent)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    // ==========================================================================
    // Definition
    // ==========================================================================

    /// Define a symbol in `scope`.
    ///
    /// A function defined over a function with a different parameter list is
    /// recorded as an overload. Re-defining the same entity (as happens when a
    /// module is imported twice) is a no-op. Anything else is a duplicate.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol) -> SemanticResult<()> {
        let data = &mut self.scopes[scope.index()];
        let existing = match data.symbols.entry(symbol.name.clone()) {
            Entry::Vacant(slot) => {
                tracing::trace!(name = %symbol.name, kind = ?symbol.kind, %scope, "define symbol");
                slot.insert(symbol);
                return Ok(());
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        if existing.kind == SymbolKind::Function && symbol.kind == SymbolKind::Function {
            let new_signatures: Vec<FunctionType> = symbol.signatures().cloned().collect();
            for signature in new_signatures {
                if let Some(clash) = existing.signatures().find(|s| same_signature(s, &signature)) {
                    if clash.decl.is_some() && clash.decl == signature.decl {
                        continue;
                    }
                    return Err(SemanticError::duplicate(
                        format!(
                            "Function '{}' with this signature is already defined.",
                            symbol.name
                        ),
                        "Overloads must have different parameter types.",
                        symbol.span,
                    ));
                }
                tracing::trace!(name = %symbol.name, "append overload");
                existing.overloads.push(signature);
            }
            return Ok(());
        }

        if existing.kind == symbol.kind && existing.target == symbol.target {
            return Ok(());
        }

        Err(SemanticError::duplicate(
            format!("Symbol '{}' is already defined in this scope", symbol.name),
            format!("Rename one of the declarations of '{}'.", symbol.name),
            symbol.span,
        ))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Look up `name` from `scope` towards the root.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.resolve_with_scope(scope, name).map(|(_, symbol)| symbol)
    }

    /// Like [`resolve`](Self::resolve), also returning the defining scope.
    pub fn resolve_with_scope(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = self.scopes.get(id.index())?;
            if let Some(symbol) = data.symbols.get(name) {
                return Some((id, symbol));
            }
            current = data.parent;
        }
        None
    }

    /// Look up `name` in `scope` only.
    pub fn get_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes.get(scope.index())?.symbols.get(name)
    }

    /// Symbols defined directly in `scope`.
    pub fn symbols(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.scopes
            .get(scope.index())
            .into_iter()
            .flat_map(|data| data.symbols.values())
    }

    /// The visible name closest to `name` by edit distance.
    ///
    /// A candidate must be within three edits and closer than the length of
    /// `name`. Ties go to the alphabetically first name.
    pub fn find_similar(&self, scope: ScopeId, name: &str) -> Option<String> {
        let limit = name.chars().count();
        let mut best: Option<(usize, &str)> = None;
        let mut current = Some(scope);
        while let Some(id) = current {
            let Some(data) = self.scopes.get(id.index()) else {
                break;
            };
            for candidate in data.symbols.keys() {
                let distance = levenshtein(name, candidate);
                if distance == 0 || distance > 3 || distance >= limit {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some((d, n)) => distance < d || (distance == d && candidate.as_str() < n),
                };
                if better {
                    best = Some((distance, candidate));
                }
            }
            current = data.parent;
        }
        best.map(|(_, n)| n.to_string())
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bpl_core::ErrorKind;

    fn var(name: &str) -> Symbol {
        Symbol::new(
            name,
            SymbolKind::Variable,
            Some(Type::named("i32")),
            SymbolTarget::Variable(NodeId::new(0)),
            Span::default(),
        )
    }

    fn func(name: &str, params: Vec<Type>, id: u32) -> Symbol {
        Symbol::function(
            name,
            FunctionType {
                params,
                ret: Box::new(Type::void()),
                is_variadic: false,
                decl: Some(FunctionId::new(id)),
            },
            Span::default(),
        )
    }

    #[test]
    fn define_and_resolve_through_parents() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table.define(root, var("x")).unwrap();

        let child = table.enter(root);
        assert!(table.resolve(child, "x").is_some());
        assert!(table.get_local(child, "x").is_none());

        let (found_in, _) = table.resolve_with_scope(child, "x").unwrap();
        assert_eq!(found_in, root);
    }

    #[test]
    fn isolated_scope_sees_nothing() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table.define(root, var("x")).unwrap();
        let isolated = table.create(None);
        assert!(table.resolve(isolated, "x").is_none());
    }

    #[test]
    fn overloads_accumulate() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table.define(root, func("f", vec![], 0)).unwrap();
        table
            .define(root, func("f", vec![Type::named("i32")], 1))
            .unwrap();

        let symbol = table.resolve(root, "f").unwrap();
        assert_eq!(symbol.signatures().count(), 2);
    }

    #[test]
    fn identical_signature_is_duplicate() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table
            .define(root, func("f", vec![Type::named("i32")], 0))
            .unwrap();
        let err = table
            .define(root, func("f", vec![Type::named("i32")], 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateDeclaration);
        assert!(err.message().contains("with this signature is already defined"));
    }

    #[test]
    fn reimporting_same_function_is_noop() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table.define(root, func("f", vec![], 4)).unwrap();
        table.define(root, func("f", vec![], 4)).unwrap();
        assert_eq!(table.resolve(root, "f").unwrap().signatures().count(), 1);
    }

    #[test]
    fn non_function_redefinition_is_duplicate() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table.define(root, var("x")).unwrap();
        let err = table
            .define(root, func("x", vec![], 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateDeclaration);
    }

    #[test]
    fn exit_releases_innermost_scope() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        let child = table.enter(root);
        assert_eq!(table.len(), 2);
        assert_eq!(table.exit(child), Some(root));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn similar_names() {
        let mut table = ScopeTable::new();
        let root = table.create(None);
        table.define(root, var("counter")).unwrap();
        table.define(root, var("total")).unwrap();
        let child = table.enter(root);

        assert_eq!(table.find_similar(child, "countr"), Some("counter".to_string()));
        assert_eq!(table.find_similar(child, "zzzzzzzz"), None);
        // Too short for any suggestion to be closer than its own length.
        assert_eq!(table.find_similar(child, "q"), None);
    }

    #[test]
    fn edit_distance() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }
}
