//! Linker-facing symbol table.
//!
//! Records every function, variable, and type each module defines so the
//! backend can emit and link object code. Entries are keyed by
//! `"module:name"` and iterate in definition order.

use bpl_core::{SemanticError, SemanticResult, Span, Type};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkerSymbolKind {
    Function,
    Variable,
    Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkerSymbol {
    pub name: String,
    pub kind: LinkerSymbolKind,
    /// Name of the defining module.
    pub module: String,
    pub is_exported: bool,
    pub ty: Option<Type>,
    pub is_extern: bool,
    pub span: Span,
    /// Further definitions of an overloaded function.
    pub overloads: Vec<LinkerSymbol>,
}

impl LinkerSymbol {
    pub fn new(
        name: impl Into<String>,
        kind: LinkerSymbolKind,
        module: impl Into<String>,
        ty: Option<Type>,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            module: module.into(),
            is_exported: false,
            ty,
            is_extern: false,
            span,
            overloads: Vec::new(),
        }
    }

    pub fn with_extern(mut self, is_extern: bool) -> Self {
        self.is_extern = is_extern;
        self
    }

    pub fn key(&self) -> String {
        symbol_key(&self.module, &self.name)
    }
}

fn symbol_key(module: &str, name: &str) -> String {
    format!("{}:{}", module, name)
}

#[derive(Debug, Default, Clone)]
pub struct LinkerSymbolTable {
    symbols: Vec<LinkerSymbol>,
    index: FxHashMap<String, usize>,
}

impl LinkerSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition.
    ///
    /// A second non-extern function under the same key becomes an overload.
    /// An extern on either side replaces the earlier entry. Anything else is
    /// a duplicate.
    pub fn define(&mut self, symbol: LinkerSymbol) -> SemanticResult<()> {
        let key = symbol.key();
        let Some(&slot) = self.index.get(&key) else {
            tracing::trace!(%key, "linker symbol");
            self.index.insert(key, self.symbols.len());
            self.symbols.push(symbol);
            return Ok(());
        };

        let existing = &mut self.symbols[slot];
        if existing.is_extern || symbol.is_extern {
            *existing = symbol;
            return Ok(());
        }
        if existing.kind == LinkerSymbolKind::Function && symbol.kind == LinkerSymbolKind::Function {
            existing.overloads.push(symbol);
            return Ok(());
        }
        Err(SemanticError::duplicate(
            format!(
                "Duplicate symbol definition: {} in module {}",
                symbol.name, symbol.module
            ),
            "Rename one of the definitions.",
            symbol.span,
        ))
    }

    /// Mark `module:name` as exported. Returns whether the symbol exists.
    pub fn mark_exported(&mut self, module: &str, name: &str) -> bool {
        match self.index.get(&symbol_key(module, name)) {
            Some(&slot) => {
                self.symbols[slot].is_exported = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, module: &str, name: &str) -> Option<&LinkerSymbol> {
        self.index
            .get(&symbol_key(module, name))
            .map(|&slot| &self.symbols[slot])
    }

    pub fn symbols_in_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a LinkerSymbol> {
        self.symbols.iter().filter(move |s| s.module == module)
    }

    pub fn exported_symbols(&self) -> impl Iterator<Item = &LinkerSymbol> {
        self.symbols.iter().filter(|s| s.is_exported)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkerSymbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
