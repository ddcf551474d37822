//! BPL semantic analysis.
//!
//! Takes a parsed, untyped BPL syntax tree and decides whether the program
//! is well-formed, producing:
//!
//! - diagnostics (errors and warnings, each with a remediation hint)
//! - a side table mapping syntax nodes to their resolved types and the
//!   declarations they refer to
//! - a linker symbol table for the code generator
//!
//! ## Example
//!
//! ```
//! use bpl::{Analyzer, CheckerOptions};
//! use bpl::ast::AstBuilder;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let init = b.int(42);
//! let program = b.program("main.x", [
//!     b.function("main", [], Some(b.ty("int")), [
//!         b.local("answer", None, Some(init)),
//!         b.ret_value(b.ident("answer")),
//!     ]),
//! ]);
//!
//! let output = Analyzer::new(CheckerOptions::default()).analyze(program);
//! assert!(!output.has_errors());
//! assert_eq!(output.type_of(init.id()).map(ToString::to_string), Some("i32".into()));
//! ```

pub mod logging;

pub use bpl_ast as ast;
pub use bpl_core as core;
pub use bpl_semantic as semantic;

pub use bpl_core::{
    DeclRef, Diagnostic, Diagnostics, ErrorKind, NodeId, SemanticError, SemanticResult, Severity,
    Span, Type,
};
pub use bpl_semantic::{
    CheckerOptions, ErrorMode, LinkerSymbol, LinkerSymbolKind, LinkerSymbolTable, ModuleLoader,
    PreloadedModules, TypeTable,
};

use bpl_ast::Program;
use bpl_semantic::Checker;

/// Entry point for analysing a program and its imports.
pub struct Analyzer<'ast> {
    checker: Checker<'ast>,
}

impl<'ast> Analyzer<'ast> {
    pub fn new(options: CheckerOptions) -> Self {
        Self {
            checker: Checker::new(options),
        }
    }

    /// Programs an external module resolver has already parsed.
    pub fn with_preloaded(mut self, modules: PreloadedModules<'ast>) -> Self {
        self.checker = self.checker.with_preloaded(modules);
        self
    }

    /// Loader asked for imports missing from the pre-loaded set.
    pub fn with_loader(mut self, loader: impl ModuleLoader<'ast> + 'ast) -> Self {
        self.checker = self.checker.with_loader(loader);
        self
    }

    /// Analyse `program` and everything it imports.
    ///
    /// In fail-fast mode analysis stops at the first error, which is the
    /// only error diagnostic in the output.
    pub fn analyze(mut self, program: &'ast Program<'ast>) -> AnalysisOutput {
        if let Err(err) = self.checker.check_program(program) {
            tracing::debug!(file = program.file, "analysis aborted: {}", err);
        }
        let (diagnostics, types, symbols) = self.checker.into_parts();
        tracing::debug!(
            file = program.file,
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "analysis finished"
        );
        AnalysisOutput {
            diagnostics,
            types,
            symbols,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutput {
    pub diagnostics: Diagnostics,
    pub types: TypeTable,
    pub symbols: LinkerSymbolTable,
}

impl AnalysisOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.type_of(node)
    }

    pub fn decl_of(&self, node: NodeId) -> Option<DeclRef> {
        self.types.decl_of(node)
    }
}

/// Analyse a single program with `options`.
pub fn analyze<'ast>(program: &'ast Program<'ast>, options: CheckerOptions) -> AnalysisOutput {
    Analyzer::new(options).analyze(program)
}
