//! The checker driving both passes over a module.
//!
//! [`Checker`] owns everything a run produces: the semantic context, the
//! diagnostics collector, the node side table, and the linker symbol
//! table. The passes themselves live in [`crate::passes`], statement
//! checking in [`crate::stmt`] and expression checking in [`crate::expr`];
//! each adds an `impl` block to this type.
//!
//! ## Error recovery
//!
//! Every statement (and every struct member) is checked through
//! [`Checker::recover`]. In collect-all mode the error is recorded and the
//! walk resumes at the next boundary; in fail-fast mode it is recorded once
//! and then propagated out of every enclosing module.
//!
//! ## Imports
//!
//! An imported module is hoisted and checked in its own builtins-seeded
//! scope the first time it is seen and cached by resolved path, so a
//! module imported from several places is analysed once.

use std::path::{Path, PathBuf};

use bpl_ast::{ImportStmt, Program, TypeExpr};
use bpl_core::{
    BasicType, Diagnostic, Diagnostics, FunctionId, NodeId, ScopeId, SemanticError,
    SemanticResult, Span, StructId, Type, TypeDecl,
};
use rustc_hash::FxHashMap;

use crate::annotations::TypeTable;
use crate::builtins;
use crate::context::SemanticContext;
use crate::imports::{
    ModuleLoader, PreloadedModules, bind_import, candidate_paths, exported_names, module_name,
    normalize,
};
use crate::linker::LinkerSymbolTable;
use crate::options::CheckerOptions;
use crate::scope::Symbol;
use crate::type_resolver::TypeResolver;

/// A module that has been (or is being) analysed.
#[derive(Debug, Clone)]
struct LoadedModule<'ast> {
    scope: ScopeId,
    exports: Vec<&'ast str>,
}

/// The module currently being walked.
#[derive(Debug, Clone)]
pub(crate) struct ModuleFrame {
    pub file: String,
    /// Name used for linker entries.
    pub name: String,
    pub scope: ScopeId,
}

/// The function whose body is being checked.
#[derive(Debug, Clone)]
pub(crate) struct FunctionFrame {
    pub id: FunctionId,
    pub ret: Type,
}

/// Walk state saved while another module is analysed.
struct SavedState {
    module: ModuleFrame,
    scope: ScopeId,
    function: Option<FunctionFrame>,
    loop_depth: u32,
    match_returns: Vec<Vec<Type>>,
}

/// Semantic checker for BPL programs.
pub struct Checker<'ast> {
    pub(crate) ctx: SemanticContext<'ast>,
    pub(crate) options: CheckerOptions,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) types: TypeTable,
    pub(crate) linker: LinkerSymbolTable,
    preloaded: PreloadedModules<'ast>,
    loader: Option<Box<dyn ModuleLoader<'ast> + 'ast>>,
    modules: FxHashMap<PathBuf, LoadedModule<'ast>>,
    /// Set once a fail-fast error has been recorded.
    aborted: bool,
    pub(crate) null_access_error: StructId,
    pub(crate) module: ModuleFrame,
    /// Innermost lexical scope.
    pub(crate) scope: ScopeId,
    pub(crate) function: Option<FunctionFrame>,
    /// Enclosing loops and switches.
    pub(crate) loop_depth: u32,
    /// Types returned from the match-arm blocks being checked, innermost last.
    pub(crate) match_returns: Vec<Vec<Type>>,
    /// Scope holding each function's generic parameters.
    pub(crate) signature_scopes: FxHashMap<FunctionId, ScopeId>,
}

impl<'ast> Checker<'ast> {
    pub fn new(options: CheckerOptions) -> Self {
        let mut ctx = SemanticContext::new();
        let root = ctx.scopes.create(None);
        let null_access_error = builtins::register_null_access_error(&mut ctx, root);
        Self {
            ctx,
            options,
            diagnostics: Diagnostics::new(),
            types: TypeTable::new(),
            linker: LinkerSymbolTable::new(),
            preloaded: PreloadedModules::new(),
            loader: None,
            modules: FxHashMap::default(),
            aborted: false,
            null_access_error,
            module: ModuleFrame {
                file: String::new(),
                name: String::new(),
                scope: root,
            },
            scope: root,
            function: None,
            loop_depth: 0,
            match_returns: Vec::new(),
            signature_scopes: FxHashMap::default(),
        }
    }

    /// Programs an external module resolver already parsed.
    pub fn with_preloaded(mut self, modules: PreloadedModules<'ast>) -> Self {
        self.preloaded = modules;
        self
    }

    /// Loader asked for imports that are not pre-loaded.
    pub fn with_loader(mut self, loader: impl ModuleLoader<'ast> + 'ast) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn context(&self) -> &SemanticContext<'ast> {
        &self.ctx
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn linker(&self) -> &LinkerSymbolTable {
        &self.linker
    }

    /// The scope holding the top-level symbols of the module at `path`.
    pub fn module_scope(&self, path: &Path) -> Option<ScopeId> {
        self.modules.get(&normalize(path)).map(|m| m.scope)
    }

    /// Consume the checker, returning its results.
    pub fn into_parts(self) -> (Diagnostics, TypeTable, LinkerSymbolTable) {
        (self.diagnostics, self.types, self.linker)
    }

    /// Hoist and check `program` as a top-level module.
    ///
    /// Diagnostics are recorded in [`diagnostics`](Self::diagnostics). In
    /// fail-fast mode the first error is also returned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check_program(&mut self, program: &'ast Program<'ast>) -> SemanticResult<()> {
        let path = normalize(Path::new(program.file));
        if self.modules.contains_key(&path) {
            tracing::debug!(file = program.file, "module already checked");
            return Ok(());
        }
        let scope = self.new_module_scope()?;
        self.modules.insert(
            path,
            LoadedModule {
                scope,
                exports: exported_names(program),
            },
        );
        self.run_module(program, scope)
    }

    fn run_module(&mut self, program: &'ast Program<'ast>, scope: ScopeId) -> SemanticResult<()> {
        let saved = self.enter_module(program.file, scope);
        tracing::debug!(file = program.file, "hoisting module");
        let mut result = self.hoist_program(program);
        if result.is_ok() {
            tracing::debug!(file = program.file, "checking module");
            result = self.check_top_level(program);
        }
        self.leave_module(saved);
        result
    }

    fn enter_module(&mut self, file: &str, scope: ScopeId) -> SavedState {
        let module = ModuleFrame {
            file: file.to_string(),
            name: module_name(file),
            scope,
        };
        SavedState {
            module: std::mem::replace(&mut self.module, module),
            scope: std::mem::replace(&mut self.scope, scope),
            function: self.function.take(),
            loop_depth: std::mem::take(&mut self.loop_depth),
            match_returns: std::mem::take(&mut self.match_returns),
        }
    }

    fn leave_module(&mut self, saved: SavedState) {
        self.module = saved.module;
        self.scope = saved.scope;
        self.function = saved.function;
        self.loop_depth = saved.loop_depth;
        self.match_returns = saved.match_returns;
    }

    fn new_module_scope(&mut self) -> SemanticResult<ScopeId> {
        let scope = self.ctx.scopes.create(None);
        builtins::install(&mut self.ctx, scope, self.null_access_error)?;
        Ok(scope)
    }

    // ==========================================================================
    // Imports
    // ==========================================================================

    /// Load the module `stmt` names and bind what it asks for.
    pub(crate) fn process_import(&mut self, stmt: &'ast ImportStmt<'ast>) -> SemanticResult<()> {
        let (path, program) = self.find_module(stmt)?;
        let (scope, exports) = match self.modules.get(&path) {
            Some(loaded) => (loaded.scope, loaded.exports.clone()),
            None => {
                tracing::debug!(source = stmt.source, path = %path.display(), "loading import");
                let scope = self.new_module_scope()?;
                let exports = exported_names(program);
                self.modules.insert(
                    path,
                    LoadedModule {
                        scope,
                        exports: exports.clone(),
                    },
                );
                self.run_module(program, scope)?;
                (scope, exports)
            }
        };
        bind_import(&mut self.ctx, self.scope, stmt, scope, &exports)
    }

    fn find_module(
        &mut self,
        stmt: &ImportStmt<'ast>,
    ) -> SemanticResult<(PathBuf, &'ast Program<'ast>)> {
        let candidates = candidate_paths(stmt.source, &self.module.file, &self.options);
        if let Some(found) = candidates
            .iter()
            .find_map(|path| self.preloaded.get(path).map(|p| (path.clone(), p)))
        {
            return Ok(found);
        }

        if self.options.skip_import_resolution {
            if let Some(found) = self.preloaded.find_by_suffix(stmt.source) {
                return Ok(found);
            }
        } else if let Some(loader) = self.loader.as_mut() {
            for path in candidates {
                if let Some(program) = loader.load(&path) {
                    return Ok((path, program));
                }
            }
        }

        Err(SemanticError::ModuleNotFound {
            path: stmt.source.to_string(),
            span: stmt.span,
        })
    }

    // ==========================================================================
    // Helpers shared by the passes
    // ==========================================================================

    /// Record `result`'s error, if any, according to the error mode.
    pub(crate) fn recover(&mut self, result: SemanticResult<()>) -> SemanticResult<()> {
        let Err(err) = result else {
            return Ok(());
        };
        if !self.aborted {
            tracing::debug!(file = %self.module.file, kind = err.kind().as_str(), "{}", err.message());
            self.diagnostics.report(&self.module.file, &err);
        }
        if self.options.is_fail_fast() {
            self.aborted = true;
            return Err(err);
        }
        Ok(())
    }

    pub(crate) fn warn(&mut self, message: &str, hint: &str, span: Span) {
        let diagnostic = Diagnostic::warning(&self.module.file, message, hint, span);
        self.diagnostics.push(diagnostic);
    }

    /// Run `f` in a fresh child of the current scope.
    pub(crate) fn in_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        let outer = self.scope;
        let inner = self.ctx.scopes.enter(outer);
        self.scope = inner;
        let result = f(self);
        self.ctx.scopes.exit(inner);
        self.scope = outer;
        result
    }

    /// Run `f` with `scope` as the current scope.
    pub(crate) fn with_scope<T>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        let outer = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = outer;
        result
    }

    pub(crate) fn resolver(&self) -> TypeResolver<'_, 'ast> {
        TypeResolver::new(&self.ctx, self.scope)
    }

    /// Resolve a written type in the current scope and record it.
    pub(crate) fn resolve_type_expr(&mut self, type_expr: &TypeExpr<'_>) -> SemanticResult<Type> {
        let ty = self.resolver().resolve_expr(type_expr)?;
        self.types.record_type(type_expr.id(), ty.clone());
        Ok(ty)
    }

    /// Resolve an optional return type, `None` meaning `void`.
    pub(crate) fn resolve_return_type(
        &mut self,
        ret: Option<&TypeExpr<'_>>,
    ) -> SemanticResult<Type> {
        match ret {
            Some(ty) => self.resolve_type_expr(ty),
            None => Ok(Type::void()),
        }
    }

    pub(crate) fn define(&mut self, symbol: Symbol) -> SemanticResult<()> {
        self.ctx.scopes.define(self.scope, symbol)
    }

    pub(crate) fn record(&mut self, node: NodeId, ty: &Type) {
        self.types.record_type(node, ty.clone());
    }

    /// The type of a struct or enum as seen from inside its declaration,
    /// with its generic parameters forwarded as arguments.
    pub(crate) fn owner_type(&self, decl: TypeDecl) -> Type {
        let generic_args = self
            .ctx
            .type_generic_params(decl)
            .iter()
            .map(|p| Type::named(p.name.clone()))
            .collect();
        Type::Basic(BasicType {
            generic_args,
            decl: Some(decl),
            ..BasicType::named(self.ctx.type_name(decl))
        })
    }
}
