//! Import path resolution and symbol importing.
//!
//! Loading an imported module (hoisting and checking it in its own scope)
//! is driven by the checker; this module covers everything around that:
//! mapping an import source to candidate file paths, fetching the parsed
//! program through a [`ModuleLoader`], and binding the exported symbols of
//! a loaded module into the importing scope.

use std::path::{Component, Path, PathBuf};

use bpl_ast::{ImportKind, ImportStmt, Program, Stmt};
use bpl_core::{ScopeId, SemanticError, SemanticResult, Type};
use rustc_hash::FxHashMap;

use crate::context::SemanticContext;
use crate::options::CheckerOptions;
use crate::scope::{Symbol, SymbolKind, SymbolTarget};

/// Supplies parsed programs for import paths.
///
/// Parsing lives outside this crate, so file-backed loaders wrap an
/// external parser and keep the resulting trees alive for `'ast`.
pub trait ModuleLoader<'ast> {
    /// The program at `path`, or `None` if no such module exists.
    fn load(&mut self, path: &Path) -> Option<&'ast Program<'ast>>;
}

/// Programs already parsed by an external module resolver, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct PreloadedModules<'ast> {
    modules: FxHashMap<PathBuf, &'ast Program<'ast>>,
}

impl<'ast> PreloadedModules<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `program` under its own file path.
    pub fn insert(&mut self, program: &'ast Program<'ast>) {
        self.modules.insert(normalize(Path::new(program.file)), program);
    }

    pub fn get(&self, path: &Path) -> Option<&'ast Program<'ast>> {
        self.modules.get(path).copied()
    }

    /// The first module whose path ends with `source`, ignoring any leading
    /// `./` or `../`.
    pub fn find_by_suffix(&self, source: &str) -> Option<(PathBuf, &'ast Program<'ast>)> {
        let trimmed = source.trim_start_matches(['.', '/']);
        if trimmed.is_empty() {
            return None;
        }
        let mut matches: Vec<(&PathBuf, &&'ast Program<'ast>)> = self
            .modules
            .iter()
            .filter(|(path, _)| path.to_string_lossy().contains(trimmed))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches.first().map(|(path, program)| ((*path).clone(), **program))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<'ast> ModuleLoader<'ast> for PreloadedModules<'ast> {
    fn load(&mut self, path: &Path) -> Option<&'ast Program<'ast>> {
        self.get(path)
    }
}

/// The path an import source refers to, before extensions are tried.
///
/// `std/x` lives under the standard library root, absolute paths are used
/// as-is, and anything else is relative to the importing file's directory.
pub fn base_import_path(source: &str, importing_file: &str, options: &CheckerOptions) -> PathBuf {
    if let Some(rest) = source.strip_prefix("std/") {
        let root = options.std_lib_path.clone().unwrap_or_else(|| PathBuf::from("lib"));
        return normalize(&root.join(rest));
    }
    let path = Path::new(source);
    if path.is_absolute() {
        return normalize(path);
    }
    let dir = Path::new(importing_file).parent().unwrap_or(Path::new(""));
    normalize(&dir.join(path))
}

/// Every path tried for an import: the bare path, then each extension.
pub fn candidate_paths(source: &str, importing_file: &str, options: &CheckerOptions) -> Vec<PathBuf> {
    let base = base_import_path(source, importing_file, options);
    let mut out = Vec::with_capacity(options.import_extensions.len() + 1);
    for ext in &options.import_extensions {
        let mut with_ext = base.clone().into_os_string();
        with_ext.push(ext);
        out.push(PathBuf::from(with_ext));
    }
    out.insert(0, base);
    out
}

/// Resolve `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Name a module is recorded under in the linker table.
pub fn module_name(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

/// Names listed by the `export` statements of `program`, in order.
pub fn exported_names<'ast>(program: &Program<'ast>) -> Vec<&'ast str> {
    program
        .stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Export(export) => Some(export.items),
            _ => None,
        })
        .flat_map(|items| items.iter().map(|ident| ident.name))
        .collect()
}

/// Bind the symbols `stmt` asks for from a loaded module.
///
/// `module_scope` holds the module's top-level symbols and `exports` the
/// names it exports. Namespace imports get a fresh parentless scope so
/// only exported names are reachable through the namespace.
pub fn bind_import(
    ctx: &mut SemanticContext<'_>,
    scope: ScopeId,
    stmt: &ImportStmt<'_>,
    module_scope: ScopeId,
    exports: &[&str],
) -> SemanticResult<()> {
    match stmt.kind {
        ImportKind::Namespace(namespace) => {
            let isolated = ctx.scopes.create(None);
            for symbol in exported_symbols(ctx, module_scope, exports) {
                ctx.scopes.define(isolated, symbol)?;
            }
            ctx.scopes.define(
                scope,
                Symbol::new(
                    namespace.name,
                    SymbolKind::Module,
                    Some(Type::Module(isolated)),
                    SymbolTarget::Module(isolated),
                    namespace.span,
                ),
            )
        }
        ImportKind::All => {
            for symbol in exported_symbols(ctx, module_scope, exports) {
                ctx.scopes.define(scope, symbol)?;
            }
            Ok(())
        }
        ImportKind::Items(items) => {
            for item in items {
                let symbol = exports
                    .contains(&item.name.name)
                    .then(|| ctx.scopes.get_local(module_scope, item.name.name))
                    .flatten()
                    .cloned()
                    .ok_or_else(|| {
                        SemanticError::undefined_with(
                            item.name.name,
                            format!(
                                "Module '{}' does not export '{}'",
                                stmt.source, item.name.name
                            ),
                            item.name.span,
                        )
                    })?;
                ctx.scopes.define(
                    scope,
                    Symbol {
                        name: item.local_name().to_string(),
                        ..symbol
                    },
                )?;
            }
            Ok(())
        }
    }
}

fn exported_symbols(ctx: &SemanticContext<'_>, module_scope: ScopeId, exports: &[&str]) -> Vec<Symbol> {
    exports
        .iter()
        .filter_map(|name| ctx.scopes.get_local(module_scope, name).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpl_ast::AstBuilder;
    use bpl_core::{ErrorKind, Span};
    use bumpalo::Bump;

    fn options() -> CheckerOptions {
        CheckerOptions::new().with_std_lib_path("/opt/bpl/lib")
    }

    #[test]
    fn std_prefix_uses_library_root() {
        assert_eq!(
            base_import_path("std/io", "/src/main.x", &options()),
            PathBuf::from("/opt/bpl/lib/io")
        );
    }

    #[test]
    fn relative_to_importing_file() {
        assert_eq!(
            base_import_path("./util", "/src/app/main.x", &options()),
            PathBuf::from("/src/app/util")
        );
        assert_eq!(
            base_import_path("../shared/math", "/src/app/main.x", &options()),
            PathBuf::from("/src/shared/math")
        );
        assert_eq!(
            base_import_path("/abs/mod.x", "/src/main.x", &options()),
            PathBuf::from("/abs/mod.x")
        );
    }

    #[test]
    fn bare_path_then_extensions() {
        let paths = candidate_paths("./util", "/src/main.x", &options());
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/src/util"),
                PathBuf::from("/src/util.x"),
                PathBuf::from("/src/util.bpl"),
            ]
        );
    }

    #[test]
    fn module_names_and_exports() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(
            "/src/math.x",
            [b.export(["add", "sub"]), b.export(["PI"])],
        );
        assert_eq!(module_name(program.file), "math");
        assert_eq!(exported_names(program), ["add", "sub", "PI"]);
    }

    #[test]
    fn preloaded_lookup_by_suffix() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut preloaded = PreloadedModules::new();
        preloaded.insert(b.program("/src/lib/util.x", []));
        assert!(preloaded.get(Path::new("/src/lib/util.x")).is_some());
        let (path, _) = preloaded.find_by_suffix("./lib/util").unwrap();
        assert_eq!(path, PathBuf::from("/src/lib/util.x"));
        assert!(preloaded.load(Path::new("/missing.x")).is_none());
    }

    fn module_with(ctx: &mut SemanticContext<'_>, names: &[&str]) -> ScopeId {
        let module = ctx.scopes.create(None);
        for name in names {
            ctx.scopes
                .define(
                    module,
                    Symbol::function(*name, bpl_core::FunctionType {
                        params: Vec::new(),
                        ret: Box::new(Type::void()),
                        is_variadic: false,
                        decl: None,
                    }, Span::default()),
                )
                .unwrap();
        }
        module
    }

    #[test]
    fn namespace_import_sees_only_exports() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = SemanticContext::new();
        let module = module_with(&mut ctx, &["public", "private"]);
        let main = ctx.scopes.create(None);
        let Stmt::Import(stmt) = b.import_namespace("m", "./m") else {
            unreachable!()
        };
        bind_import(&mut ctx, main, stmt, module, &["public"]).unwrap();

        let ns = ctx.scopes.resolve(main, "m").unwrap();
        let SymbolTarget::Module(inner) = ns.target else {
            panic!("expected module symbol");
        };
        assert!(ctx.scopes.resolve(inner, "public").is_some());
        assert!(ctx.scopes.resolve(inner, "private").is_none());
    }

    #[test]
    fn item_import_with_alias() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = SemanticContext::new();
        let module = module_with(&mut ctx, &["add"]);
        let main = ctx.scopes.create(None);
        let Stmt::Import(stmt) = b.import_items([("add", Some("plus"))], "./m") else {
            unreachable!()
        };
        bind_import(&mut ctx, main, stmt, module, &["add"]).unwrap();
        assert!(ctx.scopes.resolve(main, "plus").is_some());
        assert!(ctx.scopes.resolve(main, "add").is_none());
    }

    #[test]
    fn unexported_item_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = SemanticContext::new();
        let module = module_with(&mut ctx, &["hidden"]);
        let main = ctx.scopes.create(None);
        let Stmt::Import(stmt) = b.import_items([("hidden", None)], "./m") else {
            unreachable!()
        };
        let err = bind_import(&mut ctx, main, stmt, module, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UndefinedSymbol);
        assert_eq!(err.message(), "Module './m' does not export 'hidden'");
    }

    #[test]
    fn import_all_binds_every_export() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = SemanticContext::new();
        let module = module_with(&mut ctx, &["a", "b", "c"]);
        let main = ctx.scopes.create(None);
        let Stmt::Import(stmt) = b.import_all("./m") else {
            unreachable!()
        };
        bind_import(&mut ctx, main, stmt, module, &["a", "c"]).unwrap();
        assert!(ctx.scopes.get_local(main, "a").is_some());
        assert!(ctx.scopes.get_local(main, "b").is_none());
        assert!(ctx.scopes.get_local(main, "c").is_some());
    }
}
