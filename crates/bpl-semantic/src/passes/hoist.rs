//! Hoisting Pass (Pass 1) - Register every module-level declaration.
//!
//! Declarations may refer to each other in any order, so the module is
//! swept four times:
//!
//! 1. Declare type names (structs, enums, specs, aliases) and load imports
//! 2. Resolve generic constraints
//! 3. Resolve struct and spec parents
//! 4. Resolve fields, variants, spec requirements and alias targets, and
//!    define functions, methods and externs with complete signatures
//!
//! Every function-like declaration gets its `Function` type recorded here
//! so forward calls see it. Nothing in this pass looks inside a body.

use bpl_ast::{
    EnumDecl, ExternDecl, FunctionDecl, GenericParam, Ident, Program, SpecDecl, Stmt, StructDecl,
    TypeAliasDecl, TypeExpr, VariantData,
};
use bpl_core::{
    AliasId, BasicType, DeclRef, EnumId, FunctionId, FunctionType, NodeId, ScopeId,
    SemanticError, SemanticResult, SpecId, StructId, Type, TypeDecl,
};

use crate::checker::Checker;
use crate::context::{
    AliasInfo, EnumInfo, FieldInfo, FunctionInfo, FunctionKind, GenericParamInfo, SpecInfo,
    SpecMethodInfo, StructInfo, VariantInfo, VariantPayload,
};
use crate::linker::{LinkerSymbol, LinkerSymbolKind};
use crate::scope::{GenericOwner, Symbol, SymbolKind, SymbolTarget, same_signature};
use crate::type_resolver::TypeResolver;

/// Name of the struct every struct implicitly derives from when in scope.
const IMPLICIT_ROOT: &str = "Type";

/// A type-level declaration registered in the first sweep.
#[derive(Debug, Clone, Copy)]
enum Hoisted<'ast> {
    Struct(&'ast StructDecl<'ast>, StructId),
    Enum(&'ast EnumDecl<'ast>, EnumId),
    Spec(&'ast SpecDecl<'ast>, SpecId),
    Alias(&'ast TypeAliasDecl<'ast>, AliasId),
}

fn unconstrained(params: &[GenericParam<'_>]) -> Vec<GenericParamInfo> {
    params
        .iter()
        .map(|p| GenericParamInfo::unconstrained(p.name.name))
        .collect()
}

impl<'ast> Checker<'ast> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn hoist_program(&mut self, program: &'ast Program<'ast>) -> SemanticResult<()> {
        let mut hoisted = Vec::new();
        for stmt in program.stmts {
            match self.declare(stmt) {
                Ok(Some(decl)) => hoisted.push(decl),
                Ok(None) => {}
                Err(err) => self.recover(Err(err))?,
            }
        }

        for decl in &hoisted {
            let result = self.hoist_constraints(*decl);
            self.recover(result)?;
        }
        for decl in &hoisted {
            let result = self.hoist_parents(*decl);
            self.recover(result)?;
        }

        for decl in &hoisted {
            self.hoist_members(*decl)?;
        }
        for stmt in program.stmts {
            let result = match stmt {
                Stmt::Function(decl) => self.hoist_function(decl),
                Stmt::Extern(decl) => self.hoist_extern(decl),
                _ => Ok(()),
            };
            self.recover(result)?;
        }
        Ok(())
    }

    // ==========================================================================
    // Sweep 1: type names and imports
    // ==========================================================================

    fn declare(&mut self, stmt: &Stmt<'ast>) -> SemanticResult<Option<Hoisted<'ast>>> {
        match *stmt {
            Stmt::Struct(decl) => {
                let scope = self.ctx.scopes.create(Some(self.scope));
                let id = self.ctx.add_struct(StructInfo {
                    name: decl.name.name.to_string(),
                    decl: Some(decl),
                    generic_params: unconstrained(decl.generic_params),
                    parent: None,
                    specs: Vec::new(),
                    fields: Vec::new(),
                    methods: Vec::new(),
                    scope,
                    span: decl.span,
                });
                self.define_generic_symbols(scope, decl.generic_params, GenericOwner::Struct(id))?;
                self.declare_type(decl.id, decl.name, SymbolKind::Struct, TypeDecl::Struct(id))?;
                Ok(Some(Hoisted::Struct(decl, id)))
            }
            Stmt::Enum(decl) => {
                let scope = self.ctx.scopes.create(Some(self.scope));
                let id = self.ctx.add_enum(EnumInfo {
                    name: decl.name.name.to_string(),
                    decl,
                    generic_params: unconstrained(decl.generic_params),
                    variants: Vec::new(),
                    methods: Vec::new(),
                    scope,
                });
                self.define_generic_symbols(scope, decl.generic_params, GenericOwner::Enum(id))?;
                self.declare_type(decl.id, decl.name, SymbolKind::Enum, TypeDecl::Enum(id))?;
                Ok(Some(Hoisted::Enum(decl, id)))
            }
            Stmt::Spec(decl) => {
                let scope = self.ctx.scopes.create(Some(self.scope));
                let id = self.ctx.add_spec(SpecInfo {
                    name: decl.name.name.to_string(),
                    decl,
                    generic_params: unconstrained(decl.generic_params),
                    parents: Vec::new(),
                    methods: Vec::new(),
                    scope,
                });
                self.define_generic_symbols(scope, decl.generic_params, GenericOwner::Spec(id))?;
                self.ctx.scopes.define(
                    scope,
                    Symbol::new(
                        "Self",
                        SymbolKind::TypeAlias,
                        Some(Type::named("Self")),
                        SymbolTarget::Builtin,
                        decl.name.span,
                    ),
                )?;
                self.declare_type(decl.id, decl.name, SymbolKind::Spec, TypeDecl::Spec(id))?;
                Ok(Some(Hoisted::Spec(decl, id)))
            }
            Stmt::TypeAlias(decl) => {
                let scope = self.ctx.scopes.create(Some(self.scope));
                let target = TypeResolver::raw(&decl.ty);
                let id = self.ctx.add_alias(AliasInfo {
                    name: decl.name.name.to_string(),
                    decl,
                    generic_params: unconstrained(decl.generic_params),
                    target: target.clone(),
                    scope,
                });
                self.define_generic_symbols(scope, decl.generic_params, GenericOwner::Alias(id))?;
                self.define(Symbol::new(
                    decl.name.name,
                    SymbolKind::TypeAlias,
                    Some(target),
                    SymbolTarget::Alias(id),
                    decl.name.span,
                ))?;
                Ok(Some(Hoisted::Alias(decl, id)))
            }
            Stmt::Import(import) => {
                self.process_import(import)?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn declare_type(
        &mut self,
        node: NodeId,
        name: Ident<'ast>,
        kind: SymbolKind,
        decl: TypeDecl,
    ) -> SemanticResult<()> {
        let ty = Type::Basic(BasicType {
            decl: Some(decl),
            ..BasicType::named(name.name)
        });
        self.define(Symbol::new(
            name.name,
            kind,
            Some(ty.clone()),
            SymbolTarget::Type(decl),
            name.span,
        ))?;
        let owner = self.owner_type(decl);
        self.types.record_type(node, owner);
        self.types.record_decl(node, DeclRef::Type(decl));
        self.linker.define(LinkerSymbol::new(
            name.name,
            LinkerSymbolKind::Type,
            self.module.name.clone(),
            Some(Type::Meta(Box::new(ty))),
            name.span,
        ))
    }

    /// Bind each generic parameter in `scope` as a type naming itself.
    pub(crate) fn define_generic_symbols(
        &mut self,
        scope: ScopeId,
        params: &[GenericParam<'_>],
        owner: GenericOwner,
    ) -> SemanticResult<()> {
        for (index, param) in params.iter().enumerate() {
            self.ctx.scopes.define(
                scope,
                Symbol::new(
                    param.name.name,
                    SymbolKind::TypeAlias,
                    Some(Type::named(param.name.name)),
                    SymbolTarget::GenericParam(owner, index as u32),
                    param.name.span,
                ),
            )?;
        }
        Ok(())
    }

    // ==========================================================================
    // Sweep 2: generic constraints
    // ==========================================================================

    fn hoist_constraints(&mut self, decl: Hoisted<'ast>) -> SemanticResult<()> {
        match decl {
            Hoisted::Struct(ast, id) => {
                let scope = self.ctx.struct_info(id).scope;
                let params = self.with_scope(scope, |this| this.resolve_generic_params(ast.generic_params))?;
                self.ctx.struct_info_mut(id).generic_params = params;
            }
            Hoisted::Enum(ast, id) => {
                let scope = self.ctx.enum_info(id).scope;
                let params = self.with_scope(scope, |this| this.resolve_generic_params(ast.generic_params))?;
                self.ctx.enum_info_mut(id).generic_params = params;
            }
            Hoisted::Spec(ast, id) => {
                let scope = self.ctx.spec_info(id).scope;
                let params = self.with_scope(scope, |this| this.resolve_generic_params(ast.generic_params))?;
                self.ctx.spec_info_mut(id).generic_params = params;
            }
            Hoisted::Alias(ast, id) => {
                let scope = self.ctx.alias(id).scope;
                let params = self.with_scope(scope, |this| this.resolve_generic_params(ast.generic_params))?;
                self.ctx.alias_mut(id).generic_params = params;
            }
        }
        Ok(())
    }

    /// Resolve constraints in the current scope.
    fn resolve_generic_params(
        &mut self,
        params: &[GenericParam<'_>],
    ) -> SemanticResult<Vec<GenericParamInfo>> {
        params
            .iter()
            .map(|param| -> SemanticResult<GenericParamInfo> {
                let (constraint, constraint_src) = match &param.constraint {
                    Some(written) => (
                        Some(self.resolve_type_expr(written)?),
                        Some(TypeResolver::raw(written)),
                    ),
                    None => (None, None),
                };
                Ok(GenericParamInfo {
                    name: param.name.name.to_string(),
                    constraint,
                    constraint_src,
                })
            })
            .collect()
    }

    // ==========================================================================
    // Sweep 3: parents
    // ==========================================================================

    fn hoist_parents(&mut self, decl: Hoisted<'ast>) -> SemanticResult<()> {
        match decl {
            Hoisted::Struct(ast, id) => self.hoist_struct_parents(ast, id),
            Hoisted::Spec(ast, id) => self.hoist_spec_parents(ast, id),
            Hoisted::Enum(..) | Hoisted::Alias(..) => Ok(()),
        }
    }

    fn hoist_struct_parents(&mut self, ast: &'ast StructDecl<'ast>, id: StructId) -> SemanticResult<()> {
        let scope = self.ctx.struct_info(id).scope;
        let (parent, specs) = self.with_scope(scope, |this| {
            let mut parent: Option<Type> = None;
            let mut specs = Vec::new();
            for written in ast.parents {
                let ty = this.resolve_type_expr(written)?;
                match ty.as_basic().and_then(|b| b.decl) {
                    Some(TypeDecl::Struct(parent_id)) if parent_id == id => {
                        return Err(SemanticError::type_mismatch(
                            format!("Struct '{}' cannot inherit from itself", ast.name.name),
                            "Remove the struct from its own inheritance list.",
                            written.span(),
                        ));
                    }
                    Some(TypeDecl::Struct(_)) if parent.is_none() => parent = Some(ty),
                    Some(TypeDecl::Struct(_)) => {
                        return Err(SemanticError::unsupported(
                            format!("Struct '{}' can only inherit from one struct", ast.name.name),
                            "Structs support single inheritance; use specs for shared behaviour.",
                            written.span(),
                        ));
                    }
                    Some(TypeDecl::Spec(_)) => specs.push(ty),
                    _ => {
                        return Err(SemanticError::unsupported(
                            format!("Type '{}' cannot be inherited", ty),
                            "Structs may inherit from one struct and any number of specs.",
                            written.span(),
                        ));
                    }
                }
            }
            Ok((parent, specs))
        })?;

        let parent = parent.or_else(|| {
            if ast.name.name == IMPLICIT_ROOT {
                return None;
            }
            let symbol = self.ctx.scopes.resolve(self.scope, IMPLICIT_ROOT)?;
            match symbol.target {
                SymbolTarget::Type(decl @ TypeDecl::Struct(_)) => Some(Type::Basic(BasicType {
                    decl: Some(decl),
                    ..BasicType::named(IMPLICIT_ROOT)
                })),
                _ => None,
            }
        });

        let info = self.ctx.struct_info_mut(id);
        info.parent = parent;
        info.specs = specs;
        Ok(())
    }

    fn hoist_spec_parents(&mut self, ast: &'ast SpecDecl<'ast>, id: SpecId) -> SemanticResult<()> {
        let scope = self.ctx.spec_info(id).scope;
        let parents = self.with_scope(scope, |this| {
            let mut parents = Vec::new();
            for written in ast.parents {
                let name = match written {
                    TypeExpr::Named(named) => named.name.to_string(),
                    other => TypeResolver::raw(other).to_string(),
                };
                let kind = this
                    .resolver()
                    .lookup_type(&name)
                    .or_else(|| this.ctx.scopes.resolve(this.scope, &name))
                    .map(|symbol| symbol.kind);
                let Some(kind) = kind else {
                    return Err(SemanticError::undefined_with(
                        &name,
                        format!("Undefined spec '{}' in inheritance list", name),
                        written.span(),
                    ));
                };
                if kind != SymbolKind::Spec {
                    return Err(SemanticError::type_mismatch(
                        format!("Type '{}' is not a spec", name),
                        "Only specs can be inherited by other specs.",
                        written.span(),
                    ));
                }
                parents.push(this.resolve_type_expr(written)?);
            }
            Ok(parents)
        })?;
        self.ctx.spec_info_mut(id).parents = parents;
        Ok(())
    }

    // ==========================================================================
    // Sweep 4: members and signatures
    // ==========================================================================

    fn hoist_members(&mut self, decl: Hoisted<'ast>) -> SemanticResult<()> {
        match decl {
            Hoisted::Struct(ast, id) => self.hoist_struct_members(ast, id),
            Hoisted::Enum(ast, id) => self.hoist_enum_members(ast, id),
            Hoisted::Spec(ast, id) => {
                let result = self.hoist_spec_methods(ast, id);
                self.recover(result)
            }
            Hoisted::Alias(ast, id) => {
                let result = self.validate_alias(ast, id);
                self.recover(result)
            }
        }
    }

    fn hoist_struct_members(&mut self, ast: &'ast StructDecl<'ast>, id: StructId) -> SemanticResult<()> {
        let scope = self.ctx.struct_info(id).scope;
        for field in ast.fields() {
            let result = self.with_scope(scope, |this| {
                if this.ctx.struct_info(id).fields.iter().any(|f| f.name == field.name.name) {
                    return Err(SemanticError::duplicate(
                        format!("Duplicate field '{}' in struct '{}'", field.name.name, ast.name.name),
                        "Each field name may appear only once in a struct.",
                        field.span,
                    ));
                }
                let ty = this.resolve_type_expr(&field.ty)?;
                this.record(field.id, &ty);
                this.ctx.struct_info_mut(id).fields.push(FieldInfo {
                    name: field.name.name.to_string(),
                    ty,
                    span: field.span,
                });
                Ok(())
            });
            self.recover(result)?;
        }

        for method in ast.methods() {
            let result = self.hoist_method(method, TypeDecl::Struct(id), scope);
            self.recover(result)?;
        }
        Ok(())
    }

    fn hoist_enum_members(&mut self, ast: &'ast EnumDecl<'ast>, id: EnumId) -> SemanticResult<()> {
        let scope = self.ctx.enum_info(id).scope;
        for variant in ast.variants {
            let result = self.with_scope(scope, |this| {
                if this.ctx.enum_info(id).variant(variant.name.name).is_some() {
                    return Err(SemanticError::duplicate(
                        format!("Duplicate variant '{}' in enum '{}'", variant.name.name, ast.name.name),
                        "Each variant name may appear only once in an enum.",
                        variant.span,
                    ));
                }
                let payload = match variant.data {
                    VariantData::Unit => VariantPayload::Unit,
                    VariantData::Tuple(types) => VariantPayload::Tuple(
                        types
                            .iter()
                            .map(|t| this.resolve_type_expr(t))
                            .collect::<SemanticResult<_>>()?,
                    ),
                    VariantData::Struct(fields) => VariantPayload::Struct(
                        fields
                            .iter()
                            .map(|f| -> SemanticResult<FieldInfo> {
                                Ok(FieldInfo {
                                    name: f.name.name.to_string(),
                                    ty: this.resolve_type_expr(&f.ty)?,
                                    span: f.name.span,
                                })
                            })
                            .collect::<SemanticResult<_>>()?,
                    ),
                };
                this.ctx.enum_info_mut(id).variants.push(VariantInfo {
                    name: variant.name.name.to_string(),
                    payload,
                    span: variant.span,
                });
                Ok(())
            });
            self.recover(result)?;
        }

        for method in ast.methods {
            let result = self.hoist_method(method, TypeDecl::Enum(id), scope);
            self.recover(result)?;
        }
        Ok(())
    }

    fn hoist_method(
        &mut self,
        method: &'ast FunctionDecl<'ast>,
        owner: TypeDecl,
        owner_scope: ScopeId,
    ) -> SemanticResult<()> {
        let function = self.declare_function(method, FunctionKind::Method(owner), owner_scope)?;
        let signature = self.ctx.function(function).signature.clone();
        let existing = match owner {
            TypeDecl::Struct(id) => &self.ctx.struct_info(id).methods,
            TypeDecl::Enum(id) => &self.ctx.enum_info(id).methods,
            TypeDecl::Spec(_) => return Ok(()),
        };
        let clash = existing.iter().any(|other| {
            let other = self.ctx.function(*other);
            other.name == method.name.name && same_signature(&other.signature, &signature)
        });
        if clash {
            return Err(SemanticError::duplicate(
                format!("Function '{}' with this signature is already defined.", method.name.name),
                "Overloads must have different parameter types.",
                method.span,
            ));
        }
        match owner {
            TypeDecl::Struct(id) => self.ctx.struct_info_mut(id).methods.push(function),
            TypeDecl::Enum(id) => self.ctx.enum_info_mut(id).methods.push(function),
            TypeDecl::Spec(_) => {}
        }

        let qualified = format!("{}.{}", self.ctx.type_name(owner), method.name.name);
        self.linker.define(LinkerSymbol::new(
            qualified,
            LinkerSymbolKind::Function,
            self.module.name.clone(),
            Some(Type::Function(signature)),
            method.span,
        ))
    }

    fn hoist_spec_methods(&mut self, ast: &'ast SpecDecl<'ast>, id: SpecId) -> SemanticResult<()> {
        let scope = self.ctx.spec_info(id).scope;
        let mut methods = Vec::with_capacity(ast.methods.len());
        for method in ast.methods {
            let method_scope = self.ctx.scopes.create(Some(scope));
            for param in method.generic_params {
                self.ctx.scopes.define(
                    method_scope,
                    Symbol::new(
                        param.name.name,
                        SymbolKind::TypeAlias,
                        Some(Type::named(param.name.name)),
                        SymbolTarget::Builtin,
                        param.name.span,
                    ),
                )?;
            }
            let info = self.with_scope(method_scope, |this| {
                let params = method
                    .params
                    .iter()
                    .map(|p| -> SemanticResult<_> {
                        Ok((p.name.name.to_string(), this.resolve_type_expr(&p.ty)?, p.span))
                    })
                    .collect::<SemanticResult<Vec<_>>>()?;
                let ret = this.resolve_return_type(method.ret.as_ref())?;
                Ok(SpecMethodInfo {
                    name: method.name.name.to_string(),
                    params,
                    ret,
                    span: method.span,
                })
            })?;
            methods.push(info);
        }
        self.ctx.spec_info_mut(id).methods = methods;
        Ok(())
    }

    fn validate_alias(&mut self, ast: &'ast TypeAliasDecl<'ast>, id: AliasId) -> SemanticResult<()> {
        if self.ctx.alias(id).generic_params.is_empty() {
            let ty = self.resolver().resolve(&Type::named(ast.name.name), ast.span)?;
            self.record(ast.ty.id(), &ty);
            self.record(ast.id, &ty);
            return Ok(());
        }
        let scope = self.ctx.alias(id).scope;
        self.with_scope(scope, |this| this.resolve_type_expr(&ast.ty))?;
        Ok(())
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Register a function and resolve its signature in a fresh scope
    /// holding its generic parameters.
    pub(crate) fn declare_function(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
        kind: FunctionKind,
        parent: ScopeId,
    ) -> SemanticResult<FunctionId> {
        let id = self.ctx.add_function(FunctionInfo {
            name: decl.name.name.to_string(),
            kind,
            is_static: decl.is_static,
            decl: Some(decl),
            generic_params: unconstrained(decl.generic_params),
            param_names: decl.params.iter().map(|p| p.name.name.to_string()).collect(),
            signature: FunctionType {
                params: Vec::new(),
                ret: Box::new(Type::void()),
                is_variadic: false,
                decl: None,
            },
            span: decl.span,
        });
        let scope = self.ctx.scopes.create(Some(parent));
        self.signature_scopes.insert(id, scope);
        self.define_generic_symbols(scope, decl.generic_params, GenericOwner::Function(id))?;

        let (generic_params, params, ret) = self.with_scope(scope, |this| {
            let generic_params = this.resolve_generic_params(decl.generic_params)?;
            let params = decl
                .params
                .iter()
                .map(|p| this.resolve_type_expr(&p.ty))
                .collect::<SemanticResult<Vec<_>>>()?;
            let ret = this.resolve_return_type(decl.ret.as_ref())?;
            Ok((generic_params, params, ret))
        })?;

        let info = self.ctx.function_mut(id);
        info.generic_params = generic_params;
        info.signature.params = params;
        info.signature.ret = Box::new(ret);
        let ty = Type::Function(info.signature.clone());
        self.record(decl.id, &ty);
        self.types.record_decl(decl.id, DeclRef::Function(id));
        Ok(id)
    }

    fn hoist_function(&mut self, decl: &'ast FunctionDecl<'ast>) -> SemanticResult<()> {
        let module_scope = self.scope;
        let id = self.declare_function(decl, FunctionKind::Free, module_scope)?;
        let signature = self.ctx.function(id).signature.clone();
        self.define(Symbol::function(decl.name.name, signature.clone(), decl.name.span))?;
        self.linker.define(LinkerSymbol::new(
            decl.name.name,
            LinkerSymbolKind::Function,
            self.module.name.clone(),
            Some(Type::Function(signature)),
            decl.span,
        ))
    }

    fn hoist_extern(&mut self, decl: &'ast ExternDecl<'ast>) -> SemanticResult<()> {
        let params = decl
            .params
            .iter()
            .map(|p| self.resolve_type_expr(&p.ty))
            .collect::<SemanticResult<Vec<_>>>()?;
        let ret = self.resolve_return_type(decl.ret.as_ref())?;
        let id = self.ctx.add_function(FunctionInfo {
            name: decl.name.name.to_string(),
            kind: FunctionKind::Extern,
            is_static: false,
            decl: None,
            generic_params: Vec::new(),
            param_names: decl.params.iter().map(|p| p.name.name.to_string()).collect(),
            signature: FunctionType {
                params,
                ret: Box::new(ret),
                is_variadic: decl.is_variadic,
                decl: None,
            },
            span: decl.span,
        });
        let signature = self.ctx.function(id).signature.clone();
        self.record(decl.id, &Type::Function(signature.clone()));
        self.types.record_decl(decl.id, DeclRef::Function(id));
        self.define(Symbol::function(decl.name.name, signature.clone(), decl.name.span))?;
        self.linker.define(
            LinkerSymbol::new(
                decl.name.name,
                LinkerSymbolKind::Function,
                self.module.name.clone(),
                Some(Type::Function(signature)),
                decl.span,
            )
            .with_extern(true),
        )
    }
}
