//! Call checking.
//!
//! Named functions and methods go through overload resolution. Everything
//! else is a call of a value: a function-typed expression or an object with
//! a `__call__` method.

use bpl_ast::{CallExpr, Expr, MemberExpr};
use bpl_core::{
    BasicType, DeclRef, EnumId, FunctionType, SemanticError, SemanticResult, Type, TypeDecl,
};

use super::member::static_on_instance;
use crate::checker::Checker;
use crate::context::VariantPayload;
use crate::lookup::{Candidate, find_field, find_methods, member_base};
use crate::overload::{GenericArgs, resolve_overload};
use crate::scope::SymbolKind;
use crate::template::{build_type_map, substitute};

impl<'ast> Checker<'ast> {
    pub(crate) fn check_call(
        &mut self,
        call: &CallExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let (mut callee, mut generic_args) = (call.callee, call.generic_args);
        if let Expr::GenericInstantiation(inst) = call.callee {
            let split = generic_args.is_empty()
                && match inst.base {
                    Expr::Member(_) => true,
                    base => self.function_candidates(&base)?.is_some(),
                };
            if split {
                callee = inst.base;
                generic_args = inst.generic_args;
            }
        }
        let (resolved, written) = self.explicit_generics(generic_args)?;
        let generics = GenericArgs {
            resolved: &resolved,
            written: &written,
        };

        match callee {
            Expr::Ident(_) => {
                if let Some((name, candidates)) = self.function_candidates(&callee)? {
                    return self.call_candidates(call, &callee, &name, &candidates, generics);
                }
            }
            Expr::Member(member) => return self.check_member_call(call, member, generics, expected),
            _ => {}
        }

        let callee_ty = self.check_expr(&callee, None)?;
        self.call_value(call, &callee_ty)
    }

    fn check_member_call(
        &mut self,
        call: &CallExpr<'ast>,
        member: &'ast MemberExpr<'ast>,
        generics: GenericArgs<'_>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let callee = Expr::Member(member);
        let name = member.property.name;
        let object = self.check_expr(&member.object, None)?;

        match &object {
            Type::Module(scope) => {
                let candidates: Option<Vec<Candidate>> = self
                    .ctx
                    .scopes
                    .get_local(*scope, name)
                    .filter(|symbol| symbol.kind == SymbolKind::Function)
                    .map(|symbol| {
                        symbol
                            .signatures()
                            .map(|signature| Candidate::from_signature(&self.ctx, name, signature))
                            .collect()
                    });
                if let Some(candidates) = candidates {
                    return self.call_candidates(call, &callee, name, &candidates, generics);
                }
            }
            Type::Meta(inner) => {
                if let Some(basic) = inner.as_basic().filter(|b| b.is_scalar()) {
                    if let Some(TypeDecl::Enum(id)) = basic.decl {
                        if self.ctx.enum_info(id).variant(name).is_some() {
                            return self.call_variant(call, member, basic, id, expected);
                        }
                    }
                    let statics: Vec<Candidate> = find_methods(&self.ctx, basic, name, inner)
                        .map(|l| l.candidates.into_iter().filter(|c| c.is_static).collect())
                        .unwrap_or_default();
                    if !statics.is_empty() {
                        return self.call_candidates(call, &callee, name, &statics, generics);
                    }
                }
            }
            _ => {
                if let Some(base) = member_base(&self.ctx, self.scope, &object) {
                    let is_field = matches!(base.decl, Some(TypeDecl::Struct(_)))
                        && find_field(&self.ctx, &base, name).is_some();
                    let lookup = find_methods(&self.ctx, &base, name, &object).filter(|_| !is_field);
                    if let Some(lookup) = lookup {
                        let instance: Vec<Candidate> =
                            lookup.candidates.into_iter().filter(|c| !c.is_static).collect();
                        if instance.is_empty() {
                            return Err(static_on_instance(member, &object));
                        }
                        return self.call_candidates(call, &callee, name, &instance, generics);
                    }
                }
            }
        }

        let callee_ty = self.member_of(member, &object, None)?;
        self.record(member.id, &callee_ty);
        self.call_value(call, &callee_ty)
    }

    /// Resolve `call` against named candidates and record the selection on
    /// the call and its callee.
    fn call_candidates(
        &mut self,
        call: &CallExpr<'ast>,
        callee: &Expr<'ast>,
        name: &str,
        candidates: &[Candidate],
        generics: GenericArgs<'_>,
    ) -> SemanticResult<Type> {
        let hints: Option<Vec<Type>> = match candidates {
            [only]
                if only.signature.params.len() == call.args.len()
                    && only.generic_params.len() == generics.resolved.len() =>
            {
                let map = build_type_map(&only.generic_params, generics.resolved);
                Some(only.signature.params.iter().map(|p| substitute(p, &map)).collect())
            }
            _ => None,
        };
        let mut args = Vec::with_capacity(call.args.len());
        for (i, arg) in call.args.iter().enumerate() {
            let hint = hints.as_ref().and_then(|h| h.get(i));
            args.push(self.check_expr(arg, hint)?);
        }

        let matched = resolve_overload(&self.ctx, name, candidates, &args, generics, call.span)?;
        let callee_ty = Type::Function(matched.signature.clone());
        self.record(callee.id(), &callee_ty);
        self.record(call.callee.id(), &callee_ty);
        if let Some(id) = candidates[matched.index].function {
            self.types.record_decl(callee.id(), DeclRef::Function(id));
            self.types.record_decl(call.id, DeclRef::Function(id));
        }
        Ok(*matched.signature.ret)
    }

    /// `Enum.Variant(args)`.
    ///
    /// A generic enum takes its arguments from the written type or the
    /// expected type; failing both, parameters used directly as payload
    /// types are inferred from the arguments.
    fn call_variant(
        &mut self,
        call: &CallExpr<'ast>,
        member: &MemberExpr<'ast>,
        enum_ty: &BasicType,
        id: EnumId,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let variant_name = member.property.name;
        let mut generic_args = self.variant_generic_args(enum_ty, expected);
        let info = self.ctx.enum_info(id);
        let params = info.generic_params.clone();
        let Some(variant) = info.variant(variant_name).cloned() else {
            return Err(SemanticError::undefined_with(
                variant_name,
                format!("Enum '{}' has no variant '{}'", enum_ty.name, variant_name),
                member.span,
            ));
        };

        let types = match variant.payload {
            VariantPayload::Tuple(types) => types,
            VariantPayload::Unit => {
                return Err(SemanticError::arity(
                    format!("Unit variant '{}' does not take any arguments", variant_name),
                    format!("Use: {}.{}", enum_ty.name, variant_name),
                    call.span,
                ));
            }
            VariantPayload::Struct(_) => {
                return Err(SemanticError::type_mismatch(
                    format!("Variant '{}' is a struct variant", variant_name),
                    format!(
                        "Use struct literal syntax: {}.{} {{ ... }}",
                        enum_ty.name, variant_name
                    ),
                    call.span,
                ));
            }
        };

        if types.len() != call.args.len() {
            let usage: Vec<String> = types.iter().map(ToString::to_string).collect();
            return Err(SemanticError::arity(
                format!(
                    "Enum variant '{}' expects {} arguments, but got {}",
                    variant_name,
                    types.len(),
                    call.args.len()
                ),
                format!("Usage: {}.{}({})", enum_ty.name, variant_name, usage.join(", ")),
                call.span,
            ));
        }

        let infer = generic_args.is_empty() && !params.is_empty();
        let mut map = build_type_map(&params, &generic_args);
        for (i, (arg, payload)) in call.args.iter().zip(&types).enumerate() {
            let unbound = payload
                .as_basic()
                .filter(|b| infer && b.is_scalar() && b.generic_args.is_empty())
                .map(|b| b.name.as_str())
                .filter(|name| params.iter().any(|p| p.name == *name) && !map.contains_key(*name));
            if let Some(param) = unbound {
                let actual = self.check_expr(arg, None)?;
                map.insert(param.to_string(), actual);
                continue;
            }
            let expected_arg = substitute(payload, &map);
            let actual = self.check_expr(arg, Some(&expected_arg))?;
            self.check_assignable(&expected_arg, &actual, arg, || {
                SemanticError::type_mismatch(
                    format!(
                        "Type mismatch for argument {} of '{}': expected {}, got {}",
                        i + 1,
                        variant_name,
                        expected_arg,
                        actual
                    ),
                    "Check the variant definition and argument types.",
                    arg.span(),
                )
            })?;
        }
        if infer && params.iter().all(|p| map.contains_key(&p.name)) {
            generic_args = params.iter().filter_map(|p| map.get(&p.name).cloned()).collect();
        }

        let result = Type::Basic(BasicType {
            generic_args,
            ..enum_ty.clone()
        });
        let constructor = Type::function(types.iter().map(|t| substitute(t, &map)).collect(), result.clone());
        self.record(member.id, &constructor);
        self.types.record_decl(member.id, DeclRef::Type(TypeDecl::Enum(id)));
        self.types.record_decl(call.id, DeclRef::Type(TypeDecl::Enum(id)));
        Ok(result)
    }

    /// Call a value of type `callee`.
    fn call_value(&mut self, call: &CallExpr<'ast>, callee: &Type) -> SemanticResult<Type> {
        if let Type::Function(signature) = callee {
            return self.call_signature(call, signature);
        }

        let lookup = member_base(&self.ctx, self.scope, callee)
            .filter(|_| !callee.is_pointer())
            .and_then(|base| find_methods(&self.ctx, &base, "__call__", callee));
        if let Some(lookup) = lookup {
            let args = self.check_args(call.args)?;
            let matched = resolve_overload(
                &self.ctx,
                "__call__",
                &lookup.candidates,
                &args,
                GenericArgs::default(),
                call.span,
            )?;
            if let Some(id) = lookup.candidates[matched.index].function {
                self.types.record_decl(call.id, DeclRef::Function(id));
            }
            return Ok(*matched.signature.ret);
        }

        Err(SemanticError::type_mismatch(
            format!("Type '{}' is not callable", callee),
            "Only functions or types with __call__ operator can be called.",
            call.span,
        ))
    }

    fn call_signature(&mut self, call: &CallExpr<'ast>, signature: &FunctionType) -> SemanticResult<Type> {
        let fixed = signature.params.len();
        let count_ok = if signature.is_variadic {
            call.args.len() >= fixed
        } else {
            call.args.len() == fixed
        };
        if !count_ok {
            return Err(SemanticError::arity(
                format!("Expected {} arguments, got {}", fixed, call.args.len()),
                "Argument count mismatch.",
                call.span,
            ));
        }

        for (i, arg) in call.args.iter().enumerate() {
            let param = signature.params.get(i);
            let actual = self.check_expr(arg, param)?;
            let Some(param) = param else {
                continue;
            };
            self.check_assignable(param, &actual, arg, || {
                SemanticError::type_mismatch(
                    format!(
                        "Argument {} type mismatch: expected {}, got {}",
                        i + 1,
                        param,
                        actual
                    ),
                    "Ensure argument types match.",
                    arg.span(),
                )
            })?;
        }
        if let Some(id) = signature.decl {
            self.types.record_decl(call.id, DeclRef::Function(id));
        }
        Ok((*signature.ret).clone())
    }
}
