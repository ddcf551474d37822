//! Member access and indexing.
//!
//! What `a.b` means depends on the type of `a`:
//! - a namespace: an exported symbol of the imported module
//! - a type: an enum variant or a static method
//! - a tuple: the element at a literal index
//! - a struct, enum or spec value (or a pointer to one): a field or method

use bpl_ast::{IndexExpr, MemberExpr};
use bpl_core::{
    BasicType, DeclRef, EnumId, ScopeId, SemanticError, SemanticResult, Type, TypeDecl,
};

use super::{enum_basic, is_integer_scalar};
use crate::checker::Checker;
use crate::context::VariantPayload;
use crate::lookup::{Candidate, find_field, find_methods, member_base};
use crate::overload::{GenericArgs, resolve_overload};
use crate::template::{build_type_map, substitute};

impl<'ast> Checker<'ast> {
    pub(crate) fn check_member(
        &mut self,
        member: &MemberExpr<'ast>,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let object = self.check_expr(&member.object, None)?;
        self.member_of(member, &object, expected)
    }

    /// The type of `member` given the already checked type of its object.
    pub(crate) fn member_of(
        &mut self,
        member: &MemberExpr<'ast>,
        object: &Type,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        match object {
            Type::Module(scope) => self.module_member(member, *scope),
            Type::Meta(inner) => self.static_member(member, inner, expected),
            Type::Tuple(elements) => {
                let name = member.property.name;
                match name.parse::<usize>().ok().and_then(|i| elements.get(i)) {
                    Some(element) => Ok(element.clone()),
                    None => Err(SemanticError::type_mismatch(
                        format!("Invalid tuple index '{}'", name),
                        format!("Valid indices are 0-{}", elements.len().saturating_sub(1)),
                        member.span,
                    )),
                }
            }
            _ => self.instance_member(member, object),
        }
    }

    fn module_member(&mut self, member: &MemberExpr<'ast>, scope: ScopeId) -> SemanticResult<Type> {
        let name = member.property.name;
        let Some(symbol) = self.ctx.scopes.get_local(scope, name) else {
            return Err(SemanticError::undefined_with(
                name,
                format!("Module has no exported member '{}'", name),
                member.property.span,
            ));
        };
        let (ty, decl) = self.symbol_value(symbol, scope, member.span)?;
        if let Some(decl) = decl {
            self.types.record_decl(member.id, decl);
        }
        Ok(ty)
    }

    fn static_member(
        &mut self,
        member: &MemberExpr<'ast>,
        inner: &Type,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let name = member.property.name;
        let Some(basic) = inner.as_basic().filter(|b| b.is_scalar()) else {
            return Err(cannot_access(member, &Type::Meta(Box::new(inner.clone()))));
        };

        if let Some(TypeDecl::Enum(id)) = basic.decl {
            if self.ctx.enum_info(id).variant(name).is_some() {
                return self.variant_value(member, basic, id, expected);
            }
        }

        let statics: Vec<Candidate> = find_methods(&self.ctx, basic, name, inner)
            .map(|lookup| lookup.candidates.into_iter().filter(|c| c.is_static).collect())
            .unwrap_or_default();
        if let Some(first) = statics.first() {
            if let (1, Some(id)) = (statics.len(), first.function) {
                self.types.record_decl(member.id, DeclRef::Function(id));
            }
            return Ok(Type::Function(first.signature.clone()));
        }

        match basic.decl {
            Some(TypeDecl::Enum(_)) => Err(SemanticError::undefined_with(
                name,
                format!("Enum '{}' has no variant '{}'", basic.name, name),
                member.span,
            )),
            Some(TypeDecl::Struct(_)) => Err(SemanticError::undefined_with(
                name,
                format!("Struct '{}' has no static method '{}'", basic.name, name),
                member.span,
            )),
            _ => Err(cannot_access(member, &Type::Meta(Box::new(inner.clone())))),
        }
    }

    /// `Enum.Variant` without a call: a unit variant is a value of the enum,
    /// a tuple variant is its constructor.
    fn variant_value(
        &mut self,
        member: &MemberExpr<'ast>,
        enum_ty: &BasicType,
        id: EnumId,
        expected: Option<&Type>,
    ) -> SemanticResult<Type> {
        let generic_args = self.variant_generic_args(enum_ty, expected);
        let info = self.ctx.enum_info(id);
        let map = build_type_map(&info.generic_params, &generic_args);
        let result = Type::Basic(BasicType {
            generic_args,
            ..enum_ty.clone()
        });
        let Some(variant) = info.variant(member.property.name) else {
            return Err(cannot_access(member, &result));
        };

        let ty = match &variant.payload {
            VariantPayload::Unit => result,
            VariantPayload::Tuple(types) => Type::function(
                types.iter().map(|t| substitute(t, &map)).collect(),
                result,
            ),
            VariantPayload::Struct(_) => {
                return Err(SemanticError::type_mismatch(
                    format!("Variant '{}' is a struct variant", variant.name),
                    format!(
                        "Use struct literal syntax: {}.{} {{ ... }}",
                        enum_ty.name, variant.name
                    ),
                    member.span,
                ));
            }
        };
        self.types.record_decl(member.id, DeclRef::Type(TypeDecl::Enum(id)));
        Ok(ty)
    }

    /// Generic arguments for a variant of `enum_ty`: those written on the
    /// type, else those of an expected instantiation of the same enum.
    pub(crate) fn variant_generic_args(&self, enum_ty: &BasicType, expected: Option<&Type>) -> Vec<Type> {
        if !enum_ty.generic_args.is_empty() {
            return enum_ty.generic_args.clone();
        }
        expected
            .and_then(enum_basic)
            .filter(|e| e.decl == enum_ty.decl)
            .map(|e| e.generic_args.clone())
            .unwrap_or_default()
    }

    fn instance_member(&mut self, member: &MemberExpr<'ast>, object: &Type) -> SemanticResult<Type> {
        let name = member.property.name;
        let Some(base) = member_base(&self.ctx, self.scope, object) else {
            return Err(cannot_access(member, object));
        };

        if let Some(TypeDecl::Struct(_)) = base.decl {
            if let Some(field) = find_field(&self.ctx, &base, name) {
                return Ok(field.ty);
            }
        }

        let lookup = find_methods(&self.ctx, &base, name, object);
        let instance: Vec<Candidate> = lookup
            .iter()
            .flat_map(|l| l.candidates.iter())
            .filter(|c| !c.is_static)
            .cloned()
            .collect();
        if let Some(first) = instance.first() {
            if let (1, Some(id)) = (instance.len(), first.function) {
                self.types.record_decl(member.id, DeclRef::Function(id));
            }
            return Ok(Type::Function(first.signature.clone()));
        }
        if lookup.is_some() {
            return Err(static_on_instance(member, object));
        }

        match base.decl {
            Some(TypeDecl::Enum(_)) => Err(SemanticError::undefined_with(
                name,
                format!("Enum '{}' has no method '{}'", base.name, name),
                member.span,
            )),
            Some(TypeDecl::Spec(_)) => Err(SemanticError::undefined_with(
                name,
                format!("Spec '{}' has no method '{}'", base.name, name),
                member.span,
            )),
            _ => Err(cannot_access(member, object)),
        }
    }

    /// Arrays yield their element and pointers their pointee; other types
    /// need an `__index__` method.
    pub(crate) fn check_index(&mut self, index: &IndexExpr<'ast>) -> SemanticResult<Type> {
        let object = self.check_expr(&index.object, None)?;
        let element = if object.is_array() {
            object.element()
        } else if object.is_pointer() {
            object.pointee()
        } else {
            None
        };

        if let Some(element) = element {
            let index_ty = self.check_expr(&index.index, None)?;
            if !is_integer_scalar(&index_ty) {
                return Err(SemanticError::type_mismatch(
                    format!("Index must be an integer, got {}", index_ty),
                    "Use an integer expression to index arrays and pointers.",
                    index.index.span(),
                ));
            }
            return Ok(element);
        }

        let lookup = member_base(&self.ctx, self.scope, &object)
            .filter(|_| !object.is_pointer())
            .and_then(|base| find_methods(&self.ctx, &base, "__index__", &object));
        if let Some(lookup) = lookup {
            let index_ty = self.check_expr(&index.index, None)?;
            let matched = resolve_overload(
                &self.ctx,
                "__index__",
                &lookup.candidates,
                &[index_ty],
                GenericArgs::default(),
                index.span,
            )?;
            if let Some(id) = lookup.candidates[matched.index].function {
                self.types.record_decl(index.id, DeclRef::Function(id));
            }
            return Ok(*matched.signature.ret);
        }

        Err(SemanticError::type_mismatch(
            format!("Type '{}' is not indexable", object),
            "Only arrays, pointers, or types with __index__ operator can be indexed.",
            index.span,
        ))
    }
}

fn cannot_access(member: &MemberExpr<'_>, object: &Type) -> SemanticError {
    SemanticError::undefined_with(
        member.property.name,
        format!(
            "Cannot access member '{}' on type '{}'",
            member.property.name, object
        ),
        member.span,
    )
}

pub(crate) fn static_on_instance(member: &MemberExpr<'_>, object: &Type) -> SemanticError {
    SemanticError::type_mismatch(
        format!(
            "No compatible instance method '{}' found on type '{}'",
            member.property.name, object
        ),
        "Static methods must be called on the type, not an instance.",
        member.span,
    )
}
