//! Member lookup on named types.
//!
//! Fields and methods are found by walking from a type to its ancestors.
//! Each step carries the substitution from the ancestor's generic
//! parameters to the arguments the child supplied, so `Child<i32>` deriving
//! `Parent<T>` sees `Parent`'s `T` fields as `i32`.

use bpl_core::{BasicType, FunctionId, FunctionType, ScopeId, StructId, Type, TypeDecl, primitives};

use crate::context::{GenericParamInfo, SemanticContext};
use crate::conversion::MAX_INHERITANCE_DEPTH;
use crate::scope::SymbolTarget;
use crate::template::{TypeMap, build_type_map, substitute, substitute_signature};

/// A function that a call could bind to.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// `None` for spec requirements and function-typed values.
    pub function: Option<FunctionId>,
    pub name: String,
    pub generic_params: Vec<GenericParamInfo>,
    /// Signature with the owner's generic arguments already substituted.
    pub signature: FunctionType,
    pub is_static: bool,
}

impl Candidate {
    /// A candidate for a declared function, as seen through `map`.
    pub fn from_function(ctx: &SemanticContext<'_>, id: FunctionId, map: &TypeMap) -> Self {
        let info = ctx.function(id);
        Self {
            function: Some(id),
            name: info.name.clone(),
            generic_params: info.generic_params.clone(),
            signature: substitute_signature(&info.signature, map),
            is_static: info.is_static,
        }
    }

    /// A candidate for a bare signature, looking up its declaration if any.
    pub fn from_signature(ctx: &SemanticContext<'_>, name: &str, signature: &FunctionType) -> Self {
        match signature.decl {
            Some(id) => Self::from_function(ctx, id, &TypeMap::default()),
            None => Self {
                function: None,
                name: name.to_string(),
                generic_params: Vec::new(),
                signature: signature.clone(),
                is_static: false,
            },
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }

    /// `name(params) => ret`
    pub fn describe(&self) -> String {
        format!("{}{}", self.name, Type::Function(self.signature.clone()))
    }
}

/// A field found on a type or one of its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLookup {
    pub owner: StructId,
    pub ty: Type,
}

/// Methods sharing a name, all from the nearest type that declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodLookup {
    pub owner: TypeDecl,
    pub candidates: Vec<Candidate>,
    /// Substitution from the owner's generic parameters.
    pub map: TypeMap,
}

/// The named type members are looked up on.
///
/// One level of pointer is looked through, and a generic parameter with a
/// constraint is replaced by its constraint.
pub fn member_base(ctx: &SemanticContext<'_>, scope: ScopeId, ty: &Type) -> Option<BasicType> {
    let basic = ty.as_basic()?;
    if basic.pointer_depth > 1 || !basic.array_dims.is_empty() {
        return None;
    }
    let mut base = BasicType {
        pointer_depth: 0,
        ..basic.clone()
    };
    if base.decl.is_none() {
        base = constraint_of(ctx, scope, &base.name)?;
    }
    base.decl.map(|_| base)
}

/// The constraint of the generic parameter `name` visible from `scope`.
pub fn constraint_of(ctx: &SemanticContext<'_>, scope: ScopeId, name: &str) -> Option<BasicType> {
    if primitives::BASE_TYPES.contains(&name) {
        return None;
    }
    let symbol = ctx.scopes.resolve(scope, name)?;
    let SymbolTarget::GenericParam(owner, index) = symbol.target else {
        return None;
    };
    let param = ctx.generic_params(owner).get(index as usize)?;
    param.constraint.as_ref()?.as_basic().cloned()
}

/// Walk a struct and its ancestors, yielding each with its substitution.
fn struct_chain(ctx: &SemanticContext<'_>, base: &BasicType) -> Vec<(StructId, TypeMap)> {
    let mut chain = Vec::new();
    let Some(TypeDecl::Struct(mut id)) = base.decl else {
        return chain;
    };
    let mut map = build_type_map(&ctx.struct_info(id).generic_params, &base.generic_args);

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let parent = ctx
            .struct_info(id)
            .parent
            .as_ref()
            .map(|p| substitute(p, &map));
        chain.push((id, map));

        let Some(Type::Basic(parent)) = parent else {
            break;
        };
        let Some(TypeDecl::Struct(parent_id)) = parent.decl else {
            break;
        };
        if chain.iter().any(|(seen, _)| *seen == parent_id) {
            break;
        }
        id = parent_id;
        map = build_type_map(&ctx.struct_info(id).generic_params, &parent.generic_args);
    }
    chain
}

/// Find field `name` on a struct type or its ancestors.
pub fn find_field(ctx: &SemanticContext<'_>, base: &BasicType, name: &str) -> Option<FieldLookup> {
    struct_chain(ctx, base).into_iter().find_map(|(id, map)| {
        ctx.struct_info(id)
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|field| FieldLookup {
                owner: id,
                ty: substitute(&field.ty, &map),
            })
    })
}

/// Every field visible on a struct type, nearest declaration first.
pub fn all_fields(ctx: &SemanticContext<'_>, base: &BasicType) -> Vec<(String, Type)> {
    let mut fields: Vec<(String, Type)> = Vec::new();
    for (id, map) in struct_chain(ctx, base) {
        for field in &ctx.struct_info(id).fields {
            if !fields.iter().any(|(n, _)| *n == field.name) {
                fields.push((field.name.clone(), substitute(&field.ty, &map)));
            }
        }
    }
    fields
}

/// Find methods called `name` on a struct, enum, or spec type.
///
/// For structs the nearest ancestor declaring the name wins. Spec
/// requirements are searched through parent specs, with `Self` bound to
/// `self_type`.
pub fn find_methods(
    ctx: &SemanticContext<'_>,
    base: &BasicType,
    name: &str,
    self_type: &Type,
) -> Option<MethodLookup> {
    match base.decl? {
        TypeDecl::Struct(_) => struct_chain(ctx, base).into_iter().find_map(|(id, map)| {
            let candidates: Vec<Candidate> = ctx
                .struct_info(id)
                .methods
                .iter()
                .filter(|m| ctx.function(**m).name == name)
                .map(|m| Candidate::from_function(ctx, *m, &map))
                .collect();
            (!candidates.is_empty()).then(|| MethodLookup {
                owner: TypeDecl::Struct(id),
                candidates,
                map,
            })
        }),
        TypeDecl::Enum(id) => {
            let info = ctx.enum_info(id);
            let map = build_type_map(&info.generic_params, &base.generic_args);
            let candidates: Vec<Candidate> = info
                .methods
                .iter()
                .filter(|m| ctx.function(**m).name == name)
                .map(|m| Candidate::from_function(ctx, *m, &map))
                .collect();
            (!candidates.is_empty()).then(|| MethodLookup {
                owner: TypeDecl::Enum(id),
                candidates,
                map,
            })
        }
        TypeDecl::Spec(_) => find_spec_method(ctx, base, name, self_type),
    }
}

fn find_spec_method(
    ctx: &SemanticContext<'_>,
    base: &BasicType,
    name: &str,
    self_type: &Type,
) -> Option<MethodLookup> {
    let mut pending = vec![base.clone()];
    let mut hops = 0;
    while let Some(current) = pending.pop() {
        hops += 1;
        if hops > MAX_INHERITANCE_DEPTH {
            break;
        }
        let Some(TypeDecl::Spec(id)) = current.decl else {
            continue;
        };
        let info = ctx.spec_info(id);
        let mut map = build_type_map(&info.generic_params, &current.generic_args);
        map.insert("Self".to_string(), self_type.clone());

        let candidates: Vec<Candidate> = info
            .methods
            .iter()
            .filter(|m| m.name == name)
            .map(|m| Candidate {
                function: None,
                name: m.name.clone(),
                generic_params: Vec::new(),
                signature: substitute_signature(
                    &FunctionType {
                        params: m.params.iter().map(|(_, ty, _)| ty.clone()).collect(),
                        ret: Box::new(m.ret.clone()),
                        is_variadic: false,
                        decl: None,
                    },
                    &map,
                ),
                is_static: false,
            })
            .collect();
        if !candidates.is_empty() {
            return Some(MethodLookup {
                owner: TypeDecl::Spec(id),
                candidates,
                map,
            });
        }
        for parent in &info.parents {
            if let Type::Basic(parent) = substitute(parent, &map) {
                pending.push(parent);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FieldInfo, FunctionInfo, FunctionKind, StructInfo};
    use bpl_core::Span;

    fn add_struct(
        ctx: &mut SemanticContext<'_>,
        name: &str,
        generics: &[&str],
        parent: Option<Type>,
        fields: &[(&str, Type)],
    ) -> StructId {
        ctx.add_struct(StructInfo {
            name: name.to_string(),
            decl: None,
            generic_params: generics.iter().map(|g| GenericParamInfo::unconstrained(*g)).collect(),
            parent,
            specs: Vec::new(),
            fields: fields
                .iter()
                .map(|(n, ty)| FieldInfo {
                    name: n.to_string(),
                    ty: ty.clone(),
                    span: Span::default(),
                })
                .collect(),
            methods: Vec::new(),
            scope: ScopeId::new(0),
            span: Span::default(),
        })
    }

    fn instance(name: &str, id: StructId, args: Vec<Type>) -> BasicType {
        BasicType {
            generic_args: args,
            decl: Some(TypeDecl::Struct(id)),
            ..BasicType::named(name)
        }
    }

    #[test]
    fn inherited_fields_are_visible() {
        let mut ctx = SemanticContext::new();
        let parent = add_struct(&mut ctx, "Parent", &[], None, &[("x", Type::named("i32"))]);
        let child = add_struct(
            &mut ctx,
            "Child",
            &[],
            Some(Type::Basic(instance("Parent", parent, vec![]))),
            &[("y", Type::named("i32"))],
        );
        let base = instance("Child", child, vec![]);
        assert_eq!(find_field(&ctx, &base, "x").unwrap().owner, parent);
        assert_eq!(find_field(&ctx, &base, "y").unwrap().owner, child);
        assert!(find_field(&ctx, &base, "z").is_none());
        assert_eq!(all_fields(&ctx, &base).len(), 2);
    }

    #[test]
    fn generic_parent_fields_are_substituted() {
        let mut ctx = SemanticContext::new();
        let parent = add_struct(&mut ctx, "Holder", &["T"], None, &[("value", Type::named("T"))]);
        let child = add_struct(
            &mut ctx,
            "Named",
            &["U"],
            Some(Type::Basic(instance("Holder", parent, vec![Type::pointer("U", 1)]))),
            &[],
        );
        let base = instance("Named", child, vec![Type::named("i8")]);
        assert_eq!(find_field(&ctx, &base, "value").unwrap().ty, Type::pointer("i8", 1));
    }

    #[test]
    fn nearest_method_wins() {
        let mut ctx = SemanticContext::new();
        let parent = add_struct(&mut ctx, "A", &[], None, &[]);
        let child = add_struct(
            &mut ctx,
            "B",
            &[],
            Some(Type::Basic(instance("A", parent, vec![]))),
            &[],
        );
        for owner in [parent, child] {
            let id = ctx.add_function(FunctionInfo {
                name: "area".to_string(),
                kind: FunctionKind::Method(TypeDecl::Struct(owner)),
                is_static: false,
                decl: None,
                generic_params: Vec::new(),
                param_names: Vec::new(),
                signature: bpl_core::FunctionType {
                    params: Vec::new(),
                    ret: Box::new(Type::named("i32")),
                    is_variadic: false,
                    decl: None,
                },
                span: Span::default(),
            });
            ctx.struct_info_mut(owner).methods.push(id);
        }
        let base = instance("B", child, vec![]);
        let found = find_methods(&ctx, &base, "area", &Type::Basic(base.clone())).unwrap();
        assert_eq!(found.owner, TypeDecl::Struct(child));
        assert_eq!(found.candidates.len(), 1);
        assert_eq!(found.candidates[0].describe(), "area() => i32");
    }

    #[test]
    fn cyclic_parents_terminate() {
        let mut ctx = SemanticContext::new();
        let a = add_struct(&mut ctx, "A", &[], None, &[]);
        let b = add_struct(&mut ctx, "B", &[], Some(Type::Basic(instance("A", a, vec![]))), &[]);
        ctx.struct_info_mut(a).parent = Some(Type::Basic(instance("B", b, vec![])));
        assert!(find_field(&ctx, &instance("A", a, vec![]), "missing").is_none());
    }

    #[test]
    fn pointer_base_is_looked_through() {
        let mut ctx = SemanticContext::new();
        let root = ctx.scopes.create(None);
        let id = add_struct(&mut ctx, "P", &[], None, &[]);
        let one = Type::Basic(BasicType {
            pointer_depth: 1,
            ..instance("P", id, vec![])
        });
        let two = Type::Basic(BasicType {
            pointer_depth: 2,
            ..instance("P", id, vec![])
        });
        assert!(member_base(&ctx, root, &one).is_some());
        assert!(member_base(&ctx, root, &two).is_none());
        assert!(member_base(&ctx, root, &Type::named("i32")).is_none());
    }
}
