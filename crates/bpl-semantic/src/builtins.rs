//! Builtin types seeded into every root and module scope.

use bpl_core::{BasicType, SemanticResult, ScopeId, Span, StructId, Type, TypeDecl, primitives};

use crate::context::{FieldInfo, SemanticContext, StructInfo};
use crate::scope::{Symbol, SymbolKind, SymbolTarget};

/// Register the compiler-provided `NullAccessError` struct.
pub fn register_null_access_error(ctx: &mut SemanticContext<'_>, scope: ScopeId) -> StructId {
    let fields = primitives::NULL_ACCESS_ERROR_FIELDS
        .iter()
        .map(|name| FieldInfo {
            name: (*name).to_string(),
            ty: string_type(),
            span: Span::internal(),
        })
        .collect();
    ctx.add_struct(StructInfo {
        name: primitives::NULL_ACCESS_ERROR.to_string(),
        decl: None,
        generic_params: Vec::new(),
        parent: None,
        specs: Vec::new(),
        fields,
        methods: Vec::new(),
        scope,
        span: Span::internal(),
    })
}

/// `*i8`
pub fn string_type() -> Type {
    Type::pointer(primitives::STRING_ELEMENT, 1)
}

/// Define base types, friendly aliases, `string`, and `NullAccessError` in
/// `scope`.
pub fn install(
    ctx: &mut SemanticContext<'_>,
    scope: ScopeId,
    null_access_error: StructId,
) -> SemanticResult<()> {
    let scopes = &mut ctx.scopes;
    for name in primitives::BASE_TYPES {
        scopes.define(scope, alias_symbol(name, Type::named(*name)))?;
    }
    for (alias, base) in primitives::TYPE_ALIASES {
        scopes.define(scope, alias_symbol(alias, Type::named(*base)))?;
    }
    scopes.define(scope, alias_symbol("string", string_type()))?;

    let decl = TypeDecl::Struct(null_access_error);
    scopes.define(
        scope,
        Symbol::new(
            primitives::NULL_ACCESS_ERROR,
            SymbolKind::Struct,
            Some(Type::Basic(BasicType {
                decl: Some(decl),
                ..BasicType::named(primitives::NULL_ACCESS_ERROR)
            })),
            SymbolTarget::Type(decl),
            Span::internal(),
        ),
    )
}

fn alias_symbol(name: &str, target: Type) -> Symbol {
    Symbol::new(
        name,
        SymbolKind::TypeAlias,
        Some(target),
        SymbolTarget::Builtin,
        Span::internal(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (SemanticContext<'static>, ScopeId) {
        let mut ctx = SemanticContext::new();
        let root = ctx.scopes.create(None);
        let nae = register_null_access_error(&mut ctx, root);
        install(&mut ctx, root, nae).unwrap();
        (ctx, root)
    }

    #[test]
    fn base_types_are_self_aliases() {
        let (ctx, root) = seeded();
        for name in primitives::BASE_TYPES {
            let symbol = ctx.scopes.resolve(root, name).unwrap();
            assert_eq!(symbol.kind, SymbolKind::TypeAlias);
            assert_eq!(symbol.ty, Some(Type::named(*name)));
        }
    }

    #[test]
    fn friendly_aliases_and_string() {
        let (ctx, root) = seeded();
        let int = ctx.scopes.resolve(root, "int").unwrap();
        assert_eq!(int.ty, Some(Type::named("i32")));
        let string = ctx.scopes.resolve(root, "string").unwrap();
        assert_eq!(string.ty.as_ref().map(ToString::to_string), Some("*i8".to_string()));
    }

    #[test]
    fn null_access_error_fields() {
        let (ctx, root) = seeded();
        let symbol = ctx.scopes.resolve(root, "NullAccessError").unwrap();
        assert_eq!(symbol.kind, SymbolKind::Struct);
        let SymbolTarget::Type(TypeDecl::Struct(id)) = symbol.target else {
            panic!("expected struct target");
        };
        let names: Vec<_> = ctx.struct_info(id).fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["message", "function", "expression"]);
    }

    #[test]
    fn install_is_repeatable_per_scope() {
        let (mut ctx, _) = seeded();
        let module = ctx.scopes.create(None);
        install(&mut ctx, module, StructId::new(0)).unwrap();
        assert!(ctx.scopes.resolve(module, "ulong").is_some());
    }
}
