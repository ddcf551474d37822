//! Declaration tables built during hoisting.
//!
//! Every struct, enum, spec, function, and alias is interned once into a
//! flat table and referenced by index afterwards. Signatures, fields, and
//! parents are stored already resolved, so later passes never re-resolve a
//! declaration by name.

use bpl_ast::{EnumDecl, FunctionDecl, SpecDecl, StructDecl, TypeAliasDecl};
use bpl_core::{
    AliasId, EnumId, FunctionId, FunctionType, ScopeId, SpecId, Span, StructId, Type, TypeDecl,
};

use crate::scope::{GenericOwner, ScopeTable};

// ============================================================================
// Declaration Info
// ============================================================================

/// A generic parameter with its optional constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParamInfo {
    pub name: String,
    /// Constraint resolved in the declaring scope.
    pub constraint: Option<Type>,
    /// Constraint as written, used in diagnostics.
    pub constraint_src: Option<Type>,
}

impl GenericParamInfo {
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            constraint_src: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructInfo<'ast> {
    pub name: String,
    /// `None` for compiler-provided structs.
    pub decl: Option<&'ast StructDecl<'ast>>,
    pub generic_params: Vec<GenericParamInfo>,
    /// Single inheritance parent.
    pub parent: Option<Type>,
    /// Specs the struct claims to implement.
    pub specs: Vec<Type>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<FunctionId>,
    /// Scope holding the generic parameters, a child of the declaring scope.
    pub scope: ScopeId,
    pub span: Span,
}

/// Payload of an enum variant, resolved in the enum's generic scope.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantPayload {
    Unit,
    Tuple(Vec<Type>),
    Struct(Vec<FieldInfo>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantInfo {
    pub name: String,
    pub payload: VariantPayload,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumInfo<'ast> {
    pub name: String,
    pub decl: &'ast EnumDecl<'ast>,
    pub generic_params: Vec<GenericParamInfo>,
    pub variants: Vec<VariantInfo>,
    pub methods: Vec<FunctionId>,
    pub scope: ScopeId,
}

impl EnumInfo<'_> {
    pub fn variant(&self, name: &str) -> Option<&VariantInfo> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// A method a spec requires, with `Self` and the spec's generics unbound.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMethodInfo {
    pub name: String,
    pub params: Vec<(String, Type, Span)>,
    pub ret: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SpecInfo<'ast> {
    pub name: String,
    pub decl: &'ast SpecDecl<'ast>,
    pub generic_params: Vec<GenericParamInfo>,
    pub parents: Vec<Type>,
    pub methods: Vec<SpecMethodInfo>,
    pub scope: ScopeId,
}

/// Where a function lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Free,
    Method(TypeDecl),
    Extern,
}

#[derive(Debug, Clone)]
pub struct FunctionInfo<'ast> {
    pub name: String,
    pub kind: FunctionKind,
    pub is_static: bool,
    /// `None` for externs.
    pub decl: Option<&'ast FunctionDecl<'ast>>,
    pub generic_params: Vec<GenericParamInfo>,
    /// Parameter names, parallel to `signature.params`.
    pub param_names: Vec<String>,
    pub signature: FunctionType,
    pub span: Span,
}

impl FunctionInfo<'_> {
    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AliasInfo<'ast> {
    pub name: String,
    pub decl: &'ast TypeAliasDecl<'ast>,
    pub generic_params: Vec<GenericParamInfo>,
    /// Target as written; resolved in `scope` at each use.
    pub target: Type,
    pub scope: ScopeId,
}

// ============================================================================
// SemanticContext
// ============================================================================

/// All hoisted declarations plus the scope arena.
#[derive(Debug, Default)]
pub struct SemanticContext<'ast> {
    pub scopes: ScopeTable,
    pub structs: Vec<StructInfo<'ast>>,
    pub enums: Vec<EnumInfo<'ast>>,
    pub specs: Vec<SpecInfo<'ast>>,
    pub functions: Vec<FunctionInfo<'ast>>,
    pub aliases: Vec<AliasInfo<'ast>>,
}

impl<'ast> SemanticContext<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    pub fn add_struct(&mut self, info: StructInfo<'ast>) -> StructId {
        let id = StructId::new(self.structs.len() as u32);
        self.structs.push(info);
        id
    }

    pub fn add_enum(&mut self, info: EnumInfo<'ast>) -> EnumId {
        let id = EnumId::new(self.enums.len() as u32);
        self.enums.push(info);
        id
    }

    pub fn add_spec(&mut self, info: SpecInfo<'ast>) -> SpecId {
        let id = SpecId::new(self.specs.len() as u32);
        self.specs.push(info);
        id
    }

    /// Register a function; its signature's `decl` is set to the new id.
    pub fn add_function(&mut self, mut info: FunctionInfo<'ast>) -> FunctionId {
        let id = FunctionId::new(self.functions.len() as u32);
        info.signature.decl = Some(id);
        self.functions.push(info);
        id
    }

    pub fn add_alias(&mut self, info: AliasInfo<'ast>) -> AliasId {
        let id = AliasId::new(self.aliases.len() as u32);
        self.aliases.push(info);
        id
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn struct_info(&self, id: StructId) -> &StructInfo<'ast> {
        &self.structs[id.index()]
    }

    pub fn struct_info_mut(&mut self, id: StructId) -> &mut StructInfo<'ast> {
        &mut self.structs[id.index()]
    }

    pub fn enum_info(&self, id: EnumId) -> &EnumInfo<'ast> {
        &self.enums[id.index()]
    }

    pub fn enum_info_mut(&mut self, id: EnumId) -> &mut EnumInfo<'ast> {
        &mut self.enums[id.index()]
    }

    pub fn spec_info(&self, id: SpecId) -> &SpecInfo<'ast> {
        &self.specs[id.index()]
    }

    pub fn spec_info_mut(&mut self, id: SpecId) -> &mut SpecInfo<'ast> {
        &mut self.specs[id.index()]
    }

    pub fn function(&self, id: FunctionId) -> &FunctionInfo<'ast> {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionInfo<'ast> {
        &mut self.functions[id.index()]
    }

    pub fn alias(&self, id: AliasId) -> &AliasInfo<'ast> {
        &self.aliases[id.index()]
    }

    pub fn alias_mut(&mut self, id: AliasId) -> &mut AliasInfo<'ast> {
        &mut self.aliases[id.index()]
    }

    /// Generic parameters of any declaration that can have them.
    pub fn generic_params(&self, owner: GenericOwner) -> &[GenericParamInfo] {
        match owner {
            GenericOwner::Struct(id) => &self.struct_info(id).generic_params,
            GenericOwner::Enum(id) => &self.enum_info(id).generic_params,
            GenericOwner::Spec(id) => &self.spec_info(id).generic_params,
            GenericOwner::Function(id) => &self.function(id).generic_params,
            GenericOwner::Alias(id) => &self.alias(id).generic_params,
        }
    }

    /// Generic parameters of a named type's declaration.
    pub fn type_generic_params(&self, decl: TypeDecl) -> &[GenericParamInfo] {
        match decl {
            TypeDecl::Struct(id) => &self.struct_info(id).generic_params,
            TypeDecl::Enum(id) => &self.enum_info(id).generic_params,
            TypeDecl::Spec(id) => &self.spec_info(id).generic_params,
        }
    }

    /// Name of a named type's declaration.
    pub fn type_name(&self, decl: TypeDecl) -> &str {
        match decl {
            TypeDecl::Struct(id) => &self.struct_info(id).name,
            TypeDecl::Enum(id) => &self.enum_info(id).name,
            TypeDecl::Spec(id) => &self.spec_info(id).name,
        }
    }

    /// Rendered signature of a function, e.g. `add(i32, i32) => i32`.
    pub fn describe_function(&self, id: FunctionId) -> String {
        let info = self.function(id);
        format!("{}{}", info.name, render_signature(&info.signature))
    }
}

/// `(a, b) => r` without the surrounding type prefix.
pub fn render_signature(signature: &FunctionType) -> String {
    Type::Function(signature.clone()).to_string()
}
