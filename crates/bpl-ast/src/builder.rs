//! Arena-backed construction of syntax trees.
//!
//! Parsers and tests build trees through [`AstBuilder`], which allocates
//! every node in a [`Bump`] arena and hands out sequential [`NodeId`]s.
//! All modules of one compilation must be built with the same builder so
//! their ids do not collide in the checker's side table.
//!
//! ```
//! use bpl_ast::AstBuilder;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let program = b.program(
//!     "main.x",
//!     [b.local("x", Some(b.ty("i32")), Some(b.int(1)))],
//! );
//! assert_eq!(program.stmts.len(), 1);
//! ```

use std::cell::Cell;

use bpl_core::{NodeId, Span};
use bumpalo::Bump;

use crate::*;

/// Builds arena-allocated nodes.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
    span: Cell<Span>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
            span: Cell::new(Span::point(1, 1)),
        }
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Set the span stamped on nodes built from now on.
    pub fn at(&self, line: u32, col: u32) -> &Self {
        self.span.set(Span::point(line, col));
        self
    }

    /// Set a full span for subsequent nodes.
    pub fn at_span(&self, span: Span) -> &Self {
        self.span.set(span);
        self
    }

    /// Number of ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId::new(id)
    }

    fn span(&self) -> Span {
        self.span.get()
    }

    fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    fn str(&self, s: &str) -> &'ast str {
        self.arena.alloc_str(s)
    }

    fn slice<T: Copy>(&self, items: impl IntoIterator<Item = T>) -> &'ast [T] {
        let items: Vec<T> = items.into_iter().collect();
        self.arena.alloc_slice_copy(&items)
    }

    /// An identifier at the current span.
    pub fn name(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.str(name), self.span())
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// A plain named type.
    pub fn ty(&self, name: &str) -> TypeExpr<'ast> {
        self.named_type(name, [], 0, [])
    }

    /// `depth` levels of pointer to `name`.
    pub fn ptr(&self, name: &str, depth: u32) -> TypeExpr<'ast> {
        self.named_type(name, [], depth, [])
    }

    pub fn generic_ty(
        &self,
        name: &str,
        args: impl IntoIterator<Item = TypeExpr<'ast>>,
    ) -> TypeExpr<'ast> {
        self.named_type(name, args, 0, [])
    }

    pub fn array_ty(&self, name: &str, dims: impl IntoIterator<Item = Option<u64>>) -> TypeExpr<'ast> {
        self.named_type(name, [], 0, dims)
    }

    pub fn named_type(
        &self,
        name: &str,
        generic_args: impl IntoIterator<Item = TypeExpr<'ast>>,
        pointer_depth: u32,
        array_dims: impl IntoIterator<Item = Option<u64>>,
    ) -> TypeExpr<'ast> {
        TypeExpr::Named(self.alloc(NamedType {
            id: self.id(),
            name: self.str(name),
            generic_args: self.slice(generic_args),
            pointer_depth,
            array_dims: self.slice(array_dims),
            span: self.span(),
        }))
    }

    pub fn tuple_ty(&self, types: impl IntoIterator<Item = TypeExpr<'ast>>) -> TypeExpr<'ast> {
        TypeExpr::Tuple(self.alloc(TupleType {
            id: self.id(),
            types: self.slice(types),
            span: self.span(),
        }))
    }

    pub fn fn_ty(
        &self,
        params: impl IntoIterator<Item = TypeExpr<'ast>>,
        ret: TypeExpr<'ast>,
        is_variadic: bool,
    ) -> TypeExpr<'ast> {
        TypeExpr::Function(self.alloc(FunctionTypeExpr {
            id: self.id(),
            params: self.slice(params),
            ret,
            is_variadic,
            span: self.span(),
        }))
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn literal_node(&self, kind: LiteralKind, raw: &str) -> &'ast LiteralExpr<'ast> {
        self.alloc(LiteralExpr {
            id: self.id(),
            kind,
            raw: self.str(raw),
            span: self.span(),
        })
    }

    pub fn literal(&self, kind: LiteralKind, raw: &str) -> Expr<'ast> {
        Expr::Literal(self.literal_node(kind, raw))
    }

    pub fn int(&self, value: i128) -> Expr<'ast> {
        self.number(&value.to_string())
    }

    /// A numeric literal from its source text, e.g. `"0x10"` or `"1.5e3"`.
    pub fn number(&self, raw: &str) -> Expr<'ast> {
        self.literal(LiteralKind::Number, raw)
    }

    pub fn string(&self, value: &str) -> Expr<'ast> {
        self.literal(LiteralKind::String, value)
    }

    pub fn char_lit(&self, value: &str) -> Expr<'ast> {
        self.literal(LiteralKind::Char, value)
    }

    pub fn bool_lit(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value), if value { "true" } else { "false" })
    }

    pub fn null(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Null, "null")
    }

    pub fn nullptr(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Nullptr, "nullptr")
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn ident(&self, name: &str) -> Expr<'ast> {
        Expr::Ident(self.alloc(IdentExpr {
            id: self.id(),
            name: self.str(name),
            span: self.span(),
        }))
    }

    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.alloc(BinaryExpr {
            id: self.id(),
            left,
            op,
            right,
            span: self.span(),
        }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.alloc(UnaryExpr {
            id: self.id(),
            op,
            operand,
            span: self.span(),
        }))
    }

    pub fn call(&self, callee: Expr<'ast>, args: impl IntoIterator<Item = Expr<'ast>>) -> Expr<'ast> {
        self.call_generic(callee, [], args)
    }

    pub fn call_generic(
        &self,
        callee: Expr<'ast>,
        generic_args: impl IntoIterator<Item = TypeExpr<'ast>>,
        args: impl IntoIterator<Item = Expr<'ast>>,
    ) -> Expr<'ast> {
        Expr::Call(self.alloc(CallExpr {
            id: self.id(),
            callee,
            args: self.slice(args),
            generic_args: self.slice(generic_args),
            span: self.span(),
        }))
    }

    /// `name(args)`
    pub fn call_named(&self, name: &str, args: impl IntoIterator<Item = Expr<'ast>>) -> Expr<'ast> {
        let callee = self.ident(name);
        self.call(callee, args)
    }

    pub fn member(&self, object: Expr<'ast>, property: &str) -> Expr<'ast> {
        Expr::Member(self.alloc(MemberExpr {
            id: self.id(),
            object,
            property: self.name(property),
            span: self.span(),
        }))
    }

    /// `object.method(args)`
    pub fn method_call(
        &self,
        object: Expr<'ast>,
        method: &str,
        args: impl IntoIterator<Item = Expr<'ast>>,
    ) -> Expr<'ast> {
        let callee = self.member(object, method);
        self.call(callee, args)
    }

    pub fn index(&self, object: Expr<'ast>, index: Expr<'ast>) -> Expr<'ast> {
        Expr::Index(self.alloc(IndexExpr {
            id: self.id(),
            object,
            index,
            span: self.span(),
        }))
    }

    pub fn array(&self, elements: impl IntoIterator<Item = Expr<'ast>>) -> Expr<'ast> {
        Expr::ArrayLiteral(self.alloc(ArrayLiteralExpr {
            id: self.id(),
            elements: self.slice(elements),
            span: self.span(),
        }))
    }

    fn field_inits<'a>(
        &self,
        fields: impl IntoIterator<Item = (&'a str, Expr<'ast>)>,
    ) -> &'ast [FieldInit<'ast>] {
        let fields: Vec<_> = fields
            .into_iter()
            .map(|(name, value)| FieldInit {
                name: self.name(name),
                value,
            })
            .collect();
        self.slice(fields)
    }

    pub fn struct_lit<'a>(
        &self,
        name: &str,
        generic_args: impl IntoIterator<Item = TypeExpr<'ast>>,
        fields: impl IntoIterator<Item = (&'a str, Expr<'ast>)>,
    ) -> Expr<'ast> {
        Expr::StructLiteral(self.alloc(StructLiteralExpr {
            id: self.id(),
            name: self.name(name),
            generic_args: self.slice(generic_args),
            fields: self.field_inits(fields),
            span: self.span(),
        }))
    }

    pub fn tuple(&self, elements: impl IntoIterator<Item = Expr<'ast>>) -> Expr<'ast> {
        Expr::TupleLiteral(self.alloc(TupleLiteralExpr {
            id: self.id(),
            elements: self.slice(elements),
            span: self.span(),
        }))
    }

    pub fn enum_struct<'a>(
        &self,
        enum_name: &str,
        variant: &str,
        fields: impl IntoIterator<Item = (&'a str, Expr<'ast>)>,
    ) -> Expr<'ast> {
        Expr::EnumStructVariant(self.alloc(EnumStructVariantExpr {
            id: self.id(),
            enum_name: self.name(enum_name),
            variant: self.name(variant),
            fields: self.field_inits(fields),
            span: self.span(),
        }))
    }

    pub fn cast(&self, target: TypeExpr<'ast>, expr: Expr<'ast>) -> Expr<'ast> {
        Expr::Cast(self.alloc(CastExpr {
            id: self.id(),
            target,
            expr,
            span: self.span(),
        }))
    }

    pub fn sizeof_type(&self, ty: TypeExpr<'ast>) -> Expr<'ast> {
        self.sizeof(SizeofTarget::Type(ty))
    }

    pub fn sizeof_expr(&self, expr: Expr<'ast>) -> Expr<'ast> {
        self.sizeof(SizeofTarget::Expr(expr))
    }

    fn sizeof(&self, target: SizeofTarget<'ast>) -> Expr<'ast> {
        Expr::Sizeof(self.alloc(SizeofExpr {
            id: self.id(),
            target,
            span: self.span(),
        }))
    }

    pub fn assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Expr<'ast> {
        self.assign_op(target, AssignOp::Assign, value)
    }

    pub fn assign_op(&self, target: Expr<'ast>, op: AssignOp, value: Expr<'ast>) -> Expr<'ast> {
        Expr::Assign(self.alloc(AssignExpr {
            id: self.id(),
            target,
            op,
            value,
            span: self.span(),
        }))
    }

    pub fn ternary(
        &self,
        condition: Expr<'ast>,
        then_expr: Expr<'ast>,
        else_expr: Expr<'ast>,
    ) -> Expr<'ast> {
        Expr::Ternary(self.alloc(TernaryExpr {
            id: self.id(),
            condition,
            then_expr,
            else_expr,
            span: self.span(),
        }))
    }

    pub fn generic_inst(
        &self,
        base: Expr<'ast>,
        generic_args: impl IntoIterator<Item = TypeExpr<'ast>>,
    ) -> Expr<'ast> {
        Expr::GenericInstantiation(self.alloc(GenericInstantiationExpr {
            id: self.id(),
            base,
            generic_args: self.slice(generic_args),
            span: self.span(),
        }))
    }

    pub fn is_expr(&self, expr: Expr<'ast>, ty: TypeExpr<'ast>) -> Expr<'ast> {
        Expr::Is(self.alloc(IsExpr {
            id: self.id(),
            expr,
            ty,
            span: self.span(),
        }))
    }

    pub fn as_expr(&self, expr: Expr<'ast>, ty: TypeExpr<'ast>) -> Expr<'ast> {
        Expr::As(self.alloc(AsExpr {
            id: self.id(),
            expr,
            ty,
            span: self.span(),
        }))
    }

    // ========================================================================
    // Match
    // ========================================================================

    pub fn match_expr(&self, value: Expr<'ast>, arms: impl IntoIterator<Item = MatchArm<'ast>>) -> Expr<'ast> {
        Expr::Match(self.alloc(MatchExpr {
            id: self.id(),
            value,
            arms: self.slice(arms),
            span: self.span(),
        }))
    }

    pub fn arm(&self, pattern: Pattern<'ast>, guard: Option<Expr<'ast>>, body: Expr<'ast>) -> MatchArm<'ast> {
        MatchArm {
            id: self.id(),
            pattern,
            guard,
            body: ArmBody::Expr(body),
            span: self.span(),
        }
    }

    pub fn arm_block(
        &self,
        pattern: Pattern<'ast>,
        guard: Option<Expr<'ast>>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> MatchArm<'ast> {
        MatchArm {
            id: self.id(),
            pattern,
            guard,
            body: ArmBody::Block(self.block(body)),
            span: self.span(),
        }
    }

    fn pattern(&self, kind: PatternKind<'ast>) -> Pattern<'ast> {
        Pattern {
            id: self.id(),
            kind,
            span: self.span(),
        }
    }

    pub fn pat_wildcard(&self) -> Pattern<'ast> {
        self.pattern(PatternKind::Wildcard)
    }

    pub fn pat_literal(&self, kind: LiteralKind, raw: &str) -> Pattern<'ast> {
        let literal = self.literal_node(kind, raw);
        self.pattern(PatternKind::Literal(literal))
    }

    pub fn pat_binding(&self, name: &str, ty: Option<TypeExpr<'ast>>) -> Pattern<'ast> {
        self.pattern(PatternKind::Binding {
            name: self.name(name),
            ty,
        })
    }

    pub fn pat_enum(&self, enum_name: &str, variant: &str) -> Pattern<'ast> {
        self.pattern(PatternKind::Enum {
            enum_name: self.name(enum_name),
            variant: self.name(variant),
            generic_args: &[],
        })
    }

    pub fn pat_enum_tuple<'a>(
        &self,
        enum_name: &str,
        variant: &str,
        bindings: impl IntoIterator<Item = &'a str>,
    ) -> Pattern<'ast> {
        let bindings: Vec<_> = bindings.into_iter().map(|n| self.name(n)).collect();
        self.pattern(PatternKind::EnumTuple {
            enum_name: self.name(enum_name),
            variant: self.name(variant),
            generic_args: &[],
            bindings: self.slice(bindings),
        })
    }

    pub fn pat_enum_struct<'a>(
        &self,
        enum_name: &str,
        variant: &str,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Pattern<'ast> {
        let fields: Vec<_> = fields
            .into_iter()
            .map(|(field, binding)| FieldBinding {
                field: self.name(field),
                binding: self.name(binding),
            })
            .collect();
        self.pattern(PatternKind::EnumStruct {
            enum_name: self.name(enum_name),
            variant: self.name(variant),
            generic_args: &[],
            fields: self.slice(fields),
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn block(&self, stmts: impl IntoIterator<Item = Stmt<'ast>>) -> &'ast Block<'ast> {
        self.alloc(Block {
            id: self.id(),
            stmts: self.slice(stmts),
            span: self.span(),
        })
    }

    pub fn block_stmt(&self, stmts: impl IntoIterator<Item = Stmt<'ast>>) -> Stmt<'ast> {
        Stmt::Block(self.block(stmts))
    }

    pub fn var_decl(
        &self,
        is_global: bool,
        is_const: bool,
        target: VarTarget<'ast>,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::VarDecl(self.alloc(VarDecl {
            id: self.id(),
            is_global,
            is_const,
            target,
            ty,
            init,
            span: self.span(),
        }))
    }

    /// `local name: ty = init;`
    pub fn local(&self, name: &str, ty: Option<TypeExpr<'ast>>, init: Option<Expr<'ast>>) -> Stmt<'ast> {
        self.var_decl(false, false, VarTarget::Single(self.name(name)), ty, init)
    }

    pub fn const_local(&self, name: &str, ty: Option<TypeExpr<'ast>>, init: Option<Expr<'ast>>) -> Stmt<'ast> {
        self.var_decl(false, true, VarTarget::Single(self.name(name)), ty, init)
    }

    pub fn global(&self, name: &str, ty: Option<TypeExpr<'ast>>, init: Option<Expr<'ast>>) -> Stmt<'ast> {
        self.var_decl(true, false, VarTarget::Single(self.name(name)), ty, init)
    }

    /// `local (a: A, b) = init;`
    pub fn destructure<'a>(
        &self,
        items: impl IntoIterator<Item = (&'a str, Option<TypeExpr<'ast>>)>,
        init: Expr<'ast>,
    ) -> Stmt<'ast> {
        let items: Vec<_> = items
            .into_iter()
            .map(|(name, ty)| DestructureItem {
                id: self.id(),
                name: self.name(name),
                ty,
            })
            .collect();
        let target = VarTarget::Destructure(self.slice(items));
        self.var_decl(false, false, target, None, Some(init))
    }

    pub fn if_stmt(
        &self,
        condition: Expr<'ast>,
        then_branch: impl IntoIterator<Item = Stmt<'ast>>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::If(self.alloc(IfStmt {
            id: self.id(),
            condition,
            then_branch: self.block(then_branch),
            else_branch,
            span: self.span(),
        }))
    }

    pub fn if_else(
        &self,
        condition: Expr<'ast>,
        then_branch: impl IntoIterator<Item = Stmt<'ast>>,
        else_branch: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> Stmt<'ast> {
        let else_block = self.block_stmt(else_branch);
        self.if_stmt(condition, then_branch, Some(else_block))
    }

    pub fn loop_stmt(&self, condition: Option<Expr<'ast>>, body: impl IntoIterator<Item = Stmt<'ast>>) -> Stmt<'ast> {
        Stmt::Loop(self.alloc(LoopStmt {
            id: self.id(),
            condition,
            body: self.block(body),
            span: self.span(),
        }))
    }

    pub fn ret(&self, value: Option<Expr<'ast>>) -> Stmt<'ast> {
        Stmt::Return(self.alloc(ReturnStmt {
            id: self.id(),
            value,
            span: self.span(),
        }))
    }

    pub fn ret_value(&self, value: Expr<'ast>) -> Stmt<'ast> {
        self.ret(Some(value))
    }

    pub fn brk(&self) -> Stmt<'ast> {
        Stmt::Break(self.alloc(BreakStmt {
            id: self.id(),
            span: self.span(),
        }))
    }

    pub fn cont(&self) -> Stmt<'ast> {
        Stmt::Continue(self.alloc(ContinueStmt {
            id: self.id(),
            span: self.span(),
        }))
    }

    pub fn expr_stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(self.alloc(ExprStmt {
            id: self.id(),
            expr,
            span: self.span(),
        }))
    }

    pub fn asm(&self, content: &str) -> Stmt<'ast> {
        Stmt::Asm(self.alloc(AsmStmt {
            id: self.id(),
            content: self.str(content),
            span: self.span(),
        }))
    }

    pub fn catch(
        &self,
        variable: &str,
        ty: TypeExpr<'ast>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> CatchClause<'ast> {
        CatchClause {
            id: self.id(),
            variable: self.name(variable),
            ty,
            body: self.block(body),
            span: self.span(),
        }
    }

    pub fn try_stmt(
        &self,
        body: impl IntoIterator<Item = Stmt<'ast>>,
        catches: impl IntoIterator<Item = CatchClause<'ast>>,
        catch_other: Option<&'ast Block<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Try(self.alloc(TryStmt {
            id: self.id(),
            body: self.block(body),
            catches: self.slice(catches),
            catch_other,
            span: self.span(),
        }))
    }

    pub fn throw(&self, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Throw(self.alloc(ThrowStmt {
            id: self.id(),
            value,
            span: self.span(),
        }))
    }

    pub fn case(&self, value: Expr<'ast>, body: impl IntoIterator<Item = Stmt<'ast>>) -> SwitchCase<'ast> {
        SwitchCase {
            id: self.id(),
            value,
            body: self.block(body),
            span: self.span(),
        }
    }

    pub fn switch(
        &self,
        value: Expr<'ast>,
        cases: impl IntoIterator<Item = SwitchCase<'ast>>,
        default: Option<&'ast Block<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Switch(self.alloc(SwitchStmt {
            id: self.id(),
            value,
            cases: self.slice(cases),
            default,
            span: self.span(),
        }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn param(&self, name: &str, ty: TypeExpr<'ast>) -> Param<'ast> {
        Param {
            id: self.id(),
            name: self.name(name),
            ty,
            is_const: false,
            span: self.span(),
        }
    }

    pub fn generic(&self, name: &str, constraint: Option<TypeExpr<'ast>>) -> GenericParam<'ast> {
        GenericParam {
            name: self.name(name),
            constraint,
        }
    }

    /// A function declaration with every knob exposed.
    pub fn function_decl(
        &self,
        name: &str,
        is_static: bool,
        generic_params: impl IntoIterator<Item = GenericParam<'ast>>,
        params: impl IntoIterator<Item = Param<'ast>>,
        ret: Option<TypeExpr<'ast>>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> &'ast FunctionDecl<'ast> {
        self.alloc(FunctionDecl {
            id: self.id(),
            name: self.name(name),
            is_static,
            generic_params: self.slice(generic_params),
            params: self.slice(params),
            ret,
            body: self.block(body),
            span: self.span(),
        })
    }

    /// A non-generic function as a statement.
    pub fn function(
        &self,
        name: &str,
        params: impl IntoIterator<Item = Param<'ast>>,
        ret: Option<TypeExpr<'ast>>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Function(self.function_decl(name, false, [], params, ret, body))
    }

    pub fn generic_function(
        &self,
        name: &str,
        generic_params: impl IntoIterator<Item = GenericParam<'ast>>,
        params: impl IntoIterator<Item = Param<'ast>>,
        ret: Option<TypeExpr<'ast>>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Function(self.function_decl(name, false, generic_params, params, ret, body))
    }

    pub fn field(&self, name: &str, ty: TypeExpr<'ast>) -> StructMember<'ast> {
        StructMember::Field(self.alloc(FieldDecl {
            id: self.id(),
            name: self.name(name),
            ty,
            span: self.span(),
        }))
    }

    /// An instance method.
    pub fn method(
        &self,
        name: &str,
        params: impl IntoIterator<Item = Param<'ast>>,
        ret: Option<TypeExpr<'ast>>,
        body: impl IntoIterator<Item = Stmt<'ast>>,
    ) -> StructMember<'ast> {
        StructMember::Method(self.function_decl(name, false, [], params, ret, body))
    }

    pub fn member_fn(&self, decl: &'ast FunctionDecl<'ast>) -> StructMember<'ast> {
        StructMember::Method(decl)
    }

    pub fn struct_decl(
        &self,
        name: &str,
        generic_params: impl IntoIterator<Item = GenericParam<'ast>>,
        parents: impl IntoIterator<Item = TypeExpr<'ast>>,
        members: impl IntoIterator<Item = StructMember<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Struct(self.alloc(StructDecl {
            id: self.id(),
            name: self.name(name),
            generic_params: self.slice(generic_params),
            parents: self.slice(parents),
            members: self.slice(members),
            span: self.span(),
        }))
    }

    pub fn spec_method(
        &self,
        name: &str,
        params: impl IntoIterator<Item = Param<'ast>>,
        ret: Option<TypeExpr<'ast>>,
    ) -> SpecMethod<'ast> {
        SpecMethod {
            id: self.id(),
            name: self.name(name),
            generic_params: &[],
            params: self.slice(params),
            ret,
            span: self.span(),
        }
    }

    pub fn spec_decl(
        &self,
        name: &str,
        generic_params: impl IntoIterator<Item = GenericParam<'ast>>,
        parents: impl IntoIterator<Item = TypeExpr<'ast>>,
        methods: impl IntoIterator<Item = SpecMethod<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Spec(self.alloc(SpecDecl {
            id: self.id(),
            name: self.name(name),
            generic_params: self.slice(generic_params),
            parents: self.slice(parents),
            methods: self.slice(methods),
            span: self.span(),
        }))
    }

    pub fn variant(&self, name: &str, data: VariantData<'ast>) -> EnumVariant<'ast> {
        EnumVariant {
            id: self.id(),
            name: self.name(name),
            data,
            span: self.span(),
        }
    }

    pub fn unit_variant(&self, name: &str) -> EnumVariant<'ast> {
        self.variant(name, VariantData::Unit)
    }

    pub fn tuple_variant(&self, name: &str, types: impl IntoIterator<Item = TypeExpr<'ast>>) -> EnumVariant<'ast> {
        let data = VariantData::Tuple(self.slice(types));
        self.variant(name, data)
    }

    pub fn struct_variant<'a>(
        &self,
        name: &str,
        fields: impl IntoIterator<Item = (&'a str, TypeExpr<'ast>)>,
    ) -> EnumVariant<'ast> {
        let fields: Vec<_> = fields
            .into_iter()
            .map(|(field, ty)| VariantField {
                name: self.name(field),
                ty,
            })
            .collect();
        let data = VariantData::Struct(self.slice(fields));
        self.variant(name, data)
    }

    pub fn enum_decl(
        &self,
        name: &str,
        generic_params: impl IntoIterator<Item = GenericParam<'ast>>,
        variants: impl IntoIterator<Item = EnumVariant<'ast>>,
        methods: impl IntoIterator<Item = &'ast FunctionDecl<'ast>>,
    ) -> Stmt<'ast> {
        let methods: Vec<FunctionDecl<'ast>> = methods.into_iter().copied().collect();
        Stmt::Enum(self.alloc(EnumDecl {
            id: self.id(),
            name: self.name(name),
            generic_params: self.slice(generic_params),
            variants: self.slice(variants),
            methods: self.arena.alloc_slice_copy(&methods),
            span: self.span(),
        }))
    }

    pub fn type_alias(
        &self,
        name: &str,
        generic_params: impl IntoIterator<Item = GenericParam<'ast>>,
        ty: TypeExpr<'ast>,
    ) -> Stmt<'ast> {
        Stmt::TypeAlias(self.alloc(TypeAliasDecl {
            id: self.id(),
            name: self.name(name),
            generic_params: self.slice(generic_params),
            ty,
            span: self.span(),
        }))
    }

    pub fn extern_decl(
        &self,
        name: &str,
        params: impl IntoIterator<Item = Param<'ast>>,
        is_variadic: bool,
        ret: Option<TypeExpr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Extern(self.alloc(ExternDecl {
            id: self.id(),
            name: self.name(name),
            params: self.slice(params),
            is_variadic,
            ret,
            span: self.span(),
        }))
    }

    fn import(&self, kind: ImportKind<'ast>, source: &str) -> Stmt<'ast> {
        Stmt::Import(self.alloc(ImportStmt {
            id: self.id(),
            kind,
            source: self.str(source),
            span: self.span(),
        }))
    }

    /// `import a, b as c from "source"`
    pub fn import_items<'a>(
        &self,
        items: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
        source: &str,
    ) -> Stmt<'ast> {
        let items: Vec<_> = items
            .into_iter()
            .map(|(name, alias)| ImportItem {
                name: self.name(name),
                alias: alias.map(|a| self.name(a)),
            })
            .collect();
        let kind = ImportKind::Items(self.slice(items));
        self.import(kind, source)
    }

    pub fn import_all(&self, source: &str) -> Stmt<'ast> {
        self.import(ImportKind::All, source)
    }

    pub fn import_namespace(&self, namespace: &str, source: &str) -> Stmt<'ast> {
        let kind = ImportKind::Namespace(self.name(namespace));
        self.import(kind, source)
    }

    pub fn export<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Stmt<'ast> {
        let names: Vec<_> = names.into_iter().map(|n| self.name(n)).collect();
        Stmt::Export(self.alloc(ExportStmt {
            id: self.id(),
            items: self.slice(names),
            span: self.span(),
        }))
    }

    pub fn program(&self, file: &str, stmts: impl IntoIterator<Item = Stmt<'ast>>) -> &'ast Program<'ast> {
        self.alloc(Program {
            file: self.str(file),
            stmts: self.slice(stmts),
            span: self.span(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_sequential() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let a = b.int(1);
        let c = b.int(2);
        assert_ne!(a.id(), c.id());
        assert_eq!(b.node_count(), 2);
    }

    #[test]
    fn spans_follow_cursor() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        b.at(4, 7);
        let stmt = b.brk();
        assert_eq!(stmt.span(), Span::point(4, 7));
    }

    #[test]
    fn struct_members_split() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let stmt = b.struct_decl(
            "Point",
            [],
            [],
            [
                b.field("x", b.ty("int")),
                b.method("len", [], Some(b.ty("int")), [b.ret_value(b.int(0))]),
                b.field("y", b.ty("int")),
            ],
        );
        let Stmt::Struct(decl) = stmt else {
            panic!("expected struct");
        };
        let fields: Vec<_> = decl.fields().map(|f| f.name.name).collect();
        assert_eq!(fields, vec!["x", "y"]);
        assert_eq!(decl.methods().count(), 1);
    }

    #[test]
    fn import_item_alias() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let stmt = b.import_items([("print", Some("p")), ("exit", None)], "std/io");
        let Stmt::Import(import) = stmt else {
            panic!("expected import");
        };
        let ImportKind::Items(items) = import.kind else {
            panic!("expected items");
        };
        assert_eq!(items[0].local_name(), "p");
        assert_eq!(items[1].local_name(), "exit");
        assert_eq!(import.source, "std/io");
    }
}
