//! AST arena and node kinds.
//!
//! The whole program lives in one `Program` arena: expressions, variable
//! declarations, and function declarations each in their own table, indexed
//! by small id newtypes. Passes decorate nodes in place (back-references,
//! depths, escape flags, types); back-references between nodes are ids, so
//! no ownership cycles arise.

use rowan::TextRange;
use vesper_core::{Interner, Symbol};

#[cfg(test)]
mod ast_tests;

/// Sentinel location for synthetic nodes introduced by the compiler.
pub fn no_loc() -> TextRange {
    TextRange::empty(0.into())
}

macro_rules! ast_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

ast_id! {
    /// An expression node in the arena.
    ExprId
}

ast_id! {
    /// A variable declaration (including function parameters and loop
    /// indices).
    VarId
}

ast_id! {
    /// A function declaration (including the runtime primitives and the
    /// synthetic `main`).
    FunId
}

/// A declaration as it appears in a `let`, in source order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeclId {
    Var(VarId),
    Fun(FunId),
}

/// Semantic type of an expression or declaration.
///
/// `Undef` is the state before type checking; the checker replaces it on
/// every node it reaches.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Ty {
    Int,
    String,
    Void,
    Undef,
}

impl std::fmt::Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Ty::Int => "int",
            Ty::String => "string",
            Ty::Void => "void",
            Ty::Undef => "undef",
        };
        f.write_str(name)
    }
}

/// Binary operator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// `+ - * /`: integer operands only.
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div)
    }

    /// `< <= > >=`: integer or string operands.
    pub fn is_ordering(self) -> bool {
        matches!(self, BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge)
    }

    /// `= <>`: operands of any one type.
    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::Ne)
    }
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "=",
            BinOp::Ne => "<>",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        };
        f.write_str(text)
    }
}

/// An expression node. `ty` starts as `Ty::Undef` and is filled in by the
/// type checker.
#[derive(Clone, Debug)]
pub struct Expr {
    pub span: TextRange,
    pub ty: Ty,
    pub kind: ExprKind,
}

/// Expression kinds. Fields named `decl`, `depth`, and `target` are
/// decorations written by the binder.
#[derive(Clone, Debug)]
pub enum ExprKind {
    Int(i32),
    Str(Symbol),
    Binary {
        op: BinOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Seq(Vec<ExprId>),
    Let {
        decls: Vec<DeclId>,
        body: ExprId,
    },
    Ident {
        name: Symbol,
        decl: Option<VarId>,
        depth: u32,
    },
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    Call {
        name: Symbol,
        decl: Option<FunId>,
        depth: u32,
        args: Vec<ExprId>,
    },
    While {
        cond: ExprId,
        body: ExprId,
    },
    For {
        var: VarId,
        high: ExprId,
        body: ExprId,
    },
    Break {
        /// The enclosing loop (`While` or `For` node), set by the binder.
        target: Option<ExprId>,
    },
    Assign {
        /// Must be an `Ident` node.
        lhs: ExprId,
        rhs: ExprId,
    },
}

/// A variable declaration: `var x := e`, `var x : t := e`, a function
/// parameter, or a for-loop index.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub span: TextRange,
    pub name: Symbol,
    pub init: Option<ExprId>,
    pub type_name: Option<Symbol>,
    /// Depth of the enclosing function. Set by the binder.
    pub depth: u32,
    /// Whether a deeper-nested function accesses this variable. Set by the
    /// binder; forces the variable into its function's frame.
    pub escapes: bool,
    pub ty: Ty,
}

/// A function declaration. External functions (runtime primitives, and the
/// synthetic `main` which takes no static link) have `is_external` set;
/// primitives additionally have no body.
#[derive(Clone, Debug)]
pub struct FunDecl {
    pub span: TextRange,
    pub name: Symbol,
    pub params: Vec<VarId>,
    pub body: Option<ExprId>,
    pub type_name: Option<Symbol>,
    pub is_external: bool,
    /// Depth of the lexical parent context (`main` is 0). Set by the binder.
    pub depth: u32,
    /// Lexically enclosing function. Set by the binder.
    pub parent: Option<FunId>,
    /// Globally unique linker name, dot-joined along the nesting chain. Set
    /// by the binder.
    pub external_name: Option<Symbol>,
    /// Escaping variables owned by this function, in declaration order.
    /// Filled by the escaper.
    pub escaping: Vec<VarId>,
    pub ty: Ty,
}

/// The AST arena for one program, together with its symbol interner.
#[derive(Debug, Default)]
pub struct Program {
    interner: Interner,
    exprs: Vec<Expr>,
    vars: Vec<VarDecl>,
    funs: Vec<FunDecl>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name.
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    /// Resolve a symbol back to its text.
    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Add an expression node. Its type starts as `Ty::Undef`.
    pub fn new_expr(&mut self, span: TextRange, kind: ExprKind) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.push(Expr {
            span,
            ty: Ty::Undef,
            kind,
        });
        id
    }

    /// Add a variable declaration.
    pub fn new_var(
        &mut self,
        span: TextRange,
        name: Symbol,
        init: Option<ExprId>,
        type_name: Option<Symbol>,
    ) -> VarId {
        let id = VarId::from_raw(self.vars.len() as u32);
        self.vars.push(VarDecl {
            span,
            name,
            init,
            type_name,
            depth: 0,
            escapes: false,
            ty: Ty::Undef,
        });
        id
    }

    /// Add a function declaration.
    pub fn new_fun(
        &mut self,
        span: TextRange,
        name: Symbol,
        params: Vec<VarId>,
        body: Option<ExprId>,
        type_name: Option<Symbol>,
        is_external: bool,
    ) -> FunId {
        let id = FunId::from_raw(self.funs.len() as u32);
        self.funs.push(FunDecl {
            span,
            name,
            params,
            body,
            type_name,
            is_external,
            depth: 0,
            parent: None,
            external_name: None,
            escaping: Vec::new(),
            ty: Ty::Undef,
        });
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.index()]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VarDecl {
        &mut self.vars[id.index()]
    }

    pub fn fun(&self, id: FunId) -> &FunDecl {
        &self.funs[id.index()]
    }

    pub fn fun_mut(&mut self, id: FunId) -> &mut FunDecl {
        &mut self.funs[id.index()]
    }

    pub fn exprs(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(i, e)| (ExprId::from_raw(i as u32), e))
    }

    pub fn funs(&self) -> impl Iterator<Item = (FunId, &FunDecl)> {
        self.funs
            .iter()
            .enumerate()
            .map(|(i, f)| (FunId::from_raw(i as u32), f))
    }

    pub fn vars(&self) -> impl Iterator<Item = (VarId, &VarDecl)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, v)| (VarId::from_raw(i as u32), v))
    }
}
