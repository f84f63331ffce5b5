//! Helpers for constructing programs in tests without a parser.

use rowan::TextRange;

use crate::ast::{BinOp, DeclId, ExprId, ExprKind, FunId, Program, VarId, no_loc};
use crate::compile::Compilation;

/// Incremental AST construction with synthetic locations.
pub struct AstBuilder {
    pub program: Program,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            program: Program::new(),
        }
    }

    fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.program.new_expr(no_loc(), kind)
    }

    pub fn expr_at(&mut self, span: TextRange, kind: ExprKind) -> ExprId {
        self.program.new_expr(span, kind)
    }

    pub fn int(&mut self, value: i32) -> ExprId {
        self.expr(ExprKind::Int(value))
    }

    pub fn str_lit(&mut self, text: &str) -> ExprId {
        let sym = self.program.intern(text);
        self.expr(ExprKind::Str(sym))
    }

    pub fn binop(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, lhs, rhs })
    }

    pub fn seq(&mut self, items: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Seq(items))
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.program.intern(name);
        self.expr(ExprKind::Ident {
            name,
            decl: None,
            depth: 0,
        })
    }

    pub fn assign(&mut self, name: &str, rhs: ExprId) -> ExprId {
        let lhs = self.ident(name);
        self.expr(ExprKind::Assign { lhs, rhs })
    }

    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> ExprId {
        self.expr(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn call(&mut self, name: &str, args: Vec<ExprId>) -> ExprId {
        let name = self.program.intern(name);
        self.expr(ExprKind::Call {
            name,
            decl: None,
            depth: 0,
            args,
        })
    }

    pub fn while_(&mut self, cond: ExprId, body: ExprId) -> ExprId {
        self.expr(ExprKind::While { cond, body })
    }

    pub fn brk(&mut self) -> ExprId {
        self.expr(ExprKind::Break { target: None })
    }

    /// `for <name> := <lo> to <high> do <body>`
    pub fn for_(&mut self, name: &str, lo: ExprId, high: ExprId, body: ExprId) -> ExprId {
        let var = self.var(name, None, Some(lo));
        self.expr(ExprKind::For { var, high, body })
    }

    /// A `let` whose body is the given expression sequence.
    pub fn let_(&mut self, decls: Vec<DeclId>, body: Vec<ExprId>) -> ExprId {
        let body = self.seq(body);
        self.expr(ExprKind::Let { decls, body })
    }

    pub fn var(&mut self, name: &str, type_name: Option<&str>, init: Option<ExprId>) -> VarId {
        let name = self.program.intern(name);
        let type_name = type_name.map(|t| self.program.intern(t));
        self.program.new_var(no_loc(), name, init, type_name)
    }

    pub fn var_at(
        &mut self,
        span: TextRange,
        name: &str,
        type_name: Option<&str>,
        init: Option<ExprId>,
    ) -> VarId {
        let name = self.program.intern(name);
        let type_name = type_name.map(|t| self.program.intern(t));
        self.program.new_var(span, name, init, type_name)
    }

    /// A user function with `(name, type)` parameter pairs.
    pub fn fun(
        &mut self,
        name: &str,
        params: &[(&str, &str)],
        ret: Option<&str>,
        body: ExprId,
    ) -> FunId {
        let params = params
            .iter()
            .map(|&(p, t)| self.var(p, Some(t), None))
            .collect();
        let name = self.program.intern(name);
        let type_name = ret.map(|t| self.program.intern(t));
        self.program
            .new_fun(no_loc(), name, params, Some(body), type_name, false)
    }

    /// Run the whole pipeline over `root`.
    pub fn compile(self, root: ExprId) -> Compilation {
        Compilation::run(self.program, root)
    }
}
