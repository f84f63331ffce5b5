//! Escape collection.
//!
//! Walks the bound and typed AST and appends every variable the binder
//! flagged as escaping to its owning function's `escaping` list, in
//! declaration order. The IR generator later lays these out as frame
//! fields.

use crate::ast::{DeclId, ExprId, ExprKind, FunId, Program, VarId};

/// Populate `FunDecl::escaping` for every function reachable from `main`.
pub fn collect_escapes(program: &mut Program, main: FunId) {
    let mut escaper = Escaper {
        program,
        current: main,
    };
    escaper.visit_fun(main);
}

struct Escaper<'a> {
    program: &'a mut Program,
    current: FunId,
}

impl Escaper<'_> {
    fn visit_fun(&mut self, fun: FunId) {
        let saved = self.current;
        self.current = fun;
        let params = self.program.fun(fun).params.clone();
        for param in params {
            self.visit_var(param);
        }
        if let Some(body) = self.program.fun(fun).body {
            self.visit_expr(body);
        }
        self.current = saved;
    }

    fn visit_var(&mut self, var: VarId) {
        if self.program.var(var).escapes {
            let owner = self.current;
            self.program.fun_mut(owner).escaping.push(var);
        }
        if let Some(init) = self.program.var(var).init {
            self.visit_expr(init);
        }
    }

    fn visit_expr(&mut self, expr: ExprId) {
        let kind = self.program.expr(expr).kind.clone();
        match kind {
            ExprKind::Int(_)
            | ExprKind::Str(_)
            | ExprKind::Ident { .. }
            | ExprKind::Break { .. } => {}

            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }

            ExprKind::Seq(items) => {
                for item in items {
                    self.visit_expr(item);
                }
            }

            ExprKind::Let { decls, body } => {
                for decl in decls {
                    match decl {
                        DeclId::Var(v) => self.visit_var(v),
                        DeclId::Fun(f) => self.visit_fun(f),
                    }
                }
                self.visit_expr(body);
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(cond);
                self.visit_expr(then_branch);
                self.visit_expr(else_branch);
            }

            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.visit_expr(arg);
                }
            }

            ExprKind::While { cond, body } => {
                self.visit_expr(cond);
                self.visit_expr(body);
            }

            ExprKind::For { var, high, body } => {
                self.visit_var(var);
                self.visit_expr(high);
                self.visit_expr(body);
            }

            ExprKind::Assign { lhs, rhs } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
        }
    }
}
