//! Type checker.
//!
//! Assigns a type to every expression and declaration, rejecting ill-typed
//! programs. Runs after the binder; every use already points at its
//! declaration.
//!
//! A function whose type is already set is skipped, which lets a call force
//! its callee to be checked ahead of order inside a mutually recursive
//! block. The return type is recorded before the body is visited, so the
//! recursion bottoms out.

use rowan::TextRange;
use vesper_core::Symbol;

use crate::ast::{DeclId, ExprId, ExprKind, FunId, Program, Ty, VarId};
use crate::diagnostics::Diagnostics;
use crate::{Error, Result};

/// Type-check a bound program starting from its synthetic `main`.
///
/// Re-running on an already-checked tree is a no-op.
pub fn type_check(
    program: &mut Program,
    main: FunId,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let mut checker = TypeChecker {
        program,
        diagnostics,
    };
    checker.check_fun(main)
}

struct TypeChecker<'a> {
    program: &'a mut Program,
    diagnostics: &'a mut Diagnostics,
}

impl TypeChecker<'_> {
    fn fatal<T>(&mut self, range: TextRange, msg: impl Into<String>) -> Result<T> {
        self.diagnostics.error(msg, range).emit();
        Err(Error::TypeCheck)
    }

    /// Resolve a surface type name. Only `int` and `string` exist.
    fn resolve_type_name(&mut self, range: TextRange, name: Symbol) -> Result<Ty> {
        match self.program.name(name) {
            "int" => Ok(Ty::Int),
            "string" => Ok(Ty::String),
            other => {
                let msg = format!("unknown type {other}");
                self.fatal(range, msg)
            }
        }
    }

    fn check_fun(&mut self, fun: FunId) -> Result<()> {
        if self.program.fun(fun).ty != Ty::Undef {
            return Ok(());
        }

        let span = self.program.fun(fun).span;
        // Record the return type first so recursive calls see it.
        let ret = match self.program.fun(fun).type_name {
            Some(name) => self.resolve_type_name(span, name)?,
            None => Ty::Void,
        };
        self.program.fun_mut(fun).ty = ret;

        let params = self.program.fun(fun).params.clone();
        for param in params {
            self.check_var(param)?;
        }

        let Some(body) = self.program.fun(fun).body else {
            return Ok(());
        };
        self.check_expr(body)?;
        let body_ty = self.program.expr(body).ty;
        let name = self.program.fun(fun).name;
        if self.program.fun(fun).type_name.is_some() {
            if body_ty != ret {
                let msg = format!(
                    "body of {} does not match its declared return type",
                    self.program.name(name)
                );
                return self.fatal(span, msg);
            }
        } else if body_ty != Ty::Void {
            let msg = format!(
                "body of procedure {} must not produce a value",
                self.program.name(name)
            );
            return self.fatal(span, msg);
        }
        Ok(())
    }

    fn check_var(&mut self, var: VarId) -> Result<()> {
        let span = self.program.var(var).span;
        let init = self.program.var(var).init;
        if let Some(init) = init {
            self.check_expr(init)?;
        }

        let annotated = match self.program.var(var).type_name {
            Some(name) => Some(self.resolve_type_name(span, name)?),
            None => None,
        };
        let name = self.program.var(var).name;
        let ty = match (annotated, init) {
            (Some(annotated), Some(init)) => {
                if self.program.expr(init).ty != annotated {
                    let msg = format!(
                        "declared type of {} does not match its initializer",
                        self.program.name(name)
                    );
                    return self.fatal(span, msg);
                }
                annotated
            }
            (Some(annotated), None) => annotated,
            (None, Some(init)) => {
                let init_ty = self.program.expr(init).ty;
                if init_ty == Ty::Void {
                    let msg = format!(
                        "cannot infer the type of {} from a void initializer",
                        self.program.name(name)
                    );
                    return self.fatal(span, msg);
                }
                init_ty
            }
            (None, None) => {
                let msg = format!(
                    "{} has neither a type annotation nor an initializer",
                    self.program.name(name)
                );
                return self.fatal(span, msg);
            }
        };
        self.program.var_mut(var).ty = ty;
        Ok(())
    }

    fn check_expr(&mut self, expr: ExprId) -> Result<()> {
        let span = self.program.expr(expr).span;
        let kind = self.program.expr(expr).kind.clone();
        let ty = match kind {
            ExprKind::Int(_) => Ty::Int,
            ExprKind::Str(_) => Ty::String,

            ExprKind::Binary { op, lhs, rhs } => {
                self.check_expr(lhs)?;
                self.check_expr(rhs)?;
                let lhs_ty = self.program.expr(lhs).ty;
                let rhs_ty = self.program.expr(rhs).ty;
                if lhs_ty != rhs_ty {
                    return self
                        .fatal(span, "binary operator applied to operands of different types");
                }
                if op.is_arithmetic() && lhs_ty != Ty::Int {
                    return self.fatal(span, "arithmetic operator requires integer operands");
                }
                if op.is_ordering() && lhs_ty == Ty::Void {
                    return self
                        .fatal(span, "comparison operator cannot be applied to void expressions");
                }
                Ty::Int
            }

            ExprKind::Seq(items) => {
                let mut ty = Ty::Void;
                for item in items {
                    self.check_expr(item)?;
                    ty = self.program.expr(item).ty;
                }
                ty
            }

            ExprKind::Let { decls, body } => {
                for decl in decls {
                    match decl {
                        DeclId::Var(v) => self.check_var(v)?,
                        DeclId::Fun(f) => self.check_fun(f)?,
                    }
                }
                self.check_expr(body)?;
                self.program.expr(body).ty
            }

            ExprKind::Ident { decl, .. } => {
                let var = decl.expect("identifier was bound before type checking");
                self.program.var(var).ty
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_expr(cond)?;
                if self.program.expr(cond).ty != Ty::Int {
                    return self.fatal(span, "condition of if must be an integer");
                }
                self.check_expr(then_branch)?;
                self.check_expr(else_branch)?;
                let then_ty = self.program.expr(then_branch).ty;
                if then_ty != self.program.expr(else_branch).ty {
                    return self.fatal(span, "if branches have mismatched types");
                }
                then_ty
            }

            ExprKind::Call {
                name, decl, args, ..
            } => {
                let fun = decl.expect("call was bound before type checking");
                // Forward reference inside a recursive block: check the
                // callee now.
                if self.program.fun(fun).ty == Ty::Undef {
                    self.check_fun(fun)?;
                }
                let params = self.program.fun(fun).params.clone();
                if args.len() != params.len() {
                    let msg =
                        format!("wrong number of arguments in call to {}", self.program.name(name));
                    return self.fatal(span, msg);
                }
                for (arg, param) in args.iter().zip(params) {
                    self.check_expr(*arg)?;
                    if self.program.expr(*arg).ty != self.program.var(param).ty {
                        let arg_span = self.program.expr(*arg).span;
                        let msg = format!(
                            "argument type mismatch in call to {}",
                            self.program.name(name)
                        );
                        return self.fatal(arg_span, msg);
                    }
                }
                self.program.fun(fun).ty
            }

            ExprKind::While { cond, body } => {
                self.check_expr(cond)?;
                if self.program.expr(cond).ty != Ty::Int {
                    return self.fatal(span, "while condition must be an integer");
                }
                self.check_expr(body)?;
                if self.program.expr(body).ty != Ty::Void {
                    return self.fatal(span, "body of a loop must not produce a value");
                }
                Ty::Void
            }

            ExprKind::For { var, high, body } => {
                self.check_var(var)?;
                if self.program.var(var).ty != Ty::Int {
                    let var_span = self.program.var(var).span;
                    return self.fatal(var_span, "for loop bounds must be integers");
                }
                self.check_expr(high)?;
                if self.program.expr(high).ty != Ty::Int {
                    let high_span = self.program.expr(high).span;
                    return self.fatal(high_span, "for loop bounds must be integers");
                }
                self.check_expr(body)?;
                if self.program.expr(body).ty != Ty::Void {
                    return self.fatal(span, "body of a loop must not produce a value");
                }
                Ty::Void
            }

            ExprKind::Break { .. } => Ty::Void,

            ExprKind::Assign { lhs, rhs } => {
                self.check_expr(lhs)?;
                self.check_expr(rhs)?;
                if self.program.expr(lhs).ty != self.program.expr(rhs).ty {
                    return self.fatal(span, "assignment between incompatible types");
                }
                Ty::Void
            }
        };
        self.program.expr_mut(expr).ty = ty;
        Ok(())
    }
}
