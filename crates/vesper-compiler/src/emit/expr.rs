//! Expression lowering.

use vesper_ir::{BinOp as IrBinOp, FuncId, Inst, Pred, Type, Value};

use crate::ast::{BinOp, DeclId, ExprId, ExprKind, Ty, VarId};

use super::IrGen;

impl IrGen<'_> {
    /// Lower one expression at the current insertion point. Returns the
    /// produced value, or `None` for void expressions.
    pub(crate) fn emit_expr(&mut self, expr: ExprId) -> Option<Value> {
        let kind = self.program.expr(expr).kind.clone();
        match kind {
            ExprKind::Int(value) => Some(Value::ConstInt(value)),

            ExprKind::Str(sym) => {
                let text = self.program.name(sym).to_string();
                Some(Value::Global(self.module.intern_string(&text)))
            }

            ExprKind::Binary { op, lhs, rhs } => self.emit_binary(op, lhs, rhs),

            ExprKind::Seq(items) => {
                let mut result = None;
                for item in items {
                    result = self.emit_expr(item);
                }
                result
            }

            ExprKind::Let { decls, body } => {
                for decl in decls {
                    match decl {
                        DeclId::Var(v) => {
                            self.emit_vardecl(v);
                        }
                        DeclId::Fun(f) => {
                            self.declare_fun(f);
                        }
                    }
                }
                self.emit_expr(body)
            }

            ExprKind::Ident { decl, depth, .. } => {
                let var = decl.expect("identifier was bound");
                if self.program.var(var).ty == Ty::Void {
                    return None;
                }
                let ty = self.ir_type(self.program.var(var).ty);
                let addr = self.address_of(depth, var);
                Some(self.emit(Inst::Load { ty, addr }))
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.emit_if(expr, cond, then_branch, else_branch),

            ExprKind::Call {
                decl, depth, args, ..
            } => self.emit_call(decl.expect("call was bound"), depth, args),

            ExprKind::While { cond, body } => self.emit_while(expr, cond, body),

            ExprKind::For { var, high, body } => self.emit_for(expr, var, high, body),

            ExprKind::Break { target } => {
                let target = target.expect("break was bound to a loop");
                let exit = self.loop_exits[&target];
                self.emit(Inst::Br { target: exit });
                // Keep a valid insertion target for syntactically-following
                // (unreachable) code.
                let dead = self.add_block("break_deprecated");
                self.set_block(dead);
                None
            }

            ExprKind::Assign { lhs, rhs } => {
                let value = self.emit_expr(rhs);
                let (var, depth) = match &self.program.expr(lhs).kind {
                    ExprKind::Ident { decl, depth, .. } => {
                        (decl.expect("identifier was bound"), *depth)
                    }
                    _ => unreachable!("assignment target is an identifier"),
                };
                if self.program.var(var).ty != Ty::Void {
                    let addr = self.address_of(depth, var);
                    self.emit(Inst::Store {
                        value: value.expect("non-void right-hand side"),
                        addr,
                    });
                }
                None
            }
        }
    }

    /// Lower a variable declaration in statement position. Void-typed
    /// declarations evaluate their initializer for effect only.
    pub(crate) fn emit_vardecl(&mut self, var: VarId) -> Option<Value> {
        let ty = self.program.var(var).ty;
        let init = self.program.var(var).init;
        if ty == Ty::Void {
            if let Some(init) = init {
                self.emit_expr(init);
            }
            return None;
        }
        let addr = self.generate_vardecl(var);
        if let Some(init) = init {
            let value = self.emit_expr(init).expect("non-void initializer");
            self.emit(Inst::Store { value, addr });
        }
        Some(addr)
    }

    fn emit_binary(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId) -> Option<Value> {
        // Void operands survive checking only under =/<>; the outcome is a
        // constant and neither side is evaluated.
        if self.program.expr(lhs).ty == Ty::Void {
            return Some(Value::ConstInt((op == BinOp::Eq) as i32));
        }

        let operand_ty = self.program.expr(lhs).ty;
        let mut lhs_value = self.emit_expr(lhs).expect("non-void operand");
        let mut rhs_value = self.emit_expr(rhs).expect("non-void operand");

        // String comparisons go through the runtime ordering primitive and
        // compare its result against zero.
        if operand_ty == Ty::String {
            let strcmp = self.runtime_strcmp();
            lhs_value = self.emit(Inst::Call {
                callee: strcmp,
                args: vec![lhs_value, rhs_value],
            });
            rhs_value = Value::ConstInt(0);
        }

        let arith = match op {
            BinOp::Add => Some(IrBinOp::Add),
            BinOp::Sub => Some(IrBinOp::Sub),
            BinOp::Mul => Some(IrBinOp::Mul),
            BinOp::Div => Some(IrBinOp::SDiv),
            _ => None,
        };
        if let Some(op) = arith {
            return Some(self.emit(Inst::Binary {
                op,
                lhs: lhs_value,
                rhs: rhs_value,
            }));
        }

        let pred = match op {
            BinOp::Eq => Pred::Eq,
            BinOp::Ne => Pred::Ne,
            BinOp::Lt => Pred::Slt,
            BinOp::Le => Pred::Sle,
            BinOp::Gt => Pred::Sgt,
            BinOp::Ge => Pred::Sge,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                unreachable!("arithmetic was handled above")
            }
        };
        // Comparisons produce an i1; widen so the language sees an integer.
        let cmp = self.emit(Inst::Icmp {
            pred,
            lhs: lhs_value,
            rhs: rhs_value,
        });
        Some(self.emit(Inst::Zext { value: cmp }))
    }

    fn emit_if(
        &mut self,
        expr: ExprId,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    ) -> Option<Value> {
        let result_ty = self.program.expr(expr).ty;
        let is_void = result_ty == Ty::Void;

        let then_block = self.add_block("if_then");
        let else_block = self.add_block("if_else");
        let end_block = self.add_block("if_end");

        let slot = if is_void {
            None
        } else {
            let ty = self.ir_type(result_ty);
            Some(self.alloca_in_entry(ty, "result"))
        };

        let cond_value = self.emit_expr(cond).expect("condition is an integer");
        let cmp = self.emit(Inst::Icmp {
            pred: Pred::Ne,
            lhs: cond_value,
            rhs: Value::ConstInt(0),
        });
        self.emit(Inst::CondBr {
            cond: cmp,
            then_target: then_block,
            else_target: else_block,
        });

        self.set_block(then_block);
        let then_value = self.emit_expr(then_branch);
        if let Some(slot) = slot {
            self.emit(Inst::Store {
                value: then_value.expect("non-void branch"),
                addr: slot,
            });
        }
        self.emit(Inst::Br { target: end_block });

        self.set_block(else_block);
        let else_value = self.emit_expr(else_branch);
        if let Some(slot) = slot {
            self.emit(Inst::Store {
                value: else_value.expect("non-void branch"),
                addr: slot,
            });
        }
        self.emit(Inst::Br { target: end_block });

        self.set_block(end_block);
        slot.map(|slot| {
            let ty = self.ir_type(result_ty);
            self.emit(Inst::Load { ty, addr: slot })
        })
    }

    fn emit_call(&mut self, fun: crate::ast::FunId, depth: u32, args: Vec<ExprId>) -> Option<Value> {
        let name = {
            let sym = self
                .program
                .fun(fun)
                .external_name
                .expect("external name was assigned during binding");
            self.program.name(sym).to_string()
        };
        // Primitives are declared lazily on first call; user functions were
        // declared when their definition was traversed.
        let callee = match self.module.get_function(&name) {
            Some(id) => id,
            None => self.declare_fun(fun),
        };

        let mut values = Vec::new();
        if !self.program.fun(fun).is_external {
            // The static link is the frame lexically enclosing the callee.
            let levels = depth - self.program.fun(fun).depth;
            let (_, static_link) = self.frame_up(levels);
            values.push(static_link);
        }
        for arg in args {
            values.push(self.emit_expr(arg).expect("non-void argument"));
        }

        let ret = self.program.fun(fun).ty;
        let call = self.emit(Inst::Call {
            callee,
            args: values,
        });
        if ret == Ty::Void { None } else { Some(call) }
    }

    fn emit_while(&mut self, expr: ExprId, cond: ExprId, body: ExprId) -> Option<Value> {
        let test_block = self.add_block("loop_test");
        let body_block = self.add_block("loop_body");
        let end_block = self.add_block("loop_end");
        self.loop_exits.insert(expr, end_block);

        self.emit(Inst::Br { target: test_block });
        self.set_block(test_block);
        let cond_value = self.emit_expr(cond).expect("condition is an integer");
        let cmp = self.emit(Inst::Icmp {
            pred: Pred::Ne,
            lhs: cond_value,
            rhs: Value::ConstInt(0),
        });
        self.emit(Inst::CondBr {
            cond: cmp,
            then_target: body_block,
            else_target: end_block,
        });

        self.set_block(body_block);
        self.emit_expr(body);
        self.emit(Inst::Br { target: test_block });

        self.set_block(end_block);
        None
    }

    fn emit_for(&mut self, expr: ExprId, var: VarId, high: ExprId, body: ExprId) -> Option<Value> {
        let test_block = self.add_block("loop_test");
        let body_block = self.add_block("loop_body");
        let end_block = self.add_block("loop_end");

        // Index storage and initial value, then the bound, evaluated once
        // before the loop.
        let index = self.emit_vardecl(var).expect("loop index is an integer");
        let high_value = self.emit_expr(high).expect("bound is an integer");
        self.loop_exits.insert(expr, end_block);

        self.emit(Inst::Br { target: test_block });
        self.set_block(test_block);
        let current = self.emit(Inst::Load {
            ty: Type::I32,
            addr: index,
        });
        let cmp = self.emit(Inst::Icmp {
            pred: Pred::Sle,
            lhs: current,
            rhs: high_value,
        });
        self.emit(Inst::CondBr {
            cond: cmp,
            then_target: body_block,
            else_target: end_block,
        });

        self.set_block(body_block);
        self.emit_expr(body);
        let current = self.emit(Inst::Load {
            ty: Type::I32,
            addr: index,
        });
        let next = self.emit(Inst::Binary {
            op: IrBinOp::Add,
            lhs: current,
            rhs: Value::ConstInt(1),
        });
        self.emit(Inst::Store {
            value: next,
            addr: index,
        });
        self.emit(Inst::Br { target: test_block });

        self.set_block(end_block);
        None
    }

    /// Get or declare the runtime string-ordering primitive.
    fn runtime_strcmp(&mut self) -> FuncId {
        if let Some(id) = self.module.get_function("__strcmp") {
            return id;
        }
        self.module.declare_function(
            "__strcmp",
            vec![Type::Ptr, Type::Ptr],
            vec!["a_0".to_string(), "a_1".to_string()],
            Type::I32,
            true,
        )
    }
}
