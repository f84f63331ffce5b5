//! Name binder.
//!
//! Resolves identifiers and call sites to their declarations, assigns
//! lexical nesting depths, computes globally unique external names for
//! functions, links `break` to its loop, and flags escaping variables.
//! Consecutive function declarations in a `let` form one mutually
//! recursive block: their headers enter the scope before any body is
//! visited.

use std::collections::{HashMap, HashSet};

use rowan::TextRange;
use vesper_core::Symbol;

use crate::ast::{DeclId, ExprId, ExprKind, FunId, Program, VarId, no_loc};
use crate::diagnostics::Diagnostics;
use crate::primitives::PRIMITIVES;
use crate::{Error, Result};

/// Bind a whole program.
///
/// Wraps the root expression in a synthetic `main` function of declared
/// return type `int` whose body is `(root; 0)`, binds it, and returns it.
/// `main` becomes the root for all later passes.
pub fn bind_program(
    program: &mut Program,
    root: ExprId,
    diagnostics: &mut Diagnostics,
) -> Result<FunId> {
    let mut binder = Binder::new(program, diagnostics);
    binder.install_primitives()?;
    binder.bind_main(root)
}

struct Binder<'a> {
    program: &'a mut Program,
    diagnostics: &'a mut Diagnostics,
    /// Innermost scope last. Lookup walks back to front.
    scopes: Vec<HashMap<Symbol, DeclId>>,
    /// Currently open function declarations, outermost first.
    functions: Vec<FunId>,
    /// Currently open loops, innermost last.
    loops: Vec<ExprId>,
    /// Induction variables of currently open for-loops.
    loop_indexes: Vec<VarId>,
    /// External names assigned so far, for uniqueness.
    external_names: HashSet<Symbol>,
    /// Whether the visit is inside the initializer of a variable
    /// declaration (break is rejected there).
    in_var_init: bool,
}

impl<'a> Binder<'a> {
    fn new(program: &'a mut Program, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            program,
            diagnostics,
            scopes: vec![HashMap::new()],
            functions: Vec::new(),
            loops: Vec::new(),
            loop_indexes: Vec::new(),
            external_names: HashSet::new(),
            in_var_init: false,
        }
    }

    /// Emit a fatal diagnostic and abort the pass.
    fn fatal<T>(&mut self, range: TextRange, msg: impl Into<String>) -> Result<T> {
        self.diagnostics.error(msg, range).emit();
        Err(Error::Bind)
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn decl_name(&self, decl: DeclId) -> Symbol {
        match decl {
            DeclId::Var(v) => self.program.var(v).name,
            DeclId::Fun(f) => self.program.fun(f).name,
        }
    }

    fn decl_span(&self, decl: DeclId) -> TextRange {
        match decl {
            DeclId::Var(v) => self.program.var(v).span,
            DeclId::Fun(f) => self.program.fun(f).span,
        }
    }

    /// Enter a declaration in the current scope. Rejects a name already
    /// defined in the same scope, pointing back at the first definition.
    fn enter(&mut self, decl: DeclId) -> Result<()> {
        let name = self.decl_name(decl);
        let span = self.decl_span(decl);
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if let Some(&previous) = scope.get(&name) {
            let previous_span = self.decl_span(previous);
            let msg = format!("{} is already defined in this scope", self.program.name(name));
            self.diagnostics
                .error(msg, span)
                .related_to("previous declaration was here", previous_span)
                .emit();
            return Err(Error::Bind);
        }
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name, decl);
        Ok(())
    }

    /// Find the declaration for a name, walking the scope stack from the
    /// innermost scope outwards.
    fn find(&mut self, range: TextRange, name: Symbol) -> Result<DeclId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&decl) = scope.get(&name) {
                return Ok(decl);
            }
        }
        let msg = format!("{} cannot be found in this scope", self.program.name(name));
        self.fatal(range, msg)
    }

    /// Depth of the function whose body is currently being visited.
    fn current_depth(&self) -> u32 {
        (self.functions.len() - 1) as u32
    }

    /// Declare all runtime primitives in the top-level scope, each as an
    /// external function with synthetic parameter names `a_0, a_1, ...` and
    /// external name `__` + name.
    fn install_primitives(&mut self) -> Result<()> {
        for primitive in PRIMITIVES {
            let mut params = Vec::new();
            for (i, ty) in primitive.params.iter().enumerate() {
                let param_name = self.program.intern(&format!("a_{i}"));
                let type_name = self.program.intern(ty);
                params.push(self.program.new_var(no_loc(), param_name, None, Some(type_name)));
            }
            let name = self.program.intern(primitive.name);
            let type_name = primitive.ret.map(|t| self.program.intern(t));
            let fun = self
                .program
                .new_fun(no_loc(), name, params, None, type_name, true);
            let external = self.program.intern(&format!("__{}", primitive.name));
            self.program.fun_mut(fun).external_name = Some(external);
            self.enter(DeclId::Fun(fun))?;
        }
        Ok(())
    }

    /// Synthesize and bind the top-level `main`.
    fn bind_main(&mut self, root: ExprId) -> Result<FunId> {
        let zero = self.program.new_expr(no_loc(), ExprKind::Int(0));
        let body = self
            .program
            .new_expr(no_loc(), ExprKind::Seq(vec![root, zero]));
        let name = self.program.intern("main");
        let int_name = self.program.intern("int");
        let main = self
            .program
            .new_fun(no_loc(), name, Vec::new(), Some(body), Some(int_name), true);
        self.bind_fun(main)?;
        Ok(main)
    }

    /// Set a function's parent and compute its unique external name:
    /// dot-joined lexical ancestors, suffixed with `_` until unused.
    fn assign_external_name(&mut self, fun: FunId) {
        let parent = self.functions.last().copied();
        let name = self.program.fun(fun).name;
        let mut external = match parent {
            Some(p) => {
                self.program.fun_mut(fun).parent = Some(p);
                let parent_external = self
                    .program
                    .fun(p)
                    .external_name
                    .expect("parent was bound before its children");
                format!(
                    "{}.{}",
                    self.program.name(parent_external),
                    self.program.name(name)
                )
            }
            None => self.program.name(name).to_string(),
        };
        let mut sym = self.program.intern(&external);
        while self.external_names.contains(&sym) {
            external.push('_');
            sym = self.program.intern(&external);
        }
        self.external_names.insert(sym);
        self.program.fun_mut(fun).external_name = Some(sym);
    }

    fn bind_fun(&mut self, fun: FunId) -> Result<()> {
        self.assign_external_name(fun);
        // A function is recorded at the depth of its lexical parent
        // context; `main` is 0.
        self.program.fun_mut(fun).depth = self.functions.len().saturating_sub(1) as u32;
        self.functions.push(fun);
        // Loops do not cross function boundaries: a break inside a nested
        // function cannot target an enclosing function's loop.
        let saved_loops = std::mem::take(&mut self.loops);

        self.push_scope();
        let params = self.program.fun(fun).params.clone();
        for param in params {
            self.bind_var(param)?;
        }
        if let Some(body) = self.program.fun(fun).body {
            self.bind_expr(body)?;
        }
        self.pop_scope();

        self.loops = saved_loops;
        self.functions.pop();
        Ok(())
    }

    fn bind_var(&mut self, var: VarId) -> Result<()> {
        let is_index = self.loop_indexes.contains(&var);
        let saved = self.in_var_init;
        if !is_index {
            self.in_var_init = true;
        }
        if let Some(init) = self.program.var(var).init {
            self.bind_expr(init)?;
        }
        self.in_var_init = saved;
        self.enter(DeclId::Var(var))?;
        self.program.var_mut(var).depth = self.current_depth();
        Ok(())
    }

    fn bind_expr(&mut self, expr: ExprId) -> Result<()> {
        let span = self.program.expr(expr).span;
        let kind = self.program.expr(expr).kind.clone();
        match kind {
            ExprKind::Int(_) | ExprKind::Str(_) => Ok(()),

            ExprKind::Binary { lhs, rhs, .. } => {
                self.bind_expr(lhs)?;
                self.bind_expr(rhs)
            }

            ExprKind::Seq(items) => {
                for item in items {
                    self.bind_expr(item)?;
                }
                Ok(())
            }

            ExprKind::Let { decls, body } => {
                self.push_scope();
                // Consecutive function declarations form a mutually
                // recursive block: headers first, bodies after.
                let mut block: Vec<FunId> = Vec::new();
                for decl in decls {
                    match decl {
                        DeclId::Fun(f) => {
                            self.enter(DeclId::Fun(f))?;
                            block.push(f);
                        }
                        DeclId::Var(v) => {
                            for f in std::mem::take(&mut block) {
                                self.bind_fun(f)?;
                            }
                            self.bind_var(v)?;
                        }
                    }
                }
                for f in block {
                    self.bind_fun(f)?;
                }
                self.bind_expr(body)?;
                self.pop_scope();
                Ok(())
            }

            ExprKind::Ident { name, decl, .. } => {
                if decl.is_some() {
                    return Ok(());
                }
                match self.find(span, name)? {
                    DeclId::Var(var) => {
                        let depth = self.current_depth();
                        let ExprKind::Ident {
                            decl, depth: use_depth, ..
                        } = &mut self.program.expr_mut(expr).kind
                        else {
                            unreachable!("node kind cannot change during binding");
                        };
                        *decl = Some(var);
                        *use_depth = depth;
                        if depth != self.program.var(var).depth {
                            self.program.var_mut(var).escapes = true;
                        }
                        Ok(())
                    }
                    DeclId::Fun(_) => {
                        self.fatal(span, "invalid reference to function in expression")
                    }
                }
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.bind_expr(cond)?;
                self.bind_expr(then_branch)?;
                self.bind_expr(else_branch)
            }

            ExprKind::Call { name, args, .. } => {
                match self.find(span, name)? {
                    DeclId::Fun(f) => {
                        let depth = self.current_depth();
                        let ExprKind::Call {
                            decl, depth: call_depth, ..
                        } = &mut self.program.expr_mut(expr).kind
                        else {
                            unreachable!("node kind cannot change during binding");
                        };
                        *decl = Some(f);
                        *call_depth = depth;
                    }
                    DeclId::Var(_) => {
                        let msg = format!("{} is not a function", self.program.name(name));
                        return self.fatal(span, msg);
                    }
                }
                for arg in args {
                    self.bind_expr(arg)?;
                }
                Ok(())
            }

            ExprKind::While { cond, body } => {
                self.bind_expr(cond)?;
                self.loops.push(expr);
                self.bind_expr(body)?;
                self.loops.pop();
                Ok(())
            }

            ExprKind::For { var, high, body } => {
                // The induction variable is scoped to the loop.
                self.push_scope();
                self.loop_indexes.push(var);
                self.bind_var(var)?;
                self.bind_expr(high)?;
                self.loops.push(expr);
                self.bind_expr(body)?;
                self.loops.pop();
                self.loop_indexes.pop();
                self.pop_scope();
                Ok(())
            }

            ExprKind::Break { .. } => {
                if self.in_var_init {
                    return self.fatal(span, "breaks are not allowed in variable declarations");
                }
                let Some(&target) = self.loops.last() else {
                    return self.fatal(span, "break outside loop");
                };
                let ExprKind::Break { target: slot } = &mut self.program.expr_mut(expr).kind
                else {
                    unreachable!("node kind cannot change during binding");
                };
                *slot = Some(target);
                Ok(())
            }

            ExprKind::Assign { lhs, rhs } => {
                self.bind_expr(lhs)?;
                let lhs_span = self.program.expr(lhs).span;
                let assigns_loop_index = match &self.program.expr(lhs).kind {
                    ExprKind::Ident {
                        decl: Some(var), ..
                    } => Some(self.loop_indexes.contains(var)),
                    _ => None,
                };
                match assigns_loop_index {
                    Some(true) => {
                        return self.fatal(lhs_span, "loop index is not assignable");
                    }
                    Some(false) => {}
                    None => {
                        return self
                            .fatal(lhs_span, "left-hand side of assignment is not a variable");
                    }
                }
                self.bind_expr(rhs)
            }
        }
    }
}
