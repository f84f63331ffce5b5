//! IR generation.
//!
//! Emits one IR function per user function. Nested functions reach
//! non-local variables through static links: every non-external function's
//! frame struct starts with a pointer to its lexical parent's frame,
//! followed by one slot per escaping variable. Non-escaping locals live in
//! ordinary stack slots in the entry block.
//!
//! Visiting a function declaration only declares its signature and queues
//! the body; queued bodies are drained LIFO after the enclosing traversal,
//! so a frame layout is always complete before any nested function that
//! reads through it is emitted.

mod expr;


use std::collections::HashMap;

use vesper_ir::{BlockId, FuncId, Inst, Module, StructId, Type, Value, verify_function};

use crate::Result;
use crate::ast::{ExprId, FunId, Program, Ty, VarId};

/// Generate the IR module for a bound, typed, escape-analyzed program.
pub fn generate_program(program: &Program, main: FunId) -> Result<Module> {
    let mut irgen = IrGen::new(program);
    irgen.declare_fun(main);
    while let Some(fun) = irgen.pending.pop() {
        irgen.generate_function(fun)?;
    }
    Ok(irgen.module)
}

pub(crate) struct IrGen<'a> {
    program: &'a Program,
    pub(crate) module: Module,
    /// IR function currently being emitted.
    cur_func: Option<FuncId>,
    /// Its AST declaration.
    cur_fun_decl: Option<FunId>,
    /// Block receiving stack allocations.
    entry_block: Option<BlockId>,
    /// Current insertion point.
    cur_block: Option<BlockId>,
    /// Address of the current function's frame struct.
    frame: Option<Value>,
    /// Storage address of each variable of the current function.
    allocations: HashMap<VarId, Value>,
    /// Exit block of each open loop, for `break`.
    loop_exits: HashMap<ExprId, BlockId>,
    /// Frame struct of every generated function. Process-wide.
    frame_types: HashMap<FunId, StructId>,
    /// Frame field index of every escaping variable. Process-wide.
    frame_positions: HashMap<VarId, u32>,
    /// Declared functions whose bodies are still to be emitted.
    pending: Vec<FunId>,
}

impl<'a> IrGen<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            module: Module::new("vesper"),
            cur_func: None,
            cur_fun_decl: None,
            entry_block: None,
            cur_block: None,
            frame: None,
            allocations: HashMap::new(),
            loop_exits: HashMap::new(),
            frame_types: HashMap::new(),
            frame_positions: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub(crate) fn ir_type(&self, ty: Ty) -> Type {
        match ty {
            Ty::Int => Type::I32,
            Ty::String => Type::Ptr,
            Ty::Void => Type::Void,
            Ty::Undef => unreachable!("unresolved type after checking"),
        }
    }

    fn external_name(&self, fun: FunId) -> String {
        let sym = self
            .program
            .fun(fun)
            .external_name
            .expect("external name was assigned during binding");
        self.program.name(sym).to_string()
    }

    fn func_mut(&mut self) -> &mut vesper_ir::Function {
        let id = self.cur_func.expect("inside a function");
        self.module.function_mut(id)
    }

    /// Append an instruction at the insertion point.
    pub(crate) fn emit(&mut self, inst: Inst) -> Value {
        let block = self.cur_block.expect("insertion point is set");
        self.func_mut().push(block, inst)
    }

    pub(crate) fn add_block(&mut self, name: &str) -> BlockId {
        self.func_mut().add_block(name)
    }

    pub(crate) fn set_block(&mut self, block: BlockId) {
        self.cur_block = Some(block);
    }

    /// Allocate a stack slot in the entry block, regardless of the current
    /// insertion point.
    pub(crate) fn alloca_in_entry(&mut self, ty: Type, name: &str) -> Value {
        let entry = self.entry_block.expect("entry block exists");
        self.func_mut().push(
            entry,
            Inst::Alloca {
                ty,
                name: name.to_string(),
            },
        )
    }

    /// Declare a function's IR signature and queue its body for emission.
    /// Non-external functions take the static link as a leading argument.
    pub(crate) fn declare_fun(&mut self, fun: FunId) -> FuncId {
        let decl = self.program.fun(fun);
        let mut params = Vec::new();
        let mut param_names = Vec::new();
        if !decl.is_external {
            params.push(Type::Ptr);
            param_names.push("sl".to_string());
        }
        for &param in &decl.params {
            params.push(self.ir_type(self.program.var(param).ty));
            param_names.push(self.program.name(self.program.var(param).name).to_string());
        }
        let ret = self.ir_type(decl.ty);
        let is_external = decl.is_external;
        let has_body = decl.body.is_some();
        let name = self.external_name(fun);

        let id = self
            .module
            .declare_function(name, params, param_names, ret, is_external);
        if has_body {
            self.pending.push(fun);
        }
        id
    }

    /// Emit one function body.
    fn generate_function(&mut self, fun: FunId) -> Result<()> {
        self.allocations.clear();
        self.loop_exits.clear();

        let name = self.external_name(fun);
        let ir_id = self
            .module
            .get_function(&name)
            .expect("function was declared before generation");
        self.cur_func = Some(ir_id);
        self.cur_fun_decl = Some(fun);

        let entry = self.add_block("entry");
        self.entry_block = Some(entry);
        self.generate_frame(fun);
        let body_block = self.add_block("body");
        self.set_block(body_block);

        let params = self.program.fun(fun).params.clone();
        let is_external = self.program.fun(fun).is_external;
        let body = self.program.fun(fun).body;
        let ret_ty = self.program.fun(fun).ty;

        // The leading argument of a non-external function is the incoming
        // static link; store it into frame slot 0.
        let mut arg_index = 0u32;
        if !is_external {
            let struct_ty = self.frame_types[&fun];
            let slot = self.emit(Inst::FieldAddr {
                base: self.frame.expect("frame was just built"),
                struct_ty,
                index: 0,
            });
            self.emit(Inst::Store {
                value: Value::Arg(0),
                addr: slot,
            });
            arg_index = 1;
        }
        for &param in &params {
            let addr = self.generate_vardecl(param);
            self.emit(Inst::Store {
                value: Value::Arg(arg_index),
                addr,
            });
            arg_index += 1;
        }

        let result = match body {
            Some(body) => self.emit_expr(body),
            None => None,
        };
        if ret_ty == Ty::Void {
            self.emit(Inst::Ret { value: None });
        } else {
            self.emit(Inst::Ret {
                value: Some(result.expect("non-void body produces a value")),
            });
        }

        // Jump from the allocation block into the body.
        self.set_block(entry);
        self.emit(Inst::Br { target: body_block });

        verify_function(&self.module, ir_id)?;
        Ok(())
    }

    /// Build the current function's frame struct and stack-allocate it in
    /// the entry block. Field 0 is the parent frame pointer when the
    /// function is nested; void-typed escaping variables get no slot.
    fn generate_frame(&mut self, fun: FunId) {
        let has_parent = self.program.fun(fun).parent.is_some();
        let escaping = self.program.fun(fun).escaping.clone();

        let mut fields = Vec::new();
        if has_parent {
            fields.push(Type::Ptr);
        }
        for var in escaping {
            let ty = self.program.var(var).ty;
            if ty != Ty::Void {
                fields.push(self.ir_type(ty));
            }
        }

        let name = format!("ft_{}", self.external_name(fun));
        let struct_ty = self.module.add_struct(name, fields);
        self.frame_types.insert(fun, struct_ty);
        self.frame = Some(self.alloca_in_entry(Type::Struct(struct_ty), "frame"));
    }

    /// Create storage for a variable of the current function: a frame slot
    /// for escaping variables, a stack slot otherwise. Returns its address.
    pub(crate) fn generate_vardecl(&mut self, var: VarId) -> Value {
        if self.program.var(var).escapes {
            let fun = self.cur_fun_decl.expect("inside a function");
            let mut pos = u32::from(self.program.fun(fun).parent.is_some());
            for &other in &self.program.fun(fun).escaping {
                if other == var {
                    break;
                }
                if self.program.var(other).ty != Ty::Void {
                    pos += 1;
                }
            }
            self.frame_positions.insert(var, pos);

            let struct_ty = self.frame_types[&fun];
            let addr = self.emit(Inst::FieldAddr {
                base: self.frame.expect("frame was built on entry"),
                struct_ty,
                index: pos,
            });
            self.allocations.insert(var, addr);
            addr
        } else {
            let ty = self.ir_type(self.program.var(var).ty);
            let name = self.program.name(self.program.var(var).name).to_string();
            let addr = self.alloca_in_entry(ty, &name);
            self.allocations.insert(var, addr);
            addr
        }
    }

    /// Walk `levels` static links up from the current frame. Returns the
    /// reached frame's struct type and address.
    pub(crate) fn frame_up(&mut self, levels: u32) -> (StructId, Value) {
        let mut fun = self.cur_fun_decl.expect("inside a function");
        let mut frame = self.frame.expect("frame was built on entry");
        for _ in 0..levels {
            let struct_ty = self.frame_types[&fun];
            let slot = self.emit(Inst::FieldAddr {
                base: frame,
                struct_ty,
                index: 0,
            });
            frame = self.emit(Inst::Load {
                ty: Type::Ptr,
                addr: slot,
            });
            fun = self
                .program
                .fun(fun)
                .parent
                .expect("static link chain stops at main");
        }
        (self.frame_types[&fun], frame)
    }

    /// Address of a variable as seen from a use at `use_depth`. Same-depth
    /// uses hit the local allocation; deeper uses walk the static-link
    /// chain and index into the owning frame.
    pub(crate) fn address_of(&mut self, use_depth: u32, var: VarId) -> Value {
        let var_depth = self.program.var(var).depth;
        if use_depth == var_depth {
            self.allocations[&var]
        } else {
            let (struct_ty, frame) = self.frame_up(use_depth - var_depth);
            self.emit(Inst::FieldAddr {
                base: frame,
                struct_ty,
                index: self.frame_positions[&var],
            })
        }
    }
}
