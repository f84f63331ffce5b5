//! Module, function, block, and global storage.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::ids::{BlockId, FuncId, GlobalId, InstId, StructId};
use crate::instr::{Inst, Value};
use crate::types::Type;

/// A named struct type. Frames use one field per stored value; a nested
/// function's frame starts with a pointer to its parent's frame.
#[derive(Clone, Debug)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Type>,
}

/// A global null-terminated string constant.
#[derive(Clone, Debug)]
pub struct GlobalString {
    pub name: String,
    pub value: String,
}

/// A basic block: an ordered run of instructions ending in a terminator.
#[derive(Clone, Debug)]
pub struct Block {
    pub name: String,
    pub insts: Vec<InstId>,
}

/// A function declaration or definition.
///
/// External functions (runtime primitives) have no blocks. Defined functions
/// own an instruction arena; blocks reference instructions by id.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<Type>,
    pub param_names: Vec<String>,
    pub ret: Type,
    pub is_external: bool,
    blocks: Vec<Block>,
    insts: Vec<Inst>,
}

impl Function {
    /// Whether a body has been attached.
    pub fn is_defined(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// Append an empty block and return its id.
    pub fn add_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId::from_raw(self.blocks.len() as u32);
        self.blocks.push(Block {
            name: name.into(),
            insts: Vec::new(),
        });
        id
    }

    /// Append an instruction to the given block and return its result value.
    pub fn push(&mut self, block: BlockId, inst: Inst) -> Value {
        let id = InstId::from_raw(self.insts.len() as u32);
        self.insts.push(inst);
        self.blocks[block.index()].insts.push(id);
        Value::Inst(id)
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (BlockId::from_raw(i as u32), b))
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id.index()]
    }

    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }
}

/// One IR module: the unit handed to a backend.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub name: String,
    structs: Vec<StructDef>,
    globals: Vec<GlobalString>,
    /// Content-addressed view of `globals` for string deduplication.
    interned: IndexMap<String, GlobalId>,
    functions: Vec<Function>,
    by_name: HashMap<String, FuncId>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Register a named struct type.
    pub fn add_struct(&mut self, name: impl Into<String>, fields: Vec<Type>) -> StructId {
        let id = StructId::from_raw(self.structs.len() as u32);
        self.structs.push(StructDef {
            name: name.into(),
            fields,
        });
        id
    }

    pub fn struct_def(&self, id: StructId) -> &StructDef {
        &self.structs[id.index()]
    }

    pub fn structs(&self) -> impl Iterator<Item = (StructId, &StructDef)> {
        self.structs
            .iter()
            .enumerate()
            .map(|(i, s)| (StructId::from_raw(i as u32), s))
    }

    /// Intern a global string constant, deduplicating by content.
    pub fn intern_string(&mut self, value: &str) -> GlobalId {
        if let Some(&id) = self.interned.get(value) {
            return id;
        }
        let id = GlobalId::from_raw(self.globals.len() as u32);
        self.globals.push(GlobalString {
            name: format!("str{}", id.as_u32()),
            value: value.to_owned(),
        });
        self.interned.insert(value.to_owned(), id);
        id
    }

    pub fn global(&self, id: GlobalId) -> &GlobalString {
        &self.globals[id.index()]
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalString)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, g)| (GlobalId::from_raw(i as u32), g))
    }

    /// Declare a function signature. The body, if any, is attached later
    /// through `function_mut`.
    ///
    /// # Panics
    /// Panics if a function of the same name is already declared.
    pub fn declare_function(
        &mut self,
        name: impl Into<String>,
        params: Vec<Type>,
        param_names: Vec<String>,
        ret: Type,
        is_external: bool,
    ) -> FuncId {
        let name = name.into();
        assert!(
            !self.by_name.contains_key(&name),
            "function `{name}` declared twice"
        );
        let id = FuncId::from_raw(self.functions.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.functions.push(Function {
            name,
            params,
            param_names,
            ret,
            is_external,
            blocks: Vec::new(),
            insts: Vec::new(),
        });
        id
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Look up a function by name.
    pub fn get_function(&self, name: &str) -> Option<FuncId> {
        self.by_name.get(name).copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FuncId::from_raw(i as u32), f))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Render the module as deterministic text.
    pub fn dump(&self) -> String {
        crate::dump::dump(self)
    }
}
