//! Values and instructions.

use crate::ids::{BlockId, FuncId, GlobalId, InstId, StructId};
use crate::types::Type;

/// An SSA-ish value reference.
///
/// Instruction results are referenced by instruction id; arguments by their
/// position in the enclosing function's parameter list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Value {
    /// 32-bit integer constant.
    ConstInt(i32),
    /// Address of a global string constant.
    Global(GlobalId),
    /// Function argument, by position.
    Arg(u32),
    /// Result of an instruction.
    Inst(InstId),
}

/// Integer arithmetic opcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
}

impl BinOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
        }
    }
}

/// Signed integer comparison predicate. Produces an `i1`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pred {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl Pred {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Pred::Eq => "eq",
            Pred::Ne => "ne",
            Pred::Slt => "slt",
            Pred::Sle => "sle",
            Pred::Sgt => "sgt",
            Pred::Sge => "sge",
        }
    }
}

/// A three-address instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Inst {
    /// Reserve a stack slot of the given type. Yields its address.
    Alloca { ty: Type, name: String },
    /// Load a value of the given type from an address.
    Load { ty: Type, addr: Value },
    /// Store a value to an address.
    Store { value: Value, addr: Value },
    /// Address of field `index` of a struct of type `struct_ty` located at
    /// `base`. Yields a pointer.
    FieldAddr {
        base: Value,
        struct_ty: StructId,
        index: u32,
    },
    /// Integer arithmetic. Yields an `i32`.
    Binary { op: BinOp, lhs: Value, rhs: Value },
    /// Signed integer comparison. Yields an `i1`.
    Icmp { pred: Pred, lhs: Value, rhs: Value },
    /// Zero-extend an `i1` to `i32`.
    Zext { value: Value },
    /// Call a function. Yields a value of the callee's return type, or
    /// nothing for void callees.
    Call { callee: FuncId, args: Vec<Value> },
    /// Unconditional branch.
    Br { target: BlockId },
    /// Two-way branch on an `i1` condition.
    CondBr {
        cond: Value,
        then_target: BlockId,
        else_target: BlockId,
    },
    /// Return from the function.
    Ret { value: Option<Value> },
}

impl Inst {
    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Inst::Br { .. } | Inst::CondBr { .. } | Inst::Ret { .. })
    }
}
