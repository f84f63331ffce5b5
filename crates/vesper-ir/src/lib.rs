#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Typed intermediate representation for the Vesper compiler.
//!
//! A module holds struct types (frame layouts), deduplicated global string
//! constants, and functions. Functions are either external declarations or
//! definitions made of basic blocks over an instruction arena. The
//! representation is deliberately small: three-address instructions, opaque
//! pointers, and explicit struct field addressing for frame access.
//!
//! - `module` - module, function, block, and global storage
//! - `instr` - values and instructions
//! - `types` - the IR type set
//! - `verify` - structural checks (terminator discipline, reference ranges)
//! - `dump` - deterministic textual rendering

mod dump;
mod ids;
mod instr;
mod module;
mod types;
mod verify;

#[cfg(test)]
mod verify_tests;

pub use dump::dump;
pub use ids::{BlockId, FuncId, GlobalId, InstId, StructId};
pub use instr::{BinOp, Inst, Pred, Value};
pub use module::{Block, Function, GlobalString, Module, StructDef};
pub use types::Type;
pub use verify::{VerifyError, verify_function, verify_module};
