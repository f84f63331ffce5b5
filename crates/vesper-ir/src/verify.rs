//! Structural verification of emitted functions.
//!
//! Every defined function must satisfy the block discipline: at least one
//! block, no empty block, exactly one terminator per block and it is the
//! last instruction. Branch targets and callees must be in range.

use crate::ids::FuncId;
use crate::instr::Inst;
use crate::module::Module;

/// A structural defect found in a function body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("function `{func}` is defined but has no blocks")]
    NoBlocks { func: String },

    #[error("block `{block}` in function `{func}` is empty")]
    EmptyBlock { func: String, block: String },

    #[error("block `{block}` in function `{func}` does not end with a terminator")]
    MissingTerminator { func: String, block: String },

    #[error("block `{block}` in function `{func}` has a terminator before its last instruction")]
    EarlyTerminator { func: String, block: String },

    #[error("branch target out of range in function `{func}`")]
    BadBranchTarget { func: String },

    #[error("call to an out-of-range function id in `{func}`")]
    BadCallee { func: String },
}

/// Verify a single function. Declarations without a body trivially pass
/// when external; a bodiless non-external function is an error.
pub fn verify_function(module: &Module, id: FuncId) -> Result<(), VerifyError> {
    let func = module.function(id);
    if func.block_count() == 0 {
        if func.is_external {
            return Ok(());
        }
        return Err(VerifyError::NoBlocks {
            func: func.name.clone(),
        });
    }

    for (_, block) in func.blocks() {
        let Some((&last, rest)) = block.insts.split_last() else {
            return Err(VerifyError::EmptyBlock {
                func: func.name.clone(),
                block: block.name.clone(),
            });
        };

        if !func.inst(last).is_terminator() {
            return Err(VerifyError::MissingTerminator {
                func: func.name.clone(),
                block: block.name.clone(),
            });
        }
        if rest.iter().any(|&i| func.inst(i).is_terminator()) {
            return Err(VerifyError::EarlyTerminator {
                func: func.name.clone(),
                block: block.name.clone(),
            });
        }

        for &inst_id in &block.insts {
            match func.inst(inst_id) {
                Inst::Br { target } => {
                    if target.index() >= func.block_count() {
                        return Err(VerifyError::BadBranchTarget {
                            func: func.name.clone(),
                        });
                    }
                }
                Inst::CondBr {
                    then_target,
                    else_target,
                    ..
                } => {
                    if then_target.index() >= func.block_count()
                        || else_target.index() >= func.block_count()
                    {
                        return Err(VerifyError::BadBranchTarget {
                            func: func.name.clone(),
                        });
                    }
                }
                Inst::Call { callee, .. } => {
                    if callee.index() >= module.function_count() {
                        return Err(VerifyError::BadCallee {
                            func: func.name.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Verify every function in the module.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    for (id, _) in module.functions() {
        verify_function(module, id)?;
    }
    Ok(())
}
