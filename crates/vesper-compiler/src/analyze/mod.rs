//! Semantic analysis: binding, type checking, and escape collection.
//!
//! The three passes run in order over the shared AST; each one decorates
//! nodes the later ones read. A failing pass aborts the pipeline.

pub mod bind;
pub mod escape;
pub mod type_check;

#[cfg(test)]
mod bind_tests;

use crate::Result;
use crate::ast::{ExprId, FunId, Program};
use crate::diagnostics::Diagnostics;

/// Run the analysis passes over a program rooted at `root`.
///
/// Returns the synthetic `main` wrapping the root expression. On success the
/// AST is fully decorated: every use points at its declaration, every node
/// is typed, and every function knows its escaping variables.
pub fn analyze(program: &mut Program, root: ExprId, diagnostics: &mut Diagnostics) -> Result<FunId> {
    let main = bind::bind_program(program, root, diagnostics)?;
    type_check::type_check(program, main, diagnostics)?;
    escape::collect_escapes(program, main);
    Ok(main)
}
