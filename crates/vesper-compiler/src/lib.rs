#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Semantic middle-end for the Vesper language.
//!
//! The input is a parsed AST of a whole program; the output is a typed IR
//! module for backend code generation. Four passes share the AST:
//! - `analyze::bind` - name resolution, nesting depths, escape flags
//! - `analyze::type_check` - types for every expression and declaration
//! - `analyze::escape` - per-function lists of escaping variables
//! - `emit` - IR generation with static-link chains and stack frames
//!
//! # Example
//!
//! ```
//! use vesper_compiler::Compilation;
//! use vesper_compiler::ast::{ExprKind, Program, no_loc};
//!
//! let mut program = Program::new();
//! let root = program.new_expr(no_loc(), ExprKind::Int(42));
//! let compilation = Compilation::run(program, root);
//! assert!(compilation.is_valid());
//! ```

pub mod analyze;
pub mod ast;
pub mod compile;
pub mod diagnostics;
pub mod emit;
pub mod primitives;

#[cfg(test)]
pub mod test_utils;

pub use compile::Compilation;
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};

/// Errors that can abort a compilation.
///
/// Binding and type-checking failures carry no payload; their messages are
/// in the diagnostics sink the pass wrote to. Emission failures come from
/// the IR verifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("name binding failed")]
    Bind,

    #[error("type checking failed")]
    TypeCheck,

    #[error("code generation failed: {0}")]
    Emit(#[from] vesper_ir::VerifyError),
}

/// Result type for compilation passes.
pub type Result<T> = std::result::Result<T, Error>;
