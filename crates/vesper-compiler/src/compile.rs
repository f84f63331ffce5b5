//! End-to-end compilation facade.

use vesper_ir::Module;

use crate::Error;
use crate::analyze;
use crate::ast::{ExprId, FunId, Program};
use crate::diagnostics::Diagnostics;
use crate::emit;

/// Result of running the full middle-end over one program.
///
/// Holds the (now decorated) AST, the diagnostics sink, the synthetic
/// `main`, and the emitted module. The phases run in order and stop at the
/// first failure; `error` records which phase failed.
pub struct Compilation {
    pub program: Program,
    pub diagnostics: Diagnostics,
    pub main: Option<FunId>,
    pub module: Option<Module>,
    pub error: Option<Error>,
}

impl Compilation {
    /// Bind, type-check, escape-analyze, and emit the program rooted at
    /// `root`.
    pub fn run(mut program: Program, root: ExprId) -> Self {
        let mut diagnostics = Diagnostics::new();
        let main = match analyze::analyze(&mut program, root, &mut diagnostics) {
            Ok(main) => main,
            Err(error) => {
                return Self {
                    program,
                    diagnostics,
                    main: None,
                    module: None,
                    error: Some(error),
                };
            }
        };

        match emit::generate_program(&program, main) {
            Ok(module) => Self {
                program,
                diagnostics,
                main: Some(main),
                module: Some(module),
                error: None,
            },
            Err(error) => Self {
                program,
                diagnostics,
                main: Some(main),
                module: None,
                error: Some(error),
            },
        }
    }

    /// Whether every phase succeeded.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Render collected diagnostics against the source text.
    pub fn render_errors(&self, source: &str) -> String {
        self.diagnostics.printer().source(source).render()
    }
}
