use super::{BinOp, ExprKind, Program, Ty, no_loc};

#[test]
fn new_expr_starts_undefined() {
    let mut program = Program::new();
    let id = program.new_expr(no_loc(), ExprKind::Int(3));
    assert_eq!(program.expr(id).ty, Ty::Undef);
    assert!(matches!(program.expr(id).kind, ExprKind::Int(3)));
}

#[test]
fn new_var_starts_undecorated() {
    let mut program = Program::new();
    let name = program.intern("x");
    let var = program.new_var(no_loc(), name, None, None);
    let decl = program.var(var);
    assert_eq!(decl.ty, Ty::Undef);
    assert_eq!(decl.depth, 0);
    assert!(!decl.escapes);
}

#[test]
fn new_fun_starts_undecorated() {
    let mut program = Program::new();
    let name = program.intern("f");
    let fun = program.new_fun(no_loc(), name, vec![], None, None, true);
    let decl = program.fun(fun);
    assert!(decl.is_external);
    assert!(decl.parent.is_none());
    assert!(decl.external_name.is_none());
    assert!(decl.escaping.is_empty());
}

#[test]
fn interning_round_trips() {
    let mut program = Program::new();
    let a = program.intern("concat");
    let b = program.intern("concat");
    assert_eq!(a, b);
    assert_eq!(program.name(a), "concat");
}

#[test]
fn ty_display() {
    assert_eq!(Ty::Int.to_string(), "int");
    assert_eq!(Ty::String.to_string(), "string");
    assert_eq!(Ty::Void.to_string(), "void");
}

#[test]
fn binop_classification() {
    assert!(BinOp::Add.is_arithmetic());
    assert!(!BinOp::Add.is_ordering());
    assert!(BinOp::Le.is_ordering());
    assert!(BinOp::Eq.is_equality());
    assert!(!BinOp::Eq.is_arithmetic());
    assert_eq!(BinOp::Ne.to_string(), "<>");
}

#[test]
fn no_loc_is_empty() {
    assert!(no_loc().is_empty());
}
