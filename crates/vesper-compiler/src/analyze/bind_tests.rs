use crate::Error;
use crate::analyze::bind::bind_program;
use crate::ast::{BinOp, DeclId, ExprId, ExprKind, FunId};
use crate::diagnostics::Diagnostics;
use crate::test_utils::AstBuilder;

fn bind(builder: &mut AstBuilder, root: ExprId) -> (Result<FunId, Error>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let result = bind_program(&mut builder.program, root, &mut diagnostics);
    (result, diagnostics)
}

fn has_message(diagnostics: &Diagnostics, text: &str) -> bool {
    diagnostics.iter().any(|d| d.message() == text)
}

#[test]
fn resolves_identifier_and_depths() {
    let mut b = AstBuilder::new();
    let init = b.int(3);
    let x = b.var("x", Some("int"), Some(init));
    let use_x = b.ident("x");
    let four = b.int(4);
    let sum = b.binop(BinOp::Add, use_x, four);
    let root = b.let_(vec![DeclId::Var(x)], vec![sum]);

    let (result, diagnostics) = bind(&mut b, root);
    let main = result.unwrap();
    assert!(diagnostics.is_empty());

    let main_decl = b.program.fun(main);
    assert_eq!(b.program.name(main_decl.external_name.unwrap()), "main");
    assert_eq!(main_decl.depth, 0);
    assert!(main_decl.parent.is_none());

    match &b.program.expr(use_x).kind {
        ExprKind::Ident { decl, depth, .. } => {
            assert_eq!(*decl, Some(x));
            assert_eq!(*depth, 0);
        }
        other => panic!("expected identifier, got {other:?}"),
    }
    assert_eq!(b.program.var(x).depth, 0);
    assert!(!b.program.var(x).escapes);
}

#[test]
fn use_from_nested_function_marks_escape() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let x = b.var("x", None, Some(zero));
    let use_x = b.ident("x");
    let f = b.fun("f", &[], Some("int"), use_x);
    let call = b.call("f", vec![]);
    let root = b.let_(vec![DeclId::Var(x), DeclId::Fun(f)], vec![call]);

    let (result, _) = bind(&mut b, root);
    let main = result.unwrap();

    assert!(b.program.var(x).escapes);
    assert_eq!(b.program.fun(f).depth, 0);
    assert_eq!(b.program.fun(f).parent, Some(main));
    assert_eq!(
        b.program.name(b.program.fun(f).external_name.unwrap()),
        "main.f"
    );
    match &b.program.expr(use_x).kind {
        ExprKind::Ident { depth, .. } => assert_eq!(*depth, 1),
        other => panic!("expected identifier, got {other:?}"),
    }
}

#[test]
fn duplicate_function_in_same_scope_is_rejected() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let two = b.int(2);
    let f1 = b.fun("f", &[], Some("int"), one);
    let f2 = b.fun("f", &[], Some("int"), two);
    let call = b.call("f", vec![]);
    let root = b.let_(vec![DeclId::Fun(f1), DeclId::Fun(f2)], vec![call]);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "f is already defined in this scope"));
    let first = diagnostics.iter().next().unwrap();
    assert_eq!(first.related().len(), 1);
}

#[test]
fn unknown_name_is_rejected() {
    let mut b = AstBuilder::new();
    let root = b.ident("y");
    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "y cannot be found in this scope"));
}

#[test]
fn function_used_as_value_is_rejected() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let f = b.fun("f", &[], Some("int"), one);
    let use_f = b.ident("f");
    let root = b.let_(vec![DeclId::Fun(f)], vec![use_f]);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(
        &diagnostics,
        "invalid reference to function in expression"
    ));
}

#[test]
fn call_to_variable_is_rejected() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let x = b.var("x", None, Some(zero));
    let call = b.call("x", vec![]);
    let root = b.let_(vec![DeclId::Var(x)], vec![call]);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "x is not a function"));
}

#[test]
fn break_outside_loop_is_rejected() {
    let mut b = AstBuilder::new();
    let root = b.brk();
    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "break outside loop"));
}

#[test]
fn break_in_variable_initializer_is_rejected() {
    let mut b = AstBuilder::new();
    let init = b.brk();
    let x = b.var("x", Some("int"), Some(init));
    let zero = b.int(0);
    let root = b.let_(vec![DeclId::Var(x)], vec![zero]);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(
        &diagnostics,
        "breaks are not allowed in variable declarations"
    ));
}

#[test]
fn break_in_initializer_is_rejected_even_inside_a_loop() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let brk = b.brk();
    let init = b.while_(one, brk);
    let x = b.var("x", None, Some(init));
    let zero = b.int(0);
    let root = b.let_(vec![DeclId::Var(x)], vec![zero]);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(
        &diagnostics,
        "breaks are not allowed in variable declarations"
    ));
}

#[test]
fn break_cannot_target_a_loop_of_an_enclosing_function() {
    let mut b = AstBuilder::new();
    let brk = b.brk();
    let f = b.fun("f", &[], None, brk);
    let call = b.call("f", vec![]);
    let inner = b.let_(vec![DeclId::Fun(f)], vec![call]);
    let one = b.int(1);
    let root = b.while_(one, inner);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "break outside loop"));
}

#[test]
fn break_binds_to_innermost_loop() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let brk = b.brk();
    let inner_cond = b.int(1);
    let inner = b.while_(inner_cond, brk);
    let outer = b.while_(one, inner);

    let (result, _) = bind(&mut b, outer);
    result.unwrap();
    match &b.program.expr(brk).kind {
        ExprKind::Break { target } => assert_eq!(*target, Some(inner)),
        other => panic!("expected break, got {other:?}"),
    }
}

#[test]
fn loop_index_is_not_assignable() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let i_outer = b.var("i", None, Some(zero));
    let lo = b.int(0);
    let hi = b.int(10);
    let use_i = b.ident("i");
    let one = b.int(1);
    let sum = b.binop(BinOp::Add, use_i, one);
    let body = b.assign("i", sum);
    let for_loop = b.for_("i", lo, hi, body);
    let root = b.let_(vec![DeclId::Var(i_outer)], vec![for_loop]);

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "loop index is not assignable"));
}

#[test]
fn ordinary_assignment_binds() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let i = b.var("i", None, Some(zero));
    let one = b.int(1);
    let assign = b.assign("i", one);
    let root = b.let_(vec![DeclId::Var(i)], vec![assign]);

    let (result, diagnostics) = bind(&mut b, root);
    result.unwrap();
    assert!(diagnostics.is_empty());
}

#[test]
fn consecutive_functions_see_each_other() {
    let mut b = AstBuilder::new();
    let call_g = b.call("g", vec![]);
    let f = b.fun("f", &[], Some("int"), call_g);
    let zero = b.int(0);
    let g = b.fun("g", &[], Some("int"), zero);
    let call_f = b.call("f", vec![]);
    let root = b.let_(vec![DeclId::Fun(f), DeclId::Fun(g)], vec![call_f]);

    let (result, _) = bind(&mut b, root);
    result.unwrap();
    match &b.program.expr(call_g).kind {
        ExprKind::Call { decl, .. } => assert_eq!(*decl, Some(g)),
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn variable_declaration_terminates_function_block() {
    let mut b = AstBuilder::new();
    let call_g = b.call("g", vec![]);
    let f = b.fun("f", &[], Some("int"), call_g);
    let zero = b.int(0);
    let v = b.var("v", None, Some(zero));
    let one = b.int(1);
    let g = b.fun("g", &[], Some("int"), one);
    let call_f = b.call("f", vec![]);
    let root = b.let_(
        vec![DeclId::Fun(f), DeclId::Var(v), DeclId::Fun(g)],
        vec![call_f],
    );

    let (result, diagnostics) = bind(&mut b, root);
    assert_eq!(result.unwrap_err(), Error::Bind);
    assert!(has_message(&diagnostics, "g cannot be found in this scope"));
}

#[test]
fn external_names_are_disambiguated() {
    let mut b = AstBuilder::new();
    let two = b.int(2);
    let f_inner = b.fun("f", &[], Some("int"), two);
    let inner_call = b.call("f", vec![]);
    let inner = b.let_(vec![DeclId::Fun(f_inner)], vec![inner_call]);
    let one = b.int(1);
    let f_outer = b.fun("f", &[], Some("int"), one);
    let root = b.let_(vec![DeclId::Fun(f_outer)], vec![inner]);

    let (result, _) = bind(&mut b, root);
    result.unwrap();
    assert_eq!(
        b.program.name(b.program.fun(f_outer).external_name.unwrap()),
        "main.f"
    );
    assert_eq!(
        b.program.name(b.program.fun(f_inner).external_name.unwrap()),
        "main.f_"
    );
}

#[test]
fn primitives_are_pre_declared() {
    let mut b = AstBuilder::new();
    let msg = b.str_lit("hi");
    let root = b.call("print", vec![msg]);

    let (result, _) = bind(&mut b, root);
    result.unwrap();
    match &b.program.expr(root).kind {
        ExprKind::Call { decl, .. } => {
            let print = decl.unwrap();
            assert!(b.program.fun(print).is_external);
            assert!(b.program.fun(print).body.is_none());
            assert_eq!(
                b.program.name(b.program.fun(print).external_name.unwrap()),
                "__print"
            );
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn nested_function_depths() {
    let mut b = AstBuilder::new();
    let zero = b.int(0);
    let g = b.fun("g", &[], Some("int"), zero);
    let call_g = b.call("g", vec![]);
    let f_body = b.let_(vec![DeclId::Fun(g)], vec![call_g]);
    let f = b.fun("f", &[], Some("int"), f_body);
    let call_f = b.call("f", vec![]);
    let root = b.let_(vec![DeclId::Fun(f)], vec![call_f]);

    let (result, _) = bind(&mut b, root);
    result.unwrap();
    assert_eq!(b.program.fun(f).depth, 0);
    assert_eq!(b.program.fun(g).depth, 1);
    assert_eq!(b.program.fun(g).parent, Some(f));
    assert_eq!(
        b.program.name(b.program.fun(g).external_name.unwrap()),
        "main.f.g"
    );
}
