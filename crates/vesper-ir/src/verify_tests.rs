use crate::{BlockId, FuncId, Inst, Module, Type, VerifyError, verify_function, verify_module};

fn empty_module() -> Module {
    Module::new("m")
}

fn define(module: &mut Module, name: &str) -> FuncId {
    module.declare_function(name, vec![], vec![], Type::Void, false)
}

#[test]
fn minimal_function_verifies() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    let func = module.function_mut(id);
    let entry = func.add_block("entry");
    func.push(entry, Inst::Ret { value: None });

    assert_eq!(verify_function(&module, id), Ok(()));
    assert_eq!(verify_module(&module), Ok(()));
}

#[test]
fn external_declaration_passes() {
    let mut module = empty_module();
    let id = module.declare_function(
        "__flush",
        vec![],
        vec![],
        Type::Void,
        true,
    );
    assert_eq!(verify_function(&module, id), Ok(()));
}

#[test]
fn defined_function_without_blocks_fails() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    assert!(matches!(
        verify_function(&module, id),
        Err(VerifyError::NoBlocks { .. })
    ));
}

#[test]
fn empty_block_is_rejected() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    let func = module.function_mut(id);
    let entry = func.add_block("entry");
    let orphan = func.add_block("orphan");
    func.push(entry, Inst::Br { target: orphan });

    let err = verify_function(&module, id).unwrap_err();
    assert!(matches!(err, VerifyError::EmptyBlock { ref block, .. } if block == "orphan"));
}

#[test]
fn block_must_end_with_terminator() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    let func = module.function_mut(id);
    let entry = func.add_block("entry");
    func.push(
        entry,
        Inst::Alloca {
            ty: Type::I32,
            name: "x".to_string(),
        },
    );

    assert!(matches!(
        verify_function(&module, id),
        Err(VerifyError::MissingTerminator { .. })
    ));
}

#[test]
fn terminator_in_the_middle_is_rejected() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    let func = module.function_mut(id);
    let entry = func.add_block("entry");
    func.push(entry, Inst::Ret { value: None });
    func.push(entry, Inst::Ret { value: None });

    assert!(matches!(
        verify_function(&module, id),
        Err(VerifyError::EarlyTerminator { .. })
    ));
}

#[test]
fn branch_target_must_exist() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    let func = module.function_mut(id);
    let entry = func.add_block("entry");
    func.push(
        entry,
        Inst::Br {
            target: BlockId::from_raw(7),
        },
    );

    assert!(matches!(
        verify_function(&module, id),
        Err(VerifyError::BadBranchTarget { .. })
    ));
}

#[test]
fn callee_must_exist() {
    let mut module = empty_module();
    let id = define(&mut module, "f");
    let func = module.function_mut(id);
    let entry = func.add_block("entry");
    func.push(
        entry,
        Inst::Call {
            callee: FuncId::from_raw(9),
            args: vec![],
        },
    );
    func.push(entry, Inst::Ret { value: None });

    assert!(matches!(
        verify_function(&module, id),
        Err(VerifyError::BadCallee { .. })
    ));
}
