//! Deterministic textual rendering of a module.
//!
//! The format is stable so tests can assert against it: struct types first,
//! then globals, then functions in declaration order. Instruction results
//! print as `%<inst-id>`, named allocas as `%<name>.<inst-id>`, and block
//! labels as `<name>.<block-id>`.

use std::fmt::Write as _;

use crate::ids::InstId;
use crate::instr::{Inst, Value};
use crate::module::{Function, Module};
use crate::types::Type;

/// Render a whole module.
pub fn dump(module: &Module) -> String {
    let mut out = String::new();
    writeln!(out, "; module {}", module.name).unwrap();

    let mut any = false;
    for (_, def) in module.structs() {
        any = true;
        let fields = def
            .fields
            .iter()
            .map(|&f| type_str(module, f))
            .collect::<Vec<_>>()
            .join(", ");
        if fields.is_empty() {
            writeln!(out, "%{} = type {{}}", def.name).unwrap();
        } else {
            writeln!(out, "%{} = type {{ {} }}", def.name, fields).unwrap();
        }
    }
    if any {
        out.push('\n');
    }

    any = false;
    for (_, global) in module.globals() {
        any = true;
        writeln!(
            out,
            "@{} = constant c\"{}\\00\"",
            global.name,
            escape_bytes(global.value.as_bytes())
        )
        .unwrap();
    }
    if any {
        out.push('\n');
    }

    let mut first = true;
    for (_, func) in module.functions() {
        if !first {
            out.push('\n');
        }
        first = false;
        dump_function(&mut out, module, func);
    }

    out
}

fn dump_function(out: &mut String, module: &Module, func: &Function) {
    if !func.is_defined() {
        let params = func
            .params
            .iter()
            .map(|&p| type_str(module, p))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "declare {} @{}({})",
            type_str(module, func.ret),
            func.name,
            params
        )
        .unwrap();
        return;
    }

    let params = func
        .params
        .iter()
        .zip(&func.param_names)
        .map(|(&p, name)| format!("{} %{}", type_str(module, p), name))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(
        out,
        "define {} @{}({}) {{",
        type_str(module, func.ret),
        func.name,
        params
    )
    .unwrap();

    for (block_id, block) in func.blocks() {
        writeln!(out, "{}.{}:", block.name, block_id.as_u32()).unwrap();
        for &inst_id in &block.insts {
            writeln!(out, "  {}", inst_str(module, func, inst_id)).unwrap();
        }
    }

    out.push_str("}\n");
}

fn inst_str(module: &Module, func: &Function, id: InstId) -> String {
    let result = value_str(module, func, Value::Inst(id));
    match func.inst(id) {
        Inst::Alloca { ty, .. } => format!("{result} = alloca {}", type_str(module, *ty)),
        Inst::Load { ty, addr } => format!(
            "{result} = load {}, {}",
            type_str(module, *ty),
            value_str(module, func, *addr)
        ),
        Inst::Store { value, addr } => format!(
            "store {}, {}",
            value_str(module, func, *value),
            value_str(module, func, *addr)
        ),
        Inst::FieldAddr {
            base,
            struct_ty,
            index,
        } => format!(
            "{result} = fieldaddr %{}, {}, {}",
            module.struct_def(*struct_ty).name,
            value_str(module, func, *base),
            index
        ),
        Inst::Binary { op, lhs, rhs } => format!(
            "{result} = {} {}, {}",
            op.mnemonic(),
            value_str(module, func, *lhs),
            value_str(module, func, *rhs)
        ),
        Inst::Icmp { pred, lhs, rhs } => format!(
            "{result} = icmp {} {}, {}",
            pred.mnemonic(),
            value_str(module, func, *lhs),
            value_str(module, func, *rhs)
        ),
        Inst::Zext { value } => format!("{result} = zext {}", value_str(module, func, *value)),
        Inst::Call { callee, args } => {
            let callee = module.function(*callee);
            let args = args
                .iter()
                .map(|&a| value_str(module, func, a))
                .collect::<Vec<_>>()
                .join(", ");
            if callee.ret.is_void() {
                format!("call void @{}({})", callee.name, args)
            } else {
                format!(
                    "{result} = call {} @{}({})",
                    type_str(module, callee.ret),
                    callee.name,
                    args
                )
            }
        }
        Inst::Br { target } => {
            let block = func.block(*target);
            format!("br label %{}.{}", block.name, target.as_u32())
        }
        Inst::CondBr {
            cond,
            then_target,
            else_target,
        } => {
            let t = func.block(*then_target);
            let e = func.block(*else_target);
            format!(
                "br {}, label %{}.{}, label %{}.{}",
                value_str(module, func, *cond),
                t.name,
                then_target.as_u32(),
                e.name,
                else_target.as_u32()
            )
        }
        Inst::Ret { value: None } => "ret void".to_string(),
        Inst::Ret { value: Some(v) } => format!("ret {}", value_str(module, func, *v)),
    }
}

fn value_str(module: &Module, func: &Function, value: Value) -> String {
    match value {
        Value::ConstInt(n) => n.to_string(),
        Value::Global(g) => format!("@{}", module.global(g).name),
        Value::Arg(i) => format!("%{}", func.param_names[i as usize]),
        Value::Inst(id) => match func.inst(id) {
            Inst::Alloca { name, .. } if !name.is_empty() => {
                format!("%{}.{}", name, id.as_u32())
            }
            _ => format!("%{}", id.as_u32()),
        },
    }
}

fn type_str(module: &Module, ty: Type) -> String {
    match ty {
        Type::I1 => "i1".to_string(),
        Type::I32 => "i32".to_string(),
        Type::Ptr => "ptr".to_string(),
        Type::Void => "void".to_string(),
        Type::Struct(id) => format!("%{}", module.struct_def(id).name),
    }
}

/// Escape string bytes for a `c"..."` constant. Printable ASCII except `"`
/// and `\` passes through; everything else becomes `\XX`.
fn escape_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..=0x7e).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            write!(out, "\\{b:02X}").unwrap();
        }
    }
    out
}
