//! Runtime primitive signatures.
//!
//! The binder pre-declares these in the top-level scope before visiting
//! user code. The IR generator references them lazily by external name
//! (`__` + surface name) on first call. Their behavior lives in the runtime
//! library; the compiler only knows names and signatures.

/// Signature of one runtime primitive. Type names are surface names
/// (`"int"` / `"string"`); a `None` return type means void.
pub struct Primitive {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub ret: Option<&'static str>,
}

/// The primitives available to every program.
pub const PRIMITIVES: &[Primitive] = &[
    Primitive {
        name: "print_err",
        params: &["string"],
        ret: None,
    },
    Primitive {
        name: "print",
        params: &["string"],
        ret: None,
    },
    Primitive {
        name: "print_int",
        params: &["int"],
        ret: None,
    },
    Primitive {
        name: "flush",
        params: &[],
        ret: None,
    },
    Primitive {
        name: "getchar",
        params: &[],
        ret: Some("string"),
    },
    Primitive {
        name: "ord",
        params: &["string"],
        ret: Some("int"),
    },
    Primitive {
        name: "chr",
        params: &["int"],
        ret: Some("string"),
    },
    Primitive {
        name: "size",
        params: &["string"],
        ret: Some("int"),
    },
    Primitive {
        name: "substring",
        params: &["string", "int", "int"],
        ret: Some("string"),
    },
    Primitive {
        name: "concat",
        params: &["string", "string"],
        ret: Some("string"),
    },
    Primitive {
        name: "strcmp",
        params: &["string", "string"],
        ret: Some("int"),
    },
    Primitive {
        name: "streq",
        params: &["string", "string"],
        ret: Some("int"),
    },
    Primitive {
        name: "not",
        params: &["int"],
        ret: Some("int"),
    },
    Primitive {
        name: "exit",
        params: &["int"],
        ret: None,
    },
];
