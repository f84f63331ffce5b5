use super::interner::Interner;

#[test]
fn intern_deduplicates() {
    let mut interner = Interner::new();
    let a = interner.intern("main");
    let b = interner.intern("main");
    assert_eq!(a, b);
    assert_eq!(interner.len(), 1);
}

#[test]
fn intern_distinct_names() {
    let mut interner = Interner::new();
    let a = interner.intern("x");
    let b = interner.intern("y");
    assert_ne!(a, b);
    assert_eq!(interner.resolve(a), "x");
    assert_eq!(interner.resolve(b), "y");
}

#[test]
fn symbols_order_by_insertion() {
    let mut interner = Interner::new();
    let first = interner.intern("b");
    let second = interner.intern("a");
    assert!(first < second);
}

#[test]
fn try_resolve_out_of_range() {
    let interner = Interner::new();
    assert!(interner.try_resolve(super::Symbol::from_raw(0)).is_none());
    assert!(interner.is_empty());
}

#[test]
fn iter_yields_insertion_order() {
    let mut interner = Interner::new();
    interner.intern("one");
    interner.intern("two");
    let names: Vec<&str> = interner.iter().map(|(_, s)| s).collect();
    assert_eq!(names, vec!["one", "two"]);
}
