#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared data structures for the Vesper compiler.
//!
//! Currently this is the string interner. Every name that flows through the
//! compiler (identifiers, type names, external function names) is interned
//! once and handled as a cheap `Symbol` afterwards.

mod interner;

#[cfg(test)]
mod interner_tests;

pub use interner::{Interner, Symbol};
