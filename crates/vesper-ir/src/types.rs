//! The IR type set.

use crate::ids::StructId;

/// Type of an IR value or storage slot.
///
/// Pointers are opaque; field access goes through `Inst::FieldAddr`, which
/// names the struct type explicitly.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Type {
    /// Single-bit comparison result.
    I1,
    /// 32-bit signed integer.
    I32,
    /// Opaque pointer.
    Ptr,
    /// Absence of a value. Only valid as a function return type.
    Void,
    /// A named struct type, registered in the module. Only valid as an
    /// allocation type.
    Struct(StructId),
}

impl Type {
    #[inline]
    pub fn is_void(self) -> bool {
        matches!(self, Type::Void)
    }
}
