//! Index newtypes for the IR arenas.

macro_rules! ir_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub fn as_u32(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

ir_id! {
    /// A function in a module (declaration or definition).
    FuncId
}

ir_id! {
    /// A basic block within a function.
    BlockId
}

ir_id! {
    /// An instruction within a function's arena.
    InstId
}

ir_id! {
    /// A global string constant.
    GlobalId
}

ir_id! {
    /// A named struct type (frame layout).
    StructId
}
