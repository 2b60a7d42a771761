//! Opaque engine handles.
//!
//! Handles carry identity only. Each type has a distinguished `NIL` value
//! matching the engine's own nil sentinel.

use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident($repr:ty), nil = $nil:expr, prefix = $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub $repr);

        impl $name {
            /// The nil handle.
            pub const NIL: Self = Self($nil);

            /// Wraps a raw native value.
            #[must_use]
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            /// Returns the raw native value.
            #[must_use]
            pub const fn value(self) -> $repr {
                self.0
            }

            /// Returns true if this is the nil handle.
            #[must_use]
            pub const fn is_nil(self) -> bool {
                self.0 == $nil
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NIL
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_nil() {
                    write!(f, concat!($prefix, ":nil"))
                } else {
                    write!(f, concat!($prefix, ":0x{:x}"), self.0)
                }
            }
        }
    };
}

handle!(
    /// An engine instance (`JET_INSTANCE`).
    InstanceHandle(usize),
    nil = usize::MAX,
    prefix = "instance"
);

handle!(
    /// A session (`JET_SESID`).
    SessionHandle(usize),
    nil = usize::MAX,
    prefix = "sesid"
);

handle!(
    /// An open database within a session (`JET_DBID`).
    DatabaseHandle(u32),
    nil = u32::MAX,
    prefix = "dbid"
);

handle!(
    /// A cursor on a table (`JET_TABLEID`).
    TableHandle(usize),
    nil = usize::MAX,
    prefix = "tableid"
);

handle!(
    /// A column within a table schema (`JET_COLUMNID`).
    ColumnId(u32),
    nil = 0,
    prefix = "columnid"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_default() {
        assert!(SessionHandle::default().is_nil());
        assert!(TableHandle::default().is_nil());
        assert!(ColumnId::default().is_nil());
        assert!(!TableHandle::new(7).is_nil());
    }

    #[test]
    fn handles_compare_by_value() {
        assert_eq!(TableHandle::new(3), TableHandle::new(3));
        assert_ne!(TableHandle::new(3), TableHandle::new(4));
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", ColumnId::new(0x100)), "columnid:0x100");
        assert_eq!(format!("{}", DatabaseHandle::NIL), "dbid:nil");
    }
}
