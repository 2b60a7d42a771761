//! Option bit fields (`grbit`) accepted by the native calls.
//!
//! Each call family has its own type so that options cannot be passed to the
//! wrong call. Values match the engine headers.

use std::ops::{BitAnd, BitOr, BitOrAssign};

macro_rules! grbit {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$cmeta:meta])* $flag:ident = $value:expr; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u32);

        impl $name {
            /// No options.
            pub const NONE: Self = Self(0);
            $( $(#[$cmeta])* pub const $flag: Self = Self($value); )*

            /// Returns the raw bits.
            #[must_use]
            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Returns true if every bit of `other` is set.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns true if any bit of `other` is set.
            #[must_use]
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Returns these options with the bits of `other` cleared.
            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }
    };
}

grbit!(
    /// Options for `JetCreateInstance2`.
    CreateInstanceGrbit {}
);

grbit!(
    /// Options for `JetTerm2`.
    TermGrbit {
        /// Perform a clean shutdown.
        COMPLETE = 0x1;
        /// Shut down without waiting for background work.
        ABRUPT = 0x2;
    }
);

grbit!(
    /// Options for `JetCreateDatabase`.
    CreateDatabaseGrbit {
        /// Turn off logging for the database.
        RECOVERY_OFF = 0x8;
        /// Overwrite an existing database file.
        OVERWRITE_EXISTING = 0x200;
    }
);

grbit!(
    /// Options for `JetAttachDatabase`.
    AttachDatabaseGrbit {
        /// Attach read-only.
        READ_ONLY = 0x1;
        /// Delete corrupt indexes on attach.
        DELETE_CORRUPT_INDEXES = 0x10;
    }
);

grbit!(
    /// Options for `JetOpenDatabase`.
    OpenDatabaseGrbit {
        /// Open read-only.
        READ_ONLY = 0x1;
        /// Open exclusively.
        EXCLUSIVE = 0x2;
    }
);

grbit!(
    /// Options for `JetCloseDatabase`.
    CloseDatabaseGrbit {}
);

grbit!(
    /// Options for `JetEndSession`.
    EndSessionGrbit {}
);

grbit!(
    /// Options for `JetOpenTable`.
    OpenTableGrbit {
        /// Deny other cursors on the table.
        DENY_WRITE = 0x1;
        /// Deny other cursors reading the table.
        DENY_READ = 0x2;
        /// Open read-only.
        READ_ONLY = 0x4;
        /// Allow updates.
        UPDATABLE = 0x8;
        /// Hint that the table will be scanned sequentially.
        SEQUENTIAL = 0x8000;
    }
);

grbit!(
    /// Options for `JetDupCursor`.
    DupCursorGrbit {}
);

grbit!(
    /// Options for `JetCommitTransaction`.
    CommitTransactionGrbit {
        /// Commit without waiting for the log flush.
        LAZY_FLUSH = 0x1;
        /// Wait for the last level-0 commit to be flushed.
        WAIT_LAST_LEVEL0_COMMIT = 0x2;
        /// Wait for all level-0 commits to be flushed.
        WAIT_ALL_LEVEL0_COMMIT = 0x8;
    }
);

grbit!(
    /// Options for `JetRollback`.
    RollbackTransactionGrbit {
        /// Roll back every nesting level.
        ROLLBACK_ALL = 0x1;
    }
);

grbit!(
    /// Column definition flags (`JET_COLUMNDEF.grbit`).
    ColumndefGrbit {
        /// A fixed-size column.
        COLUMN_FIXED = 0x1;
        /// A tagged (sparse) column.
        COLUMN_TAGGED = 0x2;
        /// The column may not be null.
        COLUMN_NOT_NULL = 0x4;
        /// A version column incremented on every update.
        COLUMN_VERSION = 0x8;
        /// An autoincrement column.
        COLUMN_AUTOINCREMENT = 0x10;
        /// A multi-valued column.
        COLUMN_MULTI_VALUED = 0x400;
        /// A column that supports escrow updates.
        COLUMN_ESCROW_UPDATE = 0x800;
        /// An unversioned column.
        COLUMN_UNVERSIONED = 0x1000;
        /// A key column of a temporary table.
        TT_KEY = 0x40;
        /// A descending key column of a temporary table.
        TT_DESCENDING = 0x80;
        /// Delete the record when an escrow column reaches zero.
        COLUMN_DELETE_ON_ZERO = 0x20000;
    }
);

grbit!(
    /// Options for `JetOpenTempTable`.
    TempTableGrbit {
        /// Records are kept in key order.
        INDEXED = 0x1;
        /// Records with duplicate keys are removed.
        UNIQUE = 0x2;
        /// Records can be inserted and replaced after the table is opened.
        UPDATABLE = 0x4;
        /// The cursor can move backward.
        SCROLLABLE = 0x8;
        /// Null keys sort after all other keys.
        SORT_NULLS_HIGH = 0x10;
        /// Inserting a duplicate key fails instead of being discarded.
        ERROR_ON_DUPLICATE_INSERTION = 0x20;
        /// The cursor only moves forward.
        FORWARD_ONLY = 0x40;
    }
);

grbit!(
    /// Options for `JetSetTableSequential`.
    SetTableSequentialGrbit {
        /// Preread forward.
        PREREAD_FORWARD = 0x1;
        /// Preread backward.
        PREREAD_BACKWARD = 0x2;
    }
);

grbit!(
    /// Options for `JetResetTableSequential`.
    ResetTableSequentialGrbit {}
);

grbit!(
    /// Options for `JetEnumerateColumns`.
    EnumerateColumnsGrbit {
        /// Enumerate the copy buffer of the pending update.
        ENUMERATE_COPY = 0x10;
        /// Skip columns holding only their default value.
        ENUMERATE_IGNORE_DEFAULT = 0x20;
        /// Report which values exist without returning their data.
        ENUMERATE_PRESENCE_ONLY = 0x2_0000;
        /// Only enumerate tagged columns.
        ENUMERATE_TAGGED_ONLY = 0x4_0000;
        /// Return single-valued columns inline.
        ENUMERATE_COMPRESS_OUTPUT = 0x8_0000;
    }
);

grbit!(
    /// Options for `JetCreateIndex`.
    CreateIndexGrbit {
        /// Duplicate keys are not allowed.
        INDEX_UNIQUE = 0x1;
        /// The clustered primary index.
        INDEX_PRIMARY = 0x2;
        /// Null key segments are rejected.
        INDEX_DISALLOW_NULL = 0x4;
        /// Records whose key is entirely null are not indexed.
        INDEX_IGNORE_NULL = 0x8;
        /// Records with any null segment are not indexed.
        INDEX_IGNORE_ANY_NULL = 0x20;
        /// Records whose first segment is null are not indexed.
        INDEX_IGNORE_FIRST_NULL = 0x40;
        /// Index maintenance is lazily flushed.
        INDEX_LAZY_FLUSH = 0x80;
        /// Do not build the index over existing records.
        INDEX_EMPTY = 0x100;
        /// The index is not versioned.
        INDEX_UNVERSIONED = 0x200;
        /// Null segments sort after non-null values.
        INDEX_SORT_NULLS_HIGH = 0x400;
    }
);

grbit!(
    /// Per-segment flags in an index list (`columnidgrbitColumn`).
    IndexColumnGrbit {
        /// The segment is in descending order.
        KEY_DESCENDING = 0x1;
    }
);

grbit!(
    /// Options for `JetMove`.
    MoveGrbit {
        /// Skip index entries with the same key as the current one.
        MOVE_KEY_NE = 0x1;
    }
);

grbit!(
    /// Options for `JetMakeKey`.
    MakeKeyGrbit {
        /// Start a new key.
        NEW_KEY = 0x1;
        /// Make a string prefix limit (legacy alias of a partial end limit).
        STR_LIMIT = 0x2;
        /// Make a substring prefix limit (legacy alias of a partial start limit).
        SUB_STR_LIMIT = 0x4;
        /// The data is an already-normalized key.
        NORMALIZED_KEY = 0x8;
        /// The segment is zero-length rather than null.
        KEY_DATA_ZERO_LENGTH = 0x10;
        /// The key is a start limit matching all values of the last column.
        FULL_COLUMN_START_LIMIT = 0x100;
        /// The key is an end limit matching all values of the last column.
        FULL_COLUMN_END_LIMIT = 0x200;
        /// The key is a start limit matching a prefix of the last column.
        PARTIAL_COLUMN_START_LIMIT = 0x400;
        /// The key is an end limit matching a prefix of the last column.
        PARTIAL_COLUMN_END_LIMIT = 0x800;
    }
);

grbit!(
    /// Options for `JetRetrieveKey`.
    RetrieveKeyGrbit {
        /// Retrieve the search key being built rather than the record key.
        RETRIEVE_COPY = 0x1;
    }
);

grbit!(
    /// Options for `JetSeek`.
    SeekGrbit {
        /// Seek to an entry equal to the key.
        SEEK_EQ = 0x1;
        /// Seek to the last entry less than the key.
        SEEK_LT = 0x2;
        /// Seek to the last entry less than or equal to the key.
        SEEK_LE = 0x4;
        /// Seek to the first entry greater than or equal to the key.
        SEEK_GE = 0x8;
        /// Seek to the first entry greater than the key.
        SEEK_GT = 0x10;
        /// With `SEEK_EQ`, also set an inclusive upper range on the key.
        SET_INDEX_RANGE = 0x20;
    }
);

grbit!(
    /// Options for `JetSetIndexRange`.
    SetIndexRangeGrbit {
        /// The limit includes entries equal to the key.
        RANGE_INCLUSIVE = 0x1;
        /// The key is an upper limit (otherwise a lower limit).
        RANGE_UPPER_LIMIT = 0x2;
        /// Check the range once and remove it immediately.
        RANGE_INSTANT_DURATION = 0x4;
        /// Remove the current range.
        RANGE_REMOVE = 0x8;
    }
);

grbit!(
    /// Options for `JetIntersectIndexes`.
    IntersectIndexesGrbit {}
);

grbit!(
    /// Flags in a `JET_INDEXRANGE`.
    IndexRangeGrbit {
        /// The record is within the range currently set.
        RECORD_IN_INDEX = 0x1;
    }
);

grbit!(
    /// Options for `JetRetrieveColumn`.
    RetrieveColumnGrbit {
        /// Retrieve from the copy buffer of a prepared update.
        RETRIEVE_COPY = 0x1;
        /// Retrieve from the index entry.
        RETRIEVE_FROM_INDEX = 0x2;
        /// Retrieve from the primary bookmark.
        RETRIEVE_FROM_PRIMARY_BOOKMARK = 0x4;
        /// Retrieve the column identified by `itagSequence`.
        RETRIEVE_TAG = 0x8;
        /// Retrieve null values as well.
        RETRIEVE_NULL = 0x10;
        /// Do not return the column's default value.
        RETRIEVE_IGNORE_DEFAULT = 0x20;
    }
);

grbit!(
    /// Options for `JetSetColumn`.
    SetColumnGrbit {
        /// Append to a long value.
        APPEND_LV = 0x1;
        /// Overwrite part of a long value at `ibLongValue`.
        OVERWRITE_LV = 0x4;
        /// Set the size of a long value.
        SIZE_LV = 0x8;
        /// Set a zero-length value rather than null.
        ZERO_LENGTH = 0x20;
        /// Force the long value to be stored separately.
        SEPARATE_LV = 0x40;
        /// Reject duplicate values in a multi-valued column.
        UNIQUE_MULTI_VALUES = 0x80;
        /// Reject normalized duplicates in a multi-valued column.
        UNIQUE_NORMALIZED_MULTI_VALUES = 0x100;
        /// Revert the column to its default value.
        REVERT_TO_DEFAULT_VALUE = 0x200;
    }
);

grbit!(
    /// Options for `JetGetLock`.
    GetLockGrbit {
        /// Take a read lock.
        READ_LOCK = 0x1;
        /// Take a write lock.
        WRITE_LOCK = 0x2;
    }
);

grbit!(
    /// Options for `JetEscrowUpdate`.
    EscrowUpdateGrbit {
        /// The delta is not undone on rollback.
        NO_ROLLBACK = 0x1;
    }
);

grbit!(
    /// Object flags returned in an object list.
    ObjectInfoFlags {
        /// A table created with fixed DDL.
        TABLE_FIXED_DDL = 0x4000_0000;
        /// A system object.
        SYSTEM = 0x8000_0000;
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_test_bits() {
        let grbit = SeekGrbit::SEEK_EQ | SeekGrbit::SET_INDEX_RANGE;
        assert!(grbit.contains(SeekGrbit::SEEK_EQ));
        assert!(grbit.contains(SeekGrbit::SET_INDEX_RANGE));
        assert!(!grbit.contains(SeekGrbit::SEEK_GE));
        assert_eq!(grbit.bits(), 0x21);
    }

    #[test]
    fn without_clears_bits() {
        let grbit = SetColumnGrbit::OVERWRITE_LV | SetColumnGrbit::SIZE_LV;
        assert_eq!(grbit.without(SetColumnGrbit::SIZE_LV), SetColumnGrbit::OVERWRITE_LV);
    }

    #[test]
    fn none_is_default() {
        assert_eq!(MakeKeyGrbit::default(), MakeKeyGrbit::NONE);
        assert!(!MakeKeyGrbit::NONE.intersects(MakeKeyGrbit::NEW_KEY));
    }
}
