//! Plain data structures exchanged with the engine.

use crate::codes::JetErr;
use crate::grbit::{ColumndefGrbit, IndexRangeGrbit};
use crate::handles::{ColumnId, TableHandle};

/// Moves to the first row (`JET_MoveFirst`).
pub const MOVE_FIRST: i32 = i32::MIN;
/// Moves to the previous row (`JET_MovePrevious`).
pub const MOVE_PREVIOUS: i32 = -1;
/// Moves to the next row (`JET_MoveNext`).
pub const MOVE_NEXT: i32 = 1;
/// Moves to the last row (`JET_MoveLast`).
pub const MOVE_LAST: i32 = i32::MAX;

/// Largest bookmark the engine produces (`JET_cbBookmarkMost`).
pub const BOOKMARK_MOST: usize = 256;
/// Largest normalized key the engine produces (`JET_cbKeyMost`).
pub const KEY_MOST: usize = 255;

/// Column data types (`JET_coltyp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ColumnType {
    /// Invalid column type.
    #[default]
    Nil = 0,
    /// Boolean stored as a byte.
    Bit = 1,
    /// Unsigned 8-bit integer.
    UnsignedByte = 2,
    /// Signed 16-bit integer.
    Short = 3,
    /// Signed 32-bit integer.
    Long = 4,
    /// Signed 64-bit currency value.
    Currency = 5,
    /// 32-bit float.
    IEEESingle = 6,
    /// 64-bit float.
    IEEEDouble = 7,
    /// OLE automation date stored as a double.
    DateTime = 8,
    /// Binary data up to 255 bytes.
    Binary = 9,
    /// Text up to 255 bytes.
    Text = 10,
    /// Long binary data.
    LongBinary = 11,
    /// Long text.
    LongText = 12,
    /// Unsigned 32-bit integer.
    UnsignedLong = 14,
    /// Signed 64-bit integer.
    LongLong = 15,
    /// 16-byte GUID.
    Guid = 16,
    /// Unsigned 16-bit integer.
    UnsignedShort = 17,
}

impl ColumnType {
    /// Converts a raw `coltyp` value.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Nil,
            1 => Self::Bit,
            2 => Self::UnsignedByte,
            3 => Self::Short,
            4 => Self::Long,
            5 => Self::Currency,
            6 => Self::IEEESingle,
            7 => Self::IEEEDouble,
            8 => Self::DateTime,
            9 => Self::Binary,
            10 => Self::Text,
            11 => Self::LongBinary,
            12 => Self::LongText,
            14 => Self::UnsignedLong,
            15 => Self::LongLong,
            16 => Self::Guid,
            17 => Self::UnsignedShort,
            _ => return None,
        })
    }

    /// Returns the raw `coltyp` value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size in bytes of a fixed-width type, or `None` for variable types.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bit | Self::UnsignedByte => Some(1),
            Self::Short | Self::UnsignedShort => Some(2),
            Self::Long | Self::UnsignedLong | Self::IEEESingle => Some(4),
            Self::Currency | Self::IEEEDouble | Self::DateTime | Self::LongLong => Some(8),
            Self::Guid => Some(16),
            Self::Nil | Self::Binary | Self::Text | Self::LongBinary | Self::LongText => None,
        }
    }

    /// Returns true for text types.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::LongText)
    }

    /// Returns true for long-value types.
    #[must_use]
    pub const fn is_long(self) -> bool {
        matches!(self, Self::LongText | Self::LongBinary)
    }
}

/// Code page of a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodePage(pub u32);

impl CodePage {
    /// No code page (non-text columns).
    pub const NONE: Self = Self(0);
    /// UTF-16 little-endian.
    pub const UNICODE: Self = Self(1200);
    /// Windows-1252.
    pub const ASCII: Self = Self(1252);
}

/// System parameter identifiers (`JET_param*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

impl ParamId {
    /// Path to the checkpoint file directory.
    pub const SYSTEM_PATH: Self = Self(0);
    /// Path to the temporary database.
    pub const TEMP_PATH: Self = Self(1);
    /// Path to the log file directory.
    pub const LOG_FILE_PATH: Self = Self(2);
    /// Three-character base name of log files.
    pub const BASE_NAME: Self = Self(3);
    /// Event log source name.
    pub const EVENT_SOURCE: Self = Self(4);
    /// Maximum number of open tables.
    pub const MAX_OPEN_TABLES: Self = Self(6);
    /// Maximum number of sessions.
    pub const MAX_SESSIONS: Self = Self(8);
    /// Maximum number of version store pages.
    pub const MAX_VER_PAGES: Self = Self(9);
    /// Maximum number of cursors.
    pub const MAX_CURSORS: Self = Self(10);
    /// Log file size in kilobytes.
    pub const LOG_FILE_SIZE: Self = Self(11);
    /// Circular logging.
    pub const CIRCULAR_LOG: Self = Self(17);
    /// Recovery on or off ("On" / "Off").
    pub const RECOVERY: Self = Self(34);
    /// Database page size in bytes.
    pub const DATABASE_PAGE_SIZE: Self = Self(64);
    /// Converts an error code (in the integer value) to a string.
    pub const ERROR_TO_STRING: Self = Self(70);
    /// Suppress informational event log entries.
    pub const NO_INFORMATION_EVENT: Self = Self(75);
    /// Create missing directories.
    pub const CREATE_PATH_IF_NOT_EXIST: Self = Self(100);
}

/// Update preparation modes (`JET_prep`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Prep {
    /// Insert a new record.
    Insert = 0,
    /// Replace the current record, taking a write lock.
    Replace = 2,
    /// Cancel the pending update.
    Cancel = 3,
    /// Replace the current record without locking it first.
    ReplaceNoLock = 4,
    /// Insert a copy of the current record.
    InsertCopy = 5,
}

/// Object types in an object list (`JET_objtyp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ObjectType {
    /// Invalid object type.
    Nil = 0,
    /// A table.
    Table = 1,
}

/// Column definition (`JET_COLUMNDEF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnDef {
    /// Column id, filled in by the engine.
    pub columnid: ColumnId,
    /// Column type.
    pub coltyp: ColumnType,
    /// Reserved.
    pub country: u16,
    /// Reserved.
    pub langid: u16,
    /// Code page for text columns.
    pub cp: CodePage,
    /// Reserved.
    pub collate: u16,
    /// Maximum length in bytes, 0 for no limit.
    pub cb_max: u32,
    /// Column flags.
    pub grbit: ColumndefGrbit,
}

/// A column to enumerate and the instances of it to return
/// (`JET_ENUMCOLUMNID`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumColumnId {
    /// The column.
    pub columnid: ColumnId,
    /// 1-based multi-value sequence numbers; empty for every instance.
    pub tags: Vec<u32>,
}

/// One enumerated value (`JET_ENUMCOLUMNVALUE`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumColumnValue {
    /// 1-based multi-value sequence number.
    pub itag_sequence: u32,
    /// Status of this value, such as `JET_wrnColumnTruncated`.
    pub err: JetErr,
    /// The value. Empty when only presence was asked for.
    pub data: Vec<u8>,
}

/// One enumerated column (`JET_ENUMCOLUMN`).
///
/// With `JET_wrnColumnSingleValue` the column holds exactly one value,
/// found in `values[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumColumn {
    /// The column.
    pub columnid: ColumnId,
    /// Status of the column, such as `JET_wrnColumnNull` or an error for a
    /// column that does not exist.
    pub err: JetErr,
    /// The values, in sequence order.
    pub values: Vec<EnumColumnValue>,
}

/// Extra addressing for `JetRetrieveColumn` (`JET_RETINFO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetrieveInfo {
    /// Byte offset into a long value.
    pub ib_long_value: u32,
    /// 1-based multi-value sequence number.
    pub itag_sequence: u32,
    /// Next tagged column, filled in by the engine.
    pub columnid_next_tagged: ColumnId,
}

/// Extra addressing for `JetSetColumn` (`JET_SETINFO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetInfo {
    /// Byte offset into a long value.
    pub ib_long_value: u32,
    /// 1-based multi-value sequence number, 0 to append.
    pub itag_sequence: u32,
}

/// Approximate position of a record in an index (`JET_RECPOS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordPosition {
    /// Entries before the record.
    pub entries_less_than: u32,
    /// Reserved, always 1.
    pub entries_in_range: u32,
    /// Total entries in the index.
    pub entries_total: u32,
}

/// One index range participating in an intersection (`JET_INDEXRANGE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    /// Cursor with an index range set.
    pub tableid: TableHandle,
    /// Range flags.
    pub grbit: IndexRangeGrbit,
}

/// Temporary table of bookmarks (`JET_RECORDLIST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordList {
    /// Cursor on the temporary table.
    pub tableid: TableHandle,
    /// Number of records.
    pub record_count: u32,
    /// Column holding the bookmarks.
    pub columnid_bookmark: ColumnId,
}

/// Temporary table describing columns (`JET_COLUMNLIST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnList {
    /// Cursor on the temporary table.
    pub tableid: TableHandle,
    /// Number of rows.
    pub record_count: u32,
    /// Presentation order.
    pub columnid_presentation_order: ColumnId,
    /// Column name.
    pub columnid_column_name: ColumnId,
    /// Column id.
    pub columnid_columnid: ColumnId,
    /// Column type.
    pub columnid_coltyp: ColumnId,
    /// Country code.
    pub columnid_country: ColumnId,
    /// Language id.
    pub columnid_langid: ColumnId,
    /// Code page.
    pub columnid_cp: ColumnId,
    /// Collation.
    pub columnid_collate: ColumnId,
    /// Maximum length.
    pub columnid_cb_max: ColumnId,
    /// Column flags.
    pub columnid_grbit: ColumnId,
    /// Default value.
    pub columnid_default: ColumnId,
    /// Base table name.
    pub columnid_base_table_name: ColumnId,
    /// Base column name.
    pub columnid_base_column_name: ColumnId,
    /// Definition name.
    pub columnid_definition_name: ColumnId,
}

/// Temporary table describing objects (`JET_OBJECTLIST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectList {
    /// Cursor on the temporary table.
    pub tableid: TableHandle,
    /// Number of rows.
    pub record_count: u32,
    /// Container name.
    pub columnid_container_name: ColumnId,
    /// Object name.
    pub columnid_object_name: ColumnId,
    /// Object type.
    pub columnid_objtyp: ColumnId,
    /// Creation time.
    pub columnid_dt_create: ColumnId,
    /// Last update time.
    pub columnid_dt_update: ColumnId,
    /// Object options.
    pub columnid_grbit: ColumnId,
    /// Object flags.
    pub columnid_flags: ColumnId,
    /// Record count.
    pub columnid_c_record: ColumnId,
    /// Page count.
    pub columnid_c_page: ColumnId,
}

/// Temporary table describing indexes (`JET_INDEXLIST`).
///
/// The table holds one row per key segment. Rows of the same index are
/// adjacent and each carries the index-level columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexList {
    /// Cursor on the temporary table.
    pub tableid: TableHandle,
    /// Number of rows.
    pub record_count: u32,
    /// Index name.
    pub columnid_index_name: ColumnId,
    /// Index flags.
    pub columnid_grbit_index: ColumnId,
    /// Number of unique keys.
    pub columnid_c_key: ColumnId,
    /// Number of entries.
    pub columnid_c_entry: ColumnId,
    /// Number of pages.
    pub columnid_c_page: ColumnId,
    /// Number of key segments.
    pub columnid_c_column: ColumnId,
    /// Segment number within the key.
    pub columnid_i_column: ColumnId,
    /// Segment column id.
    pub columnid_columnid: ColumnId,
    /// Segment column type.
    pub columnid_coltyp: ColumnId,
    /// Country code.
    pub columnid_country: ColumnId,
    /// Language id (LCID) of the index.
    pub columnid_langid: ColumnId,
    /// Segment code page.
    pub columnid_cp: ColumnId,
    /// Collation.
    pub columnid_collate: ColumnId,
    /// Segment flags.
    pub columnid_grbit_column: ColumnId,
    /// Segment column name.
    pub columnid_column_name: ColumnId,
    /// LCMapString flags of the index.
    pub columnid_lc_map_flags: ColumnId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_type_round_trips_raw_value() {
        for raw in 0..20 {
            if let Some(coltyp) = ColumnType::from_u32(raw) {
                assert_eq!(coltyp.as_u32(), raw);
            }
        }
        assert_eq!(ColumnType::from_u32(13), None);
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(ColumnType::Bit.fixed_size(), Some(1));
        assert_eq!(ColumnType::Guid.fixed_size(), Some(16));
        assert_eq!(ColumnType::DateTime.fixed_size(), Some(8));
        assert_eq!(ColumnType::LongText.fixed_size(), None);
    }
}
