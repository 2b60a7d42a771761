//! Engine status codes.
//!
//! Zero is success, positive values are warnings and negative values are
//! errors. Only the codes the binding or the in-memory engine produce are
//! listed; the real engine may return others.

/// A native status code (`JET_ERR`).
pub type JetErr = i32;

/// Error codes (negative) and success.
pub mod err {
    use super::JetErr;

    /// The operation succeeded.
    pub const SUCCESS: JetErr = 0;
    /// A bookmark is not valid for this table.
    pub const INVALID_BOOKMARK: JetErr = -328;
    /// An invalid combination of options was supplied.
    pub const INVALID_GRBIT: JetErr = -900;
    /// The engine is shutting down.
    pub const TERM_IN_PROGRESS: JetErr = -1000;
    /// The API is not available on this engine.
    pub const FEATURE_NOT_AVAILABLE: JetErr = -1001;
    /// An object name is not valid.
    pub const INVALID_NAME: JetErr = -1002;
    /// A parameter is not valid.
    pub const INVALID_PARAMETER: JetErr = -1003;
    /// The database handle is not valid.
    pub const INVALID_DATABASE_ID: JetErr = -1010;
    /// Out of memory.
    pub const OUT_OF_MEMORY: JetErr = -1011;
    /// The record has been deleted.
    pub const RECORD_DELETED: JetErr = -1017;
    /// The instance has not been initialized.
    pub const NOT_INITIALIZED: JetErr = -1030;
    /// The instance is already initialized.
    pub const ALREADY_INITIALIZED: JetErr = -1031;
    /// The output buffer is too small.
    pub const BUFFER_TOO_SMALL: JetErr = -1038;
    /// The buffer size does not match the column type.
    pub const INVALID_BUFFER_SIZE: JetErr = -1047;
    /// A null key segment is not allowed by the index.
    pub const NULL_KEY_DISALLOWED: JetErr = -1053;
    /// The session is not in a transaction.
    pub const NOT_IN_TRANSACTION: JetErr = -1054;
    /// The instance or system parameter name is already in use.
    pub const INSTANCE_NAME_IN_USE: JetErr = -1086;
    /// Another session holds a conflicting write lock.
    pub const WRITE_CONFLICT: JetErr = -1102;
    /// Transactions are nested too deeply.
    pub const TRANS_TOO_DEEP: JetErr = -1103;
    /// The session handle is not valid.
    pub const INVALID_SESID: JetErr = -1104;
    /// The instance handle is not valid.
    pub const INVALID_INSTANCE: JetErr = -1115;
    /// The database already exists.
    pub const DATABASE_DUPLICATE: JetErr = -1201;
    /// The database is in use.
    pub const DATABASE_IN_USE: JetErr = -1202;
    /// The database is not attached.
    pub const DATABASE_NOT_FOUND: JetErr = -1203;
    /// The table already exists.
    pub const TABLE_DUPLICATE: JetErr = -1303;
    /// The table is in use and cannot be locked.
    pub const TABLE_IN_USE: JetErr = -1304;
    /// No such table or object.
    pub const OBJECT_NOT_FOUND: JetErr = -1305;
    /// The cursor handle is not valid.
    pub const INVALID_TABLE_ID: JetErr = -1310;
    /// The table already has a primary index.
    pub const INDEX_HAS_PRIMARY: JetErr = -1401;
    /// The index already exists.
    pub const INDEX_DUPLICATE: JetErr = -1403;
    /// No such index.
    pub const INDEX_NOT_FOUND: JetErr = -1404;
    /// The index definition is not valid.
    pub const INDEX_INVALID_DEF: JetErr = -1406;
    /// The long-value offset is past the end of the column.
    pub const COLUMN_NO_CHUNK: JetErr = -1502;
    /// The column cannot be null.
    pub const NULL_INVALID: JetErr = -1504;
    /// The column value is too large.
    pub const COLUMN_TOO_BIG: JetErr = -1506;
    /// No such column.
    pub const COLUMN_NOT_FOUND: JetErr = -1507;
    /// The column already exists.
    pub const COLUMN_DUPLICATE: JetErr = -1508;
    /// Multi-valued columns must be tagged.
    pub const MULTI_VALUED_COLUMN_MUST_BE_TAGGED: JetErr = -1509;
    /// The column type is not valid for this operation.
    pub const INVALID_COLUMN_TYPE: JetErr = -1511;
    /// The key is already complete.
    pub const KEY_IS_MADE: JetErr = -1516;
    /// No record matches the search key.
    pub const RECORD_NOT_FOUND: JetErr = -1601;
    /// There is no working buffer for the update.
    pub const RECORD_NO_COPY: JetErr = -1602;
    /// The cursor is not positioned on a record.
    pub const NO_CURRENT_RECORD: JetErr = -1603;
    /// The primary key may not change in a replace.
    pub const RECORD_PRIMARY_CHANGED: JetErr = -1604;
    /// A unique index already has this key.
    pub const KEY_DUPLICATE: JetErr = -1605;
    /// An update is already prepared.
    pub const ALREADY_PREPARED: JetErr = -1607;
    /// No search key has been made.
    pub const KEY_NOT_MADE: JetErr = -1608;
    /// No update has been prepared.
    pub const UPDATE_NOT_PREPARED: JetErr = -1609;
    /// The session already has a context.
    pub const SESSION_CONTEXT_ALREADY_SET: JetErr = -1805;
    /// The session context was not set by this caller.
    pub const SESSION_CONTEXT_NOT_SET_BY_THIS_THREAD: JetErr = -1806;
    /// The file was not found.
    pub const FILE_NOT_FOUND: JetErr = -1811;
    /// The operation is not valid for the object.
    pub const INVALID_OPERATION: JetErr = -1906;
}

/// Warning codes (positive).
pub mod wrn {
    use super::JetErr;

    /// The column is null.
    pub const COLUMN_NULL: JetErr = 1004;
    /// The output buffer was too small; data was truncated.
    pub const BUFFER_TRUNCATED: JetErr = 1006;
    /// The database was already attached.
    pub const DATABASE_ATTACHED: JetErr = 1007;
    /// The seek landed on a record that does not equal the search key.
    pub const SEEK_NOT_EQUAL: JetErr = 1039;
    /// A column was set to null.
    pub const COLUMN_SET_NULL: JetErr = 1068;
    /// The table is empty.
    pub const TABLE_EMPTY: JetErr = 1301;
    /// The column data was truncated to the requested maximum size.
    pub const COLUMN_TRUNCATED: JetErr = 1534;
    /// The column value exists; its data was not returned.
    pub const COLUMN_PRESENT: JetErr = 1535;
    /// The column holds one value, returned inline.
    pub const COLUMN_SINGLE_VALUE: JetErr = 1536;
    /// The returned value is the column's default.
    pub const COLUMN_DEFAULT: JetErr = 1537;
}

struct CodeInfo {
    code: JetErr,
    name: &'static str,
    description: &'static str,
}

const CODES: &[CodeInfo] = &[
    CodeInfo {
        code: err::SUCCESS,
        name: "JET_errSuccess",
        description: "Successful Operation",
    },
    CodeInfo {
        code: err::INVALID_BOOKMARK,
        name: "JET_errInvalidBookmark",
        description: "Invalid bookmark",
    },
    CodeInfo {
        code: err::INVALID_GRBIT,
        name: "JET_errInvalidGrbit",
        description: "Invalid flags parameter",
    },
    CodeInfo {
        code: err::TERM_IN_PROGRESS,
        name: "JET_errTermInProgress",
        description: "Termination in progress",
    },
    CodeInfo {
        code: err::FEATURE_NOT_AVAILABLE,
        name: "JET_errFeatureNotAvailable",
        description: "API not supported",
    },
    CodeInfo {
        code: err::INVALID_NAME,
        name: "JET_errInvalidName",
        description: "Invalid name",
    },
    CodeInfo {
        code: err::INVALID_PARAMETER,
        name: "JET_errInvalidParameter",
        description: "Invalid API parameter",
    },
    CodeInfo {
        code: err::INVALID_DATABASE_ID,
        name: "JET_errInvalidDatabaseId",
        description: "Invalid database id",
    },
    CodeInfo {
        code: err::OUT_OF_MEMORY,
        name: "JET_errOutOfMemory",
        description: "Out of Memory",
    },
    CodeInfo {
        code: err::RECORD_DELETED,
        name: "JET_errRecordDeleted",
        description: "Record has been deleted",
    },
    CodeInfo {
        code: err::NOT_INITIALIZED,
        name: "JET_errNotInitialized",
        description: "JetInit not yet called",
    },
    CodeInfo {
        code: err::ALREADY_INITIALIZED,
        name: "JET_errAlreadyInitialized",
        description: "JetInit already called",
    },
    CodeInfo {
        code: err::BUFFER_TOO_SMALL,
        name: "JET_errBufferTooSmall",
        description: "Buffer is too small",
    },
    CodeInfo {
        code: err::INVALID_BUFFER_SIZE,
        name: "JET_errInvalidBufferSize",
        description: "Data buffer doesn't match column size",
    },
    CodeInfo {
        code: err::NULL_KEY_DISALLOWED,
        name: "JET_errNullKeyDisallowed",
        description: "Null keys are disallowed on index",
    },
    CodeInfo {
        code: err::NOT_IN_TRANSACTION,
        name: "JET_errNotInTransaction",
        description: "Operation must be within a transaction",
    },
    CodeInfo {
        code: err::INSTANCE_NAME_IN_USE,
        name: "JET_errInstanceNameInUse",
        description: "Instance Name already in use",
    },
    CodeInfo {
        code: err::WRITE_CONFLICT,
        name: "JET_errWriteConflict",
        description: "Write lock failed due to outstanding write lock",
    },
    CodeInfo {
        code: err::TRANS_TOO_DEEP,
        name: "JET_errTransTooDeep",
        description: "Transactions nested too deeply",
    },
    CodeInfo {
        code: err::INVALID_SESID,
        name: "JET_errInvalidSesid",
        description: "Invalid session handle",
    },
    CodeInfo {
        code: err::INVALID_INSTANCE,
        name: "JET_errInvalidInstance",
        description: "Invalid instance handle",
    },
    CodeInfo {
        code: err::DATABASE_DUPLICATE,
        name: "JET_errDatabaseDuplicate",
        description: "Database already exists",
    },
    CodeInfo {
        code: err::DATABASE_IN_USE,
        name: "JET_errDatabaseInUse",
        description: "Database in use",
    },
    CodeInfo {
        code: err::DATABASE_NOT_FOUND,
        name: "JET_errDatabaseNotFound",
        description: "No such database",
    },
    CodeInfo {
        code: err::TABLE_DUPLICATE,
        name: "JET_errTableDuplicate",
        description: "Table already exists",
    },
    CodeInfo {
        code: err::TABLE_IN_USE,
        name: "JET_errTableInUse",
        description: "Table is in use, cannot lock",
    },
    CodeInfo {
        code: err::OBJECT_NOT_FOUND,
        name: "JET_errObjectNotFound",
        description: "No such table or object",
    },
    CodeInfo {
        code: err::INVALID_TABLE_ID,
        name: "JET_errInvalidTableId",
        description: "Invalid table id",
    },
    CodeInfo {
        code: err::INDEX_HAS_PRIMARY,
        name: "JET_errIndexHasPrimary",
        description: "Primary index already defined",
    },
    CodeInfo {
        code: err::INDEX_DUPLICATE,
        name: "JET_errIndexDuplicate",
        description: "Index is already defined",
    },
    CodeInfo {
        code: err::INDEX_NOT_FOUND,
        name: "JET_errIndexNotFound",
        description: "No such index",
    },
    CodeInfo {
        code: err::INDEX_INVALID_DEF,
        name: "JET_errIndexInvalidDef",
        description: "Illegal index definition",
    },
    CodeInfo {
        code: err::COLUMN_NO_CHUNK,
        name: "JET_errColumnNoChunk",
        description: "No such chunk in long value",
    },
    CodeInfo {
        code: err::NULL_INVALID,
        name: "JET_errNullInvalid",
        description: "Null not valid",
    },
    CodeInfo {
        code: err::COLUMN_TOO_BIG,
        name: "JET_errColumnTooBig",
        description: "Field length is greater than maximum",
    },
    CodeInfo {
        code: err::COLUMN_NOT_FOUND,
        name: "JET_errColumnNotFound",
        description: "No such column",
    },
    CodeInfo {
        code: err::COLUMN_DUPLICATE,
        name: "JET_errColumnDuplicate",
        description: "Field is already defined",
    },
    CodeInfo {
        code: err::MULTI_VALUED_COLUMN_MUST_BE_TAGGED,
        name: "JET_errMultiValuedColumnMustBeTagged",
        description: "Attempted to create a multi-valued column, but column was not Tagged",
    },
    CodeInfo {
        code: err::INVALID_COLUMN_TYPE,
        name: "JET_errInvalidColumnType",
        description: "Invalid column data type",
    },
    CodeInfo {
        code: err::KEY_IS_MADE,
        name: "JET_errKeyIsMade",
        description: "The key is completely made",
    },
    CodeInfo {
        code: err::RECORD_NOT_FOUND,
        name: "JET_errRecordNotFound",
        description: "The key was not found",
    },
    CodeInfo {
        code: err::RECORD_NO_COPY,
        name: "JET_errRecordNoCopy",
        description: "No working buffer",
    },
    CodeInfo {
        code: err::NO_CURRENT_RECORD,
        name: "JET_errNoCurrentRecord",
        description: "Currency not on a record",
    },
    CodeInfo {
        code: err::RECORD_PRIMARY_CHANGED,
        name: "JET_errRecordPrimaryChanged",
        description: "Primary key may not change",
    },
    CodeInfo {
        code: err::KEY_DUPLICATE,
        name: "JET_errKeyDuplicate",
        description: "Illegal duplicate key",
    },
    CodeInfo {
        code: err::ALREADY_PREPARED,
        name: "JET_errAlreadyPrepared",
        description: "Attempted to update record when record update was already in progress",
    },
    CodeInfo {
        code: err::KEY_NOT_MADE,
        name: "JET_errKeyNotMade",
        description: "No call to JetMakeKey",
    },
    CodeInfo {
        code: err::UPDATE_NOT_PREPARED,
        name: "JET_errUpdateNotPrepared",
        description: "No call to JetPrepareUpdate",
    },
    CodeInfo {
        code: err::SESSION_CONTEXT_ALREADY_SET,
        name: "JET_errSessionContextAlreadySet",
        description: "Specified session already has a session context set",
    },
    CodeInfo {
        code: err::SESSION_CONTEXT_NOT_SET_BY_THIS_THREAD,
        name: "JET_errSessionContextNotSetByThisThread",
        description: "Tried to reset session context, but the session context was not set by this \
                      thread",
    },
    CodeInfo {
        code: err::FILE_NOT_FOUND,
        name: "JET_errFileNotFound",
        description: "File not found",
    },
    CodeInfo {
        code: err::INVALID_OPERATION,
        name: "JET_errInvalidOperation",
        description: "Invalid operation",
    },
    CodeInfo {
        code: wrn::COLUMN_NULL,
        name: "JET_wrnColumnNull",
        description: "Column is NULL-valued",
    },
    CodeInfo {
        code: wrn::BUFFER_TRUNCATED,
        name: "JET_wrnBufferTruncated",
        description: "Buffer too small for data",
    },
    CodeInfo {
        code: wrn::DATABASE_ATTACHED,
        name: "JET_wrnDatabaseAttached",
        description: "Database is already attached",
    },
    CodeInfo {
        code: wrn::SEEK_NOT_EQUAL,
        name: "JET_wrnSeekNotEqual",
        description: "Exact match not found during seek",
    },
    CodeInfo {
        code: wrn::COLUMN_SET_NULL,
        name: "JET_wrnColumnSetNull",
        description: "Column value was set to NULL",
    },
    CodeInfo {
        code: wrn::TABLE_EMPTY,
        name: "JET_wrnTableEmpty",
        description: "Opened an empty table",
    },
    CodeInfo {
        code: wrn::COLUMN_TRUNCATED,
        name: "JET_wrnColumnTruncated",
        description: "Column value was truncated",
    },
    CodeInfo {
        code: wrn::COLUMN_PRESENT,
        name: "JET_wrnColumnPresent",
        description: "Column value is present",
    },
    CodeInfo {
        code: wrn::COLUMN_SINGLE_VALUE,
        name: "JET_wrnColumnSingleValue",
        description: "Single instance column bursted",
    },
    CodeInfo {
        code: wrn::COLUMN_DEFAULT,
        name: "JET_wrnColumnDefault",
        description: "Column value is the default value",
    },
];

/// Returns the symbolic name and description of a status code, if known.
#[must_use]
pub fn describe(code: JetErr) -> Option<(&'static str, &'static str)> {
    CODES
        .iter()
        .find(|info| info.code == code)
        .map(|info| (info.name, info.description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_are_described() {
        let (name, _) = describe(err::NO_CURRENT_RECORD).unwrap();
        assert_eq!(name, "JET_errNoCurrentRecord");
        let (name, _) = describe(wrn::BUFFER_TRUNCATED).unwrap();
        assert_eq!(name, "JET_wrnBufferTruncated");
    }

    #[test]
    fn unknown_code_is_none() {
        assert!(describe(-12345).is_none());
    }

    #[test]
    fn codes_are_unique() {
        for (i, a) in CODES.iter().enumerate() {
            for b in &CODES[i + 1..] {
                assert_ne!(a.code, b.code, "{} and {} share a code", a.name, b.name);
            }
        }
    }

    #[test]
    fn sign_convention() {
        assert!(err::RECORD_NOT_FOUND < 0);
        assert!(wrn::COLUMN_NULL > 0);
    }
}
