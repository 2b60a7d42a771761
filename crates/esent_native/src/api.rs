//! The flat call surface every engine implements.

use crate::codes::JetErr;
use crate::grbit::{
    AttachDatabaseGrbit, CloseDatabaseGrbit, CommitTransactionGrbit, CreateDatabaseGrbit,
    CreateIndexGrbit, CreateInstanceGrbit, DupCursorGrbit, EndSessionGrbit,
    EnumerateColumnsGrbit, EscrowUpdateGrbit, GetLockGrbit, IntersectIndexesGrbit, MakeKeyGrbit,
    MoveGrbit, OpenDatabaseGrbit, OpenTableGrbit, ResetTableSequentialGrbit, RetrieveColumnGrbit,
    RetrieveKeyGrbit, RollbackTransactionGrbit, SeekGrbit, SetColumnGrbit, SetIndexRangeGrbit,
    SetTableSequentialGrbit, TempTableGrbit, TermGrbit,
};
use crate::handles::{ColumnId, DatabaseHandle, InstanceHandle, SessionHandle, TableHandle};
use crate::types::{
    ColumnDef, ColumnList, EnumColumn, EnumColumnId, IndexList, IndexRange, ObjectList, ParamId,
    Prep, RecordList, RecordPosition, RetrieveInfo, SetInfo,
};

/// The native ESENT entry points.
///
/// Every method mirrors one `Jet*` function: handles and primitive buffers in,
/// a signed status code out. Output parameters are `&mut` references that the
/// implementation fills in. An absent buffer is `None` and stands for a null
/// pointer with a zero size.
///
/// Implementations never interpret the status they return. A zero status is
/// success, a positive status is a warning, a negative status is an error.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. The engine serializes access per
/// session; callers must not use one session from two threads at once.
pub trait JetApi: Send + Sync {
    // ---- instances and parameters ----

    /// `JetCreateInstance`.
    fn create_instance(&self, instance: &mut InstanceHandle, name: &str) -> JetErr;

    /// `JetCreateInstance2`.
    fn create_instance2(
        &self,
        instance: &mut InstanceHandle,
        name: &str,
        display_name: &str,
        grbit: CreateInstanceGrbit,
    ) -> JetErr;

    /// `JetInit`.
    fn init(&self, instance: &mut InstanceHandle) -> JetErr;

    /// `JetTerm2`.
    fn term(&self, instance: InstanceHandle, grbit: TermGrbit) -> JetErr;

    /// `JetSetSystemParameter`. A nil instance sets the global value.
    fn set_system_parameter(
        &self,
        instance: InstanceHandle,
        sesid: SessionHandle,
        paramid: ParamId,
        value: usize,
        string: Option<&str>,
    ) -> JetErr;

    /// `JetGetSystemParameter`.
    ///
    /// For `ParamId::ERROR_TO_STRING` the error code is passed in `value`
    /// (sign-extended) and its description is returned in `string`.
    fn get_system_parameter(
        &self,
        instance: InstanceHandle,
        sesid: SessionHandle,
        paramid: ParamId,
        value: &mut usize,
        string: &mut String,
        max_size: u32,
    ) -> JetErr;

    /// `JetGetVersion`.
    fn get_version(&self, sesid: SessionHandle, version: &mut u32) -> JetErr;

    // ---- databases ----

    /// `JetCreateDatabase`. The new database is attached and opened.
    fn create_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        connect: Option<&str>,
        dbid: &mut DatabaseHandle,
        grbit: CreateDatabaseGrbit,
    ) -> JetErr;

    /// `JetAttachDatabase`.
    fn attach_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        grbit: AttachDatabaseGrbit,
    ) -> JetErr;

    /// `JetOpenDatabase`.
    fn open_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        connect: Option<&str>,
        dbid: &mut DatabaseHandle,
        grbit: OpenDatabaseGrbit,
    ) -> JetErr;

    /// `JetCloseDatabase`.
    fn close_database(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        grbit: CloseDatabaseGrbit,
    ) -> JetErr;

    /// `JetDetachDatabase`. `None` detaches every database.
    fn detach_database(&self, sesid: SessionHandle, database: Option<&str>) -> JetErr;

    // ---- sessions ----

    /// `JetBeginSession`.
    fn begin_session(
        &self,
        instance: InstanceHandle,
        sesid: &mut SessionHandle,
        username: Option<&str>,
        password: Option<&str>,
    ) -> JetErr;

    /// `JetDupSession`.
    fn dup_session(&self, sesid: SessionHandle, new_sesid: &mut SessionHandle) -> JetErr;

    /// `JetEndSession`.
    fn end_session(&self, sesid: SessionHandle, grbit: EndSessionGrbit) -> JetErr;

    /// `JetSetSessionContext`. Attaches the session to the calling context.
    fn set_session_context(&self, sesid: SessionHandle, context: usize) -> JetErr;

    /// `JetResetSessionContext`. Detaches the session from its context.
    fn reset_session_context(&self, sesid: SessionHandle) -> JetErr;

    // ---- tables ----

    /// `JetOpenTable`.
    fn open_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        parameters: Option<&[u8]>,
        grbit: OpenTableGrbit,
        tableid: &mut TableHandle,
    ) -> JetErr;

    /// `JetCloseTable`.
    fn close_table(&self, sesid: SessionHandle, tableid: TableHandle) -> JetErr;

    /// `JetDupCursor`.
    fn dup_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        new_tableid: &mut TableHandle,
        grbit: DupCursorGrbit,
    ) -> JetErr;

    /// `JetOpenTempTable`.
    ///
    /// Columns flagged `TT_KEY` form the key, in definition order.
    /// `columnids` must be as long as `columns` and receives the id of each
    /// column. Closing the cursor drops the table.
    fn open_temp_table(
        &self,
        sesid: SessionHandle,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
        tableid: &mut TableHandle,
        columnids: &mut [ColumnId],
    ) -> JetErr;

    /// `JetSetTableSequential`. Hints that the cursor will scan the table.
    fn set_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetTableSequentialGrbit,
    ) -> JetErr;

    /// `JetResetTableSequential`.
    fn reset_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: ResetTableSequentialGrbit,
    ) -> JetErr;

    // ---- transactions ----

    /// `JetBeginTransaction`.
    fn begin_transaction(&self, sesid: SessionHandle) -> JetErr;

    /// `JetCommitTransaction`.
    fn commit_transaction(&self, sesid: SessionHandle, grbit: CommitTransactionGrbit) -> JetErr;

    /// `JetRollback`.
    fn rollback(&self, sesid: SessionHandle, grbit: RollbackTransactionGrbit) -> JetErr;

    // ---- data definition ----

    /// `JetCreateTable`. The new table is opened.
    fn create_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        pages: u32,
        density: u32,
        tableid: &mut TableHandle,
    ) -> JetErr;

    /// `JetDeleteTable`.
    fn delete_table(&self, sesid: SessionHandle, dbid: DatabaseHandle, name: &str) -> JetErr;

    /// `JetAddColumn`.
    fn add_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
        columnid: &mut ColumnId,
    ) -> JetErr;

    /// `JetDeleteColumn`.
    fn delete_column(&self, sesid: SessionHandle, tableid: TableHandle, name: &str) -> JetErr;

    /// `JetCreateIndex`.
    ///
    /// `key` is a double-null-terminated list of `+column` / `-column` entries.
    fn create_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
        density: u32,
    ) -> JetErr;

    /// `JetDeleteIndex`.
    fn delete_index(&self, sesid: SessionHandle, tableid: TableHandle, name: &str) -> JetErr;

    // ---- metadata ----

    /// `JetGetTableColumnInfo` with `JET_ColInfoList`.
    fn get_table_column_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> JetErr;

    /// `JetGetTableColumnInfo` with `JET_ColInfo`.
    fn get_table_column_def(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: &str,
        definition: &mut ColumnDef,
    ) -> JetErr;

    /// `JetGetColumnInfo` with `JET_ColInfoList`.
    fn get_column_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> JetErr;

    /// `JetGetObjectInfo` with `JET_ObjInfoListNoStats`.
    fn get_object_info_list(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        list: &mut ObjectList,
    ) -> JetErr;

    /// `JetGetIndexInfo` with `JET_IdxInfoList`.
    fn get_index_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> JetErr;

    /// `JetGetTableIndexInfo` with `JET_IdxInfoList`.
    fn get_table_index_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> JetErr;

    /// `JetGetCurrentIndex`.
    fn get_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &mut String,
        max_size: u32,
    ) -> JetErr;

    // ---- navigation ----

    /// `JetGetBookmark`.
    fn get_bookmark(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> JetErr;

    /// `JetGotoBookmark`.
    fn goto_bookmark(&self, sesid: SessionHandle, tableid: TableHandle, bookmark: &[u8]) -> JetErr;

    /// `JetMakeKey`.
    fn make_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        data: Option<&[u8]>,
        grbit: MakeKeyGrbit,
    ) -> JetErr;

    /// `JetRetrieveKey`.
    fn retrieve_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        key: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveKeyGrbit,
    ) -> JetErr;

    /// `JetSeek`.
    fn seek(&self, sesid: SessionHandle, tableid: TableHandle, grbit: SeekGrbit) -> JetErr;

    /// `JetMove`. `rows` is an offset or one of the `MOVE_*` constants.
    fn move_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        rows: i32,
        grbit: MoveGrbit,
    ) -> JetErr;

    /// `JetSetIndexRange`.
    fn set_index_range(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetIndexRangeGrbit,
    ) -> JetErr;

    /// `JetIntersectIndexes`.
    fn intersect_indexes(
        &self,
        sesid: SessionHandle,
        ranges: &[IndexRange],
        records: &mut RecordList,
        grbit: IntersectIndexesGrbit,
    ) -> JetErr;

    /// `JetSetCurrentIndex`. `None` selects the primary index.
    fn set_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
    ) -> JetErr;

    /// `JetIndexRecordCount`. A `max_records` of zero means no limit.
    fn index_record_count(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        count: &mut u32,
        max_records: u32,
    ) -> JetErr;

    /// `JetGetRecordPosition`.
    fn get_record_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &mut RecordPosition,
    ) -> JetErr;

    /// `JetGotoPosition`.
    fn goto_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &RecordPosition,
    ) -> JetErr;

    // ---- data manipulation ----

    /// `JetRetrieveColumn`.
    #[allow(clippy::too_many_arguments)]
    fn retrieve_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveColumnGrbit,
        info: Option<&mut RetrieveInfo>,
    ) -> JetErr;

    /// `JetSetColumn`.
    ///
    /// `data_size` is authoritative. With `SIZE_LV` and no data it is the
    /// new length of the value.
    #[allow(clippy::too_many_arguments)]
    fn set_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&[u8]>,
        data_size: u32,
        grbit: SetColumnGrbit,
        info: Option<&SetInfo>,
    ) -> JetErr;

    /// `JetDelete`.
    fn delete(&self, sesid: SessionHandle, tableid: TableHandle) -> JetErr;

    /// `JetPrepareUpdate`.
    fn prepare_update(&self, sesid: SessionHandle, tableid: TableHandle, prep: Prep) -> JetErr;

    /// `JetUpdate`. Returns the bookmark of the updated record.
    fn update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> JetErr;

    /// `JetEnumerateColumns`.
    ///
    /// An empty `columnids` enumerates every column holding a value. Column
    /// data longer than a non-zero `max_data_size` is cut to that size.
    fn enumerate_columns(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnids: &[EnumColumnId],
        max_data_size: u32,
        grbit: EnumerateColumnsGrbit,
        columns: &mut Vec<EnumColumn>,
    ) -> JetErr;

    /// `JetGetLock`.
    fn get_lock(&self, sesid: SessionHandle, tableid: TableHandle, grbit: GetLockGrbit) -> JetErr;

    /// `JetEscrowUpdate`.
    #[allow(clippy::too_many_arguments)]
    fn escrow_update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: &[u8],
        previous: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: EscrowUpdateGrbit,
    ) -> JetErr;
}
