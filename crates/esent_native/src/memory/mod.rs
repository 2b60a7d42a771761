//! In-memory engine.
//!
//! Implements [`JetApi`] with the observable status-code behavior of the real
//! engine. This is useful for:
//! - Unit testing the interop layer on any platform
//! - Exercising error paths that are hard to provoke in the real engine
//!
//! It is not a storage engine: there are no pages, no logging and no
//! durability. All state lives behind a single mutex.

mod cursor;
mod dml;
mod key;
mod schema;
mod session;
mod state;
mod table;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::api::JetApi;
use crate::codes::{err, JetErr};
use crate::grbit::{
    AttachDatabaseGrbit, CloseDatabaseGrbit, CommitTransactionGrbit, CreateDatabaseGrbit,
    CreateIndexGrbit, CreateInstanceGrbit, DupCursorGrbit, EndSessionGrbit, EnumerateColumnsGrbit,
    EscrowUpdateGrbit, GetLockGrbit, IntersectIndexesGrbit, MakeKeyGrbit, MoveGrbit,
    OpenDatabaseGrbit, OpenTableGrbit, ResetTableSequentialGrbit, RetrieveColumnGrbit,
    RetrieveKeyGrbit, RollbackTransactionGrbit, SeekGrbit, SetColumnGrbit, SetIndexRangeGrbit,
    SetTableSequentialGrbit, TempTableGrbit, TermGrbit,
};
use crate::handles::{ColumnId, DatabaseHandle, InstanceHandle, SessionHandle, TableHandle};
use crate::types::{
    ColumnDef, ColumnList, EnumColumn, EnumColumnId, IndexList, IndexRange, ObjectList, ParamId,
    Prep, RecordList, RecordPosition, RetrieveInfo, SetInfo,
};
use state::{EngineState, Status};

/// An engine that keeps every database in memory.
///
/// Database files are keyed by path and survive instance termination for the
/// lifetime of the engine value, so a database can be created by one instance
/// and attached by the next.
///
/// # Example
///
/// ```rust
/// use esent_native::{err, InMemoryEngine, InstanceHandle, JetApi, SessionHandle};
///
/// let engine = InMemoryEngine::new();
/// let mut instance = InstanceHandle::NIL;
/// engine.create_instance(&mut instance, "demo");
/// engine.init(&mut instance);
///
/// let mut sesid = SessionHandle::NIL;
/// assert_eq!(engine.begin_session(instance, &mut sesid, None, None), err::SUCCESS);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    state: Mutex<EngineState>,
}

impl InMemoryEngine {
    /// Creates an engine with no instances and no databases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a database file exists at `path`.
    #[must_use]
    pub fn database_exists(&self, path: &str) -> bool {
        self.state.lock().files.contains_key(path)
    }

    /// Number of open cursors, including those on temporary tables.
    #[must_use]
    pub fn open_cursor_count(&self) -> usize {
        self.state.lock().cursors.len()
    }

    /// Number of active sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    fn run(&self, call: &'static str, f: impl FnOnce(&mut EngineState) -> Status) -> JetErr {
        let status = f(&mut self.state.lock());
        match status {
            Ok(code) => code,
            Err(code) => {
                trace!(call, code, "engine call failed");
                code
            }
        }
    }
}

impl JetApi for InMemoryEngine {
    fn create_instance(&self, instance: &mut InstanceHandle, name: &str) -> JetErr {
        debug!(name, "creating in-memory instance");
        self.run("create_instance", |s| s.create_instance(instance, name))
    }

    fn create_instance2(
        &self,
        instance: &mut InstanceHandle,
        name: &str,
        _display_name: &str,
        _grbit: CreateInstanceGrbit,
    ) -> JetErr {
        self.create_instance(instance, name)
    }

    fn init(&self, instance: &mut InstanceHandle) -> JetErr {
        let handle = *instance;
        self.run("init", |s| s.init(handle))
    }

    fn term(&self, instance: InstanceHandle, _grbit: TermGrbit) -> JetErr {
        debug!(%instance, "terminating in-memory instance");
        self.run("term", |s| s.term(instance))
    }

    fn set_system_parameter(
        &self,
        instance: InstanceHandle,
        _sesid: SessionHandle,
        paramid: ParamId,
        value: usize,
        string: Option<&str>,
    ) -> JetErr {
        self.run("set_system_parameter", |s| {
            s.set_system_parameter(instance, paramid, value, string)
        })
    }

    fn get_system_parameter(
        &self,
        instance: InstanceHandle,
        _sesid: SessionHandle,
        paramid: ParamId,
        value: &mut usize,
        string: &mut String,
        max_size: u32,
    ) -> JetErr {
        self.run("get_system_parameter", |s| {
            s.get_system_parameter(instance, paramid, value, string, max_size)
        })
    }

    fn get_version(&self, sesid: SessionHandle, version: &mut u32) -> JetErr {
        self.run("get_version", |s| {
            s.session(sesid)?;
            *version = session::ENGINE_VERSION;
            Ok(err::SUCCESS)
        })
    }

    fn create_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        _connect: Option<&str>,
        dbid: &mut DatabaseHandle,
        grbit: CreateDatabaseGrbit,
    ) -> JetErr {
        self.run("create_database", |s| s.create_database(sesid, database, dbid, grbit))
    }

    fn attach_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        grbit: AttachDatabaseGrbit,
    ) -> JetErr {
        self.run("attach_database", |s| s.attach_database(sesid, database, grbit))
    }

    fn open_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        _connect: Option<&str>,
        dbid: &mut DatabaseHandle,
        _grbit: OpenDatabaseGrbit,
    ) -> JetErr {
        self.run("open_database", |s| s.open_database(sesid, database, dbid))
    }

    fn close_database(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        _grbit: CloseDatabaseGrbit,
    ) -> JetErr {
        self.run("close_database", |s| s.close_database(sesid, dbid))
    }

    fn detach_database(&self, sesid: SessionHandle, database: Option<&str>) -> JetErr {
        self.run("detach_database", |s| s.detach_database(sesid, database))
    }

    fn begin_session(
        &self,
        instance: InstanceHandle,
        sesid: &mut SessionHandle,
        _username: Option<&str>,
        _password: Option<&str>,
    ) -> JetErr {
        self.run("begin_session", |s| s.begin_session(instance, sesid))
    }

    fn dup_session(&self, sesid: SessionHandle, new_sesid: &mut SessionHandle) -> JetErr {
        self.run("dup_session", |s| s.dup_session(sesid, new_sesid))
    }

    fn end_session(&self, sesid: SessionHandle, _grbit: EndSessionGrbit) -> JetErr {
        self.run("end_session", |s| s.end_session(sesid))
    }

    fn set_session_context(&self, sesid: SessionHandle, context: usize) -> JetErr {
        self.run("set_session_context", |s| s.set_session_context(sesid, context))
    }

    fn reset_session_context(&self, sesid: SessionHandle) -> JetErr {
        self.run("reset_session_context", |s| s.reset_session_context(sesid))
    }

    fn open_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        _parameters: Option<&[u8]>,
        _grbit: OpenTableGrbit,
        tableid: &mut TableHandle,
    ) -> JetErr {
        self.run("open_table", |s| s.open_table(sesid, dbid, name, tableid))
    }

    fn close_table(&self, sesid: SessionHandle, tableid: TableHandle) -> JetErr {
        self.run("close_table", |s| s.close_table(sesid, tableid))
    }

    fn dup_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        new_tableid: &mut TableHandle,
        _grbit: DupCursorGrbit,
    ) -> JetErr {
        self.run("dup_cursor", |s| s.dup_cursor(sesid, tableid, new_tableid))
    }

    fn open_temp_table(
        &self,
        sesid: SessionHandle,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
        tableid: &mut TableHandle,
        columnids: &mut [ColumnId],
    ) -> JetErr {
        self.run("open_temp_table", |s| {
            s.open_temp_table(sesid, columns, grbit, tableid, columnids)
        })
    }

    fn set_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        _grbit: SetTableSequentialGrbit,
    ) -> JetErr {
        self.run("set_table_sequential", |s| s.set_table_sequential(sesid, tableid))
    }

    fn reset_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        _grbit: ResetTableSequentialGrbit,
    ) -> JetErr {
        self.run("reset_table_sequential", |s| s.reset_table_sequential(sesid, tableid))
    }

    fn begin_transaction(&self, sesid: SessionHandle) -> JetErr {
        self.run("begin_transaction", |s| s.begin_transaction(sesid))
    }

    fn commit_transaction(&self, sesid: SessionHandle, _grbit: CommitTransactionGrbit) -> JetErr {
        self.run("commit_transaction", |s| s.commit_transaction(sesid))
    }

    fn rollback(&self, sesid: SessionHandle, grbit: RollbackTransactionGrbit) -> JetErr {
        self.run("rollback", |s| s.rollback(sesid, grbit))
    }

    fn create_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        _pages: u32,
        _density: u32,
        tableid: &mut TableHandle,
    ) -> JetErr {
        self.run("create_table", |s| s.create_table(sesid, dbid, name, tableid))
    }

    fn delete_table(&self, sesid: SessionHandle, dbid: DatabaseHandle, name: &str) -> JetErr {
        self.run("delete_table", |s| s.delete_table(sesid, dbid, name))
    }

    fn add_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
        columnid: &mut ColumnId,
    ) -> JetErr {
        self.run("add_column", |s| {
            s.add_column(sesid, tableid, name, definition, default, columnid)
        })
    }

    fn delete_column(&self, sesid: SessionHandle, tableid: TableHandle, name: &str) -> JetErr {
        self.run("delete_column", |s| s.delete_column(sesid, tableid, name))
    }

    fn create_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
        _density: u32,
    ) -> JetErr {
        self.run("create_index", |s| s.create_index(sesid, tableid, name, grbit, key))
    }

    fn delete_index(&self, sesid: SessionHandle, tableid: TableHandle, name: &str) -> JetErr {
        self.run("delete_index", |s| s.delete_index(sesid, tableid, name))
    }

    fn get_table_column_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> JetErr {
        self.run("get_table_column_info", |s| {
            s.get_table_column_info(sesid, tableid, column, list)
        })
    }

    fn get_table_column_def(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: &str,
        definition: &mut ColumnDef,
    ) -> JetErr {
        self.run("get_table_column_def", |s| {
            s.get_table_column_def(sesid, tableid, column, definition)
        })
    }

    fn get_column_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> JetErr {
        self.run("get_column_info", |s| s.get_column_info(sesid, dbid, table, column, list))
    }

    fn get_object_info_list(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        list: &mut ObjectList,
    ) -> JetErr {
        self.run("get_object_info_list", |s| s.get_object_info_list(sesid, dbid, list))
    }

    fn get_index_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> JetErr {
        self.run("get_index_info", |s| s.get_index_info(sesid, dbid, table, index, list))
    }

    fn get_table_index_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> JetErr {
        self.run("get_table_index_info", |s| {
            s.get_table_index_info(sesid, tableid, index, list)
        })
    }

    fn get_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &mut String,
        max_size: u32,
    ) -> JetErr {
        self.run("get_current_index", |s| s.get_current_index(sesid, tableid, name, max_size))
    }

    fn get_bookmark(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> JetErr {
        self.run("get_bookmark", |s| s.get_bookmark(sesid, tableid, bookmark, actual_size))
    }

    fn goto_bookmark(&self, sesid: SessionHandle, tableid: TableHandle, bookmark: &[u8]) -> JetErr {
        self.run("goto_bookmark", |s| s.goto_bookmark(sesid, tableid, bookmark))
    }

    fn make_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        data: Option<&[u8]>,
        grbit: MakeKeyGrbit,
    ) -> JetErr {
        self.run("make_key", |s| s.make_key(sesid, tableid, data, grbit))
    }

    fn retrieve_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        key: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveKeyGrbit,
    ) -> JetErr {
        self.run("retrieve_key", |s| s.retrieve_key(sesid, tableid, key, actual_size, grbit))
    }

    fn seek(&self, sesid: SessionHandle, tableid: TableHandle, grbit: SeekGrbit) -> JetErr {
        self.run("seek", |s| s.seek(sesid, tableid, grbit))
    }

    fn move_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        rows: i32,
        grbit: MoveGrbit,
    ) -> JetErr {
        self.run("move", |s| s.move_cursor(sesid, tableid, rows, grbit))
    }

    fn set_index_range(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetIndexRangeGrbit,
    ) -> JetErr {
        self.run("set_index_range", |s| s.set_index_range(sesid, tableid, grbit))
    }

    fn intersect_indexes(
        &self,
        sesid: SessionHandle,
        ranges: &[IndexRange],
        records: &mut RecordList,
        _grbit: IntersectIndexesGrbit,
    ) -> JetErr {
        self.run("intersect_indexes", |s| s.intersect_indexes(sesid, ranges, records))
    }

    fn set_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
    ) -> JetErr {
        self.run("set_current_index", |s| s.set_current_index(sesid, tableid, index))
    }

    fn index_record_count(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        count: &mut u32,
        max_records: u32,
    ) -> JetErr {
        self.run("index_record_count", |s| {
            s.index_record_count(sesid, tableid, count, max_records)
        })
    }

    fn get_record_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &mut RecordPosition,
    ) -> JetErr {
        self.run("get_record_position", |s| s.get_record_position(sesid, tableid, position))
    }

    fn goto_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &RecordPosition,
    ) -> JetErr {
        self.run("goto_position", |s| s.goto_position(sesid, tableid, position))
    }

    fn enumerate_columns(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnids: &[EnumColumnId],
        max_data_size: u32,
        grbit: EnumerateColumnsGrbit,
        columns: &mut Vec<EnumColumn>,
    ) -> JetErr {
        self.run("enumerate_columns", |s| {
            s.enumerate_columns(sesid, tableid, columnids, max_data_size, grbit, columns)
        })
    }

    fn retrieve_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveColumnGrbit,
        info: Option<&mut RetrieveInfo>,
    ) -> JetErr {
        self.run("retrieve_column", |s| {
            s.retrieve_column(sesid, tableid, columnid, data, actual_size, grbit, info)
        })
    }

    fn set_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&[u8]>,
        data_size: u32,
        grbit: SetColumnGrbit,
        info: Option<&SetInfo>,
    ) -> JetErr {
        self.run("set_column", |s| {
            s.set_column(sesid, tableid, columnid, data, data_size, grbit, info)
        })
    }

    fn delete(&self, sesid: SessionHandle, tableid: TableHandle) -> JetErr {
        self.run("delete", |s| s.delete(sesid, tableid))
    }

    fn prepare_update(&self, sesid: SessionHandle, tableid: TableHandle, prep: Prep) -> JetErr {
        self.run("prepare_update", |s| s.prepare_update(sesid, tableid, prep))
    }

    fn update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> JetErr {
        self.run("update", |s| s.update(sesid, tableid, bookmark, actual_size))
    }

    fn get_lock(&self, sesid: SessionHandle, tableid: TableHandle, grbit: GetLockGrbit) -> JetErr {
        self.run("get_lock", |s| s.get_lock(sesid, tableid, grbit))
    }

    fn escrow_update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: &[u8],
        previous: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: EscrowUpdateGrbit,
    ) -> JetErr {
        self.run("escrow_update", |s| {
            s.escrow_update(sesid, tableid, columnid, delta, previous, actual_size, grbit)
        })
    }
}
