//! Owned table cursors.

use std::marker::PhantomData;

use esent_native::grbit::{
    CreateIndexGrbit, EnumerateColumnsGrbit, MakeKeyGrbit, OpenTableGrbit,
    ResetTableSequentialGrbit, RetrieveColumnGrbit, SeekGrbit, SetTableSequentialGrbit,
    TempTableGrbit,
};
use esent_native::{
    CodePage, ColumnDef, ColumnId, DatabaseHandle, EnumColumn, EnumColumnId, Prep, SessionHandle,
    TableHandle,
};
use tracing::{debug, warn};

use crate::error::InteropResult;
use crate::metadata::{ColumnDictionary, ColumnInfo, IndexInfo};
use crate::navigation::Bookmark;
use crate::resource::ResourceState;
use crate::session::Session;
use crate::stream::ColumnStream;
use crate::update::Update;
use crate::value::FixedColumn;
use crate::Api;

/// Initial page count of tables created through [`Table::create`].
const INITIAL_PAGES: u32 = 0;

/// Page density of tables created through [`Table::create`].
const DENSITY: u32 = 100;

/// Name reported by cursors on temporary tables.
const TEMP_TABLE_NAME: &str = "<temporary>";

/// A cursor on a table, closed on drop.
///
/// A cursor stays on the thread of the session it was opened from, so
/// `Table` is neither `Send` nor `Sync`:
///
/// ```compile_fail
/// use esent_interop::{Api, Instance, Session};
/// use esent_native::grbit::CreateDatabaseGrbit;
///
/// let api = Api::in_memory();
/// let mut instance = Instance::new(&api, "threads").unwrap();
/// instance.init().unwrap();
/// let session = Session::new(&instance).unwrap();
/// let dbid = session
///     .create_database("threads.edb", CreateDatabaseGrbit::NONE)
///     .unwrap();
/// let table = session.create_table(dbid, "cursor").unwrap();
/// std::thread::scope(|scope| {
///     scope.spawn(move || table.try_move_first());
/// });
/// ```
#[derive(Debug)]
pub struct Table<'s> {
    api: Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    name: String,
    state: ResourceState,
    _session: PhantomData<&'s ()>,
    _not_send: PhantomData<*const ()>,
}

impl<'s> Table<'s> {
    /// Opens a cursor on table `name`.
    pub fn open(
        session: &'s Session<'_>,
        dbid: DatabaseHandle,
        name: &str,
        grbit: OpenTableGrbit,
    ) -> InteropResult<Self> {
        let sesid = session.sesid()?;
        let tableid = session.api().open_table(sesid, dbid, name, None, grbit)?;
        Self::allocated(session.api(), sesid, tableid, name)
    }

    /// Creates table `name` and opens a cursor on it.
    pub fn create(
        session: &'s Session<'_>,
        dbid: DatabaseHandle,
        name: &str,
    ) -> InteropResult<Self> {
        let sesid = session.sesid()?;
        let tableid = session
            .api()
            .create_table(sesid, dbid, name, INITIAL_PAGES, DENSITY)?;
        Self::allocated(session.api(), sesid, tableid, name)
    }

    /// Opens a temporary table. It is dropped by the engine when the cursor
    /// closes.
    pub fn open_temp(
        session: &'s Session<'_>,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
    ) -> InteropResult<(Self, Vec<ColumnId>)> {
        let sesid = session.sesid()?;
        let (tableid, columnids) = session.api().open_temp_table(sesid, columns, grbit)?;
        let table = Self::allocated(session.api(), sesid, tableid, TEMP_TABLE_NAME)?;
        Ok((table, columnids))
    }

    fn allocated(
        api: &Api,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
    ) -> InteropResult<Self> {
        let mut state = ResourceState::new("table");
        state.resource_was_allocated()?;
        debug!(%sesid, %tableid, table = name, "opened table");
        Ok(Self {
            api: api.clone(),
            sesid,
            tableid,
            name: name.to_string(),
            state,
            _session: PhantomData,
            _not_send: PhantomData,
        })
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The binding the cursor runs on.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The owning session's handle.
    #[must_use]
    pub fn sesid(&self) -> SessionHandle {
        self.sesid
    }

    /// The native cursor handle.
    pub fn tableid(&self) -> InteropResult<TableHandle> {
        self.state.check_not_disposed()?;
        Ok(self.tableid)
    }

    /// Closes the cursor. Later calls do nothing.
    pub fn close(&mut self) -> InteropResult<()> {
        let (api, sesid, tableid) = (&self.api, self.sesid, self.tableid);
        self.state.dispose(|state| {
            api.close_table(sesid, tableid)?;
            debug!(%sesid, %tableid, "closed table");
            state.resource_was_released()
        })
    }

    /// Adds a column, returning its id.
    pub fn add_column(
        &self,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
    ) -> InteropResult<ColumnId> {
        self.api
            .add_column(self.sesid, self.tableid()?, name, definition, default)
    }

    /// Creates an index; see [`Api::create_index`] for the key format.
    pub fn create_index(
        &self,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
    ) -> InteropResult<()> {
        self.api
            .create_index(self.sesid, self.tableid()?, name, grbit, key, DENSITY)?;
        Ok(())
    }

    /// Switches the cursor to index `name`, or to the primary index.
    pub fn set_current_index(&self, name: Option<&str>) -> InteropResult<()> {
        self.api.set_current_index(self.sesid, self.tableid()?, name)?;
        Ok(())
    }

    /// Columns of the table.
    pub fn columns(&self) -> InteropResult<Vec<ColumnInfo>> {
        self.api.get_table_columns(self.sesid, self.tableid()?)?.collect()
    }

    /// Indexes of the table.
    pub fn indexes(&self) -> InteropResult<Vec<IndexInfo>> {
        self.api.get_table_indexes(self.sesid, self.tableid()?)?.collect()
    }

    /// Case-insensitive map of the table's column names.
    pub fn column_dictionary(&self) -> InteropResult<ColumnDictionary> {
        self.api.get_column_dictionary(self.sesid, self.tableid()?)
    }

    /// Moves to the first record; `false` if there is none.
    pub fn try_move_first(&self) -> InteropResult<bool> {
        self.api.try_move_first(self.sesid, self.tableid()?)
    }

    /// Moves to the last record; `false` if there is none.
    pub fn try_move_last(&self) -> InteropResult<bool> {
        self.api.try_move_last(self.sesid, self.tableid()?)
    }

    /// Moves to the next record; `false` past the end.
    pub fn try_move_next(&self) -> InteropResult<bool> {
        self.api.try_move_next(self.sesid, self.tableid()?)
    }

    /// Moves to the previous record; `false` before the start.
    pub fn try_move_previous(&self) -> InteropResult<bool> {
        self.api.try_move_previous(self.sesid, self.tableid()?)
    }

    /// Positions the cursor before the first record.
    pub fn move_before_first(&self) -> InteropResult<()> {
        self.api.move_before_first(self.sesid, self.tableid()?)
    }

    /// Seeks for a fixed-width key on the current index.
    pub fn try_seek_value<T: FixedColumn>(&self, key: T, grbit: SeekGrbit) -> InteropResult<bool> {
        let tableid = self.tableid()?;
        self.api
            .make_key_value(self.sesid, tableid, key, MakeKeyGrbit::NEW_KEY)?;
        self.api.try_seek(self.sesid, tableid, grbit)
    }

    /// Hints that the cursor is about to scan the table in `grbit`'s
    /// direction.
    pub fn set_sequential(&self, grbit: SetTableSequentialGrbit) -> InteropResult<()> {
        self.api.set_table_sequential(self.sesid, self.tableid()?, grbit)?;
        Ok(())
    }

    /// Ends a scan started with [`Table::set_sequential`].
    pub fn reset_sequential(&self) -> InteropResult<()> {
        self.api
            .reset_table_sequential(self.sesid, self.tableid()?, ResetTableSequentialGrbit::NONE)?;
        Ok(())
    }

    /// Every value of the current record; see [`Api::enumerate_columns`].
    pub fn enumerate_columns(
        &self,
        columnids: &[EnumColumnId],
        grbit: EnumerateColumnsGrbit,
    ) -> InteropResult<Vec<EnumColumn>> {
        self.api
            .enumerate_columns(self.sesid, self.tableid()?, columnids, 0, grbit)
    }

    /// Bookmark of the current record.
    pub fn bookmark(&self) -> InteropResult<Bookmark> {
        self.api.get_bookmark_value(self.sesid, self.tableid()?)
    }

    /// Positions the cursor on the record identified by `bookmark`.
    pub fn goto_bookmark(&self, bookmark: &Bookmark) -> InteropResult<()> {
        self.api
            .goto_bookmark(self.sesid, self.tableid()?, bookmark.as_bytes())?;
        Ok(())
    }

    /// Reads a fixed-width column of the current record.
    pub fn retrieve<T: FixedColumn>(&self, columnid: ColumnId) -> InteropResult<Option<T>> {
        self.api
            .retrieve_column_as(self.sesid, self.tableid()?, columnid, RetrieveColumnGrbit::NONE)
    }

    /// Reads a column of the current record as bytes.
    pub fn retrieve_bytes(&self, columnid: ColumnId) -> InteropResult<Option<Vec<u8>>> {
        self.api.retrieve_column_bytes(
            self.sesid,
            self.tableid()?,
            columnid,
            RetrieveColumnGrbit::NONE,
            None,
        )
    }

    /// Reads a text column of the current record.
    pub fn retrieve_string(
        &self,
        columnid: ColumnId,
        code_page: CodePage,
    ) -> InteropResult<Option<String>> {
        self.api.retrieve_column_string(
            self.sesid,
            self.tableid()?,
            columnid,
            code_page,
            RetrieveColumnGrbit::NONE,
        )
    }

    /// Adds `delta` to an escrow column of the current record, returning the
    /// previous value. Requires a transaction.
    pub fn escrow_add(&self, columnid: ColumnId, delta: i32) -> InteropResult<i32> {
        self.api.escrow_add(self.sesid, self.tableid()?, columnid, delta)
    }

    /// Deletes the current record.
    pub fn delete(&self) -> InteropResult<()> {
        self.api.delete(self.sesid, self.tableid()?)?;
        Ok(())
    }

    /// Prepares an update of kind `prep`, cancelled unless saved.
    pub fn update(&self, prep: Prep) -> InteropResult<Update<'_>> {
        Update::new(self, prep)
    }

    /// A `Read + Write + Seek` view of a long column of the current record.
    pub fn column_stream(&self, columnid: ColumnId) -> InteropResult<ColumnStream<'_>> {
        Ok(ColumnStream::new(&self.api, self.sesid, self.tableid()?, columnid))
    }
}

impl Drop for Table<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(%error, tableid = %self.tableid, "failed to close table");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;
    use crate::error::InteropError;
    use crate::instance::Instance;
    use esent_native::grbit::{ColumndefGrbit, CreateDatabaseGrbit};
    use esent_native::ColumnType;

    fn with_table(test: impl FnOnce(&Table<'_>, ColumnId, ColumnId)) {
        let api = Api::in_memory();
        let mut instance = Instance::new(&api, "table").unwrap();
        instance.init().unwrap();
        let session = Session::new(&instance).unwrap();
        let dbid = session
            .create_database("table.edb", CreateDatabaseGrbit::NONE)
            .unwrap();
        let table = session.create_table(dbid, "people").unwrap();
        let id = table
            .add_column("id", &ColumnDef { coltyp: ColumnType::Long, ..ColumnDef::default() }, None)
            .unwrap();
        let name = table
            .add_column(
                "name",
                &ColumnDef {
                    coltyp: ColumnType::LongText,
                    cp: CodePage::UNICODE,
                    grbit: ColumndefGrbit::NONE,
                    ..ColumnDef::default()
                },
                None,
            )
            .unwrap();
        table
            .create_index("primary", CreateIndexGrbit::INDEX_PRIMARY, "+id\0\0")
            .unwrap();
        test(&table, id, name);
    }

    fn insert(table: &Table<'_>, id: ColumnId, name: ColumnId, key: i32, text: &str) -> Bookmark {
        let mut update = table.update(Prep::Insert).unwrap();
        update.set_value(id, key).unwrap();
        update.set_string(name, text, CodePage::UNICODE).unwrap();
        update.save().unwrap()
    }

    #[test]
    fn insert_and_read_back() {
        with_table(|table, id, name| {
            insert(table, id, name, 2, "bob");
            insert(table, id, name, 1, "alice");
            assert!(table.try_seek_value(2i32, SeekGrbit::SEEK_EQ).unwrap());
            assert_eq!(
                table.retrieve_string(name, CodePage::UNICODE).unwrap().as_deref(),
                Some("bob")
            );
            assert!(table.try_move_first().unwrap());
            assert_eq!(table.retrieve::<i32>(id).unwrap(), Some(1));
            assert!(!table.try_seek_value(3i32, SeekGrbit::SEEK_EQ).unwrap());
        });
    }

    #[test]
    fn saved_bookmark_finds_the_record() {
        with_table(|table, id, name| {
            let carol = insert(table, id, name, 5, "carol");
            insert(table, id, name, 6, "dave");
            table.try_move_last().unwrap();
            table.goto_bookmark(&carol).unwrap();
            assert_eq!(table.retrieve::<i32>(id).unwrap(), Some(5));
        });
    }

    #[test]
    fn metadata_through_the_cursor() {
        with_table(|table, _, _| {
            let columns = table.columns().unwrap();
            assert_eq!(columns.len(), 2);
            assert_eq!(table.indexes().unwrap()[0].name, "primary");
            assert!(table.column_dictionary().unwrap().contains("NAME"));
        });
    }

    #[test]
    fn stream_on_current_record() {
        with_table(|table, id, name| {
            let mut update = table.update(Prep::Insert).unwrap();
            update.set_value(id, 1i32).unwrap();
            update.column_stream(name).unwrap().write_all(b"streamed").unwrap();
            update.save().unwrap();

            table.try_move_first().unwrap();
            let mut text = Vec::new();
            table.column_stream(name).unwrap().read_to_end(&mut text).unwrap();
            assert_eq!(text, b"streamed");
        });
    }

    #[test]
    fn close_is_idempotent() {
        let api = Api::in_memory();
        let mut instance = Instance::new(&api, "close").unwrap();
        instance.init().unwrap();
        let session = Session::new(&instance).unwrap();
        let dbid = session
            .create_database("close.edb", CreateDatabaseGrbit::NONE)
            .unwrap();
        let mut table = session.create_table(dbid, "t").unwrap();
        let tableid = table.tableid().unwrap();
        table.close().unwrap();
        table.close().unwrap();
        assert!(matches!(table.tableid(), Err(InteropError::ObjectDisposed { .. })));
        assert!(matches!(table.try_move_first(), Err(InteropError::ObjectDisposed { .. })));
        let sesid = session.sesid().unwrap();
        assert!(
            api.close_table(sesid, tableid).unwrap_err().is(esent_native::err::INVALID_TABLE_ID)
        );
    }

    #[test]
    fn enumerate_columns_returns_each_stored_value() {
        with_table(|table, id, name| {
            insert(table, id, name, 3, "ab");
            table.set_sequential(SetTableSequentialGrbit::PREREAD_FORWARD).unwrap();
            assert!(table.try_move_first().unwrap());
            let columns = table
                .enumerate_columns(&[], EnumerateColumnsGrbit::NONE)
                .unwrap();
            table.reset_sequential().unwrap();

            let ids: Vec<ColumnId> = columns.iter().map(|c| c.columnid).collect();
            assert_eq!(ids, vec![id, name]);
            assert_eq!(columns[0].values[0].data, 3i32.to_le_bytes());
            assert_eq!(columns[1].values[0].data, [b'a', 0, b'b', 0]);
        });
    }

    #[test]
    fn enumerate_columns_without_a_record_fails() {
        with_table(|table, _, _| {
            let error = table
                .enumerate_columns(&[], EnumerateColumnsGrbit::NONE)
                .unwrap_err();
            assert!(error.is(esent_native::err::NO_CURRENT_RECORD));
        });
    }
}
