//! Owned sessions.

use std::cell::Cell;
use std::marker::PhantomData;

use esent_native::grbit::{
    AttachDatabaseGrbit, CloseDatabaseGrbit, CreateDatabaseGrbit, EndSessionGrbit,
    OpenDatabaseGrbit, OpenTableGrbit, TempTableGrbit,
};
use esent_native::{ColumnDef, ColumnId, DatabaseHandle, SessionHandle};
use tracing::{debug, warn};

use crate::error::InteropResult;
use crate::instance::Instance;
use crate::resource::ResourceState;
use crate::table::Table;
use crate::transaction::Transaction;
use crate::Api;

/// A session on an initialized [`Instance`], ended on drop.
///
/// A session and the cursors opened through it must be used by one thread
/// at a time, so `Session` is `Send` but not `Sync`. Tables and transactions
/// borrow the session and therefore end before it does.
#[derive(Debug)]
pub struct Session<'i> {
    api: Api,
    sesid: SessionHandle,
    state: ResourceState,
    _instance: PhantomData<&'i Instance>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<'i> Session<'i> {
    /// Begins a session on `instance`.
    pub fn new(instance: &'i Instance) -> InteropResult<Self> {
        let api = instance.api().clone();
        let mut state = ResourceState::new("session");
        let sesid = api.begin_session(instance.handle()?, None, None)?;
        state.resource_was_allocated()?;
        debug!(%sesid, instance = instance.name(), "began session");
        Ok(Self {
            api,
            sesid,
            state,
            _instance: PhantomData,
            _not_sync: PhantomData,
        })
    }

    /// The binding the session runs on.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// The native handle.
    pub fn sesid(&self) -> InteropResult<SessionHandle> {
        self.state.check_not_disposed()?;
        Ok(self.sesid)
    }

    /// Ends the session. Later calls do nothing.
    pub fn end(&mut self) -> InteropResult<()> {
        let (api, sesid) = (&self.api, self.sesid);
        self.state.dispose(|state| {
            api.end_session(sesid, EndSessionGrbit::NONE)?;
            debug!(%sesid, "ended session");
            state.resource_was_released()
        })
    }

    /// Creates a database file and opens it exclusively.
    pub fn create_database(
        &self,
        path: &str,
        grbit: CreateDatabaseGrbit,
    ) -> InteropResult<DatabaseHandle> {
        self.api.create_database(self.sesid()?, path, None, grbit)
    }

    /// Attaches an existing database file to the instance.
    pub fn attach_database(&self, path: &str, grbit: AttachDatabaseGrbit) -> InteropResult<()> {
        self.api.attach_database(self.sesid()?, path, grbit)?;
        Ok(())
    }

    /// Opens an attached database for this session.
    pub fn open_database(
        &self,
        path: &str,
        grbit: OpenDatabaseGrbit,
    ) -> InteropResult<DatabaseHandle> {
        self.api.open_database(self.sesid()?, path, None, grbit)
    }

    /// Closes a database opened by this session.
    pub fn close_database(&self, dbid: DatabaseHandle) -> InteropResult<()> {
        self.api
            .close_database(self.sesid()?, dbid, CloseDatabaseGrbit::NONE)?;
        Ok(())
    }

    /// Detaches a database file from the instance.
    pub fn detach_database(&self, path: &str) -> InteropResult<()> {
        self.api.detach_database(self.sesid()?, Some(path))?;
        Ok(())
    }

    /// Opens a cursor on table `name`.
    pub fn open_table(
        &self,
        dbid: DatabaseHandle,
        name: &str,
        grbit: OpenTableGrbit,
    ) -> InteropResult<Table<'_>> {
        Table::open(self, dbid, name, grbit)
    }

    /// Opens a temporary table with one column per definition. The column
    /// ids come back in definition order.
    pub fn open_temp_table(
        &self,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
    ) -> InteropResult<(Table<'_>, Vec<ColumnId>)> {
        Table::open_temp(self, columns, grbit)
    }

    /// Creates table `name` and returns a cursor on it.
    pub fn create_table(&self, dbid: DatabaseHandle, name: &str) -> InteropResult<Table<'_>> {
        Table::create(self, dbid, name)
    }

    /// Names of the user tables in `dbid`.
    pub fn table_names(&self, dbid: DatabaseHandle) -> InteropResult<Vec<String>> {
        self.api.get_table_names(self.sesid()?, dbid)?.collect()
    }

    /// Begins a transaction, rolled back unless committed.
    pub fn begin_transaction(&self) -> InteropResult<Transaction<'_>> {
        Transaction::new(self)
    }

    /// Associates the session with the calling thread's `context`.
    ///
    /// This is the only sanctioned way to hand an open session to another
    /// thread: reset the context on one thread, set it on the other.
    pub fn set_context(&self, context: usize) -> InteropResult<()> {
        self.api.set_session_context(self.sesid()?, context)?;
        Ok(())
    }

    /// Detaches the session from its context.
    pub fn reset_context(&self) -> InteropResult<()> {
        self.api.reset_session_context(self.sesid()?)?;
        Ok(())
    }

    /// Returns the engine version.
    pub fn version(&self) -> InteropResult<u32> {
        self.api.get_version(self.sesid()?)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.end() {
            warn!(%error, sesid = %self.sesid, "failed to end session");
        }
    }
}
