//! Instances, system parameters, databases, sessions, tables and transactions.

use esent_native::grbit::{
    AttachDatabaseGrbit, CloseDatabaseGrbit, CommitTransactionGrbit, CreateDatabaseGrbit,
    CreateInstanceGrbit, DupCursorGrbit, EndSessionGrbit, OpenDatabaseGrbit, OpenTableGrbit,
    ResetTableSequentialGrbit, RollbackTransactionGrbit, SetTableSequentialGrbit, TempTableGrbit,
    TermGrbit,
};
use esent_native::{
    ColumnDef, ColumnId, DatabaseHandle, InstanceHandle, ParamId, SessionHandle, TableHandle,
};

use super::Api;
use crate::error::{InteropError, InteropResult};
use crate::status::JetWarning;

impl Api {
    /// Allocates a new instance.
    pub fn create_instance(&self, name: &str) -> InteropResult<InstanceHandle> {
        let mut instance = InstanceHandle::NIL;
        self.check(self.engine().create_instance(&mut instance, name))?;
        Ok(instance)
    }

    /// Allocates a new instance with a display name.
    pub fn create_instance2(
        &self,
        name: &str,
        display_name: &str,
        grbit: CreateInstanceGrbit,
    ) -> InteropResult<InstanceHandle> {
        let mut instance = InstanceHandle::NIL;
        self.check(
            self.engine()
                .create_instance2(&mut instance, name, display_name, grbit),
        )?;
        Ok(instance)
    }

    /// Initializes an instance.
    pub fn init(&self, instance: &mut InstanceHandle) -> InteropResult<JetWarning> {
        self.check(self.engine().init(instance))
    }

    /// Shuts an instance down.
    pub fn term(&self, instance: InstanceHandle, grbit: TermGrbit) -> InteropResult<JetWarning> {
        self.check(self.engine().term(instance, grbit))
    }

    /// Sets a system parameter. A nil instance sets the process default.
    pub fn set_system_parameter(
        &self,
        instance: InstanceHandle,
        sesid: SessionHandle,
        paramid: ParamId,
        value: usize,
        string: Option<&str>,
    ) -> InteropResult<JetWarning> {
        self.check(
            self.engine()
                .set_system_parameter(instance, sesid, paramid, value, string),
        )
    }

    /// Reads a system parameter as its integer and string forms.
    pub fn get_system_parameter(
        &self,
        instance: InstanceHandle,
        sesid: SessionHandle,
        paramid: ParamId,
        max_size: usize,
    ) -> InteropResult<(usize, String)> {
        let max = super::native_size(max_size)?;
        let mut value = 0;
        let mut string = String::new();
        self.check(self.engine().get_system_parameter(
            instance,
            sesid,
            paramid,
            &mut value,
            &mut string,
            max,
        ))?;
        Ok((value, string))
    }

    /// Returns the engine version.
    pub fn get_version(&self, sesid: SessionHandle) -> InteropResult<u32> {
        let mut version = 0;
        self.check(self.engine().get_version(sesid, &mut version))?;
        Ok(version)
    }

    /// Creates a database, attaches it and opens it.
    pub fn create_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        connect: Option<&str>,
        grbit: CreateDatabaseGrbit,
    ) -> InteropResult<DatabaseHandle> {
        require_name(database, "database")?;
        let mut dbid = DatabaseHandle::NIL;
        self.check(
            self.engine()
                .create_database(sesid, database, connect, &mut dbid, grbit),
        )?;
        Ok(dbid)
    }

    /// Attaches a database file to the instance.
    ///
    /// Returns `JET_wrnDatabaseAttached` if it already was.
    pub fn attach_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        grbit: AttachDatabaseGrbit,
    ) -> InteropResult<JetWarning> {
        require_name(database, "database")?;
        self.check(self.engine().attach_database(sesid, database, grbit))
    }

    /// Opens an attached database in the session.
    pub fn open_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        connect: Option<&str>,
        grbit: OpenDatabaseGrbit,
    ) -> InteropResult<DatabaseHandle> {
        require_name(database, "database")?;
        let mut dbid = DatabaseHandle::NIL;
        self.check(
            self.engine()
                .open_database(sesid, database, connect, &mut dbid, grbit),
        )?;
        Ok(dbid)
    }

    /// Closes a database opened in the session.
    pub fn close_database(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        grbit: CloseDatabaseGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().close_database(sesid, dbid, grbit))
    }

    /// Detaches a database, or every attached database for `None`.
    pub fn detach_database(
        &self,
        sesid: SessionHandle,
        database: Option<&str>,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().detach_database(sesid, database))
    }

    /// Starts a session.
    pub fn begin_session(
        &self,
        instance: InstanceHandle,
        username: Option<&str>,
        password: Option<&str>,
    ) -> InteropResult<SessionHandle> {
        let mut sesid = SessionHandle::NIL;
        self.check(
            self.engine()
                .begin_session(instance, &mut sesid, username, password),
        )?;
        Ok(sesid)
    }

    /// Starts a session on the same instance as `sesid`.
    pub fn dup_session(&self, sesid: SessionHandle) -> InteropResult<SessionHandle> {
        let mut new_sesid = SessionHandle::NIL;
        self.check(self.engine().dup_session(sesid, &mut new_sesid))?;
        Ok(new_sesid)
    }

    /// Ends a session, rolling back any open transaction.
    pub fn end_session(
        &self,
        sesid: SessionHandle,
        grbit: EndSessionGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().end_session(sesid, grbit))
    }

    /// Attaches a session to the calling thread under `context`.
    pub fn set_session_context(
        &self,
        sesid: SessionHandle,
        context: usize,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().set_session_context(sesid, context))
    }

    /// Detaches a session from the calling thread.
    pub fn reset_session_context(&self, sesid: SessionHandle) -> InteropResult<JetWarning> {
        self.check(self.engine().reset_session_context(sesid))
    }

    /// Opens a cursor on a table.
    pub fn open_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        parameters: Option<&[u8]>,
        grbit: OpenTableGrbit,
    ) -> InteropResult<TableHandle> {
        require_name(name, "table")?;
        let mut tableid = TableHandle::NIL;
        self.check(
            self.engine()
                .open_table(sesid, dbid, name, parameters, grbit, &mut tableid),
        )?;
        Ok(tableid)
    }

    /// Closes a cursor.
    pub fn close_table(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().close_table(sesid, tableid))
    }

    /// Opens a second, independent cursor on the same table.
    pub fn dup_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: DupCursorGrbit,
    ) -> InteropResult<TableHandle> {
        let mut new_tableid = TableHandle::NIL;
        self.check(
            self.engine()
                .dup_cursor(sesid, tableid, &mut new_tableid, grbit),
        )?;
        Ok(new_tableid)
    }

    /// Opens a temporary table with one column per definition, returning the
    /// cursor and the column ids in definition order.
    ///
    /// Columns flagged `JET_bitColumnTTKey` form the key, in the order given.
    pub fn open_temp_table(
        &self,
        sesid: SessionHandle,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
    ) -> InteropResult<(TableHandle, Vec<ColumnId>)> {
        if columns.is_empty() {
            return Err(InteropError::invalid_argument("temporary table has no columns"));
        }
        let mut tableid = TableHandle::NIL;
        let mut columnids = vec![ColumnId::NIL; columns.len()];
        self.check(
            self.engine()
                .open_temp_table(sesid, columns, grbit, &mut tableid, &mut columnids),
        )?;
        Ok((tableid, columnids))
    }

    /// Tells the engine the cursor is about to scan the table.
    pub fn set_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetTableSequentialGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().set_table_sequential(sesid, tableid, grbit))
    }

    /// Ends a scan started with [`Api::set_table_sequential`].
    pub fn reset_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: ResetTableSequentialGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().reset_table_sequential(sesid, tableid, grbit))
    }

    /// Begins a (possibly nested) transaction.
    pub fn begin_transaction(&self, sesid: SessionHandle) -> InteropResult<JetWarning> {
        self.check(self.engine().begin_transaction(sesid))
    }

    /// Commits the innermost transaction.
    pub fn commit_transaction(
        &self,
        sesid: SessionHandle,
        grbit: CommitTransactionGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().commit_transaction(sesid, grbit))
    }

    /// Rolls back the innermost transaction, or all of them.
    pub fn rollback(
        &self,
        sesid: SessionHandle,
        grbit: RollbackTransactionGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().rollback(sesid, grbit))
    }
}

pub(super) fn require_name(name: &str, what: &str) -> InteropResult<()> {
    if name.is_empty() {
        return Err(InteropError::invalid_argument(format!("{what} name is empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use esent_native::err;

    fn session(api: &Api) -> (InstanceHandle, SessionHandle) {
        let mut instance = api.create_instance("lifecycle").unwrap();
        api.init(&mut instance).unwrap();
        let sesid = api.begin_session(instance, None, None).unwrap();
        (instance, sesid)
    }

    #[test]
    fn create_open_and_close_database() {
        let api = Api::in_memory();
        let (instance, sesid) = session(&api);
        let dbid = api
            .create_database(sesid, "life.edb", None, CreateDatabaseGrbit::NONE)
            .unwrap();
        api.close_database(sesid, dbid, CloseDatabaseGrbit::NONE).unwrap();
        let dbid = api
            .open_database(sesid, "life.edb", None, OpenDatabaseGrbit::NONE)
            .unwrap();
        assert!(!dbid.is_nil());
        api.end_session(sesid, EndSessionGrbit::NONE).unwrap();
        api.term(instance, TermGrbit::NONE).unwrap();
    }

    #[test]
    fn empty_names_are_rejected_locally() {
        let api = Api::in_memory();
        let (_, sesid) = session(&api);
        let result = api.create_database(sesid, "", None, CreateDatabaseGrbit::NONE);
        assert!(matches!(result, Err(InteropError::InvalidArgument { .. })));
    }

    #[test]
    fn nested_transactions_count_on_the_engine() {
        let api = Api::in_memory();
        let (_, sesid) = session(&api);
        api.begin_transaction(sesid).unwrap();
        api.begin_transaction(sesid).unwrap();
        api.commit_transaction(sesid, CommitTransactionGrbit::NONE).unwrap();
        api.rollback(sesid, RollbackTransactionGrbit::NONE).unwrap();
        let error = api.rollback(sesid, RollbackTransactionGrbit::NONE).unwrap_err();
        assert!(error.is(err::NOT_IN_TRANSACTION));
    }

    #[test]
    fn session_context_is_exclusive() {
        let api = Api::in_memory();
        let (_, sesid) = session(&api);
        api.set_session_context(sesid, 7).unwrap();
        assert!(api
            .set_session_context(sesid, 8)
            .unwrap_err()
            .is(err::SESSION_CONTEXT_ALREADY_SET));
        api.reset_session_context(sesid).unwrap();
        api.set_session_context(sesid, 8).unwrap();
    }

    #[test]
    fn version_is_reported() {
        let api = Api::in_memory();
        let (_, sesid) = session(&api);
        assert!(api.get_version(sesid).unwrap() > 0);
    }

    #[test]
    fn system_parameters_round_trip() {
        let api = Api::in_memory();
        let instance = api.create_instance("params").unwrap();
        api.set_system_parameter(instance, SessionHandle::NIL, ParamId::MAX_SESSIONS, 42, None)
            .unwrap();
        let (value, _) = api
            .get_system_parameter(instance, SessionHandle::NIL, ParamId::MAX_SESSIONS, 0)
            .unwrap();
        assert_eq!(value, 42);
    }
}
