//! Instances, sessions, databases, tables and transactions.

use std::collections::{HashMap, HashSet};

use super::state::{
    table_key, table_of, Cursor, DatabaseFile, EngineState, InstanceState, Param, Position,
    SessionState, Status, TableRef, Undo, MAX_TRANSACTION_DEPTH,
};
use super::table::{Record, TableData};
use crate::codes::{describe, err, wrn, JetErr};
use crate::grbit::{
    AttachDatabaseGrbit, ColumndefGrbit, CreateDatabaseGrbit, ObjectInfoFlags,
    RollbackTransactionGrbit,
};
use crate::handles::{DatabaseHandle, InstanceHandle, SessionHandle, TableHandle};
use crate::types::{CodePage, ColumnDef, ColumnType, ParamId};

/// Version reported by `JetGetVersion`.
pub(super) const ENGINE_VERSION: u32 = 0x0601_2000;

/// Name of the system catalog table created in every database.
pub(super) const CATALOG_TABLE: &str = "MSysObjects";

const DEFAULT_PAGE_SIZE: usize = 8192;

fn default_param(paramid: ParamId) -> Option<Param> {
    let integer = |value| Some(Param { value, string: None });
    let string = |s: &str| {
        Some(Param {
            value: 0,
            string: Some(s.to_string()),
        })
    };
    match paramid {
        ParamId::SYSTEM_PATH | ParamId::LOG_FILE_PATH => string(".\\"),
        ParamId::TEMP_PATH => string(".\\tmp.edb"),
        ParamId::BASE_NAME => string("edb"),
        ParamId::EVENT_SOURCE => string(""),
        ParamId::RECOVERY => string("On"),
        ParamId::MAX_OPEN_TABLES => integer(300),
        ParamId::MAX_SESSIONS => integer(16),
        ParamId::MAX_VER_PAGES => integer(64),
        ParamId::MAX_CURSORS => integer(1024),
        ParamId::LOG_FILE_SIZE => integer(5120),
        ParamId::CIRCULAR_LOG
        | ParamId::NO_INFORMATION_EVENT
        | ParamId::CREATE_PATH_IF_NOT_EXIST => integer(0),
        ParamId::DATABASE_PAGE_SIZE => integer(DEFAULT_PAGE_SIZE),
        _ => None,
    }
}

/// Parameters that can only change before `JetInit`.
fn is_startup_param(paramid: ParamId) -> bool {
    matches!(
        paramid,
        ParamId::SYSTEM_PATH
            | ParamId::TEMP_PATH
            | ParamId::LOG_FILE_PATH
            | ParamId::BASE_NAME
            | ParamId::LOG_FILE_SIZE
            | ParamId::DATABASE_PAGE_SIZE
            | ParamId::RECOVERY
    )
}

fn new_database() -> DatabaseFile {
    let mut catalog = TableData::new(CATALOG_TABLE);
    catalog.flags = ObjectInfoFlags::SYSTEM;
    for (name, coltyp) in [("Name", ColumnType::Text), ("Type", ColumnType::Short)] {
        let definition = ColumnDef {
            coltyp,
            cp: if coltyp.is_text() { CodePage::ASCII } else { CodePage::NONE },
            grbit: ColumndefGrbit::NONE,
            ..ColumnDef::default()
        };
        // The catalog definition is static and always valid.
        let _ = catalog.add_column(name, &definition, None);
    }
    let mut file = DatabaseFile::default();
    file.tables.insert(table_key(CATALOG_TABLE), catalog);
    file
}

impl EngineState {
    // ---- instances ----

    pub(super) fn create_instance(&mut self, instance: &mut InstanceHandle, name: &str) -> Status {
        if self.instances.values().any(|i| i.name == name) {
            return Err(err::INSTANCE_NAME_IN_USE);
        }
        let id = self.allocate_handle();
        self.instances.insert(
            id,
            InstanceState {
                name: name.to_string(),
                initialized: false,
                attached: HashSet::new(),
                params: HashMap::new(),
            },
        );
        *instance = InstanceHandle::new(id);
        Ok(err::SUCCESS)
    }

    pub(super) fn init(&mut self, instance: InstanceHandle) -> Status {
        let state = self
            .instances
            .get_mut(&instance.value())
            .ok_or(err::INVALID_INSTANCE)?;
        if state.initialized {
            return Err(err::ALREADY_INITIALIZED);
        }
        state.initialized = true;
        Ok(err::SUCCESS)
    }

    pub(super) fn term(&mut self, instance: InstanceHandle) -> Status {
        if !self.instances.contains_key(&instance.value()) {
            return Err(err::INVALID_INSTANCE);
        }
        let sessions: Vec<usize> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.instance == instance.value())
            .map(|(&id, _)| id)
            .collect();
        for sesid in sessions {
            self.end_session(SessionHandle::new(sesid))?;
        }
        self.instances.remove(&instance.value());
        Ok(err::SUCCESS)
    }

    // ---- parameters ----

    pub(super) fn set_system_parameter(
        &mut self,
        instance: InstanceHandle,
        paramid: ParamId,
        value: usize,
        string: Option<&str>,
    ) -> Status {
        if default_param(paramid).is_none() || paramid == ParamId::ERROR_TO_STRING {
            return Err(err::INVALID_PARAMETER);
        }
        let param = Param {
            value,
            string: string.map(str::to_string),
        };
        if instance.is_nil() {
            self.global_params.insert(paramid.0, param);
            return Ok(err::SUCCESS);
        }
        let state = self
            .instances
            .get_mut(&instance.value())
            .ok_or(err::INVALID_INSTANCE)?;
        if state.initialized && is_startup_param(paramid) {
            return Err(err::ALREADY_INITIALIZED);
        }
        state.params.insert(paramid.0, param);
        Ok(err::SUCCESS)
    }

    pub(super) fn get_system_parameter(
        &self,
        instance: InstanceHandle,
        paramid: ParamId,
        value: &mut usize,
        string: &mut String,
        max_size: u32,
    ) -> Status {
        let param = if paramid == ParamId::ERROR_TO_STRING {
            let code = *value as isize as i32;
            let text = match describe(code) {
                Some((name, description)) => format!("{name}, {description}"),
                None => format!("{code}, Unknown error"),
            };
            Param {
                value: *value,
                string: Some(text),
            }
        } else {
            let local = if instance.is_nil() {
                None
            } else {
                let state = self
                    .instances
                    .get(&instance.value())
                    .ok_or(err::INVALID_INSTANCE)?;
                state.params.get(&paramid.0).cloned()
            };
            local
                .or_else(|| self.global_params.get(&paramid.0).cloned())
                .or_else(|| default_param(paramid))
                .ok_or(err::INVALID_PARAMETER)?
        };
        *value = param.value;
        string.clear();
        if let Some(text) = param.string {
            let limit = (max_size as usize).saturating_sub(1);
            string.extend(text.chars().take(limit));
        }
        Ok(err::SUCCESS)
    }

    // ---- sessions ----

    pub(super) fn begin_session(
        &mut self,
        instance: InstanceHandle,
        sesid: &mut SessionHandle,
    ) -> Status {
        let state = self
            .instances
            .get(&instance.value())
            .ok_or(err::INVALID_INSTANCE)?;
        if !state.initialized {
            return Err(err::NOT_INITIALIZED);
        }
        let id = self.allocate_handle();
        self.sessions.insert(
            id,
            SessionState {
                instance: instance.value(),
                ..SessionState::default()
            },
        );
        *sesid = SessionHandle::new(id);
        Ok(err::SUCCESS)
    }

    pub(super) fn dup_session(
        &mut self,
        sesid: SessionHandle,
        new_sesid: &mut SessionHandle,
    ) -> Status {
        let instance = self.session(sesid)?.instance;
        self.begin_session(InstanceHandle::new(instance), new_sesid)
    }

    pub(super) fn end_session(&mut self, sesid: SessionHandle) -> Status {
        self.session(sesid)?;
        let cursors: Vec<usize> = self
            .cursors
            .iter()
            .filter(|(_, c)| c.sesid == sesid.value())
            .map(|(&id, _)| id)
            .collect();
        for tableid in cursors {
            self.close_cursor(tableid);
        }
        while self.session(sesid)?.in_transaction() {
            self.rollback(sesid, RollbackTransactionGrbit::ROLLBACK_ALL)?;
        }
        self.release_locks(sesid.value());
        self.sessions.remove(&sesid.value());
        Ok(err::SUCCESS)
    }

    pub(super) fn set_session_context(&mut self, sesid: SessionHandle, context: usize) -> Status {
        let session = self.session_mut(sesid)?;
        match session.context {
            Some(current) if current != context => Err(err::SESSION_CONTEXT_ALREADY_SET),
            _ => {
                session.context = Some(context);
                Ok(err::SUCCESS)
            }
        }
    }

    pub(super) fn reset_session_context(&mut self, sesid: SessionHandle) -> Status {
        let session = self.session_mut(sesid)?;
        if session.context.take().is_none() {
            return Err(err::SESSION_CONTEXT_NOT_SET_BY_THIS_THREAD);
        }
        Ok(err::SUCCESS)
    }

    // ---- databases ----

    fn instance_of(&mut self, sesid: SessionHandle) -> Result<&mut InstanceState, JetErr> {
        let instance = self.session(sesid)?.instance;
        self.instances.get_mut(&instance).ok_or(err::INVALID_INSTANCE)
    }

    fn open_dbid(&mut self, sesid: SessionHandle, path: &str) -> Result<DatabaseHandle, JetErr> {
        let raw = u32::try_from(self.allocate_handle()).map_err(|_| err::OUT_OF_MEMORY)?;
        self.session_mut(sesid)?
            .databases
            .insert(raw, path.to_string());
        Ok(DatabaseHandle::new(raw))
    }

    pub(super) fn create_database(
        &mut self,
        sesid: SessionHandle,
        path: &str,
        dbid: &mut DatabaseHandle,
        grbit: CreateDatabaseGrbit,
    ) -> Status {
        if path.is_empty() {
            return Err(err::INVALID_PARAMETER);
        }
        self.session(sesid)?;
        if self.files.contains_key(path) && !grbit.contains(
            CreateDatabaseGrbit::OVERWRITE_EXISTING,
        ) {
            return Err(err::DATABASE_DUPLICATE);
        }
        if self.instances.values().any(|i| i.attached.contains(path)) {
            return Err(err::DATABASE_IN_USE);
        }
        self.files.insert(path.to_string(), new_database());
        self.instance_of(sesid)?.attached.insert(path.to_string());
        *dbid = self.open_dbid(sesid, path)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn attach_database(
        &mut self,
        sesid: SessionHandle,
        path: &str,
        _grbit: AttachDatabaseGrbit,
    ) -> Status {
        self.session(sesid)?;
        if !self.files.contains_key(path) {
            return Err(err::FILE_NOT_FOUND);
        }
        let instance = self.session(sesid)?.instance;
        let elsewhere = self
            .instances
            .iter()
            .any(|(&id, i)| id != instance && i.attached.contains(path));
        if elsewhere {
            return Err(err::DATABASE_IN_USE);
        }
        if self.instance_of(sesid)?.attached.insert(path.to_string()) {
            Ok(err::SUCCESS)
        } else {
            Ok(wrn::DATABASE_ATTACHED)
        }
    }

    pub(super) fn open_database(
        &mut self,
        sesid: SessionHandle,
        path: &str,
        dbid: &mut DatabaseHandle,
    ) -> Status {
        if !self.instance_of(sesid)?.attached.contains(path) {
            return Err(err::DATABASE_NOT_FOUND);
        }
        *dbid = self.open_dbid(sesid, path)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn close_database(&mut self, sesid: SessionHandle, dbid: DatabaseHandle) -> Status {
        self.session_mut(sesid)?
            .databases
            .remove(&dbid.value())
            .ok_or(err::INVALID_DATABASE_ID)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn detach_database(&mut self, sesid: SessionHandle, path: Option<&str>) -> Status {
        let instance = self.session(sesid)?.instance;
        let targets: Vec<String> = match path {
            Some(path) => {
                if !self.instance_of(sesid)?.attached.contains(path) {
                    return Err(err::DATABASE_NOT_FOUND);
                }
                vec![path.to_string()]
            }
            None => self.instance_of(sesid)?.attached.iter().cloned().collect(),
        };
        let in_use = self
            .sessions
            .values()
            .filter(|s| s.instance == instance)
            .any(|s| s.databases.values().any(|p| targets.contains(p)));
        if in_use {
            return Err(err::DATABASE_IN_USE);
        }
        let state = self.instance_of(sesid)?;
        for target in &targets {
            state.attached.remove(target);
        }
        Ok(err::SUCCESS)
    }

    /// Path of a database open in the session.
    pub(super) fn database_path(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
    ) -> Result<String, JetErr> {
        self.session(sesid)?
            .databases
            .get(&dbid.value())
            .cloned()
            .ok_or(err::INVALID_DATABASE_ID)
    }

    /// Looks up a table of an open database by name.
    pub(super) fn named_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
    ) -> Result<(String, &TableData), JetErr> {
        let path = self.database_path(sesid, dbid)?;
        let table = self
            .files
            .get(&path)
            .and_then(|f| f.tables.get(&table_key(name)))
            .ok_or(err::OBJECT_NOT_FOUND)?;
        Ok((path, table))
    }

    // ---- tables ----

    pub(super) fn open_table(
        &mut self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        tableid: &mut TableHandle,
    ) -> Status {
        let (path, _) = self.named_table(sesid, dbid, name)?;
        let id = self.allocate_handle();
        let table = TableRef::Persistent {
            path,
            table: table_key(name),
        };
        self.cursors.insert(id, Cursor::new(sesid.value(), table));
        *tableid = TableHandle::new(id);
        Ok(err::SUCCESS)
    }

    pub(super) fn close_table(&mut self, sesid: SessionHandle, tableid: TableHandle) -> Status {
        self.cursor(sesid, tableid)?;
        self.close_cursor(tableid.value());
        Ok(err::SUCCESS)
    }

    pub(super) fn dup_cursor(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        new_tableid: &mut TableHandle,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let mut duplicate = Cursor::new(sesid.value(), cursor.table.clone());
        if let Some(first) = table.entries(table.primary()).into_iter().next() {
            duplicate.position = Position::On(first);
        }
        let id = self.allocate_handle();
        self.cursors.insert(id, duplicate);
        *new_tableid = TableHandle::new(id);
        Ok(err::SUCCESS)
    }

    pub(super) fn create_table(
        &mut self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        tableid: &mut TableHandle,
    ) -> Status {
        if name.is_empty() || name.len() > 64 {
            return Err(err::INVALID_NAME);
        }
        let path = self.database_path(sesid, dbid)?;
        let file = self.files.get_mut(&path).ok_or(err::DATABASE_NOT_FOUND)?;
        let key = table_key(name);
        if file.tables.contains_key(&key) {
            return Err(err::TABLE_DUPLICATE);
        }
        file.tables.insert(key, TableData::new(name));
        self.open_table(sesid, dbid, name, tableid)
    }

    pub(super) fn delete_table(
        &mut self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
    ) -> Status {
        let (path, table) = self.named_table(sesid, dbid, name)?;
        if table.flags.contains(ObjectInfoFlags::SYSTEM) {
            return Err(err::INVALID_OPERATION);
        }
        let table_ref = TableRef::Persistent {
            path: path.clone(),
            table: table_key(name),
        };
        if self.cursors.values().any(|c| c.table == table_ref) {
            return Err(err::TABLE_IN_USE);
        }
        if let Some(file) = self.files.get_mut(&path) {
            file.tables.remove(&table_key(name));
        }
        Ok(err::SUCCESS)
    }

    // ---- transactions ----

    pub(super) fn begin_transaction(&mut self, sesid: SessionHandle) -> Status {
        let session = self.session_mut(sesid)?;
        if session.levels.len() >= MAX_TRANSACTION_DEPTH {
            return Err(err::TRANS_TOO_DEEP);
        }
        session.levels.push(Vec::new());
        Ok(err::SUCCESS)
    }

    pub(super) fn commit_transaction(&mut self, sesid: SessionHandle) -> Status {
        let session = self.session_mut(sesid)?;
        let level = session.levels.pop().ok_or(err::NOT_IN_TRANSACTION)?;
        if let Some(parent) = session.levels.last_mut() {
            parent.extend(level);
            return Ok(err::SUCCESS);
        }
        self.release_locks(sesid.value());
        Ok(err::SUCCESS)
    }

    pub(super) fn rollback(
        &mut self,
        sesid: SessionHandle,
        grbit: RollbackTransactionGrbit,
    ) -> Status {
        let session = self.session_mut(sesid)?;
        if session.levels.is_empty() {
            return Err(err::NOT_IN_TRANSACTION);
        }
        let levels = if grbit.contains(RollbackTransactionGrbit::ROLLBACK_ALL) {
            session.levels.len()
        } else {
            1
        };
        let mut undo = Vec::new();
        for _ in 0..levels {
            if let Some(level) = session.levels.pop() {
                undo.push(level);
            }
        }
        let outermost = session.levels.is_empty();
        for level in undo {
            for entry in level.into_iter().rev() {
                self.apply_undo(entry);
            }
        }
        for cursor in self.cursors.values_mut().filter(|c| c.sesid == sesid.value()) {
            cursor.update = None;
        }
        if outermost {
            self.release_locks(sesid.value());
        }
        Ok(err::SUCCESS)
    }

    fn apply_undo(&mut self, undo: Undo) {
        let (table_ref, rid) = match &undo {
            Undo::Insert { table, rid }
            | Undo::Replace { table, rid, .. }
            | Undo::Delete { table, rid, .. }
            | Undo::Escrow { table, rid, .. } => (table.clone(), *rid),
        };
        let Some(table) = table_of(&mut self.files, &mut self.temps, &table_ref) else {
            return;
        };
        match undo {
            Undo::Insert { .. } => {
                table.records.remove(&rid);
            }
            Undo::Replace { before, .. } => {
                if let Some(record) = table.records.get_mut(&rid) {
                    record.values = before;
                }
            }
            Undo::Delete { before, .. } => {
                table.records.insert(
                    rid,
                    Record {
                        values: before,
                        locked_by: None,
                    },
                );
            }
            Undo::Escrow { columnid, delta, .. } => {
                if let Some(record) = table.records.get_mut(&rid) {
                    let value = record.values.get_mut(&columnid).and_then(|v| v.first_mut());
                    if let Some(value) = value {
                        super::dml::add_escrow(value, delta.wrapping_neg());
                    }
                }
            }
        }
    }
}
