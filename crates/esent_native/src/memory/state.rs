use std::collections::{BTreeMap, HashMap, HashSet};

use super::key::SearchKey;
use super::table::{Entry, TableData, Values};
use crate::codes::{err, JetErr};
use crate::handles::{SessionHandle, TableHandle};
use crate::types::Prep;

/// Outcome of one engine call: success or a warning, or an error.
pub(super) type Status = Result<JetErr, JetErr>;

/// Maximum transaction nesting depth.
pub(super) const MAX_TRANSACTION_DEPTH: usize = 7;

#[derive(Debug, Clone, Default)]
pub(super) struct Param {
    pub value: usize,
    pub string: Option<String>,
}

#[derive(Debug)]
pub(super) struct InstanceState {
    pub name: String,
    pub initialized: bool,
    pub attached: HashSet<String>,
    pub params: HashMap<u32, Param>,
}

#[derive(Debug, Default)]
pub(super) struct SessionState {
    pub instance: usize,
    /// One undo list per open transaction level.
    pub levels: Vec<Vec<Undo>>,
    /// Records this session holds write locks on.
    pub locks: Vec<(TableRef, u64)>,
    /// Open databases by raw dbid.
    pub databases: HashMap<u32, String>,
    pub context: Option<usize>,
}

impl SessionState {
    pub(super) fn in_transaction(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Records an undo entry when inside a transaction.
    pub(super) fn log(&mut self, undo: Undo) {
        if let Some(level) = self.levels.last_mut() {
            level.push(undo);
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct DatabaseFile {
    /// Tables keyed by lowercase name.
    pub tables: BTreeMap<String, TableData>,
}

/// Where a cursor's table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TableRef {
    Persistent { path: String, table: String },
    Temp(usize),
}

#[derive(Debug)]
pub(super) enum Undo {
    Insert { table: TableRef, rid: u64 },
    Replace { table: TableRef, rid: u64, before: Values },
    Delete { table: TableRef, rid: u64, before: Values },
    Escrow { table: TableRef, rid: u64, columnid: u32, delta: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Position {
    BeforeFirst,
    AfterLast,
    On(Entry),
}

/// A one-sided limit on cursor movement.
#[derive(Debug, Clone)]
pub(super) struct IndexLimit {
    pub key: Vec<u8>,
    pub upper: bool,
    pub inclusive: bool,
}

impl IndexLimit {
    pub(super) fn admits(&self, key: &[u8]) -> bool {
        let limit = self.key.as_slice();
        let prefixed = key.starts_with(limit);
        match (self.upper, self.inclusive) {
            (true, true) => key <= limit || prefixed,
            (true, false) => key < limit && !prefixed,
            (false, true) => key >= limit,
            (false, false) => key > limit && !prefixed,
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct PendingUpdate {
    pub prep: Prep,
    pub rid: Option<u64>,
    pub values: Values,
}

#[derive(Debug)]
pub(super) struct Cursor {
    pub sesid: usize,
    pub table: TableRef,
    pub index: Option<String>,
    pub position: Position,
    pub search: Option<SearchKey>,
    pub range: Option<IndexLimit>,
    pub update: Option<PendingUpdate>,
}

impl Cursor {
    pub(super) fn new(sesid: usize, table: TableRef) -> Self {
        Self {
            sesid,
            table,
            index: None,
            position: Position::BeforeFirst,
            search: None,
            range: None,
            update: None,
        }
    }
}

/// Everything the in-memory engine knows, behind one lock.
#[derive(Debug, Default)]
pub(super) struct EngineState {
    next_handle: usize,
    pub instances: HashMap<usize, InstanceState>,
    pub sessions: HashMap<usize, SessionState>,
    pub cursors: HashMap<usize, Cursor>,
    /// Database files by path. Files outlive the instances that use them.
    pub files: HashMap<String, DatabaseFile>,
    pub temps: HashMap<usize, TableData>,
    pub global_params: HashMap<u32, Param>,
}

/// Resolves a table reference against the file and temp-table maps.
pub(super) fn table_of<'a>(
    files: &'a mut HashMap<String, DatabaseFile>,
    temps: &'a mut HashMap<usize, TableData>,
    table: &TableRef,
) -> Option<&'a mut TableData> {
    match table {
        TableRef::Persistent { path, table } => files.get_mut(path)?.tables.get_mut(table),
        TableRef::Temp(id) => temps.get_mut(id),
    }
}

pub(super) fn table_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl EngineState {
    pub(super) fn allocate_handle(&mut self) -> usize {
        self.next_handle += 1;
        self.next_handle
    }

    pub(super) fn session(&self, sesid: SessionHandle) -> Result<&SessionState, JetErr> {
        self.sessions.get(&sesid.value()).ok_or(err::INVALID_SESID)
    }

    pub(super) fn session_mut(
        &mut self,
        sesid: SessionHandle,
    ) -> Result<&mut SessionState, JetErr> {
        self.sessions.get_mut(&sesid.value()).ok_or(err::INVALID_SESID)
    }

    /// Looks up a cursor owned by the session together with its table.
    pub(super) fn cursor(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> Result<(&mut Cursor, &mut TableData), JetErr> {
        if !self.sessions.contains_key(&sesid.value()) {
            return Err(err::INVALID_SESID);
        }
        let cursor = self
            .cursors
            .get_mut(&tableid.value())
            .filter(|c| c.sesid == sesid.value())
            .ok_or(err::INVALID_TABLE_ID)?;
        let table = table_of(&mut self.files, &mut self.temps, &cursor.table)
            .ok_or(err::INVALID_TABLE_ID)?;
        Ok((cursor, table))
    }

    /// Looks up a cursor, its table and the owning session.
    pub(super) fn cursor_with_session(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> Result<(&mut Cursor, &mut TableData, &mut SessionState), JetErr> {
        let session = self
            .sessions
            .get_mut(&sesid.value())
            .ok_or(err::INVALID_SESID)?;
        let cursor = self
            .cursors
            .get_mut(&tableid.value())
            .filter(|c| c.sesid == sesid.value())
            .ok_or(err::INVALID_TABLE_ID)?;
        let table = table_of(&mut self.files, &mut self.temps, &cursor.table)
            .ok_or(err::INVALID_TABLE_ID)?;
        Ok((cursor, table, session))
    }

    /// Registers a temporary table and opens a cursor on it.
    pub(super) fn open_temp(&mut self, sesid: SessionHandle, table: TableData) -> TableHandle {
        let id = self.allocate_handle();
        self.temps.insert(id, table);
        let tableid = self.allocate_handle();
        self.cursors
            .insert(tableid, Cursor::new(sesid.value(), TableRef::Temp(id)));
        TableHandle::new(tableid)
    }

    /// Closes a cursor, dropping its temporary table if it has one.
    pub(super) fn close_cursor(&mut self, tableid: usize) {
        if let Some(cursor) = self.cursors.remove(&tableid) {
            if let TableRef::Temp(id) = cursor.table {
                self.temps.remove(&id);
            }
        }
    }

    /// Releases every write lock a session holds.
    pub(super) fn release_locks(&mut self, sesid: usize) {
        let Some(session) = self.sessions.get_mut(&sesid) else {
            return;
        };
        for (table, rid) in session.locks.drain(..) {
            if let Some(record) =
                table_of(
                    &mut self.files,
                    &mut self.temps,
                    &table,
                ).and_then(|t| t.records.get_mut(&rid))
            {
                if record.locked_by == Some(sesid) {
                    record.locked_by = None;
                }
            }
        }
    }
}

/// Takes a write lock on a record for a session, or reports a conflict.
pub(super) fn lock_record(
    table: &mut TableData,
    table_ref: &TableRef,
    session: &mut SessionState,
    sesid: usize,
    rid: u64,
) -> Result<(), JetErr> {
    let record = table.records.get_mut(&rid).ok_or(err::RECORD_DELETED)?;
    match record.locked_by {
        Some(owner) if owner != sesid => Err(err::WRITE_CONFLICT),
        Some(_) => Ok(()),
        None => {
            if session.in_transaction() {
                record.locked_by = Some(sesid);
                session.locks.push((table_ref.clone(), rid));
            }
            Ok(())
        }
    }
}

/// Copies `data` into an optional output buffer the way the engine does.
///
/// Returns `BUFFER_TRUNCATED` when the buffer holds less than `data`.
pub(super) fn copy_out(data: &[u8], buffer: Option<&mut [u8]>, actual_size: &mut u32) -> JetErr {
    *actual_size = u32::try_from(data.len()).unwrap_or(u32::MAX);
    let capacity = buffer.as_ref().map_or(0, |b| b.len());
    if let Some(buffer) = buffer {
        let n = capacity.min(data.len());
        buffer[..n].copy_from_slice(&data[..n]);
    }
    if capacity < data.len() {
        crate::codes::wrn::BUFFER_TRUNCATED
    } else {
        err::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_inclusive_limit_admits_prefixed_keys() {
        let limit = IndexLimit {
            key: vec![0x7F, 5],
            upper: true,
            inclusive: true,
        };
        assert!(limit.admits(&[0x7F, 4]));
        assert!(limit.admits(&[0x7F, 5, 9]));
        assert!(!limit.admits(&[0x7F, 6]));
    }

    #[test]
    fn lower_exclusive_limit_rejects_equal_keys() {
        let limit = IndexLimit {
            key: vec![3],
            upper: false,
            inclusive: false,
        };
        assert!(!limit.admits(&[3]));
        assert!(limit.admits(&[4]));
    }

    #[test]
    fn copy_out_reports_truncation() {
        let mut actual = 0;
        let mut small = [0u8; 2];
        assert_eq!(
            copy_out(&[1, 2, 3], Some(&mut small), &mut actual),
            crate::codes::wrn::BUFFER_TRUNCATED
        );
        assert_eq!(actual, 3);
        assert_eq!(small, [1, 2]);

        let mut big = [0u8; 4];
        assert_eq!(copy_out(&[1, 2, 3], Some(&mut big), &mut actual), err::SUCCESS);
        assert_eq!(copy_out(&[], None, &mut actual), err::SUCCESS);
    }
}
