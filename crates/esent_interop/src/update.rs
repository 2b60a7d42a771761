//! Pending record updates.

use esent_native::{CodePage, ColumnId, Prep, BOOKMARK_MOST};
use tracing::{debug, warn};

use crate::error::{InteropError, InteropResult};
use crate::navigation::Bookmark;
use crate::resource::ResourceState;
use crate::stream::ColumnStream;
use crate::table::Table;
use crate::value::FixedColumn;

/// An insert or replace in progress on a [`Table`].
///
/// Column values are set on the pending copy of the record and written by
/// [`save`](Self::save). An update dropped before it is saved is cancelled.
///
/// An update borrows its cursor and so stays on the cursor's thread:
///
/// ```compile_fail
/// use esent_interop::{Api, Instance, Session};
/// use esent_native::grbit::CreateDatabaseGrbit;
/// use esent_native::Prep;
///
/// let api = Api::in_memory();
/// let mut instance = Instance::new(&api, "threads").unwrap();
/// instance.init().unwrap();
/// let session = Session::new(&instance).unwrap();
/// let dbid = session
///     .create_database("threads.edb", CreateDatabaseGrbit::NONE)
///     .unwrap();
/// let table = session.create_table(dbid, "pending").unwrap();
/// let update = table.update(Prep::Insert).unwrap();
/// std::thread::scope(|scope| {
///     scope.spawn(move || drop(update));
/// });
/// ```
#[derive(Debug)]
pub struct Update<'t> {
    table: &'t Table<'t>,
    prep: Prep,
    state: ResourceState,
}

impl<'t> Update<'t> {
    /// Prepares an update of kind `prep` on the current record of `table`.
    ///
    /// `Replace` takes a write lock on the record and fails with
    /// `JET_errWriteConflict` if another session holds one.
    pub fn new(table: &'t Table<'t>, prep: Prep) -> InteropResult<Self> {
        if prep == Prep::Cancel {
            return Err(InteropError::invalid_argument(
                "cancel is not an update kind; drop the update instead",
            ));
        }
        let mut state = ResourceState::new("update");
        table
            .api()
            .prepare_update(table.sesid(), table.tableid()?, prep)?;
        state.resource_was_allocated()?;
        debug!(table = table.name(), ?prep, "prepared update");
        Ok(Self { table, prep, state })
    }

    /// The kind of update.
    #[must_use]
    pub fn prep(&self) -> Prep {
        self.prep
    }

    fn pending(&self) -> InteropResult<()> {
        self.state.check_not_disposed()?;
        if !self.state.has_resource() {
            return Err(InteropError::invalid_argument("update has already been saved"));
        }
        Ok(())
    }

    /// Sets a fixed-width column.
    pub fn set_value<T: FixedColumn>(&self, columnid: ColumnId, value: T) -> InteropResult<()> {
        self.pending()?;
        self.table
            .api()
            .set_column_value(self.table.sesid(), self.table.tableid()?, columnid, value)?;
        Ok(())
    }

    /// Sets a column from bytes. An empty slice is zero-length, not null.
    pub fn set_bytes(&self, columnid: ColumnId, data: &[u8]) -> InteropResult<()> {
        self.pending()?;
        self.table
            .api()
            .set_column_bytes(self.table.sesid(), self.table.tableid()?, columnid, data)?;
        Ok(())
    }

    /// Sets a text column.
    pub fn set_string(
        &self,
        columnid: ColumnId,
        text: &str,
        code_page: CodePage,
    ) -> InteropResult<()> {
        self.pending()?;
        self.table.api().set_column_string(
            self.table.sesid(),
            self.table.tableid()?,
            columnid,
            text,
            code_page,
        )?;
        Ok(())
    }

    /// Sets a column to null.
    pub fn set_null(&self, columnid: ColumnId) -> InteropResult<()> {
        self.pending()?;
        self.table
            .api()
            .set_column_null(self.table.sesid(), self.table.tableid()?, columnid)?;
        Ok(())
    }

    /// A stream over a long column of the pending record.
    pub fn column_stream(&self, columnid: ColumnId) -> InteropResult<ColumnStream<'_>> {
        self.pending()?;
        self.table.column_stream(columnid)
    }

    /// Writes the record, returning its bookmark.
    ///
    /// The cursor does not move to an inserted record; see
    /// [`save_and_goto_bookmark`](Self::save_and_goto_bookmark).
    pub fn save(&mut self) -> InteropResult<Bookmark> {
        self.pending()?;
        let mut bookmark = vec![0; BOOKMARK_MOST];
        let size = self.table.api().update(
            self.table.sesid(),
            self.table.tableid()?,
            Some(bookmark.as_mut_slice()),
        )?;
        bookmark.truncate(size);
        self.state.resource_was_released()?;
        debug!(table = self.table.name(), prep = ?self.prep, "saved update");
        Ok(Bookmark::from_bytes(bookmark))
    }

    /// Writes the record and positions the cursor on it.
    pub fn save_and_goto_bookmark(&mut self) -> InteropResult<Bookmark> {
        let bookmark = self.save()?;
        self.table.goto_bookmark(&bookmark)?;
        Ok(bookmark)
    }

    /// Discards the pending changes. Later calls do nothing.
    pub fn cancel(&mut self) -> InteropResult<()> {
        let table = self.table;
        self.state.dispose(|state| {
            table
                .api()
                .prepare_update(table.sesid(), table.tableid()?, Prep::Cancel)?;
            debug!(table = table.name(), "cancelled update");
            state.resource_was_released()
        })
    }
}

impl Drop for Update<'_> {
    fn drop(&mut self) {
        if self.state.has_resource() {
            warn!(
                table = self.table.name(),
                prep = ?self.prep,
                "update dropped without save; cancelling"
            );
        }
        if let Err(error) = self.cancel() {
            warn!(%error, table = self.table.name(), "failed to cancel update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::session::Session;
    use crate::Api;
    use esent_native::grbit::{CreateDatabaseGrbit, CreateIndexGrbit};
    use esent_native::{err, ColumnDef, ColumnType};

    struct Columns {
        key: ColumnId,
        extra: ColumnId,
    }

    fn run(test: impl FnOnce(&Session<'_>, &Table<'_>, Columns)) {
        let api = Api::in_memory();
        let mut instance = Instance::new(&api, "update").unwrap();
        instance.init().unwrap();
        let session = Session::new(&instance).unwrap();
        let dbid = session
            .create_database("update.edb", CreateDatabaseGrbit::NONE)
            .unwrap();
        let table = session.create_table(dbid, "t").unwrap();
        let long = ColumnDef {
            coltyp: ColumnType::Long,
            ..ColumnDef::default()
        };
        let key = table.add_column("key", &long, None).unwrap();
        let extra = table.add_column("extra", &long, None).unwrap();
        table
            .create_index("primary", CreateIndexGrbit::INDEX_PRIMARY, "+key\0\0")
            .unwrap();
        test(&session, &table, Columns { key, extra });
    }

    #[test]
    fn dropped_insert_is_cancelled() {
        run(|_, table, c| {
            {
                let update = table.update(Prep::Insert).unwrap();
                update.set_value(c.key, 1i32).unwrap();
            }
            assert!(!table.try_move_first().unwrap());
            // The cursor accepts a new update once the old one is cancelled.
            let mut update = table.update(Prep::Insert).unwrap();
            update.set_value(c.key, 2i32).unwrap();
            update.save().unwrap();
            assert!(table.try_move_first().unwrap());
        });
    }

    #[test]
    fn save_twice_is_rejected() {
        run(|_, table, c| {
            let mut update = table.update(Prep::Insert).unwrap();
            update.set_value(c.key, 1i32).unwrap();
            update.save().unwrap();
            assert!(matches!(update.save(), Err(InteropError::InvalidArgument { .. })));
            assert!(
                matches!(update.set_value(c.key, 3i32), Err(InteropError::InvalidArgument { .. }))
            );
        });
    }

    #[test]
    fn cancel_then_use_is_disposed() {
        run(|_, table, c| {
            let mut update = table.update(Prep::Insert).unwrap();
            update.cancel().unwrap();
            update.cancel().unwrap();
            assert!(
                matches!(update.set_value(c.key, 1i32), Err(InteropError::ObjectDisposed { .. }))
            );
        });
    }

    #[test]
    fn save_and_goto_positions_on_the_record() {
        run(|_, table, c| {
            for key in [10, 20] {
                let mut update = table.update(Prep::Insert).unwrap();
                update.set_value(c.key, key).unwrap();
                update.save_and_goto_bookmark().unwrap();
                assert_eq!(table.retrieve::<i32>(c.key).unwrap(), Some(key));
            }
        });
    }

    #[test]
    fn replace_needs_a_transaction() {
        run(|session, table, c| {
            let mut update = table.update(Prep::Insert).unwrap();
            update.set_value(c.key, 1i32).unwrap();
            update.save_and_goto_bookmark().unwrap();

            let error = table.update(Prep::Replace).unwrap_err();
            assert!(error.is(err::NOT_IN_TRANSACTION));

            let mut transaction = session.begin_transaction().unwrap();
            let mut replace = table.update(Prep::Replace).unwrap();
            assert_eq!(replace.prep(), Prep::Replace);
            replace.set_value(c.extra, 7i32).unwrap();
            replace.save().unwrap();
            drop(replace);
            transaction.commit(Default::default()).unwrap();
            table.try_move_first().unwrap();
            assert_eq!(table.retrieve::<i32>(c.extra).unwrap(), Some(7));
        });
    }

    #[test]
    fn cancel_kind_is_rejected() {
        run(|_, table, _| {
            assert!(
                matches!(table.update(Prep::Cancel), Err(InteropError::InvalidArgument { .. }))
            );
        });
    }
}
