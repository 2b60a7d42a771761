//! Try-pattern navigation, bookmarks and index intersection.
//!
//! The `try_*` methods return `false` for the one status that means "nothing
//! there" and raise every other error. The status is inspected before it
//! reaches the error hook, so a hook never changes the outcome of a try.

use esent_native::grbit::{
    IndexRangeGrbit, IntersectIndexesGrbit, MoveGrbit, RetrieveColumnGrbit, RetrieveKeyGrbit,
    SeekGrbit, SetIndexRangeGrbit,
};
use esent_native::{
    err, IndexRange, SessionHandle, TableHandle, MOVE_FIRST, MOVE_LAST, MOVE_NEXT, MOVE_PREVIOUS,
};
use tracing::debug;

use crate::enumerator::TableEnumerator;
use crate::error::{InteropError, InteropResult};
use crate::Api;

/// An opaque record identifier, valid across index changes on one table.
#[derive(Debug, Clone)]
pub struct Bookmark(Vec<u8>);

impl Bookmark {
    /// Wraps bookmark bytes obtained from the engine.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The bookmark bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the bookmark, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Bookmark {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Api {
    /// Moves by `rows`; `false` if that leaves the index or range.
    pub fn try_move(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        rows: i32,
        grbit: MoveGrbit,
    ) -> InteropResult<bool> {
        let status = self.engine().move_cursor(sesid, tableid, rows, grbit);
        if status == err::NO_CURRENT_RECORD {
            return Ok(false);
        }
        self.check(status)?;
        Ok(true)
    }

    /// Moves to the first record; `false` if there is none.
    pub fn try_move_first(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<bool> {
        self.try_move(sesid, tableid, MOVE_FIRST, MoveGrbit::NONE)
    }

    /// Moves to the last record; `false` if there is none.
    pub fn try_move_last(&self, sesid: SessionHandle, tableid: TableHandle) -> InteropResult<bool> {
        self.try_move(sesid, tableid, MOVE_LAST, MoveGrbit::NONE)
    }

    /// Moves to the next record; `false` past the end.
    pub fn try_move_next(&self, sesid: SessionHandle, tableid: TableHandle) -> InteropResult<bool> {
        self.try_move(sesid, tableid, MOVE_NEXT, MoveGrbit::NONE)
    }

    /// Moves to the previous record; `false` before the start.
    pub fn try_move_previous(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<bool> {
        self.try_move(sesid, tableid, MOVE_PREVIOUS, MoveGrbit::NONE)
    }

    /// Positions the cursor before the first record.
    pub fn move_before_first(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<()> {
        self.try_move_first(sesid, tableid)?;
        self.try_move_previous(sesid, tableid)?;
        Ok(())
    }

    /// Positions the cursor after the last record.
    pub fn move_after_last(&self, sesid: SessionHandle, tableid: TableHandle) -> InteropResult<()> {
        self.try_move_last(sesid, tableid)?;
        self.try_move_next(sesid, tableid)?;
        Ok(())
    }

    /// Seeks with the search key; `false` if no entry satisfies `grbit`.
    ///
    /// `true` includes an inexact match (`JET_wrnSeekNotEqual`).
    pub fn try_seek(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SeekGrbit,
    ) -> InteropResult<bool> {
        let status = self.engine().seek(sesid, tableid, grbit);
        if status == err::RECORD_NOT_FOUND {
            return Ok(false);
        }
        self.check(status)?;
        Ok(true)
    }

    /// Sets an index range with the search key; `false` if the range is
    /// empty.
    pub fn try_set_index_range(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetIndexRangeGrbit,
    ) -> InteropResult<bool> {
        let status = self.engine().set_index_range(sesid, tableid, grbit);
        if status == err::NO_CURRENT_RECORD {
            return Ok(false);
        }
        self.check(status)?;
        Ok(true)
    }

    /// Clears the index range of the cursor.
    pub fn reset_index_range(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<()> {
        let status = self
            .engine()
            .set_index_range(sesid, tableid, SetIndexRangeGrbit::RANGE_REMOVE);
        if status == err::INVALID_OPERATION {
            return Ok(());
        }
        self.check(status)?;
        Ok(())
    }

    /// Returns the bookmark of the current record.
    pub fn get_bookmark_value(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<Bookmark> {
        let mut size = 0;
        let status = self.engine().get_bookmark(sesid, tableid, None, &mut size);
        if status != err::BUFFER_TOO_SMALL {
            self.check(status)?;
        }
        let mut bookmark = vec![0; size as usize];
        let actual = self.get_bookmark(sesid, tableid, Some(bookmark.as_mut_slice()))?;
        bookmark.truncate(actual);
        Ok(Bookmark(bookmark))
    }

    /// Returns the key of the current record, or the search key with
    /// `RETRIEVE_COPY`.
    pub fn retrieve_key_bytes(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: RetrieveKeyGrbit,
    ) -> InteropResult<Vec<u8>> {
        let (size, _) = self.retrieve_key(sesid, tableid, None, grbit)?;
        let mut key = vec![0; size];
        let (actual, _) = self.retrieve_key(sesid, tableid, Some(key.as_mut_slice()), grbit)?;
        key.truncate(actual);
        Ok(key)
    }

    /// Intersects the index ranges set on `tableids`.
    ///
    /// Bookmarks of the records present in every range are read lazily from
    /// the temporary result table, which is closed when the iterator is
    /// exhausted or dropped.
    pub fn intersect_indexes(
        &self,
        sesid: SessionHandle,
        tableids: &[TableHandle],
    ) -> InteropResult<TableEnumerator<'static, Bookmark>> {
        let ranges: Vec<IndexRange> = tableids
            .iter()
            .map(|&tableid| IndexRange {
                tableid,
                grbit: IndexRangeGrbit::RECORD_IN_INDEX,
            })
            .collect();
        let records = self.intersect_indexes_raw(sesid, &ranges, IntersectIndexesGrbit::NONE)?;
        debug!(
            tableid = %records.tableid,
            count = records.record_count,
            "opened index intersection"
        );
        Ok(TableEnumerator::new(
            self,
            sesid,
            records.tableid,
            records.record_count,
            move |api, sesid, tableid| {
                api.retrieve_column_bytes(
                    sesid,
                    tableid,
                    records.columnid_bookmark,
                    RetrieveColumnGrbit::NONE,
                    None,
                )?
                .map(Bookmark)
                .ok_or_else(|| InteropError::invalid_argument("intersection row has no bookmark"))
            },
        ))
    }
}
