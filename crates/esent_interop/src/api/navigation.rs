//! Cursor navigation calls.

use esent_native::grbit::{
    IntersectIndexesGrbit, MakeKeyGrbit, MoveGrbit, RetrieveKeyGrbit, SeekGrbit, SetIndexRangeGrbit,
};
use esent_native::{IndexRange, RecordList, RecordPosition, SessionHandle, TableHandle};

use super::Api;
use crate::error::{InteropError, InteropResult};
use crate::status::JetWarning;

/// Longest index name the engine reports.
const INDEX_NAME_MOST: u32 = 256;

impl Api {
    /// Copies the bookmark of the current record into `bookmark`.
    ///
    /// Returns the bookmark size, which may exceed the buffer.
    pub fn get_bookmark(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
    ) -> InteropResult<usize> {
        let mut actual = 0;
        self.check(
            self.engine()
                .get_bookmark(sesid, tableid, bookmark, &mut actual),
        )?;
        Ok(actual as usize)
    }

    /// Positions the cursor on the record with `bookmark`.
    pub fn goto_bookmark(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: &[u8],
    ) -> InteropResult<JetWarning> {
        if bookmark.is_empty() {
            return Err(InteropError::invalid_argument("bookmark is empty"));
        }
        self.check(self.engine().goto_bookmark(sesid, tableid, bookmark))
    }

    /// Adds one column value to the search key of the cursor.
    pub fn make_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        data: Option<&[u8]>,
        grbit: MakeKeyGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().make_key(sesid, tableid, data, grbit))
    }

    /// Copies the key of the current record, or the search key with
    /// `RETRIEVE_COPY`. Returns the key size and the status.
    pub fn retrieve_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        key: Option<&mut [u8]>,
        grbit: RetrieveKeyGrbit,
    ) -> InteropResult<(usize, JetWarning)> {
        let mut actual = 0;
        let warning = self.check(
            self.engine()
                .retrieve_key(sesid, tableid, key, &mut actual, grbit),
        )?;
        Ok((actual as usize, warning))
    }

    /// Seeks with the search key built by [`make_key`](Self::make_key).
    pub fn seek(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SeekGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().seek(sesid, tableid, grbit))
    }

    /// Moves the cursor by `rows`, or to either end.
    pub fn move_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        rows: i32,
        grbit: MoveGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().move_cursor(sesid, tableid, rows, grbit))
    }

    /// Limits the cursor with the search key.
    pub fn set_index_range(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetIndexRangeGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().set_index_range(sesid, tableid, grbit))
    }

    /// Intersects the index ranges of several cursors into a temporary table
    /// of bookmarks.
    pub fn intersect_indexes_raw(
        &self,
        sesid: SessionHandle,
        ranges: &[IndexRange],
        grbit: IntersectIndexesGrbit,
    ) -> InteropResult<RecordList> {
        if ranges.len() < 2 {
            return Err(InteropError::invalid_argument(
                "index intersection needs at least two ranges",
            ));
        }
        let mut records = RecordList::default();
        self.check(
            self.engine()
                .intersect_indexes(sesid, ranges, &mut records, grbit),
        )?;
        Ok(records)
    }

    /// Switches the cursor to another index; `None` selects the primary index.
    pub fn set_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().set_current_index(sesid, tableid, index))
    }

    /// Name of the index the cursor is on, empty for a table without one.
    pub fn get_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<String> {
        let mut name = String::new();
        self.check(
            self.engine()
                .get_current_index(sesid, tableid, &mut name, INDEX_NAME_MOST),
        )?;
        Ok(name)
    }

    /// Counts records from the cursor to the end of the index range, up to
    /// `max_records` (0 for no limit).
    pub fn index_record_count(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        max_records: u32,
    ) -> InteropResult<u32> {
        let mut count = 0;
        self.check(
            self.engine()
                .index_record_count(sesid, tableid, &mut count, max_records),
        )?;
        Ok(count)
    }

    /// Approximate position of the current record.
    pub fn get_record_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<RecordPosition> {
        let mut position = RecordPosition::default();
        self.check(
            self.engine()
                .get_record_position(sesid, tableid, &mut position),
        )?;
        Ok(position)
    }

    /// Moves to an approximate position.
    pub fn goto_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &RecordPosition,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().goto_position(sesid, tableid, position))
    }
}
