//! Cursor navigation.

use std::collections::BTreeSet;

use super::key::SearchKey;
use super::state::{copy_out, Cursor, EngineState, IndexLimit, Position, Status};
use super::table::{Entry, TableData};
use crate::codes::{err, wrn, JetErr};
use crate::grbit::{MakeKeyGrbit, MoveGrbit, RetrieveKeyGrbit, SeekGrbit, SetIndexRangeGrbit};
use crate::handles::{SessionHandle, TableHandle};
use crate::types::{IndexRange, RecordPosition, MOVE_FIRST, MOVE_LAST};

const BOOKMARK_SIZE: usize = 8;

impl Cursor {
    pub(super) fn entries(&self, table: &TableData) -> Vec<Entry> {
        table.entries(table.resolve_index(self.index.as_deref()))
    }

    /// Record id under the cursor.
    pub(super) fn current_rid(&self, table: &TableData) -> Result<u64, JetErr> {
        match &self.position {
            Position::On((_, rid)) if table.records.contains_key(rid) => Ok(*rid),
            Position::On(_) => Err(err::RECORD_DELETED),
            Position::BeforeFirst | Position::AfterLast => Err(err::NO_CURRENT_RECORD),
        }
    }

    /// Places the cursor on a record of the current index.
    pub(super) fn position_on(&mut self, table: &TableData, rid: u64) -> Result<(), JetErr> {
        let index = table.resolve_index(self.index.as_deref());
        let record = table.records.get(&rid).ok_or(err::RECORD_DELETED)?;
        let key = table
            .key_for(index, rid, &record.values)
            .ok_or(err::NO_CURRENT_RECORD)?;
        self.position = Position::On((key, rid));
        Ok(())
    }

    fn leave_range(&mut self, entry: Option<Entry>, forward: bool) -> Status {
        match entry {
            Some(entry) if self.range.as_ref().map_or(true, |r| r.admits(&entry.0)) => {
                self.position = Position::On(entry);
                Ok(err::SUCCESS)
            }
            found => {
                if found.is_some() {
                    self.range = None;
                }
                self.position = if forward {
                    Position::AfterLast
                } else {
                    Position::BeforeFirst
                };
                Err(err::NO_CURRENT_RECORD)
            }
        }
    }

    fn step(&mut self, entries: &[Entry], forward: bool, key_ne: bool) -> Status {
        let next = match (&self.position, forward) {
            (Position::BeforeFirst, true) => entries.first(),
            (Position::AfterLast, false) => entries.last(),
            (Position::BeforeFirst, false) | (Position::AfterLast, true) => None,
            (Position::On(current), true) => entries
                .iter()
                .find(|e| if key_ne { e.0 > current.0 } else { *e > current }),
            (Position::On(current), false) => entries
                .iter()
                .rev()
                .find(|e| if key_ne { e.0 < current.0 } else { *e < current }),
        };
        let next = next.cloned();
        self.leave_range(next, forward)
    }

    pub(super) fn move_by(&mut self, table: &TableData, rows: i32, grbit: MoveGrbit) -> Status {
        let entries = self.entries(table);
        match rows {
            MOVE_FIRST => {
                self.range = None;
                let first = entries.first().cloned();
                self.leave_range(first, false)
            }
            MOVE_LAST => {
                self.range = None;
                let last = entries.last().cloned();
                self.leave_range(last, true)
            }
            0 => self.current_rid(table).map(|_| err::SUCCESS),
            rows => {
                let key_ne = grbit.contains(MoveGrbit::MOVE_KEY_NE);
                for _ in 0..rows.unsigned_abs() {
                    self.step(&entries, rows > 0, key_ne)?;
                }
                Ok(err::SUCCESS)
            }
        }
    }

    pub(super) fn seek(&mut self, table: &TableData, grbit: SeekGrbit) -> Status {
        let key = self.search.take().ok_or(err::KEY_NOT_MADE)?;
        self.range = None;
        let target = key.bytes.as_slice();
        let entries = self.entries(table);
        let prefixed = |e: &Entry| e.0.starts_with(target);

        let (found, exact) = if grbit.contains(SeekGrbit::SEEK_EQ) {
            (entries.iter().find(|e| prefixed(e)), true)
        } else if grbit.contains(SeekGrbit::SEEK_GE) {
            let found = entries.iter().find(|e| e.0.as_slice() >= target);
            (found, found.is_some_and(prefixed))
        } else if grbit.contains(SeekGrbit::SEEK_GT) {
            (entries.iter().find(|e| e.0.as_slice() > target && !prefixed(e)), true)
        } else if grbit.contains(SeekGrbit::SEEK_LE) {
            let found = entries.iter().rev().find(|e| e.0.as_slice() <= target || prefixed(e));
            (found, found.is_some_and(prefixed))
        } else if grbit.contains(SeekGrbit::SEEK_LT) {
            (entries.iter().rev().find(|e| e.0.as_slice() < target && !prefixed(e)), true)
        } else {
            return Err(err::INVALID_GRBIT);
        };

        let Some(found) = found.cloned() else {
            self.position = Position::BeforeFirst;
            return Err(err::RECORD_NOT_FOUND);
        };
        self.position = Position::On(found);
        if grbit.contains(SeekGrbit::SEEK_EQ | SeekGrbit::SET_INDEX_RANGE) {
            self.range = Some(IndexLimit {
                key: key.bytes,
                upper: true,
                inclusive: true,
            });
        }
        Ok(if exact { err::SUCCESS } else { wrn::SEEK_NOT_EQUAL })
    }

    pub(super) fn set_index_range(&mut self, grbit: SetIndexRangeGrbit) -> Status {
        if grbit.contains(SetIndexRangeGrbit::RANGE_REMOVE) {
            self.range = None;
            return Ok(err::SUCCESS);
        }
        let key = self.search.take().ok_or(err::KEY_NOT_MADE)?;
        let limit = IndexLimit {
            key: key.bytes,
            upper: grbit.contains(SetIndexRangeGrbit::RANGE_UPPER_LIMIT),
            inclusive: grbit.contains(SetIndexRangeGrbit::RANGE_INCLUSIVE),
        };
        let Position::On((current, _)) = &self.position else {
            return Err(err::NO_CURRENT_RECORD);
        };
        if !limit.admits(current) {
            self.range = None;
            return Err(err::NO_CURRENT_RECORD);
        }
        if !grbit.contains(SetIndexRangeGrbit::RANGE_INSTANT_DURATION) {
            self.range = Some(limit);
        }
        Ok(err::SUCCESS)
    }

    /// Records from the current position to the end of the range.
    pub(super) fn remaining(&self, table: &TableData) -> Vec<Entry> {
        let entries = self.entries(table);
        entries
            .into_iter()
            .filter(|e| match &self.position {
                Position::BeforeFirst => true,
                Position::AfterLast => false,
                Position::On(current) => e >= current,
            })
            .take_while(|e| self.range.as_ref().map_or(true, |r| r.admits(&e.0)))
            .collect()
    }
}

impl EngineState {
    pub(super) fn move_cursor(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        rows: i32,
        grbit: MoveGrbit,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        cursor.move_by(table, rows, grbit)
    }

    /// Scan hints change nothing in memory; the cursor only has to exist.
    pub(super) fn set_table_sequential(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> Status {
        self.cursor(sesid, tableid)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn reset_table_sequential(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> Status {
        self.cursor(sesid, tableid)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn make_key(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        data: Option<&[u8]>,
        grbit: MakeKeyGrbit,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let index = table.resolve_index(cursor.index.as_deref());
        let kinds = table.segment_kinds(index);
        let current = cursor.search.take();
        cursor.search = Some(SearchKey::append(current, &kinds, data, grbit)?);
        Ok(err::SUCCESS)
    }

    pub(super) fn retrieve_key(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        key: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveKeyGrbit,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let bytes = if grbit.contains(RetrieveKeyGrbit::RETRIEVE_COPY) {
            cursor.search.as_ref().ok_or(err::KEY_NOT_MADE)?.bytes.clone()
        } else {
            cursor.current_rid(table)?;
            match &cursor.position {
                Position::On((key, _)) => key.clone(),
                _ => return Err(err::NO_CURRENT_RECORD),
            }
        };
        Ok(copy_out(&bytes, key, actual_size))
    }

    pub(super) fn seek(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SeekGrbit,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        cursor.seek(table, grbit)
    }

    pub(super) fn set_index_range(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetIndexRangeGrbit,
    ) -> Status {
        let (cursor, _) = self.cursor(sesid, tableid)?;
        cursor.set_index_range(grbit)
    }

    pub(super) fn get_bookmark(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let rid = cursor.current_rid(table)?;
        *actual_size = BOOKMARK_SIZE as u32;
        match bookmark {
            Some(buffer) if buffer.len() >= BOOKMARK_SIZE => {
                buffer[..BOOKMARK_SIZE].copy_from_slice(&rid.to_be_bytes());
                Ok(err::SUCCESS)
            }
            _ => Err(err::BUFFER_TOO_SMALL),
        }
    }

    pub(super) fn goto_bookmark(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: &[u8],
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let raw: [u8; BOOKMARK_SIZE] = bookmark.try_into().map_err(|_| err::INVALID_BOOKMARK)?;
        let rid = u64::from_be_bytes(raw);
        if rid == 0 || rid >= table.next_rid {
            return Err(err::INVALID_BOOKMARK);
        }
        cursor.range = None;
        cursor.search = None;
        cursor.position_on(table, rid)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn set_current_index(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let name = match index.filter(|n| !n.is_empty()) {
            Some(name) => Some(table.index(name).ok_or(err::INDEX_NOT_FOUND)?.name.clone()),
            None => None,
        };
        cursor.index = name;
        cursor.range = None;
        cursor.search = None;
        cursor.position = cursor
            .entries(table)
            .into_iter()
            .next()
            .map_or(Position::BeforeFirst, Position::On);
        Ok(err::SUCCESS)
    }

    pub(super) fn get_current_index(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &mut String,
        max_size: u32,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let current = table
            .resolve_index(cursor.index.as_deref())
            .map(|i| i.name.clone())
            .unwrap_or_default();
        if current.len() + 1 > max_size as usize {
            return Err(err::BUFFER_TOO_SMALL);
        }
        *name = current;
        Ok(err::SUCCESS)
    }

    pub(super) fn index_record_count(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        count: &mut u32,
        max_records: u32,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let total = cursor.remaining(table).len();
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        *count = if max_records == 0 { total } else { total.min(max_records) };
        Ok(err::SUCCESS)
    }

    pub(super) fn get_record_position(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &mut RecordPosition,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let Position::On(current) = &cursor.position else {
            return Err(err::NO_CURRENT_RECORD);
        };
        let entries = cursor.entries(table);
        let less_than = entries.iter().filter(|e| *e < current).count();
        *position = RecordPosition {
            entries_less_than: u32::try_from(less_than).unwrap_or(u32::MAX),
            entries_in_range: 1,
            entries_total: u32::try_from(entries.len()).unwrap_or(u32::MAX),
        };
        Ok(err::SUCCESS)
    }

    pub(super) fn goto_position(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &RecordPosition,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        if position.entries_total == 0 || position.entries_less_than > position.entries_total {
            return Err(err::INVALID_PARAMETER);
        }
        let entries = cursor.entries(table);
        if entries.is_empty() {
            cursor.position = Position::BeforeFirst;
            return Err(err::NO_CURRENT_RECORD);
        }
        let scaled = u64::from(position.entries_less_than) * entries.len() as u64
            / u64::from(position.entries_total);
        let index = usize::try_from(scaled).unwrap_or(usize::MAX).min(entries.len() - 1);
        cursor.range = None;
        cursor.position = Position::On(entries[index].clone());
        Ok(err::SUCCESS)
    }

    /// Runs an index intersection and returns the matching records.
    pub(super) fn intersection(
        &mut self,
        sesid: SessionHandle,
        ranges: &[IndexRange],
    ) -> Result<BTreeSet<u64>, JetErr> {
        if ranges.len() < 2 {
            return Err(err::INVALID_PARAMETER);
        }
        let mut result: Option<BTreeSet<u64>> = None;
        for range in ranges {
            let (cursor, table) = self.cursor(sesid, range.tableid)?;
            let rids: BTreeSet<u64> = cursor
                .remaining(table)
                .into_iter()
                .map(|(_, rid)| rid)
                .collect();
            result = Some(match result {
                Some(acc) => acc.intersection(&rids).copied().collect(),
                None => rids,
            });
        }
        Ok(result.unwrap_or_default())
    }
}

/// Encodes a record id as a bookmark.
pub(super) fn bookmark_of(rid: u64) -> [u8; BOOKMARK_SIZE] {
    rid.to_be_bytes()
}
