//! Record reads and writes.

use super::cursor::bookmark_of;
use super::state::{
    copy_out, lock_record, EngineState, PendingUpdate, Position, SessionState, Status, TableRef,
    Undo,
};
use super::table::{ColumnSchema, Record, TableData, Values};
use crate::codes::{err, wrn, JetErr};
use crate::grbit::{
    ColumndefGrbit, EnumerateColumnsGrbit, EscrowUpdateGrbit, GetLockGrbit, RetrieveColumnGrbit,
    SetColumnGrbit,
};
use crate::handles::{ColumnId, SessionHandle, TableHandle};
use crate::types::{
    ColumnType, EnumColumn, EnumColumnId, EnumColumnValue, Prep, RetrieveInfo, SetInfo,
};

/// Largest value a non-long text or binary column holds.
const SHORT_COLUMN_MAX: usize = 255;

/// Shapes record values into `JetEnumerateColumns` output.
struct ColumnEnumerator<'a> {
    values: &'a Values,
    max_data_size: usize,
    grbit: EnumerateColumnsGrbit,
}

impl ColumnEnumerator<'_> {
    /// Non-null instances of a column, falling back to its default.
    fn instances<'v>(&'v self, column: &'v ColumnSchema) -> Vec<&'v [u8]> {
        match self.values.get(&column.columnid.value()) {
            Some(instances) => instances.iter().map(Vec::as_slice).collect(),
            None if self.grbit.contains(EnumerateColumnsGrbit::ENUMERATE_IGNORE_DEFAULT) => {
                Vec::new()
            }
            None => column.default.as_deref().into_iter().collect(),
        }
    }

    fn value(&self, itag_sequence: u32, data: &[u8]) -> EnumColumnValue {
        if self.grbit.contains(EnumerateColumnsGrbit::ENUMERATE_PRESENCE_ONLY) {
            return EnumColumnValue {
                itag_sequence,
                err: wrn::COLUMN_PRESENT,
                data: Vec::new(),
            };
        }
        let truncated = self.max_data_size != 0 && data.len() > self.max_data_size;
        let kept = if truncated { &data[..self.max_data_size] } else { data };
        EnumColumnValue {
            itag_sequence,
            err: if truncated { wrn::COLUMN_TRUNCATED } else { err::SUCCESS },
            data: kept.to_vec(),
        }
    }

    fn all(&self, columnid: ColumnId, instances: &[&[u8]]) -> EnumColumn {
        if instances.is_empty() {
            return EnumColumn {
                columnid,
                err: wrn::COLUMN_NULL,
                values: Vec::new(),
            };
        }
        let values: Vec<EnumColumnValue> = (1u32..)
            .zip(instances)
            .map(|(itag, data)| self.value(itag, data))
            .collect();
        let single = values.len() == 1
            && values[0].err == err::SUCCESS
            && self.grbit.contains(EnumerateColumnsGrbit::ENUMERATE_COMPRESS_OUTPUT);
        EnumColumn {
            columnid,
            err: if single { wrn::COLUMN_SINGLE_VALUE } else { err::SUCCESS },
            values,
        }
    }

    fn tagged(&self, columnid: ColumnId, instances: &[&[u8]], tags: &[u32]) -> EnumColumn {
        let values = tags
            .iter()
            .map(|&itag| match (itag as usize).checked_sub(1).and_then(|i| instances.get(i)) {
                Some(data) => self.value(itag, data),
                None => EnumColumnValue {
                    itag_sequence: itag,
                    err: wrn::COLUMN_NULL,
                    data: Vec::new(),
                },
            })
            .collect();
        EnumColumn {
            columnid,
            err: err::SUCCESS,
            values,
        }
    }
}

/// Adds a little-endian delta to a 4 or 8 byte little-endian integer.
pub(super) fn add_escrow(value: &mut Vec<u8>, delta: i64) {
    match value.len() {
        4 => {
            let current = i32::from_le_bytes([value[0], value[1], value[2], value[3]]);
            *value = current.wrapping_add(delta as i32).to_le_bytes().to_vec();
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(value);
            *value = i64::from_le_bytes(raw).wrapping_add(delta).to_le_bytes().to_vec();
        }
        _ => {}
    }
}

fn decode_delta(delta: &[u8]) -> Option<i64> {
    match delta.len() {
        4 => Some(i64::from(i32::from_le_bytes(delta.try_into().ok()?))),
        8 => Some(i64::from_le_bytes(delta.try_into().ok()?)),
        _ => None,
    }
}

/// Checks a complete value against the column definition.
fn check_value(column: &ColumnSchema, value: &mut Vec<u8>) -> Result<(), JetErr> {
    if let Some(width) = column.coltyp.fixed_size() {
        if value.len() != width {
            return Err(err::INVALID_BUFFER_SIZE);
        }
        if column.coltyp == ColumnType::Bit {
            value[0] = if value[0] == 0 { 0 } else { 0xFF };
        }
        return Ok(());
    }
    if column.cb_max > 0 && value.len() > column.cb_max as usize {
        return Err(err::COLUMN_TOO_BIG);
    }
    if !column.coltyp.is_long() && value.len() > SHORT_COLUMN_MAX {
        return Err(err::COLUMN_TOO_BIG);
    }
    Ok(())
}

/// Applies one `JetSetColumn` to the pending values.
fn apply_set(
    column: &ColumnSchema,
    values: &mut Values,
    data: Option<&[u8]>,
    data_size: usize,
    grbit: SetColumnGrbit,
    info: Option<&SetInfo>,
) -> Result<(), JetErr> {
    let id = column.columnid.value();
    if grbit.contains(SetColumnGrbit::REVERT_TO_DEFAULT_VALUE) {
        values.remove(&id);
        return Ok(());
    }

    let itag = info.map_or(1, |i| i.itag_sequence) as usize;
    let offset = info.map_or(0, |i| i.ib_long_value) as usize;
    let zero_length = grbit.contains(SetColumnGrbit::ZERO_LENGTH);
    let size_lv = grbit.contains(SetColumnGrbit::SIZE_LV);
    let instances = values.entry(id).or_insert_with(|| column.default.iter().cloned().collect());
    let slot = if itag == 0 || itag > instances.len() {
        None
    } else {
        Some(itag - 1)
    };
    let existing = slot.map(|i| instances[i].clone());

    let new_value: Option<Vec<u8>> = if grbit.contains(
        SetColumnGrbit::OVERWRITE_LV,
    ) && data.is_some() {
        let payload = data.unwrap_or_default();
        let mut value = existing.unwrap_or_default();
        if offset > value.len() {
            return Err(err::COLUMN_NO_CHUNK);
        }
        let end = offset + payload.len();
        if end > value.len() {
            value.resize(end, 0);
        }
        value[offset..end].copy_from_slice(payload);
        if size_lv {
            value.resize(end, 0);
        }
        Some(value)
    } else if grbit.contains(SetColumnGrbit::APPEND_LV) && data.is_some() {
        let mut value = existing.unwrap_or_default();
        value.extend_from_slice(data.unwrap_or_default());
        Some(value)
    } else if size_lv {
        if data_size == 0 && !zero_length {
            None
        } else {
            let mut value = existing.unwrap_or_default();
            value.resize(data_size, 0);
            Some(value)
        }
    } else {
        match data {
            Some(payload) if !payload.is_empty() || zero_length => Some(payload.to_vec()),
            _ if zero_length => Some(Vec::new()),
            _ => None,
        }
    };

    match (new_value, slot) {
        (Some(mut value), slot) => {
            check_value(column, &mut value)?;
            match slot {
                Some(i) => instances[i] = value,
                None => instances.push(value),
            }
        }
        (None, Some(i)) => {
            instances.remove(i);
        }
        (None, None) => {}
    }
    Ok(())
}

fn insert_record(
    table: &mut TableData,
    session: &mut SessionState,
    table_ref: &TableRef,
    mut values: Values,
) -> Result<u64, JetErr> {
    let rid = table.next_rid;
    table.stamp_insert(&mut values);
    table.validate(rid, &values)?;
    table.next_rid += 1;
    table.records.insert(
        rid,
        Record {
            values,
            locked_by: None,
        },
    );
    session.log(Undo::Insert {
        table: table_ref.clone(),
        rid,
    });
    Ok(rid)
}

fn replace_record(
    table: &mut TableData,
    session: &mut SessionState,
    table_ref: &TableRef,
    rid: u64,
    values: Values,
) -> Result<u64, JetErr> {
    let before = table
        .records
        .get(&rid)
        .ok_or(err::RECORD_DELETED)?
        .values
        .clone();
    if let Some(primary) = table.primary() {
        if table.record_key(primary, &before) != table.record_key(primary, &values) {
            return Err(err::RECORD_PRIMARY_CHANGED);
        }
    }
    table.validate(rid, &values)?;
    if let Some(record) = table.records.get_mut(&rid) {
        record.values = values;
    }
    session.log(Undo::Replace {
        table: table_ref.clone(),
        rid,
        before,
    });
    Ok(rid)
}

impl EngineState {
    pub(super) fn prepare_update(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        prep: Prep,
    ) -> Status {
        let (cursor, table, session) = self.cursor_with_session(sesid, tableid)?;
        if prep == Prep::Cancel {
            return match cursor.update.take() {
                Some(_) => Ok(err::SUCCESS),
                None => Err(err::UPDATE_NOT_PREPARED),
            };
        }
        if cursor.update.is_some() {
            return Err(err::ALREADY_PREPARED);
        }
        let update = match prep {
            Prep::Insert => PendingUpdate {
                prep,
                rid: None,
                values: Values::new(),
            },
            Prep::InsertCopy => {
                let rid = cursor.current_rid(table)?;
                let mut values = table.records[&rid].values.clone();
                for column in &table.columns {
                    if column.grbit.contains(ColumndefGrbit::COLUMN_AUTOINCREMENT) {
                        values.remove(&column.columnid.value());
                    }
                }
                PendingUpdate {
                    prep,
                    rid: None,
                    values,
                }
            }
            Prep::Replace | Prep::ReplaceNoLock => {
                let rid = cursor.current_rid(table)?;
                if prep == Prep::Replace {
                    if !session.in_transaction() {
                        return Err(err::NOT_IN_TRANSACTION);
                    }
                    lock_record(table, &cursor.table, session, sesid.value(), rid)?;
                }
                PendingUpdate {
                    prep,
                    rid: Some(rid),
                    values: table.records[&rid].values.clone(),
                }
            }
            Prep::Cancel => return Err(err::INVALID_PARAMETER),
        };
        cursor.update = Some(update);
        Ok(err::SUCCESS)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn set_column(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&[u8]>,
        data_size: u32,
        grbit: SetColumnGrbit,
        info: Option<&SetInfo>,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let update = cursor.update.as_mut().ok_or(err::UPDATE_NOT_PREPARED)?;
        let column = table.column(columnid).ok_or(err::COLUMN_NOT_FOUND)?;
        let size = data_size as usize;
        let data = match data {
            Some(bytes) if bytes.len() < size => return Err(err::INVALID_PARAMETER),
            Some(bytes) => Some(&bytes[..size]),
            None => None,
        };
        if update.rid.is_some() && column.grbit.contains(ColumndefGrbit::COLUMN_AUTOINCREMENT) {
            return Err(err::INVALID_OPERATION);
        }
        apply_set(column, &mut update.values, data, size, grbit, info)?;
        Ok(err::SUCCESS)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn retrieve_column(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveColumnGrbit,
        info: Option<&mut RetrieveInfo>,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let values = match (&cursor.update, grbit.contains(RetrieveColumnGrbit::RETRIEVE_COPY)) {
            (Some(update), true) => &update.values,
            _ => {
                let rid = cursor.current_rid(table)?;
                &table.records[&rid].values
            }
        };
        let column = table.column(columnid).ok_or(err::COLUMN_NOT_FOUND)?;
        let (itag, offset) = match &info {
            Some(info) => (info.itag_sequence.max(1) as usize, info.ib_long_value as usize),
            None => (1, 0),
        };
        if let Some(info) = info {
            info.columnid_next_tagged = ColumnId::NIL;
        }
        let value = match values.get(&columnid.value()) {
            Some(instances) => instances.get(itag - 1).map(Vec::as_slice),
            None if itag == 1 && !grbit.contains(RetrieveColumnGrbit::RETRIEVE_IGNORE_DEFAULT) => {
                column.default.as_deref()
            }
            None => None,
        };
        let Some(value) = value else {
            *actual_size = 0;
            return Ok(wrn::COLUMN_NULL);
        };
        let tail = value.get(offset..).unwrap_or_default();
        Ok(copy_out(tail, data, actual_size))
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn enumerate_columns(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnids: &[EnumColumnId],
        max_data_size: u32,
        grbit: EnumerateColumnsGrbit,
        columns: &mut Vec<EnumColumn>,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        let values = match (&cursor.update, grbit.contains(EnumerateColumnsGrbit::ENUMERATE_COPY)) {
            (Some(update), true) => &update.values,
            _ => {
                let rid = cursor.current_rid(table)?;
                &table.records[&rid].values
            }
        };
        let enumerator = ColumnEnumerator {
            values,
            max_data_size: max_data_size as usize,
            grbit,
        };

        columns.clear();
        if columnids.is_empty() {
            let tagged_only = grbit.contains(EnumerateColumnsGrbit::ENUMERATE_TAGGED_ONLY);
            let mut schema: Vec<&ColumnSchema> = table
                .columns
                .iter()
                .filter(|c| !tagged_only || c.is_tagged())
                .collect();
            schema.sort_by_key(|c| c.columnid.value());
            for column in schema {
                let instances = enumerator.instances(column);
                if !instances.is_empty() {
                    columns.push(enumerator.all(column.columnid, &instances));
                }
            }
            return Ok(err::SUCCESS);
        }

        for requested in columnids {
            let Some(column) = table.column(requested.columnid) else {
                columns.push(EnumColumn {
                    columnid: requested.columnid,
                    err: err::COLUMN_NOT_FOUND,
                    values: Vec::new(),
                });
                continue;
            };
            let instances = enumerator.instances(column);
            let entry = if requested.tags.is_empty() {
                enumerator.all(column.columnid, &instances)
            } else {
                enumerator.tagged(column.columnid, &instances, &requested.tags)
            };
            columns.push(entry);
        }
        Ok(err::SUCCESS)
    }

    pub(super) fn update(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> Status {
        let (cursor, table, session) = self.cursor_with_session(sesid, tableid)?;
        let pending = cursor.update.take().ok_or(err::UPDATE_NOT_PREPARED)?;
        let mut values = pending.values.clone();

        let result = match pending.rid {
            None => insert_record(table, session, &cursor.table, values),
            Some(rid) => {
                table.stamp_replace(&mut values);
                let locked = if pending.prep == Prep::ReplaceNoLock {
                    lock_record(table, &cursor.table, session, sesid.value(), rid)
                } else {
                    Ok(())
                };
                locked.and_then(|()| replace_record(table, session, &cursor.table, rid, values))
            }
        };

        match result {
            Ok(rid) => {
                if matches!(&cursor.position, Position::On((_, current)) if *current == rid) {
                    // A record excluded from the current index keeps its old position.
                    let _ = cursor.position_on(table, rid);
                }
                Ok(copy_out(&bookmark_of(rid), bookmark, actual_size))
            }
            Err(code) => {
                cursor.update = Some(pending);
                Err(code)
            }
        }
    }

    pub(super) fn delete(&mut self, sesid: SessionHandle, tableid: TableHandle) -> Status {
        let (cursor, table, session) = self.cursor_with_session(sesid, tableid)?;
        if cursor.update.is_some() {
            return Err(err::ALREADY_PREPARED);
        }
        let rid = cursor.current_rid(table)?;
        lock_record(table, &cursor.table, session, sesid.value(), rid)?;
        if let Some(record) = table.records.remove(&rid) {
            session.log(Undo::Delete {
                table: cursor.table.clone(),
                rid,
                before: record.values,
            });
        }
        Ok(err::SUCCESS)
    }

    pub(super) fn get_lock(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: GetLockGrbit,
    ) -> Status {
        let (cursor, table, session) = self.cursor_with_session(sesid, tableid)?;
        if !session.in_transaction() {
            return Err(err::NOT_IN_TRANSACTION);
        }
        let rid = cursor.current_rid(table)?;
        if grbit.contains(GetLockGrbit::WRITE_LOCK) {
            lock_record(table, &cursor.table, session, sesid.value(), rid)?;
        } else if grbit.contains(GetLockGrbit::READ_LOCK) {
            match table.records[&rid].locked_by {
                Some(owner) if owner != sesid.value() => return Err(err::WRITE_CONFLICT),
                _ => {}
            }
        } else {
            return Err(err::INVALID_GRBIT);
        }
        Ok(err::SUCCESS)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn escrow_update(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: &[u8],
        previous: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: EscrowUpdateGrbit,
    ) -> Status {
        let (cursor, table, session) = self.cursor_with_session(sesid, tableid)?;
        if !session.in_transaction() {
            return Err(err::NOT_IN_TRANSACTION);
        }
        if cursor.update.is_some() {
            return Err(err::ALREADY_PREPARED);
        }
        let rid = cursor.current_rid(table)?;
        let column = table.column(columnid).ok_or(err::COLUMN_NOT_FOUND)?;
        if !column.grbit.contains(ColumndefGrbit::COLUMN_ESCROW_UPDATE) {
            return Err(err::INVALID_OPERATION);
        }
        let width = column.coltyp.fixed_size().unwrap_or(0);
        let amount = decode_delta(delta)
            .filter(|_| delta.len() == width)
            .ok_or(err::INVALID_BUFFER_SIZE)?;
        let delete_on_zero = column.grbit.contains(ColumndefGrbit::COLUMN_DELETE_ON_ZERO);
        let default = column.default.clone().unwrap_or_else(|| vec![0; width]);

        let record = table.records.get_mut(&rid).ok_or(err::RECORD_DELETED)?;
        let instances = record.values.entry(columnid.value()).or_default();
        if instances.is_empty() {
            instances.push(default);
        }
        let before = instances[0].clone();
        add_escrow(&mut instances[0], amount);
        let reached_zero = instances[0].iter().all(|&b| b == 0);

        if !grbit.contains(EscrowUpdateGrbit::NO_ROLLBACK) {
            session.log(Undo::Escrow {
                table: cursor.table.clone(),
                rid,
                columnid: columnid.value(),
                delta: amount,
            });
        }
        if delete_on_zero && reached_zero {
            if let Some(record) = table.records.remove(&rid) {
                session.log(Undo::Delete {
                    table: cursor.table.clone(),
                    rid,
                    before: record.values,
                });
            }
        }
        Ok(copy_out(&before, previous, actual_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CodePage;

    fn column(coltyp: ColumnType, grbit: ColumndefGrbit) -> ColumnSchema {
        ColumnSchema {
            name: "c".to_string(),
            columnid: ColumnId::new(256),
            coltyp,
            cp: CodePage::NONE,
            cb_max: 0,
            grbit,
            default: None,
        }
    }

    fn get(values: &Values) -> Option<&Vec<u8>> {
        values.get(&256).and_then(|v| v.first())
    }

    #[test]
    fn empty_set_is_null_unless_zero_length() {
        let col = column(ColumnType::LongBinary, ColumndefGrbit::NONE);
        let mut values = Values::new();
        apply_set(&col, &mut values, Some(&[]), 0, SetColumnGrbit::NONE, None).unwrap();
        assert!(get(&values).is_none());
        apply_set(&col, &mut values, Some(&[]), 0, SetColumnGrbit::ZERO_LENGTH, None).unwrap();
        assert_eq!(get(&values), Some(&Vec::new()));
    }

    #[test]
    fn overwrite_past_end_is_rejected() {
        let col = column(ColumnType::LongBinary, ColumndefGrbit::NONE);
        let mut values = Values::new();
        apply_set(&col, &mut values, Some(b"ab"), 2, SetColumnGrbit::NONE, None).unwrap();
        let info = SetInfo {
            ib_long_value: 5,
            itag_sequence: 1,
        };
        let result = apply_set(
            &col,
            &mut values,
            Some(b"x"),
            1,
            SetColumnGrbit::OVERWRITE_LV,
            Some(&info),
        );
        assert_eq!(result.unwrap_err(), err::COLUMN_NO_CHUNK);
    }

    #[test]
    fn overwrite_with_size_sets_exact_length() {
        let col = column(ColumnType::LongBinary, ColumndefGrbit::NONE);
        let mut values = Values::new();
        apply_set(&col, &mut values, Some(b"abcdef"), 6, SetColumnGrbit::NONE, None).unwrap();
        let info = SetInfo {
            ib_long_value: 2,
            itag_sequence: 1,
        };
        apply_set(
            &col,
            &mut values,
            Some(b"XY"),
            2,
            SetColumnGrbit::OVERWRITE_LV | SetColumnGrbit::SIZE_LV,
            Some(&info),
        )
        .unwrap();
        assert_eq!(get(&values), Some(&b"abXY".to_vec()));
    }

    #[test]
    fn size_lv_zero_fills() {
        let col = column(ColumnType::LongBinary, ColumndefGrbit::NONE);
        let mut values = Values::new();
        apply_set(&col, &mut values, None, 3, SetColumnGrbit::SIZE_LV, None).unwrap();
        assert_eq!(get(&values), Some(&vec![0, 0, 0]));
    }

    #[test]
    fn fixed_columns_check_width_and_normalize_bits() {
        let col = column(ColumnType::Long, ColumndefGrbit::NONE);
        let mut values = Values::new();
        let result = apply_set(&col, &mut values, Some(&[1, 2]), 2, SetColumnGrbit::NONE, None);
        assert_eq!(result.unwrap_err(), err::INVALID_BUFFER_SIZE);

        let bit = column(ColumnType::Bit, ColumndefGrbit::NONE);
        apply_set(&bit, &mut values, Some(&[1]), 1, SetColumnGrbit::NONE, None).unwrap();
        assert_eq!(get(&values), Some(&vec![0xFF]));
    }

    #[test]
    fn multi_values_append_and_remove() {
        let col = column(
            ColumnType::Long,
            ColumndefGrbit::COLUMN_TAGGED | ColumndefGrbit::COLUMN_MULTI_VALUED,
        );
        let mut values = Values::new();
        let append = SetInfo {
            ib_long_value: 0,
            itag_sequence: 0,
        };
        for v in [1i32, 2, 3] {
            apply_set(
                &col,
                &mut values,
                Some(&v.to_le_bytes()),
                4,
                SetColumnGrbit::NONE,
                Some(&append),
            ).unwrap();
        }
        assert_eq!(values[&256].len(), 3);
        let second = SetInfo {
            ib_long_value: 0,
            itag_sequence: 2,
        };
        apply_set(&col, &mut values, None, 0, SetColumnGrbit::NONE, Some(&second)).unwrap();
        assert_eq!(values[&256], vec![1i32.to_le_bytes().to_vec(), 3i32.to_le_bytes().to_vec()]);
    }

    #[test]
    fn escrow_arithmetic_wraps() {
        let mut value = i32::MAX.to_le_bytes().to_vec();
        add_escrow(&mut value, 1);
        assert_eq!(value, i32::MIN.to_le_bytes().to_vec());
        let mut wide = 10i64.to_le_bytes().to_vec();
        add_escrow(&mut wide, -3);
        assert_eq!(wide, 7i64.to_le_bytes().to_vec());
    }
}
