//! Record and column calls.

use esent_native::grbit::{
    EnumerateColumnsGrbit, EscrowUpdateGrbit, GetLockGrbit, RetrieveColumnGrbit, SetColumnGrbit,
};
use esent_native::{
    ColumnId, EnumColumn, EnumColumnId, Prep, RetrieveInfo, SessionHandle, SetInfo, TableHandle,
};

use super::{native_size, Api};
use crate::error::{InteropError, InteropResult};
use crate::status::JetWarning;

impl Api {
    /// Copies a column value into `data`.
    ///
    /// Returns the full size of the value, which may exceed the buffer, and
    /// the status (`JET_wrnColumnNull`, `JET_wrnBufferTruncated`, ...).
    pub fn retrieve_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&mut [u8]>,
        grbit: RetrieveColumnGrbit,
        info: Option<&mut RetrieveInfo>,
    ) -> InteropResult<(usize, JetWarning)> {
        let mut actual = 0;
        let warning = self.check(self.engine().retrieve_column(
            sesid,
            tableid,
            columnid,
            data,
            &mut actual,
            grbit,
            info,
        ))?;
        Ok((actual as usize, warning))
    }

    /// Sets a column of the pending update.
    ///
    /// `data_size` bytes of `data` are written. `data` may be `None` with a
    /// non-zero size only together with `SIZE_LV`.
    pub fn set_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&[u8]>,
        data_size: usize,
        grbit: SetColumnGrbit,
        info: Option<&SetInfo>,
    ) -> InteropResult<JetWarning> {
        match data {
            Some(bytes) if data_size > bytes.len() => {
                return Err(InteropError::invalid_argument(format!(
                    "data size {data_size} exceeds buffer of {} bytes",
                    bytes.len()
                )));
            }
            None if data_size > 0 && !grbit.contains(SetColumnGrbit::SIZE_LV) => {
                return Err(InteropError::invalid_argument("data size given without data"));
            }
            _ => {}
        }
        let size = native_size(data_size)?;
        let data = data.map(|bytes| &bytes[..data_size]);
        self.check(
            self.engine()
                .set_column(sesid, tableid, columnid, data, size, grbit, info),
        )
    }

    /// Enumerates the values of the current record, or with
    /// `JET_bitEnumerateCopy` of the pending update.
    ///
    /// An empty `columnids` enumerates every column holding a value. Values
    /// longer than a nonzero `max_data_size` come back truncated with
    /// `JET_wrnColumnTruncated` on the value.
    pub fn enumerate_columns(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnids: &[EnumColumnId],
        max_data_size: u32,
        grbit: EnumerateColumnsGrbit,
    ) -> InteropResult<Vec<EnumColumn>> {
        let mut columns = Vec::new();
        self.check(self.engine().enumerate_columns(
            sesid,
            tableid,
            columnids,
            max_data_size,
            grbit,
            &mut columns,
        ))?;
        Ok(columns)
    }

    /// Deletes the current record.
    pub fn delete(&self, sesid: SessionHandle, tableid: TableHandle) -> InteropResult<JetWarning> {
        self.check(self.engine().delete(sesid, tableid))
    }

    /// Starts, or with [`Prep::Cancel`] abandons, an update.
    pub fn prepare_update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        prep: Prep,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().prepare_update(sesid, tableid, prep))
    }

    /// Saves the pending update and copies the bookmark of the record into
    /// `bookmark`. Returns the bookmark size.
    pub fn update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
    ) -> InteropResult<usize> {
        let mut actual = 0;
        self.check(self.engine().update(sesid, tableid, bookmark, &mut actual))?;
        Ok(actual as usize)
    }

    /// Locks the current record.
    pub fn get_lock(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: GetLockGrbit,
    ) -> InteropResult<JetWarning> {
        self.check(self.engine().get_lock(sesid, tableid, grbit))
    }

    /// Adds `delta` to an escrow column in place, copying the previous value
    /// into `previous`. Returns the size of the previous value.
    pub fn escrow_update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: &[u8],
        previous: Option<&mut [u8]>,
        grbit: EscrowUpdateGrbit,
    ) -> InteropResult<usize> {
        if delta.is_empty() {
            return Err(InteropError::invalid_argument("escrow delta is empty"));
        }
        let mut actual = 0;
        self.check(self.engine().escrow_update(
            sesid,
            tableid,
            columnid,
            delta,
            previous,
            &mut actual,
            grbit,
        ))?;
        Ok(actual as usize)
    }
}
