//! Typed column setters and escrow updates.

use esent_native::grbit::{EscrowUpdateGrbit, SetColumnGrbit};
use esent_native::{CodePage, ColumnId, SessionHandle, TableHandle};

use crate::encoding::Encoding;
use crate::error::{InteropError, InteropResult};
use crate::status::JetWarning;
use crate::value::FixedColumn;
use crate::Api;

impl Api {
    /// Sets a fixed-width value in the pending update.
    pub fn set_column_value<T: FixedColumn>(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        value: T,
    ) -> InteropResult<JetWarning> {
        let bytes = value.to_bytes();
        self.set_column(
            sesid,
            tableid,
            columnid,
            Some(bytes.as_slice()),
            T::SIZE,
            SetColumnGrbit::NONE,
            None,
        )
    }

    /// Sets a byte value. An empty slice stores a zero-length value, not null.
    pub fn set_column_bytes(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: &[u8],
    ) -> InteropResult<JetWarning> {
        let grbit = if data.is_empty() {
            SetColumnGrbit::ZERO_LENGTH
        } else {
            SetColumnGrbit::NONE
        };
        self.set_column(sesid, tableid, columnid, Some(data), data.len(), grbit, None)
    }

    /// Sets text encoded with `code_page`. An empty string stores a
    /// zero-length value, not null.
    pub fn set_column_string(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        text: &str,
        code_page: CodePage,
    ) -> InteropResult<JetWarning> {
        let encoding = Encoding::for_code_page(code_page)?;
        self.set_column_bytes(sesid, tableid, columnid, &encoding.encode(text))
    }

    /// Sets a column to null.
    pub fn set_column_null(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
    ) -> InteropResult<JetWarning> {
        self.set_column(sesid, tableid, columnid, None, 0, SetColumnGrbit::NONE, None)
    }

    /// Atomically adds `delta` to a 32-bit escrow column of the current
    /// record and returns the value it held before.
    pub fn escrow_add(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: i32,
    ) -> InteropResult<i32> {
        self.escrow_add_value(sesid, tableid, columnid, delta)
    }

    /// 64-bit counterpart of [`escrow_add`](Self::escrow_add).
    pub fn escrow_add_i64(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: i64,
    ) -> InteropResult<i64> {
        self.escrow_add_value(sesid, tableid, columnid, delta)
    }

    fn escrow_add_value<T: FixedColumn>(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: T,
    ) -> InteropResult<T> {
        let mut previous = vec![0; T::SIZE];
        let actual = self.escrow_update(
            sesid,
            tableid,
            columnid,
            &delta.to_bytes(),
            Some(previous.as_mut_slice()),
            EscrowUpdateGrbit::NONE,
        )?;
        if actual != T::SIZE {
            return Err(InteropError::data_size_mismatch(T::SIZE, actual));
        }
        Ok(T::decode(&previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use esent_native::grbit::RetrieveColumnGrbit;
    use esent_native::{err, MOVE_FIRST};

    const COPY: RetrieveColumnGrbit = RetrieveColumnGrbit::RETRIEVE_COPY;

    #[test]
    fn null_clears_a_value() {
        let f = Fixture::new();
        let (s, t) = (f.sesid, f.tableid);
        f.begin_insert(1);
        f.api.set_column_value(s, t, f.column("int32"), 5i32).unwrap();
        f.api.set_column_null(s, t, f.column("int32")).unwrap();
        assert_eq!(f.api.retrieve_column_as::<i32>(s, t, f.column("int32"), COPY).unwrap(), None);
    }

    #[test]
    fn empty_string_is_zero_length() {
        let f = Fixture::new();
        let (s, t) = (f.sesid, f.tableid);
        f.begin_insert(1);
        f.api
            .set_column_string(s, t, f.column("unicode"), "", CodePage::UNICODE)
            .unwrap();
        assert_eq!(
            f.api.retrieve_column_string(
                s,
                t,
                f.column("unicode"),
                CodePage::UNICODE,
                COPY,
            ).unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn unsupported_encoding_is_rejected_before_the_engine() {
        let f = Fixture::new();
        // No update is prepared, so reaching the engine would fail differently.
        let result = f
            .api
            .set_column_string(f.sesid, f.tableid, f.column("ascii"), "x", CodePage(437));
        assert!(matches!(result, Err(InteropError::InvalidEncoding { code_page: 437 })));
    }

    #[test]
    fn set_without_update_fails_in_the_engine() {
        let f = Fixture::new();
        let error = f
            .api
            .set_column_value(f.sesid, f.tableid, f.column("int32"), 1i32)
            .unwrap_err();
        assert!(error.is(err::UPDATE_NOT_PREPARED));
    }

    #[test]
    fn escrow_returns_the_previous_value() {
        let f = Fixture::new();
        f.insert_keys(&[1]);
        let (s, t) = (f.sesid, f.tableid);
        f.api.move_cursor(s, t, MOVE_FIRST, Default::default()).unwrap();
        f.api.begin_transaction(s).unwrap();
        assert_eq!(f.api.escrow_add(s, t, f.column("counter"), 5).unwrap(), 0);
        assert_eq!(f.api.escrow_add(s, t, f.column("counter"), -2).unwrap(), 5);
        f.api.commit_transaction(s, Default::default()).unwrap();
        assert_eq!(
            f.api
                .retrieve_column_as::<i32>(s, t, f.column("counter"), RetrieveColumnGrbit::NONE)
                .unwrap(),
            Some(3)
        );
    }

    #[test]
    fn escrow_width_must_match_the_column() {
        let f = Fixture::new();
        f.insert_keys(&[1]);
        let (s, t) = (f.sesid, f.tableid);
        f.api.move_cursor(s, t, MOVE_FIRST, Default::default()).unwrap();
        f.api.begin_transaction(s).unwrap();
        let error = f.api.escrow_add_i64(s, t, f.column("counter"), 1).unwrap_err();
        assert!(error.is(err::INVALID_BUFFER_SIZE));
    }
}
