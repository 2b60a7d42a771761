//! Typed column retrieval.
//!
//! Variable-length values are read with two attempts: the first into a
//! scratch buffer from the pool, the second (only if the first was
//! truncated) into a buffer of exactly the reported size. A value that is
//! still truncated on the second attempt changed between the two calls and
//! is reported as [`InteropError::ColumnChangedConcurrently`].

use esent_native::grbit::RetrieveColumnGrbit;
use esent_native::{wrn, CodePage, ColumnId, RetrieveInfo, SessionHandle, TableHandle};
use tracing::trace;

use crate::encoding::Encoding;
use crate::error::{InteropError, InteropResult};
use crate::value::FixedColumn;
use crate::Api;

impl Api {
    /// Retrieves a column value as bytes, or `None` if it is null.
    pub fn retrieve_column_bytes(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        grbit: RetrieveColumnGrbit,
        mut info: Option<&mut RetrieveInfo>,
    ) -> InteropResult<Option<Vec<u8>>> {
        let mut scratch = self.buffers().take();
        let (actual, warning) = self.retrieve_column(
            sesid,
            tableid,
            columnid,
            Some(scratch.as_mut_slice()),
            grbit,
            info.as_deref_mut(),
        )?;
        if warning.is(wrn::COLUMN_NULL) {
            return Ok(None);
        }
        if !warning.is(wrn::BUFFER_TRUNCATED) {
            return Ok(Some(scratch[..actual].to_vec()));
        }
        drop(scratch);

        trace!(%columnid, size = actual, "column exceeds scratch buffer, fetching again");
        let mut data = vec![0; actual];
        let (refetched, warning) =
            self.retrieve_column(sesid, tableid, columnid, Some(data.as_mut_slice()), grbit, info)?;
        if warning.is(wrn::BUFFER_TRUNCATED) {
            return Err(InteropError::ColumnChangedConcurrently {
                expected: actual,
                actual: refetched,
            });
        }
        if warning.is(wrn::COLUMN_NULL) {
            return Ok(None);
        }
        data.truncate(refetched);
        Ok(Some(data))
    }

    /// Retrieves a text column decoded with `code_page`, or `None` if it is
    /// null.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::InvalidEncoding`] before touching the engine
    /// if `code_page` is neither ASCII nor Unicode.
    pub fn retrieve_column_string(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        code_page: CodePage,
        grbit: RetrieveColumnGrbit,
    ) -> InteropResult<Option<String>> {
        let encoding = Encoding::for_code_page(code_page)?;
        let bytes = self.retrieve_column_bytes(sesid, tableid, columnid, grbit, None)?;
        Ok(bytes.map(|bytes| encoding.decode(&bytes)))
    }

    /// Retrieves a fixed-width value, or `None` if the column is null.
    ///
    /// # Errors
    ///
    /// Returns [`InteropError::DataSizeMismatch`] if the stored value is not
    /// exactly `T::SIZE` bytes wide.
    pub fn retrieve_column_as<T: FixedColumn>(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        grbit: RetrieveColumnGrbit,
    ) -> InteropResult<Option<T>> {
        let mut raw = vec![0; T::SIZE];
        let (actual, warning) =
            self.retrieve_column(sesid, tableid, columnid, Some(raw.as_mut_slice()), grbit, None)?;
        if warning.is(wrn::COLUMN_NULL) {
            return Ok(None);
        }
        if actual != T::SIZE {
            return Err(InteropError::data_size_mismatch(T::SIZE, actual));
        }
        Ok(Some(T::decode(&raw)))
    }

    /// Size of a column value in bytes, or `None` if it is null.
    pub fn retrieve_column_size(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        grbit: RetrieveColumnGrbit,
        info: Option<&mut RetrieveInfo>,
    ) -> InteropResult<Option<usize>> {
        let (actual, warning) = self.retrieve_column(sesid, tableid, columnid, None, grbit, info)?;
        if warning.is(wrn::COLUMN_NULL) {
            Ok(None)
        } else {
            Ok(Some(actual))
        }
    }

    /// Retrieves every value of a multi-valued column in sequence order.
    pub fn retrieve_column_values(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        grbit: RetrieveColumnGrbit,
    ) -> InteropResult<Vec<Vec<u8>>> {
        let mut values = Vec::new();
        for itag_sequence in 1.. {
            let mut info = RetrieveInfo {
                itag_sequence,
                ..RetrieveInfo::default()
            };
            match self.retrieve_column_bytes(sesid, tableid, columnid, grbit, Some(&mut info))? {
                Some(value) => values.push(value),
                None => break,
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use crate::Config;
    use esent_native::grbit::SetColumnGrbit;
    use esent_native::{InMemoryEngine, SetInfo};
    use std::sync::Arc;
    use uuid::Uuid;

    const COPY: RetrieveColumnGrbit = RetrieveColumnGrbit::RETRIEVE_COPY;

    #[test]
    fn scalars_round_trip_through_the_copy_buffer() {
        let f = Fixture::new();
        let (s, t) = (f.sesid, f.tableid);
        f.begin_insert(1);
        let guid = Uuid::new_v4();
        f.api.set_column_value(s, t, f.column("bool"), true).unwrap();
        f.api.set_column_value(s, t, f.column("byte"), 0xA5u8).unwrap();
        f.api.set_column_value(s, t, f.column("int16"), -2i16).unwrap();
        f.api.set_column_value(s, t, f.column("uint16"), 65000u16).unwrap();
        f.api.set_column_value(s, t, f.column("int32"), i32::MIN).unwrap();
        f.api.set_column_value(s, t, f.column("uint32"), u32::MAX).unwrap();
        f.api.set_column_value(s, t, f.column("int64"), -1i64 << 40).unwrap();
        f.api.set_column_value(s, t, f.column("float"), 1.5f32).unwrap();
        f.api.set_column_value(s, t, f.column("double"), -0.25f64).unwrap();
        f.api.set_column_value(s, t, f.column("guid"), guid).unwrap();

        assert_eq!(
            f.api.retrieve_column_as::<bool>(s, t, f.column("bool"), COPY).unwrap(),
            Some(true)
        );
        assert_eq!(
            f.api.retrieve_column_as::<u8>(s, t, f.column("byte"), COPY).unwrap(),
            Some(0xA5)
        );
        assert_eq!(
            f.api.retrieve_column_as::<i16>(s, t, f.column("int16"), COPY).unwrap(),
            Some(-2)
        );
        assert_eq!(
            f.api.retrieve_column_as::<u16>(s, t, f.column("uint16"), COPY).unwrap(),
            Some(65000)
        );
        assert_eq!(
            f.api.retrieve_column_as::<i32>(s, t, f.column("int32"), COPY).unwrap(),
            Some(i32::MIN)
        );
        assert_eq!(
            f.api.retrieve_column_as::<u32>(s, t, f.column("uint32"), COPY).unwrap(),
            Some(u32::MAX)
        );
        assert_eq!(
            f.api.retrieve_column_as::<i64>(s, t, f.column("int64"), COPY).unwrap(),
            Some(-1 << 40)
        );
        assert_eq!(
            f.api.retrieve_column_as::<f32>(s, t, f.column("float"), COPY).unwrap(),
            Some(1.5)
        );
        assert_eq!(
            f.api.retrieve_column_as::<f64>(s, t, f.column("double"), COPY).unwrap(),
            Some(-0.25)
        );
        assert_eq!(
            f.api.retrieve_column_as::<Uuid>(s, t, f.column("guid"), COPY).unwrap(),
            Some(guid)
        );
    }

    #[test]
    fn null_columns_retrieve_as_none() {
        let f = Fixture::new();
        f.begin_insert(1);
        let (s, t) = (f.sesid, f.tableid);
        assert_eq!(f.api.retrieve_column_as::<i32>(s, t, f.column("int32"), COPY).unwrap(), None);
        assert_eq!(
            f.api.retrieve_column_bytes(s, t, f.column("binary"), COPY, None).unwrap(),
            None
        );
        assert_eq!(f.api.retrieve_column_size(s, t, f.column("binary"), COPY, None).unwrap(), None);
    }

    #[test]
    fn wrong_width_is_a_size_mismatch() {
        let f = Fixture::new();
        f.begin_insert(1);
        f.api
            .set_column_value(f.sesid, f.tableid, f.column("int64"), 7i64)
            .unwrap();
        let result = f
            .api
            .retrieve_column_as::<i32>(f.sesid, f.tableid, f.column("int64"), COPY);
        assert!(matches!(
            result,
            Err(InteropError::DataSizeMismatch { expected: 4, actual: 8 })
        ));
    }

    #[test]
    fn values_larger_than_the_scratch_buffer_are_fetched_whole() {
        let api = Api::new(
            Arc::new(InMemoryEngine::new()),
            Config::new().buffer_size(16).max_cached_buffer_size(16),
        )
        .unwrap();
        let f = Fixture::with_api(api);
        f.begin_insert(1);
        let data: Vec<u8> = (0..=255).cycle().take(1000).collect();
        f.api
            .set_column_bytes(f.sesid, f.tableid, f.column("binary"), &data)
            .unwrap();
        f.save();
        f.api
            .move_cursor(f.sesid, f.tableid, esent_native::MOVE_FIRST, Default::default())
            .unwrap();
        let fetched = f
            .api
            .retrieve_column_bytes(
                f.sesid,
                f.tableid,
                f.column("binary"),
                RetrieveColumnGrbit::NONE,
                None,
            )
            .unwrap();
        assert_eq!(fetched, Some(data));
    }

    #[test]
    fn zero_length_is_not_null() {
        let f = Fixture::new();
        f.begin_insert(1);
        f.api
            .set_column_bytes(f.sesid, f.tableid, f.column("binary"), &[])
            .unwrap();
        let (s, t) = (f.sesid, f.tableid);
        assert_eq!(
            f.api.retrieve_column_bytes(s, t, f.column("binary"), COPY, None).unwrap(),
            Some(vec![])
        );
        assert_eq!(
            f.api.retrieve_column_size(s, t, f.column("binary"), COPY, None).unwrap(),
            Some(0)
        );
    }

    #[test]
    fn strings_decode_with_the_requested_encoding() {
        let f = Fixture::new();
        f.begin_insert(1);
        let (s, t) = (f.sesid, f.tableid);
        f.api
            .set_column_string(s, t, f.column("unicode"), "naïve ☃", CodePage::UNICODE)
            .unwrap();
        f.api
            .set_column_string(s, t, f.column("ascii"), "plain", CodePage::ASCII)
            .unwrap();
        assert_eq!(
            f.api.retrieve_column_string(
                s,
                t,
                f.column("unicode"),
                CodePage::UNICODE,
                COPY,
            ).unwrap(),
            Some("naïve ☃".to_string())
        );
        assert_eq!(
            f.api.retrieve_column_string(s, t, f.column("ascii"), CodePage::ASCII, COPY).unwrap(),
            Some("plain".to_string())
        );
    }

    #[test]
    fn unsupported_encoding_is_rejected() {
        let f = Fixture::new();
        f.begin_insert(1);
        let result = f.api.retrieve_column_string(
            f.sesid,
            f.tableid,
            f.column("ascii"),
            CodePage(65001),
            COPY,
        );
        assert!(matches!(result, Err(InteropError::InvalidEncoding { code_page: 65001 })));
    }

    #[test]
    fn multi_values_are_listed_in_order() {
        let f = Fixture::new();
        f.begin_insert(1);
        let append = SetInfo::default();
        for value in [10i32, 20, 30] {
            f.api
                .set_column(
                    f.sesid,
                    f.tableid,
                    f.column("tags"),
                    Some(&value.to_le_bytes()),
                    4,
                    SetColumnGrbit::NONE,
                    Some(&append),
                )
                .unwrap();
        }
        let values = f
            .api
            .retrieve_column_values(f.sesid, f.tableid, f.column("tags"), COPY)
            .unwrap();
        let values: Vec<i32> = values.iter().map(|v| i32::decode(v)).collect();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn engine_errors_propagate() {
        let f = Fixture::new();
        let result = f.api.retrieve_column_bytes(
            f.sesid,
            f.tableid,
            f.column("binary"),
            RetrieveColumnGrbit::NONE,
            None,
        );
        assert!(result.unwrap_err().is(esent_native::err::NO_CURRENT_RECORD));
    }
}
