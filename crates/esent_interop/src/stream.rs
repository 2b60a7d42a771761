//! `std::io` access to a single long-value column.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;

use esent_native::grbit::{RetrieveColumnGrbit, SetColumnGrbit};
use esent_native::{wrn, ColumnId, RetrieveInfo, SessionHandle, SetInfo, TableHandle};

use crate::error::{InteropError, InteropResult};
use crate::Api;

/// Largest offset a long value can be addressed at.
pub const MAX_LONG_VALUE_OFFSET: u64 = 0x7fff_ffff;

/// Reads and writes one column of the record being updated.
///
/// Reads use the copy buffer of the pending update, so data written through
/// the stream is visible to later reads before the update is saved. The
/// length is asked of the engine on every call and never cached. Like the
/// cursor it reads through, a stream stays on one thread:
///
/// ```compile_fail
/// use esent_interop::{Api, ColumnStream};
/// use esent_native::{ColumnId, SessionHandle, TableHandle};
///
/// let api = Api::in_memory();
/// let stream = ColumnStream::new(&api, SessionHandle::NIL, TableHandle::NIL, ColumnId::NIL);
/// std::thread::scope(|scope| {
///     scope.spawn(move || drop(stream));
/// });
/// ```
#[derive(Debug)]
pub struct ColumnStream<'a> {
    api: &'a Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    columnid: ColumnId,
    offset: u64,
    itag: u32,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ColumnStream<'a> {
    /// Creates a stream over the first value of `columnid`.
    #[must_use]
    pub fn new(
        api: &'a Api,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
    ) -> Self {
        Self {
            api,
            sesid,
            tableid,
            columnid,
            offset: 0,
            itag: 1,
            _not_send: PhantomData,
        }
    }

    /// Selects the multi-value instance, starting at 1.
    pub fn with_itag(mut self, itag: u32) -> InteropResult<Self> {
        if itag == 0 {
            return Err(InteropError::invalid_argument("itag sequence starts at 1"));
        }
        self.itag = itag;
        Ok(self)
    }

    /// The multi-value instance the stream addresses.
    #[must_use]
    pub fn itag(&self) -> u32 {
        self.itag
    }

    /// Current offset.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Length of the value in bytes; a null value has length 0.
    pub fn len(&self) -> InteropResult<u64> {
        let mut info = self.retrieve_info(0);
        let (actual, _) = self.api.retrieve_column(
            self.sesid,
            self.tableid,
            self.columnid,
            None,
            RetrieveColumnGrbit::RETRIEVE_COPY,
            Some(&mut info),
        )?;
        Ok(actual as u64)
    }

    /// Returns true if the value is empty or null.
    pub fn is_empty(&self) -> InteropResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Truncates or zero-extends the value to `len` bytes.
    ///
    /// A length of zero leaves an empty value rather than null. The offset is
    /// clamped to the new length.
    pub fn set_len(&mut self, len: u64) -> InteropResult<()> {
        let size = checked_offset(len)?;
        let grbit = if size == 0 {
            SetColumnGrbit::SIZE_LV | SetColumnGrbit::ZERO_LENGTH
        } else {
            SetColumnGrbit::SIZE_LV
        };
        let info = self.set_info(0);
        self.api
            .set_column(self.sesid, self.tableid, self.columnid, None, size, grbit, Some(&info))?;
        self.offset = self.offset.min(len);
        Ok(())
    }

    fn read_at_offset(&mut self, buf: &mut [u8]) -> InteropResult<usize> {
        let len = self.len()?;
        if buf.is_empty() || self.offset >= len {
            return Ok(0);
        }
        let remaining = usize::try_from(len - self.offset).unwrap_or(usize::MAX);
        let wanted = buf.len().min(remaining);
        let mut info = self.retrieve_info(checked_offset(self.offset)?);
        let (actual, warning) = self.api.retrieve_column(
            self.sesid,
            self.tableid,
            self.columnid,
            Some(&mut buf[..wanted]),
            RetrieveColumnGrbit::RETRIEVE_COPY,
            Some(&mut info),
        )?;
        let read = if warning.is(wrn::COLUMN_NULL) {
            0
        } else {
            actual.min(wanted)
        };
        self.offset += read as u64;
        Ok(read)
    }

    fn write_at_offset(&mut self, buf: &[u8]) -> InteropResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let end = self.offset + buf.len() as u64;
        checked_offset(end)?;
        let len = self.len()?;
        if self.offset > len {
            let gap = self.set_info(0);
            self.api.set_column(
                self.sesid,
                self.tableid,
                self.columnid,
                None,
                checked_offset(self.offset)?,
                SetColumnGrbit::SIZE_LV,
                Some(&gap),
            )?;
        }
        let grbit = if end > len {
            SetColumnGrbit::OVERWRITE_LV | SetColumnGrbit::SIZE_LV
        } else {
            SetColumnGrbit::OVERWRITE_LV
        };
        let info = self.set_info(checked_offset(self.offset)? as u32);
        self.api.set_column(
            self.sesid,
            self.tableid,
            self.columnid,
            Some(buf),
            buf.len(),
            grbit,
            Some(&info),
        )?;
        self.offset = end;
        Ok(buf.len())
    }

    fn retrieve_info(&self, offset: usize) -> RetrieveInfo {
        RetrieveInfo {
            ib_long_value: offset as u32,
            itag_sequence: self.itag,
            ..RetrieveInfo::default()
        }
    }

    fn set_info(&self, offset: u32) -> SetInfo {
        SetInfo {
            ib_long_value: offset,
            itag_sequence: self.itag,
        }
    }
}

/// Converts an offset, rejecting anything past the long-value limit.
fn checked_offset(offset: u64) -> InteropResult<usize> {
    if offset > MAX_LONG_VALUE_OFFSET {
        return Err(InteropError::invalid_argument(format!(
            "offset {offset} is beyond the long-value limit"
        )));
    }
    Ok(offset as usize)
}

impl Read for ColumnStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_at_offset(buf)?)
    }
}

impl Write for ColumnStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_at_offset(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for ColumnStream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.offset) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.len()?) + i128::from(delta),
        };
        if !(0..=i128::from(MAX_LONG_VALUE_OFFSET)).contains(&target) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {target} is outside the long-value range"),
            ));
        }
        self.offset = target as u64;
        Ok(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use proptest::prelude::*;

    fn stream(f: &Fixture) -> ColumnStream<'_> {
        ColumnStream::new(&f.api, f.sesid, f.tableid, f.column("binary"))
    }

    #[test]
    fn write_then_read_back() {
        let f = Fixture::new();
        f.begin_insert(1);
        let mut s = stream(&f);
        s.write_all(b"hello, world").unwrap();
        assert_eq!(s.len().unwrap(), 12);
        s.seek(SeekFrom::Start(7)).unwrap();
        let mut rest = String::new();
        s.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");
    }

    #[test]
    fn writing_past_the_end_fills_the_gap_with_zeros() {
        let f = Fixture::new();
        f.begin_insert(1);
        let mut s = stream(&f);
        s.write_all(b"ab").unwrap();
        s.seek(SeekFrom::Start(5)).unwrap();
        s.write_all(b"z").unwrap();
        s.rewind().unwrap();
        let mut data = Vec::new();
        s.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"ab\0\0\0z");
    }

    #[test]
    fn set_len_zero_leaves_an_empty_value() {
        let f = Fixture::new();
        f.begin_insert(1);
        let mut s = stream(&f);
        s.write_all(b"data").unwrap();
        s.set_len(0).unwrap();
        assert_eq!(s.position(), 0);
        let mut buf = [0u8; 4];
        assert_eq!(s.read(&mut buf).unwrap(), 0);
        let size = f
            .api
            .retrieve_column_size(
                f.sesid,
                f.tableid,
                f.column("binary"),
                RetrieveColumnGrbit::RETRIEVE_COPY,
                None,
            )
            .unwrap();
        assert_eq!(size, Some(0));
    }

    #[test]
    fn set_len_clamps_the_offset() {
        let f = Fixture::new();
        f.begin_insert(1);
        let mut s = stream(&f);
        s.write_all(&[1; 10]).unwrap();
        s.set_len(4).unwrap();
        assert_eq!(s.position(), 4);
        s.set_len(8).unwrap();
        s.rewind().unwrap();
        let mut data = Vec::new();
        s.read_to_end(&mut data).unwrap();
        assert_eq!(data, [1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn seeks_outside_the_range_are_rejected() {
        let f = Fixture::new();
        f.begin_insert(1);
        let mut s = stream(&f);
        assert_eq!(
            s.seek(SeekFrom::Current(-1)).unwrap_err().kind(),
            io::ErrorKind::InvalidInput
        );
        assert!(s.seek(SeekFrom::Start(MAX_LONG_VALUE_OFFSET + 1)).is_err());
        assert_eq!(s.seek(SeekFrom::Start(MAX_LONG_VALUE_OFFSET)).unwrap(), MAX_LONG_VALUE_OFFSET);
        assert_eq!(s.write(b"x").unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn seek_from_end_uses_the_current_length() {
        let f = Fixture::new();
        f.begin_insert(1);
        let mut s = stream(&f);
        s.write_all(b"0123456789").unwrap();
        assert_eq!(s.seek(SeekFrom::End(-3)).unwrap(), 7);
        let mut tail = Vec::new();
        s.read_to_end(&mut tail).unwrap();
        assert_eq!(tail, b"789");
    }

    #[test]
    fn itag_zero_is_rejected() {
        let f = Fixture::new();
        assert!(stream(&f).with_itag(0).is_err());
        assert_eq!(stream(&f).with_itag(2).unwrap().itag(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Write(u64, Vec<u8>),
        Read(u64, usize),
        SetLen(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (
                0u64..64,
                prop::collection::vec(any::<u8>(), 0..32),
            ).prop_map(|(o, d)| Op::Write(o, d)),
            (0u64..96, 0usize..48).prop_map(|(o, n)| Op::Read(o, n)),
            (0u64..96).prop_map(Op::SetLen),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn stream_behaves_like_a_vec(ops in prop::collection::vec(op(), 1..24)) {
            let f = Fixture::new();
            f.begin_insert(1);
            let mut s = stream(&f);
            let mut model: Vec<u8> = Vec::new();

            for op in ops {
                match op {
                    Op::Write(offset, data) => {
                        s.seek(SeekFrom::Start(offset)).unwrap();
                        s.write_all(&data).unwrap();
                        if !data.is_empty() {
                            let offset = offset as usize;
                            let end = offset + data.len();
                            if model.len() < end {
                                model.resize(end, 0);
                            }
                            model[offset..end].copy_from_slice(&data);
                        }
                    }
                    Op::Read(offset, n) => {
                        s.seek(SeekFrom::Start(offset)).unwrap();
                        let mut buf = vec![0u8; n];
                        let read = s.read(&mut buf).unwrap();
                        let start = (offset as usize).min(model.len());
                        let end = (start + n).min(model.len());
                        prop_assert_eq!(&buf[..read], &model[start..end]);
                    }
                    Op::SetLen(len) => {
                        s.set_len(len).unwrap();
                        model.resize(len as usize, 0);
                    }
                }
                prop_assert_eq!(s.len().unwrap(), model.len() as u64);
            }
        }
    }
}
