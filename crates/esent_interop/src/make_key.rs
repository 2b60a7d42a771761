//! Typed search-key construction.

use esent_native::grbit::MakeKeyGrbit;
use esent_native::{CodePage, SessionHandle, TableHandle};

use crate::encoding::Encoding;
use crate::error::InteropResult;
use crate::status::JetWarning;
use crate::value::FixedColumn;
use crate::Api;

impl Api {
    /// Adds a fixed-width value to the search key.
    pub fn make_key_value<T: FixedColumn>(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        value: T,
        grbit: MakeKeyGrbit,
    ) -> InteropResult<JetWarning> {
        let bytes = value.to_bytes();
        self.make_key(sesid, tableid, Some(bytes.as_slice()), grbit)
    }

    /// Adds a byte value to the search key. An empty slice is a zero-length
    /// segment, not a null one.
    pub fn make_key_bytes(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        data: &[u8],
        grbit: MakeKeyGrbit,
    ) -> InteropResult<JetWarning> {
        let grbit = if data.is_empty() {
            grbit | MakeKeyGrbit::KEY_DATA_ZERO_LENGTH
        } else {
            grbit
        };
        self.make_key(sesid, tableid, Some(data), grbit)
    }

    /// Adds text encoded with `code_page` to the search key.
    pub fn make_key_string(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        text: &str,
        code_page: CodePage,
        grbit: MakeKeyGrbit,
    ) -> InteropResult<JetWarning> {
        let encoding = Encoding::for_code_page(code_page)?;
        self.make_key_bytes(sesid, tableid, &encoding.encode(text), grbit)
    }

    /// Adds a null segment to the search key.
    pub fn make_key_null(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: MakeKeyGrbit,
    ) -> InteropResult<JetWarning> {
        self.make_key(sesid, tableid, None, grbit)
    }
}
