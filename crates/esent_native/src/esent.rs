//! Bindings to `esent.dll`.
//!
//! ANSI entry points are used throughout. Strings are converted to
//! NUL-terminated byte strings at the call boundary and a string with an
//! interior NUL is rejected with `JET_errInvalidParameter` before the engine
//! is reached.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ffi::{c_char, c_void, CString};
use std::ptr;

use crate::api::JetApi;
use crate::codes::{err, wrn, JetErr};
use crate::grbit::{
    AttachDatabaseGrbit, CloseDatabaseGrbit, ColumndefGrbit, CommitTransactionGrbit,
    CreateDatabaseGrbit, CreateIndexGrbit, CreateInstanceGrbit, DupCursorGrbit, EndSessionGrbit,
    EnumerateColumnsGrbit, EscrowUpdateGrbit, GetLockGrbit, IntersectIndexesGrbit, MakeKeyGrbit,
    MoveGrbit, OpenDatabaseGrbit, OpenTableGrbit, ResetTableSequentialGrbit, RetrieveColumnGrbit,
    RetrieveKeyGrbit, RollbackTransactionGrbit, SeekGrbit, SetColumnGrbit, SetIndexRangeGrbit,
    SetTableSequentialGrbit, TempTableGrbit, TermGrbit,
};
use crate::handles::{ColumnId, DatabaseHandle, InstanceHandle, SessionHandle, TableHandle};
use crate::types::{
    CodePage, ColumnDef, ColumnList, ColumnType, EnumColumn, EnumColumnId, EnumColumnValue,
    IndexList, IndexRange, ObjectList, ObjectType, ParamId, Prep, RecordList, RecordPosition,
    RetrieveInfo, SetInfo,
};

type JetApiPtr = usize;

const COL_INFO: u32 = 0;
const COL_INFO_LIST: u32 = 1;
const IDX_INFO_LIST: u32 = 1;
const OBJ_INFO_LIST_NO_STATS: u32 = 1;

#[repr(C)]
struct JetColumnDef {
    cb_struct: u32,
    columnid: u32,
    coltyp: u32,
    w_country: u16,
    langid: u16,
    cp: u16,
    w_collate: u16,
    cb_max: u32,
    grbit: u32,
}

#[repr(C)]
struct JetRetInfo {
    cb_struct: u32,
    ib_long_value: u32,
    itag_sequence: u32,
    columnid_next_tagged: u32,
}

#[repr(C)]
struct JetSetInfo {
    cb_struct: u32,
    ib_long_value: u32,
    itag_sequence: u32,
}

#[repr(C)]
struct JetRecPos {
    cb_struct: u32,
    centries_lt: u32,
    centries_in_range: u32,
    centries_total: u32,
}

#[repr(C)]
struct JetIndexRange {
    cb_struct: u32,
    tableid: JetApiPtr,
    grbit: u32,
}

#[repr(C)]
#[derive(Default)]
struct JetRecordList {
    cb_struct: u32,
    tableid: JetApiPtr,
    c_record: u32,
    columnid_bookmark: u32,
}

#[repr(C)]
#[derive(Default)]
struct JetColumnList {
    cb_struct: u32,
    tableid: JetApiPtr,
    c_record: u32,
    columnid_presentation_order: u32,
    columnid_column_name: u32,
    columnid_columnid: u32,
    columnid_coltyp: u32,
    columnid_country: u32,
    columnid_langid: u32,
    columnid_cp: u32,
    columnid_collate: u32,
    columnid_cb_max: u32,
    columnid_grbit: u32,
    columnid_default: u32,
    columnid_base_table_name: u32,
    columnid_base_column_name: u32,
    columnid_definition_name: u32,
}

#[repr(C)]
#[derive(Default)]
struct JetObjectList {
    cb_struct: u32,
    tableid: JetApiPtr,
    c_record: u32,
    columnid_container_name: u32,
    columnid_object_name: u32,
    columnid_objtyp: u32,
    columnid_dt_create: u32,
    columnid_dt_update: u32,
    columnid_grbit: u32,
    columnid_flags: u32,
    columnid_c_record: u32,
    columnid_c_page: u32,
}

#[repr(C)]
#[derive(Default)]
struct JetIndexList {
    cb_struct: u32,
    tableid: JetApiPtr,
    c_record: u32,
    columnid_index_name: u32,
    columnid_grbit_index: u32,
    columnid_c_key: u32,
    columnid_c_entry: u32,
    columnid_c_page: u32,
    columnid_c_column: u32,
    columnid_i_column: u32,
    columnid_columnid: u32,
    columnid_coltyp: u32,
    columnid_country: u32,
    columnid_langid: u32,
    columnid_cp: u32,
    columnid_collate: u32,
    columnid_grbit_column: u32,
    columnid_column_name: u32,
    columnid_lc_map_flags: u32,
}

#[repr(C)]
struct JetEnumColumnId {
    columnid: u32,
    ctag_sequence: u32,
    rgtag_sequence: *const u32,
}

#[repr(C)]
struct JetEnumColumnValue {
    itag_sequence: u32,
    err: i32,
    cb_data: u32,
    pv_data: *mut c_void,
}

/// `JET_ENUMCOLUMN`. The trailing pair is a union: a value count and array,
/// or for `JET_wrnColumnSingleValue` the size and data of the one value.
#[repr(C)]
struct JetEnumColumn {
    columnid: u32,
    err: i32,
    count: u32,
    payload: *mut c_void,
}

type JetReallocFn = unsafe extern "system" fn(*mut c_void, *mut c_void, u32) -> *mut c_void;

#[link(name = "esent")]
extern "system" {
    fn JetCreateInstanceA(instance: *mut JetApiPtr, name: *const c_char) -> i32;
    fn JetCreateInstance2A(
        instance: *mut JetApiPtr,
        name: *const c_char,
        display: *const c_char,
        grbit: u32,
    ) -> i32;
    fn JetInit(instance: *mut JetApiPtr) -> i32;
    fn JetTerm2(instance: JetApiPtr, grbit: u32) -> i32;
    fn JetSetSystemParameterA(
        instance: *mut JetApiPtr,
        sesid: JetApiPtr,
        paramid: u32,
        value: JetApiPtr,
        string: *const c_char,
    ) -> i32;
    fn JetGetSystemParameterA(
        instance: JetApiPtr,
        sesid: JetApiPtr,
        paramid: u32,
        value: *mut JetApiPtr,
        string: *mut c_char,
        max: u32,
    ) -> i32;
    fn JetGetVersion(sesid: JetApiPtr, version: *mut u32) -> i32;

    fn JetCreateDatabaseA(
        sesid: JetApiPtr,
        file: *const c_char,
        connect: *const c_char,
        dbid: *mut u32,
        grbit: u32,
    ) -> i32;
    fn JetAttachDatabaseA(sesid: JetApiPtr, file: *const c_char, grbit: u32) -> i32;
    fn JetOpenDatabaseA(
        sesid: JetApiPtr,
        file: *const c_char,
        connect: *const c_char,
        dbid: *mut u32,
        grbit: u32,
    ) -> i32;
    fn JetCloseDatabase(sesid: JetApiPtr, dbid: u32, grbit: u32) -> i32;
    fn JetDetachDatabaseA(sesid: JetApiPtr, file: *const c_char) -> i32;

    fn JetBeginSessionA(
        instance: JetApiPtr,
        sesid: *mut JetApiPtr,
        user: *const c_char,
        password: *const c_char,
    ) -> i32;
    fn JetDupSession(sesid: JetApiPtr, new_sesid: *mut JetApiPtr) -> i32;
    fn JetEndSession(sesid: JetApiPtr, grbit: u32) -> i32;
    fn JetSetSessionContext(sesid: JetApiPtr, context: JetApiPtr) -> i32;
    fn JetResetSessionContext(sesid: JetApiPtr) -> i32;

    fn JetOpenTableA(
        sesid: JetApiPtr,
        dbid: u32,
        name: *const c_char,
        parameters: *const c_void,
        cb_parameters: u32,
        grbit: u32,
        tableid: *mut JetApiPtr,
    ) -> i32;
    fn JetCloseTable(sesid: JetApiPtr, tableid: JetApiPtr) -> i32;
    fn JetDupCursor(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        new_tableid: *mut JetApiPtr,
        grbit: u32,
    ) -> i32;
    fn JetOpenTempTable(
        sesid: JetApiPtr,
        columns: *const JetColumnDef,
        ccolumn: u32,
        grbit: u32,
        tableid: *mut JetApiPtr,
        columnids: *mut u32,
    ) -> i32;
    fn JetSetTableSequential(sesid: JetApiPtr, tableid: JetApiPtr, grbit: u32) -> i32;
    fn JetResetTableSequential(sesid: JetApiPtr, tableid: JetApiPtr, grbit: u32) -> i32;

    fn JetBeginTransaction(sesid: JetApiPtr) -> i32;
    fn JetCommitTransaction(sesid: JetApiPtr, grbit: u32) -> i32;
    fn JetRollback(sesid: JetApiPtr, grbit: u32) -> i32;

    fn JetCreateTableA(
        sesid: JetApiPtr,
        dbid: u32,
        name: *const c_char,
        pages: u32,
        density: u32,
        tableid: *mut JetApiPtr,
    ) -> i32;
    fn JetDeleteTableA(sesid: JetApiPtr, dbid: u32, name: *const c_char) -> i32;
    fn JetAddColumnA(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        name: *const c_char,
        def: *const JetColumnDef,
        default: *const c_void,
        cb_default: u32,
        columnid: *mut u32,
    ) -> i32;
    fn JetDeleteColumnA(sesid: JetApiPtr, tableid: JetApiPtr, name: *const c_char) -> i32;
    fn JetCreateIndexA(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        name: *const c_char,
        grbit: u32,
        key: *const c_char,
        cb_key: u32,
        density: u32,
    ) -> i32;
    fn JetDeleteIndexA(sesid: JetApiPtr, tableid: JetApiPtr, name: *const c_char) -> i32;

    fn JetGetTableColumnInfoA(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        column: *const c_char,
        result: *mut c_void,
        cb_max: u32,
        info_level: u32,
    ) -> i32;
    fn JetGetColumnInfoA(
        sesid: JetApiPtr,
        dbid: u32,
        table: *const c_char,
        column: *const c_char,
        result: *mut c_void,
        cb_max: u32,
        info_level: u32,
    ) -> i32;
    fn JetGetObjectInfoA(
        sesid: JetApiPtr,
        dbid: u32,
        objtyp: u32,
        container: *const c_char,
        object: *const c_char,
        result: *mut c_void,
        cb_max: u32,
        info_level: u32,
    ) -> i32;
    fn JetGetIndexInfoA(
        sesid: JetApiPtr,
        dbid: u32,
        table: *const c_char,
        index: *const c_char,
        result: *mut c_void,
        cb_result: u32,
        info_level: u32,
    ) -> i32;
    fn JetGetTableIndexInfoA(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        index: *const c_char,
        result: *mut c_void,
        cb_result: u32,
        info_level: u32,
    ) -> i32;
    fn JetGetCurrentIndexA(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        name: *mut c_char,
        cb_name: u32,
    ) -> i32;

    fn JetGetBookmark(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        bookmark: *mut c_void,
        cb_max: u32,
        cb_actual: *mut u32,
    ) -> i32;
    fn JetGotoBookmark(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        bookmark: *const c_void,
        cb_bookmark: u32,
    ) -> i32;
    fn JetMakeKey(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        data: *const c_void,
        cb_data: u32,
        grbit: u32,
    ) -> i32;
    fn JetRetrieveKey(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        key: *mut c_void,
        cb_max: u32,
        cb_actual: *mut u32,
        grbit: u32,
    ) -> i32;
    fn JetSeek(sesid: JetApiPtr, tableid: JetApiPtr, grbit: u32) -> i32;
    fn JetMove(sesid: JetApiPtr, tableid: JetApiPtr, rows: i32, grbit: u32) -> i32;
    fn JetSetIndexRange(sesid: JetApiPtr, tableid: JetApiPtr, grbit: u32) -> i32;
    fn JetIntersectIndexes(
        sesid: JetApiPtr,
        ranges: *const JetIndexRange,
        count: u32,
        records: *mut JetRecordList,
        grbit: u32,
    ) -> i32;
    fn JetSetCurrentIndexA(sesid: JetApiPtr, tableid: JetApiPtr, index: *const c_char) -> i32;
    fn JetIndexRecordCount(sesid: JetApiPtr, tableid: JetApiPtr, count: *mut u32, max: u32) -> i32;
    fn JetGetRecordPosition(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        recpos: *mut JetRecPos,
        cb: u32,
    ) -> i32;
    fn JetGotoPosition(sesid: JetApiPtr, tableid: JetApiPtr, recpos: *const JetRecPos) -> i32;

    fn JetRetrieveColumn(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        columnid: u32,
        data: *mut c_void,
        cb_data: u32,
        cb_actual: *mut u32,
        grbit: u32,
        info: *mut JetRetInfo,
    ) -> i32;
    fn JetSetColumn(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        columnid: u32,
        data: *const c_void,
        cb_data: u32,
        grbit: u32,
        info: *const JetSetInfo,
    ) -> i32;
    fn JetEnumerateColumns(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        cenum_columnid: u32,
        enum_columnids: *const JetEnumColumnId,
        cenum_column: *mut u32,
        enum_columns: *mut *mut JetEnumColumn,
        realloc: JetReallocFn,
        realloc_context: *mut c_void,
        cb_data_most: u32,
        grbit: u32,
    ) -> i32;
    fn JetDelete(sesid: JetApiPtr, tableid: JetApiPtr) -> i32;
    fn JetPrepareUpdate(sesid: JetApiPtr, tableid: JetApiPtr, prep: u32) -> i32;
    fn JetUpdate(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        bookmark: *mut c_void,
        cb_bookmark: u32,
        cb_actual: *mut u32,
    ) -> i32;
    fn JetGetLock(sesid: JetApiPtr, tableid: JetApiPtr, grbit: u32) -> i32;
    fn JetEscrowUpdate(
        sesid: JetApiPtr,
        tableid: JetApiPtr,
        columnid: u32,
        delta: *const c_void,
        cb_delta: u32,
        old: *mut c_void,
        cb_old_max: u32,
        cb_old_actual: *mut u32,
        grbit: u32,
    ) -> i32;
}

/// Owned C string, or a null pointer for `None`.
struct CText(Option<CString>);

impl CText {
    fn new(value: Option<&str>) -> Result<Self, JetErr> {
        value
            .map(CString::new)
            .transpose()
            .map(Self)
            .map_err(|_| err::INVALID_PARAMETER)
    }

    fn ptr(&self) -> *const c_char {
        self.0.as_ref().map_or(ptr::null(), |s| s.as_ptr())
    }
}

macro_rules! cstr {
    ($value:expr) => {
        match CText::new(Some($value)) {
            Ok(s) => s,
            Err(code) => return code,
        }
    };
    (opt $value:expr) => {
        match CText::new($value) {
            Ok(s) => s,
            Err(code) => return code,
        }
    };
}

fn out_buffer(buffer: Option<&mut [u8]>) -> (*mut c_void, u32) {
    match buffer {
        Some(b) => (b.as_mut_ptr().cast(), len32(b.len())),
        None => (ptr::null_mut(), 0),
    }
}

fn in_buffer(buffer: Option<&[u8]>) -> (*const c_void, u32) {
    match buffer {
        Some(b) => (b.as_ptr().cast(), len32(b.len())),
        None => (ptr::null(), 0),
    }
}

fn len32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn size_of32<T>() -> u32 {
    len32(std::mem::size_of::<T>())
}

fn read_string(buffer: &[u8]) -> String {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    buffer[..end].iter().map(|&b| char::from(b)).collect()
}

fn to_native_def(def: &ColumnDef) -> JetColumnDef {
    JetColumnDef {
        cb_struct: size_of32::<JetColumnDef>(),
        columnid: def.columnid.value(),
        coltyp: def.coltyp.as_u32(),
        w_country: def.country,
        langid: def.langid,
        cp: u16::try_from(def.cp.0).unwrap_or(0),
        w_collate: def.collate,
        cb_max: def.cb_max,
        grbit: def.grbit.bits(),
    }
}

fn from_native_def(def: &JetColumnDef) -> ColumnDef {
    ColumnDef {
        columnid: ColumnId::new(def.columnid),
        coltyp: ColumnType::from_u32(def.coltyp).unwrap_or_default(),
        country: def.w_country,
        langid: def.langid,
        cp: CodePage(u32::from(def.cp)),
        collate: def.w_collate,
        cb_max: def.cb_max,
        grbit: ColumndefGrbit(def.grbit),
    }
}

fn column_list(raw: &JetColumnList) -> ColumnList {
    let id = ColumnId::new;
    ColumnList {
        tableid: TableHandle::new(raw.tableid),
        record_count: raw.c_record,
        columnid_presentation_order: id(raw.columnid_presentation_order),
        columnid_column_name: id(raw.columnid_column_name),
        columnid_columnid: id(raw.columnid_columnid),
        columnid_coltyp: id(raw.columnid_coltyp),
        columnid_country: id(raw.columnid_country),
        columnid_langid: id(raw.columnid_langid),
        columnid_cp: id(raw.columnid_cp),
        columnid_collate: id(raw.columnid_collate),
        columnid_cb_max: id(raw.columnid_cb_max),
        columnid_grbit: id(raw.columnid_grbit),
        columnid_default: id(raw.columnid_default),
        columnid_base_table_name: id(raw.columnid_base_table_name),
        columnid_base_column_name: id(raw.columnid_base_column_name),
        columnid_definition_name: id(raw.columnid_definition_name),
    }
}

fn index_list(raw: &JetIndexList) -> IndexList {
    let id = ColumnId::new;
    IndexList {
        tableid: TableHandle::new(raw.tableid),
        record_count: raw.c_record,
        columnid_index_name: id(raw.columnid_index_name),
        columnid_grbit_index: id(raw.columnid_grbit_index),
        columnid_c_key: id(raw.columnid_c_key),
        columnid_c_entry: id(raw.columnid_c_entry),
        columnid_c_page: id(raw.columnid_c_page),
        columnid_c_column: id(raw.columnid_c_column),
        columnid_i_column: id(raw.columnid_i_column),
        columnid_columnid: id(raw.columnid_columnid),
        columnid_coltyp: id(raw.columnid_coltyp),
        columnid_country: id(raw.columnid_country),
        columnid_langid: id(raw.columnid_langid),
        columnid_cp: id(raw.columnid_cp),
        columnid_collate: id(raw.columnid_collate),
        columnid_grbit_column: id(raw.columnid_grbit_column),
        columnid_column_name: id(raw.columnid_column_name),
        columnid_lc_map_flags: id(raw.columnid_lc_map_flags),
    }
}

const BLOCK_HEADER: usize = 16;

fn block_layout(size: usize) -> Option<Layout> {
    Layout::from_size_align(size.checked_add(BLOCK_HEADER)?, BLOCK_HEADER).ok()
}

/// Allocator handed to `JetEnumerateColumns`. Each block records its size in
/// a header so it can later be resized or freed through the same callback.
unsafe extern "system" fn enumerate_realloc(
    _context: *mut c_void,
    pv: *mut c_void,
    cb: u32,
) -> *mut c_void {
    let size = cb as usize;
    unsafe {
        if pv.is_null() {
            let Some(layout) = block_layout(size).filter(|_| size > 0) else {
                return ptr::null_mut();
            };
            let base = alloc::alloc(layout);
            if base.is_null() {
                return ptr::null_mut();
            }
            base.cast::<usize>().write(size);
            return base.add(BLOCK_HEADER).cast();
        }
        let base = pv.cast::<u8>().sub(BLOCK_HEADER);
        let Some(layout) = block_layout(base.cast::<usize>().read()) else {
            return ptr::null_mut();
        };
        if size == 0 {
            alloc::dealloc(base, layout);
            return ptr::null_mut();
        }
        let base = alloc::realloc(base, layout, size + BLOCK_HEADER);
        if base.is_null() {
            return ptr::null_mut();
        }
        base.cast::<usize>().write(size);
        base.add(BLOCK_HEADER).cast()
    }
}

/// Copies and frees a block returned by `JetEnumerateColumns`.
///
/// # Safety
/// `data` is null or came from [`enumerate_realloc`] and holds `cb` bytes.
unsafe fn take_block(data: *mut c_void, cb: u32) -> Vec<u8> {
    if data.is_null() {
        return Vec::new();
    }
    unsafe {
        let bytes = std::slice::from_raw_parts(data.cast::<u8>(), cb as usize).to_vec();
        enumerate_realloc(ptr::null_mut(), data, 0);
        bytes
    }
}

/// Converts and frees the output of `JetEnumerateColumns`.
///
/// # Safety
/// `raw` is null or an array of `count` columns allocated by
/// [`enumerate_realloc`].
unsafe fn take_enumerated(raw: *mut JetEnumColumn, count: u32) -> Vec<EnumColumn> {
    if raw.is_null() {
        return Vec::new();
    }
    let mut columns = Vec::with_capacity(count as usize);
    unsafe {
        for column in std::slice::from_raw_parts(raw, count as usize) {
            let values = if column.err == wrn::COLUMN_SINGLE_VALUE {
                vec![EnumColumnValue {
                    itag_sequence: 1,
                    err: err::SUCCESS,
                    data: take_block(column.payload, column.count),
                }]
            } else if column.payload.is_null() {
                Vec::new()
            } else {
                let native = column.payload.cast::<JetEnumColumnValue>();
                let values = std::slice::from_raw_parts(native, column.count as usize)
                    .iter()
                    .map(|v| EnumColumnValue {
                        itag_sequence: v.itag_sequence,
                        err: v.err,
                        data: take_block(v.pv_data, v.cb_data),
                    })
                    .collect();
                enumerate_realloc(ptr::null_mut(), column.payload, 0);
                values
            };
            columns.push(EnumColumn {
                columnid: ColumnId::new(column.columnid),
                err: column.err,
                values,
            });
        }
        enumerate_realloc(ptr::null_mut(), raw.cast(), 0);
    }
    columns
}

/// The real engine, reached through `esent.dll`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EsentLibrary;

impl EsentLibrary {
    /// Returns a handle to the system engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

// SAFETY (all calls below): every pointer passed is either null or derived from
// a live Rust reference or slice whose length is passed alongside it, and the
// engine does not retain any of them past the call.
impl JetApi for EsentLibrary {
    fn create_instance(&self, instance: &mut InstanceHandle, name: &str) -> JetErr {
        let name = cstr!(name);
        let mut raw = 0;
        let status = unsafe { JetCreateInstanceA(&mut raw, name.ptr()) };
        *instance = InstanceHandle::new(raw);
        status
    }

    fn create_instance2(
        &self,
        instance: &mut InstanceHandle,
        name: &str,
        display_name: &str,
        grbit: CreateInstanceGrbit,
    ) -> JetErr {
        let name = cstr!(name);
        let display = cstr!(display_name);
        let mut raw = 0;
        let status = unsafe {
            JetCreateInstance2A(&mut raw, name.ptr(), display.ptr(), grbit.bits())
        };
        *instance = InstanceHandle::new(raw);
        status
    }

    fn init(&self, instance: &mut InstanceHandle) -> JetErr {
        let mut raw = instance.value();
        let status = unsafe { JetInit(&mut raw) };
        *instance = InstanceHandle::new(raw);
        status
    }

    fn term(&self, instance: InstanceHandle, grbit: TermGrbit) -> JetErr {
        unsafe { JetTerm2(instance.value(), grbit.bits()) }
    }

    fn set_system_parameter(
        &self,
        instance: InstanceHandle,
        sesid: SessionHandle,
        paramid: ParamId,
        value: usize,
        string: Option<&str>,
    ) -> JetErr {
        let string = cstr!(opt string);
        let mut raw = instance.value();
        let target: *mut JetApiPtr = if instance.is_nil() { ptr::null_mut() } else { &mut raw };
        unsafe { JetSetSystemParameterA(target, sesid.value(), paramid.0, value, string.ptr()) }
    }

    fn get_system_parameter(
        &self,
        instance: InstanceHandle,
        sesid: SessionHandle,
        paramid: ParamId,
        value: &mut usize,
        string: &mut String,
        max_size: u32,
    ) -> JetErr {
        let mut buffer = vec![0u8; max_size as usize];
        let (ptr, len) = out_buffer(Some(&mut buffer));
        let status = unsafe {
            JetGetSystemParameterA(
                instance.value(),
                sesid.value(),
                paramid.0,
                value,
                ptr.cast(),
                len,
            )
        };
        *string = read_string(&buffer);
        status
    }

    fn get_version(&self, sesid: SessionHandle, version: &mut u32) -> JetErr {
        unsafe { JetGetVersion(sesid.value(), version) }
    }

    fn create_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        connect: Option<&str>,
        dbid: &mut DatabaseHandle,
        grbit: CreateDatabaseGrbit,
    ) -> JetErr {
        let file = cstr!(database);
        let connect = cstr!(opt connect);
        let mut raw = 0;
        let status = unsafe {
            JetCreateDatabaseA(sesid.value(), file.ptr(), connect.ptr(), &mut raw, grbit.bits())
        };
        *dbid = DatabaseHandle::new(raw);
        status
    }

    fn attach_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        grbit: AttachDatabaseGrbit,
    ) -> JetErr {
        let file = cstr!(database);
        unsafe { JetAttachDatabaseA(sesid.value(), file.ptr(), grbit.bits()) }
    }

    fn open_database(
        &self,
        sesid: SessionHandle,
        database: &str,
        connect: Option<&str>,
        dbid: &mut DatabaseHandle,
        grbit: OpenDatabaseGrbit,
    ) -> JetErr {
        let file = cstr!(database);
        let connect = cstr!(opt connect);
        let mut raw = 0;
        let status = unsafe {
            JetOpenDatabaseA(sesid.value(), file.ptr(), connect.ptr(), &mut raw, grbit.bits())
        };
        *dbid = DatabaseHandle::new(raw);
        status
    }

    fn close_database(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        grbit: CloseDatabaseGrbit,
    ) -> JetErr {
        unsafe { JetCloseDatabase(sesid.value(), dbid.value(), grbit.bits()) }
    }

    fn detach_database(&self, sesid: SessionHandle, database: Option<&str>) -> JetErr {
        let file = cstr!(opt database);
        unsafe { JetDetachDatabaseA(sesid.value(), file.ptr()) }
    }

    fn begin_session(
        &self,
        instance: InstanceHandle,
        sesid: &mut SessionHandle,
        username: Option<&str>,
        password: Option<&str>,
    ) -> JetErr {
        let user = cstr!(opt username);
        let password = cstr!(opt password);
        let mut raw = 0;
        let status = unsafe {
            JetBeginSessionA(instance.value(), &mut raw, user.ptr(), password.ptr())
        };
        *sesid = SessionHandle::new(raw);
        status
    }

    fn dup_session(&self, sesid: SessionHandle, new_sesid: &mut SessionHandle) -> JetErr {
        let mut raw = 0;
        let status = unsafe { JetDupSession(sesid.value(), &mut raw) };
        *new_sesid = SessionHandle::new(raw);
        status
    }

    fn end_session(&self, sesid: SessionHandle, grbit: EndSessionGrbit) -> JetErr {
        unsafe { JetEndSession(sesid.value(), grbit.bits()) }
    }

    fn set_session_context(&self, sesid: SessionHandle, context: usize) -> JetErr {
        unsafe { JetSetSessionContext(sesid.value(), context) }
    }

    fn reset_session_context(&self, sesid: SessionHandle) -> JetErr {
        unsafe { JetResetSessionContext(sesid.value()) }
    }

    fn open_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        parameters: Option<&[u8]>,
        grbit: OpenTableGrbit,
        tableid: &mut TableHandle,
    ) -> JetErr {
        let name = cstr!(name);
        let (params, cb) = in_buffer(parameters);
        let mut raw = 0;
        let status = unsafe {
            JetOpenTableA(
                sesid.value(),
                dbid.value(),
                name.ptr(),
                params,
                cb,
                grbit.bits(),
                &mut raw,
            )
        };
        *tableid = TableHandle::new(raw);
        status
    }

    fn close_table(&self, sesid: SessionHandle, tableid: TableHandle) -> JetErr {
        unsafe { JetCloseTable(sesid.value(), tableid.value()) }
    }

    fn dup_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        new_tableid: &mut TableHandle,
        grbit: DupCursorGrbit,
    ) -> JetErr {
        let mut raw = 0;
        let status = unsafe {
            JetDupCursor(sesid.value(), tableid.value(), &mut raw, grbit.bits())
        };
        *new_tableid = TableHandle::new(raw);
        status
    }

    fn open_temp_table(
        &self,
        sesid: SessionHandle,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
        tableid: &mut TableHandle,
        columnids: &mut [ColumnId],
    ) -> JetErr {
        if columnids.len() < columns.len() {
            return err::INVALID_PARAMETER;
        }
        let native: Vec<JetColumnDef> = columns.iter().map(to_native_def).collect();
        let mut ids = vec![0u32; native.len()];
        let mut raw = 0;
        let status = unsafe {
            JetOpenTempTable(
                sesid.value(),
                native.as_ptr(),
                len32(native.len()),
                grbit.bits(),
                &mut raw,
                ids.as_mut_ptr(),
            )
        };
        *tableid = TableHandle::new(raw);
        for (slot, id) in columnids.iter_mut().zip(ids) {
            *slot = ColumnId::new(id);
        }
        status
    }

    fn set_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetTableSequentialGrbit,
    ) -> JetErr {
        unsafe { JetSetTableSequential(sesid.value(), tableid.value(), grbit.bits()) }
    }

    fn reset_table_sequential(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: ResetTableSequentialGrbit,
    ) -> JetErr {
        unsafe { JetResetTableSequential(sesid.value(), tableid.value(), grbit.bits()) }
    }

    fn begin_transaction(&self, sesid: SessionHandle) -> JetErr {
        unsafe { JetBeginTransaction(sesid.value()) }
    }

    fn commit_transaction(&self, sesid: SessionHandle, grbit: CommitTransactionGrbit) -> JetErr {
        unsafe { JetCommitTransaction(sesid.value(), grbit.bits()) }
    }

    fn rollback(&self, sesid: SessionHandle, grbit: RollbackTransactionGrbit) -> JetErr {
        unsafe { JetRollback(sesid.value(), grbit.bits()) }
    }

    fn create_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        pages: u32,
        density: u32,
        tableid: &mut TableHandle,
    ) -> JetErr {
        let name = cstr!(name);
        let mut raw = 0;
        let status = unsafe {
            JetCreateTableA(sesid.value(), dbid.value(), name.ptr(), pages, density, &mut raw)
        };
        *tableid = TableHandle::new(raw);
        status
    }

    fn delete_table(&self, sesid: SessionHandle, dbid: DatabaseHandle, name: &str) -> JetErr {
        let name = cstr!(name);
        unsafe { JetDeleteTableA(sesid.value(), dbid.value(), name.ptr()) }
    }

    fn add_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
        columnid: &mut ColumnId,
    ) -> JetErr {
        let name = cstr!(name);
        let def = to_native_def(definition);
        let (default, cb_default) = in_buffer(default);
        let mut raw = 0;
        let status = unsafe {
            JetAddColumnA(
                sesid.value(),
                tableid.value(),
                name.ptr(),
                &def,
                default,
                cb_default,
                &mut raw,
            )
        };
        *columnid = ColumnId::new(raw);
        status
    }

    fn delete_column(&self, sesid: SessionHandle, tableid: TableHandle, name: &str) -> JetErr {
        let name = cstr!(name);
        unsafe { JetDeleteColumnA(sesid.value(), tableid.value(), name.ptr()) }
    }

    fn create_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
        density: u32,
    ) -> JetErr {
        let name = cstr!(name);
        // The key description contains NUL separators and is passed with its length.
        let key_bytes = key.as_bytes();
        unsafe {
            JetCreateIndexA(
                sesid.value(),
                tableid.value(),
                name.ptr(),
                grbit.bits(),
                key_bytes.as_ptr().cast(),
                len32(key_bytes.len()),
                density,
            )
        }
    }

    fn delete_index(&self, sesid: SessionHandle, tableid: TableHandle, name: &str) -> JetErr {
        let name = cstr!(name);
        unsafe { JetDeleteIndexA(sesid.value(), tableid.value(), name.ptr()) }
    }

    fn get_table_column_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> JetErr {
        let column = cstr!(opt column);
        let mut raw = JetColumnList {
            cb_struct: size_of32::<JetColumnList>(),
            ..JetColumnList::default()
        };
        let status = unsafe {
            JetGetTableColumnInfoA(
                sesid.value(),
                tableid.value(),
                column.ptr(),
                (&mut raw as *mut JetColumnList).cast(),
                size_of32::<JetColumnList>(),
                COL_INFO_LIST,
            )
        };
        *list = column_list(&raw);
        status
    }

    fn get_table_column_def(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: &str,
        definition: &mut ColumnDef,
    ) -> JetErr {
        let column = cstr!(column);
        let mut raw = to_native_def(&ColumnDef::default());
        let status = unsafe {
            JetGetTableColumnInfoA(
                sesid.value(),
                tableid.value(),
                column.ptr(),
                (&mut raw as *mut JetColumnDef).cast(),
                size_of32::<JetColumnDef>(),
                COL_INFO,
            )
        };
        *definition = from_native_def(&raw);
        status
    }

    fn get_column_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> JetErr {
        let table = cstr!(table);
        let column = cstr!(opt column);
        let mut raw = JetColumnList {
            cb_struct: size_of32::<JetColumnList>(),
            ..JetColumnList::default()
        };
        let status = unsafe {
            JetGetColumnInfoA(
                sesid.value(),
                dbid.value(),
                table.ptr(),
                column.ptr(),
                (&mut raw as *mut JetColumnList).cast(),
                size_of32::<JetColumnList>(),
                COL_INFO_LIST,
            )
        };
        *list = column_list(&raw);
        status
    }

    fn get_object_info_list(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        list: &mut ObjectList,
    ) -> JetErr {
        let mut raw = JetObjectList {
            cb_struct: size_of32::<JetObjectList>(),
            ..JetObjectList::default()
        };
        let status = unsafe {
            JetGetObjectInfoA(
                sesid.value(),
                dbid.value(),
                ObjectType::Table as u32,
                ptr::null(),
                ptr::null(),
                (&mut raw as *mut JetObjectList).cast(),
                size_of32::<JetObjectList>(),
                OBJ_INFO_LIST_NO_STATS,
            )
        };
        let id = ColumnId::new;
        *list = ObjectList {
            tableid: TableHandle::new(raw.tableid),
            record_count: raw.c_record,
            columnid_container_name: id(raw.columnid_container_name),
            columnid_object_name: id(raw.columnid_object_name),
            columnid_objtyp: id(raw.columnid_objtyp),
            columnid_dt_create: id(raw.columnid_dt_create),
            columnid_dt_update: id(raw.columnid_dt_update),
            columnid_grbit: id(raw.columnid_grbit),
            columnid_flags: id(raw.columnid_flags),
            columnid_c_record: id(raw.columnid_c_record),
            columnid_c_page: id(raw.columnid_c_page),
        };
        status
    }

    fn get_index_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> JetErr {
        let table = cstr!(table);
        let index = cstr!(opt index);
        let mut raw = JetIndexList {
            cb_struct: size_of32::<JetIndexList>(),
            ..JetIndexList::default()
        };
        let status = unsafe {
            JetGetIndexInfoA(
                sesid.value(),
                dbid.value(),
                table.ptr(),
                index.ptr(),
                (&mut raw as *mut JetIndexList).cast(),
                size_of32::<JetIndexList>(),
                IDX_INFO_LIST,
            )
        };
        *list = index_list(&raw);
        status
    }

    fn get_table_index_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> JetErr {
        let index = cstr!(opt index);
        let mut raw = JetIndexList {
            cb_struct: size_of32::<JetIndexList>(),
            ..JetIndexList::default()
        };
        let status = unsafe {
            JetGetTableIndexInfoA(
                sesid.value(),
                tableid.value(),
                index.ptr(),
                (&mut raw as *mut JetIndexList).cast(),
                size_of32::<JetIndexList>(),
                IDX_INFO_LIST,
            )
        };
        *list = index_list(&raw);
        status
    }

    fn get_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &mut String,
        max_size: u32,
    ) -> JetErr {
        let mut buffer = vec![0u8; max_size as usize];
        let status = unsafe {
            JetGetCurrentIndexA(
                sesid.value(),
                tableid.value(),
                buffer.as_mut_ptr().cast(),
                max_size,
            )
        };
        *name = read_string(&buffer);
        status
    }

    fn get_bookmark(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> JetErr {
        let (ptr, len) = out_buffer(bookmark);
        unsafe { JetGetBookmark(sesid.value(), tableid.value(), ptr, len, actual_size) }
    }

    fn goto_bookmark(&self, sesid: SessionHandle, tableid: TableHandle, bookmark: &[u8]) -> JetErr {
        let (ptr, len) = in_buffer(Some(bookmark));
        unsafe { JetGotoBookmark(sesid.value(), tableid.value(), ptr, len) }
    }

    fn make_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        data: Option<&[u8]>,
        grbit: MakeKeyGrbit,
    ) -> JetErr {
        let (ptr, len) = in_buffer(data);
        unsafe { JetMakeKey(sesid.value(), tableid.value(), ptr, len, grbit.bits()) }
    }

    fn retrieve_key(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        key: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveKeyGrbit,
    ) -> JetErr {
        let (ptr, len) = out_buffer(key);
        unsafe {
            JetRetrieveKey(sesid.value(), tableid.value(), ptr, len, actual_size, grbit.bits())
        }
    }

    fn seek(&self, sesid: SessionHandle, tableid: TableHandle, grbit: SeekGrbit) -> JetErr {
        unsafe { JetSeek(sesid.value(), tableid.value(), grbit.bits()) }
    }

    fn move_cursor(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        rows: i32,
        grbit: MoveGrbit,
    ) -> JetErr {
        unsafe { JetMove(sesid.value(), tableid.value(), rows, grbit.bits()) }
    }

    fn set_index_range(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        grbit: SetIndexRangeGrbit,
    ) -> JetErr {
        unsafe { JetSetIndexRange(sesid.value(), tableid.value(), grbit.bits()) }
    }

    fn intersect_indexes(
        &self,
        sesid: SessionHandle,
        ranges: &[IndexRange],
        records: &mut RecordList,
        grbit: IntersectIndexesGrbit,
    ) -> JetErr {
        let native: Vec<JetIndexRange> = ranges
            .iter()
            .map(|r| JetIndexRange {
                cb_struct: size_of32::<JetIndexRange>(),
                tableid: r.tableid.value(),
                grbit: r.grbit.bits(),
            })
            .collect();
        let mut raw = JetRecordList {
            cb_struct: size_of32::<JetRecordList>(),
            ..JetRecordList::default()
        };
        let status = unsafe {
            JetIntersectIndexes(
                sesid.value(),
                native.as_ptr(),
                len32(native.len()),
                &mut raw,
                grbit.bits(),
            )
        };
        *records = RecordList {
            tableid: TableHandle::new(raw.tableid),
            record_count: raw.c_record,
            columnid_bookmark: ColumnId::new(raw.columnid_bookmark),
        };
        status
    }

    fn set_current_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
    ) -> JetErr {
        let index = cstr!(opt index);
        unsafe { JetSetCurrentIndexA(sesid.value(), tableid.value(), index.ptr()) }
    }

    fn index_record_count(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        count: &mut u32,
        max_records: u32,
    ) -> JetErr {
        unsafe { JetIndexRecordCount(sesid.value(), tableid.value(), count, max_records) }
    }

    fn get_record_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &mut RecordPosition,
    ) -> JetErr {
        let mut raw = JetRecPos {
            cb_struct: size_of32::<JetRecPos>(),
            centries_lt: 0,
            centries_in_range: 0,
            centries_total: 0,
        };
        let status = unsafe {
            JetGetRecordPosition(sesid.value(), tableid.value(), &mut raw, size_of32::<JetRecPos>())
        };
        *position = RecordPosition {
            entries_less_than: raw.centries_lt,
            entries_in_range: raw.centries_in_range,
            entries_total: raw.centries_total,
        };
        status
    }

    fn goto_position(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        position: &RecordPosition,
    ) -> JetErr {
        let raw = JetRecPos {
            cb_struct: size_of32::<JetRecPos>(),
            centries_lt: position.entries_less_than,
            centries_in_range: position.entries_in_range,
            centries_total: position.entries_total,
        };
        unsafe { JetGotoPosition(sesid.value(), tableid.value(), &raw) }
    }

    fn enumerate_columns(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnids: &[EnumColumnId],
        max_data_size: u32,
        grbit: EnumerateColumnsGrbit,
        columns: &mut Vec<EnumColumn>,
    ) -> JetErr {
        let native: Vec<JetEnumColumnId> = columnids
            .iter()
            .map(|c| JetEnumColumnId {
                columnid: c.columnid.value(),
                ctag_sequence: len32(c.tags.len()),
                rgtag_sequence: if c.tags.is_empty() { ptr::null() } else { c.tags.as_ptr() },
            })
            .collect();
        let ids = if native.is_empty() { ptr::null() } else { native.as_ptr() };
        let mut count = 0;
        let mut raw = ptr::null_mut();
        let status = unsafe {
            JetEnumerateColumns(
                sesid.value(),
                tableid.value(),
                len32(native.len()),
                ids,
                &mut count,
                &mut raw,
                enumerate_realloc,
                ptr::null_mut(),
                max_data_size,
                grbit.bits(),
            )
        };
        // The output is owned by the caller even when the call fails.
        *columns = unsafe { take_enumerated(raw, count) };
        status
    }

    fn retrieve_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: RetrieveColumnGrbit,
        info: Option<&mut RetrieveInfo>,
    ) -> JetErr {
        let (ptr, len) = out_buffer(data);
        let mut raw = info.as_ref().map(|i| JetRetInfo {
            cb_struct: size_of32::<JetRetInfo>(),
            ib_long_value: i.ib_long_value,
            itag_sequence: i.itag_sequence,
            columnid_next_tagged: 0,
        });
        let raw_ptr = raw.as_mut().map_or(ptr::null_mut(), |r| r as *mut JetRetInfo);
        let status = unsafe {
            JetRetrieveColumn(
                sesid.value(),
                tableid.value(),
                columnid.value(),
                ptr,
                len,
                actual_size,
                grbit.bits(),
                raw_ptr,
            )
        };
        if let (Some(info), Some(raw)) = (info, raw) {
            info.columnid_next_tagged = ColumnId::new(raw.columnid_next_tagged);
        }
        status
    }

    fn set_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        data: Option<&[u8]>,
        data_size: u32,
        grbit: SetColumnGrbit,
        info: Option<&SetInfo>,
    ) -> JetErr {
        let (ptr, _) = in_buffer(data);
        let raw = info.map(|i| JetSetInfo {
            cb_struct: size_of32::<JetSetInfo>(),
            ib_long_value: i.ib_long_value,
            itag_sequence: i.itag_sequence,
        });
        let raw_ptr = raw.as_ref().map_or(ptr::null(), |r| r as *const JetSetInfo);
        unsafe {
            JetSetColumn(
                sesid.value(),
                tableid.value(),
                columnid.value(),
                ptr,
                data_size,
                grbit.bits(),
                raw_ptr,
            )
        }
    }

    fn delete(&self, sesid: SessionHandle, tableid: TableHandle) -> JetErr {
        unsafe { JetDelete(sesid.value(), tableid.value()) }
    }

    fn prepare_update(&self, sesid: SessionHandle, tableid: TableHandle, prep: Prep) -> JetErr {
        unsafe { JetPrepareUpdate(sesid.value(), tableid.value(), prep as u32) }
    }

    fn update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        bookmark: Option<&mut [u8]>,
        actual_size: &mut u32,
    ) -> JetErr {
        let (ptr, len) = out_buffer(bookmark);
        unsafe { JetUpdate(sesid.value(), tableid.value(), ptr, len, actual_size) }
    }

    fn get_lock(&self, sesid: SessionHandle, tableid: TableHandle, grbit: GetLockGrbit) -> JetErr {
        unsafe { JetGetLock(sesid.value(), tableid.value(), grbit.bits()) }
    }

    fn escrow_update(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        columnid: ColumnId,
        delta: &[u8],
        previous: Option<&mut [u8]>,
        actual_size: &mut u32,
        grbit: EscrowUpdateGrbit,
    ) -> JetErr {
        let (delta_ptr, delta_len) = in_buffer(Some(delta));
        let (old, old_len) = out_buffer(previous);
        unsafe {
            JetEscrowUpdate(
                sesid.value(),
                tableid.value(),
                columnid.value(),
                delta_ptr,
                delta_len,
                old,
                old_len,
                actual_size,
                grbit.bits(),
            )
        }
    }
}
