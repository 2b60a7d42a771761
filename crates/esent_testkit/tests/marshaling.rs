//! Column marshaling against the in-memory engine.

use esent_interop::{Config, FixedColumn, InteropError};
use esent_native::grbit::{CommitTransactionGrbit, RetrieveColumnGrbit};
use esent_native::{CodePage, ColumnId, ColumnType, Prep, SessionHandle, TableHandle};
use esent_testkit::fixtures::columns;
use esent_testkit::generators::{
    long_value_strategy, scalar_value_strategy, unicode_text_strategy, ScalarValue,
};
use esent_testkit::{scenarios, TestDatabase, TestTable};
use proptest::prelude::*;

const COPY: RetrieveColumnGrbit = RetrieveColumnGrbit::RETRIEVE_COPY;

const SCALAR_TYPES: &[ColumnType] = &[
    ColumnType::Bit,
    ColumnType::UnsignedByte,
    ColumnType::Short,
    ColumnType::UnsignedShort,
    ColumnType::Long,
    ColumnType::UnsignedLong,
    ColumnType::LongLong,
    ColumnType::IEEESingle,
    ColumnType::IEEEDouble,
    ColumnType::Guid,
];

fn scalar_table(db: &TestDatabase) -> TestTable {
    let names: Vec<String> = SCALAR_TYPES.iter().map(|t| format!("{t:?}")).collect();
    let definitions: Vec<(&str, _)> = names
        .iter()
        .zip(SCALAR_TYPES)
        .map(|(name, &coltyp)| (name.as_str(), columns::fixed(coltyp)))
        .collect();
    db.create_table("scalars", &definitions)
}

fn round_trip<T: FixedColumn + PartialEq + std::fmt::Debug>(
    db: &TestDatabase,
    tableid: TableHandle,
    columnid: ColumnId,
    value: T,
) -> Result<(), TestCaseError> {
    let sesid: SessionHandle = db.sesid;
    db.api.set_column_value(sesid, tableid, columnid, value).unwrap();
    let read = db.api.retrieve_column_as::<T>(sesid, tableid, columnid, COPY).unwrap();
    prop_assert_eq!(read, Some(value));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scalars_read_back_from_the_pending_update(value in scalar_value_strategy()) {
        let db = TestDatabase::memory();
        let table = scalar_table(&db);
        let columnid = table.column(&format!("{:?}", value.column_type()));
        db.api.prepare_update(db.sesid, table.tableid, Prep::Insert).unwrap();
        match value {
            ScalarValue::Bool(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Byte(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::SignedByte(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Int16(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::UInt16(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Int32(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::UInt32(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Int64(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Float(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Double(v) => round_trip(&db, table.tableid, columnid, v)?,
            ScalarValue::Guid(v) => round_trip(&db, table.tableid, columnid, v)?,
        }
    }

    #[test]
    fn long_values_beyond_the_scratch_buffer(data in long_value_strategy(4096)) {
        let db = TestDatabase::with_config(
            Config::new().buffer_size(256).max_cached_buffer_size(256),
        );
        let table = scenarios::record_table(&db, "records");
        scenarios::insert_record(&db, &table, 1);
        db.api.begin_transaction(db.sesid).unwrap();
        db.api.prepare_update(db.sesid, table.tableid, Prep::Replace).unwrap();
        db.api.set_column_bytes(db.sesid, table.tableid, table.column("data"), &data).unwrap();
        db.api.update(db.sesid, table.tableid, None).unwrap();
        db.api.commit_transaction(db.sesid, CommitTransactionGrbit::NONE).unwrap();

        let read = db
            .api
            .retrieve_column_bytes(
                db.sesid,
                table.tableid,
                table.column("data"),
                RetrieveColumnGrbit::NONE,
                None,
            )
            .unwrap();
        prop_assert_eq!(read, Some(data));
    }

    #[test]
    fn unicode_text_round_trips(text in unicode_text_strategy()) {
        let db = TestDatabase::memory();
        let table = scenarios::record_table(&db, "records");
        db.api.prepare_update(db.sesid, table.tableid, Prep::Insert).unwrap();
        db.api
            .set_column_string(
                db.sesid,
                table.tableid,
                table.column("text"),
                &text,
                CodePage::UNICODE,
            )
            .unwrap();
        let read = db
            .api
            .retrieve_column_string(
                db.sesid,
                table.tableid,
                table.column("text"),
                CodePage::UNICODE,
                COPY,
            )
            .unwrap();
        prop_assert_eq!(read, Some(text));
    }
}

#[test]
fn zero_length_is_not_null() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "records");
    let data = table.column("data");
    db.api.prepare_update(db.sesid, table.tableid, Prep::Insert).unwrap();
    assert_eq!(
        db.api.retrieve_column_bytes(db.sesid, table.tableid, data, COPY, None).unwrap(),
        None
    );
    db.api.set_column_bytes(db.sesid, table.tableid, data, &[]).unwrap();
    assert_eq!(
        db.api.retrieve_column_bytes(db.sesid, table.tableid, data, COPY, None).unwrap(),
        Some(Vec::new())
    );
    db.api.set_column_null(db.sesid, table.tableid, data).unwrap();
    assert_eq!(
        db.api.retrieve_column_bytes(db.sesid, table.tableid, data, COPY, None).unwrap(),
        None
    );
}

#[test]
fn wrong_width_is_data_corruption() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "records");
    scenarios::insert_record(&db, &table, 9);
    let result = db
        .api
        .retrieve_column_as::<i64>(
            db.sesid,
            table.tableid,
            table.column("id"),
            RetrieveColumnGrbit::NONE,
        );
    assert!(matches!(result, Err(InteropError::DataSizeMismatch { expected: 8, actual: 4 })));
}

#[test]
fn unsupported_code_pages_are_rejected() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "records");
    scenarios::insert_record(&db, &table, 1);
    let result = db.api.retrieve_column_string(
        db.sesid,
        table.tableid,
        table.column("text"),
        CodePage(65001),
        RetrieveColumnGrbit::NONE,
    );
    assert!(matches!(result, Err(InteropError::InvalidEncoding { code_page: 65001 })));
}
