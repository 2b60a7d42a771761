//! Temporary tables, walked with the table enumerator.

use esent_interop::{Api, Instance, InteropResult, Session, TableEnumerator};
use esent_native::grbit::{
    ColumndefGrbit, EnumerateColumnsGrbit, SetTableSequentialGrbit, TempTableGrbit,
};
use esent_native::{err, wrn, ColumnDef, ColumnId, ColumnType, EnumColumnId, Prep, TableHandle};
use esent_testkit::TestDatabase;

fn scratch_columns() -> [ColumnDef; 2] {
    [
        ColumnDef {
            coltyp: ColumnType::Long,
            grbit: ColumndefGrbit::TT_KEY,
            ..ColumnDef::default()
        },
        ColumnDef {
            coltyp: ColumnType::LongBinary,
            ..ColumnDef::default()
        },
    ]
}

fn fill(db: &TestDatabase, tableid: TableHandle, ids: &[ColumnId]) {
    for (key, payload) in [(3, &b"three"[..]), (1, &b"one"[..]), (2, &b"two"[..])] {
        db.api.prepare_update(db.sesid, tableid, Prep::Insert).unwrap();
        db.api.set_column_value(db.sesid, tableid, ids[0], key).unwrap();
        db.api.set_column_bytes(db.sesid, tableid, ids[1], payload).unwrap();
        db.api.update(db.sesid, tableid, None).unwrap();
    }
}

#[test]
fn enumerator_walks_a_temp_table_in_key_order() {
    let db = TestDatabase::memory();
    let grbit = TempTableGrbit::INDEXED | TempTableGrbit::SCROLLABLE;
    let (tableid, ids) = db
        .api
        .open_temp_table(db.sesid, &scratch_columns(), grbit)
        .unwrap();
    fill(&db, tableid, &ids);
    db.api
        .set_table_sequential(db.sesid, tableid, SetTableSequentialGrbit::PREREAD_FORWARD)
        .unwrap();

    let (key, data) = (ids[0], ids[1]);
    let rows = TableEnumerator::new(&db.api, db.sesid, tableid, 3, move |api, sesid, tableid| {
        let columns =
            api.enumerate_columns(sesid, tableid, &[], 0, EnumerateColumnsGrbit::NONE)?;
        let value = |columnid| {
            columns
                .iter()
                .find(|c| c.columnid == columnid)
                .map(|c| c.values[0].data.clone())
                .unwrap_or_default()
        };
        let raw: [u8; 4] = value(key).try_into().unwrap_or_default();
        Ok((i32::from_le_bytes(raw), value(data)))
    })
    .collect::<InteropResult<Vec<_>>>()
    .unwrap();

    assert_eq!(
        rows,
        vec![
            (1, b"one".to_vec()),
            (2, b"two".to_vec()),
            (3, b"three".to_vec()),
        ]
    );
    // The enumerator closed the cursor, which dropped the table.
    let error = db.api.close_table(db.sesid, tableid).unwrap_err();
    assert!(error.is(err::INVALID_TABLE_ID));
}

#[test]
fn truncated_and_missing_values_are_flagged_per_column() {
    let db = TestDatabase::memory();
    let (tableid, ids) = db
        .api
        .open_temp_table(db.sesid, &scratch_columns(), TempTableGrbit::INDEXED)
        .unwrap();
    fill(&db, tableid, &ids);
    assert!(db.api.try_move_first(db.sesid, tableid).unwrap());

    let requested = [
        EnumColumnId {
            columnid: ids[1],
            tags: Vec::new(),
        },
        EnumColumnId {
            columnid: ids[1],
            tags: vec![2],
        },
    ];
    let columns = db
        .api
        .enumerate_columns(db.sesid, tableid, &requested, 2, EnumerateColumnsGrbit::NONE)
        .unwrap();
    assert_eq!(columns[0].values[0].err, wrn::COLUMN_TRUNCATED);
    assert_eq!(columns[0].values[0].data, b"on");
    assert_eq!(columns[1].values[0].itag_sequence, 2);
    assert_eq!(columns[1].values[0].err, wrn::COLUMN_NULL);

    db.api.close_table(db.sesid, tableid).unwrap();
}

#[test]
fn owned_temp_table_reads_through_the_session() {
    let api = Api::in_memory();
    let mut instance = Instance::new(&api, "owned-scratch").unwrap();
    instance.init().unwrap();
    let session = Session::new(&instance).unwrap();
    let (table, ids) = session
        .open_temp_table(&scratch_columns(), TempTableGrbit::INDEXED)
        .unwrap();

    let mut update = table.update(Prep::Insert).unwrap();
    update.set_value(ids[0], 9i32).unwrap();
    update.save().unwrap();
    drop(update);

    assert!(table.try_move_first().unwrap());
    let columns = table
        .enumerate_columns(&[], EnumerateColumnsGrbit::ENUMERATE_COMPRESS_OUTPUT)
        .unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].err, wrn::COLUMN_SINGLE_VALUE);
    assert_eq!(table.retrieve::<i32>(ids[0]).unwrap(), Some(9));
}
