//! Try-pattern navigation and seeking.

use std::collections::BTreeSet;
use std::sync::Arc;

use esent_interop::{ErrorHook, InteropError};
use esent_native::err;
use esent_native::grbit::{MakeKeyGrbit, RetrieveColumnGrbit, SeekGrbit};
use esent_testkit::generators::key_set_strategy;
use esent_testkit::{scenarios, TestDatabase};
use proptest::prelude::*;

#[test]
fn empty_table_reports_no_records() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "empty");
    let (sesid, tableid) = (db.sesid, table.tableid);

    assert!(!db.api.try_move_first(sesid, tableid).unwrap());
    assert!(!db.api.try_move_last(sesid, tableid).unwrap());
    assert!(!db.api.try_move_next(sesid, tableid).unwrap());
    assert!(!db.api.try_move_previous(sesid, tableid).unwrap());

    db.api.make_key_value(sesid, tableid, 1i32, MakeKeyGrbit::NEW_KEY).unwrap();
    assert!(!db.api.try_seek(sesid, tableid, SeekGrbit::SEEK_GE).unwrap());
}

#[test]
fn unrelated_errors_still_propagate() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "records");
    scenarios::insert_record(&db, &table, 1);

    let error = db.api.try_seek(db.sesid, table.tableid, SeekGrbit::SEEK_EQ).unwrap_err();
    assert!(error.is(err::KEY_NOT_MADE));
}

#[test]
fn error_hook_does_not_change_try_outcomes() {
    let db = TestDatabase::memory();
    let hook: ErrorHook = Arc::new(|error: &InteropError| {
        error
            .code()
            .map(|code| InteropError::invalid_argument(format!("translated {code}")))
    });
    db.api.set_error_hook(Some(hook));
    let table = scenarios::record_table(&db, "records");

    assert!(!db.api.try_move_first(db.sesid, table.tableid).unwrap());
    db.api
        .make_key_value(db.sesid, table.tableid, 5i32, MakeKeyGrbit::NEW_KEY)
        .unwrap();
    assert!(!db.api.try_seek(db.sesid, table.tableid, SeekGrbit::SEEK_EQ).unwrap());

    let error = db.api.try_seek(db.sesid, table.tableid, SeekGrbit::SEEK_EQ).unwrap_err();
    assert!(matches!(error, InteropError::InvalidArgument { .. }));
}

#[test]
fn walking_forward_visits_keys_in_order() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "records");
    for id in [30, -4, 12, 0] {
        scenarios::insert_record(&db, &table, id);
    }

    let mut seen = Vec::new();
    let mut more = db.api.try_move_first(db.sesid, table.tableid).unwrap();
    while more {
        let id = db
            .api
            .retrieve_column_as::<i32>(
                db.sesid,
                table.tableid,
                table.column("id"),
                RetrieveColumnGrbit::NONE,
            )
            .unwrap();
        seen.extend(id);
        more = db.api.try_move_next(db.sesid, table.tableid).unwrap();
    }
    assert_eq!(seen, vec![-4, 0, 12, 30]);
}

#[test]
fn bookmarks_return_to_the_record() {
    let db = TestDatabase::memory();
    let table = scenarios::record_table(&db, "records");
    scenarios::insert_record(&db, &table, 7);
    let bookmark = db.api.get_bookmark_value(db.sesid, table.tableid).unwrap();
    scenarios::insert_record(&db, &table, 8);

    db.api
        .goto_bookmark(db.sesid, table.tableid, bookmark.as_bytes())
        .unwrap();
    let id = db
        .api
        .retrieve_column_as::<i32>(
            db.sesid,
            table.tableid,
            table.column("id"),
            RetrieveColumnGrbit::NONE,
        )
        .unwrap();
    assert_eq!(id, Some(7));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn seek_ge_finds_the_smallest_key_not_below_the_target(
        keys in key_set_strategy(16),
        target in any::<i32>(),
    ) {
        let db = TestDatabase::memory();
        let table = scenarios::record_table(&db, "records");
        for &id in &keys {
            scenarios::insert_record(&db, &table, id);
        }
        let model: BTreeSet<i32> = keys.into_iter().collect();

        db.api.make_key_value(db.sesid, table.tableid, target, MakeKeyGrbit::NEW_KEY).unwrap();
        let found = db.api.try_seek(db.sesid, table.tableid, SeekGrbit::SEEK_GE).unwrap();
        let expected = model.range(target..).next().copied();
        prop_assert_eq!(found, expected.is_some());
        if found {
            let id = db
                .api
                .retrieve_column_as::<i32>(
                    db.sesid,
                    table.tableid,
                    table.column("id"),
                    RetrieveColumnGrbit::NONE,
                )
                .unwrap();
            prop_assert_eq!(id, expected);
        }
    }
}
