//! Sessions sharing one database from several threads.

use std::thread;

use esent_native::err;
use esent_native::grbit::{
    CommitTransactionGrbit, EndSessionGrbit, OpenTableGrbit, RollbackTransactionGrbit,
};
use esent_native::Prep;
use esent_testkit::stress::{read_counter, stress_concurrent_escrow, StressConfig};
use esent_testkit::{scenarios, TestDatabase};

#[test]
fn one_increment_per_session() {
    let db = TestDatabase::memory();
    let table = scenarios::counter_table(&db);
    let config = StressConfig {
        sessions: 8,
        increments: 1,
    };

    let result = stress_concurrent_escrow(&db, &table, &config);

    assert_eq!(result.successful_ops, 8);
    assert_eq!(read_counter(&db, &table), 8);
}

#[test]
fn default_stress_run_loses_no_increments() {
    let db = TestDatabase::memory();
    let table = scenarios::counter_table(&db);
    let config = StressConfig::default();

    let result = stress_concurrent_escrow(&db, &table, &config);

    assert_eq!(result.failed_ops, 0);
    assert_eq!(result.cleanup_errors, 0);
    let expected = (config.sessions * config.increments) as i32;
    assert_eq!(read_counter(&db, &table), expected);
}

#[test]
fn rolled_back_increments_are_undone() {
    let db = TestDatabase::memory();
    let table = scenarios::counter_table(&db);
    let count = table.column("count");

    thread::scope(|scope| {
        for commit in [true, false] {
            let (sesid, dbid) = db.second_session();
            let db = &db;
            scope.spawn(move || {
                let tableid = db
                    .api
                    .open_table(sesid, dbid, "counters", None, OpenTableGrbit::NONE)
                    .unwrap();
                scenarios::seek_record(db, sesid, tableid, 0);
                db.api.begin_transaction(sesid).unwrap();
                db.api.escrow_add(sesid, tableid, count, 5).unwrap();
                if commit {
                    db.api.commit_transaction(sesid, CommitTransactionGrbit::NONE).unwrap();
                } else {
                    db.api.rollback(sesid, RollbackTransactionGrbit::NONE).unwrap();
                }
                db.api.end_session(sesid, EndSessionGrbit::NONE).unwrap();
            });
        }
    });

    assert_eq!(read_counter(&db, &table), 5);
}

#[test]
fn concurrent_replace_is_a_write_conflict() {
    let db = TestDatabase::memory();
    let table = scenarios::counter_table(&db);
    let (other, other_dbid) = db.second_session();
    let other_table = db
        .api
        .open_table(other, other_dbid, "counters", None, OpenTableGrbit::NONE)
        .unwrap();
    scenarios::seek_record(&db, other, other_table, 0);

    db.api.begin_transaction(db.sesid).unwrap();
    db.api.prepare_update(db.sesid, table.tableid, Prep::Replace).unwrap();

    db.api.begin_transaction(other).unwrap();
    let error = db.api.prepare_update(other, other_table, Prep::Replace).unwrap_err();
    assert!(error.is(err::WRITE_CONFLICT));

    db.api.rollback(other, RollbackTransactionGrbit::NONE).unwrap();
    db.api.prepare_update(db.sesid, table.tableid, Prep::Cancel).unwrap();
    db.api.rollback(db.sesid, RollbackTransactionGrbit::NONE).unwrap();
}
