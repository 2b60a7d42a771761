//! Column streams over the owned wrappers.

use std::io::{Read, Seek, SeekFrom, Write};

use esent_interop::{Session, Table};
use esent_native::grbit::{CommitTransactionGrbit, CreateIndexGrbit};
use esent_native::{ColumnId, ColumnType, DatabaseHandle, Prep};
use esent_testkit::fixtures::{columns, with_session};
use esent_testkit::generators::{stream_ops_strategy, StreamOp};
use proptest::prelude::*;

fn blob_table<'s>(
    session: &'s Session<'_>,
    dbid: DatabaseHandle,
) -> (Table<'s>, ColumnId, ColumnId) {
    let table = session.create_table(dbid, "blobs").unwrap();
    let id = table
        .add_column("id", &columns::fixed(ColumnType::Long), None)
        .unwrap();
    let blob = table.add_column("blob", &columns::binary(), None).unwrap();
    table
        .create_index("primary", CreateIndexGrbit::INDEX_PRIMARY, "+id\0\0")
        .unwrap();
    (table, id, blob)
}

fn read_saved(table: &Table<'_>, blob: ColumnId) -> Vec<u8> {
    let mut stream = table.column_stream(blob).unwrap();
    let mut data = Vec::new();
    stream.read_to_end(&mut data).unwrap();
    data
}

#[test]
fn written_data_survives_the_save() {
    with_session(|session, dbid| {
        let (table, id, blob) = blob_table(session, dbid);
        let mut update = table.update(Prep::Insert).unwrap();
        update.set_value(id, 1i32).unwrap();
        {
            let mut stream = update.column_stream(blob).unwrap();
            stream.write_all(b"head").unwrap();
            stream.seek(SeekFrom::Start(8)).unwrap();
            stream.write_all(b"tail").unwrap();
        }
        update.save_and_goto_bookmark().unwrap();
        drop(update);

        assert_eq!(read_saved(&table, blob), b"head\0\0\0\0tail");
    });
}

#[test]
fn truncating_to_zero_keeps_an_empty_value() {
    with_session(|session, dbid| {
        let (table, id, blob) = blob_table(session, dbid);
        let mut update = table.update(Prep::Insert).unwrap();
        update.set_value(id, 1i32).unwrap();
        {
            let mut stream = update.column_stream(blob).unwrap();
            stream.write_all(b"discard me").unwrap();
            stream.set_len(0).unwrap();
            let mut buf = [0u8; 8];
            assert_eq!(stream.read(&mut buf).unwrap(), 0);

            assert_eq!(stream.seek(SeekFrom::Start(5)).unwrap(), 5);
            assert_eq!(stream.read(&mut buf).unwrap(), 0);
            assert_eq!(stream.len().unwrap(), 0);
        }
        update.save_and_goto_bookmark().unwrap();
        drop(update);

        assert_eq!(table.retrieve_bytes(blob).unwrap(), Some(Vec::new()));
    });
}

#[test]
fn replace_extends_an_existing_value() {
    with_session(|session, dbid| {
        let (table, id, blob) = blob_table(session, dbid);
        let mut insert = table.update(Prep::Insert).unwrap();
        insert.set_value(id, 1i32).unwrap();
        insert.set_bytes(blob, b"abc").unwrap();
        insert.save_and_goto_bookmark().unwrap();
        drop(insert);

        let mut transaction = session.begin_transaction().unwrap();
        let mut replace = table.update(Prep::Replace).unwrap();
        {
            let mut stream = replace.column_stream(blob).unwrap();
            stream.seek(SeekFrom::End(0)).unwrap();
            stream.write_all(b"def").unwrap();
        }
        replace.save().unwrap();
        drop(replace);
        transaction.commit(CommitTransactionGrbit::NONE).unwrap();

        assert_eq!(read_saved(&table, blob), b"abcdef");
    });
}

fn apply(model: &mut Vec<u8>, op: &StreamOp) {
    match op {
        StreamOp::Write { offset, data } if !data.is_empty() => {
            let start = *offset as usize;
            let end = start + data.len();
            if model.len() < end {
                model.resize(end, 0);
            }
            model[start..end].copy_from_slice(data);
        }
        StreamOp::SetLen { len } => model.resize(*len as usize, 0),
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn saved_value_matches_the_model(ops in stream_ops_strategy(256, 16)) {
        let (saved, model) = with_session(|session, dbid| {
            let (table, id, blob) = blob_table(session, dbid);
            let mut model = Vec::new();
            let mut update = table.update(Prep::Insert).unwrap();
            update.set_value(id, 1i32).unwrap();
            {
                let mut stream = update.column_stream(blob).unwrap();
                for op in &ops {
                    match op {
                        StreamOp::Write { offset, data } => {
                            stream.seek(SeekFrom::Start(*offset)).unwrap();
                            stream.write_all(data).unwrap();
                        }
                        StreamOp::Read { offset, len } => {
                            stream.seek(SeekFrom::Start(*offset)).unwrap();
                            let mut buf = vec![0u8; *len];
                            let read = stream.read(&mut buf).unwrap();
                            let start = (*offset as usize).min(model.len());
                            let end = (start + len).min(model.len());
                            assert_eq!(&buf[..read], &model[start..end]);
                        }
                        StreamOp::SetLen { len } => stream.set_len(*len).unwrap(),
                    }
                    apply(&mut model, op);
                }
            }
            update.save_and_goto_bookmark().unwrap();
            drop(update);
            let saved = table.retrieve_bytes(blob).unwrap().unwrap_or_default();
            (saved, model)
        });
        prop_assert_eq!(saved, model);
    }
}
