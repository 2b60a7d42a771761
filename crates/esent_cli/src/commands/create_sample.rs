//! Create-sample command implementation.

use esent_interop::{Api, ColumnDictionary, Instance, Session, Table};
use esent_native::grbit::{
    ColumndefGrbit, CommitTransactionGrbit, CreateDatabaseGrbit, CreateIndexGrbit,
};
use esent_native::{CodePage, ColumnDef, ColumnType, Prep};
use tracing::info;

use super::CliResult;

/// Name of the table in the sample database.
pub const TABLE: &str = "table";

const COLUMNS: &[(&str, ColumnType, CodePage)] = &[
    ("bit", ColumnType::Bit, CodePage::NONE),
    ("byte", ColumnType::UnsignedByte, CodePage::NONE),
    ("short", ColumnType::Short, CodePage::NONE),
    ("long", ColumnType::Long, CodePage::NONE),
    ("currency", ColumnType::Currency, CodePage::NONE),
    ("single", ColumnType::IEEESingle, CodePage::NONE),
    ("double", ColumnType::IEEEDouble, CodePage::NONE),
    ("binary", ColumnType::LongBinary, CodePage::NONE),
    ("ascii", ColumnType::LongText, CodePage::ASCII),
    ("unicode", ColumnType::LongText, CodePage::UNICODE),
];

/// Number of numbered records after the two fixed ones.
const NUMBERED_RECORDS: i32 = 10;

/// Runs the create-sample command.
///
/// The table has an autoincrement primary key, one column of each common
/// type and a two-segment secondary index. It holds an all-null record, a
/// record with every column set to a value that exercises CSV quoting, and
/// ten numbered records.
pub fn run(api: &Api, database: &str) -> CliResult<()> {
    let mut instance = Instance::new(api, "createsample")?;
    instance.init()?;
    {
        let session = Session::new(&instance)?;
        let dbid = session.create_database(database, CreateDatabaseGrbit::NONE)?;
        let table = session.create_table(dbid, TABLE)?;
        define_schema(&table)?;
        let columns = table.column_dictionary()?;

        let mut transaction = session.begin_transaction()?;
        insert_records(&table, &columns)?;
        transaction.commit(CommitTransactionGrbit::NONE)?;
    }
    instance.term()?;
    info!(database, "created sample database");
    Ok(())
}

fn define_schema(table: &Table<'_>) -> CliResult<()> {
    let key = ColumnDef {
        coltyp: ColumnType::Long,
        grbit: ColumndefGrbit::COLUMN_AUTOINCREMENT,
        ..ColumnDef::default()
    };
    table.add_column("key", &key, None)?;
    for &(name, coltyp, cp) in COLUMNS {
        let definition = ColumnDef {
            coltyp,
            cp,
            ..ColumnDef::default()
        };
        table.add_column(name, &definition, None)?;
    }
    table.create_index("primary", CreateIndexGrbit::INDEX_PRIMARY, "+key\0\0")?;
    table.create_index("secondary", CreateIndexGrbit::NONE, "+double\0-ascii\0\0")?;
    Ok(())
}

fn insert_records(table: &Table<'_>, columns: &ColumnDictionary) -> CliResult<()> {
    table.update(Prep::Insert)?.save()?;

    let mut update = table.update(Prep::Insert)?;
    update.set_value(columns.require("bit")?, true)?;
    update.set_value(columns.require("byte")?, 0x1eu8)?;
    update.set_value(columns.require("short")?, 0i16)?;
    update.set_value(columns.require("long")?, 1i32)?;
    update.set_value(columns.require("currency")?, i64::MIN)?;
    update.set_value(columns.require("single")?, std::f32::consts::E)?;
    update.set_value(columns.require("double")?, std::f64::consts::PI)?;
    update.set_bytes(columns.require("binary")?, &[0x01, 0x02, 0xea, 0x4f, 0x00])?;
    update.set_string(columns.require("ascii")?, ",", CodePage::ASCII)?;
    update.set_string(columns.require("unicode")?, " \"quoting\" ", CodePage::UNICODE)?;
    update.save()?;
    drop(update);

    for i in 0..NUMBERED_RECORDS {
        let mut update = table.update(Prep::Insert)?;
        update.set_string(columns.require("unicode")?, &format!("Record {i}"), CodePage::UNICODE)?;
        update.set_value(columns.require("double")?, f64::from(i) * 1.1)?;
        update.set_value(columns.require("long")?, i)?;
        update.save()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use esent_interop::InteropError;

    #[test]
    fn sample_has_twelve_records() {
        let api = Api::in_memory();
        run(&api, "sample.edb").unwrap();

        let count = crate::commands::with_read_only_database(
            &api,
            "count",
            "sample.edb",
            |session, dbid| {
                let table = session.open_table(dbid, TABLE, Default::default())?;
                let mut count = 0;
                let mut more = table.try_move_first()?;
                while more {
                    count += 1;
                    more = table.try_move_next()?;
                }
                Ok(count)
            },
        )
        .unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn existing_database_is_not_overwritten() {
        let api = Api::in_memory();
        run(&api, "sample.edb").unwrap();
        let error = run(&api, "sample.edb").unwrap_err();
        assert!(matches!(
            error,
            crate::commands::CliError::Interop(InteropError::Engine { .. })
        ));
    }
}
