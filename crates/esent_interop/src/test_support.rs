//! A table with one column of every marshaled type, on the in-memory engine.

use std::collections::HashMap;

use esent_native::grbit::{ColumndefGrbit, CreateDatabaseGrbit, CreateIndexGrbit};
use esent_native::{
    CodePage, ColumnDef, ColumnId, ColumnType, DatabaseHandle, InstanceHandle, Prep, SessionHandle,
    TableHandle,
};

use crate::Api;

const COLUMNS: &[(&str, ColumnType, CodePage, ColumndefGrbit)] = &[
    ("key", ColumnType::Long, CodePage::NONE, ColumndefGrbit::NONE),
    ("bool", ColumnType::Bit, CodePage::NONE, ColumndefGrbit::NONE),
    ("byte", ColumnType::UnsignedByte, CodePage::NONE, ColumndefGrbit::NONE),
    ("int16", ColumnType::Short, CodePage::NONE, ColumndefGrbit::NONE),
    ("uint16", ColumnType::UnsignedShort, CodePage::NONE, ColumndefGrbit::NONE),
    ("int32", ColumnType::Long, CodePage::NONE, ColumndefGrbit::NONE),
    ("uint32", ColumnType::UnsignedLong, CodePage::NONE, ColumndefGrbit::NONE),
    ("int64", ColumnType::LongLong, CodePage::NONE, ColumndefGrbit::NONE),
    ("float", ColumnType::IEEESingle, CodePage::NONE, ColumndefGrbit::NONE),
    ("double", ColumnType::IEEEDouble, CodePage::NONE, ColumndefGrbit::NONE),
    ("date", ColumnType::DateTime, CodePage::NONE, ColumndefGrbit::NONE),
    ("guid", ColumnType::Guid, CodePage::NONE, ColumndefGrbit::NONE),
    ("ascii", ColumnType::LongText, CodePage::ASCII, ColumndefGrbit::NONE),
    ("unicode", ColumnType::LongText, CodePage::UNICODE, ColumndefGrbit::NONE),
    ("binary", ColumnType::LongBinary, CodePage::NONE, ColumndefGrbit::NONE),
];

pub(crate) struct Fixture {
    pub api: Api,
    pub instance: InstanceHandle,
    pub sesid: SessionHandle,
    pub dbid: DatabaseHandle,
    pub tableid: TableHandle,
    columns: HashMap<&'static str, ColumnId>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_api(Api::in_memory())
    }

    pub fn with_api(api: Api) -> Self {
        let mut instance = api.create_instance("fixture").unwrap();
        api.init(&mut instance).unwrap();
        let sesid = api.begin_session(instance, None, None).unwrap();
        let dbid = api
            .create_database(sesid, "fixture.edb", None, CreateDatabaseGrbit::NONE)
            .unwrap();
        let tableid = api.create_table(sesid, dbid, "values", 0, 100).unwrap();

        let mut columns = HashMap::new();
        for &(name, coltyp, cp, grbit) in COLUMNS {
            let definition = ColumnDef {
                coltyp,
                cp,
                grbit,
                ..ColumnDef::default()
            };
            let columnid = api.add_column(sesid, tableid, name, &definition, None).unwrap();
            columns.insert(name, columnid);
        }
        let tags = ColumnDef {
            coltyp: ColumnType::Long,
            grbit: ColumndefGrbit::COLUMN_TAGGED | ColumndefGrbit::COLUMN_MULTI_VALUED,
            ..ColumnDef::default()
        };
        columns.insert("tags", api.add_column(sesid, tableid, "tags", &tags, None).unwrap());
        let counter = ColumnDef {
            coltyp: ColumnType::Long,
            grbit: ColumndefGrbit::COLUMN_FIXED | ColumndefGrbit::COLUMN_ESCROW_UPDATE,
            ..ColumnDef::default()
        };
        let columnid = api
            .add_column(sesid, tableid, "counter", &counter, Some(&0i32.to_le_bytes()))
            .unwrap();
        columns.insert("counter", columnid);

        api.create_index(
            sesid,
            tableid,
            "primary",
            CreateIndexGrbit::INDEX_PRIMARY | CreateIndexGrbit::INDEX_UNIQUE,
            "+key\0\0",
            100,
        )
        .unwrap();

        Self {
            api,
            instance,
            sesid,
            dbid,
            tableid,
            columns,
        }
    }

    pub fn column(&self, name: &str) -> ColumnId {
        self.columns[name]
    }

    /// Prepares an insert of a record with `key`. The update stays pending.
    pub fn begin_insert(&self, key: i32) {
        self.api
            .prepare_update(self.sesid, self.tableid, Prep::Insert)
            .unwrap();
        self.api
            .set_column_value(self.sesid, self.tableid, self.column("key"), key)
            .unwrap();
    }

    pub fn save(&self) {
        self.api.update(self.sesid, self.tableid, None).unwrap();
    }

    /// Inserts records with the given keys and no other values.
    pub fn insert_keys(&self, keys: &[i32]) {
        for &key in keys {
            self.begin_insert(key);
            self.save();
        }
    }
}
