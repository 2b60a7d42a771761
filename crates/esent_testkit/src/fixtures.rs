//! Test fixtures and database helpers.
//!
//! Provides an initialized instance with one session and one database, and
//! builders for the tables the integration tests share.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use esent_interop::{Api, Config, Instance, Session};
use esent_native::grbit::{
    ColumndefGrbit, CreateDatabaseGrbit, CreateIndexGrbit, MakeKeyGrbit, SeekGrbit, TermGrbit,
};
use esent_native::{
    CodePage, ColumnDef, ColumnId, ColumnType, DatabaseHandle, InstanceHandle, Prep,
    SessionHandle, TableHandle,
};
use tempfile::TempDir;

/// An initialized instance with one open database, terminated on drop.
///
/// Handles are exposed directly so tests can drive [`Api`] calls without the
/// owned wrappers. The database file lives in a temporary directory.
pub struct TestDatabase {
    /// The binding context.
    pub api: Api,
    /// The initialized instance.
    pub instance: InstanceHandle,
    /// A session on the instance.
    pub sesid: SessionHandle,
    /// The database, opened by `sesid`.
    pub dbid: DatabaseHandle,
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Creates a database on the in-memory engine with the default config.
    pub fn memory() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a database on the in-memory engine with `config`.
    pub fn with_config(config: Config) -> Self {
        let engine = std::sync::Arc::new(esent_native::InMemoryEngine::new());
        let api = Api::new(engine, config).expect("Failed to create binding");
        Self::with_api(api)
    }

    /// Creates a database through an existing binding.
    pub fn with_api(api: Api) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.edb");
        let name = format!("testkit-{}", uuid::Uuid::new_v4());

        let mut instance = api.create_instance(&name).expect("Failed to create instance");
        api.init(&mut instance).expect("Failed to init instance");
        let sesid = api
            .begin_session(instance, None, None)
            .expect("Failed to begin session");
        let dbid = api
            .create_database(sesid, &path_str(&path), None, CreateDatabaseGrbit::NONE)
            .expect("Failed to create database");

        Self {
            api,
            instance,
            sesid,
            dbid,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the database file as the engine expects it.
    pub fn path_str(&self) -> String {
        path_str(&self.path)
    }

    /// Creates a table with the given columns and returns its cursor.
    pub fn create_table(&self, name: &str, columns: &[(&str, ColumnDef)]) -> TestTable {
        let tableid = self
            .api
            .create_table(self.sesid, self.dbid, name, 0, 100)
            .expect("Failed to create table");
        let mut ids = HashMap::new();
        for (column, definition) in columns {
            let columnid = self
                .api
                .add_column(self.sesid, tableid, column, definition, None)
                .expect("Failed to add column");
            ids.insert((*column).to_string(), columnid);
        }
        TestTable {
            tableid,
            columns: ids,
        }
    }

    /// Begins another session on the instance with the database opened.
    pub fn second_session(&self) -> (SessionHandle, DatabaseHandle) {
        let sesid = self
            .api
            .begin_session(self.instance, None, None)
            .expect("Failed to begin session");
        let dbid = self
            .api
            .open_database(sesid, &self.path_str(), None, Default::default())
            .expect("Failed to open database");
        (sesid, dbid)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let _ = self.api.term(self.instance, TermGrbit::NONE);
    }
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A cursor on a table created by [`TestDatabase::create_table`].
#[derive(Debug, Clone)]
pub struct TestTable {
    /// The cursor.
    pub tableid: TableHandle,
    columns: HashMap<String, ColumnId>,
}

impl TestTable {
    /// Id of column `name`.
    pub fn column(&self, name: &str) -> ColumnId {
        *self
            .columns
            .get(name)
            .unwrap_or_else(|| panic!("no column {name} in test table"))
    }
}

/// Runs `f` with an owned instance and session over a fresh database.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&Session<'_>, DatabaseHandle) -> R,
{
    let api = Api::in_memory();
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = path_str(&temp_dir.path().join("session.edb"));
    let mut instance =
        Instance::new(
            &api,
            &format!("testkit-{}", uuid::Uuid::new_v4()),
        ).expect("Failed to create instance");
    instance.init().expect("Failed to init instance");
    let session = Session::new(&instance).expect("Failed to begin session");
    let dbid = session
        .create_database(&path, CreateDatabaseGrbit::NONE)
        .expect("Failed to create database");
    f(&session, dbid)
}

/// Column definitions for common test tables.
pub mod columns {
    use super::*;

    /// A fixed column of type `coltyp`.
    pub fn fixed(coltyp: ColumnType) -> ColumnDef {
        ColumnDef {
            coltyp,
            ..ColumnDef::default()
        }
    }

    /// A long text column with code page `cp`.
    pub fn text(cp: CodePage) -> ColumnDef {
        ColumnDef {
            coltyp: ColumnType::LongText,
            cp,
            ..ColumnDef::default()
        }
    }

    /// A long binary column.
    pub fn binary() -> ColumnDef {
        fixed(ColumnType::LongBinary)
    }

    /// A 32-bit escrow counter.
    pub fn counter() -> ColumnDef {
        ColumnDef {
            coltyp: ColumnType::Long,
            grbit: ColumndefGrbit::COLUMN_FIXED | ColumndefGrbit::COLUMN_ESCROW_UPDATE,
            ..ColumnDef::default()
        }
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates table `name` with an `id` primary key, a `data` long binary
    /// column and a `text` Unicode column.
    pub fn record_table(db: &TestDatabase, name: &str) -> TestTable {
        let table = db.create_table(
            name,
            &[
                ("id", columns::fixed(ColumnType::Long)),
                ("data", columns::binary()),
                ("text", columns::text(CodePage::UNICODE)),
            ],
        );
        db.api
            .create_index(
                db.sesid,
                table.tableid,
                "primary",
                CreateIndexGrbit::INDEX_PRIMARY,
                "+id\0\0",
                100,
            )
            .expect("Failed to create primary index");
        table
    }

    /// Inserts a record with key `id` and leaves the cursor on it.
    pub fn insert_record(db: &TestDatabase, table: &TestTable, id: i32) {
        let (sesid, tableid) = (db.sesid, table.tableid);
        db.api
            .prepare_update(sesid, tableid, Prep::Insert)
            .expect("Failed to prepare insert");
        db.api
            .set_column_value(sesid, tableid, table.column("id"), id)
            .expect("Failed to set id");
        db.api
            .update(sesid, tableid, None)
            .expect("Failed to insert record");
        seek_record(db, db.sesid, table.tableid, id);
    }

    /// Positions `tableid` on the record with key `id`.
    pub fn seek_record(db: &TestDatabase, sesid: SessionHandle, tableid: TableHandle, id: i32) {
        db.api
            .make_key_value(sesid, tableid, id, MakeKeyGrbit::NEW_KEY)
            .expect("Failed to make key");
        let found = db
            .api
            .try_seek(sesid, tableid, SeekGrbit::SEEK_EQ)
            .expect("Failed to seek");
        assert!(found, "record {id} not found");
    }

    /// Creates table `counters` with one record whose `count` escrow column
    /// starts at zero.
    pub fn counter_table(db: &TestDatabase) -> TestTable {
        let table = db.create_table("counters", &[("id", columns::fixed(ColumnType::Long))]);
        let count = db
            .api
            .add_column(
                db.sesid,
                table.tableid,
                "count",
                &columns::counter(),
                Some(&0i32.to_le_bytes()),
            )
            .expect("Failed to add counter column");
        db.api
            .create_index(
                db.sesid,
                table.tableid,
                "primary",
                CreateIndexGrbit::INDEX_PRIMARY,
                "+id\0\0",
                100,
            )
            .expect("Failed to create primary index");
        let mut table = table;
        table.columns.insert("count".to_string(), count);
        insert_record(db, &table, 0);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_is_usable() {
        let db = TestDatabase::memory();
        let table = scenarios::record_table(&db, "records");
        scenarios::insert_record(&db, &table, 3);
        let id = db
            .api
            .retrieve_column_as::<i32>(
                db.sesid,
                table.tableid,
                table.column("id"),
                Default::default(),
            )
            .unwrap();
        assert_eq!(id, Some(3));
    }

    #[test]
    fn second_session_sees_the_database() {
        let db = TestDatabase::memory();
        scenarios::counter_table(&db);
        let (sesid, dbid) = db.second_session();
        let names: Vec<String> = db
            .api
            .get_table_names(sesid, dbid)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec!["counters".to_string()]);
    }

    #[test]
    fn with_session_runs_the_closure() {
        let names = with_session(|session, dbid| {
            drop(session.create_table(dbid, "t").unwrap());
            session.table_names(dbid).unwrap()
        });
        assert_eq!(names, vec!["t".to_string()]);
    }
}
