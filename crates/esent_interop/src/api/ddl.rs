//! Schema definition and the metadata calls.

use esent_native::grbit::CreateIndexGrbit;
use esent_native::{
    ColumnDef, ColumnId, ColumnList, DatabaseHandle, IndexList, ObjectList, SessionHandle,
    TableHandle,
};

use super::lifecycle::require_name;
use super::Api;
use crate::error::{InteropError, InteropResult};
use crate::status::JetWarning;

impl Api {
    /// Creates a table and opens a cursor on it.
    pub fn create_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
        pages: u32,
        density: u32,
    ) -> InteropResult<TableHandle> {
        require_name(name, "table")?;
        let mut tableid = TableHandle::NIL;
        self.check(
            self.engine()
                .create_table(sesid, dbid, name, pages, density, &mut tableid),
        )?;
        Ok(tableid)
    }

    /// Deletes a table.
    pub fn delete_table(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        name: &str,
    ) -> InteropResult<JetWarning> {
        require_name(name, "table")?;
        self.check(self.engine().delete_table(sesid, dbid, name))
    }

    /// Adds a column and returns its id.
    pub fn add_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
    ) -> InteropResult<ColumnId> {
        require_name(name, "column")?;
        let mut columnid = ColumnId::NIL;
        self.check(
            self.engine()
                .add_column(sesid, tableid, name, definition, default, &mut columnid),
        )?;
        Ok(columnid)
    }

    /// Deletes a column.
    pub fn delete_column(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
    ) -> InteropResult<JetWarning> {
        require_name(name, "column")?;
        self.check(self.engine().delete_column(sesid, tableid, name))
    }

    /// Creates an index.
    ///
    /// `key` lists the key columns, each prefixed with `+` or `-` and
    /// terminated by a NUL, with a final extra NUL: `"+last\0+first\0\0"`.
    pub fn create_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
        density: u32,
    ) -> InteropResult<JetWarning> {
        require_name(name, "index")?;
        if !key.ends_with("\0\0") {
            return Err(InteropError::invalid_argument(
                "index key description must end with a double NUL",
            ));
        }
        self.check(
            self.engine()
                .create_index(sesid, tableid, name, grbit, key, density),
        )
    }

    /// Deletes an index.
    pub fn delete_index(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
    ) -> InteropResult<JetWarning> {
        require_name(name, "index")?;
        self.check(self.engine().delete_index(sesid, tableid, name))
    }

    /// Opens a temporary table describing the columns of an open table.
    pub fn get_table_column_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: Option<&str>,
    ) -> InteropResult<ColumnList> {
        let mut list = ColumnList::default();
        self.check(
            self.engine()
                .get_table_column_info(sesid, tableid, column, &mut list),
        )?;
        Ok(list)
    }

    /// Returns the definition of one column of an open table.
    pub fn get_table_column_def(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: &str,
    ) -> InteropResult<ColumnDef> {
        require_name(column, "column")?;
        let mut definition = ColumnDef::default();
        self.check(
            self.engine()
                .get_table_column_def(sesid, tableid, column, &mut definition),
        )?;
        Ok(definition)
    }

    /// Opens a temporary table describing the columns of a named table.
    pub fn get_column_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        column: Option<&str>,
    ) -> InteropResult<ColumnList> {
        require_name(table, "table")?;
        let mut list = ColumnList::default();
        self.check(
            self.engine()
                .get_column_info(sesid, dbid, table, column, &mut list),
        )?;
        Ok(list)
    }

    /// Opens a temporary table listing the tables of a database.
    pub fn get_object_info_list(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
    ) -> InteropResult<ObjectList> {
        let mut list = ObjectList::default();
        self.check(self.engine().get_object_info_list(sesid, dbid, &mut list))?;
        Ok(list)
    }

    /// Opens a temporary table describing the indexes of a named table.
    pub fn get_index_info(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        index: Option<&str>,
    ) -> InteropResult<IndexList> {
        require_name(table, "table")?;
        let mut list = IndexList::default();
        self.check(
            self.engine()
                .get_index_info(sesid, dbid, table, index, &mut list),
        )?;
        Ok(list)
    }

    /// Opens a temporary table describing the indexes of an open table.
    pub fn get_table_index_info(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
    ) -> InteropResult<IndexList> {
        let mut list = IndexList::default();
        self.check(
            self.engine()
                .get_table_index_info(sesid, tableid, index, &mut list),
        )?;
        Ok(list)
    }
}
