//! Schema changes and the temporary tables that describe a schema.

use super::session::CATALOG_TABLE;
use super::state::{EngineState, Status};
use super::table::{IndexSchema, Record, TableData, Values};
use crate::codes::{err, JetErr};
use crate::grbit::{ColumndefGrbit, CreateIndexGrbit, IndexColumnGrbit, TempTableGrbit};
use crate::handles::{ColumnId, DatabaseHandle, SessionHandle, TableHandle};
use crate::types::{
    CodePage, ColumnDef, ColumnList, ColumnType, IndexList, IndexRange, ObjectList, ObjectType,
    RecordList,
};

/// Container name reported for tables in an object list.
const TABLES_CONTAINER: &str = "Tables";

/// Name of the index over the key columns of a temporary table.
const TEMP_INDEX: &str = "key";

/// Builds a temporary table row by row.
struct TempTable {
    table: TableData,
}

impl TempTable {
    fn new(name: &str) -> Self {
        Self {
            table: TableData::new(name),
        }
    }

    fn column(&mut self, name: &str, coltyp: ColumnType) -> ColumnId {
        let definition = ColumnDef {
            coltyp,
            cp: if coltyp.is_text() { CodePage::ASCII } else { CodePage::NONE },
            ..ColumnDef::default()
        };
        // Names are unique and types valid, so this cannot fail.
        self.table
            .add_column(name, &definition, None)
            .unwrap_or_default()
    }

    fn row(&mut self, cells: Vec<(ColumnId, Option<Vec<u8>>)>) {
        let mut values = Values::new();
        for (columnid, cell) in cells {
            if let Some(bytes) = cell {
                values.insert(columnid.value(), vec![bytes]);
            }
        }
        let rid = self.table.next_rid;
        self.table.next_rid += 1;
        self.table.records.insert(
            rid,
            Record {
                values,
                locked_by: None,
            },
        );
    }

    fn len(&self) -> u32 {
        u32::try_from(self.table.records.len()).unwrap_or(u32::MAX)
    }
}

fn u32_cell(value: u32) -> Option<Vec<u8>> {
    Some(value.to_le_bytes().to_vec())
}

fn i32_cell(value: i32) -> Option<Vec<u8>> {
    Some(value.to_le_bytes().to_vec())
}

fn u16_cell(value: u16) -> Option<Vec<u8>> {
    Some(value.to_le_bytes().to_vec())
}

fn text_cell(value: &str) -> Option<Vec<u8>> {
    Some(value.as_bytes().to_vec())
}

fn column_list(table: &TableData, column: Option<&str>) -> Result<(TempTable, ColumnList), JetErr> {
    let mut temp = TempTable::new("column list");
    let mut list = ColumnList {
        columnid_presentation_order: temp.column("PresentationOrder", ColumnType::Long),
        columnid_column_name: temp.column("ColumnName", ColumnType::Text),
        columnid_columnid: temp.column("ColumnId", ColumnType::UnsignedLong),
        columnid_coltyp: temp.column("ColumnType", ColumnType::UnsignedLong),
        columnid_country: temp.column("CountryCode", ColumnType::UnsignedShort),
        columnid_langid: temp.column("LangId", ColumnType::UnsignedShort),
        columnid_cp: temp.column("CodePage", ColumnType::UnsignedShort),
        columnid_collate: temp.column("Collate", ColumnType::UnsignedShort),
        columnid_cb_max: temp.column("Size", ColumnType::UnsignedLong),
        columnid_grbit: temp.column("Grbit", ColumnType::UnsignedLong),
        columnid_default: temp.column("DefaultValue", ColumnType::LongBinary),
        columnid_base_table_name: temp.column("BaseTableName", ColumnType::Text),
        columnid_base_column_name: temp.column("BaseColumnName", ColumnType::Text),
        columnid_definition_name: temp.column("DefinitionName", ColumnType::Text),
        ..ColumnList::default()
    };

    let columns: Vec<_> = match column {
        Some(name) => vec![table.column_by_name(name).ok_or(err::COLUMN_NOT_FOUND)?],
        None => table.columns.iter().collect(),
    };
    for (order, schema) in columns.into_iter().enumerate() {
        temp.row(vec![
            (list.columnid_presentation_order, i32_cell(order as i32)),
            (list.columnid_column_name, text_cell(&schema.name)),
            (list.columnid_columnid, u32_cell(schema.columnid.value())),
            (list.columnid_coltyp, u32_cell(schema.coltyp.as_u32())),
            (list.columnid_country, u16_cell(0)),
            (list.columnid_langid, u16_cell(0)),
            (list.columnid_cp, u16_cell(schema.cp.0 as u16)),
            (list.columnid_collate, u16_cell(0)),
            (list.columnid_cb_max, u32_cell(schema.cb_max)),
            (list.columnid_grbit, u32_cell(schema.grbit.bits())),
            (list.columnid_default, schema.default.clone()),
            (list.columnid_base_table_name, text_cell(&table.name)),
            (list.columnid_base_column_name, text_cell(&schema.name)),
            (list.columnid_definition_name, text_cell(&schema.name)),
        ]);
    }
    list.record_count = temp.len();
    Ok((temp, list))
}

fn index_list(table: &TableData, index: Option<&str>) -> Result<(TempTable, IndexList), JetErr> {
    let mut temp = TempTable::new("index list");
    let mut list = IndexList {
        columnid_index_name: temp.column("IndexName", ColumnType::Text),
        columnid_grbit_index: temp.column("GrbitIndex", ColumnType::UnsignedLong),
        columnid_c_key: temp.column("CKey", ColumnType::Long),
        columnid_c_entry: temp.column("CEntry", ColumnType::Long),
        columnid_c_page: temp.column("CPage", ColumnType::Long),
        columnid_c_column: temp.column("CColumn", ColumnType::Long),
        columnid_i_column: temp.column("IColumn", ColumnType::Long),
        columnid_columnid: temp.column("ColumnId", ColumnType::UnsignedLong),
        columnid_coltyp: temp.column("ColumnType", ColumnType::UnsignedLong),
        columnid_country: temp.column("CountryCode", ColumnType::UnsignedShort),
        columnid_langid: temp.column("LangId", ColumnType::UnsignedShort),
        columnid_cp: temp.column("CodePage", ColumnType::UnsignedShort),
        columnid_collate: temp.column("Collate", ColumnType::UnsignedShort),
        columnid_grbit_column: temp.column("GrbitColumn", ColumnType::UnsignedLong),
        columnid_column_name: temp.column("ColumnName", ColumnType::Text),
        columnid_lc_map_flags: temp.column("LCMapFlags", ColumnType::UnsignedLong),
        ..IndexList::default()
    };

    let indexes: Vec<&IndexSchema> = match index {
        Some(name) => vec![table.index(name).ok_or(err::INDEX_NOT_FOUND)?],
        None => table.indexes.iter().collect(),
    };
    for schema in indexes {
        let entries = table.entries(Some(schema));
        let mut keys: Vec<&Vec<u8>> = entries.iter().map(|(key, _)| key).collect();
        keys.dedup();
        let segment_count = schema.columns.len() as i32;
        for (position, segment) in schema.columns.iter().enumerate() {
            let Some(column) = table.column(segment.columnid) else {
                continue;
            };
            let segment_grbit = if segment.descending {
                IndexColumnGrbit::KEY_DESCENDING
            } else {
                IndexColumnGrbit::NONE
            };
            temp.row(vec![
                (list.columnid_index_name, text_cell(&schema.name)),
                (list.columnid_grbit_index, u32_cell(schema.grbit.bits())),
                (list.columnid_c_key, i32_cell(keys.len() as i32)),
                (list.columnid_c_entry, i32_cell(entries.len() as i32)),
                (list.columnid_c_page, i32_cell(1)),
                (list.columnid_c_column, i32_cell(segment_count)),
                (list.columnid_i_column, i32_cell(position as i32)),
                (list.columnid_columnid, u32_cell(column.columnid.value())),
                (list.columnid_coltyp, u32_cell(column.coltyp.as_u32())),
                (list.columnid_country, u16_cell(0)),
                (list.columnid_langid, u16_cell(schema.lcid as u16)),
                (list.columnid_cp, u16_cell(column.cp.0 as u16)),
                (list.columnid_collate, u16_cell(0)),
                (list.columnid_grbit_column, u32_cell(segment_grbit.bits())),
                (list.columnid_column_name, text_cell(&column.name)),
                (list.columnid_lc_map_flags, u32_cell(schema.lcmap_flags)),
            ]);
        }
    }
    list.record_count = temp.len();
    Ok((temp, list))
}

impl EngineState {
    pub(super) fn add_column(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
        columnid: &mut ColumnId,
    ) -> Status {
        let (_, table) = self.cursor(sesid, tableid)?;
        *columnid = table.add_column(name, definition, default)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn delete_column(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
    ) -> Status {
        let (_, table) = self.cursor(sesid, tableid)?;
        table.delete_column(name)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn create_index(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
    ) -> Status {
        let (_, table) = self.cursor(sesid, tableid)?;
        table.create_index(name, grbit, key)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn delete_index(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        name: &str,
    ) -> Status {
        let (cursor, table) = self.cursor(sesid, tableid)?;
        if cursor
            .index
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(name))
        {
            return Err(err::INVALID_OPERATION);
        }
        table.delete_index(name)?;
        Ok(err::SUCCESS)
    }

    pub(super) fn get_table_column_info(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> Status {
        let (_, table) = self.cursor(sesid, tableid)?;
        let (temp, mut built) = column_list(table, column)?;
        built.tableid = self.open_temp(sesid, temp.table);
        *list = built;
        Ok(err::SUCCESS)
    }

    pub(super) fn get_table_column_def(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        column: &str,
        definition: &mut ColumnDef,
    ) -> Status {
        let (_, table) = self.cursor(sesid, tableid)?;
        *definition = table
            .column_by_name(column)
            .ok_or(err::COLUMN_NOT_FOUND)?
            .definition();
        Ok(err::SUCCESS)
    }

    pub(super) fn get_column_info(
        &mut self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        column: Option<&str>,
        list: &mut ColumnList,
    ) -> Status {
        let (_, data) = self.named_table(sesid, dbid, table)?;
        let (temp, mut built) = column_list(data, column)?;
        built.tableid = self.open_temp(sesid, temp.table);
        *list = built;
        Ok(err::SUCCESS)
    }

    pub(super) fn get_index_info(
        &mut self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> Status {
        let (_, data) = self.named_table(sesid, dbid, table)?;
        let (temp, mut built) = index_list(data, index)?;
        built.tableid = self.open_temp(sesid, temp.table);
        *list = built;
        Ok(err::SUCCESS)
    }

    pub(super) fn get_table_index_info(
        &mut self,
        sesid: SessionHandle,
        tableid: TableHandle,
        index: Option<&str>,
        list: &mut IndexList,
    ) -> Status {
        let (_, table) = self.cursor(sesid, tableid)?;
        let (temp, mut built) = index_list(table, index)?;
        built.tableid = self.open_temp(sesid, temp.table);
        *list = built;
        Ok(err::SUCCESS)
    }

    pub(super) fn get_object_info_list(
        &mut self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        list: &mut ObjectList,
    ) -> Status {
        let path = self.database_path(sesid, dbid)?;
        let file = self.files.get(&path).ok_or(err::DATABASE_NOT_FOUND)?;

        let mut temp = TempTable::new("object list");
        let mut built = ObjectList {
            columnid_container_name: temp.column("ContainerName", ColumnType::Text),
            columnid_object_name: temp.column("ObjectName", ColumnType::Text),
            columnid_objtyp: temp.column("ObjectType", ColumnType::UnsignedLong),
            columnid_dt_create: temp.column("DtCreate", ColumnType::DateTime),
            columnid_dt_update: temp.column("DtUpdate", ColumnType::DateTime),
            columnid_grbit: temp.column("Grbit", ColumnType::UnsignedLong),
            columnid_flags: temp.column("Flags", ColumnType::UnsignedLong),
            columnid_c_record: temp.column("CRecord", ColumnType::Long),
            columnid_c_page: temp.column("CPage", ColumnType::Long),
            ..ObjectList::default()
        };
        let mut tables: Vec<&TableData> = file.tables.values().collect();
        tables.sort_by_key(|t| t.name != CATALOG_TABLE);
        for table in tables {
            temp.row(vec![
                (built.columnid_container_name, text_cell(TABLES_CONTAINER)),
                (built.columnid_object_name, text_cell(&table.name)),
                (built.columnid_objtyp, u32_cell(ObjectType::Table as u32)),
                (built.columnid_dt_create, Some(0f64.to_le_bytes().to_vec())),
                (built.columnid_dt_update, Some(0f64.to_le_bytes().to_vec())),
                (built.columnid_grbit, u32_cell(0)),
                (built.columnid_flags, u32_cell(table.flags.bits())),
                (built.columnid_c_record, i32_cell(table.records.len() as i32)),
                (built.columnid_c_page, i32_cell(1)),
            ]);
        }
        built.record_count = temp.len();
        built.tableid = self.open_temp(sesid, temp.table);
        *list = built;
        Ok(err::SUCCESS)
    }

    pub(super) fn open_temp_table(
        &mut self,
        sesid: SessionHandle,
        columns: &[ColumnDef],
        grbit: TempTableGrbit,
        tableid: &mut TableHandle,
        columnids: &mut [ColumnId],
    ) -> Status {
        self.session(sesid)?;
        if columns.is_empty() || columnids.len() < columns.len() {
            return Err(err::INVALID_PARAMETER);
        }
        let key_flags = ColumndefGrbit::TT_KEY | ColumndefGrbit::TT_DESCENDING;
        let mut table = TableData::new("temporary table");
        let mut key = String::new();
        for (position, column) in columns.iter().enumerate() {
            let name = format!("column{position}");
            let definition = ColumnDef {
                grbit: column.grbit.without(key_flags),
                ..*column
            };
            columnids[position] = table.add_column(&name, &definition, None)?;
            if column.grbit.contains(ColumndefGrbit::TT_KEY) {
                let descending = column.grbit.contains(ColumndefGrbit::TT_DESCENDING);
                key.push(if descending { '-' } else { '+' });
                key.push_str(&name);
                key.push('\0');
            }
        }

        let index = if key.is_empty() {
            None
        } else {
            let mut index_grbit = CreateIndexGrbit::NONE;
            if grbit.contains(TempTableGrbit::UNIQUE) {
                index_grbit |= CreateIndexGrbit::INDEX_UNIQUE;
            }
            if grbit.contains(TempTableGrbit::SORT_NULLS_HIGH) {
                index_grbit |= CreateIndexGrbit::INDEX_SORT_NULLS_HIGH;
            }
            key.push('\0');
            table.create_index(TEMP_INDEX, index_grbit, &key)?;
            Some(TEMP_INDEX.to_string())
        };
        let handle = self.open_temp(sesid, table);
        if let Some(cursor) = self.cursors.get_mut(&handle.value()) {
            cursor.index = index;
        }
        *tableid = handle;
        Ok(err::SUCCESS)
    }

    pub(super) fn intersect_indexes(
        &mut self,
        sesid: SessionHandle,
        ranges: &[IndexRange],
        records: &mut RecordList,
    ) -> Status {
        let rids = self.intersection(sesid, ranges)?;
        let mut temp = TempTable::new("record list");
        let columnid_bookmark = temp.column("Bookmark", ColumnType::Binary);
        for rid in rids {
            temp.row(vec![(columnid_bookmark, Some(rid.to_be_bytes().to_vec()))]);
        }
        let record_count = temp.len();
        *records = RecordList {
            tableid: self.open_temp(sesid, temp.table),
            record_count,
            columnid_bookmark,
        };
        Ok(err::SUCCESS)
    }
}
