//! Column, index and table descriptors read from the engine's list tables.

use std::collections::HashMap;

use esent_native::grbit::{
    ColumndefGrbit, CreateIndexGrbit, IndexColumnGrbit, ObjectInfoFlags, RetrieveColumnGrbit,
};
use esent_native::{
    CodePage, ColumnId, ColumnList, ColumnType, DatabaseHandle, IndexList, SessionHandle,
    TableHandle,
};

use crate::enumerator::TableEnumerator;
use crate::error::{InteropError, InteropResult};
use crate::value::FixedColumn;
use crate::Api;

/// Description of one column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Column id.
    pub columnid: ColumnId,
    /// Column type.
    pub coltyp: ColumnType,
    /// Code page of a text column, `CodePage::NONE` otherwise.
    pub code_page: CodePage,
    /// Maximum length in bytes, 0 for unbounded.
    pub max_length: u32,
    /// Default value, if the column has one.
    pub default_value: Option<Vec<u8>>,
    /// Column flags.
    pub grbit: ColumndefGrbit,
}

/// One key column of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSegment {
    /// Name of the key column.
    pub column_name: String,
    /// Type of the key column.
    pub coltyp: ColumnType,
    /// Sort direction of the segment.
    pub is_ascending: bool,
    /// True for text columns stored as ASCII.
    pub is_ascii: bool,
}

/// Description of one index of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Locale id used to normalize text keys.
    pub lcid: u32,
    /// `LCMapString` flags used to normalize text keys.
    pub compare_options: u32,
    /// Key columns, most significant first.
    pub segments: Vec<IndexSegment>,
    /// Index flags.
    pub grbit: CreateIndexGrbit,
}

/// Case-insensitive map from column names to ids.
#[derive(Debug, Clone, Default)]
pub struct ColumnDictionary {
    columns: HashMap<String, (String, ColumnId)>,
}

impl ColumnDictionary {
    /// Looks up a column id, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ColumnId> {
        self.columns
            .get(&name.to_ascii_lowercase())
            .map(|&(_, columnid)| columnid)
    }

    /// Looks up a column id, failing if there is none.
    pub fn require(&self, name: &str) -> InteropResult<ColumnId> {
        self.get(name)
            .ok_or_else(|| InteropError::invalid_argument(format!("no column named {name:?}")))
    }

    /// Returns true if the table has a column called `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names as defined, with their ids, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnId)> {
        self.columns
            .values()
            .map(|(name, columnid)| (name.as_str(), *columnid))
    }

    fn insert(&mut self, name: String, columnid: ColumnId) {
        self.columns
            .insert(name.to_ascii_lowercase(), (name, columnid));
    }
}

fn required<T: FixedColumn>(
    api: &Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    columnid: ColumnId,
    field: &'static str,
) -> InteropResult<T> {
    api.retrieve_column_as::<T>(sesid, tableid, columnid, RetrieveColumnGrbit::NONE)?
        .ok_or(InteropError::MissingMetadata { field })
}

fn required_text(
    api: &Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    columnid: ColumnId,
    field: &'static str,
) -> InteropResult<String> {
    api.retrieve_column_string(
        sesid,
        tableid,
        columnid,
        CodePage::ASCII,
        RetrieveColumnGrbit::NONE,
    )?
        .ok_or(InteropError::MissingMetadata { field })
}

fn column_type(value: u32) -> ColumnType {
    ColumnType::from_u32(value).unwrap_or(ColumnType::Nil)
}

fn read_column(
    api: &Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    list: &ColumnList,
) -> InteropResult<ColumnInfo> {
    Ok(ColumnInfo {
        name: required_text(api, sesid, tableid, list.columnid_column_name, "column name")?,
        columnid: ColumnId::new(
            required(api, sesid, tableid, list.columnid_columnid, "column id")?,
        ),
        coltyp: column_type(required(api, sesid, tableid, list.columnid_coltyp, "column type")?),
        code_page: CodePage(u32::from(required::<u16>(
            api,
            sesid,
            tableid,
            list.columnid_cp,
            "code page",
        )?)),
        max_length: required(api, sesid, tableid, list.columnid_cb_max, "column size")?,
        default_value: api.retrieve_column_bytes(
            sesid,
            tableid,
            list.columnid_default,
            RetrieveColumnGrbit::NONE,
            None,
        )?,
        grbit: ColumndefGrbit(required(api, sesid, tableid, list.columnid_grbit, "column flags")?),
    })
}

fn read_segment(
    api: &Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    list: &IndexList,
) -> InteropResult<IndexSegment> {
    let coltyp = column_type(required(api, sesid, tableid, list.columnid_coltyp, "segment type")?);
    let code_page: u16 = required(api, sesid, tableid, list.columnid_cp, "segment code page")?;
    let grbit = IndexColumnGrbit(
        required(api, sesid, tableid, list.columnid_grbit_column, "segment flags")?,
    );
    Ok(IndexSegment {
        column_name: required_text(
            api,
            sesid,
            tableid,
            list.columnid_column_name,
            "segment column",
        )?,
        coltyp,
        is_ascending: !grbit.contains(IndexColumnGrbit::KEY_DESCENDING),
        is_ascii: coltyp.is_text() && u32::from(code_page) == CodePage::ASCII.0,
    })
}

/// Reads the index whose first segment row is current, leaving the cursor on
/// its last segment row.
fn read_index(
    api: &Api,
    sesid: SessionHandle,
    tableid: TableHandle,
    list: &IndexList,
) -> InteropResult<IndexInfo> {
    let name = required_text(api, sesid, tableid, list.columnid_index_name, "index name")?;
    let grbit = CreateIndexGrbit(
        required(api, sesid, tableid, list.columnid_grbit_index, "index flags")?,
    );
    let lcid: u16 = required(api, sesid, tableid, list.columnid_langid, "index locale")?;
    let compare_options = required(
        api,
        sesid,
        tableid,
        list.columnid_lc_map_flags,
        "compare options",
    )?;
    let count: i32 = required(api, sesid, tableid, list.columnid_c_column, "segment count")?;
    let count = usize::try_from(count).map_err(|_| InteropError::MissingMetadata {
        field: "segment count",
    })?;

    let mut segments = Vec::with_capacity(count);
    for position in 0..count {
        if position > 0 && !api.try_move_next(sesid, tableid)? {
            return Err(InteropError::MissingMetadata { field: "index segment" });
        }
        segments.push(read_segment(api, sesid, tableid, list)?);
    }
    Ok(IndexInfo {
        name,
        lcid: u32::from(lcid),
        compare_options,
        segments,
        grbit,
    })
}

impl Api {
    /// Enumerates the columns of an open table.
    pub fn get_table_columns(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<TableEnumerator<'static, ColumnInfo>> {
        let list = self.get_table_column_info(sesid, tableid, None)?;
        Ok(self.column_enumerator(sesid, list))
    }

    /// Enumerates the columns of a table by name.
    pub fn get_columns(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
    ) -> InteropResult<TableEnumerator<'static, ColumnInfo>> {
        let list = self.get_column_info(sesid, dbid, table, None)?;
        Ok(self.column_enumerator(sesid, list))
    }

    /// Enumerates the indexes of an open table.
    pub fn get_table_indexes(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<TableEnumerator<'static, IndexInfo>> {
        let list = self.get_table_index_info(sesid, tableid, None)?;
        Ok(self.index_enumerator(sesid, list))
    }

    /// Enumerates the indexes of a table by name.
    pub fn get_indexes(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
        table: &str,
    ) -> InteropResult<TableEnumerator<'static, IndexInfo>> {
        let list = self.get_index_info(sesid, dbid, table, None)?;
        Ok(self.index_enumerator(sesid, list))
    }

    /// Names of the user tables of a database. System tables are skipped.
    pub fn get_table_names(
        &self,
        sesid: SessionHandle,
        dbid: DatabaseHandle,
    ) -> InteropResult<impl Iterator<Item = InteropResult<String>>> {
        let list = self.get_object_info_list(sesid, dbid)?;
        let objects = TableEnumerator::new(
            self,
            sesid,
            list.tableid,
            list.record_count,
            move |api, sesid, tableid| {
                let name = required_text(
                    api,
                    sesid,
                    tableid,
                    list.columnid_object_name,
                    "object name",
                )?;
                let flags = ObjectInfoFlags(
                    required(api, sesid, tableid, list.columnid_flags, "object flags")?,
                );
                Ok((name, flags))
            },
        );
        Ok(objects.filter_map(|object| match object {
            Ok((_, flags)) if flags.contains(ObjectInfoFlags::SYSTEM) => None,
            Ok((name, _)) => Some(Ok(name)),
            Err(error) => Some(Err(error)),
        }))
    }

    /// Builds a case-insensitive name to id map for an open table.
    pub fn get_column_dictionary(
        &self,
        sesid: SessionHandle,
        tableid: TableHandle,
    ) -> InteropResult<ColumnDictionary> {
        let list = self.get_table_column_info(sesid, tableid, None)?;
        let mut dictionary = ColumnDictionary::default();
        let entries = TableEnumerator::new(
            self,
            sesid,
            list.tableid,
            list.record_count,
            move |api, sesid, tableid| {
                let name = required_text(
                    api,
                    sesid,
                    tableid,
                    list.columnid_column_name,
                    "column name",
                )?;
                let columnid = required::<u32>(
                    api,
                    sesid,
                    tableid,
                    list.columnid_columnid,
                    "column id",
                )?;
                Ok((name, ColumnId::new(columnid)))
            },
        );
        for entry in entries {
            let (name, columnid) = entry?;
            dictionary.insert(name, columnid);
        }
        Ok(dictionary)
    }

    fn column_enumerator(
        &self,
        sesid: SessionHandle,
        list: ColumnList,
    ) -> TableEnumerator<'static, ColumnInfo> {
        TableEnumerator::new(
            self,
            sesid,
            list.tableid,
            list.record_count,
            move |api, sesid, tableid| {
                read_column(api, sesid, tableid, &list)
            },
        )
    }

    fn index_enumerator(
        &self,
        sesid: SessionHandle,
        list: IndexList,
    ) -> TableEnumerator<'static, IndexInfo> {
        TableEnumerator::new(
            self,
            sesid,
            list.tableid,
            list.record_count,
            move |api, sesid, tableid| {
                read_index(api, sesid, tableid, &list)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    fn columns(f: &Fixture) -> Vec<ColumnInfo> {
        f.api
            .get_table_columns(f.sesid, f.tableid)
            .unwrap()
            .collect::<InteropResult<_>>()
            .unwrap()
    }

    fn indexes(f: &Fixture) -> Vec<IndexInfo> {
        f.api
            .get_table_indexes(f.sesid, f.tableid)
            .unwrap()
            .collect::<InteropResult<_>>()
            .unwrap()
    }

    #[test]
    fn columns_describe_the_table() {
        let f = Fixture::new();
        let columns = columns(&f);
        let unicode = columns.iter().find(|c| c.name == "unicode").unwrap();
        assert_eq!(unicode.coltyp, ColumnType::LongText);
        assert_eq!(unicode.code_page, CodePage::UNICODE);
        assert_eq!(unicode.columnid, f.column("unicode"));
        assert_eq!(unicode.default_value, None);

        let counter = columns.iter().find(|c| c.name == "counter").unwrap();
        assert!(counter.grbit.contains(ColumndefGrbit::COLUMN_ESCROW_UPDATE));
        assert_eq!(counter.default_value, Some(0i32.to_le_bytes().to_vec()));
    }

    #[test]
    fn columns_by_table_name_match_open_table() {
        let f = Fixture::new();
        let by_name: Vec<ColumnInfo> = f
            .api
            .get_columns(f.sesid, f.dbid, "values")
            .unwrap()
            .collect::<InteropResult<_>>()
            .unwrap();
        assert_eq!(by_name, columns(&f));
    }

    #[test]
    fn single_segment_index() {
        let f = Fixture::new();
        let indexes = indexes(&f);
        assert_eq!(indexes.len(), 1);
        let primary = &indexes[0];
        assert_eq!(primary.name, "primary");
        assert!(primary.grbit.contains(CreateIndexGrbit::INDEX_PRIMARY));
        assert_eq!(primary.lcid, 1033);
        assert_eq!(
            primary.segments,
            vec![IndexSegment {
                column_name: "key".into(),
                coltyp: ColumnType::Long,
                is_ascending: true,
                is_ascii: false,
            }]
        );
    }

    #[test]
    fn multi_segment_indexes_are_grouped() {
        let f = Fixture::new();
        f.api
            .create_index(
                f.sesid,
                f.tableid,
                "compound",
                CreateIndexGrbit::NONE,
                "+ascii\0-int16\0\0",
                100,
            )
            .unwrap();
        f.api
            .create_index(f.sesid, f.tableid, "by_guid", CreateIndexGrbit::NONE, "+guid\0\0", 100)
            .unwrap();
        let indexes = indexes(&f);
        let names: Vec<&str> = indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["primary", "compound", "by_guid"]);

        let compound = &indexes[1];
        assert_eq!(compound.segments.len(), 2);
        assert_eq!(compound.segments[0].column_name, "ascii");
        assert!(compound.segments[0].is_ascending);
        assert!(compound.segments[0].is_ascii);
        assert_eq!(compound.segments[1].column_name, "int16");
        assert!(!compound.segments[1].is_ascending);
        assert_eq!(indexes[2].segments.len(), 1);
    }

    #[test]
    fn table_names_skip_system_tables() {
        let f = Fixture::new();
        f.api.create_table(f.sesid, f.dbid, "more", 0, 100).unwrap();
        let names: Vec<String> = f
            .api
            .get_table_names(f.sesid, f.dbid)
            .unwrap()
            .collect::<InteropResult<_>>()
            .unwrap();
        let mut names = names;
        names.sort();
        assert_eq!(names, vec!["more".to_string(), "values".to_string()]);
    }

    #[test]
    fn column_dictionary_ignores_case() {
        let f = Fixture::new();
        let dictionary = f.api.get_column_dictionary(f.sesid, f.tableid).unwrap();
        assert_eq!(dictionary.len(), columns(&f).len());
        assert_eq!(dictionary.get("KEY"), Some(f.column("key")));
        assert_eq!(dictionary.get("Unicode"), Some(f.column("unicode")));
        assert!(!dictionary.contains("missing"));
        assert!(dictionary.require("missing").is_err());
        assert!(dictionary.iter().any(|(name, _)| name == "counter"));
    }
}
