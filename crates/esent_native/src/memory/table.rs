//! Table schema and rows.

use std::collections::BTreeMap;

use super::key::{normalize_segment, SegmentKind};
use crate::codes::{err, JetErr};
use crate::grbit::{ColumndefGrbit, CreateIndexGrbit, ObjectInfoFlags};
use crate::handles::ColumnId;
use crate::types::{CodePage, ColumnDef, ColumnType};

/// Default LCID of new indexes (en-US).
pub(super) const DEFAULT_LCID: u32 = 1033;
/// Default LCMapString flags of new indexes.
pub(super) const DEFAULT_LCMAP_FLAGS: u32 = 0x0003_0401;

const FIRST_FIXED: u32 = 1;
const FIRST_VARIABLE: u32 = 128;
const FIRST_TAGGED: u32 = 256;

/// Column values of one record, keyed by raw column id. Each column holds
/// one entry per multi-value instance.
pub(super) type Values = BTreeMap<u32, Vec<Vec<u8>>>;

#[derive(Debug, Clone)]
pub(super) struct ColumnSchema {
    pub name: String,
    pub columnid: ColumnId,
    pub coltyp: ColumnType,
    pub cp: CodePage,
    pub cb_max: u32,
    pub grbit: ColumndefGrbit,
    pub default: Option<Vec<u8>>,
}

impl ColumnSchema {
    pub(super) fn definition(&self) -> ColumnDef {
        ColumnDef {
            columnid: self.columnid,
            coltyp: self.coltyp,
            cp: self.cp,
            cb_max: self.cb_max,
            grbit: self.grbit,
            ..ColumnDef::default()
        }
    }

    pub(super) fn is_tagged(&self) -> bool {
        self.grbit.contains(ColumndefGrbit::COLUMN_TAGGED) || self.coltyp.is_long()
    }
}

#[derive(Debug, Clone)]
pub(super) struct IndexColumn {
    pub columnid: ColumnId,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub(super) struct IndexSchema {
    pub name: String,
    pub grbit: CreateIndexGrbit,
    pub columns: Vec<IndexColumn>,
    pub lcid: u32,
    pub lcmap_flags: u32,
}

#[derive(Debug, Clone, Default)]
pub(super) struct Record {
    pub values: Values,
    /// Session holding a write lock on the record.
    pub locked_by: Option<usize>,
}

/// One index entry: the normalized key and the record it points at.
pub(super) type Entry = (Vec<u8>, u64);

#[derive(Debug, Clone, Default)]
pub(super) struct TableData {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub indexes: Vec<IndexSchema>,
    pub records: BTreeMap<u64, Record>,
    pub next_rid: u64,
    pub flags: ObjectInfoFlags,
    next_fixed: u32,
    next_variable: u32,
    next_tagged: u32,
    next_autoinc: i64,
}

impl TableData {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_rid: 1,
            next_fixed: FIRST_FIXED,
            next_variable: FIRST_VARIABLE,
            next_tagged: FIRST_TAGGED,
            next_autoinc: 1,
            ..Self::default()
        }
    }

    pub(super) fn column(&self, columnid: ColumnId) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.columnid == columnid)
    }

    pub(super) fn column_by_name(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub(super) fn index(&self, name: &str) -> Option<&IndexSchema> {
        self.indexes.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    pub(super) fn primary(&self) -> Option<&IndexSchema> {
        self.indexes
            .iter()
            .find(|i| i.grbit.contains(CreateIndexGrbit::INDEX_PRIMARY))
    }

    /// Resolves the index a cursor navigates. `None` is the primary index.
    pub(super) fn resolve_index(&self, name: Option<&str>) -> Option<&IndexSchema> {
        match name {
            Some(name) => self.index(name),
            None => self.primary(),
        }
    }

    pub(super) fn add_column(
        &mut self,
        name: &str,
        definition: &ColumnDef,
        default: Option<&[u8]>,
    ) -> Result<ColumnId, JetErr> {
        if name.is_empty() || name.len() > 64 {
            return Err(err::INVALID_NAME);
        }
        if self.column_by_name(name).is_some() {
            return Err(err::COLUMN_DUPLICATE);
        }
        if definition.coltyp == ColumnType::Nil {
            return Err(err::INVALID_COLUMN_TYPE);
        }
        let grbit = definition.grbit;
        if grbit.contains(ColumndefGrbit::COLUMN_MULTI_VALUED)
            && !grbit.contains(ColumndefGrbit::COLUMN_TAGGED)
        {
            return Err(err::MULTI_VALUED_COLUMN_MUST_BE_TAGGED);
        }
        if grbit.contains(ColumndefGrbit::COLUMN_ESCROW_UPDATE)
            && !matches!(definition.coltyp, ColumnType::Long | ColumnType::LongLong)
        {
            return Err(err::INVALID_COLUMN_TYPE);
        }
        let cp = if definition.coltyp.is_text() {
            match definition.cp {
                CodePage::NONE => CodePage::ASCII,
                cp @ (CodePage::ASCII | CodePage::UNICODE) => cp,
                _ => return Err(err::INVALID_PARAMETER),
            }
        } else {
            CodePage::NONE
        };

        let tagged = grbit.contains(ColumndefGrbit::COLUMN_TAGGED) || definition.coltyp.is_long();
        let raw = if tagged {
            bump(&mut self.next_tagged)
        } else if definition.coltyp.fixed_size().is_some()
            || grbit.contains(ColumndefGrbit::COLUMN_FIXED)
        {
            bump(&mut self.next_fixed)
        } else {
            bump(&mut self.next_variable)
        };
        let columnid = ColumnId::new(raw);

        let default = default.filter(|d| !d.is_empty()).map(<[u8]>::to_vec);
        self.columns.push(ColumnSchema {
            name: name.to_string(),
            columnid,
            coltyp: definition.coltyp,
            cp,
            cb_max: definition.cb_max,
            grbit,
            default,
        });
        Ok(columnid)
    }

    pub(super) fn delete_column(&mut self, name: &str) -> Result<(), JetErr> {
        let column = self.column_by_name(name).ok_or(err::COLUMN_NOT_FOUND)?;
        let columnid = column.columnid;
        if self
            .indexes
            .iter()
            .any(|i| i.columns.iter().any(|c| c.columnid == columnid))
        {
            return Err(err::INVALID_OPERATION);
        }
        self.columns.retain(|c| c.columnid != columnid);
        for record in self.records.values_mut() {
            record.values.remove(&columnid.value());
        }
        Ok(())
    }

    pub(super) fn create_index(
        &mut self,
        name: &str,
        grbit: CreateIndexGrbit,
        key: &str,
    ) -> Result<(), JetErr> {
        if name.is_empty() || name.len() > 64 {
            return Err(err::INVALID_NAME);
        }
        if self.index(name).is_some() {
            return Err(err::INDEX_DUPLICATE);
        }
        if grbit.contains(CreateIndexGrbit::INDEX_PRIMARY) && self.primary().is_some() {
            return Err(err::INDEX_HAS_PRIMARY);
        }
        let mut columns = Vec::new();
        for part in key.split('\0').filter(|p| !p.is_empty()) {
            let (descending, column) = match part.as_bytes()[0] {
                b'-' => (true, &part[1..]),
                b'+' => (false, &part[1..]),
                _ => (false, part),
            };
            let schema = self.column_by_name(column).ok_or(err::COLUMN_NOT_FOUND)?;
            columns.push(IndexColumn {
                columnid: schema.columnid,
                descending,
            });
        }
        if columns.is_empty() {
            return Err(err::INDEX_INVALID_DEF);
        }
        let index = IndexSchema {
            name: name.to_string(),
            grbit,
            columns,
            lcid: DEFAULT_LCID,
            lcmap_flags: DEFAULT_LCMAP_FLAGS,
        };
        if index.is_unique() && !grbit.contains(CreateIndexGrbit::INDEX_EMPTY) {
            let mut keys: Vec<Vec<u8>> = self
                .records
                .values()
                .filter_map(|r| self.record_key(&index, &r.values))
                .collect();
            keys.sort();
            if keys.windows(2).any(|w| w[0] == w[1]) {
                return Err(err::KEY_DUPLICATE);
            }
        }
        self.indexes.push(index);
        Ok(())
    }

    pub(super) fn delete_index(&mut self, name: &str) -> Result<(), JetErr> {
        let position = self
            .indexes
            .iter()
            .position(|i| i.name.eq_ignore_ascii_case(name))
            .ok_or(err::INDEX_NOT_FOUND)?;
        self.indexes.remove(position);
        Ok(())
    }

    /// Segment normalization rules of an index.
    pub(super) fn segment_kinds(&self, index: Option<&IndexSchema>) -> Vec<SegmentKind> {
        let Some(index) = index else {
            return vec![SegmentKind {
                coltyp: ColumnType::UnsignedLong,
                cp: CodePage::NONE,
                descending: false,
                nulls_high: false,
            }];
        };
        let nulls_high = index.grbit.contains(CreateIndexGrbit::INDEX_SORT_NULLS_HIGH);
        index
            .columns
            .iter()
            .filter_map(|segment| {
                self.column(segment.columnid).map(|c| SegmentKind {
                    coltyp: c.coltyp,
                    cp: c.cp,
                    descending: segment.descending,
                    nulls_high,
                })
            })
            .collect()
    }

    /// First value of a column. A column that was never set reads as its
    /// default; an empty instance list is an explicit null.
    pub(super) fn effective_value<'a>(
        &'a self,
        values: &'a Values,
        columnid: ColumnId,
    ) -> Option<&'a [u8]> {
        match values.get(&columnid.value()) {
            Some(instances) => instances.first().map(Vec::as_slice),
            None => self.column(columnid).and_then(|c| c.default.as_deref()),
        }
    }

    /// Normalized key of a record in an index, or `None` when the record is
    /// excluded by the index null rules.
    pub(super) fn record_key(&self, index: &IndexSchema, values: &Values) -> Option<Vec<u8>> {
        let kinds = self.segment_kinds(Some(index));
        let parts: Vec<Option<&[u8]>> = index
            .columns
            .iter()
            .map(|segment| self.effective_value(values, segment.columnid))
            .collect();
        let grbit = index.grbit;
        if grbit.contains(
            CreateIndexGrbit::INDEX_IGNORE_ANY_NULL,
        ) && parts.iter().any(Option::is_none)
        {
            return None;
        }
        if grbit.contains(CreateIndexGrbit::INDEX_IGNORE_FIRST_NULL)
            && parts.first().is_some_and(Option::is_none)
        {
            return None;
        }
        if grbit.contains(
            CreateIndexGrbit::INDEX_IGNORE_NULL,
        ) && parts.iter().all(Option::is_none) {
            return None;
        }
        let mut key = Vec::new();
        for (kind, part) in kinds.iter().zip(parts) {
            key.extend(normalize_segment(*kind, part, false));
        }
        Some(key)
    }

    /// Key of a record in the given index, or the sequential key when the
    /// table has no primary index.
    pub(super) fn key_for(
        &self,
        index: Option<&IndexSchema>,
        rid: u64,
        values: &Values,
    ) -> Option<Vec<u8>> {
        match index {
            Some(index) => self.record_key(index, values),
            None => Some(rid.to_be_bytes().to_vec()),
        }
    }

    /// Sorted entries of an index.
    pub(super) fn entries(&self, index: Option<&IndexSchema>) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .records
            .iter()
            .filter_map(|(&rid, record)| self.key_for(index, rid, &record.values).map(|k| (k, rid)))
            .collect();
        entries.sort();
        entries
    }

    /// Checks that a new version of a record satisfies the table schema and
    /// the unique indexes.
    pub(super) fn validate(&self, rid: u64, values: &Values) -> Result<(), JetErr> {
        for column in &self.columns {
            if column.grbit.contains(ColumndefGrbit::COLUMN_NOT_NULL)
                && self.effective_value(values, column.columnid).is_none()
            {
                return Err(err::NULL_INVALID);
            }
        }
        for index in &self.indexes {
            if index.grbit.contains(CreateIndexGrbit::INDEX_DISALLOW_NULL)
                && index
                    .columns
                    .iter()
                    .any(|c| self.effective_value(values, c.columnid).is_none())
            {
                return Err(err::NULL_KEY_DISALLOWED);
            }
            if !index.is_unique() {
                continue;
            }
            let Some(key) = self.record_key(index, values) else {
                continue;
            };
            let duplicate = self.records.iter().any(|(&other, record)| {
                other != rid && self.record_key(index, &record.values).as_ref() == Some(&key)
            });
            if duplicate {
                return Err(err::KEY_DUPLICATE);
            }
        }
        Ok(())
    }

    /// Fills in autoincrement and version columns of a new record.
    pub(super) fn stamp_insert(&mut self, values: &mut Values) {
        for column in &self.columns {
            let id = column.columnid.value();
            if column.grbit.contains(ColumndefGrbit::COLUMN_AUTOINCREMENT) {
                let next = self.next_autoinc;
                self.next_autoinc += 1;
                let bytes = if column.coltyp == ColumnType::LongLong {
                    next.to_le_bytes().to_vec()
                } else {
                    (next as i32).to_le_bytes().to_vec()
                };
                values.insert(id, vec![bytes]);
            } else if column.grbit.contains(ColumndefGrbit::COLUMN_VERSION) {
                values.insert(id, vec![0i32.to_le_bytes().to_vec()]);
            }
        }
    }

    /// Increments version columns of a replaced record.
    pub(super) fn stamp_replace(&self, values: &mut Values) {
        for column in &self.columns {
            if !column.grbit.contains(ColumndefGrbit::COLUMN_VERSION) {
                continue;
            }
            let entry = values.entry(column.columnid.value()).or_default();
            let current = entry
                .first()
                .and_then(|v| <[u8; 4]>::try_from(v.as_slice()).ok())
                .map_or(0, i32::from_le_bytes);
            *entry = vec![current.wrapping_add(1).to_le_bytes().to_vec()];
        }
    }
}

impl IndexSchema {
    pub(super) fn is_unique(&self) -> bool {
        self.grbit
            .intersects(CreateIndexGrbit::INDEX_UNIQUE | CreateIndexGrbit::INDEX_PRIMARY)
    }
}

fn bump(counter: &mut u32) -> u32 {
    let value = *counter;
    *counter += 1;
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(coltyp: ColumnType, grbit: ColumndefGrbit) -> ColumnDef {
        ColumnDef {
            coltyp,
            grbit,
            ..ColumnDef::default()
        }
    }

    #[test]
    fn column_ids_follow_storage_class() {
        let mut table = TableData::new("t");
        let fixed = table.add_column(
            "a",
            &def(ColumnType::Long, ColumndefGrbit::NONE),
            None,
        ).unwrap();
        let variable = table.add_column(
            "b",
            &def(ColumnType::Text, ColumndefGrbit::NONE),
            None,
        ).unwrap();
        let tagged = table.add_column(
            "c",
            &def(ColumnType::LongText, ColumndefGrbit::NONE),
            None,
        ).unwrap();
        assert_eq!(fixed.value(), FIRST_FIXED);
        assert_eq!(variable.value(), FIRST_VARIABLE);
        assert_eq!(tagged.value(), FIRST_TAGGED);
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let mut table = TableData::new("t");
        table.add_column("Name", &def(ColumnType::Text, ColumndefGrbit::NONE), None).unwrap();
        let result = table.add_column("name", &def(ColumnType::Text, ColumndefGrbit::NONE), None);
        assert_eq!(result.unwrap_err(), err::COLUMN_DUPLICATE);
    }

    #[test]
    fn multi_valued_columns_must_be_tagged() {
        let mut table = TableData::new("t");
        let result = table.add_column(
            "m",
            &def(ColumnType::Long, ColumndefGrbit::COLUMN_MULTI_VALUED),
            None,
        );
        assert_eq!(result.unwrap_err(), err::MULTI_VALUED_COLUMN_MUST_BE_TAGGED);
    }

    #[test]
    fn unique_index_rejects_duplicates() {
        let mut table = TableData::new("t");
        let id = table.add_column("k", &def(ColumnType::Long, ColumndefGrbit::NONE), None).unwrap();
        table
            .create_index("pk", CreateIndexGrbit::INDEX_PRIMARY, "+k\0\0")
            .unwrap();
        let mut values = Values::new();
        values.insert(id.value(), vec![7i32.to_le_bytes().to_vec()]);
        table.records.insert(1, Record { values: values.clone(), locked_by: None });
        assert_eq!(table.validate(2, &values).unwrap_err(), err::KEY_DUPLICATE);
        assert!(table.validate(1, &values).is_ok());
    }

    #[test]
    fn index_key_parsing_reads_direction() {
        let mut table = TableData::new("t");
        table.add_column("a", &def(ColumnType::Long, ColumndefGrbit::NONE), None).unwrap();
        table.add_column("b", &def(ColumnType::Long, ColumndefGrbit::NONE), None).unwrap();
        table
            .create_index("ab", CreateIndexGrbit::NONE, "+a\0-b\0\0")
            .unwrap();
        let index = table.index("AB").unwrap();
        assert_eq!(index.columns.len(), 2);
        assert!(!index.columns[0].descending);
        assert!(index.columns[1].descending);
    }
}
