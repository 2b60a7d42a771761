//! Dump-metadata command implementation.

use std::io::Write;

use esent_interop::{Api, ColumnInfo, IndexInfo};
use esent_native::ColumnType;
use serde::Serialize;

use super::{with_read_only_database, CliResult, OutputFormat};

/// Schema of one database.
#[derive(Debug, Serialize)]
pub struct MetadataReport {
    /// Database path.
    pub database: String,
    /// User tables in name order.
    pub tables: Vec<TableReport>,
}

/// Schema of one table.
#[derive(Debug, Serialize)]
pub struct TableReport {
    /// Table name.
    pub name: String,
    /// Columns in the order the engine lists them.
    pub columns: Vec<ColumnReport>,
    /// Indexes in creation order.
    pub indexes: Vec<IndexReport>,
}

/// One column.
#[derive(Debug, Serialize)]
pub struct ColumnReport {
    /// Column name.
    pub name: String,
    /// Column type name.
    pub coltyp: String,
    /// Column id.
    pub columnid: u32,
    /// Code page, for text columns only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_page: Option<u32>,
    /// Maximum length in bytes.
    pub max_length: u32,
    /// Raw column flags.
    pub grbit: u32,
}

/// One index.
#[derive(Debug, Serialize)]
pub struct IndexReport {
    /// Index name.
    pub name: String,
    /// Key segments, `+` or `-` followed by the column name.
    pub segments: Vec<String>,
    /// Raw index flags.
    pub grbit: u32,
}

impl From<ColumnInfo> for ColumnReport {
    fn from(column: ColumnInfo) -> Self {
        let is_text = matches!(column.coltyp, ColumnType::Text | ColumnType::LongText);
        Self {
            name: column.name,
            coltyp: format!("{:?}", column.coltyp),
            columnid: column.columnid.value(),
            code_page: is_text.then_some(column.code_page.0),
            max_length: column.max_length,
            grbit: column.grbit.bits(),
        }
    }
}

impl From<IndexInfo> for IndexReport {
    fn from(index: IndexInfo) -> Self {
        Self {
            name: index.name,
            segments: index
                .segments
                .into_iter()
                .map(|segment| {
                    let direction = if segment.is_ascending { '+' } else { '-' };
                    format!("{direction}{}", segment.column_name)
                })
                .collect(),
            grbit: index.grbit.bits(),
        }
    }
}

/// Reads the schema of `database`.
pub fn collect(api: &Api, database: &str) -> CliResult<MetadataReport> {
    with_read_only_database(api, "dumpmetadata", database, |session, dbid| {
        let sesid = session.sesid()?;
        let mut names = session.table_names(dbid)?;
        names.sort();

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let columns = api
                .get_columns(sesid, dbid, &name)?
                .map(|column| column.map(ColumnReport::from))
                .collect::<Result<Vec<_>, _>>()?;
            let indexes = api
                .get_indexes(sesid, dbid, &name)?
                .map(|index| index.map(IndexReport::from))
                .collect::<Result<Vec<_>, _>>()?;
            tables.push(TableReport { name, columns, indexes });
        }
        Ok(MetadataReport {
            database: database.to_string(),
            tables,
        })
    })
}

/// Runs the dump-metadata command.
pub fn run(api: &Api, database: &str, format: OutputFormat, out: &mut impl Write) -> CliResult<()> {
    let report = collect(api, database)?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
        OutputFormat::Text => print_text_output(&report, out)?,
    }
    Ok(())
}

fn print_text_output(report: &MetadataReport, out: &mut impl Write) -> CliResult<()> {
    for table in &report.tables {
        writeln!(out, "{}", table.name)?;
        for column in &table.columns {
            writeln!(out, "\t{}", column.name)?;
            writeln!(out, "\t\tColtyp:     {}", column.coltyp)?;
            writeln!(out, "\t\tColumnid:   {}", column.columnid)?;
            if let Some(code_page) = column.code_page {
                writeln!(out, "\t\tCode page:  {code_page}")?;
            }
            writeln!(out, "\t\tMax length: {}", column.max_length)?;
            writeln!(out, "\t\tGrbit:      {:#x}", column.grbit)?;
        }
        for index in &table.indexes {
            writeln!(out, "\tindex {}", index.name)?;
            writeln!(out, "\t\tKey:        {}", index.segments.join(" "))?;
            writeln!(out, "\t\tGrbit:      {:#x}", index.grbit)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_sample;

    fn sample() -> Api {
        let api = Api::in_memory();
        create_sample::run(&api, "sample.edb").unwrap();
        api
    }

    #[test]
    fn report_lists_the_sample_table() {
        let api = sample();
        let report = collect(&api, "sample.edb").unwrap();
        assert_eq!(report.tables.len(), 1);
        let table = &report.tables[0];
        assert_eq!(table.name, create_sample::TABLE);
        assert!(table.columns.iter().any(|c| c.name == "unicode" && c.code_page == Some(1200)));
        assert!(table.columns.iter().any(|c| c.name == "long" && c.code_page.is_none()));

        let secondary = table.indexes.iter().find(|i| i.name == "secondary").unwrap();
        assert_eq!(secondary.segments, vec!["+double".to_string(), "-ascii".to_string()]);
    }

    #[test]
    fn json_output_parses() {
        let api = sample();
        let mut out = Vec::new();
        run(&api, "sample.edb", OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["tables"][0]["name"], create_sample::TABLE);
    }

    #[test]
    fn text_output_names_every_column() {
        let api = sample();
        let mut out = Vec::new();
        run(&api, "sample.edb", OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(create_sample::TABLE));
        for column in ["key", "bit", "currency", "binary", "ascii"] {
            assert!(text.contains(&format!("\t{column}\n")), "missing {column}");
        }
    }

    #[test]
    fn missing_database_is_an_error() {
        let api = Api::in_memory();
        assert!(collect(&api, "missing.edb").is_err());
    }
}
