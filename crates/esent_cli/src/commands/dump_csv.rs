//! Dump-csv command implementation.

use std::fmt::Write as _;
use std::io::Write;

use esent_interop::{Api, ColumnInfo, FixedColumn, InteropResult, Table};
use esent_native::grbit::OpenTableGrbit;
use esent_native::{CodePage, ColumnId, ColumnType};

use super::{with_read_only_database, CliResult};

/// Quotes a CSV field if it has leading or trailing blanks, a comma, a
/// quote or a line break. Embedded quotes are doubled.
pub fn quote_for_csv(field: &str) -> String {
    let escaped = field.replace('"', "\"\"");
    let needs_quotes = field.starts_with([' ', '\t'])
        || field.ends_with([' ', '\t'])
        || field.contains([',', '"', '\n', '\r']);
    if needs_quotes {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Lowercase hex of `data`.
pub fn format_bytes(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

/// How one column is turned into CSV text.
#[derive(Debug, Clone, Copy)]
enum Formatter {
    Bool,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    Float,
    Double,
    Text(CodePage),
    Bytes,
}

impl Formatter {
    fn for_column(column: &ColumnInfo) -> Self {
        match column.coltyp {
            ColumnType::Bit => Self::Bool,
            ColumnType::UnsignedByte => Self::Byte,
            ColumnType::Short => Self::Int16,
            ColumnType::UnsignedShort => Self::UInt16,
            ColumnType::Long => Self::Int32,
            ColumnType::UnsignedLong => Self::UInt32,
            ColumnType::Currency | ColumnType::LongLong => Self::Int64,
            ColumnType::IEEESingle => Self::Float,
            ColumnType::IEEEDouble => Self::Double,
            ColumnType::Text | ColumnType::LongText if column.code_page == CodePage::UNICODE => {
                Self::Text(CodePage::UNICODE)
            }
            ColumnType::Text | ColumnType::LongText => Self::Text(CodePage::ASCII),
            _ => Self::Bytes,
        }
    }

    /// Formats the column of the current record; null is `None`.
    fn format(self, table: &Table<'_>, columnid: ColumnId) -> InteropResult<Option<String>> {
        fn display<T: FixedColumn + ToString>(
            table: &Table<'_>,
            columnid: ColumnId,
        ) -> InteropResult<Option<String>> {
            Ok(table.retrieve::<T>(columnid)?.map(|value| value.to_string()))
        }
        match self {
            Self::Bool => display::<bool>(table, columnid),
            Self::Byte => display::<u8>(table, columnid),
            Self::Int16 => display::<i16>(table, columnid),
            Self::UInt16 => display::<u16>(table, columnid),
            Self::Int32 => display::<i32>(table, columnid),
            Self::UInt32 => display::<u32>(table, columnid),
            Self::Int64 => display::<i64>(table, columnid),
            Self::Float => display::<f32>(table, columnid),
            Self::Double => display::<f64>(table, columnid),
            Self::Text(code_page) => table.retrieve_string(columnid, code_page),
            Self::Bytes => Ok(table.retrieve_bytes(columnid)?.map(|data| format_bytes(&data))),
        }
    }
}

/// Runs the dump-csv command: a header of column names, then one line per
/// record in primary index order. Null columns are empty fields.
pub fn run(api: &Api, database: &str, table_name: &str, out: &mut impl Write) -> CliResult<()> {
    with_read_only_database(api, "dumptocsv", database, |session, dbid| {
        let grbit = OpenTableGrbit::READ_ONLY | OpenTableGrbit::SEQUENTIAL;
        let table = session.open_table(dbid, table_name, grbit)?;
        let columns = table.columns()?;
        let formatters: Vec<(ColumnId, Formatter)> = columns
            .iter()
            .map(|column| (column.columnid, Formatter::for_column(column)))
            .collect();

        let header: Vec<String> = columns
            .iter()
            .map(|column| quote_for_csv(&column.name))
            .collect();
        writeln!(out, "{}", header.join(","))?;

        let mut more = table.try_move_first()?;
        while more {
            let mut fields = Vec::with_capacity(formatters.len());
            for &(columnid, formatter) in &formatters {
                let field = formatter.format(&table, columnid)?;
                fields.push(field.map(|text| quote_for_csv(&text)).unwrap_or_default());
            }
            writeln!(out, "{}", fields.join(","))?;
            more = table.try_move_next()?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_sample;

    #[test]
    fn quoting() {
        assert_eq!(quote_for_csv("plain"), "plain");
        assert_eq!(quote_for_csv(","), "\",\"");
        assert_eq!(quote_for_csv(" lead"), "\" lead\"");
        assert_eq!(quote_for_csv("trail\t"), "\"trail\t\"");
        assert_eq!(quote_for_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_for_csv("two\nlines"), "\"two\nlines\"");
        assert_eq!(quote_for_csv(""), "");
    }

    #[test]
    fn bytes_are_lowercase_hex() {
        assert_eq!(format_bytes(&[0x01, 0x02, 0xea, 0x4f, 0x00]), "0102ea4f00");
        assert_eq!(format_bytes(&[]), "");
    }

    #[test]
    fn sample_table_dumps_every_record() {
        let api = Api::in_memory();
        create_sample::run(&api, "sample.edb").unwrap();
        let mut out = Vec::new();
        run(&api, "sample.edb", create_sample::TABLE, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 13);
        for column in ["key", "bit", "unicode"] {
            assert!(lines[0].split(',').any(|name| name == column), "missing {column}");
        }
        assert!(lines[2].contains("\",\""));
        assert!(lines[2].contains("\" \"\"quoting\"\" \""));
        assert!(lines[2].contains("0102ea4f00"));
        assert!(lines[2].contains("true"));
        assert!(lines[12].contains("Record 9"));
    }

    #[test]
    fn missing_table_is_an_error() {
        let api = Api::in_memory();
        create_sample::run(&api, "sample.edb").unwrap();
        let mut out = Vec::new();
        assert!(run(&api, "sample.edb", "absent", &mut out).is_err());
    }
}
