use csv::{ReaderBuilder, WriterBuilder};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::warn;

use super::{Column, CompanyRecord, Table};
use crate::error::CacheError;

/// Column header for a record set: every key, in order of first appearance.
pub fn header_union(records: &[CompanyRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut header = Vec::new();

    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                header.push(key.clone());
            }
        }
    }

    header
}

/// Render a JSON value as a CSV cell. `None` becomes an empty cell.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Serialize records as CSV with a header row
pub fn write_records<W: Write>(writer: W, records: &[CompanyRecord]) -> csv::Result<()> {
    let header = header_union(records);
    // An empty record would be written as a single quoted empty field.
    if header.is_empty() {
        if !records.is_empty() {
            warn!(
                "cache: {} records carry no fields, writing an empty file",
                records.len()
            );
        }
        return Ok(());
    }
    let mut wtr = WriterBuilder::new().from_writer(writer);

    wtr.write_record(&header)?;
    for record in records {
        let row = header.iter().map(|key| {
            record
                .get(key)
                .and_then(render_value)
                .unwrap_or_default()
        });
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read a CSV with a header row into a text table
pub fn read_table<R: Read>(reader: R) -> csv::Result<Table> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let names: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    let mut row_count = 0;

    for result in rdr.records() {
        let record = result?;
        for (i, cell) in record.iter().enumerate() {
            cells[i].push(if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            });
        }
        row_count += 1;
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::text(name, values))
        .collect();

    Ok(Table::from_columns(row_count, columns))
}

/// Load the cached CSV artifact at `path`
pub fn read_table_file(path: &Path) -> Result<Table, CacheError> {
    let file = std::fs::File::open(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_table(std::io::BufReader::new(file)).map_err(|source| CacheError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ColumnData};
    use serde_json::json;

    fn records(value: Value) -> Vec<CompanyRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_header_union_keeps_first_appearance_order() {
        let recs = records(json!([
            {"name": "Acme", "batch": "W21"},
            {"team_size": 3, "name": "Beta"},
        ]));
        assert_eq!(header_union(&recs), vec!["name", "batch", "team_size"]);
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!(null)), None);
        assert_eq!(render_value(&json!("x")), Some("x".into()));
        assert_eq!(render_value(&json!(5)), Some("5".into()));
        assert_eq!(render_value(&json!(true)), Some("true".into()));
        assert_eq!(render_value(&json!(["B2B", "Fintech"])), Some(r#"["B2B","Fintech"]"#.into()));
    }

    #[test]
    fn test_write_then_read_fills_missing_keys_with_null() {
        let recs = records(json!([
            {"name": "Acme, Inc.", "batch": "W21", "team_size": 5},
            {"name": "Beta", "tags": ["ai", "dev tools"]},
        ]));

        let mut buf = Vec::new();
        write_records(&mut buf, &recs).unwrap();
        let table = read_table(buf.as_slice()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["name", "batch", "team_size", "tags"]
        );
        let name = &table.column("name").unwrap().data;
        assert_eq!(name.cell(0), Cell::Text("Acme, Inc."));
        let team = &table.column("team_size").unwrap().data;
        assert_eq!(team.cell(1), Cell::Null);
        let tags = &table.column("tags").unwrap().data;
        assert_eq!(tags.cell(1), Cell::Text(r#"["ai","dev tools"]"#));
    }

    #[test]
    fn test_read_header_only_gives_zero_rows() {
        let table = read_table("name,batch\n".as_bytes()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.columns()[0].data, ColumnData::Text(vec![]));
    }

    #[test]
    fn test_no_records_writes_empty_file() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());

        let table = read_table(buf.as_slice()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_keyless_records_write_empty_file() {
        let recs = records(json!([{}, {}]));
        let mut buf = Vec::new();
        write_records(&mut buf, &recs).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_ragged_row_is_an_error() {
        assert!(read_table("a,b\n1,2,3\n".as_bytes()).is_err());
    }
}
