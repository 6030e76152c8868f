use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{Map, Value as JsonValue};

use super::model::{unique_column_names, Column, ColumnData, Table, Value};
use crate::error::LoadError;

/// Cell texts read as missing.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Source formats recognised by [`load`], keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
    Json,
}

impl SourceFormat {
    /// Resolve a declared extension (case-insensitive, optional leading dot).
    pub fn from_extension(extension: &str) -> Result<Self, LoadError> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            "xls" => Ok(SourceFormat::Xls),
            "json" => Ok(SourceFormat::Json),
            _ => Err(LoadError::UnsupportedFormat { extension: ext }),
        }
    }
}

/// Parse `bytes` as a table in the format named by `extension`.
///
/// Dispatch is by extension only; the content is never sniffed. Supported:
/// * `.csv`  – header row followed by records
/// * `.xlsx` / `.xls` – first worksheet, header in the first row
/// * `.json` – `[{col: value, ...}, ...]` or `{col: [values]}` / `{col: {row: value}}`
pub fn load(bytes: &[u8], extension: &str) -> Result<Table, LoadError> {
    let format = SourceFormat::from_extension(extension)?;
    let table = match format {
        SourceFormat::Csv => load_csv(bytes),
        SourceFormat::Xlsx => load_excel::<Xlsx<Cursor<&[u8]>>>(bytes),
        SourceFormat::Xls => load_excel::<Xls<Cursor<&[u8]>>>(bytes),
        SourceFormat::Json => load_json(bytes),
    }?;
    info!(
        "loaded {format:?} table: {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

/// Read a file from disk and load it, taking the format from its extension.
pub fn load_path(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    // Reject before touching the file.
    SourceFormat::from_extension(&ext)?;
    let bytes = std::fs::read(path)?;
    load(&bytes, &ext)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv {
            reason: e.to_string(),
        })?
        .clone();
    let names = unique_column_names(headers.iter());

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Csv {
            reason: format!("record {}: {e}", row_no + 1),
        })?;
        for (col_idx, raw) in record.iter().enumerate() {
            let cell = if NA_TOKENS.contains(&raw.trim()) {
                None
            } else {
                Some(raw.to_string())
            };
            cells[col_idx].push(cell);
        }
    }
    debug!("csv: {} columns, {} records", names.len(), cells.first().map_or(0, Vec::len));

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::new(name, infer_csv_column(raw)))
        .collect();
    Table::new(columns)
}

/// Column inference for text cells: int, then float, then bool, else text.
fn infer_csv_column(cells: Vec<Option<String>>) -> ColumnData {
    if cells.is_empty() {
        return ColumnData::Text(cells);
    }
    let present = || cells.iter().flatten().map(|s| s.trim());
    let has_missing = cells.iter().any(Option::is_none);

    if !has_missing && present().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnData::Int(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(|s| s.trim().parse().ok()))
                .collect(),
        );
    }
    if present().all(|s| s.parse::<f64>().is_ok()) {
        // any spelling of NaN that slipped past the NA tokens is still missing
        return ColumnData::Float(
            cells
                .iter()
                .map(|c| {
                    c.as_deref()
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .filter(|v| !v.is_nan())
                })
                .collect(),
        );
    }
    if !has_missing && present().all(|s| parse_bool(s).is_some()) {
        return ColumnData::Bool(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(|s| parse_bool(s.trim())))
                .collect(),
        );
    }
    ColumnData::Text(cells)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepted layouts:
///
/// ```json
/// [ {"age": 25, "city": "A"}, {"age": 30, "city": "B"} ]
/// {"age": [25, 30], "city": ["A", "B"]}
/// {"age": {"0": 25, "1": 30}, "city": {"0": "A", "1": "B"}}
/// ```
fn load_json(bytes: &[u8]) -> Result<Table, LoadError> {
    let root: JsonValue = serde_json::from_slice(bytes).map_err(|e| LoadError::Json {
        reason: e.to_string(),
    })?;

    let columns = match root {
        JsonValue::Array(records) => columns_from_records(records)?,
        JsonValue::Object(map) => columns_from_column_map(map)?,
        other => {
            return Err(LoadError::InvalidStructure {
                reason: format!(
                    "expected an array of records or an object of columns, found {}",
                    json_type_name(&other)
                ),
            })
        }
    };

    Table::new(
        columns
            .into_iter()
            .map(|(name, values)| Column::new(name, ColumnData::from_values(values)))
            .collect(),
    )
}

fn columns_from_records(records: Vec<JsonValue>) -> Result<IndexMap<String, Vec<Value>>, LoadError> {
    let mut columns: IndexMap<String, Vec<Value>> = IndexMap::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::InvalidStructure {
            reason: format!("row {i} is a JSON {}, not an object", json_type_name(rec)),
        })?;
        for (key, val) in obj {
            columns
                .entry(key.clone())
                .or_insert_with(|| vec![Value::Null; i])
                .push(json_to_value(val));
        }
        // keys absent from this record
        for values in columns.values_mut() {
            if values.len() <= i {
                values.push(Value::Null);
            }
        }
    }
    // Rows without any field would be lost: a table's length comes from its columns.
    if columns.is_empty() && !records.is_empty() {
        return Err(LoadError::InvalidStructure {
            reason: format!("{} records but none has any field", records.len()),
        });
    }
    Ok(columns)
}

fn columns_from_column_map(
    map: Map<String, JsonValue>,
) -> Result<IndexMap<String, Vec<Value>>, LoadError> {
    let keyed = map.values().any(JsonValue::is_object);

    if keyed {
        // Row labels in first-seen order across all columns.
        let mut labels: IndexMap<&str, ()> = IndexMap::new();
        for (name, col) in &map {
            let inner = col.as_object().ok_or_else(|| LoadError::InvalidStructure {
                reason: format!("column '{name}' is not keyed by row like the other columns"),
            })?;
            for label in inner.keys() {
                labels.entry(label.as_str()).or_insert(());
            }
        }
        let columns = map
            .iter()
            .map(|(name, col)| {
                let values = labels
                    .keys()
                    .map(|label| col.get(*label).map_or(Value::Null, json_to_value))
                    .collect();
                (name.clone(), values)
            })
            .collect();
        return Ok(columns);
    }

    let mut columns = IndexMap::new();
    let mut expected_len = None;
    for (name, col) in map {
        let items = match col {
            JsonValue::Array(items) => items,
            other => {
                return Err(LoadError::InvalidStructure {
                    reason: format!(
                        "column '{name}' is a JSON {}, not an array",
                        json_type_name(&other)
                    ),
                })
            }
        };
        match expected_len {
            None => expected_len = Some(items.len()),
            Some(n) if n != items.len() => {
                return Err(LoadError::InvalidStructure {
                    reason: format!("column '{name}' has {} values, expected {n}", items.len()),
                })
            }
            Some(_) => {}
        }
        columns.insert(name, items.iter().map(json_to_value).collect());
    }
    Ok(columns)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

fn json_type_name(val: &JsonValue) -> &'static str {
    match val {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

fn load_excel<'a, R>(bytes: &'a [u8]) -> Result<Table, LoadError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    let excel_err = |e: R::Error| LoadError::Excel {
        reason: e.to_string(),
    };

    let mut workbook = R::new(Cursor::new(bytes)).map_err(excel_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::Excel {
            reason: "workbook has no worksheets".to_string(),
        })?
        .map_err(excel_err)?;

    table_from_range(&range)
}

fn table_from_range(range: &Range<Data>) -> Result<Table, LoadError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let names = unique_column_names(header.iter().map(|cell| match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }));

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (col_idx, values) in cells.iter_mut().enumerate() {
            values.push(row.get(col_idx).map_or(Value::Null, excel_cell_to_value));
        }
    }
    debug!("excel: {} columns, {} data rows", names.len(), cells.first().map_or(0, Vec::len));

    Table::new(
        names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name, ColumnData::from_values(values)))
            .collect(),
    )
}

/// Spreadsheets store every number as a float; integral ones read back as
/// integers.
fn excel_cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Integer(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| Value::DateTime(dt.to_string()))
            .unwrap_or_else(|| Value::String(cell.to_string())),
        Data::DurationIso(s) => Value::String(s.clone()),
        // error cells (#DIV/0!, #N/A, ...) and blanks
        _ => Value::Null,
    }
}
