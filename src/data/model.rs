use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a hash / btree key downstream (value counts), so it must be `Ord`
/// and `Hash` with consistent equality.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date / datetime kept as its ISO-8601 text.
    DateTime(String),
    Null,
}

impl Value {
    fn discriminant(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::String(_) => 4,
            Value::DateTime(_) => 5,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// JSON form used for row previews. Non-finite floats have no JSON
    /// representation and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::String(s) | Value::DateTime(s) => JsonValue::String(s.clone()),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(v) => Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Null => JsonValue::Null,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        let da = self.discriminant();
        let db = other.discriminant();
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            Value::String(s) | Value::DateTime(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::DateTime(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            // integral floats keep a trailing ".0"
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Null => write!(f, "NaN"),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnData – typed storage for one column
// ---------------------------------------------------------------------------

/// The values of one column, stored by their inferred primitive kind.
/// `None` marks a missing entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
    DateTime(Vec<Option<String>>),
    /// Object column: heterogeneous values, `Value::Null` for missing.
    Mixed(Vec<Value>),
}

impl ColumnData {
    /// Infer a typed column from loosely-typed cells:
    ///
    /// * only integers → `Int`, or `Float` when any entry is missing
    /// * integers and floats → `Float`
    /// * only booleans, nothing missing → `Bool`
    /// * only strings → `Text`; only datetimes → `DateTime`
    /// * nothing but missing entries → `Float`
    /// * anything else → `Mixed`
    pub fn from_values(values: Vec<Value>) -> Self {
        let mut has_null = false;
        let mut has_int = false;
        let mut has_float = false;
        let mut has_bool = false;
        let mut has_string = false;
        let mut has_datetime = false;
        for v in &values {
            match v {
                Value::Null => has_null = true,
                Value::Integer(_) => has_int = true,
                Value::Float(_) => has_float = true,
                Value::Bool(_) => has_bool = true,
                Value::String(_) => has_string = true,
                Value::DateTime(_) => has_datetime = true,
            }
        }
        let non_numeric = has_bool || has_string || has_datetime;

        if !non_numeric && has_int && !has_float && !has_null {
            return ColumnData::Int(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect(),
            );
        }
        if !non_numeric {
            return ColumnData::Float(
                values
                    .iter()
                    .map(|v| v.as_f64().filter(|f| !f.is_nan()))
                    .collect(),
            );
        }
        if has_bool && !has_null && !has_int && !has_float && !has_string && !has_datetime {
            return ColumnData::Bool(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect(),
            );
        }
        if has_string && !has_int && !has_float && !has_bool && !has_datetime {
            return ColumnData::Text(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            );
        }
        if has_datetime && !has_int && !has_float && !has_bool && !has_string {
            return ColumnData::DateTime(
                values
                    .into_iter()
                    .map(|v| match v {
                        Value::DateTime(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            );
        }
        ColumnData::Mixed(values)
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Text(v) | ColumnData::DateTime(v) => v.len(),
            ColumnData::Mixed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at `row` as a [`Value`]; out-of-range rows read as `Null`.
    pub fn value(&self, row: usize) -> Value {
        match self {
            ColumnData::Int(v) => v.get(row).copied().flatten().map_or(Value::Null, Value::Integer),
            ColumnData::Float(v) => v.get(row).copied().flatten().map_or(Value::Null, Value::Float),
            ColumnData::Bool(v) => v.get(row).copied().flatten().map_or(Value::Null, Value::Bool),
            ColumnData::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map_or(Value::Null, Value::String),
            ColumnData::DateTime(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map_or(Value::Null, Value::DateTime),
            ColumnData::Mixed(v) => v.get(row).cloned().unwrap_or(Value::Null),
        }
    }

    /// All cells in row order.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |row| self.value(row))
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Float(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Bool(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Text(v) | ColumnData::DateTime(v) => {
                v.iter().filter(|x| x.is_none()).count()
            }
            ColumnData::Mixed(v) => v.iter().filter(|x| x.is_null()).count(),
        }
    }

    /// Numeric cells (`None` = missing) for integer and float columns.
    pub fn numeric(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnData::Int(v) => Some(v.iter().map(|x| x.map(|i| i as f64)).collect()),
            ColumnData::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Dtype label: `int64`, `float64`, `bool`, `object` or `datetime64[ns]`.
    pub fn dtype(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int64",
            ColumnData::Float(_) => "float64",
            ColumnData::Bool(_) => "bool",
            ColumnData::Text(_) | ColumnData::Mixed(_) => "object",
            ColumnData::DateTime(_) => "datetime64[ns]",
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }
}

/// An in-memory columnar dataset. Columns are ordered as in the source, have
/// unique names and share one row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, LoadError> {
        let row_count = columns.first().map_or(0, |c| c.data.len());

        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(LoadError::InvalidStructure {
                    reason: format!("duplicate column name '{}'", col.name),
                });
            }
            if col.data.len() != row_count {
                return Err(LoadError::InvalidStructure {
                    reason: format!(
                        "column '{}' has {} values but the table has {row_count} rows",
                        col.name,
                        col.data.len()
                    ),
                });
            }
        }

        Ok(Table { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// The first `limit` rows as JSON records keyed by column name, in column
    /// order.
    pub fn head_records(&self, limit: usize) -> Vec<Map<String, JsonValue>> {
        (0..self.row_count.min(limit))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.data.value(row).to_json()))
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Header naming shared by the CSV and Excel readers
// ---------------------------------------------------------------------------

/// Normalise raw header cells into unique column names: blank headers become
/// `Unnamed: <index>`, repeats become `name.1`, `name.2`, ...
pub fn unique_column_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for (idx, header) in raw.into_iter().enumerate() {
        let header = header.as_ref().trim();
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}
