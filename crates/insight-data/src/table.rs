//! Record list ⇄ table mapping
//!
//! A [`Table`] is a list of typed, named columns plus a list of rows keyed by
//! column name. Column names come from each field's resolved alias, so a
//! record type can present different names to the table than it uses
//! internally.
//!
//! Every cell passes through an explicit conversion that either succeeds or
//! reports a [`Error::Mapping`]. Nothing is truncated or dropped silently.

use crate::alias::{ColumnType, Field, validate_schema};
use crate::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Largest integer magnitude an `f64` holds exactly.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

/// A type that can be laid out as a table row.
///
/// `schema()` lists the fields that become columns, in column order. Each
/// field's `name` must be its key in the type's serialized form.
pub trait Record: Serialize + DeserializeOwned + Default {
    fn schema() -> &'static [Field];
}

/// A single table value.
///
/// `Absent` means the cell carries no value at all and is distinct from a
/// present `Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Absent,
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    /// Convert a serialized field value into a cell of the field's type.
    fn from_value(value: &Value, field: &Field) -> std::result::Result<Self, String> {
        let cell = match (field.kind, value) {
            (_, Value::Null) if field.nullable => Self::Null,
            (ColumnType::Bool, Value::Bool(b)) => Self::Bool(*b),
            (ColumnType::Integer, Value::Number(n)) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => return Err(format!("{} does not fit a 64-bit signed integer", n)),
            },
            (ColumnType::Float, Value::Number(n)) => match n.as_f64() {
                Some(f) => Self::Float(f),
                None => return Err(format!("{} is not representable as a float", n)),
            },
            (ColumnType::Text, Value::String(s)) => Self::Text(s.clone()),
            (kind, other) => {
                return Err(format!(
                    "field '{}' declared {} but holds {}",
                    field.name,
                    kind,
                    json_kind(other)
                ));
            }
        };
        Ok(cell)
    }

    /// Convert a cell into a serialized value for the field's type.
    ///
    /// Integers widen into float fields when the float holds them exactly; no
    /// other implicit conversion is made.
    fn to_value(&self, field: &Field) -> std::result::Result<Value, String> {
        let value = match (field.kind, self) {
            (_, Self::Null) if field.nullable => Value::Null,
            (ColumnType::Bool, Self::Bool(b)) => Value::Bool(*b),
            (ColumnType::Integer, Self::Integer(i)) => Value::from(*i),
            (ColumnType::Float, Self::Integer(i)) if i.unsigned_abs() <= MAX_EXACT_FLOAT_INT => {
                Value::from(*i as f64)
            }
            (ColumnType::Float, Self::Integer(i)) => {
                return Err(format!(
                    "{} cannot be stored in float field '{}' without rounding",
                    i, field.name
                ));
            }
            (ColumnType::Float, Self::Float(f)) => match Number::from_f64(*f) {
                Some(n) => Value::Number(n),
                None => return Err(format!("{} cannot be stored", f)),
            },
            (ColumnType::Text, Self::Text(s)) => Value::String(s.clone()),
            (kind, cell) => {
                return Err(format!(
                    "cannot assign {} cell to {} field '{}'",
                    cell.describe(),
                    kind,
                    field.name
                ));
            }
        };
        Ok(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A named, typed table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

/// One table row, keyed by column name.
///
/// Reading a column the row has no entry for yields [`Cell::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRow {
    cells: BTreeMap<String, Cell>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> &Cell {
        const ABSENT: &Cell = &Cell::Absent;
        self.cells.get(column).unwrap_or(ABSENT)
    }

    pub fn set(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.cells.insert(column.into(), cell.into());
    }

    /// Builder form of [`TableRow::set`].
    pub fn with(mut self, column: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.set(column, cell);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Named columns and the rows that fill them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn push_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lay out `records` as a table with one column per schema field.
///
/// The column set depends only on `T`, so an empty slice still produces the
/// full column list.
///
/// # Errors
///
/// [`Error::Schema`] if `T`'s schema is inconsistent, [`Error::Mapping`] if a
/// field's value does not fit its declared type.
pub fn to_table<T: Record>(records: &[T]) -> Result<Table> {
    let schema = T::schema();
    validate_schema(schema)?;

    let columns = schema
        .iter()
        .map(|field| Column {
            name: field.resolve_name().to_string(),
            kind: field.kind,
        })
        .collect();
    let mut table = Table::new(columns);

    for (index, record) in records.iter().enumerate() {
        let object = record_object(record, index)?;
        let mut row = TableRow::new();
        for field in schema {
            let column = field.resolve_name();
            // Fields skipped by the serializer stay absent.
            let cell = match object.get(field.name) {
                Some(value) => {
                    Cell::from_value(value, field).map_err(|m| Error::mapping(index, column, m))?
                }
                None => Cell::Absent,
            };
            row.set(column, cell);
        }
        table.push_row(row);
    }

    tracing::debug!(
        columns = table.columns().len(),
        rows = table.len(),
        record = std::any::type_name::<T>(),
        "Built table from records"
    );
    Ok(table)
}

/// Build one `T` per table row.
///
/// Each record starts from `T::default()`. A writable field is assigned when
/// the table has a column with the field's resolved name and the row's cell
/// for it is not [`Cell::Absent`]. Columns without a matching field are
/// ignored.
///
/// # Errors
///
/// Fails on the first cell that cannot be converted to its field's type.
pub fn from_table<T: Record>(table: &Table) -> Result<Vec<T>> {
    let schema = T::schema();
    validate_schema(schema)?;

    let template = match serde_json::to_value(T::default()) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            return Err(Error::Schema {
                message: format!(
                    "{} does not serialize to an object",
                    std::any::type_name::<T>()
                ),
            });
        }
        Err(e) => {
            return Err(Error::Encode {
                message: e.to_string(),
            });
        }
    };

    let assignable: Vec<&Field> = schema
        .iter()
        .filter(|field| field.writable && table.has_column(field.resolve_name()))
        .collect();

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut object = template.clone();
            for field in &assignable {
                let column = field.resolve_name();
                let cell = row.get(column);
                if cell.is_absent() {
                    continue;
                }
                let value = cell
                    .to_value(field)
                    .map_err(|m| Error::mapping(index, column, m))?;
                object.insert(field.name.to_string(), value);
            }
            let record = Value::Object(object);
            T::deserialize(&record).map_err(|e| {
                let column = rejected_column::<T>(&template, &record, &assignable);
                Error::mapping(index, column, e.to_string())
            })
        })
        .collect()
}

/// Column of the first assigned field that `T` rejects on its own, or `"*"`
/// when no single field is to blame.
fn rejected_column<T: DeserializeOwned>(
    template: &Map<String, Value>,
    record: &Value,
    fields: &[&Field],
) -> &'static str {
    fields
        .iter()
        .find(|field| {
            let Some(value) = record.get(field.name) else {
                return false;
            };
            let mut single = template.clone();
            single.insert(field.name.to_string(), value.clone());
            T::deserialize(&Value::Object(single)).is_err()
        })
        .map_or("*", |field| field.resolve_name())
}

fn record_object<T: Serialize>(record: &T, index: usize) -> Result<Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(Error::mapping(
            index,
            "*",
            format!("record serialized to {}, expected object", json_kind(&other)),
        )),
        Err(e) => Err(Error::Encode {
            message: e.to_string(),
        }),
    }
}
