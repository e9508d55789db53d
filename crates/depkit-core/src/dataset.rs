//! In-memory tabular dataset read from delimited text.
//!
//! Columns are named and rows are ordered. Cells carry JSON values so a
//! dataset can travel inside a structured payload in "split" orientation:
//! `{"columns": [...], "index": [0, 1, ...], "data": [[...], ...]}`.

use std::io::Read;
use std::path::Path;

use serde_json::{json, Number, Value};

use crate::error::DatasetError;
use crate::payload::json_kind;

/// Separator used by the bundled windspeed exports.
pub const DEFAULT_SEPARATOR: u8 = b';';

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Build a dataset, checking every row against the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DatasetError> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(DatasetError::Shape(format!(
                "row {i} has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Dataset { columns, rows })
    }

    /// Read a delimited file with a header row.
    pub fn read_csv(path: &Path, separator: u8) -> Result<Self, DatasetError> {
        if !path.is_file() {
            return Err(DatasetError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, separator)
    }

    /// Parse delimited text with a header row from any reader.
    ///
    /// Blank header cells are named `Unnamed: {index}`. Short rows are padded
    /// with nulls; rows longer than the header are rejected.
    pub fn from_reader<R: Read>(reader: R, separator: u8) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(separator)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if name.trim().is_empty() {
                    format!("Unnamed: {i}")
                } else {
                    name.to_string()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(DatasetError::Shape(format!(
                    "row {i} has {} fields, header has {}",
                    record.len(),
                    columns.len()
                )));
            }
            let mut row: Vec<Value> = record.iter().map(infer_cell).collect();
            row.resize(columns.len(), Value::Null);
            rows.push(row);
        }

        Ok(Dataset { columns, rows })
    }

    /// Rebuild a dataset from split orientation, either as a JSON object or as
    /// a string holding one.
    pub fn from_split_json(value: &Value) -> Result<Self, DatasetError> {
        let object = match value {
            Value::String(raw) => {
                return Self::from_split_json(&serde_json::from_str::<Value>(raw)?)
            }
            Value::Object(object) => object,
            other => {
                return Err(DatasetError::Shape(format!(
                    "expected a split-oriented object, got {}",
                    json_kind(other)
                )))
            }
        };

        let columns = match object.get("columns") {
            Some(Value::Array(cols)) => cols
                .iter()
                .map(|c| match c {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => return Err(DatasetError::Shape("missing \"columns\" array".to_string())),
        };

        let rows = match object.get("data") {
            Some(Value::Array(data)) => data
                .iter()
                .enumerate()
                .map(|(i, row)| match row {
                    Value::Array(cells) => Ok(cells.clone()),
                    _ => Err(DatasetError::Shape(format!("row {i} is not an array"))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(DatasetError::Shape("missing \"data\" array".to_string())),
        };

        Self::new(columns, rows)
    }

    pub fn to_split_json(&self) -> Value {
        json!({
            "columns": self.columns,
            "index": (0..self.rows.len()).collect::<Vec<_>>(),
            "data": self.rows,
        })
    }

    /// Encode as delimited text with a header row.
    pub fn to_csv_bytes(&self, separator: u8) -> Result<Vec<u8>, DatasetError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(separator)
            .from_writer(Vec::new());
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(render_cell))?;
        }
        wtr.into_inner()
            .map_err(|e| DatasetError::Csv(csv::Error::from(e.into_error())))
    }

    pub fn write_csv(&self, path: &Path, separator: u8) -> Result<(), DatasetError> {
        let bytes = self.to_csv_bytes(separator)?;
        std::fs::write(path, bytes).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// All cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn infer_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
