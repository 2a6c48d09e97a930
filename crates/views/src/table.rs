//! Header-addressed string table: the untyped boundary of the pipeline.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use cr_core::{CoreError, CoreResult, CustomerId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            // skip fully blank lines
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::from_csv_reader(file).with_context(|| format!("reading {}", path.display()))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every named column or fail naming all that are absent.
    pub fn require_columns(&self, names: &[&str]) -> CoreResult<Vec<usize>> {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name) {
                Some(idx) => found.push(idx),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(CoreError::MissingColumns { columns: missing })
        }
    }

    /// Cell text; short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn map_headers<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        self.headers = self.headers.iter().map(|h| f(h.as_str())).collect();
        self
    }
}

pub(crate) fn invalid(row: usize, field: &str, raw: &str) -> CoreError {
    CoreError::InvalidField {
        row,
        field: field.to_string(),
        value: raw.to_string(),
    }
}

pub(crate) fn parse_f64(row: usize, field: &str, raw: &str) -> CoreResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(row, field, raw))
}

/// Whole numbers, tolerating a trailing `.0` as spreadsheet exports write them.
pub(crate) fn parse_whole(row: usize, field: &str, raw: &str) -> CoreResult<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(invalid(row, field, raw)),
    }
}

pub(crate) fn parse_customer_id(row: usize, raw: &str) -> CoreResult<CustomerId> {
    let v = parse_whole(row, "customer_id", raw)?;
    CustomerId::try_from(v).map_err(|_| invalid(row, "customer_id", raw))
}
