//! CSV loading with column selection and renaming.
//!
//! A [`ColumnMapping`] pairs source header names with the standardized
//! [`Column`]s. Only mapped columns are read; the timestamp column is reduced
//! to its calendar date.

use crate::models::{Column, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid column mapping: {0}")]
    Mapping(String),

    #[error("Failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: String, column: String },

    #[error("Row {row}: expected {expected} fields, saw {found}")]
    Malformed {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: cannot parse timestamp '{value}' in column '{column}'")]
    Timestamp {
        row: usize,
        column: String,
        value: String,
    },
}

/// Ordered correspondence between source columns and standardized columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    pairs: Vec<(String, Column)>,
}

impl ColumnMapping {
    /// Build a mapping from parallel `usecols` / `renames` lists.
    pub fn new<S: AsRef<str>>(usecols: &[S], renames: &[Column]) -> Result<Self, LoadError> {
        if usecols.len() != renames.len() {
            return Err(LoadError::Mapping(format!(
                "{} source columns but {} renames",
                usecols.len(),
                renames.len()
            )));
        }

        let mut pairs: Vec<(String, Column)> = Vec::with_capacity(usecols.len());
        for (source, &target) in usecols.iter().zip(renames) {
            if target == Column::Hashtag {
                return Err(LoadError::Mapping(
                    "Hashtag is assigned by the pipeline and cannot be loaded".to_string(),
                ));
            }
            if pairs.iter().any(|(_, t)| *t == target) {
                return Err(LoadError::Mapping(format!("{} is mapped twice", target)));
            }
            pairs.push((source.as_ref().to_string(), target));
        }

        for required in Column::LOADED {
            if !pairs.iter().any(|(_, t)| *t == required) {
                return Err(LoadError::Mapping(format!("{} is not mapped", required)));
            }
        }

        Ok(Self { pairs })
    }

    /// Source column name for a standardized column.
    pub fn source(&self, column: Column) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, t)| *t == column)
            .map(|(s, _)| s.as_str())
    }

    pub fn pairs(&self) -> &[(String, Column)] {
        &self.pairs
    }
}

/// Parse a timestamp cell and keep only the date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Read the mapped columns of a CSV file into records.
///
/// Records end at `\n` only; a bare `\r` stays part of the cell and a
/// trailing `\r` from CRLF files is dropped. Rows shorter than the header
/// load their missing cells as null, longer rows are an error.
pub fn read_csv(path: &Path, mapping: &ColumnMapping) -> Result<Vec<Record>, LoadError> {
    let path_name = path.display().to_string();
    debug!("Reading {}", path_name);

    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path_name.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let width = headers.len();
    let mut indices: HashMap<Column, usize> = HashMap::new();
    for (source, target) in mapping.pairs() {
        let idx = headers
            .iter()
            .position(|h| h.trim_end_matches('\r') == source.as_str())
            .ok_or_else(|| LoadError::MissingColumn {
                path: path_name.clone(),
                column: source.clone(),
            })?;
        indices.insert(*target, idx);
    }

    let cell = |row: &csv::StringRecord, column: Column| -> String {
        let Some((idx, value)) = indices
            .get(&column)
            .and_then(|&i| row.get(i).map(|v| (i, v)))
        else {
            return String::new();
        };
        if idx + 1 == row.len() {
            value.strip_suffix('\r').unwrap_or(value).to_string()
        } else {
            value.to_string()
        }
    };

    let date_column = mapping.source(Column::Date).unwrap_or_default().to_string();
    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(csv_err)?;
        if row.len() > width {
            return Err(LoadError::Malformed {
                row: i + 1,
                expected: width,
                found: row.len(),
            });
        }

        let raw_date = cell(&row, Column::Date);
        let date = parse_date(&raw_date).ok_or_else(|| LoadError::Timestamp {
            row: i + 1,
            column: date_column.clone(),
            value: raw_date.clone(),
        })?;

        let state = cell(&row, Column::State);
        records.push(Record {
            date,
            tweet: cell(&row, Column::Tweet),
            country: cell(&row, Column::Country),
            state: (!state.is_empty()).then_some(state),
            hashtag: None,
        });
    }

    info!("Loaded {} rows from {}", records.len(), path_name);
    Ok(records)
}
