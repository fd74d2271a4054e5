//! Group-by counting and pivoting.
//!
//! This module counts records by two categorical columns and reshapes the
//! counts into a wide [`PivotTable`]. A (row, column) pair with no observed
//! records stays absent; it is never filled with zero.

use crate::models::{Column, Record};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors raised when reading values out of a pivot table.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("Column '{0}' does not exist in the pivot table")]
    UnknownColumn(String),

    #[error("No observations for {row} / {column}")]
    MissingCell { row: String, column: String },
}

/// Wide count table: one row per `index` value, one column per `columns` value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    /// Column whose values label the rows.
    pub index: Column,
    /// Column whose values label the columns.
    pub columns_key: Column,
    /// Observed column labels, sorted.
    pub columns: Vec<String>,
    /// Counts keyed by row label, then column label.
    pub rows: BTreeMap<String, BTreeMap<String, u64>>,
    /// Whether the row labels are materialized as an explicit column.
    pub index_as_column: bool,
}

impl PivotTable {
    /// (number of rows, number of columns).
    pub fn shape(&self) -> (usize, usize) {
        let width = self.columns.len() + usize::from(self.index_as_column);
        (self.rows.len(), width)
    }

    /// Row labels in order.
    pub fn index_values(&self) -> Vec<&str> {
        self.rows.keys().map(String::as_str).collect()
    }

    /// Count at (`row`, `column`), `None` when nothing was observed.
    pub fn get(&self, row: &str, column: &str) -> Option<u64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// All cells of one column, aligned with [`index_values`](Self::index_values).
    pub fn column(&self, column: &str) -> Result<Vec<Option<u64>>, AggregateError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(AggregateError::UnknownColumn(column.to_string()));
        }
        Ok(self.rows.values().map(|r| r.get(column).copied()).collect())
    }

    /// One column with every cell present, or the first gap as an error.
    pub fn complete_column(&self, column: &str) -> Result<Vec<u64>, AggregateError> {
        let cells = self.column(column)?;
        cells
            .into_iter()
            .zip(self.rows.keys())
            .map(|(cell, row)| {
                cell.ok_or_else(|| AggregateError::MissingCell {
                    row: row.clone(),
                    column: column.to_string(),
                })
            })
            .collect()
    }

    /// Mean over the present cells of a column.
    pub fn column_mean(&self, column: &str) -> Option<f64> {
        let present: Vec<u64> = self.column(column).ok()?.into_iter().flatten().collect();
        if present.is_empty() {
            return None;
        }
        Some(present.iter().sum::<u64>() as f64 / present.len() as f64)
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.rows.values().flat_map(|r| r.values()).sum()
    }
}

/// Group `records` by (`index`, `columns`) and count non-null `values` cells.
///
/// Records with a null `index` or `columns` cell are skipped. A group whose
/// `values` cells are all null is kept with a count of zero.
pub fn pivot(
    records: &[Record],
    index: Column,
    columns: Column,
    values: Column,
    reset_index: bool,
) -> PivotTable {
    let mut rows: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    let mut labels: BTreeSet<String> = BTreeSet::new();

    for record in records {
        let (Some(row), Some(col)) = (record.field(index), record.field(columns)) else {
            continue;
        };
        let present = u64::from(record.field(values).is_some());

        *rows.entry(row).or_default().entry(col.clone()).or_default() += present;
        labels.insert(col);
    }

    PivotTable {
        index,
        columns_key: columns,
        columns: labels.into_iter().collect(),
        rows,
        index_as_column: reset_index,
    }
}

/// Count records per value of `column`, skipping nulls.
pub fn value_counts(records: &[Record], column: Column) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        if let Some(value) = record.field(column) {
            *counts.entry(value).or_default() += 1;
        }
    }

    counts
}
