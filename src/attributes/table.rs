// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Dense row-major numeric tables

use crate::error::{MeshError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// One row per element, `cols` values per row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl AttributeTable {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MeshError::MalformedInput(format!(
                "table of {} x {} needs {} values, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Single-column table
    pub fn from_scalars(values: Vec<f64>) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    pub fn from_rows<const C: usize>(rows: &[[f64; C]]) -> Self {
        Self {
            rows: rows.len(),
            cols: C,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row-major values
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// First column of `row`
    pub fn scalar(&self, row: usize) -> f64 {
        self.value(row, 0)
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.value(row, col)).collect()
    }

    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for row in self.data.chunks_exact(self.cols.max(1)) {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        sums
    }

    /// Smallest and largest value of a column, `None` for an empty table
    pub fn column_range(&self, col: usize) -> Option<(f64, f64)> {
        self.column(col).into_iter().fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
    }

    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_checked() {
        assert!(AttributeTable::new(2, 3, vec![0.0; 5]).is_err());
        let table = AttributeTable::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(table.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(table.value(0, 2), 3.0);
        assert_eq!(table.column(1), vec![2.0, 5.0]);
        assert_eq!(table.column_sums(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_matrix_view_is_row_major() {
        let table = AttributeTable::from_rows(&[[1.0, 2.0], [3.0, 4.0]]);
        let matrix = table.to_matrix();
        assert_eq!(matrix[(0, 1)], 2.0);
        assert_eq!(matrix[(1, 0)], 3.0);
    }

    #[test]
    fn test_column_range() {
        let table = AttributeTable::from_scalars(vec![3.0, -1.0, 2.0]);
        assert_eq!(table.column_range(0), Some((-1.0, 3.0)));
        assert_eq!(AttributeTable::zeros(0, 1).column_range(0), None);
    }
}
