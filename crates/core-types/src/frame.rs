use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A date-indexed table of optional floats.
///
/// Rows are ordered by a strictly increasing date index and columns are
/// uniquely named (tickers for price and weight tables). A `None` cell means
/// there was no observation for that column on that date.
///
/// Deserialisation goes through [`Frame::new`], so a decoded frame upholds the
/// same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame")]
pub struct Frame {
    index: Vec<NaiveDate>,
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

#[derive(Deserialize)]
struct RawFrame {
    index: Vec<NaiveDate>,
    columns: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl TryFrom<RawFrame> for Frame {
    type Error = CoreError;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        Frame::new(raw.index, raw.columns, raw.values)
    }
}

/// Closing prices, one column per ticker.
pub type PriceTable = Frame;

/// Signed target or realised allocations, one column per ticker.
pub type WeightTable = Frame;

impl Frame {
    /// Builds a frame, checking that the shape is consistent, the index is
    /// strictly increasing and column names are unique.
    pub fn new(
        index: Vec<NaiveDate>,
        columns: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, CoreError> {
        if index.len() != values.len() {
            return Err(CoreError::InvalidInput(
                "frame".to_string(),
                format!("{} index entries but {} rows", index.len(), values.len()),
            ));
        }
        if let Some(row) = values.iter().find(|row| row.len() != columns.len()) {
            return Err(CoreError::InvalidInput(
                "frame".to_string(),
                format!("row of width {} for {} columns", row.len(), columns.len()),
            ));
        }
        for pair in index.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::UnsortedIndex(pair[1].to_string(), pair[0].to_string()));
            }
        }
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(CoreError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self { index, columns, values })
    }

    /// An empty frame with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            index: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a single-column frame from `(date, value)` observations.
    ///
    /// Observations may arrive in any order; a repeated date keeps the last value.
    pub fn from_series(
        name: impl Into<String>,
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let mut sorted: Vec<(NaiveDate, f64)> = observations.into_iter().collect();
        sorted.sort_by_key(|(date, _)| *date);

        let mut index: Vec<NaiveDate> = Vec::with_capacity(sorted.len());
        let mut values: Vec<Vec<Option<f64>>> = Vec::with_capacity(sorted.len());
        for (date, value) in sorted {
            if index.last() == Some(&date) {
                if let Some(row) = values.last_mut() {
                    row[0] = Some(value);
                }
                continue;
            }
            index.push(date);
            values.push(vec![Some(value)]);
        }

        Self {
            index,
            columns: vec![name.into()],
            values,
        }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty() || self.columns.is_empty()
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        &self.values[row]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Iterates over `(date, row)` pairs in index order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[Option<f64>])> + '_ {
        self.index
            .iter()
            .copied()
            .zip(self.values.iter().map(|row| row.as_slice()))
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_position(&self, date: NaiveDate) -> Option<usize> {
        self.index.binary_search(&date).ok()
    }

    /// Number of present (non-missing) cells in a row.
    pub fn present_count(&self, row: usize) -> usize {
        self.values[row].iter().filter(|v| v.is_some()).count()
    }

    /// Values of one column in index order.
    pub fn column_values(&self, col: usize) -> Vec<Option<f64>> {
        self.values.iter().map(|row| row[col]).collect()
    }

    /// Applies `f` to every cell, keeping the index and column names.
    pub fn map_cells(&self, mut f: impl FnMut(Option<f64>) -> Option<f64>) -> Frame {
        Frame {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| f(*v)).collect())
                .collect(),
        }
    }

    /// Replaces each row with `f(date, row)`, keeping the index and column
    /// names. Rows are padded with `None` or truncated to the column count.
    pub fn map_rows(
        &self,
        mut f: impl FnMut(NaiveDate, &[Option<f64>]) -> Vec<Option<f64>>,
    ) -> Frame {
        let width = self.columns.len();
        Frame {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values: self
                .rows()
                .map(|(date, row)| {
                    let mut mapped = f(date, row);
                    mapped.resize(width, None);
                    mapped
                })
                .collect(),
        }
    }

    /// Outer join on the date index.
    ///
    /// The result carries the union of both indices and `self`'s columns followed
    /// by `other`'s. Cells without an observation are `None`. Column sets must be
    /// disjoint.
    pub fn outer_join(&self, other: &Frame) -> Result<Frame, CoreError> {
        if let Some(shared) = self.columns.iter().find(|c| other.columns.contains(c)) {
            return Err(CoreError::DuplicateColumn(shared.clone()));
        }

        let index: Vec<NaiveDate> = self
            .index
            .iter()
            .chain(other.index.iter())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let width = self.n_cols() + other.n_cols();
        let mut values = Vec::with_capacity(index.len());
        let (mut left, mut right) = (0usize, 0usize);
        for date in &index {
            let mut row = Vec::with_capacity(width);
            if self.index.get(left) == Some(date) {
                row.extend_from_slice(&self.values[left]);
                left += 1;
            } else {
                row.extend(std::iter::repeat_n(None, self.n_cols()));
            }
            if other.index.get(right) == Some(date) {
                row.extend_from_slice(&other.values[right]);
                right += 1;
            } else {
                row.extend(std::iter::repeat_n(None, other.n_cols()));
            }
            values.push(row);
        }

        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        Ok(Frame { index, columns, values })
    }

    /// Drops every row in which all cells are missing.
    pub fn drop_empty_rows(self) -> Frame {
        let (index, values) = self
            .index
            .into_iter()
            .zip(self.values)
            .filter(|(_, row)| row.iter().any(|v| v.is_some()))
            .unzip();
        Frame {
            index,
            columns: self.columns,
            values,
        }
    }
}
