//! `GroupedTable`: aligned key and value columns, one row per group.
//!
//! The first `key_arity` columns are keys, ascending and free of duplicate key
//! tuples once a table comes out of [`GroupBy`](crate::GroupBy) or
//! [`merge`](fn@crate::merge::merge). Every remaining column is a value column tagged with
//! the [`AggOp`] that produced it; merges recombine values with that operator.

use std::cmp::Ordering;
use std::io::Write;

use log::debug;

use crate::column::Column;
use crate::error::{ColumnError, Result};
use crate::merge::compare_keys;
use crate::types::{AggOp, Value};

/// Separator between fields in [`GroupedTable::write_text`].
pub const TEXT_FIELD_SEPARATOR: &str = ", ";

#[derive(Clone, Debug, PartialEq)]
pub struct GroupedTable {
    columns: Vec<Column>,
    key_arity: usize,
    ops: Vec<AggOp>,
}

impl GroupedTable {
    /// Assemble a table from keys followed by value columns.
    ///
    /// # Errors
    /// [`ColumnError::LengthMismatch`] if there are fewer columns than keys, if
    /// `ops` does not name one operator per value column, or if the columns
    /// differ in length.
    pub fn new(columns: Vec<Column>, key_arity: usize, ops: Vec<AggOp>) -> Result<Self> {
        if key_arity > columns.len() {
            return Err(ColumnError::LengthMismatch {
                expected: key_arity,
                found: columns.len(),
            });
        }
        if ops.len() != columns.len() - key_arity {
            return Err(ColumnError::LengthMismatch {
                expected: columns.len() - key_arity,
                found: ops.len(),
            });
        }
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                return Err(ColumnError::LengthMismatch {
                    expected: rows,
                    found: bad.len(),
                });
            }
        }
        Ok(Self {
            columns,
            key_arity,
            ops,
        })
    }

    /// Number of groups.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    #[must_use]
    pub const fn key_arity(&self) -> usize {
        self.key_arity
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, i: usize) -> Option<&Column> {
        self.columns.get(i)
    }

    /// Column by name; the first match wins.
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    #[must_use]
    pub fn key_columns(&self) -> &[Column] {
        &self.columns[..self.key_arity]
    }

    #[must_use]
    pub fn value_columns(&self) -> &[Column] {
        &self.columns[self.key_arity..]
    }

    #[must_use]
    pub fn value_ops(&self) -> &[AggOp] {
        &self.ops
    }

    /// The operator for column `i`: `Nil` for keys, the aggregate for values.
    #[must_use]
    pub fn op(&self, i: usize) -> Option<AggOp> {
        if i < self.key_arity {
            Some(AggOp::Nil)
        } else {
            self.ops.get(i - self.key_arity).copied()
        }
    }

    /// Row `i` as scalars, keys first.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<Vec<Value>> {
        self.columns.iter().map(|c| c.get(i)).collect()
    }

    #[must_use]
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Whether every key tuple is strictly greater than the one before it.
    #[must_use]
    pub fn keys_strictly_ascending(&self) -> bool {
        let keys = self.key_columns();
        (1..self.rows()).all(|r| compare_keys(keys, r - 1, keys, r) == Ordering::Less)
    }

    /// LIMIT: keep `min(keep, rows - start)` rows from `start` in every column.
    /// Returns the new row count.
    pub fn truncate(&mut self, keep: usize, start: usize) -> usize {
        let mut rows = 0;
        for c in &mut self.columns {
            rows = c.truncate(keep, start);
        }
        rows
    }

    /// Keep the rows holding the `k` largest values of column `col` (with ties),
    /// in their existing order so the key order is preserved.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if `col` is not a column of this table.
    pub fn top_k_rows(&mut self, col: usize, k: usize) -> Result<usize> {
        let rows = self.selected(col, |c| c.top_k(k))?;
        self.keep_rows(&rows)
    }

    /// Like [`top_k_rows`](Self::top_k_rows) for the `k` smallest values.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if `col` is not a column of this table.
    pub fn bottom_k_rows(&mut self, col: usize, k: usize) -> Result<usize> {
        let rows = self.selected(col, |c| c.bottom_k(k))?;
        self.keep_rows(&rows)
    }

    fn selected(&self, col: usize, pick: impl Fn(&Column) -> Vec<usize>) -> Result<Vec<usize>> {
        let c = self.columns.get(col).ok_or(ColumnError::OutOfRange {
            index: col,
            len: self.columns.len(),
        })?;
        let mut rows = pick(c);
        rows.sort_unstable();
        Ok(rows)
    }

    fn keep_rows(&mut self, rows: &[usize]) -> Result<usize> {
        self.columns = self
            .columns
            .iter()
            .map(|c| c.gather(rows))
            .collect::<Result<_>>()?;
        debug!("kept {} selected rows", rows.len());
        Ok(rows.len())
    }

    /// Write all columns, one after the other, in the flat binary layout.
    /// Returns the total number of elements written.
    ///
    /// # Errors
    /// [`ColumnError::Write`] with the number of elements written so far,
    /// across all columns.
    pub fn write_binary<W: Write>(&self, out: &mut W) -> Result<usize> {
        let mut total = 0;
        for c in &self.columns {
            let before = total;
            total += c.write_binary(out).map_err(|e| match e {
                ColumnError::Write { written, source } => ColumnError::Write {
                    written: before + written,
                    source,
                },
                other => other,
            })?;
        }
        Ok(total)
    }

    /// Write one line per row, fields separated by `", "`. Returns the number of
    /// rows written.
    ///
    /// # Errors
    /// [`ColumnError::Write`] with the number of complete rows written.
    pub fn write_text(&self, out: &mut dyn Write) -> Result<usize> {
        for r in 0..self.rows() {
            self.write_row(out, r).map_err(|e| match e {
                ColumnError::Write { source, .. } => ColumnError::Write { written: r, source },
                other => other,
            })?;
        }
        Ok(self.rows())
    }

    fn write_row(&self, out: &mut dyn Write, r: usize) -> Result<()> {
        let wrap = |source| ColumnError::Write { written: 0, source };
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                out.write_all(TEXT_FIELD_SEPARATOR.as_bytes()).map_err(wrap)?;
            }
            c.write_text(out, r)?;
        }
        out.write_all(b"\n").map_err(wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> GroupedTable {
        GroupedTable::new(
            vec![
                Column::new("k", vec![1i32, 2, 3, 4]),
                Column::new("total", vec![10i64, 40, 30, 40]),
            ],
            1,
            vec![AggOp::Sum],
        )
        .unwrap()
    }

    #[test]
    fn shape_is_validated() {
        let k = Column::new("k", vec![1i32, 2]);
        let v = Column::new("v", vec![1i32]);
        assert!(GroupedTable::new(vec![k.clone(), v], 1, vec![AggOp::Sum]).is_err());
        assert!(GroupedTable::new(vec![k.clone()], 2, vec![]).is_err());
        assert!(GroupedTable::new(vec![k], 1, vec![AggOp::Sum]).is_err());
    }

    #[test]
    fn op_lookup() {
        let t = table();
        assert_eq!(t.op(0), Some(AggOp::Nil));
        assert_eq!(t.op(1), Some(AggOp::Sum));
        assert_eq!(t.op(2), None);
    }

    #[test]
    fn top_k_rows_keeps_key_order() {
        let mut t = table();
        assert_eq!(t.top_k_rows(1, 1).unwrap(), 2);
        assert_eq!(t.row(0), Some(vec![Value::Int32(2), Value::Int64(40)]));
        assert_eq!(t.row(1), Some(vec![Value::Int32(4), Value::Int64(40)]));
        assert!(t.keys_strictly_ascending());
        assert!(t.top_k_rows(9, 1).is_err());
    }

    #[test]
    fn text_lines() {
        let mut t = table();
        t.truncate(2, 1);
        let mut buf = Vec::new();
        assert_eq!(t.write_text(&mut buf).unwrap(), 2);
        assert_eq!(String::from_utf8(buf).unwrap(), "2, 40\n3, 30\n");
    }
}
